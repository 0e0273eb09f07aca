//! One-shot release announcement.
//!
//! Bump the announcement id (the crate version by default) for a new
//! announcement to show. The id is compared with the last one recorded as
//! shown, and is recorded as soon as the dialog closes, so an announcement
//! is never shown twice.

mod dialog;
mod store;

pub use dialog::{should_show, Announcement, AnnouncementDialog, DEFAULT_REPOSITORY_URL};
pub use store::{AnnouncementStore, FileAnnouncementStore, MemoryAnnouncementStore, StoreError};
