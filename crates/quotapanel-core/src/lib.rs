//! Core library for quotapanel.
//!
//! The panel is a sandboxed surface: it never talks to the outside world
//! directly. Everything it shows arrives over the shared host message
//! channel ([`channel`]), framed by [`protocol`]. The [`dashboard`] module
//! holds the rate-limit synchronization component, [`announcement`] the
//! one-shot release dialog.

pub mod announcement;
pub mod channel;
pub mod config;
pub mod dashboard;
pub mod paths;
pub mod protocol;
pub mod usage;
