//! Key handling extracted from App::handle_key()
//!
//! Maps a key press to a [`KeyAction`] without touching the app, so the
//! App only executes what was decided here.

use crossterm::event::{KeyCode, KeyModifiers};

/// Action for the App to execute
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAction {
    /// No action needed
    None,
    /// Leave the application
    Quit,
    /// Flip the signed-in flag
    ToggleAuth,
    /// Retry after an error, or refresh the snapshot
    Refresh,
    /// Close the announcement dialog
    CloseAnnouncement,
    /// Ask the host to open the announcement link
    OpenRepository,
}

/// Decide what a key press does.
///
/// While the announcement is open it is modal: only its own keys act, and
/// `q`/`Esc` close it instead of quitting.
pub fn resolve_key(code: KeyCode, modifiers: KeyModifiers, announcement_open: bool) -> KeyAction {
    if modifiers.contains(KeyModifiers::CONTROL) && code == KeyCode::Char('c') {
        return KeyAction::Quit;
    }

    if announcement_open {
        return match code {
            KeyCode::Esc | KeyCode::Enter | KeyCode::Char('q') => KeyAction::CloseAnnouncement,
            KeyCode::Char('o') => KeyAction::OpenRepository,
            _ => KeyAction::None,
        };
    }

    match code {
        KeyCode::Char('q') | KeyCode::Esc => KeyAction::Quit,
        KeyCode::Char('a') => KeyAction::ToggleAuth,
        KeyCode::Char('r') => KeyAction::Refresh,
        _ => KeyAction::None,
    }
}
