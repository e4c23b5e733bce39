use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use super::state::Intent;

/// Maps a key press to an intent. Releases and repeats are ignored.
pub fn intent_for(key: &KeyEvent) -> Option<Intent> {
    if key.kind != KeyEventKind::Press {
        return None;
    }
    if key.modifiers.contains(KeyModifiers::CONTROL) {
        return matches!(key.code, KeyCode::Char('c')).then_some(Intent::Quit);
    }
    match key.code {
        KeyCode::Char('q') => Some(Intent::Quit),
        KeyCode::Up | KeyCode::Char('k') => Some(Intent::Up),
        KeyCode::Down | KeyCode::Char('j') => Some(Intent::Down),
        KeyCode::Enter | KeyCode::Char(' ') => Some(Intent::Select),
        KeyCode::Char('o') => Some(Intent::OpenInBrowser),
        KeyCode::Char('r') => Some(Intent::Reload),
        KeyCode::Esc => Some(Intent::Back),
        _ => None,
    }
}
