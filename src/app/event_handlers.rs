use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::constants::UI_SETTINGS;

use super::App;

impl App {
    /// Returns `true` when the view should close.
    pub(super) fn handle_key(&mut self, key: KeyEvent) -> bool {
        let shift = key.modifiers.contains(KeyModifiers::SHIFT);
        let page = UI_SETTINGS.scroll_rows as i32;

        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => return true,
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => return true,
            KeyCode::Up | KeyCode::Char('k') => self.move_cursor(if shift { -4 } else { -1 }),
            KeyCode::Down | KeyCode::Char('j') => self.move_cursor(if shift { 4 } else { 1 }),
            KeyCode::PageUp => self.scroll_by(-page),
            KeyCode::PageDown => self.scroll_by(page),
            KeyCode::Char('n') | KeyCode::Home => self.jump_to_now(),
            _ => {}
        }
        false
    }
}
