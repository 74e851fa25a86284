pub mod editor;
pub mod panel;

use crossterm::event::{KeyEvent, MouseButton};
use ratatui::layout::Position;

pub use editor::PromptEditor;
pub use panel::ConsolePanel;

/// Input the host routes into a panel. Anything not overridden is ignored.
pub trait InputSurface {
    fn key_press(&mut self, key: KeyEvent);

    fn mouse_press(&mut self, _button: MouseButton, _at: Position) {}

    fn mouse_double_click(&mut self, _button: MouseButton, _at: Position) {}

    fn context_menu(&mut self, _at: Position) {}

    /// Positive `lines` scroll up
    fn wheel(&mut self, _lines: i32, _at: Position) {}
}
