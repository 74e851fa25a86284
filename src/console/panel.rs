//! Chart-window container for the console: the editor on the left, an
//! empty reserved pane on the right.

use std::cell::Cell;

use crossterm::event::{KeyEvent, MouseButton};
use ratatui::{
    layout::{Constraint, Direction, Layout, Position, Rect},
    widgets::{Block, Borders},
    Frame,
};

use super::{InputSurface, PromptEditor};

/// Outer margins: left, top, right, bottom
const MARGINS: (u16, u16, u16, u16) = (2, 0, 2, 2);
const HANDLE_WIDTH: u16 = 1;

pub struct ConsolePanel {
    editor: PromptEditor,
    /// Areas from the last draw, for mouse hit-testing
    editor_area: Cell<Rect>,
    reserved_area: Cell<Rect>,
}

impl ConsolePanel {
    pub fn new(editor: PromptEditor) -> Self {
        ConsolePanel {
            editor,
            editor_area: Cell::new(Rect::default()),
            reserved_area: Cell::new(Rect::default()),
        }
    }

    #[cfg(test)]
    pub fn editor(&self) -> &PromptEditor {
        &self.editor
    }

    pub fn editor_mut(&mut self) -> &mut PromptEditor {
        &mut self.editor
    }

    /// Editor, split handle and reserved pane for a window of size `area`
    pub fn layout(area: Rect) -> [Rect; 3] {
        let (left, top, right, bottom) = MARGINS;
        let inner = Rect {
            x: area.x.saturating_add(left),
            y: area.y.saturating_add(top),
            width: area.width.saturating_sub(left + right),
            height: area.height.saturating_sub(top + bottom),
        };
        let chunks = Layout::default()
            .direction(Direction::Horizontal)
            .spacing(0)
            .constraints([Constraint::Fill(1), Constraint::Length(HANDLE_WIDTH), Constraint::Fill(1)])
            .split(inner);
        [chunks[0], chunks[1], chunks[2]]
    }

    pub fn draw(&mut self, frame: &mut Frame) {
        self.editor.pump_notifications();
        let theme = self.editor.theme();

        frame.render_widget(Block::default().style(theme.style()), frame.area());

        let [editor_area, handle_area, reserved_area] = Self::layout(frame.area());
        self.editor_area.set(editor_area);
        self.reserved_area.set(reserved_area);

        frame.render_widget(&self.editor, editor_area);
        frame.render_widget(
            Block::default().borders(Borders::LEFT).style(theme.style()),
            handle_area,
        );
        // reserved for future content
        frame.render_widget(Block::default().style(theme.style()), reserved_area);

        if let Some(position) = self.editor.cursor_position(editor_area) {
            frame.set_cursor_position(position);
        }
    }
}

impl InputSurface for ConsolePanel {
    fn key_press(&mut self, key: KeyEvent) {
        if self.editor.is_focused() {
            self.editor.key_press(key);
        }
    }

    fn mouse_press(&mut self, button: MouseButton, at: Position) {
        if self.editor_area.get().contains(at) {
            self.editor.mouse_press(button, at);
        } else if self.reserved_area.get().contains(at) && button == MouseButton::Left {
            self.editor.set_focused(false);
        }
    }

    fn mouse_double_click(&mut self, button: MouseButton, at: Position) {
        if self.editor_area.get().contains(at) {
            self.editor.mouse_double_click(button, at);
        }
    }

    fn context_menu(&mut self, at: Position) {
        if self.editor_area.get().contains(at) {
            self.editor.context_menu(at);
        }
    }

    fn wheel(&mut self, lines: i32, at: Position) {
        if self.editor_area.get().contains(at) {
            self.editor.wheel(lines, at);
        }
    }
}
