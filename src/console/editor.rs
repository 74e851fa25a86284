//! The prompt editor: a scrolling, themed text surface that behaves like a
//! single REPL input line.
//!
//! Output and the prompt are appended to a bounded list of blocks (lines).
//! Only the last block is editable, and only to the right of the `"> "`
//! marker. Pressing Enter hands the line to the session and prints whatever
//! comes back.

use std::cell::Cell;
use std::collections::VecDeque;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseButton};
use ratatui::{
    buffer::Buffer,
    layout::{Position, Rect},
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Paragraph, Widget},
};
use tokio::sync::{mpsc, watch};
use tracing::{debug, trace, warn};

use super::InputSurface;
use crate::errors::EvalError;
use crate::host::HostContext;
use crate::lang::Value;
use crate::models::Theme;
use crate::session::SessionHandle;

pub const PROMPT: &str = "> ";
pub const PROMPT_WIDTH: usize = 2;
pub const MAX_BLOCKS: usize = 1024;
/// Statements containing this are not echoed back
const ASSIGNMENT: &str = "<-";
const TAB: &str = "    ";

/// Session variable holding the current user
pub const USER_BINDING: &str = "session.user";
/// Session variable holding the user's data root
pub const HOME_BINDING: &str = "session.home";

/// A run of same-colored text
#[derive(Debug, Clone, PartialEq)]
pub struct Segment {
    pub color: Color,
    pub text: String,
}

/// One rendered line
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TextBlock {
    segments: Vec<Segment>,
}

impl TextBlock {
    pub fn text(&self) -> String {
        self.segments.iter().map(|s| s.text.as_str()).collect()
    }

    /// Length in characters
    pub fn len(&self) -> usize {
        self.segments.iter().map(|s| s.text.chars().count()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.iter().all(|s| s.text.is_empty())
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    fn push(&mut self, color: Color, text: &str) {
        match self.segments.last_mut() {
            Some(last) if last.color == color => last.text.push_str(text),
            _ => self.segments.push(Segment { color, text: text.to_string() }),
        }
    }

    /// Segment index and byte offset of character column `col`
    fn locate(&self, col: usize) -> Option<(usize, usize)> {
        let mut remaining = col;
        for (i, seg) in self.segments.iter().enumerate() {
            let chars = seg.text.chars().count();
            if remaining < chars {
                let byte = seg.text.char_indices().nth(remaining).map(|(b, _)| b).unwrap_or(0);
                return Some((i, byte));
            }
            remaining -= chars;
        }
        None
    }

    /// Insert at `col`, taking the color of the text just before it
    fn insert(&mut self, col: usize, fallback: Color, text: &str) {
        if col == 0 {
            match self.segments.first_mut() {
                Some(first) => first.text.insert_str(0, text),
                None => self.push(fallback, text),
            }
            return;
        }
        match self.locate(col - 1) {
            Some((i, byte)) => {
                let seg = &mut self.segments[i];
                let after = byte + seg.text[byte..].chars().next().map_or(0, char::len_utf8);
                seg.text.insert_str(after, text);
            }
            None => {
                let color = self.segments.last().map_or(fallback, |s| s.color);
                self.push(color, text);
            }
        }
    }

    fn remove(&mut self, col: usize) {
        if let Some((i, byte)) = self.locate(col) {
            self.segments[i].text.remove(byte);
            if self.segments[i].text.is_empty() {
                self.segments.remove(i);
            }
        }
    }

    fn to_line(&self) -> Line<'static> {
        Line::from(
            self.segments
                .iter()
                .map(|s| Span::styled(s.text.clone(), Style::default().fg(s.color)))
                .collect::<Vec<_>>(),
        )
    }
}

pub struct PromptEditor {
    session: SessionHandle,
    host: HostContext,
    config_changed: watch::Receiver<u32>,
    theme: Theme,
    blocks: VecDeque<TextBlock>,
    max_blocks: usize,
    /// Character column of the cursor inside the last block
    cursor: usize,
    /// Color for plain appends, the last one passed to `append_colored`
    text_color: Color,
    local_echo: bool,
    focused: bool,
    /// Lines scrolled up from the bottom
    scroll: usize,
    viewport_height: Cell<u16>,
    keystroke_listeners: Vec<mpsc::UnboundedSender<String>>,
}

impl PromptEditor {
    pub fn new(session: SessionHandle, host: HostContext) -> Self {
        let theme = host.theme();
        let config_changed = host.config_changed();
        let mut editor = PromptEditor {
            session,
            host,
            config_changed,
            theme,
            blocks: VecDeque::from([TextBlock::default()]),
            max_blocks: MAX_BLOCKS,
            cursor: 0,
            text_color: theme.foreground(),
            local_echo: true,
            focused: true,
            scroll: 0,
            viewport_height: Cell::new(0),
            keystroke_listeners: Vec::new(),
        };

        let greeting = {
            let session = editor.session.borrow();
            format!("{} Console ({})", session.language(), session.version())
        };
        editor.append_colored(theme.marker, &greeting);
        editor.start_prompt();
        editor.on_theme_changed(0);
        editor
    }

    /// Re-read the host theme; the payload carries nothing we need
    pub fn on_theme_changed(&mut self, _generation: u32) {
        self.theme = self.host.theme();
        trace!(theme = ?self.theme, "console theme applied");
    }

    /// Deliver pending host notifications
    pub fn pump_notifications(&mut self) {
        if matches!(self.config_changed.has_changed(), Ok(true)) {
            let generation = *self.config_changed.borrow_and_update();
            self.on_theme_changed(generation);
        }
    }

    pub fn theme(&self) -> Theme {
        self.theme
    }

    pub fn set_local_echo(&mut self, enabled: bool) {
        self.local_echo = enabled;
    }

    #[cfg(test)]
    pub fn local_echo(&self) -> bool {
        self.local_echo
    }

    pub fn set_focused(&mut self, focused: bool) {
        self.focused = focused;
    }

    pub fn is_focused(&self) -> bool {
        self.focused
    }

    /// Receive the text of every keystroke that reaches the default handler
    pub fn subscribe_keystrokes(&mut self) -> mpsc::UnboundedReceiver<String> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.keystroke_listeners.push(tx);
        rx
    }

    pub fn blocks(&self) -> &VecDeque<TextBlock> {
        &self.blocks
    }

    #[cfg(test)]
    pub fn cursor_column(&self) -> usize {
        self.cursor
    }

    /// Append text in `color`; later plain appends keep using it
    pub fn append_colored(&mut self, color: Color, text: &str) {
        self.text_color = color;
        self.append(text);
    }

    /// Append text at the end and scroll to the bottom
    pub fn append(&mut self, text: &str) {
        let color = self.text_color;
        let text = text.replace('\r', "").replace('\t', TAB);
        for (i, piece) in text.split('\n').enumerate() {
            if i > 0 {
                self.push_block();
            }
            if !piece.is_empty() {
                self.last_block_mut().push(color, piece);
            }
        }
        self.cursor = self.last_block().len();
        self.scroll = 0;
    }

    /// The last block, trimmed
    pub fn current_line(&self) -> String {
        self.last_block().text().trim().to_string()
    }

    pub fn handle_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Up | KeyCode::Down => {}

            KeyCode::Right => {
                if self.cursor < self.last_block().len() {
                    self.cursor += 1;
                }
            }

            KeyCode::Left => {
                if self.cursor > PROMPT_WIDTH {
                    self.cursor -= 1;
                }
            }

            KeyCode::Backspace => {
                if self.cursor > PROMPT_WIDTH {
                    self.cursor -= 1;
                    let col = self.cursor;
                    self.last_block_mut().remove(col);
                }
            }

            KeyCode::Enter => self.evaluate(),

            _ => {
                if self.local_echo {
                    self.edit(key);
                }
                let text = key_text(&key);
                if !text.is_empty() {
                    self.emit_keystroke(&text);
                }
            }
        }
    }

    /// Default text-edit handling for keys the prompt does not intercept
    fn edit(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char(c) if !key.modifiers.intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) => {
                self.insert(&c.to_string());
            }
            KeyCode::Tab => self.insert(TAB),
            KeyCode::Delete => {
                let col = self.cursor;
                self.last_block_mut().remove(col);
            }
            KeyCode::Home => self.cursor = self.cursor.min(PROMPT_WIDTH),
            KeyCode::End => self.cursor = self.last_block().len(),
            KeyCode::PageUp => self.scroll_by(self.page() as i32),
            KeyCode::PageDown => self.scroll_by(-(self.page() as i32)),
            _ => {}
        }
    }

    fn insert(&mut self, text: &str) {
        let col = self.cursor;
        let fallback = self.text_color;
        self.last_block_mut().insert(col, fallback, text);
        self.cursor += text.chars().count();
        self.scroll = 0;
    }

    fn emit_keystroke(&mut self, text: &str) {
        self.keystroke_listeners.retain(|tx| tx.send(text.to_string()).is_ok());
    }

    /// Run the current line through the session and print a fresh prompt
    pub fn evaluate(&mut self) {
        let line = self.current_line();
        let statement: String = if line.chars().count() > 1 {
            line.chars().skip(PROMPT_WIDTH).collect()
        } else {
            String::new()
        };

        self.append("\n");

        if !statement.is_empty() {
            self.run(&statement);
        }

        self.start_prompt();
    }

    fn run(&mut self, statement: &str) {
        debug!(statement, "evaluating");
        let identity = self.host.identity();

        let (outcome, output) = match self.session.try_borrow_mut() {
            Ok(mut session) => {
                session.assign(USER_BINDING, Value::from(identity.user.as_str()));
                session.assign(HOME_BINDING, Value::from(identity.home_string()));

                let outcome = session.parse_eval(statement);
                if let Ok(value) = &outcome {
                    if !statement.contains(ASSIGNMENT) {
                        session.print(value);
                    }
                }
                (outcome, session.take_output())
            }
            Err(_) => {
                warn!("interpreter session is busy");
                (Err(EvalError::Opaque), String::new())
            }
        };

        match outcome {
            Ok(_) => self.append_colored(self.theme.marker, &output),
            Err(err) => {
                debug!(%err, "evaluation failed");
                let color = self.theme.error;
                self.append_colored(color, &format!("{}\n", err));
                self.append_colored(color, &output);
            }
        }
    }

    /// Put the prompt marker at the start of a fresh block
    fn start_prompt(&mut self) {
        if !self.last_block().is_empty() {
            self.append("\n");
        }
        self.append_colored(self.theme.foreground(), PROMPT);
    }

    fn push_block(&mut self) {
        self.blocks.push_back(TextBlock::default());
        while self.blocks.len() > self.max_blocks {
            self.blocks.pop_front();
        }
    }

    fn last_block(&self) -> &TextBlock {
        // `blocks` is never empty
        &self.blocks[self.blocks.len() - 1]
    }

    fn last_block_mut(&mut self) -> &mut TextBlock {
        let last = self.blocks.len() - 1;
        &mut self.blocks[last]
    }

    fn page(&self) -> usize {
        (self.viewport_height.get() as usize).max(1)
    }

    /// Scroll up by positive `lines`, down by negative
    pub fn scroll_by(&mut self, lines: i32) {
        let max = self.blocks.len().saturating_sub(self.page());
        let next = self.scroll as i64 + lines as i64;
        self.scroll = next.clamp(0, max as i64) as usize;
    }

    /// Where the terminal cursor goes when the editor is drawn into `area`
    pub fn cursor_position(&self, area: Rect) -> Option<Position> {
        if !self.focused || self.scroll > 0 || area.height == 0 {
            return None;
        }
        let visible = self.blocks.len().min(area.height as usize);
        let prefix: String = self.last_block().text().chars().take(self.cursor).collect();
        let x = area.x + (Span::raw(prefix).width() as u16).min(area.width.saturating_sub(1));
        let y = area.y + visible as u16 - 1;
        Some(Position::new(x, y))
    }
}

impl Widget for &PromptEditor {
    fn render(self, area: Rect, buf: &mut Buffer) {
        self.viewport_height.set(area.height);
        let end = self.blocks.len().saturating_sub(self.scroll);
        let start = end.saturating_sub(area.height as usize);
        let lines: Vec<Line> = self.blocks.range(start..end).map(TextBlock::to_line).collect();
        Paragraph::new(lines).style(self.theme.style()).render(area, buf);
    }
}

impl InputSurface for PromptEditor {
    fn key_press(&mut self, key: KeyEvent) {
        self.handle_key(key);
    }

    fn mouse_press(&mut self, button: MouseButton, _at: Position) {
        if button == MouseButton::Left {
            self.focused = true;
        }
    }

    fn wheel(&mut self, lines: i32, _at: Position) {
        self.scroll_by(lines);
    }
}

/// The text a key would type, control characters included
fn key_text(key: &KeyEvent) -> String {
    match key.code {
        KeyCode::Char(c) if key.modifiers.contains(KeyModifiers::CONTROL) && c.is_ascii_alphabetic() => {
            ((c.to_ascii_lowercase() as u8 - b'a' + 1) as char).to_string()
        }
        KeyCode::Char(c) => c.to_string(),
        KeyCode::Tab => "\t".into(),
        KeyCode::Esc => "\u{1b}".into(),
        KeyCode::Delete => "\u{7f}".into(),
        _ => String::new(),
    }
}
