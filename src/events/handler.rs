use std::time::{Duration, Instant};

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind};
use ratatui::layout::Position;

use crate::console::InputSurface;
use crate::events::spawner::Event;

/// Two presses closer than this count as a double click
const DOUBLE_CLICK: Duration = Duration::from_millis(400);

/// What the main loop should do after an event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

/// Terminals only report presses; double clicks are reconstructed here
#[derive(Debug, Default)]
pub struct ClickTracker {
    last: Option<(Instant, MouseButton, Position)>,
}

impl ClickTracker {
    /// True when this press completes a double click
    pub fn is_double(&mut self, button: MouseButton, at: Position, now: Instant) -> bool {
        let double = matches!(
            self.last,
            Some((then, b, p)) if b == button && p == at && now.duration_since(then) <= DOUBLE_CLICK
        );
        // a third press starts over
        self.last = if double { None } else { Some((now, button, at)) };
        double
    }
}

fn is_quit(key: &KeyEvent) -> bool {
    key.modifiers.contains(KeyModifiers::CONTROL)
        && matches!(key.code, KeyCode::Char('c') | KeyCode::Char('d'))
}

/// Route one input event to `surface`
pub fn dispatch(surface: &mut impl InputSurface, clicks: &mut ClickTracker, event: &Event) -> Flow {
    match event {
        Event::Stop => Flow::Quit,
        Event::Input(key) if is_quit(key) => Flow::Quit,
        Event::Input(key) => {
            surface.key_press(*key);
            Flow::Continue
        }
        Event::Mouse(mouse) => {
            dispatch_mouse(surface, clicks, mouse, Instant::now());
            Flow::Continue
        }
        Event::Resize | Event::Tick => Flow::Continue,
    }
}

fn dispatch_mouse(surface: &mut impl InputSurface, clicks: &mut ClickTracker, mouse: &MouseEvent, now: Instant) {
    let at = Position::new(mouse.column, mouse.row);
    match mouse.kind {
        MouseEventKind::Down(MouseButton::Right) => surface.context_menu(at),
        MouseEventKind::Down(button) => {
            if clicks.is_double(button, at, now) {
                surface.mouse_double_click(button, at);
            } else {
                surface.mouse_press(button, at);
            }
        }
        MouseEventKind::ScrollUp => surface.wheel(3, at),
        MouseEventKind::ScrollDown => surface.wheel(-3, at),
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Recorder {
        calls: Vec<String>,
    }

    impl InputSurface for Recorder {
        fn key_press(&mut self, key: KeyEvent) {
            self.calls.push(format!("key {:?}", key.code));
        }

        fn mouse_press(&mut self, button: MouseButton, at: Position) {
            self.calls.push(format!("press {:?} {} {}", button, at.x, at.y));
        }

        fn mouse_double_click(&mut self, button: MouseButton, _at: Position) {
            self.calls.push(format!("double {:?}", button));
        }

        fn context_menu(&mut self, _at: Position) {
            self.calls.push("menu".into());
        }

        fn wheel(&mut self, lines: i32, _at: Position) {
            self.calls.push(format!("wheel {}", lines));
        }
    }

    fn mouse(kind: MouseEventKind, column: u16, row: u16) -> MouseEvent {
        MouseEvent { kind, column, row, modifiers: KeyModifiers::NONE }
    }

    #[test]
    fn quit_keys_and_stop() {
        let mut r = Recorder::default();
        let mut clicks = ClickTracker::default();
        let ctrl_c = Event::Input(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL));
        assert_eq!(dispatch(&mut r, &mut clicks, &ctrl_c), Flow::Quit);
        assert_eq!(dispatch(&mut r, &mut clicks, &Event::Stop), Flow::Quit);
        assert!(r.calls.is_empty());

        let c = Event::Input(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::NONE));
        assert_eq!(dispatch(&mut r, &mut clicks, &c), Flow::Continue);
        assert_eq!(r.calls, vec!["key Char('c')"]);
    }

    #[test]
    fn presses_wheel_and_menu() {
        let mut r = Recorder::default();
        let mut clicks = ClickTracker::default();
        let now = Instant::now();
        dispatch_mouse(&mut r, &mut clicks, &mouse(MouseEventKind::Down(MouseButton::Left), 3, 4), now);
        dispatch_mouse(&mut r, &mut clicks, &mouse(MouseEventKind::Down(MouseButton::Right), 3, 4), now);
        dispatch_mouse(&mut r, &mut clicks, &mouse(MouseEventKind::ScrollUp, 3, 4), now);
        dispatch_mouse(&mut r, &mut clicks, &mouse(MouseEventKind::Moved, 3, 4), now);
        assert_eq!(r.calls, vec!["press Left 3 4", "menu", "wheel 3"]);
    }

    #[test]
    fn quick_second_press_is_a_double_click() {
        let mut r = Recorder::default();
        let mut clicks = ClickTracker::default();
        let t0 = Instant::now();
        let down = mouse(MouseEventKind::Down(MouseButton::Left), 1, 1);
        dispatch_mouse(&mut r, &mut clicks, &down, t0);
        dispatch_mouse(&mut r, &mut clicks, &down, t0 + Duration::from_millis(100));
        dispatch_mouse(&mut r, &mut clicks, &down, t0 + Duration::from_millis(200));
        dispatch_mouse(&mut r, &mut clicks, &down, t0 + Duration::from_secs(2));
        assert_eq!(r.calls, vec!["press Left 1 1", "double Left", "press Left 1 1", "press Left 1 1"]);
    }

    #[test]
    fn presses_elsewhere_are_single() {
        let mut clicks = ClickTracker::default();
        let t0 = Instant::now();
        assert!(!clicks.is_double(MouseButton::Left, Position::new(1, 1), t0));
        assert!(!clicks.is_double(MouseButton::Left, Position::new(2, 1), t0));
    }
}
