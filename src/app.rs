// src/app.rs
use std::path::PathBuf;

use ratatui::Frame;
use tokio::sync::mpsc;
use tracing::{info, trace, warn};

use crate::config::{Settings, SettingsWatcher};
use crate::console::{ConsolePanel, PromptEditor};
use crate::errors::ConsoleError;
use crate::events::handler::{self, ClickTracker, Flow};
use crate::events::spawner::Event;
use crate::host::Host;
use crate::session::SessionHandle;

/// Command-line values that win over config.toml, including after a reload
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub user: Option<String>,
    pub home: Option<PathBuf>,
    pub no_echo: bool,
}

impl Overrides {
    pub fn apply(&self, settings: &mut Settings) {
        if let Some(user) = &self.user {
            settings.identity.user = user.clone();
        }
        if let Some(home) = &self.home {
            settings.identity.home = home.clone();
        }
        if self.no_echo {
            settings.console.local_echo = false;
        }
    }
}

/// Holds the shared application state
pub struct App {
    host: Host,
    watcher: SettingsWatcher,
    overrides: Overrides,
    panel: ConsolePanel,
    clicks: ClickTracker,
    /// Raw keystrokes from the editor, traced for diagnostics
    keystrokes: mpsc::UnboundedReceiver<String>,
}

impl App {
    pub fn new(
        mut settings: Settings,
        watcher: SettingsWatcher,
        overrides: Overrides,
        session: SessionHandle,
    ) -> Result<Self, ConsoleError> {
        overrides.apply(&mut settings);
        let host = Host::new(settings.theme()?, settings.identity());

        let mut editor = PromptEditor::new(session, host.context());
        editor.set_local_echo(settings.console.local_echo);
        let keystrokes = editor.subscribe_keystrokes();

        Ok(App {
            host,
            watcher,
            overrides,
            panel: ConsolePanel::new(editor),
            clicks: ClickTracker::default(),
            keystrokes,
        })
    }

    #[cfg(test)]
    pub fn panel(&self) -> &ConsolePanel {
        &self.panel
    }

    pub fn draw(&mut self, frame: &mut Frame) {
        self.panel.draw(frame);
    }

    /// Handle one event from the spawner
    pub fn handle(&mut self, event: &Event) -> Flow {
        if let Event::Tick = event {
            self.reload_settings();
        }
        let flow = handler::dispatch(&mut self.panel, &mut self.clicks, event);
        self.drain_keystrokes();
        flow
    }

    fn reload_settings(&mut self) {
        let Some(result) = self.watcher.poll() else {
            return;
        };
        let mut settings = match result {
            Ok(settings) => settings,
            Err(e) => {
                warn!(path = %self.watcher.path().display(), error = %e, "ignoring unreadable config");
                return;
            }
        };
        self.overrides.apply(&mut settings);
        match self.host.apply(&settings) {
            Ok(()) => {
                let editor = self.panel.editor_mut();
                editor.set_local_echo(settings.console.local_echo);
                editor.pump_notifications();
                info!(path = %self.watcher.path().display(), "reloaded config");
            }
            Err(e) => warn!(error = %e, "config rejected"),
        }
    }

    fn drain_keystrokes(&mut self) {
        while let Ok(text) = self.keystrokes.try_recv() {
            trace!(keystroke = ?text, "key");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::save_settings;
    use crate::lang::StatSession;
    use crate::session::SessionManager;
    use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
    use ratatui::style::Color;
    use std::time::{Duration, SystemTime};
    use tempfile::tempdir;

    fn key(code: KeyCode) -> Event {
        Event::Input(KeyEvent::new(code, KeyModifiers::NONE))
    }

    fn type_line(app: &mut App, line: &str) {
        for c in line.chars() {
            app.handle(&key(KeyCode::Char(c)));
        }
        app.handle(&key(KeyCode::Enter));
    }

    fn app_with(settings: Settings, overrides: Overrides) -> (App, tempfile::TempDir) {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        save_settings(&path, &settings).unwrap();
        let session = SessionManager::new(StatSession::new()).handle();
        let app = App::new(settings, SettingsWatcher::new(path), overrides, session).unwrap();
        (app, dir)
    }

    #[test]
    fn overrides_replace_identity_and_echo() {
        let mut settings = Settings::default();
        let overrides = Overrides {
            user: Some("carol".into()),
            home: Some(PathBuf::from("/srv/carol")),
            no_echo: true,
        };
        overrides.apply(&mut settings);
        assert_eq!(settings.identity.user, "carol");
        assert_eq!(settings.identity.home, PathBuf::from("/srv/carol"));
        assert!(!settings.console.local_echo);
    }

    #[test]
    fn typed_statement_is_evaluated() {
        let (mut app, _dir) = app_with(Settings::default(), Overrides::default());
        type_line(&mut app, "1 + 1");
        let text: Vec<String> = app.panel().editor().blocks().iter().map(|b| b.text()).collect();
        assert!(text.iter().any(|t| t == "[1] 2"), "{:?}", text);
        assert_eq!(app.panel().editor().current_line(), ">");
    }

    #[test]
    fn ctrl_d_quits() {
        let (mut app, _dir) = app_with(Settings::default(), Overrides::default());
        let ctrl_d = Event::Input(KeyEvent::new(KeyCode::Char('d'), KeyModifiers::CONTROL));
        assert_eq!(app.handle(&key(KeyCode::Char('x'))), Flow::Continue);
        assert_eq!(app.handle(&ctrl_d), Flow::Quit);
    }

    #[test]
    fn tick_reloads_edited_config_keeping_overrides() {
        let overrides = Overrides { user: Some("carol".into()), ..Overrides::default() };
        let (mut app, dir) = app_with(Settings::default(), overrides);
        let path = dir.path().join("config.toml");

        let mut edited = Settings::default();
        edited.theme.background = "#ffffff".into();
        edited.identity.user = "dave".into();
        save_settings(&path, &edited).unwrap();
        // force a distinct mtime regardless of filesystem resolution
        let file = std::fs::File::options().write(true).open(&path).unwrap();
        file.set_modified(SystemTime::now() + Duration::from_secs(10)).unwrap();

        app.handle(&Event::Tick);
        let theme = app.panel().editor().theme();
        assert_eq!(theme.background, Color::Rgb(255, 255, 255));
        assert_eq!(theme.foreground(), Color::Black);
        assert_eq!(app.host.context().identity().user, "carol");
    }

    #[test]
    fn broken_config_keeps_previous_theme() {
        let (mut app, dir) = app_with(Settings::default(), Overrides::default());
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[theme]\nbackground = \"purple\"\n").unwrap();
        let file = std::fs::File::options().write(true).open(&path).unwrap();
        file.set_modified(SystemTime::now() + Duration::from_secs(10)).unwrap();

        app.handle(&Event::Tick);
        assert_eq!(app.panel().editor().theme(), crate::models::Theme::default());
    }
}
