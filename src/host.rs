//! What the surrounding application exposes to its panels: the current
//! theme, who is logged in, and a counter bumped on every config change.

use tokio::sync::watch;
use tracing::info;

use crate::config::Settings;
use crate::errors::ConsoleError;
use crate::models::{Identity, Theme};

/// Publishing side, owned by the application
pub struct Host {
    theme: watch::Sender<Theme>,
    identity: watch::Sender<Identity>,
    config_changed: watch::Sender<u32>,
}

/// Read side handed to panels
#[derive(Clone)]
pub struct HostContext {
    theme: watch::Receiver<Theme>,
    identity: watch::Receiver<Identity>,
    config_changed: watch::Receiver<u32>,
}

impl Host {
    pub fn new(theme: Theme, identity: Identity) -> Self {
        let (theme, _) = watch::channel(theme);
        let (identity, _) = watch::channel(identity);
        let (config_changed, _) = watch::channel(0);
        Host { theme, identity, config_changed }
    }

    pub fn context(&self) -> HostContext {
        HostContext {
            theme: self.theme.subscribe(),
            identity: self.identity.subscribe(),
            config_changed: self.config_changed.subscribe(),
        }
    }

    /// Push freshly loaded settings to every panel
    pub fn apply(&self, settings: &Settings) -> Result<(), ConsoleError> {
        let theme = settings.theme()?;
        self.theme.send_replace(theme);
        self.identity.send_replace(settings.identity());
        self.notify_config_changed();
        Ok(())
    }

    #[cfg(test)]
    pub fn set_identity(&self, identity: Identity) {
        self.identity.send_replace(identity);
    }

    pub fn notify_config_changed(&self) {
        self.config_changed.send_modify(|generation| *generation = generation.wrapping_add(1));
        info!(generation = *self.config_changed.borrow(), "configuration changed");
    }
}

impl HostContext {
    pub fn theme(&self) -> Theme {
        *self.theme.borrow()
    }

    pub fn identity(&self) -> Identity {
        self.identity.borrow().clone()
    }

    /// A fresh subscription to configuration changes
    pub fn config_changed(&self) -> watch::Receiver<u32> {
        let mut rx = self.config_changed.clone();
        rx.mark_unchanged();
        rx
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::style::Color;
    use std::path::PathBuf;

    fn identity() -> Identity {
        Identity { user: "ann".into(), home: PathBuf::from("/data/ann") }
    }

    #[test]
    fn apply_publishes_theme_and_identity() {
        let host = Host::new(Theme::default(), identity());
        let ctx = host.context();
        let mut changes = ctx.config_changed();
        assert!(!changes.has_changed().unwrap());

        let mut settings = Settings::default();
        settings.theme.background = "#ffffff".into();
        settings.identity.user = "bob".into();
        host.apply(&settings).unwrap();

        assert_eq!(ctx.theme().background, Color::Rgb(255, 255, 255));
        assert_eq!(ctx.identity().user, "bob");
        assert!(changes.has_changed().unwrap());
        assert_eq!(*changes.borrow_and_update(), 1);
    }

    #[test]
    fn bad_theme_leaves_state_alone() {
        let host = Host::new(Theme::default(), identity());
        let ctx = host.context();
        let mut settings = Settings::default();
        settings.theme.error = "red".into();
        assert!(host.apply(&settings).is_err());
        assert_eq!(ctx.theme(), Theme::default());
        assert_eq!(ctx.identity(), identity());
    }
}
