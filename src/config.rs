use serde::{Deserialize, Serialize};
use std::{fs, path::{Path, PathBuf}, time::SystemTime};
use directories::ProjectDirs;
use crate::errors::ConsoleError;
use crate::models::{parse_hex_color, to_hex_color, Identity, Theme};

/// Who the console runs as
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct IdentitySettings {
    pub user: String,
    pub home: PathBuf,
}

impl Default for IdentitySettings {
    fn default() -> Self {
        let user = std::env::var("USER")
            .or_else(|_| std::env::var("USERNAME"))
            .unwrap_or_else(|_| "anonymous".to_string());
        let home = directories::UserDirs::new()
            .map(|d| d.home_dir().to_path_buf())
            .unwrap_or_else(|| PathBuf::from("."));
        IdentitySettings { user, home }
    }
}

/// Theme colors as `#rrggbb` strings
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct ThemeSettings {
    pub background: String,
    pub marker: String,
    pub error: String,
}

impl Default for ThemeSettings {
    fn default() -> Self {
        let theme = Theme::default();
        ThemeSettings {
            background: to_hex_color(theme.background),
            marker: to_hex_color(theme.marker),
            error: to_hex_color(theme.error),
        }
    }
}

/// Console behaviour
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct ConsoleSettings {
    pub local_echo: bool,
    /// Host tick (config polling) in milliseconds
    pub tick_millis: u64,
}

impl Default for ConsoleSettings {
    fn default() -> Self {
        ConsoleSettings { local_echo: true, tick_millis: 500 }
    }
}

/// Contents of config.toml
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
#[serde(default)]
pub struct Settings {
    pub identity: IdentitySettings,
    pub theme: ThemeSettings,
    pub console: ConsoleSettings,
}

impl Settings {
    pub fn theme(&self) -> Result<Theme, ConsoleError> {
        Ok(Theme {
            background: parse_hex_color(&self.theme.background)?,
            marker: parse_hex_color(&self.theme.marker)?,
            error: parse_hex_color(&self.theme.error)?,
        })
    }

    pub fn identity(&self) -> Identity {
        Identity {
            user: self.identity.user.clone(),
            home: self.identity.home.clone(),
        }
    }
}

fn project_dirs() -> Result<ProjectDirs, ConsoleError> {
    ProjectDirs::from("org", "statconsole", "stat-console").ok_or(ConsoleError::NoConfigDir)
}

/// Returns the path to config.toml, creating directories if needed
pub fn settings_path() -> Result<PathBuf, ConsoleError> {
    let proj = project_dirs()?;
    let dir = proj.config_dir();
    fs::create_dir_all(dir)?;
    Ok(dir.join("config.toml"))
}

/// Directory for log files
pub fn log_dir() -> Result<PathBuf, ConsoleError> {
    Ok(project_dirs()?.data_local_dir().join("logs"))
}

/// Load settings, writing defaults when the file does not exist yet
pub fn load_settings(path: &Path) -> Result<Settings, ConsoleError> {
    if !path.exists() {
        let settings = Settings::default();
        save_settings(path, &settings)?;
        return Ok(settings);
    }
    let contents = fs::read_to_string(path)?;
    let settings: Settings = toml::from_str(&contents)?;
    // fail early on bad colors rather than at the first repaint
    settings.theme()?;
    Ok(settings)
}

/// Save settings to disk
pub fn save_settings(path: &Path, settings: &Settings) -> Result<(), ConsoleError> {
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir)?;
    }
    let toml = toml::to_string_pretty(settings)?;
    fs::write(path, toml)?;
    Ok(())
}

/// Watches config.toml for edits by comparing modification times
#[derive(Debug)]
pub struct SettingsWatcher {
    path: PathBuf,
    last_modified: Option<SystemTime>,
}

impl SettingsWatcher {
    pub fn new(path: PathBuf) -> Self {
        let last_modified = modified(&path);
        SettingsWatcher { path, last_modified }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reload if the file changed since the last call
    pub fn poll(&mut self) -> Option<Result<Settings, ConsoleError>> {
        let now = modified(&self.path);
        if now.is_none() || now == self.last_modified {
            return None;
        }
        self.last_modified = now;
        Some(load_settings(&self.path))
    }
}

fn modified(path: &Path) -> Option<SystemTime> {
    fs::metadata(path).and_then(|m| m.modified()).ok()
}
