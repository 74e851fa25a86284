use std::path::PathBuf;

use ratatui::style::{Color, Style};

use crate::errors::ConsoleError;

/// Colors the host hands to its panels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Theme {
    /// Plot/panel background
    pub background: Color,
    /// Accent used for banners and interpreter output
    pub marker: Color,
    /// Color for evaluation failures
    pub error: Color,
}

impl Default for Theme {
    fn default() -> Self {
        Theme {
            background: Color::Rgb(0x1e, 0x1e, 0x1e),
            marker: Color::Rgb(0xff, 0xaa, 0x00),
            error: Color::Rgb(0xff, 0x00, 0x00),
        }
    }
}

impl Theme {
    /// Text color readable on top of the background
    pub fn foreground(&self) -> Color {
        invert_color(self.background)
    }

    /// Base style for a themed surface
    pub fn style(&self) -> Style {
        Style::default().bg(self.background).fg(self.foreground())
    }
}

/// Black or white, whichever contrasts with `color`.
pub fn invert_color(color: Color) -> Color {
    let (r, g, b) = match color {
        Color::Rgb(r, g, b) => (r, g, b),
        Color::Black => (0, 0, 0),
        Color::White => (255, 255, 255),
        Color::Gray => (192, 192, 192),
        Color::DarkGray => (128, 128, 128),
        _ => (0, 0, 0),
    };
    let luminance = 0.299 * r as f32 + 0.587 * g as f32 + 0.114 * b as f32;
    if luminance > 127.5 {
        Color::Rgb(0, 0, 0)
    } else {
        Color::Rgb(255, 255, 255)
    }
}

/// Parse `#rrggbb` into a color
pub fn parse_hex_color(s: &str) -> Result<Color, ConsoleError> {
    let hex = s.trim().strip_prefix('#').ok_or_else(|| ConsoleError::BadColor(s.to_string()))?;
    if hex.len() != 6 || !hex.is_ascii() {
        return Err(ConsoleError::BadColor(s.to_string()));
    }
    let channel = |i: usize| {
        u8::from_str_radix(&hex[i..i + 2], 16).map_err(|_| ConsoleError::BadColor(s.to_string()))
    };
    Ok(Color::Rgb(channel(0)?, channel(2)?, channel(4)?))
}

/// Format a color back to `#rrggbb`
pub fn to_hex_color(color: Color) -> String {
    match color {
        Color::Rgb(r, g, b) => format!("#{:02x}{:02x}{:02x}", r, g, b),
        Color::White => "#ffffff".into(),
        _ => "#000000".into(),
    }
}

/// Who is using the console and where their data lives
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub user: String,
    pub home: PathBuf,
}

impl Identity {
    /// Home as an absolute path string, the way the session sees it
    pub fn home_string(&self) -> String {
        let absolute = if self.home.is_absolute() {
            self.home.clone()
        } else {
            std::env::current_dir()
                .map(|cwd| cwd.join(&self.home))
                .unwrap_or_else(|_| self.home.clone())
        };
        absolute.to_string_lossy().into_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dark_background_gets_white_text() {
        let theme = Theme::default();
        assert_eq!(theme.foreground(), Color::Rgb(255, 255, 255));
    }

    #[test]
    fn light_background_gets_black_text() {
        assert_eq!(invert_color(Color::Rgb(250, 250, 240)), Color::Rgb(0, 0, 0));
        assert_eq!(invert_color(Color::White), Color::Rgb(0, 0, 0));
    }

    #[test]
    fn hex_colors() {
        assert_eq!(parse_hex_color("#ff8000").unwrap(), Color::Rgb(255, 128, 0));
        assert_eq!(to_hex_color(Color::Rgb(1, 2, 255)), "#0102ff");
        assert!(parse_hex_color("ff8000").is_err());
        assert!(parse_hex_color("#ff80").is_err());
        assert!(parse_hex_color("#gg0000").is_err());
    }

    #[test]
    fn relative_home_is_made_absolute() {
        let id = Identity { user: "ann".into(), home: PathBuf::from("data") };
        assert!(PathBuf::from(id.home_string()).is_absolute());
    }
}
