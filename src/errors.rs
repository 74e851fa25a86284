use std::{error::Error as StdError, fmt};

/// Errors raised by the host around the console (config, terminal, logging)
#[derive(Debug)]
pub enum ConsoleError {
    /// I/O error (e.g., reading config or touching the terminal)
    Io(std::io::Error),
    /// TOML parsing error
    TomlDe(toml::de::Error),
    /// TOML serialization error
    TomlSer(toml::ser::Error),
    /// A theme color that is not `#rrggbb`
    BadColor(String),
    /// No usable home/config directory on this platform
    NoConfigDir,
    /// Logging could not be installed
    Logging(String),
}

impl fmt::Display for ConsoleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConsoleError::Io(e) => write!(f, "I/O error: {}", e),
            ConsoleError::TomlDe(e) => write!(f, "TOML error: {}", e),
            ConsoleError::TomlSer(e) => write!(f, "TOML error: {}", e),
            ConsoleError::BadColor(s) => write!(f, "Invalid color '{}', expected #rrggbb", s),
            ConsoleError::NoConfigDir => write!(f, "Unable to determine config directory"),
            ConsoleError::Logging(s) => write!(f, "Logging setup failed: {}", s),
        }
    }
}

impl StdError for ConsoleError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            ConsoleError::Io(e) => Some(e),
            ConsoleError::TomlDe(e) => Some(e),
            ConsoleError::TomlSer(e) => Some(e),
            ConsoleError::BadColor(_) | ConsoleError::NoConfigDir | ConsoleError::Logging(_) => None,
        }
    }
}

impl From<std::io::Error> for ConsoleError {
    fn from(e: std::io::Error) -> Self {
        ConsoleError::Io(e)
    }
}

impl From<toml::de::Error> for ConsoleError {
    fn from(e: toml::de::Error) -> Self {
        ConsoleError::TomlDe(e)
    }
}

impl From<toml::ser::Error> for ConsoleError {
    fn from(e: toml::ser::Error) -> Self {
        ConsoleError::TomlSer(e)
    }
}

/// Outcome of a failed `parse_eval`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EvalError {
    /// The interpreter raised an error with a message
    Recognized { message: String },
    /// The interpreter failed without anything useful to show
    Opaque,
}

impl EvalError {
    pub fn recognized(message: impl Into<String>) -> Self {
        EvalError::Recognized { message: message.into() }
    }
}

impl fmt::Display for EvalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EvalError::Recognized { message } => write!(f, "{}", message),
            EvalError::Opaque => write!(f, "error: general exception."),
        }
    }
}

impl StdError for EvalError {}
