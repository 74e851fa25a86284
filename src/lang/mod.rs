//! A small R-flavoured statistics language
//!
//! Ships with the console so there is always a session to talk to. The
//! console only sees it through [`crate::session::Session`].

mod builtins;
mod eval;
mod format;
mod lexer;
mod parser;
mod value;

pub use eval::StatSession;
pub use value::Value;
