//! Interpreter sessions the console talks to.
//!
//! The console never owns a session. The process keeps one [`SessionManager`]
//! and hands out [`SessionHandle`]s to whoever needs to evaluate code.

use std::cell::RefCell;
use std::rc::Rc;

use crate::errors::EvalError;
use crate::lang::Value;

/// An embedded interpreter's evaluation context
pub trait Session {
    /// Name of the language, used in the console greeting
    fn language(&self) -> &str;

    /// Interpreter version string
    fn version(&self) -> &str;

    /// Bind `value` to `name` in the global environment
    fn assign(&mut self, name: &str, value: Value);

    /// Parse and evaluate `source`, returning the value of the last statement
    fn parse_eval(&mut self, source: &str) -> Result<Value, EvalError>;

    /// Print `value` to the session's output stream
    fn print(&mut self, value: &Value);

    /// Drain everything written to the output stream since the last call
    fn take_output(&mut self) -> String;
}

/// Shared, single-threaded handle to a session
pub type SessionHandle = Rc<RefCell<dyn Session>>;

/// Owns the process-wide session
pub struct SessionManager {
    session: SessionHandle,
}

impl SessionManager {
    pub fn new<S: Session + 'static>(session: S) -> Self {
        let session: SessionHandle = Rc::new(RefCell::new(session));
        SessionManager { session }
    }

    pub fn handle(&self) -> SessionHandle {
        Rc::clone(&self.session)
    }
}

#[cfg(test)]
pub mod testing {
    //! Scripted session for console tests.

    use std::collections::HashMap;

    use super::*;

    /// Replays canned results and records what it was asked
    #[derive(Default)]
    pub struct ScriptedSession {
        pub bindings: HashMap<String, Value>,
        /// `assign <name>`, `eval <source>` and `print` in call order
        pub calls: Vec<String>,
        pub results: HashMap<String, Result<Value, EvalError>>,
        /// Written to the output buffer on every evaluation
        pub side_output: HashMap<String, String>,
        output: String,
    }

    impl ScriptedSession {
        pub fn with(mut self, source: &str, result: Result<Value, EvalError>) -> Self {
            self.results.insert(source.to_string(), result);
            self
        }

        pub fn with_output(mut self, source: &str, text: &str) -> Self {
            self.side_output.insert(source.to_string(), text.to_string());
            self
        }
    }

    impl Session for ScriptedSession {
        fn language(&self) -> &str {
            "Scripted"
        }

        fn version(&self) -> &str {
            "0.0"
        }

        fn assign(&mut self, name: &str, value: Value) {
            self.calls.push(format!("assign {}", name));
            self.bindings.insert(name.to_string(), value);
        }

        fn parse_eval(&mut self, source: &str) -> Result<Value, EvalError> {
            self.calls.push(format!("eval {}", source));
            if let Some(text) = self.side_output.get(source) {
                self.output.push_str(text);
            }
            self.results.get(source).cloned().unwrap_or(Ok(Value::Null))
        }

        fn print(&mut self, value: &Value) {
            self.calls.push("print".to_string());
            self.output.push_str(&value.render());
        }

        fn take_output(&mut self) -> String {
            std::mem::take(&mut self.output)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::testing::ScriptedSession;
    use super::*;

    #[test]
    fn handles_share_one_session() {
        let manager = SessionManager::new(ScriptedSession::default());
        let a = manager.handle();
        let b = manager.handle();
        a.borrow_mut().assign("x", Value::from(1.0));
        b.borrow_mut().print(&Value::from(2.0));
        assert_eq!(a.borrow_mut().take_output(), "[1] 2\n");
        assert_eq!(Rc::strong_count(&a), 3);
    }
}
