//! User-facing problems found while loading or running rules.
//!
//! Every diagnostic goes to `tracing` and, when the host installed one, to an
//! observer callback. The library keeps no global reporting state.

use std::fmt;

use strum_macros::{AsRefStr, Display};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Display, AsRefStr)]
#[strum(serialize_all = "UPPERCASE")]
pub enum Severity {
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub severity: Severity,
    /// Source line the problem was detected at, when one applies.
    pub line: Option<usize>,
    pub message: String,
}

impl Diagnostic {
    pub fn warning(message: impl Into<String>, line: Option<usize>) -> Self {
        Self {
            severity: Severity::Warning,
            line,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>, line: Option<usize>) -> Self {
        Self {
            severity: Severity::Error,
            line,
            message: message.into(),
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.severity, self.message)
    }
}

pub type Observer = Box<dyn Fn(&Diagnostic)>;

#[derive(Default)]
pub struct Reporter {
    observer: Option<Observer>,
}

impl fmt::Debug for Reporter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Reporter")
            .field("observer", &self.observer.is_some())
            .finish()
    }
}

impl Reporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_observer(observer: impl Fn(&Diagnostic) + 'static) -> Self {
        Self {
            observer: Some(Box::new(observer)),
        }
    }

    pub fn set_observer(&mut self, observer: impl Fn(&Diagnostic) + 'static) {
        self.observer = Some(Box::new(observer));
    }

    pub fn report(&self, diagnostic: Diagnostic) {
        match diagnostic.severity {
            Severity::Warning => tracing::warn!(line = ?diagnostic.line, "{}", diagnostic.message),
            Severity::Error => tracing::error!(line = ?diagnostic.line, "{}", diagnostic.message),
        }
        if let Some(observer) = &self.observer {
            observer(&diagnostic);
        }
    }

    pub fn warning(&self, message: impl Into<String>, line: Option<usize>) {
        self.report(Diagnostic::warning(message, line));
    }

    pub fn error(&self, message: impl Into<String>, line: Option<usize>) {
        self.report(Diagnostic::error(message, line));
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;

    #[test]
    fn test_observer_receives_diagnostics() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        let reporter = Reporter::with_observer(move |d| sink.borrow_mut().push(d.clone()));

        reporter.warning("rule skipped", Some(4));
        reporter.error("boom", None);

        let seen = seen.borrow();
        assert_eq!(seen.len(), 2);
        assert_eq!(seen[0].severity, Severity::Warning);
        assert_eq!(seen[0].line, Some(4));
        assert_eq!(seen[1].to_string(), "ERROR: boom");
    }

    #[test]
    fn test_reporter_without_observer() {
        Reporter::new().error("only traced", Some(1));
    }
}
