//! Where diagnostics go. The pipeline in `run` hands every static error and
//! the runtime error (if any) to a `Reporter`; the binary prints them to
//! stderr, tests collect them.

pub trait Reporter {
    /// A scanner or parser error. `location` is e.g. `at 'x'` or `at end`.
    fn static_error(&mut self, line: usize, location: Option<&str>, message: &str);

    fn runtime_error(&mut self, line: Option<usize>, message: &str);
}

pub fn format_static_error(line: usize, location: Option<&str>, message: &str) -> String {
    match location {
        Some(location) => format!("[line {}] Error {}: {}", line, location, message),
        None => format!("[line {}] Error: {}", line, message),
    }
}

pub fn format_runtime_error(line: Option<usize>, message: &str) -> String {
    match line {
        Some(line) => format!("{}\n[line {}]", message, line),
        None => message.to_string(),
    }
}

#[derive(Debug, Default)]
pub struct StderrReporter;

impl Reporter for StderrReporter {
    fn static_error(&mut self, line: usize, location: Option<&str>, message: &str) {
        eprintln!("{}", format_static_error(line, location, message));
    }

    fn runtime_error(&mut self, line: Option<usize>, message: &str) {
        eprintln!("{}", format_runtime_error(line, message));
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Diagnostic {
    Static {
        line: usize,
        location: Option<String>,
        message: String,
    },
    Runtime {
        line: Option<usize>,
        message: String,
    },
}

impl Diagnostic {
    pub fn is_static(&self) -> bool {
        matches!(self, Diagnostic::Static { .. })
    }
}

/// Keeps every diagnostic in arrival order.
#[derive(Debug, Default)]
pub struct Diagnostics {
    pub items: Vec<Diagnostic>,
}

impl Reporter for Diagnostics {
    fn static_error(&mut self, line: usize, location: Option<&str>, message: &str) {
        self.items.push(Diagnostic::Static {
            line,
            location: location.map(str::to_string),
            message: message.to_string(),
        });
    }

    fn runtime_error(&mut self, line: Option<usize>, message: &str) {
        self.items.push(Diagnostic::Runtime {
            line,
            message: message.to_string(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn static_error_format() {
        assert_eq!(
            format_static_error(3, Some("at 'x'"), "Expect ';' after value."),
            "[line 3] Error at 'x': Expect ';' after value."
        );
        assert_eq!(
            format_static_error(1, None, "Unterminated string."),
            "[line 1] Error: Unterminated string."
        );
    }

    #[test]
    fn runtime_error_format() {
        assert_eq!(
            format_runtime_error(Some(2), "Division by zero."),
            "Division by zero.\n[line 2]"
        );
        assert_eq!(format_runtime_error(None, "broken pipe"), "broken pipe");
    }
}
