//! User-facing rendering of engine errors.
//!
//! Engine errors derive `miette::Diagnostic` for their stable code and help
//! text. [`Diagnostic`] collects those plus any extra context (the offending
//! rule positions, the symbol key) into one terminal block:
//!
//! ```text
//! error[vndk_compat::policy::duplicate_rule]: duplicate policy rule id `r1`
//!   = declared at positions 0 and 3 of the rule list
//! help: every rule id must be unique within a policy
//! ```

use std::fmt;

/// A rendered engine error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub message: String,
    /// Stable error code, e.g. `vndk_compat::shim::denied`
    pub code: Option<String>,
    pub context: Vec<String>,
    pub help: Vec<String>,
}

impl Diagnostic {
    pub fn error(message: impl Into<String>) -> Self {
        Diagnostic {
            message: message.into(),
            code: None,
            context: Vec::new(),
            help: Vec::new(),
        }
    }

    /// Start from an error's message, code and help text.
    pub fn from_miette(err: &dyn miette::Diagnostic) -> Self {
        let mut diagnostic = Diagnostic::error(err.to_string());
        diagnostic.code = err.code().map(|code| code.to_string());
        if let Some(help) = err.help() {
            diagnostic.help.push(help.to_string());
        }
        diagnostic
    }

    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context.push(context.into());
        self
    }

    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.help.push(help.into());
        self
    }

    /// Format for terminal output.
    pub fn format(&self, color: bool) -> String {
        let (error, help, reset) = if color {
            ("\x1b[1;31merror", "\x1b[1;32mhelp", "\x1b[0m")
        } else {
            ("error", "help", "")
        };

        let mut output = match &self.code {
            Some(code) => format!("{}[{}]{}: {}\n", error, code, reset, self.message),
            None => format!("{}{}: {}\n", error, reset, self.message),
        };

        for line in &self.context {
            output.push_str(&format!("  = {}\n", line));
        }
        for line in &self.help {
            output.push_str(&format!("{}{}: {}\n", help, reset, line));
        }

        output
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.format(false))
    }
}

/// Print a diagnostic to stderr.
pub fn emit(diagnostic: &Diagnostic, color: bool) {
    eprint!("{}", diagnostic.format(color));
}
