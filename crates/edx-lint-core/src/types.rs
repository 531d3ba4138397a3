//! Core types for checker messages and lint results.

use miette::{Diagnostic as MietteDiagnostic, SourceSpan};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Severity level for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Convention or refactoring hint, does not fail lint.
    Info,
    /// Warning that should be addressed.
    Warning,
    /// Error that must be fixed.
    Error,
}

impl Severity {
    /// Derives the severity from a message code prefix.
    ///
    /// `E` and `F` codes are errors, `W` codes are warnings and anything
    /// else (`C`, `R`, `I`) is informational.
    #[must_use]
    pub fn from_code(code: &str) -> Self {
        match code.chars().next() {
            Some('E' | 'F') => Self::Error,
            Some('W') => Self::Warning,
            _ => Self::Info,
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Info => write!(f, "info"),
            Self::Warning => write!(f, "warning"),
            Self::Error => write!(f, "error"),
        }
    }
}

/// Source code location.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Location {
    /// File path relative to project root.
    pub file: PathBuf,
    /// Line number (1-indexed).
    pub line: usize,
    /// Column number (1-indexed).
    pub column: usize,
    /// Byte offset in file (for miette integration).
    pub offset: usize,
    /// Length of the span in bytes.
    pub length: usize,
}

impl Location {
    /// Creates a new location with explicit values.
    #[must_use]
    pub fn new(file: PathBuf, line: usize, column: usize) -> Self {
        Self {
            file,
            line,
            column,
            offset: 0,
            length: 0,
        }
    }

    /// Sets the byte offset and length for this location.
    #[must_use]
    pub fn with_span(mut self, offset: usize, length: usize) -> Self {
        self.offset = offset;
        self.length = length;
        self
    }
}

/// Static definition of a message a checker can emit.
///
/// Templates use `{}` placeholders which are filled positionally.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MessageDef {
    /// Message code (e.g., "E7601").
    pub code: &'static str,
    /// Symbolic name (e.g., "super-method-not-called").
    pub symbol: &'static str,
    /// Message template.
    pub template: &'static str,
    /// Long description shown by `list-checkers`.
    pub description: &'static str,
}

impl MessageDef {
    /// Creates a message definition.
    #[must_use]
    pub const fn new(
        code: &'static str,
        symbol: &'static str,
        template: &'static str,
        description: &'static str,
    ) -> Self {
        Self {
            code,
            symbol,
            template,
            description,
        }
    }

    /// Severity implied by the code prefix.
    #[must_use]
    pub fn severity(&self) -> Severity {
        Severity::from_code(self.code)
    }

    /// Renders the template with positional arguments.
    ///
    /// Surplus placeholders are left empty, surplus arguments are ignored.
    #[must_use]
    pub fn render(&self, args: &[&str]) -> String {
        let mut out = String::with_capacity(self.template.len());
        let mut args = args.iter();
        let mut rest = self.template;
        while let Some(pos) = rest.find("{}") {
            out.push_str(&rest[..pos]);
            if let Some(arg) = args.next() {
                out.push_str(arg);
            }
            rest = &rest[pos + 2..];
        }
        out.push_str(rest);
        out
    }
}

/// A message emitted by a checker.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Diagnostic {
    /// Message code (e.g., "E7601").
    pub code: String,
    /// Message symbol (e.g., "super-method-not-called").
    pub symbol: String,
    /// Name of the checker that emitted the message.
    pub checker: String,
    /// Severity of this diagnostic.
    pub severity: Severity,
    /// Primary location.
    pub location: Location,
    /// Template arguments, in order.
    pub args: Vec<String>,
    /// Rendered message text.
    pub message: String,
}

impl Diagnostic {
    /// Creates a diagnostic by rendering `def` with `args`.
    #[must_use]
    pub fn new(def: &MessageDef, checker: impl Into<String>, location: Location, args: &[&str]) -> Self {
        Self {
            code: def.code.to_string(),
            symbol: def.symbol.to_string(),
            checker: checker.into(),
            severity: def.severity(),
            location,
            args: args.iter().map(|a| (*a).to_string()).collect(),
            message: def.render(args),
        }
    }

    /// Formats the diagnostic for terminal output.
    #[must_use]
    pub fn format(&self) -> String {
        use std::fmt::Write;
        let mut output = format!(
            "{} {} at {}:{}:{}\n",
            self.code,
            self.symbol,
            self.location.file.display(),
            self.location.line,
            self.location.column,
        );
        let _ = writeln!(output, "  {}: {}", self.severity, self.message);
        output
    }
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}:{}:{}: {} [{}({})] {}",
            self.location.file.display(),
            self.location.line,
            self.location.column,
            self.severity,
            self.code,
            self.symbol,
            self.message
        )
    }
}

/// Converts a [`Diagnostic`] to a miette report for rich error display.
#[derive(Debug, thiserror::Error, MietteDiagnostic)]
#[error("{message}")]
pub struct DiagnosticReport {
    message: String,
    #[label("{label_message}")]
    span: SourceSpan,
    label_message: String,
}

impl From<&Diagnostic> for DiagnosticReport {
    fn from(d: &Diagnostic) -> Self {
        Self {
            message: format!("[{}] {}", d.code, d.message),
            span: SourceSpan::from((d.location.offset, d.location.length)),
            label_message: d.symbol.clone(),
        }
    }
}

/// Result of running lint analysis.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct LintResult {
    /// All diagnostics found.
    pub diagnostics: Vec<Diagnostic>,
    /// Number of files checked.
    pub files_checked: usize,
}

impl LintResult {
    /// Creates a new empty result.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true if there are any errors.
    #[must_use]
    pub fn has_errors(&self) -> bool {
        self.diagnostics
            .iter()
            .any(|d| d.severity == Severity::Error)
    }

    /// Returns true if any diagnostic is at least as severe as `threshold`.
    #[must_use]
    pub fn reaches(&self, threshold: Severity) -> bool {
        self.diagnostics.iter().any(|d| d.severity >= threshold)
    }

    /// Returns diagnostics filtered by severity.
    #[must_use]
    pub fn by_severity(&self, severity: Severity) -> Vec<&Diagnostic> {
        self.diagnostics
            .iter()
            .filter(|d| d.severity == severity)
            .collect()
    }

    /// Returns diagnostics with the given message symbol.
    #[must_use]
    pub fn by_symbol(&self, symbol: &str) -> Vec<&Diagnostic> {
        self.diagnostics
            .iter()
            .filter(|d| d.symbol == symbol)
            .collect()
    }

    /// Counts diagnostics by severity.
    #[must_use]
    pub fn count_by_severity(&self) -> (usize, usize, usize) {
        let count = |s: Severity| self.diagnostics.iter().filter(|d| d.severity == s).count();
        (
            count(Severity::Error),
            count(Severity::Warning),
            count(Severity::Info),
        )
    }

    /// Prints a summary report to stdout.
    pub fn print_report(&self) {
        let (errors, warnings, infos) = self.count_by_severity();

        for diagnostic in &self.diagnostics {
            println!("{}", diagnostic.format());
        }

        println!(
            "\nFound {errors} error(s), {warnings} warning(s), {infos} info(s) in {} file(s)",
            self.files_checked
        );
    }

    /// Checks whether a diagnostic with `symbol` exists at `line` in `file`.
    #[must_use]
    pub fn has_diagnostic_at(&self, file: &str, line: usize, symbol: &str) -> bool {
        self.diagnostics.iter().any(|d| {
            d.location.file.to_string_lossy().ends_with(file)
                && d.location.line == line
                && d.symbol == symbol
        })
    }

    /// Merges another result into this one.
    pub fn extend(&mut self, other: LintResult) {
        self.diagnostics.extend(other.diagnostics);
        self.files_checked += other.files_checked;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: MessageDef = MessageDef::new(
        "E7601",
        "super-method-not-called",
        "super(...).{}() not called ({})",
        "",
    );

    #[test]
    fn test_render_positional() {
        assert_eq!(
            SAMPLE.render(&["setUp", "TestCase"]),
            "super(...).setUp() not called (TestCase)"
        );
    }

    #[test]
    fn test_render_missing_args_leaves_blank() {
        assert_eq!(SAMPLE.render(&["setUp"]), "super(...).setUp() not called ()");
    }

    #[test]
    fn test_severity_from_code() {
        assert_eq!(Severity::from_code("E7601"), Severity::Error);
        assert_eq!(Severity::from_code("W0001"), Severity::Warning);
        assert_eq!(Severity::from_code("C7620"), Severity::Info);
        assert_eq!(Severity::from_code("R0001"), Severity::Info);
    }

    #[test]
    fn test_lint_result_counts() {
        let mut result = LintResult::new();
        assert!(!result.has_errors());

        let loc = Location::new(PathBuf::from("a.py"), 3, 1);
        result
            .diagnostics
            .push(Diagnostic::new(&SAMPLE, "unit-test-super-checker", loc, &["setUp", "X"]));

        assert!(result.has_errors());
        assert_eq!(result.count_by_severity(), (1, 0, 0));
        assert!(result.has_diagnostic_at("a.py", 3, "super-method-not-called"));
        assert_eq!(result.by_symbol("super-method-not-called").len(), 1);
        assert_eq!(result.by_severity(Severity::Error).len(), 1);
        assert!(result.reaches(Severity::Info));
        assert!(result.reaches(Severity::Error));
    }

    #[test]
    fn test_reaches_threshold() {
        const HINT: MessageDef = MessageDef::new("C7620", "simplifiable-range", "{}", "");
        let mut result = LintResult::new();
        let loc = Location::new(PathBuf::from("a.py"), 1, 1);
        result
            .diagnostics
            .push(Diagnostic::new(&HINT, "range-checker", loc, &["range"]));

        assert!(result.reaches(Severity::Info));
        assert!(!result.reaches(Severity::Warning));
        assert!(!result.has_errors());
    }
}
