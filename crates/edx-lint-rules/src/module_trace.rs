//! Checker that records every module it visits.
//!
//! Useful when diagnosing files silently skipped by a lint run. Each
//! visited path is appended, one per line, to the file named by the
//! `record_files` option. Without it the checker does nothing.
//!
//! # Configuration
//!
//! ```toml
//! [checkers.module-tracing-checker]
//! record_files = "pylinted_files.txt"
//! ```

use edx_lint_core::{CheckContext, Checker, CheckerConfig, MessageDef, Node, Visitors};
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::warn;

/// Checker name.
pub const NAME: &str = "module-tracing-checker";

/// Appends visited module paths to a file.
#[derive(Debug, Clone, Default)]
pub struct ModuleTracingChecker {
    record_files: Option<PathBuf>,
}

impl ModuleTracingChecker {
    /// Creates a checker that records nothing.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records visited modules to `path`.
    #[must_use]
    pub fn record_files(mut self, path: impl Into<PathBuf>) -> Self {
        self.record_files = Some(path.into());
        self
    }

    /// Creates a checker from configuration options.
    #[must_use]
    pub fn from_config(config: Option<&CheckerConfig>) -> Self {
        match config.and_then(|c| c.get_option::<String>("record_files")) {
            Some(path) if !path.is_empty() => Self::new().record_files(path),
            _ => Self::new(),
        }
    }

    fn visit_module(&self, _: &mut (), ctx: &mut CheckContext<'_>, _node: Node<'_>) {
        let Some(record) = &self.record_files else {
            return;
        };
        let visited = ctx.file().path;
        if let Err(e) = append_line(record, visited) {
            warn!("Failed to record {} in {}: {}", visited.display(), record.display(), e);
        }
    }
}

fn append_line(record: &Path, visited: &Path) -> std::io::Result<()> {
    let mut file = OpenOptions::new().create(true).append(true).open(record)?;
    writeln!(file, "{}", visited.display())
}

impl Checker for ModuleTracingChecker {
    type State = ();

    fn name(&self) -> &'static str {
        NAME
    }

    fn description(&self) -> &'static str {
        "Records the path of every visited module"
    }

    fn messages(&self) -> &'static [MessageDef] {
        &[]
    }

    fn register(&self, visitors: &mut Visitors<Self>) {
        visitors.visit("module", Self::visit_module);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::run_checker;

    #[test]
    fn test_records_visited_modules() {
        let dir = tempfile::tempdir().unwrap();
        let record = dir.path().join("pylinted_files.txt");
        let checker = ModuleTracingChecker::new().record_files(&record);

        assert!(run_checker(checker.clone(), "x = 1\n").is_empty());
        assert!(run_checker(checker, "y = 2\n").is_empty());

        let content = std::fs::read_to_string(&record).unwrap();
        assert_eq!(content, "source.py\nsource.py\n");
    }

    #[test]
    fn test_path_from_config() {
        let config = edx_lint_core::Config::parse(
            r#"
[checkers.module-tracing-checker]
record_files = "pylinted_files.txt"
"#,
        )
        .unwrap();
        let checker = ModuleTracingChecker::from_config(config.checker(NAME));
        assert_eq!(checker.record_files, Some(PathBuf::from("pylinted_files.txt")));

        let empty = edx_lint_core::Config::parse(
            r#"
[checkers.module-tracing-checker]
record_files = ""
"#,
        )
        .unwrap();
        assert!(ModuleTracingChecker::from_config(empty.checker(NAME)).record_files.is_none());
    }

    #[test]
    fn test_noop_without_path() {
        let checker = ModuleTracingChecker::from_config(None);
        assert!(checker.record_files.is_none());
        assert!(run_checker(checker, "x = 1\n").is_empty());
    }
}
