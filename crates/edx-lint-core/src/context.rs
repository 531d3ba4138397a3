//! Context types for checker execution.

use crate::annotations::AnnotationIndex;
use crate::config::{CheckerConfig, Config};
use crate::tree::{Node, SourceTree};
use crate::types::{Diagnostic, Location, MessageDef};

use std::path::{Path, PathBuf};

/// Per-file data shared by all checkers.
///
/// Contains metadata about the file being analyzed that checkers can use
/// to make context-aware decisions (e.g., qualify class names).
#[derive(Debug, Clone)]
pub struct FileContext<'a> {
    /// Path to the file as discovered.
    pub path: &'a Path,
    /// Parsed syntax tree.
    pub tree: &'a SourceTree,
    /// Comment annotations and raw lines.
    pub annotations: &'a AnnotationIndex,
    /// Whether this file is detected as a test file.
    pub is_test: bool,
    /// Dotted module name (e.g., `lms.djangoapps.courseware.views`).
    pub module_name: String,
    /// Path relative to the project root.
    pub relative_path: PathBuf,
}

impl<'a> FileContext<'a> {
    /// Creates a new file context.
    #[must_use]
    pub fn new(
        path: &'a Path,
        tree: &'a SourceTree,
        annotations: &'a AnnotationIndex,
        root: &Path,
    ) -> Self {
        let is_test = Self::detect_test_file(path);
        let relative_path = path
            .strip_prefix(root)
            .map_or_else(|_| path.to_path_buf(), Path::to_path_buf);
        let module_name = Self::compute_module_name(&relative_path);

        Self {
            path,
            tree,
            annotations,
            is_test,
            module_name,
            relative_path,
        }
    }

    /// Detects if a file is a test file based on path conventions.
    fn detect_test_file(path: &Path) -> bool {
        for component in path.components() {
            if let std::path::Component::Normal(s) = component {
                let s = s.to_string_lossy();
                if s == "tests" || s == "test" {
                    return true;
                }
            }
        }

        if let Some(file_name) = path.file_name().and_then(|n| n.to_str()) {
            if file_name.starts_with("test_")
                || file_name.ends_with("_test.py")
                || file_name.ends_with("_tests.py")
                || file_name == "tests.py"
                || file_name == "conftest.py"
            {
                return true;
            }
        }

        false
    }

    /// Computes the dotted module name from a relative file path.
    fn compute_module_name(relative_path: &Path) -> String {
        let mut parts: Vec<String> = relative_path
            .with_extension("")
            .components()
            .filter_map(|c| {
                if let std::path::Component::Normal(s) = c {
                    s.to_str().map(String::from)
                } else {
                    None
                }
            })
            .collect();

        if parts.last().is_some_and(|last| last == "__init__") {
            parts.pop();
        }

        parts.join(".")
    }

    /// Calculates byte offset for a given line and column.
    ///
    /// # Arguments
    ///
    /// * `line` - 1-indexed line number
    /// * `column` - 1-indexed column number
    ///
    /// # Returns
    ///
    /// Byte offset from the start of the file, or 0 if out of bounds.
    #[must_use]
    pub fn offset_for(&self, line: usize, column: usize) -> usize {
        if line == 0 {
            return 0;
        }

        let mut offset = 0;
        for (i, line_content) in self.tree.text().split_inclusive('\n').enumerate() {
            if i + 1 == line {
                return offset + column.saturating_sub(1);
            }
            offset += line_content.len();
        }

        offset
    }
}

/// Context handed to checker handlers while walking one module.
pub struct CheckContext<'a> {
    file: &'a FileContext<'a>,
    config: &'a Config,
    checker: &'static str,
    diagnostics: Vec<Diagnostic>,
}

impl<'a> CheckContext<'a> {
    /// Creates a context for `checker` over `file`.
    #[must_use]
    pub fn new(file: &'a FileContext<'a>, config: &'a Config, checker: &'static str) -> Self {
        Self {
            file,
            config,
            checker,
            diagnostics: Vec::new(),
        }
    }

    /// File metadata.
    #[must_use]
    pub fn file(&self) -> &'a FileContext<'a> {
        self.file
    }

    /// Syntax tree of the file.
    #[must_use]
    pub fn tree(&self) -> &'a SourceTree {
        self.file.tree
    }

    /// Annotation index of the file.
    #[must_use]
    pub fn annotations(&self) -> &'a AnnotationIndex {
        self.file.annotations
    }

    /// Dotted module name of the file.
    #[must_use]
    pub fn module_name(&self) -> &'a str {
        &self.file.module_name
    }

    /// Options of the running checker.
    #[must_use]
    pub fn checker_config(&self) -> Option<&'a CheckerConfig> {
        self.config.checker(self.checker)
    }

    /// Returns true unless `def` is disabled by configuration.
    #[must_use]
    pub fn is_message_enabled(&self, def: &MessageDef) -> bool {
        self.config.is_message_enabled(def.symbol, def.code)
    }

    /// Emits `def` at `node`.
    pub fn add_message(&mut self, def: &MessageDef, node: Node<'_>, args: &[&str]) {
        if !self.is_message_enabled(def) {
            return;
        }
        let span = node.span();
        let location = Location::new(self.file.relative_path.clone(), span.start_line, span.start_column + 1)
            .with_span(span.start_byte, span.end_byte.saturating_sub(span.start_byte));
        self.diagnostics
            .push(Diagnostic::new(def, self.checker, location, args));
    }

    /// Emits `def` at the start of `line`.
    pub fn add_message_at_line(&mut self, def: &MessageDef, line: usize, args: &[&str]) {
        if !self.is_message_enabled(def) {
            return;
        }
        let offset = self.file.offset_for(line, 1);
        let location = Location::new(self.file.relative_path.clone(), line, 1).with_span(offset, 0);
        self.diagnostics
            .push(Diagnostic::new(def, self.checker, location, args));
    }

    /// Diagnostics emitted so far.
    #[must_use]
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Consumes the context, returning its diagnostics.
    #[must_use]
    pub fn into_diagnostics(self) -> Vec<Diagnostic> {
        self.diagnostics
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_module_name_and_test_detection() {
        let tree = SourceTree::parse_str("x = 1\n").unwrap();
        let index = AnnotationIndex::new(tree.text());
        let root = Path::new("/repo");

        let ctx = FileContext::new(Path::new("/repo/lms/djangoapps/views.py"), &tree, &index, root);
        assert_eq!(ctx.module_name, "lms.djangoapps.views");
        assert!(!ctx.is_test);

        let ctx = FileContext::new(Path::new("/repo/common/__init__.py"), &tree, &index, root);
        assert_eq!(ctx.module_name, "common");

        let ctx = FileContext::new(Path::new("/repo/app/tests/test_views.py"), &tree, &index, root);
        assert!(ctx.is_test);
        assert_eq!(ctx.relative_path, PathBuf::from("app/tests/test_views.py"));
    }

    #[test]
    fn test_offset_for() {
        let tree = SourceTree::parse_str("a = 1\nbb = 2\n").unwrap();
        let index = AnnotationIndex::new(tree.text());
        let ctx = FileContext::new(Path::new("m.py"), &tree, &index, Path::new("."));
        assert_eq!(ctx.offset_for(1, 1), 0);
        assert_eq!(ctx.offset_for(2, 1), 6);
        assert_eq!(ctx.offset_for(2, 3), 8);
    }

    #[test]
    fn test_disabled_message_is_dropped() {
        const MSG: MessageDef = MessageDef::new("C9999", "some-message", "hi", "");
        let tree = SourceTree::parse_str("x = 1\n").unwrap();
        let index = AnnotationIndex::new(tree.text());
        let file = FileContext::new(Path::new("m.py"), &tree, &index, Path::new("."));
        let mut config = Config::default();
        config.messages.disable.push("some-message".to_string());

        let mut ctx = CheckContext::new(&file, &config, "test");
        ctx.add_message_at_line(&MSG, 1, &[]);
        assert!(ctx.diagnostics().is_empty());
    }
}
