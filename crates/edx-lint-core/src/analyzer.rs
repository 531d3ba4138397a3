//! Core analyzer for orchestrating checker execution.

use crate::annotations::AnnotationIndex;
use crate::checker::{check_unique, register, Checker, CheckerBox, RegistryError};
use crate::config::Config;
use crate::context::{CheckContext, FileContext};
use crate::tree::{ParseError, SourceTree};
use crate::types::{Diagnostic, LintResult};
use crate::utils::pragma::PragmaMap;

use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info, warn};

/// Errors that can occur during analysis.
#[derive(Debug, Error)]
pub enum AnalyzerError {
    /// IO error reading files.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Error parsing a Python source file.
    #[error("Parse error in {path}: {message}")]
    Parse {
        /// Path to the file that failed to parse.
        path: PathBuf,
        /// Parse error message.
        message: String,
    },

    /// Glob pattern error.
    #[error("Invalid glob pattern: {0}")]
    Glob(#[from] glob::PatternError),

    /// File walk error.
    #[error("Failed to walk {0}")]
    Walk(#[from] ignore::Error),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(#[from] crate::config::ConfigError),

    /// Checker registration error.
    #[error(transparent)]
    Registry(#[from] RegistryError),
}

/// Builder for configuring an [`Analyzer`].
#[derive(Default)]
pub struct AnalyzerBuilder {
    root: Option<PathBuf>,
    checkers: Vec<CheckerBox>,
    exclude_patterns: Vec<String>,
    include_patterns: Vec<String>,
    config: Option<Config>,
    fail_on_parse_error: bool,
    registry_error: Option<RegistryError>,
}

impl AnalyzerBuilder {
    /// Creates a new builder with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the root directory to analyze.
    #[must_use]
    pub fn root(mut self, path: impl Into<PathBuf>) -> Self {
        self.root = Some(path.into());
        self
    }

    /// Registers a checker. Registration errors surface from [`build`](Self::build).
    #[must_use]
    pub fn checker<C: Checker>(mut self, checker: C) -> Self {
        match register(checker) {
            Ok(boxed) => self.checkers.push(boxed),
            Err(e) => {
                self.registry_error.get_or_insert(e);
            }
        }
        self
    }

    /// Adds an already registered checker.
    #[must_use]
    pub fn checker_box(mut self, checker: CheckerBox) -> Self {
        self.checkers.push(checker);
        self
    }

    /// Adds several registered checkers.
    #[must_use]
    pub fn checkers(mut self, checkers: impl IntoIterator<Item = CheckerBox>) -> Self {
        self.checkers.extend(checkers);
        self
    }

    /// Adds an exclude glob pattern.
    #[must_use]
    pub fn exclude(mut self, pattern: impl Into<String>) -> Self {
        self.exclude_patterns.push(pattern.into());
        self
    }

    /// Adds multiple exclude glob patterns.
    #[must_use]
    pub fn excludes<I, S>(mut self, patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.exclude_patterns
            .extend(patterns.into_iter().map(Into::into));
        self
    }

    /// Adds an include glob pattern.
    #[must_use]
    pub fn include(mut self, pattern: impl Into<String>) -> Self {
        self.include_patterns.push(pattern.into());
        self
    }

    /// Sets the configuration.
    #[must_use]
    pub fn config(mut self, config: Config) -> Self {
        self.config = Some(config);
        self
    }

    /// Sets whether to fail on parse errors (default: false).
    #[must_use]
    pub fn fail_on_parse_error(mut self, fail: bool) -> Self {
        self.fail_on_parse_error = fail;
        self
    }

    /// Builds the analyzer.
    ///
    /// # Errors
    ///
    /// Returns an error if a checker failed to register, checker names or
    /// messages collide, a glob pattern is invalid, or the working
    /// directory cannot be determined.
    pub fn build(self) -> Result<Analyzer, AnalyzerError> {
        if let Some(error) = self.registry_error {
            return Err(error.into());
        }
        check_unique(&self.checkers)?;

        let root = self
            .root
            .or_else(|| self.config.as_ref().map(|c| c.analyzer.root.clone()))
            .unwrap_or_else(|| PathBuf::from("."));

        let root = if root.is_absolute() {
            root
        } else {
            std::env::current_dir()?.join(&root)
        };

        // Merge patterns from config
        let mut exclude_patterns = self.exclude_patterns;
        let mut include_patterns = self.include_patterns;
        if let Some(ref config) = self.config {
            exclude_patterns.extend(config.analyzer.exclude.clone());
            include_patterns.extend(config.analyzer.include.clone());
        }

        let excludes = compile_patterns(&exclude_patterns)?;
        let includes = compile_patterns(&include_patterns)?;

        Ok(Analyzer {
            root,
            checkers: self.checkers,
            exclude_patterns,
            excludes,
            includes,
            config: self.config.unwrap_or_default(),
            fail_on_parse_error: self.fail_on_parse_error,
        })
    }
}

fn compile_patterns(patterns: &[String]) -> Result<Vec<glob::Pattern>, glob::PatternError> {
    patterns.iter().map(|p| glob::Pattern::new(p)).collect()
}

/// The main analyzer that orchestrates checker execution.
///
/// Use [`Analyzer::builder()`] to construct an instance.
pub struct Analyzer {
    root: PathBuf,
    checkers: Vec<CheckerBox>,
    exclude_patterns: Vec<String>,
    excludes: Vec<glob::Pattern>,
    includes: Vec<glob::Pattern>,
    config: Config,
    fail_on_parse_error: bool,
}

impl Analyzer {
    /// Creates a new builder for configuring an analyzer.
    #[must_use]
    pub fn builder() -> AnalyzerBuilder {
        AnalyzerBuilder::new()
    }

    /// Returns the root directory being analyzed.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Returns the number of registered checkers.
    #[must_use]
    pub fn checker_count(&self) -> usize {
        self.checkers.len()
    }

    /// Returns the registered checkers.
    #[must_use]
    pub fn checkers(&self) -> &[CheckerBox] {
        &self.checkers
    }

    /// Analyzes all files under the root and returns the results.
    ///
    /// # Errors
    ///
    /// Returns an error if file discovery fails, or if a file fails to
    /// parse while `fail_on_parse_error` is set.
    pub fn analyze(&self) -> Result<LintResult, AnalyzerError> {
        info!("Starting analysis at {:?}", self.root);
        let files = self.discover_files()?;
        info!("Found {} files to analyze", files.len());
        self.analyze_paths(&files)
    }

    /// Analyzes the given files.
    ///
    /// # Errors
    ///
    /// Returns an error if a file cannot be read, or fails to parse while
    /// `fail_on_parse_error` is set.
    pub fn analyze_paths(&self, files: &[PathBuf]) -> Result<LintResult, AnalyzerError> {
        let mut result = LintResult::new();

        for file_path in files {
            debug!("Analyzing: {}", file_path.display());
            let source = std::fs::read(file_path)?;
            match self.check_source(file_path, &source) {
                Ok(diagnostics) => {
                    result.diagnostics.extend(diagnostics);
                    result.files_checked += 1;
                }
                Err(AnalyzerError::Parse { path, message }) => {
                    warn!("Failed to parse {}: {}", path.display(), message);
                    if self.fail_on_parse_error {
                        return Err(AnalyzerError::Parse { path, message });
                    }
                }
                Err(e) => return Err(e),
            }
        }

        // Sort diagnostics by file, then line
        result.diagnostics.sort_by(|a, b| {
            a.location
                .file
                .cmp(&b.location.file)
                .then(a.location.line.cmp(&b.location.line))
                .then(a.location.column.cmp(&b.location.column))
                .then(a.code.cmp(&b.code))
        });

        info!(
            "Analysis complete: {} diagnostics in {} files",
            result.diagnostics.len(),
            result.files_checked
        );

        Ok(result)
    }

    /// Runs every enabled checker over one in-memory source file.
    ///
    /// # Errors
    ///
    /// Returns [`AnalyzerError::Parse`] if the source does not parse.
    pub fn check_source(&self, path: &Path, source: &[u8]) -> Result<Vec<Diagnostic>, AnalyzerError> {
        let tree = SourceTree::parse(source).map_err(|e: ParseError| AnalyzerError::Parse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        let annotations = AnnotationIndex::new(tree.text());
        let pragmas = PragmaMap::new(tree.text());
        let file = FileContext::new(path, &tree, &annotations, &self.root);

        let mut diagnostics = Vec::new();
        for checker in &self.checkers {
            if !self.config.is_checker_enabled(checker.name()) {
                debug!("Skipping disabled checker: {}", checker.name());
                continue;
            }

            let mut ctx = CheckContext::new(&file, &self.config, checker.name());
            checker.check_module(&mut ctx);
            let found = ctx
                .into_diagnostics()
                .into_iter()
                .filter(|d| !pragmas.is_disabled(d.location.line, &d.symbol, &d.code))
                .collect();
            diagnostics.extend(self.apply_severity_override(checker.name(), found));
        }

        Ok(diagnostics)
    }

    /// Applies severity overrides from configuration.
    fn apply_severity_override(
        &self,
        checker_name: &str,
        mut diagnostics: Vec<Diagnostic>,
    ) -> Vec<Diagnostic> {
        if let Some(severity) = self.config.checker_severity(checker_name) {
            for d in &mut diagnostics {
                d.severity = severity;
            }
        }
        diagnostics
    }

    /// Discovers all Python source files to analyze.
    fn discover_files(&self) -> Result<Vec<PathBuf>, AnalyzerError> {
        let mut files = Vec::new();
        let walker = ignore::WalkBuilder::new(&self.root)
            .git_ignore(self.config.analyzer.respect_gitignore)
            .git_exclude(self.config.analyzer.respect_gitignore)
            .hidden(false)
            .build();

        for entry in walker {
            let entry = entry?;
            let path = entry.path();
            if !entry.file_type().is_some_and(|t| t.is_file())
                || path.extension().and_then(|e| e.to_str()) != Some("py")
            {
                continue;
            }

            // Check exclude patterns
            if self.should_exclude(path) {
                debug!("Excluding: {}", path.display());
                continue;
            }
            if !self.should_include(path) {
                continue;
            }

            files.push(path.to_path_buf());
        }

        files.sort();
        Ok(files)
    }

    /// Checks if a path should be excluded.
    fn should_exclude(&self, path: &Path) -> bool {
        let path_str = path.to_string_lossy();

        if self.excludes.iter().any(|p| p.matches(&path_str)) {
            return true;
        }

        // Also check as substring for patterns like "**/.tox/**"
        self.exclude_patterns.iter().any(|pattern| {
            let normalized_pattern = pattern.replace("**", "");
            normalized_pattern.len() > 1 && path_str.contains(&normalized_pattern)
        })
    }

    /// Checks include patterns against the path relative to the root.
    fn should_include(&self, path: &Path) -> bool {
        if self.includes.is_empty() {
            return true;
        }
        let relative = path.strip_prefix(&self.root).unwrap_or(path);
        let relative = relative.to_string_lossy();
        self.includes.iter().any(|p| p.matches(&relative))
    }
}
