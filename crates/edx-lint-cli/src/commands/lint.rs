//! Lint command implementation.

use anyhow::{Context, Result};
use edx_lint_core::{Analyzer, CheckerBox};
use edx_lint_rules::{all_checkers, Preset};
use std::path::{Path, PathBuf};

use crate::config_resolver;
use crate::OutputFormat;

/// Options of the lint command.
#[derive(Debug, Clone)]
pub struct LintArgs {
    /// Directory to analyze.
    pub path: PathBuf,
    /// Output format.
    pub format: OutputFormat,
    /// Comma-separated checker names, message symbols or codes.
    pub checkers: Option<String>,
    /// Preset overriding the configured one.
    pub preset: Option<String>,
    /// Extra exclude patterns.
    pub exclude: Vec<String>,
}

/// Runs the lint command. Returns 1 when a diagnostic reaches the
/// configured failure threshold.
pub fn run(args: LintArgs, config_path: Option<&Path>) -> Result<u8> {
    let source = config_resolver::resolve(&args.path, config_path);
    let config = config_resolver::load(&source)?;

    let checkers = if let Some(filter) = &args.checkers {
        let names: Vec<&str> = filter.split(',').map(str::trim).collect();
        select_checkers(all_checkers(&config)?, &names)
    } else {
        let preset = resolve_preset(args.preset.as_deref().or(config.preset.as_deref()));
        preset.checkers(&config)?
    };

    let threshold = config.fail_threshold();
    let analyzer = Analyzer::builder()
        .root(&args.path)
        .config(config)
        .checkers(checkers)
        .excludes(args.exclude)
        .build()
        .context("Failed to build analyzer")?;

    tracing::info!(
        "Analyzing {:?} with {} checkers",
        args.path,
        analyzer.checker_count()
    );

    let result = analyzer.analyze().context("Analysis failed")?;

    super::output::print(&result, args.format, analyzer.root())?;

    Ok(u8::from(result.reaches(threshold)))
}

fn resolve_preset(name: Option<&str>) -> Preset {
    match name {
        None => Preset::Recommended,
        Some(name) => Preset::from_name(name).unwrap_or_else(|| {
            tracing::warn!("Unknown preset: {}, using recommended", name);
            Preset::Recommended
        }),
    }
}

/// Keeps the checkers named in `names`, matched by checker name or by any
/// of their message symbols or codes.
fn select_checkers(checkers: Vec<CheckerBox>, names: &[&str]) -> Vec<CheckerBox> {
    for name in names {
        let known = checkers.iter().any(|c| matches_name(c, name));
        if !known {
            tracing::warn!("Unknown checker: {}", name);
        }
    }
    checkers
        .into_iter()
        .filter(|c| names.iter().any(|name| matches_name(c, name)))
        .collect()
}

fn matches_name(checker: &CheckerBox, name: &str) -> bool {
    checker.name() == name
        || checker
            .messages()
            .iter()
            .any(|m| m.symbol == name || m.code == name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use edx_lint_core::Config;
    use std::fs;
    use tempfile::TempDir;

    fn selected(names: &[&str]) -> Vec<&'static str> {
        let checkers = all_checkers(&Config::default()).unwrap();
        select_checkers(checkers, names)
            .iter()
            .map(|c| c.name())
            .collect()
    }

    #[test]
    fn select_by_name_symbol_or_code() {
        assert_eq!(selected(&["range-checker"]), vec!["range-checker"]);
        assert_eq!(selected(&["unsafe-yaml-load"]), vec!["yaml-load-checker"]);
        assert_eq!(
            selected(&["E7601", "C7630"]),
            vec!["unit-test-super-checker", "getattr-literal-checker"]
        );
        assert!(selected(&["no-such-checker"]).is_empty());
    }

    #[test]
    fn unknown_preset_falls_back_to_recommended() {
        assert_eq!(resolve_preset(None), Preset::Recommended);
        assert_eq!(resolve_preset(Some("minimal")), Preset::Minimal);
        assert_eq!(resolve_preset(Some("strict")), Preset::Recommended);
    }

    fn lint(dir: &Path, checkers: Option<&str>) -> u8 {
        let args = LintArgs {
            path: dir.to_path_buf(),
            format: OutputFormat::Compact,
            checkers: checkers.map(String::from),
            preset: None,
            exclude: Vec::new(),
        };
        run(args, None).unwrap()
    }

    #[test]
    fn errors_fail_the_run() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("views.py"),
            "from django.utils.translation import gettext as _\n_(name)\n",
        )
        .unwrap();
        assert_eq!(lint(dir.path(), None), 1);
    }

    #[test]
    fn conventions_do_not_fail_the_run() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("loop.py"), "for i in range(0, 10):\n    pass\n").unwrap();
        assert_eq!(lint(dir.path(), Some("range-checker")), 0);
    }

    #[test]
    fn fail_on_threshold_comes_from_config() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("loop.py"), "for i in range(0, 10):\n    pass\n").unwrap();
        fs::write(dir.path().join("edx-lint.toml"), "fail_on = \"info\"\n").unwrap();
        assert_eq!(lint(dir.path(), Some("range-checker")), 1);
    }
}
