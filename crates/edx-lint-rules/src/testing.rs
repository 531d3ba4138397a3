//! Helpers for checker tests.
//!
//! Sources are dedented and run through a single checker. Each message is
//! rendered as `"<line>:<symbol>:<message>"`, where `<line>` is replaced by
//! the marker of a `#=Marker` comment on that line when present.

use edx_lint_core::{Analyzer, Checker, Config};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::{BTreeSet, HashMap};
use std::path::Path;

static MARKER_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"#=(\w+)").unwrap());

/// Drops one leading newline, then removes the common leading whitespace
/// of all non-blank lines.
pub(crate) fn dedent(source: &str) -> String {
    let source = source.strip_prefix('\n').unwrap_or(source);
    let indent = source
        .lines()
        .filter(|l| !l.trim().is_empty())
        .map(|l| l.len() - l.trim_start().len())
        .min()
        .unwrap_or(0);
    let mut out = String::new();
    for line in source.lines() {
        if line.trim().is_empty() {
            out.push('\n');
        } else {
            out.push_str(&line[indent..]);
            out.push('\n');
        }
    }
    out
}

fn find_line_markers(source: &str) -> HashMap<usize, String> {
    source
        .lines()
        .enumerate()
        .filter_map(|(i, line)| MARKER_RE.captures(line).map(|c| (i + 1, c[1].to_string())))
        .collect()
}

/// Runs `checker` over `source` with default configuration.
pub(crate) fn run_checker<C: Checker>(checker: C, source: &str) -> BTreeSet<String> {
    run_checker_with(checker, Config::default(), source)
}

/// Runs `checker` over `source` with `config`.
pub(crate) fn run_checker_with<C: Checker>(
    checker: C,
    config: Config,
    source: &str,
) -> BTreeSet<String> {
    let source = dedent(source);
    let analyzer = Analyzer::builder()
        .root(".")
        .config(config)
        .checker(checker)
        .build()
        .unwrap();
    let diagnostics = analyzer
        .check_source(Path::new("source.py"), source.as_bytes())
        .unwrap();

    let markers = find_line_markers(&source);
    diagnostics
        .into_iter()
        .map(|d| {
            let line = markers
                .get(&d.location.line)
                .cloned()
                .unwrap_or_else(|| d.location.line.to_string());
            format!("{line}:{}:{}", d.symbol, d.message)
        })
        .collect()
}

/// Keeps only the messages for `symbol`.
pub(crate) fn only(messages: BTreeSet<String>, symbol: &str) -> BTreeSet<String> {
    let needle = format!(":{symbol}:");
    messages.into_iter().filter(|m| m.contains(&needle)).collect()
}

/// Builds the expected message set.
pub(crate) fn expected(items: &[&str]) -> BTreeSet<String> {
    items.iter().map(|s| (*s).to_string()).collect()
}

#[test]
fn test_find_line_markers() {
    let markers = find_line_markers("line 1      #=A\nline 2\nline 3      #=Hello\n");
    assert_eq!(markers.len(), 2);
    assert_eq!(markers[&1], "A");
    assert_eq!(markers[&3], "Hello");
}

#[test]
fn test_dedent() {
    assert_eq!(dedent("\n    a\n\n      b\n"), "a\n\n  b\n");
}
