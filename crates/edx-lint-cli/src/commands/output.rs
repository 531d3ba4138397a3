//! Shared output formatting for lint results.

use anyhow::Result;
use edx_lint_core::{DiagnosticReport, LintResult, Severity};
use miette::{NamedSource, Report};
use std::collections::HashMap;
use std::path::Path;

use crate::OutputFormat;

/// Print lint results in the specified format.
///
/// `root` is the analyzed directory; diagnostic paths are relative to it.
pub fn print(result: &LintResult, format: OutputFormat, root: &Path) -> Result<()> {
    match format {
        OutputFormat::Text => print_text(result),
        OutputFormat::Json => return print_json(result),
        OutputFormat::Compact => print_compact(result),
        OutputFormat::Pretty => print_pretty(result, root),
    }
    Ok(())
}

fn print_text(result: &LintResult) {
    for diagnostic in &result.diagnostics {
        let severity_indicator = match diagnostic.severity {
            Severity::Error => "\x1b[31merror\x1b[0m",
            Severity::Warning => "\x1b[33mwarning\x1b[0m",
            Severity::Info => "\x1b[34minfo\x1b[0m",
        };

        println!(
            "{} {} at {}:{}:{}",
            diagnostic.code,
            diagnostic.symbol,
            diagnostic.location.file.display(),
            diagnostic.location.line,
            diagnostic.location.column,
        );
        println!("  {}: {}", severity_indicator, diagnostic.message);
        println!();
    }
    print_summary(result);
}

fn print_summary(result: &LintResult) {
    let (errors, warnings, infos) = result.count_by_severity();
    let summary_color = if errors > 0 {
        "\x1b[31m"
    } else if warnings > 0 {
        "\x1b[33m"
    } else {
        "\x1b[32m"
    };

    println!(
        "{}Found {} error(s), {} warning(s), {} info(s) in {} file(s)\x1b[0m",
        summary_color, errors, warnings, infos, result.files_checked
    );
}

fn print_json(result: &LintResult) -> Result<()> {
    let json = serde_json::to_string_pretty(result)?;
    println!("{json}");
    Ok(())
}

fn print_compact(result: &LintResult) {
    for diagnostic in &result.diagnostics {
        println!("{diagnostic}");
    }
}

/// Renders each diagnostic with its source snippet through miette.
fn print_pretty(result: &LintResult, root: &Path) {
    let mut sources: HashMap<&Path, String> = HashMap::new();
    for diagnostic in &result.diagnostics {
        let file = diagnostic.location.file.as_path();
        let source = sources
            .entry(file)
            .or_insert_with(|| std::fs::read_to_string(root.join(file)).unwrap_or_default())
            .clone();
        let report = Report::new(DiagnosticReport::from(diagnostic))
            .with_source_code(NamedSource::new(file.display().to_string(), source));
        println!("{report:?}");
    }
    print_summary(result);
}
