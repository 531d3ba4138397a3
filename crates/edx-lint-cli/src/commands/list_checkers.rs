//! List checkers command implementation.

use anyhow::Result;
use edx_lint_core::Config;
use edx_lint_rules::all_checkers;

/// Runs the list-checkers command.
pub fn run() -> Result<()> {
    println!("Available checkers:\n");
    println!("{:<8} {:<38} Message", "Code", "Symbol");
    println!("{}", "-".repeat(80));

    for checker in all_checkers(&Config::default())? {
        println!("\n{} - {}", checker.name(), checker.description());
        for message in checker.messages() {
            println!("{:<8} {:<38} {}", message.code, message.symbol, message.template);
        }
    }

    println!("\nPresets:");
    println!("  recommended  - every checker except unittest-assert and module-tracing (default)");
    println!("  all          - every checker");
    println!("  minimal      - unit-test-super, translation-string and yaml-load");

    println!("\nUse --checkers to run specific checkers, e.g.:");
    println!("  edx-lint lint --checkers range-checker,yaml-load-checker");
    println!("  edx-lint lint --checkers E7601,C7657");
    Ok(())
}
