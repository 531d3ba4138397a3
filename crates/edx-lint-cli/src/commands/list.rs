//! List command implementation.

use crate::metadata::KNOWN_FILES;

/// Runs the list command.
pub fn run() {
    println!("edx-lint knows about these files:");
    for file in KNOWN_FILES {
        println!("  {:<24} ({})", file.name, file.format);
    }
}
