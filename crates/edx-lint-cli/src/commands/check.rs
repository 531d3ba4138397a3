//! Check command implementation.

use edx_lint_core::tamper_evident::TamperEvidentFile;
use std::path::Path;

/// State of a local copy of a written file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CopyStatus {
    /// Present and unmodified.
    Good,
    /// Present but edited since writing.
    Edited,
    /// Not present.
    Missing,
}

/// Inspects the file at `path`.
#[must_use]
pub fn status(path: &Path) -> CopyStatus {
    if !path.exists() {
        CopyStatus::Missing
    } else if TamperEvidentFile::new(path).validate() {
        CopyStatus::Good
    } else {
        CopyStatus::Edited
    }
}

/// Runs the check command. Always succeeds; the verdict is printed.
pub fn run(path: &Path) -> u8 {
    let name = path.display();
    match status(path) {
        CopyStatus::Missing => println!("You don't have a copy of {name}"),
        found => {
            println!("Checking existing copy of {name}");
            if found == CopyStatus::Good {
                println!("Your copy of {name} is good");
            } else {
                println!("Your copy of {name} seems to have been edited");
            }
        }
    }
    0
}
