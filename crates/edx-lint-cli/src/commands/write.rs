//! Write command implementation.
//!
//! Produces a known config file from its embedded master as a
//! tamper-evident file. An existing copy that was edited since it was
//! written is renamed to `<stem>_backup<.ext>` first, replacing any older
//! backup.

use anyhow::{Context, Result};
use edx_lint_core::tamper_evident::TamperEvidentFile;
use std::fs;
use std::path::Path;

use crate::metadata::{self, KnownFile};

/// Exit status for a file name that is not known.
pub const UNKNOWN_FILE: u8 = 2;

const WARNING_HEADER: &str = "\
***************************
** DO NOT EDIT THIS FILE **
***************************

This file was generated by edx-lint: https://github.com/openedx/edx-lint

To change it, edit the master copy in the edx-lint repo, release a new
version, and then run:

    $ edx-lint write {}

STAY AWAY FROM THIS FILE!";

/// Runs the write command in the current directory.
pub fn run(filename: &str) -> Result<u8> {
    run_in(Path::new("."), filename)
}

/// Runs the write command, placing the file in `dir`.
pub fn run_in(dir: &Path, filename: &str) -> Result<u8> {
    let Some(known) = metadata::find(filename) else {
        println!("Don't have file {filename:?} to write.");
        return Ok(UNKNOWN_FILE);
    };

    let target = dir.join(known.name);
    if target.exists() {
        println!("Checking existing copy of {}", known.name);
        if !TamperEvidentFile::new(&target).validate() {
            backup(dir, known.name)?;
        }
    }

    println!("Writing {}", known.name);
    TamperEvidentFile::new(&target)
        .write(&render(known), known.comment)
        .with_context(|| format!("Failed to write {}", target.display()))?;
    Ok(0)
}

fn backup(dir: &Path, name: &str) -> Result<()> {
    let backup_name = backup_name(name);
    let backup = dir.join(&backup_name);
    println!("Your copy of {name} seems to have been edited, renaming it to {backup_name}");
    if backup.exists() {
        println!("A previous {backup_name} exists, deleting it");
        fs::remove_file(&backup)
            .with_context(|| format!("Failed to remove {}", backup.display()))?;
    }
    fs::rename(dir.join(name), &backup)
        .with_context(|| format!("Failed to rename {name} to {backup_name}"))
}

/// Inserts `_backup` before the extension: `a.txt` becomes `a_backup.txt`.
fn backup_name(name: &str) -> String {
    match name.rfind('.') {
        Some(dot) if dot > 0 => format!("{}_backup{}", &name[..dot], &name[dot..]),
        _ => format!("{name}_backup"),
    }
}

/// Header and master text, before the hashline.
fn render(known: &KnownFile) -> String {
    let header = WARNING_HEADER.replace("{}", known.name);
    let mut text: String = header
        .lines()
        .map(|line| known.comment_line(line) + "\n")
        .collect();
    text.push('\n');
    text.push_str(known.master);
    text
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn read(dir: &Path, name: &str) -> String {
        fs::read_to_string(dir.join(name)).unwrap()
    }

    fn append(dir: &Path, name: &str, text: &str) {
        let mut content = read(dir, name);
        content.push_str(text);
        fs::write(dir.join(name), content).unwrap();
    }

    #[test]
    fn unknown_file_is_rejected() {
        let dir = TempDir::new().unwrap();
        assert_eq!(run_in(dir.path(), "xyzzy").unwrap(), UNKNOWN_FILE);
        assert!(!dir.path().join("xyzzy").exists());
    }

    #[test]
    fn write_creates_valid_pylintrc() {
        let dir = TempDir::new().unwrap();
        assert_eq!(run_in(dir.path(), "pylintrc").unwrap(), 0);

        let path = dir.path().join("pylintrc");
        assert!(TamperEvidentFile::new(&path).validate());
        let text = read(dir.path(), "pylintrc");
        assert!(text.starts_with("# ***************************\n# ** DO NOT EDIT THIS FILE **\n"));
        assert!(text.contains("#     $ edx-lint write pylintrc\n"));
        assert!(text.contains("load-plugins = edx_lint.pylint"));

        // Writing again over an unedited copy keeps no backup.
        assert_eq!(run_in(dir.path(), "pylintrc").unwrap(), 0);
        assert!(!dir.path().join("pylintrc_backup").exists());
    }

    #[test]
    fn write_backs_up_modified_file() {
        let dir = TempDir::new().unwrap();
        run_in(dir.path(), "pylintrc").unwrap();
        append(dir.path(), "pylintrc", "# modified!\n");

        assert_eq!(run_in(dir.path(), "pylintrc").unwrap(), 0);
        assert!(read(dir.path(), "pylintrc_backup").contains("# modified!"));
        assert!(!read(dir.path(), "pylintrc").contains("# modified!"));

        // A newer edit replaces the previous backup.
        append(dir.path(), "pylintrc", "# changed!\n");
        assert_eq!(run_in(dir.path(), "pylintrc").unwrap(), 0);
        let backup = read(dir.path(), "pylintrc_backup");
        assert!(backup.contains("# changed!"));
        assert!(!backup.contains("# modified!"));
    }

    #[test]
    fn write_uses_file_comment_syntax() {
        let dir = TempDir::new().unwrap();
        run_in(dir.path(), "just_for_testing.txt").unwrap();

        let text = read(dir.path(), "just_for_testing.txt");
        assert!(text.starts_with("-- ***************************\n"));
        let last = text.lines().last().unwrap();
        assert!(last.starts_with("-- "));
        assert_eq!(last.len(), 3 + 40);

        append(dir.path(), "just_for_testing.txt", "edited\n");
        run_in(dir.path(), "just_for_testing.txt").unwrap();
        assert!(dir.path().join("just_for_testing_backup.txt").exists());
    }

    #[test]
    fn backup_names() {
        assert_eq!(backup_name("pylintrc"), "pylintrc_backup");
        assert_eq!(backup_name(".editorconfig"), ".editorconfig_backup");
        assert_eq!(backup_name("just_for_testing.txt"), "just_for_testing_backup.txt");
    }
}
