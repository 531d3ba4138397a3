//! Files that carry a SHA-1 of their own content on the last line.
//!
//! The last line is produced from a hashline template such as `# {}`,
//! where `{}` is replaced by the lowercase hex digest of everything
//! before that line. Editing any byte invalidates the file.

use once_cell::sync::Lazy;
use regex::bytes::Regex;
use sha1::{Digest, Sha1};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

/// Hashline used when none is given.
pub const DEFAULT_HASHLINE: &str = "# {}";

#[allow(clippy::expect_used)]
static DIGEST_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[0-9a-f]{40}").expect("digest regex is valid"));

/// Errors from tamper-evident file I/O.
#[derive(Debug, Error)]
pub enum TamperError {
    /// Reading the file failed.
    #[error("failed to read {path}: {source}")]
    Read {
        /// File path.
        path: PathBuf,
        /// Underlying IO error.
        source: std::io::Error,
    },

    /// Writing the file failed.
    #[error("failed to write {path}: {source}")]
    Write {
        /// File path.
        path: PathBuf,
        /// Underlying IO error.
        source: std::io::Error,
    },
}

/// A file whose last line certifies the rest of its content.
#[derive(Debug, Clone)]
pub struct TamperEvidentFile {
    path: PathBuf,
}

impl TamperEvidentFile {
    /// Wraps a path. Nothing is read or written.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Path of the file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Writes `text` followed by its hashline.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    pub fn write(&self, text: &str, hashline: &str) -> Result<(), TamperError> {
        let content = render(text, hashline);
        fs::write(&self.path, content).map_err(|source| TamperError::Write {
            path: self.path.clone(),
            source,
        })?;
        debug!("Wrote tamper-evident file {}", self.path.display());
        Ok(())
    }

    /// Returns true if the file exists and is unmodified.
    #[must_use]
    pub fn validate(&self) -> bool {
        self.validate_checked().unwrap_or(false)
    }

    /// Like [`validate`](Self::validate), surfacing read errors.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read.
    pub fn validate_checked(&self) -> Result<bool, TamperError> {
        let bytes = fs::read(&self.path).map_err(|source| TamperError::Read {
            path: self.path.clone(),
            source,
        })?;
        Ok(verify(&bytes))
    }
}

/// Builds the certified content for `text`.
///
/// A newline is appended to `text` if it does not already end with one.
#[must_use]
pub fn render(text: &str, hashline: &str) -> String {
    let mut body = text.to_string();
    if !body.ends_with('\n') {
        body.push('\n');
    }
    let digest = sha1_hex(body.as_bytes());
    let mut content = body;
    content.push_str(&hashline.replacen("{}", &digest, 1));
    content.push('\n');
    content
}

/// Checks certified content.
///
/// The last line is everything after the final newline that precedes the
/// last byte. It must contain the digest of everything before it.
#[must_use]
pub fn verify(bytes: &[u8]) -> bool {
    let Some((_, head)) = bytes.split_last() else {
        return false;
    };
    let Some(split) = head.iter().rposition(|&b| b == b'\n') else {
        return false;
    };
    let (body, last_line) = bytes.split_at(split + 1);
    let Some(found) = DIGEST_RE.find(last_line) else {
        return false;
    };
    found.as_bytes() == sha1_hex(body).as_bytes()
}

fn sha1_hex(bytes: &[u8]) -> String {
    hex::encode(Sha1::digest(bytes))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_render_known_digests() {
        assert_eq!(
            render("Hello!", DEFAULT_HASHLINE),
            "Hello!\n# a8d191538209e335154750d2df575b9ddfb16fc7\n"
        );
        assert_eq!(
            render("Hello?\n", DEFAULT_HASHLINE),
            "Hello?\n# 4820175d44ef1a2c92e52bd1b3b7f05020d66e1c\n"
        );
        assert_eq!(
            render("Hello!", "XXX {} YYY"),
            "Hello!\nXXX a8d191538209e335154750d2df575b9ddfb16fc7 YYY\n"
        );
    }

    #[test]
    fn test_blank_trailing_lines_are_kept() {
        let content = render("Hello!\n\n", DEFAULT_HASHLINE);
        assert!(content.starts_with("Hello!\n\n# "));
        assert!(verify(content.as_bytes()));
    }

    #[test]
    fn test_write_then_validate() {
        let dir = TempDir::new().unwrap();
        let file = TamperEvidentFile::new(dir.path().join("test.txt"));
        file.write("Line 1\nLine 2\nLine 3\n", DEFAULT_HASHLINE).unwrap();
        assert!(file.validate());

        let first = fs::read(file.path()).unwrap();
        file.write("Line 1\nLine 2\nLine 3\n", DEFAULT_HASHLINE).unwrap();
        assert_eq!(fs::read(file.path()).unwrap(), first);
    }

    #[test]
    fn test_appending_breaks_validation() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("test.txt");
        let file = TamperEvidentFile::new(&path);
        file.write("Hello!", DEFAULT_HASHLINE).unwrap();
        let mut content = fs::read(&path).unwrap();
        content.extend_from_slice(b"tamper\n");
        fs::write(&path, content).unwrap();
        assert!(!file.validate());
    }

    #[test]
    fn test_editing_breaks_validation() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("test.txt");
        let file = TamperEvidentFile::new(&path);
        file.write("Hello!", DEFAULT_HASHLINE).unwrap();
        let mut content = fs::read(&path).unwrap();
        content[0] = b'J';
        fs::write(&path, content).unwrap();
        assert!(!file.validate());
    }

    #[test]
    fn test_single_line_file_is_invalid() {
        assert!(!verify(b"tamper"));
        assert!(!verify(b""));
        assert!(!verify(b"\n"));
    }

    #[test]
    fn test_missing_file() {
        let dir = TempDir::new().unwrap();
        let file = TamperEvidentFile::new(dir.path().join("absent.txt"));
        assert!(!file.validate());
        assert!(matches!(
            file.validate_checked(),
            Err(TamperError::Read { .. })
        ));
    }
}
