//! Files that `edx-lint write` knows how to produce.

/// A writable config file and its embedded master copy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KnownFile {
    /// File name as written in the working directory.
    pub name: &'static str,
    /// Informational format tag ("ini", "txt").
    pub format: &'static str,
    /// Comment template; `{}` is replaced by the comment text.
    pub comment: &'static str,
    /// Master contents.
    pub master: &'static str,
}

impl KnownFile {
    /// Renders `text` as a comment line in this file's syntax.
    #[must_use]
    pub fn comment_line(&self, text: &str) -> String {
        self.comment.replacen("{}", text, 1).trim_end().to_string()
    }
}

/// Every file `write` can produce, in listing order.
pub const KNOWN_FILES: &[KnownFile] = &[
    KnownFile {
        name: "pylintrc",
        format: "ini",
        comment: "# {}",
        master: include_str!("../files/pylintrc"),
    },
    KnownFile {
        name: ".editorconfig",
        format: "ini",
        comment: "# {}",
        master: include_str!("../files/editorconfig"),
    },
    KnownFile {
        name: "just_for_testing.txt",
        format: "txt",
        comment: "-- {}",
        master: include_str!("../files/just_for_testing.txt"),
    },
];

/// Looks up a known file by name.
#[must_use]
pub fn find(name: &str) -> Option<&'static KnownFile> {
    KNOWN_FILES.iter().find(|f| f.name == name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finds_known_files() {
        assert_eq!(find("pylintrc").map(|f| f.format), Some("ini"));
        assert_eq!(find("just_for_testing.txt").map(|f| f.comment), Some("-- {}"));
        assert!(find("xyzzy").is_none());
    }

    #[test]
    fn comment_line_trims_empty_text() {
        let file = find(".editorconfig").unwrap();
        assert_eq!(file.comment_line("hello"), "# hello");
        assert_eq!(file.comment_line(""), "#");
    }
}
