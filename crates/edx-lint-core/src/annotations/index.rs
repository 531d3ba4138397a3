//! Line index and `.. token:` comment groups for one source file.

use once_cell::sync::Lazy;
use regex::Regex;

#[allow(clippy::expect_used)]
static TOKEN_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*#\s*\.\.\s*([A-Za-z0-9_]+)\s*:\s?(.*)$").expect("token regex is valid")
});

/// One `.. token: value` entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnnotationEntry {
    /// Normalized token, e.g. `.. toggle_name:`.
    pub token: String,
    /// Trimmed value, including continuation lines.
    pub value: String,
    /// 1-indexed line of the token.
    pub line: usize,
}

/// Contiguous comment block holding at least one token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnnotationGroup {
    /// Line of the first token.
    pub line: usize,
    /// Entries in source order. Duplicate tokens are kept.
    pub entries: Vec<AnnotationEntry>,
}

impl AnnotationGroup {
    /// Value of the first entry for `token`.
    #[must_use]
    pub fn get(&self, token: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|e| e.token == token)
            .map(|e| e.value.as_str())
    }

    /// Returns true if `token` appears in the group.
    #[must_use]
    pub fn contains(&self, token: &str) -> bool {
        self.entries.iter().any(|e| e.token == token)
    }

    /// Tokens that occur more than once, each reported once, in order of
    /// their second occurrence.
    #[must_use]
    pub fn duplicates(&self) -> Vec<&str> {
        let mut seen: Vec<&str> = Vec::new();
        let mut dups: Vec<&str> = Vec::new();
        for entry in &self.entries {
            let token = entry.token.as_str();
            if seen.contains(&token) {
                if !dups.contains(&token) {
                    dups.push(token);
                }
            } else {
                seen.push(token);
            }
        }
        dups
    }

    /// Keeps only entries accepted by `keep`. Returns `None` if nothing
    /// remains. The group line moves to the first retained entry.
    #[must_use]
    pub fn restrict(&self, keep: impl Fn(&str) -> bool) -> Option<AnnotationGroup> {
        let entries: Vec<_> = self
            .entries
            .iter()
            .filter(|e| keep(&e.token))
            .cloned()
            .collect();
        let line = entries.first()?.line;
        Some(AnnotationGroup { line, entries })
    }
}

/// Per-file lookup of raw lines and annotation groups.
#[derive(Debug, Clone, Default)]
pub struct AnnotationIndex {
    lines: Vec<String>,
    groups: Vec<AnnotationGroup>,
}

impl AnnotationIndex {
    /// Indexes decoded source text.
    #[must_use]
    pub fn new(text: &str) -> Self {
        let lines: Vec<String> = text.lines().map(str::to_string).collect();
        let groups = collect_groups(&lines);
        Self { lines, groups }
    }

    /// Text of a 1-indexed line.
    #[must_use]
    pub fn line(&self, line: usize) -> Option<&str> {
        line.checked_sub(1)
            .and_then(|i| self.lines.get(i))
            .map(String::as_str)
    }

    /// Returns true if `line` exists and matches `marker`.
    #[must_use]
    pub fn is_line_annotated(&self, line: usize, marker: &Regex) -> bool {
        self.line(line).is_some_and(|text| marker.is_match(text))
    }

    /// All annotation groups in source order.
    #[must_use]
    pub fn groups(&self) -> &[AnnotationGroup] {
        &self.groups
    }
}

/// Groups break only on contiguity. A token repeated inside one block stays
/// in that block's group and is reported through [`AnnotationGroup::duplicates`].
fn collect_groups(lines: &[String]) -> Vec<AnnotationGroup> {
    let mut groups = Vec::new();
    let mut current: Option<AnnotationGroup> = None;

    for (i, text) in lines.iter().enumerate() {
        let trimmed = text.trim_start();
        if !trimmed.starts_with('#') {
            groups.extend(current.take());
            continue;
        }
        if let Some(caps) = TOKEN_RE.captures(text) {
            let entry = AnnotationEntry {
                token: format!(".. {}:", &caps[1]),
                value: caps[2].trim().to_string(),
                line: i + 1,
            };
            current
                .get_or_insert_with(|| AnnotationGroup {
                    line: i + 1,
                    entries: Vec::new(),
                })
                .entries
                .push(entry);
        } else if let Some(last) = current.as_mut().and_then(|g| g.entries.last_mut()) {
            let more = trimmed.trim_start_matches('#').trim();
            if !more.is_empty() {
                if !last.value.is_empty() {
                    last.value.push(' ');
                }
                last.value.push_str(more);
            }
        }
    }
    groups.extend(current);
    groups
}

#[cfg(test)]
mod tests {
    use super::*;

    const SOURCE: &str = "\
# plain comment
# .. toggle_name: FOO
# .. toggle_description: Does
#   foo things.
x = 1
# .. setting_name: BAR
# .. setting_name: BAZ

y = 2
";

    #[test]
    fn test_groups_split_on_code() {
        let index = AnnotationIndex::new(SOURCE);
        let groups = index.groups();
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].line, 2);
        assert_eq!(groups[0].get(".. toggle_name:"), Some("FOO"));
        assert_eq!(
            groups[0].get(".. toggle_description:"),
            Some("Does foo things.")
        );
        assert_eq!(groups[1].line, 6);
    }

    #[test]
    fn test_duplicates_first_wins() {
        let index = AnnotationIndex::new(SOURCE);
        assert_eq!(index.groups().len(), 2);
        let group = &index.groups()[1];
        assert_eq!(group.get(".. setting_name:"), Some("BAR"));
        assert_eq!(group.duplicates(), vec![".. setting_name:"]);
    }

    #[test]
    fn test_is_line_annotated_out_of_range() {
        let index = AnnotationIndex::new(SOURCE);
        let marker = Regex::new(r"#\s*\.\.\s*toggle").unwrap();
        assert!(index.is_line_annotated(2, &marker));
        assert!(!index.is_line_annotated(1, &marker));
        assert!(!index.is_line_annotated(0, &marker));
        assert!(!index.is_line_annotated(500, &marker));
    }

    #[test]
    fn test_restrict_moves_line() {
        let index = AnnotationIndex::new("# .. a: 1\n# .. b: 2\n");
        let group = &index.groups()[0];
        let only_b = group.restrict(|t| t == ".. b:").unwrap();
        assert_eq!(only_b.line, 2);
        assert!(group.restrict(|_| false).is_none());
    }

    #[test]
    fn test_empty_value_token() {
        let index = AnnotationIndex::new("# .. toggle_name:\nx = 1\n");
        assert_eq!(index.groups()[0].get(".. toggle_name:"), Some(""));
    }
}
