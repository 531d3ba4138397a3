//! Comment pragmas that suppress messages.
//!
//! Supports directives like:
//! ```text
//! x = getattr(obj, "name")  # pylint: disable=literal-used-as-attribute
//! # edx-lint: disable=simplifiable-range, wrong-assert-type
//! ```
//!
//! A pragma trailing code applies to that line only. A pragma on a line
//! of its own applies from that line to the end of the enclosing block,
//! i.e. until indentation drops below the pragma's indentation.

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::{HashMap, HashSet};

#[allow(clippy::expect_used)]
static DISABLE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"#\s*(?:pylint|edx-lint)\s*:\s*disable\s*=\s*([A-Za-z0-9_\-,\s]+)")
        .expect("pragma regex is valid")
});

/// Where a pragma applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PragmaScope {
    /// Trailing comment: the same line only.
    Line,
    /// Standalone comment: the rest of the enclosing block.
    Block,
}

/// Parsed disable pragma.
#[derive(Debug, Clone)]
pub struct DisableDirective {
    /// Disabled message symbols or codes.
    pub messages: HashSet<String>,
    /// Extent of the directive.
    pub scope: PragmaScope,
}

impl DisableDirective {
    /// Returns true if the directive covers `symbol` or `code`.
    #[must_use]
    pub fn covers(&self, symbol: &str, code: &str) -> bool {
        self.messages.contains(symbol) || self.messages.contains(code) || self.messages.contains("all")
    }
}

/// Parses a disable pragma from a source line.
#[must_use]
pub fn parse_disable_directive(line: &str) -> Option<DisableDirective> {
    let caps = DISABLE_RE.captures(line)?;
    let messages: HashSet<String> = caps[1]
        .split(',')
        .filter_map(|s| s.split_whitespace().next())
        .map(String::from)
        .collect();

    if messages.is_empty() {
        return None;
    }

    let scope = if line.trim_start().starts_with('#') {
        PragmaScope::Block
    } else {
        PragmaScope::Line
    };
    Some(DisableDirective { messages, scope })
}

#[derive(Debug, Clone)]
struct BlockDisable {
    start: usize,
    end: usize,
    directive: DisableDirective,
}

/// All disable pragmas of one file, indexed by line.
#[derive(Debug, Clone, Default)]
pub struct PragmaMap {
    lines: HashMap<usize, DisableDirective>,
    blocks: Vec<BlockDisable>,
}

impl PragmaMap {
    /// Scans `content` for pragmas.
    #[must_use]
    pub fn new(content: &str) -> Self {
        let lines: Vec<&str> = content.lines().collect();
        let mut map = Self::default();

        for (i, line) in lines.iter().enumerate() {
            let Some(directive) = parse_disable_directive(line) else {
                continue;
            };
            let line_no = i + 1;
            match directive.scope {
                PragmaScope::Line => {
                    map.lines.insert(line_no, directive);
                }
                PragmaScope::Block => {
                    let indent = indentation(line);
                    let end = lines[i + 1..]
                        .iter()
                        .position(|l| !l.trim().is_empty() && indentation(l) < indent)
                        .map_or(lines.len(), |offset| i + 1 + offset);
                    map.blocks.push(BlockDisable {
                        start: line_no,
                        end,
                        directive,
                    });
                }
            }
        }
        map
    }

    /// Returns true if a message is disabled at `line`.
    #[must_use]
    pub fn is_disabled(&self, line: usize, symbol: &str, code: &str) -> bool {
        if self
            .lines
            .get(&line)
            .is_some_and(|d| d.covers(symbol, code))
        {
            return true;
        }
        self.blocks
            .iter()
            .any(|b| b.start <= line && line <= b.end && b.directive.covers(symbol, code))
    }

    /// Returns true if the file has no pragmas.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty() && self.blocks.is_empty()
    }
}

fn indentation(line: &str) -> usize {
    line.len() - line.trim_start().len()
}
