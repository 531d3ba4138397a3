//! Matching annotated entity names against the call sites that create them.

use crate::tree::NodeId;

use std::collections::{HashSet, VecDeque};

/// A call that is expected to carry an annotation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallSite {
    /// The call node.
    pub node: NodeId,
    /// First line of the call.
    pub line: usize,
    /// Last line of the call.
    pub end_line: usize,
    /// Column of the call.
    pub column: usize,
    /// Entity name when given as a string literal.
    pub literal_name: Option<String>,
}

/// Result of matching one call site.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MatchOutcome {
    /// The preceding annotation names this entity.
    Matched,
    /// No suitable annotation precedes the call.
    Missing,
    /// The preceding annotation names a different known entity.
    Incorrect {
        /// Name used at the call site.
        found: String,
        /// Name in the consumed annotation.
        annotated: String,
    },
}

/// Pairs annotation groups with call sites in source order.
///
/// Call sites are queued during the walk and resolved together once the
/// module has been visited, so visiting order does not matter.
#[derive(Debug, Clone, Default)]
pub struct AnnotationMatcher {
    groups: VecDeque<(usize, String)>,
    known_names: HashSet<String>,
    sites: Vec<CallSite>,
}

impl AnnotationMatcher {
    /// Creates a matcher over `(line, name)` pairs.
    #[must_use]
    pub fn new(groups: impl IntoIterator<Item = (usize, String)>) -> Self {
        let mut groups: Vec<_> = groups.into_iter().collect();
        groups.sort_by_key(|(line, _)| *line);
        let known_names = groups
            .iter()
            .filter(|(_, name)| !name.is_empty())
            .map(|(_, name)| name.clone())
            .collect();
        Self {
            groups: groups.into(),
            known_names,
            sites: Vec::new(),
        }
    }

    /// Returns true if an annotation documents `name`.
    #[must_use]
    pub fn is_known(&self, name: &str) -> bool {
        self.known_names.contains(name)
    }

    /// Queues a call site.
    pub fn push(&mut self, site: CallSite) {
        self.sites.push(site);
    }

    /// Resolves all queued call sites, consuming annotation groups.
    pub fn resolve(&mut self) -> Vec<(CallSite, MatchOutcome)> {
        let mut sites = std::mem::take(&mut self.sites);
        sites.sort_by_key(|s| (s.line, s.column));

        sites
            .into_iter()
            .map(|site| {
                let outcome = self.match_site(&site);
                (site, outcome)
            })
            .collect()
    }

    fn match_site(&mut self, site: &CallSite) -> MatchOutcome {
        match self.groups.front() {
            Some((line, _)) if *line <= site.end_line => {}
            _ => return MatchOutcome::Missing,
        }
        let Some((_, annotated)) = self.groups.pop_front() else {
            return MatchOutcome::Missing;
        };
        match &site.literal_name {
            None => MatchOutcome::Matched,
            Some(found) if *found == annotated => MatchOutcome::Matched,
            Some(found) if self.known_names.contains(found) => MatchOutcome::Incorrect {
                found: found.clone(),
                annotated,
            },
            Some(_) => MatchOutcome::Missing,
        }
    }
}
