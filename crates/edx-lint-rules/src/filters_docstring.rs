//! Checker for the docstring layout of Open edX filters.
//!
//! A subclass of `OpenEdxPublicFilter` documents itself with three sections:
//!
//! ```text
//! Description:
//!     Filter used to modify the certificate rendering process.
//!
//! Filter Type:
//!     org.openedx.learning.certificate.render.started.v1
//!
//! Trigger:
//!     - Repository: openedx/edx-platform
//!     - Path: lms/djangoapps/certificates/views/webview.py
//!     - Function or Method: render_html_view
//! ```
//!
//! `Trigger: NA` is accepted for filters without a trigger.

use edx_lint_core::{CheckContext, Checker, MessageDef, Node, Visitors};
use once_cell::sync::Lazy;
use regex::Regex;

/// Checker name.
pub const NAME: &str = "docstring-format-checker";

/// Description section missing.
pub const FILTER_DOCSTRING_MISSING_DESCRIPTION: MessageDef = MessageDef::new(
    "E7690",
    "filter-docstring-missing-description",
    "Filter's ({}) docstring is missing the required description section",
    "filters docstring is missing the required description section",
);

/// Filter type section missing.
pub const FILTER_DOCSTRING_MISSING_TYPE: MessageDef = MessageDef::new(
    "E7691",
    "filter-docstring-missing-type",
    "Filter's ({}) docstring is missing the required filter type section",
    "filters docstring is missing the required filter type section",
);

/// Trigger section missing.
pub const FILTER_DOCSTRING_MISSING_TRIGGER: MessageDef = MessageDef::new(
    "E7692",
    "filter-docstring-missing-trigger",
    "Filter's ({}) docstring is missing the required trigger section",
    "filters docstring is missing the required trigger section",
);

const PUBLIC_FILTER: &str = "openedx_filters.tooling.OpenEdxPublicFilter";

#[allow(clippy::expect_used)]
static SECTIONS: Lazy<[(Regex, &'static MessageDef); 3]> = Lazy::new(|| {
    let section = |pattern: &str| Regex::new(pattern).expect("section regex is valid");
    [
        (section(r"(?m)Description:\s*.*\n"), &FILTER_DOCSTRING_MISSING_DESCRIPTION),
        (section(r"(?m)Filter Type:\s*.*\n"), &FILTER_DOCSTRING_MISSING_TYPE),
        (
            section(
                r"(?m)Trigger:\s*(NA|-\s*Repository:\s*[^\n]+\s*-\s*Path:\s*[^\n]+\s*-\s*Function\s*or\s*Method:\s*[^\n]+)",
            ),
            &FILTER_DOCSTRING_MISSING_TRIGGER,
        ),
    ]
});

/// Checks filter docstrings for the required sections.
#[derive(Debug, Clone, Copy, Default)]
pub struct FiltersDocstringFormatChecker;

impl FiltersDocstringFormatChecker {
    /// Creates the checker.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    fn visit_classdef(&self, _: &mut (), ctx: &mut CheckContext<'_>, node: Node<'_>) {
        let tree = ctx.tree();
        let Some(class) = tree.class_of(node) else {
            return;
        };
        if !tree.is_subtype_of(class, PUBLIC_FILTER) {
            return;
        }

        let docstring = node.docstring().unwrap_or_default();
        let name = node.name().unwrap_or_default();
        for def in missing_sections(docstring) {
            ctx.add_message(def, node, &[name]);
        }
    }
}

fn missing_sections(docstring: &str) -> Vec<&'static MessageDef> {
    SECTIONS
        .iter()
        .filter(|(pattern, _)| !pattern.is_match(docstring))
        .map(|(_, def)| *def)
        .collect()
}

impl Checker for FiltersDocstringFormatChecker {
    type State = ();

    fn name(&self) -> &'static str {
        NAME
    }

    fn description(&self) -> &'static str {
        "Checks the docstring format of Open edX filters"
    }

    fn messages(&self) -> &'static [MessageDef] {
        &[
            FILTER_DOCSTRING_MISSING_DESCRIPTION,
            FILTER_DOCSTRING_MISSING_TYPE,
            FILTER_DOCSTRING_MISSING_TRIGGER,
        ]
    }

    fn register(&self, visitors: &mut Visitors<Self>) {
        visitors.visit("classdef", Self::visit_classdef);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{expected, run_checker};

    #[test]
    fn test_complete_docstring() {
        let source = r#"
            from openedx_filters.tooling import OpenEdxPublicFilter

            class CertificateRenderStarted(OpenEdxPublicFilter):
                """
                Description:
                    Filter used to modify the certificate rendering process.

                Filter Type:
                    org.openedx.learning.certificate.render.started.v1

                Trigger:
                    - Repository: openedx/edx-platform
                    - Path: lms/djangoapps/certificates/views/webview.py
                    - Function or Method: render_html_view
                """

            class NoTrigger(OpenEdxPublicFilter):
                """
                Description:
                    Nothing triggers this one.

                Filter Type:
                    org.openedx.learning.nothing.v1

                Trigger: NA
                """
        "#;
        assert!(run_checker(FiltersDocstringFormatChecker::new(), source).is_empty());
    }

    #[test]
    fn test_missing_sections() {
        let source = r#"
            from openedx_filters.tooling import OpenEdxPublicFilter

            class Undocumented(OpenEdxPublicFilter):        #=A
                pass

            class Partial(OpenEdxPublicFilter):             #=B
                """
                Description:
                    Only a description.
                """

            class NotAFilter(object):
                pass
        "#;
        let messages = run_checker(FiltersDocstringFormatChecker::new(), source);
        assert_eq!(
            messages,
            expected(&[
                "A:filter-docstring-missing-description:Filter's (Undocumented) docstring is missing the required description section",
                "A:filter-docstring-missing-type:Filter's (Undocumented) docstring is missing the required filter type section",
                "A:filter-docstring-missing-trigger:Filter's (Undocumented) docstring is missing the required trigger section",
                "B:filter-docstring-missing-type:Filter's (Partial) docstring is missing the required filter type section",
                "B:filter-docstring-missing-trigger:Filter's (Partial) docstring is missing the required trigger section",
            ])
        );
    }
}
