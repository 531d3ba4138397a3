//! Checker that feature toggles are annotated where they are defined.
//!
//! # Rationale
//!
//! Toggle reports are generated from `# .. toggle_*:` comments, so a toggle
//! defined without one is invisible to operators.
//!
//! # Detected Patterns
//!
//! - `WaffleFlag(...)`, `WaffleSwitch(...)`, `CourseWaffleFlag(...)` and
//!   capitalized subclasses named `*WaffleFlag` etc. without an annotation
//!   on the preceding line
//! - Subclasses of `ConfigurationModel` without an annotation
//! - Entries of a `FEATURES = {...}` dict without an annotation
//! - Direct `flag_is_active()` / `switch_is_active()` calls
//!
//! The preceding line counts as annotated when it is a comment starting
//! with `.. toggle` or `.. documented_elsewhere`.

use edx_lint_core::{CheckContext, Checker, MessageDef, Node, NodeKind, Visitors};
use once_cell::sync::Lazy;
use regex::Regex;

/// Checker name.
pub const NAME: &str = "feature-toggle-checker";

/// A toggle definition lacks an annotation.
pub const FEATURE_TOGGLE_NEEDS_DOC: MessageDef = MessageDef::new(
    "E7640",
    "feature-toggle-needs-doc",
    "feature toggle ({}) is missing annotation",
    "feature toggle is missing annotation",
);

/// Raw django-waffle call instead of a toggle class.
pub const ILLEGAL_WAFFLE_USAGE: MessageDef = MessageDef::new(
    "E7641",
    "illegal-waffle-usage",
    "illegal waffle usage with ({}): use utility classes WaffleFlag, WaffleSwitch, CourseWaffleFlag.",
    "illegal waffle usage: use utility classes WaffleFlag, WaffleSwitch, CourseWaffleFlag.",
);

const WAFFLE_TOGGLE_CLASSES: &[&str] = &["WaffleFlag", "WaffleSwitch", "CourseWaffleFlag"];
const ILLEGAL_WAFFLE_FUNCTIONS: &[&str] = &["flag_is_active", "switch_is_active"];
const UNKNOWN: &str = "UNKNOWN";

#[allow(clippy::expect_used)]
static ANNOTATION_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*#\s*\.\.\s*(toggle|documented_elsewhere)").expect("annotation regex is valid")
});

/// Requires annotations on toggle definitions.
#[derive(Debug, Clone, Copy, Default)]
pub struct FeatureToggleChecker;

impl FeatureToggleChecker {
    /// Creates the checker.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    fn visit_call(&self, _: &mut (), ctx: &mut CheckContext<'_>, node: Node<'_>) {
        let Some(name) = node
            .call_func()
            .filter(|f| f.kind() == NodeKind::Name)
            .and_then(Node::name)
        else {
            return;
        };
        check_waffle_class_annotated(ctx, node, name);
        check_illegal_waffle_usage(ctx, node, name);
    }

    fn visit_classdef(&self, _: &mut (), ctx: &mut CheckContext<'_>, node: Node<'_>) {
        let is_configuration_model = node
            .class_bases()
            .iter()
            .any(|base| base.source() == "ConfigurationModel");
        if !is_configuration_model || is_annotated(ctx, node.line()) {
            return;
        }
        ctx.add_message(&FEATURE_TOGGLE_NEEDS_DOC, node, &[node.name().unwrap_or_default()]);
    }

    fn visit_dict(&self, _: &mut (), ctx: &mut CheckContext<'_>, node: Node<'_>) {
        let Some(assign) = node.parent().filter(|p| p.kind() == NodeKind::Assign) else {
            return;
        };
        let target = assign.assign_targets().first().and_then(|t| t.name());
        if target != Some("FEATURES") {
            return;
        }

        for (key, _) in node.dict_items() {
            if is_annotated(ctx, key.line()) {
                continue;
            }
            let name = key.str_value().unwrap_or_else(|| key.source());
            ctx.add_message(&FEATURE_TOGGLE_NEEDS_DOC, node, &[name]);
        }
    }
}

fn is_annotated(ctx: &CheckContext<'_>, line: usize) -> bool {
    line.checked_sub(1)
        .is_some_and(|prev| ctx.annotations().is_line_annotated(prev, &ANNOTATION_RE))
}

fn check_waffle_class_annotated(ctx: &mut CheckContext<'_>, node: Node<'_>, name: &str) {
    // Class instantiation only.
    if !name.starts_with(|c: char| c.is_ascii_uppercase()) {
        return;
    }
    if !WAFFLE_TOGGLE_CLASSES.iter().any(|class| name.ends_with(class)) {
        return;
    }
    if is_annotated(ctx, node.line()) {
        return;
    }

    let toggle_name = node
        .keyword_value("flag_name")
        .map(|value| value.str_value().unwrap_or_else(|| value.source()))
        .or_else(|| node.call_args().get(1).map(|arg| arg.source()))
        .unwrap_or(UNKNOWN);
    ctx.add_message(&FEATURE_TOGGLE_NEEDS_DOC, node, &[toggle_name]);
}

fn check_illegal_waffle_usage(ctx: &mut CheckContext<'_>, node: Node<'_>, name: &str) {
    if !ILLEGAL_WAFFLE_FUNCTIONS.contains(&name) {
        return;
    }
    let args = node.call_args();
    let toggle_name = args.first().map_or(UNKNOWN, |arg| arg.source());
    ctx.add_message(&ILLEGAL_WAFFLE_USAGE, node, &[toggle_name]);
}

impl Checker for FeatureToggleChecker {
    type State = ();

    fn name(&self) -> &'static str {
        NAME
    }

    fn description(&self) -> &'static str {
        "Checks that feature toggles are annotated and waffle is used through utility classes"
    }

    fn messages(&self) -> &'static [MessageDef] {
        &[FEATURE_TOGGLE_NEEDS_DOC, ILLEGAL_WAFFLE_USAGE]
    }

    fn register(&self, visitors: &mut Visitors<Self>) {
        visitors
            .visit("call", Self::visit_call)
            .visit("classdef", Self::visit_classdef)
            .visit("dict", Self::visit_dict);
    }
}
