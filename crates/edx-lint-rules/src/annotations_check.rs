//! Checkers for structured `# .. token: value` code annotations.
//!
//! # Checkers
//!
//! - `code-annotations`: generic validation of feature toggle and setting
//!   annotation groups (missing, duplicate, unknown tokens, invalid choices)
//! - `toggle-annotations`: feature toggle best practices, and every toggle
//!   created in a module is preceded by its annotation
//! - `setting-annotations`: settings with boolean defaults should be
//!   toggles instead
//!
//! # Detected Patterns
//!
//! ```python
//! # .. toggle_name: MY_FLAG
//! # .. toggle_default: False
//! # .. toggle_description: Enables the thing.
//! MY_FLAG = WaffleFlag("MY_FLAG", __name__)      # ok
//!
//! OTHER = WaffleFlag("OTHER", __name__)          # toggle-missing-annotation
//! ```

use edx_lint_core::annotations::{
    builtin_configs, AnnotationConfig, AnnotationGroup, AnnotationMatcher, AnnotationProblem,
    CallSite, MatchOutcome, FEATURE_TOGGLE, SETTING,
};
use edx_lint_core::{CheckContext, Checker, MessageDef, Node, NodeKind, Visitors};

/// Name of the generic annotation checker.
pub const CODE_ANNOTATIONS_NAME: &str = "code-annotations";

/// Name of the feature toggle annotation checker.
pub const TOGGLE_ANNOTATIONS_NAME: &str = "toggle-annotations";

/// Name of the setting annotation checker.
pub const SETTING_ANNOTATIONS_NAME: &str = "setting-annotations";

/// Value outside a token's choices.
pub const ANNOTATION_INVALID_CHOICE: MessageDef = MessageDef::new(
    "E7650",
    "annotation-invalid-choice",
    "'{}' is not a valid choice for '{}'. Expected one of {}.",
    "Annotation values must be one of the configured choices",
);

/// Token repeated in a group.
pub const ANNOTATION_DUPLICATE_TOKEN: MessageDef = MessageDef::new(
    "E7651",
    "annotation-duplicate-token",
    "found duplicate token '{}'",
    "Annotation tokens may appear only once per group",
);

/// Required token absent from a group.
pub const ANNOTATION_MISSING_TOKEN: MessageDef = MessageDef::new(
    "E7652",
    "annotation-missing-token",
    "missing non-optional annotation: '{}'",
    "Annotation groups must include all non-optional tokens",
);

/// Token that belongs to no known configuration.
pub const ANNOTATION_UNKNOWN_TOKEN: MessageDef = MessageDef::new(
    "E7653",
    "annotation-unknown-token",
    "unknown annotation token '{}'",
    "Annotation groups may only use tokens of a known annotation configuration",
);

/// Toggle group without a name.
pub const TOGGLE_NO_NAME: MessageDef = MessageDef::new(
    "E7660",
    "toggle-no-name",
    "feature toggle has no name",
    "Feature toggle name must be present and be the first annotation",
);

/// Toggle group without a description.
pub const TOGGLE_EMPTY_DESCRIPTION: MessageDef = MessageDef::new(
    "E7661",
    "toggle-empty-description",
    "feature toggle ({}) does not have a description",
    "Feature toggles must include a thorough description",
);

/// Temporary toggle without a removal date.
pub const TOGGLE_MISSING_TARGET_REMOVAL_DATE: MessageDef = MessageDef::new(
    "E7662",
    "toggle-missing-target-removal-date",
    "temporary feature toggle ({}) has no target removal date",
    "Temporary feature toggles must include a target removal date",
);

/// Toggle default that is not `True` or `False`.
pub const TOGGLE_NON_BOOLEAN_DEFAULT_VALUE: MessageDef = MessageDef::new(
    "E7663",
    "toggle-non-boolean-default-value",
    "feature toggle ({}) default value must be boolean ('True' or 'False')",
    "Feature toggle default values must be boolean",
);

/// Toggle created without a preceding annotation.
pub const TOGGLE_MISSING_ANNOTATION: MessageDef = MessageDef::new(
    "E7664",
    "toggle-missing-annotation",
    "missing feature toggle annotation",
    "When a WaffleFlag/Switch object is created, a corresponding annotation must be present above in the same module and with a matching name",
);

/// Direct import of django-waffle.
pub const INVALID_DJANGO_WAFFLE_IMPORT: MessageDef = MessageDef::new(
    "E7665",
    "invalid-django-waffle-import",
    "invalid Django Waffle import",
    "Do not directly access Django Waffle objects and methods. Instead, import from edx_toggles.toggles.",
);

/// Toggle created under the annotation of another toggle.
pub const TOGGLE_INCORRECT_ANNOTATION: MessageDef = MessageDef::new(
    "E7666",
    "toggle-incorrect-annotation",
    "feature toggle ({}) does not match its annotation ({})",
    "The annotation preceding a toggle must document that toggle",
);

/// Setting annotated with a boolean default.
pub const SETTING_BOOLEAN_DEFAULT_VALUE: MessageDef = MessageDef::new(
    "E7670",
    "setting-boolean-default-value",
    "setting annotation ({}) cannot have a boolean value",
    "Setting with boolean values should be annotated as feature toggles",
);

const TOGGLE_FUNC_NAMES: &[&str] = &[
    "WaffleFlag",
    "NonNamespacedWaffleFlag",
    "WaffleSwitch",
    "NonNamespacedWaffleSwitch",
    "CourseWaffleFlag",
    "ExperimentWaffleFlag",
];

const BOOLEANS: &[&str] = &["True", "False"];

/// Call site for `node`, named by `literal_name` when it is a literal.
pub(crate) fn call_site(node: Node<'_>, literal_name: Option<&str>) -> CallSite {
    CallSite {
        node: node.id(),
        line: node.line(),
        end_line: node.end_line(),
        column: node.column(),
        literal_name: literal_name.map(str::to_string),
    }
}

/// Resolves queued call sites and reports missing or mismatched
/// annotations.
pub(crate) fn report_matches(
    ctx: &mut CheckContext<'_>,
    matcher: &mut AnnotationMatcher,
    missing: &MessageDef,
    incorrect: &MessageDef,
) {
    let tree = ctx.tree();
    for (site, outcome) in matcher.resolve() {
        let node = tree.node(site.node);
        match outcome {
            MatchOutcome::Matched => {}
            MatchOutcome::Missing => ctx.add_message(missing, node, &[]),
            MatchOutcome::Incorrect { found, annotated } => {
                ctx.add_message(incorrect, node, &[&found, &annotated]);
            }
        }
    }
}

/// Callee name when it is a plain name listed in `names`.
pub(crate) fn called_name<'t>(node: Node<'t>, names: &[&str]) -> Option<&'t str> {
    node.call_func()
        .filter(|f| f.kind() == NodeKind::Name)
        .and_then(Node::name)
        .filter(|name| names.contains(name))
}

/// Generic validation of annotation groups.
#[derive(Debug, Clone, Copy, Default)]
pub struct CodeAnnotationChecker;

impl CodeAnnotationChecker {
    /// Creates the checker.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    fn visit_module(&self, _: &mut (), ctx: &mut CheckContext<'_>, _node: Node<'_>) {
        let checked: [&AnnotationConfig; 2] = [&FEATURE_TOGGLE, &SETTING];
        let index = ctx.annotations();

        for raw in index.groups() {
            let mut in_checked_family = false;
            for config in checked {
                let Some(group) = raw.restrict(|t| config.contains(t)) else {
                    continue;
                };
                in_checked_family = true;
                report_problems(ctx, &group, config.validate(&group));
            }
            if in_checked_family {
                report_unknown_tokens(ctx, raw);
            }
        }
    }
}

fn report_problems(ctx: &mut CheckContext<'_>, group: &AnnotationGroup, problems: Vec<AnnotationProblem>) {
    for problem in problems {
        match problem {
            AnnotationProblem::Duplicate(token) => {
                ctx.add_message_at_line(&ANNOTATION_DUPLICATE_TOKEN, group.line, &[&token]);
            }
            AnnotationProblem::Missing(token) => {
                ctx.add_message_at_line(&ANNOTATION_MISSING_TOKEN, group.line, &[&token]);
            }
            AnnotationProblem::InvalidChoice {
                value,
                token,
                expected,
            } => {
                ctx.add_message_at_line(&ANNOTATION_INVALID_CHOICE, group.line, &[&value, &token, &expected]);
            }
        }
    }
}

fn report_unknown_tokens(ctx: &mut CheckContext<'_>, group: &AnnotationGroup) {
    let configs = builtin_configs();
    for entry in &group.entries {
        if !configs.iter().any(|c| c.contains(&entry.token)) {
            ctx.add_message_at_line(&ANNOTATION_UNKNOWN_TOKEN, group.line, &[&entry.token]);
        }
    }
}

impl Checker for CodeAnnotationChecker {
    type State = ();

    fn name(&self) -> &'static str {
        CODE_ANNOTATIONS_NAME
    }

    fn description(&self) -> &'static str {
        "Validates feature toggle and setting annotation groups"
    }

    fn messages(&self) -> &'static [MessageDef] {
        &[
            ANNOTATION_INVALID_CHOICE,
            ANNOTATION_DUPLICATE_TOKEN,
            ANNOTATION_MISSING_TOKEN,
            ANNOTATION_UNKNOWN_TOKEN,
        ]
    }

    fn register(&self, visitors: &mut Visitors<Self>) {
        visitors.visit("module", Self::visit_module);
    }
}

/// Feature toggle annotation best practices.
#[derive(Debug, Clone, Copy, Default)]
pub struct FeatureToggleAnnotationChecker;

/// Pending toggle call sites of the current module.
#[derive(Debug, Default)]
pub struct ToggleAnnotationState {
    matcher: AnnotationMatcher,
}

impl FeatureToggleAnnotationChecker {
    /// Creates the checker.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    fn visit_module(&self, state: &mut ToggleAnnotationState, ctx: &mut CheckContext<'_>, _node: Node<'_>) {
        let index = ctx.annotations();
        for group in FEATURE_TOGGLE.groups(index) {
            check_toggle_group(ctx, &group);
        }
        state.matcher = AnnotationMatcher::new(FEATURE_TOGGLE.named_groups(index));
    }

    fn leave_module(&self, state: &mut ToggleAnnotationState, ctx: &mut CheckContext<'_>, _node: Node<'_>) {
        report_matches(
            ctx,
            &mut state.matcher,
            &TOGGLE_MISSING_ANNOTATION,
            &TOGGLE_INCORRECT_ANNOTATION,
        );
    }

    fn visit_call(&self, state: &mut ToggleAnnotationState, _: &mut CheckContext<'_>, node: Node<'_>) {
        if called_name(node, TOGGLE_FUNC_NAMES).is_none() {
            return;
        }
        let args = node.call_args();
        let literal = args.first().and_then(|a| a.str_value());
        state.matcher.push(call_site(node, literal));
    }

    fn visit_import(&self, _: &mut ToggleAnnotationState, ctx: &mut CheckContext<'_>, node: Node<'_>) {
        if node.import_names().first().is_some_and(|n| n.name == "waffle") {
            ctx.add_message(&INVALID_DJANGO_WAFFLE_IMPORT, node, &[]);
        }
    }

    fn visit_importfrom(&self, _: &mut ToggleAnnotationState, ctx: &mut CheckContext<'_>, node: Node<'_>) {
        if node.import_module() == Some("waffle") {
            ctx.add_message(&INVALID_DJANGO_WAFFLE_IMPORT, node, &[]);
        }
    }
}

fn check_toggle_group(ctx: &mut CheckContext<'_>, group: &AnnotationGroup) {
    let name = group.get(".. toggle_name:").unwrap_or_default();
    let description = group.get(".. toggle_description:").unwrap_or_default().trim();
    let temporary = group
        .get(".. toggle_use_cases:")
        .is_some_and(|v| v.contains("temporary"));
    let removal_date = group.get(".. toggle_target_removal_date:").unwrap_or_default();
    let default = group.get(".. toggle_default:");

    if name.is_empty() {
        ctx.add_message_at_line(&TOGGLE_NO_NAME, group.line, &[]);
    }
    if description.is_empty() {
        ctx.add_message_at_line(&TOGGLE_EMPTY_DESCRIPTION, group.line, &[name]);
    }
    if temporary && removal_date.is_empty() {
        ctx.add_message_at_line(&TOGGLE_MISSING_TARGET_REMOVAL_DATE, group.line, &[name]);
    }
    if !default.is_some_and(|d| BOOLEANS.contains(&d)) {
        ctx.add_message_at_line(&TOGGLE_NON_BOOLEAN_DEFAULT_VALUE, group.line, &[name]);
    }
}

impl Checker for FeatureToggleAnnotationChecker {
    type State = ToggleAnnotationState;

    fn name(&self) -> &'static str {
        TOGGLE_ANNOTATIONS_NAME
    }

    fn description(&self) -> &'static str {
        "Checks feature toggle annotations and that toggles are annotated"
    }

    fn messages(&self) -> &'static [MessageDef] {
        &[
            TOGGLE_NO_NAME,
            TOGGLE_EMPTY_DESCRIPTION,
            TOGGLE_MISSING_TARGET_REMOVAL_DATE,
            TOGGLE_NON_BOOLEAN_DEFAULT_VALUE,
            TOGGLE_MISSING_ANNOTATION,
            INVALID_DJANGO_WAFFLE_IMPORT,
            TOGGLE_INCORRECT_ANNOTATION,
        ]
    }

    fn register(&self, visitors: &mut Visitors<Self>) {
        visitors
            .visit("module", Self::visit_module)
            .leave("module", Self::leave_module)
            .visit("call", Self::visit_call)
            .visit("import", Self::visit_import)
            .visit("importfrom", Self::visit_importfrom);
    }
}

/// Setting annotation checks.
#[derive(Debug, Clone, Copy, Default)]
pub struct SettingAnnotationChecker;

impl SettingAnnotationChecker {
    /// Creates the checker.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    fn visit_module(&self, _: &mut (), ctx: &mut CheckContext<'_>, _node: Node<'_>) {
        for group in SETTING.groups(ctx.annotations()) {
            let name = group.get(".. setting_name:").unwrap_or_default();
            if group
                .get(".. setting_default:")
                .is_some_and(|d| BOOLEANS.contains(&d))
            {
                ctx.add_message_at_line(&SETTING_BOOLEAN_DEFAULT_VALUE, group.line, &[name]);
            }
        }
    }
}

impl Checker for SettingAnnotationChecker {
    type State = ();

    fn name(&self) -> &'static str {
        SETTING_ANNOTATIONS_NAME
    }

    fn description(&self) -> &'static str {
        "Checks setting annotations"
    }

    fn messages(&self) -> &'static [MessageDef] {
        &[SETTING_BOOLEAN_DEFAULT_VALUE]
    }

    fn register(&self, visitors: &mut Visitors<Self>) {
        visitors.visit("module", Self::visit_module);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{expected, only, run_checker};

    #[test]
    fn test_duplicate_token() {
        let source = r"
            # .. toggle_name: MYTOGGLE
            # .. toggle_name: MYTOGGLE
        ";
        let messages = only(run_checker(CodeAnnotationChecker::new(), source), "annotation-duplicate-token");
        assert_eq!(
            messages,
            expected(&["1:annotation-duplicate-token:found duplicate token '.. toggle_name:'"])
        );
    }

    #[test]
    fn test_no_duplicate_annotation_errors() {
        let source = r"
            # .. setting_default: something1
            # .. setting_description: something1
            x = 1

            # .. setting_name: MYTOGGLE2
            # .. setting_default: something2
            # .. setting_description: something2
            x = 2
        ";
        let messages = run_checker(CodeAnnotationChecker::new(), source);
        assert_eq!(
            messages,
            expected(&["1:annotation-missing-token:missing non-optional annotation: '.. setting_name:'"])
        );
    }

    #[test]
    fn test_invalid_choice_and_unknown_token() {
        let source = r"
            # .. setting_name: S
            # .. setting_default: 1
            # .. setting_description: fine
            # .. setting_colour: blue

            # .. toggle_name: T
            # .. toggle_implementation: WaffleFlag
            # .. toggle_default: False
            # .. toggle_description: desc
            # .. toggle_use_cases: temporary, forever
            # .. toggle_creation_date: 2020-01-01
        ";
        let messages = run_checker(CodeAnnotationChecker::new(), source);
        assert_eq!(
            messages,
            expected(&[
                "1:annotation-unknown-token:unknown annotation token '.. setting_colour:'",
                "6:annotation-invalid-choice:'forever' is not a valid choice for '.. toggle_use_cases:'. \
                 Expected one of temporary, circuit_breaker, vip, opt_out, opt_in, open_edx.",
            ])
        );
    }

    #[test]
    fn test_temporary_use_case_without_target_removal_date() {
        let source = r"
            # .. toggle_name: MYTOGGLE
            # .. toggle_use_cases: temporary
        ";
        let messages = only(
            run_checker(FeatureToggleAnnotationChecker::new(), source),
            "toggle-missing-target-removal-date",
        );
        assert_eq!(
            messages,
            expected(&["1:toggle-missing-target-removal-date:temporary feature toggle (MYTOGGLE) has no target removal date"])
        );
    }

    #[test]
    fn test_empty_removal_date_on_permanent_use_case() {
        let source = r"
            # .. toggle_name: MYTOGGLE
            # .. toggle_use_cases: open_edx
        ";
        let messages = only(
            run_checker(FeatureToggleAnnotationChecker::new(), source),
            "toggle-missing-target-removal-date",
        );
        assert!(messages.is_empty());
    }

    #[test]
    fn test_toggle_with_empty_name_and_description() {
        let source = r"
            # .. toggle_name:
            # .. toggle_description:
        ";
        let messages = run_checker(FeatureToggleAnnotationChecker::new(), source);
        assert_eq!(
            messages,
            expected(&[
                "1:toggle-no-name:feature toggle has no name",
                "1:toggle-empty-description:feature toggle () does not have a description",
                "1:toggle-non-boolean-default-value:feature toggle () default value must be boolean ('True' or 'False')",
            ])
        );
    }

    #[test]
    fn test_non_boolean_default_value() {
        let source = r"
            # .. toggle_name: MYTOGGLE
            # .. toggle_default: something
            # .. toggle_description: described
        ";
        let messages = run_checker(FeatureToggleAnnotationChecker::new(), source);
        assert_eq!(
            messages,
            expected(&["1:toggle-non-boolean-default-value:feature toggle (MYTOGGLE) default value must be boolean ('True' or 'False')"])
        );
    }

    #[test]
    fn test_missing_annotation() {
        let source = r"
            # .. toggle_name: MYTOGGLE1
            waffle1 = WaffleFlag('MYTOGGLE1')
            waffle2 = WaffleFlag('MYTOGGLE2')
        ";
        let messages = only(
            run_checker(FeatureToggleAnnotationChecker::new(), source),
            "toggle-missing-annotation",
        );
        assert_eq!(messages, expected(&["3:toggle-missing-annotation:missing feature toggle annotation"]));
    }

    #[test]
    fn test_missing_annotation_for_unnamed_toggle() {
        let source = r"
            # annotated waffle flag
            # .. toggle_name: MYTOGGLE1
            waffle1 = CourseWaffleFlag()
            # unannotated waffle flag
            waffle2 = ExperimentWaffleFlag()
        ";
        let messages = only(
            run_checker(FeatureToggleAnnotationChecker::new(), source),
            "toggle-missing-annotation",
        );
        assert_eq!(messages, expected(&["5:toggle-missing-annotation:missing feature toggle annotation"]));
    }

    #[test]
    fn test_incorrect_annotation() {
        let source = r"
            # .. toggle_name: FIRST
            # .. toggle_default: False
            # .. toggle_description: first
            second = WaffleSwitch('SECOND')     #=A

            # .. toggle_name: SECOND
            # .. toggle_default: False
            # .. toggle_description: second
            first = WaffleSwitch('FIRST')       #=B
        ";
        let messages = run_checker(FeatureToggleAnnotationChecker::new(), source);
        assert_eq!(
            messages,
            expected(&[
                "A:toggle-incorrect-annotation:feature toggle (SECOND) does not match its annotation (FIRST)",
                "B:toggle-incorrect-annotation:feature toggle (FIRST) does not match its annotation (SECOND)",
            ])
        );
    }

    #[test]
    fn test_invalid_import_from_django_waffle() {
        let source = r"
            from waffle import waffle_is_active
            import waffle
            import waffle_utils
            from edx_toggles.toggles import WaffleFlag
        ";
        let messages = run_checker(FeatureToggleAnnotationChecker::new(), source);
        assert_eq!(
            messages,
            expected(&[
                "1:invalid-django-waffle-import:invalid Django Waffle import",
                "2:invalid-django-waffle-import:invalid Django Waffle import",
            ])
        );
    }

    #[test]
    fn test_setting_boolean_default_value() {
        let source = r"
            # .. setting_name: MYSETTING
            # .. setting_default: True

            # .. setting_name: OTHER
            # .. setting_default: 'True'
        ";
        let messages = run_checker(SettingAnnotationChecker::new(), source);
        assert_eq!(
            messages,
            expected(&["1:setting-boolean-default-value:setting annotation (MYSETTING) cannot have a boolean value"])
        );
    }
}
