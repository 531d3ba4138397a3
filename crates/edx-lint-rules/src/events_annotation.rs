//! Checker for Open edX event annotations.
//!
//! Every `OpenEdxPublicSignal(...)` created in a module must be preceded by
//! an `.. event_type:` annotation group documenting it, and each group must
//! carry a name, data and a description.

use crate::annotations_check::{call_site, called_name, report_matches};
use edx_lint_core::annotations::{AnnotationGroup, AnnotationMatcher, OPENEDX_EVENT};
use edx_lint_core::{CheckContext, Checker, MessageDef, Node, Visitors};

/// Checker name.
pub const NAME: &str = "events-annotations";

/// Event group without a type.
pub const EVENT_NO_TYPE: MessageDef = MessageDef::new(
    "E7680",
    "event-no-type",
    "event annotation has no type",
    "Events annotations type must be present and be the first annotation",
);

/// Event group without a name.
pub const EVENT_NO_NAME: MessageDef = MessageDef::new(
    "E7681",
    "event-no-name",
    "event annotation ({}) has no name",
    "Events annotations name must be present",
);

/// Event group without data.
pub const EVENT_NO_DATA: MessageDef = MessageDef::new(
    "E7682",
    "event-no-data",
    "event annotation ({}) has no data argument",
    "Events annotations must include data argument",
);

/// Reserved; events carry no status token.
pub const EVENT_NO_STATUS: MessageDef = MessageDef::new(
    "E7683",
    "event-no-status",
    "event annotation ({}) has no status",
    "Events annotations must include the status of event",
);

/// Event group without a description.
pub const EVENT_EMPTY_DESCRIPTION: MessageDef = MessageDef::new(
    "E7684",
    "event-empty-description",
    "event annotation ({}) does not have a description",
    "Events annotations must include a short description",
);

/// Event created without a preceding annotation.
pub const EVENT_MISSING_ANNOTATION: MessageDef = MessageDef::new(
    "E7685",
    "event-missing-annotation",
    "missing event annotation",
    "When an Open edX event object is created, a corresponding annotation must be present above in the same module and with a matching name",
);

/// Event created under the annotation of another event.
pub const EVENT_INCORRECT_ANNOTATION: MessageDef = MessageDef::new(
    "E7686",
    "event-incorrect-annotation",
    "event ({}) does not match its annotation ({})",
    "The annotation preceding an event must document that event",
);

const EVENT_CLASS_NAMES: &[&str] = &["OpenEdxPublicSignal"];

/// Checks event annotations.
#[derive(Debug, Clone, Copy, Default)]
pub struct EventsAnnotationChecker;

/// Pending event call sites of the current module.
#[derive(Debug, Default)]
pub struct EventsAnnotationState {
    matcher: AnnotationMatcher,
}

impl EventsAnnotationChecker {
    /// Creates the checker.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    fn visit_module(&self, state: &mut EventsAnnotationState, ctx: &mut CheckContext<'_>, _node: Node<'_>) {
        let index = ctx.annotations();
        for group in OPENEDX_EVENT.groups(index) {
            check_event_group(ctx, &group);
        }
        state.matcher = AnnotationMatcher::new(OPENEDX_EVENT.named_groups(index));
    }

    fn leave_module(&self, state: &mut EventsAnnotationState, ctx: &mut CheckContext<'_>, _node: Node<'_>) {
        report_matches(
            ctx,
            &mut state.matcher,
            &EVENT_MISSING_ANNOTATION,
            &EVENT_INCORRECT_ANNOTATION,
        );
    }

    fn visit_call(&self, state: &mut EventsAnnotationState, _: &mut CheckContext<'_>, node: Node<'_>) {
        if called_name(node, EVENT_CLASS_NAMES).is_none() {
            return;
        }
        let event_type = node
            .keyword_value("event_type")
            .or_else(|| node.call_args().first().copied())
            .and_then(Node::str_value);
        state.matcher.push(call_site(node, event_type));
    }
}

fn check_event_group(ctx: &mut CheckContext<'_>, group: &AnnotationGroup) {
    let event_type = group.get(".. event_type:").unwrap_or_default();
    let line = group.line;

    if event_type.is_empty() {
        ctx.add_message_at_line(&EVENT_NO_TYPE, line, &[]);
    }
    if group.get(".. event_name:").unwrap_or_default().is_empty() {
        ctx.add_message_at_line(&EVENT_NO_NAME, line, &[event_type]);
    }
    if group.get(".. event_data:").unwrap_or_default().is_empty() {
        ctx.add_message_at_line(&EVENT_NO_DATA, line, &[event_type]);
    }
    if group.get(".. event_description:").unwrap_or_default().is_empty() {
        ctx.add_message_at_line(&EVENT_EMPTY_DESCRIPTION, line, &[event_type]);
    }
}

impl Checker for EventsAnnotationChecker {
    type State = EventsAnnotationState;

    fn name(&self) -> &'static str {
        NAME
    }

    fn description(&self) -> &'static str {
        "Checks that Open edX events are annotated"
    }

    fn messages(&self) -> &'static [MessageDef] {
        &[
            EVENT_NO_TYPE,
            EVENT_NO_NAME,
            EVENT_NO_DATA,
            EVENT_NO_STATUS,
            EVENT_EMPTY_DESCRIPTION,
            EVENT_MISSING_ANNOTATION,
            EVENT_INCORRECT_ANNOTATION,
        ]
    }

    fn register(&self, visitors: &mut Visitors<Self>) {
        visitors
            .visit("module", Self::visit_module)
            .leave("module", Self::leave_module)
            .visit("call", Self::visit_call);
    }
}
