//! Checker for `getattr`, `setattr` and `delattr` with a literal attribute
//! name, where plain attribute access would do.
//!
//! # Detected Patterns
//!
//! ```python
//! getattr(obj, "name")          # obj.name
//! setattr(obj, "name", value)   # obj.name = value
//! delattr(obj, "name")          # del obj.name
//! ```
//!
//! Three-argument `getattr` (with a default) is fine, and so is a literal
//! that is not a valid identifier.

use edx_lint_core::{CheckContext, Checker, MessageDef, Node, NodeKind, Visitors};

/// Checker name.
pub const NAME: &str = "getattr-literal-checker";

/// Literal attribute name passed to an attribute builtin.
pub const LITERAL_USED_AS_ATTRIBUTE: MessageDef = MessageDef::new(
    "C7630",
    "literal-used-as-attribute",
    "{} using a literal attribute name",
    "getattr or setattr used with a literal attribute name",
);

/// Flags attribute builtins called with literal names.
#[derive(Debug, Clone, Copy, Default)]
pub struct GetSetAttrLiteralChecker;

impl GetSetAttrLiteralChecker {
    /// Creates the checker.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    fn visit_call(&self, _: &mut (), ctx: &mut CheckContext<'_>, node: Node<'_>) {
        let Some(func) = node.call_func().filter(|f| f.kind() == NodeKind::Name) else {
            return;
        };
        let args = node.call_args();
        let Some(name) = func.name() else {
            return;
        };
        let applies = match name {
            // Only the two-argument form; a default changes the meaning.
            "getattr" => args.len() == 2,
            "setattr" | "delattr" => args.len() >= 2,
            _ => false,
        };
        if !applies {
            return;
        }

        if args[1].str_value().is_some_and(is_identifier) {
            ctx.add_message(&LITERAL_USED_AS_ATTRIBUTE, node, &[name]);
        }
    }
}

fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    chars
        .next()
        .is_some_and(|c| c == '_' || c.is_alphabetic())
        && chars.all(|c| c == '_' || c.is_alphanumeric())
}

impl Checker for GetSetAttrLiteralChecker {
    type State = ();

    fn name(&self) -> &'static str {
        NAME
    }

    fn description(&self) -> &'static str {
        "Checks for getattr/setattr/delattr used with literal attribute names"
    }

    fn messages(&self) -> &'static [MessageDef] {
        &[LITERAL_USED_AS_ATTRIBUTE]
    }

    fn register(&self, visitors: &mut Visitors<Self>) {
        visitors.visit("call", Self::visit_call);
    }
}
