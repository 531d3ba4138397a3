//! Checker for translation functions called on something other than a
//! string literal.
//!
//! # Detected Patterns
//!
//! ```python
//! _("hello {}".format(name))   # bad
//! ugettext("Hello " + name)    # bad
//! _("hello {}").format(name)   # ok
//! ```

use edx_lint_core::{CheckContext, Checker, MessageDef, Node, NodeKind, Visitors};

/// Checker name.
pub const NAME: &str = "translation-string-checker";

/// Translation of a non-literal.
pub const TRANSLATION_OF_NON_STRING: MessageDef = MessageDef::new(
    "E7610",
    "translation-of-non-string",
    "i18n function {}() must be called with a literal string",
    "i18n functions must be called with a literal string",
);

const TRANSLATION_FUNCTIONS: &[&str] = &[
    "_",
    "gettext",
    "ngettext",
    "ngettext_lazy",
    "npgettext",
    "npgettext_lazy",
    "pgettext",
    "pgettext_lazy",
    "ugettext",
    "ugettext_lazy",
    "ugettext_noop",
    "ungettext",
    "ungettext_lazy",
];

/// Requires a literal string as the first argument of i18n functions.
#[derive(Debug, Clone, Copy, Default)]
pub struct TranslationStringChecker;

impl TranslationStringChecker {
    /// Creates the checker.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    fn visit_call(&self, _: &mut (), ctx: &mut CheckContext<'_>, node: Node<'_>) {
        let Some(func) = node.call_func().filter(|f| f.kind() == NodeKind::Name) else {
            return;
        };
        let Some(name) = func.name().filter(|n| TRANSLATION_FUNCTIONS.contains(n)) else {
            return;
        };

        let args = node.call_args();
        if args.first().and_then(|a| a.str_value()).is_some() {
            return;
        }
        ctx.add_message(&TRANSLATION_OF_NON_STRING, node, &[name]);
    }
}

impl Checker for TranslationStringChecker {
    type State = ();

    fn name(&self) -> &'static str {
        NAME
    }

    fn description(&self) -> &'static str {
        "Checks that i18n functions are called with literal strings"
    }

    fn messages(&self) -> &'static [MessageDef] {
        &[TRANSLATION_OF_NON_STRING]
    }

    fn register(&self, visitors: &mut Visitors<Self>) {
        visitors.visit("call", Self::visit_call);
    }
}
