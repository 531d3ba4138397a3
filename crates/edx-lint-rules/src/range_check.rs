//! Checker for `range()` calls with redundant arguments.
//!
//! # Detected Patterns
//!
//! ```python
//! range(0, n)       # could be range(n)
//! range(0, n, 1)    # could be range(n)
//! range(a, b, 1)    # could be range(a, b)
//! ```
//!
//! Calls whose arguments are not integer constants where it matters are
//! left alone, as are calls with more than three positional arguments.

use edx_lint_core::{CheckContext, Checker, MessageDef, Node, NodeKind, Visitors};

/// Checker name.
pub const NAME: &str = "range-checker";

/// A `range()` call has redundant arguments.
pub const SIMPLIFIABLE_RANGE: MessageDef = MessageDef::new(
    "C7620",
    "simplifiable-range",
    "{}() call could be {}",
    "range() call could be simplified",
);

const RANGE_FUNCTIONS: &[&str] = &["range", "xrange"];

/// Flags `range(0, n)` and friends.
#[derive(Debug, Clone, Copy, Default)]
pub struct RangeChecker;

impl RangeChecker {
    /// Creates the checker.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    fn visit_call(&self, _: &mut (), ctx: &mut CheckContext<'_>, node: Node<'_>) {
        let Some(func) = node.call_func().filter(|f| f.kind() == NodeKind::Name) else {
            return;
        };
        let Some(name) = func.name().filter(|n| RANGE_FUNCTIONS.contains(n)) else {
            return;
        };

        let args = node.call_args();
        if !(2..=3).contains(&args.len()) {
            return;
        }

        let starts_at_zero = int_value(args[0]) == Some(0);
        let unit_step = args.get(2).map_or(true, |step| int_value(*step) == Some(1));
        if !unit_step {
            return;
        }

        let better = if starts_at_zero {
            "single-argument"
        } else if args.len() == 3 {
            "two-argument"
        } else {
            return;
        };
        ctx.add_message(&SIMPLIFIABLE_RANGE, node, &[name, better]);
    }
}

fn int_value(node: Node<'_>) -> Option<i64> {
    node.literal().and_then(|lit| lit.as_int())
}

impl Checker for RangeChecker {
    type State = ();

    fn name(&self) -> &'static str {
        NAME
    }

    fn description(&self) -> &'static str {
        "Checks for range() calls that could be simpler"
    }

    fn messages(&self) -> &'static [MessageDef] {
        &[SIMPLIFIABLE_RANGE]
    }

    fn register(&self, visitors: &mut Visitors<Self>) {
        visitors.visit("call", Self::visit_call);
    }
}
