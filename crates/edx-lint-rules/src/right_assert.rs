//! Checker for `assertTrue`/`assertFalse` wrapped around a comparison that
//! has a dedicated assert method.
//!
//! # Detected Patterns
//!
//! ```python
//! self.assertTrue(a == b)        # assertEqual
//! self.assertFalse(a in b)       # assertNotIn
//! self.assertTrue(x is None)     # assertIsNone
//! self.assertFalse(a < b)        # assertGreaterEqual
//! ```
//!
//! Chained comparisons such as `0 < x < 10` cannot be split and are left
//! alone.

use edx_lint_core::{CheckContext, Checker, Literal, MessageDef, Node, NodeKind, Visitors};

/// Checker name.
pub const NAME: &str = "assert-checker";

/// A more precise assert exists.
pub const WRONG_ASSERT_TYPE: MessageDef = MessageDef::new(
    "C7690",
    "wrong-assert-type",
    "{}",
    "Use assert(Not)Equal instead of assertTrue/False",
);

const AFFECTED_ASSERTS: &[&str] = &["assertTrue", "assertFalse"];

/// Suggests precise asserts over `assertTrue(a <op> b)`.
#[derive(Debug, Clone, Copy, Default)]
pub struct AssertChecker;

impl AssertChecker {
    /// Creates the checker.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    fn visit_call(&self, _: &mut (), ctx: &mut CheckContext<'_>, node: Node<'_>) {
        let Some(attr) = node
            .call_func()
            .and_then(Node::attr_name)
            .filter(|a| AFFECTED_ASSERTS.contains(a))
        else {
            return;
        };
        let args = node.call_args();
        let Some(compare) = args.first().filter(|a| a.kind() == NodeKind::Compare) else {
            return;
        };
        let [op] = compare.compare_ops() else {
            return;
        };

        let op = if attr == "assertFalse" {
            negate(op)
        } else {
            Some(op.as_str())
        };
        let compares_none = compare
            .compare_operands()
            .iter()
            .any(|operand| matches!(operand.literal(), Some(Literal::None)));
        let Some(better) = op.and_then(|op| better_assert(op, compares_none)) else {
            return;
        };

        let message = format!("{attr}({}) should be {better}", compare.source());
        ctx.add_message(&WRONG_ASSERT_TYPE, node, &[&message]);
    }
}

fn negate(op: &str) -> Option<&'static str> {
    let negated = match op {
        "==" => "!=",
        "!=" => "==",
        "in" => "not in",
        "not in" => "in",
        "is" => "is not",
        "is not" => "is",
        "<" => ">=",
        "<=" => ">",
        ">" => "<=",
        ">=" => "<",
        _ => return None,
    };
    Some(negated)
}

fn better_assert(op: &str, compares_none: bool) -> Option<&'static str> {
    let better = match (op, compares_none) {
        ("==" | "is", true) => "assertIsNone",
        ("!=" | "is not", true) => "assertIsNotNone",
        ("==", false) => "assertEqual",
        ("!=", false) => "assertNotEqual",
        ("in", _) => "assertIn",
        ("not in", _) => "assertNotIn",
        ("is", false) => "assertIs",
        ("is not", false) => "assertIsNot",
        ("<", _) => "assertLess",
        ("<=", _) => "assertLessEqual",
        (">", _) => "assertGreater",
        (">=", _) => "assertGreaterEqual",
        _ => return None,
    };
    Some(better)
}

impl Checker for AssertChecker {
    type State = ();

    fn name(&self) -> &'static str {
        NAME
    }

    fn description(&self) -> &'static str {
        "Checks that assertTrue/assertFalse aren't used where a precise assert exists"
    }

    fn messages(&self) -> &'static [MessageDef] {
        &[WRONG_ASSERT_TYPE]
    }

    fn register(&self, visitors: &mut Visitors<Self>) {
        visitors.visit("call", Self::visit_call);
    }
}
