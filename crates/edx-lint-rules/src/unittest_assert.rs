//! Checker that steers pytest suites away from unittest assert methods.
//!
//! Every `self.assertX(...)` call is reported with the equivalent plain
//! `assert` statement. Not part of the recommended preset.

use edx_lint_core::{CheckContext, Checker, MessageDef, Node, Visitors};

/// Checker name.
pub const NAME: &str = "unittest-assert-checker";

/// A unittest assert method was used.
pub const AVOID_UNITTEST_ASSERTS: MessageDef = MessageDef::new(
    "C7699",
    "avoid-unittest-asserts",
    "{} should be replaced with a pytest assertion something like `{}`",
    "Avoid using unittest's assertion methods when using pytest, instead use the 'assert' statement",
);

/// unittest method and its pytest replacement.
const ASSERT_MAPPING: &[(&str, &str)] = &[
    ("assertTrue", "assert arg1"),
    ("assertFalse", "assert not arg1"),
    ("assertEqual", "assert arg1 == arg2"),
    ("assertEquals", "assert arg1 == arg2"),
    ("assertNotEqual", "assert arg1 != arg2"),
    ("assertNotEquals", "assert arg1 != arg2"),
    ("assert_", "assert arg1"),
    ("assertIn", "assert arg1 in arg2"),
    ("assertNotIn", "assert arg1 not in arg2"),
    ("assertLess", "assert arg1 < arg2"),
    ("assertLessEqual", "assert arg1 <= arg2"),
    ("assertGreater", "assert arg1 > arg2"),
    ("assertGreaterEqual", "assert arg1 >= arg2"),
    ("assertAlmostEqual", "assert math.isclose(arg1, arg2)"),
    ("assertNotAlmostEqual", "assert not math.isclose(arg1, arg2)"),
    ("assertIs", "assert arg1 is arg2"),
    ("assertIsNot", "assert arg1 is not arg2"),
    ("assertIsNone", "assert arg1 is None"),
    ("assertIsNotNone", "assert arg1 is not None"),
    ("assertIsInstance", "assert isinstance(arg1, arg2)"),
    ("assertNotIsInstance", "assert not isinstance(arg1, arg2)"),
    ("assertRaises", "pytest.raises(arg) or with pytest.raises(arg) as optional_var:"),
];

/// Reports unittest assert methods.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnittestAssertChecker;

impl UnittestAssertChecker {
    /// Creates the checker.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    fn visit_call(&self, _: &mut (), ctx: &mut CheckContext<'_>, node: Node<'_>) {
        let Some(attr) = node.call_func().and_then(Node::attr_name) else {
            return;
        };
        if let Some(&(method, replacement)) = ASSERT_MAPPING.iter().find(|(m, _)| *m == attr) {
            ctx.add_message(&AVOID_UNITTEST_ASSERTS, node, &[method, replacement]);
        }
    }
}

impl Checker for UnittestAssertChecker {
    type State = ();

    fn name(&self) -> &'static str {
        NAME
    }

    fn description(&self) -> &'static str {
        "Checks for unittest assert methods in pytest suites"
    }

    fn messages(&self) -> &'static [MessageDef] {
        &[AVOID_UNITTEST_ASSERTS]
    }

    fn register(&self, visitors: &mut Visitors<Self>) {
        visitors.visit("call", Self::visit_call);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{expected, run_checker};

    #[test]
    fn test_bad_asserts() {
        let source = r#"
            import unittest

            class TestUnittestAssertions(unittest.TestCase):
                def test_wrong_usage(self):
                    self.assertEqual('foo'.upper(), 'FOO')
                    self.assertTrue(True)
                    self.assertIn("a", "lala")
        "#;
        assert_eq!(run_checker(UnittestAssertChecker::new(), source).len(), 3);
    }

    #[test]
    fn test_good_asserts() {
        let source = r#"
            import unittest

            class TestPytestAssertions(unittest.TestCase):
                def test_right_usage(self):
                    assert 'foo'.upper() == 'FOO'
                    true = True
                    assert true
                    assert not true
                    assert "a" in "lala"
                    assert 1 > 0
                    self.helper()
        "#;
        assert!(run_checker(UnittestAssertChecker::new(), source).is_empty());
    }

    #[test]
    fn test_assert_hints() {
        let cases = [
            ("assertTrue('foo'.upper() == 'FOO')", "assertTrue", "assert arg1"),
            ("assertFalse(500 == 501)", "assertFalse", "assert not arg1"),
            ("assertIn('a', 'lala')", "assertIn", "assert arg1 in arg2"),
            ("assertIsInstance(1, int)", "assertIsInstance", "assert isinstance(arg1, arg2)"),
            ("assertEqual('lala', 'lala')", "assertEqual", "assert arg1 == arg2"),
            ("assertAlmostEqual(6.999, 7)", "assertAlmostEqual", "assert math.isclose(arg1, arg2)"),
            ("assertIsNone(somevar)", "assertIsNone", "assert arg1 is None"),
        ];
        for (code, method, hint) in cases {
            let source = format!(
                r"
                import unittest

                class TestUnittestAssertions(unittest.TestCase):
                    def test_wrong_usage(self):
                        self.{code}      #=A
                "
            );
            assert_eq!(
                run_checker(UnittestAssertChecker::new(), &source),
                expected(&[&format!(
                    "A:avoid-unittest-asserts:{method} should be replaced with a pytest assertion something like `{hint}`"
                )])
            );
        }
    }
}
