//! Checker that test setup and teardown methods delegate to their parents.
//!
//! # Rationale
//!
//! A `setUp` that never reaches `TestCase.setUp` silently skips whatever
//! the parent classes prepare, which usually shows up later as confusing
//! cross-test pollution.
//!
//! # Detected Patterns
//!
//! - An override of a configured method (default `setUp`, `tearDown`,
//!   `setUpClass`, `tearDownClass`) that calls neither `super(...).m()` nor
//!   `Base.m(self)` for every direct base providing `m`
//! - `Other.m(self)` where `Other` is not a direct base
//!
//! Delegating through a local variable is recognized for the simple form
//! `base = super(...)` followed by `base.m()`.
//!
//! # Configuration
//!
//! - `method_names`: methods to verify

use edx_lint_core::{
    CheckContext, Checker, CheckerConfig, ClassId, MessageDef, Node, NodeKind, Resolution, Value,
    Visitors,
};

/// Checker name.
pub const NAME: &str = "unit-test-super-checker";

/// A base class providing the method was never called.
pub const SUPER_METHOD_NOT_CALLED: MessageDef = MessageDef::new(
    "E7601",
    "super-method-not-called",
    "super(...).{}() not called ({})",
    "setUp() must call super(...).setUp()",
);

/// The method was called on a class that is not a direct base.
pub const NON_PARENT_METHOD_CALLED: MessageDef = MessageDef::new(
    "E7602",
    "non-parent-method-called",
    "{}() was called from a non-parent class ({})",
    "setUp() should only be called for parent classes",
);

const DEFAULT_METHODS: &[&str] = &["setUp", "tearDown", "setUpClass", "tearDownClass"];

/// Verifies that setup and teardown overrides call their parents.
#[derive(Debug, Clone)]
pub struct UnitTestSuperChecker {
    method_names: Vec<String>,
}

impl Default for UnitTestSuperChecker {
    fn default() -> Self {
        Self::new()
    }
}

impl UnitTestSuperChecker {
    /// Creates a checker for the default method names.
    #[must_use]
    pub fn new() -> Self {
        Self {
            method_names: DEFAULT_METHODS.iter().map(|m| (*m).to_string()).collect(),
        }
    }

    /// Replaces the verified method names.
    #[must_use]
    pub fn method_names<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.method_names = names.into_iter().map(Into::into).collect();
        self
    }

    /// Creates a checker from configuration options.
    #[must_use]
    pub fn from_config(config: Option<&CheckerConfig>) -> Self {
        let names = config.map(|c| c.get_str_array("method_names")).unwrap_or_default();
        if names.is_empty() {
            Self::new()
        } else {
            Self::new().method_names(names)
        }
    }

    fn visit_functiondef(&self, _: &mut (), ctx: &mut CheckContext<'_>, node: Node<'_>) {
        if !node.is_method() {
            return;
        }
        let Some(method) = node.name() else {
            return;
        };
        if !self.method_names.iter().any(|m| m == method) {
            return;
        }

        let tree = ctx.tree();
        let Some(class) = node.parent().and_then(|p| tree.class_of(p)) else {
            return;
        };

        // Direct base -> class providing the method in that base's MRO.
        let to_call: Vec<(ClassId, ClassId)> = tree
            .class_bases(class)
            .into_iter()
            .filter_map(|base| tree.lookup_method(base, method).map(|provider| (base, provider)))
            .collect();
        let mut not_called = to_call.clone();

        for call in node.descendants().filter(|n| n.kind() == NodeKind::Call) {
            let Some(func) = call.call_func() else {
                continue;
            };
            if func.attr_name() != Some(method) {
                continue;
            }
            let Some(expr) = func.attr_expr() else {
                continue;
            };
            if is_super_call(expr) {
                return;
            }

            match expr.infer() {
                Resolution::Resolved(Value::Instance(instance)) if tree.is_super(instance) => {
                    return;
                }
                Resolution::Resolved(Value::Class(klass)) => {
                    if let Some(pos) = not_called.iter().position(|(base, _)| *base == klass) {
                        not_called.remove(pos);
                    } else if !to_call.iter().any(|(base, _)| *base == klass) {
                        ctx.add_message(&NON_PARENT_METHOD_CALLED, func, &[method, tree.class_name(klass)]);
                    }
                }
                Resolution::Resolved(_) | Resolution::Unknown => {}
            }
        }

        for (base, provider) in not_called {
            if tree.is_object(base) || tree.is_object(provider) {
                continue;
            }
            ctx.add_message(&SUPER_METHOD_NOT_CALLED, node, &[method, tree.class_name(provider)]);
        }
    }
}

fn is_super_call(expr: Node<'_>) -> bool {
    expr.kind() == NodeKind::Call && expr.call_func().and_then(Node::name) == Some("super")
}

impl Checker for UnitTestSuperChecker {
    type State = ();

    fn name(&self) -> &'static str {
        NAME
    }

    fn description(&self) -> &'static str {
        "Checks that test setUp/tearDown methods call their parent implementations"
    }

    fn messages(&self) -> &'static [MessageDef] {
        &[SUPER_METHOD_NOT_CALLED, NON_PARENT_METHOD_CALLED]
    }

    fn register(&self, visitors: &mut Visitors<Self>) {
        visitors.visit("functiondef", Self::visit_functiondef);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{expected, run_checker};

    #[test]
    fn test_missing_super_call_for_each_method() {
        for method in DEFAULT_METHODS {
            let source = r"
                import unittest

                class GoodTestCase(unittest.TestCase):
                    def METHOD(self):
                        super(GoodTestCase, self).METHOD()

                class BadTestCase(unittest.TestCase):
                    def METHOD(self):         #=A
                        self.i_am_bad = True

                class OldSchool(Mixin, unittest.TestCase):
                    def METHOD(self):
                        Mixin.METHOD(self)
                        unittest.TestCase.METHOD(self)

                def METHOD(xyzzy):
                    pass
            "
            .replace("METHOD", method);

            let messages = run_checker(UnitTestSuperChecker::new(), &source);
            assert_eq!(
                messages,
                expected(&[&format!(
                    "A:super-method-not-called:super(...).{method}() not called (TestCase)"
                )])
            );
        }
    }

    #[test]
    fn test_hamfisted_super() {
        let source = r#"
            import unittest

            class SomeOtherClass(object):
                def setUp(self):
                    pass

            class BadTestCase(unittest.TestCase):
                def setUp(self):
                    foo("What").setUp(self)
                    What.setUp(self)
                    SomeOtherClass.setUp(self)   #=A
                    super(BadTestCase, self).setUp()
        "#;
        let messages = run_checker(UnitTestSuperChecker::new(), source);
        assert_eq!(
            messages,
            expected(&["A:non-parent-method-called:setUp() was called from a non-parent class (SomeOtherClass)"])
        );
    }

    #[test]
    fn test_good_super() {
        let source = r"
            import unittest

            def foo_func(bar):
                pass

            class GoodTestCase(unittest.TestCase):
                def setUp(self):
                    self.foo_meth(bar)
                    foo_func(bar)
                    super(GoodTestCase, self).setUp()

                def tearDown(self):
                    base = super(GoodTestCase, self)
                    base.tearDown()

                def foo_meth(self, bar):
                    foo_func(bar)

                def test_something(self):
                    pass

            class NotSureWhatThisIs(object):
                def setUp(self):
                    pass
        ";
        assert!(run_checker(UnitTestSuperChecker::new(), source).is_empty());
    }

    #[test]
    fn test_local_parent_chain() {
        let source = r"
            from django.test import TestCase

            class Base(TestCase):
                def setUp(self):
                    super().setUp()

            class Child(Base):
                def setUp(self):     #=A
                    pass

            class Explicit(Base):
                def setUp(self):
                    Base.setUp(self)
        ";
        let messages = run_checker(UnitTestSuperChecker::new(), source);
        assert_eq!(
            messages,
            expected(&["A:super-method-not-called:super(...).setUp() not called (Base)"])
        );
    }

    #[test]
    fn test_not_called_names_defining_ancestor() {
        let source = r"
            import unittest

            class A(unittest.TestCase):
                def setUp(self):
                    super().setUp()

            class B(A):
                pass

            class C(B):
                def setUp(self):     #=A
                    pass

            class D(B):
                def setUp(self):
                    B.setUp(self)
        ";
        let messages = run_checker(UnitTestSuperChecker::new(), source);
        assert_eq!(
            messages,
            expected(&["A:super-method-not-called:super(...).setUp() not called (A)"])
        );
    }

    #[test]
    fn test_configured_method_names() {
        let source = r"
            import unittest

            class T(unittest.TestCase):
                def setUp(self):
                    pass
        ";
        let checker = UnitTestSuperChecker::new().method_names(["tearDown"]);
        assert!(run_checker(checker, source).is_empty());
    }
}
