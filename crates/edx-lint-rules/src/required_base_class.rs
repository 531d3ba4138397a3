//! Checker for classes missing a base class required by one of their
//! other bases.
//!
//! # Configuration
//!
//! ```toml
//! [checkers.required-base-class-checker]
//! required_base_class = ["unittest.case.TestCase:myproject.tests.TestMixin"]
//! ```
//!
//! Each entry reads `Child:Parent`: any class with `Child` in its MRO must
//! also have `Parent`. Names are fully qualified; local classes are
//! qualified by their module name.

use edx_lint_core::{CheckContext, Checker, CheckerConfig, MessageDef, Node, Visitors};
use std::collections::{BTreeMap, BTreeSet};
use tracing::warn;

/// Checker name.
pub const NAME: &str = "required-base-class-checker";

/// A required base class is absent from the MRO.
pub const MISSING_REQUIRED_BASE_CLASS: MessageDef = MessageDef::new(
    "E7645",
    "missing-required-base-class",
    "class {} is missing required base class {}",
    "Used when a class is missing a base class required by one of its other base classes.",
);

/// Enforces configured base class pairs.
#[derive(Debug, Clone, Default)]
pub struct RequiredBaseClassChecker {
    class_map: BTreeMap<String, BTreeSet<String>>,
}

impl RequiredBaseClassChecker {
    /// Creates a checker with no requirements.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Requires `parent` on every class deriving from `child`.
    #[must_use]
    pub fn require(mut self, child: impl Into<String>, parent: impl Into<String>) -> Self {
        self.class_map
            .entry(child.into())
            .or_default()
            .insert(parent.into());
        self
    }

    /// Creates a checker from configuration options.
    #[must_use]
    pub fn from_config(config: Option<&CheckerConfig>) -> Self {
        let pairs = config
            .map(|c| c.get_str_array("required_base_class"))
            .unwrap_or_default();
        pairs.iter().fold(Self::new(), |checker, pair| match pair.split_once(':') {
            Some((child, parent)) => checker.require(child.trim(), parent.trim()),
            None => {
                warn!("Ignoring malformed required_base_class entry: {}", pair);
                checker
            }
        })
    }

    fn visit_classdef(&self, _: &mut (), ctx: &mut CheckContext<'_>, node: Node<'_>) {
        if self.class_map.is_empty() {
            return;
        }
        let tree = ctx.tree();
        let Some(class) = tree.class_of(node) else {
            return;
        };
        let Some(mro) = tree.mro(class).resolved() else {
            return;
        };

        let module = ctx.module_name();
        let all_bases: Vec<String> = mro
            .into_iter()
            .map(|c| tree.qualified_name(c, module))
            .collect();

        for base in &all_bases {
            let Some(required) = self.class_map.get(base) else {
                continue;
            };
            if required.iter().all(|r| all_bases.contains(r)) {
                continue;
            }
            let nice_required = required.iter().map(String::as_str).collect::<Vec<_>>().join(", ");
            ctx.add_message(
                &MISSING_REQUIRED_BASE_CLASS,
                node,
                &[node.name().unwrap_or_default(), &nice_required],
            );
        }
    }
}

impl Checker for RequiredBaseClassChecker {
    type State = ();

    fn name(&self) -> &'static str {
        NAME
    }

    fn description(&self) -> &'static str {
        "Checks that classes have the base classes their other bases require"
    }

    fn messages(&self) -> &'static [MessageDef] {
        &[MISSING_REQUIRED_BASE_CLASS]
    }

    fn register(&self, visitors: &mut Visitors<Self>) {
        visitors.visit("classdef", Self::visit_classdef);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{expected, run_checker, run_checker_with};
    use edx_lint_core::Config;

    fn configured() -> RequiredBaseClassChecker {
        RequiredBaseClassChecker::new().require("unittest.case.TestCase", "source.MyTestMixin")
    }

    #[test]
    fn test_no_messages_by_default() {
        let source = r"
            class MyClass(object):
                pass
        ";
        assert!(run_checker(RequiredBaseClassChecker::new(), source).is_empty());
    }

    #[test]
    fn test_no_messages_if_class_not_used() {
        let source = r"
            class MyClass(object):
                pass
        ";
        let checker = RequiredBaseClassChecker::new().require("BaseClass", "MyMixin");
        assert!(run_checker(checker, source).is_empty());
    }

    #[test]
    fn test_error_if_class_is_not_used() {
        let source = r"
            from unittest import TestCase
            class MyClass(TestCase):     #=A
                pass
        ";
        assert_eq!(
            run_checker(configured(), source),
            expected(&["A:missing-required-base-class:class MyClass is missing required base class source.MyTestMixin"])
        );
    }

    #[test]
    fn test_no_messages_if_class_is_used() {
        let source = r"
            from unittest import TestCase
            class MyTestMixin(object):
                pass
            class MyClass(MyTestMixin, TestCase):
                pass
        ";
        assert!(run_checker(configured(), source).is_empty());
    }

    #[test]
    fn test_requirements_are_listed_sorted() {
        let source = r"
            import unittest
            class T(unittest.TestCase):     #=A
                pass
        ";
        let checker = configured().require("unittest.case.TestCase", "source.AMixin");
        assert_eq!(
            run_checker(checker, source),
            expected(&["A:missing-required-base-class:class T is missing required base class source.AMixin, source.MyTestMixin"])
        );
    }

    #[test]
    fn test_from_config() {
        let config = Config::parse(
            r#"
            [checkers.required-base-class-checker]
            required_base_class = ["unittest.case.TestCase:source.MyTestMixin", "malformed"]
            "#,
        )
        .unwrap();
        let checker = RequiredBaseClassChecker::from_config(config.checker(NAME));
        assert_eq!(checker.class_map.len(), 1);

        let source = r"
            import unittest
            class T(unittest.TestCase):     #=A
                pass
        ";
        assert_eq!(
            run_checker_with(checker, config, source),
            expected(&["A:missing-required-base-class:class T is missing required base class source.MyTestMixin"])
        );
    }
}
