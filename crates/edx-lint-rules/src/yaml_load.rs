//! Checker for unsafe `yaml.load()` calls.
//!
//! PyYAML's `load()` and `load_all()` can construct arbitrary Python
//! objects from untrusted input (CVE-2017-18342). `safe_load()` and
//! `safe_load_all()` cannot.

use edx_lint_core::{CheckContext, Checker, MessageDef, Node, Visitors};

/// Checker name.
pub const NAME: &str = "yaml-load-checker";

/// Unsafe yaml loader call.
pub const UNSAFE_YAML_LOAD: MessageDef = MessageDef::new(
    "C7657",
    "unsafe-yaml-load",
    "yaml.load{}() call is unsafe, use yaml.safe_load{}()",
    "yaml.load*() is unsafe",
);

const UNSAFE_CALLS: &[&str] = &["yaml.load", "yaml.load_all"];

/// Flags `yaml.load` and `yaml.load_all`.
#[derive(Debug, Clone, Copy, Default)]
pub struct YamlLoadChecker;

impl YamlLoadChecker {
    /// Creates the checker.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    fn visit_call(&self, _: &mut (), ctx: &mut CheckContext<'_>, node: Node<'_>) {
        let Some(func) = node.call_func() else {
            return;
        };
        let func_name = func.source();
        if !UNSAFE_CALLS.contains(&func_name) {
            return;
        }
        let suffix = func_name.strip_prefix("yaml.load").unwrap_or_default();
        ctx.add_message(&UNSAFE_YAML_LOAD, node, &[suffix, suffix]);
    }
}

impl Checker for YamlLoadChecker {
    type State = ();

    fn name(&self) -> &'static str {
        NAME
    }

    fn description(&self) -> &'static str {
        "Checks for unsafe yaml.load() calls"
    }

    fn messages(&self) -> &'static [MessageDef] {
        &[UNSAFE_YAML_LOAD]
    }

    fn register(&self, visitors: &mut Visitors<Self>) {
        visitors.visit("call", Self::visit_call);
    }
}
