//! Checker trait and visitor registration.
//!
//! A checker declares its messages and registers plain functions against
//! node type names:
//!
//! ```ignore
//! impl Checker for RangeChecker {
//!     type State = ();
//!
//!     fn name(&self) -> &'static str { "range-checker" }
//!     fn messages(&self) -> &'static [MessageDef] { &[SIMPLIFIABLE_RANGE] }
//!
//!     fn register(&self, visitors: &mut Visitors<Self>) {
//!         visitors.visit("call", Self::visit_call);
//!     }
//! }
//! ```
//!
//! Node type names are matched case-insensitively. A name that is not a
//! known node type is a definition-time error reported by [`register`].

use crate::context::CheckContext;
use crate::tree::{Node, NodeId, NodeKind};
use crate::types::MessageDef;

use std::collections::HashMap;

/// Handler invoked when entering or leaving a node.
pub type Handler<C> = fn(&C, &mut <C as Checker>::State, &mut CheckContext<'_>, Node<'_>);

/// A lint checker that reacts to syntax nodes.
pub trait Checker: Send + Sync + Sized + 'static {
    /// Per-module scratch state, created fresh for every file.
    type State: Default;

    /// Unique checker name (e.g., "unit-test-super-checker").
    fn name(&self) -> &'static str;

    /// Human-readable description.
    fn description(&self) -> &'static str {
        ""
    }

    /// Messages this checker can emit.
    fn messages(&self) -> &'static [MessageDef];

    /// Registers node handlers.
    fn register(&self, visitors: &mut Visitors<Self>);
}

/// Errors raised while registering checkers.
#[derive(Debug, thiserror::Error, miette::Diagnostic)]
pub enum RegistryError {
    /// A handler names a node type that does not exist.
    #[error("{checker}: Method {method} doesn't correspond to a node class")]
    #[diagnostic(code(edx_lint::registry::unknown_node_type), help("known node types: {known}"))]
    UnknownNodeType {
        /// Checker name.
        checker: String,
        /// Handler spelled as `visit_<type>` or `leave_<type>`.
        method: String,
        /// Comma-separated list of valid node types.
        known: String,
    },

    /// Two checkers share a name.
    #[error("duplicate checker name: {0}")]
    #[diagnostic(code(edx_lint::registry::duplicate_checker))]
    DuplicateChecker(String),

    /// Two checkers define the same message code or symbol.
    #[error("message {message} is defined by both {first} and {second}")]
    #[diagnostic(code(edx_lint::registry::duplicate_message))]
    DuplicateMessage {
        /// Conflicting code or symbol.
        message: String,
        /// First checker defining it.
        first: String,
        /// Second checker defining it.
        second: String,
    },
}

/// Handler table under construction for one checker.
pub struct Visitors<C: Checker> {
    checker: &'static str,
    visit: HashMap<NodeKind, Vec<Handler<C>>>,
    leave: HashMap<NodeKind, Vec<Handler<C>>>,
    error: Option<RegistryError>,
}

impl<C: Checker> Visitors<C> {
    fn new(checker: &'static str) -> Self {
        Self {
            checker,
            visit: HashMap::new(),
            leave: HashMap::new(),
            error: None,
        }
    }

    /// Registers `handler` to run when entering nodes of `node_type`.
    pub fn visit(&mut self, node_type: &str, handler: Handler<C>) -> &mut Self {
        self.add("visit", node_type, handler);
        self
    }

    /// Registers `handler` to run when leaving nodes of `node_type`.
    pub fn leave(&mut self, node_type: &str, handler: Handler<C>) -> &mut Self {
        self.add("leave", node_type, handler);
        self
    }

    fn add(&mut self, phase: &str, node_type: &str, handler: Handler<C>) {
        match NodeKind::from_name(node_type) {
            Some(kind) => {
                let table = if phase == "visit" {
                    &mut self.visit
                } else {
                    &mut self.leave
                };
                table.entry(kind).or_default().push(handler);
            }
            None => {
                if self.error.is_none() {
                    self.error = Some(RegistryError::UnknownNodeType {
                        checker: self.checker.to_string(),
                        method: format!("{phase}_{}", node_type.to_ascii_lowercase()),
                        known: known_node_types(),
                    });
                }
            }
        }
    }
}

fn known_node_types() -> String {
    [
        NodeKind::Module,
        NodeKind::ClassDef,
        NodeKind::FunctionDef,
        NodeKind::Call,
        NodeKind::Keyword,
        NodeKind::Name,
        NodeKind::Attribute,
        NodeKind::Const,
        NodeKind::JoinedStr,
        NodeKind::Dict,
        NodeKind::List,
        NodeKind::Tuple,
        NodeKind::Set,
        NodeKind::Compare,
        NodeKind::Assign,
        NodeKind::Import,
        NodeKind::ImportFrom,
    ]
    .iter()
    .map(|k| k.name())
    .collect::<Vec<_>>()
    .join(", ")
}

/// Object-safe view of a registered checker.
pub trait RegisteredChecker: Send + Sync {
    /// Checker name.
    fn name(&self) -> &'static str;

    /// Checker description.
    fn description(&self) -> &'static str;

    /// Messages the checker can emit.
    fn messages(&self) -> &'static [MessageDef];

    /// Node types with at least one handler.
    fn node_types(&self) -> Vec<NodeKind>;

    /// Runs the checker over one module.
    fn check_module(&self, ctx: &mut CheckContext<'_>);
}

/// Type alias for boxed registered checkers.
pub type CheckerBox = Box<dyn RegisteredChecker>;

struct Registered<C: Checker> {
    checker: C,
    visit: HashMap<NodeKind, Vec<Handler<C>>>,
    leave: HashMap<NodeKind, Vec<Handler<C>>>,
}

enum Step {
    Enter(NodeId),
    Leave(NodeId),
}

impl<C: Checker> RegisteredChecker for Registered<C> {
    fn name(&self) -> &'static str {
        self.checker.name()
    }

    fn description(&self) -> &'static str {
        self.checker.description()
    }

    fn messages(&self) -> &'static [MessageDef] {
        self.checker.messages()
    }

    fn node_types(&self) -> Vec<NodeKind> {
        let mut kinds: Vec<NodeKind> = self.visit.keys().chain(self.leave.keys()).copied().collect();
        kinds.sort_by_key(|k| k.name());
        kinds.dedup();
        kinds
    }

    fn check_module(&self, ctx: &mut CheckContext<'_>) {
        let tree = ctx.tree();
        let mut state = C::State::default();
        let mut stack = vec![Step::Enter(tree.root().id())];

        while let Some(step) = stack.pop() {
            match step {
                Step::Enter(id) => {
                    let node = tree.node(id);
                    if let Some(handlers) = self.visit.get(&node.kind()) {
                        for handler in handlers {
                            handler(&self.checker, &mut state, ctx, node);
                        }
                    }
                    stack.push(Step::Leave(id));
                    let children: Vec<NodeId> = node.children().map(Node::id).collect();
                    stack.extend(children.into_iter().rev().map(Step::Enter));
                }
                Step::Leave(id) => {
                    let node = tree.node(id);
                    if let Some(handlers) = self.leave.get(&node.kind()) {
                        for handler in handlers {
                            handler(&self.checker, &mut state, ctx, node);
                        }
                    }
                }
            }
        }
    }
}

/// Validates a checker's handler table and boxes it.
///
/// # Errors
///
/// Returns [`RegistryError::UnknownNodeType`] if any handler names a node
/// type that does not exist.
pub fn register<C: Checker>(checker: C) -> Result<CheckerBox, RegistryError> {
    let mut visitors = Visitors::new(checker.name());
    checker.register(&mut visitors);
    if let Some(error) = visitors.error {
        return Err(error);
    }
    Ok(Box::new(Registered {
        checker,
        visit: visitors.visit,
        leave: visitors.leave,
    }))
}

/// Checks that checker names, message codes and symbols are unique.
///
/// # Errors
///
/// Returns the first duplicate found.
pub fn check_unique(checkers: &[CheckerBox]) -> Result<(), RegistryError> {
    let mut names: HashMap<&str, ()> = HashMap::new();
    let mut messages: HashMap<&str, &str> = HashMap::new();
    for checker in checkers {
        if names.insert(checker.name(), ()).is_some() {
            return Err(RegistryError::DuplicateChecker(checker.name().to_string()));
        }
        for def in checker.messages() {
            for key in [def.code, def.symbol] {
                if let Some(first) = messages.insert(key, checker.name()) {
                    if first != checker.name() {
                        return Err(RegistryError::DuplicateMessage {
                            message: key.to_string(),
                            first: first.to_string(),
                            second: checker.name().to_string(),
                        });
                    }
                }
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::annotations::AnnotationIndex;
    use crate::config::Config;
    use crate::context::FileContext;
    use crate::tree::SourceTree;
    use std::path::Path;

    const NAME_SEEN: MessageDef = MessageDef::new("C9901", "name-seen", "saw {}", "");

    struct Recorder;

    #[derive(Default)]
    struct Trace {
        events: Vec<String>,
    }

    impl Recorder {
        fn enter(&self, state: &mut Trace, _ctx: &mut CheckContext<'_>, node: Node<'_>) {
            state.events.push(format!("+{}", node.kind()));
        }

        fn exit(&self, state: &mut Trace, ctx: &mut CheckContext<'_>, node: Node<'_>) {
            state.events.push(format!("-{}", node.kind()));
            if node.kind() == NodeKind::Module {
                let joined = state.events.join(" ");
                ctx.add_message(&NAME_SEEN, node, &[&joined]);
            }
        }
    }

    impl Checker for Recorder {
        type State = Trace;

        fn name(&self) -> &'static str {
            "recorder"
        }

        fn messages(&self) -> &'static [MessageDef] {
            &[NAME_SEEN]
        }

        fn register(&self, visitors: &mut Visitors<Self>) {
            visitors
                .visit("Module", Self::enter)
                .visit("CALLFUNC", Self::enter)
                .leave("call", Self::exit)
                .leave("module", Self::exit);
        }
    }

    struct Broken;

    impl Checker for Broken {
        type State = ();

        fn name(&self) -> &'static str {
            "broken"
        }

        fn messages(&self) -> &'static [MessageDef] {
            &[]
        }

        fn register(&self, visitors: &mut Visitors<Self>) {
            visitors.visit("xyzzy", |_, _, _, _| {});
        }
    }

    #[test]
    fn test_unknown_node_type_is_rejected() {
        let err = register(Broken).err().expect("registration should fail");
        assert!(err
            .to_string()
            .contains("Method visit_xyzzy doesn't correspond to a node class"));
        assert!(err.to_string().starts_with("broken:"));
    }

    #[test]
    fn test_walk_order_and_case_insensitive_names() {
        let checker = register(Recorder).expect("register");
        let tree = SourceTree::parse_str("f(g())\n").expect("parse");
        let annotations = AnnotationIndex::new(tree.text());
        let file = FileContext::new(Path::new("m.py"), &tree, &annotations, Path::new("."));
        let config = Config::default();
        let mut ctx = CheckContext::new(&file, &config, checker.name());

        checker.check_module(&mut ctx);

        let diags = ctx.into_diagnostics();
        assert_eq!(diags.len(), 1);
        assert_eq!(
            diags[0].message,
            "saw +module +call +call -call -call -module"
        );
        assert_eq!(checker.node_types(), vec![NodeKind::Call, NodeKind::Module]);
    }

    #[test]
    fn test_duplicate_messages_detected() {
        let checkers = vec![register(Recorder).unwrap(), register(Recorder).unwrap()];
        assert!(matches!(
            check_unique(&checkers),
            Err(RegistryError::DuplicateChecker(_))
        ));
    }
}
