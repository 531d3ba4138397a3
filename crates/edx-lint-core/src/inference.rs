//! Best-effort static inference over a [`SourceTree`].
//!
//! Resolution is deliberately shallow: names resolve through the
//! enclosing function and module scopes, imports resolve to dotted
//! module paths, and a small table of well-known library classes stands
//! in for everything outside the file. Anything else is
//! [`Resolution::Unknown`], which checkers must treat as "skip".

use crate::tree::{Literal, Node, NodeId, NodeKind, SourceTree};

use std::collections::HashMap;

const MAX_DEPTH: usize = 24;

/// Outcome of an inference query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution<T> {
    /// The value was determined.
    Resolved(T),
    /// The value could not be determined.
    Unknown,
}

impl<T> Resolution<T> {
    /// Converts into an `Option`.
    #[must_use]
    pub fn resolved(self) -> Option<T> {
        match self {
            Self::Resolved(v) => Some(v),
            Self::Unknown => None,
        }
    }

    /// Returns true when unresolved.
    #[must_use]
    pub fn is_unknown(&self) -> bool {
        matches!(self, Self::Unknown)
    }
}

impl<T> From<Option<T>> for Resolution<T> {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Unknown, Self::Resolved)
    }
}

/// Identity of a class: defined in this file or taken from the
/// well-known class table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ClassId {
    /// `ClassDef` node in the current tree.
    Local(NodeId),
    /// Entry in the well-known class table.
    Known(usize),
}

/// Inferred value of an expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    /// A class object.
    Class(ClassId),
    /// An instance of a class.
    Instance(ClassId),
    /// A module, or a dotted path that could not be narrowed further.
    Module(String),
    /// A function defined in this file.
    Function(NodeId),
    /// A literal constant.
    Const,
}

struct KnownClass {
    qname: &'static str,
    bases: &'static [&'static str],
    methods: &'static [&'static str],
}

const OBJECT: usize = 0;
const SUPER: usize = 1;

static KNOWN_CLASSES: &[KnownClass] = &[
    KnownClass {
        qname: "builtins.object",
        bases: &[],
        methods: &["__init__", "__new__", "__repr__", "__str__", "__eq__", "__hash__"],
    },
    KnownClass {
        qname: "builtins.super",
        bases: &["builtins.object"],
        methods: &["__init__", "__getattribute__"],
    },
    KnownClass {
        qname: "unittest.case.TestCase",
        bases: &["builtins.object"],
        methods: &[
            "__init__",
            "setUp",
            "tearDown",
            "setUpClass",
            "tearDownClass",
            "addCleanup",
            "doCleanups",
            "run",
            "debug",
            "skipTest",
        ],
    },
    KnownClass {
        qname: "django.test.testcases.SimpleTestCase",
        bases: &["unittest.case.TestCase"],
        methods: &["setUpClass", "tearDownClass", "__call__", "settings"],
    },
    KnownClass {
        qname: "django.test.testcases.TransactionTestCase",
        bases: &["django.test.testcases.SimpleTestCase"],
        methods: &["_pre_setup", "_post_teardown"],
    },
    KnownClass {
        qname: "django.test.testcases.TestCase",
        bases: &["django.test.testcases.TransactionTestCase"],
        methods: &["setUpClass", "tearDownClass", "setUpTestData"],
    },
    KnownClass {
        qname: "openedx_filters.tooling.OpenEdxPublicFilter",
        bases: &["builtins.object"],
        methods: &["run_pipeline", "get_pipeline_configuration"],
    },
];

static ALIASES: &[(&str, &str)] = &[
    ("unittest.TestCase", "unittest.case.TestCase"),
    ("django.test.TestCase", "django.test.testcases.TestCase"),
    ("django.test.SimpleTestCase", "django.test.testcases.SimpleTestCase"),
    (
        "django.test.TransactionTestCase",
        "django.test.testcases.TransactionTestCase",
    ),
    (
        "openedx_filters.OpenEdxPublicFilter",
        "openedx_filters.tooling.OpenEdxPublicFilter",
    ),
    ("object", "builtins.object"),
    ("super", "builtins.super"),
];

fn known_index(qname: &str) -> Option<usize> {
    let canonical = ALIASES
        .iter()
        .find(|(alias, _)| *alias == qname)
        .map_or(qname, |(_, target)| target);
    KNOWN_CLASSES.iter().position(|k| k.qname == canonical)
}

fn resolve_qualified(qname: &str) -> Value {
    known_index(qname).map_or_else(|| Value::Module(qname.to_string()), |i| {
        Value::Class(ClassId::Known(i))
    })
}

#[derive(Debug, Clone)]
enum BindingKind {
    Class(NodeId),
    Function(NodeId),
    Module(String),
    Value(NodeId),
    Unknown,
}

#[derive(Debug, Clone)]
struct Binding {
    line: usize,
    site: NodeId,
    kind: BindingKind,
}

/// Name bindings per frame (module, class body or function body).
#[derive(Debug, Default)]
pub(crate) struct Scopes {
    frames: HashMap<NodeId, HashMap<String, Vec<Binding>>>,
}

impl Scopes {
    pub(crate) fn collect(tree: &SourceTree) -> Self {
        let mut scopes = Self::default();
        for node in tree.nodes() {
            match node.kind() {
                NodeKind::ClassDef | NodeKind::FunctionDef => {
                    let Some(name) = node.name() else { continue };
                    let kind = if node.kind() == NodeKind::ClassDef {
                        BindingKind::Class(node.id())
                    } else {
                        BindingKind::Function(node.id())
                    };
                    scopes.bind(node.frame().id(), name, node.line(), node.id(), kind);
                    for param in node.params() {
                        scopes.bind(node.id(), param, node.line(), node.id(), BindingKind::Unknown);
                    }
                }
                NodeKind::Assign => {
                    let frame = node.frame().id();
                    let value = node.assign_value().map(Node::id);
                    for target in node.assign_targets() {
                        scopes.bind_target(frame, target, value, node);
                    }
                }
                NodeKind::Import => {
                    let frame = node.frame().id();
                    for import in node.import_names() {
                        let (bound, module) = match &import.alias {
                            Some(alias) => (alias.as_str(), import.name.clone()),
                            None => {
                                let head = import.name.split('.').next().unwrap_or_default();
                                (head, head.to_string())
                            }
                        };
                        scopes.bind(frame, bound, node.line(), node.id(), BindingKind::Module(module));
                    }
                }
                NodeKind::ImportFrom => {
                    let frame = node.frame().id();
                    let relative = matches!(
                        node.payload(),
                        crate::tree::Payload::ImportFrom { level, .. } if *level > 0
                    );
                    let module = node.import_module().unwrap_or_default();
                    for import in node.import_names() {
                        if import.name == "*" {
                            continue;
                        }
                        let bound = import.alias.as_deref().unwrap_or(&import.name);
                        let kind = if relative {
                            BindingKind::Unknown
                        } else {
                            BindingKind::Module(format!("{module}.{}", import.name))
                        };
                        scopes.bind(frame, bound, node.line(), node.id(), kind);
                    }
                }
                _ => {}
            }
        }
        scopes
    }

    fn bind(&mut self, frame: NodeId, name: &str, line: usize, site: NodeId, kind: BindingKind) {
        self.frames
            .entry(frame)
            .or_default()
            .entry(name.to_string())
            .or_default()
            .push(Binding { line, site, kind });
    }

    fn bind_target(&mut self, frame: NodeId, target: Node<'_>, value: Option<NodeId>, site: Node<'_>) {
        match target.kind() {
            NodeKind::Name => {
                let kind = value.map_or(BindingKind::Unknown, BindingKind::Value);
                if let Some(name) = target.name() {
                    self.bind(frame, name, site.line(), site.id(), kind);
                }
            }
            NodeKind::Tuple | NodeKind::List => {
                for element in target.elements() {
                    self.bind_target(frame, element, None, site);
                }
            }
            _ => {}
        }
    }

    fn get(&self, frame: NodeId, name: &str) -> Option<&[Binding]> {
        self.frames
            .get(&frame)
            .and_then(|f| f.get(name))
            .map(Vec::as_slice)
    }
}

fn lookup(node: Node<'_>, name: &str) -> Option<Binding> {
    let tree = node.tree();
    let line = node.line();
    let mut frame = node.frame();
    let mut innermost = true;
    loop {
        if innermost || frame.kind() != NodeKind::ClassDef {
            if let Some(bindings) = tree.scopes.get(frame.id(), name) {
                let pick = if innermost {
                    bindings
                        .iter()
                        .rev()
                        .find(|b| {
                            b.line <= line
                                && !(matches!(b.kind, BindingKind::Value(_))
                                    && node.ancestors().any(|a| a.id() == b.site))
                        })
                        .or_else(|| bindings.last())
                } else {
                    bindings.last()
                };
                if let Some(binding) = pick {
                    return Some(binding.clone());
                }
            }
        }
        if frame.kind() == NodeKind::Module {
            return None;
        }
        frame = frame.frame();
        innermost = false;
    }
}

fn infer_node(node: Node<'_>, depth: usize) -> Resolution<Value> {
    if depth > MAX_DEPTH {
        return Resolution::Unknown;
    }
    let tree = node.tree();
    match node.kind() {
        NodeKind::Name => {
            let Some(name) = node.name() else {
                return Resolution::Unknown;
            };
            match lookup(node, name) {
                Some(binding) => match binding.kind {
                    BindingKind::Class(id) => Resolution::Resolved(Value::Class(ClassId::Local(id))),
                    BindingKind::Function(id) => Resolution::Resolved(Value::Function(id)),
                    BindingKind::Module(path) => Resolution::Resolved(resolve_qualified(&path)),
                    BindingKind::Value(expr) => infer_node(tree.node(expr), depth + 1),
                    BindingKind::Unknown => Resolution::Unknown,
                },
                None => match name {
                    "object" => Resolution::Resolved(Value::Class(ClassId::Known(OBJECT))),
                    "super" => Resolution::Resolved(Value::Class(ClassId::Known(SUPER))),
                    _ => Resolution::Unknown,
                },
            }
        }
        NodeKind::Attribute => {
            let (Some(attr), Some(expr)) = (node.attr_name(), node.attr_expr()) else {
                return Resolution::Unknown;
            };
            match infer_node(expr, depth + 1) {
                Resolution::Resolved(Value::Module(path)) => {
                    Resolution::Resolved(resolve_qualified(&format!("{path}.{attr}")))
                }
                _ => Resolution::Unknown,
            }
        }
        NodeKind::Call => match node.call_func().map(|f| infer_node(f, depth + 1)) {
            Some(Resolution::Resolved(Value::Class(class))) => {
                Resolution::Resolved(Value::Instance(class))
            }
            _ => Resolution::Unknown,
        },
        NodeKind::Const => Resolution::Resolved(Value::Const),
        NodeKind::ClassDef => Resolution::Resolved(Value::Class(ClassId::Local(node.id()))),
        NodeKind::FunctionDef => Resolution::Resolved(Value::Function(node.id())),
        _ => Resolution::Unknown,
    }
}

impl Node<'_> {
    /// Infers the value of this expression.
    #[must_use]
    pub fn infer(self) -> Resolution<Value> {
        infer_node(self, 0)
    }

    /// Infers this expression as a class object.
    #[must_use]
    pub fn infer_class(self) -> Option<ClassId> {
        match self.infer() {
            Resolution::Resolved(Value::Class(class)) => Some(class),
            _ => None,
        }
    }
}

impl SourceTree {
    /// Class id for a `ClassDef` node.
    #[must_use]
    pub fn class_of(&self, node: Node<'_>) -> Option<ClassId> {
        (node.kind() == NodeKind::ClassDef).then_some(ClassId::Local(node.id()))
    }

    /// `ClassDef` node of a local class.
    #[must_use]
    pub fn class_node(&self, class: ClassId) -> Option<Node<'_>> {
        match class {
            ClassId::Local(id) => Some(self.node(id)),
            ClassId::Known(_) => None,
        }
    }

    /// Short class name.
    #[must_use]
    pub fn class_name(&self, class: ClassId) -> &str {
        match class {
            ClassId::Local(id) => self.node(id).name().unwrap_or_default(),
            ClassId::Known(i) => KNOWN_CLASSES[i]
                .qname
                .rsplit('.')
                .next()
                .unwrap_or_default(),
        }
    }

    /// Fully qualified class name. Local classes are prefixed with
    /// `module` and any enclosing definitions; `builtins.` is dropped.
    #[must_use]
    pub fn qualified_name(&self, class: ClassId, module: &str) -> String {
        match class {
            ClassId::Known(i) => {
                let qname = KNOWN_CLASSES[i].qname;
                qname.strip_prefix("builtins.").unwrap_or(qname).to_string()
            }
            ClassId::Local(id) => {
                let node = self.node(id);
                let mut parts: Vec<&str> = node
                    .ancestors()
                    .filter(|a| matches!(a.kind(), NodeKind::ClassDef | NodeKind::FunctionDef))
                    .filter_map(Node::name)
                    .collect();
                parts.reverse();
                parts.push(node.name().unwrap_or_default());
                format!("{module}.{}", parts.join("."))
            }
        }
    }

    /// Directly declared bases that could be resolved.
    #[must_use]
    pub fn class_bases(&self, class: ClassId) -> Vec<ClassId> {
        match class {
            ClassId::Local(id) => {
                let node = self.node(id);
                let bases = node.class_bases();
                if bases.is_empty() {
                    return vec![ClassId::Known(OBJECT)];
                }
                bases.into_iter().filter_map(Node::infer_class).collect()
            }
            ClassId::Known(i) => KNOWN_CLASSES[i]
                .bases
                .iter()
                .filter_map(|b| known_index(b))
                .map(ClassId::Known)
                .collect(),
        }
    }

    fn linearize(&self, class: ClassId, depth: usize) -> Option<Vec<ClassId>> {
        if depth > MAX_DEPTH {
            return None;
        }
        let bases = self.class_bases(class);
        let mut seqs = Vec::with_capacity(bases.len() + 1);
        for base in &bases {
            seqs.push(self.linearize(*base, depth + 1)?);
        }
        seqs.push(bases);

        let mut result = vec![class];
        loop {
            seqs.retain(|s| !s.is_empty());
            if seqs.is_empty() {
                return Some(result);
            }
            let head = seqs
                .iter()
                .map(|s| s[0])
                .find(|c| !seqs.iter().any(|s| s[1..].contains(c)))?;
            result.push(head);
            for seq in &mut seqs {
                if seq.first() == Some(&head) {
                    seq.remove(0);
                }
            }
        }
    }

    /// C3 method resolution order, starting with `class` itself.
    ///
    /// Bases that cannot be resolved are dropped. Inconsistent or cyclic
    /// hierarchies are [`Resolution::Unknown`].
    #[must_use]
    pub fn mro(&self, class: ClassId) -> Resolution<Vec<ClassId>> {
        match self.linearize(class, 0) {
            Some(mut order) => {
                let object = ClassId::Known(OBJECT);
                if !order.contains(&object) {
                    order.push(object);
                }
                Resolution::Resolved(order)
            }
            None => Resolution::Unknown,
        }
    }

    /// Ancestors in MRO order, excluding `class`.
    #[must_use]
    pub fn ancestors_of(&self, class: ClassId) -> Vec<ClassId> {
        self.mro(class)
            .resolved()
            .map(|order| order.into_iter().skip(1).collect())
            .unwrap_or_default()
    }

    /// Names of methods defined directly on `class`.
    #[must_use]
    pub fn method_names(&self, class: ClassId) -> Vec<&str> {
        match class {
            ClassId::Local(id) => self
                .node(id)
                .children()
                .filter(|c| c.kind() == NodeKind::FunctionDef)
                .filter_map(Node::name)
                .collect(),
            ClassId::Known(i) => KNOWN_CLASSES[i].methods.to_vec(),
        }
    }

    /// Returns true if `class` itself defines `method`.
    #[must_use]
    pub fn defines_method(&self, class: ClassId, method: &str) -> bool {
        self.method_names(class).contains(&method)
    }

    /// First class in the MRO of `class` defining `method`.
    #[must_use]
    pub fn lookup_method(&self, class: ClassId, method: &str) -> Option<ClassId> {
        let order = self.mro(class).resolved().unwrap_or_else(|| vec![class]);
        order.into_iter().find(|c| self.defines_method(*c, method))
    }

    /// Returns true if a well-known class named `qname` is in the MRO.
    #[must_use]
    pub fn is_subtype_of(&self, class: ClassId, qname: &str) -> bool {
        let Some(target) = known_index(qname).map(ClassId::Known) else {
            return false;
        };
        self.mro(class)
            .resolved()
            .is_some_and(|order| order.contains(&target))
    }

    /// Literal assigned to `name` directly in the class body.
    #[must_use]
    pub fn class_local_literal(&self, class: ClassId, name: &str) -> Option<&Literal> {
        let ClassId::Local(id) = class else {
            return None;
        };
        self.node(id)
            .children()
            .filter(|c| c.kind() == NodeKind::Assign)
            .find(|assign| {
                assign
                    .assign_targets()
                    .iter()
                    .any(|t| t.name() == Some(name))
            })
            .and_then(Node::assign_value)
            .and_then(Node::literal)
    }

    /// Returns true if `class` is the builtin `object`.
    #[must_use]
    pub fn is_object(&self, class: ClassId) -> bool {
        class == ClassId::Known(OBJECT)
    }

    /// Returns true if `class` is the builtin `super`.
    #[must_use]
    pub fn is_super(&self, class: ClassId) -> bool {
        class == ClassId::Known(SUPER)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(src: &str) -> SourceTree {
        SourceTree::parse_str(src).expect("parse failed")
    }

    fn class_named(tree: &SourceTree, name: &str) -> ClassId {
        let node = tree
            .nodes()
            .find(|n| n.kind() == NodeKind::ClassDef && n.name() == Some(name))
            .expect("class not found");
        ClassId::Local(node.id())
    }

    #[test]
    fn test_import_resolves_known_class() {
        let tree = parse("import unittest\nclass T(unittest.TestCase):\n    pass\n");
        let t = class_named(&tree, "T");
        assert!(tree.is_subtype_of(t, "unittest.case.TestCase"));
        assert_eq!(tree.qualified_name(t, "pkg.mod"), "pkg.mod.T");
        let names: Vec<_> = tree
            .mro(t)
            .resolved()
            .expect("mro")
            .into_iter()
            .map(|c| tree.qualified_name(c, ""))
            .collect();
        assert_eq!(names, vec![".T", "unittest.case.TestCase", "object"]);
    }

    #[test]
    fn test_from_import_and_alias() {
        let tree = parse("from django.test import TestCase as DTC\nclass T(DTC):\n    pass\n");
        let t = class_named(&tree, "T");
        assert!(tree.is_subtype_of(t, "unittest.case.TestCase"));
        assert_eq!(
            tree.lookup_method(t, "setUpClass")
                .map(|c| tree.qualified_name(c, "")),
            Some("django.test.testcases.TestCase".to_string())
        );
    }

    #[test]
    fn test_c3_diamond() {
        let tree = parse(
            "class A: pass\nclass B(A): pass\nclass C(A): pass\nclass D(B, C): pass\n",
        );
        let d = class_named(&tree, "D");
        let names: Vec<_> = tree
            .mro(d)
            .resolved()
            .expect("mro")
            .into_iter()
            .map(|c| tree.class_name(c).to_string())
            .collect();
        assert_eq!(names, vec!["D", "B", "C", "A", "object"]);
    }

    #[test]
    fn test_unknown_bases_are_dropped() {
        let tree = parse("from somewhere import Mixin\nclass T(Mixin):\n    pass\n");
        let t = class_named(&tree, "T");
        assert_eq!(tree.class_bases(t), Vec::<ClassId>::new());
        assert!(!tree.is_subtype_of(t, "unittest.case.TestCase"));
    }

    #[test]
    fn test_local_assignment_of_super() {
        let tree = parse(
            "class T(object):\n    def f(self):\n        base = super(T, self)\n        base.f()\n",
        );
        let base_use = tree
            .nodes()
            .filter(|n| n.kind() == NodeKind::Name && n.name() == Some("base"))
            .last()
            .expect("name");
        match base_use.infer() {
            Resolution::Resolved(Value::Instance(class)) => assert!(tree.is_super(class)),
            other => panic!("unexpected inference: {other:?}"),
        }
    }

    #[test]
    fn test_parameters_are_unknown() {
        let tree = parse("def f(x):\n    return x\n");
        let x = tree
            .nodes()
            .filter(|n| n.kind() == NodeKind::Name && n.name() == Some("x"))
            .last()
            .expect("name");
        assert!(x.infer().is_unknown());
    }

    #[test]
    fn test_class_local_literal() {
        let tree = parse("class T:\n    __test__ = False\n");
        let t = class_named(&tree, "T");
        assert_eq!(tree.class_local_literal(t, "__test__"), Some(&Literal::Bool(false)));
    }
}
