//! Python syntax tree lowered from tree-sitter into an arena of typed nodes.
//!
//! Checkers never see raw tree-sitter nodes. Parsing produces a
//! [`SourceTree`] holding one [`NodeData`] per interesting construct, each
//! tagged with a [`NodeKind`] that the visitor registry dispatches on.
//! Wrapper constructs (statement wrappers, blocks, parentheses) are
//! dissolved and comments are dropped during lowering.

mod encoding;
mod literal;
mod lower;

pub use encoding::{declared_encoding, decode_source};
pub use literal::Literal;

use crate::inference::Scopes;

/// Index of a node in its [`SourceTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(pub(crate) usize);

/// Kind of a lowered syntax node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    /// Whole file.
    Module,
    /// `class` statement.
    ClassDef,
    /// `def` or `async def` statement.
    FunctionDef,
    /// Call expression.
    Call,
    /// Keyword argument inside a call or class header.
    Keyword,
    /// Bare identifier.
    Name,
    /// `expr.attr` access.
    Attribute,
    /// Literal constant (string, number, bool, `None`, `...`).
    Const,
    /// f-string.
    JoinedStr,
    /// Dict display.
    Dict,
    /// List display.
    List,
    /// Tuple display or unpacking target.
    Tuple,
    /// Set display.
    Set,
    /// Comparison chain.
    Compare,
    /// Plain or annotated assignment.
    Assign,
    /// `import a.b`.
    Import,
    /// `from a import b`.
    ImportFrom,
    /// Any other construct.
    Other,
}

/// Node kinds a checker may register handlers for, with their names.
const KIND_NAMES: &[(&str, NodeKind)] = &[
    ("module", NodeKind::Module),
    ("classdef", NodeKind::ClassDef),
    ("functiondef", NodeKind::FunctionDef),
    ("call", NodeKind::Call),
    ("keyword", NodeKind::Keyword),
    ("name", NodeKind::Name),
    ("attribute", NodeKind::Attribute),
    ("const", NodeKind::Const),
    ("joinedstr", NodeKind::JoinedStr),
    ("dict", NodeKind::Dict),
    ("list", NodeKind::List),
    ("tuple", NodeKind::Tuple),
    ("set", NodeKind::Set),
    ("compare", NodeKind::Compare),
    ("assign", NodeKind::Assign),
    ("import", NodeKind::Import),
    ("importfrom", NodeKind::ImportFrom),
    // legacy spellings
    ("class", NodeKind::ClassDef),
    ("function", NodeKind::FunctionDef),
    ("asyncfunctiondef", NodeKind::FunctionDef),
    ("callfunc", NodeKind::Call),
    ("getattr", NodeKind::Attribute),
    ("from", NodeKind::ImportFrom),
];

impl NodeKind {
    /// Looks up a node kind by name, ignoring ASCII case.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        let lower = name.to_ascii_lowercase();
        KIND_NAMES
            .iter()
            .find(|(n, _)| *n == lower)
            .map(|(_, kind)| *kind)
    }

    /// Canonical lower-case name.
    #[must_use]
    pub fn name(self) -> &'static str {
        KIND_NAMES
            .iter()
            .find(|(_, kind)| *kind == self)
            .map_or("other", |(n, _)| n)
    }
}

impl std::fmt::Display for NodeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Source extent of a node. Lines are 1-indexed, columns are 0-indexed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Span {
    /// First line.
    pub start_line: usize,
    /// Column on the first line.
    pub start_column: usize,
    /// Last line.
    pub end_line: usize,
    /// Column after the last character.
    pub end_column: usize,
    /// Byte offset of the start.
    pub start_byte: usize,
    /// Byte offset of the end.
    pub end_byte: usize,
}

/// One name imported by an `import` or `from ... import` statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportName {
    /// Dotted name as written.
    pub name: String,
    /// `as` alias.
    pub alias: Option<String>,
}

/// Kind-specific data attached to a node.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    /// No data.
    Empty,
    /// Module docstring.
    Module {
        /// First statement string literal.
        docstring: Option<String>,
    },
    /// Class definition.
    ClassDef {
        /// Class name.
        name: String,
        /// Positional base expressions.
        bases: Vec<NodeId>,
        /// Class docstring.
        docstring: Option<String>,
    },
    /// Function definition.
    FunctionDef {
        /// Function name.
        name: String,
        /// Parameter names in order.
        params: Vec<String>,
        /// Function docstring.
        docstring: Option<String>,
        /// Declared with `async def`.
        is_async: bool,
    },
    /// Call expression.
    Call {
        /// Called expression.
        func: NodeId,
        /// Positional arguments.
        args: Vec<NodeId>,
        /// Keyword arguments.
        keywords: Vec<NodeId>,
    },
    /// Keyword argument. `arg` is `None` for `**kwargs`.
    Keyword {
        /// Parameter name.
        arg: Option<String>,
        /// Argument value.
        value: NodeId,
    },
    /// Identifier.
    Name {
        /// Identifier text.
        id: String,
    },
    /// Attribute access.
    Attribute {
        /// Attribute name.
        attr: String,
        /// Object expression.
        expr: NodeId,
    },
    /// Literal value.
    Const(Literal),
    /// Dict display entries.
    Dict {
        /// Key and value pairs.
        items: Vec<(NodeId, NodeId)>,
    },
    /// Elements of a list, tuple or set.
    Elements(Vec<NodeId>),
    /// Comparison chain.
    Compare {
        /// Leftmost operand.
        left: NodeId,
        /// Operators (`==`, `not in`, `is not`, ...).
        ops: Vec<String>,
        /// Remaining operands.
        comparators: Vec<NodeId>,
    },
    /// Assignment.
    Assign {
        /// Targets, outermost first for chained assignments.
        targets: Vec<NodeId>,
        /// Assigned value, absent for bare annotations.
        value: Option<NodeId>,
    },
    /// `import` statement.
    Import {
        /// Imported names.
        names: Vec<ImportName>,
    },
    /// `from ... import` statement.
    ImportFrom {
        /// Module path without leading dots.
        module: String,
        /// Number of leading dots.
        level: usize,
        /// Imported names.
        names: Vec<ImportName>,
    },
    /// Unmodelled construct, with its tree-sitter kind.
    Other(&'static str),
}

/// Stored node.
#[derive(Debug, Clone)]
pub struct NodeData {
    pub(crate) kind: NodeKind,
    pub(crate) span: Span,
    pub(crate) parent: Option<NodeId>,
    pub(crate) children: Vec<NodeId>,
    pub(crate) payload: Payload,
}

/// Errors produced while parsing a source file.
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    /// The Python grammar could not be loaded.
    #[error("failed to load Python grammar: {0}")]
    Language(String),

    /// The parser gave up without producing a tree.
    #[error("parser produced no syntax tree")]
    NoTree,

    /// The source contains a syntax error.
    #[error("syntax error at line {line}, column {column}")]
    Syntax {
        /// 1-indexed line of the first error.
        line: usize,
        /// 0-indexed column of the first error.
        column: usize,
    },
}

/// A parsed and lowered Python module.
#[derive(Debug)]
pub struct SourceTree {
    text: String,
    encoding: String,
    nodes: Vec<NodeData>,
    pub(crate) scopes: Scopes,
}

impl SourceTree {
    /// Decodes and parses raw source bytes.
    ///
    /// # Errors
    ///
    /// Returns an error if the grammar fails to load or the source has a
    /// syntax error.
    pub fn parse(source: &[u8]) -> Result<Self, ParseError> {
        let (text, encoding) = decode_source(source);
        Self::build(text, encoding)
    }

    /// Parses already-decoded source text.
    ///
    /// # Errors
    ///
    /// Returns an error if the grammar fails to load or the source has a
    /// syntax error.
    pub fn parse_str(text: &str) -> Result<Self, ParseError> {
        Self::build(text.to_string(), "utf-8".to_string())
    }

    fn build(text: String, encoding: String) -> Result<Self, ParseError> {
        let nodes = lower::parse_and_lower(&text)?;
        let mut tree = Self {
            text,
            encoding,
            nodes,
            scopes: Scopes::default(),
        };
        tree.scopes = Scopes::collect(&tree);
        Ok(tree)
    }

    /// Root module node.
    #[must_use]
    pub fn root(&self) -> Node<'_> {
        self.node(NodeId(0))
    }

    /// Node handle for an id.
    #[must_use]
    pub fn node(&self, id: NodeId) -> Node<'_> {
        Node { tree: self, id }
    }

    /// Decoded source text.
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Encoding used to decode the source.
    #[must_use]
    pub fn encoding(&self) -> &str {
        &self.encoding
    }

    /// Number of nodes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Returns true if the tree holds no nodes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// All nodes in pre-order.
    pub fn nodes(&self) -> impl Iterator<Item = Node<'_>> {
        (0..self.nodes.len()).map(|i| self.node(NodeId(i)))
    }
}

/// Borrowed handle to a node.
#[derive(Clone, Copy)]
pub struct Node<'t> {
    tree: &'t SourceTree,
    id: NodeId,
}

impl PartialEq for Node<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id && std::ptr::eq(self.tree, other.tree)
    }
}

impl Eq for Node<'_> {}

impl std::fmt::Debug for Node<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}@{}:{}",
            self.kind(),
            self.span().start_line,
            self.span().start_column
        )
    }
}

impl<'t> Node<'t> {
    fn data(self) -> &'t NodeData {
        &self.tree.nodes[self.id.0]
    }

    fn wrap(self, id: NodeId) -> Node<'t> {
        self.tree.node(id)
    }

    /// Node id.
    #[must_use]
    pub fn id(self) -> NodeId {
        self.id
    }

    /// Owning tree.
    #[must_use]
    pub fn tree(self) -> &'t SourceTree {
        self.tree
    }

    /// Node kind.
    #[must_use]
    pub fn kind(self) -> NodeKind {
        self.data().kind
    }

    /// Source extent.
    #[must_use]
    pub fn span(self) -> Span {
        self.data().span
    }

    /// 1-indexed first line.
    #[must_use]
    pub fn line(self) -> usize {
        self.data().span.start_line
    }

    /// 1-indexed last line.
    #[must_use]
    pub fn end_line(self) -> usize {
        self.data().span.end_line
    }

    /// 0-indexed column of the first character.
    #[must_use]
    pub fn column(self) -> usize {
        self.data().span.start_column
    }

    /// Kind-specific data.
    #[must_use]
    pub fn payload(self) -> &'t Payload {
        &self.data().payload
    }

    /// Exact source text of the node.
    #[must_use]
    pub fn source(self) -> &'t str {
        let span = self.data().span;
        self.tree
            .text
            .get(span.start_byte..span.end_byte)
            .unwrap_or("")
    }

    /// Parent node.
    #[must_use]
    pub fn parent(self) -> Option<Node<'t>> {
        self.data().parent.map(|id| self.wrap(id))
    }

    /// Direct children in source order.
    pub fn children(self) -> impl Iterator<Item = Node<'t>> {
        let tree = self.tree;
        self.data().children.iter().map(move |id| tree.node(*id))
    }

    /// All descendants in pre-order, excluding `self`.
    #[must_use]
    pub fn descendants(self) -> Descendants<'t> {
        let mut stack: Vec<NodeId> = self.data().children.clone();
        stack.reverse();
        Descendants {
            tree: self.tree,
            stack,
        }
    }

    /// Ancestors from the parent up to the module.
    pub fn ancestors(self) -> impl Iterator<Item = Node<'t>> {
        std::iter::successors(self.parent(), |n| n.parent())
    }

    /// Nearest enclosing function, class or module, excluding `self`.
    #[must_use]
    pub fn frame(self) -> Node<'t> {
        self.ancestors()
            .find(|n| {
                matches!(
                    n.kind(),
                    NodeKind::FunctionDef | NodeKind::ClassDef | NodeKind::Module
                )
            })
            .unwrap_or_else(|| self.tree.root())
    }

    /// True for a function defined directly in a class body.
    #[must_use]
    pub fn is_method(self) -> bool {
        self.kind() == NodeKind::FunctionDef
            && self.parent().map(Node::kind) == Some(NodeKind::ClassDef)
    }

    /// Identifier of a `Name`, or the name of a class or function.
    #[must_use]
    pub fn name(self) -> Option<&'t str> {
        match self.payload() {
            Payload::Name { id } => Some(id),
            Payload::ClassDef { name, .. } | Payload::FunctionDef { name, .. } => Some(name),
            _ => None,
        }
    }

    /// Literal value of a `Const`.
    #[must_use]
    pub fn literal(self) -> Option<&'t Literal> {
        match self.payload() {
            Payload::Const(lit) => Some(lit),
            _ => None,
        }
    }

    /// Value of a text string constant.
    #[must_use]
    pub fn str_value(self) -> Option<&'t str> {
        self.literal().and_then(Literal::as_str)
    }

    /// Called expression of a `Call`.
    #[must_use]
    pub fn call_func(self) -> Option<Node<'t>> {
        match self.payload() {
            Payload::Call { func, .. } => Some(self.wrap(*func)),
            _ => None,
        }
    }

    /// Positional arguments of a `Call`.
    #[must_use]
    pub fn call_args(self) -> Vec<Node<'t>> {
        match self.payload() {
            Payload::Call { args, .. } => args.iter().map(|id| self.wrap(*id)).collect(),
            _ => Vec::new(),
        }
    }

    /// Keyword arguments of a `Call` as `(name, value)` pairs.
    #[must_use]
    pub fn call_keywords(self) -> Vec<(Option<&'t str>, Node<'t>)> {
        match self.payload() {
            Payload::Call { keywords, .. } => keywords
                .iter()
                .filter_map(|id| match self.wrap(*id).payload() {
                    Payload::Keyword { arg, value } => Some((arg.as_deref(), self.wrap(*value))),
                    _ => None,
                })
                .collect(),
            _ => Vec::new(),
        }
    }

    /// Value of the keyword argument `name` in a `Call`.
    #[must_use]
    pub fn keyword_value(self, name: &str) -> Option<Node<'t>> {
        self.call_keywords()
            .into_iter()
            .find(|(arg, _)| *arg == Some(name))
            .map(|(_, value)| value)
    }

    /// Attribute name of an `Attribute`.
    #[must_use]
    pub fn attr_name(self) -> Option<&'t str> {
        match self.payload() {
            Payload::Attribute { attr, .. } => Some(attr),
            _ => None,
        }
    }

    /// Object expression of an `Attribute`.
    #[must_use]
    pub fn attr_expr(self) -> Option<Node<'t>> {
        match self.payload() {
            Payload::Attribute { expr, .. } => Some(self.wrap(*expr)),
            _ => None,
        }
    }

    /// Base expressions of a `ClassDef`.
    #[must_use]
    pub fn class_bases(self) -> Vec<Node<'t>> {
        match self.payload() {
            Payload::ClassDef { bases, .. } => bases.iter().map(|id| self.wrap(*id)).collect(),
            _ => Vec::new(),
        }
    }

    /// Docstring of a module, class or function.
    #[must_use]
    pub fn docstring(self) -> Option<&'t str> {
        match self.payload() {
            Payload::Module { docstring }
            | Payload::ClassDef { docstring, .. }
            | Payload::FunctionDef { docstring, .. } => docstring.as_deref(),
            _ => None,
        }
    }

    /// Parameter names of a `FunctionDef`.
    #[must_use]
    pub fn params(self) -> &'t [String] {
        match self.payload() {
            Payload::FunctionDef { params, .. } => params,
            _ => &[],
        }
    }

    /// Elements of a list, tuple or set display.
    #[must_use]
    pub fn elements(self) -> Vec<Node<'t>> {
        match self.payload() {
            Payload::Elements(ids) => ids.iter().map(|id| self.wrap(*id)).collect(),
            _ => Vec::new(),
        }
    }

    /// Entries of a `Dict`.
    #[must_use]
    pub fn dict_items(self) -> Vec<(Node<'t>, Node<'t>)> {
        match self.payload() {
            Payload::Dict { items } => items
                .iter()
                .map(|(k, v)| (self.wrap(*k), self.wrap(*v)))
                .collect(),
            _ => Vec::new(),
        }
    }

    /// Operators of a `Compare`.
    #[must_use]
    pub fn compare_ops(self) -> &'t [String] {
        match self.payload() {
            Payload::Compare { ops, .. } => ops,
            _ => &[],
        }
    }

    /// Operands of a `Compare`, leftmost first.
    #[must_use]
    pub fn compare_operands(self) -> Vec<Node<'t>> {
        match self.payload() {
            Payload::Compare {
                left, comparators, ..
            } => std::iter::once(left)
                .chain(comparators)
                .map(|id| self.wrap(*id))
                .collect(),
            _ => Vec::new(),
        }
    }

    /// Targets of an `Assign`.
    #[must_use]
    pub fn assign_targets(self) -> Vec<Node<'t>> {
        match self.payload() {
            Payload::Assign { targets, .. } => targets.iter().map(|id| self.wrap(*id)).collect(),
            _ => Vec::new(),
        }
    }

    /// Value of an `Assign`.
    #[must_use]
    pub fn assign_value(self) -> Option<Node<'t>> {
        match self.payload() {
            Payload::Assign { value, .. } => value.map(|id| self.wrap(id)),
            _ => None,
        }
    }

    /// Names of an `Import` or `ImportFrom`.
    #[must_use]
    pub fn import_names(self) -> &'t [ImportName] {
        match self.payload() {
            Payload::Import { names } | Payload::ImportFrom { names, .. } => names,
            _ => &[],
        }
    }

    /// Source module of an `ImportFrom`.
    #[must_use]
    pub fn import_module(self) -> Option<&'t str> {
        match self.payload() {
            Payload::ImportFrom { module, .. } => Some(module),
            _ => None,
        }
    }
}

/// Pre-order iterator over a subtree.
pub struct Descendants<'t> {
    tree: &'t SourceTree,
    stack: Vec<NodeId>,
}

impl<'t> Iterator for Descendants<'t> {
    type Item = Node<'t>;

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.stack.pop()?;
        let node = self.tree.node(id);
        self.stack
            .extend(node.data().children.iter().rev().copied());
        Some(node)
    }
}
