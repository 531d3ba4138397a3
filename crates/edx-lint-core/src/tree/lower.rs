//! Conversion from tree-sitter-python syntax nodes into [`NodeData`].

use super::literal::{parse_int, parse_string, split_string, Literal};
use super::{ImportName, NodeData, NodeId, NodeKind, ParseError, Payload, Span};

use tree_sitter::{Node as TsNode, Parser};

/// Parses `text` and lowers the result into a node arena.
pub(super) fn parse_and_lower(text: &str) -> Result<Vec<NodeData>, ParseError> {
    let mut parser = Parser::new();
    let language = tree_sitter_python::LANGUAGE.into();
    parser
        .set_language(&language)
        .map_err(|e| ParseError::Language(e.to_string()))?;
    let ts_tree = parser.parse(text, None).ok_or(ParseError::NoTree)?;
    let root = ts_tree.root_node();

    if root.has_error() {
        let (line, column) = first_error(root).unwrap_or((1, 0));
        return Err(ParseError::Syntax { line, column });
    }

    let mut lowerer = Lowerer {
        src: text.as_bytes(),
        nodes: Vec::new(),
    };
    let module = lowerer.alloc(NodeKind::Module, root, None);
    lowerer.statements(root, module);
    let docstring = lowerer.docstring(root);
    lowerer.set(module, Payload::Module { docstring });
    Ok(lowerer.nodes)
}

fn first_error(node: TsNode<'_>) -> Option<(usize, usize)> {
    if node.is_error() || node.is_missing() {
        let pos = node.start_position();
        return Some((pos.row + 1, pos.column));
    }
    let mut cursor = node.walk();
    let children: Vec<_> = node.children(&mut cursor).collect();
    children
        .into_iter()
        .filter(|c| c.has_error() || c.is_missing())
        .find_map(first_error)
}

fn span_of(node: TsNode<'_>) -> Span {
    let start = node.start_position();
    let end = node.end_position();
    Span {
        start_line: start.row + 1,
        start_column: start.column,
        end_line: end.row + 1,
        end_column: end.column,
        start_byte: node.start_byte(),
        end_byte: node.end_byte(),
    }
}

fn named_children<'a>(node: TsNode<'a>) -> Vec<TsNode<'a>> {
    let mut cursor = node.walk();
    let children = node
        .named_children(&mut cursor)
        .filter(|c| !c.is_extra())
        .collect();
    children
}

struct Lowerer<'s> {
    src: &'s [u8],
    nodes: Vec<NodeData>,
}

impl<'s> Lowerer<'s> {
    fn alloc(&mut self, kind: NodeKind, ts: TsNode<'_>, parent: Option<NodeId>) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(NodeData {
            kind,
            span: span_of(ts),
            parent,
            children: Vec::new(),
            payload: Payload::Empty,
        });
        if let Some(parent) = parent {
            self.nodes[parent.0].children.push(id);
        }
        id
    }

    fn text(&self, ts: TsNode<'_>) -> &'s str {
        ts.utf8_text(self.src).unwrap_or("")
    }

    fn set(&mut self, id: NodeId, payload: Payload) {
        self.nodes[id.0].payload = payload;
    }

    /// Lowers every named child of `ts` into `parent`.
    fn statements(&mut self, ts: TsNode<'_>, parent: NodeId) {
        for child in named_children(ts) {
            self.lower(child, parent);
        }
    }

    /// Lowers an expression, always producing exactly one node.
    fn expr(&mut self, ts: TsNode<'_>, parent: NodeId) -> NodeId {
        match self.lower(ts, parent) {
            Some(id) if self.nodes[id.0].parent == Some(parent) => id,
            _ => {
                let id = self.alloc(NodeKind::Other, ts, Some(parent));
                self.set(id, Payload::Other(ts.kind()));
                id
            }
        }
    }

    fn lower(&mut self, ts: TsNode<'_>, parent: NodeId) -> Option<NodeId> {
        match ts.kind() {
            "comment" | "line_continuation" => None,
            "expression_statement" | "block" => {
                let mut last = None;
                for child in named_children(ts) {
                    last = self.lower(child, parent).or(last);
                }
                last
            }
            "parenthesized_expression" => named_children(ts)
                .into_iter()
                .next()
                .map(|inner| self.expr(inner, parent)),
            "decorated_definition" => {
                let decorators: Vec<_> = named_children(ts)
                    .into_iter()
                    .filter(|c| c.kind() == "decorator")
                    .collect();
                let definition = ts.child_by_field_name("definition")?;
                Some(self.definition(definition, parent, &decorators))
            }
            "class_definition" | "function_definition" => Some(self.definition(ts, parent, &[])),
            "call" => Some(self.call(ts, parent)),
            "keyword_argument" => Some(self.keyword(ts, parent)),
            "identifier" => {
                let id = self.alloc(NodeKind::Name, ts, Some(parent));
                let name = self.text(ts).to_string();
                self.set(id, Payload::Name { id: name });
                Some(id)
            }
            "attribute" => Some(self.attribute(ts, parent)),
            "string" | "concatenated_string" => Some(self.string(ts, parent)),
            "integer" | "float" => Some(self.number(ts, parent)),
            "true" | "false" | "none" | "ellipsis" => {
                let lit = match ts.kind() {
                    "true" => Literal::Bool(true),
                    "false" => Literal::Bool(false),
                    "none" => Literal::None,
                    _ => Literal::Ellipsis,
                };
                let id = self.alloc(NodeKind::Const, ts, Some(parent));
                self.set(id, Payload::Const(lit));
                Some(id)
            }
            "dictionary" => Some(self.dict(ts, parent)),
            "list" | "list_pattern" => Some(self.sequence(NodeKind::List, ts, parent)),
            "tuple" | "expression_list" | "pattern_list" | "tuple_pattern" => {
                Some(self.sequence(NodeKind::Tuple, ts, parent))
            }
            "set" => Some(self.sequence(NodeKind::Set, ts, parent)),
            "comparison_operator" => Some(self.compare(ts, parent)),
            "assignment" => Some(self.assign(ts, parent)),
            "import_statement" => Some(self.import(ts, parent)),
            "import_from_statement" | "future_import_statement" => {
                Some(self.import_from(ts, parent))
            }
            kind => {
                let id = self.alloc(NodeKind::Other, ts, Some(parent));
                self.set(id, Payload::Other(kind));
                self.statements(ts, id);
                Some(id)
            }
        }
    }

    fn docstring(&self, body: TsNode<'_>) -> Option<String> {
        let first = named_children(body).into_iter().next()?;
        if first.kind() != "expression_statement" {
            return None;
        }
        let inner = named_children(first).into_iter().next()?;
        if inner.kind() != "string" {
            return None;
        }
        let token = self.text(inner);
        if split_string(token)?.is_format() {
            return None;
        }
        parse_string(token).map(|(value, _)| value)
    }

    fn definition(&mut self, ts: TsNode<'_>, parent: NodeId, decorators: &[TsNode<'_>]) -> NodeId {
        let is_class = ts.kind() == "class_definition";
        let kind = if is_class {
            NodeKind::ClassDef
        } else {
            NodeKind::FunctionDef
        };
        let id = self.alloc(kind, ts, Some(parent));
        for decorator in decorators {
            self.statements(*decorator, id);
        }

        let name = ts
            .child_by_field_name("name")
            .map(|n| self.text(n).to_string())
            .unwrap_or_default();
        let body = ts.child_by_field_name("body");
        let docstring = body.and_then(|b| self.docstring(b));

        if is_class {
            let mut bases = Vec::new();
            if let Some(superclasses) = ts.child_by_field_name("superclasses") {
                for arg in named_children(superclasses) {
                    if arg.kind() == "keyword_argument" {
                        self.keyword(arg, id);
                    } else {
                        bases.push(self.expr(arg, id));
                    }
                }
            }
            if let Some(body) = body {
                self.statements(body, id);
            }
            self.set(
                id,
                Payload::ClassDef {
                    name,
                    bases,
                    docstring,
                },
            );
        } else {
            let params = ts
                .child_by_field_name("parameters")
                .map(|p| self.parameters(p, id))
                .unwrap_or_default();
            let is_async = ts.child(0).is_some_and(|c| c.kind() == "async");
            if let Some(body) = body {
                self.statements(body, id);
            }
            self.set(
                id,
                Payload::FunctionDef {
                    name,
                    params,
                    docstring,
                    is_async,
                },
            );
        }
        id
    }

    /// Collects parameter names and lowers default values into `func`.
    fn parameters(&mut self, ts: TsNode<'_>, func: NodeId) -> Vec<String> {
        let mut names = Vec::new();
        for param in named_children(ts) {
            match param.kind() {
                "identifier" => names.push(self.text(param).to_string()),
                "default_parameter" | "typed_default_parameter" => {
                    if let Some(name) = param.child_by_field_name("name") {
                        names.push(self.text(name).to_string());
                    }
                    if let Some(value) = param.child_by_field_name("value") {
                        self.expr(value, func);
                    }
                }
                "typed_parameter" | "list_splat_pattern" | "dictionary_splat_pattern" => {
                    if let Some(ident) = named_children(param)
                        .into_iter()
                        .find(|c| c.kind() == "identifier")
                    {
                        names.push(self.text(ident).to_string());
                    } else if let Some(inner) = named_children(param).into_iter().next() {
                        // typed splat: `*args: int`
                        if let Some(ident) = named_children(inner)
                            .into_iter()
                            .find(|c| c.kind() == "identifier")
                        {
                            names.push(self.text(ident).to_string());
                        }
                    }
                }
                _ => {}
            }
        }
        names
    }

    fn call(&mut self, ts: TsNode<'_>, parent: NodeId) -> NodeId {
        let id = self.alloc(NodeKind::Call, ts, Some(parent));
        let func = match ts.child_by_field_name("function") {
            Some(f) => self.expr(f, id),
            None => {
                let placeholder = self.alloc(NodeKind::Other, ts, Some(id));
                self.set(placeholder, Payload::Other("missing"));
                placeholder
            }
        };
        let mut args = Vec::new();
        let mut keywords = Vec::new();
        if let Some(arguments) = ts.child_by_field_name("arguments") {
            if arguments.kind() == "argument_list" {
                for arg in named_children(arguments) {
                    match arg.kind() {
                        "keyword_argument" => keywords.push(self.keyword(arg, id)),
                        "dictionary_splat" => {
                            let kw = self.alloc(NodeKind::Keyword, arg, Some(id));
                            let value = match named_children(arg).into_iter().next() {
                                Some(inner) => self.expr(inner, kw),
                                None => self.expr(arg, kw),
                            };
                            self.set(kw, Payload::Keyword { arg: None, value });
                            keywords.push(kw);
                        }
                        _ => args.push(self.expr(arg, id)),
                    }
                }
            } else {
                args.push(self.expr(arguments, id));
            }
        }
        self.set(
            id,
            Payload::Call {
                func,
                args,
                keywords,
            },
        );
        id
    }

    fn keyword(&mut self, ts: TsNode<'_>, parent: NodeId) -> NodeId {
        let id = self.alloc(NodeKind::Keyword, ts, Some(parent));
        let arg = ts
            .child_by_field_name("name")
            .map(|n| self.text(n).to_string());
        let value = match ts.child_by_field_name("value") {
            Some(v) => self.expr(v, id),
            None => {
                let placeholder = self.alloc(NodeKind::Other, ts, Some(id));
                self.set(placeholder, Payload::Other("missing"));
                placeholder
            }
        };
        self.set(id, Payload::Keyword { arg, value });
        id
    }

    fn attribute(&mut self, ts: TsNode<'_>, parent: NodeId) -> NodeId {
        let id = self.alloc(NodeKind::Attribute, ts, Some(parent));
        let expr = match ts.child_by_field_name("object") {
            Some(obj) => self.expr(obj, id),
            None => {
                let placeholder = self.alloc(NodeKind::Other, ts, Some(id));
                self.set(placeholder, Payload::Other("missing"));
                placeholder
            }
        };
        let attr = ts
            .child_by_field_name("attribute")
            .map(|a| self.text(a).to_string())
            .unwrap_or_default();
        self.set(id, Payload::Attribute { attr, expr });
        id
    }

    fn string(&mut self, ts: TsNode<'_>, parent: NodeId) -> NodeId {
        let pieces: Vec<TsNode<'_>> = if ts.kind() == "concatenated_string" {
            named_children(ts)
        } else {
            vec![ts]
        };
        let is_format = pieces
            .iter()
            .any(|p| split_string(self.text(*p)).is_some_and(|parts| parts.is_format()));

        if is_format {
            let id = self.alloc(NodeKind::JoinedStr, ts, Some(parent));
            self.set(id, Payload::Other("fstring"));
            for piece in pieces {
                for part in named_children(piece) {
                    if part.kind() == "interpolation" {
                        if let Some(expr) = part.child_by_field_name("expression") {
                            self.expr(expr, id);
                        }
                    }
                }
            }
            return id;
        }

        let mut value = String::new();
        let mut is_bytes = false;
        for piece in pieces {
            if let Some((text, bytes)) = parse_string(self.text(piece)) {
                value.push_str(&text);
                is_bytes |= bytes;
            }
        }
        let id = self.alloc(NodeKind::Const, ts, Some(parent));
        let lit = if is_bytes {
            Literal::Bytes(value)
        } else {
            Literal::Str(value)
        };
        self.set(id, Payload::Const(lit));
        id
    }

    fn number(&mut self, ts: TsNode<'_>, parent: NodeId) -> NodeId {
        let token = self.text(ts);
        let lit = if ts.kind() == "integer" {
            parse_int(token).map(Literal::Int)
        } else {
            token.replace('_', "").parse().ok().map(Literal::Float)
        };
        match lit {
            Some(lit) => {
                let id = self.alloc(NodeKind::Const, ts, Some(parent));
                self.set(id, Payload::Const(lit));
                id
            }
            None => {
                // complex and oversized literals
                let id = self.alloc(NodeKind::Other, ts, Some(parent));
                self.set(id, Payload::Other(ts.kind()));
                id
            }
        }
    }

    fn dict(&mut self, ts: TsNode<'_>, parent: NodeId) -> NodeId {
        let id = self.alloc(NodeKind::Dict, ts, Some(parent));
        let mut items = Vec::new();
        for child in named_children(ts) {
            if child.kind() == "pair" {
                if let (Some(key), Some(value)) = (
                    child.child_by_field_name("key"),
                    child.child_by_field_name("value"),
                ) {
                    let key = self.expr(key, id);
                    let value = self.expr(value, id);
                    items.push((key, value));
                }
            } else {
                self.lower(child, id);
            }
        }
        self.set(id, Payload::Dict { items });
        id
    }

    fn sequence(&mut self, kind: NodeKind, ts: TsNode<'_>, parent: NodeId) -> NodeId {
        let id = self.alloc(kind, ts, Some(parent));
        let elements = named_children(ts)
            .into_iter()
            .map(|child| self.expr(child, id))
            .collect();
        self.set(id, Payload::Elements(elements));
        id
    }

    fn compare(&mut self, ts: TsNode<'_>, parent: NodeId) -> NodeId {
        let id = self.alloc(NodeKind::Compare, ts, Some(parent));
        let mut operands = Vec::new();
        let mut ops = Vec::new();
        let mut cursor = ts.walk();
        let children: Vec<_> = ts.children(&mut cursor).collect();
        for child in children {
            if child.is_extra() {
                continue;
            }
            if child.is_named() {
                operands.push(self.expr(child, id));
            } else {
                ops.push(child.kind().to_string());
            }
        }
        let mut operands = operands.into_iter();
        let left = operands.next().unwrap_or(id);
        self.set(
            id,
            Payload::Compare {
                left,
                ops,
                comparators: operands.collect(),
            },
        );
        id
    }

    fn assign(&mut self, ts: TsNode<'_>, parent: NodeId) -> NodeId {
        let id = self.alloc(NodeKind::Assign, ts, Some(parent));
        let mut targets = Vec::new();
        let mut current = ts;
        let value = loop {
            if let Some(left) = current.child_by_field_name("left") {
                targets.push(self.expr(left, id));
            }
            match current.child_by_field_name("right") {
                Some(right) if right.kind() == "assignment" => current = right,
                Some(right) => break Some(self.expr(right, id)),
                None => break None,
            }
        };
        self.set(id, Payload::Assign { targets, value });
        id
    }

    fn import_name(&self, ts: TsNode<'_>) -> ImportName {
        if ts.kind() == "aliased_import" {
            ImportName {
                name: ts
                    .child_by_field_name("name")
                    .map(|n| self.text(n).to_string())
                    .unwrap_or_default(),
                alias: ts
                    .child_by_field_name("alias")
                    .map(|a| self.text(a).to_string()),
            }
        } else {
            ImportName {
                name: self.text(ts).to_string(),
                alias: None,
            }
        }
    }

    fn import(&mut self, ts: TsNode<'_>, parent: NodeId) -> NodeId {
        let id = self.alloc(NodeKind::Import, ts, Some(parent));
        let names = named_children(ts)
            .into_iter()
            .map(|n| self.import_name(n))
            .collect();
        self.set(id, Payload::Import { names });
        id
    }

    fn import_from(&mut self, ts: TsNode<'_>, parent: NodeId) -> NodeId {
        let id = self.alloc(NodeKind::ImportFrom, ts, Some(parent));
        let (module, level) = if ts.kind() == "future_import_statement" {
            ("__future__".to_string(), 0)
        } else {
            let raw = ts
                .child_by_field_name("module_name")
                .map_or("", |m| self.text(m));
            let trimmed = raw.trim_start_matches('.');
            (trimmed.to_string(), raw.len() - trimmed.len())
        };
        let mut names = Vec::new();
        let mut cursor = ts.walk();
        for name in ts.children_by_field_name("name", &mut cursor) {
            names.push(self.import_name(name));
        }
        if named_children(ts)
            .iter()
            .any(|c| c.kind() == "wildcard_import")
        {
            names.push(ImportName {
                name: "*".to_string(),
                alias: None,
            });
        }
        self.set(
            id,
            Payload::ImportFrom {
                module,
                level,
                names,
            },
        );
        id
    }
}
