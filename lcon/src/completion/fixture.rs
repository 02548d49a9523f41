//! In-memory scope graph with deterministic enumeration order.

use crate::runtime::ScopeGraph;
use lcon_types::{Binding, ValueKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Node(usize);

impl Node {
    pub const NIL: Node = Node(0);
}

#[derive(Debug)]
enum Shape {
    Scope(Vec<(String, Node)>),
    Leaf(ValueKind),
}

#[derive(Debug)]
struct Entry {
    shape: Shape,
    link: Option<Node>,
}

#[derive(Debug)]
pub struct Fixture {
    nodes: Vec<Entry>,
}

impl Fixture {
    pub fn new() -> Self {
        let nil = Entry {
            shape: Shape::Leaf(ValueKind::Nil),
            link: None,
        };
        let root = Entry {
            shape: Shape::Scope(Vec::new()),
            link: None,
        };
        Fixture {
            nodes: vec![nil, root],
        }
    }

    pub fn root(&self) -> Node {
        Node(1)
    }

    pub fn scope(&mut self) -> Node {
        self.push(Shape::Scope(Vec::new()))
    }

    pub fn leaf(&mut self, kind: ValueKind) -> Node {
        self.push(Shape::Leaf(kind))
    }

    fn push(&mut self, shape: Shape) -> Node {
        self.nodes.push(Entry { shape, link: None });
        Node(self.nodes.len() - 1)
    }

    pub fn bind(&mut self, scope: Node, name: &str, value: Node) -> &mut Self {
        if let Shape::Scope(bindings) = &mut self.nodes[scope.0].shape {
            bindings.push((name.to_string(), value));
        }
        self
    }

    pub fn bind_leaf(&mut self, scope: Node, name: &str, kind: ValueKind) -> Node {
        let leaf = self.leaf(kind);
        self.bind(scope, name, leaf);
        leaf
    }

    pub fn link(&mut self, node: Node, target: Node) -> &mut Self {
        self.nodes[node.0].link = Some(target);
        self
    }

    pub fn names(&self, node: &Node) -> Vec<String> {
        self.bindings(node).into_iter().map(|b| b.name).collect()
    }

    /// root = { foo, foobar, baz, _private, outer = { inner = { deep } },
    ///          handle (opaque, linked to methods), methods = { describe } }
    pub fn sample() -> Self {
        let mut graph = Fixture::new();
        let root = graph.root();
        graph.bind_leaf(root, "foo", ValueKind::Number);
        graph.bind_leaf(root, "foobar", ValueKind::Number);
        graph.bind_leaf(root, "baz", ValueKind::Number);
        graph.bind_leaf(root, "_private", ValueKind::String);

        let outer = graph.scope();
        let inner = graph.scope();
        graph.bind_leaf(inner, "deep", ValueKind::Boolean);
        graph.bind(outer, "inner", inner);
        graph.bind(root, "outer", outer);

        let methods = graph.scope();
        graph.bind_leaf(methods, "describe", ValueKind::Function);
        let handle = graph.bind_leaf(root, "handle", ValueKind::Opaque);
        graph.link(handle, methods);
        graph.bind(root, "methods", methods);
        graph
    }

    fn kind(&self, node: Node) -> ValueKind {
        match self.nodes[node.0].shape {
            Shape::Scope(_) => ValueKind::Table,
            Shape::Leaf(kind) => kind,
        }
    }
}

impl ScopeGraph for Fixture {
    type Handle = Node;

    fn global_scope(&self) -> Node {
        self.root()
    }

    fn is_mapping(&self, handle: &Node) -> bool {
        matches!(self.nodes[handle.0].shape, Shape::Scope(_))
    }

    fn bindings(&self, handle: &Node) -> Vec<Binding> {
        match &self.nodes[handle.0].shape {
            Shape::Scope(bindings) => bindings
                .iter()
                .map(|(name, node)| Binding::new(name.as_str(), self.kind(*node)))
                .collect(),
            Shape::Leaf(_) => Vec::new(),
        }
    }

    /// Direct lookup, then along the link chain the way a runtime's
    /// index fallback would.
    fn lookup(&self, handle: &Node, name: &str) -> Node {
        let mut current = Some(*handle);
        for _ in 0..self.nodes.len() {
            let Some(node) = current else { break };
            if let Shape::Scope(bindings) = &self.nodes[node.0].shape
                && let Some((_, value)) = bindings.iter().find(|(n, _)| n == name)
            {
                return *value;
            }
            current = self.nodes[node.0].link;
        }
        Node::NIL
    }

    fn indirection(&self, handle: &Node) -> Option<Node> {
        self.nodes[handle.0].link
    }
}
