//! Simple in-memory tree implementation of [`MetapathNode`] used by tests
//! and quick prototypes.
//!
//! Focus:
//! - Ergonomic builders for quick test tree creation
//! - `Arc::ptr_eq` node identity (stable for set operations)
//! - Thread-safe (`Arc` + `RwLock`) for shared-evaluation tests
//!
//! Example:
//! ```
//! use metapath::simple_node::{assembly, doc, field, flag};
//! use metapath::MetapathNode;
//!
//! let document = doc()
//!     .child(
//!         assembly("catalog")
//!             .flag(flag("id", "c1"))
//!             .child(field("title").value("Sample"))
//!     )
//!     .build();
//!
//! let catalog = document.model_items()[0].clone();
//! assert_eq!(catalog.name().unwrap().local, "catalog");
//! assert_eq!(catalog.atomized_value().string_value(), "Sample");
//! ```

use std::fmt;
use std::sync::{Arc, RwLock, Weak};

use crate::model::{MetapathNode, NodeKind, QName};
use crate::xdm::AtomicValue;

#[derive(Debug)]
struct Inner {
    kind: NodeKind,
    name: Option<QName>,
    value: Option<String>,
    parent: RwLock<Option<Weak<Inner>>>,
    flags: Vec<SimpleNode>,
    model: Vec<SimpleNode>,
    cached_text: RwLock<Option<String>>,
}

/// An `Arc`-backed node; cloning shares identity.
#[derive(Clone)]
pub struct SimpleNode(Arc<Inner>);

impl PartialEq for SimpleNode {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}
impl Eq for SimpleNode {}

impl std::hash::Hash for SimpleNode {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        std::ptr::hash(Arc::as_ptr(&self.0), state);
    }
}

impl fmt::Debug for SimpleNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SimpleNode")
            .field("kind", &self.0.kind)
            .field("name", &self.0.name)
            .field("value", &self.0.value)
            .finish()
    }
}

impl SimpleNode {
    pub fn document() -> SimpleNodeBuilder {
        SimpleNodeBuilder::new(NodeKind::Document, None)
    }

    pub fn assembly(name: &str) -> SimpleNodeBuilder {
        SimpleNodeBuilder::new(NodeKind::Assembly, Some(QName::local(name)))
    }

    pub fn field(name: &str) -> SimpleNodeBuilder {
        SimpleNodeBuilder::new(NodeKind::Field, Some(QName::local(name)))
    }

    pub fn flag(name: &str, value: &str) -> SimpleNode {
        SimpleNode(Arc::new(Inner {
            kind: NodeKind::Flag,
            name: Some(QName::local(name)),
            value: Some(value.to_string()),
            parent: RwLock::new(None),
            flags: Vec::new(),
            model: Vec::new(),
            cached_text: RwLock::new(None),
        }))
    }

    fn text_value(&self) -> String {
        match self.0.kind {
            NodeKind::Flag | NodeKind::Field => self.0.value.clone().unwrap_or_default(),
            NodeKind::Assembly | NodeKind::Document => {
                if let Some(cached) = self.0.cached_text.read().unwrap().clone() {
                    return cached;
                }
                fn walk(node: &SimpleNode, out: &mut String) {
                    if node.0.kind == NodeKind::Field
                        && let Some(v) = &node.0.value
                    {
                        out.push_str(v);
                    }
                    for child in &node.0.model {
                        walk(child, out);
                    }
                }
                let mut out = String::new();
                walk(self, &mut out);
                *self.0.cached_text.write().unwrap() = Some(out.clone());
                out
            }
        }
    }
}

pub struct SimpleNodeBuilder {
    kind: NodeKind,
    name: Option<QName>,
    value: Option<String>,
    flags: Vec<SimpleNode>,
    model: Vec<SimpleNode>,
}

impl SimpleNodeBuilder {
    fn new(kind: NodeKind, name: Option<QName>) -> Self {
        Self {
            kind,
            name,
            value: None,
            flags: Vec::new(),
            model: Vec::new(),
        }
    }

    /// Qualify the node's name with a namespace URI.
    pub fn ns(mut self, uri: &str) -> Self {
        if let Some(name) = &mut self.name {
            name.ns_uri = Some(uri.to_string());
        }
        self
    }

    /// Set the field's scalar value.
    pub fn value(mut self, value: &str) -> Self {
        debug_assert_eq!(self.kind, NodeKind::Field);
        self.value = Some(value.to_string());
        self
    }

    pub fn flag(mut self, flag: SimpleNode) -> Self {
        debug_assert_eq!(flag.kind(), NodeKind::Flag);
        debug_assert!(matches!(self.kind, NodeKind::Assembly | NodeKind::Field));
        self.flags.push(flag);
        self
    }

    pub fn child(mut self, child: impl Into<SimpleNodeOrBuilder>) -> Self {
        debug_assert!(matches!(self.kind, NodeKind::Document | NodeKind::Assembly));
        match child.into() {
            SimpleNodeOrBuilder::Built(node) => self.model.push(node),
            SimpleNodeOrBuilder::Builder(builder) => self.model.push(builder.build()),
        }
        self
    }

    pub fn build(self) -> SimpleNode {
        let node = SimpleNode(Arc::new(Inner {
            kind: self.kind,
            name: self.name,
            value: self.value,
            parent: RwLock::new(None),
            flags: self.flags,
            model: self.model,
            cached_text: RwLock::new(None),
        }));
        for flag in &node.0.flags {
            *flag.0.parent.write().unwrap() = Some(Arc::downgrade(&node.0));
        }
        for child in &node.0.model {
            *child.0.parent.write().unwrap() = Some(Arc::downgrade(&node.0));
        }
        node
    }
}

pub enum SimpleNodeOrBuilder {
    Built(SimpleNode),
    Builder(SimpleNodeBuilder),
}

impl From<SimpleNode> for SimpleNodeOrBuilder {
    fn from(node: SimpleNode) -> Self {
        SimpleNodeOrBuilder::Built(node)
    }
}

impl From<SimpleNodeBuilder> for SimpleNodeOrBuilder {
    fn from(builder: SimpleNodeBuilder) -> Self {
        SimpleNodeOrBuilder::Builder(builder)
    }
}

// Convenience helpers for concise test code.
pub fn doc() -> SimpleNodeBuilder {
    SimpleNode::document()
}
pub fn assembly(name: &str) -> SimpleNodeBuilder {
    SimpleNode::assembly(name)
}
pub fn field(name: &str) -> SimpleNodeBuilder {
    SimpleNode::field(name)
}
pub fn flag(name: &str, value: &str) -> SimpleNode {
    SimpleNode::flag(name, value)
}

impl MetapathNode for SimpleNode {
    fn kind(&self) -> NodeKind {
        self.0.kind
    }

    fn name(&self) -> Option<QName> {
        self.0.name.clone()
    }

    fn parent(&self) -> Option<Self> {
        self.0
            .parent
            .read()
            .ok()?
            .as_ref()
            .and_then(Weak::upgrade)
            .map(SimpleNode)
    }

    fn flags(&self) -> Vec<Self> {
        self.0.flags.clone()
    }

    fn model_items(&self) -> Vec<Self> {
        self.0.model.clone()
    }

    fn atomized_value(&self) -> AtomicValue {
        AtomicValue::UntypedAtomic(self.text_value())
    }
}
