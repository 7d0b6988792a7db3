//! Read-only node-tree interface the evaluator navigates.
//!
//! The document model is owned by the caller; the engine only needs
//! traversal and lookup capabilities plus atomization. Node identity (`Eq`)
//! must be stable for the lifetime of an evaluation — set operations and
//! predicate filtering rely on it.

use crate::xdm::{AtomicValue, ExpandedName};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Document,
    Assembly,
    Field,
    Flag,
}

/// A node's own name as reported by the tree, with its original prefix.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QName {
    pub prefix: Option<String>,
    pub local: String,
    pub ns_uri: Option<String>,
}

impl QName {
    pub fn local(local: impl Into<String>) -> Self {
        Self {
            prefix: None,
            local: local.into(),
            ns_uri: None,
        }
    }
}

/// Name-test matching: a test that carries a namespace requires both parts
/// to match; a namespace-less test matches on the local part alone.
pub fn name_matches(name: Option<&QName>, test: &ExpandedName) -> bool {
    match name {
        Some(q) => {
            if let Some(ns) = &test.ns_uri {
                q.ns_uri.as_deref() == Some(ns.as_str()) && q.local == test.local
            } else {
                q.local == test.local
            }
        }
        None => false,
    }
}

/// The capabilities the evaluator consumes from a document tree.
///
/// Flags are the attribute-like leaves of a node; model items are its
/// assembly/field children. The by-name lookups have default implementations
/// over the iteration methods; adapters with indexed storage may override
/// them.
pub trait MetapathNode: Clone + Eq + core::fmt::Debug + Send + Sync + 'static {
    fn kind(&self) -> NodeKind;
    fn name(&self) -> Option<QName>;
    fn parent(&self) -> Option<Self>;
    fn flags(&self) -> Vec<Self>;
    fn model_items(&self) -> Vec<Self>;

    /// The typed scalar value of this node, used by atomization.
    fn atomized_value(&self) -> AtomicValue;

    fn flag_by_name(&self, name: &ExpandedName) -> Option<Self> {
        self.flags()
            .into_iter()
            .find(|f| name_matches(f.name().as_ref(), name))
    }

    fn model_items_by_name(&self, name: &ExpandedName) -> Vec<Self> {
        self.model_items()
            .into_iter()
            .filter(|n| name_matches(n.name().as_ref(), name))
            .collect()
    }

    fn is_document_node(&self) -> bool {
        self.kind() == NodeKind::Document
    }
}
