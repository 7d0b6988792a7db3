//! Metapath: an XPath-3.1-subset query language over Metaschema document
//! trees (documents of nested assemblies, fields, and flags).
//!
//! `compile` builds an immutable, shareable [`MetapathExpression`] from
//! source text and a [`StaticContext`]; [`MetapathExpression::evaluate`]
//! walks it against a [`DynamicContext`] and a context node, producing an
//! ordered [`Sequence`] of items.

pub mod compiler;
pub mod evaluator;
pub mod functions;
pub mod model;
pub mod parser;
pub mod runtime;
pub mod simple_node;
pub mod xdm;

pub use compiler::{MetapathExpression, compile, compile_with_context};
pub use model::{MetapathNode, NodeKind, QName};
pub use parser::parse_metapath;
pub use runtime::{
    CallCtx, DocumentLoader, DynamicContext, DynamicContextBuilder, Error, ErrorCode, ErrorKind,
    FunctionRegistry, METAPATH_FUNCTIONS_NS, StaticContext, StaticContextBuilder,
};
pub use simple_node::{SimpleNode, SimpleNodeBuilder, assembly, doc, field, flag};
pub use xdm::{AtomicValue, ExpandedName, Item, Sequence};
