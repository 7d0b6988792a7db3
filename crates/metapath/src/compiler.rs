//! Compile entry points and the compiled-expression handle.

use std::sync::OnceLock;

use crate::evaluator;
use crate::model::MetapathNode;
use crate::parser::{ast, parse_metapath};
use crate::runtime::{DynamicContext, Error, StaticContext};
use crate::xdm::Sequence;

static DEFAULT_STATIC_CONTEXT: OnceLock<StaticContext> = OnceLock::new();

fn default_static_ctx() -> &'static StaticContext {
    DEFAULT_STATIC_CONTEXT.get_or_init(StaticContext::default)
}

/// Compile using a lazily initialized default `StaticContext`.
pub fn compile(expr: &str) -> Result<MetapathExpression, Error> {
    compile_inner(expr, default_static_ctx())
}

/// Compile with an explicitly provided `StaticContext`.
pub fn compile_with_context(
    expr: &str,
    static_ctx: &StaticContext,
) -> Result<MetapathExpression, Error> {
    compile_inner(expr, static_ctx)
}

fn compile_inner(expr: &str, static_ctx: &StaticContext) -> Result<MetapathExpression, Error> {
    tracing::debug!(source = expr, "compiling metapath expression");
    let ast = parse_metapath(expr, static_ctx)?;
    Ok(MetapathExpression {
        ast,
        source: expr.to_string(),
    })
}

/// A compiled, immutable Metapath expression.
///
/// Evaluation is side-effect free; one compiled expression may be shared
/// and evaluated concurrently against independent dynamic contexts, as long
/// as the node tree is not mutated during evaluation.
#[derive(Debug, Clone)]
pub struct MetapathExpression {
    ast: ast::Expr,
    source: String,
}

impl MetapathExpression {
    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn ast(&self) -> &ast::Expr {
        &self.ast
    }

    /// Evaluate against `dyn_ctx` with an optional initial context item,
    /// producing one ordered sequence.
    pub fn evaluate<N: MetapathNode>(
        &self,
        dyn_ctx: &DynamicContext<N>,
        context_item: impl Into<Option<N>>,
    ) -> Result<Sequence<N>, Error> {
        tracing::trace!(source = self.source.as_str(), "evaluating metapath expression");
        evaluator::evaluate(&self.ast, dyn_ctx, context_item.into())
    }
}
