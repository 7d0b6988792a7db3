//! Union, intersect, and except over node sequences.
//!
//! Results are duplicate-free by node identity and keep first-occurrence
//! order (left-to-right over operands); the node interface exposes no
//! cross-tree total order to sort by.

use super::Evaluator;
use crate::model::MetapathNode;
use crate::parser::ast::Expr;
use crate::runtime::{Error, ErrorCode};
use crate::xdm::{Item, Sequence};

impl<N: MetapathNode> Evaluator<'_, N> {
    pub(crate) fn eval_union(
        &self,
        operands: &[Expr],
        focus: Option<&Item<N>>,
    ) -> Result<Sequence<N>, Error> {
        let mut nodes: Vec<N> = Vec::new();
        for operand in operands {
            for node in node_sequence(self.eval(operand, focus)?, "union")? {
                if !nodes.contains(&node) {
                    nodes.push(node);
                }
            }
        }
        Ok(nodes.into_iter().map(Item::Node).collect())
    }

    pub(crate) fn eval_intersect(
        &self,
        left: &Expr,
        right: &Expr,
        focus: Option<&Item<N>>,
    ) -> Result<Sequence<N>, Error> {
        let left_nodes = node_sequence(self.eval(left, focus)?, "intersect")?;
        let right_nodes = node_sequence(self.eval(right, focus)?, "intersect")?;
        let mut out: Vec<N> = Vec::new();
        for node in left_nodes {
            if right_nodes.contains(&node) && !out.contains(&node) {
                out.push(node);
            }
        }
        Ok(out.into_iter().map(Item::Node).collect())
    }

    pub(crate) fn eval_except(
        &self,
        left: &Expr,
        right: &Expr,
        focus: Option<&Item<N>>,
    ) -> Result<Sequence<N>, Error> {
        let left_nodes = node_sequence(self.eval(left, focus)?, "except")?;
        let right_nodes = node_sequence(self.eval(right, focus)?, "except")?;
        let mut out: Vec<N> = Vec::new();
        for node in left_nodes {
            if !right_nodes.contains(&node) && !out.contains(&node) {
                out.push(node);
            }
        }
        Ok(out.into_iter().map(Item::Node).collect())
    }
}

fn node_sequence<N: MetapathNode>(seq: Sequence<N>, op: &str) -> Result<Vec<N>, Error> {
    let mut out = Vec::with_capacity(seq.len());
    for item in seq {
        match item {
            Item::Node(node) => out.push(node),
            Item::Atomic(a) => {
                return Err(Error::dynamic_error(
                    ErrorCode::MPTY0004,
                    format!("{op} requires node operands, found {}", a.type_name()),
                ));
            }
        }
    }
    Ok(out)
}
