//! Tree-walking evaluation engine.
//!
//! Dispatch is a pure structural match over the AST; children evaluate
//! depth-first, left-to-right, eagerly. Every expression yields exactly one
//! sequence. Absent singleton operands (arithmetic, negation, value
//! comparison) yield the empty sequence rather than an error.

use crate::model::MetapathNode;
use crate::parser::ast::{self, Expr};
use crate::runtime::{CallCtx, DynamicContext, Error, ErrorCode};
use crate::xdm::{AtomicValue, Item, Sequence};

mod comparison;
mod node_ops;
mod numeric;
mod set_ops;

/// Evaluate `expr` against `dyn_ctx` with an optional initial context item.
pub fn evaluate<N: MetapathNode>(
    expr: &Expr,
    dyn_ctx: &DynamicContext<N>,
    context_item: Option<N>,
) -> Result<Sequence<N>, Error> {
    let focus = context_item.map(Item::Node);
    Evaluator { dyn_ctx }.eval(expr, focus.as_ref())
}

pub(crate) struct Evaluator<'a, N: MetapathNode> {
    pub(crate) dyn_ctx: &'a DynamicContext<N>,
}

impl<N: MetapathNode> Evaluator<'_, N> {
    pub(crate) fn eval(&self, expr: &Expr, focus: Option<&Item<N>>) -> Result<Sequence<N>, Error> {
        match expr {
            Expr::Literal(lit) => Ok(vec![Item::Atomic(literal_value(lit))]),

            Expr::ContextItem => match focus {
                Some(item) => Ok(vec![item.clone()]),
                None => Err(Error::dynamic_error(
                    ErrorCode::MPDY0002,
                    "context item is absent",
                )),
            },

            Expr::VarRef(name) => match self.dyn_ctx.variable(name) {
                Some(value) => Ok(value.clone()),
                None => Err(Error::dynamic_error(
                    ErrorCode::MPST0008,
                    format!("unbound variable ${name}"),
                )),
            },

            Expr::FunctionCall { name, args } => {
                let mut evaluated = Vec::with_capacity(args.len());
                for arg in args {
                    evaluated.push(self.eval(arg, focus)?);
                }
                let func = self.dyn_ctx.functions().resolve(name, evaluated.len())?;
                func(
                    &CallCtx {
                        dyn_ctx: self.dyn_ctx,
                    },
                    &evaluated,
                )
            }

            Expr::Let { var, bound, body } => {
                let value = self.eval(bound, focus)?;
                let child_ctx = self.dyn_ctx.bind_variable(var.clone(), value);
                Evaluator {
                    dyn_ctx: &child_ctx,
                }
                .eval(body, focus)
            }

            Expr::Quantified {
                quantifier,
                var,
                in_expr,
                satisfies,
            } => {
                let seq = self.eval(in_expr, focus)?;
                let mut result = matches!(quantifier, ast::Quantifier::Every);
                for item in seq {
                    let child_ctx = self.dyn_ctx.bind_variable(var.clone(), vec![item]);
                    let value = Evaluator {
                        dyn_ctx: &child_ctx,
                    }
                    .eval(satisfies, focus)?;
                    let satisfied = effective_boolean_value(&value)?;
                    match quantifier {
                        ast::Quantifier::Some if satisfied => {
                            result = true;
                            break;
                        }
                        ast::Quantifier::Every if !satisfied => {
                            result = false;
                            break;
                        }
                        _ => {}
                    }
                }
                Ok(bool_seq(result))
            }

            Expr::Sequence(branches) => {
                let mut out = Vec::new();
                for branch in branches {
                    out.extend(self.eval(branch, focus)?);
                }
                Ok(out)
            }

            Expr::Negate(operand) => {
                let seq = self.eval(operand, focus)?;
                match first_atomized(&seq) {
                    None => Ok(Vec::new()),
                    Some(value) => Ok(vec![Item::Atomic(numeric::negate(&value)?)]),
                }
            }

            Expr::Binary { left, op, right } => {
                let l = self.eval(left, focus)?;
                let r = self.eval(right, focus)?;
                let (Some(a), Some(b)) = (first_atomized(&l), first_atomized(&r)) else {
                    return Ok(Vec::new());
                };
                Ok(vec![Item::Atomic(numeric::arithmetic(*op, &a, &b)?)])
            }

            Expr::StringConcat(operands) => {
                let mut out = String::new();
                for operand in operands {
                    let seq = self.eval(operand, focus)?;
                    for value in atomize_sequence(&seq) {
                        out.push_str(&value.string_value());
                    }
                }
                Ok(vec![Item::Atomic(AtomicValue::String(out))])
            }

            Expr::And(operands) => {
                for operand in operands {
                    let seq = self.eval(operand, focus)?;
                    if !effective_boolean_value(&seq)? {
                        return Ok(bool_seq(false));
                    }
                }
                Ok(bool_seq(true))
            }

            Expr::Or(operands) => {
                for operand in operands {
                    let seq = self.eval(operand, focus)?;
                    if effective_boolean_value(&seq)? {
                        return Ok(bool_seq(true));
                    }
                }
                Ok(bool_seq(false))
            }

            Expr::GeneralComparison { left, op, right } => {
                let la = atomize_sequence(&self.eval(left, focus)?);
                let ra = atomize_sequence(&self.eval(right, focus)?);
                for a in &la {
                    for b in &ra {
                        if comparison::general_pair(a, b, *op)? {
                            return Ok(bool_seq(true));
                        }
                    }
                }
                Ok(bool_seq(false))
            }

            Expr::ValueComparison { left, op, right } => {
                let l = self.eval(left, focus)?;
                let r = self.eval(right, focus)?;
                if l.len() != 1 || r.len() != 1 {
                    return Ok(Vec::new());
                }
                let a = comparison::untyped_to_string(atomize_item(&l[0]));
                let b = comparison::untyped_to_string(atomize_item(&r[0]));
                Ok(bool_seq(comparison::compare_atomic(&a, &b, *op)?))
            }

            Expr::Range { start, end } => {
                let s = self.eval(start, focus)?;
                let e = self.eval(end, focus)?;
                let (Some(a), Some(b)) = (first_atomized(&s), first_atomized(&e)) else {
                    return Ok(Vec::new());
                };
                let from = range_endpoint(&a)?;
                let to = range_endpoint(&b)?;
                let mut out = Vec::new();
                if from <= to {
                    for i in from..=to {
                        out.push(Item::Atomic(AtomicValue::Integer(i)));
                    }
                }
                Ok(out)
            }

            Expr::Union(operands) => self.eval_union(operands, focus),
            Expr::Intersect { left, right } => self.eval_intersect(left, right, focus),
            Expr::Except { left, right } => self.eval_except(left, right, focus),

            Expr::RootSlashOnlyPath => Ok(self
                .document_root(focus)?
                .map(|root| vec![Item::Node(root)])
                .unwrap_or_default()),

            Expr::RootSlashPath(path) => match self.document_root(focus)? {
                Some(root) => {
                    let item = Item::Node(root);
                    self.eval(path, Some(&item))
                }
                None => Ok(Vec::new()),
            },

            Expr::RootDoubleSlashPath(path) => match self.document_root(focus)? {
                Some(root) => self.search_from(&root, path),
                None => Ok(Vec::new()),
            },

            Expr::RelativeSlashPath { left, right } => {
                let base = self.eval(left, focus)?;
                let mut out = Vec::new();
                for item in base {
                    require_node(&item)?;
                    out.extend(self.eval(right, Some(&item))?);
                }
                Ok(out)
            }

            Expr::RelativeDoubleSlashPath { left, right } => {
                let base = self.eval(left, focus)?;
                let mut out = Vec::new();
                for item in base {
                    let node = require_node(&item)?.clone();
                    out.extend(self.search_from(&node, right)?);
                }
                Ok(out)
            }

            Expr::Step { axis, test } => {
                let node = focus_node(focus)?;
                Ok(node_ops::apply_axis_step(node, *axis, test)
                    .into_iter()
                    .map(Item::Node)
                    .collect())
            }

            Expr::Flag(test) => {
                let node = focus_node(focus)?;
                let flags: Vec<N> = match test {
                    ast::NodeTest::Name(name) => node.flag_by_name(name).into_iter().collect(),
                    ast::NodeTest::Wildcard => node.flags(),
                };
                Ok(flags.into_iter().map(Item::Node).collect())
            }

            Expr::ModelInstance(test) => {
                let node = focus_node(focus)?;
                let items = match test {
                    ast::NodeTest::Name(name) => node.model_items_by_name(name),
                    ast::NodeTest::Wildcard => node.model_items(),
                };
                Ok(items.into_iter().map(Item::Node).collect())
            }

            Expr::Predicate { base, predicates } => {
                let mut items = self.eval(base, focus)?;
                for pred in predicates {
                    let mut next = Vec::with_capacity(items.len());
                    for (idx, item) in items.into_iter().enumerate() {
                        let position = idx as i64 + 1;
                        // A bare integer literal is a positional predicate;
                        // everything else converts to a boolean in the
                        // candidate item's own context.
                        let keep = match pred {
                            Expr::Literal(ast::Literal::Integer(wanted)) => *wanted == position,
                            _ => effective_boolean_value(&self.eval(pred, Some(&item))?)?,
                        };
                        if keep {
                            next.push(item);
                        }
                    }
                    items = next;
                }
                Ok(items)
            }
        }
    }

    /// Depth-first pre-order search over model instances: evaluate `path`
    /// with every node of the subtree (self included) as context item,
    /// concatenating per-node results in traversal order.
    fn search_from(&self, node: &N, path: &Expr) -> Result<Sequence<N>, Error> {
        let mut out = Vec::new();
        for candidate in node_ops::preorder_with_self(node) {
            let item = Item::Node(candidate);
            out.extend(self.eval(path, Some(&item))?);
        }
        Ok(out)
    }

    /// Walk to the top of the tree; a rooted expression only produces
    /// results when the top is a document node.
    fn document_root(&self, focus: Option<&Item<N>>) -> Result<Option<N>, Error> {
        let node = focus_node(focus)?;
        let mut current = node.clone();
        while let Some(parent) = current.parent() {
            current = parent;
        }
        if current.is_document_node() {
            Ok(Some(current))
        } else {
            Ok(None)
        }
    }
}

fn focus_node<'i, N: MetapathNode>(focus: Option<&'i Item<N>>) -> Result<&'i N, Error> {
    match focus {
        Some(Item::Node(node)) => Ok(node),
        Some(Item::Atomic(a)) => Err(Error::dynamic_error(
            ErrorCode::MPTY0004,
            format!(
                "path navigation requires a node context, found {}",
                a.type_name()
            ),
        )),
        None => Err(Error::dynamic_error(
            ErrorCode::MPDY0002,
            "context item is absent",
        )),
    }
}

fn require_node<N: MetapathNode>(item: &Item<N>) -> Result<&N, Error> {
    match item {
        Item::Node(node) => Ok(node),
        Item::Atomic(a) => Err(Error::dynamic_error(
            ErrorCode::MPTY0004,
            format!("path step applied to an atomic value of type {}", a.type_name()),
        )),
    }
}

fn literal_value(lit: &ast::Literal) -> AtomicValue {
    match lit {
        ast::Literal::String(s) => AtomicValue::String(s.clone()),
        ast::Literal::Integer(i) => AtomicValue::Integer(*i),
        ast::Literal::Decimal(d) => AtomicValue::Decimal(*d),
    }
}

fn bool_seq<N>(value: bool) -> Sequence<N> {
    vec![Item::Atomic(AtomicValue::Boolean(value))]
}

pub(crate) fn atomize_item<N: MetapathNode>(item: &Item<N>) -> AtomicValue {
    match item {
        Item::Atomic(a) => a.clone(),
        Item::Node(n) => n.atomized_value(),
    }
}

pub(crate) fn atomize_sequence<N: MetapathNode>(seq: &Sequence<N>) -> Vec<AtomicValue> {
    seq.iter().map(atomize_item).collect()
}

fn first_atomized<N: MetapathNode>(seq: &Sequence<N>) -> Option<AtomicValue> {
    seq.first().map(atomize_item)
}

/// XPath effective boolean value: empty is false, a sequence starting with
/// a node is true, singleton atomics convert by type, anything else is an
/// error.
pub(crate) fn effective_boolean_value<N: MetapathNode>(seq: &Sequence<N>) -> Result<bool, Error> {
    if seq.is_empty() {
        return Ok(false);
    }
    if matches!(seq[0], Item::Node(_)) {
        return Ok(true);
    }
    if seq.len() > 1 {
        return Err(Error::dynamic_error(
            ErrorCode::FORG0006,
            "effective boolean value of a multi-item atomic sequence",
        ));
    }
    match &seq[0] {
        Item::Atomic(AtomicValue::Boolean(b)) => Ok(*b),
        Item::Atomic(AtomicValue::String(s) | AtomicValue::UntypedAtomic(s)) => Ok(!s.is_empty()),
        Item::Atomic(AtomicValue::Integer(i)) => Ok(*i != 0),
        Item::Atomic(AtomicValue::Decimal(d)) => Ok(!d.is_zero()),
        Item::Atomic(a) => Err(Error::dynamic_error(
            ErrorCode::FORG0006,
            format!("effective boolean value is not defined for {}", a.type_name()),
        )),
        Item::Node(_) => unreachable!("node sequences are handled above"),
    }
}

fn range_endpoint(value: &AtomicValue) -> Result<i64, Error> {
    match value {
        AtomicValue::Integer(i) => Ok(*i),
        AtomicValue::UntypedAtomic(s) => s.trim().parse::<i64>().map_err(|_| {
            Error::dynamic_error(ErrorCode::FORG0001, format!("cannot cast '{s}' to integer"))
        }),
        other => Err(Error::dynamic_error(
            ErrorCode::MPTY0004,
            format!("range endpoints must be integers, found {}", other.type_name()),
        )),
    }
}
