//! Grammar front-end and AST builder.
//!
//! The pest-generated parse tree is dispatched production by production:
//! pure-alias productions delegate to their single child, chain productions
//! fold into n-ary or left-deep binary AST nodes, and leaf productions
//! resolve names and type literals. Static errors (namespace resolution)
//! surface as `Result`; grammar/builder contract violations (wrong child
//! counts, unrecognized operator tokens in operator position) are bugs and
//! panic.

use pest::Parser;
use pest::iterators::Pair;
use rust_decimal::Decimal;
use std::str::FromStr;

pub mod ast;

use crate::runtime::{Error, ErrorCode, StaticContext, XMLNS_URI};
use crate::xdm::ExpandedName;

#[derive(pest_derive::Parser)]
#[grammar = "metapath.pest"]
pub struct MetapathParser;

/// Parse `input` and build the typed AST, resolving names against
/// `static_ctx`.
pub fn parse_metapath(input: &str, static_ctx: &StaticContext) -> Result<ast::Expr, Error> {
    let mut pairs = MetapathParser::parse(Rule::metapath, input)
        .map_err(|e| Error::static_error(ErrorCode::MPST0003, e.to_string()))?;
    let root = pairs.next().expect("metapath root production");
    debug_assert_eq!(root.as_rule(), Rule::metapath);
    let expr = root
        .into_inner()
        .next()
        .expect("metapath wraps exactly one expression");
    AstBuilder { static_ctx }.build_expr(&expr)
}

/// Walk down to the first terminal token rule below an operator node.
fn first_token_rule(pair: &Pair<Rule>) -> Rule {
    let mut current = pair.clone();
    loop {
        let mut inner = current.clone().into_inner();
        match inner.next() {
            Some(next) => current = next,
            None => return current.as_rule(),
        }
    }
}

/// Expect a pure-alias production: exactly one child, which is returned.
fn only_child<'i>(pair: &Pair<'i, Rule>) -> Pair<'i, Rule> {
    let mut inner = pair.clone().into_inner();
    let child = inner
        .next()
        .unwrap_or_else(|| panic!("{:?} must have exactly one child", pair.as_rule()));
    assert!(
        inner.next().is_none(),
        "{:?} must have exactly one child",
        pair.as_rule()
    );
    child
}

struct AstBuilder<'a> {
    static_ctx: &'a StaticContext,
}

type BuildResult = Result<ast::Expr, Error>;

impl AstBuilder<'_> {
    fn build_expr(&self, pair: &Pair<Rule>) -> BuildResult {
        use ast::Expr;
        match pair.as_rule() {
            // Pass-through productions contribute no AST node.
            Rule::expr_single
            | Rule::value_expr
            | Rule::path_expr
            | Rule::step_expr
            | Rule::primary_expr
            | Rule::literal
            | Rule::numeric_literal => self.build_expr(&only_child(pair)),

            Rule::expr => {
                let mut branches = Vec::new();
                for child in pair.clone().into_inner() {
                    if child.as_rule() == Rule::expr_single {
                        branches.push(self.build_expr(&child)?);
                    }
                }
                assert!(!branches.is_empty(), "expr must contain at least one branch");
                if branches.len() == 1 {
                    Ok(branches.pop().expect("single branch"))
                } else {
                    Ok(Expr::Sequence(branches))
                }
            }

            Rule::let_expr => self.build_let(pair),
            Rule::quantified_expr => self.build_quantified(pair),

            Rule::or_expr => self.build_nary(pair, Rule::and_expr, Expr::Or),
            Rule::and_expr => self.build_nary(pair, Rule::comparison_expr, Expr::And),
            Rule::string_concat_expr => {
                self.build_nary(pair, Rule::range_expr, Expr::StringConcat)
            }
            Rule::union_expr => {
                self.build_nary(pair, Rule::intersect_except_expr, Expr::Union)
            }

            Rule::comparison_expr => self.build_comparison(pair),
            Rule::range_expr => self.build_range(pair),

            Rule::additive_expr => self.fold_binary(pair, |op| match op {
                Rule::OP_PLUS => Some(ast::BinaryOp::Add),
                Rule::OP_MINUS => Some(ast::BinaryOp::Sub),
                _ => None,
            }),
            Rule::multiplicative_expr => self.fold_binary(pair, |op| match op {
                Rule::OP_STAR => Some(ast::BinaryOp::Mul),
                Rule::K_DIV => Some(ast::BinaryOp::Div),
                Rule::K_IDIV => Some(ast::BinaryOp::IDiv),
                Rule::K_MOD => Some(ast::BinaryOp::Mod),
                _ => None,
            }),
            Rule::intersect_except_expr => self.build_intersect_except(pair),
            Rule::arrow_expr => self.build_arrow(pair),
            Rule::unary_expr => self.build_unary(pair),

            Rule::absolute_path => self.build_absolute_path(pair),
            Rule::relative_path_expr => self.build_relative_path(pair),
            Rule::axis_step => self.build_axis_step(pair),
            Rule::postfix_expr => self.build_postfix(pair),

            Rule::parenthesized_expr => {
                for child in pair.clone().into_inner() {
                    if child.as_rule() == Rule::expr {
                        return self.build_expr(&child);
                    }
                }
                Ok(Expr::Sequence(Vec::new()))
            }
            Rule::context_item_expr => Ok(Expr::ContextItem),
            Rule::var_ref => Ok(Expr::VarRef(self.resolve_var_name(pair)?)),
            Rule::function_call => self.build_function_call(pair),

            Rule::string_literal => {
                let inner = only_child(pair);
                let raw = inner.as_str();
                let value = match inner.as_rule() {
                    Rule::dbl_string_inner => raw.replace("\"\"", "\""),
                    Rule::sgl_string_inner => raw.replace("''", "'"),
                    other => unreachable!("string literal content {other:?}"),
                };
                Ok(Expr::Literal(ast::Literal::String(value)))
            }
            Rule::integer_literal => {
                let text = pair.as_str();
                let value = text.parse::<i64>().map_err(|_| {
                    Error::static_error(
                        ErrorCode::MPST0003,
                        format!("integer literal '{text}' out of range"),
                    )
                })?;
                Ok(Expr::Literal(ast::Literal::Integer(value)))
            }
            Rule::decimal_literal => {
                let text = pair.as_str();
                let normalized = if let Some(stripped) = text.strip_suffix('.') {
                    stripped.to_string()
                } else if text.starts_with('.') {
                    format!("0{text}")
                } else {
                    text.to_string()
                };
                let value = Decimal::from_str(&normalized).map_err(|_| {
                    Error::static_error(
                        ErrorCode::MPST0003,
                        format!("decimal literal '{text}' out of range"),
                    )
                })?;
                Ok(Expr::Literal(ast::Literal::Decimal(value)))
            }
            Rule::double_literal => {
                let lower = pair.as_str().to_ascii_lowercase();
                let (mantissa, exponent) = lower
                    .split_once('e')
                    .expect("double literal carries an exponent");
                let mut text = if let Some(stripped) = mantissa.strip_suffix('.') {
                    stripped.to_string()
                } else if mantissa.starts_with('.') {
                    format!("0{mantissa}")
                } else {
                    mantissa.to_string()
                };
                text.push('e');
                text.push_str(exponent);
                let value = Decimal::from_scientific(&text).map_err(|_| {
                    Error::static_error(
                        ErrorCode::MPST0003,
                        format!("numeric literal '{}' out of range", pair.as_str()),
                    )
                })?;
                Ok(Expr::Literal(ast::Literal::Decimal(value)))
            }

            other => unreachable!("no semantic handler for parse rule {other:?}"),
        }
    }

    /// `left (op right)*` productions that collapse to the bare left
    /// expression or an n-ary node preserving left-to-right order.
    fn build_nary(
        &self,
        pair: &Pair<Rule>,
        operand_rule: Rule,
        make: impl FnOnce(Vec<ast::Expr>) -> ast::Expr,
    ) -> BuildResult {
        let mut operands = Vec::new();
        for child in pair.clone().into_inner() {
            if child.as_rule() == operand_rule {
                operands.push(self.build_expr(&child)?);
            }
        }
        assert!(
            !operands.is_empty(),
            "{:?} must contain at least one operand",
            pair.as_rule()
        );
        if operands.len() == 1 {
            Ok(operands.pop().expect("single operand"))
        } else {
            Ok(make(operands))
        }
    }

    /// `left (op right)*` productions that fold into a left-deep binary
    /// chain; the operator token selects the concrete variant.
    fn fold_binary<F>(&self, pair: &Pair<Rule>, map_op: F) -> BuildResult
    where
        F: Fn(Rule) -> Option<ast::BinaryOp>,
    {
        let mut inner = pair.clone().into_inner();
        let first = inner.next().expect("binary chain left operand");
        let mut expr = self.build_expr(&first)?;
        while let Some(op_pair) = inner.next() {
            let token = first_token_rule(&op_pair);
            let Some(op) = map_op(token) else {
                unreachable!("operator token {:?} in {:?}", token, pair.as_rule())
            };
            let right = inner.next().expect("binary chain right operand");
            expr = ast::Expr::Binary {
                left: Box::new(expr),
                op,
                right: Box::new(self.build_expr(&right)?),
            };
        }
        Ok(expr)
    }

    fn build_comparison(&self, pair: &Pair<Rule>) -> BuildResult {
        use ast::ComparisonOp as Op;
        use ast::Expr;
        let mut inner = pair.clone().into_inner();
        let left = inner.next().expect("comparison left operand");
        let Some(op_pair) = inner.next() else {
            return self.build_expr(&left);
        };
        debug_assert_eq!(op_pair.as_rule(), Rule::comp_op);
        let right = inner.next().expect("comparison right operand");
        let left = Box::new(self.build_expr(&left)?);
        let right = Box::new(self.build_expr(&right)?);
        let expr = match first_token_rule(&op_pair) {
            Rule::OP_EQ => Expr::GeneralComparison { left, op: Op::Eq, right },
            Rule::OP_NE => Expr::GeneralComparison { left, op: Op::Ne, right },
            Rule::OP_LT => Expr::GeneralComparison { left, op: Op::Lt, right },
            Rule::OP_LE => Expr::GeneralComparison { left, op: Op::Le, right },
            Rule::OP_GT => Expr::GeneralComparison { left, op: Op::Gt, right },
            Rule::OP_GE => Expr::GeneralComparison { left, op: Op::Ge, right },
            Rule::K_EQ => Expr::ValueComparison { left, op: Op::Eq, right },
            Rule::K_NE => Expr::ValueComparison { left, op: Op::Ne, right },
            Rule::K_LT => Expr::ValueComparison { left, op: Op::Lt, right },
            Rule::K_LE => Expr::ValueComparison { left, op: Op::Le, right },
            Rule::K_GT => Expr::ValueComparison { left, op: Op::Gt, right },
            Rule::K_GE => Expr::ValueComparison { left, op: Op::Ge, right },
            other => unreachable!("comparison operator token {other:?}"),
        };
        Ok(expr)
    }

    fn build_range(&self, pair: &Pair<Rule>) -> BuildResult {
        let mut inner = pair.clone().into_inner();
        let first = inner.next().expect("range left operand");
        let start = self.build_expr(&first)?;
        let Some(to_tok) = inner.next() else {
            return Ok(start);
        };
        debug_assert_eq!(to_tok.as_rule(), Rule::K_TO);
        let end = inner.next().expect("range right operand");
        Ok(ast::Expr::Range {
            start: Box::new(start),
            end: Box::new(self.build_expr(&end)?),
        })
    }

    fn build_intersect_except(&self, pair: &Pair<Rule>) -> BuildResult {
        let mut inner = pair.clone().into_inner();
        let first = inner.next().expect("intersect/except left operand");
        let mut expr = self.build_expr(&first)?;
        while let Some(op_pair) = inner.next() {
            let token = first_token_rule(&op_pair);
            let right = inner.next().expect("intersect/except right operand");
            let right = Box::new(self.build_expr(&right)?);
            expr = match token {
                Rule::K_INTERSECT => ast::Expr::Intersect {
                    left: Box::new(expr),
                    right,
                },
                Rule::K_EXCEPT => ast::Expr::Except {
                    left: Box::new(expr),
                    right,
                },
                other => unreachable!("set operator token {other:?}"),
            };
        }
        Ok(expr)
    }

    /// `left => name(args)` desugars to `name(left, args...)`.
    fn build_arrow(&self, pair: &Pair<Rule>) -> BuildResult {
        let mut inner = pair.clone().into_inner();
        let first = inner.next().expect("arrow base expression");
        let mut expr = self.build_expr(&first)?;
        while let Some(arrow_tok) = inner.next() {
            debug_assert_eq!(arrow_tok.as_rule(), Rule::OP_ARROW);
            let name_pair = inner.next().expect("arrow function name");
            let name = self.resolve_eqname(
                &name_pair,
                self.static_ctx.default_function_namespace(),
                true,
            )?;
            let args_pair = inner.next().expect("arrow argument list");
            debug_assert_eq!(args_pair.as_rule(), Rule::argument_list);
            let mut args = vec![expr];
            for arg in args_pair.clone().into_inner() {
                if arg.as_rule() == Rule::expr_single {
                    args.push(self.build_expr(&arg)?);
                }
            }
            expr = ast::Expr::FunctionCall { name, args };
        }
        Ok(expr)
    }

    /// A run of leading signs collapses to zero or one `Negate` wrapper
    /// based on the parity of `-` occurrences.
    fn build_unary(&self, pair: &Pair<Rule>) -> BuildResult {
        let mut minus_count = 0usize;
        let mut value = None;
        for child in pair.clone().into_inner() {
            match child.as_rule() {
                Rule::OP_MINUS => minus_count += 1,
                Rule::OP_PLUS => {}
                Rule::value_expr => value = Some(self.build_expr(&child)?),
                other => unreachable!("unexpected {other:?} in unary expression"),
            }
        }
        let expr = value.expect("unary expression operand");
        if minus_count % 2 == 1 {
            Ok(ast::Expr::Negate(Box::new(expr)))
        } else {
            Ok(expr)
        }
    }

    fn build_let(&self, pair: &Pair<Rule>) -> BuildResult {
        let mut bindings: Vec<(ExpandedName, ast::Expr)> = Vec::new();
        let mut body = None;
        for child in pair.clone().into_inner() {
            match child.as_rule() {
                Rule::let_binding => {
                    let mut parts = child.clone().into_inner();
                    let var_pair = parts.next().expect("let binding variable");
                    debug_assert_eq!(var_pair.as_rule(), Rule::var_ref);
                    let name = self.resolve_var_name(&var_pair)?;
                    let value_pair = parts
                        .find(|p| p.as_rule() == Rule::expr_single)
                        .expect("let binding value");
                    bindings.push((name, self.build_expr(&value_pair)?));
                }
                Rule::expr_single => body = Some(self.build_expr(&child)?),
                Rule::K_LET | Rule::K_RETURN | Rule::OP_COMMA => {}
                other => unreachable!("unexpected {other:?} in let expression"),
            }
        }
        let mut expr = body.expect("let expression body");
        for (var, bound) in bindings.into_iter().rev() {
            expr = ast::Expr::Let {
                var,
                bound: Box::new(bound),
                body: Box::new(expr),
            };
        }
        Ok(expr)
    }

    fn build_quantified(&self, pair: &Pair<Rule>) -> BuildResult {
        let mut quantifier = None;
        let mut bindings: Vec<(ExpandedName, ast::Expr)> = Vec::new();
        let mut satisfies = None;
        for child in pair.clone().into_inner() {
            match child.as_rule() {
                Rule::K_SOME => quantifier = Some(ast::Quantifier::Some),
                Rule::K_EVERY => quantifier = Some(ast::Quantifier::Every),
                Rule::quantified_binding => {
                    let mut parts = child.clone().into_inner();
                    let var_pair = parts.next().expect("quantified binding variable");
                    debug_assert_eq!(var_pair.as_rule(), Rule::var_ref);
                    let name = self.resolve_var_name(&var_pair)?;
                    let in_pair = parts
                        .find(|p| p.as_rule() == Rule::expr_single)
                        .expect("quantified binding sequence");
                    bindings.push((name, self.build_expr(&in_pair)?));
                }
                Rule::expr_single => satisfies = Some(self.build_expr(&child)?),
                Rule::K_SATISFIES | Rule::OP_COMMA => {}
                other => unreachable!("unexpected {other:?} in quantified expression"),
            }
        }
        let quantifier = quantifier.expect("quantifier keyword");
        let mut expr = satisfies.expect("quantified satisfies expression");
        for (var, in_expr) in bindings.into_iter().rev() {
            expr = ast::Expr::Quantified {
                quantifier,
                var,
                in_expr: Box::new(in_expr),
                satisfies: Box::new(expr),
            };
        }
        Ok(expr)
    }

    fn build_absolute_path(&self, pair: &Pair<Rule>) -> BuildResult {
        use ast::Expr;
        let mut inner = pair.clone().into_inner();
        let first = inner.next().expect("absolute path marker");
        match first.as_rule() {
            Rule::OP_DSLASH => {
                let rel = inner.next().expect("path after //");
                Ok(Expr::RootDoubleSlashPath(Box::new(self.build_expr(&rel)?)))
            }
            Rule::OP_SLASH => match inner.next() {
                Some(rel) => Ok(Expr::RootSlashPath(Box::new(self.build_expr(&rel)?))),
                None => Ok(Expr::RootSlashOnlyPath),
            },
            other => unreachable!("absolute path marker {other:?}"),
        }
    }

    fn build_relative_path(&self, pair: &Pair<Rule>) -> BuildResult {
        use ast::Expr;
        let mut inner = pair.clone().into_inner();
        let first = inner.next().expect("first path step");
        let mut expr = self.build_expr(&first)?;
        while let Some(sep) = inner.next() {
            let right_pair = inner.next().expect("step after path separator");
            let right = Box::new(self.build_expr(&right_pair)?);
            expr = match sep.as_rule() {
                Rule::OP_SLASH => Expr::RelativeSlashPath {
                    left: Box::new(expr),
                    right,
                },
                Rule::OP_DSLASH => Expr::RelativeDoubleSlashPath {
                    left: Box::new(expr),
                    right,
                },
                other => unreachable!("path separator {other:?}"),
            };
        }
        Ok(expr)
    }

    fn build_axis_step(&self, pair: &Pair<Rule>) -> BuildResult {
        let mut inner = pair.clone().into_inner();
        let step_pair = inner.next().expect("axis step body");
        let base = match step_pair.as_rule() {
            Rule::forward_step => self.build_forward_step(&step_pair)?,
            Rule::reverse_step => self.build_reverse_step(&step_pair)?,
            other => unreachable!("axis step body {other:?}"),
        };
        let mut predicates = Vec::new();
        if let Some(list) = inner.next() {
            debug_assert_eq!(list.as_rule(), Rule::predicate_list);
            for pred in list.clone().into_inner() {
                predicates.push(self.build_predicate(&pred)?);
            }
        }
        if predicates.is_empty() {
            Ok(base)
        } else {
            Ok(ast::Expr::Predicate {
                base: Box::new(base),
                predicates,
            })
        }
    }

    fn build_forward_step(&self, pair: &Pair<Rule>) -> BuildResult {
        use ast::{Axis, Expr};
        let mut inner = pair.clone().into_inner();
        let first = inner.next().expect("forward step content");
        match first.as_rule() {
            Rule::forward_axis => {
                let test_pair = inner.next().expect("node test after axis");
                let test = self.build_node_test(&test_pair)?;
                let expr = match first_token_rule(&first) {
                    Rule::K_CHILD => Expr::Step {
                        axis: Axis::Children,
                        test,
                    },
                    Rule::K_DESCENDANT => Expr::Step {
                        axis: Axis::Descendant,
                        test,
                    },
                    Rule::K_DESCENDANT_OR_SELF => Expr::Step {
                        axis: Axis::DescendantOrSelf,
                        test,
                    },
                    Rule::K_SELF => Expr::Step {
                        axis: Axis::SelfAxis,
                        test,
                    },
                    Rule::K_FLAG => Expr::Flag(test),
                    other => unreachable!("forward axis token {other:?}"),
                };
                Ok(expr)
            }
            Rule::abbrev_forward_step => {
                let mut parts = first.clone().into_inner();
                let head = parts.next().expect("abbreviated step content");
                if head.as_rule() == Rule::OP_AT {
                    let test_pair = parts.next().expect("node test after @");
                    Ok(Expr::Flag(self.build_node_test(&test_pair)?))
                } else {
                    debug_assert_eq!(head.as_rule(), Rule::node_test);
                    Ok(Expr::ModelInstance(self.build_node_test(&head)?))
                }
            }
            other => unreachable!("forward step content {other:?}"),
        }
    }

    fn build_reverse_step(&self, pair: &Pair<Rule>) -> BuildResult {
        use ast::{Axis, Expr};
        let mut inner = pair.clone().into_inner();
        let first = inner.next().expect("reverse step content");
        match first.as_rule() {
            Rule::reverse_axis => {
                let test_pair = inner.next().expect("node test after axis");
                let test = self.build_node_test(&test_pair)?;
                let axis = match first_token_rule(&first) {
                    Rule::K_PARENT => Axis::Parent,
                    Rule::K_ANCESTOR => Axis::Ancestor,
                    Rule::K_ANCESTOR_OR_SELF => Axis::AncestorOrSelf,
                    other => unreachable!("reverse axis token {other:?}"),
                };
                Ok(Expr::Step { axis, test })
            }
            Rule::abbrev_reverse_step => Ok(Expr::Step {
                axis: Axis::Parent,
                test: ast::NodeTest::Wildcard,
            }),
            other => unreachable!("reverse step content {other:?}"),
        }
    }

    fn build_postfix(&self, pair: &Pair<Rule>) -> BuildResult {
        let mut inner = pair.clone().into_inner();
        let primary = inner.next().expect("primary expression");
        let base = self.build_expr(&primary)?;
        let mut predicates = Vec::new();
        for pred in inner {
            predicates.push(self.build_predicate(&pred)?);
        }
        if predicates.is_empty() {
            Ok(base)
        } else {
            Ok(ast::Expr::Predicate {
                base: Box::new(base),
                predicates,
            })
        }
    }

    fn build_predicate(&self, pair: &Pair<Rule>) -> BuildResult {
        debug_assert_eq!(pair.as_rule(), Rule::predicate);
        for child in pair.clone().into_inner() {
            if child.as_rule() == Rule::expr {
                return self.build_expr(&child);
            }
        }
        unreachable!("predicate without an inner expression")
    }

    fn build_function_call(&self, pair: &Pair<Rule>) -> BuildResult {
        let mut inner = pair.clone().into_inner();
        let name_pair = inner.next().expect("function name");
        let name = self.resolve_eqname(
            &name_pair,
            self.static_ctx.default_function_namespace(),
            true,
        )?;
        let args_pair = inner.next().expect("function argument list");
        debug_assert_eq!(args_pair.as_rule(), Rule::argument_list);
        let mut args = Vec::new();
        for arg in args_pair.clone().into_inner() {
            if arg.as_rule() == Rule::expr_single {
                args.push(self.build_expr(&arg)?);
            }
        }
        Ok(ast::Expr::FunctionCall { name, args })
    }

    fn build_node_test(&self, pair: &Pair<Rule>) -> Result<ast::NodeTest, Error> {
        debug_assert_eq!(pair.as_rule(), Rule::node_test);
        let inner = only_child(pair);
        match inner.as_rule() {
            Rule::wildcard => Ok(ast::NodeTest::Wildcard),
            Rule::eqname => Ok(ast::NodeTest::Name(self.resolve_eqname(
                &inner,
                self.static_ctx.default_model_namespace(),
                false,
            )?)),
            other => unreachable!("node test content {other:?}"),
        }
    }

    fn resolve_var_name(&self, var_ref: &Pair<Rule>) -> Result<ExpandedName, Error> {
        debug_assert_eq!(var_ref.as_rule(), Rule::var_ref);
        for child in var_ref.clone().into_inner() {
            if child.as_rule() == Rule::eqname {
                return self.resolve_eqname(&child, None, false);
            }
        }
        unreachable!("variable reference without a name")
    }

    /// QName resolution. Bracketed-URI names resolve directly; lexical names
    /// split on the first colon and look the prefix up in the static
    /// context. An unknown non-empty prefix fails when the caller requires a
    /// namespace; resolving into the XML namespace-declaration URI always
    /// fails.
    fn resolve_eqname(
        &self,
        pair: &Pair<Rule>,
        default_ns: Option<&str>,
        require_ns: bool,
    ) -> Result<ExpandedName, Error> {
        debug_assert_eq!(pair.as_rule(), Rule::eqname);
        let inner = only_child(pair);
        match inner.as_rule() {
            Rule::uri_qualified_name => {
                let mut parts = inner.clone().into_inner();
                let uri = parts.next().expect("braced uri content");
                debug_assert_eq!(uri.as_rule(), Rule::braced_uri_content);
                let local = parts.next().expect("local part after braced uri");
                let ns = if uri.as_str().is_empty() {
                    None
                } else {
                    Some(uri.as_str().to_string())
                };
                check_reserved_namespace(ns.as_deref(), inner.as_str())?;
                Ok(ExpandedName::new(ns, local.as_str()))
            }
            Rule::qname => {
                let text = inner.as_str();
                let (prefix, local) = match text.split_once(':') {
                    Some((p, l)) => (p, l),
                    None => ("", text),
                };
                let ns = if prefix.is_empty() {
                    default_ns.map(str::to_string)
                } else {
                    match self.static_ctx.lookup_prefix(prefix) {
                        Some(uri) => Some(uri.to_string()),
                        None if require_ns => {
                            return Err(Error::static_error(
                                ErrorCode::MPST0081,
                                format!("unresolvable namespace prefix '{prefix}' in '{text}'"),
                            ));
                        }
                        None => None,
                    }
                };
                check_reserved_namespace(ns.as_deref(), text)?;
                Ok(ExpandedName::new(ns, local))
            }
            other => unreachable!("eqname content {other:?}"),
        }
    }
}

fn check_reserved_namespace(ns: Option<&str>, lexical: &str) -> Result<(), Error> {
    if ns == Some(XMLNS_URI) {
        return Err(Error::static_error(
            ErrorCode::MPST0070,
            format!("'{lexical}' binds to the reserved namespace-declaration namespace"),
        ));
    }
    Ok(())
}
