//! AST for Metapath expressions.
//!
//! A single closed expression enum; construction happens in the parent
//! `parser` module, evaluation in `evaluator`. Nodes own their children
//! exclusively (no sharing, no cycles) and are immutable once built.

use rust_decimal::Decimal;

use crate::xdm::ExpandedName;

#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    String(String),
    Integer(i64),
    Decimal(Decimal),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    IDiv,
    Mod,
}

impl BinaryOp {
    /// Lexical spelling, used in error messages.
    pub fn symbol(self) -> &'static str {
        match self {
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "div",
            BinaryOp::IDiv => "idiv",
            BinaryOp::Mod => "mod",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComparisonOp {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Quantifier {
    Some,
    Every,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    SelfAxis,
    Children,
    Descendant,
    DescendantOrSelf,
    Parent,
    Ancestor,
    AncestorOrSelf,
}

/// Node test attached to a step: an expanded name or the wildcard.
#[derive(Debug, Clone, PartialEq)]
pub enum NodeTest {
    Name(ExpandedName),
    Wildcard,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Literal(Literal),
    ContextItem,
    VarRef(ExpandedName),
    FunctionCall {
        name: ExpandedName,
        args: Vec<Expr>,
    },
    /// `let $var := bound return body`; multiple bindings nest right-associatively.
    Let {
        var: ExpandedName,
        bound: Box<Expr>,
        body: Box<Expr>,
    },
    /// `some`/`every $var in in_expr satisfies satisfies`; one binding per
    /// node, multiple bindings nest.
    Quantified {
        quantifier: Quantifier,
        var: ExpandedName,
        in_expr: Box<Expr>,
        satisfies: Box<Expr>,
    },
    /// Top-level comma operator; only built for two or more branches.
    Sequence(Vec<Expr>),
    Negate(Box<Expr>),
    Binary {
        left: Box<Expr>,
        op: BinaryOp,
        right: Box<Expr>,
    },
    StringConcat(Vec<Expr>),
    And(Vec<Expr>),
    Or(Vec<Expr>),
    GeneralComparison {
        left: Box<Expr>,
        op: ComparisonOp,
        right: Box<Expr>,
    },
    ValueComparison {
        left: Box<Expr>,
        op: ComparisonOp,
        right: Box<Expr>,
    },
    Range {
        start: Box<Expr>,
        end: Box<Expr>,
    },
    Union(Vec<Expr>),
    Intersect {
        left: Box<Expr>,
        right: Box<Expr>,
    },
    Except {
        left: Box<Expr>,
        right: Box<Expr>,
    },

    // Path expressions
    RootSlashOnlyPath,
    RootSlashPath(Box<Expr>),
    RootDoubleSlashPath(Box<Expr>),
    RelativeSlashPath {
        left: Box<Expr>,
        right: Box<Expr>,
    },
    RelativeDoubleSlashPath {
        left: Box<Expr>,
        right: Box<Expr>,
    },

    // Steps
    Step {
        axis: Axis,
        test: NodeTest,
    },
    /// Abbreviated (`@name`) or verbose (`flag::name`) flag step.
    Flag(NodeTest),
    /// Bare node test: an abbreviated child step over model instances.
    ModelInstance(NodeTest),
    Predicate {
        base: Box<Expr>,
        predicates: Vec<Expr>,
    },
}
