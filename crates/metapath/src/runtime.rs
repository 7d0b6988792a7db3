//! Static and dynamic evaluation contexts, variable scoping, the function
//! registry, and the engine's error type.

use core::fmt;
use std::collections::HashMap;
use std::sync::Arc;

use crate::model::MetapathNode;
use crate::xdm::{ExpandedName, Sequence};

/// Namespace of the built-in Metapath function library.
pub const METAPATH_FUNCTIONS_NS: &str =
    "http://csrc.nist.gov/ns/metaschema/metapath-functions";

/// Implicitly bound `xml` prefix (cannot be overridden).
pub const XML_NS_URI: &str = "http://www.w3.org/XML/1998/namespace";

/// Reserved namespace-declaration URI; binding anything to it is a static
/// error.
pub const XMLNS_URI: &str = "http://www.w3.org/2000/xmlns/";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Raised while building the AST; never during evaluation.
    Static,
    /// Raised during evaluation; never while building the AST.
    Dynamic,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorKind::Static => write!(f, "static"),
            ErrorKind::Dynamic => write!(f, "dynamic"),
        }
    }
}

/// Canonical error codes emitted by the engine. `MP*` codes mirror the
/// XPath `XP*` code space; `FO*` codes keep their function-and-operator
/// names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    /// Grammar/parse failure or malformed literal.
    MPST0003,
    /// Reference to an unbound variable.
    MPST0008,
    /// Unknown function name or arity.
    MPST0017,
    /// Binding to the reserved namespace-declaration URI.
    MPST0070,
    /// Unresolvable namespace prefix.
    MPST0081,
    /// Context item required but absent.
    MPDY0002,
    /// Type error: invalid comparison or unsupported operand pairing.
    MPTY0004,
    /// Division by zero.
    FOAR0001,
    /// Numeric or temporal overflow.
    FOAR0002,
    /// Invalid lexical value in a cast.
    FORG0001,
    /// Invalid argument (e.g. effective boolean value of a multi-item
    /// atomic sequence).
    FORG0006,
    /// Document loading failure.
    FODC0002,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        use ErrorCode::*;
        match self {
            MPST0003 => "err:MPST0003",
            MPST0008 => "err:MPST0008",
            MPST0017 => "err:MPST0017",
            MPST0070 => "err:MPST0070",
            MPST0081 => "err:MPST0081",
            MPDY0002 => "err:MPDY0002",
            MPTY0004 => "err:MPTY0004",
            FOAR0001 => "err:FOAR0001",
            FOAR0002 => "err:FOAR0002",
            FORG0001 => "err:FORG0001",
            FORG0006 => "err:FORG0006",
            FODC0002 => "err:FODC0002",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, thiserror::Error)]
#[error("{kind} error {code}: {message}")]
pub struct Error {
    pub kind: ErrorKind,
    pub code: ErrorCode,
    pub message: String,
}

impl Error {
    pub fn static_error(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            kind: ErrorKind::Static,
            code,
            message: message.into(),
        }
    }

    pub fn dynamic_error(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            kind: ErrorKind::Dynamic,
            code,
            message: message.into(),
        }
    }
}

/// Compile-time context: namespace prefix bindings plus the default
/// namespaces applied to unprefixed function and node-test names. Consumed
/// only while the AST is built.
#[derive(Debug, Clone)]
pub struct StaticContext {
    namespaces: HashMap<String, String>,
    default_function_namespace: Option<String>,
    default_model_namespace: Option<String>,
}

impl Default for StaticContext {
    fn default() -> Self {
        let mut namespaces = HashMap::new();
        namespaces.insert("xml".to_string(), XML_NS_URI.to_string());
        Self {
            namespaces,
            default_function_namespace: Some(METAPATH_FUNCTIONS_NS.to_string()),
            default_model_namespace: None,
        }
    }
}

impl StaticContext {
    pub fn builder() -> StaticContextBuilder {
        StaticContextBuilder::new()
    }

    pub fn lookup_prefix(&self, prefix: &str) -> Option<&str> {
        self.namespaces.get(prefix).map(String::as_str)
    }

    pub fn default_function_namespace(&self) -> Option<&str> {
        self.default_function_namespace.as_deref()
    }

    pub fn default_model_namespace(&self) -> Option<&str> {
        self.default_model_namespace.as_deref()
    }
}

pub struct StaticContextBuilder {
    ctx: StaticContext,
}

impl Default for StaticContextBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl StaticContextBuilder {
    pub fn new() -> Self {
        Self {
            ctx: StaticContext::default(),
        }
    }

    /// Register a prefix → URI binding. Attempts to rebind the reserved
    /// `xml` prefix are ignored.
    pub fn with_namespace(mut self, prefix: impl Into<String>, uri: impl Into<String>) -> Self {
        let prefix = prefix.into();
        if prefix == "xml" {
            return self;
        }
        self.ctx.namespaces.insert(prefix, uri.into());
        self
    }

    pub fn with_default_function_namespace(mut self, uri: impl Into<String>) -> Self {
        self.ctx.default_function_namespace = Some(uri.into());
        self
    }

    pub fn with_default_model_namespace(mut self, uri: impl Into<String>) -> Self {
        self.ctx.default_model_namespace = Some(uri.into());
        self
    }

    pub fn build(self) -> StaticContext {
        self.ctx
    }
}

/// One lexical variable scope. Child scopes capture their parent behind an
/// `Arc` and never mutate it; introducing a binding always allocates a new
/// scope.
#[derive(Debug)]
pub struct VariableScope<N: MetapathNode> {
    bindings: HashMap<ExpandedName, Sequence<N>>,
    parent: Option<Arc<VariableScope<N>>>,
}

impl<N: MetapathNode> VariableScope<N> {
    fn root() -> Self {
        Self {
            bindings: HashMap::new(),
            parent: None,
        }
    }

    fn child_of(parent: Arc<Self>, name: ExpandedName, value: Sequence<N>) -> Self {
        let mut bindings = HashMap::new();
        bindings.insert(name, value);
        Self {
            bindings,
            parent: Some(parent),
        }
    }

    pub fn lookup(&self, name: &ExpandedName) -> Option<&Sequence<N>> {
        match self.bindings.get(name) {
            Some(v) => Some(v),
            None => self.parent.as_deref().and_then(|p| p.lookup(name)),
        }
    }
}

/// External hook for `doc()`; document trees are owned by the caller.
pub trait DocumentLoader<N>: Send + Sync {
    fn load_document(&self, uri: &str) -> Result<Option<N>, Error>;
}

/// Context handed to function implementations.
pub struct CallCtx<'a, N: MetapathNode> {
    pub dyn_ctx: &'a DynamicContext<N>,
}

pub type FunctionImpl<N> =
    Arc<dyn Fn(&CallCtx<N>, &[Sequence<N>]) -> Result<Sequence<N>, Error> + Send + Sync>;

/// Function registry keyed by expanded name; each entry holds
/// `(min_arity, max_arity, impl)` tuples. Exact-arity functions use
/// `min == max`; variadic functions use `max = None`.
pub struct FunctionRegistry<N: MetapathNode> {
    fns: HashMap<ExpandedName, Vec<(usize, Option<usize>, FunctionImpl<N>)>>,
}

impl<N: MetapathNode> Default for FunctionRegistry<N> {
    fn default() -> Self {
        Self {
            fns: HashMap::new(),
        }
    }
}

impl<N: MetapathNode> FunctionRegistry<N> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(
        &mut self,
        name: ExpandedName,
        min_arity: usize,
        max_arity: Option<usize>,
        func: FunctionImpl<N>,
    ) {
        self.fns.entry(name).or_default().push((min_arity, max_arity, func));
    }

    /// Register an exact-arity function under a namespace.
    pub fn register_ns<F>(&mut self, ns_uri: &str, local: &str, arity: usize, f: F)
    where
        F: 'static + Send + Sync + Fn(&CallCtx<N>, &[Sequence<N>]) -> Result<Sequence<N>, Error>,
    {
        let name = ExpandedName::new(Some(ns_uri.to_string()), local);
        self.register(name, arity, Some(arity), Arc::new(f));
    }

    /// Register a variadic function (any call with `argc >= min_arity`).
    pub fn register_ns_variadic<F>(&mut self, ns_uri: &str, local: &str, min_arity: usize, f: F)
    where
        F: 'static + Send + Sync + Fn(&CallCtx<N>, &[Sequence<N>]) -> Result<Sequence<N>, Error>,
    {
        let name = ExpandedName::new(Some(ns_uri.to_string()), local);
        self.register(name, min_arity, None, Arc::new(f));
    }

    pub fn resolve(&self, name: &ExpandedName, argc: usize) -> Result<&FunctionImpl<N>, Error> {
        if let Some(cands) = self.fns.get(name)
            && let Some((_, _, f)) = cands
                .iter()
                .find(|(min, max, _)| argc >= *min && max.is_none_or(|m| argc <= m))
        {
            return Ok(f);
        }
        Err(Error::static_error(
            ErrorCode::MPST0017,
            format!("unknown function {name} with arity {argc}"),
        ))
    }
}

/// Run-time context: the variable scope chain, the function registry, and
/// the external document loader. Cloning is cheap (`Arc` handles); binding a
/// variable produces a new context with a new child scope.
#[derive(Clone)]
pub struct DynamicContext<N: MetapathNode> {
    variables: Arc<VariableScope<N>>,
    functions: Arc<FunctionRegistry<N>>,
    loader: Option<Arc<dyn DocumentLoader<N>>>,
}

impl<N: MetapathNode> Default for DynamicContext<N> {
    fn default() -> Self {
        Self {
            variables: Arc::new(VariableScope::root()),
            functions: Arc::new(crate::functions::default_function_registry()),
            loader: None,
        }
    }
}

impl<N: MetapathNode> DynamicContext<N> {
    pub fn builder() -> DynamicContextBuilder<N> {
        DynamicContextBuilder::new()
    }

    /// New context whose scope introduces `name`; the current scope is
    /// captured as the parent and left untouched.
    pub fn bind_variable(&self, name: ExpandedName, value: Sequence<N>) -> Self {
        Self {
            variables: Arc::new(VariableScope::child_of(
                self.variables.clone(),
                name,
                value,
            )),
            functions: self.functions.clone(),
            loader: self.loader.clone(),
        }
    }

    pub fn variable(&self, name: &ExpandedName) -> Option<&Sequence<N>> {
        self.variables.lookup(name)
    }

    pub fn functions(&self) -> &FunctionRegistry<N> {
        &self.functions
    }

    pub fn loader(&self) -> Option<&Arc<dyn DocumentLoader<N>>> {
        self.loader.as_ref()
    }
}

pub struct DynamicContextBuilder<N: MetapathNode> {
    ctx: DynamicContext<N>,
}

impl<N: MetapathNode> Default for DynamicContextBuilder<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<N: MetapathNode> DynamicContextBuilder<N> {
    pub fn new() -> Self {
        Self {
            ctx: DynamicContext::default(),
        }
    }

    pub fn with_variable(mut self, name: ExpandedName, value: Sequence<N>) -> Self {
        self.ctx = self.ctx.bind_variable(name, value);
        self
    }

    pub fn with_functions(mut self, functions: Arc<FunctionRegistry<N>>) -> Self {
        self.ctx.functions = functions;
        self
    }

    pub fn with_loader(mut self, loader: Arc<dyn DocumentLoader<N>>) -> Self {
        self.ctx.loader = Some(loader);
        self
    }

    pub fn build(self) -> DynamicContext<N> {
        self.ctx
    }
}
