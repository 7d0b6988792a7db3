//! Built-in function library, registered under the Metapath function
//! namespace. Unprefixed function names resolve here through the static
//! context's default function namespace.

use crate::evaluator::{atomize_item, effective_boolean_value};
use crate::model::MetapathNode;
use crate::runtime::{Error, ErrorCode, FunctionRegistry, METAPATH_FUNCTIONS_NS};
use crate::xdm::{AtomicValue, Item, Sequence};

pub fn default_function_registry<N: MetapathNode>() -> FunctionRegistry<N> {
    let mut reg = FunctionRegistry::new();
    let ns = METAPATH_FUNCTIONS_NS;

    reg.register_ns(ns, "true", 0, |_, _| Ok(boolean(true)));
    reg.register_ns(ns, "false", 0, |_, _| Ok(boolean(false)));
    reg.register_ns(ns, "not", 1, |_, args| {
        Ok(boolean(!effective_boolean_value(&args[0])?))
    });
    reg.register_ns(ns, "boolean", 1, |_, args| {
        Ok(boolean(effective_boolean_value(&args[0])?))
    });
    reg.register_ns(ns, "count", 1, |_, args| {
        Ok(vec![Item::Atomic(AtomicValue::Integer(args[0].len() as i64))])
    });
    reg.register_ns(ns, "empty", 1, |_, args| Ok(boolean(args[0].is_empty())));
    reg.register_ns(ns, "exists", 1, |_, args| Ok(boolean(!args[0].is_empty())));
    reg.register_ns(ns, "string", 1, |_, args| {
        Ok(vec![Item::Atomic(AtomicValue::String(string_of(&args[0])))])
    });
    reg.register_ns(ns, "string-length", 1, |_, args| {
        let length = string_of(&args[0]).chars().count() as i64;
        Ok(vec![Item::Atomic(AtomicValue::Integer(length))])
    });
    reg.register_ns_variadic(ns, "concat", 2, |_, args| {
        let mut out = String::new();
        for arg in args {
            if let Some(item) = arg.first() {
                out.push_str(&atomize_item(item).string_value());
            }
        }
        Ok(vec![Item::Atomic(AtomicValue::String(out))])
    });
    reg.register_ns(ns, "contains", 2, |_, args| {
        Ok(boolean(string_of(&args[0]).contains(&string_of(&args[1]))))
    });
    reg.register_ns(ns, "starts-with", 2, |_, args| {
        Ok(boolean(
            string_of(&args[0]).starts_with(&string_of(&args[1])),
        ))
    });
    reg.register_ns(ns, "ends-with", 2, |_, args| {
        Ok(boolean(string_of(&args[0]).ends_with(&string_of(&args[1]))))
    });
    reg.register_ns(ns, "doc", 1, |ctx, args| {
        let uri = string_of(&args[0]);
        let loader = ctx.dyn_ctx.loader().ok_or_else(|| {
            Error::dynamic_error(ErrorCode::FODC0002, "no document loader available")
        })?;
        match loader.load_document(&uri)? {
            Some(root) => Ok(vec![Item::Node(root)]),
            None => Err(Error::dynamic_error(
                ErrorCode::FODC0002,
                format!("document '{uri}' is not available"),
            )),
        }
    });

    reg
}

fn boolean<N>(value: bool) -> Sequence<N> {
    vec![Item::Atomic(AtomicValue::Boolean(value))]
}

/// String value of the first item; the empty sequence yields the empty
/// string.
fn string_of<N: MetapathNode>(seq: &Sequence<N>) -> String {
    seq.first()
        .map(|item| atomize_item(item).string_value())
        .unwrap_or_default()
}
