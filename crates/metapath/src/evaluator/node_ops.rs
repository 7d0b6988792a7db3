//! Axis application and node tests over the tree's flag and model-instance
//! capabilities.

use crate::model::{MetapathNode, name_matches};
use crate::parser::ast::{Axis, NodeTest};

pub(crate) fn matches_test<N: MetapathNode>(node: &N, test: &NodeTest) -> bool {
    match test {
        NodeTest::Wildcard => true,
        NodeTest::Name(name) => name_matches(node.name().as_ref(), name),
    }
}

pub(crate) fn apply_axis_step<N: MetapathNode>(node: &N, axis: Axis, test: &NodeTest) -> Vec<N> {
    match axis {
        Axis::SelfAxis => {
            if matches_test(node, test) {
                vec![node.clone()]
            } else {
                Vec::new()
            }
        }
        Axis::Children => children_matching(node, test),
        Axis::Descendant => {
            let mut out = Vec::new();
            collect_descendants(node, test, &mut out);
            out
        }
        Axis::DescendantOrSelf => {
            let mut out = Vec::new();
            if matches_test(node, test) {
                out.push(node.clone());
            }
            collect_descendants(node, test, &mut out);
            out
        }
        Axis::Parent => node
            .parent()
            .filter(|p| matches_test(p, test))
            .into_iter()
            .collect(),
        Axis::Ancestor => ancestors(node, test, false),
        Axis::AncestorOrSelf => ancestors(node, test, true),
    }
}

/// Named child lookup consults the tree's indexed capability; the wildcard
/// takes all model instances.
fn children_matching<N: MetapathNode>(node: &N, test: &NodeTest) -> Vec<N> {
    match test {
        NodeTest::Name(name) => node.model_items_by_name(name),
        NodeTest::Wildcard => node.model_items(),
    }
}

fn collect_descendants<N: MetapathNode>(node: &N, test: &NodeTest, out: &mut Vec<N>) {
    for child in node.model_items() {
        if matches_test(&child, test) {
            out.push(child.clone());
        }
        collect_descendants(&child, test, out);
    }
}

fn ancestors<N: MetapathNode>(node: &N, test: &NodeTest, include_self: bool) -> Vec<N> {
    let mut out = Vec::new();
    if include_self && matches_test(node, test) {
        out.push(node.clone());
    }
    let mut current = node.parent();
    while let Some(parent) = current {
        if matches_test(&parent, test) {
            out.push(parent.clone());
        }
        current = parent.parent();
    }
    out
}

/// Depth-first pre-order traversal over model instances, self included.
pub(crate) fn preorder_with_self<N: MetapathNode>(node: &N) -> Vec<N> {
    fn walk<N: MetapathNode>(node: &N, out: &mut Vec<N>) {
        for child in node.model_items() {
            out.push(child.clone());
            walk(&child, out);
        }
    }
    let mut out = vec![node.clone()];
    walk(node, &mut out);
    out
}
