//! Shape predicates over the left-hand side of `::`.
//!
//! These look at syntax only and decide which interpretations are worth
//! trying before any resolution runs.

use callref_common::Span;
use callref_parser::{CallData, NodeArena, NodeIndex, NodeKind};
use smallvec::SmallVec;

/// Could `node` be a value? A call without an argument list (`A<B>`) is a
/// type application, not a value.
pub(crate) fn could_be_expression(arena: &NodeArena, node: NodeIndex) -> bool {
    match arena.kind(node) {
        Some(NodeKind::Call(call)) => !call.is_without_value_arguments(),
        Some(NodeKind::DotQualified(q)) => {
            could_be_expression(arena, q.receiver)
                && q.selector.is_some_and(|selector| could_be_expression(arena, selector))
        }
        _ => true,
    }
}

/// Could `node` be a type? Only names, argument-less calls and dotted
/// chains of those qualify.
pub(crate) fn could_be_type(arena: &NodeArena, node: NodeIndex) -> bool {
    match arena.kind(node) {
        Some(NodeKind::Name(_)) => true,
        Some(NodeKind::Call(call)) => call.is_without_value_arguments(),
        Some(NodeKind::DotQualified(q)) => {
            could_be_type(arena, q.receiver)
                && q.selector.is_some_and(|selector| could_be_type(arena, selector))
        }
        _ => false,
    }
}

fn reserved_call(arena: &NodeArena, node: NodeIndex) -> Option<&CallData> {
    match arena.kind(node) {
        Some(NodeKind::Call(call))
            if !call.type_args.is_empty() && call.is_without_value_arguments() =>
        {
            Some(call)
        }
        _ => None,
    }
}

/// `foo<T>` used as a value: type arguments and no argument list.
pub(crate) fn is_reserved_call_shape(arena: &NodeArena, node: NodeIndex) -> bool {
    reserved_call(arena, node).is_some()
}

/// Segment names of a dotted chain made of plain names and reserved calls,
/// with at least one segment carrying type arguments: `a.b<C>.d`. `None`
/// for anything else.
pub(crate) fn reserved_chain_segments(
    arena: &NodeArena,
    node: NodeIndex,
) -> Option<Vec<(String, Span)>> {
    if !matches!(arena.kind(node), Some(NodeKind::DotQualified(_))) {
        return None;
    }
    let mut segments = Vec::new();
    let mut has_type_arguments = false;
    collect_chain(arena, node, &mut segments, &mut has_type_arguments)?;
    has_type_arguments.then_some(segments)
}

fn collect_chain(
    arena: &NodeArena,
    node: NodeIndex,
    segments: &mut Vec<(String, Span)>,
    has_type_arguments: &mut bool,
) -> Option<()> {
    match arena.kind(node)? {
        NodeKind::Name(text) => segments.push((text.clone(), arena.span(node))),
        NodeKind::DotQualified(q) => {
            collect_chain(arena, q.receiver, segments, has_type_arguments)?;
            collect_chain(arena, q.selector?, segments, has_type_arguments)?;
        }
        NodeKind::Call(_) => {
            let call = reserved_call(arena, node)?;
            let name = arena.name_text(call.callee)?;
            segments.push((name.to_string(), arena.span(call.callee)));
            *has_type_arguments = true;
        }
        _ => return None,
    }
    Some(())
}

/// The name node whose resolved call tells what `node` denotes: the node
/// itself for a name, the callee of a call, the selector of a qualified
/// expression.
pub(crate) fn qualified_element_selector(arena: &NodeArena, node: NodeIndex) -> Option<NodeIndex> {
    match arena.kind(node)? {
        NodeKind::Name(_) => Some(node),
        NodeKind::Call(call) => qualified_element_selector(arena, call.callee),
        NodeKind::DotQualified(q) | NodeKind::SafeQualified(q) => {
            qualified_element_selector(arena, q.selector?)
        }
        _ => None,
    }
}

/// The callee name of `node` if it is a simple name or a call of one,
/// possibly at the end of a qualified expression.
pub(crate) fn callee_name(arena: &NodeArena, node: NodeIndex) -> Option<NodeIndex> {
    let selector = qualified_element_selector(arena, node)?;
    arena.name_text(selector).map(|_| selector)
}

/// Segments of a type-position chain: each name with the type argument
/// nodes written on it. `None` when `node` is not a name chain.
pub(crate) fn type_chain_segments(
    arena: &NodeArena,
    node: NodeIndex,
) -> Option<SmallVec<[TypeSegment; 4]>> {
    let mut out = SmallVec::new();
    push_type_segments(arena, node, &mut out)?;
    Some(out)
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct TypeSegment {
    pub(crate) node: NodeIndex,
    pub(crate) name: String,
    pub(crate) type_args: SmallVec<[NodeIndex; 2]>,
}

fn push_type_segments(
    arena: &NodeArena,
    node: NodeIndex,
    out: &mut SmallVec<[TypeSegment; 4]>,
) -> Option<()> {
    match arena.kind(node)? {
        NodeKind::Name(text) => out.push(TypeSegment {
            node,
            name: text.clone(),
            type_args: SmallVec::new(),
        }),
        NodeKind::Call(call) if call.is_without_value_arguments() => out.push(TypeSegment {
            node: call.callee,
            name: arena.name_text(call.callee)?.to_string(),
            type_args: call.type_args.clone(),
        }),
        NodeKind::DotQualified(q) => {
            push_type_segments(arena, q.receiver, out)?;
            push_type_segments(arena, q.selector?, out)?;
        }
        _ => return None,
    }
    Some(())
}
