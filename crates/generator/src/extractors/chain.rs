//! Recognition of `Property(x => x.Member)...HasMaxLength(n)` call chains

use super::{length_from_literal, HAS_MAX_LENGTH_METHOD, PROPERTY_METHOD};
use entity_lengths_core::entities::PropertyLengthFact;
use entity_lengths_core::syntax::{Literal, NodeId, SyntaxNode, SyntaxTree};

/// Name of the method invoked by `invocation` through a member access, with its receiver
fn called_method(tree: &SyntaxTree, invocation: NodeId) -> Option<(&str, NodeId)> {
    let SyntaxNode::Invocation { callee, .. } = tree.node(invocation) else {
        return None;
    };
    match tree.node(*callee) {
        SyntaxNode::MemberAccess { receiver, name, .. } => Some((name.as_str(), *receiver)),
        _ => None,
    }
}

fn arguments(tree: &SyntaxTree, invocation: NodeId) -> &[NodeId] {
    match tree.node(invocation) {
        SyntaxNode::Invocation { arguments, .. } => arguments,
        _ => &[],
    }
}

/// Receiver of a `X.Property(...)` invocation, if `invocation` is one
pub fn property_call_receiver(tree: &SyntaxTree, invocation: NodeId) -> Option<NodeId> {
    called_method(tree, invocation)
        .filter(|(name, _)| name.eq_ignore_ascii_case(PROPERTY_METHOD))
        .map(|(_, receiver)| receiver)
}

/// Member selected by the `p => p.Member` argument of a property call
fn selected_member(tree: &SyntaxTree, invocation: NodeId) -> Option<&str> {
    let first = *arguments(tree, invocation).first()?;
    let SyntaxNode::Lambda { parameters, body } = tree.node(first) else {
        return None;
    };
    let [parameter] = parameters.as_slice() else {
        return None;
    };
    let SyntaxNode::MemberAccess { receiver, name, .. } = tree.node(*body) else {
        return None;
    };
    match tree.node(*receiver) {
        SyntaxNode::Name { identifier, .. } if identifier == parameter => Some(name.as_str()),
        _ => None,
    }
}

/// The invocation that calls a method on the result of `invocation`, if any
fn chained_call(tree: &SyntaxTree, invocation: NodeId) -> Option<(NodeId, &str)> {
    let access = tree.parent(invocation)?;
    let SyntaxNode::MemberAccess { receiver, name, .. } = tree.node(access) else {
        return None;
    };
    if *receiver != invocation {
        return None;
    }
    let outer = tree.parent(access)?;
    match tree.node(outer) {
        SyntaxNode::Invocation { callee, .. } if *callee == access => Some((outer, name.as_str())),
        _ => None,
    }
}

/// Walks from a property call up its chain to `HasMaxLength(n)`
///
/// Intermediate calls such as `IsRequired()` are skipped. The walk stops at
/// the first `HasMaxLength`; a non-literal or negative argument yields nothing.
pub fn max_length_fact(tree: &SyntaxTree, property_call: NodeId) -> Option<PropertyLengthFact> {
    property_call_receiver(tree, property_call)?;
    let member = selected_member(tree, property_call)?;
    let mut current = property_call;
    loop {
        let (outer, name) = chained_call(tree, current)?;
        if name.eq_ignore_ascii_case(HAS_MAX_LENGTH_METHOD) {
            let first = *arguments(tree, outer).first()?;
            let SyntaxNode::Literal(Literal::Integer(length)) = tree.node(first) else {
                return None;
            };
            return length_from_literal(*length)
                .map(|length| PropertyLengthFact::new(member, length));
        }
        current = outer;
    }
}
