//! `DbContext.OnModelCreating` overrides
//!
//! Two shapes configure an entity inside `OnModelCreating`:
//!
//! ```csharp
//! modelBuilder.Entity<User>(entity =>
//! {
//!     entity.Property(e => e.Name).HasMaxLength(50);
//! });
//!
//! modelBuilder.Entity<User>().Property(u => u.Name).HasMaxLength(50);
//! ```
//!
//! Both yield the same facts. Only the first `Entity<T>` call that yields any
//! fact is reported for a context class.

use super::chain::{max_length_fact, property_call_receiver};
use super::{DB_CONTEXT, EF_CORE_NAMESPACE, ENTITY_METHOD, ON_MODEL_CREATING_METHOD};
use crate::scoped_node::ScopedNode;
use entity_lengths_core::entities::EntityFacts;
use entity_lengths_core::syntax::{NodeId, ResolvedType, SyntaxNode, SyntaxTree, TypeRef};
use std::collections::HashSet;

/// Whether `invocation` is `X.Entity<...>(...)`
fn is_entity_call(tree: &SyntaxTree, invocation: NodeId) -> bool {
    entity_access(tree, invocation).is_some()
}

/// Type arguments of the `Entity` member access invoked by `invocation`
fn entity_access(tree: &SyntaxTree, invocation: NodeId) -> Option<&[TypeRef]> {
    let SyntaxNode::Invocation { callee, .. } = tree.node(invocation) else {
        return None;
    };
    match tree.node(*callee) {
        SyntaxNode::MemberAccess {
            name,
            type_arguments,
            ..
        } if name == ENTITY_METHOD => Some(type_arguments),
        _ => None,
    }
}

/// Resolved entity type configured by an `Entity<T>` call
fn entity_type(tree: &SyntaxTree, invocation: NodeId) -> Option<&ResolvedType> {
    entity_access(tree, invocation)?
        .first()?
        .resolved
        .as_ref()
}

/// The `Entity<T>` call a property call belongs to
///
/// An enclosing `Entity<T>(...)` invocation wins; otherwise the first
/// `Entity<T>` call of the statement holding the property call.
fn owning_entity_call(tree: &SyntaxTree, property_call: NodeId) -> Option<NodeId> {
    if let Some(ancestor) = tree
        .ancestors(property_call)
        .find(|ancestor| is_entity_call(tree, *ancestor))
    {
        return Some(ancestor);
    }
    let statement = tree.ancestors(property_call).find(|ancestor| {
        matches!(tree.node(*ancestor), SyntaxNode::ExpressionStatement { .. })
    })?;
    tree.descendants(statement)
        .find(|id| is_entity_call(tree, *id))
}

/// Property calls on the parameter of an `Entity<T>(e => { ... })` block lambda
fn block_property_calls(tree: &SyntaxTree, entity_call: NodeId) -> Vec<NodeId> {
    let SyntaxNode::Invocation { arguments, .. } = tree.node(entity_call) else {
        return Vec::new();
    };
    let Some(SyntaxNode::Lambda { parameters, body }) = arguments.first().map(|id| tree.node(*id))
    else {
        return Vec::new();
    };
    let (Some(parameter), SyntaxNode::Block { statements }) =
        (parameters.first(), tree.node(*body))
    else {
        return Vec::new();
    };
    statements
        .iter()
        .filter(|statement| {
            matches!(
                tree.node(**statement),
                SyntaxNode::ExpressionStatement { .. }
            )
        })
        .flat_map(|statement| tree.descendants(*statement))
        .filter(|invocation| {
            property_call_receiver(tree, *invocation).is_some_and(|receiver| {
                matches!(
                    tree.node(receiver),
                    SyntaxNode::Name { identifier, .. } if identifier == parameter
                )
            })
        })
        .collect()
}

/// Facts of the first configured entity in `OnModelCreating` that has any
pub fn extract(node: &ScopedNode<'_>) -> Option<EntityFacts> {
    node.find_base(EF_CORE_NAMESPACE, DB_CONTEXT)?;
    let body = *node.method_bodies(ON_MODEL_CREATING_METHOD).first()?;
    let tree = node.tree();

    let entity_calls: Vec<(NodeId, &ResolvedType)> = node
        .invocations_in(body)
        .filter_map(|invocation| entity_type(tree, invocation).map(|ty| (invocation, ty)))
        .collect();
    let property_calls: Vec<NodeId> = node
        .invocations_in(body)
        .filter(|invocation| property_call_receiver(tree, *invocation).is_some())
        .collect();

    entity_calls.into_iter().find_map(|(entity_call, entity)| {
        let chained = property_calls.iter().copied().filter(|property_call| {
            owning_entity_call(tree, *property_call)
                .and_then(|owner| entity_type(tree, owner))
                .is_some_and(|owner_type| owner_type == entity)
        });
        let mut seen = HashSet::new();
        let facts = block_property_calls(tree, entity_call)
            .into_iter()
            .chain(chained)
            .filter(|property_call| seen.insert(*property_call))
            .filter_map(|property_call| max_length_fact(tree, property_call))
            .collect();
        EntityFacts::non_empty(entity.simple_name(), facts)
    })
}
