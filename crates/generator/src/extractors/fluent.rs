//! `IEntityTypeConfiguration<T>` classes

use super::chain::max_length_fact;
use super::{CONFIGURE_METHOD, EF_CORE_NAMESPACE, ENTITY_TYPE_CONFIGURATION};
use crate::scoped_node::ScopedNode;
use entity_lengths_core::entities::EntityFacts;

/// Facts from every `Property(...)...HasMaxLength(n)` chain in `Configure`,
/// grouped under the configured entity
pub fn extract(node: &ScopedNode<'_>) -> Option<EntityFacts> {
    let configuration = node.base_chain().iter().find(|ty| {
        ty.is(EF_CORE_NAMESPACE, ENTITY_TYPE_CONFIGURATION) && ty.type_arguments.len() == 1
    })?;
    let entity = configuration.type_arguments.first()?;

    let tree = node.tree();
    let facts = node
        .method_bodies(CONFIGURE_METHOD)
        .into_iter()
        .flat_map(|body| node.invocations_in(body))
        .filter_map(|invocation| max_length_fact(tree, invocation))
        .collect();
    EntityFacts::non_empty(entity.simple_name(), facts)
}
