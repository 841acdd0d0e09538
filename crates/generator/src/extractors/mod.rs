//! The four extraction strategies and their dispatch per stream
//!
//! Every strategy is a pure function of a [`ScopedNode`]. Shape mismatches
//! of any kind produce no fact rather than an error.

pub mod attribute;
pub mod chain;
pub mod column_type;
pub mod context_builder;
pub mod fluent;

use crate::scoped_node::{PropertyView, ScopedNode};
use entity_lengths_core::entities::{EntityFacts, PropertyLengthFact, Strategy, Stream};

pub(crate) const EF_CORE_NAMESPACE: &str = "Microsoft.EntityFrameworkCore";
pub(crate) const DB_CONTEXT: &str = "DbContext";
pub(crate) const ENTITY_TYPE_CONFIGURATION: &str = "IEntityTypeConfiguration";

pub(crate) const MAX_LENGTH_ATTRIBUTE: &str = "MaxLength";
pub(crate) const STRING_LENGTH_ATTRIBUTE: &str = "StringLength";
pub(crate) const COLUMN_ATTRIBUTE: &str = "Column";
pub(crate) const TYPE_NAME_ARGUMENT: &str = "TypeName";

pub(crate) const CONFIGURE_METHOD: &str = "Configure";
pub(crate) const ON_MODEL_CREATING_METHOD: &str = "OnModelCreating";
pub(crate) const ENTITY_METHOD: &str = "Entity";
pub(crate) const PROPERTY_METHOD: &str = "Property";
pub(crate) const HAS_MAX_LENGTH_METHOD: &str = "HasMaxLength";

/// A length written as an integer literal; C# lengths are non-negative `int`s
pub(crate) fn length_from_literal(value: i64) -> Option<u32> {
    let value = i32::try_from(value).ok()?;
    u32::try_from(value).ok()
}

/// Runs one strategy on its own
pub fn run(strategy: Strategy, node: &ScopedNode<'_>) -> Option<EntityFacts> {
    match strategy {
        Strategy::Attribute | Strategy::ColumnType => {
            annotated_entity(node, std::slice::from_ref(&strategy))
        }
        Strategy::Fluent => fluent::extract(node),
        Strategy::ContextBuilder => context_builder::extract(node),
    }
}

/// Runs the strategies of `stream` on a class
pub fn extract(stream: Stream, node: &ScopedNode<'_>) -> Option<EntityFacts> {
    match stream {
        Stream::AnnotatedEntities => annotated_entity(node, stream.strategies()),
        Stream::Configurations | Stream::Contexts => stream
            .strategies()
            .iter()
            .find_map(|strategy| run(*strategy, node)),
    }
}

/// Per string property, the first strategy in `strategies` that yields a fact
fn annotated_entity(node: &ScopedNode<'_>, strategies: &[Strategy]) -> Option<EntityFacts> {
    let facts = node
        .properties()
        .filter(PropertyView::is_string)
        .filter_map(|property| {
            strategies
                .iter()
                .find_map(|strategy| property_fact(*strategy, &property))
        })
        .collect();
    EntityFacts::non_empty(node.name(), facts)
}

fn property_fact(strategy: Strategy, property: &PropertyView<'_>) -> Option<PropertyLengthFact> {
    match strategy {
        Strategy::Attribute => attribute::extract(property),
        Strategy::ColumnType => column_type::extract(property),
        Strategy::Fluent | Strategy::ContextBuilder => None,
    }
}
