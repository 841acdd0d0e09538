//! `[MaxLength(n)]` and `[StringLength(n)]` on string properties

use super::{length_from_literal, MAX_LENGTH_ATTRIBUTE, STRING_LENGTH_ATTRIBUTE};
use crate::scoped_node::PropertyView;
use entity_lengths_core::entities::PropertyLengthFact;

/// Length attributes in priority order
const LENGTH_ATTRIBUTES: [&str; 2] = [MAX_LENGTH_ATTRIBUTE, STRING_LENGTH_ATTRIBUTE];

/// Fact from the first length attribute whose first constructor argument is
/// an integer literal
pub fn extract(property: &PropertyView<'_>) -> Option<PropertyLengthFact> {
    LENGTH_ATTRIBUTES.iter().find_map(|attribute_name| {
        property
            .attributes_named(attribute_name)
            .find_map(|attribute| {
                let length = attribute.first_positional()?.as_integer()?;
                length_from_literal(length)
            })
            .map(|length| PropertyLengthFact::new(property.name, length))
    })
}
