//! `[Column(TypeName = "varchar(n)")]` on string properties

use super::{COLUMN_ATTRIBUTE, TYPE_NAME_ARGUMENT};
use crate::scoped_node::PropertyView;
use entity_lengths_core::entities::PropertyLengthFact;
use regex::Regex;
use std::sync::LazyLock;

/// `char(n)` or `varchar(n)`, any case, optional whitespace before the parenthesis
static CHAR_LENGTH: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"(?i)(?:var)?char\s*\(([0-9]+)\)").ok());

/// Length declared by a native column type string
///
/// Only the first `char(n)` occurrence counts. The digits must fit a 32-bit
/// signed integer; there is no upper bound beyond that.
pub fn parse_column_type(type_name: &str) -> Option<u32> {
    let captures = CHAR_LENGTH.as_ref()?.captures(type_name)?;
    let digits = captures.get(1)?.as_str();
    let length: i32 = digits.parse().ok()?;
    u32::try_from(length).ok()
}

/// Fact from the first `Column` attribute carrying a string `TypeName`
pub fn extract(property: &PropertyView<'_>) -> Option<PropertyLengthFact> {
    let type_name = property
        .attributes_named(COLUMN_ATTRIBUTE)
        .find_map(|attribute| attribute.named(TYPE_NAME_ARGUMENT)?.as_str())?;
    if type_name.is_empty() {
        return None;
    }
    parse_column_type(type_name).map(|length| PropertyLengthFact::new(property.name, length))
}
