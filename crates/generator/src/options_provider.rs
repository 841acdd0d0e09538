//! Assembly-level `[assembly: EntityLengthsGenerator(...)]` options
//!
//! The attribute overrides the configured defaults field by field. A value of
//! the wrong shape never fails the run: the default is kept and a warning is
//! logged.

use crate::scoped_node::AttributeView;
use entity_lengths_core::compilation::Compilation;
use entity_lengths_core::config::{is_dotted_name, is_identifier, GeneratorOptions};
use entity_lengths_core::syntax::{AttributeValue, SyntaxNode};
use std::collections::BTreeSet;
use tracing::{debug, warn};

/// Short name of the options attribute
pub const OPTIONS_ATTRIBUTE: &str = "EntityLengthsGenerator";

const GENERATED_CLASS_NAME: &str = "GeneratedClassName";
const LENGTH_SUFFIX: &str = "LengthSuffix";
const GENERATE_DOCUMENTATION: &str = "GenerateDocumentation";
const NAMESPACE: &str = "Namespace";
const INCLUDE_NAMESPACES: &str = "IncludeNamespaces";
const EXCLUDE_NAMESPACES: &str = "ExcludeNamespaces";
const SCAN_NESTED_NAMESPACES: &str = "ScanNestedNamespaces";
const SCAN_ENTITY_SUFFIX: &str = "ScanEntitySuffix";

/// The first options attribute across the compilation's files, in file order
fn options_attribute(compilation: &Compilation) -> Option<AttributeView<'_>> {
    compilation
        .global_attributes()
        .filter_map(|(tree, id)| match tree.node(id) {
            SyntaxNode::Attribute { name, arguments } => Some(AttributeView { name, arguments }),
            _ => None,
        })
        .find(|attribute| attribute.short_name() == OPTIONS_ATTRIBUTE)
}

fn fallback(argument: &str, value: &AttributeValue) {
    warn!(
        "Ignoring {}.{} = {:?}: unexpected value, keeping the configured default",
        OPTIONS_ATTRIBUTE, argument, value
    );
}

fn string_argument(
    attribute: &AttributeView<'_>,
    argument: &str,
    accept: impl Fn(&str) -> bool,
) -> Option<String> {
    let value = attribute.named(argument)?;
    match value.as_str() {
        Some(text) if accept(text) => Some(text.to_string()),
        _ => {
            fallback(argument, value);
            None
        }
    }
}

/// A string argument that may be set to `null` to clear the default
fn nullable_string_argument(
    attribute: &AttributeView<'_>,
    argument: &str,
    accept: impl Fn(&str) -> bool,
) -> Option<Option<String>> {
    let value = attribute.named(argument)?;
    if value.is_null() {
        return Some(None);
    }
    match value.as_str() {
        Some(text) if accept(text) => Some(Some(text.to_string())),
        _ => {
            fallback(argument, value);
            None
        }
    }
}

fn bool_argument(attribute: &AttributeView<'_>, argument: &str) -> Option<bool> {
    let value = attribute.named(argument)?;
    let flag = value.as_bool();
    if flag.is_none() {
        fallback(argument, value);
    }
    flag
}

/// A string array; `null` elements are skipped
fn namespace_set_argument(attribute: &AttributeView<'_>, argument: &str) -> Option<BTreeSet<String>> {
    let value = attribute.named(argument)?;
    let AttributeValue::Array(items) = value else {
        fallback(argument, value);
        return None;
    };
    let mut namespaces = BTreeSet::new();
    for item in items.iter().filter(|item| !item.is_null()) {
        match item.as_str() {
            Some(namespace) if is_dotted_name(namespace) => {
                namespaces.insert(namespace.to_string());
            }
            _ => {
                fallback(argument, value);
                return None;
            }
        }
    }
    Some(namespaces)
}

/// Options for one run: `defaults` overridden by the options attribute, if any
pub fn resolve_options(compilation: &Compilation, defaults: &GeneratorOptions) -> GeneratorOptions {
    let mut options = defaults.clone();
    let Some(attribute) = options_attribute(compilation) else {
        return options;
    };
    debug!(
        "Applying {} with {} argument(s)",
        OPTIONS_ATTRIBUTE,
        attribute.arguments.len()
    );

    if let Some(name) = string_argument(&attribute, GENERATED_CLASS_NAME, is_identifier) {
        options.generated_class_name = name;
    }
    if let Some(suffix) = string_argument(&attribute, LENGTH_SUFFIX, |suffix| {
        suffix.chars().all(|c| c.is_alphanumeric() || c == '_')
    }) {
        options.length_suffix = suffix;
    }
    if let Some(flag) = bool_argument(&attribute, GENERATE_DOCUMENTATION) {
        options.generate_documentation = flag;
    }
    if let Some(namespace) = nullable_string_argument(&attribute, NAMESPACE, is_dotted_name) {
        options.namespace = namespace;
    }
    if let Some(include) = namespace_set_argument(&attribute, INCLUDE_NAMESPACES) {
        options.scan.include_namespaces = include;
    }
    if let Some(exclude) = namespace_set_argument(&attribute, EXCLUDE_NAMESPACES) {
        options.scan.exclude_namespaces = exclude;
    }
    if let Some(flag) = bool_argument(&attribute, SCAN_NESTED_NAMESPACES) {
        options.scan.scan_nested_namespaces = flag;
    }
    if let Some(suffix) = nullable_string_argument(&attribute, SCAN_ENTITY_SUFFIX, |_| true) {
        options.scan.entity_suffix = suffix;
    }
    options
}

#[cfg(test)]
mod tests {
    use super::*;
    use entity_lengths_core::compilation::SourceFile;
    use entity_lengths_core::config::ScanOptions;
    use entity_lengths_core::syntax::{AttributeArgument, Literal, SyntaxTreeBuilder};
    use pretty_assertions::assert_eq;

    fn string(value: &str) -> AttributeValue {
        AttributeValue::Literal(Literal::String(value.to_string()))
    }

    fn boolean(value: bool) -> AttributeValue {
        AttributeValue::Literal(Literal::Boolean(value))
    }

    fn compilation(attributes: Vec<(&str, Vec<AttributeArgument>)>) -> Compilation {
        let mut builder = SyntaxTreeBuilder::new();
        let members = attributes
            .into_iter()
            .map(|(name, arguments)| builder.attribute(name, arguments))
            .collect();
        let root = builder.compilation_unit(members);
        let tree = builder.finish(root).unwrap();
        Compilation::from_files("App", vec![SourceFile::new("AssemblyInfo.cs", tree)])
    }

    #[test]
    fn test_no_attribute_keeps_defaults() {
        let defaults = GeneratorOptions {
            length_suffix: "Max".to_string(),
            ..GeneratorOptions::default()
        };
        assert_eq!(resolve_options(&compilation(Vec::new()), &defaults), defaults);
    }

    #[test]
    fn test_all_arguments() {
        let compilation = compilation(vec![(
            "EntityLengthsGeneratorAttribute",
            vec![
                AttributeArgument::named("GeneratedClassName", string("Limits")),
                AttributeArgument::named("LengthSuffix", string("Max")),
                AttributeArgument::named("GenerateDocumentation", boolean(true)),
                AttributeArgument::named("Namespace", string("App.Generated")),
                AttributeArgument::named(
                    "IncludeNamespaces",
                    AttributeValue::Array(vec![
                        string("App.Domain"),
                        AttributeValue::Literal(Literal::Null),
                    ]),
                ),
                AttributeArgument::named(
                    "ExcludeNamespaces",
                    AttributeValue::Array(vec![string("App.Domain.Exclude")]),
                ),
                AttributeArgument::named("ScanNestedNamespaces", boolean(false)),
                AttributeArgument::named("ScanEntitySuffix", string("Entity")),
            ],
        )]);
        let options = resolve_options(&compilation, &GeneratorOptions::default());
        assert_eq!(
            options,
            GeneratorOptions {
                generated_class_name: "Limits".to_string(),
                length_suffix: "Max".to_string(),
                generate_documentation: true,
                namespace: Some("App.Generated".to_string()),
                scan: ScanOptions {
                    include_namespaces: ["App.Domain".to_string()].into(),
                    exclude_namespaces: ["App.Domain.Exclude".to_string()].into(),
                    scan_nested_namespaces: false,
                    entity_suffix: Some("Entity".to_string()),
                },
            }
        );
    }

    #[test]
    fn test_wrong_shapes_fall_back_to_defaults() {
        let compilation = compilation(vec![(
            "EntityLengthsGenerator",
            vec![
                AttributeArgument::named("GeneratedClassName", boolean(true)),
                AttributeArgument::named("LengthSuffix", string("Has Space")),
                AttributeArgument::named("GenerateDocumentation", string("yes")),
                AttributeArgument::named("IncludeNamespaces", string("App.Domain")),
                AttributeArgument::named(
                    "ExcludeNamespaces",
                    AttributeValue::Array(vec![string("App"), boolean(false)]),
                ),
                AttributeArgument::named(
                    "ScanNestedNamespaces",
                    AttributeValue::Expression("Flags.Nested".to_string()),
                ),
            ],
        )]);
        let defaults = GeneratorOptions::default();
        assert_eq!(resolve_options(&compilation, &defaults), defaults);
    }

    #[test]
    fn test_null_clears_nullable_arguments() {
        let compilation = compilation(vec![(
            "EntityLengthsGenerator",
            vec![
                AttributeArgument::named("Namespace", AttributeValue::Literal(Literal::Null)),
                AttributeArgument::named(
                    "ScanEntitySuffix",
                    AttributeValue::Literal(Literal::Null),
                ),
            ],
        )]);
        let defaults = GeneratorOptions {
            namespace: Some("Configured".to_string()),
            scan: ScanOptions {
                entity_suffix: Some("Entity".to_string()),
                ..ScanOptions::default()
            },
            ..GeneratorOptions::default()
        };
        let options = resolve_options(&compilation, &defaults);
        assert_eq!(options.namespace, None);
        assert_eq!(options.scan.entity_suffix, None);
    }

    #[test]
    fn test_first_matching_attribute_wins() {
        let compilation = compilation(vec![
            ("AssemblyTitle", vec![AttributeArgument::positional(string("App"))]),
            (
                "EntityLengthsGenerator",
                vec![AttributeArgument::named("LengthSuffix", string("First"))],
            ),
            (
                "EntityLengthsGenerator",
                vec![AttributeArgument::named("LengthSuffix", string("Second"))],
            ),
        ]);
        let options = resolve_options(&compilation, &GeneratorOptions::default());
        assert_eq!(options.length_suffix, "First");
    }
}
