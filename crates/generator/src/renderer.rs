//! Serialization of extracted facts into the generated C# constants unit

use entity_lengths_core::config::GeneratorOptions;
use entity_lengths_core::entities::EntityFacts;
use serde::Serialize;

const HEADER: &str = "// <auto-generated/>";

/// One generated source unit
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GeneratedSource {
    /// File name the unit is registered under, `{GeneratedClassName}.g.cs`
    pub hint_name: String,
    pub text: String,
}

/// Line-oriented writer with tab indentation and `\n` line endings
#[derive(Default)]
struct SourceWriter {
    text: String,
}

impl SourceWriter {
    fn line(&mut self, depth: usize, content: &str) {
        for _ in 0..depth {
            self.text.push('\t');
        }
        self.text.push_str(content);
        self.text.push('\n');
    }

    fn blank(&mut self) {
        self.text.push('\n');
    }

    fn summary(&mut self, depth: usize, content: &str) {
        self.line(depth, "/// <summary>");
        self.line(depth, &format!("/// {content}"));
        self.line(depth, "/// </summary>");
    }
}

/// Namespace of the generated unit; `None` when the line is omitted
fn target_namespace<'a>(options: &'a GeneratorOptions, assembly_name: &'a str) -> Option<&'a str> {
    options
        .namespace
        .as_deref()
        .filter(|namespace| !namespace.is_empty())
        .or(Some(assembly_name).filter(|name| !name.is_empty()))
}

/// Renders `groups` in the given order
///
/// Groups naming the same entity are emitted as separate nested classes; the
/// `partial` modifier keeps the result valid C#.
pub fn render<'a>(
    options: &GeneratorOptions,
    assembly_name: &str,
    groups: impl IntoIterator<Item = &'a EntityFacts>,
) -> GeneratedSource {
    let documented = options.generate_documentation;
    let container = options.generated_class_name.as_str();
    let mut writer = SourceWriter::default();

    writer.line(0, HEADER);
    if let Some(namespace) = target_namespace(options, assembly_name) {
        writer.line(0, &format!("namespace {namespace};"));
    }
    writer.blank();

    if documented {
        writer.summary(0, "Maximum lengths of entity properties.");
    }
    writer.line(0, &format!("public static partial class {container}"));
    writer.line(0, "{");
    for (index, group) in groups.into_iter().enumerate() {
        if index > 0 {
            writer.blank();
        }
        let entity = group.entity_name.as_str();
        if documented {
            writer.summary(1, &format!("Maximum lengths of <c>{entity}</c> properties."));
        }
        writer.line(1, &format!("public static partial class {entity}"));
        writer.line(1, "{");
        for fact in &group.facts {
            if documented {
                writer.summary(
                    2,
                    &format!(
                        "Maximum length of <c>{entity}.{}</c>.",
                        fact.property_name
                    ),
                );
            }
            writer.line(
                2,
                &format!(
                    "public const int {}{} = {};",
                    fact.property_name, options.length_suffix, fact.max_length
                ),
            );
        }
        writer.line(1, "}");
    }
    writer.line(0, "}");

    GeneratedSource {
        hint_name: format!("{container}.g.cs"),
        text: writer.text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use entity_lengths_core::entities::PropertyLengthFact;
    use pretty_assertions::assert_eq;

    fn groups() -> Vec<EntityFacts> {
        vec![
            EntityFacts::new(
                "User",
                vec![
                    PropertyLengthFact::new("Name", 50),
                    PropertyLengthFact::new("Email", 120),
                ],
            ),
            EntityFacts::new("Blog", vec![PropertyLengthFact::new("Url", 200)]),
        ]
    }

    #[test]
    fn test_render_default_options() {
        let source = render(&GeneratorOptions::default(), "App", &groups());
        assert_eq!(source.hint_name, "EntityLengths.g.cs");
        assert_eq!(
            source.text,
            "// <auto-generated/>\n\
             namespace App;\n\
             \n\
             public static partial class EntityLengths\n\
             {\n\
             \tpublic static partial class User\n\
             \t{\n\
             \t\tpublic const int NameLength = 50;\n\
             \t\tpublic const int EmailLength = 120;\n\
             \t}\n\
             \n\
             \tpublic static partial class Blog\n\
             \t{\n\
             \t\tpublic const int UrlLength = 200;\n\
             \t}\n\
             }\n"
        );
    }

    #[test]
    fn test_render_custom_names_and_namespace() {
        let options = GeneratorOptions {
            generated_class_name: "Limits".to_string(),
            length_suffix: "Max".to_string(),
            namespace: Some("App.Generated".to_string()),
            ..GeneratorOptions::default()
        };
        let source = render(&options, "App", &groups()[1..]);
        assert_eq!(source.hint_name, "Limits.g.cs");
        assert_eq!(
            source.text,
            "// <auto-generated/>\n\
             namespace App.Generated;\n\
             \n\
             public static partial class Limits\n\
             {\n\
             \tpublic static partial class Blog\n\
             \t{\n\
             \t\tpublic const int UrlMax = 200;\n\
             \t}\n\
             }\n"
        );
    }

    #[test]
    fn test_render_without_namespace_or_groups() {
        let source = render(&GeneratorOptions::default(), "", &Vec::<EntityFacts>::new());
        assert_eq!(
            source.text,
            "// <auto-generated/>\n\
             \n\
             public static partial class EntityLengths\n\
             {\n\
             }\n"
        );
    }

    #[test]
    fn test_render_documentation() {
        let options = GeneratorOptions {
            generate_documentation: true,
            ..GeneratorOptions::default()
        };
        let source = render(&options, "App", &groups()[1..]);
        assert_eq!(
            source.text,
            "// <auto-generated/>\n\
             namespace App;\n\
             \n\
             /// <summary>\n\
             /// Maximum lengths of entity properties.\n\
             /// </summary>\n\
             public static partial class EntityLengths\n\
             {\n\
             \t/// <summary>\n\
             \t/// Maximum lengths of <c>Blog</c> properties.\n\
             \t/// </summary>\n\
             \tpublic static partial class Blog\n\
             \t{\n\
             \t\t/// <summary>\n\
             \t\t/// Maximum length of <c>Blog.Url</c>.\n\
             \t\t/// </summary>\n\
             \t\tpublic const int UrlLength = 200;\n\
             \t}\n\
             }\n"
        );
    }

    #[test]
    fn test_same_entity_groups_are_not_merged() {
        let groups = vec![
            EntityFacts::new("User", vec![PropertyLengthFact::new("Name", 50)]),
            EntityFacts::new("User", vec![PropertyLengthFact::new("Name", 60)]),
        ];
        let source = render(&GeneratorOptions::default(), "App", &groups);
        assert_eq!(
            source.text.matches("public static partial class User").count(),
            2
        );
    }
}
