//! C# front end built on tree-sitter

mod literals;
mod lowering;

use crate::SourceParser;
use entity_lengths_core::error::{Error, Result};
use entity_lengths_core::syntax::SyntaxTree;
use lowering::Lowerer;
use std::path::Path;
use tracing::debug;
use tree_sitter::Parser;

/// Parses C# source text into the arena syntax model
///
/// Syntax errors are tolerated: tree-sitter recovers locally and the
/// well-formed parts of the file are still lowered.
pub struct CSharpParser {
    parser: Parser,
}

impl CSharpParser {
    pub fn new() -> Result<Self> {
        let mut parser = Parser::new();
        parser
            .set_language(&tree_sitter_c_sharp::LANGUAGE.into())
            .map_err(|e| anyhow::anyhow!("Failed to set C# language: {e}"))?;
        Ok(Self { parser })
    }
}

impl SourceParser for CSharpParser {
    fn parse(&mut self, source: &str, file_path: &Path) -> Result<SyntaxTree> {
        let tree = self.parser.parse(source, None).ok_or_else(|| {
            Error::parse(file_path.display().to_string(), "parser returned no tree")
        })?;
        let root = tree.root_node();
        if root.has_error() {
            debug!(
                "Syntax errors in {}; lowering the recoverable parts",
                file_path.display()
            );
        }
        Lowerer::new(source).lower(root)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use entity_lengths_core::syntax::{
        AttributeArgument, AttributeValue, Literal, NodeId, SyntaxNode, TypeRef,
    };
    use pretty_assertions::assert_eq;

    fn parse(source: &str) -> SyntaxTree {
        CSharpParser::new()
            .unwrap()
            .parse(source, Path::new("Test.cs"))
            .unwrap()
    }

    fn class_named(tree: &SyntaxTree, name: &str) -> NodeId {
        tree.classes()
            .find(|id| matches!(tree.node(*id), SyntaxNode::Class { name: n, .. } if n == name))
            .unwrap()
    }

    fn attribute_arguments(tree: &SyntaxTree, id: NodeId) -> (String, Vec<AttributeArgument>) {
        match tree.node(id) {
            SyntaxNode::Attribute { name, arguments } => (name.clone(), arguments.clone()),
            other => panic!("expected attribute, got {other:?}"),
        }
    }

    #[test]
    fn test_block_namespace_class_and_attributes() {
        let tree = parse(
            r#"
using System.ComponentModel.DataAnnotations;

namespace App.Domain
{
    public class User
    {
        [MaxLength(50)]
        public string Name { get; set; }

        [Column(TypeName = "varchar(20)")]
        public string? Code { get; set; }
    }
}
"#,
        );
        let user = class_named(&tree, "User");
        assert_eq!(tree.containing_namespace(user), "App.Domain");

        let SyntaxNode::Class { members, .. } = tree.node(user) else {
            panic!("expected class");
        };
        assert_eq!(members.len(), 2);

        let SyntaxNode::Property {
            name,
            property_type,
            attributes,
        } = tree.node(members[0])
        else {
            panic!("expected property");
        };
        assert_eq!(name, "Name");
        assert_eq!(property_type, &TypeRef::new("string"));
        let (attribute, arguments) = attribute_arguments(&tree, attributes[0]);
        assert_eq!(attribute, "MaxLength");
        assert_eq!(
            arguments,
            vec![AttributeArgument::positional(AttributeValue::Literal(
                Literal::Integer(50)
            ))]
        );

        let SyntaxNode::Property {
            property_type,
            attributes,
            ..
        } = tree.node(members[1])
        else {
            panic!("expected property");
        };
        assert!(property_type.is_string());
        let (_, arguments) = attribute_arguments(&tree, attributes[0]);
        assert_eq!(
            arguments,
            vec![AttributeArgument::named(
                "TypeName",
                AttributeValue::Literal(Literal::String("varchar(20)".to_string()))
            )]
        );
    }

    #[test]
    fn test_file_scoped_namespace_wraps_following_declarations() {
        let tree = parse(
            r#"
namespace App.Data;

public class Blog { }
public class Post { }
"#,
        );
        let blog = class_named(&tree, "Blog");
        let post = class_named(&tree, "Post");
        assert_eq!(tree.containing_namespace(blog), "App.Data");
        assert_eq!(tree.containing_namespace(post), "App.Data");
    }

    #[test]
    fn test_base_list_and_generic_arguments() {
        let tree = parse(
            r#"
public class BlogConfiguration : IEntityTypeConfiguration<Blog>, IDisposable
{
}
"#,
        );
        let class = class_named(&tree, "BlogConfiguration");
        let SyntaxNode::Class { base_types, .. } = tree.node(class) else {
            panic!("expected class");
        };
        let texts: Vec<&str> = base_types.iter().map(|t| t.text.as_str()).collect();
        assert_eq!(texts, vec!["IEntityTypeConfiguration<Blog>", "IDisposable"]);
    }

    #[test]
    fn test_fluent_chain_shape() {
        let tree = parse(
            r#"
public class BlogConfiguration
{
    public void Configure(EntityTypeBuilder<Blog> builder)
    {
        builder.Property(b => b.Url).IsRequired().HasMaxLength(200);
    }
}
"#,
        );
        let invocations: Vec<String> = tree
            .descendants(tree.root())
            .filter_map(|id| match tree.node(id) {
                SyntaxNode::Invocation { callee, .. } => match tree.node(*callee) {
                    SyntaxNode::MemberAccess { name, .. } => Some(name.clone()),
                    _ => None,
                },
                _ => None,
            })
            .collect();
        assert_eq!(invocations, vec!["HasMaxLength", "IsRequired", "Property"]);

        let lambda = tree
            .descendants(tree.root())
            .find(|id| matches!(tree.node(*id), SyntaxNode::Lambda { .. }))
            .unwrap();
        let SyntaxNode::Lambda { parameters, body } = tree.node(lambda) else {
            panic!("expected lambda");
        };
        assert_eq!(parameters, &vec!["b".to_string()]);
        assert!(matches!(
            tree.node(*body),
            SyntaxNode::MemberAccess { name, .. } if name == "Url"
        ));
    }

    #[test]
    fn test_generic_member_access_keeps_type_arguments() {
        let tree = parse(
            r#"
public class AppDbContext : DbContext
{
    protected override void OnModelCreating(ModelBuilder modelBuilder)
    {
        modelBuilder.Entity<User>(entity =>
        {
            entity.Property(e => e.Name).HasMaxLength(50);
        });
    }
}
"#,
        );
        let entity_access = tree
            .descendants(tree.root())
            .find(|id| {
                matches!(tree.node(*id), SyntaxNode::MemberAccess { name, .. } if name == "Entity")
            })
            .unwrap();
        let SyntaxNode::MemberAccess { type_arguments, .. } = tree.node(entity_access) else {
            panic!("expected member access");
        };
        assert_eq!(type_arguments, &vec![TypeRef::new("User")]);

        let block_lambda = tree
            .descendants(tree.root())
            .find(|id| matches!(tree.node(*id), SyntaxNode::Lambda { .. }))
            .unwrap();
        let SyntaxNode::Lambda { body, .. } = tree.node(block_lambda) else {
            panic!("expected lambda");
        };
        assert!(matches!(tree.node(*body), SyntaxNode::Block { statements } if statements.len() == 1));
    }

    #[test]
    fn test_expression_bodied_method_becomes_block() {
        let tree = parse(
            r#"
public class AppDbContext : DbContext
{
    protected override void OnModelCreating(ModelBuilder b) =>
        b.Entity<User>().Property(u => u.Name).HasMaxLength(50);
}
"#,
        );
        let method = tree
            .descendants(tree.root())
            .find(|id| matches!(tree.node(*id), SyntaxNode::Method { .. }))
            .unwrap();
        let SyntaxNode::Method { name, body } = tree.node(method) else {
            panic!("expected method");
        };
        assert_eq!(name, "OnModelCreating");
        let body = body.unwrap();
        let SyntaxNode::Block { statements } = tree.node(body) else {
            panic!("expected block");
        };
        assert!(matches!(
            tree.node(statements[0]),
            SyntaxNode::ExpressionStatement { .. }
        ));
    }

    #[test]
    fn test_assembly_attribute_with_arrays() {
        let tree = parse(
            r#"
[assembly: EntityLengthsGenerator(
    GeneratedClassName = "Limits",
    IncludeNamespaces = new[] { "App.Domain", null },
    ScanNestedNamespaces = false)]

namespace App;
"#,
        );
        let attributes: Vec<NodeId> = tree.global_attributes().collect();
        assert_eq!(attributes.len(), 1);
        let (name, arguments) = attribute_arguments(&tree, attributes[0]);
        assert_eq!(name, "EntityLengthsGenerator");
        assert_eq!(
            arguments,
            vec![
                AttributeArgument::named(
                    "GeneratedClassName",
                    AttributeValue::Literal(Literal::String("Limits".to_string()))
                ),
                AttributeArgument::named(
                    "IncludeNamespaces",
                    AttributeValue::Array(vec![
                        AttributeValue::Literal(Literal::String("App.Domain".to_string())),
                        AttributeValue::Literal(Literal::Null),
                    ])
                ),
                AttributeArgument::named(
                    "ScanNestedNamespaces",
                    AttributeValue::Literal(Literal::Boolean(false))
                ),
            ]
        );
    }

    #[test]
    fn test_negative_attribute_argument_is_folded() {
        let tree = parse(
            r#"
public class User
{
    [MaxLength(-1)]
    public string Name { get; set; }
}
"#,
        );
        let attribute = tree
            .descendants(tree.root())
            .find(|id| matches!(tree.node(*id), SyntaxNode::Attribute { .. }))
            .unwrap();
        let (_, arguments) = attribute_arguments(&tree, attribute);
        assert_eq!(arguments[0].value.as_integer(), Some(-1));
    }

    #[test]
    fn test_nested_classes_are_members() {
        let tree = parse(
            r#"
namespace App
{
    public class Outer
    {
        public class Inner
        {
            public string Name { get; set; }
        }
    }
}
"#,
        );
        let inner = class_named(&tree, "Inner");
        assert_eq!(
            tree.declared_type_key(inner).map(|key| key.name),
            Some("Outer.Inner".to_string())
        );
    }

    #[test]
    fn test_colon_argument_stays_positional() {
        let tree = parse(
            r#"
public class User
{
    [StringLength(maximumLength: 80, MinimumLength = 2)]
    public string Name { get; set; }
}
"#,
        );
        let attribute = tree
            .descendants(tree.root())
            .find(|id| matches!(tree.node(*id), SyntaxNode::Attribute { .. }))
            .unwrap();
        let (_, arguments) = attribute_arguments(&tree, attribute);
        assert_eq!(
            arguments,
            vec![
                AttributeArgument::positional(AttributeValue::Literal(Literal::Integer(80))),
                AttributeArgument::named(
                    "MinimumLength",
                    AttributeValue::Literal(Literal::Integer(2))
                ),
            ]
        );
    }

    #[test]
    fn test_global_using_is_flagged() {
        let tree = parse(
            "global using Microsoft.EntityFrameworkCore;\nusing System.Linq;\nnamespace App;\n",
        );
        assert_eq!(
            tree.global_usings().collect::<Vec<_>>(),
            vec!["Microsoft.EntityFrameworkCore"]
        );
        let scope = tree.type_scope(tree.root());
        assert_eq!(scope.usings, vec!["Microsoft.EntityFrameworkCore", "System.Linq"]);
    }
}
