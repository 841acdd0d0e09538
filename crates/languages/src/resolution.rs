//! Type resolution and linking of parsed files into a [`Compilation`]
//!
//! Type references are resolved the way the C# compiler looks names up, in a
//! simplified form: the enclosing namespaces are searched innermost first,
//! then the namespaces imported by `using` directives. A reference that names
//! no known type still gets an identity built from what was written, so two
//! spellings of the same unknown type compare equal.

use crate::ParsedFile;
use entity_lengths_core::compilation::{Compilation, SourceFile, TypeCatalog};
use entity_lengths_core::syntax::{ResolvedType, SyntaxTree, TypeKey, TypeScope};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::debug;

const EF_CORE: &str = "Microsoft.EntityFrameworkCore";
const IDENTITY: &str = "Microsoft.AspNetCore.Identity.EntityFrameworkCore";

/// Framework types the sources refer to without declaring them:
/// `(namespace, name, arity, direct bases)`
const WELL_KNOWN_TYPES: &[(&str, &str, usize, &[(&str, &str)])] = &[
    ("System", "String", 0, &[]),
    ("System", "Int32", 0, &[]),
    ("System", "Int64", 0, &[]),
    ("System", "Boolean", 0, &[]),
    ("System", "Object", 0, &[]),
    ("System", "Attribute", 0, &[]),
    (EF_CORE, "DbContext", 0, &[]),
    (EF_CORE, "ModelBuilder", 0, &[]),
    (EF_CORE, "DbSet", 1, &[]),
    (EF_CORE, "IEntityTypeConfiguration", 1, &[]),
    (
        "Microsoft.EntityFrameworkCore.Metadata.Builders",
        "EntityTypeBuilder",
        1,
        &[],
    ),
    (IDENTITY, "IdentityDbContext", 0, &[(EF_CORE, "DbContext")]),
    (IDENTITY, "IdentityDbContext", 1, &[(EF_CORE, "DbContext")]),
    (IDENTITY, "IdentityDbContext", 3, &[(EF_CORE, "DbContext")]),
    (IDENTITY, "IdentityUserContext", 1, &[(EF_CORE, "DbContext")]),
    (
        "System.ComponentModel.DataAnnotations",
        "MaxLengthAttribute",
        0,
        &[("System", "Attribute")],
    ),
    (
        "System.ComponentModel.DataAnnotations",
        "StringLengthAttribute",
        0,
        &[("System", "Attribute")],
    ),
    (
        "System.ComponentModel.DataAnnotations.Schema",
        "ColumnAttribute",
        0,
        &[("System", "Attribute")],
    ),
];

/// C# keyword aliases of `System` types
fn keyword_type(keyword: &str) -> Option<&'static str> {
    let name = match keyword {
        "string" => "String",
        "int" => "Int32",
        "long" => "Int64",
        "short" => "Int16",
        "byte" => "Byte",
        "sbyte" => "SByte",
        "uint" => "UInt32",
        "ulong" => "UInt64",
        "ushort" => "UInt16",
        "bool" => "Boolean",
        "char" => "Char",
        "double" => "Double",
        "float" => "Single",
        "decimal" => "Decimal",
        "object" => "Object",
        "nint" => "IntPtr",
        "nuint" => "UIntPtr",
        _ => return None,
    };
    Some(name)
}

/// Structure of a type reference as written
#[derive(Debug, Clone, PartialEq, Eq)]
struct TypeSyntax {
    /// Dotted segments; generic arguments attach to the last one
    segments: Vec<String>,
    type_arguments: Vec<TypeSyntax>,
}

impl TypeSyntax {
    /// Parses `global::A.B<C, D<E>>?`; arrays, tuples and pointers yield `None`
    fn parse(text: &str) -> Option<Self> {
        let text: String = text.chars().filter(|c| !c.is_whitespace()).collect();
        let text = text.strip_suffix('?').unwrap_or(&text);
        let text = text.strip_prefix("global::").unwrap_or(text);
        if text.is_empty() || text.contains(['[', '(', '*']) {
            return None;
        }
        let (path, arguments) = match text.find('<') {
            Some(open) => {
                let inner = text[open + 1..].strip_suffix('>')?;
                (&text[..open], split_type_arguments(inner)?)
            }
            None => (text, Vec::new()),
        };
        let segments: Vec<String> = path.split('.').map(str::to_string).collect();
        if segments.iter().any(|segment| segment.is_empty()) {
            return None;
        }
        let type_arguments = arguments
            .into_iter()
            .map(TypeSyntax::parse)
            .collect::<Option<Vec<_>>>()?;
        Some(Self {
            segments,
            type_arguments,
        })
    }
}

/// Splits `A, B<C, D>` at top-level commas
fn split_type_arguments(inner: &str) -> Option<Vec<&str>> {
    let mut arguments = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;
    for (i, c) in inner.char_indices() {
        match c {
            '<' => depth += 1,
            '>' => depth = depth.checked_sub(1)?,
            ',' if depth == 0 => {
                arguments.push(&inner[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    if depth != 0 {
        return None;
    }
    arguments.push(&inner[start..]);
    Some(arguments)
}

/// Set of every type name a compilation can bind to
#[derive(Debug, Clone, Default)]
pub struct TypeIndex {
    known: HashSet<TypeKey>,
}

impl TypeIndex {
    /// Index seeded with the well-known framework types and every class declared in `trees`
    pub fn new<'a>(trees: impl IntoIterator<Item = &'a SyntaxTree>) -> Self {
        let mut known: HashSet<TypeKey> = WELL_KNOWN_TYPES
            .iter()
            .map(|(namespace, name, arity, _)| TypeKey::new(*namespace, *name, *arity))
            .collect();
        for tree in trees {
            known.extend(
                tree.classes()
                    .filter_map(|class| tree.declared_type_key(class)),
            );
        }
        Self { known }
    }

    pub fn contains(&self, key: &TypeKey) -> bool {
        self.known.contains(key)
    }

    /// Resolves `text` as seen from `scope`
    pub fn resolve(&self, scope: &TypeScope, text: &str) -> Option<ResolvedType> {
        let syntax = TypeSyntax::parse(text)?;
        Some(self.resolve_syntax(scope, &syntax))
    }

    fn resolve_syntax(&self, scope: &TypeScope, syntax: &TypeSyntax) -> ResolvedType {
        let type_arguments: Vec<ResolvedType> = syntax
            .type_arguments
            .iter()
            .map(|argument| self.resolve_syntax(scope, argument))
            .collect();
        let arity = type_arguments.len();

        if let [single] = syntax.segments.as_slice() {
            if let Some(name) = keyword_type(single) {
                return ResolvedType::new("System", name);
            }
        }

        let bound = self
            .lookup_in_namespaces(&scope.namespaces, &syntax.segments, arity)
            .or_else(|| self.lookup_in_usings(&scope.usings, &syntax.segments, arity));
        let (namespace, name) = bound.unwrap_or_else(|| {
            let (qualifier, last) = syntax.segments.split_at(syntax.segments.len() - 1);
            (qualifier.join("."), last.join("."))
        });
        ResolvedType::new(namespace, name).with_type_arguments(type_arguments)
    }

    /// Tries every enclosing namespace, and every split of the written name
    /// into namespace qualifier and (possibly nested) type name
    fn lookup_in_namespaces(
        &self,
        namespaces: &[String],
        segments: &[String],
        arity: usize,
    ) -> Option<(String, String)> {
        for enclosing in namespaces {
            for split in 0..segments.len() {
                let mut namespace: Vec<&str> = Vec::new();
                if !enclosing.is_empty() {
                    namespace.push(enclosing);
                }
                namespace.extend(segments[..split].iter().map(String::as_str));
                let candidate =
                    TypeKey::new(namespace.join("."), segments[split..].join("."), arity);
                if self.contains(&candidate) {
                    return Some((candidate.namespace, candidate.name));
                }
            }
        }
        None
    }

    /// `using` directives import types, not nested namespaces
    fn lookup_in_usings(
        &self,
        usings: &[String],
        segments: &[String],
        arity: usize,
    ) -> Option<(String, String)> {
        let name = segments.join(".");
        usings.iter().find_map(|using| {
            let candidate = TypeKey::new(using.clone(), name.clone(), arity);
            self.contains(&candidate)
                .then_some((candidate.namespace, candidate.name))
        })
    }
}

/// Catalog entries for the well-known framework types
fn well_known_catalog() -> TypeCatalog {
    let mut catalog = TypeCatalog::new();
    for (namespace, name, arity, bases) in WELL_KNOWN_TYPES {
        let bases = bases
            .iter()
            .map(|(base_namespace, base_name)| ResolvedType::new(*base_namespace, *base_name))
            .collect();
        catalog.insert(TypeKey::new(*namespace, *name, *arity), bases);
    }
    catalog
}

/// Resolves every type reference of `files` and links them into one compilation
pub fn link(assembly_name: &str, files: &[Arc<ParsedFile>]) -> Compilation {
    let index = TypeIndex::new(files.iter().map(|file| &file.tree));
    let mut global_usings: Vec<String> = Vec::new();
    for namespace in files.iter().flat_map(|file| file.tree.global_usings()) {
        if !global_usings.iter().any(|known| known == namespace) {
            global_usings.push(namespace.to_string());
        }
    }
    let mut catalog = well_known_catalog();
    let sources: Vec<Arc<SourceFile>> = files
        .iter()
        .map(|file| {
            let mut tree = file.tree.clone();
            tree.resolve_type_refs(&global_usings, |scope, text| index.resolve(scope, text));
            catalog.extend_from_tree(&tree);
            Arc::new(SourceFile::new(file.path.clone(), tree))
        })
        .collect();
    debug!(
        "Linked {} files of assembly {} ({} known types)",
        sources.len(),
        assembly_name,
        catalog.len()
    );
    Compilation::new(assembly_name, sources, catalog)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn scope(namespaces: &[&str], usings: &[&str]) -> TypeScope {
        TypeScope {
            namespaces: namespaces.iter().map(|s| s.to_string()).collect(),
            usings: usings.iter().map(|s| s.to_string()).collect(),
        }
    }

    #[test]
    fn test_parse_type_syntax() {
        let syntax = TypeSyntax::parse("global::A.B<C, D<E>>?").unwrap();
        assert_eq!(syntax.segments, vec!["A", "B"]);
        assert_eq!(syntax.type_arguments.len(), 2);
        assert_eq!(syntax.type_arguments[1].type_arguments[0].segments, vec!["E"]);
        assert_eq!(TypeSyntax::parse("string[]"), None);
        assert_eq!(TypeSyntax::parse("(int, string)"), None);
        assert_eq!(TypeSyntax::parse("A<B"), None);
    }

    #[test]
    fn test_keywords_resolve_to_system_types() {
        let index = TypeIndex::default();
        let resolved = index.resolve(&scope(&[""], &[]), "string?").unwrap();
        assert_eq!(resolved, ResolvedType::new("System", "String"));
    }

    #[test]
    fn test_using_directive_binds_framework_type() {
        let index = TypeIndex::new(std::iter::empty());
        let resolved = index
            .resolve(
                &scope(&["App.Data", "App", ""], &[EF_CORE]),
                "IEntityTypeConfiguration<Blog>",
            )
            .unwrap();
        assert_eq!(
            resolved,
            ResolvedType::new(EF_CORE, "IEntityTypeConfiguration")
                .with_type_arguments(vec![ResolvedType::new("", "Blog")])
        );
    }

    #[test]
    fn test_enclosing_namespace_wins_over_unbound_fallback() {
        let mut index = TypeIndex::default();
        index.known.insert(TypeKey::new("App.Domain", "User", 0));
        let resolved = index
            .resolve(&scope(&["App.Domain.Sub", "App.Domain", "App", ""], &[]), "User")
            .unwrap();
        assert_eq!(resolved, ResolvedType::new("App.Domain", "User"));

        let qualified = index.resolve(&scope(&["App", ""], &[]), "Domain.User").unwrap();
        assert_eq!(qualified, ResolvedType::new("App.Domain", "User"));
    }

    #[test]
    fn test_unknown_type_keeps_written_qualifier() {
        let index = TypeIndex::default();
        let resolved = index
            .resolve(&scope(&[""], &[]), "Microsoft.EntityFrameworkCore.DbContext")
            .unwrap();
        assert_eq!(resolved, ResolvedType::new(EF_CORE, "DbContext"));
    }

    #[test]
    fn test_well_known_identity_context_extends_db_context() {
        let catalog = well_known_catalog();
        let chain = catalog.base_chain(&[ResolvedType::new(IDENTITY, "IdentityDbContext")
            .with_type_arguments(vec![ResolvedType::new("App", "User")])]);
        assert!(chain.iter().any(|ty| ty.is(EF_CORE, "DbContext")));
    }

    #[test]
    fn test_global_usings_apply_to_every_file() {
        let global_usings = crate::parse_file(
            std::path::Path::new("GlobalUsings.cs"),
            "global using Microsoft.EntityFrameworkCore;\n",
        )
        .unwrap();
        let context = crate::parse_file(
            std::path::Path::new("Data/AppDbContext.cs"),
            "namespace App.Data;\npublic class AppDbContext : DbContext { }\n",
        )
        .unwrap();
        let compilation = link("App", &[Arc::new(context), Arc::new(global_usings)]);
        let bases = compilation
            .catalog()
            .direct_bases(&TypeKey::new("App.Data", "AppDbContext", 0));
        assert_eq!(bases, &[ResolvedType::new(EF_CORE, "DbContext")]);
    }
}
