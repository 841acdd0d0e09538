//! Type references as written in source, and the canonical identities the
//! front end resolves them to

use serde::{Deserialize, Serialize};
use std::fmt;

/// Lookup key of a declared type: namespace, (possibly nested) name and generic arity
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TypeKey {
    pub namespace: String,
    pub name: String,
    pub arity: usize,
}

impl TypeKey {
    pub fn new(namespace: impl Into<String>, name: impl Into<String>, arity: usize) -> Self {
        Self {
            namespace: namespace.into(),
            name: name.into(),
            arity,
        }
    }
}

impl fmt::Display for TypeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.namespace.is_empty() {
            write!(f, "{}.", self.namespace)?;
        }
        write!(f, "{}", self.name)?;
        if self.arity > 0 {
            write!(f, "`{}", self.arity)?;
        }
        Ok(())
    }
}

/// A fully resolved, possibly constructed generic type
///
/// Two references denote the same type when their resolved forms are equal,
/// regardless of how they were spelled at the use site.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ResolvedType {
    pub namespace: String,
    /// Type name; nested types are dotted (`Outer.Inner`)
    pub name: String,
    pub type_arguments: Vec<ResolvedType>,
}

impl ResolvedType {
    pub fn new(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            name: name.into(),
            type_arguments: Vec::new(),
        }
    }

    pub fn with_type_arguments(mut self, type_arguments: Vec<ResolvedType>) -> Self {
        self.type_arguments = type_arguments;
        self
    }

    pub fn key(&self) -> TypeKey {
        TypeKey::new(
            self.namespace.clone(),
            self.name.clone(),
            self.type_arguments.len(),
        )
    }

    /// Innermost name, without namespace or enclosing types
    pub fn simple_name(&self) -> &str {
        self.name.rsplit('.').next().unwrap_or(&self.name)
    }

    /// Whether this is the type `name` declared in `namespace`, ignoring type arguments
    pub fn is(&self, namespace: &str, name: &str) -> bool {
        self.namespace == namespace && self.name == name
    }

    pub fn canonical_name(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for ResolvedType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.namespace.is_empty() {
            write!(f, "{}.", self.namespace)?;
        }
        write!(f, "{}", self.name)?;
        if !self.type_arguments.is_empty() {
            write!(f, "<")?;
            for (i, argument) in self.type_arguments.iter().enumerate() {
                if i > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{argument}")?;
            }
            write!(f, ">")?;
        }
        Ok(())
    }
}

/// A type as written in source plus its resolution, if the front end found one
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TypeRef {
    pub text: String,
    pub resolved: Option<ResolvedType>,
}

impl TypeRef {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            resolved: None,
        }
    }

    pub fn resolved(text: impl Into<String>, resolved: ResolvedType) -> Self {
        Self {
            text: text.into(),
            resolved: Some(resolved),
        }
    }

    /// Whether the reference denotes `System.String`, nullable or not
    pub fn is_string(&self) -> bool {
        if let Some(resolved) = &self.resolved {
            return resolved.is("System", "String");
        }
        let text = self.text.trim();
        let text = text.strip_suffix('?').unwrap_or(text).trim_end();
        let text = text.strip_prefix("global::").unwrap_or(text);
        matches!(text, "string" | "String" | "System.String")
    }
}
