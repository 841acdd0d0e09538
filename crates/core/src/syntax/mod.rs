//! Arena-indexed syntax model of C# source
//!
//! Nodes live in a flat vector owned by [`SyntaxTree`] and refer to each other
//! through [`NodeId`] indices. Parent links are stored the same way, so the
//! tree can be walked upward and downward without reference cycles. Trees are
//! immutable once built, apart from the one-time type resolution pass run by
//! the front end.

mod builder;
mod types;

pub use builder::SyntaxTreeBuilder;
pub use types::{ResolvedType, TypeKey, TypeRef};

use serde::{Deserialize, Serialize};

/// Index of a node inside its [`SyntaxTree`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(u32);

impl NodeId {
    pub fn index(self) -> usize {
        self.0 as usize
    }

    pub(crate) fn from_index(index: usize) -> Self {
        Self(index as u32)
    }
}

/// Literal values that the extractors and the options attribute understand
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Literal {
    Integer(i64),
    String(String),
    Boolean(bool),
    Null,
    /// Any other literal, kept as source text
    Other(String),
}

/// Value of one attribute argument
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AttributeValue {
    Literal(Literal),
    Array(Vec<AttributeValue>),
    /// Expression the front end does not fold, kept as source text
    Expression(String),
}

impl AttributeValue {
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            AttributeValue::Literal(Literal::Integer(value)) => Some(*value),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            AttributeValue::Literal(Literal::String(value)) => Some(value),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            AttributeValue::Literal(Literal::Boolean(value)) => Some(*value),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, AttributeValue::Literal(Literal::Null))
    }
}

/// Positional (`name == None`) or named attribute argument
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AttributeArgument {
    pub name: Option<String>,
    pub value: AttributeValue,
}

impl AttributeArgument {
    pub fn positional(value: AttributeValue) -> Self {
        Self { name: None, value }
    }

    pub fn named(name: impl Into<String>, value: AttributeValue) -> Self {
        Self {
            name: Some(name.into()),
            value,
        }
    }
}

/// One node of the syntax model
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SyntaxNode {
    CompilationUnit {
        members: Vec<NodeId>,
    },
    UsingDirective {
        namespace: String,
        /// `global using`, visible in every file of the compilation
        global: bool,
    },
    Namespace {
        name: String,
        members: Vec<NodeId>,
    },
    Attribute {
        name: String,
        arguments: Vec<AttributeArgument>,
    },
    Class {
        name: String,
        type_parameters: Vec<String>,
        attributes: Vec<NodeId>,
        base_types: Vec<TypeRef>,
        members: Vec<NodeId>,
    },
    Property {
        name: String,
        property_type: TypeRef,
        attributes: Vec<NodeId>,
    },
    Method {
        name: String,
        body: Option<NodeId>,
    },
    Block {
        statements: Vec<NodeId>,
    },
    ExpressionStatement {
        expression: NodeId,
    },
    Invocation {
        callee: NodeId,
        arguments: Vec<NodeId>,
    },
    MemberAccess {
        receiver: NodeId,
        name: String,
        type_arguments: Vec<TypeRef>,
    },
    Name {
        identifier: String,
        type_arguments: Vec<TypeRef>,
    },
    Lambda {
        parameters: Vec<String>,
        body: NodeId,
    },
    Literal(Literal),
    /// Construct the extractors do not inspect; children are kept for traversal
    Other {
        kind: String,
        children: Vec<NodeId>,
    },
}

impl SyntaxNode {
    /// Direct children in source order
    pub fn children(&self) -> Vec<NodeId> {
        match self {
            SyntaxNode::CompilationUnit { members } | SyntaxNode::Namespace { members, .. } => {
                members.clone()
            }
            SyntaxNode::Class {
                attributes,
                members,
                ..
            } => attributes.iter().chain(members.iter()).copied().collect(),
            SyntaxNode::Property { attributes, .. } => attributes.clone(),
            SyntaxNode::Method { body, .. } => body.iter().copied().collect(),
            SyntaxNode::Block { statements } => statements.clone(),
            SyntaxNode::ExpressionStatement { expression } => vec![*expression],
            SyntaxNode::Invocation { callee, arguments } => std::iter::once(*callee)
                .chain(arguments.iter().copied())
                .collect(),
            SyntaxNode::MemberAccess { receiver, .. } => vec![*receiver],
            SyntaxNode::Lambda { body, .. } => vec![*body],
            SyntaxNode::Other { children, .. } => children.clone(),
            SyntaxNode::UsingDirective { .. }
            | SyntaxNode::Attribute { .. }
            | SyntaxNode::Name { .. }
            | SyntaxNode::Literal(_) => Vec::new(),
        }
    }

    /// Short kind label used in logs and fingerprints
    pub fn kind(&self) -> &str {
        match self {
            SyntaxNode::CompilationUnit { .. } => "compilation_unit",
            SyntaxNode::UsingDirective { .. } => "using_directive",
            SyntaxNode::Namespace { .. } => "namespace",
            SyntaxNode::Attribute { .. } => "attribute",
            SyntaxNode::Class { .. } => "class",
            SyntaxNode::Property { .. } => "property",
            SyntaxNode::Method { .. } => "method",
            SyntaxNode::Block { .. } => "block",
            SyntaxNode::ExpressionStatement { .. } => "expression_statement",
            SyntaxNode::Invocation { .. } => "invocation",
            SyntaxNode::MemberAccess { .. } => "member_access",
            SyntaxNode::Name { .. } => "name",
            SyntaxNode::Lambda { .. } => "lambda",
            SyntaxNode::Literal(_) => "literal",
            SyntaxNode::Other { kind, .. } => kind,
        }
    }

    fn type_refs_mut(&mut self) -> Vec<&mut TypeRef> {
        match self {
            SyntaxNode::Class { base_types, .. } => base_types.iter_mut().collect(),
            SyntaxNode::Property { property_type, .. } => vec![property_type],
            SyntaxNode::MemberAccess { type_arguments, .. }
            | SyntaxNode::Name { type_arguments, .. } => type_arguments.iter_mut().collect(),
            _ => Vec::new(),
        }
    }

    fn has_type_refs(&self) -> bool {
        match self {
            SyntaxNode::Class { base_types, .. } => !base_types.is_empty(),
            SyntaxNode::Property { .. } => true,
            SyntaxNode::MemberAccess { type_arguments, .. }
            | SyntaxNode::Name { type_arguments, .. } => !type_arguments.is_empty(),
            _ => false,
        }
    }
}

/// Lexical context a type reference is resolved in
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TypeScope {
    /// Enclosing namespaces, innermost first, always ending with the global namespace `""`
    pub namespaces: Vec<String>,
    /// Namespaces imported by `using` directives visible at the node
    pub usings: Vec<String>,
}

/// Immutable syntax tree for one source file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyntaxTree {
    nodes: Vec<SyntaxNode>,
    parents: Vec<Option<NodeId>>,
    root: NodeId,
}

impl SyntaxTree {
    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn get(&self, id: NodeId) -> Option<&SyntaxNode> {
        self.nodes.get(id.index())
    }

    /// Node by id
    ///
    /// Ids handed out by a tree are always valid for that tree; an id from a
    /// different tree is a programming error.
    pub fn node(&self, id: NodeId) -> &SyntaxNode {
        &self.nodes[id.index()]
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.parents.get(id.index()).copied().flatten()
    }

    pub fn children(&self, id: NodeId) -> Vec<NodeId> {
        self.get(id).map(SyntaxNode::children).unwrap_or_default()
    }

    /// Proper ancestors, nearest first
    pub fn ancestors(&self, id: NodeId) -> Ancestors<'_> {
        Ancestors {
            tree: self,
            next: self.parent(id),
        }
    }

    /// Proper descendants in preorder (document order)
    pub fn descendants(&self, id: NodeId) -> Descendants<'_> {
        let mut stack = self.children(id);
        stack.reverse();
        Descendants { tree: self, stack }
    }

    /// Every class declaration in the file, outer classes before nested ones
    pub fn classes(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.descendants(self.root)
            .filter(move |id| matches!(self.node(*id), SyntaxNode::Class { .. }))
    }

    /// Attributes declared at the top level of the file (`[assembly: ...]`)
    pub fn global_attributes(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.children(self.root)
            .into_iter()
            .filter(move |id| matches!(self.node(*id), SyntaxNode::Attribute { .. }))
    }

    /// Dotted name of the namespace enclosing `id`; empty for the global namespace
    pub fn containing_namespace(&self, id: NodeId) -> String {
        let mut segments: Vec<&str> = self
            .ancestors(id)
            .filter_map(|ancestor| match self.node(ancestor) {
                SyntaxNode::Namespace { name, .. } => Some(name.as_str()),
                _ => None,
            })
            .collect();
        segments.reverse();
        segments.join(".")
    }

    /// Key under which a class declaration is known to the type catalog
    pub fn declared_type_key(&self, class: NodeId) -> Option<TypeKey> {
        let SyntaxNode::Class {
            name,
            type_parameters,
            ..
        } = self.node(class)
        else {
            return None;
        };
        let mut path: Vec<&str> = self
            .ancestors(class)
            .filter_map(|ancestor| match self.node(ancestor) {
                SyntaxNode::Class { name, .. } => Some(name.as_str()),
                _ => None,
            })
            .collect();
        path.reverse();
        path.push(name);
        Some(TypeKey::new(
            self.containing_namespace(class),
            path.join("."),
            type_parameters.len(),
        ))
    }

    /// Namespaces and `using` imports visible at `id`
    pub fn type_scope(&self, id: NodeId) -> TypeScope {
        let mut scope = TypeScope::default();
        let containing = self.containing_namespace(id);
        let mut current = containing.as_str();
        loop {
            scope.namespaces.push(current.to_string());
            if current.is_empty() {
                break;
            }
            current = current.rsplit_once('.').map(|(outer, _)| outer).unwrap_or("");
        }
        for ancestor in std::iter::once(id).chain(self.ancestors(id)) {
            let members = match self.node(ancestor) {
                SyntaxNode::CompilationUnit { members } | SyntaxNode::Namespace { members, .. } => {
                    members
                }
                _ => continue,
            };
            for member in members {
                if let SyntaxNode::UsingDirective { namespace, .. } = self.node(*member) {
                    scope.usings.push(namespace.clone());
                }
            }
        }
        scope
    }

    /// Namespaces imported by top-level `global using` directives
    pub fn global_usings(&self) -> impl Iterator<Item = &str> + '_ {
        self.children(self.root)
            .into_iter()
            .filter_map(move |id| match self.node(id) {
                SyntaxNode::UsingDirective {
                    namespace,
                    global: true,
                } => Some(namespace.as_str()),
                _ => None,
            })
    }

    /// Replaces the resolution of every type reference in the tree
    ///
    /// `resolve` receives the lexical scope of the node holding the reference,
    /// extended with `global_usings` from the whole compilation, and the
    /// reference as written.
    pub fn resolve_type_refs<F>(&mut self, global_usings: &[String], mut resolve: F)
    where
        F: FnMut(&TypeScope, &str) -> Option<ResolvedType>,
    {
        for index in 0..self.nodes.len() {
            if !self.nodes[index].has_type_refs() {
                continue;
            }
            let mut scope = self.type_scope(NodeId::from_index(index));
            for namespace in global_usings {
                if !scope.usings.contains(namespace) {
                    scope.usings.push(namespace.clone());
                }
            }
            for type_ref in self.nodes[index].type_refs_mut() {
                type_ref.resolved = resolve(&scope, &type_ref.text);
            }
        }
    }
}

/// Iterator over the proper ancestors of a node
pub struct Ancestors<'a> {
    tree: &'a SyntaxTree,
    next: Option<NodeId>,
}

impl Iterator for Ancestors<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let current = self.next?;
        self.next = self.tree.parent(current);
        Some(current)
    }
}

/// Preorder iterator over the proper descendants of a node, driven by an explicit stack
pub struct Descendants<'a> {
    tree: &'a SyntaxTree,
    stack: Vec<NodeId>,
}

impl Iterator for Descendants<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let current = self.stack.pop()?;
        let mut children = self.tree.children(current);
        children.reverse();
        self.stack.extend(children);
        Some(current)
    }
}
