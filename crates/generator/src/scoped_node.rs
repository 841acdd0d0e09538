//! The read-only view of one class that extractors work on
//!
//! A [`ScopedNode`] is everything an extractor may consult: the class subtree,
//! its containing namespace and its resolved base-type chain. Extraction is a
//! pure function of these, which is what makes the pipeline's cache sound.

use entity_lengths_core::compilation::Compilation;
use entity_lengths_core::entities::Stream;
use entity_lengths_core::structural_hash::{StructuralHash, StructuralHasher};
use entity_lengths_core::syntax::{
    AttributeArgument, AttributeValue, NodeId, ResolvedType, SyntaxNode, SyntaxTree, TypeRef,
};

/// A class declaration together with its lexical and inheritance context
#[derive(Debug, Clone)]
pub struct ScopedNode<'a> {
    tree: &'a SyntaxTree,
    class: NodeId,
    name: &'a str,
    namespace: String,
    base_chain: Vec<ResolvedType>,
}

impl<'a> ScopedNode<'a> {
    /// Scopes the class `class` of `tree`; `None` when the node is not a class
    pub fn new(compilation: &Compilation, tree: &'a SyntaxTree, class: NodeId) -> Option<Self> {
        let SyntaxNode::Class { name, .. } = tree.node(class) else {
            return None;
        };
        let catalog = compilation.catalog();
        let base_chain = tree
            .declared_type_key(class)
            .map(|key| catalog.base_chain(catalog.direct_bases(&key)))
            .unwrap_or_default();
        Some(Self {
            tree,
            class,
            name,
            namespace: tree.containing_namespace(class),
            base_chain,
        })
    }

    pub fn tree(&self) -> &'a SyntaxTree {
        self.tree
    }

    pub fn id(&self) -> NodeId {
        self.class
    }

    /// Simple name of the class
    pub fn name(&self) -> &'a str {
        self.name
    }

    /// Dotted containing namespace; empty for the global namespace
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Transitive base types, nearest first
    pub fn base_chain(&self) -> &[ResolvedType] {
        &self.base_chain
    }

    /// First base type in the chain that is `namespace.name`
    pub fn find_base(&self, namespace: &str, name: &str) -> Option<&ResolvedType> {
        self.base_chain.iter().find(|ty| ty.is(namespace, name))
    }

    fn members(&self) -> &'a [NodeId] {
        match self.tree.node(self.class) {
            SyntaxNode::Class { members, .. } => members,
            _ => &[],
        }
    }

    /// Properties declared directly in the class, in source order
    pub fn properties(&self) -> impl Iterator<Item = PropertyView<'a>> + '_ {
        let tree = self.tree;
        self.members()
            .iter()
            .filter_map(move |member| match tree.node(*member) {
                SyntaxNode::Property {
                    name,
                    property_type,
                    attributes,
                } => Some(PropertyView {
                    tree,
                    name,
                    property_type,
                    attribute_ids: attributes,
                }),
                _ => None,
            })
    }

    /// Bodies of the methods named `name` declared directly in the class
    pub fn method_bodies(&self, name: &str) -> Vec<NodeId> {
        self.members()
            .iter()
            .filter_map(|member| match self.tree.node(*member) {
                SyntaxNode::Method {
                    name: method,
                    body: Some(body),
                } if method == name => Some(*body),
                _ => None,
            })
            .collect()
    }

    /// Invocations inside `root`, in document order
    pub fn invocations_in(&self, root: NodeId) -> impl Iterator<Item = NodeId> + 'a {
        let tree = self.tree;
        tree.descendants(root)
            .filter(move |id| matches!(tree.node(*id), SyntaxNode::Invocation { .. }))
    }

    /// Cache key of this class in `stream`
    ///
    /// Covers everything an extractor can observe: the stream, the containing
    /// namespace, the class subtree and the resolved base chain.
    pub fn structural_key(&self, stream: Stream) -> StructuralHash {
        let mut hasher = StructuralHasher::new();
        hasher
            .write_str(stream.as_ref())
            .write_str(&self.namespace)
            .write_subtree(self.tree, self.class)
            .write_u64(self.base_chain.len() as u64);
        for base in &self.base_chain {
            hasher.write_resolved_type(base);
        }
        hasher.finish()
    }
}

/// A property declaration
#[derive(Debug, Clone, Copy)]
pub struct PropertyView<'a> {
    tree: &'a SyntaxTree,
    pub name: &'a str,
    pub property_type: &'a TypeRef,
    attribute_ids: &'a [NodeId],
}

impl<'a> PropertyView<'a> {
    pub fn is_string(&self) -> bool {
        self.property_type.is_string()
    }

    /// Attributes in declaration order
    pub fn attributes(&self) -> impl Iterator<Item = AttributeView<'a>> + 'a {
        let tree = self.tree;
        self.attribute_ids
            .iter()
            .filter_map(move |id| match tree.node(*id) {
                SyntaxNode::Attribute { name, arguments } => Some(AttributeView { name, arguments }),
                _ => None,
            })
    }

    /// Attributes whose normalized name is `short_name`
    pub fn attributes_named(
        &self,
        short_name: &'a str,
    ) -> impl Iterator<Item = AttributeView<'a>> + 'a {
        self.attributes()
            .filter(move |attribute| attribute.short_name() == short_name)
    }
}

/// An attribute application with its arguments
#[derive(Debug, Clone, Copy)]
pub struct AttributeView<'a> {
    pub name: &'a str,
    pub arguments: &'a [AttributeArgument],
}

impl<'a> AttributeView<'a> {
    /// Name without namespace qualifier or `Attribute` suffix
    pub fn short_name(&self) -> &'a str {
        let last = self.name.rsplit('.').next().unwrap_or(self.name);
        last.strip_suffix("Attribute")
            .filter(|stem| !stem.is_empty())
            .unwrap_or(last)
    }

    /// First positional (constructor) argument
    pub fn first_positional(&self) -> Option<&'a AttributeValue> {
        self.arguments
            .iter()
            .find(|argument| argument.name.is_none())
            .map(|argument| &argument.value)
    }

    /// Value of the named argument `name`
    pub fn named(&self, name: &str) -> Option<&'a AttributeValue> {
        self.arguments
            .iter()
            .find(|argument| argument.name.as_deref() == Some(name))
            .map(|argument| &argument.value)
    }
}
