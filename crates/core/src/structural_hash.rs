//! Position-independent fingerprints of syntax subtrees
//!
//! A subtree is serialized in preorder as kind tags, node payloads and child
//! counts, then hashed with xxh3-128. Arena indices never enter the encoding,
//! so the same class produces the same hash no matter where it sits in its
//! file or what was edited around it.

use crate::syntax::{
    AttributeArgument, AttributeValue, Literal, NodeId, ResolvedType, SyntaxNode, SyntaxTree,
    TypeRef,
};
use std::fmt;
use twox_hash::XxHash3_128;

/// 128-bit structural fingerprint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StructuralHash(u128);

impl StructuralHash {
    /// Fingerprint of the subtree rooted at `id`
    pub fn of_subtree(tree: &SyntaxTree, id: NodeId) -> Self {
        let mut hasher = StructuralHasher::new();
        hasher.write_subtree(tree, id);
        hasher.finish()
    }

    pub fn as_u128(self) -> u128 {
        self.0
    }
}

impl fmt::Display for StructuralHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:032x}", self.0)
    }
}

/// Hash of raw file content, used to skip re-parsing unchanged files
pub fn content_hash(content: &str) -> u128 {
    XxHash3_128::oneshot(content.as_bytes())
}

/// Incremental builder for a [`StructuralHash`]
///
/// Every write is length- or tag-prefixed so distinct inputs cannot collide by
/// concatenation.
#[derive(Debug, Default)]
pub struct StructuralHasher {
    buffer: Vec<u8>,
}

impl StructuralHasher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn finish(&self) -> StructuralHash {
        StructuralHash(XxHash3_128::oneshot(&self.buffer))
    }

    pub fn write_u8(&mut self, value: u8) -> &mut Self {
        self.buffer.push(value);
        self
    }

    pub fn write_u64(&mut self, value: u64) -> &mut Self {
        self.buffer.extend_from_slice(&value.to_le_bytes());
        self
    }

    pub fn write_str(&mut self, value: &str) -> &mut Self {
        self.write_u64(value.len() as u64);
        self.buffer.extend_from_slice(value.as_bytes());
        self
    }

    pub fn write_hash(&mut self, hash: StructuralHash) -> &mut Self {
        self.buffer.extend_from_slice(&hash.0.to_le_bytes());
        self
    }

    pub fn write_resolved_type(&mut self, ty: &ResolvedType) -> &mut Self {
        self.write_str(&ty.canonical_name())
    }

    /// Appends the preorder encoding of the subtree rooted at `id`
    pub fn write_subtree(&mut self, tree: &SyntaxTree, id: NodeId) -> &mut Self {
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            let node = tree.node(current);
            let children = node.children();
            self.write_str(node.kind());
            self.write_node_payload(node);
            self.write_u64(children.len() as u64);
            stack.extend(children.into_iter().rev());
        }
        self
    }

    fn write_node_payload(&mut self, node: &SyntaxNode) {
        match node {
            SyntaxNode::CompilationUnit { .. }
            | SyntaxNode::Block { .. }
            | SyntaxNode::ExpressionStatement { .. }
            | SyntaxNode::Invocation { .. }
            | SyntaxNode::Other { .. } => {}
            SyntaxNode::UsingDirective { namespace, global } => {
                self.write_str(namespace).write_u64(u64::from(*global));
            }
            SyntaxNode::Namespace { name, .. } | SyntaxNode::Method { name, .. } => {
                self.write_str(name);
            }
            SyntaxNode::Attribute { name, arguments } => {
                self.write_str(name);
                self.write_arguments(arguments);
            }
            SyntaxNode::Class {
                name,
                type_parameters,
                attributes,
                base_types,
                ..
            } => {
                self.write_str(name);
                self.write_u64(type_parameters.len() as u64);
                for parameter in type_parameters {
                    self.write_str(parameter);
                }
                // Attribute count separates attributes from members among the children.
                self.write_u64(attributes.len() as u64);
                self.write_type_refs(base_types);
            }
            SyntaxNode::Property {
                name,
                property_type,
                ..
            } => {
                self.write_str(name);
                self.write_type_refs(std::slice::from_ref(property_type));
            }
            SyntaxNode::MemberAccess {
                name,
                type_arguments,
                ..
            } => {
                self.write_str(name);
                self.write_type_refs(type_arguments);
            }
            SyntaxNode::Name {
                identifier,
                type_arguments,
            } => {
                self.write_str(identifier);
                self.write_type_refs(type_arguments);
            }
            SyntaxNode::Lambda { parameters, .. } => {
                self.write_u64(parameters.len() as u64);
                for parameter in parameters {
                    self.write_str(parameter);
                }
            }
            SyntaxNode::Literal(literal) => self.write_literal(literal),
        }
    }

    fn write_type_refs(&mut self, type_refs: &[TypeRef]) {
        self.write_u64(type_refs.len() as u64);
        for type_ref in type_refs {
            self.write_str(&type_ref.text);
            match &type_ref.resolved {
                Some(resolved) => {
                    self.write_u8(1);
                    self.write_resolved_type(resolved);
                }
                None => {
                    self.write_u8(0);
                }
            }
        }
    }

    fn write_arguments(&mut self, arguments: &[AttributeArgument]) {
        self.write_u64(arguments.len() as u64);
        for argument in arguments {
            match &argument.name {
                Some(name) => {
                    self.write_u8(1);
                    self.write_str(name);
                }
                None => {
                    self.write_u8(0);
                }
            }
            self.write_attribute_value(&argument.value);
        }
    }

    fn write_attribute_value(&mut self, value: &AttributeValue) {
        match value {
            AttributeValue::Literal(literal) => {
                self.write_u8(0);
                self.write_literal(literal);
            }
            AttributeValue::Array(items) => {
                self.write_u8(1);
                self.write_u64(items.len() as u64);
                for item in items {
                    self.write_attribute_value(item);
                }
            }
            AttributeValue::Expression(text) => {
                self.write_u8(2);
                self.write_str(text);
            }
        }
    }

    fn write_literal(&mut self, literal: &Literal) {
        match literal {
            Literal::Integer(value) => {
                self.write_u8(0);
                self.write_u64(*value as u64);
            }
            Literal::String(value) => {
                self.write_u8(1);
                self.write_str(value);
            }
            Literal::Boolean(value) => {
                self.write_u8(2);
                self.write_u8(u8::from(*value));
            }
            Literal::Null => {
                self.write_u8(3);
            }
            Literal::Other(text) => {
                self.write_u8(4);
                self.write_str(text);
            }
        }
    }
}
