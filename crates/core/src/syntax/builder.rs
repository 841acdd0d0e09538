//! Bottom-up construction of [`SyntaxTree`]s
//!
//! Children are pushed before their parent. Pushing a node records it as the
//! parent of every child it names, so the finished tree has complete parent
//! links without a second pass.

use super::{AttributeArgument, Literal, NodeId, SyntaxNode, SyntaxTree, TypeRef};
use crate::error::{Error, Result};

#[derive(Debug, Default)]
pub struct SyntaxTreeBuilder {
    nodes: Vec<SyntaxNode>,
    parents: Vec<Option<NodeId>>,
    problem: Option<String>,
}

impl SyntaxTreeBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Appends a node whose children have already been pushed
    pub fn push(&mut self, node: SyntaxNode) -> NodeId {
        let id = NodeId::from_index(self.nodes.len());
        for child in node.children() {
            let problem = match self.parents.get_mut(child.index()) {
                Some(slot) if slot.is_none() => {
                    *slot = Some(id);
                    None
                }
                Some(_) => Some(format!("node {} has two parents", child.index())),
                None => Some(format!(
                    "node {} references unknown child {}",
                    id.index(),
                    child.index()
                )),
            };
            if let Some(problem) = problem {
                self.record(problem);
            }
        }
        self.nodes.push(node);
        self.parents.push(None);
        id
    }

    /// Validates the arena and seals it into a tree rooted at `root`
    pub fn finish(self, root: NodeId) -> Result<SyntaxTree> {
        if let Some(problem) = self.problem {
            return Err(Error::extraction(format!("malformed syntax tree: {problem}")));
        }
        if root.index() >= self.nodes.len() {
            return Err(Error::extraction(format!(
                "root {} is outside of a tree with {} nodes",
                root.index(),
                self.nodes.len()
            )));
        }
        if self.parents[root.index()].is_some() {
            return Err(Error::extraction("root node has a parent"));
        }
        Ok(SyntaxTree {
            nodes: self.nodes,
            parents: self.parents,
            root,
        })
    }

    fn record(&mut self, problem: String) {
        self.problem.get_or_insert(problem);
    }

    pub fn name(&mut self, identifier: impl Into<String>) -> NodeId {
        self.push(SyntaxNode::Name {
            identifier: identifier.into(),
            type_arguments: Vec::new(),
        })
    }

    pub fn member_access(&mut self, receiver: NodeId, name: impl Into<String>) -> NodeId {
        self.push(SyntaxNode::MemberAccess {
            receiver,
            name: name.into(),
            type_arguments: Vec::new(),
        })
    }

    pub fn generic_member_access(
        &mut self,
        receiver: NodeId,
        name: impl Into<String>,
        type_arguments: Vec<TypeRef>,
    ) -> NodeId {
        self.push(SyntaxNode::MemberAccess {
            receiver,
            name: name.into(),
            type_arguments,
        })
    }

    pub fn invocation(&mut self, callee: NodeId, arguments: Vec<NodeId>) -> NodeId {
        self.push(SyntaxNode::Invocation { callee, arguments })
    }

    /// `receiver.method(arguments)`
    pub fn call(
        &mut self,
        receiver: NodeId,
        method: impl Into<String>,
        arguments: Vec<NodeId>,
    ) -> NodeId {
        let callee = self.member_access(receiver, method);
        self.invocation(callee, arguments)
    }

    pub fn literal(&mut self, literal: Literal) -> NodeId {
        self.push(SyntaxNode::Literal(literal))
    }

    pub fn integer(&mut self, value: i64) -> NodeId {
        self.literal(Literal::Integer(value))
    }

    pub fn lambda(&mut self, parameters: Vec<String>, body: NodeId) -> NodeId {
        self.push(SyntaxNode::Lambda { parameters, body })
    }

    /// `parameter => parameter.member`
    pub fn selector(&mut self, parameter: &str, member: &str) -> NodeId {
        let receiver = self.name(parameter);
        let body = self.member_access(receiver, member);
        self.lambda(vec![parameter.to_string()], body)
    }

    pub fn expression_statement(&mut self, expression: NodeId) -> NodeId {
        self.push(SyntaxNode::ExpressionStatement { expression })
    }

    pub fn block(&mut self, statements: Vec<NodeId>) -> NodeId {
        self.push(SyntaxNode::Block { statements })
    }

    pub fn method(&mut self, name: impl Into<String>, body: Option<NodeId>) -> NodeId {
        self.push(SyntaxNode::Method {
            name: name.into(),
            body,
        })
    }

    pub fn attribute(
        &mut self,
        name: impl Into<String>,
        arguments: Vec<AttributeArgument>,
    ) -> NodeId {
        self.push(SyntaxNode::Attribute {
            name: name.into(),
            arguments,
        })
    }

    pub fn property(
        &mut self,
        name: impl Into<String>,
        property_type: TypeRef,
        attributes: Vec<NodeId>,
    ) -> NodeId {
        self.push(SyntaxNode::Property {
            name: name.into(),
            property_type,
            attributes,
        })
    }

    pub fn class(
        &mut self,
        name: impl Into<String>,
        base_types: Vec<TypeRef>,
        members: Vec<NodeId>,
    ) -> NodeId {
        self.push(SyntaxNode::Class {
            name: name.into(),
            type_parameters: Vec::new(),
            attributes: Vec::new(),
            base_types,
            members,
        })
    }

    pub fn using(&mut self, namespace: impl Into<String>) -> NodeId {
        self.push(SyntaxNode::UsingDirective {
            namespace: namespace.into(),
            global: false,
        })
    }

    pub fn global_using(&mut self, namespace: impl Into<String>) -> NodeId {
        self.push(SyntaxNode::UsingDirective {
            namespace: namespace.into(),
            global: true,
        })
    }

    pub fn namespace(&mut self, name: impl Into<String>, members: Vec<NodeId>) -> NodeId {
        self.push(SyntaxNode::Namespace {
            name: name.into(),
            members,
        })
    }

    pub fn compilation_unit(&mut self, members: Vec<NodeId>) -> NodeId {
        self.push(SyntaxNode::CompilationUnit { members })
    }
}
