//! Lowering of tree-sitter C# syntax into the arena syntax model
//!
//! Only the constructs the extractors look at get dedicated nodes. Every
//! other construct becomes [`SyntaxNode::Other`] with its lowered children, so
//! invocations nested in `if` blocks or initializers stay reachable.

use super::literals::{decode_literal, parse_integer};
use crate::common::{all_children, child_of_kind, children_of_kind, named_children};
use entity_lengths_core::error::Result;
use entity_lengths_core::syntax::{
    AttributeArgument, AttributeValue, Literal, NodeId, SyntaxNode, SyntaxTree, SyntaxTreeBuilder,
    TypeRef,
};
use tree_sitter::Node;

const CLASS_KINDS: [&str; 2] = ["class_declaration", "record_declaration"];

pub(crate) struct Lowerer<'s> {
    source: &'s str,
    builder: SyntaxTreeBuilder,
}

impl<'s> Lowerer<'s> {
    pub(crate) fn new(source: &'s str) -> Self {
        Self {
            source,
            builder: SyntaxTreeBuilder::new(),
        }
    }

    pub(crate) fn lower(mut self, root: Node<'_>) -> Result<SyntaxTree> {
        let root = self.compilation_unit(root);
        self.builder.finish(root)
    }

    fn text(&self, node: Node<'_>) -> &'s str {
        node.utf8_text(self.source.as_bytes()).unwrap_or_default()
    }

    fn field_text(&self, node: Node<'_>, field: &str) -> Option<&'s str> {
        node.child_by_field_name(field).map(|child| self.text(child))
    }

    fn compilation_unit(&mut self, node: Node<'_>) -> NodeId {
        let mut members = Vec::new();
        let mut file_scoped: Option<(String, Vec<NodeId>)> = None;
        for child in named_children(node) {
            if child.kind() == "file_scoped_namespace_declaration" {
                let name = self.namespace_name(child);
                let inner = self.declaration_list(child);
                file_scoped = Some((name, inner));
                continue;
            }
            if matches!(child.kind(), "global_attribute" | "global_attribute_list") {
                members.extend(self.attributes_of_list(child));
                continue;
            }
            let lowered = self.declaration(child);
            match file_scoped.as_mut() {
                Some((_, inner)) => inner.extend(lowered),
                None => members.extend(lowered),
            }
        }
        if let Some((name, inner)) = file_scoped {
            members.push(self.builder.namespace(name, inner));
        }
        self.builder.compilation_unit(members)
    }

    fn namespace_name(&self, node: Node<'_>) -> String {
        let name = self
            .field_text(node, "name")
            .or_else(|| {
                named_children(node)
                    .into_iter()
                    .find(|child| matches!(child.kind(), "identifier" | "qualified_name"))
                    .map(|child| self.text(child))
            })
            .unwrap_or_default();
        strip_whitespace(name)
    }

    /// Lowers the declarations directly inside `node` or inside its `declaration_list`
    fn declaration_list(&mut self, node: Node<'_>) -> Vec<NodeId> {
        let mut members = Vec::new();
        for child in named_children(node) {
            if child.kind() == "declaration_list" {
                members.extend(self.declaration_list(child));
            } else {
                members.extend(self.declaration(child));
            }
        }
        members
    }

    /// Lowers a namespace-level declaration; unsupported declarations yield nothing
    fn declaration(&mut self, node: Node<'_>) -> Vec<NodeId> {
        match node.kind() {
            "using_directive" => self.using_directive(node).into_iter().collect(),
            "namespace_declaration" => {
                let name = self.namespace_name(node);
                let members = match node.child_by_field_name("body") {
                    Some(body) => self.declaration_list(body),
                    None => child_of_kind(node, "declaration_list")
                        .map(|body| self.declaration_list(body))
                        .unwrap_or_default(),
                };
                vec![self.builder.namespace(name, members)]
            }
            kind if CLASS_KINDS.contains(&kind) => vec![self.class(node)],
            "attribute_list" if self.is_assembly_target(node) => self.attributes_of_list(node),
            kind if kind.starts_with("preproc_") => self.declaration_list(node),
            _ => Vec::new(),
        }
    }

    fn using_directive(&mut self, node: Node<'_>) -> Option<NodeId> {
        let children = all_children(node);
        if children
            .iter()
            .any(|child| matches!(child.kind(), "=" | "static"))
        {
            return None;
        }
        let name = children
            .iter()
            .rev()
            .find(|child| {
                matches!(
                    child.kind(),
                    "identifier" | "qualified_name" | "alias_qualified_name"
                )
            })
            .map(|child| strip_whitespace(self.text(*child)))?;
        let name = name.strip_prefix("global::").unwrap_or(&name).to_string();
        if children.iter().any(|child| child.kind() == "global") {
            Some(self.builder.global_using(name))
        } else {
            Some(self.builder.using(name))
        }
    }

    fn is_assembly_target(&self, node: Node<'_>) -> bool {
        child_of_kind(node, "attribute_target_specifier")
            .map(|target| self.text(target).trim_end_matches(':').trim() == "assembly")
            .unwrap_or(false)
    }

    fn attributes_of_list(&mut self, node: Node<'_>) -> Vec<NodeId> {
        children_of_kind(node, "attribute")
            .into_iter()
            .map(|attribute| self.attribute(attribute))
            .collect()
    }

    fn attributes_of_declaration(&mut self, node: Node<'_>) -> Vec<NodeId> {
        let mut attributes = Vec::new();
        for list in children_of_kind(node, "attribute_list") {
            attributes.extend(self.attributes_of_list(list));
        }
        attributes
    }

    fn attribute(&mut self, node: Node<'_>) -> NodeId {
        let name = node
            .child_by_field_name("name")
            .or_else(|| named_children(node).into_iter().next())
            .map(|name| strip_whitespace(self.text(name)))
            .unwrap_or_default();
        let name = name.strip_prefix("global::").unwrap_or(&name).to_string();
        let arguments = child_of_kind(node, "attribute_argument_list")
            .map(|list| {
                children_of_kind(list, "attribute_argument")
                    .into_iter()
                    .map(|argument| self.attribute_argument(argument))
                    .collect()
            })
            .unwrap_or_default();
        self.builder.attribute(name, arguments)
    }

    /// `Name = value` is a property assignment; `name: value` stays a
    /// constructor argument
    fn attribute_argument(&self, node: Node<'_>) -> AttributeArgument {
        if let Some((name, value)) = self.property_assignment(node) {
            return AttributeArgument::named(name, self.attribute_value(value));
        }
        let value = named_children(node)
            .into_iter()
            .last()
            .map(|value| self.attribute_value(value))
            .unwrap_or(AttributeValue::Expression(String::new()));
        AttributeArgument::positional(value)
    }

    /// Name and value of a `Name = value` attribute argument
    ///
    /// Depending on the grammar release the assignment is either flat under
    /// the argument (`name_equals` or a bare `=` token) or an
    /// `assignment_expression` child.
    fn property_assignment<'t>(&self, node: Node<'t>) -> Option<(String, Node<'t>)> {
        let named = named_children(node);
        if let [assignment] = named.as_slice() {
            if assignment.kind() == "assignment_expression" {
                let left = assignment.child_by_field_name("left")?;
                let right = assignment.child_by_field_name("right")?;
                let operator = self
                    .source
                    .get(left.end_byte()..right.start_byte())
                    .map(str::trim);
                if left.kind() == "identifier" && operator == Some("=") {
                    return Some((self.text(left).trim().to_string(), right));
                }
                return None;
            }
        }
        if let Some(name_equals) = child_of_kind(node, "name_equals") {
            let name = named_children(name_equals).into_iter().next()?;
            let value = named.into_iter().last()?;
            return Some((self.text(name).trim().to_string(), value));
        }
        let children = all_children(node);
        let position = children.iter().position(|child| child.kind() == "=")?;
        let name = children[..position]
            .iter()
            .rev()
            .find(|child| child.is_named())?;
        let value = children[position + 1..]
            .iter()
            .find(|child| child.is_named())?;
        Some((self.text(*name).trim().to_string(), *value))
    }

    fn attribute_value(&self, node: Node<'_>) -> AttributeValue {
        if let Some(literal) = self.literal(node) {
            return AttributeValue::Literal(literal);
        }
        match node.kind() {
            "parenthesized_expression" => named_children(node)
                .into_iter()
                .next()
                .map(|inner| self.attribute_value(inner))
                .unwrap_or_else(|| AttributeValue::Expression(self.text(node).to_string())),
            "array_creation_expression" | "implicit_array_creation_expression" => {
                let items = child_of_kind(node, "initializer_expression")
                    .map(|initializer| self.attribute_values(initializer))
                    .unwrap_or_default();
                AttributeValue::Array(items)
            }
            "collection_expression" | "initializer_expression" => {
                AttributeValue::Array(self.attribute_values(node))
            }
            _ => AttributeValue::Expression(self.text(node).to_string()),
        }
    }

    fn attribute_values(&self, node: Node<'_>) -> Vec<AttributeValue> {
        named_children(node)
            .into_iter()
            .map(|item| self.attribute_value(item))
            .collect()
    }

    /// Literal value of `node`, folding a unary minus on an integer literal
    fn literal(&self, node: Node<'_>) -> Option<Literal> {
        if node.kind() == "prefix_unary_expression" {
            let text = strip_whitespace(self.text(node));
            let digits = text.strip_prefix('-')?;
            let operand = named_children(node).into_iter().next()?;
            if operand.kind() != "integer_literal" {
                return None;
            }
            return parse_integer(digits)
                .and_then(|value| value.checked_neg())
                .map(Literal::Integer);
        }
        decode_literal(node.kind(), self.text(node))
    }

    fn class(&mut self, node: Node<'_>) -> NodeId {
        let name = self.field_text(node, "name").unwrap_or_default().to_string();
        let type_parameters = child_of_kind(node, "type_parameter_list")
            .map(|list| {
                children_of_kind(list, "type_parameter")
                    .into_iter()
                    .map(|parameter| {
                        self.field_text(parameter, "name")
                            .unwrap_or_else(|| self.text(parameter))
                            .trim()
                            .to_string()
                    })
                    .collect()
            })
            .unwrap_or_default();
        let attributes = self.attributes_of_declaration(node);
        let base_types = child_of_kind(node, "base_list")
            .map(|list| self.base_types(list))
            .unwrap_or_default();
        let members = node
            .child_by_field_name("body")
            .or_else(|| child_of_kind(node, "declaration_list"))
            .map(|body| self.members(body))
            .unwrap_or_default();
        self.builder.push(SyntaxNode::Class {
            name,
            type_parameters,
            attributes,
            base_types,
            members,
        })
    }

    fn base_types(&self, list: Node<'_>) -> Vec<TypeRef> {
        named_children(list)
            .into_iter()
            .filter_map(|base| {
                let ty = if base.kind() == "primary_constructor_base_type" {
                    base.child_by_field_name("type")
                        .or_else(|| named_children(base).into_iter().next())?
                } else {
                    base
                };
                Some(TypeRef::new(strip_whitespace(self.text(ty))))
            })
            .collect()
    }

    fn members(&mut self, body: Node<'_>) -> Vec<NodeId> {
        let mut members = Vec::new();
        for member in named_children(body) {
            match member.kind() {
                "property_declaration" => members.push(self.property(member)),
                "method_declaration" => members.push(self.method(member)),
                kind if CLASS_KINDS.contains(&kind) => members.push(self.class(member)),
                kind if kind.starts_with("preproc_") => members.extend(self.members(member)),
                _ => {}
            }
        }
        members
    }

    fn property(&mut self, node: Node<'_>) -> NodeId {
        let name = self.field_text(node, "name").unwrap_or_default().to_string();
        let property_type = TypeRef::new(strip_whitespace(
            self.field_text(node, "type").unwrap_or_default(),
        ));
        let attributes = self.attributes_of_declaration(node);
        self.builder.property(name, property_type, attributes)
    }

    fn method(&mut self, node: Node<'_>) -> NodeId {
        let name = self.field_text(node, "name").unwrap_or_default().to_string();
        let body = node.child_by_field_name("body").or_else(|| {
            named_children(node)
                .into_iter()
                .find(|child| matches!(child.kind(), "block" | "arrow_expression_clause"))
        });
        let body = match body {
            Some(body) if body.kind() == "arrow_expression_clause" => Some(self.arrow_body(body)),
            Some(body) => Some(self.expression(body)),
            None => None,
        };
        self.builder.method(name, body)
    }

    /// `=> expr;` becomes a block holding one expression statement
    fn arrow_body(&mut self, node: Node<'_>) -> NodeId {
        let mut statements = Vec::new();
        if let Some(expression) = named_children(node).into_iter().next() {
            let expression = self.expression(expression);
            statements.push(self.builder.expression_statement(expression));
        }
        self.builder.block(statements)
    }

    /// Lowers a statement or expression
    fn expression(&mut self, node: Node<'_>) -> NodeId {
        if let Some(literal) = self.literal(node) {
            return self.builder.literal(literal);
        }
        match node.kind() {
            "block" => {
                let statements = named_children(node)
                    .into_iter()
                    .map(|statement| self.expression(statement))
                    .collect();
                self.builder.block(statements)
            }
            "expression_statement" => match named_children(node).into_iter().next() {
                Some(expression) => {
                    let expression = self.expression(expression);
                    self.builder.expression_statement(expression)
                }
                None => self.other(node),
            },
            "invocation_expression" => self.invocation(node),
            "member_access_expression" => self.member_access(node),
            "identifier" => {
                let identifier = self.text(node);
                self.builder.name(identifier)
            }
            "generic_name" => {
                let (identifier, type_arguments) = self.generic_name(node);
                self.builder.push(SyntaxNode::Name {
                    identifier,
                    type_arguments,
                })
            }
            "lambda_expression" => self.lambda(node),
            "parenthesized_expression" | "argument" => match named_children(node).into_iter().last()
            {
                Some(inner) => self.expression(inner),
                None => self.other(node),
            },
            _ => self.other(node),
        }
    }

    fn other(&mut self, node: Node<'_>) -> NodeId {
        let children = named_children(node)
            .into_iter()
            .map(|child| self.expression(child))
            .collect();
        self.builder.push(SyntaxNode::Other {
            kind: node.kind().to_string(),
            children,
        })
    }

    fn invocation(&mut self, node: Node<'_>) -> NodeId {
        let Some(function) = node.child_by_field_name("function") else {
            return self.other(node);
        };
        let callee = self.expression(function);
        let arguments = node
            .child_by_field_name("arguments")
            .or_else(|| child_of_kind(node, "argument_list"))
            .map(|list| {
                children_of_kind(list, "argument")
                    .into_iter()
                    .map(|argument| self.expression(argument))
                    .collect()
            })
            .unwrap_or_default();
        self.builder.invocation(callee, arguments)
    }

    fn member_access(&mut self, node: Node<'_>) -> NodeId {
        let (Some(receiver), Some(name)) = (
            node.child_by_field_name("expression"),
            node.child_by_field_name("name"),
        ) else {
            return self.other(node);
        };
        let receiver = self.expression(receiver);
        let (name, type_arguments) = if name.kind() == "generic_name" {
            self.generic_name(name)
        } else {
            (self.text(name).to_string(), Vec::new())
        };
        self.builder
            .generic_member_access(receiver, name, type_arguments)
    }

    fn generic_name(&self, node: Node<'_>) -> (String, Vec<TypeRef>) {
        let identifier = child_of_kind(node, "identifier")
            .map(|identifier| self.text(identifier).to_string())
            .unwrap_or_default();
        let type_arguments = child_of_kind(node, "type_argument_list")
            .map(|list| {
                named_children(list)
                    .into_iter()
                    .map(|argument| TypeRef::new(strip_whitespace(self.text(argument))))
                    .collect()
            })
            .unwrap_or_default();
        (identifier, type_arguments)
    }

    fn lambda(&mut self, node: Node<'_>) -> NodeId {
        let parameters_node = node.child_by_field_name("parameters").or_else(|| {
            named_children(node).into_iter().find(|child| {
                matches!(
                    child.kind(),
                    "parameter_list" | "implicit_parameter" | "identifier"
                )
            })
        });
        let parameters = match parameters_node {
            Some(list) if list.kind() == "parameter_list" => children_of_kind(list, "parameter")
                .into_iter()
                .map(|parameter| {
                    self.field_text(parameter, "name")
                        .unwrap_or_else(|| self.text(parameter))
                        .trim()
                        .to_string()
                })
                .collect(),
            Some(single) => vec![self.text(single).trim().to_string()],
            None => Vec::new(),
        };
        let Some(body) = node
            .child_by_field_name("body")
            .or_else(|| named_children(node).into_iter().last())
        else {
            return self.other(node);
        };
        let body = self.expression(body);
        self.builder.lambda(parameters, body)
    }
}

fn strip_whitespace(text: &str) -> String {
    text.chars().filter(|c| !c.is_whitespace()).collect()
}
