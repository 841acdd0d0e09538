//! Core types for the entity-lengths generator
//!
//! This crate provides the foundational abstractions shared by the C# front
//! end, the generator and the command-line tool:
//!
//! - **Syntax model**: an arena-indexed tree of classes, members, attributes
//!   and call chains, with resolved type references
//! - **Compilation**: ordered source files plus the type catalog linking them
//! - **Facts**: property length facts grouped per entity
//! - **Structural hashing**: position-independent subtree fingerprints
//! - **Configuration**: generator options and project settings
//! - **Error handling**: unified error types
//!

#![deny(warnings)]
#![cfg_attr(not(test), deny(clippy::unwrap_used))]
#![cfg_attr(not(test), deny(clippy::expect_used))]

pub mod compilation;
pub mod config;
pub mod entities;
pub mod error;
pub mod structural_hash;
pub mod syntax;

// Re-export main types for convenience
pub use compilation::{Compilation, SourceFile, TypeCatalog};
pub use config::{Config, GeneratorOptions, ProjectConfig, ScanOptions, WatcherConfig};
pub use entities::{EntityFacts, PropertyLengthFact, Strategy, Stream};
pub use error::{Error, Result, ResultExt};
pub use structural_hash::{content_hash, StructuralHash, StructuralHasher};
pub use syntax::{
    AttributeArgument, AttributeValue, Literal, NodeId, ResolvedType, SyntaxNode, SyntaxTree,
    SyntaxTreeBuilder, TypeKey, TypeRef, TypeScope,
};

/// Version of the core library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::compilation::Compilation;
    pub use crate::config::GeneratorOptions;
    pub use crate::entities::{EntityFacts, PropertyLengthFact};
    pub use crate::error::{Result, ResultExt};
    pub use crate::syntax::{NodeId, SyntaxNode, SyntaxTree};
}
