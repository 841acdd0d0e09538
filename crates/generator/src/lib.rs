//! Max-length fact extraction and constants generation
//!
//! Given a linked [`Compilation`](entity_lengths_core::Compilation), this
//! crate recovers `(entity, property, max length)` facts from four C#
//! configuration idioms and renders them as one generated constants unit:
//!
//! - `[MaxLength(n)]` / `[StringLength(n)]` on string properties
//! - `[Column(TypeName = "varchar(n)")]` on string properties
//! - `IEntityTypeConfiguration<T>.Configure` fluent chains
//! - `DbContext.OnModelCreating` entity configuration
//!
//! [`IncrementalGenerator`] caches per-class results across runs.

#![deny(warnings)]
#![cfg_attr(not(test), deny(clippy::unwrap_used))]
#![cfg_attr(not(test), deny(clippy::expect_used))]

pub mod extractors;
pub mod options_provider;
pub mod pipeline;
pub mod renderer;
pub mod scan_filter;
pub mod scoped_node;

pub use extractors::column_type::parse_column_type;
pub use options_provider::{resolve_options, OPTIONS_ATTRIBUTE};
pub use pipeline::{GenerationOutcome, GenerationStats, IncrementalGenerator};
pub use renderer::{render, GeneratedSource};
pub use scan_filter::ScanFilter;
pub use scoped_node::{AttributeView, PropertyView, ScopedNode};
