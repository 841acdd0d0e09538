//! Library interface for the entity-lengths CLI
//!
//! This module exposes the generation session for integration testing while
//! keeping argument parsing and the watch loop in main.rs.

#![deny(warnings)]
#![cfg_attr(not(test), deny(clippy::unwrap_used))]
#![cfg_attr(not(test), deny(clippy::expect_used))]

pub mod session;

pub use anyhow::Result;
pub use entity_lengths_core::config::Config;
pub use session::{FactsReport, GenerationSession, SessionSettings};
