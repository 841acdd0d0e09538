use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumIter, EnumString};

/// A single `(property, maximum length)` pair recovered from one configuration idiom
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PropertyLengthFact {
    pub property_name: String,
    pub max_length: u32,
}

impl PropertyLengthFact {
    pub fn new(property_name: impl Into<String>, max_length: u32) -> Self {
        Self {
            property_name: property_name.into(),
            max_length,
        }
    }
}

/// Facts produced by one matched source node
///
/// Several groups may name the same entity; they are never merged and each
/// one is rendered as its own block.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EntityFacts {
    pub entity_name: String,
    pub facts: Vec<PropertyLengthFact>,
}

impl EntityFacts {
    pub fn new(entity_name: impl Into<String>, facts: Vec<PropertyLengthFact>) -> Self {
        Self {
            entity_name: entity_name.into(),
            facts,
        }
    }

    /// Wraps facts into a group, or `None` when nothing was found
    pub fn non_empty(
        entity_name: impl Into<String>,
        facts: Vec<PropertyLengthFact>,
    ) -> Option<Self> {
        if facts.is_empty() {
            None
        } else {
            Some(Self::new(entity_name, facts))
        }
    }

    pub fn len(&self) -> usize {
        self.facts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.facts.is_empty()
    }
}

/// Configuration idiom a fact was recovered from
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
    AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Strategy {
    /// `[MaxLength(n)]` or `[StringLength(n)]` on a string property
    Attribute,
    /// `[Column(TypeName = "varchar(n)")]` on a string property
    ColumnType,
    /// `Property(x => x.Member).HasMaxLength(n)` inside `IEntityTypeConfiguration<T>.Configure`
    Fluent,
    /// `Entity<T>(...)` calls inside a `DbContext.OnModelCreating` override
    ContextBuilder,
}

/// Candidate stream a class node is evaluated in
///
/// Streams are concatenated in declaration order when rendering.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
    AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Stream {
    AnnotatedEntities,
    Configurations,
    Contexts,
}

impl Stream {
    /// All streams in rendering order
    pub const ALL: [Stream; 3] = [
        Stream::AnnotatedEntities,
        Stream::Configurations,
        Stream::Contexts,
    ];

    /// Strategies consulted by this stream, in priority order
    pub fn strategies(self) -> &'static [Strategy] {
        match self {
            Stream::AnnotatedEntities => &[Strategy::Attribute, Strategy::ColumnType],
            Stream::Configurations => &[Strategy::Fluent],
            Stream::Contexts => &[Strategy::ContextBuilder],
        }
    }

    pub fn index(self) -> usize {
        match self {
            Stream::AnnotatedEntities => 0,
            Stream::Configurations => 1,
            Stream::Contexts => 2,
        }
    }
}
