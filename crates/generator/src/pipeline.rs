//! Incremental generation over a [`Compilation`]
//!
//! Each stream keeps its own cache from a class's structural key to the
//! extraction result. Keys cover everything an extractor can observe, so a
//! hit is reused without running the scan filter or the extractor. Entries
//! whose keys do not reappear in a run are dropped, and a change of the
//! resolved options clears every cache.

use crate::extractors;
use crate::options_provider::resolve_options;
use crate::renderer::{render, GeneratedSource};
use crate::scan_filter::ScanFilter;
use crate::scoped_node::ScopedNode;
use entity_lengths_core::compilation::Compilation;
use entity_lengths_core::config::GeneratorOptions;
use entity_lengths_core::entities::{EntityFacts, Stream};
use entity_lengths_core::structural_hash::StructuralHash;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use std::time::Instant;
use tracing::{debug, info};

type StreamCache = HashMap<StructuralHash, Option<EntityFacts>>;

/// Statistics about one generator run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct GenerationStats {
    /// Class nodes evaluated, summed over streams
    pub classes_visited: usize,
    /// Results reused from the previous run
    pub cache_hits: usize,
    /// Results computed by running an extractor
    pub cache_misses: usize,
    /// Cache entries discarded because their class disappeared or changed
    pub stale_entries_dropped: usize,
    /// Entity groups emitted
    pub entities: usize,
    /// Constants emitted
    pub facts: usize,
    /// Processing time in milliseconds
    pub processing_time_ms: u64,
}

impl GenerationStats {
    /// Merge another stats instance into this one
    pub fn merge(&mut self, other: GenerationStats) {
        self.classes_visited += other.classes_visited;
        self.cache_hits += other.cache_hits;
        self.cache_misses += other.cache_misses;
        self.stale_entries_dropped += other.stale_entries_dropped;
        self.entities += other.entities;
        self.facts += other.facts;
        self.processing_time_ms += other.processing_time_ms;
    }
}

/// Result of one generator run
#[derive(Debug, Clone, Serialize)]
pub struct GenerationOutcome {
    pub source: GeneratedSource,
    /// Whether `source` differs from the previous run's output
    pub changed: bool,
    pub options: GeneratorOptions,
    pub stats: GenerationStats,
    /// Extracted groups per stream, in discovery order
    pub facts: BTreeMap<Stream, Vec<EntityFacts>>,
}

impl GenerationOutcome {
    /// All groups in rendering order
    pub fn groups(&self) -> impl Iterator<Item = &EntityFacts> {
        self.facts.values().flatten()
    }
}

/// Long-lived generator that reuses per-class results across runs
#[derive(Debug)]
pub struct IncrementalGenerator {
    defaults: GeneratorOptions,
    options: Option<GeneratorOptions>,
    caches: [StreamCache; Stream::ALL.len()],
    last_text: Option<String>,
}

impl IncrementalGenerator {
    /// Creates a generator; `defaults` apply wherever the options attribute is silent
    pub fn new(defaults: GeneratorOptions) -> Self {
        Self {
            defaults,
            options: None,
            caches: Default::default(),
            last_text: None,
        }
    }

    pub fn defaults(&self) -> &GeneratorOptions {
        &self.defaults
    }

    /// Number of cached results across all streams
    pub fn cached_entries(&self) -> usize {
        self.caches.iter().map(HashMap::len).sum()
    }

    /// Forgets every cached result and the previous output
    pub fn reset(&mut self) {
        self.caches.iter_mut().for_each(HashMap::clear);
        self.options = None;
        self.last_text = None;
    }

    /// Runs every stream over `compilation` and renders the result
    pub fn run(&mut self, compilation: &Compilation) -> GenerationOutcome {
        let started = Instant::now();
        let options = resolve_options(compilation, &self.defaults);
        if self.options.as_ref() != Some(&options) {
            if self.options.is_some() {
                info!("Generator options changed, discarding cached results");
            }
            self.caches.iter_mut().for_each(HashMap::clear);
            self.options = Some(options.clone());
        }

        let filter = ScanFilter::new(&options.scan);
        let mut stats = GenerationStats::default();
        let mut facts = BTreeMap::new();
        for stream in Stream::ALL {
            let (groups, stream_stats) =
                run_stream(stream, compilation, &filter, &mut self.caches[stream.index()]);
            debug!(
                "Stream {}: {} group(s), {} hit(s), {} miss(es), {} dropped",
                stream,
                groups.len(),
                stream_stats.cache_hits,
                stream_stats.cache_misses,
                stream_stats.stale_entries_dropped
            );
            stats.merge(stream_stats);
            facts.insert(stream, groups);
        }

        let groups: Vec<&EntityFacts> = facts.values().flatten().collect();
        stats.entities = groups.len();
        stats.facts = groups.iter().map(|group| group.len()).sum();
        let source = render(&options, compilation.assembly_name(), groups);

        let changed = self.last_text.as_deref() != Some(source.text.as_str());
        if changed {
            self.last_text = Some(source.text.clone());
        }
        stats.processing_time_ms = started.elapsed().as_millis() as u64;
        info!(
            "Generated {} with {} constant(s) for {} entit(ies) in {}ms (changed: {})",
            source.hint_name, stats.facts, stats.entities, stats.processing_time_ms, changed
        );

        GenerationOutcome {
            source,
            changed,
            options,
            stats,
            facts,
        }
    }
}

/// Evaluates one stream over every class, replacing `cache` with this run's entries
fn run_stream(
    stream: Stream,
    compilation: &Compilation,
    filter: &ScanFilter<'_>,
    cache: &mut StreamCache,
) -> (Vec<EntityFacts>, GenerationStats) {
    let mut stats = GenerationStats::default();
    let mut seen = StreamCache::new();
    let mut groups = Vec::new();

    for file in compilation.files() {
        let tree = &file.tree;
        for class in tree.classes() {
            let Some(node) = ScopedNode::new(compilation, tree, class) else {
                continue;
            };
            stats.classes_visited += 1;
            let key = node.structural_key(stream);
            let cached = seen.get(&key).cloned().or_else(|| cache.remove(&key));
            let result = match cached {
                Some(result) => {
                    stats.cache_hits += 1;
                    result
                }
                None => {
                    stats.cache_misses += 1;
                    if filter.admit(node.namespace(), node.name()) {
                        extractors::extract(stream, &node)
                    } else {
                        None
                    }
                }
            };
            if let Some(group) = &result {
                groups.push(group.clone());
            }
            seen.insert(key, result);
        }
    }

    stats.stale_entries_dropped = cache.len();
    *cache = seen;
    (groups, stats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use entity_lengths_core::compilation::SourceFile;
    use entity_lengths_core::entities::PropertyLengthFact;
    use entity_lengths_core::syntax::{
        AttributeArgument, AttributeValue, Literal, ResolvedType, SyntaxTreeBuilder, TypeRef,
    };
    use pretty_assertions::assert_eq;

    /// `namespace App.Domain { class <name> { [MaxLength(<length>)] string Name } }`
    fn entity_file(name: &str, length: i64) -> SourceFile {
        let mut builder = SyntaxTreeBuilder::new();
        let attribute = builder.attribute(
            "MaxLength",
            vec![AttributeArgument::positional(AttributeValue::Literal(
                Literal::Integer(length),
            ))],
        );
        let property = builder.property(
            "Name",
            TypeRef::resolved("string", ResolvedType::new("System", "String")),
            vec![attribute],
        );
        let class = builder.class(name, Vec::new(), vec![property]);
        let namespace = builder.namespace("App.Domain", vec![class]);
        let root = builder.compilation_unit(vec![namespace]);
        SourceFile::new(format!("{name}.cs"), builder.finish(root).unwrap())
    }

    fn compilation(files: Vec<SourceFile>) -> Compilation {
        Compilation::from_files("App", files)
    }

    #[test]
    fn test_first_run_misses_then_hits() {
        let mut generator = IncrementalGenerator::new(GeneratorOptions::default());
        let compilation = compilation(vec![entity_file("User", 50), entity_file("Blog", 80)]);

        let first = generator.run(&compilation);
        assert!(first.changed);
        assert_eq!(first.stats.cache_misses, 6);
        assert_eq!(first.stats.cache_hits, 0);
        assert_eq!(generator.cached_entries(), 6);

        let second = generator.run(&compilation);
        assert!(!second.changed);
        assert_eq!(second.source, first.source);
        assert_eq!(second.stats.cache_misses, 0);
        assert_eq!(second.stats.cache_hits, 6);
    }

    #[test]
    fn test_edit_re_extracts_only_changed_class() {
        let mut generator = IncrementalGenerator::new(GeneratorOptions::default());
        generator.run(&compilation(vec![entity_file("Blog", 80), entity_file("User", 50)]));

        let outcome =
            generator.run(&compilation(vec![entity_file("Blog", 80), entity_file("User", 60)]));
        assert!(outcome.changed);
        assert_eq!(outcome.stats.cache_hits, 3);
        assert_eq!(outcome.stats.cache_misses, 3);
        assert_eq!(outcome.stats.stale_entries_dropped, 3);
        assert_eq!(
            outcome.facts[&Stream::AnnotatedEntities],
            vec![
                EntityFacts::new("Blog", vec![PropertyLengthFact::new("Name", 80)]),
                EntityFacts::new("User", vec![PropertyLengthFact::new("Name", 60)]),
            ]
        );
    }

    #[test]
    fn test_removed_class_entries_are_dropped() {
        let mut generator = IncrementalGenerator::new(GeneratorOptions::default());
        generator.run(&compilation(vec![entity_file("Blog", 80), entity_file("User", 50)]));

        let outcome = generator.run(&compilation(vec![entity_file("User", 50)]));
        assert_eq!(outcome.stats.stale_entries_dropped, 3);
        assert_eq!(generator.cached_entries(), 3);
        assert_eq!(outcome.stats.entities, 1);
    }

    #[test]
    fn test_option_change_clears_caches() {
        let mut generator = IncrementalGenerator::new(GeneratorOptions::default());
        let compilation = compilation(vec![entity_file("User", 50)]);
        generator.run(&compilation);

        generator.defaults = GeneratorOptions {
            length_suffix: "Max".to_string(),
            ..GeneratorOptions::default()
        };
        let outcome = generator.run(&compilation);
        assert!(outcome.changed);
        assert_eq!(outcome.stats.cache_hits, 0);
        assert_eq!(outcome.stats.stale_entries_dropped, 0);
        assert!(outcome.source.text.contains("public const int NameMax = 50;"));
    }

    #[test]
    fn test_identical_classes_share_a_key_but_both_render() {
        let mut generator = IncrementalGenerator::new(GeneratorOptions::default());
        let mut other = entity_file("User", 50);
        other.path = "Other/User.cs".into();
        let outcome = generator.run(&compilation(vec![entity_file("User", 50), other]));
        assert_eq!(outcome.stats.cache_misses, 3);
        assert_eq!(outcome.stats.cache_hits, 3);
        assert_eq!(outcome.facts[&Stream::AnnotatedEntities].len(), 2);
    }

    #[test]
    fn test_reset_forgets_output() {
        let mut generator = IncrementalGenerator::new(GeneratorOptions::default());
        let compilation = compilation(vec![entity_file("User", 50)]);
        generator.run(&compilation);
        generator.reset();
        assert_eq!(generator.cached_entries(), 0);
        assert!(generator.run(&compilation).changed);
    }
}
