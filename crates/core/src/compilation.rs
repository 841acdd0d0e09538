//! The resolved view of a whole project handed to the generator
//!
//! A [`Compilation`] bundles the syntax trees of every source file, ordered
//! by path, with a [`TypeCatalog`] that knows the direct base types of every
//! declared type. Compilations are immutable; a new one is linked whenever
//! the source set changes.

use crate::syntax::{NodeId, ResolvedType, SyntaxNode, SyntaxTree, TypeKey};
use std::collections::{HashMap, HashSet, VecDeque};
use std::path::PathBuf;
use std::sync::Arc;

/// One parsed and resolved source file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    pub path: PathBuf,
    pub tree: SyntaxTree,
}

impl SourceFile {
    pub fn new(path: impl Into<PathBuf>, tree: SyntaxTree) -> Self {
        Self {
            path: path.into(),
            tree,
        }
    }
}

/// Direct base types of every type the compilation knows about
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TypeCatalog {
    bases: HashMap<TypeKey, Vec<ResolvedType>>,
}

impl TypeCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a declared type; repeated declarations (partial classes) merge their bases
    pub fn insert(&mut self, key: TypeKey, bases: Vec<ResolvedType>) {
        let entry = self.bases.entry(key).or_default();
        for base in bases {
            if !entry.contains(&base) {
                entry.push(base);
            }
        }
    }

    /// Registers every class declared in `tree` with its resolved base list
    pub fn extend_from_tree(&mut self, tree: &SyntaxTree) {
        for class in tree.classes() {
            let Some(key) = tree.declared_type_key(class) else {
                continue;
            };
            let bases = match tree.node(class) {
                SyntaxNode::Class { base_types, .. } => base_types
                    .iter()
                    .filter_map(|base| base.resolved.clone())
                    .collect(),
                _ => Vec::new(),
            };
            self.insert(key, bases);
        }
    }

    pub fn contains(&self, key: &TypeKey) -> bool {
        self.bases.contains_key(key)
    }

    pub fn direct_bases(&self, key: &TypeKey) -> &[ResolvedType] {
        self.bases.get(key).map(Vec::as_slice).unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.bases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bases.is_empty()
    }

    /// Transitive base types reachable from `direct`, breadth first
    ///
    /// Types already visited are skipped, so cyclic declarations terminate.
    pub fn base_chain(&self, direct: &[ResolvedType]) -> Vec<ResolvedType> {
        let mut chain = Vec::new();
        let mut seen = HashSet::new();
        let mut queue: VecDeque<ResolvedType> = direct.iter().cloned().collect();
        while let Some(next) = queue.pop_front() {
            if !seen.insert(next.clone()) {
                continue;
            }
            queue.extend(self.direct_bases(&next.key()).iter().cloned());
            chain.push(next);
        }
        chain
    }
}

/// All source files of one assembly plus the type catalog linking them
#[derive(Debug, Clone)]
pub struct Compilation {
    assembly_name: String,
    files: Vec<Arc<SourceFile>>,
    catalog: TypeCatalog,
}

impl Compilation {
    /// Creates a compilation; files are ordered by path for deterministic output
    pub fn new(
        assembly_name: impl Into<String>,
        mut files: Vec<Arc<SourceFile>>,
        catalog: TypeCatalog,
    ) -> Self {
        files.sort_by(|a, b| a.path.cmp(&b.path));
        Self {
            assembly_name: assembly_name.into(),
            files,
            catalog,
        }
    }

    /// Builds a compilation whose catalog holds only the types declared in `files`
    pub fn from_files(assembly_name: impl Into<String>, files: Vec<SourceFile>) -> Self {
        let mut catalog = TypeCatalog::new();
        for file in &files {
            catalog.extend_from_tree(&file.tree);
        }
        Self::new(
            assembly_name,
            files.into_iter().map(Arc::new).collect(),
            catalog,
        )
    }

    pub fn assembly_name(&self) -> &str {
        &self.assembly_name
    }

    pub fn files(&self) -> &[Arc<SourceFile>] {
        &self.files
    }

    pub fn catalog(&self) -> &TypeCatalog {
        &self.catalog
    }

    /// Assembly-level attributes across all files, in file order
    pub fn global_attributes(&self) -> impl Iterator<Item = (&SyntaxTree, NodeId)> + '_ {
        self.files.iter().flat_map(|file| {
            file.tree
                .global_attributes()
                .map(move |attribute| (&file.tree, attribute))
        })
    }
}
