//! Precomputed pattern scope table.
//!
//! The applicable set for a file is the union of the general set (every
//! loaded pattern) and the language-specific set: patterns whose *name*
//! contains the file's language tag as a literal substring. The substring
//! rule is a behavioral contract inherited from the pattern naming
//! convention, not an approximation. Since the general set already spans the
//! whole store, the union is computed once per tag here rather than per file.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use super::language::LanguageTag;
use super::{Pattern, PatternStore};

/// Mapping from language tag to the patterns applied to files of that type.
/// Built once after the store loads; read-only for the rest of the run.
#[derive(Debug, Clone, Default)]
pub struct PatternScope {
    by_tag: HashMap<LanguageTag, Vec<Arc<Pattern>>>,
}

impl PatternScope {
    pub fn build(store: &PatternStore) -> Self {
        let mut by_tag = HashMap::with_capacity(LanguageTag::ALL.len());
        for tag in LanguageTag::ALL {
            by_tag.insert(tag, Self::union_for(tag, store));
        }
        PatternScope { by_tag }
    }

    /// general ∪ {patterns whose name contains the tag string}, deduplicated
    /// by name so no pattern is applied twice to the same line.
    fn union_for(tag: LanguageTag, store: &PatternStore) -> Vec<Arc<Pattern>> {
        let mut seen: HashSet<&str> = HashSet::new();
        let mut applicable = Vec::with_capacity(store.len());
        for pattern in store.iter() {
            if seen.insert(pattern.name.as_str()) {
                applicable.push(pattern.clone());
            }
        }
        for pattern in store.iter() {
            if pattern.name.contains(tag.as_str()) && seen.insert(pattern.name.as_str()) {
                applicable.push(pattern.clone());
            }
        }
        applicable
    }

    pub fn applicable(&self, tag: LanguageTag) -> &[Arc<Pattern>] {
        self.by_tag.get(&tag).map(Vec::as_slice).unwrap_or(&[])
    }
}
