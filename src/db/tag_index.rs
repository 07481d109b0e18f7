//! Inverted index from tag to record ids.

use rustc_hash::FxHashMap;
use std::collections::BTreeSet;

#[derive(Debug, Default)]
pub(crate) struct TagIndex {
    by_tag: FxHashMap<String, BTreeSet<u64>>,
}

impl TagIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `id` under every tag, creating tag sets on first use.
    pub fn insert<'a>(&mut self, id: u64, tags: impl IntoIterator<Item = &'a String>) {
        for tag in tags {
            self.by_tag.entry(tag.clone()).or_default().insert(id);
        }
    }

    /// Drop `id` from every tag; tags left without records are removed.
    pub fn remove<'a>(&mut self, id: u64, tags: impl IntoIterator<Item = &'a String>) {
        for tag in tags {
            if let Some(ids) = self.by_tag.get_mut(tag.as_str()) {
                ids.remove(&id);
                if ids.is_empty() {
                    self.by_tag.remove(tag.as_str());
                }
            }
        }
    }

    /// Ids carrying at least one of `tags`, deduplicated and ascending.
    pub fn union<S: AsRef<str>>(&self, tags: &[S]) -> BTreeSet<u64> {
        tags.iter()
            .filter_map(|tag| self.by_tag.get(tag.as_ref()))
            .flatten()
            .copied()
            .collect()
    }

    /// Number of distinct tags.
    pub fn len(&self) -> usize {
        self.by_tag.len()
    }
}
