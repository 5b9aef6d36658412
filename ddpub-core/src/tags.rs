//! Tag to note groupings derived from note headers.

use crate::scanner::Notes;
use ddpub_types::{NoteId, Tag};
use std::collections::HashMap;

/// Every tag found in note headers with the notes carrying it, in scan order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagIndex {
    by_tag: HashMap<Tag, Vec<NoteId>>,
}

impl TagIndex {
    pub fn build(notes: &Notes) -> Self {
        let mut by_tag: HashMap<Tag, Vec<NoteId>> = HashMap::new();
        for meta in notes.iter() {
            for tag in &meta.tags {
                by_tag.entry(tag.clone()).or_default().push(meta.id.clone());
            }
        }
        tracing::debug!("Indexed {} distinct tags", by_tag.len());
        Self { by_tag }
    }

    /// Notes carrying `tag`; empty for unknown tags.
    pub fn notes(&self, tag: &str) -> &[NoteId] {
        self.by_tag.get(tag).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn tags(&self) -> impl Iterator<Item = &Tag> {
        self.by_tag.keys()
    }

    pub fn len(&self) -> usize {
        self.by_tag.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_tag.is_empty()
    }
}
