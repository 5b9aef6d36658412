//! Immutable per-variant aggregate of everything needed to render a site.

use crate::config::{MenuEntry, PublishedTag, WebsiteConfig};
use crate::files::FileRegistry;
use crate::publish::{classify, PublishRole, PublishTarget};
use crate::resolver::{ContentResolver, NoteContent, ResolveError};
use crate::scanner::{Metadata, NoteScanner, Notes, ScanError};
use crate::tags::TagIndex;
use ddpub_types::{NoteId, Tag};
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error(transparent)]
    Scan(#[from] ScanError),

    #[error("Published note '{id}' ({role:?}) not found in the notes directory")]
    UnknownNote { id: NoteId, role: PublishRole },

    #[error("Menu entry '{title}' points to note '{id}', which is not a published page")]
    MenuNoteNotPage { id: NoteId, title: String },

    #[error(transparent)]
    Resolve(#[from] ResolveError),
}

#[derive(Debug)]
pub struct Store {
    config: Arc<WebsiteConfig>,
    notes: Notes,
    tags: TagIndex,
    targets: Vec<PublishTarget>,
    content: HashMap<NoteId, NoteContent>,
    files: FileRegistry,
}

impl Store {
    /// Scan `notes_dir` and build the store for one website variant.
    pub fn new(config: Arc<WebsiteConfig>, notes_dir: &Path) -> Result<Self, StoreError> {
        tracing::info!("Building {} store from {:?}", config.language, notes_dir);

        let notes = NoteScanner::new(&config.rules).scan(notes_dir)?;
        let tags = TagIndex::build(&notes);
        let targets = classify(&config, &tags);

        for target in &targets {
            if !notes.contains(target.id.as_str()) {
                return Err(StoreError::UnknownNote {
                    id: target.id.clone(),
                    role: target.role,
                });
            }
        }

        for entry in &config.menu {
            if let MenuEntry::Note { title, id } = entry {
                let is_page = targets
                    .iter()
                    .any(|t| t.role == PublishRole::Page && &t.id == id);
                if !is_page {
                    return Err(StoreError::MenuNoteNotPage {
                        id: id.clone(),
                        title: title.clone(),
                    });
                }
            }
        }

        let resolved = ContentResolver::new(&config, &notes, notes_dir).resolve(&targets)?;

        Ok(Self {
            config,
            notes,
            tags,
            targets,
            content: resolved.content,
            files: resolved.files,
        })
    }

    pub fn config(&self) -> &WebsiteConfig {
        &self.config
    }

    pub fn config_arc(&self) -> Arc<WebsiteConfig> {
        Arc::clone(&self.config)
    }

    /// True if `id` is a valid note id and the note was scanned.
    pub fn note_exists(&self, id: &str) -> bool {
        self.config.rules.is_valid(id) && self.notes.contains(id)
    }

    pub fn metadata(&self, id: &str) -> Option<&Metadata> {
        self.notes.get(id)
    }

    pub fn content(&self, id: &str) -> Option<&NoteContent> {
        self.content.get(id)
    }

    pub fn tag_index(&self) -> &TagIndex {
        &self.tags
    }

    pub fn publish_targets(&self) -> &[PublishTarget] {
        &self.targets
    }

    pub fn files(&self) -> &FileRegistry {
        &self.files
    }

    /// Resolved notes carrying `tag`, newest first. Notes with equal dates
    /// keep scan order.
    pub fn notes_for_tag(&self, tag: &str) -> Vec<&NoteContent> {
        let mut notes: Vec<&NoteContent> = self
            .tags
            .notes(tag)
            .iter()
            .filter_map(|id| self.content.get(id))
            .collect();
        notes.sort_by(|a, b| b.meta.date.cmp(&a.meta.date));
        notes
    }

    /// Resolved feed notes, newest first.
    pub fn feed_notes(&self) -> Vec<&NoteContent> {
        self.notes_for_tag(&self.config.feed.tag)
    }

    /// Keep only the configured tags among `tags`, sorted by title.
    pub fn tags_to_published(&self, tags: &[Tag]) -> Vec<&PublishedTag> {
        let mut published: Vec<&PublishedTag> =
            tags.iter().filter_map(|t| self.config.tag(t)).collect();
        published.sort_by(|a, b| a.title.cmp(&b.title));
        published
    }

    pub fn is_feed_note(&self, id: &str) -> bool {
        self.notes
            .get(id)
            .is_some_and(|meta| self.config.is_feed_tagged(meta))
    }

    pub fn is_page_note(&self, id: &str) -> bool {
        self.notes
            .get(id)
            .is_some_and(|meta| self.config.is_page_tagged(meta))
    }

    /// Feed URL for feed notes, page URL for pages, `None` otherwise.
    pub fn public_url(&self, id: &str) -> Option<String> {
        self.notes.get(id).and_then(|meta| self.config.note_url(meta))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::tests::MINIMAL;
    use std::fs;
    use tempfile::{tempdir, TempDir};

    fn notes_dir(files: &[(&str, &str)]) -> TempDir {
        let dir = tempdir().unwrap();
        for (name, contents) in files {
            fs::write(dir.path().join(name), contents).unwrap();
        }
        dir
    }

    fn config(extra: &str) -> Arc<WebsiteConfig> {
        Arc::new(WebsiteConfig::from_yaml(&format!("{MINIMAL}{extra}")).unwrap())
    }

    #[test]
    fn test_feed_scenario() {
        let dir = notes_dir(&[
            ("202301011200.md", "# Older\nTags: #blog\nDate: 2023-01-01\n\nOld\n"),
            ("202301011300.md", "# Newer\nTags: #blog\nDate: 2023-02-01\n\nNew\n"),
            ("202301011400.md", "# Private\nTags: #draft\n\nHidden\n"),
        ]);
        let store = Store::new(config(""), dir.path()).unwrap();

        let titles: Vec<&str> = store
            .feed_notes()
            .iter()
            .map(|n| n.meta.title.as_str())
            .collect();
        assert_eq!(titles, vec!["Newer", "Older"]);

        assert!(store.is_feed_note("202301011200"));
        assert!(!store.is_page_note("202301011200"));
        assert_eq!(
            store.public_url("202301011200").as_deref(),
            Some("/feed/202301011200/")
        );
        assert_eq!(store.public_url("202301011400"), None);
        assert!(store.content("202301011400").is_none());
    }

    #[test]
    fn test_equal_dates_keep_scan_order() {
        let dir = notes_dir(&[
            ("202301011300.md", "# B\nTags: #blog\nDate: 2023-01-01\n\n"),
            ("202301011200.md", "# A\nTags: #blog\nDate: 2023-01-01\n\n"),
        ]);
        let store = Store::new(config(""), dir.path()).unwrap();

        let ids: Vec<&str> = store
            .notes_for_tag("blog")
            .iter()
            .map(|n| n.meta.id.as_str())
            .collect();
        assert_eq!(ids, vec!["202301011200", "202301011300"]);
    }

    #[test]
    fn test_note_exists() {
        let dir = notes_dir(&[("202301011200.md", "# A\n")]);
        let store = Store::new(config(""), dir.path()).unwrap();

        assert!(store.note_exists("202301011200"));
        assert!(!store.note_exists("202301011300"));
        assert!(!store.note_exists("nope"));
        assert!(store.metadata("202301011200").is_some());
    }

    #[test]
    fn test_tags_to_published_sorted_by_title() {
        let dir = notes_dir(&[]);
        let store = Store::new(
            config("tags:\n  - tag: z\n    title: Alpha\n  - tag: a\n    title: Beta\n"),
            dir.path(),
        )
        .unwrap();

        let tags = vec!["a".to_string(), "unknown".to_string(), "z".to_string()];
        let titles: Vec<&str> = store
            .tags_to_published(&tags)
            .iter()
            .map(|t| t.title.as_str())
            .collect();
        assert_eq!(titles, vec!["Alpha", "Beta"]);
    }

    #[test]
    fn test_unknown_publish_target() {
        let dir = notes_dir(&[]);
        let result = Store::new(config("homepage:\n  id: \"202301011200\"\n"), dir.path());
        assert!(matches!(
            result,
            Err(StoreError::UnknownNote {
                role: PublishRole::Builtin,
                ..
            })
        ));
    }

    #[test]
    fn test_menu_note_must_be_page() {
        let dir = notes_dir(&[
            ("202301011200.md", "# About\nTags: #page\n\nAbout me\n"),
            ("202301011300.md", "# Post\nTags: #blog\n\nPost\n"),
        ]);
        let base = "pages:\n  tag: page\nmenu:\n  - title: About\n    id: \"202301011200\"\n";
        assert!(Store::new(config(base), dir.path()).is_ok());

        let feed_note = "pages:\n  tag: page\nmenu:\n  - title: Post\n    id: \"202301011300\"\n";
        assert!(matches!(
            Store::new(config(feed_note), dir.path()),
            Err(StoreError::MenuNoteNotPage { .. })
        ));
    }

    #[test]
    fn test_rebuild_is_identical() {
        let dir = notes_dir(&[
            ("202301011200.md", "# A\nTags: #blog #rust\n\nSee [b](202301011300)\n"),
            ("202301011300.md", "# B\nTags: #blog\n\nBody\n"),
        ]);
        let cfg = config("");
        let first = Store::new(cfg.clone(), dir.path()).unwrap();
        let second = Store::new(cfg, dir.path()).unwrap();

        assert_eq!(first.notes, second.notes);
        assert_eq!(first.tags, second.tags);
        assert_eq!(first.targets, second.targets);
        assert_eq!(first.content, second.content);
        assert_eq!(first.files, second.files);
    }

    #[test]
    fn test_missing_notes_dir() {
        let dir = tempdir().unwrap();
        let result = Store::new(config(""), &dir.path().join("missing"));
        assert!(matches!(result, Err(StoreError::Scan(_))));
    }
}
