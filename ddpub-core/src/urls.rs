//! Public URL layout of a website variant.
//!
//! The main variant lives at `/`, every secondary variant under
//! `/<language>/`. All page URLs end with a slash.

use crate::config::{PublishedTag, WebsiteConfig};
use crate::scanner::Metadata;
use ddpub_types::Builtin;
use sha2::{Digest, Sha256};
use std::path::Path;

const FILES: &str = "files";
const RSS: &str = "rss.xml";

impl WebsiteConfig {
    /// Root path of this variant.
    pub fn root(&self) -> String {
        if self.is_child {
            format!("/{}/", self.language.url_segment())
        } else {
            "/".to_string()
        }
    }

    pub fn url_for_home_page(&self) -> String {
        self.root()
    }

    pub fn url_for_builtin(&self, builtin: Builtin) -> String {
        let segment = match builtin {
            Builtin::Feed => self.feed.url_prefix.as_str(),
            Builtin::Search | Builtin::Tags => builtin.as_str(),
        };
        format!("{}{}/", self.root(), segment)
    }

    pub fn url_for_tag(&self, tag: &PublishedTag) -> String {
        format!("{}{}/", self.url_for_builtin(Builtin::Tags), tag.slug)
    }

    /// URL of a configured tag's page, `None` for unpublished tags.
    pub fn url_for_tag_name(&self, tag: &str) -> Option<String> {
        self.tag(tag).map(|t| self.url_for_tag(t))
    }

    pub fn url_for_page_note(&self, slug: &str) -> String {
        format!("{}{}/", self.root(), slug)
    }

    pub fn url_for_feed_note(&self, slug: &str) -> String {
        format!("{}{}/", self.url_for_builtin(Builtin::Feed), slug)
    }

    /// Shared files are served once, at the site root.
    pub fn url_for_shared_file(&self, filename: &str) -> String {
        format!("/{filename}")
    }

    pub fn url_for_rss_feed(&self) -> String {
        format!("{}{}", self.root(), RSS)
    }

    /// Content-addressed URL of a file attachment, given its path relative
    /// to the notes directory.
    pub fn url_for_file(&self, relative_path: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(relative_path.as_bytes());
        let digest = hasher.finalize();

        let extension = Path::new(relative_path)
            .extension()
            .map(|e| format!(".{}", e.to_string_lossy()))
            .unwrap_or_default();

        format!("{}{}/{:x}{}", self.root(), FILES, digest, extension)
    }

    /// Turn a site path into an absolute URL on the configured domain.
    pub fn absolute_url(&self, path: &str) -> String {
        let scheme = if self.https { "https" } else { "http" };
        format!("{}://{}{}", scheme, self.domain, path)
    }

    pub fn is_feed_tagged(&self, meta: &Metadata) -> bool {
        meta.has_tag(&self.feed.tag)
    }

    pub fn is_page_tagged(&self, meta: &Metadata) -> bool {
        self.pages.tag.as_deref().is_some_and(|tag| meta.has_tag(tag))
    }

    /// Public URL of a note: its feed URL if feed-tagged, otherwise its page
    /// URL if page-tagged.
    pub fn note_url(&self, meta: &Metadata) -> Option<String> {
        if self.is_feed_tagged(meta) {
            Some(self.url_for_feed_note(&meta.slug))
        } else if self.is_page_tagged(meta) {
            Some(self.url_for_page_note(&meta.slug))
        } else {
            None
        }
    }
}
