//! Loading and rendering the content of published notes.
//!
//! Each distinct published note is read once, parsed, has its links and
//! images rewritten and is rendered to HTML:
//!
//! - links to published notes point to the note's public URL;
//! - absolute links open in a new tab;
//! - relative links and images to existing files get content-addressed URLs.

use crate::config::WebsiteConfig;
use crate::files::{detect_content_type, File, FileRegistry};
use crate::markdown::{LinkRewrite, LinkVisitor, MarkdownEngine};
use crate::publish::{distinct_ids, PublishTarget};
use crate::scanner::{read_body, Metadata, Notes};
use ddpub_types::NoteId;
use once_cell::sync::Lazy;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use thiserror::Error;
use url::Url;

/// Base for resolving relative references, never served.
static BASE: Lazy<Url> =
    Lazy::new(|| Url::parse("http://notes.invalid/").expect("valid base url"));

#[derive(Error, Debug)]
pub enum ResolveError {
    #[error("Failed to load note with ID '{id}' from '{path}': {source}")]
    Read {
        id: NoteId,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("No metadata for published note '{0}'")]
    MissingMetadata(NoteId),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RewrittenLink {
    pub original: String,
    pub rewritten: String,
}

/// Rendered content of a published note.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteContent {
    pub meta: Metadata,
    pub html: String,
    /// Destinations changed while rendering, in document order.
    pub links: Vec<RewrittenLink>,
}

#[derive(Debug, Default)]
pub struct Resolved {
    pub content: HashMap<NoteId, NoteContent>,
    pub files: FileRegistry,
}

pub struct ContentResolver<'a> {
    config: &'a WebsiteConfig,
    notes: &'a Notes,
    notes_dir: &'a Path,
    engine: MarkdownEngine,
}

impl<'a> ContentResolver<'a> {
    pub fn new(config: &'a WebsiteConfig, notes: &'a Notes, notes_dir: &'a Path) -> Self {
        Self {
            config,
            notes,
            notes_dir,
            engine: MarkdownEngine::new(),
        }
    }

    /// Resolve every distinct id in `targets`, in order of first appearance.
    pub fn resolve(&self, targets: &[PublishTarget]) -> Result<Resolved, ResolveError> {
        let mut resolved = Resolved::default();

        for id in distinct_ids(targets) {
            let meta = self
                .notes
                .get(id.as_str())
                .ok_or_else(|| ResolveError::MissingMetadata(id.clone()))?;

            let content = self.resolve_note(meta, &mut resolved.files)?;
            resolved.content.insert(id.clone(), content);
        }

        tracing::info!(
            "Resolved {} notes with {} files",
            resolved.content.len(),
            resolved.files.len()
        );
        Ok(resolved)
    }

    fn resolve_note(
        &self,
        meta: &Metadata,
        files: &mut FileRegistry,
    ) -> Result<NoteContent, ResolveError> {
        let path = self.notes_dir.join(&meta.filename);
        let body = read_body(&path).map_err(|source| ResolveError::Read {
            id: meta.id.clone(),
            path: path.clone(),
            source,
        })?;

        let mut visitor = NoteLinks {
            resolver: self,
            note: &meta.id,
            files,
            links: Vec::new(),
        };
        let html = self.engine.to_html(&body, &mut visitor);
        let links = visitor.links;

        tracing::debug!("Rendered note {} ({} links rewritten)", meta.id, links.len());

        Ok(NoteContent {
            meta: meta.clone(),
            html,
            links,
        })
    }
}

/// Where a link or image destination points.
enum Destination {
    /// Has a scheme, or names another host.
    Absolute(Url),
    /// Relative reference, as a percent-decoded path below the notes
    /// directory. Dot segments are already resolved.
    Relative(String),
    /// Could not be parsed; left alone.
    Opaque,
}

fn classify_destination(destination: &str) -> Destination {
    match Url::parse(destination) {
        Ok(url) => return Destination::Absolute(url),
        Err(url::ParseError::RelativeUrlWithoutBase) => {}
        Err(_) => return Destination::Opaque,
    }

    let Ok(joined) = BASE.join(destination) else {
        return Destination::Opaque;
    };
    if joined.host_str() != BASE.host_str() {
        return Destination::Absolute(joined);
    }

    let path = urlencoding::decode(joined.path())
        .map(|p| p.into_owned())
        .unwrap_or_else(|_| joined.path().to_string());
    Destination::Relative(path.trim_start_matches('/').to_string())
}

/// What a link destination's path says about notes.
enum NoteLink {
    /// A scanned note with a public URL.
    Published(String),
    /// A scanned note without a public URL.
    Unpublished,
    /// A valid id that names no scanned note.
    Unknown(NoteId),
    /// No id in the path.
    NotANote,
}

/// Link visitor for one note.
struct NoteLinks<'r, 'a> {
    resolver: &'r ContentResolver<'a>,
    note: &'r NoteId,
    files: &'r mut FileRegistry,
    links: Vec<RewrittenLink>,
}

impl NoteLinks<'_, '_> {
    fn record(&mut self, original: &str, rewritten: &str) {
        self.links.push(RewrittenLink {
            original: original.to_string(),
            rewritten: rewritten.to_string(),
        });
    }

    /// What a link path says about notes. A valid id of a scanned note
    /// without a public URL is logged as dangling.
    fn note_link(&self, path: &str, destination: &str) -> NoteLink {
        let config = self.resolver.config;
        let Some(id) = config.rules.id_from_link(path) else {
            return NoteLink::NotANote;
        };

        match self.resolver.notes.get(id.as_str()) {
            Some(meta) => match config.note_url(meta) {
                Some(url) => NoteLink::Published(url),
                None => {
                    tracing::warn!(
                        "Dangling link in note {}: '{}' points to unpublished note {}",
                        self.note,
                        destination,
                        id
                    );
                    NoteLink::Unpublished
                }
            },
            None => NoteLink::Unknown(id),
        }
    }

    /// Register a file below the notes directory and return its public URL.
    fn file_link(&mut self, relative: &str, destination: &str) -> Option<String> {
        if relative.is_empty() {
            return None;
        }

        let path = self.resolver.notes_dir.join(relative);
        if !path.is_file() {
            return None;
        }

        let content_type = match detect_content_type(&path) {
            Ok(content_type) => content_type,
            Err(err) => {
                tracing::warn!("Could not read file {:?} linked from note {}: {}", path, self.note, err);
                return None;
            }
        };

        let url = self.resolver.config.url_for_file(relative);
        let file = self.files.register(File {
            link: destination.to_string(),
            path,
            content_type,
            url,
        });
        Some(file.url.clone())
    }
}

impl LinkVisitor for NoteLinks<'_, '_> {
    fn visit_link(&mut self, destination: &str) -> LinkRewrite {
        match classify_destination(destination) {
            Destination::Absolute(url) => {
                let rewritten = match self.note_link(url.path(), destination) {
                    NoteLink::Published(new) => {
                        self.record(destination, &new);
                        Some(new)
                    }
                    _ => None,
                };
                LinkRewrite {
                    destination: rewritten,
                    new_tab: true,
                }
            }
            Destination::Relative(path) => match self.note_link(&path, destination) {
                NoteLink::Published(new) => {
                    self.record(destination, &new);
                    LinkRewrite::to(new)
                }
                // Sources of scanned notes are never served as files.
                NoteLink::Unpublished => LinkRewrite::keep(),
                other => match self.file_link(&path, destination) {
                    Some(new) => {
                        self.record(destination, &new);
                        LinkRewrite::to(new)
                    }
                    None => {
                        if let NoteLink::Unknown(id) = other {
                            tracing::warn!(
                                "Dangling link in note {}: '{}' points to unknown note {}",
                                self.note,
                                destination,
                                id
                            );
                        }
                        LinkRewrite::keep()
                    }
                },
            },
            Destination::Opaque => LinkRewrite::keep(),
        }
    }

    fn visit_image(&mut self, destination: &str) -> Option<String> {
        let Destination::Relative(path) = classify_destination(destination) else {
            return None;
        };
        let new = self.file_link(&path, destination)?;
        self.record(destination, &new);
        Some(new)
    }
}
