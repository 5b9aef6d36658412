//! URL space of a website.
//!
//! A [`Router`] renders every page of one language variant up front into a
//! [`RouteTable`]; a [`MultiRouter`] merges the tables of all variants. No
//! path may be registered twice.

use crate::pages::PageRenderer;
use crate::rss::render_rss;
use ddpub_core::{Homepage, MultiStore, PublishRole, SharedFile, Store};
use ddpub_types::{Builtin, NoteId};
use std::collections::{BTreeMap, HashSet};
use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error;

pub const HTML: &str = "text/html; charset=utf-8";
pub const RSS: &str = "application/rss+xml; charset=utf-8";

#[derive(Error, Debug)]
pub enum RouterError {
    #[error("Pattern '{0}' already registered with router")]
    RouteCollision(String),

    #[error("Failed to render {page}: {source}")]
    Template {
        page: String,
        #[source]
        source: askama::Error,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Body {
    /// Rendered at startup.
    Bytes(Arc<[u8]>),
    /// Read from disk on request.
    File(PathBuf),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Payload {
    pub content_type: String,
    pub body: Body,
}

impl Payload {
    pub fn bytes(content_type: impl Into<String>, bytes: impl Into<Arc<[u8]>>) -> Self {
        Self {
            content_type: content_type.into(),
            body: Body::Bytes(bytes.into()),
        }
    }

    pub fn html(html: String) -> Self {
        Self::bytes(HTML, html.into_bytes())
    }

    pub fn file(content_type: impl Into<String>, path: PathBuf) -> Self {
        Self {
            content_type: content_type.into(),
            body: Body::File(path),
        }
    }
}

/// Exact path to payload mapping.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RouteTable {
    routes: BTreeMap<String, Payload>,
}

impl RouteTable {
    /// Register `payload` at `pattern`. Fails if the pattern is taken.
    pub fn insert(&mut self, pattern: impl Into<String>, payload: Payload) -> Result<(), RouterError> {
        let pattern = pattern.into();
        if self.routes.contains_key(&pattern) {
            return Err(RouterError::RouteCollision(pattern));
        }
        tracing::debug!("Route {} ({})", pattern, payload.content_type);
        self.routes.insert(pattern, payload);
        Ok(())
    }

    pub fn get(&self, path: &str) -> Option<&Payload> {
        self.routes.get(path)
    }

    pub fn contains(&self, path: &str) -> bool {
        self.routes.contains_key(path)
    }

    /// Move every route of `other` into this table.
    pub fn merge(&mut self, other: RouteTable) -> Result<(), RouterError> {
        for (pattern, payload) in other.routes {
            self.insert(pattern, payload)?;
        }
        Ok(())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Payload)> {
        self.routes.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}

/// Routes of one language variant.
#[derive(Debug)]
pub struct Router {
    table: RouteTable,
}

impl Router {
    /// Render every page of `store`. Shared files are only registered for
    /// the main variant.
    pub fn new(store: &Store, shared_files: &[SharedFile]) -> Result<Self, RouterError> {
        let config = store.config();
        let pages = PageRenderer::new(store, shared_files);
        let mut table = RouteTable::default();

        // Homepage.
        let home = config.url_for_home_page();
        let html = match &config.homepage {
            Homepage::Note(id) => match store.content(id.as_str()) {
                Some(note) => pages.page(&home, note),
                None => pages.feed(&home),
            },
            Homepage::Feed => pages.feed(&home),
        };
        insert_page(&mut table, home, html)?;

        // Builtin pages.
        let url = config.url_for_builtin(Builtin::Feed);
        let html = pages.feed(&url);
        insert_page(&mut table, url, html)?;

        let url = config.url_for_builtin(Builtin::Search);
        let html = pages.search(&url);
        insert_page(&mut table, url, html)?;

        let url = config.url_for_builtin(Builtin::Tags);
        let html = pages.tags(&url);
        insert_page(&mut table, url, html)?;

        // Feed notes and pages.
        let mut seen: HashSet<(PublishRole, &NoteId)> = HashSet::new();
        for target in store.publish_targets() {
            if !seen.insert((target.role, &target.id)) {
                continue;
            }
            let Some(note) = store.content(target.id.as_str()) else {
                continue;
            };
            match target.role {
                PublishRole::Builtin | PublishRole::TagContent => continue,
                PublishRole::Feed => {
                    let url = config.url_for_feed_note(&note.meta.slug);
                    let html = pages.note(&url, note);
                    insert_page(&mut table, url, html)?;
                }
                PublishRole::Page => {
                    let url = config.url_for_page_note(&note.meta.slug);
                    let html = pages.page(&url, note);
                    insert_page(&mut table, url, html)?;
                }
            }
        }

        // Tags.
        for tag in &config.tags {
            let url = config.url_for_tag(tag);
            let html = pages.tag(&url, tag);
            insert_page(&mut table, url, html)?;
        }

        // Files linked from notes.
        for file in store.files().iter() {
            table.insert(
                file.url.clone(),
                Payload::file(file.content_type.clone(), file.path.clone()),
            )?;
        }

        // Site-wide files.
        if !config.is_child {
            for shared in shared_files {
                table.insert(
                    config.url_for_shared_file(shared.filename),
                    Payload::bytes(shared.content_type, shared.content.clone()),
                )?;
            }
        }

        table.insert(
            config.url_for_rss_feed(),
            Payload::bytes(RSS, render_rss(store).into_bytes()),
        )?;

        tracing::info!("Registered {} routes for {}", table.len(), config.root());
        Ok(Self { table })
    }

    pub fn table(&self) -> &RouteTable {
        &self.table
    }

    pub fn into_table(self) -> RouteTable {
        self.table
    }
}

fn insert_page(
    table: &mut RouteTable,
    pattern: String,
    html: askama::Result<String>,
) -> Result<(), RouterError> {
    let html = html.map_err(|source| RouterError::Template {
        page: pattern.clone(),
        source,
    })?;
    table.insert(pattern, Payload::html(html))
}

/// Routes of every language variant in one table.
#[derive(Debug)]
pub struct MultiRouter {
    table: RouteTable,
}

impl MultiRouter {
    pub fn new(stores: &MultiStore, shared_files: &[SharedFile]) -> Result<Self, RouterError> {
        let mut table = Router::new(&stores.main, shared_files)?.into_table();
        for store in &stores.secondaries {
            table.merge(Router::new(store, shared_files)?.into_table())?;
        }

        tracing::info!("Route table ready with {} routes", table.len());
        Ok(Self { table })
    }

    pub fn table(&self) -> &RouteTable {
        &self.table
    }

    pub fn into_table(self) -> RouteTable {
        self.table
    }
}
