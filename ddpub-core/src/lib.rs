//! # ddpub-core
//!
//! Core library for ddpub: turns a directory of notes into the content model
//! of one or more language variants of a website.
//!
//! The pipeline for each variant is scanner, tag index, publish
//! classification and content resolution, aggregated into a [`Store`].

pub mod assets;
pub mod config;
pub mod files;
pub mod l10n;
pub mod markdown;
pub mod multistore;
pub mod publish;
pub mod resolver;
pub mod scanner;
pub mod store;
pub mod tags;
mod urls;

pub use assets::SharedFile;
pub use config::{
    ConfigError, Feed, Homepage, Language, MenuEntry, NoteIdRules, PublishedTag, Website,
    WebsiteConfig,
};
pub use files::{File, FileRegistry};
pub use l10n::{Key, Localizer};
pub use multistore::MultiStore;
pub use publish::{PublishRole, PublishTarget};
pub use resolver::{NoteContent, ResolveError};
pub use scanner::{Metadata, ScanError};
pub use store::{Store, StoreError};
pub use tags::TagIndex;
