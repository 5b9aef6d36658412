//! Shared types for ddpub
//!
//! Identifiers used across the ddpub crates: note ids, tags, builtin pages
//! and the supported site languages.

use std::borrow::Borrow;
use std::fmt;

/// Note identifier, as extracted from a note filename.
///
/// A `NoteId` only says "this came from a filename"; whether it matches the
/// configured id format is checked by the config layer.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NoteId(pub String);

impl NoteId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NoteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Borrow<str> for NoteId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for NoteId {
    fn from(id: &str) -> Self {
        NoteId(id.to_string())
    }
}

impl From<String> for NoteId {
    fn from(id: String) -> Self {
        NoteId(id)
    }
}

/// A tag without the leading `#`. Case-sensitive, never normalized.
pub type Tag = String;

/// Built-in pages every site gets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Builtin {
    Feed,
    Search,
    Tags,
}

impl Builtin {
    pub fn from_name(s: &str) -> Option<Self> {
        match s {
            "feed" => Some(Builtin::Feed),
            "search" => Some(Builtin::Search),
            "tags" => Some(Builtin::Tags),
            _ => None,
        }
    }

    /// Config name, also the URL segment of the search and tags pages.
    pub fn as_str(&self) -> &'static str {
        match self {
            Builtin::Feed => "feed",
            Builtin::Search => "search",
            Builtin::Tags => "tags",
        }
    }
}

/// Languages a site variant can be published in.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum LanguageCode {
    #[default]
    EnUs,
    RuRu,
}

impl LanguageCode {
    pub const ALL: [LanguageCode; 2] = [LanguageCode::EnUs, LanguageCode::RuRu];

    /// Full BCP 47 code, e.g. `en-US`.
    pub fn full(&self) -> &'static str {
        match self {
            LanguageCode::EnUs => "en-US",
            LanguageCode::RuRu => "ru-RU",
        }
    }

    /// Primary language subtag, e.g. `en`.
    pub fn short(&self) -> &'static str {
        match self {
            LanguageCode::EnUs => "en",
            LanguageCode::RuRu => "ru",
        }
    }

    /// Locale in the `en_US` form used by Open Graph.
    pub fn locale(&self) -> String {
        self.full().replace('-', "_")
    }

    pub fn from_full(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|code| code.full() == s)
    }
}

impl fmt::Display for LanguageCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.full())
    }
}
