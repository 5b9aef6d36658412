//! Localized interface strings.
//!
//! String tables are embedded at compile time, one `strings.<lang>.yml` file
//! per supported language.

use crate::config::ConfigError;
use chrono::NaiveDate;
use ddpub_types::LanguageCode;
use include_dir::{include_dir, Dir};
use serde::Deserialize;

static STRINGS: Dir<'_> = include_dir!("$CARGO_MANIFEST_DIR/l10n");

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    FeedTitle,
    TagsTitle,
    SearchTitle,
    SearchPlaceholder,
    SearchButton,
    FooterPoweredBy,
    /// `chrono` format string for dates shown on pages.
    DateFormat,
    /// Contains a `{date}` placeholder.
    DatePublished,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
struct Strings {
    feed_title: String,
    tags_title: String,
    search_title: String,
    search_placeholder: String,
    search_button: String,
    footer_powered_by: String,
    date_format: String,
    date_published: String,
}

#[derive(Debug, Clone)]
pub struct Localizer {
    language: LanguageCode,
    strings: Strings,
}

impl Localizer {
    pub fn new(language: LanguageCode) -> Result<Self, ConfigError> {
        let name = format!("strings.{}.yml", language.full());
        let contents = STRINGS
            .get_file(&name)
            .and_then(|f| f.contents_utf8())
            .ok_or(ConfigError::MissingStrings(language))?;
        let strings = serde_yaml::from_str(contents)
            .map_err(|source| ConfigError::Strings { language, source })?;
        Ok(Self { language, strings })
    }

    pub fn language(&self) -> LanguageCode {
        self.language
    }

    pub fn str(&self, key: Key) -> &str {
        let s = &self.strings;
        match key {
            Key::FeedTitle => &s.feed_title,
            Key::TagsTitle => &s.tags_title,
            Key::SearchTitle => &s.search_title,
            Key::SearchPlaceholder => &s.search_placeholder,
            Key::SearchButton => &s.search_button,
            Key::FooterPoweredBy => &s.footer_powered_by,
            Key::DateFormat => &s.date_format,
            Key::DatePublished => &s.date_published,
        }
    }

    pub fn format_date(&self, date: NaiveDate) -> String {
        date.format(self.str(Key::DateFormat)).to_string()
    }

    /// "Published <date>" in this language.
    pub fn published_on(&self, date: NaiveDate) -> String {
        self.str(Key::DatePublished)
            .replace("{date}", &self.format_date(date))
    }
}
