//! Configuration parsing and validation.
//!
//! A website is configured by a directory holding `config.yml` for the main
//! language variant and one `config.<lang>.yml` per secondary variant. Every
//! file is deserialized into the raw `ConfigFile` shape first and then
//! validated into a [`WebsiteConfig`].

use crate::assets::{load_shared_files, SharedFile};
use crate::l10n::{Key, Localizer};
use ddpub_types::{Builtin, LanguageCode, NoteId, Tag};
use regex::Regex;
use serde::Deserialize;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;

/// Name of the main variant's config file inside the config directory.
pub const MAIN_CONFIG_FILE: &str = "config.yml";

const DEFAULT_FEED_PREFIX: &str = "feed";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file '{path}': {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file '{path}': {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("Failed to parse YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Could not compile regular expression '{pattern}': {source}")]
    Regex {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("Language '{0}' not supported")]
    UnsupportedLanguage(String),

    #[error("Mismatched language in config: loaded for {expected}, declares {found}")]
    LanguageMismatch {
        expected: LanguageCode,
        found: LanguageCode,
    },

    #[error("Language {0} is configured more than once")]
    DuplicateLanguage(LanguageCode),

    #[error("Missing strings for language {0}")]
    MissingStrings(LanguageCode),

    #[error("Invalid strings for language {language}: {source}")]
    Strings {
        language: LanguageCode,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("Feed tag cannot be empty")]
    EmptyFeedTag,

    #[error("Feed URL prefix '{0}' must be a single path segment")]
    InvalidFeedPrefix(String),

    #[error("Tag in tags list cannot be empty")]
    EmptyTag,

    #[error("Tag '{0}' already published")]
    DuplicateTag(Tag),

    #[error("Slug '{slug}' of tag '{tag}' must be a single path segment")]
    InvalidTagSlug { tag: Tag, slug: String },

    #[error("Invalid note ID '{id}' in {context}")]
    InvalidNoteId { id: String, context: String },

    #[error("Menu entry title cannot be empty")]
    EmptyMenuTitle,

    #[error("Menu entry '{0}' must have exactly one of builtin, id, tag or url")]
    AmbiguousMenuEntry(String),

    #[error("Unknown builtin '{builtin}' in menu entry '{title}'")]
    UnknownBuiltin { builtin: String, title: String },

    #[error("Tag '{tag}' in menu entry '{title}' must be published in tags")]
    MenuTagNotPublished { tag: Tag, title: String },
}

// ---- Raw file shape ----

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigFile {
    #[serde(default)]
    domain: String,

    #[serde(default)]
    https: bool,

    #[serde(default)]
    title: String,

    #[serde(default)]
    twitter: Option<String>,

    #[serde(default)]
    language: LanguageSection,

    notes: NotesSection,

    #[serde(default)]
    homepage: HomepageSection,

    feed: FeedSection,

    #[serde(default)]
    pages: PagesSection,

    #[serde(default)]
    tags: Vec<TagSection>,

    #[serde(default)]
    menu: Vec<MenuSection>,

    #[serde(default)]
    segments: Segments,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct LanguageSection {
    #[serde(default)]
    code: Option<String>,

    #[serde(default)]
    use_short: bool,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
struct NotesSection {
    id_format: String,
    id_link_format: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct HomepageSection {
    #[serde(default)]
    id: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
struct FeedSection {
    #[serde(default)]
    tag: String,

    #[serde(default)]
    id: Option<String>,

    #[serde(default)]
    url_prefix: Option<String>,

    #[serde(default)]
    title: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct PagesSection {
    #[serde(default)]
    tag: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
struct TagSection {
    #[serde(default)]
    tag: String,

    #[serde(default)]
    id: Option<String>,

    #[serde(default)]
    slug: Option<String>,

    #[serde(default)]
    title: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
struct MenuSection {
    #[serde(default)]
    title: String,

    #[serde(default)]
    builtin: Option<String>,

    #[serde(default)]
    id: Option<String>,

    #[serde(default)]
    tag: Option<String>,

    #[serde(default)]
    url: Option<String>,
}

/// Raw HTML snippets spliced into every page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Segments {
    #[serde(default)]
    pub head_suffix: String,

    #[serde(default)]
    pub note_suffix: String,

    #[serde(default)]
    pub footer_prefix: String,
}

// ---- Validated configuration ----

/// Note id matching rules compiled from `notes.id_format` and
/// `notes.id_link_format`.
#[derive(Debug, Clone)]
pub struct NoteIdRules {
    id_format: Regex,
    id_link_format: Regex,
}

impl NoteIdRules {
    pub fn new(id_format: &str, id_link_format: &str) -> Result<Self, ConfigError> {
        Ok(Self {
            id_format: compile(id_format)?,
            id_link_format: compile(id_link_format)?,
        })
    }

    /// A note id is valid when the leftmost match of the id format is the
    /// whole string.
    pub fn is_valid(&self, test: &str) -> bool {
        !test.is_empty()
            && self
                .id_format
                .find(test)
                .is_some_and(|m| m.as_str() == test)
    }

    /// Extract a note id from a filename like `202301011200 Title.md`.
    pub fn id_from_file(&self, filename: &str) -> Option<NoteId> {
        let candidate = self.id_format.find(filename)?.as_str();
        self.is_valid(candidate).then(|| NoteId::from(candidate))
    }

    /// Extract a note id from a link destination using the first capture
    /// group of the link format.
    pub fn id_from_link(&self, link: &str) -> Option<NoteId> {
        let candidate = self.id_link_format.captures(link)?.get(1)?.as_str();
        self.is_valid(candidate).then(|| NoteId::from(candidate))
    }
}

fn compile(pattern: &str) -> Result<Regex, ConfigError> {
    Regex::new(pattern).map_err(|source| ConfigError::Regex {
        pattern: pattern.to_string(),
        source,
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Language {
    pub code: LanguageCode,
    /// If true, secondary variants live under `/en/` rather than `/en-US/`.
    pub use_short: bool,
}

impl Language {
    pub fn url_segment(&self) -> &'static str {
        if self.use_short {
            self.code.short()
        } else {
            self.code.full()
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.url_segment())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Homepage {
    Feed,
    Note(NoteId),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Feed {
    pub tag: Tag,
    pub url_prefix: String,
    pub id: Option<NoteId>,
    pub title: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Pages {
    pub tag: Option<Tag>,
}

/// A tag listed in the `tags` section, and therefore published.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishedTag {
    pub tag: Tag,
    pub id: Option<NoteId>,
    pub slug: String,
    pub title: String,
}

/// A navigation link. Each entry is exactly one of these kinds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MenuEntry {
    Builtin { title: String, builtin: Builtin },
    Note { title: String, id: NoteId },
    Tag { title: String, tag: Tag },
    Url { title: String, url: String },
}

impl MenuEntry {
    pub fn title(&self) -> &str {
        match self {
            MenuEntry::Builtin { title, .. }
            | MenuEntry::Note { title, .. }
            | MenuEntry::Tag { title, .. }
            | MenuEntry::Url { title, .. } => title,
        }
    }
}

/// Configuration of one language variant of the website.
#[derive(Debug, Clone)]
pub struct WebsiteConfig {
    /// True for every variant except the main one.
    pub is_child: bool,
    pub domain: String,
    pub https: bool,
    pub title: String,
    pub twitter: Option<String>,
    pub language: Language,
    pub rules: NoteIdRules,
    pub homepage: Homepage,
    pub feed: Feed,
    pub pages: Pages,
    /// Published tags in configuration order.
    pub tags: Vec<PublishedTag>,
    pub menu: Vec<MenuEntry>,
    pub segments: Segments,
    localizer: Localizer,
}

impl WebsiteConfig {
    /// Load the main variant from a YAML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = read_config_file(path)?;
        Self::validate(raw, None)
    }

    /// Load a secondary variant that must declare `language`.
    pub fn from_file_for<P: AsRef<Path>>(
        path: P,
        language: LanguageCode,
        main: &WebsiteConfig,
    ) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = read_config_file(path)?;
        Self::validate(raw, Some((language, main)))
    }

    /// Parse the main variant from YAML text.
    pub fn from_yaml(contents: &str) -> Result<Self, ConfigError> {
        let raw: ConfigFile = serde_yaml::from_str(contents)?;
        Self::validate(raw, None)
    }

    /// Parse a secondary variant from YAML text.
    pub fn from_yaml_for(
        contents: &str,
        language: LanguageCode,
        main: &WebsiteConfig,
    ) -> Result<Self, ConfigError> {
        let raw: ConfigFile = serde_yaml::from_str(contents)?;
        Self::validate(raw, Some((language, main)))
    }

    fn validate(
        cfg: ConfigFile,
        secondary: Option<(LanguageCode, &WebsiteConfig)>,
    ) -> Result<Self, ConfigError> {
        let language = parse_language(&cfg.language)?;

        // Domain and scheme always come from the main variant.
        let (is_child, domain, https) = match secondary {
            Some((expected, main)) => {
                if language.code != expected {
                    return Err(ConfigError::LanguageMismatch {
                        expected,
                        found: language.code,
                    });
                }
                (true, main.domain.clone(), main.https)
            }
            None => (false, cfg.domain.clone(), cfg.https),
        };

        let localizer = Localizer::new(language.code)?;
        let rules = NoteIdRules::new(&cfg.notes.id_format, &cfg.notes.id_link_format)?;

        let homepage = match non_empty(cfg.homepage.id) {
            Some(id) => Homepage::Note(valid_note_id(&rules, id, "homepage")?),
            None => Homepage::Feed,
        };

        let tags = load_tags(cfg.tags, &rules)?;

        let mut menu = Vec::with_capacity(cfg.menu.len());
        for m in cfg.menu {
            menu.push(parse_menu(m, &rules, &tags)?);
        }

        let feed = parse_feed(cfg.feed, localizer.str(Key::FeedTitle), &rules)?;

        let pages = Pages {
            tag: non_empty(cfg.pages.tag),
        };

        Ok(Self {
            is_child,
            domain,
            https,
            title: cfg.title,
            twitter: non_empty(cfg.twitter),
            language,
            rules,
            homepage,
            feed,
            pages,
            tags,
            menu,
            segments: cfg.segments,
            localizer,
        })
    }

    /// Look up a published tag by its tag string.
    pub fn tag(&self, tag: &str) -> Option<&PublishedTag> {
        self.tags.iter().find(|t| t.tag == tag)
    }

    pub fn is_tag_published(&self, tag: &str) -> bool {
        self.tag(tag).is_some()
    }

    /// Localized string for this variant's language.
    pub fn str(&self, key: Key) -> &str {
        self.localizer.str(key)
    }

    pub fn localizer(&self) -> &Localizer {
        &self.localizer
    }
}

fn read_config_file(path: &Path) -> Result<ConfigFile, ConfigError> {
    let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    serde_yaml::from_str(&contents).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn valid_note_id(rules: &NoteIdRules, id: String, context: &str) -> Result<NoteId, ConfigError> {
    if rules.is_valid(&id) {
        Ok(NoteId(id))
    } else {
        Err(ConfigError::InvalidNoteId {
            id,
            context: context.to_string(),
        })
    }
}

fn is_single_segment(s: &str) -> bool {
    !s.is_empty() && s != "." && s != ".." && !s.contains('/')
}

fn parse_language(section: &LanguageSection) -> Result<Language, ConfigError> {
    let code = match section.code.as_deref().map(str::trim) {
        None | Some("") => LanguageCode::default(),
        Some(full) => LanguageCode::from_full(full)
            .ok_or_else(|| ConfigError::UnsupportedLanguage(full.to_string()))?,
    };
    Ok(Language {
        code,
        use_short: section.use_short,
    })
}

fn parse_feed(
    f: FeedSection,
    default_title: &str,
    rules: &NoteIdRules,
) -> Result<Feed, ConfigError> {
    if f.tag.is_empty() {
        return Err(ConfigError::EmptyFeedTag);
    }

    let url_prefix = non_empty(f.url_prefix).unwrap_or_else(|| DEFAULT_FEED_PREFIX.to_string());
    if !is_single_segment(&url_prefix) {
        return Err(ConfigError::InvalidFeedPrefix(url_prefix));
    }

    let id = match non_empty(f.id) {
        Some(id) => Some(valid_note_id(rules, id, "feed")?),
        None => None,
    };

    Ok(Feed {
        tag: f.tag,
        url_prefix,
        id,
        title: non_empty(f.title).unwrap_or_else(|| default_title.to_string()),
    })
}

fn parse_tag(t: TagSection, rules: &NoteIdRules) -> Result<PublishedTag, ConfigError> {
    if t.tag.is_empty() {
        return Err(ConfigError::EmptyTag);
    }

    // Slug defaults to the tag itself, title to the slug.
    let slug = non_empty(t.slug).unwrap_or_else(|| t.tag.clone());
    if !is_single_segment(&slug) {
        return Err(ConfigError::InvalidTagSlug { tag: t.tag, slug });
    }
    let title = non_empty(t.title).unwrap_or_else(|| slug.clone());

    let id = match non_empty(t.id) {
        Some(id) => Some(valid_note_id(rules, id, &format!("tag '{}'", t.tag))?),
        None => None,
    };

    Ok(PublishedTag {
        tag: t.tag,
        id,
        slug,
        title,
    })
}

fn load_tags(raw: Vec<TagSection>, rules: &NoteIdRules) -> Result<Vec<PublishedTag>, ConfigError> {
    let mut tags: Vec<PublishedTag> = Vec::with_capacity(raw.len());
    for t in raw {
        let tag = parse_tag(t, rules)?;
        if tags.iter().any(|existing| existing.tag == tag.tag) {
            return Err(ConfigError::DuplicateTag(tag.tag));
        }
        tags.push(tag);
    }
    Ok(tags)
}

fn parse_menu(
    m: MenuSection,
    rules: &NoteIdRules,
    tags: &[PublishedTag],
) -> Result<MenuEntry, ConfigError> {
    if m.title.trim().is_empty() {
        return Err(ConfigError::EmptyMenuTitle);
    }
    let title = m.title;

    let builtin = non_empty(m.builtin);
    let id = non_empty(m.id);
    let tag = non_empty(m.tag);
    let url = non_empty(m.url);

    let filled = [builtin.is_some(), id.is_some(), tag.is_some(), url.is_some()]
        .into_iter()
        .filter(|f| *f)
        .count();
    if filled != 1 {
        return Err(ConfigError::AmbiguousMenuEntry(title));
    }

    if let Some(name) = builtin {
        let builtin = Builtin::from_name(&name).ok_or_else(|| ConfigError::UnknownBuiltin {
            builtin: name.clone(),
            title: title.clone(),
        })?;
        return Ok(MenuEntry::Builtin { title, builtin });
    }

    if let Some(id) = id {
        // Whether the note is actually published is checked by the store.
        let id = valid_note_id(rules, id, &format!("menu entry '{title}'"))?;
        return Ok(MenuEntry::Note { title, id });
    }

    if let Some(tag) = tag {
        if !tags.iter().any(|t| t.tag == tag) {
            return Err(ConfigError::MenuTagNotPublished { tag, title });
        }
        return Ok(MenuEntry::Tag { title, tag });
    }

    match url {
        Some(url) => Ok(MenuEntry::Url { title, url }),
        None => Err(ConfigError::AmbiguousMenuEntry(title)),
    }
}

/// All language variants of one website.
#[derive(Debug, Clone)]
pub struct Website {
    pub main: Arc<WebsiteConfig>,
    pub secondaries: Vec<Arc<WebsiteConfig>>,
    /// Site-wide files served by the main variant only.
    pub shared_files: Vec<SharedFile>,
}

impl Website {
    /// Load `config.yml` plus every `config.<lang>.yml` from `config_dir`.
    pub fn load<P: AsRef<Path>>(config_dir: P) -> Result<Self, ConfigError> {
        let config_dir = config_dir.as_ref();
        let main_path = config_dir.join(MAIN_CONFIG_FILE);
        tracing::info!("Loading config from {:?}", main_path);
        let main = Arc::new(WebsiteConfig::from_file(&main_path)?);

        let mut secondaries: Vec<Arc<WebsiteConfig>> = Vec::new();
        for (language, path) in secondary_config_files(config_dir)? {
            if language == main.language.code
                || secondaries.iter().any(|s| s.language.code == language)
            {
                return Err(ConfigError::DuplicateLanguage(language));
            }
            tracing::info!("Loading {} config from {:?}", language, path);
            let cfg = WebsiteConfig::from_file_for(&path, language, &main)?;
            secondaries.push(Arc::new(cfg));
        }

        let shared_files = load_shared_files(config_dir)?;

        tracing::info!(
            "Loaded website '{}' with {} language variant(s)",
            main.title,
            1 + secondaries.len()
        );

        Ok(Self {
            main,
            secondaries,
            shared_files,
        })
    }

    /// Main variant first, then secondaries in load order.
    pub fn variants(&self) -> impl Iterator<Item = &Arc<WebsiteConfig>> {
        std::iter::once(&self.main).chain(self.secondaries.iter())
    }
}

/// Find `config.<lang>.yml` files, sorted by file name.
fn secondary_config_files(config_dir: &Path) -> Result<Vec<(LanguageCode, PathBuf)>, ConfigError> {
    let entries = std::fs::read_dir(config_dir).map_err(|source| ConfigError::Read {
        path: config_dir.to_path_buf(),
        source,
    })?;

    let mut found = Vec::new();
    for entry in entries.filter_map(|e| e.ok()) {
        let name = entry.file_name().to_string_lossy().to_string();
        let Some(lang) = name
            .strip_prefix("config.")
            .and_then(|rest| rest.strip_suffix(".yml"))
        else {
            continue;
        };
        let language = LanguageCode::from_full(lang)
            .ok_or_else(|| ConfigError::UnsupportedLanguage(lang.to_string()))?;
        found.push((name, language, entry.path()));
    }
    found.sort_by(|a, b| a.0.cmp(&b.0));

    Ok(found
        .into_iter()
        .map(|(_, language, path)| (language, path))
        .collect())
}
