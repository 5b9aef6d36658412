//! Note discovery and metadata header parsing.
//!
//! A note is a `.md` file directly inside the notes directory whose name
//! starts with a valid note id. Its metadata lives in leading header lines:
//!
//! ```text
//! # Title
//! Tags: #blog #rust
//! Slug: hello-world
//! Language: en
//! Date: 2023-01-01
//!
//! Body starts after the first blank line.
//! ```

use crate::config::NoteIdRules;
use chrono::{DateTime, NaiveDate, Utc};
use ddpub_types::{NoteId, Tag};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashMap;
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::{Path, PathBuf};
use thiserror::Error;
use walkdir::WalkDir;

static TITLE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^#\s+(.*)$").expect("valid title regex"));
static TAGS_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^Tags:\s*(.*)$").expect("valid tags regex"));
static SLUG_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^Slug:\s*(.*)$").expect("valid slug regex"));
static LANGUAGE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^Language:\s*(.*)$").expect("valid language regex"));
static DATE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^Date:\s*(.*)$").expect("valid date regex"));
static ONE_TAG_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"#(\S+)").expect("valid tag regex"));

#[derive(Error, Debug)]
pub enum ScanError {
    #[error("Could not read the notes directory '{path}': {source}")]
    NotesDir {
        path: PathBuf,
        #[source]
        source: walkdir::Error,
    },

    #[error("Could not read note '{path}': {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Metadata of one note, parsed from its header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Metadata {
    pub id: NoteId,
    /// File name inside the notes directory.
    pub filename: String,
    pub mod_time: DateTime<Utc>,
    /// Date from a parsable `Date:` line.
    pub explicit_date: Option<NaiveDate>,
    /// Explicit date at midnight UTC, or the modification time.
    pub date: DateTime<Utc>,
    pub title: String,
    pub slug: String,
    /// Tags without `#`, duplicates dropped, first-seen order.
    pub tags: Vec<Tag>,
    pub language: Option<String>,
    /// Position in the sorted directory listing.
    pub order: usize,
}

impl Metadata {
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }
}

/// Scanned notes keyed by id, iterable in scan order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Notes {
    by_id: HashMap<NoteId, Metadata>,
    order: Vec<NoteId>,
}

impl Notes {
    pub fn get(&self, id: &str) -> Option<&Metadata> {
        self.by_id.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.by_id.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Notes in scan order.
    pub fn iter(&self) -> impl Iterator<Item = &Metadata> {
        self.order.iter().filter_map(|id| self.by_id.get(id))
    }

    fn insert(&mut self, meta: Metadata) {
        if let Some(previous) = self.by_id.get(&meta.id) {
            tracing::warn!(
                "Note ID {} used by both '{}' and '{}', keeping the latter",
                meta.id,
                previous.filename,
                meta.filename
            );
            self.order.retain(|id| id != &meta.id);
        }
        self.order.push(meta.id.clone());
        self.by_id.insert(meta.id.clone(), meta);
    }
}

impl FromIterator<Metadata> for Notes {
    fn from_iter<I: IntoIterator<Item = Metadata>>(iter: I) -> Self {
        let mut notes = Notes::default();
        for meta in iter {
            notes.insert(meta);
        }
        notes
    }
}

pub struct NoteScanner<'a> {
    rules: &'a NoteIdRules,
}

impl<'a> NoteScanner<'a> {
    pub fn new(rules: &'a NoteIdRules) -> Self {
        Self { rules }
    }

    /// Scan `notes_dir` once. Notes that cannot be read are skipped with a
    /// warning; only an unreadable directory is an error.
    pub fn scan(&self, notes_dir: &Path) -> Result<Notes, ScanError> {
        let mut notes = Notes::default();

        let walker = WalkDir::new(notes_dir)
            .min_depth(1)
            .max_depth(1)
            .follow_links(true)
            .sort_by_file_name();

        for (order, entry) in walker.into_iter().enumerate() {
            let entry = match entry {
                Ok(entry) => entry,
                Err(err) if err.depth() == 0 => {
                    return Err(ScanError::NotesDir {
                        path: notes_dir.to_path_buf(),
                        source: err,
                    })
                }
                Err(err) => {
                    tracing::warn!("Skipping unreadable entry in notes directory: {}", err);
                    continue;
                }
            };

            if !entry.file_type().is_file() {
                continue;
            }

            let filename = entry.file_name().to_string_lossy().to_string();
            if !filename.ends_with(".md") {
                continue;
            }
            let Some(id) = self.rules.id_from_file(&filename) else {
                continue;
            };

            match read_metadata(id, &filename, entry.path(), order) {
                Ok(meta) => {
                    tracing::debug!("Scanned note {} '{}'", meta.id, meta.title);
                    notes.insert(meta);
                }
                Err(err) => tracing::warn!("{}", err),
            }
        }

        tracing::info!("Scanned {} notes in {:?}", notes.len(), notes_dir);
        Ok(notes)
    }
}

fn read_metadata(
    id: NoteId,
    filename: &str,
    path: &Path,
    order: usize,
) -> Result<Metadata, ScanError> {
    let read_err = |source| ScanError::Read {
        path: path.to_path_buf(),
        source,
    };

    let file = File::open(path).map_err(read_err)?;
    let mod_time = file
        .metadata()
        .and_then(|m| m.modified())
        .map(DateTime::<Utc>::from)
        .unwrap_or_else(|_| Utc::now());

    let header = parse_header(BufReader::new(file)).map_err(read_err)?;

    let date = header
        .date
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|d| d.and_utc())
        .unwrap_or(mod_time);

    Ok(Metadata {
        slug: header
            .slug
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| id.to_string()),
        id,
        filename: filename.to_string(),
        mod_time,
        explicit_date: header.date,
        date,
        title: header.title.unwrap_or_default(),
        tags: header.tags,
        language: header.language,
        order,
    })
}

#[derive(Debug, Default, PartialEq, Eq)]
struct Header {
    title: Option<String>,
    tags: Vec<Tag>,
    slug: Option<String>,
    language: Option<String>,
    date: Option<NaiveDate>,
}

/// Read header lines until the first line that is not metadata.
fn parse_header<R: BufRead>(mut reader: R) -> io::Result<Header> {
    let mut header = Header::default();
    let mut buf = Vec::new();

    loop {
        buf.clear();
        if reader.read_until(b'\n', &mut buf)? == 0 {
            break;
        }
        let line = String::from_utf8_lossy(&buf);
        let line = line.trim_end();

        if let Some(title) = first_capture(&TITLE_RE, line) {
            header.title = Some(title.to_string());
        } else if let Some(tags) = first_capture(&TAGS_RE, line) {
            header.tags = tags_from_line(tags);
        } else if let Some(slug) = first_capture(&SLUG_RE, line) {
            header.slug = Some(slug.to_string());
        } else if let Some(language) = first_capture(&LANGUAGE_RE, line) {
            header.language = Some(language.to_string()).filter(|l| !l.is_empty());
        } else if let Some(date) = first_capture(&DATE_RE, line) {
            header.date = NaiveDate::parse_from_str(date, "%Y-%m-%d").ok();
        } else {
            break;
        }
    }

    Ok(header)
}

fn first_capture<'t>(re: &Regex, line: &'t str) -> Option<&'t str> {
    re.captures(line)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str())
}

fn tags_from_line(line: &str) -> Vec<Tag> {
    let mut tags: Vec<Tag> = Vec::new();
    for cap in ONE_TAG_RE.captures_iter(line) {
        let tag = &cap[1];
        if !tags.iter().any(|t| t == tag) {
            tags.push(tag.to_string());
        }
    }
    tags
}

/// Read a note body: everything after the first blank line.
pub fn read_body(path: &Path) -> io::Result<String> {
    let bytes = std::fs::read(path)?;
    Ok(body_from_text(&String::from_utf8_lossy(&bytes)))
}

fn body_from_text(text: &str) -> String {
    let mut body = String::new();
    let mut in_body = false;
    for line in text.lines() {
        if in_body {
            body.push_str(line);
            body.push('\n');
        } else if line.is_empty() {
            in_body = true;
        }
    }
    body
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    /// Metadata for an in-memory note dated now.
    pub(crate) fn metadata(id: &str, order: usize, tags: &[&str]) -> Metadata {
        let now = Utc::now();
        Metadata {
            id: NoteId::new(id),
            filename: format!("{id}.md"),
            mod_time: now,
            explicit_date: None,
            date: now,
            title: String::new(),
            slug: id.to_string(),
            tags: tags.iter().map(|t| t.to_string()).collect(),
            language: None,
            order,
        }
    }

    fn rules() -> NoteIdRules {
        NoteIdRules::new(r"\d{12}", r"(\d{12})").unwrap()
    }

    #[test]
    fn test_parse_full_header() {
        let text = "# Hello world  \nTags: #blog #rust #blog\nSlug: hello\nLanguage: en\nDate: 2023-01-02\n\nBody\n";
        let header = parse_header(text.as_bytes()).unwrap();

        assert_eq!(header.title.as_deref(), Some("Hello world"));
        assert_eq!(header.tags, vec!["blog".to_string(), "rust".to_string()]);
        assert_eq!(header.slug.as_deref(), Some("hello"));
        assert_eq!(header.language.as_deref(), Some("en"));
        assert_eq!(header.date, NaiveDate::from_ymd_opt(2023, 1, 2));
    }

    #[test]
    fn test_header_stops_at_first_non_metadata_line() {
        let text = "# Title\nSome text\nTags: #late\n";
        let header = parse_header(text.as_bytes()).unwrap();

        assert_eq!(header.title.as_deref(), Some("Title"));
        assert!(header.tags.is_empty());
    }

    #[test]
    fn test_unparsable_date_is_dropped() {
        let header = parse_header("Date: someday\n".as_bytes()).unwrap();
        assert_eq!(header.date, None);
    }

    #[test]
    fn test_tags_are_case_sensitive() {
        assert_eq!(tags_from_line("#Rust #rust"), vec!["Rust", "rust"]);
    }

    #[test]
    fn test_body_after_first_blank_line() {
        assert_eq!(body_from_text("# T\n\nline 1\r\n\nline 2"), "line 1\n\nline 2\n");
        assert_eq!(body_from_text("# T\nno blank line"), "");
    }

    #[test]
    fn test_scan_selects_markdown_notes_with_valid_ids() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("202301011200 First.md"), "# First\n").unwrap();
        fs::write(dir.path().join("202301011300.md"), "# Second\n").unwrap();
        fs::write(dir.path().join("202301011400 Text.txt"), "# Not markdown\n").unwrap();
        fs::write(dir.path().join("README.md"), "# No id\n").unwrap();
        fs::create_dir(dir.path().join("202301011500 Dir.md")).unwrap();

        let rules = rules();
        let notes = NoteScanner::new(&rules).scan(dir.path()).unwrap();

        let ids: Vec<&str> = notes.iter().map(|m| m.id.as_str()).collect();
        assert_eq!(ids, vec!["202301011200", "202301011300"]);
        assert_eq!(notes.get("202301011200").unwrap().filename, "202301011200 First.md");
    }

    #[test]
    fn test_blank_slug_defaults_to_id() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("202301011200.md"), "# T\nSlug: \n\nbody").unwrap();

        let rules = rules();
        let notes = NoteScanner::new(&rules).scan(dir.path()).unwrap();
        assert_eq!(notes.get("202301011200").unwrap().slug, "202301011200");
    }

    #[test]
    fn test_missing_date_uses_mod_time() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("202301011200.md"), "# T\n").unwrap();
        fs::write(dir.path().join("202301011300.md"), "# T\nDate: 2020-05-06\n").unwrap();

        let rules = rules();
        let notes = NoteScanner::new(&rules).scan(dir.path()).unwrap();

        let undated = notes.get("202301011200").unwrap();
        assert_eq!(undated.date, undated.mod_time);
        assert_eq!(undated.explicit_date, None);

        let dated = notes.get("202301011300").unwrap();
        assert_eq!(dated.date.to_rfc3339(), "2020-05-06T00:00:00+00:00");
    }

    #[test]
    fn test_scan_twice_is_identical() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("202301011200.md"), "# A\nTags: #x\n").unwrap();
        fs::write(dir.path().join("202301011300.md"), "# B\nTags: #y\n").unwrap();

        let rules = rules();
        let scanner = NoteScanner::new(&rules);
        assert_eq!(scanner.scan(dir.path()).unwrap(), scanner.scan(dir.path()).unwrap());
    }

    #[test]
    fn test_missing_notes_dir_fails() {
        let dir = tempdir().unwrap();
        let rules = rules();
        let result = NoteScanner::new(&rules).scan(&dir.path().join("missing"));
        assert!(matches!(result, Err(ScanError::NotesDir { .. })));
    }

    #[test]
    fn test_read_body() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("202301011200.md");
        fs::write(&path, "# T\n\nHello *world*\n").unwrap();
        assert_eq!(read_body(&path).unwrap(), "Hello *world*\n");
    }

    #[test]
    fn test_invalid_utf8_header_is_decoded_lossily() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("202301011200.md"), b"# Caf\xe9\nTags: #blog\n\nBody\n").unwrap();

        let rules = rules();
        let notes = NoteScanner::new(&rules).scan(dir.path()).unwrap();
        let meta = notes.get("202301011200").unwrap();

        assert_eq!(meta.title, "Caf\u{FFFD}");
        assert_eq!(meta.tags, vec!["blog".to_string()]);
        assert_eq!(read_body(&dir.path().join("202301011200.md")).unwrap(), "Body\n");
    }
}
