//! File attachments referenced from notes.

use std::collections::BTreeMap;
use std::fs::File as FsFile;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

const SNIFF_LEN: usize = 512;
const OCTET_STREAM: &str = "application/octet-stream";

/// A file linked from a note and served under a content-addressed URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct File {
    /// Reference as written in the note.
    pub link: String,
    pub path: PathBuf,
    pub content_type: String,
    pub url: String,
}

/// Registered files keyed by public URL.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileRegistry {
    files: BTreeMap<String, File>,
}

impl FileRegistry {
    /// Register a file. A URL that is already registered keeps its entry.
    pub fn register(&mut self, file: File) -> &File {
        self.files.entry(file.url.clone()).or_insert(file)
    }

    pub fn get(&self, url: &str) -> Option<&File> {
        self.files.get(url)
    }

    pub fn iter(&self) -> impl Iterator<Item = &File> {
        self.files.values()
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

/// Detect a content type from the first bytes of `path`.
pub fn detect_content_type(path: &Path) -> io::Result<String> {
    let mut buf = Vec::with_capacity(SNIFF_LEN);
    FsFile::open(path)?
        .take(SNIFF_LEN as u64)
        .read_to_end(&mut buf)?;
    Ok(sniff(&buf).to_string())
}

fn sniff(data: &[u8]) -> &'static str {
    const SIGNATURES: &[(&[u8], &str)] = &[
        (b"\x89PNG\r\n\x1a\n", "image/png"),
        (b"\xff\xd8\xff", "image/jpeg"),
        (b"GIF87a", "image/gif"),
        (b"GIF89a", "image/gif"),
        (b"%PDF-", "application/pdf"),
        (b"PK\x03\x04", "application/zip"),
    ];

    for &(magic, content_type) in SIGNATURES {
        if data.starts_with(magic) {
            return content_type;
        }
    }

    if data.len() >= 12 && &data[..4] == b"RIFF" && &data[8..12] == b"WEBP" {
        return "image/webp";
    }

    let text = match std::str::from_utf8(data) {
        Ok(text) => text,
        // A multi-byte character may be cut at the sniff boundary.
        Err(e) if e.error_len().is_none() => {
            std::str::from_utf8(&data[..e.valid_up_to()]).unwrap_or_default()
        }
        Err(_) => return OCTET_STREAM,
    };
    if text.contains('\0') {
        return OCTET_STREAM;
    }

    let head = text.trim_start().to_ascii_lowercase();
    if head.starts_with("<svg") || (head.starts_with("<?xml") && head.contains("<svg")) {
        "image/svg+xml"
    } else if head.starts_with("<?xml") {
        "text/xml; charset=utf-8"
    } else if head.starts_with("<!doctype html") || head.starts_with("<html") {
        "text/html; charset=utf-8"
    } else {
        "text/plain; charset=utf-8"
    }
}
