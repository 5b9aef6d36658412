//! Site-wide static files served at the root of the main variant.

use crate::config::ConfigError;
use include_dir::{include_dir, Dir};
use std::path::Path;

static DEFAULT_ASSETS: Dir<'_> = include_dir!("$CARGO_MANIFEST_DIR/assets");

/// Shared files with an embedded default, and their content types.
const SHARED: &[(&str, &str)] = &[
    ("theme.css", "text/css; charset=utf-8"),
    ("favicon.svg", "image/svg+xml"),
];

/// Shared files served only when present in the config directory.
const OPTIONAL: &[(&str, &str)] = &[(OG_IMAGE, "image/jpeg")];

/// Open Graph preview image.
pub const OG_IMAGE: &str = "og.jpg";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SharedFile {
    pub filename: &'static str,
    pub content: Vec<u8>,
    pub content_type: &'static str,
}

/// Load shared files, preferring a file with the same name in `config_dir`
/// over the embedded default.
pub fn load_shared_files(config_dir: &Path) -> Result<Vec<SharedFile>, ConfigError> {
    let mut files = Vec::with_capacity(SHARED.len() + OPTIONAL.len());
    for &(filename, content_type) in SHARED {
        let content = match read_override(config_dir, filename)? {
            Some(content) => content,
            None => DEFAULT_ASSETS
                .get_file(filename)
                .map(|f| f.contents().to_vec())
                .unwrap_or_default(),
        };
        files.push(SharedFile {
            filename,
            content,
            content_type,
        });
    }

    for &(filename, content_type) in OPTIONAL {
        if let Some(content) = read_override(config_dir, filename)? {
            files.push(SharedFile {
                filename,
                content,
                content_type,
            });
        }
    }
    Ok(files)
}

fn read_override(config_dir: &Path, filename: &str) -> Result<Option<Vec<u8>>, ConfigError> {
    let path = config_dir.join(filename);
    if !path.is_file() {
        return Ok(None);
    }
    tracing::debug!("Using {:?} for shared file {}", path, filename);
    std::fs::read(&path)
        .map(Some)
        .map_err(|source| ConfigError::Read { path, source })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_embedded_defaults() {
        let dir = tempdir().unwrap();
        let files = load_shared_files(dir.path()).unwrap();

        assert_eq!(files.len(), 2);
        assert_eq!(files[0].filename, "theme.css");
        assert!(!files[0].content.is_empty());
        assert_eq!(files[1].content_type, "image/svg+xml");
    }

    #[test]
    fn test_override_from_config_dir() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("theme.css"), "body{}").unwrap();

        let files = load_shared_files(dir.path()).unwrap();
        assert_eq!(files[0].content, b"body{}");
    }

    #[test]
    fn test_og_image_only_when_present() {
        let dir = tempdir().unwrap();
        assert!(!load_shared_files(dir.path())
            .unwrap()
            .iter()
            .any(|f| f.filename == OG_IMAGE));

        std::fs::write(dir.path().join("og.jpg"), b"\xff\xd8\xff").unwrap();
        let files = load_shared_files(dir.path()).unwrap();
        assert_eq!(files.len(), 3);
        assert_eq!(files[2].filename, OG_IMAGE);
        assert_eq!(files[2].content_type, "image/jpeg");
    }
}
