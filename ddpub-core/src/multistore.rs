//! One store per language variant of a website.

use crate::config::Website;
use crate::store::{Store, StoreError};
use std::path::Path;

#[derive(Debug)]
pub struct MultiStore {
    pub main: Store,
    pub secondaries: Vec<Store>,
}

impl MultiStore {
    /// Build a store for every variant from the same notes directory.
    pub fn new(website: &Website, notes_dir: &Path) -> Result<Self, StoreError> {
        let main = Store::new(website.main.clone(), notes_dir)?;
        let secondaries = website
            .secondaries
            .iter()
            .map(|cfg| Store::new(cfg.clone(), notes_dir))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { main, secondaries })
    }

    /// Main store first, then secondaries in configuration order.
    pub fn stores(&self) -> impl Iterator<Item = &Store> {
        std::iter::once(&self.main).chain(self.secondaries.iter())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::tests::MINIMAL;
    use ddpub_types::LanguageCode;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_store_per_variant() {
        let config_dir = tempdir().unwrap();
        fs::write(config_dir.path().join("config.yml"), MINIMAL).unwrap();
        fs::write(
            config_dir.path().join("config.ru-RU.yml"),
            format!("{MINIMAL}language:\n  code: ru-RU\n").replace("tag: blog", "tag: blog-ru"),
        )
        .unwrap();

        let notes_dir = tempdir().unwrap();
        fs::write(notes_dir.path().join("202301011200.md"), "# En\nTags: #blog\n\nHi\n").unwrap();
        fs::write(notes_dir.path().join("202301011300.md"), "# Ru\nTags: #blog-ru\n\nПривет\n").unwrap();

        let website = Website::load(config_dir.path()).unwrap();
        let stores = MultiStore::new(&website, notes_dir.path()).unwrap();

        assert_eq!(stores.stores().count(), 2);
        assert!(stores.main.content("202301011200").is_some());
        assert!(stores.main.content("202301011300").is_none());

        let ru = &stores.secondaries[0];
        assert_eq!(ru.config().language.code, LanguageCode::RuRu);
        assert_eq!(ru.public_url("202301011300").as_deref(), Some("/ru-RU/feed/202301011300/"));
    }
}
