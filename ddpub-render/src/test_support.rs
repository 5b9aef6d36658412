use ddpub_core::{SharedFile, Store, WebsiteConfig};
use std::fs;
use std::sync::Arc;
use tempfile::{tempdir, TempDir};

pub const MAIN_CONFIG: &str = r#"
domain: example.com
https: true
title: Notes
notes:
  id_format: '\d{12}'
  id_link_format: '(\d{12})'
feed:
  tag: blog
"#;

pub struct TestSite {
    pub notes: TempDir,
    pub config: Arc<WebsiteConfig>,
    pub shared_files: Vec<SharedFile>,
}

impl TestSite {
    pub fn store(&self) -> Store {
        Store::new(self.config.clone(), self.notes.path()).unwrap()
    }
}

/// A main variant over a temporary notes directory holding `notes`.
pub fn site(yaml: &str, notes: &[(&str, &str)]) -> TestSite {
    let dir = tempdir().unwrap();
    for (name, content) in notes {
        fs::write(dir.path().join(name), content).unwrap();
    }
    let config_dir = tempdir().unwrap();
    TestSite {
        notes: dir,
        config: Arc::new(WebsiteConfig::from_yaml(yaml).unwrap()),
        shared_files: ddpub_core::assets::load_shared_files(config_dir.path()).unwrap(),
    }
}

/// Config and notes directories, with `configs` written to the former.
pub fn website(configs: &[(&str, String)]) -> (TempDir, TempDir) {
    let config_dir = tempdir().unwrap();
    for (name, content) in configs {
        fs::write(config_dir.path().join(name), content).unwrap();
    }
    (config_dir, tempdir().unwrap())
}
