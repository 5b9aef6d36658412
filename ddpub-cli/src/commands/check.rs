//! Check command implementation.

use anyhow::{Context, Result};
use ddpub_core::{MultiStore, Website};
use ddpub_render::{MultiRouter, RouteTable};
use std::path::Path;

/// Load every language variant and render all of its routes.
pub fn build_routes(config_dir: &Path, notes_dir: &Path) -> Result<RouteTable> {
    let website = Website::load(config_dir)
        .with_context(|| format!("Failed to load configuration from {:?}", config_dir))?;

    let stores = MultiStore::new(&website, notes_dir)
        .with_context(|| format!("Failed to load notes from {:?}", notes_dir))?;

    let router =
        MultiRouter::new(&stores, &website.shared_files).context("Failed to register routes")?;

    Ok(router.into_table())
}

/// Build the site without serving it.
pub fn check_site(config_dir: &Path, notes_dir: &Path) -> Result<()> {
    let routes = build_routes(config_dir, notes_dir)?;

    println!("Site OK: {} routes", routes.len());

    Ok(())
}
