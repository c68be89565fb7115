use anyhow::{Context, Result};
use folio_core::{
    Post, RawPost, ReferenceTime, Site, apply_env_overrides, filter_posts, parse_site_toml, source,
};
use folio_generator::RenderOptions;
use std::path::Path;

pub const SITE_TOML: &str = "site.toml";

/// Everything a command needs after loading a site directory
pub struct LoadedSite {
    pub site: Site,
    pub raw_posts: Vec<RawPost>,
    pub posts: Vec<Post>,
    pub reference: ReferenceTime,
}

impl LoadedSite {
    pub fn render_options(&self, preview: bool) -> RenderOptions {
        RenderOptions::new(preview, &self.reference)
    }
}

/// Parse `site.toml` and apply environment overrides
pub fn load_config(path: &Path) -> Result<Site> {
    if !path.exists() {
        anyhow::bail!(
            "Site directory does not exist: {}\nRun 'folio init {}' first",
            path.display(),
            path.display()
        );
    }

    let config_path = path.join(SITE_TOML);
    if !config_path.exists() {
        anyhow::bail!(
            "site.toml not found in {}\nRun 'folio init {}' first",
            path.display(),
            path.display()
        );
    }

    let mut site = parse_site_toml(&config_path).context("Failed to parse site.toml")?;
    apply_env_overrides(&mut site, |key| std::env::var(key).ok());
    Ok(site)
}

/// Fetch raw records from the configured source
pub async fn fetch_raw_posts(site: &Site, path: &Path) -> Result<Vec<RawPost>> {
    let source = source::from_config(&site.source, path, |key| std::env::var(key).ok())
        .context("Failed to configure post source")?;
    source
        .fetch()
        .await
        .with_context(|| format!("Failed to fetch posts from {}", source.describe()))
}

/// Load config, fetch posts and filter them against the current date
pub async fn load(path: &Path) -> Result<LoadedSite> {
    let site = load_config(path)?;
    let raw_posts = fetch_raw_posts(&site, path).await?;
    let reference = ReferenceTime::current(site.settings.timezone);
    let posts = filter_posts(&raw_posts, &site.filter, &reference);

    Ok(LoadedSite {
        site,
        raw_posts,
        posts,
        reference,
    })
}
