use crate::date::{DEFAULT_TIMEZONE, parse_utc_offset};
use crate::error::{Error, Result};
use crate::filter::FilterPolicy;
use crate::types::*;
use serde::Deserialize;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

/// Default rebuild interval (42 hours)
const DEFAULT_REVALIDATE_SECS: u64 = 21600 * 7;

/// Raw TOML configuration structure
/// This matches the site.toml file structure exactly
#[derive(Debug, Deserialize)]
struct RawConfig {
    profile: Profile,
    blog: BlogConfig,
    site: RawSiteSettings,
    source: RawSource,
    #[serde(default)]
    filter: Option<FilterPolicy>,
    #[serde(default)]
    project: Vec<Project>,
    #[serde(default)]
    link: Vec<NavLink>,
    #[serde(default)]
    category: Vec<Category>,
    #[serde(default)]
    plugins: Plugins,
}

#[derive(Debug, Deserialize)]
struct RawSiteSettings {
    link: String,
    since: Option<i32>,
    #[serde(default = "default_lang")]
    lang: String,
    og_image_generate_url: Option<String>,
    revalidate_secs: Option<u64>,
    timezone: Option<String>, // Parse as FixedOffset
}

#[derive(Debug, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
enum RawSource {
    File {
        path: String, // Convert to PathBuf
    },
    Http {
        url: String,
        token_env: Option<String>,
    },
}

fn default_lang() -> String {
    "en-US".to_string()
}

/// Parse site.toml from a file path
pub fn parse_site_toml<P: AsRef<Path>>(path: P) -> Result<Site> {
    let content = fs::read_to_string(path)?;
    parse_site_toml_str(&content)
}

/// Parse site.toml from a string (useful for testing)
pub fn parse_site_toml_str(content: &str) -> Result<Site> {
    let raw: RawConfig = toml::from_str(content)?;

    let timezone_str = raw.site.timezone.as_deref().unwrap_or(DEFAULT_TIMEZONE);
    let timezone = parse_utc_offset(timezone_str).ok_or_else(|| {
        Error::ConfigParse(format!(
            "Invalid site.timezone '{}': expected a UTC offset like +05:30",
            timezone_str
        ))
    })?;

    let revalidate_secs = raw.site.revalidate_secs.unwrap_or(DEFAULT_REVALIDATE_SECS);
    if revalidate_secs == 0 {
        return Err(Error::ConfigParse(
            "site.revalidate_secs must be greater than zero".to_string(),
        ));
    }

    if raw.site.link.trim().is_empty() {
        return Err(Error::ConfigParse("site.link must not be empty".to_string()));
    }

    let settings = SiteSettings {
        link: raw.site.link.trim_end_matches('/').to_string(),
        since: raw.site.since,
        lang: raw.site.lang,
        og_image_generate_url: raw.site.og_image_generate_url,
        revalidate_secs,
        timezone,
    };

    let source = match raw.source {
        RawSource::File { path } => SourceConfig::File {
            path: validate_path(&path, "source.path")?,
        },
        RawSource::Http { url, token_env } => {
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                return Err(Error::ConfigParse(format!(
                    "source.url must be an http(s) URL: '{}'",
                    url
                )));
            }
            SourceConfig::Http { url, token_env }
        }
    };

    let filter = raw.filter.unwrap_or_default();
    if filter.accept_status.is_empty() || filter.accept_type.is_empty() {
        return Err(Error::ConfigParse(
            "filter.accept_status and filter.accept_type must not be empty".to_string(),
        ));
    }

    validate_categories(&raw.category)?;

    Ok(Site {
        profile: raw.profile,
        blog: raw.blog,
        settings,
        source,
        filter,
        projects: raw.project,
        links: raw.link,
        categories: raw.category,
        plugins: raw.plugins,
    })
}

/// Apply environment overrides for secrets that should not live in site.toml.
///
/// `lookup` is usually `|k| std::env::var(k).ok()`; tests pass a map.
pub fn apply_env_overrides<F>(site: &mut Site, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

    if let Some(id) = get("FOLIO_GA_MEASUREMENT_ID") {
        site.plugins.google_analytics.measurement_id = id;
    }
    if let Some(token) = get("FOLIO_GOOGLE_SITE_VERIFICATION") {
        site.plugins.google_search_console.site_verification = token;
    }
    if let Some(token) = get("FOLIO_NAVER_SITE_VERIFICATION") {
        site.plugins.naver_search_advisor.site_verification = token;
    }
    if let Some(repo) = get("FOLIO_UTTERANCES_REPO") {
        site.plugins.utterances.repo = repo;
    }
    if let Some(link) = get("FOLIO_SITE_URL") {
        site.settings.link = link.trim_end_matches('/').to_string();
    }
}

/// Category and child slugs must be non-empty, URL-safe and unique
fn validate_categories(categories: &[Category]) -> Result<()> {
    let mut seen = HashSet::new();

    for category in categories {
        validate_slug(&category.slug, "category.slug")?;
        if !seen.insert(category.slug.to_lowercase()) {
            return Err(Error::ConfigParse(format!(
                "Duplicate category slug '{}'",
                category.slug
            )));
        }

        let mut children = HashSet::new();
        for child in &category.children {
            validate_slug(&child.slug, "category.children.slug")?;
            if !children.insert(child.slug.to_lowercase()) {
                return Err(Error::ConfigParse(format!(
                    "Duplicate child slug '{}' in category '{}'",
                    child.slug, category.slug
                )));
            }
        }
    }

    Ok(())
}

fn validate_slug(slug: &str, field_name: &str) -> Result<()> {
    if slug.trim().is_empty() {
        return Err(Error::ConfigParse(format!(
            "Empty slug in '{}' field",
            field_name
        )));
    }

    if !slug
        .chars()
        .all(|c| c.is_alphanumeric() || c == '-' || c == '_')
    {
        return Err(Error::ConfigParse(format!(
            "Slug '{}' in '{}' may only contain letters, digits, '-' and '_'",
            slug, field_name
        )));
    }

    Ok(())
}

/// Validate and convert a path string to PathBuf.
///
/// This function prevents path traversal vulnerabilities by rejecting:
/// - Absolute paths (starting with `/` or Windows drive letters)
/// - Paths containing parent directory references (`..`)
///
/// # Arguments
///
/// * `path_str` - The path string from user input (site.toml)
/// * `field_name` - Name of the field for error messages
///
/// # Examples
///
/// ```text
/// validate_path("posts.json", "source.path")  → Ok(PathBuf)
/// validate_path("/etc/passwd", "source.path")  → Err("Absolute paths not allowed...")
/// validate_path("../posts.json", "source.path")  → Err("Parent directory references...")
/// ```
fn validate_path(path_str: &str, field_name: &str) -> Result<PathBuf> {
    let path = Path::new(path_str);

    // Reject absolute paths
    if path.is_absolute() {
        return Err(Error::ConfigParse(format!(
            "Absolute paths not allowed in '{}': '{}'. Use relative paths only.",
            field_name, path_str
        )));
    }

    // Check for parent directory references
    for component in path.components() {
        if component == std::path::Component::ParentDir {
            return Err(Error::ConfigParse(format!(
                "Parent directory references (..) not allowed in '{}': '{}'",
                field_name, path_str
            )));
        }
    }

    // Ensure path is not empty
    if path_str.trim().is_empty() {
        return Err(Error::ConfigParse(format!(
            "Empty path in '{}' field",
            field_name
        )));
    }

    Ok(path.to_path_buf())
}
