use chrono::FixedOffset;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::filter::FilterPolicy;

/// Complete site configuration
#[derive(Debug, Clone)]
pub struct Site {
    pub profile: Profile,
    pub blog: BlogConfig,
    pub settings: SiteSettings,
    pub source: SourceConfig,
    pub filter: FilterPolicy,
    pub projects: Vec<Project>,
    pub links: Vec<NavLink>,
    pub categories: Vec<Category>,
    pub plugins: Plugins,
}

impl Site {
    /// Look up a top-level category by slug
    pub fn category(&self, slug: &str) -> Option<&Category> {
        self.categories.iter().find(|c| c.slug == slug)
    }

    /// Absolute URL for a site-relative path
    pub fn url_for(&self, path: &str) -> String {
        let base = self.settings.link.trim_end_matches('/');
        if path.starts_with('/') {
            format!("{}{}", base, path)
        } else {
            format!("{}/{}", base, path)
        }
    }
}

/// Owner profile shown on the home page and in the footer
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Profile {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub linkedin: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub github: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instagram: Option<String>,
}

/// Blog title, tagline and color scheme
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlogConfig {
    pub title: String,
    pub description: String,
    #[serde(default)]
    pub scheme: ColorScheme,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorScheme {
    Light,
    #[default]
    Dark,
    System,
}

impl ColorScheme {
    pub fn as_str(&self) -> &'static str {
        match self {
            ColorScheme::Light => "light",
            ColorScheme::Dark => "dark",
            ColorScheme::System => "system",
        }
    }
}

/// Deployment-wide settings
#[derive(Debug, Clone)]
pub struct SiteSettings {
    /// Canonical base URL (e.g. "https://example.com")
    pub link: String,
    pub since: Option<i32>,
    pub lang: String,
    pub og_image_generate_url: Option<String>,
    /// How often the preview server rebuilds from the post source
    pub revalidate_secs: u64,
    /// Reference zone for "is this post dated today or earlier"
    pub timezone: FixedOffset,
}

/// Where raw post records come from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceConfig {
    /// JSON array on disk, relative to the site directory
    File { path: PathBuf },
    /// JSON array served over HTTP
    Http {
        url: String,
        /// Name of the env var holding a bearer token
        token_env: Option<String>,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Project {
    pub name: String,
    pub href: String,
}

/// Footer/profile link
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NavLink {
    pub label: String,
    pub href: String,
    #[serde(default)]
    pub icon: LinkIcon,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LinkIcon {
    Chess,
    #[default]
    Link,
}

/// Top-level content grouping, matched against post tags
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Category {
    pub slug: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub intro: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cover: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<ChildCategory>,
}

impl Category {
    pub fn child(&self, slug: &str) -> Option<&ChildCategory> {
        self.children.iter().find(|c| c.slug == slug)
    }

    pub fn path(&self) -> String {
        format!("/category/{}", self.slug)
    }
}

/// Sub-grouping within a category, matched by secondary tag
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChildCategory {
    pub slug: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub intro: Option<String>,
}

/// Third-party integrations, all off unless enabled
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Plugins {
    pub google_analytics: GoogleAnalytics,
    pub google_search_console: SiteVerification,
    pub naver_search_advisor: SiteVerification,
    pub utterances: Utterances,
    pub cusdis: Cusdis,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GoogleAnalytics {
    pub enable: bool,
    pub measurement_id: String,
}

impl GoogleAnalytics {
    pub fn active_id(&self) -> Option<&str> {
        (self.enable && !self.measurement_id.is_empty()).then_some(self.measurement_id.as_str())
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteVerification {
    pub enable: bool,
    pub site_verification: String,
}

impl SiteVerification {
    pub fn active_token(&self) -> Option<&str> {
        (self.enable && !self.site_verification.is_empty())
            .then_some(self.site_verification.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Utterances {
    pub enable: bool,
    pub repo: String,
    pub issue_term: String,
    pub label: Option<String>,
}

impl Default for Utterances {
    fn default() -> Self {
        Self {
            enable: false,
            repo: String::new(),
            issue_term: "og:title".to_string(),
            label: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Cusdis {
    pub enable: bool,
    pub host: String,
    pub app_id: String,
}

impl Default for Cusdis {
    fn default() -> Self {
        Self {
            enable: false,
            host: "https://cusdis.com".to_string(),
            app_id: String::new(),
        }
    }
}
