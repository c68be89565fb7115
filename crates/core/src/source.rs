//! Post source adapters.
//!
//! Records are decoded one at a time so a single malformed entry is skipped
//! instead of failing the whole fetch.

use async_trait::async_trait;
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use serde_json::Value;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::error::{Error, Result};
use crate::post::RawPost;
use crate::types::SourceConfig;

#[async_trait]
pub trait PostSource: Send + Sync {
    /// Human-readable origin for logs
    fn describe(&self) -> String;

    async fn fetch(&self) -> Result<Vec<RawPost>>;
}

/// JSON file on disk
pub struct FileSource {
    path: PathBuf,
}

impl FileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl PostSource for FileSource {
    fn describe(&self) -> String {
        self.path.display().to_string()
    }

    async fn fetch(&self) -> Result<Vec<RawPost>> {
        let content = tokio::fs::read_to_string(&self.path).await?;
        let posts = decode_posts(&content)?;
        info!(source = %self.describe(), count = posts.len(), "loaded posts");
        Ok(posts)
    }
}

/// JSON endpoint, optionally authenticated with a bearer token
pub struct HttpSource {
    client: reqwest::Client,
    url: String,
}

impl HttpSource {
    pub fn new(url: impl Into<String>, token: Option<&str>) -> Result<Self> {
        let mut headers = HeaderMap::new();
        if let Some(token) = token {
            let value = HeaderValue::from_str(&format!("Bearer {}", token))
                .map_err(|e| Error::InvalidData(format!("Invalid source token: {}", e)))?;
            headers.insert(AUTHORIZATION, value);
        }

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .build()?;

        Ok(Self {
            client,
            url: url.into(),
        })
    }
}

#[async_trait]
impl PostSource for HttpSource {
    fn describe(&self) -> String {
        self.url.clone()
    }

    async fn fetch(&self) -> Result<Vec<RawPost>> {
        let response = self.client.get(&self.url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::SourceStatus {
                url: self.url.clone(),
                status: status.as_u16(),
            });
        }

        let body = response.text().await?;
        let posts = decode_posts(&body)?;
        info!(source = %self.url, count = posts.len(), "fetched posts");
        Ok(posts)
    }
}

/// Build the configured source.
///
/// File paths resolve against `site_dir`; HTTP tokens are read through `env`.
pub fn from_config<F>(config: &SourceConfig, site_dir: &Path, env: F) -> Result<Box<dyn PostSource>>
where
    F: Fn(&str) -> Option<String>,
{
    match config {
        SourceConfig::File { path } => Ok(Box::new(FileSource::new(site_dir.join(path)))),
        SourceConfig::Http { url, token_env } => {
            let token = token_env.as_deref().and_then(|name| env(name));
            Ok(Box::new(HttpSource::new(url.clone(), token.as_deref())?))
        }
    }
}

/// Decode a post payload.
///
/// Accepts a bare array or an object with a `results`/`posts` array.
pub fn decode_posts(content: &str) -> Result<Vec<RawPost>> {
    let value: Value = serde_json::from_str(content)?;

    let items = match value {
        Value::Array(items) => items,
        Value::Object(mut map) => match map.remove("results").or_else(|| map.remove("posts")) {
            Some(Value::Array(items)) => items,
            _ => {
                return Err(Error::InvalidData(
                    "Expected a JSON array of posts or an object with a 'results' array"
                        .to_string(),
                ));
            }
        },
        _ => {
            return Err(Error::InvalidData(
                "Expected a JSON array of posts".to_string(),
            ));
        }
    };

    let posts = items
        .into_iter()
        .enumerate()
        .filter_map(|(i, item)| match serde_json::from_value::<RawPost>(item) {
            Ok(post) => Some(post),
            Err(e) => {
                warn!(index = i, error = %e, "skipping undecodable post record");
                None
            }
        })
        .collect();

    Ok(posts)
}
