use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

/// Post record as delivered by the content source.
///
/// Every field is optional; the filter decides what survives.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RawPost {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<Labels>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub post_type: Option<Labels>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<DateValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_time: Option<DateValue>,
    #[serde(deserialize_with = "null_as_empty")]
    pub tags: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub excerpt: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cover: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<String>,
    /// Markdown body
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
}

fn null_as_empty<'de, D>(deserializer: D) -> std::result::Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<String>>::deserialize(deserializer)?.unwrap_or_default())
}

impl RawPost {
    /// Date string from `date`, falling back to `createdTime`
    pub fn date_string(&self) -> Option<&str> {
        self.date
            .as_ref()
            .and_then(DateValue::pick)
            .or_else(|| self.created_time.as_ref().and_then(DateValue::pick))
    }

    /// First non-empty of excerpt, summary, description
    pub fn summary_text(&self) -> Option<&str> {
        [&self.excerpt, &self.summary, &self.description]
            .into_iter()
            .flatten()
            .map(|s| s.as_str())
            .find(|s| !s.trim().is_empty())
    }
}

/// Select/multi-select property: a bare string or a list where the first entry counts
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Labels {
    One(String),
    Many(Vec<String>),
}

impl Labels {
    pub fn first(&self) -> Option<&str> {
        match self {
            Labels::One(s) => Some(s.as_str()),
            Labels::Many(items) => items.first().map(|s| s.as_str()),
        }
    }
}

/// Date property in any of the shapes the content source produces
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DateValue {
    Plain(String),
    Notion(NotionDate),
    /// Anything else (numbers, arrays); never yields a date
    Other(serde_json::Value),
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NotionDate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(rename = "startDate", skip_serializing_if = "Option::is_none")]
    pub start_date_camel: Option<String>,
    #[serde(rename = "publishedAt", skip_serializing_if = "Option::is_none")]
    pub published_at: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_zone: Option<String>,
}

impl DateValue {
    /// First present, non-empty date string.
    ///
    /// Object key lookup order: start, start_date, date, startDate, publishedAt.
    pub fn pick(&self) -> Option<&str> {
        match self {
            DateValue::Plain(s) => non_empty(s),
            DateValue::Notion(d) => [
                &d.start,
                &d.start_date,
                &d.date,
                &d.start_date_camel,
                &d.published_at,
            ]
            .into_iter()
            .flatten()
            .find_map(|s| non_empty(s)),
            DateValue::Other(_) => None,
        }
    }
}

fn non_empty(s: &str) -> Option<&str> {
    let trimmed = s.trim();
    (!trimmed.is_empty()).then_some(trimmed)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PostStatus {
    Public,
    PublicOnDetail,
    Private,
    Draft,
}

impl PostStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PostStatus::Public => "Public",
            PostStatus::PublicOnDetail => "PublicOnDetail",
            PostStatus::Private => "Private",
            PostStatus::Draft => "Draft",
        }
    }
}

impl FromStr for PostStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Public" => Ok(PostStatus::Public),
            "PublicOnDetail" => Ok(PostStatus::PublicOnDetail),
            "Private" => Ok(PostStatus::Private),
            "Draft" => Ok(PostStatus::Draft),
            other => Err(format!("unknown post status '{}'", other)),
        }
    }
}

impl fmt::Display for PostStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PostType {
    Post,
    Paper,
    Page,
}

impl PostType {
    pub fn as_str(&self) -> &'static str {
        match self {
            PostType::Post => "Post",
            PostType::Paper => "Paper",
            PostType::Page => "Page",
        }
    }
}

impl FromStr for PostType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Post" => Ok(PostType::Post),
            "Paper" => Ok(PostType::Paper),
            "Page" => Ok(PostType::Page),
            other => Err(format!("unknown post type '{}'", other)),
        }
    }
}

impl fmt::Display for PostType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A post that passed the filter
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    pub id: String,
    pub title: String,
    pub slug: String,
    pub status: PostStatus,
    #[serde(rename = "type")]
    pub post_type: PostType,
    /// Normalized date string
    pub date: String,
    pub tags: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cover: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
}

impl Post {
    pub fn path(&self) -> String {
        format!("/{}", self.slug)
    }

    /// Case-insensitive tag membership
    pub fn has_tag(&self, tag: &str) -> bool {
        let wanted = tag.to_lowercase();
        self.tags.iter().any(|t| t.to_lowercase() == wanted)
    }
}

impl From<&Post> for RawPost {
    fn from(post: &Post) -> Self {
        RawPost {
            id: Some(post.id.clone()),
            title: Some(post.title.clone()),
            slug: Some(post.slug.clone()),
            status: Some(Labels::One(post.status.as_str().to_string())),
            post_type: Some(Labels::One(post.post_type.as_str().to_string())),
            date: Some(DateValue::Plain(post.date.clone())),
            created_time: None,
            tags: post.tags.clone(),
            summary: post.summary.clone(),
            excerpt: None,
            description: None,
            cover: post.cover.clone(),
            thumbnail: None,
            content: post.content.clone(),
        }
    }
}
