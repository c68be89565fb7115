//! Post filtering: sanity checks, future-date guard, status/type whitelists.

use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

use crate::date::{Recency, ReferenceTime, check_recency};
use crate::post::{Labels, Post, PostStatus, PostType, RawPost};

/// Which statuses and types are eligible for publication
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterPolicy {
    pub accept_status: Vec<PostStatus>,
    pub accept_type: Vec<PostType>,
}

impl Default for FilterPolicy {
    fn default() -> Self {
        Self {
            accept_status: vec![PostStatus::Public],
            accept_type: vec![PostType::Post],
        }
    }
}

impl FilterPolicy {
    pub fn new(accept_status: Vec<PostStatus>, accept_type: Vec<PostType>) -> Self {
        Self {
            accept_status,
            accept_type,
        }
    }

    fn accepts_status(&self, label: Option<&str>) -> Option<PostStatus> {
        label
            .and_then(|s| s.parse::<PostStatus>().ok())
            .filter(|status| self.accept_status.contains(status))
    }

    fn accepts_type(&self, label: Option<&str>) -> Option<PostType> {
        label
            .and_then(|s| s.parse::<PostType>().ok())
            .filter(|kind| self.accept_type.contains(kind))
    }
}

/// Why a raw record did not make it through the filter
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DropReason {
    MissingTitle,
    MissingSlug,
    MissingDate,
    UnparseableDate(String),
    FutureDate(String),
    StatusRejected(Option<String>),
    TypeRejected(Option<String>),
}

impl fmt::Display for DropReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DropReason::MissingTitle => write!(f, "missing title"),
            DropReason::MissingSlug => write!(f, "missing slug"),
            DropReason::MissingDate => write!(f, "missing date"),
            DropReason::UnparseableDate(d) => write!(f, "unparseable date '{}'", d),
            DropReason::FutureDate(d) => write!(f, "dated in the future ({})", d),
            DropReason::StatusRejected(s) => {
                write!(f, "status {} not accepted", s.as_deref().unwrap_or("<none>"))
            }
            DropReason::TypeRejected(t) => {
                write!(f, "type {} not accepted", t.as_deref().unwrap_or("<none>"))
            }
        }
    }
}

/// A dropped record, identified by its input position
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DroppedPost {
    pub index: usize,
    pub label: String,
    pub reason: DropReason,
}

#[derive(Debug, Clone, Default)]
pub struct FilterOutcome {
    pub posts: Vec<Post>,
    pub dropped: Vec<DroppedPost>,
}

/// Filter raw posts down to the publishable set.
///
/// Relative order of survivors is preserved and duplicates are kept.
pub fn filter_posts(posts: &[RawPost], policy: &FilterPolicy, reference: &ReferenceTime) -> Vec<Post> {
    filter_posts_with_report(posts, policy, reference).posts
}

/// Same as [`filter_posts`], also reporting what was dropped and why
pub fn filter_posts_with_report(
    posts: &[RawPost],
    policy: &FilterPolicy,
    reference: &ReferenceTime,
) -> FilterOutcome {
    let mut outcome = FilterOutcome::default();

    for (index, raw) in posts.iter().enumerate() {
        match admit(raw, policy, reference) {
            Ok(post) => outcome.posts.push(post),
            Err(reason) => {
                let label = record_label(raw, index);
                debug!(post = %label, %reason, "dropping post");
                outcome.dropped.push(DroppedPost {
                    index,
                    label,
                    reason,
                });
            }
        }
    }

    outcome
}

fn admit(raw: &RawPost, policy: &FilterPolicy, reference: &ReferenceTime) -> Result<Post, DropReason> {
    // 1) sanity + recency
    let title = present(&raw.title).ok_or(DropReason::MissingTitle)?;
    let slug = present(&raw.slug).ok_or(DropReason::MissingSlug)?;
    let date = raw.date_string().ok_or(DropReason::MissingDate)?;

    match check_recency(date, reference) {
        Recency::OnOrBefore => {}
        Recency::Future => return Err(DropReason::FutureDate(date.to_string())),
        Recency::Unparseable => return Err(DropReason::UnparseableDate(date.to_string())),
    }

    // 2) status whitelist
    let status_label = raw.status.as_ref().and_then(Labels::first);
    let status = policy
        .accepts_status(status_label)
        .ok_or_else(|| DropReason::StatusRejected(status_label.map(str::to_string)))?;

    // 3) type whitelist
    let type_label = raw.post_type.as_ref().and_then(Labels::first);
    let post_type = policy
        .accepts_type(type_label)
        .ok_or_else(|| DropReason::TypeRejected(type_label.map(str::to_string)))?;

    // 4) normalized, immutable record
    Ok(Post {
        id: present(&raw.id).unwrap_or(slug).to_string(),
        title: title.to_string(),
        slug: slug.to_string(),
        status,
        post_type,
        date: date.to_string(),
        tags: raw
            .tags
            .iter()
            .filter(|t| !t.trim().is_empty())
            .cloned()
            .collect(),
        summary: raw.summary_text().map(str::to_string),
        cover: present(&raw.cover)
            .or_else(|| present(&raw.thumbnail))
            .map(str::to_string),
        content: raw.content.clone(),
    })
}

fn present(field: &Option<String>) -> Option<&str> {
    field.as_deref().filter(|s| !s.trim().is_empty())
}

fn record_label(raw: &RawPost, index: usize) -> String {
    present(&raw.slug)
        .or_else(|| present(&raw.id))
        .or_else(|| present(&raw.title))
        .map(str::to_string)
        .unwrap_or_else(|| format!("#{}", index))
}
