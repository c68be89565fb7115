use folio_core::Post;
use folio_core::date::sort_key;
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

/// Posts belonging to one category plus the other tags they carry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryView {
    pub slug: String,
    pub posts: Vec<Post>,
    /// Sorted, distinct, excluding the category slug itself
    pub tags: Vec<String>,
}

/// Newest-first or oldest-first listing order (`?s=new` / `?s=old`)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortOrder {
    #[default]
    Newest,
    Oldest,
}

impl SortOrder {
    pub fn as_query_value(&self) -> &'static str {
        match self {
            SortOrder::Newest => "new",
            SortOrder::Oldest => "old",
        }
    }
}

impl FromStr for SortOrder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "new" => Ok(SortOrder::Newest),
            "old" => Ok(SortOrder::Oldest),
            other => Err(format!("unknown sort order '{}'", other)),
        }
    }
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_query_value())
    }
}

/// Select the posts tagged with `slug` (case-insensitive) and collect their other tags.
pub fn category_view(posts: &[Post], slug: &str) -> CategoryView {
    let members: Vec<Post> = posts.iter().filter(|p| p.has_tag(slug)).cloned().collect();

    let slug_lower = slug.to_lowercase();
    let tags: BTreeSet<&str> = members
        .iter()
        .flat_map(|p| p.tags.iter())
        .map(|t| t.as_str())
        .filter(|t| t.to_lowercase() != slug_lower)
        .collect();

    CategoryView {
        slug: slug.to_string(),
        tags: tags.into_iter().map(str::to_string).collect(),
        posts: members,
    }
}

impl CategoryView {
    pub fn total(&self) -> usize {
        self.posts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.posts.is_empty()
    }

    /// Sub-view for a child category: posts also tagged `child`, with both
    /// the parent and child slugs left out of the tag list.
    pub fn narrow(&self, child: &str) -> CategoryView {
        let inner = category_view(&self.posts, child);
        let parent = self.slug.to_lowercase();

        CategoryView {
            slug: inner.slug,
            tags: inner
                .tags
                .into_iter()
                .filter(|t| t.to_lowercase() != parent)
                .collect(),
            posts: inner.posts,
        }
    }

    /// Visible posts for an optional active sub-tag, ordered by date.
    ///
    /// The sort is stable, so posts sharing a date keep their source order.
    pub fn listing(&self, active_tag: Option<&str>, order: SortOrder) -> Vec<&Post> {
        let mut visible: Vec<&Post> = match active_tag.map(str::trim).filter(|t| !t.is_empty()) {
            Some(tag) => self.posts.iter().filter(|p| p.has_tag(tag)).collect(),
            None => self.posts.iter().collect(),
        };

        match order {
            SortOrder::Newest => visible.sort_by_key(|p| std::cmp::Reverse(sort_key(&p.date))),
            SortOrder::Oldest => visible.sort_by_key(|p| sort_key(&p.date)),
        }

        visible
    }
}
