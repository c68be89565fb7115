// Static site generation: filtered posts in, HTML pages and assets out

pub mod assets;
pub mod html;
pub mod markdown;
pub mod pages;
pub mod sitemap;

use folio_core::date::is_bare_date;
use chrono::Datelike;
use folio_core::{Post, ReferenceTime, Site};
use folio_indexer::{SearchOptions, SearchPayload, SortOrder, category_view};
use sha2::{Digest, Sha256};
use std::collections::HashSet;
use std::fs;
use std::path::Path;
use tracing::{debug, info, warn};

use sitemap::SitemapEntry;

/// Top-level paths owned by the generator; posts cannot use these slugs
pub const RESERVED_SLUGS: &[&str] = &[
    "about",
    "api",
    "category",
    "search",
    "static",
    "_reload",
    "404.html",
    "index.html",
    "robots.txt",
    "search.js",
    "search-index.json",
    "sitemap.xml",
];

#[derive(Debug, Clone)]
pub struct RenderOptions {
    /// Adds the live-reload script and preview badge
    pub preview: bool,
    /// Footer copyright year
    pub year: i32,
}

impl RenderOptions {
    /// Footer year taken from "today" in the site's reference zone
    pub fn new(preview: bool, reference: &ReferenceTime) -> Self {
        Self {
            preview,
            year: reference.today().year(),
        }
    }
}

pub struct GeneratedSite {
    pub pages: Vec<(String, String)>,   // (path, html)
    pub assets: Vec<(String, Vec<u8>)>, // (path, data)
}

impl GeneratedSite {
    /// HTML for a URL path such as `/category/thoughts`
    pub fn page(&self, url_path: &str) -> Option<&str> {
        let file = output_path(url_path);
        self.pages
            .iter()
            .find(|(path, _)| *path == file)
            .map(|(_, html)| html.as_str())
    }

    /// Non-HTML output for a URL path such as `/search.js`
    pub fn asset(&self, url_path: &str) -> Option<&[u8]> {
        let file = output_path(url_path);
        self.assets
            .iter()
            .find(|(path, _)| *path == file)
            .map(|(_, data)| data.as_slice())
    }

    /// Write every page and asset under `out_dir`, returning the file count
    pub fn write_to(&self, out_dir: &Path) -> folio_core::Result<usize> {
        let mut written = 0;

        for (path, html) in &self.pages {
            write_file(&out_dir.join(path), html.as_bytes())?;
            written += 1;
        }
        for (path, data) in &self.assets {
            write_file(&out_dir.join(path), data)?;
            written += 1;
        }

        info!(files = written, dir = %out_dir.display(), "wrote site");
        Ok(written)
    }
}

fn write_file(path: &Path, data: &[u8]) -> folio_core::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, data)?;
    Ok(())
}

/// Map a URL path to the output file that serves it.
///
/// `/` → `index.html`, `/a/b` → `a/b/index.html`, `/search.js` → `search.js`.
pub fn output_path(url_path: &str) -> String {
    let trimmed = url_path
        .split(['?', '#'])
        .next()
        .unwrap_or_default()
        .trim_matches('/');

    if trimmed.is_empty() {
        return "index.html".to_string();
    }

    let last = trimmed.rsplit('/').next().unwrap_or(trimmed);
    if last.contains('.') {
        trimmed.to_string()
    } else {
        format!("{}/index.html", trimmed)
    }
}

/// A slug that maps to exactly one top-level directory and no generator route
pub fn is_publishable_slug(slug: &str) -> bool {
    !slug.is_empty()
        && !slug.starts_with('.')
        && !slug.contains(['/', '\\', '?', '#'])
        && !RESERVED_SLUGS.contains(&slug.to_lowercase().as_str())
}

/// Short content hash used as a cache-busting `?v=` value
pub fn fingerprint(data: &[u8]) -> String {
    Sha256::digest(data)
        .iter()
        .take(6)
        .map(|b| format!("{:02x}", b))
        .collect()
}

/// Posts the generator will emit: publishable slugs, first occurrence wins.
///
/// Every listing, the search index and the post pages are built from this
/// list, so a skipped post appears nowhere.
pub fn publishable_posts(posts: &[Post]) -> Vec<Post> {
    let mut seen = HashSet::new();
    posts
        .iter()
        .filter(|post| {
            if !is_publishable_slug(&post.slug) {
                warn!(slug = %post.slug, "skipping post with reserved or unsafe slug");
                return false;
            }
            if !seen.insert(post.slug.to_lowercase()) {
                warn!(slug = %post.slug, "skipping post with duplicate slug");
                return false;
            }
            true
        })
        .cloned()
        .collect()
}

fn lastmod(date: &str) -> Option<String> {
    if is_bare_date(date) {
        return Some(date.to_string());
    }
    let prefix: String = date.chars().take(10).collect();
    is_bare_date(&prefix).then_some(prefix)
}

/// Render the whole site for a filtered post list
pub fn generate_site(site: &Site, posts: &[Post], options: &RenderOptions) -> GeneratedSite {
    let mut pages = Vec::new();
    let mut assets = Vec::new();
    let mut entries = Vec::new();

    let publishable = publishable_posts(posts);
    let posts = publishable.as_slice();

    let payload = SearchPayload::from_posts(posts, &site.categories, SearchOptions::default());
    let index_json = payload.to_json().unwrap_or_else(|e| {
        warn!(error = %e, "failed to serialize search index");
        r#"{"options":{"fuzzy":0.2,"prefix":true,"max_fuzzy":2},"docs":[]}"#.to_string()
    });
    let index_url = format!("/search-index.json?v={}", fingerprint(index_json.as_bytes()));

    let mut add_page = |path: &str, html: String, lastmod: Option<String>, priority: &'static str| {
        debug!(path, "rendered page");
        pages.push((output_path(path), html));
        entries.push(SitemapEntry {
            path: path.to_string(),
            lastmod,
            priority,
        });
    };

    add_page("/", pages::render_home(site, posts, options), None, "1.0");
    add_page(
        "/category",
        pages::render_categories_index(site, posts, options),
        None,
        "0.6",
    );

    for category in &site.categories {
        let view = category_view(posts, &category.slug);
        add_page(
            &category.path(),
            pages::render_category_page(site, category, None, &view, None, SortOrder::Newest, options),
            None,
            "0.7",
        );

        for child in &category.children {
            let child_view = view.narrow(&child.slug);
            add_page(
                &format!("{}/{}", category.path(), child.slug),
                pages::render_category_page(
                    site,
                    category,
                    Some(child),
                    &child_view,
                    None,
                    SortOrder::Newest,
                    options,
                ),
                None,
                "0.6",
            );
        }
    }

    add_page(
        "/search",
        pages::render_search_page(site, &index_url, options),
        None,
        "0.3",
    );
    add_page("/about", pages::render_about_page(site, options), None, "0.5");

    for post in posts {
        add_page(
            &post.path(),
            pages::render_post_page(site, post, options),
            lastmod(&post.date),
            "0.8",
        );
    }

    pages.push((
        "404.html".to_string(),
        pages::render_not_found(site, "/404", options),
    ));

    assets.push(("search-index.json".to_string(), index_json.into_bytes()));
    assets.push(("search.js".to_string(), assets::SEARCH_JS.as_bytes().to_vec()));
    assets.push((
        "sitemap.xml".to_string(),
        sitemap::sitemap_xml(site, &entries).into_bytes(),
    ));
    assets.push((
        "robots.txt".to_string(),
        sitemap::robots_txt(site).into_bytes(),
    ));

    info!(
        pages = pages.len(),
        posts = posts.len(),
        categories = site.categories.len(),
        "generated site"
    );

    GeneratedSite { pages, assets }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use folio_core::{
        BlogConfig, Category, ChildCategory, FilterPolicy, Plugins, PostStatus, PostType, Profile,
        SiteSettings, SourceConfig,
    };
    use folio_indexer::SearchIndex;
    use std::path::PathBuf;
    use tempfile::TempDir;

    pub(crate) fn options() -> RenderOptions {
        RenderOptions {
            preview: false,
            year: 2025,
        }
    }

    pub(crate) fn sample_site() -> Site {
        Site {
            profile: Profile {
                name: "Ada".to_string(),
                ..Profile::default()
            },
            blog: BlogConfig {
                title: "Field Notes".to_string(),
                description: "Thoughts and ideas".to_string(),
                scheme: Default::default(),
            },
            settings: SiteSettings {
                link: "https://example.com".to_string(),
                since: None,
                lang: "en-US".to_string(),
                og_image_generate_url: None,
                revalidate_secs: 60,
                timezone: chrono::FixedOffset::east_opt(5 * 3600 + 1800).unwrap(),
            },
            source: SourceConfig::File {
                path: PathBuf::from("posts.json"),
            },
            filter: FilterPolicy::default(),
            projects: vec![],
            links: vec![],
            categories: vec![
                Category {
                    slug: "thoughts".to_string(),
                    name: "Thoughts".to_string(),
                    intro: Some("Longer reflections".to_string()),
                    cover: None,
                    children: vec![ChildCategory {
                        slug: "philosophy".to_string(),
                        name: "Philosophy".to_string(),
                        intro: None,
                    }],
                },
                Category {
                    slug: "ideas".to_string(),
                    name: "Ideas".to_string(),
                    intro: None,
                    cover: None,
                    children: vec![],
                },
            ],
            plugins: Plugins::default(),
        }
    }

    fn post(slug: &str, title: &str, date: &str, tags: &[&str]) -> Post {
        Post {
            id: format!("id-{}", slug),
            title: title.to_string(),
            slug: slug.to_string(),
            status: PostStatus::Public,
            post_type: PostType::Post,
            date: date.to_string(),
            tags: tags.iter().map(|t| t.to_string()).collect(),
            summary: None,
            cover: None,
            content: None,
        }
    }

    pub(crate) fn sample_posts() -> Vec<Post> {
        let mut philosophy = post(
            "philosophy-notes",
            "Philosophy Notes",
            "2025-01-05",
            &["thoughts", "philosophy"],
        );
        philosophy.content = Some("**Stoics** at dawn.".to_string());

        let mut love = post("on-love", "On Love", "2025-03-01", &["thoughts", "love"]);
        love.summary = Some("What it means".to_string());

        vec![
            philosophy,
            love,
            post("small-idea", "A Small Idea", "2025-02-01", &["ideas"]),
        ]
    }

    #[test]
    fn test_output_path() {
        assert_eq!(output_path("/"), "index.html");
        assert_eq!(output_path(""), "index.html");
        assert_eq!(output_path("/category/thoughts"), "category/thoughts/index.html");
        assert_eq!(output_path("/category/thoughts/"), "category/thoughts/index.html");
        assert_eq!(output_path("/search?q=phil"), "search/index.html");
        assert_eq!(output_path("/search.js"), "search.js");
        assert_eq!(output_path("/sitemap.xml"), "sitemap.xml");
    }

    #[test]
    fn test_publishable_slug() {
        assert!(is_publishable_slug("hello-world"));
        assert!(!is_publishable_slug(""));
        assert!(!is_publishable_slug("../etc"));
        assert!(!is_publishable_slug("a/b"));
        assert!(!is_publishable_slug("Search"));
        assert!(!is_publishable_slug("category"));
    }

    #[test]
    fn test_generate_site_emits_every_route() {
        let site = sample_site();
        let generated = generate_site(&site, &sample_posts(), &options());

        for path in [
            "index.html",
            "category/index.html",
            "category/thoughts/index.html",
            "category/thoughts/philosophy/index.html",
            "category/ideas/index.html",
            "search/index.html",
            "about/index.html",
            "philosophy-notes/index.html",
            "on-love/index.html",
            "small-idea/index.html",
            "404.html",
        ] {
            assert!(
                generated.pages.iter().any(|(p, _)| p == path),
                "missing page {}",
                path
            );
        }

        for path in ["search-index.json", "search.js", "sitemap.xml", "robots.txt"] {
            assert!(generated.asset(&format!("/{}", path)).is_some(), "missing asset {}", path);
        }

        assert!(generated.page("/category/thoughts").is_some());
        assert!(generated.page("/nope").is_none());
    }

    #[test]
    fn test_search_page_references_fingerprinted_index() {
        let generated = generate_site(&sample_site(), &sample_posts(), &options());
        let json = generated.asset("/search-index.json").unwrap();
        let version = fingerprint(json);
        let page = generated.page("/search").unwrap();
        assert!(page.contains(&format!("/search-index.json?v={}", version)));
    }

    #[test]
    fn test_search_index_asset_is_loadable() {
        let generated = generate_site(&sample_site(), &sample_posts(), &options());
        let json = generated.asset("/search-index.json").unwrap();
        let payload: SearchPayload = serde_json::from_slice(json).unwrap();
        let index = SearchIndex::from_payload(payload).unwrap();
        assert_eq!(index.len(), 3);
        assert_eq!(index.search("phil").unwrap()[0].doc.slug, "philosophy-notes");
    }

    #[test]
    fn test_sitemap_has_posts_with_lastmod() {
        let generated = generate_site(&sample_site(), &sample_posts(), &options());
        let xml = String::from_utf8(generated.asset("/sitemap.xml").unwrap().to_vec()).unwrap();
        assert!(xml.contains("<loc>https://example.com/on-love</loc>"));
        assert!(xml.contains("<lastmod>2025-03-01</lastmod>"));
        assert!(xml.contains("<loc>https://example.com/category/thoughts/philosophy</loc>"));
    }

    #[test]
    fn test_duplicate_and_reserved_slugs_are_skipped() {
        let mut posts = sample_posts();
        posts.push(post("on-love", "Second Love", "2025-01-01", &["thoughts"]));
        posts.push(post("search", "Shadow", "2025-01-01", &["thoughts"]));

        let publishable = publishable_posts(&posts);
        assert_eq!(publishable.len(), 3);
        assert_eq!(publishable[1].title, "On Love");

        let generated = generate_site(&sample_site(), &posts, &options());
        let search = generated.page("/search").unwrap();
        assert!(search.contains("Type to search."));
        assert!(!search.contains("Shadow"));
        assert_eq!(
            generated
                .pages
                .iter()
                .filter(|(p, _)| p == "on-love/index.html")
                .count(),
            1
        );

        for path in ["/", "/category/thoughts"] {
            let html = generated.page(path).unwrap();
            assert!(!html.contains("Second Love"), "duplicate listed on {}", path);
            assert!(!html.contains("Shadow"), "reserved slug listed on {}", path);
            assert_eq!(html.matches(r#"href="/on-love""#).count(), 1, "on {}", path);
        }

        let json = generated.asset("/search-index.json").unwrap();
        let payload: SearchPayload = serde_json::from_slice(json).unwrap();
        let slugs: Vec<&str> = payload.docs.iter().map(|d| d.slug.as_str()).collect();
        assert_eq!(slugs, vec!["philosophy-notes", "on-love", "small-idea"]);
        assert!(!payload.docs.iter().any(|d| d.title == "Second Love" || d.title == "Shadow"));
    }

    #[test]
    fn test_render_options_year_follows_reference_zone() {
        let zone = chrono::FixedOffset::east_opt(5 * 3600 + 1800).unwrap();
        let now = chrono::DateTime::parse_from_rfc3339("2025-12-31T20:00:00Z")
            .unwrap()
            .with_timezone(&chrono::Utc);
        let options = RenderOptions::new(true, &ReferenceTime::new(now, zone));
        assert_eq!(options.year, 2026);
        assert!(options.preview);
    }

    #[test]
    fn test_empty_site_still_renders() {
        let generated = generate_site(&sample_site(), &[], &options());
        let thoughts = generated.page("/category/thoughts").unwrap();
        assert!(thoughts.contains("No posts yet in this category."));
        assert!(thoughts.contains(r#"<div class="empty" data-empty>"#));
    }

    #[test]
    fn test_write_to_creates_tree() {
        let dir = TempDir::new().unwrap();
        let generated = generate_site(&sample_site(), &sample_posts(), &options());
        let count = generated.write_to(dir.path()).unwrap();

        assert_eq!(count, generated.pages.len() + generated.assets.len());
        assert!(dir.path().join("index.html").exists());
        assert!(dir.path().join("category/thoughts/philosophy/index.html").exists());
        assert!(dir.path().join("search-index.json").exists());
    }

    #[test]
    fn test_fingerprint_is_stable() {
        assert_eq!(fingerprint(b"abc"), fingerprint(b"abc"));
        assert_ne!(fingerprint(b"abc"), fingerprint(b"abd"));
        assert_eq!(fingerprint(b"abc").len(), 12);
    }

    #[test]
    fn test_lastmod() {
        assert_eq!(lastmod("2025-08-28").as_deref(), Some("2025-08-28"));
        assert_eq!(lastmod("2025-08-28T10:00:00Z").as_deref(), Some("2025-08-28"));
        assert_eq!(lastmod("yesterday"), None);
    }
}
