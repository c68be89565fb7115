// Site checks that go beyond parsing: post health, category coverage,
// plugin settings and local image files

use folio_core::filter::{DropReason, filter_posts_with_report};
use folio_core::{Post, RawPost, ReferenceTime, Site};
use folio_generator::is_publishable_slug;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::debug;
use walkdir::WalkDir;

/// Directory under the site root served at `/static`
pub const STATIC_DIR: &str = "static";

#[derive(Debug, Default)]
pub struct ValidationReport {
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
    pub info: Vec<String>,
}

impl ValidationReport {
    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }

    fn error(&mut self, msg: impl Into<String>) {
        self.errors.push(msg.into());
    }

    fn warn(&mut self, msg: impl Into<String>) {
        self.warnings.push(msg.into());
    }

    fn note(&mut self, msg: impl Into<String>) {
        self.info.push(msg.into());
    }
}

/// Run every check against a parsed site and its raw post records
pub fn validate_site(
    root: &Path,
    site: &Site,
    raw_posts: &[RawPost],
    reference: &ReferenceTime,
) -> ValidationReport {
    let mut report = ValidationReport::default();

    let outcome = filter_posts_with_report(raw_posts, &site.filter, reference);
    report.note(format!(
        "{} of {} post records published",
        outcome.posts.len(),
        raw_posts.len()
    ));

    for dropped in &outcome.dropped {
        let msg = format!("Post #{} ({}): {}", dropped.index, dropped.label, dropped.reason);
        match dropped.reason {
            // Intentional exclusions
            DropReason::FutureDate(_) | DropReason::StatusRejected(_) | DropReason::TypeRejected(_) => {
                report.note(msg)
            }
            _ => report.warn(msg),
        }
    }

    check_slugs(&mut report, &outcome.posts);
    check_categories(&mut report, site, &outcome.posts);
    check_plugins(&mut report, site);
    check_images(&mut report, root, site, &outcome.posts);
    inventory_static(&mut report, root);

    debug!(
        errors = report.errors.len(),
        warnings = report.warnings.len(),
        "validation finished"
    );
    report
}

fn check_slugs(report: &mut ValidationReport, posts: &[Post]) {
    let mut counts: HashMap<String, usize> = HashMap::new();
    for post in posts {
        *counts.entry(post.slug.to_lowercase()).or_default() += 1;
    }

    let mut duplicates: Vec<_> = counts.into_iter().filter(|(_, n)| *n > 1).collect();
    duplicates.sort();
    for (slug, n) in duplicates {
        report.error(format!("Slug '{}' is used by {} posts", slug, n));
    }

    for post in posts {
        if !is_publishable_slug(&post.slug) {
            report.error(format!(
                "Post '{}' has a reserved or unsafe slug '{}'",
                post.title, post.slug
            ));
        }
    }
}

fn check_categories(report: &mut ValidationReport, site: &Site, posts: &[Post]) {
    for post in posts {
        let categorized = site.categories.iter().any(|c| post.has_tag(&c.slug));
        if !categorized {
            report.warn(format!(
                "Post '{}' matches no category (tags: {})",
                post.slug,
                if post.tags.is_empty() {
                    "none".to_string()
                } else {
                    post.tags.join(", ")
                }
            ));
        }
    }

    for category in &site.categories {
        let members: Vec<&Post> = posts.iter().filter(|p| p.has_tag(&category.slug)).collect();
        if members.is_empty() {
            report.warn(format!("Category '{}' has no posts", category.slug));
            continue;
        }
        report.note(format!(
            "Category '{}': {} post(s)",
            category.slug,
            members.len()
        ));

        for child in &category.children {
            if !members.iter().any(|p| p.has_tag(&child.slug)) {
                report.note(format!(
                    "Child category '{}/{}' has no posts",
                    category.slug, child.slug
                ));
            }
        }
    }
}

fn check_plugins(report: &mut ValidationReport, site: &Site) {
    let plugins = &site.plugins;

    if plugins.google_analytics.enable && plugins.google_analytics.measurement_id.is_empty() {
        report.warn("google_analytics is enabled but measurement_id is empty");
    }
    if plugins.google_search_console.enable
        && plugins.google_search_console.site_verification.is_empty()
    {
        report.warn("google_search_console is enabled but site_verification is empty");
    }
    if plugins.naver_search_advisor.enable
        && plugins.naver_search_advisor.site_verification.is_empty()
    {
        report.warn("naver_search_advisor is enabled but site_verification is empty");
    }
    if plugins.utterances.enable && plugins.utterances.repo.is_empty() {
        report.warn("utterances is enabled but repo is empty; no comments will render");
    }
    if plugins.cusdis.enable && plugins.cusdis.app_id.is_empty() {
        report.warn("cusdis is enabled but app_id is empty");
    }
    if plugins.utterances.enable && plugins.cusdis.enable {
        report.note("utterances and cusdis are both enabled; utterances wins");
    }
}

/// Resolve a site-relative image reference to a file under `static/`.
///
/// Remote and inline (`data:`) references return `None`.
pub fn local_image_path(root: &Path, reference: &str) -> Option<PathBuf> {
    let lower = reference.to_lowercase();
    if ["http://", "https://", "data:", "//"]
        .iter()
        .any(|prefix| lower.starts_with(prefix))
    {
        return None;
    }

    let relative = reference.trim_start_matches('/');
    if relative.is_empty() || relative.split('/').any(|part| part == "..") {
        return None;
    }

    Some(match relative.strip_prefix("static/") {
        Some(rest) => root.join(STATIC_DIR).join(rest),
        None => root.join(STATIC_DIR).join(relative),
    })
}

fn check_images(report: &mut ValidationReport, root: &Path, site: &Site, posts: &[Post]) {
    let mut references: Vec<(String, &str)> = Vec::new();

    if let Some(image) = &site.profile.image {
        references.push(("profile.image".to_string(), image.as_str()));
    }
    for category in &site.categories {
        if let Some(cover) = &category.cover {
            references.push((format!("category '{}' cover", category.slug), cover.as_str()));
        }
    }
    for post in posts {
        if let Some(cover) = &post.cover {
            references.push((format!("post '{}' cover", post.slug), cover.as_str()));
        }
    }

    for (owner, reference) in references {
        if reference.split('/').any(|part| part == "..") {
            report.error(format!("{}: path traversal in '{}'", owner, reference));
            continue;
        }
        let Some(path) = local_image_path(root, reference) else {
            continue;
        };

        if !path.exists() {
            report.error(format!("{}: file not found: {}", owner, path.display()));
            continue;
        }

        match image::image_dimensions(&path) {
            Ok((w, h)) => debug!(%owner, width = w, height = h, "image ok"),
            Err(e) => report.error(format!(
                "{}: cannot decode {}: {}",
                owner,
                path.display(),
                e
            )),
        }
    }
}

fn inventory_static(report: &mut ValidationReport, root: &Path) {
    let dir = root.join(STATIC_DIR);
    if !dir.is_dir() {
        report.note("No static/ directory");
        return;
    }

    let mut files = 0usize;
    let mut bytes = 0u64;
    for entry in WalkDir::new(&dir).into_iter().filter_map(|e| e.ok()) {
        if entry.file_type().is_file() {
            files += 1;
            bytes += entry.metadata().map(|m| m.len()).unwrap_or(0);
        }
    }

    report.note(format!("static/: {} file(s), {} bytes", files, bytes));
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{FixedOffset, TimeZone, Utc};
    use folio_core::config::parse_site_toml_str;
    use folio_core::source::decode_posts;
    use std::fs;
    use tempfile::TempDir;

    const SITE: &str = r#"
[profile]
name = "Ada"

[blog]
title = "Field Notes"
description = "Thoughts and ideas"

[site]
link = "https://example.com"

[source]
kind = "file"
path = "posts.json"

[[category]]
slug = "thoughts"
name = "Thoughts"

[[category.children]]
slug = "philosophy"
name = "Philosophy"

[[category]]
slug = "reviews"
name = "Reviews"
"#;

    fn reference() -> ReferenceTime {
        let zone = FixedOffset::east_opt(5 * 3600 + 1800).unwrap();
        ReferenceTime::new(Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap(), zone)
    }

    fn posts(json: &str) -> Vec<RawPost> {
        decode_posts(json).unwrap()
    }

    #[test]
    fn test_clean_site_has_no_errors() {
        let dir = TempDir::new().unwrap();
        let site = parse_site_toml_str(SITE).unwrap();
        let raw = posts(
            r#"[
            {"title": "A", "slug": "a", "status": ["Public"], "type": ["Post"], "date": "2025-01-01", "tags": ["thoughts", "philosophy"]},
            {"title": "B", "slug": "b", "status": ["Public"], "type": ["Post"], "date": "2025-02-01", "tags": ["reviews"]}
        ]"#,
        );

        let report = validate_site(dir.path(), &site, &raw, &reference());
        assert!(report.is_ok(), "{:?}", report.errors);
        assert!(report.warnings.is_empty(), "{:?}", report.warnings);
        assert!(report.info.iter().any(|i| i == "2 of 2 post records published"));
        assert!(report.info.iter().any(|i| i == "No static/ directory"));
    }

    #[test]
    fn test_drops_are_reported() {
        let dir = TempDir::new().unwrap();
        let site = parse_site_toml_str(SITE).unwrap();
        let raw = posts(
            r#"[
            {"slug": "no-title", "status": ["Public"], "type": ["Post"], "date": "2025-01-01"},
            {"title": "Draft", "slug": "draft", "status": ["Draft"], "type": ["Post"], "date": "2025-01-01"},
            {"title": "Later", "slug": "later", "status": ["Public"], "type": ["Post"], "date": "2030-01-01"}
        ]"#,
        );

        let report = validate_site(dir.path(), &site, &raw, &reference());
        assert!(report.warnings.iter().any(|w| w.contains("missing title")));
        assert!(report.info.iter().any(|i| i.contains("status Draft not accepted")));
        assert!(report.info.iter().any(|i| i.contains("dated in the future")));
        assert!(report.info.iter().any(|i| i == "0 of 3 post records published"));
    }

    #[test]
    fn test_duplicate_and_reserved_slugs_are_errors() {
        let dir = TempDir::new().unwrap();
        let site = parse_site_toml_str(SITE).unwrap();
        let raw = posts(
            r#"[
            {"title": "A", "slug": "same", "status": ["Public"], "type": ["Post"], "date": "2025-01-01", "tags": ["thoughts"]},
            {"title": "B", "slug": "Same", "status": ["Public"], "type": ["Post"], "date": "2025-01-02", "tags": ["thoughts"]},
            {"title": "C", "slug": "search", "status": ["Public"], "type": ["Post"], "date": "2025-01-03", "tags": ["thoughts"]}
        ]"#,
        );

        let report = validate_site(dir.path(), &site, &raw, &reference());
        assert!(report.errors.iter().any(|e| e == "Slug 'same' is used by 2 posts"));
        assert!(report.errors.iter().any(|e| e.contains("reserved or unsafe slug 'search'")));
        assert!(!report.is_ok());
    }

    #[test]
    fn test_category_coverage() {
        let dir = TempDir::new().unwrap();
        let site = parse_site_toml_str(SITE).unwrap();
        let raw = posts(
            r#"[
            {"title": "A", "slug": "a", "status": ["Public"], "type": ["Post"], "date": "2025-01-01", "tags": ["thoughts"]},
            {"title": "B", "slug": "b", "status": ["Public"], "type": ["Post"], "date": "2025-01-01", "tags": ["misc"]}
        ]"#,
        );

        let report = validate_site(dir.path(), &site, &raw, &reference());
        assert!(report.warnings.iter().any(|w| w == "Post 'b' matches no category (tags: misc)"));
        assert!(report.warnings.iter().any(|w| w == "Category 'reviews' has no posts"));
        assert!(report.info.iter().any(|i| i == "Child category 'thoughts/philosophy' has no posts"));
    }

    #[test]
    fn test_plugins_missing_ids() {
        let dir = TempDir::new().unwrap();
        let mut site = parse_site_toml_str(SITE).unwrap();
        site.plugins.google_analytics.enable = true;
        site.plugins.utterances.enable = true;

        let report = validate_site(dir.path(), &site, &[], &reference());
        assert!(report.warnings.iter().any(|w| w.contains("measurement_id is empty")));
        assert!(report.warnings.iter().any(|w| w.contains("repo is empty")));
    }

    #[test]
    fn test_cover_images_checked() {
        let dir = TempDir::new().unwrap();
        let static_dir = dir.path().join("static");
        fs::create_dir_all(&static_dir).unwrap();

        image::RgbImage::new(4, 3).save(static_dir.join("good.png")).unwrap();
        fs::write(static_dir.join("broken.png"), b"not an image").unwrap();

        let mut site = parse_site_toml_str(SITE).unwrap();
        site.profile.image = Some("/static/good.png".to_string());
        let raw = posts(
            r#"[
            {"title": "A", "slug": "a", "status": ["Public"], "type": ["Post"], "date": "2025-01-01", "tags": ["thoughts"], "cover": "/static/broken.png"},
            {"title": "B", "slug": "b", "status": ["Public"], "type": ["Post"], "date": "2025-01-01", "tags": ["reviews"], "cover": "missing.jpg"},
            {"title": "C", "slug": "c", "status": ["Public"], "type": ["Post"], "date": "2025-01-01", "tags": ["reviews"], "cover": "https://cdn.example.com/c.jpg"}
        ]"#,
        );

        let report = validate_site(dir.path(), &site, &raw, &reference());
        assert_eq!(report.errors.len(), 2, "{:?}", report.errors);
        assert!(report.errors.iter().any(|e| e.starts_with("post 'a' cover: cannot decode")));
        assert!(report.errors.iter().any(|e| e.starts_with("post 'b' cover: file not found")));
        assert!(report.info.iter().any(|i| i.starts_with("static/: 2 file(s)")));
    }

    #[test]
    fn test_local_image_path() {
        let root = Path::new("/site");
        assert_eq!(
            local_image_path(root, "/static/a.png"),
            Some(PathBuf::from("/site/static/a.png"))
        );
        assert_eq!(
            local_image_path(root, "covers/a.png"),
            Some(PathBuf::from("/site/static/covers/a.png"))
        );
        assert_eq!(local_image_path(root, "https://x.test/a.png"), None);
        assert_eq!(local_image_path(root, "data:image/png;base64,AAAA"), None);
        assert_eq!(local_image_path(root, "/static/../secret"), None);
    }
}
