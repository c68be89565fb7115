use folio_core::Site;

use crate::html::html_escape;

/// One `<url>` entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SitemapEntry {
    /// Site-relative path
    pub path: String,
    pub lastmod: Option<String>,
    pub priority: &'static str,
}

/// Build `sitemap.xml`; API routes never appear
pub fn sitemap_xml(site: &Site, entries: &[SitemapEntry]) -> String {
    let mut xml = String::from(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">
"#,
    );

    for entry in entries.iter().filter(|e| !e.path.starts_with("/api/")) {
        xml.push_str("  <url>\n");
        xml.push_str(&format!(
            "    <loc>{}</loc>\n",
            html_escape(&site.url_for(&entry.path))
        ));
        if let Some(lastmod) = &entry.lastmod {
            xml.push_str(&format!("    <lastmod>{}</lastmod>\n", html_escape(lastmod)));
        }
        xml.push_str(&format!("    <priority>{}</priority>\n", entry.priority));
        xml.push_str("  </url>\n");
    }

    xml.push_str("</urlset>\n");
    xml
}

pub fn robots_txt(site: &Site) -> String {
    format!(
        "User-agent: *\nAllow: /\n\nSitemap: {}\n",
        site.url_for("/sitemap.xml")
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::sample_site;

    #[test]
    fn test_sitemap_lists_entries() {
        let site = sample_site();
        let entries = vec![
            SitemapEntry {
                path: "/".to_string(),
                lastmod: None,
                priority: "1.0",
            },
            SitemapEntry {
                path: "/hello".to_string(),
                lastmod: Some("2025-08-28".to_string()),
                priority: "0.8",
            },
            SitemapEntry {
                path: "/api/search".to_string(),
                lastmod: None,
                priority: "0.1",
            },
        ];
        let xml = sitemap_xml(&site, &entries);
        assert!(xml.contains("<loc>https://example.com/</loc>"));
        assert!(xml.contains("<loc>https://example.com/hello</loc>"));
        assert!(xml.contains("<lastmod>2025-08-28</lastmod>"));
        assert!(!xml.contains("/api/"));
        assert!(xml.ends_with("</urlset>\n"));
    }

    #[test]
    fn test_robots_points_at_sitemap() {
        let robots = robots_txt(&sample_site());
        assert!(robots.starts_with("User-agent: *\nAllow: /"));
        assert!(robots.contains("Sitemap: https://example.com/sitemap.xml"));
    }
}
