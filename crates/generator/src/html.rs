//! Shared page shell: head metadata, navigation, third-party scripts and footer.
//!
//! Every generated page goes through [`render_layout`] so the preview server
//! and the static build emit the same markup.

use folio_core::{ColorScheme, Site};

use crate::RenderOptions;
use crate::assets::STYLE;

/// HTML-escape a string for element content and quoted attributes
///
/// Escapes: & < > " '
pub fn html_escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            _ => out.push(c),
        }
    }
    out
}

/// Per-page head metadata
#[derive(Debug, Clone)]
pub struct PageMeta {
    pub title: String,
    pub description: String,
    /// Site-relative URL path, e.g. `/category/thoughts`
    pub path: String,
    /// `og:type`
    pub kind: &'static str,
    pub image: Option<String>,
}

impl PageMeta {
    pub fn website(title: impl Into<String>, description: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            path: path.into(),
            kind: "website",
            image: None,
        }
    }
}

/// Navigation entry: (label, href)
pub fn nav_items(site: &Site) -> Vec<(String, String)> {
    let mut items = vec![("Home".to_string(), "/".to_string())];
    items.extend(site.categories.iter().map(|c| (c.name.clone(), c.path())));
    items.push(("About".to_string(), "/about".to_string()));
    items
}

/// `/` is active only on the home page; every other entry by path prefix
pub fn is_active(current: &str, href: &str) -> bool {
    if href == "/" {
        current == "/"
    } else {
        current.starts_with(href)
    }
}

fn render_nav(site: &Site, current: &str) -> String {
    let items: String = nav_items(site)
        .iter()
        .map(|(label, href)| {
            let class = if is_active(current, href) {
                r#" class="active""#
            } else {
                ""
            };
            format!(
                r#"<li><a href="{}"{}>{}</a></li>"#,
                html_escape(href),
                class,
                html_escape(label)
            )
        })
        .collect();

    format!(
        r#"<nav class="navbar"><a class="brand" href="/">{}</a><ul>{}</ul><button class="scheme-toggle" type="button" aria-label="Toggle color scheme">◐</button></nav>"#,
        html_escape(&site.blog.title),
        items
    )
}

/// OG image: page image, generated title card, or the profile image
fn og_image(site: &Site, meta: &PageMeta) -> Option<String> {
    if let Some(image) = &meta.image {
        return Some(image.clone());
    }
    if let Some(base) = &site.settings.og_image_generate_url {
        return Some(format!(
            "{}/{}.png",
            base.trim_end_matches('/'),
            urlencoding::encode(&meta.title)
        ));
    }
    site.profile.image.clone()
}

fn render_head_meta(site: &Site, meta: &PageMeta) -> String {
    let url = site.url_for(&meta.path);
    let mut head = format!(
        r#"<title>{title}</title>
    <meta name="description" content="{description}">
    <link rel="canonical" href="{url}">
    <meta property="og:type" content="{kind}">
    <meta property="og:title" content="{title}">
    <meta property="og:description" content="{description}">
    <meta property="og:url" content="{url}">
    <meta name="twitter:card" content="summary_large_image">"#,
        title = html_escape(&meta.title),
        description = html_escape(&meta.description),
        url = html_escape(&url),
        kind = meta.kind,
    );

    if let Some(image) = og_image(site, meta) {
        head.push_str(&format!(
            "\n    <meta property=\"og:image\" content=\"{}\">",
            html_escape(&image)
        ));
    }

    if let Some(token) = site.plugins.google_search_console.active_token() {
        head.push_str(&format!(
            "\n    <meta name=\"google-site-verification\" content=\"{}\">",
            html_escape(token)
        ));
    }
    if let Some(token) = site.plugins.naver_search_advisor.active_token() {
        head.push_str(&format!(
            "\n    <meta name=\"naver-site-verification\" content=\"{}\">",
            html_escape(token)
        ));
    }

    head
}

/// gtag snippet, empty unless analytics is enabled with an id
pub fn analytics_script(site: &Site) -> String {
    let Some(id) = site.plugins.google_analytics.active_id() else {
        return String::new();
    };
    let id = html_escape(id);

    format!(
        r#"<script async src="https://www.googletagmanager.com/gtag/js?id={id}"></script>
    <script>
        window.dataLayer = window.dataLayer || [];
        function gtag(){{dataLayer.push(arguments);}}
        gtag('js', new Date());
        gtag('config', '{id}');
    </script>"#
    )
}

/// Scheme the page starts with before the cookie/OS check runs
fn initial_scheme(scheme: ColorScheme) -> &'static str {
    match scheme {
        ColorScheme::Light => "light",
        ColorScheme::Dark | ColorScheme::System => "dark",
    }
}

fn scheme_script(scheme: ColorScheme) -> String {
    format!(
        r#"<script>
        (function () {{
            var root = document.documentElement;
            var cached = document.cookie.match(/(?:^|; )scheme=(light|dark)/);
            var fallback = {follows} ? (window.matchMedia('(prefers-color-scheme: dark)').matches ? 'dark' : 'light') : '{initial}';
            root.dataset.scheme = cached ? cached[1] : fallback;
            document.addEventListener('click', function (e) {{
                if (!e.target.closest || !e.target.closest('.scheme-toggle')) return;
                var next = root.dataset.scheme === 'dark' ? 'light' : 'dark';
                root.dataset.scheme = next;
                document.cookie = 'scheme=' + next + '; path=/; max-age=31536000';
            }});
        }})();
    </script>"#,
        follows = scheme == ColorScheme::System,
        initial = initial_scheme(scheme),
    )
}

const RELOAD_SCRIPT: &str = r#"<script>
        // Hot reload via Server-Sent Events
        const eventSource = new EventSource('/_reload');
        eventSource.onmessage = () => location.reload();
        eventSource.onerror = () => eventSource.close();
    </script>"#;

fn render_footer(site: &Site, options: &RenderOptions) -> String {
    let years = match site.settings.since {
        Some(since) if since < options.year => format!("{}-{}", since, options.year),
        _ => options.year.to_string(),
    };
    let note = if options.preview {
        " • Preview • Press Ctrl+C to stop"
    } else {
        ""
    };

    format!(
        r#"<footer class="site-footer">© {} {}{}</footer>"#,
        years,
        html_escape(&site.profile.name),
        note
    )
}

/// Wrap page body markup in the full document shell
pub fn render_layout(site: &Site, meta: &PageMeta, body: &str, options: &RenderOptions) -> String {
    let preview_badge = if options.preview {
        r#"<div class="preview-badge">PREVIEW</div>"#
    } else {
        ""
    };
    let reload_script = if options.preview { RELOAD_SCRIPT } else { "" };

    format!(
        r#"<!DOCTYPE html>
<html lang="{lang}" data-scheme="{scheme}">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    {head}
    <style>{style}</style>
    {scheme_script}
    {analytics}
</head>
<body>
    {preview_badge}
    {nav}
    <main class="container">
{body}
    </main>
    {footer}
    {reload_script}
</body>
</html>
"#,
        lang = html_escape(&site.settings.lang),
        scheme = initial_scheme(site.blog.scheme),
        head = render_head_meta(site, meta),
        style = STYLE,
        scheme_script = scheme_script(site.blog.scheme),
        analytics = analytics_script(site),
        nav = render_nav(site, &meta.path),
        footer = render_footer(site, options),
    )
}
