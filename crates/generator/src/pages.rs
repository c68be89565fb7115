//! Page bodies. Each `render_*` returns a complete document.

use folio_core::date::{format_display_date, sort_key};
use folio_core::{Category, ChildCategory, ColorScheme, LinkIcon, Post, Site};
use folio_indexer::search::derive_category;
use folio_indexer::{CategoryView, SortOrder};

use crate::RenderOptions;
use crate::assets::{CATEGORY_JS, MINISEARCH_URL};
use crate::html::{PageMeta, html_escape, render_layout};
use crate::markdown::markdown_to_html;

/// How many recent posts the home page lists
pub const HOME_RECENT: usize = 6;

fn plural(n: usize) -> &'static str {
    if n == 1 { "" } else { "s" }
}

fn thumb(src: Option<&str>, alt: &str) -> String {
    match src {
        Some(src) => format!(
            r#"<div class="thumb"><img src="{}" alt="{}" loading="lazy"></div>"#,
            html_escape(src),
            html_escape(alt)
        ),
        None => r#"<div class="thumb"></div>"#.to_string(),
    }
}

/// Listing card; carries the data the category script filters and sorts on
pub fn post_card(post: &Post) -> String {
    let tags_lower: Vec<String> = post.tags.iter().map(|t| t.to_lowercase()).collect();
    let tags_json = serde_json::to_string(&tags_lower).unwrap_or_else(|_| "[]".to_string());

    let excerpt = post
        .summary
        .as_deref()
        .map(|s| format!(r#"<p class="excerpt">{}</p>"#, html_escape(s)))
        .unwrap_or_default();

    let tags: String = post
        .tags
        .iter()
        .take(3)
        .map(|t| format!("<small>#{}</small>", html_escape(t)))
        .collect();

    format!(
        r#"<a class="card" href="/{slug}" data-post data-tags="{tags_json}" data-sort="{sort}">
            {thumb}
            <div class="body">
                <h3>{title}</h3>
                {excerpt}
                <div class="meta"><span>{date}</span>{tags}</div>
            </div>
        </a>"#,
        slug = urlencoding::encode(&post.slug),
        tags_json = html_escape(&tags_json),
        sort = sort_key(&post.date),
        thumb = thumb(post.cover.as_deref(), &post.title),
        title = html_escape(&post.title),
        excerpt = excerpt,
        date = html_escape(&format_display_date(&post.date)),
        tags = tags,
    )
}

fn category_card(category: &Category, count: Option<usize>) -> String {
    let intro = category
        .intro
        .as_deref()
        .map(|i| format!(r#"<p class="excerpt">{}</p>"#, html_escape(i)))
        .unwrap_or_default();
    let count = count
        .map(|n| format!(r#"<div class="meta"><span>{} post{}</span></div>"#, n, plural(n)))
        .unwrap_or_default();

    format!(
        r#"<a class="card" href="{href}">
            {thumb}
            <div class="body"><h3>{name}</h3>{intro}{count}</div>
        </a>"#,
        href = html_escape(&category.path()),
        thumb = thumb(category.cover.as_deref(), &category.name),
        name = html_escape(&category.name),
        intro = intro,
        count = count,
    )
}

fn search_form(value: &str) -> String {
    format!(
        r#"<form class="search-form" id="search-form" role="search" action="/search" method="get">
            <input id="search-input" type="search" name="q" value="{}" placeholder="Search posts, tags…" aria-label="Search posts">
        </form>"#,
        html_escape(value)
    )
}

fn link_list(site: &Site) -> String {
    if site.links.is_empty() {
        return String::new();
    }
    let items: String = site
        .links
        .iter()
        .map(|link| {
            let icon = match link.icon {
                LinkIcon::Chess => "♞ ",
                LinkIcon::Link => "",
            };
            format!(
                r#"<a href="{}" target="_blank" rel="noreferrer">{}{}</a>"#,
                html_escape(&link.href),
                icon,
                html_escape(&link.label)
            )
        })
        .collect::<Vec<_>>()
        .join(" · ");
    format!(r#"<p class="links muted">{}</p>"#, items)
}

pub fn render_home(site: &Site, posts: &[Post], options: &RenderOptions) -> String {
    let avatar = site
        .profile
        .image
        .as_deref()
        .map(|src| {
            format!(
                r#"<img class="avatar" src="{}" alt="{} logo">"#,
                html_escape(src),
                html_escape(&site.blog.title)
            )
        })
        .unwrap_or_default();

    let categories: String = site
        .categories
        .iter()
        .map(|c| category_card(c, None))
        .collect();

    let mut recent: Vec<&Post> = posts.iter().collect();
    recent.sort_by_key(|p| std::cmp::Reverse(sort_key(&p.date)));
    let recent: String = recent
        .into_iter()
        .take(HOME_RECENT)
        .map(post_card)
        .collect();
    let recent = if recent.is_empty() {
        r#"<div class="empty">No posts yet.</div>"#.to_string()
    } else {
        format!(r#"<div class="grid">{}</div>"#, recent)
    };

    let body = format!(
        r#"<section class="hero">
            <h1>{avatar}{title}</h1>
            <p class="tagline">{description}</p>
            {search}
        </section>
        <section>
            <h2>Categories</h2>
            <div class="grid">{categories}</div>
            <p><a class="more" href="/category">Browse all categories →</a></p>
        </section>
        <section>
            <h2>Latest</h2>
            {recent}
        </section>
        {links}"#,
        avatar = avatar,
        title = html_escape(&site.blog.title),
        description = html_escape(&site.blog.description),
        search = search_form(""),
        categories = categories,
        recent = recent,
        links = link_list(site),
    );

    let meta = PageMeta::website(&site.blog.title, &site.blog.description, "/");
    render_layout(site, &meta, &body, options)
}

pub fn render_categories_index(site: &Site, posts: &[Post], options: &RenderOptions) -> String {
    let cards: String = site
        .categories
        .iter()
        .map(|c| {
            let count = posts.iter().filter(|p| p.has_tag(&c.slug)).count();
            category_card(c, Some(count))
        })
        .collect();

    let body = if cards.is_empty() {
        r#"<h1>Categories</h1><div class="empty">No categories configured.</div>"#.to_string()
    } else {
        format!(r#"<h1>Categories</h1><div class="grid">{}</div>"#, cards)
    };

    let meta = PageMeta::website(
        format!("Categories — {}", site.blog.title),
        &site.blog.description,
        "/category",
    );
    render_layout(site, &meta, &body, options)
}

/// Category or child-category listing.
///
/// The static build renders with no active tag and newest-first; the preview
/// server passes the request's `t`/`s` through. The embedded script
/// re-applies the query client-side either way.
pub fn render_category_page(
    site: &Site,
    category: &Category,
    child: Option<&ChildCategory>,
    view: &CategoryView,
    active_tag: Option<&str>,
    order: SortOrder,
    options: &RenderOptions,
) -> String {
    let active = active_tag
        .map(|t| t.trim().to_lowercase())
        .filter(|t| !t.is_empty());
    let visible = view.listing(active.as_deref(), order);
    let total = view.total();

    let (name, intro, path) = match child {
        Some(ch) => (
            ch.name.as_str(),
            ch.intro.as_deref(),
            format!("{}/{}", category.path(), ch.slug),
        ),
        None => (category.name.as_str(), category.intro.as_deref(), category.path()),
    };

    let mut crumbs = vec![r#"<a href="/">Home</a>"#.to_string()];
    if child.is_some() {
        crumbs.push(format!(
            r#"<a href="{}">{}</a>"#,
            html_escape(&category.path()),
            html_escape(&category.name)
        ));
    }
    crumbs.push(format!("<strong>{}</strong>", html_escape(name)));

    let children = if child.is_none() && !category.children.is_empty() {
        let links: String = category
            .children
            .iter()
            .map(|ch| {
                format!(
                    r#"<a class="badge" href="{}/{}">{}</a> "#,
                    html_escape(&category.path()),
                    html_escape(&ch.slug),
                    html_escape(&ch.name)
                )
            })
            .collect();
        format!(r#"<p class="children">{}</p>"#, links)
    } else {
        String::new()
    };

    let filtered_note = format!(
        r#"<span data-filtered{hidden}> • filtered by <strong>#{tag}</strong></span>"#,
        hidden = if active.is_some() { "" } else { " hidden" },
        tag = html_escape(active.as_deref().unwrap_or_default()),
    );

    let tag_query = |tag: &str| format!("?t={}&s={}", urlencoding::encode(tag), order);
    let tags = if view.tags.is_empty() {
        r#"<p class="muted">No tags yet.</p>"#.to_string()
    } else {
        let items: String = view
            .tags
            .iter()
            .map(|t| {
                let lower = t.to_lowercase();
                let class = if active.as_deref() == Some(lower.as_str()) {
                    r#" class="active""#
                } else {
                    ""
                };
                format!(
                    r#"<li><a href="{href}" data-tag-link="{tag}"{class} title="{title}">#{title}</a></li>"#,
                    href = html_escape(&tag_query(&lower)),
                    tag = html_escape(&lower),
                    class = class,
                    title = html_escape(t),
                )
            })
            .collect();
        format!(r#"<ul class="tag-list">{}</ul>"#, items)
    };

    let sort_link = |value: SortOrder, label: &str| {
        let href = match &active {
            Some(tag) => format!("?t={}&s={}", urlencoding::encode(tag), value),
            None => format!("?s={}", value),
        };
        let class = if value == order { r#" class="active""# } else { "" };
        format!(
            r#"<a href="{}" data-sort-link="{}"{}>{}</a>"#,
            html_escape(&href),
            value,
            class,
            label
        )
    };

    // Every post is emitted so the client script can re-filter; the
    // server-side listing decides initial order and visibility.
    let visible_slugs: Vec<&str> = visible.iter().map(|p| p.slug.as_str()).collect();
    let mut ordered: Vec<&Post> = visible.clone();
    ordered.extend(view.posts.iter().filter(|p| !visible_slugs.contains(&p.slug.as_str())));
    let cards: String = ordered
        .iter()
        .enumerate()
        .map(|(i, p)| {
            let card = post_card(p);
            if i < visible.len() {
                card
            } else {
                card.replacen("data-post ", "data-post hidden ", 1)
            }
        })
        .collect();

    let empty_text = match &active {
        Some(tag) => format!("No posts for <strong>#{}</strong>.", html_escape(tag)),
        None => "No posts yet in this category.".to_string(),
    };

    let body = format!(
        r#"<section class="hero">
            <div class="breadcrumbs">{crumbs}</div>
            <h1>{name}</h1>
            {intro}
            {children}
            <p class="muted"><span>{total} post{plural}</span>{filtered_note}</p>
        </section>
        <div class="shell">
            <aside>
                <h4>Tags</h4>
                {clear}
                {tags}
            </aside>
            <section>
                <div class="toolbar">
                    <span>Showing <strong data-shown>{shown}</strong> of <strong>{total}</strong></span>
                    <span class="sort" role="radiogroup" aria-label="Sort">{newest}{oldest}</span>
                </div>
                <div class="empty" data-empty{empty_hidden}>{empty_text}</div>
                <div class="grid" data-listing>{cards}</div>
            </section>
        </div>
        {script}"#,
        crumbs = crumbs.join(" <span>→</span> "),
        name = html_escape(name),
        intro = intro
            .map(|i| format!(r#"<p class="tagline">{}</p>"#, html_escape(i)))
            .unwrap_or_default(),
        children = children,
        total = total,
        plural = plural(total),
        filtered_note = filtered_note,
        clear = if active.is_some() {
            format!(r#"<a class="muted" href="{}" title="Clear tag filter">Clear</a>"#, html_escape(&path))
        } else {
            String::new()
        },
        tags = tags,
        shown = visible.len(),
        newest = sort_link(SortOrder::Newest, "Newest"),
        oldest = sort_link(SortOrder::Oldest, "Oldest"),
        empty_hidden = if visible.is_empty() { "" } else { " hidden" },
        empty_text = empty_text,
        cards = cards,
        script = CATEGORY_JS,
    );

    let meta = PageMeta::website(
        format!("{} — {}", name, site.blog.title),
        intro.unwrap_or(&site.blog.description),
        path,
    );
    render_layout(site, &meta, &body, options)
}

/// Search page shell; results are filled in by `search.js`
pub fn render_search_page(site: &Site, index_url: &str, options: &RenderOptions) -> String {
    let body = format!(
        r#"<section class="hero">
            <h1>Search</h1>
            <p class="muted">Find posts by <em>title</em>, <em>summary</em>, <em>tags</em>, or <em>category</em>.</p>
            {form}
        </section>
        <div id="search-results">
            <div class="empty">Type to search. Try a category name or a tag.</div>
        </div>
        <noscript><div class="empty">Search needs JavaScript.</div></noscript>
        <script src="{minisearch}" defer></script>
        <script src="/search.js" data-index="{index_url}" defer></script>"#,
        form = search_form(""),
        minisearch = MINISEARCH_URL,
        index_url = html_escape(index_url),
    );

    let meta = PageMeta::website(
        format!("Search — {}", site.blog.title),
        "Find posts by title, summary, tags, or category.",
        "/search",
    );
    render_layout(site, &meta, &body, options)
}

/// Utterances theme for the configured scheme
pub fn utterances_theme(scheme: ColorScheme) -> &'static str {
    match scheme {
        ColorScheme::Dark => "github-dark",
        ColorScheme::Light => "github-light",
        ColorScheme::System => "preferred-color-scheme",
    }
}

/// Comment embed: Utterances when enabled, otherwise Cusdis, otherwise nothing
pub fn comment_box(site: &Site, post: &Post) -> String {
    let utterances = &site.plugins.utterances;
    if utterances.enable {
        if utterances.repo.is_empty() {
            return String::new();
        }
        let label = utterances
            .label
            .as_deref()
            .filter(|l| !l.is_empty())
            .map(|l| format!(r#" label="{}""#, html_escape(l)))
            .unwrap_or_default();
        return format!(
            r#"<section class="comments"><script src="https://utteranc.es/client.js" repo="{}" issue-term="{}" theme="{}"{} crossorigin="anonymous" async></script></section>"#,
            html_escape(&utterances.repo),
            html_escape(&utterances.issue_term),
            utterances_theme(site.blog.scheme),
            label
        );
    }

    let cusdis = &site.plugins.cusdis;
    if cusdis.enable && !cusdis.app_id.is_empty() {
        let host = cusdis.host.trim_end_matches('/');
        let theme = match site.blog.scheme {
            ColorScheme::System => "auto",
            other => other.as_str(),
        };
        return format!(
            r#"<section class="comments"><div id="cusdis_thread" data-host="{host}" data-app-id="{app}" data-page-id="{id}" data-page-url="{url}" data-page-title="{title}" data-theme="{theme}"></div><script async defer src="{host}/js/cusdis.es.js"></script></section>"#,
            host = html_escape(host),
            app = html_escape(&cusdis.app_id),
            id = html_escape(&post.id),
            url = html_escape(&site.url_for(&post.path())),
            title = html_escape(&post.title),
            theme = theme,
        );
    }

    String::new()
}

/// Where a tag badge on a post links to
fn tag_href(site: &Site, tag: &str) -> String {
    let lower = tag.to_lowercase();
    for category in &site.categories {
        if category.slug.to_lowercase() == lower {
            return category.path();
        }
        if let Some(child) = category
            .children
            .iter()
            .find(|c| c.slug.to_lowercase() == lower)
        {
            return format!("{}/{}", category.path(), child.slug);
        }
    }
    format!("/search?q={}", urlencoding::encode(tag))
}

pub fn render_post_page(site: &Site, post: &Post, options: &RenderOptions) -> String {
    let tags_lower: Vec<String> = post.tags.iter().map(|t| t.to_lowercase()).collect();
    let (category, _) = derive_category(&tags_lower, &site.categories);

    let mut crumbs = vec![r#"<a href="/">Home</a>"#.to_string()];
    if let Some(cat) = category.as_deref().and_then(|slug| site.category(slug)) {
        crumbs.push(format!(
            r#"<a href="{}">{}</a>"#,
            html_escape(&cat.path()),
            html_escape(&cat.name)
        ));
    }

    let tags: String = post
        .tags
        .iter()
        .map(|t| {
            format!(
                r#"<a class="badge" href="{}">#{}</a> "#,
                html_escape(&tag_href(site, t)),
                html_escape(t)
            )
        })
        .collect();

    let cover = post
        .cover
        .as_deref()
        .map(|src| {
            format!(
                r#"<img class="cover" src="{}" alt="{}">"#,
                html_escape(src),
                html_escape(&post.title)
            )
        })
        .unwrap_or_default();

    let content = match post.content.as_deref() {
        Some(md) if !md.trim().is_empty() => markdown_to_html(md),
        _ => post
            .summary
            .as_deref()
            .map(|s| format!("<p>{}</p>", html_escape(s)))
            .unwrap_or_default(),
    };

    let body = format!(
        r#"<article class="post">
            <div class="breadcrumbs">{crumbs}</div>
            <h1>{title}</h1>
            <p class="muted"><time datetime="{date}">{display_date}</time></p>
            <p class="tags">{tags}</p>
            {cover}
            <div class="content">{content}</div>
            {comments}
        </article>"#,
        crumbs = crumbs.join(" <span>→</span> "),
        title = html_escape(&post.title),
        date = html_escape(&post.date),
        display_date = html_escape(&format_display_date(&post.date)),
        tags = tags,
        cover = cover,
        content = content,
        comments = comment_box(site, post),
    );

    let meta = PageMeta {
        title: format!("{} — {}", post.title, site.blog.title),
        description: post
            .summary
            .clone()
            .unwrap_or_else(|| site.blog.description.clone()),
        path: post.path(),
        kind: "article",
        image: post.cover.clone(),
    };
    render_layout(site, &meta, &body, options)
}

pub fn render_about_page(site: &Site, options: &RenderOptions) -> String {
    let profile = &site.profile;

    let image = profile
        .image
        .as_deref()
        .map(|src| {
            format!(
                r#"<img class="avatar" src="{}" alt="{}">"#,
                html_escape(src),
                html_escape(&profile.name)
            )
        })
        .unwrap_or_default();

    let mut contacts = Vec::new();
    if let Some(email) = &profile.email {
        contacts.push(format!(
            r#"<a href="mailto:{0}">{0}</a>"#,
            html_escape(email)
        ));
    }
    for (label, base, handle) in [
        ("GitHub", "https://github.com/", &profile.github),
        ("LinkedIn", "https://www.linkedin.com/in/", &profile.linkedin),
        ("Instagram", "https://www.instagram.com/", &profile.instagram),
    ] {
        if let Some(handle) = handle {
            contacts.push(format!(
                r#"<a href="{}{}" target="_blank" rel="noreferrer">{}</a>"#,
                base,
                urlencoding::encode(handle),
                label
            ));
        }
    }

    let projects = if site.projects.is_empty() {
        String::new()
    } else {
        let items: String = site
            .projects
            .iter()
            .map(|p| {
                format!(
                    r#"<li><a href="{}" target="_blank" rel="noreferrer">{}</a></li>"#,
                    html_escape(&p.href),
                    html_escape(&p.name)
                )
            })
            .collect();
        format!("<h2>Projects</h2><ul>{}</ul>", items)
    };

    let body = format!(
        r#"<section class="hero">
            <h1>{image}{name}</h1>
            {role}
            {bio}
            <p class="links">{contacts}</p>
        </section>
        {projects}
        {links}"#,
        image = image,
        name = html_escape(&profile.name),
        role = profile
            .role
            .as_deref()
            .map(|r| format!(r#"<p class="tagline">{}</p>"#, html_escape(r)))
            .unwrap_or_default(),
        bio = profile
            .bio
            .as_deref()
            .map(|b| format!("<p>{}</p>", html_escape(b)))
            .unwrap_or_default(),
        contacts = contacts.join(" · "),
        projects = projects,
        links = link_list(site),
    );

    let meta = PageMeta::website(
        format!("About — {}", site.blog.title),
        profile.bio.as_deref().unwrap_or(&site.blog.description),
        "/about",
    );
    render_layout(site, &meta, &body, options)
}

pub fn render_not_found(site: &Site, path: &str, options: &RenderOptions) -> String {
    let body = format!(
        r#"<section class="hero"><h1>Not found</h1><p class="muted">Nothing lives at <code>{}</code>.</p><p><a href="/">← Home</a></p></section>"#,
        html_escape(path)
    );
    let meta = PageMeta::website(
        format!("Not found — {}", site.blog.title),
        &site.blog.description,
        path,
    );
    render_layout(site, &meta, &body, options)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::{options, sample_posts, sample_site};
    use folio_indexer::category_view;

    #[test]
    fn test_home_lists_categories_and_recent_posts() {
        let site = sample_site();
        let html = render_home(&site, &sample_posts(), &options());
        assert!(html.contains(r#"href="/category/thoughts""#));
        assert!(html.contains(r#"href="/category/ideas""#));
        assert!(html.contains("Philosophy Notes"));
        assert!(html.contains(r#"action="/search""#));
        // newest first
        let love = html.find("On Love").unwrap();
        let phil = html.find("Philosophy Notes").unwrap();
        assert!(love < phil);
    }

    #[test]
    fn test_home_without_posts() {
        let html = render_home(&sample_site(), &[], &options());
        assert!(html.contains("No posts yet."));
    }

    #[test]
    fn test_category_page_default_listing() {
        let site = sample_site();
        let posts = sample_posts();
        let view = category_view(&posts, "thoughts");
        let category = site.category("thoughts").unwrap();
        let html = render_category_page(&site, category, None, &view, None, SortOrder::Newest, &options());

        assert!(html.contains("Showing <strong data-shown>2</strong> of <strong>2</strong>"));
        assert!(html.contains(r#"data-tag-link="love""#));
        assert!(html.contains(r#"data-tag-link="philosophy""#));
        assert!(!html.contains(r#"data-tag-link="thoughts""#));
        assert!(html.contains(r#"<div class="empty" data-empty hidden>"#));
        assert!(html.contains(r#"href="/category/thoughts/philosophy""#));
    }

    #[test]
    fn test_category_page_active_tag() {
        let site = sample_site();
        let posts = sample_posts();
        let view = category_view(&posts, "thoughts");
        let category = site.category("thoughts").unwrap();
        let html = render_category_page(
            &site,
            category,
            None,
            &view,
            Some("Love"),
            SortOrder::Oldest,
            &options(),
        );

        assert!(html.contains("Showing <strong data-shown>1</strong> of <strong>2</strong>"));
        assert!(html.contains(r#"data-tag-link="love" class="active""#));
        assert!(html.contains("filtered by <strong>#love</strong>"));
        assert!(html.contains(r#"href="?t=love&amp;s=old" data-sort-link="old" class="active""#));
        assert!(html.contains("data-post hidden"));
        assert!(html.contains("Clear tag filter"));
    }

    #[test]
    fn test_category_page_unknown_tag_shows_empty_state() {
        let site = sample_site();
        let posts = sample_posts();
        let view = category_view(&posts, "thoughts");
        let category = site.category("thoughts").unwrap();
        let html = render_category_page(
            &site,
            category,
            None,
            &view,
            Some("nothing"),
            SortOrder::Newest,
            &options(),
        );
        assert!(html.contains(r#"<div class="empty" data-empty>No posts for <strong>#nothing</strong>."#));
    }

    #[test]
    fn test_child_category_page() {
        let site = sample_site();
        let posts = sample_posts();
        let category = site.category("thoughts").unwrap();
        let child = category.child("philosophy").unwrap();
        let view = category_view(&posts, "thoughts").narrow("philosophy");
        let html = render_category_page(
            &site,
            category,
            Some(child),
            &view,
            None,
            SortOrder::Newest,
            &options(),
        );

        assert!(html.contains("<strong>Philosophy</strong>"));
        assert!(html.contains(r#"<a href="/category/thoughts">Thoughts</a>"#));
        assert!(html.contains("https://example.com/category/thoughts/philosophy"));
        assert!(html.contains("1 post<"));
    }

    #[test]
    fn test_search_page_prompt_state() {
        let html = render_search_page(&sample_site(), "/search-index.json?v=abc", &options());
        assert!(html.contains("Type to search."));
        assert!(html.contains(r#"data-index="/search-index.json?v=abc""#));
        assert!(html.contains(r#"id="search-input""#));
    }

    #[test]
    fn test_search_page_loads_minisearch_before_search_script() {
        let html = render_search_page(&sample_site(), "/search-index.json", &options());
        let library = html.find(MINISEARCH_URL).unwrap();
        let script = html.find(r#"src="/search.js""#).unwrap();
        assert!(library < script);

        let js = crate::assets::SEARCH_JS;
        assert!(js.contains("new MiniSearch("));
        assert!(js.contains("fuzzy: opts.fuzzy"));
        assert!(js.contains("maxFuzzy: opts.max_fuzzy"));
        assert!(!js.contains("levenshtein"));
    }

    #[test]
    fn test_post_page_renders_markdown_and_breadcrumbs() {
        let site = sample_site();
        let post = &sample_posts()[0];
        let html = render_post_page(&site, post, &options());

        assert!(html.contains("<h1>Philosophy Notes</h1>"));
        assert!(html.contains("<strong>Stoics</strong>"));
        assert!(html.contains(r#"<a href="/category/thoughts">Thoughts</a>"#));
        assert!(html.contains(r#"href="/category/thoughts/philosophy">#philosophy</a>"#));
        assert!(html.contains("Jan 05, 2025"));
        assert!(html.contains(r#"<meta property="og:type" content="article">"#));
    }

    #[test]
    fn test_post_page_falls_back_to_summary() {
        let site = sample_site();
        let post = &sample_posts()[1];
        let html = render_post_page(&site, post, &options());
        assert!(html.contains("<p>What it means</p>"));
    }

    #[test]
    fn test_comment_box_utterances() {
        let mut site = sample_site();
        let post = &sample_posts()[0];
        assert_eq!(comment_box(&site, post), "");

        site.plugins.utterances.enable = true;
        assert_eq!(comment_box(&site, post), "");

        site.plugins.utterances.repo = "me/blog-comments".to_string();
        site.plugins.cusdis.enable = true;
        site.plugins.cusdis.app_id = "app".to_string();
        let html = comment_box(&site, post);
        assert!(html.contains(r#"repo="me/blog-comments""#));
        assert!(html.contains(r#"issue-term="og:title""#));
        assert!(html.contains(r#"theme="github-dark""#));
        assert!(!html.contains("cusdis"));
    }

    #[test]
    fn test_comment_box_cusdis_fallback() {
        let mut site = sample_site();
        site.plugins.cusdis.enable = true;
        site.plugins.cusdis.app_id = "abc-123".to_string();
        let html = comment_box(&site, &sample_posts()[0]);
        assert!(html.contains(r#"data-app-id="abc-123""#));
        assert!(html.contains("https://cusdis.com/js/cusdis.es.js"));
    }

    #[test]
    fn test_utterances_theme() {
        assert_eq!(utterances_theme(ColorScheme::Dark), "github-dark");
        assert_eq!(utterances_theme(ColorScheme::Light), "github-light");
        assert_eq!(utterances_theme(ColorScheme::System), "preferred-color-scheme");
    }

    #[test]
    fn test_about_page() {
        let mut site = sample_site();
        site.profile.github = Some("octo".to_string());
        site.profile.email = Some("me@example.com".to_string());
        let html = render_about_page(&site, &options());
        assert!(html.contains("https://github.com/octo"));
        assert!(html.contains("mailto:me@example.com"));
        assert!(html.contains(r#"<a href="/about" class="active">About</a>"#));
    }

    #[test]
    fn test_post_card_data_attributes() {
        let card = post_card(&sample_posts()[0]);
        assert!(card.contains(r#"data-tags="[&quot;thoughts&quot;,&quot;philosophy&quot;]""#));
        assert!(card.contains(r#"href="/philosophy-notes""#));
    }

    #[test]
    fn test_links_percent_encode_slugs_and_tags() {
        let mut post = sample_posts()[0].clone();
        post.slug = "café notes".to_string();
        assert!(post_card(&post).contains(r#"href="/caf%C3%A9%20notes""#));
        assert_eq!(tag_href(&sample_site(), "c++ & rust"), "/search?q=c%2B%2B%20%26%20rust");
    }
}
