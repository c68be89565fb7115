use anyhow::{Context, Result};
use axum::{
    Json, Router,
    extract::{Query, State},
    http::{StatusCode, Uri, header},
    response::{
        Html, IntoResponse, Response,
        sse::{Event, KeepAlive, Sse},
    },
    routing::get,
};
use folio_core::{Post, ReferenceTime, Site, filter_posts};
use folio_generator::{
    GeneratedSite, RenderOptions, generate_site, output_path, pages, publishable_posts,
};
use folio_indexer::{SearchHit, SearchIndex, SearchOptions, SortOrder, category_view};
use notify::{Event as NotifyEvent, EventKind, RecursiveMode, Watcher};
use serde::Deserialize;
use std::collections::HashMap;
use std::{net::SocketAddr, path::PathBuf, sync::Arc, time::Duration};
use tokio::sync::{RwLock, broadcast};
use tower_http::{services::ServeDir, trace::TraceLayer};
use tracing::{error, info};

use super::site;

/// One generation of the site: the publishable posts and everything rendered from them
struct Snapshot {
    posts: Vec<Post>,
    generated: GeneratedSite,
    index: SearchIndex,
    options: RenderOptions,
}

impl Snapshot {
    /// Duplicate and reserved slugs are dropped here too, so category listings
    /// and `/api/search` agree with the generated pages.
    fn build(site: &Site, posts: &[Post], reference: &ReferenceTime) -> Result<Self> {
        let options = RenderOptions::new(true, reference);
        let posts = publishable_posts(posts);
        let generated = generate_site(site, &posts, &options);
        let index = SearchIndex::from_posts(&posts, &site.categories, SearchOptions::default())
            .context("Failed to build search index")?;

        Ok(Self {
            posts,
            generated,
            index,
            options,
        })
    }
}

#[derive(Clone)]
pub struct AppState {
    path: PathBuf,
    site: Arc<Site>,
    snapshot: Arc<RwLock<Snapshot>>,
    reload_tx: broadcast::Sender<()>,
}

impl AppState {
    /// Load the site directory and render the first snapshot
    pub async fn load(path: PathBuf) -> Result<Self> {
        let loaded = site::load(&path).await?;
        let snapshot = Snapshot::build(&loaded.site, &loaded.posts, &loaded.reference)?;
        let (reload_tx, _) = broadcast::channel::<()>(100);

        Ok(Self {
            path,
            site: Arc::new(loaded.site),
            snapshot: Arc::new(RwLock::new(snapshot)),
            reload_tx,
        })
    }

    /// Refetch posts and swap in a fresh snapshot.
    ///
    /// On error the previous snapshot stays in place.
    pub async fn rebuild(&self) -> Result<usize> {
        let raw_posts = site::fetch_raw_posts(&self.site, &self.path).await?;
        let reference = ReferenceTime::current(self.site.settings.timezone);
        let posts = filter_posts(&raw_posts, &self.site.filter, &reference);

        let snapshot = Snapshot::build(&self.site, &posts, &reference)?;
        let count = snapshot.posts.len();
        *self.snapshot.write().await = snapshot;

        let _ = self.reload_tx.send(());
        Ok(count)
    }
}

/// Serve the site locally, rebuilding on file changes and every `revalidate_secs`.
pub async fn run(path: PathBuf, port: u16) -> Result<()> {
    println!("📰 Starting preview server...");
    println!("   Site: {}", path.display());

    let state = AppState::load(path.clone()).await?;
    {
        let snapshot = state.snapshot.read().await;
        println!("   ✓ Loaded: {}", state.site.blog.title);
        println!("   ✓ Posts: {}", snapshot.posts.len());
        println!("   ✓ Pages: {}", snapshot.generated.pages.len());
    }

    let watcher_state = state.clone();
    tokio::spawn(async move {
        if let Err(e) = watch_files(watcher_state).await {
            error!(error = %e, "file watcher stopped");
        }
    });

    let interval_state = state.clone();
    tokio::spawn(revalidate_loop(interval_state));

    let addr = SocketAddr::from(([127, 0, 0, 1], port));
    println!("\n🚀 Preview ready at: http://localhost:{}", port);
    println!(
        "   Revalidating every {}s; site.toml changes need a restart",
        state.site.settings.revalidate_secs
    );
    println!("   Press Ctrl+C to stop\n");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("Failed to bind to port")?;

    axum::serve(listener, router(state))
        .await
        .context("Server error")?;

    Ok(())
}

pub fn router(state: AppState) -> Router {
    let static_dir = state.path.join("static");

    Router::new()
        .route("/_reload", get(sse_handler))
        .route("/api/search", get(search_handler))
        .nest_service("/static", ServeDir::new(static_dir))
        .fallback(page_handler)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn rebuild_and_log(state: &AppState, trigger: &str) {
    match state.rebuild().await {
        Ok(count) => {
            info!(trigger, posts = count, "rebuilt site");
            println!("   🔄 Rebuilt ({}): {} posts", trigger, count);
        }
        Err(e) => {
            error!(trigger, error = %format!("{:#}", e), "rebuild failed, keeping previous site");
        }
    }
}

async fn revalidate_loop(state: AppState) {
    let mut ticker = tokio::time::interval(Duration::from_secs(state.site.settings.revalidate_secs));
    // The first tick fires immediately and the initial build already ran
    ticker.tick().await;

    loop {
        ticker.tick().await;
        rebuild_and_log(&state, "interval").await;
    }
}

/// Watch the site directory and rebuild on changes
async fn watch_files(state: AppState) -> Result<()> {
    let (tx, mut rx) = tokio::sync::mpsc::channel(100);

    let mut watcher =
        notify::recommended_watcher(move |res: Result<NotifyEvent, notify::Error>| {
            if let Ok(event) = res {
                let _ = tx.blocking_send(event);
            }
        })?;

    watcher.watch(&state.path, RecursiveMode::Recursive)?;

    while let Some(event) = rx.recv().await {
        if !is_relevant(&event) {
            continue;
        }

        // Editors emit bursts of events per save
        tokio::time::sleep(Duration::from_millis(150)).await;
        while rx.try_recv().is_ok() {}

        println!("   📝 File changed, rebuilding...");
        rebuild_and_log(&state, "file change").await;
    }

    Ok(())
}

fn is_relevant(event: &NotifyEvent) -> bool {
    matches!(
        event.kind,
        EventKind::Modify(_) | EventKind::Create(_) | EventKind::Remove(_)
    ) && event.paths.iter().any(|p| {
        let filename = p.file_name().unwrap_or_default().to_string_lossy();
        !filename.starts_with('.') && !filename.ends_with('~')
    })
}

/// SSE endpoint for hot reload
async fn sse_handler(
    State(state): State<AppState>,
) -> Sse<impl futures::Stream<Item = Result<Event, std::convert::Infallible>>> {
    let mut rx = state.reload_tx.subscribe();

    let stream = async_stream::stream! {
        loop {
            match rx.recv().await {
                Ok(()) => yield Ok(Event::default().data("reload")),
                Err(broadcast::error::RecvError::Lagged(_)) => continue,
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
    };

    Sse::new(stream).keep_alive(KeepAlive::default())
}

#[derive(Debug, Deserialize)]
struct SearchQuery {
    #[serde(default)]
    q: String,
}

async fn search_handler(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> Result<Json<Vec<SearchHit>>, StatusCode> {
    let snapshot = state.snapshot.read().await;
    snapshot.index.search(&query.q).map(Json).map_err(|e| {
        error!("Search failed for {:?}: {}", query.q, e);
        StatusCode::INTERNAL_SERVER_ERROR
    })
}

/// Generated pages and assets, with category listings rendered per request
/// so `t` and `s` apply server-side.
async fn page_handler(
    State(state): State<AppState>,
    uri: Uri,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    let snapshot = state.snapshot.read().await;
    let decoded = urlencoding::decode(uri.path());
    let path = match &decoded {
        Ok(path) => path.as_ref(),
        Err(_) => uri.path(),
    };

    if let Some(html) = render_category(&state.site, &snapshot, path, &params) {
        return Html(html).into_response();
    }

    if let Some(html) = snapshot.generated.page(path) {
        return Html(html.to_string()).into_response();
    }

    if let Some(data) = snapshot.generated.asset(path) {
        let mime = mime_guess::from_path(output_path(path)).first_or_octet_stream();
        return ([(header::CONTENT_TYPE, mime.to_string())], data.to_vec()).into_response();
    }

    let html = pages::render_not_found(&state.site, path, &snapshot.options);
    (StatusCode::NOT_FOUND, Html(html)).into_response()
}

/// `/category/{slug}` or `/category/{slug}/{child}`; `None` for anything else
fn render_category(
    site: &Site,
    snapshot: &Snapshot,
    path: &str,
    params: &HashMap<String, String>,
) -> Option<String> {
    let rest = path.strip_prefix("/category/")?.trim_end_matches('/');
    let mut segments = rest.split('/');
    let category = site.category(segments.next()?)?;
    let child = match segments.next() {
        Some(slug) => Some(category.child(slug)?),
        None => None,
    };
    if segments.next().is_some() {
        return None;
    }

    let mut view = category_view(&snapshot.posts, &category.slug);
    if let Some(child) = child {
        view = view.narrow(&child.slug);
    }

    let active_tag = params.get("t").map(String::as_str);
    let order = params
        .get("s")
        .and_then(|s| s.parse::<SortOrder>().ok())
        .unwrap_or_default();

    Some(pages::render_category_page(
        site,
        category,
        child,
        &view,
        active_tag,
        order,
        &snapshot.options,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{Body, to_bytes};
    use axum::http::Request;
    use std::fs;
    use tempfile::TempDir;
    use tower::ServiceExt;

    const SITE: &str = r#"
[profile]
name = "Ada"

[blog]
title = "Field Notes"
description = "Notes"

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
"#;

    const POSTS: &str = r#"[
  {"id": "1", "title": "Philosophy Notes", "slug": "philosophy-notes", "status": "Public",
   "type": "Post", "date": "2024-01-05", "tags": ["thoughts", "philosophy"]},
  {"id": "2", "title": "On Love", "slug": "on-love", "status": "Public",
   "type": "Post", "date": "2024-03-01", "tags": ["thoughts", "love"]}
]"#;

    async fn fixture() -> (TempDir, AppState) {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("site.toml"), SITE).unwrap();
        fs::write(dir.path().join("posts.json"), POSTS).unwrap();
        fs::create_dir_all(dir.path().join("static")).unwrap();
        fs::write(dir.path().join("static/hello.txt"), "hi").unwrap();

        let state = AppState::load(dir.path().to_path_buf()).await.unwrap();
        (dir, state)
    }

    async fn get(state: &AppState, uri: &str) -> (StatusCode, Option<String>, String) {
        let response = router(state.clone())
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();

        let status = response.status();
        let content_type = response
            .headers()
            .get(header::CONTENT_TYPE)
            .map(|v| v.to_str().unwrap().to_string());
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, content_type, String::from_utf8_lossy(&bytes).into_owned())
    }

    #[tokio::test]
    async fn test_serves_home_with_reload_script() {
        let (_dir, state) = fixture().await;
        let (status, _, body) = get(&state, "/").await;

        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("Field Notes"));
        assert!(body.contains("/_reload"));
    }

    #[tokio::test]
    async fn test_category_honours_tag_and_sort() {
        let (_dir, state) = fixture().await;

        let (status, _, body) = get(&state, "/category/thoughts?s=old").await;
        assert_eq!(status, StatusCode::OK);
        let phil = body.find("Philosophy Notes").unwrap();
        let love = body.find("On Love").unwrap();
        assert!(phil < love);

        let (_, _, body) = get(&state, "/category/thoughts?t=love").await;
        assert!(body.contains("data-post hidden"));
    }

    #[tokio::test]
    async fn test_child_category_and_unknown_child() {
        let (_dir, state) = fixture().await;

        let (status, _, body) = get(&state, "/category/thoughts/philosophy").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("Philosophy Notes"));
        assert!(!body.contains("On Love"));

        let (status, _, _) = get(&state, "/category/thoughts/nope").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_post_page_and_not_found() {
        let (_dir, state) = fixture().await;

        let (status, _, body) = get(&state, "/on-love").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("On Love"));

        let (status, _, body) = get(&state, "/missing-post").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert!(body.contains("/missing-post"));
    }

    #[tokio::test]
    async fn test_percent_encoded_paths_are_decoded() {
        let (dir, state) = fixture().await;

        let updated = POSTS.replacen(
            "[",
            r#"[{"id": "3", "title": "Café Talk", "slug": "café", "status": "Public",
   "type": "Post", "date": "2024-04-01", "tags": ["thoughts"]},"#,
            1,
        );
        fs::write(dir.path().join("posts.json"), updated).unwrap();
        state.rebuild().await.unwrap();

        let (_, _, home) = get(&state, "/").await;
        assert!(home.contains(r#"href="/caf%C3%A9""#));

        let (status, _, body) = get(&state, "/caf%C3%A9").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("Café Talk"));
    }

    #[tokio::test]
    async fn test_assets_have_content_types() {
        let (_dir, state) = fixture().await;

        let (status, content_type, _) = get(&state, "/search.js").await;
        assert_eq!(status, StatusCode::OK);
        assert!(content_type.unwrap().contains("javascript"));

        let (_, content_type, body) = get(&state, "/search-index.json").await;
        assert_eq!(content_type.as_deref(), Some("application/json"));
        assert!(body.contains("on-love"));

        let (status, _, body) = get(&state, "/static/hello.txt").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "hi");
    }

    #[tokio::test]
    async fn test_search_api() {
        let (_dir, state) = fixture().await;

        let (status, _, body) = get(&state, "/api/search?q=love").await;
        assert_eq!(status, StatusCode::OK);
        let hits: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(hits[0]["slug"], "on-love");

        let (_, _, body) = get(&state, "/api/search").await;
        assert_eq!(body, "[]");
    }

    #[tokio::test]
    async fn test_skipped_slugs_stay_out_of_listings_and_search() {
        let (dir, state) = fixture().await;

        let updated = POSTS.replacen(
            "[",
            r#"[{"id": "3", "title": "Love Again", "slug": "on-love", "status": "Public",
   "type": "Post", "date": "2024-04-01", "tags": ["thoughts", "love"]},
  {"id": "4", "title": "Search Shadow", "slug": "search", "status": "Public",
   "type": "Post", "date": "2024-04-02", "tags": ["thoughts"]},"#,
            1,
        );
        fs::write(dir.path().join("posts.json"), updated).unwrap();
        assert_eq!(state.rebuild().await.unwrap(), 3);

        let (_, _, body) = get(&state, "/category/thoughts").await;
        assert!(body.contains("Love Again"));
        assert!(!body.contains("On Love"));
        assert!(!body.contains("Search Shadow"));

        let (_, _, body) = get(&state, "/api/search?q=shadow").await;
        assert_eq!(body, "[]");

        let (_, _, body) = get(&state, "/api/search?q=love").await;
        let hits: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(hits.as_array().unwrap().len(), 1);
        assert_eq!(hits[0]["title"], "Love Again");
    }

    #[tokio::test]
    async fn test_rebuild_picks_up_new_posts() {
        let (dir, state) = fixture().await;

        let updated = POSTS.replacen(
            "[",
            r#"[{"id": "3", "title": "Fresh Post", "slug": "fresh-post", "status": "Public",
   "type": "Post", "date": "2024-04-01", "tags": ["thoughts"]},"#,
            1,
        );
        fs::write(dir.path().join("posts.json"), updated).unwrap();

        assert_eq!(state.rebuild().await.unwrap(), 3);
        let (status, _, _) = get(&state, "/fresh-post").await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_failed_rebuild_keeps_previous_site() {
        let (dir, state) = fixture().await;

        fs::write(dir.path().join("posts.json"), "not json").unwrap();
        assert!(state.rebuild().await.is_err());

        let (status, _, _) = get(&state, "/on-love").await;
        assert_eq!(status, StatusCode::OK);
    }
}
