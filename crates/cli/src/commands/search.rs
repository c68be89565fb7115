use anyhow::{Context, Result};
use folio_core::date::format_display_date;
use folio_generator::publishable_posts;
use folio_indexer::{SearchHit, SearchIndex, SearchOptions};
use std::path::PathBuf;

use super::site;

/// Run a query against the same index the search page uses
pub async fn run(path: PathBuf, query: String, json: bool, limit: usize) -> Result<()> {
    let loaded = site::load(&path).await?;
    let posts = publishable_posts(&loaded.posts);
    let index = SearchIndex::from_posts(&posts, &loaded.site.categories, SearchOptions::default())
        .context("Failed to build search index")?;

    let hits: Vec<SearchHit> = index
        .search(&query)
        .context("Search failed")?
        .into_iter()
        .take(limit)
        .collect();

    if json {
        let out = serde_json::to_string_pretty(&hits).context("Failed to encode hits")?;
        println!("{}", out);
        return Ok(());
    }

    if query.trim().is_empty() {
        println!("Type a query to search {} posts.", index.len());
        return Ok(());
    }

    if hits.is_empty() {
        println!("No results for \"{}\".", query.trim());
        return Ok(());
    }

    for hit in &hits {
        println!("{}  /{}", hit.doc.title, hit.doc.slug);
        let mut meta = vec![format_display_date(&hit.doc.date)];
        if let Some(category) = &hit.doc.category {
            meta.push(format!("#{}", category));
        }
        if let Some(child) = &hit.doc.child {
            meta.push(format!("#{}", child));
        }
        meta.push(format!("score {:.2}", hit.score));
        println!("   {}", meta.join(" · "));
    }

    Ok(())
}
