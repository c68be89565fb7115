use anyhow::{Context, Result};
use folio_generator::generate_site;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use super::site;

/// Build the static site into `output`
pub async fn run(path: PathBuf, output: PathBuf) -> Result<()> {
    println!("🔨 Building static site...");
    println!("   Source: {}", path.display());
    println!("   Output: {}", output.display());
    println!();

    let loaded = site::load(&path).await?;

    println!("✓ Loaded: {}", loaded.site.blog.title);
    println!(
        "  Posts: {} published of {} records",
        loaded.posts.len(),
        loaded.raw_posts.len()
    );
    println!("  Categories: {}", loaded.site.categories.len());
    println!();

    println!("📄 Generating pages...");
    let generated = generate_site(&loaded.site, &loaded.posts, &loaded.render_options(false));
    let written = generated
        .write_to(&output)
        .context("Failed to write generated site")?;
    println!(
        "   ✓ Wrote {} files ({} pages, {} assets)",
        written,
        generated.pages.len(),
        generated.assets.len()
    );

    println!("🖼  Copying static files...");
    let copied = copy_static(&path.join("static"), &output.join("static"))?;
    println!("   ✓ Copied {} static files", copied);

    println!();
    println!("✅ Build complete!");
    println!("   Output: {}", output.display());
    println!();
    println!("To test locally:");
    println!("   cd {} && python3 -m http.server 8000", output.display());
    println!();

    Ok(())
}

/// Mirror `src` into `dst`, skipping hidden files; a missing `src` copies nothing
pub fn copy_static(src: &Path, dst: &Path) -> Result<usize> {
    if !src.is_dir() {
        return Ok(0);
    }

    let mut copied = 0;
    for entry in WalkDir::new(src)
        .into_iter()
        .filter_entry(|e| e.depth() == 0 || !e.file_name().to_string_lossy().starts_with('.'))
    {
        let entry = entry.context("Failed to read static directory")?;
        if !entry.file_type().is_file() {
            continue;
        }

        let relative = entry
            .path()
            .strip_prefix(src)
            .context("Static file outside static directory")?;
        let target = dst.join(relative);
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        fs::copy(entry.path(), &target)
            .with_context(|| format!("Failed to copy {}", entry.path().display()))?;
        copied += 1;
    }

    Ok(copied)
}
