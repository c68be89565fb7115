use anyhow::Result;
use folio_core::ReferenceTime;
use folio_validator::validate_site;
use std::path::PathBuf;

use super::site;

pub async fn run(path: PathBuf) -> Result<()> {
    println!("Validating site at: {}", path.display());

    let config = site::load_config(&path)?;
    println!("✓ site.toml valid");
    println!("  Blog: {}", config.blog.title);
    println!("  Categories: {}", config.categories.len());

    let raw_posts = site::fetch_raw_posts(&config, &path).await?;
    println!("✓ Post source readable ({} records)", raw_posts.len());

    let reference = ReferenceTime::current(config.settings.timezone);
    let report = validate_site(&path, &config, &raw_posts, &reference);

    if !report.info.is_empty() {
        println!();
        for line in &report.info {
            println!("  • {}", line);
        }
    }

    if !report.warnings.is_empty() {
        println!();
        for line in &report.warnings {
            println!("⚠ {}", line);
        }
    }

    if !report.errors.is_empty() {
        println!();
        for line in &report.errors {
            println!("✗ {}", line);
        }
        anyhow::bail!("Validation failed with {} error(s)", report.errors.len());
    }

    println!();
    println!(
        "✅ Site is valid ({} warning(s))",
        report.warnings.len()
    );
    Ok(())
}
