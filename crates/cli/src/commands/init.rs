use anyhow::{Context, Result};
use folio_core::ReferenceTime;
use folio_core::date::{DEFAULT_TIMEZONE, parse_utc_offset};
use std::fs;
use std::path::PathBuf;

use super::site::SITE_TOML;

const POSTS_JSON: &str = "posts.json";

/// Escape a string for a TOML basic (double-quoted) string
fn toml_escape_string(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\x08' => out.push_str("\\b"),
            '\x0C' => out.push_str("\\f"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            _ => out.push(c),
        }
    }
    out
}

/// Basic shape check: one `@`, non-empty local part, dotted domain with a TLD
fn is_valid_email(email: &str) -> bool {
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };

    if local.is_empty() || local.len() > 64 || domain.contains('@') {
        return false;
    }
    if domain.len() > 255
        || domain.starts_with(['.', '-'])
        || domain.ends_with(['.', '-'])
        || domain.contains("..")
    {
        return false;
    }

    matches!(domain.rsplit_once('.'), Some((host, tld)) if !host.is_empty() && tld.len() >= 2)
}

/// Scaffold a site directory with `site.toml`, a sample `posts.json` and `static/`.
///
/// The directory is created when missing. An existing `site.toml` is never
/// overwritten; an existing `posts.json` is kept as-is.
pub async fn run(
    path: PathBuf,
    title: Option<String>,
    name: Option<String>,
    email: Option<String>,
    link: Option<String>,
) -> Result<()> {
    println!("Initializing site directory: {}", path.display());

    let config_path = path.join(SITE_TOML);
    if config_path.exists() {
        anyhow::bail!(
            "site.toml already exists at {}\nHint: Delete it first or use a different directory",
            config_path.display()
        );
    }

    if let Some(email) = email.as_deref()
        && !is_valid_email(email)
    {
        anyhow::bail!("Invalid email address: '{}'", email);
    }

    let link = link.unwrap_or_else(|| "https://example.com".to_string());
    if !(link.starts_with("http://") || link.starts_with("https://")) {
        anyhow::bail!("--link must be an http(s) URL: '{}'", link);
    }

    fs::create_dir_all(path.join("static")).context("Failed to create site directory")?;

    let toml = site_toml(
        title.as_deref().unwrap_or("My Folio"),
        name.as_deref().unwrap_or("Your Name"),
        email.as_deref(),
        &link,
    );
    fs::write(&config_path, toml).context("Failed to write site.toml")?;
    println!("✓ Wrote site.toml");

    let posts_path = path.join(POSTS_JSON);
    if posts_path.exists() {
        println!("✓ Kept existing posts.json");
    } else {
        fs::write(&posts_path, sample_posts()?).context("Failed to write posts.json")?;
        println!("✓ Wrote sample posts.json");
    }

    println!("\n✓ Initialization complete!");
    println!("\nGenerated structure:");
    println!("  {}/", path.display());
    println!("  ├── site.toml            ← Profile, categories, plugins");
    println!("  ├── posts.json           ← Post records (or point [source] at an API)");
    println!("  └── static/              ← Images and files served at /static");

    println!("\nNext steps:");
    println!("  1. Edit site.toml (title, link, categories)");
    println!("  2. Check it: folio validate {}", path.display());
    println!("  3. Preview: folio preview {}", path.display());

    Ok(())
}

fn site_toml(title: &str, name: &str, email: Option<&str>, link: &str) -> String {
    let email_line = email
        .map(|e| format!("email = \"{}\"\n", toml_escape_string(e)))
        .unwrap_or_default();

    format!(
        r#"[profile]
name = "{name}"
role = "Writer"
bio = "Notes on things I am learning."
{email_line}
[blog]
title = "{title}"
description = "A personal blog"
# light | dark | system
scheme = "dark"

[site]
link = "{link}"
lang = "en-US"
# Reference zone for "is this post dated today or earlier"
timezone = "{timezone}"
# How often `folio preview` refetches posts
revalidate_secs = 3600

[source]
kind = "file"
path = "{posts}"
# kind = "http"
# url = "https://api.example.com/posts"
# token_env = "FOLIO_SOURCE_TOKEN"

[filter]
accept_status = ["Public"]
accept_type = ["Post"]

[[category]]
slug = "notes"
name = "Notes"
intro = "Short notes and first drafts."

[[category.children]]
slug = "welcome"
name = "Welcome"

[[link]]
label = "GitHub"
href = "https://github.com/"

[plugins.google_analytics]
enable = false
measurement_id = ""

[plugins.utterances]
enable = false
repo = ""
"#,
        name = toml_escape_string(name),
        email_line = email_line,
        title = toml_escape_string(title),
        link = toml_escape_string(link.trim_end_matches('/')),
        timezone = DEFAULT_TIMEZONE,
        posts = POSTS_JSON,
    )
}

/// Two sample records: a published post dated today and a draft
fn sample_posts() -> Result<String> {
    let zone = parse_utc_offset(DEFAULT_TIMEZONE).context("Invalid default timezone")?;
    let today = ReferenceTime::current(zone).today_string();

    let posts = serde_json::json!([
        {
            "id": "hello-world",
            "title": "Hello, world",
            "slug": "hello-world",
            "status": ["Public"],
            "type": ["Post"],
            "date": { "start_date": today },
            "tags": ["notes", "welcome"],
            "summary": "The first post on this site.",
            "content": "Welcome! Edit **posts.json** or point `[source]` at your content API."
        },
        {
            "id": "work-in-progress",
            "title": "Work in progress",
            "slug": "work-in-progress",
            "status": ["Draft"],
            "type": ["Post"],
            "date": today,
            "tags": ["notes"]
        }
    ]);

    serde_json::to_string_pretty(&posts).context("Failed to encode sample posts")
}
