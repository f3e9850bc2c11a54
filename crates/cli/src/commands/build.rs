//! The build pipeline.
//!
//! Fetch every collection through the cache, render Tera templates against
//! the assembled context, minify the HTML, and write the result into the
//! output directory. A CMS outage degrades to stale (or missing) content;
//! only template errors abort.

use crate::helpers;
use crate::sources::{SiteData, Sources};
use anyhow::{Context as _, Result};
use std::fs;
use std::path::Path;
use std::time::Instant;
use tera::Tera;
use wisp_client::{ContentClient, ContentConfig};
use wisp_core::{AppConfig, cache::CacheDb};

pub async fn run(config: &AppConfig) -> Result<()> {
    let started = Instant::now();

    let db = CacheDb::open(&config.db_path).await?;
    let content_config = ContentConfig::from_config(config)?;
    let api_url = content_config.api_url.clone();
    let client = ContentClient::new(content_config)?;
    let sources = Sources::new(client, db, &api_url, config.site_url.clone());

    let data = sources.site_data().await?;
    tracing::info!(
        posts = data.posts.len(),
        pages = data.pages.len(),
        authors = data.authors.len(),
        tags = data.tags.len(),
        "collections assembled"
    );

    let glob = format!("{}/**/*.html", config.templates_dir.display());
    let mut tera = Tera::new(&glob).with_context(|| format!("loading templates from {glob}"))?;
    helpers::register(&mut tera);

    let written = render_site(&tera, &data, config)?;
    copy_assets(&config.assets_dir, &config.output_dir)?;

    tracing::info!(
        written,
        elapsed_ms = started.elapsed().as_millis() as u64,
        output = %config.output_dir.display(),
        "build finished"
    );

    Ok(())
}

/// Render every page the template set supports. Returns the page count.
fn render_site(tera: &Tera, data: &SiteData, config: &AppConfig) -> Result<usize> {
    let mut context = tera::Context::new();
    // Settings may be absent on a cold cache with the CMS down; templates
    // still get a renderable record.
    context.insert("site", &data.site.clone().unwrap_or_default());
    context.insert("posts", &data.posts);
    context.insert("pages", &data.pages);
    context.insert("docs", &data.docs);
    context.insert("footer", &data.footer);
    context.insert("authors", &data.authors);
    context.insert("tags", &data.tags);

    let out = &config.output_dir;
    let mut written = 0usize;

    if has_template(tera, "index.html") {
        let html = tera.render("index.html", &context)?;
        write_html(&out.join("index.html"), &html, config.minify)?;
        written += 1;
    }

    if has_template(tera, "post.html") {
        for post in &data.posts {
            let mut ctx = context.clone();
            ctx.insert("post", post);
            let html = tera
                .render("post.html", &ctx)
                .with_context(|| format!("rendering post {}", post.slug))?;
            write_html(&out.join(&post.slug).join("index.html"), &html, config.minify)?;
            written += 1;
        }
    }

    if has_template(tera, "page.html") {
        for page in &data.pages {
            let mut ctx = context.clone();
            ctx.insert("page", page);
            let html = tera
                .render("page.html", &ctx)
                .with_context(|| format!("rendering page {}", page.slug))?;
            write_html(&out.join(&page.slug).join("index.html"), &html, config.minify)?;
            written += 1;
        }
    }

    if has_template(tera, "author.html") {
        for author in &data.authors {
            let mut ctx = context.clone();
            ctx.insert("author", author);
            let html = tera
                .render("author.html", &ctx)
                .with_context(|| format!("rendering author {}", author.slug))?;
            write_html(&out.join("author").join(&author.slug).join("index.html"), &html, config.minify)?;
            written += 1;
        }
    }

    if has_template(tera, "tag.html") {
        for tag in &data.tags {
            let mut ctx = context.clone();
            ctx.insert("tag", tag);
            let html = tera
                .render("tag.html", &ctx)
                .with_context(|| format!("rendering tag {}", tag.slug))?;
            write_html(&out.join("tag").join(&tag.slug).join("index.html"), &html, config.minify)?;
            written += 1;
        }
    }

    Ok(written)
}

fn has_template(tera: &Tera, name: &str) -> bool {
    tera.get_template_names().any(|t| t == name)
}

/// Write one HTML document, minified when enabled.
fn write_html(path: &Path, html: &str, minify: bool) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let bytes = if minify { minify_html_output(html.as_bytes()) } else { html.as_bytes().to_vec() };
    fs::write(path, bytes).with_context(|| format!("writing {}", path.display()))?;
    Ok(())
}

/// Minify HTML via the minify-html external collaborator.
fn minify_html_output(html: &[u8]) -> Vec<u8> {
    let mut cfg = minify_html::Cfg::new();
    cfg.keep_closing_tags = true;
    cfg.keep_html_and_head_opening_tags = true;
    cfg.keep_comments = false;
    cfg.minify_css = true;
    cfg.minify_js = true;
    minify_html::minify(html, &cfg)
}

/// Copy the static assets tree into the output directory, if present.
fn copy_assets(assets_dir: &Path, output_dir: &Path) -> Result<()> {
    if !assets_dir.is_dir() {
        tracing::debug!("no assets directory at {}", assets_dir.display());
        return Ok(());
    }

    let mut copied = 0usize;
    for entry in walkdir::WalkDir::new(assets_dir) {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }
        let rel = entry.path().strip_prefix(assets_dir)?;
        let dest = output_dir.join(rel);
        if let Some(parent) = dest.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::copy(entry.path(), &dest).with_context(|| format!("copying {}", entry.path().display()))?;
        copied += 1;
    }
    tracing::debug!(copied, "assets copied");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use wisp_client::{Post, Site};

    fn site_data() -> SiteData {
        SiteData {
            site: Some(Site {
                title: "Example Blog".to_string(),
                description: "Ideas.".to_string(),
                url: "https://blog.example.org".to_string(),
                icon: None,
                logo: None,
                cover_image: None,
                timezone: None,
            }),
            posts: vec![Post {
                id: "1".to_string(),
                title: "Welcome".to_string(),
                slug: "welcome".to_string(),
                url: "/welcome/".to_string(),
                html: Some("<p>Hello world.</p>".to_string()),
                excerpt: None,
                feature_image: None,
                featured: true,
                published_at: Some(chrono::Utc::now()),
                primary_author: None,
                tags: vec![],
            }],
            pages: vec![],
            docs: vec![],
            footer: vec![],
            authors: vec![],
            tags: vec![],
        }
    }

    fn test_config(root: &Path) -> AppConfig {
        AppConfig {
            templates_dir: root.join("templates"),
            assets_dir: root.join("assets"),
            output_dir: root.join("public"),
            minify: false,
            ..Default::default()
        }
    }

    #[test]
    fn test_render_site_writes_index_and_posts() {
        let dir = tempfile::tempdir().unwrap();
        let config = test_config(dir.path());

        fs::create_dir_all(&config.templates_dir).unwrap();
        fs::write(
            config.templates_dir.join("index.html"),
            "<h1>{{ site.title }}</h1>{% for post in posts %}<a href=\"{{ post.url }}\">{{ post.title }}</a>{% endfor %}",
        )
        .unwrap();
        fs::write(
            config.templates_dir.join("post.html"),
            "<article><h1>{{ post.title }}</h1>{{ post.html | safe }}</article>",
        )
        .unwrap();

        let glob = format!("{}/**/*.html", config.templates_dir.display());
        let mut tera = Tera::new(&glob).unwrap();
        crate::helpers::register(&mut tera);

        let written = render_site(&tera, &site_data(), &config).unwrap();
        assert_eq!(written, 2);

        let index = fs::read_to_string(config.output_dir.join("index.html")).unwrap();
        assert!(index.contains("Example Blog"));
        assert!(index.contains("href=\"/welcome/\""));

        let post = fs::read_to_string(config.output_dir.join("welcome").join("index.html")).unwrap();
        assert!(post.contains("<p>Hello world.</p>"));
    }

    #[test]
    fn test_render_site_without_templates_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let config = test_config(dir.path());
        fs::create_dir_all(&config.templates_dir).unwrap();

        let tera = Tera::default();
        let written = render_site(&tera, &site_data(), &config).unwrap();
        assert_eq!(written, 0);
    }

    #[test]
    fn test_copy_assets() {
        let dir = tempfile::tempdir().unwrap();
        let assets = dir.path().join("assets");
        let output = dir.path().join("public");
        fs::create_dir_all(assets.join("css")).unwrap();
        fs::write(assets.join("css").join("site.css"), "body{margin:0}").unwrap();

        copy_assets(&assets, &output).unwrap();
        assert!(output.join("css").join("site.css").exists());
    }

    #[test]
    fn test_copy_assets_missing_dir_is_ok() {
        let dir = tempfile::tempdir().unwrap();
        copy_assets(&dir.path().join("nope"), &dir.path().join("public")).unwrap();
    }

    #[test]
    fn test_minify_html_output() {
        let html = b"<html>\n  <body>\n    <p>Hello</p>\n  </body>\n</html>";
        let minified = minify_html_output(html);
        assert!(minified.len() < html.len());
        let text = String::from_utf8_lossy(&minified);
        assert!(text.contains("<p>Hello</p>"));
    }
}
