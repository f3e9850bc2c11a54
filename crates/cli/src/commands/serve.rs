//! Local preview server.
//!
//! A small static file server over the build output directory, enough to
//! preview a build before deploying. Directories resolve to their
//! `index.html`; anything else is a 404.

use anyhow::{Result, anyhow};
use std::fs;
use std::path::{Component, Path, PathBuf};
use tiny_http::{Header, Request, Response, Server};
use wisp_core::AppConfig;

pub async fn run(config: AppConfig) -> Result<()> {
    tokio::task::spawn_blocking(move || serve_blocking(&config)).await?
}

fn serve_blocking(config: &AppConfig) -> Result<()> {
    let addr = ("127.0.0.1", config.port);
    let server = Server::http(addr).map_err(|e| anyhow!("failed to bind 127.0.0.1:{}: {}", config.port, e))?;

    tracing::info!(
        "previewing {} on http://127.0.0.1:{}",
        config.output_dir.display(),
        config.port
    );

    for request in server.incoming_requests() {
        if let Err(e) = handle_request(request, &config.output_dir) {
            tracing::warn!("request error: {}", e);
        }
    }

    Ok(())
}

fn handle_request(request: Request, root: &Path) -> Result<()> {
    let url_path = request.url().split('?').next().unwrap_or("/").to_string();

    match resolve_path(root, &url_path) {
        Some(path) => match fs::read(&path) {
            Ok(body) => {
                tracing::debug!("200 {}", url_path);
                let content_type = content_type_for(&path);
                let header = Header::from_bytes("Content-Type", content_type)
                    .map_err(|_| anyhow!("invalid content-type header"))?;
                request.respond(Response::from_data(body).with_header(header))?;
                Ok(())
            }
            Err(_) => respond_not_found(request, &url_path),
        },
        None => respond_not_found(request, &url_path),
    }
}

fn respond_not_found(request: Request, url_path: &str) -> Result<()> {
    tracing::debug!("404 {}", url_path);
    request.respond(Response::from_string("404 Not Found").with_status_code(404))?;
    Ok(())
}

/// Map a request path onto a file under `root`.
///
/// Rejects traversal components; directories resolve to `index.html`.
/// Returns None when nothing servable exists.
fn resolve_path(root: &Path, url_path: &str) -> Option<PathBuf> {
    let relative = url_path.trim_start_matches('/');
    let candidate = Path::new(relative);

    if candidate
        .components()
        .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir))
    {
        return None;
    }

    let mut path = root.join(candidate);
    if path.is_dir() {
        path = path.join("index.html");
    }

    path.is_file().then_some(path)
}

/// Content type by file extension.
fn content_type_for(path: &Path) -> &'static str {
    match path.extension().and_then(|e| e.to_str()) {
        Some("html") => "text/html; charset=utf-8",
        Some("css") => "text/css; charset=utf-8",
        Some("js") => "application/javascript",
        Some("json") => "application/json",
        Some("xml") => "application/xml",
        Some("txt") => "text/plain; charset=utf-8",
        Some("png") => "image/png",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("svg") => "image/svg+xml",
        Some("webp") => "image/webp",
        Some("avif") => "image/avif",
        Some("ico") => "image/x-icon",
        Some("woff2") => "font/woff2",
        _ => "application/octet-stream",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_path_serves_index_for_directories() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("welcome")).unwrap();
        fs::write(dir.path().join("welcome").join("index.html"), "<p>hi</p>").unwrap();
        fs::write(dir.path().join("index.html"), "<p>root</p>").unwrap();

        let resolved = resolve_path(dir.path(), "/welcome/").unwrap();
        assert!(resolved.ends_with("welcome/index.html"));

        let resolved = resolve_path(dir.path(), "/").unwrap();
        assert!(resolved.ends_with("index.html"));
    }

    #[test]
    fn test_resolve_path_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        assert!(resolve_path(dir.path(), "/nope.html").is_none());
    }

    #[test]
    fn test_resolve_path_rejects_traversal() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("index.html"), "x").unwrap();
        assert!(resolve_path(dir.path(), "/../secret").is_none());
        assert!(resolve_path(dir.path(), "/a/../../b").is_none());
    }

    #[test]
    fn test_content_types() {
        assert_eq!(content_type_for(Path::new("a/index.html")), "text/html; charset=utf-8");
        assert_eq!(content_type_for(Path::new("site.css")), "text/css; charset=utf-8");
        assert_eq!(content_type_for(Path::new("photo.webp")), "image/webp");
        assert_eq!(content_type_for(Path::new("blob.bin")), "application/octet-stream");
    }
}
