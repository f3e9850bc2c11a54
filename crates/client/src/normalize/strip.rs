//! Domain stripping.
//!
//! Every URL the CMS hands back is absolute against its own internal base
//! domain. Templates must never see that domain, so the base prefix is
//! removed from every URL field before records reach them.

/// Strip the CMS base-URL prefix from one URL.
///
/// URLs outside the base domain are returned unchanged. A URL equal to the
/// base normalizes to `/` so templates always receive a routable path.
pub fn strip_domain(url: &str, base: &str) -> String {
    match url.strip_prefix(base) {
        Some("") | Some("/") => "/".to_string(),
        Some(path) => path.to_string(),
        None => url.to_string(),
    }
}

/// Strip an optional URL field in place of its `Option` wrapper.
pub fn strip_opt(url: Option<String>, base: &str) -> Option<String> {
    url.map(|u| strip_domain(&u, base))
}
