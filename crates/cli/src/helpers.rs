//! Template helpers registered on the Tera instance.
//!
//! All helpers are stateless. The only hard failure is a missing `alt`
//! text on the image helper: that aborts the render on purpose, so
//! inaccessible markup gets fixed at authoring time instead of shipping.

use std::collections::HashMap;
use tera::{Tera, Value};

/// Reading speed used by the `reading_time` filter.
const READING_SPEED_WPM: usize = 200;

/// Responsive widths requested when a template doesn't pass its own.
const DEFAULT_IMAGE_WIDTHS: &[u32] = &[300, 600, 1000, 2000];

/// CMS image path marker; size segments are inserted after it.
const IMAGE_PATH_MARKER: &str = "/content/images/";

/// Register every helper on a Tera instance.
pub fn register(tera: &mut Tera) {
    tera.register_filter("reading_time", reading_time_filter);
    tera.register_filter("iso_date", iso_date_filter);
    tera.register_filter("css_min", css_min_filter);
    tera.register_function("image", image_fn);
}

fn reading_time_filter(value: &Value, _: &HashMap<String, Value>) -> tera::Result<Value> {
    let html = value.as_str().unwrap_or("");
    Ok(Value::from(reading_time(html)))
}

fn iso_date_filter(value: &Value, _: &HashMap<String, Value>) -> tera::Result<Value> {
    match value {
        Value::Null => Ok(Value::String(String::new())),
        Value::String(raw) => {
            let parsed = chrono::DateTime::parse_from_rfc3339(raw)
                .map_err(|e| tera::Error::msg(format!("iso_date: unparseable timestamp {raw:?}: {e}")))?;
            Ok(Value::String(parsed.format("%Y-%m-%d").to_string()))
        }
        other => Err(tera::Error::msg(format!("iso_date: expected a timestamp string, got {other}"))),
    }
}

fn css_min_filter(value: &Value, _: &HashMap<String, Value>) -> tera::Result<Value> {
    let css = value
        .as_str()
        .ok_or_else(|| tera::Error::msg("css_min: expected a string"))?;
    Ok(Value::String(minify_css(css)))
}

fn image_fn(args: &HashMap<String, Value>) -> tera::Result<Value> {
    let src = args
        .get("src")
        .and_then(Value::as_str)
        .ok_or_else(|| tera::Error::msg("image: src is required"))?;

    // Accessibility is non-negotiable: a missing or empty alt aborts the build.
    let alt = args
        .get("alt")
        .and_then(Value::as_str)
        .filter(|a| !a.trim().is_empty())
        .ok_or_else(|| tera::Error::msg("image: alt text is required"))?;

    let widths: Vec<u32> = match args.get("widths") {
        Some(Value::Array(values)) => values.iter().filter_map(Value::as_u64).map(|w| w as u32).collect(),
        Some(other) => return Err(tera::Error::msg(format!("image: widths must be an array, got {other}"))),
        None => DEFAULT_IMAGE_WIDTHS.to_vec(),
    };
    if widths.is_empty() {
        return Err(tera::Error::msg("image: widths must not be empty"));
    }

    let sizes = args.get("sizes").and_then(Value::as_str).unwrap_or("100vw");
    let class = args.get("class").and_then(Value::as_str);

    Ok(Value::String(image_tag(src, alt, &widths, sizes, class)))
}

/// Estimate reading time in minutes at 200 words per minute.
///
/// Markup is stripped before counting. Anything non-empty reads as at
/// least one minute.
pub fn reading_time(html: &str) -> u64 {
    let words = strip_tags(html).split_whitespace().count();
    (words.div_ceil(READING_SPEED_WPM)).max(1) as u64
}

/// Drop HTML tags, keeping text content with separating spaces.
fn strip_tags(html: &str) -> String {
    let mut text = String::with_capacity(html.len());
    let mut in_tag = false;
    for c in html.chars() {
        match c {
            '<' => {
                in_tag = true;
                text.push(' ');
            }
            '>' => in_tag = false,
            c if !in_tag => text.push(c),
            _ => {}
        }
    }
    text
}

/// Minify a CSS string: comments out, whitespace collapsed, separators
/// tightened. Not a full parser; string contents with structural
/// characters are out of scope for inline site styles.
pub fn minify_css(css: &str) -> String {
    let stripped = strip_css_comments(css);

    let mut out = String::with_capacity(stripped.len());
    let mut pending_space = false;
    for c in stripped.chars() {
        if c.is_whitespace() {
            pending_space = !out.is_empty();
            continue;
        }
        if matches!(c, '{' | '}' | ';' | ':' | ',' | '>') {
            // No space on either side of structural separators.
            pending_space = false;
            if c == '}' && out.ends_with(';') {
                out.pop();
            }
            out.push(c);
            continue;
        }
        if pending_space && !matches!(out.chars().next_back(), Some('{' | '}' | ';' | ':' | ',' | '>') | None) {
            out.push(' ');
        }
        pending_space = false;
        out.push(c);
    }
    out
}

fn strip_css_comments(css: &str) -> String {
    let mut out = String::with_capacity(css.len());
    let mut rest = css;
    while let Some(start) = rest.find("/*") {
        out.push_str(&rest[..start]);
        match rest[start + 2..].find("*/") {
            Some(end) => rest = &rest[start + 2 + end + 2..],
            None => return out,
        }
    }
    out.push_str(rest);
    out
}

/// Build a responsive `<img>` tag.
///
/// CMS-hosted images get a `srcset` over the requested widths using the
/// CMS size-URL scheme (`/content/images/size/w{width}/...`); other images
/// are emitted as a plain tag. The fallback `src` is the middle width.
pub fn image_tag(src: &str, alt: &str, widths: &[u32], sizes: &str, class: Option<&str>) -> String {
    let alt = tera::escape_html(alt);
    let class_attr = class
        .map(|c| format!(" class=\"{}\"", tera::escape_html(c)))
        .unwrap_or_default();

    let Some(marker) = src.find(IMAGE_PATH_MARKER) else {
        return format!(
            "<img src=\"{src}\" alt=\"{alt}\"{class_attr} loading=\"lazy\" decoding=\"async\">"
        );
    };

    let srcset = widths
        .iter()
        .map(|w| format!("{} {}w", sized_url(src, marker, *w), w))
        .collect::<Vec<_>>()
        .join(", ");

    let fallback = sized_url(src, marker, widths[widths.len() / 2]);

    format!(
        "<img srcset=\"{srcset}\" sizes=\"{sizes}\" src=\"{fallback}\" alt=\"{alt}\"{class_attr} loading=\"lazy\" decoding=\"async\">"
    )
}

/// Insert a size segment after the CMS image path marker.
fn sized_url(src: &str, marker_idx: usize, width: u32) -> String {
    let (head, tail) = src.split_at(marker_idx + IMAGE_PATH_MARKER.len());
    format!("{head}size/w{width}/{tail}")
}
