//! SharePoint direct-download links.
//!
//! The normal response is JSON:
//!
//! ```json
//! {"links":[{"link":"https://x.sharepoint.com/...download...","mp4":true,"resolutionStr":"720p"}]}
//! ```
//!
//! Some responses are not valid JSON (or carry no usable entries); for
//! those we scan the raw text for quoted `link`/`src` values on
//! `sharepoint.com` that point at a download URL.

use std::sync::LazyLock;

use regex::Regex;
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use super::dedup_by_url;
use crate::provider::{MediaFormat, RawLink};

/// Label used when the response does not name a resolution.
pub const FALLBACK_LABEL: &str = "SharePoint";

static QUOTED_DOWNLOAD: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r#""link":"([^"]*sharepoint[^"]*download[^"]*)""#,
        r#""src":"([^"]*sharepoint[^"]*download[^"]*)""#,
    ]
    .iter()
    .map(|p| Regex::new(p).expect("valid sharepoint regex"))
    .collect()
});

#[derive(Debug, Deserialize)]
struct LinksResponse {
    #[serde(default)]
    links: Vec<Value>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LinkEntry {
    link: String,
    #[serde(default)]
    mp4: Value,
    #[serde(default)]
    resolution_str: Value,
}

pub fn extract(body: &str) -> Vec<RawLink> {
    let links = from_json(body);
    if !links.is_empty() {
        return dedup_by_url(links);
    }

    debug!("no JSON links, scanning raw text");
    dedup_by_url(from_raw_text(body))
}

fn from_json(body: &str) -> Vec<RawLink> {
    let Ok(response) = serde_json::from_str::<LinksResponse>(body) else {
        return Vec::new();
    };

    response
        .links
        .into_iter()
        .filter_map(|value| serde_json::from_value::<LinkEntry>(value).ok())
        .filter(|entry| is_truthy(&entry.mp4))
        .map(|entry| {
            let quality = resolution_label(&entry.resolution_str)
                .unwrap_or_else(|| FALLBACK_LABEL.to_string());
            RawLink::new(MediaFormat::Mp4, quality, entry.link)
        })
        .collect()
}

fn from_raw_text(body: &str) -> Vec<RawLink> {
    QUOTED_DOWNLOAD
        .iter()
        .flat_map(|re| re.captures_iter(body))
        .filter_map(|caps| caps.get(1).map(|m| m.as_str()))
        .filter(|url| url.contains("sharepoint.com") && url.contains("download"))
        .map(|url| RawLink::new(MediaFormat::Mp4, FALLBACK_LABEL, url))
        .collect()
}

/// `resolutionStr` is usually `"720p"` but sometimes a bare number.
fn resolution_label(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// JSON truthiness: `true`, non-zero numbers and non-empty strings/containers.
fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    }
}
