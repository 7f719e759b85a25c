//! Direct mp4 links served through the fast4speed tool domain.
//!
//! Upstream sometimes glues its own origin in front of an already absolute
//! URL (`https://allanime.dayhttps://tools.fast4speed.rsvp/...`); that
//! prefix is always stripped.

use std::sync::LazyLock;

use regex::Regex;

use super::dedup_by_url;
use crate::provider::{MediaFormat, RawLink};

pub const LABEL: &str = "YouTube";

/// Origin upstream erroneously prepends.
const DUPLICATED_ORIGIN: &str = "https://allanime.day";

static TOOL_URLS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r#"(https://tools\.fast4speed\.rsvp[^"\s]+)"#,
        r#""url":"([^"]*tools\.fast4speed[^"]*)""#,
    ]
    .iter()
    .map(|p| Regex::new(p).expect("valid fast4speed regex"))
    .collect()
});

pub fn extract(body: &str) -> Vec<RawLink> {
    let links = TOOL_URLS
        .iter()
        .flat_map(|re| re.captures_iter(body))
        .filter_map(|caps| caps.get(1).map(|m| m.as_str()))
        .map(|url| RawLink::new(MediaFormat::Mp4, LABEL, strip_duplicated_origin(url)))
        .collect();
    dedup_by_url(links)
}

fn strip_duplicated_origin(url: &str) -> &str {
    match url.strip_prefix(DUPLICATED_ORIGIN) {
        Some(rest) if rest.starts_with("https://") => rest,
        _ => url,
    }
}
