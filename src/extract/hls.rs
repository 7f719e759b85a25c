//! HLS playlist links.

use std::sync::LazyLock;

use regex::Regex;

use super::dedup_by_url;
use crate::provider::{MediaFormat, RawLink};

pub const MASTER_LABEL: &str = "HLS Master";
pub const STREAM_LABEL: &str = "HLS Stream";

static PLAYLIST_URLS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r#""url":"([^"]*\.m3u8[^"]*)""#,
        r#"(https://[^"\s]+\.m3u8[^"\s]*)"#,
    ]
    .iter()
    .map(|p| Regex::new(p).expect("valid m3u8 regex"))
    .collect()
});

pub fn extract(body: &str) -> Vec<RawLink> {
    let links = PLAYLIST_URLS
        .iter()
        .flat_map(|re| re.captures_iter(body))
        .filter_map(|caps| caps.get(1).map(|m| m.as_str()))
        .map(|url| RawLink::new(MediaFormat::M3u8, label_for(url), url))
        .collect();
    dedup_by_url(links)
}

/// Master playlists reference every variant; anything else is one stream.
pub fn label_for(url: &str) -> &'static str {
    if url.contains("master") {
        MASTER_LABEL
    } else {
        STREAM_LABEL
    }
}
