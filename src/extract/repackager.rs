//! Wixmp repackager URLs.
//!
//! The CDN publishes one HLS master per episode whose path lists every
//! encoded quality in a single comma-separated segment:
//!
//! ```text
//! https://repackager.wixmp.com/<base>/,1080p,720p,/mp4/file.mp4.urlset/master.m3u8
//! ```
//!
//! Each listed quality is also served as a plain progressive file at
//! `https://<base>/<quality>/mp4/file.mp4`, which is what we emit.

use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

use super::dedup_by_url;
use crate::provider::{MediaFormat, RawLink};

static REPACKAGER_URL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"https://repackager\.[a-z0-9-]+\.com/[^"'>\s]+"#).expect("valid repackager regex")
});

static URLSET: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^https://repackager\.[a-z0-9-]+\.com/([^,]+)/,([^/]+),/mp4/file\.mp4\.urlset/master\.m3u8",
    )
    .expect("valid urlset regex")
});

pub fn extract(body: &str) -> Vec<RawLink> {
    let links = REPACKAGER_URL
        .find_iter(body)
        .flat_map(|m| expand(m.as_str()))
        .collect();
    dedup_by_url(links)
}

/// Expand one repackager master URL into per-quality mp4 links.
pub fn expand(url: &str) -> Vec<RawLink> {
    let Some(caps) = URLSET.captures(url) else {
        debug!(url, "repackager URL without quality list");
        return Vec::new();
    };
    let base = &caps[1];

    caps[2]
        .split(',')
        .map(str::trim)
        .filter(|q| !q.is_empty())
        .map(|quality| {
            RawLink::new(
                MediaFormat::Mp4,
                quality,
                format!("https://{base}/{quality}/mp4/file.mp4"),
            )
        })
        .collect()
}
