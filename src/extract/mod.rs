//! Per-provider response extractors.
//!
//! Every extractor is a pure function from a response body to
//! [`RawLink`]s. A body that does not follow the expected grammar is not an
//! error; it simply yields no links.
//!
//! | Extractor | Provider | Grammar |
//! |-----------|----------|---------|
//! | [`repackager`] | Wixmp | `repackager.<cdn>.com/<base>/,<q1>,<q2>,/mp4/file.mp4.urlset/master.m3u8` |
//! | [`sharepoint`] | SharePoint | JSON `{"links":[{"link","mp4","resolutionStr"}]}`, raw-text fallback |
//! | [`fast4speed`] | YouTube | `https://tools.fast4speed.rsvp/...` |
//! | [`hls`] | HiAnime | `https://....m3u8` |

pub mod fast4speed;
pub mod hls;
pub mod repackager;
pub mod sharepoint;

use std::collections::HashSet;

use crate::provider::{ExtractorKind, RawLink};

/// Dispatch a body to the extractor for `kind`.
pub fn extract(kind: ExtractorKind, body: &str) -> Vec<RawLink> {
    match kind {
        ExtractorKind::Repackager => repackager::extract(body),
        ExtractorKind::SharePoint => sharepoint::extract(body),
        ExtractorKind::Fast4Speed => fast4speed::extract(body),
        ExtractorKind::Hls => hls::extract(body),
    }
}

/// Drop repeated URLs, keeping the first occurrence.
///
/// Extractors scan the same body with more than one pattern, so one URL can
/// be seen twice.
pub(crate) fn dedup_by_url(links: Vec<RawLink>) -> Vec<RawLink> {
    let mut seen = HashSet::new();
    links
        .into_iter()
        .filter(|link| seen.insert(link.url.clone()))
        .collect()
}
