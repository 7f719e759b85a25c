//! Deterministic ordering and selection of resolved links.
//!
//! Links are ordered by `(provider priority, format priority, quality rank)`
//! using a stable sort, so equal keys keep their input order and the same
//! input always produces the same output. Callers that "auto-select the
//! best link" rely on this.

use std::fmt;
use std::str::FromStr;

use crate::provider::{MediaFormat, MediaLink, ProviderRegistry};

/// Composite sort key for one link.
fn sort_key(registry: &ProviderRegistry, link: &MediaLink) -> (u8, u8, usize) {
    let provider = registry.by_display_name(&link.provider);
    let provider_priority = provider.map_or(u8::MAX, |p| p.priority);
    let quality_rank = provider.map_or(usize::MAX, |p| p.quality_rank(&link.quality));
    (provider_priority, link.format.priority(), quality_rank)
}

/// Sort links into preference order.
pub fn rank(mut links: Vec<MediaLink>, registry: &ProviderRegistry) -> Vec<MediaLink> {
    links.sort_by_key(|link| sort_key(registry, link));
    links
}

/// Which link a caller wants out of a ranked list.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum QualityPreference {
    /// The top-ranked link.
    #[default]
    Best,
    /// The first link carrying this quality label.
    Specific(String),
}

impl FromStr for QualityPreference {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() || s.eq_ignore_ascii_case("best") {
            Ok(Self::Best)
        } else {
            Ok(Self::Specific(s.to_string()))
        }
    }
}

impl fmt::Display for QualityPreference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Best => write!(f, "best"),
            Self::Specific(label) => write!(f, "{label}"),
        }
    }
}

/// Pick a link from an already ranked list.
///
/// A specific quality that no link carries falls back to the best link.
pub fn select<'a>(links: &'a [MediaLink], preference: &QualityPreference) -> Option<&'a MediaLink> {
    match preference {
        QualityPreference::Best => links.first(),
        QualityPreference::Specific(label) => links
            .iter()
            .find(|l| l.quality.eq_ignore_ascii_case(label))
            .or_else(|| links.first()),
    }
}

/// Keep only progressive mp4 links (the downloadable ones), order preserved.
pub fn mp4_only(links: &[MediaLink]) -> Vec<MediaLink> {
    links
        .iter()
        .filter(|l| l.format == MediaFormat::Mp4)
        .cloned()
        .collect()
}
