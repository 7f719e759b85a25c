//! The fixed provider table.

use std::sync::LazyLock;

use regex::Regex;

use super::{ExtractorKind, MediaFormat, ProviderDescriptor};
use crate::error::{ResolveError, Result};

static PROVIDERS: LazyLock<Vec<ProviderDescriptor>> = LazyLock::new(|| {
    vec![
        descriptor(
            "wixmp",
            "Wixmp",
            "Default",
            1,
            &[MediaFormat::Mp4, MediaFormat::M3u8],
            &["1080p", "720p", "480p", "360p"],
            ExtractorKind::Repackager,
        ),
        descriptor(
            "sharepoint",
            "SharePoint",
            "S-mp4",
            2,
            &[MediaFormat::Mp4],
            &["1080p", "720p", "480p", "360p", "SharePoint"],
            ExtractorKind::SharePoint,
        ),
        descriptor(
            "youtube",
            "YouTube",
            "Yt-mp4",
            3,
            &[MediaFormat::Mp4],
            &["YouTube"],
            ExtractorKind::Fast4Speed,
        ),
        descriptor(
            "hianime",
            "HiAnime",
            "Luf-Mp4",
            4,
            &[MediaFormat::M3u8],
            &["HLS Master", "HLS Stream"],
            ExtractorKind::Hls,
        ),
    ]
});

fn descriptor(
    key: &'static str,
    display_name: &'static str,
    tag: &'static str,
    priority: u8,
    formats: &'static [MediaFormat],
    quality_tiers: &'static [&'static str],
    kind: ExtractorKind,
) -> ProviderDescriptor {
    // One "<sourceName>:<sourceUrl>" pair per blob line.
    let pattern = Regex::new(&format!(r"(?im)^{}:(--[0-9a-f]+)", regex::escape(tag)))
        .expect("provider tag pattern is valid");
    ProviderDescriptor {
        key,
        display_name,
        tag,
        pattern,
        priority,
        formats,
        quality_tiers,
        kind,
    }
}

/// Read-only view over the provider table.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProviderRegistry;

impl ProviderRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// All providers, priority ascending.
    pub fn all(&self) -> &'static [ProviderDescriptor] {
        &PROVIDERS
    }

    pub fn get(&self, key: &str) -> Result<&'static ProviderDescriptor> {
        self.all()
            .iter()
            .find(|p| p.key == key)
            .ok_or_else(|| ResolveError::UnknownProvider(key.to_string()))
    }

    pub fn by_display_name(&self, name: &str) -> Option<&'static ProviderDescriptor> {
        self.all().iter().find(|p| p.display_name == name)
    }

    /// Priority for a display name; unknown names sort after every provider.
    pub fn priority_of(&self, display_name: &str) -> u8 {
        self.by_display_name(display_name)
            .map_or(u8::MAX, |p| p.priority)
    }
}
