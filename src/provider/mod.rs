//! Provider descriptors and shared link types.
//!
//! A provider is one of the four backends the metadata endpoint hands out
//! tokens for. Each [`ProviderDescriptor`] carries everything the resolver
//! needs to find the provider's token in the source blob, which extractor
//! reads its responses, and how its quality labels rank.

mod registry;

use std::fmt;
use std::str::FromStr;

use regex::Regex;
use serde::{Deserialize, Serialize};

pub use registry::ProviderRegistry;

/// Container format of a media link.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaFormat {
    Mp4,
    M3u8,
}

impl MediaFormat {
    /// Sort rank: progressive mp4 before HLS playlists.
    pub fn priority(self) -> u8 {
        match self {
            Self::Mp4 => 1,
            Self::M3u8 => 2,
        }
    }
}

impl fmt::Display for MediaFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Mp4 => write!(f, "mp4"),
            Self::M3u8 => write!(f, "m3u8"),
        }
    }
}

/// Audio track selector used by the metadata endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TranslationType {
    #[default]
    Sub,
    Dub,
}

impl TranslationType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Sub => "sub",
            Self::Dub => "dub",
        }
    }
}

impl fmt::Display for TranslationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TranslationType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "sub" => Ok(Self::Sub),
            "dub" => Ok(Self::Dub),
            other => Err(format!("unknown translation type: {other}")),
        }
    }
}

/// Which response grammar a provider's bodies follow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtractorKind {
    /// CDN repackager URL listing several qualities in one path segment.
    Repackager,
    /// JSON `links` array with a raw-text fallback.
    SharePoint,
    /// Direct mp4 URLs on the fast4speed tool domain.
    Fast4Speed,
    /// HLS playlists.
    Hls,
}

/// Static description of one provider.
#[derive(Debug)]
pub struct ProviderDescriptor {
    /// Stable lowercase identifier (e.g. `"wixmp"`).
    pub key: &'static str,
    /// Name attached to every link and used as the tracker key.
    pub display_name: &'static str,
    /// Source-blob tag preceding this provider's token.
    pub tag: &'static str,
    /// Compiled tag pattern; capture group 1 is the token.
    pub pattern: Regex,
    /// Lower is preferred; unique across the registry.
    pub priority: u8,
    pub formats: &'static [MediaFormat],
    /// Quality labels in preference order.
    pub quality_tiers: &'static [&'static str],
    pub kind: ExtractorKind,
}

impl ProviderDescriptor {
    /// Find this provider's token in a source blob.
    pub fn find_token<'a>(&self, blob: &'a str) -> Option<&'a str> {
        self.pattern
            .captures(blob)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str())
    }

    /// Rank of a quality label; labels not in the tier list rank last.
    pub fn quality_rank(&self, quality: &str) -> usize {
        self.quality_tiers
            .iter()
            .position(|tier| *tier == quality)
            .unwrap_or(self.quality_tiers.len())
    }

    pub fn supports(&self, format: MediaFormat) -> bool {
        self.formats.contains(&format)
    }
}

/// A link as produced by an extractor, before provider tagging.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawLink {
    pub format: MediaFormat,
    pub quality: String,
    pub url: String,
}

impl RawLink {
    pub fn new(format: MediaFormat, quality: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            format,
            quality: quality.into(),
            url: url.into(),
        }
    }

    pub fn with_provider(self, provider: &str) -> MediaLink {
        MediaLink {
            format: self.format,
            quality: self.quality,
            url: self.url,
            provider: provider.to_string(),
        }
    }
}

/// A playable media link returned to callers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaLink {
    pub format: MediaFormat,
    pub quality: String,
    pub url: String,
    /// Display name of the provider that produced the link.
    pub provider: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn translation_type_parses_case_insensitively() {
        assert_eq!("SUB".parse::<TranslationType>().unwrap(), TranslationType::Sub);
        assert_eq!("dub".parse::<TranslationType>().unwrap(), TranslationType::Dub);
        assert!("raw".parse::<TranslationType>().is_err());
    }

    #[test]
    fn media_format_serializes_lowercase() {
        let json = serde_json::to_string(&MediaFormat::M3u8).unwrap();
        assert_eq!(json, "\"m3u8\"");
        assert!(MediaFormat::Mp4.priority() < MediaFormat::M3u8.priority());
    }

    #[test]
    fn raw_link_tagging_keeps_fields() {
        let link = RawLink::new(MediaFormat::Mp4, "720p", "https://a/b.mp4").with_provider("Wixmp");
        assert_eq!(link.quality, "720p");
        assert_eq!(link.url, "https://a/b.mp4");
        assert_eq!(link.provider, "Wixmp");
    }
}
