//! `anilink` - episode link resolver
//!
//! # Features
//!
//! - **Token decoding**: Turns obfuscated provider tokens into fetchable paths
//! - **Provider registry**: Tag grammars, priorities and quality tiers per host
//! - **Concurrent resolution**: Bounded fan-out with per-provider timeouts
//! - **Ranking**: Deterministic ordering by provider, format and quality
//! - **Performance tracking**: Per-provider success rates and latency
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use anilink::{InMemoryTracker, Resolver, ResolverConfig, TranslationType};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let tracker = Arc::new(InMemoryTracker::new());
//!     let resolver = Resolver::from_config(ResolverConfig::default(), tracker)?;
//!     let links = resolver.resolve_all("ReooPAxPMsHM4KPMY", "1", TranslationType::Sub).await?;
//!     for link in &links {
//!         println!("{} {} {}", link.provider, link.quality, link.url);
//!     }
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod decoder;
pub mod error;
pub mod extract;
pub mod http_client;
pub mod provider;
pub mod rank;
pub mod resolver;
pub mod source;
pub mod tracker;

pub use config::{load_config, ResolverConfig};
pub use error::{FetchError, ResolveError, Result};
pub use http_client::{Fetcher, HttpClient};
pub use provider::{
    ExtractorKind, MediaFormat, MediaLink, ProviderDescriptor, ProviderRegistry, RawLink,
    TranslationType,
};
pub use rank::{mp4_only, rank, select, QualityPreference};
pub use resolver::{FetchResult, FetchTask, Resolver};
pub use source::{MetadataClient, ShowSummary, SourceLocator};
pub use tracker::{InMemoryTracker, JsonFileTracker, PerformanceTracker, ProviderRanking, ProviderStats};

/// Version of anilink
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
