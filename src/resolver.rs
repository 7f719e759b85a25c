//! Concurrent link resolution.
//!
//! One [`Resolver::resolve_all`] call:
//!
//! 1. asks the [`SourceLocator`] for the episode's source blob,
//! 2. finds each provider's token in the blob and decodes it into a fetch
//!    URL ([`Resolver::plan`]),
//! 3. fetches every planned URL with at most `max_workers` requests in
//!    flight, each under its own timeout,
//! 4. reports every outcome to the [`PerformanceTracker`],
//! 5. runs the provider's extractor over each successful body,
//! 6. ranks the merged links.
//!
//! A failing provider only loses its own links. The only error that
//! escapes is an upstream failure of the metadata endpoint.

use std::sync::Arc;
use std::time::{Duration, Instant};

use futures::stream::{self, StreamExt};
use tracing::{debug, info, instrument, warn};

use crate::config::ResolverConfig;
use crate::decoder;
use crate::error::{FetchError, ResolveError, Result};
use crate::extract;
use crate::http_client::{Fetcher, HttpClient};
use crate::provider::{MediaLink, ProviderDescriptor, ProviderRegistry, TranslationType};
use crate::rank;
use crate::source::{MetadataClient, SourceLocator};
use crate::tracker::PerformanceTracker;

/// A provider URL scheduled for fetching.
#[derive(Debug, Clone)]
pub struct FetchTask {
    pub provider: &'static ProviderDescriptor,
    pub url: String,
}

/// Outcome of one provider fetch.
#[derive(Debug)]
pub struct FetchResult {
    pub provider: &'static ProviderDescriptor,
    pub outcome: std::result::Result<String, FetchError>,
    pub latency: Duration,
}

/// Resolves episodes into ranked media links.
pub struct Resolver {
    locator: Box<dyn SourceLocator>,
    fetcher: Box<dyn Fetcher>,
    tracker: Arc<dyn PerformanceTracker>,
    registry: ProviderRegistry,
    config: ResolverConfig,
    fetch_timeout: Duration,
}

impl Resolver {
    /// Assemble a resolver from its collaborators.
    pub fn new(
        locator: Box<dyn SourceLocator>,
        fetcher: Box<dyn Fetcher>,
        tracker: Arc<dyn PerformanceTracker>,
        config: ResolverConfig,
    ) -> Self {
        let fetch_timeout = config.timeout();
        Self {
            locator,
            fetcher,
            tracker,
            registry: ProviderRegistry::new(),
            config,
            fetch_timeout,
        }
    }

    /// Build a resolver that talks to the real metadata endpoint and providers.
    pub fn from_config(config: ResolverConfig, tracker: Arc<dyn PerformanceTracker>) -> Result<Self> {
        config.validate()?;
        let http = HttpClient::new(&config)?;
        let metadata = MetadataClient::new(http.clone(), &config);
        Ok(Self::new(Box::new(metadata), Box::new(http), tracker, config))
    }

    /// Override the per-fetch timeout taken from the configuration.
    #[must_use]
    pub fn with_fetch_timeout(mut self, timeout: Duration) -> Self {
        self.fetch_timeout = timeout;
        self
    }

    /// Resolve one episode into ranked links.
    ///
    /// An episode without sources, or whose providers all fail, resolves to
    /// an empty list.
    #[instrument(skip(self))]
    pub async fn resolve_all(
        &self,
        content_id: &str,
        episode: &str,
        mode: TranslationType,
    ) -> Result<Vec<MediaLink>> {
        let blob = match self.locator.locate(content_id, episode, mode).await {
            Ok(blob) => blob,
            Err(ResolveError::NoSources { .. }) => {
                warn!("no sources listed for episode");
                return Ok(Vec::new());
            }
            Err(e) => return Err(e),
        };

        let tasks = self.plan(&blob);
        if tasks.is_empty() {
            info!("no known provider tags in source blob");
            return Ok(Vec::new());
        }

        let results = self.fetch_all(tasks).await;
        let links = rank::rank(extract_links(results), &self.registry);
        info!(links = links.len(), "resolution complete");
        Ok(links)
    }

    /// Match provider tags against the blob and build fetch tasks, in
    /// registry order. Tokens that decode to nothing are dropped.
    pub fn plan(&self, blob: &str) -> Vec<FetchTask> {
        self.registry
            .all()
            .iter()
            .filter_map(|provider| {
                let token = provider.find_token(blob)?;
                let path = decoder::decode(token);
                if path.is_empty() {
                    debug!(provider = provider.key, "token decoded to empty path");
                    return None;
                }
                Some(FetchTask {
                    provider,
                    url: self.config.provider_url(&path),
                })
            })
            .collect()
    }

    /// Fetch every task with bounded parallelism and wait for all of them.
    ///
    /// Results come back in completion order.
    pub async fn fetch_all(&self, tasks: Vec<FetchTask>) -> Vec<FetchResult> {
        let workers = self.config.max_workers.max(1);
        debug!(tasks = tasks.len(), workers, "fetching providers");

        stream::iter(tasks)
            .map(|task| self.fetch_one(task))
            .buffer_unordered(workers)
            .collect()
            .await
    }

    async fn fetch_one(&self, task: FetchTask) -> FetchResult {
        let timeout = self.fetch_timeout;
        let start = Instant::now();

        let outcome = tokio::time::timeout(timeout, self.fetcher.fetch_text(&task.url, timeout))
            .await
            .unwrap_or(Err(FetchError::Timeout(timeout)));
        let latency = start.elapsed();

        let name = task.provider.display_name;
        self.tracker.record(name, outcome.is_ok(), latency);
        match &outcome {
            Ok(body) => debug!(provider = name, bytes = body.len(), ?latency, "provider fetched"),
            Err(e) => warn!(provider = name, ?latency, "provider failed: {e}"),
        }

        FetchResult {
            provider: task.provider,
            outcome,
            latency,
        }
    }
}

/// Run each successful body through its provider's extractor.
///
/// Links in a format the provider does not serve are dropped.
pub fn extract_links(results: Vec<FetchResult>) -> Vec<MediaLink> {
    results
        .into_iter()
        .filter_map(|result| {
            let body = result.outcome.ok()?;
            let provider = result.provider;
            let links = extract::extract(provider.kind, &body);
            if links.is_empty() {
                debug!(provider = provider.display_name, "response matched no links");
            }
            Some(
                links
                    .into_iter()
                    .filter(move |link| provider.supports(link.format))
                    .map(move |link| link.with_provider(provider.display_name)),
            )
        })
        .flatten()
        .collect()
}
