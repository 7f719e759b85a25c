//! Metadata endpoint client.
//!
//! This is the only module that talks to the GraphQL-style metadata API.
//! Requests are plain GETs carrying the query and its JSON-encoded
//! variables as URL parameters:
//!
//! ```text
//! GET https://api.allanime.day/api?variables={"showId":...}&query=query(...){episode(...){sourceUrls}}
//! ```
//!
//! [`SourceLocator::locate`] turns the `sourceUrls` of one episode into the
//! newline-joined `"<sourceName>:<sourceUrl>"` blob that provider tag
//! patterns are matched against. The catalog helpers
//! ([`MetadataClient::search`], [`MetadataClient::episodes`]) use the same
//! endpoint.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{json, Value};
use tracing::{debug, info, instrument};
use url::Url;

use crate::config::ResolverConfig;
use crate::error::{ResolveError, Result};
use crate::http_client::HttpClient;
use crate::provider::TranslationType;

// The misspelled enum name is the upstream schema's.
const EPISODE_QUERY: &str = "query($showId: String!, $translationType: VaildTranslationTypeEnumType!, $episodeString: String!) { episode(showId: $showId, translationType: $translationType, episodeString: $episodeString) { episodeString sourceUrls } }";

const SEARCH_QUERY: &str = "query($search: SearchInput, $limit: Int, $page: Int, $translationType: VaildTranslationTypeEnumType) { shows(search: $search, limit: $limit, page: $page, translationType: $translationType) { edges { _id name availableEpisodes englishName thumbnail __typename } } }";

const EPISODES_QUERY: &str =
    "query($showId: String!) { show(_id: $showId) { _id availableEpisodesDetail name } }";

/// Produces the raw source blob for one episode.
#[async_trait]
pub trait SourceLocator: Send + Sync {
    /// Fetch the tagged source blob.
    ///
    /// Fails with [`ResolveError::NoSources`] when the episode lists no
    /// sources and [`ResolveError::Upstream`] on transport, status or parse
    /// failures.
    async fn locate(&self, content_id: &str, episode: &str, mode: TranslationType) -> Result<String>;
}

/// A show returned by [`MetadataClient::search`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ShowSummary {
    pub id: String,
    pub name: String,
    pub english_name: Option<String>,
    /// Episodes available in the requested translation.
    pub episodes: u32,
    pub thumbnail: Option<String>,
}

/// Client for the metadata API.
#[derive(Debug, Clone)]
pub struct MetadataClient {
    http: HttpClient,
    endpoint: String,
}

impl MetadataClient {
    pub fn new(http: HttpClient, config: &ResolverConfig) -> Self {
        Self {
            http,
            endpoint: config.api_endpoint(),
        }
    }

    /// Build the GET URL for one GraphQL query.
    fn request_url(&self, query: &str, variables: &Value) -> Result<Url> {
        Url::parse_with_params(
            &self.endpoint,
            &[("variables", variables.to_string().as_str()), ("query", query)],
        )
        .map_err(|e| ResolveError::Upstream(format!("bad endpoint {}: {e}", self.endpoint)))
    }

    /// Request for one episode's source list.
    fn episode_request(&self, content_id: &str, episode: &str, mode: TranslationType) -> Result<Url> {
        let variables = json!({
            "showId": content_id,
            "translationType": mode.as_str(),
            "episodeString": episode,
        });
        self.request_url(EPISODE_QUERY, &variables)
    }

    /// Run one GraphQL request and decode its `data` member.
    async fn query<T: DeserializeOwned>(&self, url: Url) -> Result<Option<T>> {
        let resp = self.http.inner().get(url).send().await?;
        if !resp.status().is_success() {
            return Err(ResolveError::Upstream(format!(
                "metadata API error: {}",
                resp.status()
            )));
        }

        let body = resp.text().await?;
        let envelope: GraphQlResponse<T> = serde_json::from_str(&body)?;
        Ok(envelope.data)
    }

    /// Search shows by title. Shows with no episodes in `mode` are dropped.
    #[instrument(skip(self))]
    pub async fn search(&self, query: &str, mode: TranslationType, limit: u32) -> Result<Vec<ShowSummary>> {
        let variables = json!({
            "search": { "allowAdult": false, "allowUnknown": false, "query": query.trim() },
            "limit": limit,
            "page": 1,
            "translationType": mode.as_str(),
        });

        let data: Option<ShowsData> = self.query(self.request_url(SEARCH_QUERY, &variables)?).await?;
        let edges = data.map(|d| d.shows.edges).unwrap_or_default();
        let shows: Vec<ShowSummary> = edges
            .into_iter()
            .filter_map(|edge| edge.into_summary(mode))
            .collect();

        info!(results = shows.len(), "search complete");
        Ok(shows)
    }

    /// List a show's episodes in `mode`, numerically sorted when possible.
    #[instrument(skip(self))]
    pub async fn episodes(&self, show_id: &str, mode: TranslationType) -> Result<Vec<String>> {
        let variables = json!({ "showId": show_id });
        let data: Option<ShowData> = self.query(self.request_url(EPISODES_QUERY, &variables)?).await?;

        let Some(show) = data.and_then(|d| d.show) else {
            debug!("show not found");
            return Ok(Vec::new());
        };

        let raw = match mode {
            TranslationType::Sub => show.available_episodes_detail.sub,
            TranslationType::Dub => show.available_episodes_detail.dub,
        };
        Ok(sort_episodes(raw.iter().filter_map(episode_label).collect()))
    }
}

#[async_trait]
impl SourceLocator for MetadataClient {
    #[instrument(skip(self))]
    async fn locate(&self, content_id: &str, episode: &str, mode: TranslationType) -> Result<String> {
        let url = self.episode_request(content_id, episode, mode)?;
        let data: Option<EpisodeData> = self.query(url).await?;
        let sources = data
            .and_then(|d| d.episode)
            .map(|e| e.source_urls)
            .unwrap_or_default();

        if sources.is_empty() {
            return Err(ResolveError::NoSources {
                content_id: content_id.to_string(),
                episode: episode.to_string(),
            });
        }

        info!(sources = sources.len(), "episode sources located");
        Ok(build_blob(&sources))
    }
}

/// Join source entries into the blob provider patterns are matched against.
pub fn build_blob(sources: &[SourceUrl]) -> String {
    sources
        .iter()
        .filter_map(|s| {
            let url = s.source_url.replace("\\u002F", "/").replace('\\', "");
            (!s.source_name.is_empty() && !url.is_empty()).then(|| format!("{}:{url}", s.source_name))
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Sort numerically when every label is a number, lexicographically otherwise.
fn sort_episodes(mut episodes: Vec<String>) -> Vec<String> {
    let numeric: Option<Vec<f64>> = episodes.iter().map(|e| e.parse().ok()).collect();
    match numeric {
        Some(nums) => {
            let mut keyed: Vec<_> = nums.into_iter().zip(episodes).collect();
            keyed.sort_by(|a, b| a.0.total_cmp(&b.0));
            keyed.into_iter().map(|(_, e)| e).collect()
        }
        None => {
            episodes.sort();
            episodes
        }
    }
}

fn episode_label(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

// Serde structures for metadata API responses

/// Treat an explicit `null` like a missing key.
fn null_as_default<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[derive(Debug, Deserialize)]
struct GraphQlResponse<T> {
    data: Option<T>,
}

#[derive(Debug, Deserialize)]
struct EpisodeData {
    episode: Option<EpisodeSources>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct EpisodeSources {
    #[serde(default, deserialize_with = "null_as_default")]
    source_urls: Vec<SourceUrl>,
}

/// One `sourceUrls` entry.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceUrl {
    #[serde(default, deserialize_with = "null_as_default")]
    pub source_name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub source_url: String,
}

#[derive(Debug, Deserialize)]
struct ShowsData {
    shows: ShowEdges,
}

#[derive(Debug, Deserialize)]
struct ShowEdges {
    #[serde(default, deserialize_with = "null_as_default")]
    edges: Vec<ShowEdge>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ShowEdge {
    #[serde(rename = "_id")]
    id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    available_episodes: AvailableEpisodes,
    english_name: Option<String>,
    thumbnail: Option<String>,
}

impl ShowEdge {
    fn into_summary(self, mode: TranslationType) -> Option<ShowSummary> {
        let episodes = match mode {
            TranslationType::Sub => self.available_episodes.sub,
            TranslationType::Dub => self.available_episodes.dub,
        }
        .unwrap_or(0);

        (episodes > 0).then(|| ShowSummary {
            id: self.id,
            name: self.name.replace("\\\"", ""),
            english_name: self.english_name.filter(|n| !n.is_empty()),
            episodes,
            thumbnail: self.thumbnail.filter(|t| !t.is_empty()),
        })
    }
}

#[derive(Debug, Default, Deserialize)]
struct AvailableEpisodes {
    sub: Option<u32>,
    dub: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct ShowData {
    show: Option<ShowDetail>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ShowDetail {
    #[serde(default, deserialize_with = "null_as_default")]
    available_episodes_detail: EpisodesDetail,
}

#[derive(Debug, Default, Deserialize)]
struct EpisodesDetail {
    #[serde(default, deserialize_with = "null_as_default")]
    sub: Vec<Value>,
    #[serde(default, deserialize_with = "null_as_default")]
    dub: Vec<Value>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn source(name: &str, url: &str) -> SourceUrl {
        SourceUrl {
            source_name: name.to_string(),
            source_url: url.to_string(),
        }
    }

    #[test]
    fn blob_joins_name_and_url_per_line() {
        let blob = build_blob(&[
            source("Default", "--175948514e4c"),
            source("S-mp4", "--1759"),
        ]);
        assert_eq!(blob, "Default:--175948514e4c\nS-mp4:--1759");
    }

    #[test]
    fn blob_skips_incomplete_entries_and_unescapes() {
        let blob = build_blob(&[
            source("", "--1759"),
            source("Yt-mp4", ""),
            source("Luf-Mp4", "https:\\u002F\\u002Fx.example\\/a"),
        ]);
        assert_eq!(blob, "Luf-Mp4:https://x.example/a");
    }

    #[test]
    fn episode_response_parses() {
        let body = r#"{"data":{"episode":{"episodeString":"1","sourceUrls":[{"sourceUrl":"--175948514e4c","priority":7.7,"sourceName":"Default","type":"iframe"}]}}}"#;
        let parsed: GraphQlResponse<EpisodeData> = serde_json::from_str(body).unwrap();
        let sources = parsed.data.unwrap().episode.unwrap().source_urls;
        assert_eq!(build_blob(&sources), "Default:--175948514e4c");
    }

    #[test]
    fn missing_episode_parses_as_none() {
        let body = r#"{"data":{"episode":null}}"#;
        let parsed: GraphQlResponse<EpisodeData> = serde_json::from_str(body).unwrap();
        assert!(parsed.data.unwrap().episode.is_none());
    }

    #[test]
    fn null_source_list_parses_as_empty() {
        let body = r#"{"data":{"episode":{"episodeString":"1","sourceUrls":null}}}"#;
        let parsed: GraphQlResponse<EpisodeData> = serde_json::from_str(body).unwrap();
        assert!(parsed.data.unwrap().episode.unwrap().source_urls.is_empty());
    }

    #[test]
    fn null_fields_skip_only_their_entry() {
        let body = r#"{"data":{"episode":{"sourceUrls":[
            {"sourceUrl":"--1759","sourceName":null},
            {"sourceUrl":null,"sourceName":"S-mp4"},
            {"sourceUrl":"--175948514e4c","sourceName":"Default"}
        ]}}}"#;
        let parsed: GraphQlResponse<EpisodeData> = serde_json::from_str(body).unwrap();
        let sources = parsed.data.unwrap().episode.unwrap().source_urls;
        assert_eq!(sources.len(), 3);
        assert_eq!(build_blob(&sources), "Default:--175948514e4c");
    }

    #[test]
    fn null_episode_detail_lists_nothing() {
        let body = r#"{"show":{"_id":"a1","availableEpisodesDetail":{"sub":null,"dub":["1"]}}}"#;
        let data: ShowData = serde_json::from_str(body).unwrap();
        let detail = data.show.unwrap().available_episodes_detail;
        assert!(detail.sub.is_empty());
        assert_eq!(detail.dub.len(), 1);
    }

    fn variables_of(url: &Url) -> (Value, String) {
        let pairs: std::collections::HashMap<_, _> = url.query_pairs().into_owned().collect();
        let variables = serde_json::from_str(&pairs["variables"]).unwrap();
        (variables, pairs["query"].clone())
    }

    fn client() -> MetadataClient {
        let config = ResolverConfig::default();
        MetadataClient::new(HttpClient::new(&config).unwrap(), &config)
    }

    #[test]
    fn episode_request_carries_dub_selector() {
        let url = client()
            .episode_request("ReooPAxPMsHM4KPMY", "12", TranslationType::Dub)
            .unwrap();
        assert_eq!(url.host_str(), Some("api.allanime.day"));
        assert_eq!(url.path(), "/api");

        let (variables, query) = variables_of(&url);
        assert_eq!(variables["showId"], "ReooPAxPMsHM4KPMY");
        assert_eq!(variables["translationType"], "dub");
        assert_eq!(variables["episodeString"], "12");
        assert_eq!(query, EPISODE_QUERY);
    }

    #[test]
    fn episode_request_defaults_to_sub() {
        let url = client()
            .episode_request("show1", "1.5", TranslationType::default())
            .unwrap();
        let (variables, _) = variables_of(&url);
        assert_eq!(variables["translationType"], "sub");
        assert_eq!(variables["episodeString"], "1.5");
    }

    #[test]
    fn search_edges_filter_by_mode() {
        let body = r#"{"shows":{"edges":[
            {"_id":"a1","name":"Alpha","availableEpisodes":{"sub":12,"dub":0,"raw":0},"englishName":"Alpha EN","thumbnail":""},
            {"_id":"b2","name":"Beta","availableEpisodes":{"sub":0,"dub":3,"raw":0}}
        ]}}"#;
        let data: ShowsData = serde_json::from_str(body).unwrap();
        let subs: Vec<_> = data
            .shows
            .edges
            .into_iter()
            .filter_map(|e| e.into_summary(TranslationType::Sub))
            .collect();
        assert_eq!(subs.len(), 1);
        assert_eq!(subs[0].id, "a1");
        assert_eq!(subs[0].episodes, 12);
        assert_eq!(subs[0].english_name.as_deref(), Some("Alpha EN"));
        assert_eq!(subs[0].thumbnail, None);
    }

    #[test]
    fn episodes_sort_numerically() {
        let sorted = sort_episodes(vec!["10".into(), "2".into(), "1.5".into(), "1".into()]);
        assert_eq!(sorted, ["1", "1.5", "2", "10"]);
    }

    #[test]
    fn episodes_fall_back_to_string_sort() {
        let sorted = sort_episodes(vec!["10".into(), "2".into(), "OVA".into()]);
        assert_eq!(sorted, ["10", "2", "OVA"]);
    }

    #[test]
    fn episode_labels_accept_numbers() {
        let detail: EpisodesDetail = serde_json::from_str(r#"{"sub":["3",2,null]}"#).unwrap();
        let labels: Vec<_> = detail.sub.iter().filter_map(episode_label).collect();
        assert_eq!(labels, ["3", "2"]);
    }

    #[test]
    fn endpoint_comes_from_config() {
        let config = ResolverConfig {
            api_host: "example.test".to_string(),
            ..ResolverConfig::default()
        };
        let client = MetadataClient::new(HttpClient::new(&config).unwrap(), &config);
        assert_eq!(client.endpoint, "https://api.example.test/api");
    }
}
