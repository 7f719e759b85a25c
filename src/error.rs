//! Error types for link resolution.
//!
//! Only [`ResolveError`] ever reaches a caller of
//! [`Resolver::resolve_all`](crate::resolver::Resolver::resolve_all).
//! [`FetchError`] describes a single provider fetch and is absorbed by the
//! resolver: it is logged, recorded in the tracker and dropped.

use std::time::Duration;

use thiserror::Error;

/// Errors surfaced by the metadata endpoint, registry and configuration.
#[derive(Error, Debug)]
pub enum ResolveError {
    /// The metadata endpoint answered but listed no sources for the episode.
    #[error("no sources for {content_id} episode {episode}")]
    NoSources { content_id: String, episode: String },

    /// The metadata endpoint was unreachable, returned an error status or
    /// sent a body that does not parse.
    #[error("upstream error: {0}")]
    Upstream(String),

    #[error("unknown provider: {0}")]
    UnknownProvider(String),

    #[error("config error: {0}")]
    Config(String),
}

impl From<reqwest::Error> for ResolveError {
    fn from(err: reqwest::Error) -> Self {
        Self::Upstream(err.to_string())
    }
}

impl From<serde_json::Error> for ResolveError {
    fn from(err: serde_json::Error) -> Self {
        Self::Upstream(format!("malformed response: {err}"))
    }
}

pub type Result<T> = std::result::Result<T, ResolveError>;

/// Failure of one provider fetch.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    #[error("timed out after {0:?}")]
    Timeout(Duration),

    #[error("HTTP status {0}")]
    Status(u16),

    #[error("transport error: {0}")]
    Transport(String),
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        if let Some(status) = err.status() {
            Self::Status(status.as_u16())
        } else {
            Self::Transport(err.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_sources_message_names_episode() {
        let err = ResolveError::NoSources {
            content_id: "abc".to_string(),
            episode: "3".to_string(),
        };
        assert_eq!(err.to_string(), "no sources for abc episode 3");
    }

    #[test]
    fn json_errors_become_upstream() {
        let parse = serde_json::from_str::<serde_json::Value>("{not json").unwrap_err();
        let err = ResolveError::from(parse);
        assert!(matches!(err, ResolveError::Upstream(ref m) if m.starts_with("malformed response")));
    }

    #[test]
    fn fetch_error_display() {
        assert_eq!(FetchError::Status(503).to_string(), "HTTP status 503");
        assert_eq!(
            FetchError::Timeout(Duration::from_millis(1500)).to_string(),
            "timed out after 1.5s"
        );
    }
}
