//! Exchanges an embed page URL for a direct `.m3u8` URL

use std::fmt;

use reqwest::{
    StatusCode,
    header::{ACCEPT, CONTENT_TYPE, ORIGIN, REFERER, USER_AGENT},
};
use serde_json::{Value, json};
use tracing::{debug, instrument};

use crate::config::HandshakeConfig;

const PLAYLIST_MARKER: &str = ".m3u8";

/// Why a handshake did not produce a direct URL
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FallbackReason {
    /// Network error or timeout, already rendered
    Transport(String),
    Status(StatusCode),
    /// Body does not mention any `.m3u8`
    MissingMarker,
    MalformedJson,
    MissingUrlField,
}

impl fmt::Display for FallbackReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Transport(e) => write!(f, "transport error: {e}"),
            Self::Status(status) => write!(f, "handshake answered with status {status}"),
            Self::MissingMarker => f.write_str("response has no .m3u8 link"),
            Self::MalformedJson => f.write_str("response looks like JSON but does not parse"),
            Self::MissingUrlField => f.write_str("JSON response has no `url` field"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    Resolved(String),
    /// The embed URL is kept as-is
    Fallback {
        original: String,
        reason: FallbackReason,
    },
}

impl Resolution {
    /// URL to hand to the player, whichever way the handshake went
    #[must_use]
    pub fn url(&self) -> &str {
        match self {
            Self::Resolved(url) => url,
            Self::Fallback { original, .. } => original,
        }
    }

    #[must_use]
    pub fn into_url(self) -> String {
        match self {
            Self::Resolved(url) => url,
            Self::Fallback { original, .. } => original,
        }
    }

    #[must_use]
    pub const fn is_resolved(&self) -> bool {
        matches!(self, Self::Resolved(_))
    }
}

/// Final path segment of an embed URL, which is what the handshake calls the stream id
#[must_use]
pub fn stream_id(embed_url: &str) -> &str {
    embed_url.rsplit('/').next().unwrap_or_default()
}

/// Reads a `200 OK` handshake body
///
/// The body is either the bare direct URL or a JSON object carrying it under `url`.
pub fn parse_handshake_body(embed_url: &str, body: &str) -> Resolution {
    let data = body.trim();
    if !data.contains(PLAYLIST_MARKER) {
        return fallback(embed_url, FallbackReason::MissingMarker);
    }

    if !data.starts_with('{') {
        return Resolution::Resolved(data.to_string());
    }

    let Ok(json) = serde_json::from_str::<Value>(data) else {
        return fallback(embed_url, FallbackReason::MalformedJson);
    };
    match json["url"].as_str() {
        Some(url) => Resolution::Resolved(url.to_string()),
        None => fallback(embed_url, FallbackReason::MissingUrlField),
    }
}

fn fallback(embed_url: &str, reason: FallbackReason) -> Resolution {
    Resolution::Fallback {
        original: embed_url.to_string(),
        reason,
    }
}

pub struct StreamResolver {
    client: reqwest::Client,
    config: HandshakeConfig,
}

impl StreamResolver {
    #[must_use]
    pub const fn new(client: reqwest::Client, config: HandshakeConfig) -> Self {
        Self { client, config }
    }

    /// Runs one best-effort handshake for `embed_url`. Never fails, see [`Resolution`]
    #[instrument(skip(self))]
    pub async fn resolve(&self, embed_url: &str) -> Resolution {
        let resolution = match self.handshake(embed_url).await {
            Ok(body) => parse_handshake_body(embed_url, &body),
            Err(reason) => fallback(embed_url, reason),
        };

        if let Resolution::Fallback { reason, .. } = &resolution {
            debug!("Keeping embed URL: {reason}");
        }
        resolution
    }

    async fn handshake(&self, embed_url: &str) -> Result<String, FallbackReason> {
        let res = self
            .client
            .post(&self.config.endpoint)
            .header(USER_AGENT, &self.config.user_agent)
            .header(ACCEPT, "*/*")
            .header(CONTENT_TYPE, "application/json")
            .header(ORIGIN, &self.config.origin)
            .header(REFERER, embed_url)
            .json(&json!({ "id": stream_id(embed_url) }))
            .timeout(self.config.timeout)
            .send()
            .await
            .map_err(|e| FallbackReason::Transport(e.to_string()))?;

        if res.status() != StatusCode::OK {
            return Err(FallbackReason::Status(res.status()));
        }

        res.text()
            .await
            .map_err(|e| FallbackReason::Transport(e.to_string()))
    }
}
