use std::collections::HashSet;

use futures_util::{StreamExt as _, stream};
use tracing::{info, warn};

use crate::{
    catalog::{Catalog, Category, Event, Stream},
    resolver::{Resolution, StreamResolver},
};

/// One playable channel, as written to the guide and the playlist
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamRecord {
    pub id: String,
    pub display_name: String,
    pub url: String,
    pub logo: String,
    pub group: String,
}

/// `{event id}-{stream name without spaces}`
#[must_use]
pub fn channel_id(event_id: &str, stream_name: &str) -> String {
    format!("{event_id}-{}", stream_name.replace(' ', ""))
}

#[must_use]
pub fn display_name(event_name: &str, stream_name: &str) -> String {
    format!("{event_name} - {stream_name}")
}

/// A stream that passed filtering and still awaits its handshake
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingStream<'a> {
    pub category: &'a Category,
    pub event: &'a Event,
    pub stream: &'a Stream,
}

impl PendingStream<'_> {
    #[must_use]
    pub fn into_record(self, url: String, default_logo: Option<&str>) -> StreamRecord {
        let logo = if self.event.logo.is_empty() {
            default_logo.unwrap_or_default().to_string()
        } else {
            self.event.logo.clone()
        };

        StreamRecord {
            id: channel_id(&self.event.id, &self.stream.name),
            display_name: display_name(&self.event.name, &self.stream.name),
            url,
            logo,
            group: self.category.name.clone(),
        }
    }
}

/// Flattens the catalog in document order, dropping everything that can't be played
#[must_use]
pub fn playable_streams(catalog: &Catalog) -> Vec<PendingStream<'_>> {
    catalog
        .iter()
        .flat_map(|category| {
            category
                .events
                .iter()
                .filter(|event| !event.streams.is_empty())
                .flat_map(move |event| {
                    event
                        .streams
                        .iter()
                        .filter(|stream| stream.is_playable())
                        .map(move |stream| PendingStream {
                            category,
                            event,
                            stream,
                        })
                })
        })
        .collect()
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Normalized {
    pub records: Vec<StreamRecord>,
    /// How many records kept their embed URL
    pub fallbacks: usize,
}

/// Resolves every playable stream and builds the records.
///
/// At most `concurrency` handshakes are in flight; records always come out in document order.
pub async fn normalize(
    catalog: &Catalog,
    resolver: &StreamResolver,
    concurrency: usize,
    default_logo: Option<&str>,
) -> Normalized {
    let pending = playable_streams(catalog);

    let resolved = stream::iter(pending)
        .map(|pending| async move {
            info!(
                "Handshaking: {} - {}",
                pending.event.name, pending.stream.name
            );
            let resolution = resolver.resolve(&pending.stream.url).await;
            (pending, resolution)
        })
        .buffered(concurrency.max(1))
        .collect::<Vec<(PendingStream<'_>, Resolution)>>()
        .await;

    let mut normalized = Normalized::default();
    for (pending, resolution) in resolved {
        if !resolution.is_resolved() {
            normalized.fallbacks += 1;
        }
        normalized
            .records
            .push(pending.into_record(resolution.into_url(), default_logo));
    }

    warn_duplicate_ids(&normalized.records);
    normalized
}

fn warn_duplicate_ids(records: &[StreamRecord]) {
    let mut seen = HashSet::with_capacity(records.len());
    for record in records {
        if !seen.insert(record.id.as_str()) {
            warn!("Channel id {} is used by more than one stream", record.id);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::{catalog::parse_catalog, config::HandshakeConfig};
    use wiremock::{
        Mock, MockServer, ResponseTemplate,
        matchers::{body_json, method},
    };

    fn offline_resolver() -> StreamResolver {
        StreamResolver::new(
            reqwest::Client::new(),
            HandshakeConfig {
                endpoint: "http://127.0.0.1:1/blood".to_string(),
                timeout: Duration::from_millis(500),
                ..HandshakeConfig::default()
            },
        )
    }

    #[test]
    fn ids_strip_spaces_only_from_stream_name() {
        assert_eq!(channel_id("12 3", "HD 1 Main"), "12 3-HD1Main");
        assert_eq!(display_name("Derby", "HD 1"), "Derby - HD 1");
    }

    #[test]
    fn ids_are_deterministic() {
        assert_eq!(channel_id("123", "HD1"), channel_id("123", "HD1"));
        assert_eq!(display_name("Derby", "HD1"), display_name("Derby", "HD1"));
    }

    #[test]
    fn non_http_streams_are_dropped() {
        let catalog = parse_catalog(
            r#"[{"category":"Football","events":[
                {"name":"A","URL":"1","streams":[
                    {"name":"web","url":"https://embed.example/a"},
                    {"name":"p2p","url":"acestream://deadbeef"},
                    {"name":"none"}
                ]},
                {"name":"B","URL":"2","streams":[]}
            ]}]"#,
        )
        .unwrap();

        let pending = playable_streams(&catalog);

        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].stream.name, "web");
    }

    #[test]
    fn empty_logo_takes_configured_default() {
        let catalog = parse_catalog(
            r#"[{"category":"Tennis","events":[{"name":"Final","URL":"9",
                "streams":[{"name":"Court 1","url":"http://embed.example/c1"}]}]}]"#,
        )
        .unwrap();
        let pending = playable_streams(&catalog).remove(0);

        let record = pending
            .clone()
            .into_record("http://x".to_string(), Some("https://logo.example/default.png"));
        assert_eq!(record.logo, "https://logo.example/default.png");

        let record = pending.into_record("http://x".to_string(), None);
        assert_eq!(record.logo, "");
        assert_eq!(record.id, "9-Court1");
        assert_eq!(record.group, "Tennis");
    }

    #[tokio::test]
    async fn failed_handshakes_keep_embed_urls() {
        let catalog = parse_catalog(
            r#"[{"category":"Football","events":[{"name":"Derby","URL":"123","logo":"l.png",
                "streams":[{"name":"HD1","url":"http://embed.example/abc123"}]}]}]"#,
        )
        .unwrap();

        let normalized = normalize(&catalog, &offline_resolver(), 1, None).await;

        assert_eq!(normalized.fallbacks, 1);
        assert_eq!(
            normalized.records,
            vec![StreamRecord {
                id: "123-HD1".to_string(),
                display_name: "Derby - HD1".to_string(),
                url: "http://embed.example/abc123".to_string(),
                logo: "l.png".to_string(),
                group: "Football".to_string(),
            }]
        );
    }

    #[tokio::test]
    async fn concurrent_resolution_keeps_document_order() {
        let server = MockServer::start().await;
        // The first stream answers last
        for (id, delay) in [("a", 400), ("b", 200), ("c", 0)] {
            Mock::given(method("POST"))
                .and(body_json(serde_json::json!({ "id": id })))
                .respond_with(
                    ResponseTemplate::new(200)
                        .set_body_string(format!("https://cdn.example/{id}.m3u8"))
                        .set_delay(Duration::from_millis(delay)),
                )
                .mount(&server)
                .await;
        }
        let resolver = StreamResolver::new(
            reqwest::Client::new(),
            HandshakeConfig {
                endpoint: server.uri(),
                ..HandshakeConfig::default()
            },
        );
        let catalog = parse_catalog(
            r#"[{"category":"F1","events":[{"name":"GP","URL":"7","streams":[
                {"name":"A","url":"http://embed.example/a"},
                {"name":"B","url":"http://embed.example/b"},
                {"name":"C","url":"http://embed.example/c"}
            ]}]}]"#,
        )
        .unwrap();

        let normalized = normalize(&catalog, &resolver, 3, None).await;

        let urls = normalized
            .records
            .iter()
            .map(|r| r.url.as_str())
            .collect::<Vec<_>>();
        assert_eq!(
            urls,
            [
                "https://cdn.example/a.m3u8",
                "https://cdn.example/b.m3u8",
                "https://cdn.example/c.m3u8"
            ]
        );
        assert_eq!(normalized.fallbacks, 0);
    }

    #[tokio::test]
    async fn colliding_ids_are_kept() {
        let catalog = parse_catalog(
            r#"[{"category":"Football","events":[{"name":"Derby","URL":"1","streams":[
                {"name":"HD 1","url":"http://embed.example/x"},
                {"name":"HD1","url":"http://embed.example/y"}
            ]}]}]"#,
        )
        .unwrap();

        let normalized = normalize(&catalog, &offline_resolver(), 2, None).await;

        assert_eq!(normalized.records.len(), 2);
        assert_eq!(normalized.records[0].id, normalized.records[1].id);
    }
}
