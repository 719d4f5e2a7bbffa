use std::fmt::Write as _;

use crate::normalize::StreamRecord;

/// Request identity written as `#EXTVLCOPT` directives for every entry
#[derive(Debug, Clone)]
pub struct PlayerHeaders<'a> {
    pub user_agent: &'a str,
    pub referrer: &'a str,
}

/// Renders an extended M3U playlist pointing players at the guide published under `epg_url`.
///
/// The directive order (`#EXTINF`, user agent, referrer, URL) is what TiviMate-style players
/// expect and must not change. Values are written verbatim.
#[must_use]
pub fn render_playlist(records: &[StreamRecord], epg_url: &str, headers: &PlayerHeaders<'_>) -> String {
    let mut out = format!("#EXTM3U x-tvg-url=\"{epg_url}\"\n");

    for record in records {
        out.push_str("#EXTINF:-1 tvg-id=\"");
        out.push_str(&record.id);
        out.push('"');
        if !record.logo.is_empty() {
            // Writing into a String never fails
            let _ = write!(out, " tvg-logo=\"{}\"", record.logo);
        }
        let _ = writeln!(
            out,
            " group-title=\"{}\",{}",
            record.group, record.display_name
        );
        let _ = writeln!(out, "#EXTVLCOPT:http-user-agent={}", headers.user_agent);
        let _ = writeln!(out, "#EXTVLCOPT:http-referrer={}", headers.referrer);
        out.push_str(&record.url);
        out.push('\n');
    }

    out
}

#[cfg(test)]
mod tests {
    use indoc::indoc;

    use super::*;

    const HEADERS: PlayerHeaders<'static> = PlayerHeaders {
        user_agent: "Mozilla/5.0 (Windows NT 10.0; Win64; x64)",
        referrer: "https://timstreams.lol/",
    };

    fn record(id: &str, logo: &str, url: &str) -> StreamRecord {
        StreamRecord {
            id: id.to_string(),
            display_name: "Derby - HD1".to_string(),
            url: url.to_string(),
            logo: logo.to_string(),
            group: "Football".to_string(),
        }
    }

    #[test]
    fn writes_header_and_four_lines_per_entry() {
        let playlist = render_playlist(
            &[
                record("123-HD1", "l.png", "https://cdn.example/x.m3u8"),
                record("123-HD2", "", "http://embed.example/abc124"),
            ],
            "https://example.org/epg.xml",
            &HEADERS,
        );

        assert_eq!(
            playlist,
            indoc! {r#"
                #EXTM3U x-tvg-url="https://example.org/epg.xml"
                #EXTINF:-1 tvg-id="123-HD1" tvg-logo="l.png" group-title="Football",Derby - HD1
                #EXTVLCOPT:http-user-agent=Mozilla/5.0 (Windows NT 10.0; Win64; x64)
                #EXTVLCOPT:http-referrer=https://timstreams.lol/
                https://cdn.example/x.m3u8
                #EXTINF:-1 tvg-id="123-HD2" group-title="Football",Derby - HD1
                #EXTVLCOPT:http-user-agent=Mozilla/5.0 (Windows NT 10.0; Win64; x64)
                #EXTVLCOPT:http-referrer=https://timstreams.lol/
                http://embed.example/abc124
            "#}
        );
    }

    #[test]
    fn empty_playlist_has_only_header() {
        assert_eq!(
            render_playlist(&[], "https://example.org/epg.xml", &HEADERS),
            "#EXTM3U x-tvg-url=\"https://example.org/epg.xml\"\n"
        );
    }
}
