use std::path::Path;

use chrono::Utc;
use tracing::{info, instrument};

use crate::{
    catalog::fetch_catalog,
    config::Config,
    epg::{EpgOptions, render_epg},
    error::{PipelineError, Result},
    normalize::normalize,
    playlist::{PlayerHeaders, render_playlist},
    resolver::StreamResolver,
    util::write_atomic,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunReport {
    pub records: usize,
    pub resolved: usize,
    pub fallbacks: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Both files were replaced
    Written(RunReport),
    /// Nothing playable in the catalog, previous files are left alone
    Empty,
}

/// Fetches the catalog, resolves every stream and replaces the guide and the playlist.
///
/// Nothing is written unless the whole catalog was processed.
///
/// # Errors
/// * Catalog cannot be fetched or is not valid, see [`fetch_catalog`]
/// * Either output file cannot be written
#[instrument(skip_all, fields(source = %config.source_url))]
pub async fn run(client: reqwest::Client, config: &Config) -> Result<Outcome> {
    let catalog = fetch_catalog(&client, &config.source_url, config.catalog_timeout).await?;

    let resolver = StreamResolver::new(client, config.handshake.clone());
    let normalized = normalize(
        &catalog,
        &resolver,
        config.concurrency,
        config.default_logo.as_deref(),
    )
    .await;

    if normalized.records.is_empty() {
        info!("No playable streams in catalog, keeping previous output");
        return Ok(Outcome::Empty);
    }

    let epg = render_epg(
        &normalized.records,
        Utc::now(),
        EpgOptions {
            programme_icons: config.programme_icons,
        },
    )
    .map_err(PipelineError::Encode)?;
    let playlist = render_playlist(
        &normalized.records,
        &config.epg_location.url(),
        &PlayerHeaders {
            user_agent: &config.player_user_agent,
            referrer: &config.player_referrer,
        },
    );

    tokio::try_join!(
        write_output(&config.epg_path, &epg),
        write_output(&config.playlist_path, &playlist),
    )?;

    let report = RunReport {
        records: normalized.records.len(),
        resolved: normalized.records.len() - normalized.fallbacks,
        fallbacks: normalized.fallbacks,
    };
    info!(
        "Successfully updated {} streams ({} direct, {} kept as embed)",
        report.records, report.resolved, report.fallbacks
    );

    Ok(Outcome::Written(report))
}

async fn write_output(path: &Path, contents: &str) -> Result<()> {
    write_atomic(path, contents)
        .await
        .map_err(|source| PipelineError::OutputWrite {
            path: path.to_path_buf(),
            source,
        })
}
