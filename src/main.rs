#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![warn(clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

use std::{path::PathBuf, process::ExitCode, time::Duration};

use anyhow::{Result, ensure};
use clap::Parser;
use sportcast::{
    Config, Outcome,
    config::{
        DEFAULT_HANDSHAKE_ORIGIN, DEFAULT_HANDSHAKE_URL, DEFAULT_PLAYER_REFERRER,
        DEFAULT_PLAYER_USER_AGENT, DEFAULT_SOURCE_URL, EpgLocation, HandshakeConfig,
    },
    util::init_http_client,
};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

/// Builds an XMLTV guide and an M3U8 playlist from a live sports catalog
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Catalog to read categories, events and streams from
    #[arg(long, env = "SPORTCAST_SOURCE_URL", default_value = DEFAULT_SOURCE_URL)]
    source_url: String,

    /// Endpoint exchanging embed ids for direct playlist links
    #[arg(long, env = "SPORTCAST_HANDSHAKE_URL", default_value = DEFAULT_HANDSHAKE_URL)]
    handshake_url: String,

    /// `Origin` sent along with each handshake
    #[arg(long, env = "SPORTCAST_HANDSHAKE_ORIGIN", default_value = DEFAULT_HANDSHAKE_ORIGIN)]
    handshake_origin: String,

    /// Catalog request timeout, in seconds
    #[arg(long, env = "SPORTCAST_CATALOG_TIMEOUT", default_value_t = 40)]
    catalog_timeout: u64,

    /// Handshake request timeout, in seconds
    #[arg(long, env = "SPORTCAST_HANDSHAKE_TIMEOUT", default_value_t = 12)]
    handshake_timeout: u64,

    /// The amount of handshakes running at once
    #[arg(short, long, env = "SPORTCAST_CONCURRENCY", default_value_t = 1)]
    concurrency: usize,

    /// Directory receiving `epg.xml` and `playlist.m3u8`
    #[arg(short, long, env = "SPORTCAST_OUTPUT_DIR", default_value = ".")]
    output_dir: PathBuf,

    /// Guide URL advertised in the playlist header. Overrides `--github-owner` / `--github-repo`
    #[arg(long, env = "SPORTCAST_EPG_URL")]
    epg_url: Option<String>,

    /// GitHub account publishing the guide
    #[arg(long, env = "SPORTCAST_GITHUB_OWNER", default_value = "BuddyChewChew")]
    github_owner: String,

    /// GitHub repository publishing the guide
    #[arg(long, env = "SPORTCAST_GITHUB_REPO", default_value = "via")]
    github_repo: String,

    /// User agent players should send when opening a stream
    #[arg(long, env = "SPORTCAST_PLAYER_USER_AGENT", default_value = DEFAULT_PLAYER_USER_AGENT)]
    player_user_agent: String,

    /// Referrer players should send when opening a stream
    #[arg(long, env = "SPORTCAST_PLAYER_REFERRER", default_value = DEFAULT_PLAYER_REFERRER)]
    player_referrer: String,

    /// Logo for events that don't have one
    #[arg(long, env = "SPORTCAST_DEFAULT_LOGO")]
    default_logo: Option<String>,

    /// Repeat channel icons inside every guide programme
    #[arg(long, env = "SPORTCAST_PROGRAMME_ICONS")]
    programme_icons: bool,
}

impl Args {
    fn into_config(self) -> Result<Config> {
        ensure!(self.concurrency > 0, "--concurrency must be at least 1");
        ensure!(
            self.output_dir.is_dir(),
            "Output directory {:?} does not exist",
            self.output_dir
        );

        let epg_location = self.epg_url.map_or_else(
            || EpgLocation::GitHub {
                owner: self.github_owner,
                repo: self.github_repo,
            },
            EpgLocation::Url,
        );

        Ok(Config {
            source_url: self.source_url,
            catalog_timeout: Duration::from_secs(self.catalog_timeout),
            handshake: HandshakeConfig {
                endpoint: self.handshake_url,
                origin: self.handshake_origin,
                timeout: Duration::from_secs(self.handshake_timeout),
                ..HandshakeConfig::default()
            },
            concurrency: self.concurrency,
            epg_location,
            player_user_agent: self.player_user_agent,
            player_referrer: self.player_referrer,
            default_logo: self.default_logo,
            programme_icons: self.programme_icons,
            ..Config::default()
        }
        .with_output_dir(self.output_dir))
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = match Args::parse().into_config() {
        Ok(config) => config,
        Err(e) => {
            error!("{e:#}");
            return ExitCode::from(2);
        }
    };

    match sportcast::run(init_http_client(), &config).await {
        Ok(Outcome::Written(report)) => {
            info!("Wrote {} channels", report.records);
            ExitCode::SUCCESS
        }
        Ok(Outcome::Empty) => ExitCode::SUCCESS,
        Err(e) => {
            error!("Pipeline failed: {:#}", anyhow::Error::from(e));
            ExitCode::FAILURE
        }
    }
}
