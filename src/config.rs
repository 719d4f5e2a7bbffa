use std::{path::PathBuf, time::Duration};

pub const DEFAULT_SOURCE_URL: &str = "https://stra.viaplus.site/main";
pub const DEFAULT_HANDSHAKE_URL: &str = "https://hddm.viaplus.site/blood";
pub const DEFAULT_HANDSHAKE_ORIGIN: &str = "https://hmembeds.one";
pub const DEFAULT_HANDSHAKE_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:148.0) Gecko/20100101 Firefox/148.0";

// Identity handed to the IPTV player, independent of whichever host served the stream
pub const DEFAULT_PLAYER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64)";
pub const DEFAULT_PLAYER_REFERRER: &str = "https://timstreams.lol/";

pub const EPG_FILE_NAME: &str = "epg.xml";
pub const PLAYLIST_FILE_NAME: &str = "playlist.m3u8";

/// Where the published guide can be found by players reading the playlist
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EpgLocation {
    /// Used verbatim
    Url(String),
    /// Raw file on a GitHub repository's `main` branch
    GitHub { owner: String, repo: String },
}

impl EpgLocation {
    #[must_use]
    pub fn url(&self) -> String {
        match self {
            Self::Url(url) => url.clone(),
            Self::GitHub { owner, repo } => {
                format!("https://raw.githubusercontent.com/{owner}/{repo}/main/{EPG_FILE_NAME}")
            }
        }
    }
}

/// Handshake endpoint and the headers it expects
#[derive(Debug, Clone)]
pub struct HandshakeConfig {
    pub endpoint: String,
    pub origin: String,
    pub user_agent: String,
    pub timeout: Duration,
}

impl Default for HandshakeConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_HANDSHAKE_URL.to_string(),
            origin: DEFAULT_HANDSHAKE_ORIGIN.to_string(),
            user_agent: DEFAULT_HANDSHAKE_USER_AGENT.to_string(),
            timeout: Duration::from_secs(12),
        }
    }
}

/// Static configuration for a single pipeline run
#[derive(Debug, Clone)]
pub struct Config {
    pub source_url: String,
    pub catalog_timeout: Duration,
    pub handshake: HandshakeConfig,

    /// Amount of handshakes in flight at once. `1` resolves strictly one after another
    pub concurrency: usize,

    pub epg_location: EpgLocation,
    pub epg_path: PathBuf,
    pub playlist_path: PathBuf,

    pub player_user_agent: String,
    pub player_referrer: String,

    /// Logo used for events that don't carry one
    pub default_logo: Option<String>,
    /// Repeat the channel icon inside every programme
    pub programme_icons: bool,
}

impl Config {
    /// Points both output files into `dir`, keeping their canonical names
    #[must_use]
    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        let dir = dir.into();
        self.epg_path = dir.join(EPG_FILE_NAME);
        self.playlist_path = dir.join(PLAYLIST_FILE_NAME);
        self
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            source_url: DEFAULT_SOURCE_URL.to_string(),
            catalog_timeout: Duration::from_secs(40),
            handshake: HandshakeConfig::default(),
            concurrency: 1,
            epg_location: EpgLocation::GitHub {
                owner: "BuddyChewChew".to_string(),
                repo: "via".to_string(),
            },
            epg_path: PathBuf::from(EPG_FILE_NAME),
            playlist_path: PathBuf::from(PLAYLIST_FILE_NAME),
            player_user_agent: DEFAULT_PLAYER_USER_AGENT.to_string(),
            player_referrer: DEFAULT_PLAYER_REFERRER.to_string(),
            default_logo: None,
            programme_icons: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn github_location_points_at_raw_main_branch() {
        let location = EpgLocation::GitHub {
            owner: "someone".to_string(),
            repo: "guides".to_string(),
        };
        assert_eq!(
            location.url(),
            "https://raw.githubusercontent.com/someone/guides/main/epg.xml"
        );
    }

    #[test]
    fn output_dir_keeps_file_names() {
        let config = Config::default().with_output_dir("/srv/out");
        assert_eq!(config.epg_path, PathBuf::from("/srv/out/epg.xml"));
        assert_eq!(config.playlist_path, PathBuf::from("/srv/out/playlist.m3u8"));
    }
}
