use std::path::PathBuf;

use reqwest::StatusCode;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("fetching catalog failed")]
    CatalogFetch(#[source] reqwest::Error),

    #[error("catalog source answered with status {0}")]
    CatalogStatus(StatusCode),

    #[error("catalog is not a valid category list")]
    CatalogParse(#[source] serde_json::Error),

    #[error("encoding XMLTV guide")]
    Encode(#[source] std::io::Error),

    #[error("writing {path:?}")]
    OutputWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

pub type Result<T, E = PipelineError> = std::result::Result<T, E>;
