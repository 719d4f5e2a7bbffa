use std::{io, path::Path};

use reqwest::header::{HeaderMap, HeaderValue};

/// Builds the one HTTP client shared by the catalog fetch and every handshake.
///
/// Certificate verification is off: the catalog and handshake hosts routinely serve
/// broken or self-signed certificates.
///
/// # Panics
/// Should never panic, the header value is ASCII and the TLS backend is compiled in.
#[must_use]
pub fn init_http_client() -> reqwest::Client {
    let mut headers = HeaderMap::new();
    headers.insert(
        "User-Agent",
        HeaderValue::from_str(&format!(
            "{}/{} (+{})",
            env!("CARGO_PKG_NAME"),
            env!("CARGO_PKG_VERSION"),
            env!("CARGO_PKG_REPOSITORY")
        ))
        .unwrap(),
    );

    reqwest::Client::builder()
        .default_headers(headers)
        .danger_accept_invalid_certs(true)
        .build()
        .expect("Unable to build HTTP client")
}

/// Replaces `path` with `contents` without ever exposing a half-written file
///
/// # Errors
/// Errors when the temporary file cannot be written or renamed into place
pub async fn write_atomic(path: &Path, contents: &str) -> io::Result<()> {
    let mut temp_name = path.file_name().unwrap_or_default().to_os_string();
    temp_name.push(".tmp");
    let temp_path = path.with_file_name(temp_name);

    tokio::fs::write(&temp_path, contents).await?;
    if let Err(e) = tokio::fs::rename(&temp_path, path).await {
        tokio::fs::remove_file(&temp_path).await.ok();
        return Err(e);
    }

    Ok(())
}
