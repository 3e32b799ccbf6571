//! Loading source images from disk or over HTTP.
//!
//! A [`Source`] is either a local path or an `http(s)` URL. [`fetch`] reads
//! its bytes and derives the base name used for artifact names. Nothing is
//! decoded here; a failed fetch means the pipeline never runs.

use crate::config::FetchConfig;
use crate::naming::{name_from_url, sanitize_filename};
use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum FetchError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("HTTP request failed: {0}")]
    Http(String),
    #[error("HTTP {status} from {url}")]
    Status { url: String, status: u16 },
    #[error("Source is {size} bytes, limit is {limit}")]
    TooLarge { size: u64, limit: u64 },
}

/// Where an image comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Source {
    Path(PathBuf),
    Url(String),
}

impl Source {
    /// Inputs that parse as `http` or `https` URLs are URLs; everything else
    /// (including Windows drive paths like `C:\img.jpg`) is a path.
    pub fn parse(input: &str) -> Self {
        match reqwest::Url::parse(input) {
            Ok(url) if matches!(url.scheme(), "http" | "https") => Source::Url(input.to_string()),
            _ => Source::Path(PathBuf::from(input)),
        }
    }

    /// Sanitized file name used as the base of every artifact name.
    pub fn base_name(&self) -> String {
        match self {
            Source::Path(path) => sanitize_filename(
                &path
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_default(),
            ),
            Source::Url(url) => name_from_url(url),
        }
    }
}

/// Raw bytes of a source image plus its sanitized base name.
#[derive(Debug, Clone)]
pub struct SourceImage {
    pub bytes: Vec<u8>,
    pub base_name: String,
}

/// Read the bytes behind `source`, enforcing `config.max_bytes`.
pub fn fetch(source: &Source, config: &FetchConfig) -> Result<SourceImage, FetchError> {
    let bytes = match source {
        Source::Path(path) => read_file(path, config)?,
        Source::Url(url) => download(url, config)?,
    };
    log::debug!("fetched {} bytes from {:?}", bytes.len(), source);
    Ok(SourceImage {
        bytes,
        base_name: source.base_name(),
    })
}

fn check_size(size: u64, config: &FetchConfig) -> Result<(), FetchError> {
    if size > config.max_bytes {
        return Err(FetchError::TooLarge {
            size,
            limit: config.max_bytes,
        });
    }
    Ok(())
}

fn read_file(path: &Path, config: &FetchConfig) -> Result<Vec<u8>, FetchError> {
    check_size(fs::metadata(path)?.len(), config)?;
    Ok(fs::read(path)?)
}

fn download(url: &str, config: &FetchConfig) -> Result<Vec<u8>, FetchError> {
    let client = reqwest::blocking::Client::builder()
        .timeout(Duration::from_secs(config.timeout_secs))
        .user_agent(config.user_agent.as_str())
        .build()
        .map_err(|e| FetchError::Http(e.to_string()))?;

    log::info!("downloading {url}");
    let response = client
        .get(url)
        .send()
        .map_err(|e| FetchError::Http(e.to_string()))?;

    let status = response.status();
    if !status.is_success() {
        return Err(FetchError::Status {
            url: url.to_string(),
            status: status.as_u16(),
        });
    }

    if let Some(len) = response.content_length() {
        check_size(len, config)?;
    }

    // Content-Length can be absent or wrong; cap the read itself too.
    let mut bytes = Vec::new();
    response
        .take(config.max_bytes + 1)
        .read_to_end(&mut bytes)
        .map_err(|e| FetchError::Http(e.to_string()))?;
    check_size(bytes.len() as u64, config)?;
    Ok(bytes)
}
