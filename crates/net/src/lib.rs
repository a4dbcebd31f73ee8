#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Network operations for llvmpkg
//!
//! This crate handles the HTTP side of fetching component archives:
//! client construction, URL validation and streaming a response body to disk.

mod client;
mod download;

pub use client::{NetClient, NetConfig};
pub use download::{Download, DownloadResult};

use llvmpkg_errors::{Error, NetworkError};
use url::Url;

/// Parse and validate a URL
///
/// # Errors
///
/// Returns an error if the URL string is malformed or invalid according to RFC 3986.
pub fn parse_url(url: &str) -> Result<Url, Error> {
    Url::parse(url).map_err(|e| NetworkError::InvalidUrl(format!("{url}: {e}")).into())
}

/// Final path segment of a URL, used to name the downloaded file
///
/// # Errors
///
/// Returns `NetworkError::InvalidUrl` when the URL has no file name.
pub fn file_name(url: &Url) -> Result<String, Error> {
    url.path_segments()
        .and_then(|mut segments| segments.next_back())
        .filter(|name| !name.is_empty())
        .map(str::to_string)
        .ok_or_else(|| NetworkError::InvalidUrl(format!("{url}: no file name")).into())
}
