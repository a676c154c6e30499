//! HTTP access for runs whose outputs live behind a URL (e.g. a bucket
//! served over `https://`).

mod basic;
mod client;

pub use basic::BasicClient;
pub use client::HttpClient;

use crate::error::{Error, Result};
use tracing::debug;

/// Downloads the full body at `url`, mapping a 404 to [`Error::MissingFile`].
pub fn fetch_bytes<C: HttpClient + ?Sized>(client: &C, url: &str) -> Result<Vec<u8>> {
    debug!(url, "Fetching remote file");
    client
        .get_bytes(url)?
        .ok_or_else(|| Error::missing_file(url))
}

/// Stand-in client for locations that never leave the local filesystem.
///
/// Any attempt to reach a URL through it is a configuration error.
pub struct LocalOnly;

impl HttpClient for LocalOnly {
    fn get_bytes(&self, url: &str) -> Result<Option<Vec<u8>>> {
        Err(Error::Config(format!("no HTTP client configured for {url}")))
    }

    fn exists(&self, url: &str) -> Result<bool> {
        Err(Error::Config(format!("no HTTP client configured for {url}")))
    }
}
