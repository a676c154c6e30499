use crate::error::Result;

/// Blocking HTTP operations needed to read a remote run directory.
pub trait HttpClient {
    /// Returns the body at `url`, or `None` when the server answers 404.
    fn get_bytes(&self, url: &str) -> Result<Option<Vec<u8>>>;

    /// Checks existence with a `HEAD` request.
    fn exists(&self, url: &str) -> Result<bool>;
}
