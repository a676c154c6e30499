use super::client::HttpClient;
use crate::error::Result;
use reqwest::StatusCode;
use reqwest::blocking::Client;
use std::time::Duration;

pub struct BasicClient(Client);

impl BasicClient {
    pub fn new() -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(300))
            .connect_timeout(Duration::from_secs(10))
            .build()?;
        Ok(Self(client))
    }
}

impl HttpClient for BasicClient {
    fn get_bytes(&self, url: &str) -> Result<Option<Vec<u8>>> {
        let resp = self.0.get(url).send()?;
        if resp.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let resp = resp.error_for_status()?;
        Ok(Some(resp.bytes()?.to_vec()))
    }

    fn exists(&self, url: &str) -> Result<bool> {
        let resp = self.0.head(url).send()?;
        if resp.status() == StatusCode::NOT_FOUND {
            return Ok(false);
        }
        resp.error_for_status()?;
        Ok(true)
    }
}
