//! Network (link description) file.

use crate::error::{Error, Result};
use crate::fetch::HttpClient;
use crate::input::Location;
use crate::reader::{DelimitedReader, open_delimited};
use crate::schema::Schema;
use crate::transform::METERS_PER_MILE;
use serde::Deserialize;
use std::collections::HashMap;
use tracing::info;

pub const NETWORK: Schema = Schema {
    name: "network",
    required: &["linkId", "linkLength"],
};

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkLink {
    pub link_id: String,
    /// Meters.
    pub link_length: f64,
    #[serde(default)]
    pub link_free_speed: Option<f64>,
    #[serde(default)]
    pub link_capacity: Option<f64>,
    #[serde(default)]
    pub attribute_orig_type: Option<String>,
}

impl NetworkLink {
    pub fn length_miles(&self) -> f64 {
        self.link_length / METERS_PER_MILE
    }
}

/// Links keyed by id.
#[derive(Debug, Clone, Default)]
pub struct Network {
    links: HashMap<String, NetworkLink>,
}

impl Network {
    #[tracing::instrument(skip(location, client), fields(location = %location))]
    pub fn load<C: HttpClient + ?Sized>(location: &Location, client: &C) -> Result<Self> {
        Self::from_reader(open_delimited(location, client)?)
    }

    pub fn from_reader(mut reader: DelimitedReader) -> Result<Self> {
        let headers = reader.headers()?.clone();
        NETWORK.check(&headers)?;

        let mut links = HashMap::new();
        for (row, record) in reader.records().enumerate() {
            let link: NetworkLink = record?
                .deserialize(Some(&headers))
                .map_err(|e| Error::validation(row, e.to_string()))?;
            if !link.link_length.is_finite() || link.link_length < 0.0 {
                return Err(Error::validation(
                    row,
                    format!("linkLength is out of range ({})", link.link_length),
                ));
            }
            links.insert(link.link_id.clone(), link);
        }

        info!(links = links.len(), "Loaded network");
        Ok(Self { links })
    }

    pub fn from_links(links: impl IntoIterator<Item = NetworkLink>) -> Self {
        Self {
            links: links.into_iter().map(|l| (l.link_id.clone(), l)).collect(),
        }
    }

    pub fn get(&self, link_id: &str) -> Option<&NetworkLink> {
        self.links.get(link_id)
    }

    pub fn len(&self) -> usize {
        self.links.len()
    }

    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }
}
