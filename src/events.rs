//! Events-file scanning.
//!
//! A BEAM events file interleaves every event type in one wide table with a
//! `type` column. [`EventsFile::collect`] makes a single pass over it and
//! splits out the requested types.

use crate::error::{Error, Result};
use crate::fetch::HttpClient;
use crate::input::Location;
use crate::reader::{DelimitedReader, open_delimited};
use csv::StringRecord;
use std::collections::HashMap;
use std::fmt;
use tracing::info;

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EventType {
    PathTraversal,
    PersonEntersVehicle,
    ModeChoice,
    Other(String),
}

impl EventType {
    pub fn as_str(&self) -> &str {
        match self {
            EventType::PathTraversal => "PathTraversal",
            EventType::PersonEntersVehicle => "PersonEntersVehicle",
            EventType::ModeChoice => "ModeChoice",
            EventType::Other(name) => name,
        }
    }
}

impl From<&str> for EventType {
    fn from(name: &str) -> Self {
        match name {
            "PathTraversal" => EventType::PathTraversal,
            "PersonEntersVehicle" => EventType::PersonEntersVehicle,
            "ModeChoice" => EventType::ModeChoice,
            other => EventType::Other(other.to_string()),
        }
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Rows of a single event type, with the full column set of the events file.
#[derive(Debug, Clone)]
pub struct EventTable {
    event_type: EventType,
    headers: StringRecord,
    rows: Vec<StringRecord>,
    /// Zero-based position of each row in the source events file.
    row_ids: Vec<u64>,
}

impl EventTable {
    pub fn new(event_type: EventType, headers: StringRecord) -> Self {
        Self {
            event_type,
            headers,
            rows: Vec::new(),
            row_ids: Vec::new(),
        }
    }

    pub fn push(&mut self, row_id: u64, row: StringRecord) {
        self.row_ids.push(row_id);
        self.rows.push(row);
    }

    pub fn event_type(&self) -> &EventType {
        &self.event_type
    }

    pub fn headers(&self) -> &StringRecord {
        &self.headers
    }

    pub fn rows(&self) -> &[StringRecord] {
        &self.rows
    }

    pub fn row_ids(&self) -> &[u64] {
        &self.row_ids
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    pub fn get(&self, row: usize, column: &str) -> Option<&str> {
        let idx = self.column(column)?;
        self.rows.get(row)?.get(idx)
    }

    /// Removes columns that are empty in every row. An empty table keeps
    /// its headers untouched.
    pub fn without_empty_columns(self) -> Self {
        if self.rows.is_empty() {
            return self;
        }

        let keep: Vec<usize> = (0..self.headers.len())
            .filter(|&i| {
                self.rows
                    .iter()
                    .any(|r| r.get(i).is_some_and(|v| !v.trim().is_empty()))
            })
            .collect();

        if keep.len() == self.headers.len() {
            return self;
        }

        let project = |r: &StringRecord| -> StringRecord {
            keep.iter().map(|&i| r.get(i).unwrap_or("")).collect()
        };

        Self {
            headers: project(&self.headers),
            rows: self.rows.iter().map(project).collect(),
            event_type: self.event_type,
            row_ids: self.row_ids,
        }
    }
}

/// The events file of one run iteration.
#[derive(Debug, Clone)]
pub struct EventsFile {
    location: Location,
}

impl EventsFile {
    pub fn new(location: Location) -> Self {
        Self { location }
    }

    pub fn location(&self) -> &Location {
        &self.location
    }

    /// Reads the file once and returns a table per requested type. Types
    /// with no matching rows map to an empty table.
    #[tracing::instrument(skip(self, client), fields(location = %self.location))]
    pub fn collect<C: HttpClient + ?Sized>(
        &self,
        types: &[EventType],
        client: &C,
    ) -> Result<HashMap<EventType, EventTable>> {
        let reader = open_delimited(&self.location, client)?;
        collect_from(reader, types)
    }
}

/// Splits an already-open events table by its `type` column.
pub fn collect_from(
    mut reader: DelimitedReader,
    types: &[EventType],
) -> Result<HashMap<EventType, EventTable>> {
    let headers = reader.headers()?.clone();
    let type_idx = headers
        .iter()
        .position(|h| h == "type")
        .ok_or_else(|| Error::missing_column("events", "type"))?;

    let mut tables: HashMap<EventType, EventTable> = types
        .iter()
        .map(|t| (t.clone(), EventTable::new(t.clone(), headers.clone())))
        .collect();

    let mut scanned = 0u64;
    for (row_id, record) in reader.records().enumerate() {
        let record = record?;
        scanned += 1;
        let Some(kind) = record.get(type_idx) else {
            continue;
        };
        if let Some(table) = tables.get_mut(&EventType::from(kind)) {
            table.push(row_id as u64, record);
        }
    }

    for (t, table) in &tables {
        info!(event_type = %t, rows = table.len(), "Extracted events");
    }
    info!(scanned, "Finished scanning events file");

    Ok(tables)
}
