//! Typed schema of path-traversal rows.
//!
//! Source columns use the simulator's camelCase names. Enhanced rows are
//! written with snake_case names and carry the derived columns after the
//! source ones, in the order of [`DERIVED_COLUMNS`].

use crate::error::{Error, Result};
use crate::events::EventTable;
use csv::StringRecord;
use serde::{Deserialize, Serialize};

/// Column requirements of a table loaded from the simulator.
#[derive(Debug, Clone, Copy)]
pub struct Schema {
    pub name: &'static str,
    pub required: &'static [&'static str],
}

impl Schema {
    /// Fails on the first required column absent from `headers`.
    pub fn check(&self, headers: &StringRecord) -> Result<()> {
        for column in self.required {
            if !headers.iter().any(|h| h == *column) {
                return Err(Error::missing_column(self.name, column));
            }
        }
        Ok(())
    }
}

pub const PATH_TRAVERSAL: Schema = Schema {
    name: "PathTraversal",
    required: &[
        "vehicle",
        "mode",
        "length",
        "numPassengers",
        "capacity",
        "links",
        "departureTime",
        "arrivalTime",
    ],
};

/// Derived columns appended by [`crate::transform::fix_path_traversals`].
pub const DERIVED_COLUMNS: [&str; 10] = [
    "duration",
    "mode_extended",
    "is_ride_hail",
    "is_cav",
    "occupancy",
    "corrected_occupancy",
    "vehicle_miles",
    "passenger_miles",
    "total_energy_joules",
    "gallons_gasoline",
];

/// One raw `PathTraversal` event.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PathTraversalEvent {
    /// Row position in the events file.
    #[serde(skip)]
    pub event_id: u64,
    pub vehicle: String,
    #[serde(default)]
    pub vehicle_type: Option<String>,
    #[serde(default)]
    pub driver: Option<String>,
    pub mode: String,
    /// Meters.
    pub length: f64,
    pub num_passengers: f64,
    pub capacity: f64,
    /// Comma-separated link ids.
    pub links: String,
    /// Seconds after midnight.
    pub departure_time: f64,
    pub arrival_time: f64,
    /// Joules.
    #[serde(default)]
    pub primary_fuel: Option<f64>,
    #[serde(default)]
    pub primary_fuel_type: Option<String>,
    #[serde(default)]
    pub secondary_fuel: Option<f64>,
    #[serde(default)]
    pub secondary_fuel_type: Option<String>,
}

impl PathTraversalEvent {
    /// Checks the schema of `table`, then types every row.
    ///
    /// A value that does not parse is reported as [`Error::Validation`]
    /// with the row's position in the events file.
    pub fn from_table(table: &EventTable) -> Result<Vec<Self>> {
        PATH_TRAVERSAL.check(table.headers())?;

        table
            .rows()
            .iter()
            .zip(table.row_ids())
            .map(|(row, &id)| {
                let mut event: PathTraversalEvent = row
                    .deserialize(Some(table.headers()))
                    .map_err(|e| Error::validation(id as usize, e.to_string()))?;
                event.event_id = id;
                Ok(event)
            })
            .collect()
    }

    pub fn link_ids(&self) -> impl Iterator<Item = &str> {
        split_links(&self.links)
    }
}

/// A path traversal with its derived columns.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnhancedPathTraversal {
    pub event_id: u64,
    pub vehicle: String,
    pub vehicle_type: Option<String>,
    pub driver: Option<String>,
    pub mode: String,
    pub length: f64,
    pub num_passengers: f64,
    pub capacity: f64,
    pub links: String,
    pub departure_time: f64,
    pub arrival_time: f64,
    pub primary_fuel: Option<f64>,
    pub primary_fuel_type: Option<String>,
    pub secondary_fuel: Option<f64>,
    pub secondary_fuel_type: Option<String>,

    pub duration: f64,
    pub mode_extended: String,
    pub is_ride_hail: bool,
    pub is_cav: bool,
    /// Persons aboard, counting the driver of a private car.
    pub occupancy: f64,
    /// Passengers over capacity; may exceed 1.0.
    pub corrected_occupancy: f64,
    pub vehicle_miles: f64,
    pub passenger_miles: f64,
    pub total_energy_joules: f64,
    pub gallons_gasoline: f64,
}

impl EnhancedPathTraversal {
    pub fn link_ids(&self) -> impl Iterator<Item = &str> {
        split_links(&self.links)
    }

    /// Hour of day bucket of the departure.
    pub fn hour(&self) -> u32 {
        (self.departure_time / 3600.0).floor().max(0.0) as u32
    }
}

fn split_links(links: &str) -> impl Iterator<Item = &str> {
    links.split(',').map(str::trim).filter(|l| !l.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::{EventType, collect_from};
    use crate::reader::reader_from;
    use std::io::Cursor;

    fn table(data: &str) -> EventTable {
        let reader = reader_from(Cursor::new(data.as_bytes().to_vec()), b',').unwrap();
        collect_from(reader, &[EventType::PathTraversal])
            .unwrap()
            .remove(&EventType::PathTraversal)
            .unwrap()
    }

    #[test]
    fn test_from_table_types_rows() {
        let t = table(
            "time,type,vehicle,vehicleType,mode,length,numPassengers,capacity,links,departureTime,arrivalTime,primaryFuel,primaryFuelType\n\
             5,ModeChoice,,,,,,,,,,,\n\
             100,PathTraversal,bus-1,BUS-DEFAULT,bus,1000.5,12,50,\"1,2,3\",100,160,2.5e8,diesel\n",
        );
        let events = PathTraversalEvent::from_table(&t).unwrap();
        assert_eq!(events.len(), 1);

        let e = &events[0];
        assert_eq!(e.event_id, 1);
        assert_eq!(e.vehicle, "bus-1");
        assert_eq!(e.vehicle_type.as_deref(), Some("BUS-DEFAULT"));
        assert_eq!(e.driver, None);
        assert_eq!(e.length, 1000.5);
        assert_eq!(e.num_passengers, 12.0);
        assert_eq!(e.primary_fuel, Some(2.5e8));
        assert_eq!(e.secondary_fuel, None);
        assert_eq!(e.link_ids().collect::<Vec<_>>(), ["1", "2", "3"]);
    }

    #[test]
    fn test_from_table_missing_column() {
        let t = table(
            "type,vehicle,mode,length,numPassengers,links,departureTime,arrivalTime\n\
             PathTraversal,car-1,car,10,0,1,0,5\n",
        );
        match PathTraversalEvent::from_table(&t).unwrap_err() {
            Error::MissingColumn { table, column } => {
                assert_eq!(table, "PathTraversal");
                assert_eq!(column, "capacity");
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn test_from_table_non_numeric_is_validation_error() {
        let t = table(
            "type,vehicle,mode,length,numPassengers,capacity,links,departureTime,arrivalTime\n\
             PathTraversal,car-1,car,10,0,4,1,0,5\n\
             PathTraversal,car-2,car,ten,0,4,1,0,5\n",
        );
        match PathTraversalEvent::from_table(&t).unwrap_err() {
            Error::Validation { row, .. } => assert_eq!(row, 1),
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn test_link_ids_skip_blanks() {
        let t = table(
            "type,vehicle,mode,length,numPassengers,capacity,links,departureTime,arrivalTime\n\
             PathTraversal,walk-1,walk,10,0,1,,0,5\n",
        );
        let events = PathTraversalEvent::from_table(&t).unwrap();
        assert_eq!(events[0].link_ids().count(), 0);
    }

    #[test]
    fn test_schema_check_accepts_extra_columns() {
        let headers = StringRecord::from(vec![
            "time", "type", "vehicle", "mode", "length", "numPassengers", "capacity", "links",
            "departureTime", "arrivalTime", "riders",
        ]);
        assert!(PATH_TRAVERSAL.check(&headers).is_ok());
    }

    #[test]
    fn test_enhanced_header_ends_with_derived_columns() {
        use crate::transform::fix_path_traversals;
        use crate::transform::tests::pt;

        let rows = fix_path_traversals(&[pt(0, "car", 1.0, 1.0)]).unwrap();
        let mut writer = csv::Writer::from_writer(Vec::new());
        writer.serialize(&rows[0]).unwrap();
        let bytes = writer.into_inner().unwrap();
        let text = String::from_utf8(bytes).unwrap();

        let header: Vec<&str> = text.lines().next().unwrap().split(',').collect();
        let tail = &header[header.len() - DERIVED_COLUMNS.len()..];
        assert_eq!(tail, DERIVED_COLUMNS);
        assert_eq!(header[header.len() - DERIVED_COLUMNS.len() - 1], "secondary_fuel_type");
    }
}
