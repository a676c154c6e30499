//! Column derivation for path-traversal events.

use crate::error::{Error, Result};
use crate::schema::{EnhancedPathTraversal, PathTraversalEvent};
use tracing::{debug, info};

pub const METERS_PER_MILE: f64 = 1609.34;
/// Gallons of gasoline per joule of fuel energy.
pub const GALLONS_GASOLINE_PER_JOULE: f64 = 8.3141841e-9;

/// Returns a new table with the derived columns appended.
///
/// Every row is validated before any output is built, so either all rows
/// are returned (same count, same order) or the first offending row is
/// reported as [`Error::Validation`]. The input is never modified.
///
/// `corrected_occupancy` is `numPassengers / max(capacity, 1)` and is not
/// clamped: rows carrying more passengers than seats report values above 1.
pub fn fix_path_traversals(events: &[PathTraversalEvent]) -> Result<Vec<EnhancedPathTraversal>> {
    for event in events {
        validate(event)?;
    }

    let enhanced: Vec<EnhancedPathTraversal> = events.iter().map(enhance).collect();

    let over_capacity = enhanced
        .iter()
        .filter(|e| e.corrected_occupancy > 1.0)
        .count();
    if over_capacity > 0 {
        debug!(over_capacity, "Traversals carrying more passengers than capacity");
    }
    info!(rows = enhanced.len(), "Derived path traversal columns");

    Ok(enhanced)
}

fn validate(event: &PathTraversalEvent) -> Result<()> {
    let row = event.event_id as usize;
    let checks = [
        ("length", event.length),
        ("numPassengers", event.num_passengers),
        ("capacity", event.capacity),
        ("departureTime", event.departure_time),
        ("arrivalTime", event.arrival_time),
    ];
    for (column, value) in checks {
        if !value.is_finite() {
            return Err(Error::validation(row, format!("{column} is not finite ({value})")));
        }
        if value < 0.0 {
            return Err(Error::validation(row, format!("{column} is negative ({value})")));
        }
    }
    if event.arrival_time < event.departure_time {
        return Err(Error::validation(
            row,
            format!(
                "arrivalTime {} precedes departureTime {}",
                event.arrival_time, event.departure_time
            ),
        ));
    }
    for (column, value) in [
        ("primaryFuel", event.primary_fuel),
        ("secondaryFuel", event.secondary_fuel),
    ] {
        if let Some(v) = value {
            if !v.is_finite() || v < 0.0 {
                return Err(Error::validation(row, format!("{column} is out of range ({v})")));
            }
        }
    }
    Ok(())
}

fn enhance(event: &PathTraversalEvent) -> EnhancedPathTraversal {
    let is_ride_hail = event.vehicle.contains("rideHail");
    let is_cav = event
        .vehicle_type
        .as_deref()
        .is_some_and(|t| t.contains("L5"));

    let mut mode_extended = event.mode.clone();
    if is_ride_hail {
        mode_extended.push_str("_RideHail");
    }
    if is_cav {
        mode_extended.push_str("_CAV");
    }

    let occupancy = match mode_extended.as_str() {
        "car" => event.num_passengers + 1.0,
        "walk" | "bike" => 1.0,
        _ => event.num_passengers,
    };

    let vehicle_miles = event.length / METERS_PER_MILE;
    let primary = event.primary_fuel.unwrap_or(0.0);
    let secondary = event.secondary_fuel.unwrap_or(0.0);

    let mut gallons_gasoline = 0.0;
    if is_gasoline(&event.primary_fuel_type) {
        gallons_gasoline += primary * GALLONS_GASOLINE_PER_JOULE;
    }
    if is_gasoline(&event.secondary_fuel_type) {
        gallons_gasoline += secondary * GALLONS_GASOLINE_PER_JOULE;
    }

    EnhancedPathTraversal {
        event_id: event.event_id,
        vehicle: event.vehicle.clone(),
        vehicle_type: event.vehicle_type.clone(),
        driver: event.driver.clone(),
        mode: event.mode.clone(),
        length: event.length,
        num_passengers: event.num_passengers,
        capacity: event.capacity,
        links: event.links.clone(),
        departure_time: event.departure_time,
        arrival_time: event.arrival_time,
        primary_fuel: event.primary_fuel,
        primary_fuel_type: event.primary_fuel_type.clone(),
        secondary_fuel: event.secondary_fuel,
        secondary_fuel_type: event.secondary_fuel_type.clone(),

        duration: event.arrival_time - event.departure_time,
        mode_extended,
        is_ride_hail,
        is_cav,
        occupancy,
        corrected_occupancy: event.num_passengers / event.capacity.max(1.0),
        vehicle_miles,
        passenger_miles: vehicle_miles * event.num_passengers,
        total_energy_joules: primary + secondary,
        gallons_gasoline,
    }
}

/// BEAM writes `Gasoline`; any casing counts.
fn is_gasoline(fuel_type: &Option<String>) -> bool {
    fuel_type
        .as_deref()
        .is_some_and(|t| t.trim().eq_ignore_ascii_case("gasoline"))
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// A car traversal of `miles` carrying `passengers`, with 4 seats.
    pub(crate) fn pt(id: u64, mode: &str, miles: f64, passengers: f64) -> PathTraversalEvent {
        PathTraversalEvent {
            event_id: id,
            vehicle: format!("{mode}-{id}"),
            vehicle_type: None,
            driver: None,
            mode: mode.to_string(),
            length: miles * METERS_PER_MILE,
            num_passengers: passengers,
            capacity: 4.0,
            links: "1,2".to_string(),
            departure_time: 3600.0 * id as f64,
            arrival_time: 3600.0 * id as f64 + 600.0,
            primary_fuel: None,
            primary_fuel_type: None,
            secondary_fuel: None,
            secondary_fuel_type: None,
        }
    }

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_preserves_row_count_and_order() {
        let events = vec![pt(0, "car", 1.0, 0.0), pt(1, "bus", 2.0, 10.0), pt(2, "walk", 0.5, 0.0)];
        let out = fix_path_traversals(&events).unwrap();
        assert_eq!(out.len(), 3);
        let ids: Vec<u64> = out.iter().map(|e| e.event_id).collect();
        assert_eq!(ids, [0, 1, 2]);
        assert_eq!(out[1].mode, "bus");
    }

    #[test]
    fn test_input_is_left_unchanged() {
        let events = vec![pt(0, "car", 3.0, 1.0)];
        let before = events.clone();
        let _ = fix_path_traversals(&events).unwrap();
        assert_eq!(events, before);
    }

    #[test]
    fn test_passenger_miles_is_vehicle_miles_times_passengers() {
        let events = vec![pt(0, "car", 10.0, 2.0), pt(1, "bus", 3.3, 17.0), pt(2, "car", 5.0, 0.0)];
        for e in fix_path_traversals(&events).unwrap() {
            assert!(close(e.passenger_miles, e.vehicle_miles * e.num_passengers));
        }
    }

    #[test]
    fn test_vehicle_miles_from_meters() {
        let out = fix_path_traversals(&[pt(0, "car", 10.0, 2.0)]).unwrap();
        assert!(close(out[0].vehicle_miles, 10.0));
        assert!(close(out[0].passenger_miles, 20.0));
        assert!(close(out[0].duration, 600.0));
    }

    #[test]
    fn test_zero_capacity_uses_guard() {
        let mut event = pt(0, "bike", 1.0, 0.0);
        event.capacity = 0.0;
        let mut crowded = pt(1, "car", 1.0, 3.0);
        crowded.capacity = 0.0;

        let out = fix_path_traversals(&[event, crowded]).unwrap();
        assert_eq!(out[0].corrected_occupancy, 0.0);
        assert_eq!(out[1].corrected_occupancy, 3.0);
    }

    #[test]
    fn test_over_capacity_is_not_clamped() {
        let mut event = pt(0, "bus", 1.0, 60.0);
        event.capacity = 40.0;
        let out = fix_path_traversals(&[event]).unwrap();
        assert!(close(out[0].corrected_occupancy, 1.5));
    }

    #[test]
    fn test_mode_extended_and_occupancy() {
        let mut rh = pt(0, "car", 1.0, 1.0);
        rh.vehicle = "rideHailVehicle-42".to_string();
        let mut cav = pt(1, "car", 1.0, 0.0);
        cav.vehicle_type = Some("Car-L5".to_string());
        let private = pt(2, "car", 1.0, 2.0);
        let walk = pt(3, "walk", 1.0, 0.0);

        let out = fix_path_traversals(&[rh, cav, private, walk]).unwrap();
        assert_eq!(out[0].mode_extended, "car_RideHail");
        assert!(out[0].is_ride_hail);
        assert_eq!(out[0].occupancy, 1.0);
        assert_eq!(out[1].mode_extended, "car_CAV");
        assert!(out[1].is_cav);
        assert_eq!(out[2].mode_extended, "car");
        assert_eq!(out[2].occupancy, 3.0);
        assert_eq!(out[3].occupancy, 1.0);
    }

    #[test]
    fn test_energy_columns() {
        let mut e = pt(0, "car", 1.0, 0.0);
        e.primary_fuel = Some(1.0e8);
        e.primary_fuel_type = Some("gasoline".to_string());
        e.secondary_fuel = Some(5.0e7);
        e.secondary_fuel_type = Some("electricity".to_string());

        let out = fix_path_traversals(&[e]).unwrap();
        assert!(close(out[0].total_energy_joules, 1.5e8));
        assert!(close(out[0].gallons_gasoline, 1.0e8 * GALLONS_GASOLINE_PER_JOULE));
    }

    #[test]
    fn test_gasoline_fuel_type_is_case_insensitive() {
        let mut beam = pt(0, "car", 1.0, 0.0);
        beam.primary_fuel = Some(2.0e6);
        beam.primary_fuel_type = Some("Gasoline".to_string());
        let mut upper = beam.clone();
        upper.primary_fuel_type = Some("GASOLINE".to_string());
        let mut diesel = beam.clone();
        diesel.primary_fuel_type = Some("Diesel".to_string());

        let out = fix_path_traversals(&[beam, upper, diesel]).unwrap();
        assert!(close(out[0].gallons_gasoline, 2.0e6 * GALLONS_GASOLINE_PER_JOULE));
        assert!(out[0].gallons_gasoline > 0.0);
        assert_eq!(out[0].gallons_gasoline, out[1].gallons_gasoline);
        assert_eq!(out[2].gallons_gasoline, 0.0);
    }

    #[test]
    fn test_negative_length_is_rejected() {
        let mut bad = pt(1, "car", 1.0, 0.0);
        bad.length = -5.0;
        let err = fix_path_traversals(&[pt(0, "car", 1.0, 0.0), bad]).unwrap_err();
        match err {
            Error::Validation { row, message } => {
                assert_eq!(row, 1);
                assert!(message.contains("length"));
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn test_negative_capacity_and_nan_are_rejected() {
        let mut neg = pt(0, "bus", 1.0, 0.0);
        neg.capacity = -1.0;
        assert!(matches!(fix_path_traversals(&[neg]), Err(Error::Validation { .. })));

        let mut nan = pt(0, "bus", 1.0, 0.0);
        nan.num_passengers = f64::NAN;
        assert!(matches!(fix_path_traversals(&[nan]), Err(Error::Validation { .. })));
    }

    #[test]
    fn test_arrival_before_departure_is_rejected() {
        let mut e = pt(0, "car", 1.0, 0.0);
        e.arrival_time = e.departure_time - 1.0;
        assert!(matches!(fix_path_traversals(&[e]), Err(Error::Validation { .. })));
    }

    #[test]
    fn test_empty_input() {
        assert!(fix_path_traversals(&[]).unwrap().is_empty());
    }
}
