//! Per-mode subsets and totals.

use crate::analyzers::types::{ModeEnergy, ModeVmt, YearModeVmt};
use crate::schema::EnhancedPathTraversal;
use std::collections::BTreeMap;

/// Rows whose raw `mode` equals `mode`. No match yields an empty vector.
pub fn mode_events(events: &[EnhancedPathTraversal], mode: &str) -> Vec<EnhancedPathTraversal> {
    events.iter().filter(|e| e.mode == mode).cloned().collect()
}

/// One row per distinct raw `mode`, ascending. Modes whose miles sum to
/// zero still get a row.
pub fn mode_vmt(events: &[EnhancedPathTraversal]) -> Vec<ModeVmt> {
    group_vmt(events, |e| &e.mode)
}

/// Like [`mode_vmt`] but keyed by `mode_extended`, so ride-hail and CAV
/// traffic is reported apart from private cars.
pub fn extended_mode_vmt(events: &[EnhancedPathTraversal]) -> Vec<ModeVmt> {
    group_vmt(events, |e| &e.mode_extended)
}

fn group_vmt<F>(events: &[EnhancedPathTraversal], key: F) -> Vec<ModeVmt>
where
    F: Fn(&EnhancedPathTraversal) -> &String,
{
    let mut totals: BTreeMap<&str, (f64, f64)> = BTreeMap::new();
    for event in events {
        let entry = totals.entry(key(event).as_str()).or_default();
        entry.0 += event.vehicle_miles;
        entry.1 += event.passenger_miles;
    }

    totals
        .into_iter()
        .map(|(mode, (vehicle_miles, passenger_miles))| ModeVmt {
            mode: mode.to_string(),
            vehicle_miles,
            passenger_miles,
        })
        .collect()
}

/// Energy use per `mode_extended`, ascending.
pub fn mode_energy(events: &[EnhancedPathTraversal]) -> Vec<ModeEnergy> {
    let mut totals: BTreeMap<&str, (f64, f64)> = BTreeMap::new();
    for event in events {
        let entry = totals.entry(event.mode_extended.as_str()).or_default();
        entry.0 += event.total_energy_joules;
        entry.1 += event.gallons_gasoline;
    }

    totals
        .into_iter()
        .map(|(mode, (total_energy_joules, gallons_gasoline))| ModeEnergy {
            mode: mode.to_string(),
            total_energy_joules,
            gallons_gasoline,
        })
        .collect()
}

/// Stacks per-run mode VMT tables keyed by `(year, iteration)`, keeping only
/// the last iteration of each year.
pub fn mode_vmt_by_year(runs: &BTreeMap<(i32, i32), Vec<ModeVmt>>) -> Vec<YearModeVmt> {
    let mut last_per_year: BTreeMap<i32, &Vec<ModeVmt>> = BTreeMap::new();
    // keys iterate in (year, iteration) order, so later iterations overwrite
    for (&(year, _), rows) in runs {
        last_per_year.insert(year, rows);
    }

    last_per_year
        .into_iter()
        .flat_map(|(year, rows)| {
            rows.iter().map(move |r| YearModeVmt {
                year,
                mode: r.mode.clone(),
                vehicle_miles: r.vehicle_miles,
                passenger_miles: r.passenger_miles,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transform::fix_path_traversals;
    use crate::transform::tests::pt;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_mode_vmt_fixture() {
        let events = fix_path_traversals(&[
            pt(0, "car", 10.0, 2.0),
            pt(1, "car", 5.0, 1.0),
            pt(2, "walk", 0.0, 0.0),
        ])
        .unwrap();

        let vmt = mode_vmt(&events);
        assert_eq!(vmt.len(), 2);
        assert_eq!(vmt[0].mode, "car");
        assert!(close(vmt[0].vehicle_miles, 15.0));
        assert!(close(vmt[0].passenger_miles, 25.0));
        // zero-distance modes still appear
        assert_eq!(vmt[1].mode, "walk");
        assert_eq!(vmt[1].vehicle_miles, 0.0);
    }

    #[test]
    fn test_mode_vmt_one_row_per_mode() {
        let events = fix_path_traversals(&[
            pt(0, "bus", 1.0, 3.0),
            pt(1, "car", 1.0, 0.0),
            pt(2, "bus", 2.0, 1.0),
            pt(3, "bike", 1.0, 0.0),
        ])
        .unwrap();
        let modes: Vec<String> = mode_vmt(&events).into_iter().map(|r| r.mode).collect();
        assert_eq!(modes, ["bike", "bus", "car"]);
    }

    #[test]
    fn test_extended_mode_vmt_separates_ride_hail() {
        let mut rh = pt(0, "car", 2.0, 1.0);
        rh.vehicle = "rideHailVehicle-1".to_string();
        let events = fix_path_traversals(&[rh, pt(1, "car", 3.0, 0.0)]).unwrap();

        assert_eq!(mode_vmt(&events).len(), 1);
        let extended = extended_mode_vmt(&events);
        let modes: Vec<&str> = extended.iter().map(|r| r.mode.as_str()).collect();
        assert_eq!(modes, ["car", "car_RideHail"]);
        assert!(close(extended[1].vehicle_miles, 2.0));
    }

    #[test]
    fn test_mode_events_filters() {
        let events = fix_path_traversals(&[
            pt(0, "car", 1.0, 0.0),
            pt(1, "bus", 1.0, 0.0),
            pt(2, "car", 1.0, 0.0),
        ])
        .unwrap();
        let cars = mode_events(&events, "car");
        assert_eq!(cars.len(), 2);
        assert_eq!(cars[1].event_id, 2);
    }

    #[test]
    fn test_mode_events_unknown_mode_is_empty() {
        let events = fix_path_traversals(&[pt(0, "car", 1.0, 0.0)]).unwrap();
        assert!(mode_events(&events, "ferry").is_empty());
    }

    #[test]
    fn test_mode_energy() {
        let mut a = pt(0, "car", 1.0, 0.0);
        a.primary_fuel = Some(100.0);
        let mut b = pt(1, "car", 1.0, 0.0);
        b.primary_fuel = Some(50.0);
        b.secondary_fuel = Some(25.0);
        let events = fix_path_traversals(&[a, b]).unwrap();

        let energy = mode_energy(&events);
        assert_eq!(energy.len(), 1);
        assert!(close(energy[0].total_energy_joules, 175.0));
        assert_eq!(energy[0].gallons_gasoline, 0.0);
    }

    #[test]
    fn test_mode_vmt_by_year_keeps_last_iteration() {
        let row = |mode: &str, vmt: f64| ModeVmt {
            mode: mode.to_string(),
            vehicle_miles: vmt,
            passenger_miles: 0.0,
        };
        let mut runs = BTreeMap::new();
        runs.insert((2010, -1), vec![row("car", 1.0)]);
        runs.insert((2010, 2), vec![row("car", 3.0)]);
        runs.insert((2010, 1), vec![row("car", 2.0)]);
        runs.insert((2020, 0), vec![row("bus", 4.0), row("car", 5.0)]);

        let stacked = mode_vmt_by_year(&runs);
        assert_eq!(stacked.len(), 3);
        assert_eq!((stacked[0].year, stacked[0].vehicle_miles), (2010, 3.0));
        assert_eq!((stacked[1].year, stacked[1].mode.as_str()), (2020, "bus"));
        assert_eq!(stacked[2].vehicle_miles, 5.0);
    }
}
