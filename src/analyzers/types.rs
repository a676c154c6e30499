//! Row types of the aggregated output tables.

use serde::Serialize;

/// Traversal statistics for one network link.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LinkStats {
    pub link_id: String,
    pub traversals: u64,
    pub vehicle_miles: f64,
    pub passenger_miles: f64,
    pub passengers: f64,
    pub mean_occupancy: f64,
    pub occupancy_stddev: f64,
}

/// [`LinkStats`] for one link during one hour of the day.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HourlyLinkStats {
    pub link_id: String,
    pub hour: u32,
    pub traversals: u64,
    pub vehicle_miles: f64,
    pub passenger_miles: f64,
    pub passengers: f64,
    pub mean_occupancy: f64,
    pub occupancy_stddev: f64,
}

/// Vehicle and passenger miles summed over one mode.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModeVmt {
    pub mode: String,
    pub vehicle_miles: f64,
    pub passenger_miles: f64,
}

/// Energy summed over one extended mode.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModeEnergy {
    pub mode: String,
    pub total_energy_joules: f64,
    pub gallons_gasoline: f64,
}

/// [`ModeVmt`] tagged with the simulated year it came from.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct YearModeVmt {
    pub year: i32,
    pub mode: String,
    pub vehicle_miles: f64,
    pub passenger_miles: f64,
}

/// [`ModeVmt`] tagged with the scenario of a batch.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScenarioModeVmt {
    pub scenario: String,
    pub mode: String,
    pub vehicle_miles: f64,
    pub passenger_miles: f64,
}
