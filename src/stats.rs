use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;

use crate::analyzers::utility::ratio;
use crate::schema::EnhancedPathTraversal;

/// Headline numbers for one analyzed run.
#[derive(Debug, Default, Serialize)]
pub struct RunSummary {
    pub generated_at: DateTime<Utc>,
    pub root: String,
    pub iteration: u32,

    // events collected per type
    pub event_counts: BTreeMap<String, usize>,

    // path traversal totals
    pub path_traversals: usize,
    pub vehicle_miles: f64,
    pub passenger_miles: f64,
    pub total_energy_joules: f64,
    pub gallons_gasoline: f64,
    pub over_capacity_traversals: usize,
    pub traversals_without_links: usize,
}

impl RunSummary {
    pub fn from_traversals(events: &[EnhancedPathTraversal]) -> Self {
        let mut s = RunSummary {
            generated_at: Utc::now(),
            path_traversals: events.len(),
            ..Default::default()
        };

        for e in events {
            s.vehicle_miles += e.vehicle_miles;
            s.passenger_miles += e.passenger_miles;
            s.total_energy_joules += e.total_energy_joules;
            s.gallons_gasoline += e.gallons_gasoline;

            if e.corrected_occupancy > 1.0 {
                s.over_capacity_traversals += 1;
            }

            if e.link_ids().next().is_none() {
                s.traversals_without_links += 1;
            }
        }

        s
    }

    /// Average passengers per vehicle mile, 0.0 when nothing moved.
    pub fn average_load(&self) -> f64 {
        ratio(self.passenger_miles, self.vehicle_miles)
    }

    /// Set run metadata (root and iteration)
    pub fn with_run_info(mut self, root: &str, iteration: u32) -> Self {
        self.root = root.to_string();
        self.iteration = iteration;
        self
    }

    pub fn with_event_count(mut self, event_type: &str, count: usize) -> Self {
        self.event_counts.insert(event_type.to_string(), count);
        self
    }
}
