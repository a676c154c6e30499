use crate::analyzers::types::{HourlyLinkStats, LinkStats};
use crate::analyzers::utility::mean_stddev;
use crate::network::Network;
use crate::schema::EnhancedPathTraversal;
use std::collections::BTreeMap;
use tracing::warn;

#[derive(Default)]
struct LinkAccumulator {
    traversals: u64,
    vehicle_miles: f64,
    passenger_miles: f64,
    passengers: f64,
    occupancies: Vec<f64>,
}

impl LinkAccumulator {
    fn add(&mut self, miles: f64, event: &EnhancedPathTraversal) {
        self.traversals += 1;
        self.vehicle_miles += miles;
        self.passenger_miles += miles * event.num_passengers;
        self.passengers += event.num_passengers;
        self.occupancies.push(event.corrected_occupancy);
    }

    fn occupancy(&self) -> (f64, f64) {
        mean_stddev(&self.occupancies)
    }
}

/// Attributes every traversal to each link it crossed, grouped by `key`.
///
/// A link's mileage is its network length when known, otherwise an even
/// share of the traversal's vehicle miles. Traversals without any link id
/// are skipped and counted in a warning.
fn accumulate<K, F>(
    events: &[EnhancedPathTraversal],
    network: Option<&Network>,
    key: F,
) -> BTreeMap<K, LinkAccumulator>
where
    K: Ord,
    F: Fn(&EnhancedPathTraversal, &str) -> K,
{
    let mut groups: BTreeMap<K, LinkAccumulator> = BTreeMap::new();
    let mut excluded = 0usize;

    for event in events {
        let links: Vec<&str> = event.link_ids().collect();
        if links.is_empty() {
            excluded += 1;
            continue;
        }

        let even_share = event.vehicle_miles / links.len() as f64;
        for link in links {
            let miles = network
                .and_then(|n| n.get(link))
                .map(|l| l.length_miles())
                .unwrap_or(even_share);
            groups.entry(key(event, link)).or_default().add(miles, event);
        }
    }

    if excluded > 0 {
        warn!(excluded, "Path traversals without link ids left out of link statistics");
    }

    groups
}

/// One row per link id, ascending.
pub fn link_stats(events: &[EnhancedPathTraversal], network: Option<&Network>) -> Vec<LinkStats> {
    accumulate(events, network, |_, link| link.to_string())
        .into_iter()
        .map(|(link_id, acc)| {
            let (mean_occupancy, occupancy_stddev) = acc.occupancy();
            LinkStats {
                link_id,
                traversals: acc.traversals,
                vehicle_miles: acc.vehicle_miles,
                passenger_miles: acc.passenger_miles,
                passengers: acc.passengers,
                mean_occupancy,
                occupancy_stddev,
            }
        })
        .collect()
}

/// One row per (link id, departure hour), ascending.
pub fn hourly_link_stats(
    events: &[EnhancedPathTraversal],
    network: Option<&Network>,
) -> Vec<HourlyLinkStats> {
    accumulate(events, network, |event, link| (link.to_string(), event.hour()))
        .into_iter()
        .map(|((link_id, hour), acc)| {
            let (mean_occupancy, occupancy_stddev) = acc.occupancy();
            HourlyLinkStats {
                link_id,
                hour,
                traversals: acc.traversals,
                vehicle_miles: acc.vehicle_miles,
                passenger_miles: acc.passenger_miles,
                passengers: acc.passengers,
                mean_occupancy,
                occupancy_stddev,
            }
        })
        .collect()
}
