use crate::analyzers::aggregate::{hourly_link_stats, link_stats};
use crate::analyzers::mode::{
    extended_mode_vmt, mode_energy, mode_events, mode_vmt, mode_vmt_by_year,
};
use crate::analyzers::types::{HourlyLinkStats, LinkStats, ModeEnergy, ModeVmt, ScenarioModeVmt};
use crate::config::BatchConfig;
use crate::error::{Error, Result};
use crate::events::{EventTable, EventType, EventsFile};
use crate::fetch::HttpClient;
use crate::input::RunDirectory;
use crate::network::Network;
use crate::output::OutputDirectory;
use crate::schema::{EnhancedPathTraversal, PathTraversalEvent};
use crate::stats::RunSummary;
use crate::transform::fix_path_traversals;
use std::collections::BTreeMap;
use std::path::PathBuf;
use tracing::{error, info, warn};

const COLLECTED: [EventType; 3] = [
    EventType::PathTraversal,
    EventType::PersonEntersVehicle,
    EventType::ModeChoice,
];

/// Everything extracted from one run iteration.
#[derive(Debug)]
pub struct RunAnalysis {
    root: String,
    iteration: u32,
    path_traversals: Vec<EnhancedPathTraversal>,
    person_enters_vehicle: EventTable,
    mode_choice: EventTable,
    network: Network,
}

impl RunAnalysis {
    /// Scans the events file once, derives the enhanced traversal table and
    /// loads the link network.
    #[tracing::instrument(skip_all, fields(root = %run.root(), iteration = run.iteration()))]
    pub fn load<C: HttpClient + ?Sized>(run: &RunDirectory, client: &C) -> Result<Self> {
        let events = EventsFile::new(run.events_path()?.clone());
        let mut tables = events.collect(&COLLECTED, client)?;
        let mut take = |t: EventType| {
            tables
                .remove(&t)
                .unwrap_or_else(|| EventTable::new(t, Default::default()))
        };

        let raw = PathTraversalEvent::from_table(&take(EventType::PathTraversal))?;
        let path_traversals = fix_path_traversals(&raw)?;
        let person_enters_vehicle = take(EventType::PersonEntersVehicle).without_empty_columns();
        let mode_choice = take(EventType::ModeChoice).without_empty_columns();

        let network = Network::load(run.network_path(), client)?;

        info!(
            path_traversals = path_traversals.len(),
            links = network.len(),
            "Loaded run"
        );

        Ok(Self {
            root: run.root().to_string(),
            iteration: run.iteration(),
            path_traversals,
            person_enters_vehicle,
            mode_choice,
            network,
        })
    }

    pub fn path_traversals(&self) -> &[EnhancedPathTraversal] {
        &self.path_traversals
    }

    pub fn person_enters_vehicle(&self) -> &EventTable {
        &self.person_enters_vehicle
    }

    pub fn mode_choice(&self) -> &EventTable {
        &self.mode_choice
    }

    pub fn network(&self) -> &Network {
        &self.network
    }

    /// Traversals of one raw mode, e.g. `"bus"`.
    pub fn mode_events(&self, mode: &str) -> Vec<EnhancedPathTraversal> {
        mode_events(&self.path_traversals, mode)
    }

    pub fn mode_vmt(&self) -> Vec<ModeVmt> {
        mode_vmt(&self.path_traversals)
    }

    pub fn extended_mode_vmt(&self) -> Vec<ModeVmt> {
        extended_mode_vmt(&self.path_traversals)
    }

    pub fn mode_energy(&self) -> Vec<ModeEnergy> {
        mode_energy(&self.path_traversals)
    }

    pub fn link_stats(&self) -> Vec<LinkStats> {
        link_stats(&self.path_traversals, Some(&self.network))
    }

    pub fn hourly_link_stats(&self) -> Vec<HourlyLinkStats> {
        hourly_link_stats(&self.path_traversals, Some(&self.network))
    }

    pub fn summary(&self) -> RunSummary {
        RunSummary::from_traversals(&self.path_traversals)
            .with_run_info(&self.root, self.iteration)
            .with_event_count(EventType::PathTraversal.as_str(), self.path_traversals.len())
            .with_event_count(
                EventType::PersonEntersVehicle.as_str(),
                self.person_enters_vehicle.len(),
            )
            .with_event_count(EventType::ModeChoice.as_str(), self.mode_choice.len())
    }

    /// Writes every derived table of the run into `out`.
    pub fn write_all(&self, out: &OutputDirectory) -> Result<Vec<PathBuf>> {
        let written = vec![
            out.write_csv("PathTraversalEvents", &self.path_traversals)?,
            out.write_csv("ModeVMT", &self.mode_vmt())?,
            out.write_csv("ModeEnergy", &self.mode_energy())?,
            out.write_csv("LinkStatsFromPathTraversals", &self.link_stats())?,
            out.write_csv("LinkStatsFromPathTraversalsByHour", &self.hourly_link_stats())?,
            out.write_json("RunSummary", &self.summary())?,
        ];
        info!(dir = %out.path().display(), files = written.len(), "Wrote run outputs");
        Ok(written)
    }
}

/// Analyzes every run in `config` into `output_root/<scenario>` and writes a
/// combined `ModeVMTByScenario.csv`. When any run carries a `year`,
/// `ModeVMTByYear.csv` stacks the last iteration of each year as well.
///
/// Runs whose files cannot be located are skipped. Any other failure aborts
/// the batch.
pub fn analyze_batch<C: HttpClient + ?Sized>(
    config: &BatchConfig,
    output_root: &OutputDirectory,
    client: &C,
) -> Result<Vec<ScenarioModeVmt>> {
    let mut combined = Vec::new();
    let mut by_year: BTreeMap<(i32, i32), Vec<ModeVmt>> = BTreeMap::new();
    let mut skipped = 0usize;

    for (scenario, entry) in config.iter() {
        let run = match RunDirectory::open(&entry.root, entry.iteration, entry.layout.clone(), client)
        {
            Ok(run) => run,
            Err(e @ Error::MissingFile { .. }) => {
                warn!(scenario, error = %e, "Skipping run");
                skipped += 1;
                continue;
            }
            Err(e) => {
                error!(scenario, error = %e, "Failed to open run");
                return Err(e);
            }
        };

        let analysis = RunAnalysis::load(&run, client)?;
        analysis.write_all(&output_root.child(scenario))?;

        let vmt = analysis.mode_vmt();
        if let Some(year) = entry.year {
            by_year.insert((year, run.iteration() as i32), vmt.clone());
        }

        combined.extend(vmt.into_iter().map(|m| ScenarioModeVmt {
            scenario: scenario.to_string(),
            mode: m.mode,
            vehicle_miles: m.vehicle_miles,
            passenger_miles: m.passenger_miles,
        }));
    }

    output_root.write_csv("ModeVMTByScenario", &combined)?;
    if !by_year.is_empty() {
        output_root.write_csv("ModeVMTByYear", &mode_vmt_by_year(&by_year))?;
    }
    info!(rows = combined.len(), skipped, "Finished batch");

    Ok(combined)
}
