use super::{Location, RunLayout};
use crate::error::{Error, Result};
use crate::fetch::{BasicClient, HttpClient, LocalOnly};
use std::fs;
use tracing::{debug, info};

/// Handle on one simulation run's output files.
///
/// Built once per analysis session and never mutated afterwards. The events
/// and network files are verified to exist at construction.
#[derive(Debug, Clone)]
pub struct RunDirectory {
    root: Location,
    iteration: u32,
    layout: RunLayout,
    events: Location,
    network: Location,
}

impl RunDirectory {
    /// Resolves `root`, creating an HTTP client only when `root` is a URL.
    pub fn new(root: &str, iteration: Option<u32>, layout: RunLayout) -> Result<Self> {
        if Location::parse(root).is_remote() {
            let client = BasicClient::new()?;
            Self::open(root, iteration, layout, &client)
        } else {
            Self::open(root, iteration, layout, &LocalOnly)
        }
    }

    /// Resolves `root` using `client` for remote existence checks.
    ///
    /// When `iteration` is `None`, local BEAM runs use the highest
    /// `ITERS/it.N` folder present; every other case falls back to 0.
    #[tracing::instrument(skip(layout, client))]
    pub fn open<C: HttpClient + ?Sized>(
        root: &str,
        iteration: Option<u32>,
        layout: RunLayout,
        client: &C,
    ) -> Result<Self> {
        let root = Location::parse(root);

        if let Location::Local(path) = &root {
            if !path.is_dir() {
                return Err(Error::missing_file(&root));
            }
        }

        let iteration = match iteration {
            Some(it) => it,
            None => discover_iterations(&root, &layout)?
                .last()
                .copied()
                .unwrap_or(0),
        };

        let events = root.join(&layout.events(iteration));
        if !events.exists(client)? {
            return Err(Error::missing_file(&events));
        }

        let network = root.join(&layout.network(iteration));
        if !network.exists(client)? {
            return Err(Error::missing_file(&network));
        }

        info!(root = %root, iteration, events = %events, "Resolved run directory");

        Ok(Self {
            root,
            iteration,
            layout,
            events,
            network,
        })
    }

    pub fn root(&self) -> &Location {
        &self.root
    }

    pub fn iteration(&self) -> u32 {
        self.iteration
    }

    pub fn layout(&self) -> &RunLayout {
        &self.layout
    }

    /// The events file for the selected iteration.
    ///
    /// Local files are re-checked on every call; remote ones were checked
    /// at construction. Nothing guarantees the simulator finished writing it.
    pub fn events_path(&self) -> Result<&Location> {
        if let Location::Local(path) = &self.events {
            if !path.is_file() {
                return Err(Error::missing_file(&self.events));
            }
        }
        Ok(&self.events)
    }

    pub fn network_path(&self) -> &Location {
        &self.network
    }

    pub fn link_stats_path(&self, iteration: u32) -> Option<Location> {
        self.layout
            .link_stats(iteration)
            .map(|rel| self.root.join(&rel))
    }

    pub fn plans_path(&self) -> Option<Location> {
        self.layout.plans().map(|rel| self.root.join(rel))
    }

    pub fn log_path(&self) -> Option<Location> {
        self.layout.log().map(|rel| self.root.join(rel))
    }

    /// Iterations present on disk, ascending.
    ///
    /// Remote roots cannot be listed, so only the selected iteration is
    /// reported for them.
    pub fn iterations(&self) -> Result<Vec<u32>> {
        if self.root.is_remote() || !self.layout.has_iteration_folders() {
            return Ok(vec![self.iteration]);
        }
        discover_iterations(&self.root, &self.layout)
    }
}

fn discover_iterations(root: &Location, layout: &RunLayout) -> Result<Vec<u32>> {
    let Some(path) = root.as_local() else {
        return Ok(Vec::new());
    };
    if !layout.has_iteration_folders() {
        return Ok(Vec::new());
    }

    let iters = path.join("ITERS");
    if !iters.is_dir() {
        return Ok(Vec::new());
    }

    let mut found = Vec::new();
    for entry in fs::read_dir(&iters)? {
        let entry = entry?;
        if !entry.file_type()?.is_dir() {
            continue;
        }
        if let Some(name) = entry.file_name().to_str() {
            if let Some(n) = name.strip_prefix("it.").and_then(|n| n.parse::<u32>().ok()) {
                found.push(n);
            }
        }
    }
    found.sort_unstable();
    debug!(root = %root, iterations = ?found, "Discovered iterations");
    Ok(found)
}
