//! Named conventions for where a run keeps its output files.

use crate::error::Error;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// How files are arranged under a run root.
///
/// Templates are `/`-separated paths relative to the root; `{it}` is
/// replaced by the iteration number.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunLayout {
    /// Standard BEAM output tree with per-iteration `ITERS/it.N` folders.
    #[default]
    Beam,
    /// Single-iteration dump with every file directly under the root.
    Flat,
    Custom {
        events: String,
        network: String,
        #[serde(default)]
        link_stats: Option<String>,
    },
}

impl RunLayout {
    pub fn events(&self, iteration: u32) -> String {
        match self {
            RunLayout::Beam => format!("ITERS/it.{iteration}/{iteration}.events.csv.gz"),
            RunLayout::Flat => "events.csv.gz".to_string(),
            RunLayout::Custom { events, .. } => fill(events, iteration),
        }
    }

    pub fn network(&self, iteration: u32) -> String {
        match self {
            RunLayout::Beam | RunLayout::Flat => "network.csv.gz".to_string(),
            RunLayout::Custom { network, .. } => fill(network, iteration),
        }
    }

    pub fn link_stats(&self, iteration: u32) -> Option<String> {
        match self {
            RunLayout::Beam => Some(format!(
                "ITERS/it.{iteration}/{iteration}.linkstats.csv.gz"
            )),
            RunLayout::Flat => Some("linkstats.csv.gz".to_string()),
            RunLayout::Custom { link_stats, .. } => {
                link_stats.as_deref().map(|t| fill(t, iteration))
            }
        }
    }

    pub fn plans(&self) -> Option<&'static str> {
        match self {
            RunLayout::Beam | RunLayout::Flat => Some("plans.csv.gz"),
            RunLayout::Custom { .. } => None,
        }
    }

    pub fn log(&self) -> Option<&'static str> {
        match self {
            RunLayout::Beam | RunLayout::Flat => Some("beamLog.out"),
            RunLayout::Custom { .. } => None,
        }
    }

    /// Whether iterations live in discoverable `ITERS/it.N` folders.
    pub fn has_iteration_folders(&self) -> bool {
        matches!(self, RunLayout::Beam)
    }
}

fn fill(template: &str, iteration: u32) -> String {
    template.replace("{it}", &iteration.to_string())
}

impl FromStr for RunLayout {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "beam" => Ok(RunLayout::Beam),
            "flat" => Ok(RunLayout::Flat),
            other => Err(Error::Config(format!(
                "unknown layout {other:?}: expected \"beam\" or \"flat\""
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_beam_layout_paths() {
        let layout = RunLayout::Beam;
        assert_eq!(layout.events(3), "ITERS/it.3/3.events.csv.gz");
        assert_eq!(layout.link_stats(3).unwrap(), "ITERS/it.3/3.linkstats.csv.gz");
        assert_eq!(layout.network(3), "network.csv.gz");
        assert!(layout.has_iteration_folders());
    }

    #[test]
    fn test_flat_layout_ignores_iteration() {
        let layout = RunLayout::Flat;
        assert_eq!(layout.events(7), "events.csv.gz");
        assert!(!layout.has_iteration_folders());
    }

    #[test]
    fn test_custom_layout_fills_template() {
        let layout = RunLayout::Custom {
            events: "out/{it}/events.tsv".into(),
            network: "net.csv".into(),
            link_stats: None,
        };
        assert_eq!(layout.events(12), "out/12/events.tsv");
        assert_eq!(layout.network(12), "net.csv");
        assert!(layout.link_stats(12).is_none());
        assert!(layout.plans().is_none());
    }

    #[test]
    fn test_custom_network_template_is_filled() {
        let layout = RunLayout::Custom {
            events: "it{it}/events.csv".into(),
            network: "it{it}/network.csv.gz".into(),
            link_stats: Some("it{it}/linkstats.csv.gz".into()),
        };
        assert_eq!(layout.network(3), "it3/network.csv.gz");
        assert_eq!(layout.link_stats(3).as_deref(), Some("it3/linkstats.csv.gz"));
    }

    #[test]
    fn test_from_str() {
        assert_eq!("Beam".parse::<RunLayout>().unwrap(), RunLayout::Beam);
        assert_eq!("flat".parse::<RunLayout>().unwrap(), RunLayout::Flat);
        assert!("nested".parse::<RunLayout>().is_err());
    }

    #[test]
    fn test_deserialize_from_json() {
        let beam: RunLayout = serde_json::from_str("\"beam\"").unwrap();
        assert_eq!(beam, RunLayout::Beam);

        let custom: RunLayout = serde_json::from_str(
            r#"{"custom": {"events": "e.csv", "network": "n.csv"}}"#,
        )
        .unwrap();
        assert_eq!(
            custom,
            RunLayout::Custom {
                events: "e.csv".into(),
                network: "n.csv".into(),
                link_stats: None,
            }
        );
    }
}
