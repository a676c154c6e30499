//! Batch configuration: the set of named runs to analyze together.
//!
//! Stored as a JSON object on disk:
//! ```json
//! {
//!   "runs": {
//!     "base": { "root": "https://storage.example.com/sfbay-base", "iteration": 2 },
//!     "telework": { "root": "runs/telework", "layout": "flat" },
//!     "y2030": { "root": "runs/pilot-2030", "year": 2030 }
//!   }
//! }
//! ```

use crate::error::{Error, Result};
use crate::input::RunLayout;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RunConfig {
    pub root: String,
    #[serde(default)]
    pub iteration: Option<u32>,
    #[serde(default)]
    pub layout: RunLayout,
    /// Simulated year, for runs that are steps of a multi-year sequence.
    #[serde(default)]
    pub year: Option<i32>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct BatchConfig {
    pub runs: BTreeMap<String, RunConfig>,
}

impl BatchConfig {
    /// Loads the config from a JSON file at `path`.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::Config(format!("failed to read config {}: {e}", path.display()))
        })?;
        Self::parse(&content)
            .map_err(|e| Error::Config(format!("failed to parse config {}: {e}", path.display())))
    }

    pub fn parse(content: &str) -> Result<Self> {
        let config: BatchConfig = serde_json::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.runs.is_empty() {
            return Err(Error::Config("no runs configured".to_string()));
        }
        for (name, run) in &self.runs {
            if name.trim().is_empty() || name.contains(['/', '\\']) {
                return Err(Error::Config(format!(
                    "run name {name:?} cannot be used as a directory name"
                )));
            }
            if run.root.trim().is_empty() {
                return Err(Error::Config(format!("run {name:?} has an empty root")));
            }
        }
        Ok(())
    }

    /// Iterates over all `(scenario, run)` pairs in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &RunConfig)> {
        self.runs.iter().map(|(k, v)| (k.as_str(), v))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_defaults() {
        let config = BatchConfig::parse(
            r#"{"runs": {
                "base": {"root": "https://host/base", "iteration": 2},
                "flat": {"root": "runs/flat", "layout": "flat"}
            }}"#,
        )
        .unwrap();

        let runs: Vec<_> = config.iter().collect();
        assert_eq!(runs.len(), 2);
        assert_eq!(runs[0].0, "base");
        assert_eq!(runs[0].1.iteration, Some(2));
        assert_eq!(runs[0].1.layout, RunLayout::Beam);
        assert_eq!(runs[1].1.layout, RunLayout::Flat);
        assert_eq!(runs[1].1.iteration, None);
        assert_eq!(runs[1].1.year, None);
    }

    #[test]
    fn test_parse_year() {
        let config =
            BatchConfig::parse(r#"{"runs": {"y2030": {"root": "runs/y2030", "year": 2030}}}"#)
                .unwrap();
        assert_eq!(config.runs["y2030"].year, Some(2030));
    }

    #[test]
    fn test_parse_rejects_empty_and_bad_names() {
        assert!(matches!(
            BatchConfig::parse(r#"{"runs": {}}"#),
            Err(Error::Config(_))
        ));
        assert!(matches!(
            BatchConfig::parse(r#"{"runs": {"a/b": {"root": "x"}}}"#),
            Err(Error::Config(_))
        ));
        assert!(matches!(
            BatchConfig::parse(r#"{"runs": {"a": {"root": " "}}}"#),
            Err(Error::Config(_))
        ));
    }

    #[test]
    fn test_parse_malformed_json() {
        assert!(matches!(BatchConfig::parse("{"), Err(Error::Json(_))));
    }

    #[test]
    fn test_load_missing_file() {
        let err = BatchConfig::load(Path::new("/no/such/runs.json")).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }
}
