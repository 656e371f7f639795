use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use toolcore_grid::WorldLimits;

/// Settings for the query harness.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Log the duration of every query as it completes.
    #[serde(default)]
    pub log_timings: bool,
    /// Run the cylinder and point queries with a recording debug drawer.
    #[serde(default)]
    pub debug_draw: bool,
    #[serde(default)]
    pub world_limits: WorldLimits,
}

impl Settings {
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => {
                log::info!("Loading settings from {:?}", path);
                let file = std::fs::File::open(path).context("Opening settings file")?;
                Ok(serde_yaml::from_reader(file).context("Parsing settings file")?)
            }
            None => {
                log::info!("Using default settings");
                Ok(Settings::default())
            }
        }
    }
}
