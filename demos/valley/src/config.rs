//! Run file: simulation settings plus model parameters, as JSON.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use anyhow::{Context, Result};
use dm_behavior::Parameters;
use dm_core::SimConfig;
use serde::Deserialize;

/// Top-level shape of the run file.
///
/// ```json
/// {
///   "simulation": { "start": {"year": 1997, "month": 1}, "end": {"year": 2007, "month": 1},
///                   "timestep_months": 1, "seed": 42, "output_interval_steps": 12 },
///   "parameters": { "divorce": { "probability": 0.003 } }
/// }
/// ```
///
/// Omitted parameter groups take their defaults.
#[derive(Debug, Deserialize)]
pub struct RunFile {
    pub simulation: SimConfig,
    #[serde(default)]
    pub parameters: Parameters,
}

impl RunFile {
    pub fn load(path: &Path) -> Result<Self> {
        let file = File::open(path).with_context(|| format!("opening run file {}", path.display()))?;
        serde_json::from_reader(BufReader::new(file))
            .with_context(|| format!("parsing run file {}", path.display()))
    }
}
