use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{PipexploreError, Result};

const OPT_LEVELS: [&str; 6] = ["O0", "O1", "O2", "O3", "Os", "Oz"];

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    pub population_size: usize,
    pub generations: usize,
    pub mutation_rate: f64,
    /// Baseline optimization level whose default pipeline seeds the search.
    pub opt_level: String,
    /// Fixed RNG seed for reproducible runs; entropy-seeded when absent.
    pub seed: Option<u64>,
    /// Wall-clock bound on every external tool invocation, in seconds.
    pub tool_timeout_secs: u64,
    pub tmp_dir: PathBuf,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            population_size: 100,
            generations: 100,
            mutation_rate: 0.2,
            opt_level: "O2".to_string(),
            seed: None,
            tool_timeout_secs: 10,
            tmp_dir: std::env::temp_dir(),
        }
    }
}

impl SearchConfig {
    /// Load configuration from an optional TOML file, with `PIPEXPLORE_*`
    /// environment variables layered on top.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut builder = config::Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(config::File::from(path.to_path_buf()));
        }
        let loaded: SearchConfig = builder
            .add_source(config::Environment::with_prefix("PIPEXPLORE"))
            .build()
            .map_err(|err| PipexploreError::Configuration(format!("failed to load config: {}", err)))?
            .try_deserialize()
            .map_err(|err| PipexploreError::Configuration(format!("invalid config: {}", err)))?;
        loaded.validate()?;
        Ok(loaded)
    }

    pub fn validate(&self) -> Result<()> {
        if self.population_size < 2 {
            return Err(PipexploreError::Configuration(
                "population size must be at least 2".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&self.mutation_rate) {
            return Err(PipexploreError::Configuration(
                "mutation rate must be between 0 and 1".to_string(),
            ));
        }
        if !OPT_LEVELS.contains(&self.opt_level.as_str()) {
            return Err(PipexploreError::Configuration(format!(
                "unknown optimization level '{}'",
                self.opt_level
            )));
        }
        if self.tool_timeout_secs == 0 {
            return Err(PipexploreError::Configuration(
                "tool timeout must be at least 1 second".to_string(),
            ));
        }
        Ok(())
    }

    pub fn tool_timeout(&self) -> Duration {
        Duration::from_secs(self.tool_timeout_secs)
    }
}
