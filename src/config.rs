use eyre::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::pipeline::PipelineConfig;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub log_level: Option<String>,
    pub pipeline: PipelineSection,
    pub bus: BusSection,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineSection {
    pub capacity: usize,
    pub total: u64,
    pub idle_poll_us: u64,
}

impl Default for PipelineSection {
    fn default() -> Self {
        Self {
            capacity: 3,
            total: 10,
            idle_poll_us: 0,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BusSection {
    pub republish_backoff_us: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_level: Some("info".to_string()),
            pipeline: PipelineSection::default(),
            bus: BusSection::default(),
        }
    }
}

impl Config {
    /// Load configuration with fallback chain
    pub fn load(config_path: Option<&PathBuf>) -> Result<Self> {
        // If explicit config path provided, try to load it
        if let Some(path) = config_path {
            return Self::load_from_file(path).context(format!("Failed to load config from {}", path.display()));
        }

        // Try primary location: ~/.config/<project>/<project>.yml
        if let Some(config_dir) = dirs::config_dir() {
            let project_name = env!("CARGO_PKG_NAME");
            let primary_config = config_dir.join(project_name).join(format!("{}.yml", project_name));
            if primary_config.exists() {
                match Self::load_from_file(&primary_config) {
                    Ok(config) => return Ok(config),
                    Err(e) => {
                        log::warn!("Failed to load config from {}: {}", primary_config.display(), e);
                    }
                }
            }
        }

        // Try fallback location: ./<project>.yml
        let project_name = env!("CARGO_PKG_NAME");
        let fallback_config = PathBuf::from(format!("{}.yml", project_name));
        if fallback_config.exists() {
            match Self::load_from_file(&fallback_config) {
                Ok(config) => return Ok(config),
                Err(e) => {
                    log::warn!("Failed to load config from {}: {}", fallback_config.display(), e);
                }
            }
        }

        log::info!("No config file found, using defaults");
        Ok(Self::default())
    }

    fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path).context("Failed to read config file")?;

        let config: Self = serde_yaml::from_str(&content).context("Failed to parse config file")?;

        log::info!("Loaded config from: {}", path.as_ref().display());
        Ok(config)
    }

    /// Pipeline parameters with optional command-line overrides applied
    pub fn pipeline_config(
        &self,
        capacity: Option<usize>,
        total: Option<u64>,
        idle_poll_us: Option<u64>,
    ) -> Result<PipelineConfig> {
        let config = PipelineConfig::new(
            capacity.unwrap_or(self.pipeline.capacity),
            total.unwrap_or(self.pipeline.total),
        )
        .with_idle_poll(Duration::from_micros(idle_poll_us.unwrap_or(self.pipeline.idle_poll_us)));
        config.validate().context("Invalid pipeline configuration")?;
        Ok(config)
    }

    pub fn republish_backoff(&self) -> Duration {
        Duration::from_micros(self.bus.republish_backoff_us)
    }
}
