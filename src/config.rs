//! TOML configuration for batch runs.
//!
//! Every section is optional:
//!
//! ```toml
//! # p3data.toml
//! [archive]
//! root = "/data/pegasus"
//! missing = "skip"
//!
//! [alignment]
//! grid = { rate = 100000.0 }
//! span = "intersection"
//! method = "linear"
//! gap_tolerance = { samples = 2.0 }
//!
//! [calibration]
//! table = "calibrations.toml"
//!
//! [[pipeline.stage]]
//! kind = "baseline"
//!
//! [[pipeline.stage]]
//! kind = "integrate"
//! ```
//!
//! Relative paths are resolved against the directory of the config file.
//! Without `[[pipeline.stage]]` entries the standard chain of each signal
//! group runs; without `[calibration] table` each shot's `DAS.conf` is used.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::Deserialize;

use crate::align::{AlignConfig, AlignmentError};
use crate::calibration::{CalibrationError, CalibrationTable};
use crate::pipeline::StageSpec;
use crate::processing::{CalibrationSource, ProcessingContext, ProcessingPlan};
use crate::shot::{MissingPolicy, ShotArchive, ShotLoader};

/// Errors raised while loading a configuration
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The config file could not be read
    #[error("Failed to read config file {}: {source}", path.display())]
    Io {
        /// Config file
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// The file is not valid TOML for this layout
    #[error("Failed to parse TOML configuration: {0}")]
    Parse(#[from] toml::de::Error),

    /// The alignment section is inconsistent
    #[error("Invalid [alignment] section: {0}")]
    Alignment(#[from] AlignmentError),

    /// The calibration table could not be loaded
    #[error("Invalid calibration table: {0}")]
    Calibration(#[from] CalibrationError),
}

/// Root of a `p3data.toml` file
#[derive(Debug, Default, Deserialize)]
pub struct Config {
    /// Where shots live
    #[serde(default)]
    pub archive: ArchiveConfig,

    /// How channels are put on a common time axis
    #[serde(default)]
    pub alignment: AlignConfig,

    /// Calibration source
    #[serde(default)]
    pub calibration: CalibrationConfig,

    /// Processing stages
    #[serde(default)]
    pub pipeline: PipelineConfig,
}

/// `[archive]` section
#[derive(Debug, Default, Deserialize)]
pub struct ArchiveConfig {
    /// Archive root; the built-in default when absent
    pub root: Option<PathBuf>,

    /// Missing-channel policy
    #[serde(default)]
    pub missing: MissingPolicy,
}

/// `[calibration]` section
#[derive(Debug, Default, Deserialize)]
pub struct CalibrationConfig {
    /// TOML calibration table shared by all shots
    pub table: Option<PathBuf>,
}

/// `[pipeline]` section
#[derive(Debug, Default, Deserialize)]
pub struct PipelineConfig {
    /// Stages applied to every signal group, in order
    #[serde(default, rename = "stage")]
    pub stages: Vec<StageSpec>,
}

impl Config {
    /// Load configuration from a TOML file
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let mut config = Self::from_str(&content)?;
        if let Some(base) = path.parent() {
            config.resolve_paths(base);
        }
        Ok(config)
    }

    /// Parse configuration from a TOML string
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(content: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(content)?;
        config.alignment.validate()?;
        Ok(config)
    }

    fn resolve_paths(&mut self, base: &Path) {
        let resolve = |p: &mut PathBuf| {
            if p.is_relative() {
                *p = base.join(&*p);
            }
        };
        if let Some(root) = self.archive.root.as_mut() {
            resolve(root);
        }
        if let Some(table) = self.calibration.table.as_mut() {
            resolve(table);
        }
    }

    /// Shot loader for the `[archive]` section
    pub fn loader(&self) -> ShotLoader {
        let archive = self
            .archive
            .root
            .as_ref()
            .map(ShotArchive::new)
            .unwrap_or_default();
        ShotLoader::new(archive).with_missing_policy(self.archive.missing)
    }

    /// Processing plan for the `[pipeline]` section
    pub fn plan(&self) -> ProcessingPlan {
        if self.pipeline.stages.is_empty() {
            ProcessingPlan::Presets
        } else {
            ProcessingPlan::Custom(self.pipeline.stages.clone())
        }
    }

    /// Build the processing context; loads the calibration table if one is named
    pub fn into_context(self) -> Result<ProcessingContext, ConfigError> {
        let calibration = match &self.calibration.table {
            Some(path) => CalibrationSource::Table(Arc::new(CalibrationTable::from_file(path)?)),
            None => CalibrationSource::DasConf,
        };
        let loader = self.loader();
        let plan = self.plan();
        Ok(ProcessingContext::new(loader)
            .with_align(self.alignment)
            .with_calibration(calibration)
            .with_plan(plan))
    }
}
