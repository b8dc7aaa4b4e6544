//! # Derived-Quantity Pipeline
//!
//! A [`Pipeline`] is an ordered list of [`Stage`]s. Each stage is a pure
//! function from one [`AlignedDataset`] to a new one; the pipeline feeds the
//! output of each stage into the next and appends a
//! [`ProcessingStep`](crate::dataset::ProcessingStep) to the history for
//! every stage applied. If any stage fails, the run stops with a
//! [`TransformError`] naming the stage and nothing is returned.
//!
//! Running `[a, b]` and then `[c]` gives the same dataset as running
//! `[a, b, c]`.
//!
//! ```rust
//! use std::sync::Arc;
//! use chrono::Utc;
//! use p3data::align::{align_traces, AlignConfig};
//! use p3data::pipeline::{stages::{Baseline, Integrate, Scale}, Pipeline};
//! use p3data::shot::ChannelTrace;
//!
//! let trace = ChannelTrace::uniform("CFL01", "V", 0.0, 1e-4, vec![1.0; 50])?;
//! let dataset = align_traces(1, Utc::now(), &[Arc::new(trace)], &AlignConfig::default())?;
//!
//! let pipeline = Pipeline::new()
//!     .with_stage(Baseline::new(0.0, 1e-3))
//!     .with_stage(Integrate)
//!     .with_stage(Scale::new(2.0));
//! let result = pipeline.run(&dataset)?;
//! assert_eq!(result.history().stage_names(), vec!["baseline", "integrate", "scale"]);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod error;
pub mod presets;
mod spec;
mod stage;
pub mod stages;


use std::fmt;
use std::sync::Arc;

use log::debug;

use crate::dataset::AlignedDataset;

pub use error::{StageError, TransformError};
pub use spec::{build_pipeline, StageSpec};
pub use stage::{map_columns, Stage};

/// Ordered sequence of stages
#[derive(Debug, Clone, Default)]
pub struct Pipeline {
    stages: Vec<Arc<dyn Stage>>,
}

impl Pipeline {
    /// Empty pipeline; running it returns the input unchanged
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a stage
    pub fn with_stage<S: Stage + 'static>(self, stage: S) -> Self {
        self.with_arc(Arc::new(stage))
    }

    /// Append a shared stage
    pub fn with_arc(mut self, stage: Arc<dyn Stage>) -> Self {
        self.stages.push(stage);
        self
    }

    /// Append a shared stage in place
    pub fn push(&mut self, stage: Arc<dyn Stage>) {
        self.stages.push(stage);
    }

    /// This pipeline followed by `next`
    pub fn then(mut self, next: Pipeline) -> Self {
        self.stages.extend(next.stages);
        self
    }

    /// Stages in order
    pub fn stages(&self) -> &[Arc<dyn Stage>] {
        &self.stages
    }

    /// Number of stages
    pub fn len(&self) -> usize {
        self.stages.len()
    }

    /// Whether the pipeline has no stages
    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    /// Run every stage in order
    pub fn run(&self, input: &AlignedDataset) -> Result<AlignedDataset, TransformError> {
        let mut current = input.clone();
        for (stage_index, stage) in self.stages.iter().enumerate() {
            let mut next = stage.apply(&current).map_err(|source| TransformError {
                stage_index,
                stage: stage.name().to_string(),
                source,
            })?;
            next.record_step(stage.name(), stage.parameters());
            debug!(
                "Shot {}: stage {} ({}) applied",
                input.shot(),
                stage_index,
                stage.name()
            );
            current = next;
        }
        Ok(current)
    }
}

impl fmt::Display for Pipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.stages.iter().map(|s| s.name()).collect();
        write!(f, "[{}]", names.join(" -> "))
    }
}
