//! # Shot Processing
//!
//! Runs the full chain for one shot: load the channels of the requested signal
//! groups, resolve calibrations, align each group onto its own grid and run
//! the group's stages. A shot either produces every group's dataset or fails
//! with a [`ProcessingError`] naming the shot and the failing step.
//!
//! Shots are independent. [`process_batch`] processes many of them
//! concurrently when the `parallel` feature is enabled.

mod context;
mod error;

#[cfg(test)]
mod tests;

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use log::{info, warn};

use crate::align::align_traces;
use crate::calibration::{CalibrationError, CalibrationTable};
use crate::dataset::AlignedDataset;
use crate::pipeline::build_pipeline;
use crate::shot::channels::PLASMA_ROGOWSKI;
use crate::shot::{Shot, SignalGroup, DAS_CONF_FILE};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

pub use context::{CalibrationSource, ProcessingContext, ProcessingPlan};
pub use error::ProcessingError;

/// Processed datasets of one shot, one per signal group
#[derive(Debug, Clone)]
pub struct ShotAnalysis {
    /// Shot number
    pub shot: u32,
    /// Acquisition time
    pub acquired_at: DateTime<Utc>,
    /// Processed dataset per group
    pub datasets: BTreeMap<SignalGroup, AlignedDataset>,
    /// Channels that were requested but had no file
    pub missing: Vec<String>,
}

impl ShotAnalysis {
    /// Dataset of one group
    pub fn dataset(&self, group: SignalGroup) -> Option<&AlignedDataset> {
        self.datasets.get(&group)
    }

    /// Total number of processed channels
    pub fn channel_count(&self) -> usize {
        self.datasets.values().map(|d| d.columns().len()).sum()
    }
}

/// Load and process one shot from the archive
pub fn process_shot(ctx: &ProcessingContext, shot: u32) -> Result<ShotAnalysis, ProcessingError> {
    let loaded = ctx
        .loader
        .load_groups(shot, &ctx.groups)
        .map_err(|source| ProcessingError::Read { shot, source })?;
    process_loaded(ctx, &loaded)
}

/// Process a shot that is already in memory
pub fn process_loaded(
    ctx: &ProcessingContext,
    shot: &Shot,
) -> Result<ShotAnalysis, ProcessingError> {
    let number = shot.number();
    let table = resolve_calibration(ctx, shot)
        .map_err(|source| ProcessingError::Calibration {
            shot: number,
            source,
        })?;

    let mut datasets = BTreeMap::new();
    for &group in &ctx.groups {
        let traces = shot.subset(group.channels());
        if traces.is_empty() {
            warn!("Shot {}: no {} channels present, skipped", number, group);
            continue;
        }
        if group == SignalGroup::Currents
            && ctx.plan == ProcessingPlan::Presets
            && shot.trace(PLASMA_ROGOWSKI).is_none()
        {
            warn!(
                "Shot {}: {} missing, plasma current not computed",
                number, PLASMA_ROGOWSKI
            );
            continue;
        }

        let aligned = align_traces(number, shot.acquired_at(), &traces, &ctx.align).map_err(
            |source| ProcessingError::Alignment {
                shot: number,
                group,
                source,
            },
        )?;
        let pipeline = build_pipeline(&ctx.plan.stages_for(group), &table);
        let processed = pipeline
            .run(&aligned)
            .map_err(|source| ProcessingError::Transform {
                shot: number,
                group,
                source,
            })?;
        info!(
            "Shot {}: {} processed ({} channels, {} points)",
            number,
            group,
            processed.columns().len(),
            processed.len()
        );
        datasets.insert(group, processed);
    }

    Ok(ShotAnalysis {
        shot: number,
        acquired_at: shot.acquired_at(),
        datasets,
        missing: shot.missing().to_vec(),
    })
}

fn resolve_calibration(
    ctx: &ProcessingContext,
    shot: &Shot,
) -> Result<Arc<CalibrationTable>, CalibrationError> {
    match &ctx.calibration {
        CalibrationSource::Table(table) => Ok(Arc::clone(table)),
        CalibrationSource::DasConf if !ctx.plan.needs_calibration(&ctx.groups) => {
            Ok(Arc::new(CalibrationTable::new()))
        }
        CalibrationSource::DasConf => {
            let folder = shot.folder().ok_or_else(|| CalibrationError::Io {
                path: DAS_CONF_FILE.into(),
                source: std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    "shot was not loaded from a folder",
                ),
            })?;
            Ok(Arc::new(CalibrationTable::from_das_conf(
                &folder.join(DAS_CONF_FILE),
            )?))
        }
    }
}

/// Process many shots, each independently.
///
/// Results come back in input order; one failed shot does not affect the others.
pub fn process_batch(
    ctx: &ProcessingContext,
    shots: &[u32],
) -> Vec<(u32, Result<ShotAnalysis, ProcessingError>)> {
    info!("Processing {} shots", shots.len());

    #[cfg(feature = "parallel")]
    let results: Vec<_> = shots
        .par_iter()
        .map(|&shot| (shot, process_shot(ctx, shot)))
        .collect();

    #[cfg(not(feature = "parallel"))]
    let results: Vec<_> = shots
        .iter()
        .map(|&shot| (shot, process_shot(ctx, shot)))
        .collect();

    let failed = results.iter().filter(|(_, r)| r.is_err()).count();
    if failed > 0 {
        warn!("{} of {} shots failed", failed, shots.len());
    }
    results
}
