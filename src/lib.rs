//! # p3data - Pegasus III Diagnostic Data Pipeline
//!
//! `p3data` loads the per-shot diagnostic waveforms recorded by the Pegasus III
//! data acquisition system and turns them into calibrated, time-aligned,
//! queryable datasets.
//!
//! ## Key Features
//!
//! - **Igor Binary Wave Reader**: Decodes version 2 and 5 `.ibw` files in either
//!   byte order, verifying the header checksum.
//!
//! - **Time-Scoped Calibrations**: Linear and lookup-curve conversions keyed by
//!   channel and validity range, loaded from TOML or each shot's `DAS.conf`.
//!
//! - **Time Alignment**: Channels sampled on different clocks are resampled onto
//!   one strictly increasing grid; samples too far from any grid point are
//!   marked missing rather than invented.
//!
//! - **Composable Stages**: Offset removal, integration, drift removal,
//!   calibration, probe scaling and smoothing, each recorded in the dataset's
//!   processing history.
//!
//! - **Parquet and CSV Export**: ZSTD-compressed Parquet with shot, units,
//!   provenance and processing history in the footer.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use p3data::processing::{process_shot, ProcessingContext};
//! use p3data::shot::{ShotArchive, ShotLoader, SignalGroup};
//! use p3data::dataset::ExportConfig;
//! use std::path::Path;
//!
//! let loader = ShotLoader::new(ShotArchive::new("/data/pegasus"));
//! let ctx = ProcessingContext::new(loader);
//!
//! let analysis = process_shot(&ctx, 109756)?;
//! if let Some(currents) = analysis.dataset(SignalGroup::Currents) {
//!     println!("Ip at 10 ms: {:?}", currents.value_at("Ip", 0.010));
//!     currents.write_parquet(Path::new("ip.parquet"), &ExportConfig::default())?;
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Architecture
//!
//! The library is organized into the following modules:
//!
//! - [`ibw`]: Igor binary wave decoding and encoding
//! - [`shot`]: Archive layout, channel groups and shot loading
//! - [`calibration`]: Calibration tables, `DAS.conf` parsing and probe factors
//! - [`align`]: Time-alignment engine
//! - [`pipeline`]: Derived-quantity stages and pipelines
//! - [`dataset`]: Aligned datasets, queries and export
//! - [`processing`]: Per-shot processing and parallel batches
//! - [`validator`]: Integrity checks for shot folders and exports
//! - [`config`]: TOML configuration
//!
//! ## Export Footer Metadata
//!
//! - `p3data:format_version`: Export layout version
//! - `p3data:shot`: Shot number
//! - `p3data:acquired_at`: Acquisition time (RFC 3339)
//! - `p3data:channels`: Units and provenance of every column
//! - `p3data:processing_history`: Applied stages and their parameters

// Documentation lints - enforce complete documentation for publication
#![deny(missing_docs)]
#![deny(rustdoc::missing_crate_level_docs)]

pub mod align;
pub mod calibration;
pub mod config;
pub mod dataset;
pub mod ibw;
pub mod pipeline;
pub mod processing;
pub mod shot;
pub mod validator;

/// Re-export commonly used types for convenience
pub mod prelude {
    pub use crate::align::{
        align_channels, align_shot, align_traces, AlignConfig, AlignmentError, GapTolerance,
        GridSpec, Interpolation, SpanPolicy,
    };
    pub use crate::calibration::{
        CalibrationEntry, CalibrationError, CalibrationTable, Conversion, Validity,
    };
    pub use crate::config::{Config, ConfigError};
    pub use crate::dataset::{
        AlignedDataset, Column, ExportConfig, ExportError, ProcessingHistory, ProcessingStep,
    };
    pub use crate::ibw::{read_wave, ReaderError, Wave};
    pub use crate::pipeline::{Pipeline, Stage, StageError, StageSpec, TransformError};
    pub use crate::processing::{
        process_batch, process_shot, ProcessingContext, ProcessingError, ShotAnalysis,
    };
    pub use crate::shot::{ChannelTrace, Shot, ShotArchive, ShotLoader, SignalGroup};
    pub use crate::validator::{validate_shot, ValidationReport};
}
