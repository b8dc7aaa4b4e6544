//! # Aligned Datasets
//!
//! An [`AlignedDataset`] holds the channels of one shot resampled onto a shared
//! time grid. Each [`Column`] stores `Option<f64>` values (`None` marks a
//! missing point) together with its [`Provenance`], and the dataset records the
//! ordered [`ProcessingHistory`] of every stage applied to it.
//!
//! Queries never fail: out-of-range slices and unknown channels produce empty
//! results.
//!
//! ## Export
//!
//! Datasets export to Parquet (ZSTD compressed, one nullable `Float64` column
//! per channel next to a `time` column) and CSV. Parquet footers carry the
//! shot number, acquisition time, column provenance and processing history
//! under `p3data:` keys.

mod aligned;
mod column;
mod error;
mod export;
mod history;
pub mod keys;
mod table;


pub use aligned::AlignedDataset;
pub use column::{Column, Provenance};
pub use error::{DatasetError, ExportError};
pub use export::{ExportConfig, ExportStats};
pub use history::{ProcessingHistory, ProcessingStep};
pub use table::{Row, Table, TIME_COLUMN};
