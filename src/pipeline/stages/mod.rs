//! Built-in pipeline stages.

mod calibrate;
mod channels;
mod cleanup;
mod smoothing;

pub use calibrate::{Calibrate, ProbeScale, Scale};
pub use channels::{Rename, Select};
pub use cleanup::{Baseline, Detrend, Integrate, DEFAULT_BASELINE_END};
pub use smoothing::{Smooth, WindowedMean};
