//! # Shot Records
//!
//! A [`Shot`] is one Pegasus III discharge: the shot number, its acquisition
//! time and one [`ChannelTrace`] per digitized diagnostic. Shots are read from
//! the data archive by a [`ShotLoader`], which maps shot numbers to folders
//! through [`ShotArchive`] and decodes each channel's wave file.
//!
//! ```rust,no_run
//! use p3data::shot::{ShotArchive, ShotLoader, SignalGroup};
//!
//! let loader = ShotLoader::new(ShotArchive::new("/mnt/Pegasus_Data_Archive/p3data"));
//! let shot = loader.load_groups(109756, &[SignalGroup::BDots])?;
//! for trace in shot.traces() {
//!     println!("{}: {} samples", trace.name(), trace.len());
//! }
//! # Ok::<(), p3data::ibw::ReaderError>(())
//! ```

mod archive;
pub mod channels;
mod error;
mod loader;
mod record;
mod trace;

#[cfg(test)]
mod tests;

pub use archive::{channel_file, ShotArchive, DAS_CONF_FILE};
pub use channels::SignalGroup;
pub use error::TraceError;
pub use loader::{load_folder, MissingPolicy, ShotLoader};
pub use record::Shot;
pub use trace::ChannelTrace;
