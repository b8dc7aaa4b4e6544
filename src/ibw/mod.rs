//! # Igor Binary Wave Reader
//!
//! The Pegasus III data archive stores every digitizer channel of a shot as an
//! Igor Pro binary wave (`.ibw`) file. This module decodes those files into
//! [`Wave`] values and can encode waves back (used for synthetic shots).
//!
//! ## Supported layouts
//!
//! | Version | Bin header | Wave header | Spacing / start fields |
//! |---------|------------|-------------|------------------------|
//! | 2 | 16 bytes | 110 bytes | `hsA` / `hsB` |
//! | 5 | 64 bytes | 320 bytes | `sfA[0]` / `sfB[0]` |
//!
//! Either byte order is accepted. The 16-bit word sum over both headers must be
//! zero; any other value is reported as a checksum mismatch. Only real,
//! one-dimensional numeric waves are time traces.
//!
//! ```rust
//! use p3data::ibw::{decode_wave, encode_wave, Wave};
//!
//! let wave = Wave::new("PDX01", 0.0, 1e-5, vec![0.0, 0.5, 1.0]).with_units("V");
//! let bytes = encode_wave(&wave);
//! let decoded = decode_wave(&bytes)?;
//! assert_eq!(decoded.header.name, "PDX01");
//! assert_eq!(decoded.values, vec![0.0, 0.5, 1.0]);
//! # Ok::<(), p3data::ibw::DecodeError>(())
//! ```

mod decode;
mod encode;
mod error;
mod header;


pub use decode::{decode_header, decode_wave, header_checksum, read_wave};
pub use encode::encode_wave;
pub use error::{DecodeError, ReaderError};
pub use header::{
    igor_time_to_utc, utc_to_igor_time, ByteOrderKind, IbwVersion, NumericType, Wave,
    WaveHeader, IGOR_EPOCH_OFFSET,
};

/// File extension of wave files in a shot folder
pub const IBW_EXTENSION: &str = "ibw";
