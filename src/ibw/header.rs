use chrono::{DateTime, Utc};

use super::error::DecodeError;

/// Seconds between the Igor epoch (1904-01-01) and the Unix epoch
pub const IGOR_EPOCH_OFFSET: i64 = 2_082_844_800;

/// Bin header size for version 2 files
pub const BIN_HEADER_V2_SIZE: usize = 16;
/// Wave header size for version 2 files, up to the start of the data
pub const WAVE_HEADER_V2_SIZE: usize = 110;
/// Bin header size for version 5 files
pub const BIN_HEADER_V5_SIZE: usize = 64;
/// Wave header size for version 5 files, up to the start of the data
pub const WAVE_HEADER_V5_SIZE: usize = 320;

/// Wave name field width in version 2 headers
pub(crate) const NAME_V2_LEN: usize = 20;
/// Wave name field width in version 5 headers
pub(crate) const NAME_V5_LEN: usize = 32;
/// Unit field width in both versions
pub(crate) const UNITS_LEN: usize = 4;

const NT_CMPLX: i16 = 0x01;
const NT_FP32: i16 = 0x02;
const NT_FP64: i16 = 0x04;
const NT_I8: i16 = 0x08;
const NT_I16: i16 = 0x10;
const NT_I32: i16 = 0x20;
const NT_UNSIGNED: i16 = 0x40;

/// Supported file versions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IbwVersion {
    /// Version 2: 16-byte bin header, 110-byte wave header
    V2,
    /// Version 5: 64-byte bin header, 320-byte wave header
    V5,
}

impl IbwVersion {
    /// Parse the raw version field
    pub fn from_raw(raw: i16) -> Result<Self, DecodeError> {
        match raw {
            2 => Ok(IbwVersion::V2),
            5 => Ok(IbwVersion::V5),
            other => Err(DecodeError::format(format!(
                "unsupported wave version {}",
                other
            ))),
        }
    }

    /// Raw version field value
    pub fn raw(self) -> i16 {
        match self {
            IbwVersion::V2 => 2,
            IbwVersion::V5 => 5,
        }
    }

    /// Combined size of bin header and wave header, which is also the data offset
    pub fn header_size(self) -> usize {
        match self {
            IbwVersion::V2 => BIN_HEADER_V2_SIZE + WAVE_HEADER_V2_SIZE,
            IbwVersion::V5 => BIN_HEADER_V5_SIZE + WAVE_HEADER_V5_SIZE,
        }
    }

    /// Offset of the checksum field inside the bin header
    pub(crate) fn checksum_offset(self) -> usize {
        match self {
            IbwVersion::V2 => 14,
            IbwVersion::V5 => 2,
        }
    }
}

/// Byte order of a wave file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ByteOrderKind {
    /// Written on x86 (Windows, Intel Macs)
    #[default]
    Little,
    /// Written on PowerPC Macs
    Big,
}

impl ByteOrderKind {
    /// Detect the byte order from the first two bytes of the file.
    ///
    /// The version field is small, so a zero first byte means the high byte came first.
    pub fn detect(first_two: [u8; 2]) -> Self {
        if first_two[0] == 0 && first_two[1] != 0 {
            ByteOrderKind::Big
        } else {
            ByteOrderKind::Little
        }
    }
}

/// Numeric storage type of the wave samples
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NumericType {
    /// 32-bit float
    #[default]
    F32,
    /// 64-bit float
    F64,
    /// Signed 8-bit integer
    I8,
    /// Signed 16-bit integer
    I16,
    /// Signed 32-bit integer
    I32,
    /// Unsigned 8-bit integer
    U8,
    /// Unsigned 16-bit integer
    U16,
    /// Unsigned 32-bit integer
    U32,
}

impl NumericType {
    /// Parse the Igor type code
    pub fn from_code(code: i16) -> Result<Self, DecodeError> {
        if code == 0 {
            return Err(DecodeError::format("text waves are not numeric traces"));
        }
        if code & NT_CMPLX != 0 {
            return Err(DecodeError::format("complex waves are not supported"));
        }
        let unsigned = code & NT_UNSIGNED != 0;
        match (code & !NT_UNSIGNED, unsigned) {
            (NT_FP32, false) => Ok(NumericType::F32),
            (NT_FP64, false) => Ok(NumericType::F64),
            (NT_I8, false) => Ok(NumericType::I8),
            (NT_I16, false) => Ok(NumericType::I16),
            (NT_I32, false) => Ok(NumericType::I32),
            (NT_I8, true) => Ok(NumericType::U8),
            (NT_I16, true) => Ok(NumericType::U16),
            (NT_I32, true) => Ok(NumericType::U32),
            _ => Err(DecodeError::format(format!(
                "unknown numeric type code {:#06x}",
                code
            ))),
        }
    }

    /// Igor type code
    pub fn code(self) -> i16 {
        match self {
            NumericType::F32 => NT_FP32,
            NumericType::F64 => NT_FP64,
            NumericType::I8 => NT_I8,
            NumericType::I16 => NT_I16,
            NumericType::I32 => NT_I32,
            NumericType::U8 => NT_I8 | NT_UNSIGNED,
            NumericType::U16 => NT_I16 | NT_UNSIGNED,
            NumericType::U32 => NT_I32 | NT_UNSIGNED,
        }
    }

    /// Size of one sample in bytes
    pub fn byte_size(self) -> usize {
        match self {
            NumericType::I8 | NumericType::U8 => 1,
            NumericType::I16 | NumericType::U16 => 2,
            NumericType::F32 | NumericType::I32 | NumericType::U32 => 4,
            NumericType::F64 => 8,
        }
    }
}

/// Decoded wave header fields relevant to time traces
#[derive(Debug, Clone, PartialEq)]
pub struct WaveHeader {
    /// File version
    pub version: IbwVersion,
    /// Byte order the file was written in
    pub byte_order: ByteOrderKind,
    /// Wave name (usually the channel name)
    pub name: String,
    /// Units of the sample values
    pub data_units: String,
    /// Units of the x axis (normally "s")
    pub x_units: String,
    /// Sample storage type
    pub numeric_type: NumericType,
    /// Number of points declared by the header
    pub points: usize,
    /// X value of the first point
    pub x0: f64,
    /// Point spacing along x
    pub dx: f64,
    /// Creation date in seconds since 1904-01-01
    pub creation_date: u32,
}

impl WaveHeader {
    /// Creation time as UTC
    pub fn created_at(&self) -> DateTime<Utc> {
        igor_time_to_utc(self.creation_date)
    }
}

/// Convert Igor seconds-since-1904 into a UTC timestamp
pub fn igor_time_to_utc(seconds: u32) -> DateTime<Utc> {
    DateTime::<Utc>::from_timestamp(seconds as i64 - IGOR_EPOCH_OFFSET, 0).unwrap_or_default()
}

/// Convert a UTC timestamp into Igor seconds-since-1904, clamped to the u32 range
pub fn utc_to_igor_time(time: DateTime<Utc>) -> u32 {
    (time.timestamp() + IGOR_EPOCH_OFFSET).clamp(0, u32::MAX as i64) as u32
}

/// A decoded wave: header plus samples widened to f64
#[derive(Debug, Clone, PartialEq)]
pub struct Wave {
    /// Header fields
    pub header: WaveHeader,
    /// Sample values
    pub values: Vec<f64>,
}

impl Wave {
    /// Build a version 5 little-endian float wave from uniformly spaced samples
    pub fn new(name: impl Into<String>, x0: f64, dx: f64, values: Vec<f64>) -> Self {
        Self {
            header: WaveHeader {
                version: IbwVersion::V5,
                byte_order: ByteOrderKind::Little,
                name: name.into(),
                data_units: String::new(),
                x_units: "s".to_string(),
                numeric_type: NumericType::F32,
                points: values.len(),
                x0,
                dx,
                creation_date: 0,
            },
            values,
        }
    }

    /// Set the value units
    pub fn with_units(mut self, units: impl Into<String>) -> Self {
        self.header.data_units = units.into();
        self
    }

    /// Set the storage type used when encoding
    pub fn with_numeric_type(mut self, numeric_type: NumericType) -> Self {
        self.header.numeric_type = numeric_type;
        self
    }

    /// Set the creation time
    pub fn with_created_at(mut self, time: DateTime<Utc>) -> Self {
        self.header.creation_date = utc_to_igor_time(time);
        self
    }

    /// Set the version and byte order used when encoding
    pub fn with_layout(mut self, version: IbwVersion, byte_order: ByteOrderKind) -> Self {
        self.header.version = version;
        self.header.byte_order = byte_order;
        self
    }

    /// Number of samples
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether the wave has no samples
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Sample times `x0 + i * dx`
    pub fn times(&self) -> Vec<f64> {
        let WaveHeader { x0, dx, .. } = self.header;
        (0..self.values.len()).map(|i| x0 + i as f64 * dx).collect()
    }
}
