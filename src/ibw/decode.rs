//! Decoding of Igor binary wave buffers
//!
//! The decoding pipeline is:
//!
//! 1. Detect byte order from the version field
//! 2. Verify the header checksum (16-bit word sum of both headers is zero)
//! 3. Read the header fields for the file version
//! 4. Interpret the data block according to the numeric type

use std::fs;
use std::marker::PhantomData;
use std::path::Path;

use byteorder::{BigEndian, ByteOrder, LittleEndian};
use log::debug;

use super::error::{DecodeError, ReaderError};
use super::header::{
    ByteOrderKind, IbwVersion, NumericType, Wave, WaveHeader, BIN_HEADER_V2_SIZE,
    BIN_HEADER_V5_SIZE, NAME_V2_LEN, NAME_V5_LEN, UNITS_LEN,
};

/// Read and decode a wave file
pub fn read_wave<P: AsRef<Path>>(path: P) -> Result<Wave, ReaderError> {
    let path = path.as_ref();
    let bytes = fs::read(path).map_err(|source| ReaderError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let wave = decode_wave(&bytes).map_err(|e| ReaderError::from_decode(path, e))?;
    debug!(
        "Read {} ({} points, dx = {}) from {}",
        wave.header.name,
        wave.len(),
        wave.header.dx,
        path.display()
    );
    Ok(wave)
}

/// Decode a wave from an in-memory buffer
pub fn decode_wave(bytes: &[u8]) -> Result<Wave, DecodeError> {
    if bytes.len() < 2 {
        return Err(DecodeError::format("file too short for a version field"));
    }
    match ByteOrderKind::detect([bytes[0], bytes[1]]) {
        ByteOrderKind::Little => decode_with::<LittleEndian>(bytes, ByteOrderKind::Little),
        ByteOrderKind::Big => decode_with::<BigEndian>(bytes, ByteOrderKind::Big),
    }
}

/// Decode only the header, without touching the data block
pub fn decode_header(bytes: &[u8]) -> Result<WaveHeader, DecodeError> {
    if bytes.len() < 2 {
        return Err(DecodeError::format("file too short for a version field"));
    }
    match ByteOrderKind::detect([bytes[0], bytes[1]]) {
        ByteOrderKind::Little => header_with::<LittleEndian>(bytes, ByteOrderKind::Little),
        ByteOrderKind::Big => header_with::<BigEndian>(bytes, ByteOrderKind::Big),
    }
}

/// Compute the 16-bit word sum over `bytes` (an odd trailing byte is ignored)
pub fn header_checksum<B: ByteOrder>(bytes: &[u8]) -> i16 {
    bytes
        .chunks_exact(2)
        .fold(0i16, |acc, word| acc.wrapping_add(B::read_i16(word)))
}

/// Fixed-offset field access into a header buffer
struct Fields<'a, B> {
    buf: &'a [u8],
    _order: PhantomData<B>,
}

impl<'a, B: ByteOrder> Fields<'a, B> {
    fn new(buf: &'a [u8]) -> Self {
        Self {
            buf,
            _order: PhantomData,
        }
    }

    fn i16(&self, offset: usize) -> i16 {
        B::read_i16(&self.buf[offset..])
    }

    fn i32(&self, offset: usize) -> i32 {
        B::read_i32(&self.buf[offset..])
    }

    fn u32(&self, offset: usize) -> u32 {
        B::read_u32(&self.buf[offset..])
    }

    fn f64(&self, offset: usize) -> f64 {
        B::read_f64(&self.buf[offset..])
    }

    /// NUL-terminated Latin-1 text field
    fn text(&self, offset: usize, len: usize) -> String {
        self.buf[offset..offset + len]
            .iter()
            .take_while(|&&b| b != 0)
            .map(|&b| b as char)
            .collect()
    }
}

fn header_with<B: ByteOrder>(
    bytes: &[u8],
    byte_order: ByteOrderKind,
) -> Result<WaveHeader, DecodeError> {
    let version = IbwVersion::from_raw(B::read_i16(bytes))?;
    let header_size = version.header_size();
    if bytes.len() < header_size {
        return Err(DecodeError::format(format!(
            "file is {} bytes, shorter than the {}-byte version {} header",
            bytes.len(),
            header_size,
            version.raw()
        )));
    }

    let checksum = header_checksum::<B>(&bytes[..header_size]);
    if checksum != 0 {
        return Err(DecodeError::format(format!(
            "header checksum mismatch (word sum {:#06x})",
            checksum as u16
        )));
    }

    let fields = Fields::<B>::new(bytes);
    let header = match version {
        IbwVersion::V2 => read_v2(&fields, byte_order)?,
        IbwVersion::V5 => read_v5(&fields, byte_order)?,
    };

    if !header.dx.is_finite() || header.dx <= 0.0 {
        return Err(DecodeError::format(format!(
            "point spacing must be finite and positive, got {}",
            header.dx
        )));
    }
    if !header.x0.is_finite() {
        return Err(DecodeError::format("start time is not finite"));
    }
    Ok(header)
}

fn read_v2<B: ByteOrder>(
    fields: &Fields<'_, B>,
    byte_order: ByteOrderKind,
) -> Result<WaveHeader, DecodeError> {
    let w = BIN_HEADER_V2_SIZE;
    let numeric_type = NumericType::from_code(fields.i16(w))?;
    let points = fields.i32(w + 42);
    if points < 0 {
        return Err(DecodeError::format(format!("negative point count {}", points)));
    }
    Ok(WaveHeader {
        version: IbwVersion::V2,
        byte_order,
        name: fields.text(w + 6, NAME_V2_LEN),
        data_units: fields.text(w + 34, UNITS_LEN),
        x_units: fields.text(w + 38, UNITS_LEN),
        numeric_type,
        points: points as usize,
        dx: fields.f64(w + 48),
        x0: fields.f64(w + 56),
        creation_date: fields.u32(w + 96),
    })
}

fn read_v5<B: ByteOrder>(
    fields: &Fields<'_, B>,
    byte_order: ByteOrderKind,
) -> Result<WaveHeader, DecodeError> {
    let w = BIN_HEADER_V5_SIZE;
    let points = fields.i32(w + 12);
    if points < 0 {
        return Err(DecodeError::format(format!("negative point count {}", points)));
    }
    let numeric_type = NumericType::from_code(fields.i16(w + 16))?;

    // A time trace uses only the row dimension
    let higher_dims: Vec<i32> = (1..4).map(|d| fields.i32(w + 68 + 4 * d)).collect();
    if higher_dims.iter().any(|&n| n > 0) {
        return Err(DecodeError::format(format!(
            "multi-dimensional wave (dims {} x {:?}) is not a time trace",
            fields.i32(w + 68),
            higher_dims
        )));
    }

    Ok(WaveHeader {
        version: IbwVersion::V5,
        byte_order,
        name: fields.text(w + 28, NAME_V5_LEN),
        data_units: fields.text(w + 148, UNITS_LEN),
        x_units: fields.text(w + 152, UNITS_LEN),
        numeric_type,
        points: points as usize,
        dx: fields.f64(w + 84),
        x0: fields.f64(w + 116),
        creation_date: fields.u32(w + 4),
    })
}

fn decode_with<B: ByteOrder>(bytes: &[u8], byte_order: ByteOrderKind) -> Result<Wave, DecodeError> {
    let header = header_with::<B>(bytes, byte_order)?;
    let data = &bytes[header.version.header_size()..];
    let size = header.numeric_type.byte_size();

    let available = data.len() / size;
    if available < header.points {
        return Err(DecodeError::Truncated {
            declared: header.points,
            available,
        });
    }

    let data = &data[..header.points * size];
    let values = match header.numeric_type {
        NumericType::F32 => data.chunks_exact(4).map(|c| B::read_f32(c) as f64).collect(),
        NumericType::F64 => data.chunks_exact(8).map(B::read_f64).collect(),
        NumericType::I8 => data.iter().map(|&b| b as i8 as f64).collect(),
        NumericType::U8 => data.iter().map(|&b| b as f64).collect(),
        NumericType::I16 => data.chunks_exact(2).map(|c| B::read_i16(c) as f64).collect(),
        NumericType::U16 => data.chunks_exact(2).map(|c| B::read_u16(c) as f64).collect(),
        NumericType::I32 => data.chunks_exact(4).map(|c| B::read_i32(c) as f64).collect(),
        NumericType::U32 => data.chunks_exact(4).map(|c| B::read_u32(c) as f64).collect(),
    };

    Ok(Wave { header, values })
}
