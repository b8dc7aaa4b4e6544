use byteorder::{BigEndian, ByteOrder, LittleEndian};

use super::decode::header_checksum;
use super::header::{
    ByteOrderKind, IbwVersion, NumericType, Wave, BIN_HEADER_V2_SIZE, BIN_HEADER_V5_SIZE,
    NAME_V2_LEN, NAME_V5_LEN, UNITS_LEN, WAVE_HEADER_V2_SIZE, WAVE_HEADER_V5_SIZE,
};

/// Encode a wave using the version and byte order recorded in its header.
///
/// Values are cast to the header's numeric type; integer types saturate.
pub fn encode_wave(wave: &Wave) -> Vec<u8> {
    match wave.header.byte_order {
        ByteOrderKind::Little => encode_with::<LittleEndian>(wave),
        ByteOrderKind::Big => encode_with::<BigEndian>(wave),
    }
}

fn put_text(buf: &mut [u8], offset: usize, len: usize, text: &str) {
    let bytes = text
        .chars()
        .map(|c| if (c as u32) < 256 { c as u8 } else { b'?' })
        .take(len - 1);
    for (slot, b) in buf[offset..offset + len].iter_mut().zip(bytes) {
        *slot = b;
    }
}

fn encode_data<B: ByteOrder>(values: &[f64], numeric_type: NumericType) -> Vec<u8> {
    let mut data = vec![0u8; values.len() * numeric_type.byte_size()];
    let size = numeric_type.byte_size();
    for (chunk, &v) in data.chunks_exact_mut(size).zip(values) {
        match numeric_type {
            NumericType::F32 => B::write_f32(chunk, v as f32),
            NumericType::F64 => B::write_f64(chunk, v),
            NumericType::I8 => chunk[0] = (v as i8) as u8,
            NumericType::U8 => chunk[0] = v as u8,
            NumericType::I16 => B::write_i16(chunk, v as i16),
            NumericType::U16 => B::write_u16(chunk, v as u16),
            NumericType::I32 => B::write_i32(chunk, v as i32),
            NumericType::U32 => B::write_u32(chunk, v as u32),
        }
    }
    data
}

fn encode_with<B: ByteOrder>(wave: &Wave) -> Vec<u8> {
    let h = &wave.header;
    let data = encode_data::<B>(&wave.values, h.numeric_type);
    let points = wave.values.len() as i32;
    let header_size = h.version.header_size();
    let mut buf = vec![0u8; header_size];

    match h.version {
        IbwVersion::V2 => {
            B::write_i16(&mut buf[0..], 2);
            B::write_i32(&mut buf[2..], (WAVE_HEADER_V2_SIZE + data.len()) as i32);
            let w = BIN_HEADER_V2_SIZE;
            B::write_i16(&mut buf[w..], h.numeric_type.code());
            put_text(&mut buf, w + 6, NAME_V2_LEN, &h.name);
            put_text(&mut buf, w + 34, UNITS_LEN, &h.data_units);
            put_text(&mut buf, w + 38, UNITS_LEN, &h.x_units);
            B::write_i32(&mut buf[w + 42..], points);
            B::write_f64(&mut buf[w + 48..], h.dx);
            B::write_f64(&mut buf[w + 56..], h.x0);
            B::write_u32(&mut buf[w + 96..], h.creation_date);
            B::write_u32(&mut buf[w + 102..], h.creation_date);
        }
        IbwVersion::V5 => {
            B::write_i16(&mut buf[0..], 5);
            B::write_i32(&mut buf[4..], (WAVE_HEADER_V5_SIZE + data.len()) as i32);
            let w = BIN_HEADER_V5_SIZE;
            B::write_u32(&mut buf[w + 4..], h.creation_date);
            B::write_u32(&mut buf[w + 8..], h.creation_date);
            B::write_i32(&mut buf[w + 12..], points);
            B::write_i16(&mut buf[w + 16..], h.numeric_type.code());
            B::write_i16(&mut buf[w + 26..], 1);
            put_text(&mut buf, w + 28, NAME_V5_LEN, &h.name);
            B::write_i32(&mut buf[w + 68..], points);
            B::write_f64(&mut buf[w + 84..], h.dx);
            for dim in 1..4 {
                B::write_f64(&mut buf[w + 84 + 8 * dim..], 1.0);
            }
            B::write_f64(&mut buf[w + 116..], h.x0);
            put_text(&mut buf, w + 148, UNITS_LEN, &h.data_units);
            put_text(&mut buf, w + 152, UNITS_LEN, &h.x_units);
        }
    }

    let sum = header_checksum::<B>(&buf);
    B::write_i16(&mut buf[h.version.checksum_offset()..], sum.wrapping_neg());

    buf.extend_from_slice(&data);
    buf
}
