//! Binary vehicle position format.
//!
//! A file is a flat run of records with no header or footer. Each record is
//! packed without padding, little-endian:
//!
//! ```text
//! +--------+---------------------+----------+-----------+-----------+
//! | id i32 | registration ... \0 | lat f32  | lon f32   | time u64  |
//! +--------+---------------------+----------+-----------+-----------+
//! ```
//!
//! End of file must coincide with a record boundary. Running out of bytes
//! anywhere inside a record is a [`LocatorError::Truncated`] error.

use crate::error::{LocatorError, Result};
use crate::record::VehicleRecord;
use bytes::{Buf, BufMut, Bytes, BytesMut};
use std::path::Path;

const ID_LEN: usize = 4;
const COORD_LEN: usize = 4;
const TIMESTAMP_LEN: usize = 8;
const FIXED_LEN: usize = ID_LEN + 1 + COORD_LEN * 2 + TIMESTAMP_LEN;

/// Read a whole position file into memory and decode it.
pub fn load_records<P: AsRef<Path>>(path: P) -> Result<Vec<VehicleRecord>> {
    let path = path.as_ref();
    let data = Bytes::from(std::fs::read(path)?);
    log::info!("Read {} bytes from {}", data.len(), path.display());

    let records = decode_records(data)?;
    log::info!("Decoded {} vehicle records", records.len());
    Ok(records)
}

/// Decode every record in `buf`, preserving on-disk order.
pub fn decode_records<B: Buf>(mut buf: B) -> Result<Vec<VehicleRecord>> {
    let total = buf.remaining();
    let mut records = Vec::with_capacity(total / (FIXED_LEN + 8));

    while buf.has_remaining() {
        let offset = total - buf.remaining();
        records.push(decode_record(&mut buf, offset)?);
    }

    Ok(records)
}

fn decode_record<B: Buf>(buf: &mut B, offset: usize) -> Result<VehicleRecord> {
    let truncated = |field| LocatorError::Truncated { field, offset };

    if buf.remaining() < ID_LEN {
        return Err(truncated("id"));
    }
    let id = buf.get_i32_le();

    let registration = read_registration(buf).ok_or_else(|| truncated("registration"))?;

    if buf.remaining() < COORD_LEN {
        return Err(truncated("latitude"));
    }
    let latitude = buf.get_f32_le();

    if buf.remaining() < COORD_LEN {
        return Err(truncated("longitude"));
    }
    let longitude = buf.get_f32_le();

    if buf.remaining() < TIMESTAMP_LEN {
        return Err(truncated("timestamp"));
    }
    let recorded_at = buf.get_u64_le();

    Ok(VehicleRecord {
        id,
        registration,
        latitude,
        longitude,
        recorded_at,
    })
}

/// Reads up to and consuming the zero terminator. `None` if the terminator is missing.
fn read_registration<B: Buf>(buf: &mut B) -> Option<String> {
    let mut text = String::new();
    loop {
        if !buf.has_remaining() {
            return None;
        }
        match buf.get_u8() {
            0 => return Some(text),
            b if b.is_ascii() => text.push(char::from(b)),
            b => {
                log::warn!("Non-ASCII byte 0x{b:02x} in registration, decoding as '?'");
                text.push('?');
            }
        }
    }
}

/// Encode records into the binary layout understood by [`decode_records`].
pub fn encode_records(records: &[VehicleRecord]) -> Result<Bytes> {
    let capacity = records
        .iter()
        .map(|r| FIXED_LEN + r.registration.len())
        .sum();
    let mut buf = BytesMut::with_capacity(capacity);

    for record in records {
        if !record.registration.is_ascii() {
            return Err(LocatorError::InvalidRecord(format!(
                "registration of vehicle {} is not ASCII",
                record.id
            )));
        }
        if record.registration.as_bytes().contains(&0) {
            return Err(LocatorError::InvalidRecord(format!(
                "registration of vehicle {} contains a zero byte",
                record.id
            )));
        }

        buf.put_i32_le(record.id);
        buf.put_slice(record.registration.as_bytes());
        buf.put_u8(0);
        buf.put_f32_le(record.latitude);
        buf.put_f32_le(record.longitude);
        buf.put_u64_le(record.recorded_at);
    }

    Ok(buf.freeze())
}

/// Encode `records` and write them to `path`, replacing any existing file.
pub fn write_records<P: AsRef<Path>>(path: P, records: &[VehicleRecord]) -> Result<()> {
    let data = encode_records(records)?;
    std::fs::write(path, &data)?;
    Ok(())
}
