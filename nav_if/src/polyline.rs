//! # Encoded polylines
//!
//! Decoder (and encoder) for the encoded polyline format used by the directions service for the
//! route overview geometry. Each coordinate is stored as the delta from the previous one,
//! multiplied by `10^precision`, zig-zag encoded and split into 5 bit chunks offset by 63.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use thiserror::Error;

use crate::coord::Coordinate;

// ------------------------------------------------------------------------------------------------
// CONSTANTS
// ------------------------------------------------------------------------------------------------

/// Precision used by Google encoded polylines (5 decimal places).
pub const GOOGLE_PRECISION: u32 = 5;

/// Offset added to each 5 bit chunk to make it printable.
const CHUNK_OFFSET: u8 = 63;

/// Continuation bit of a chunk.
const CONTINUATION_BIT: i64 = 0x20;

/// Maximum shift before a single value is considered malformed.
const MAX_SHIFT: u32 = 60;

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

#[derive(Debug, Error, Clone, PartialEq)]
pub enum PolylineError {
    #[error("The polyline ended in the middle of a value")]
    UnexpectedEnd,

    #[error("The polyline contains an invalid character {0:?} at position {1}")]
    InvalidCharacter(char, usize),

    #[error("The polyline value starting at position {0} is too long")]
    ValueTooLong(usize),

    #[error("The polyline value starting at position {0} overflows the accumulated coordinate")]
    Overflow(usize),
}

// ------------------------------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ------------------------------------------------------------------------------------------------

/// Decode an encoded polyline into a sequence of coordinates.
///
/// An empty string decodes into an empty sequence.
pub fn decode_polyline(encoded: &str, precision: u32) -> Result<Vec<Coordinate>, PolylineError> {
    let factor = 10f64.powi(precision as i32);
    let bytes = encoded.as_bytes();

    let mut index = 0;
    let mut lat: i64 = 0;
    let mut lon: i64 = 0;
    let mut coords = Vec::new();

    while index < bytes.len() {
        lat = accumulate(lat, bytes, &mut index)?;
        lon = accumulate(lon, bytes, &mut index)?;

        coords.push(Coordinate::new(lat as f64 / factor, lon as f64 / factor));
    }

    Ok(coords)
}

/// Encode a sequence of coordinates into a polyline string.
pub fn encode_polyline(coords: &[Coordinate], precision: u32) -> String {
    let factor = 10f64.powi(precision as i32);

    let mut encoded = String::new();
    let mut prev_lat: i64 = 0;
    let mut prev_lon: i64 = 0;

    for c in coords {
        let lat = (c.lat_deg * factor).round() as i64;
        let lon = (c.lon_deg * factor).round() as i64;

        encode_value(lat - prev_lat, &mut encoded);
        encode_value(lon - prev_lon, &mut encoded);

        prev_lat = lat;
        prev_lon = lon;
    }

    encoded
}

// ------------------------------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ------------------------------------------------------------------------------------------------

/// Decode the next value as a delta and add it to `total`.
fn accumulate(total: i64, bytes: &[u8], index: &mut usize) -> Result<i64, PolylineError> {
    let start = *index;
    let delta = decode_value(bytes, index)?;

    total
        .checked_add(delta)
        .ok_or(PolylineError::Overflow(start))
}

/// Decode a single zig-zag encoded value starting at `index`, advancing the index past it.
fn decode_value(bytes: &[u8], index: &mut usize) -> Result<i64, PolylineError> {
    let start = *index;
    let mut result: i64 = 0;
    let mut shift: u32 = 0;

    loop {
        let byte = match bytes.get(*index) {
            Some(b) => *b,
            None => return Err(PolylineError::UnexpectedEnd),
        };

        if !(CHUNK_OFFSET..=126).contains(&byte) {
            return Err(PolylineError::InvalidCharacter(byte as char, *index));
        }

        let chunk = (byte - CHUNK_OFFSET) as i64;
        *index += 1;

        result |= (chunk & 0x1f) << shift;
        shift += 5;

        if chunk < CONTINUATION_BIT {
            break;
        }

        if shift > MAX_SHIFT {
            return Err(PolylineError::ValueTooLong(start));
        }
    }

    // Undo the zig-zag encoding, odd values are negative
    if result & 1 != 0 {
        Ok(!(result >> 1))
    } else {
        Ok(result >> 1)
    }
}

fn encode_value(value: i64, out: &mut String) {
    let mut v = if value < 0 { !(value << 1) } else { value << 1 };

    while v >= CONTINUATION_BIT {
        out.push((((v & 0x1f) | CONTINUATION_BIT) as u8 + CHUNK_OFFSET) as char);
        v >>= 5;
    }
    out.push((v as u8 + CHUNK_OFFSET) as char);
}
