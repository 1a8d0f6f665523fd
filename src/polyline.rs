use serde::{Deserialize, Serialize};

use crate::entities::Coordinate;
use crate::error::{malformed_polyline_error, Error};

const PRECISION: f64 = 1e5;
const CHUNK_BITS: u32 = 5;
const CHUNK_MASK: i64 = 0x1f;
const CONTINUATION: u8 = 0x20;
const ASCII_OFFSET: u8 = 63;
const MAX_SHIFT: u32 = 60;

#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EncodedPolyline(String);

impl EncodedPolyline {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn empty() -> Self {
        Self(String::new())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn decode(&self) -> Result<Vec<Coordinate>, Error> {
        decode(self.as_str())
    }
}

pub fn encode(points: &[Coordinate]) -> EncodedPolyline {
    let mut out = String::with_capacity(points.len() * 8);
    let mut previous = (0i64, 0i64);

    for point in points {
        let latitude = scale(point.latitude());
        let longitude = scale(point.longitude());

        encode_value(latitude - previous.0, &mut out);
        encode_value(longitude - previous.1, &mut out);

        previous = (latitude, longitude);
    }

    EncodedPolyline(out)
}

pub fn decode(encoded: &str) -> Result<Vec<Coordinate>, Error> {
    let bytes = encoded.as_bytes();
    let mut points = Vec::with_capacity(bytes.len() / 8);
    let mut cursor = 0;
    let mut latitude = 0i64;
    let mut longitude = 0i64;

    while cursor < bytes.len() {
        let start = cursor;

        latitude += decode_value(bytes, &mut cursor)?;

        if cursor >= bytes.len() {
            return Err(malformed_polyline_error(
                cursor,
                "latitude without a longitude",
            ));
        }

        longitude += decode_value(bytes, &mut cursor)?;

        let point = Coordinate::new(latitude as f64 / PRECISION, longitude as f64 / PRECISION)
            .map_err(|_| malformed_polyline_error(start, "coordinate out of range"))?;

        points.push(point);
    }

    Ok(points)
}

fn scale(degrees: f64) -> i64 {
    debug_assert!(degrees.is_finite(), "non-finite coordinate reached encoder");

    (degrees * PRECISION).round() as i64
}

fn encode_value(delta: i64, out: &mut String) {
    let mut value = delta << 1;
    if delta < 0 {
        value = !value;
    }

    while value >= CONTINUATION as i64 {
        let chunk = (CONTINUATION as i64 | (value & CHUNK_MASK)) as u8;
        out.push((chunk + ASCII_OFFSET) as char);
        value >>= CHUNK_BITS;
    }

    out.push((value as u8 + ASCII_OFFSET) as char);
}

fn decode_value(bytes: &[u8], cursor: &mut usize) -> Result<i64, Error> {
    let mut result = 0i64;
    let mut shift = 0u32;

    loop {
        let position = *cursor;
        let byte = match bytes.get(position) {
            Some(byte) => *byte,
            None => {
                return Err(malformed_polyline_error(
                    position,
                    "dangling continuation chunk",
                ))
            }
        };

        if !(ASCII_OFFSET..=ASCII_OFFSET + 63).contains(&byte) {
            return Err(malformed_polyline_error(position, "byte out of range"));
        }

        if shift > MAX_SHIFT {
            return Err(malformed_polyline_error(position, "value overflows 64 bits"));
        }

        let chunk = byte - ASCII_OFFSET;
        result |= ((chunk as i64) & CHUNK_MASK) << shift;
        shift += CHUNK_BITS;
        *cursor += 1;

        if chunk & CONTINUATION == 0 {
            break;
        }
    }

    // zig-zag
    if result & 1 == 1 {
        Ok(!(result >> 1))
    } else {
        Ok(result >> 1)
    }
}
