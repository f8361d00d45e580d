//! Generic operations dispatched over every pixel representation.

use super::buffer::PixelBuffer;
use super::types::{EndianType, Pixel};
use super::variant::PixelBufferVisitor;

/// Minimum and maximum of a buffer, as ordering keys.
///
/// Complex buffers are ordered by their real component.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ValueRange {
    pub min: f64,
    pub max: f64,
}

/// Computes the [`ValueRange`] of a buffer. NaN values are skipped.
#[derive(Debug, Clone, Copy, Default)]
pub struct MinMaxVisitor;

impl PixelBufferVisitor for MinMaxVisitor {
    type Output = Option<ValueRange>;

    fn visit<T: Pixel>(self, buffer: &PixelBuffer<'_, T>) -> Self::Output {
        buffer
            .data()
            .iter()
            .map(|value| value.sort_key())
            .filter(|key| !key.is_nan())
            .fold(None, |range, key| match range {
                None => Some(ValueRange { min: key, max: key }),
                Some(ValueRange { min, max }) => Some(ValueRange {
                    min: min.min(key),
                    max: max.max(key),
                }),
            })
    }
}

/// Encodes a buffer to raw bytes in physical storage order.
#[derive(Debug, Clone, Copy, Default)]
pub struct ToBytesVisitor {
    pub endian: EndianType,
}

impl ToBytesVisitor {
    pub fn new(endian: EndianType) -> Self {
        Self { endian }
    }
}

impl PixelBufferVisitor for ToBytesVisitor {
    type Output = Vec<u8>;

    fn visit<T: Pixel>(self, buffer: &PixelBuffer<'_, T>) -> Vec<u8> {
        buffer.to_bytes(self.endian)
    }
}
