//! Pixel buffer integration tests.
//!
//! Tests verify:
//! - Every pixel type survives assignment and visitor read-back unchanged
//! - Type and shape mismatches fail instead of converting
//! - Buffers with different storage orders compare and copy by logical value
//! - Borrowed buffers write through to caller storage

use num_complex::Complex;

use ome_tiling::{
    make_storage_order, DimensionOrder, EndianType, MinMaxVisitor, Pixel, PixelBuffer,
    PixelBufferVisitor, PixelError, PixelShape, PixelType, ToBytesVisitor, ValueRange,
    VariantPixelBuffer,
};

const SHAPE: PixelShape = [3, 2, 1, 1, 2, 2, 1, 1, 1];
const COUNT: usize = 24;

/// Reports the pixel type a visitor was instantiated for.
struct TypeOf;

impl PixelBufferVisitor for TypeOf {
    type Output = PixelType;

    fn visit<T: Pixel>(self, _buffer: &PixelBuffer<'_, T>) -> PixelType {
        T::PIXEL_TYPE
    }
}

fn round_trip<T: Pixel>(values: Vec<T>) {
    assert_eq!(values.len(), COUNT);
    let mut buffer = VariantPixelBuffer::with_default_order(SHAPE, T::PIXEL_TYPE).unwrap();
    buffer.assign(values.clone()).unwrap();

    assert_eq!(buffer.apply_visitor(TypeOf), T::PIXEL_TYPE);
    assert_eq!(buffer.data::<T>().unwrap(), values.as_slice());

    let mut expected = vec![0u8; COUNT * T::SIZE];
    for (value, raw) in values.iter().zip(expected.chunks_exact_mut(T::SIZE)) {
        value.to_bytes(raw, EndianType::Little);
    }
    assert_eq!(buffer.apply_visitor(ToBytesVisitor::new(EndianType::Little)), expected);
}

// =============================================================================
// Round Trips
// =============================================================================

#[test]
fn test_round_trip_every_pixel_type() {
    let n = 0..COUNT;
    round_trip::<i8>(n.clone().map(|i| i as i8 - 12).collect());
    round_trip::<i16>(n.clone().map(|i| i as i16 * -300).collect());
    round_trip::<i32>(n.clone().map(|i| i as i32 * 100_000 - 7).collect());
    round_trip::<u8>(n.clone().map(|i| i as u8 * 10).collect());
    round_trip::<u16>(n.clone().map(|i| i as u16 * 2_000).collect());
    round_trip::<u32>(n.clone().map(|i| i as u32 * 150_000_000).collect());
    round_trip::<f32>(n.clone().map(|i| i as f32 * 0.25).collect());
    round_trip::<f64>(n.clone().map(|i| i as f64 / 3.0).collect());
    round_trip::<bool>(n.clone().map(|i| i % 3 == 0).collect());
    round_trip::<Complex<f32>>(n.clone().map(|i| Complex::new(i as f32, -(i as f32))).collect());
    round_trip::<Complex<f64>>(n.map(|i| Complex::new(i as f64 * 0.5, 1.0)).collect());
}

#[test]
fn test_every_tag_allocates() {
    for pixel_type in PixelType::ALL {
        let buffer = VariantPixelBuffer::with_default_order(SHAPE, pixel_type).unwrap();
        assert_eq!(buffer.pixel_type(), pixel_type);
        assert_eq!(buffer.apply_visitor(TypeOf), pixel_type);
        assert_eq!(buffer.num_elements(), COUNT);
        assert_eq!(buffer.num_dimensions(), 9);
        assert_eq!(buffer.index_bases(), [0; 9]);
        assert!(buffer.managed());
    }
}

// =============================================================================
// Mismatches
// =============================================================================

#[test]
fn test_assign_wrong_type_fails() {
    let mut buffer = VariantPixelBuffer::with_default_order(SHAPE, PixelType::Uint16).unwrap();
    assert_eq!(
        buffer.assign(vec![0u8; COUNT]),
        Err(PixelError::TypeMismatch {
            expected: PixelType::Uint16,
            actual: PixelType::Uint8,
        })
    );
    assert!(matches!(
        buffer.assign(vec![0u16; COUNT - 1]),
        Err(PixelError::ElementCount { .. })
    ));
}

#[test]
fn test_assign_from_mismatch_fails() {
    let mut target = VariantPixelBuffer::with_default_order(SHAPE, PixelType::Float).unwrap();
    let other_type = VariantPixelBuffer::with_default_order(SHAPE, PixelType::Double).unwrap();
    assert!(matches!(
        target.assign_from(&other_type),
        Err(PixelError::TypeMismatch { .. })
    ));

    let mut other_shape = SHAPE;
    other_shape[0] = 4;
    let other = VariantPixelBuffer::with_default_order(other_shape, PixelType::Float).unwrap();
    assert!(matches!(
        target.assign_from(&other),
        Err(PixelError::ShapeMismatch { .. })
    ));
    assert_ne!(target, other_type);
}

// =============================================================================
// Storage Orders
// =============================================================================

#[test]
fn test_assign_from_reorders() {
    let chunky = make_storage_order(DimensionOrder::XYZTC, true);
    let planar = make_storage_order(DimensionOrder::XYCZT, false);

    let mut source = VariantPixelBuffer::new(SHAPE, PixelType::Int32, &chunky).unwrap();
    source.assign((0..COUNT as i32).collect::<Vec<_>>()).unwrap();

    let mut target = VariantPixelBuffer::new(SHAPE, PixelType::Int32, &planar).unwrap();
    target.assign_from(&source).unwrap();

    assert_eq!(target, source);
    assert_ne!(target.data::<i32>().unwrap(), source.data::<i32>().unwrap());
    let index = [2, 1, 0, 0, 1, 1, 0, 0, 0];
    assert_eq!(target.at::<i32>(&index).unwrap(), source.at::<i32>(&index).unwrap());
}

#[test]
fn test_borrowed_buffer_writes_through() {
    let mut storage = vec![0u16; COUNT];
    {
        let order = make_storage_order(DimensionOrder::XYZTC, true);
        let mut buffer = PixelBuffer::from_slice(&mut storage, SHAPE, &order).unwrap();
        assert!(!buffer.managed());
        *buffer.at_mut(&[0, 0, 0, 0, 0, 1, 0, 0, 0]).unwrap() = 42;

        let variant = VariantPixelBuffer::from(buffer);
        assert!(!variant.managed());
        assert!(variant.to_managed().managed());
    }
    assert_eq!(storage[1], 42);
}

// =============================================================================
// Visitors
// =============================================================================

#[test]
fn test_min_max_visitor() {
    let mut buffer =
        VariantPixelBuffer::with_default_order(SHAPE, PixelType::DoubleComplex).unwrap();
    let values: Vec<Complex<f64>> = (0..COUNT)
        .map(|i| Complex::new(i as f64 - 10.0, 100.0 - i as f64))
        .collect();
    buffer.assign(values).unwrap();

    assert_eq!(
        buffer.apply_visitor(MinMaxVisitor),
        Some(ValueRange {
            min: -10.0,
            max: 13.0
        })
    );
}
