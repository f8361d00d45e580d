//! Type-erased pixel buffers.
//!
//! [`VariantPixelBuffer`] holds exactly one [`PixelBuffer`] whose element
//! type is chosen at runtime from a [`PixelType`]. Type-independent queries
//! are dispatched to the held buffer; typed access checks the requested
//! representation and fails with [`PixelError::TypeMismatch`] rather than
//! converting.
//!
//! Generic algorithms are written once against [`PixelBufferVisitor`] (or
//! [`PixelBufferVisitorMut`]) and instantiated for every representation by
//! [`VariantPixelBuffer::apply_visitor`].

use num_complex::Complex;

use crate::dimension::IndexedDimensionStorage;
use crate::error::PixelError;

use super::buffer::{default_storage_order, PixelBuffer, PixelIndices, PixelShape, PIXEL_DIMENSIONS};
use super::types::{EndianType, Pixel, PixelType};

// =============================================================================
// Visitor Traits
// =============================================================================

/// A generic operation over a shared typed buffer.
pub trait PixelBufferVisitor {
    type Output;

    fn visit<T: Pixel>(self, buffer: &PixelBuffer<'_, T>) -> Self::Output;
}

/// A generic operation over a mutable typed buffer.
pub trait PixelBufferVisitorMut {
    type Output;

    fn visit<T: Pixel>(self, buffer: &mut PixelBuffer<'_, T>) -> Self::Output;
}

// =============================================================================
// VariantPixelBuffer
// =============================================================================

/// A pixel buffer of any supported representation.
#[derive(Debug)]
pub enum VariantPixelBuffer<'a> {
    Int8(PixelBuffer<'a, i8>),
    Int16(PixelBuffer<'a, i16>),
    Int32(PixelBuffer<'a, i32>),
    Uint8(PixelBuffer<'a, u8>),
    Uint16(PixelBuffer<'a, u16>),
    Uint32(PixelBuffer<'a, u32>),
    Float(PixelBuffer<'a, f32>),
    Double(PixelBuffer<'a, f64>),
    Bit(PixelBuffer<'a, bool>),
    Complex(PixelBuffer<'a, Complex<f32>>),
    DoubleComplex(PixelBuffer<'a, Complex<f64>>),
}

macro_rules! dispatch {
    ($value:expr, $buffer:ident => $body:expr) => {
        match $value {
            VariantPixelBuffer::Int8($buffer) => $body,
            VariantPixelBuffer::Int16($buffer) => $body,
            VariantPixelBuffer::Int32($buffer) => $body,
            VariantPixelBuffer::Uint8($buffer) => $body,
            VariantPixelBuffer::Uint16($buffer) => $body,
            VariantPixelBuffer::Uint32($buffer) => $body,
            VariantPixelBuffer::Float($buffer) => $body,
            VariantPixelBuffer::Double($buffer) => $body,
            VariantPixelBuffer::Bit($buffer) => $body,
            VariantPixelBuffer::Complex($buffer) => $body,
            VariantPixelBuffer::DoubleComplex($buffer) => $body,
        }
    };
}

fn allocate<T: Pixel>(
    shape: PixelShape,
    order: &[IndexedDimensionStorage],
) -> Result<VariantPixelBuffer<'static>, PixelError> {
    Ok(T::into_variant(PixelBuffer::<T>::new(shape, order)?))
}

impl VariantPixelBuffer<'static> {
    /// Allocate a zero-initialised buffer of `pixel_type`.
    ///
    /// # Arguments
    ///
    /// * `shape` - Extent of each of the nine dimensions
    /// * `pixel_type` - Runtime pixel representation
    /// * `order` - Storage order, e.g. from [`make_storage_order`](super::make_storage_order)
    ///
    /// # Errors
    ///
    /// Fails if any extent is zero or the storage order is invalid.
    pub fn new(
        shape: PixelShape,
        pixel_type: PixelType,
        order: &[IndexedDimensionStorage],
    ) -> Result<Self, PixelError> {
        match pixel_type {
            PixelType::Int8 => allocate::<i8>(shape, order),
            PixelType::Int16 => allocate::<i16>(shape, order),
            PixelType::Int32 => allocate::<i32>(shape, order),
            PixelType::Uint8 => allocate::<u8>(shape, order),
            PixelType::Uint16 => allocate::<u16>(shape, order),
            PixelType::Uint32 => allocate::<u32>(shape, order),
            PixelType::Float => allocate::<f32>(shape, order),
            PixelType::Double => allocate::<f64>(shape, order),
            PixelType::Bit => allocate::<bool>(shape, order),
            PixelType::Complex => allocate::<Complex<f32>>(shape, order),
            PixelType::DoubleComplex => allocate::<Complex<f64>>(shape, order),
        }
    }

    /// Allocate a buffer with the default interleaved storage order.
    pub fn with_default_order(
        shape: PixelShape,
        pixel_type: PixelType,
    ) -> Result<Self, PixelError> {
        Self::new(shape, pixel_type, &default_storage_order())
    }
}

impl<'a> VariantPixelBuffer<'a> {
    // -------------------------------------------------------------------------
    // Introspection
    // -------------------------------------------------------------------------

    pub fn pixel_type(&self) -> PixelType {
        dispatch!(self, b => b.pixel_type())
    }

    pub fn shape(&self) -> PixelShape {
        dispatch!(self, b => b.shape())
    }

    pub fn strides(&self) -> [isize; PIXEL_DIMENSIONS] {
        dispatch!(self, b => b.strides())
    }

    pub fn index_bases(&self) -> [usize; PIXEL_DIMENSIONS] {
        dispatch!(self, b => b.index_bases())
    }

    pub fn storage_order(&self) -> &[IndexedDimensionStorage] {
        dispatch!(self, b => b.storage_order())
    }

    pub fn num_elements(&self) -> usize {
        dispatch!(self, b => b.num_elements())
    }

    pub fn num_dimensions(&self) -> usize {
        dispatch!(self, b => b.num_dimensions())
    }

    pub fn origin(&self) -> usize {
        dispatch!(self, b => b.origin())
    }

    pub fn managed(&self) -> bool {
        dispatch!(self, b => b.managed())
    }

    /// Number of bytes in the raw representation.
    pub fn byte_len(&self) -> usize {
        dispatch!(self, b => b.byte_len())
    }

    // -------------------------------------------------------------------------
    // Typed access
    // -------------------------------------------------------------------------

    /// Borrow the held buffer as `PixelBuffer<T>`.
    ///
    /// # Errors
    ///
    /// Returns [`PixelError::TypeMismatch`] if the buffer holds another
    /// representation.
    pub fn buffer<T: Pixel>(&self) -> Result<&PixelBuffer<'a, T>, PixelError> {
        let actual = self.pixel_type();
        T::from_variant(self).ok_or(PixelError::TypeMismatch {
            expected: actual,
            actual: T::PIXEL_TYPE,
        })
    }

    pub fn buffer_mut<T: Pixel>(&mut self) -> Result<&mut PixelBuffer<'a, T>, PixelError> {
        let actual = self.pixel_type();
        T::from_variant_mut(self).ok_or(PixelError::TypeMismatch {
            expected: actual,
            actual: T::PIXEL_TYPE,
        })
    }

    /// Elements in physical storage order.
    pub fn data<T: Pixel>(&self) -> Result<&[T], PixelError> {
        Ok(self.buffer::<T>()?.data())
    }

    pub fn at<T: Pixel>(&self, indices: &PixelIndices) -> Result<&T, PixelError> {
        self.buffer::<T>()?.at(indices)
    }

    pub fn at_mut<T: Pixel>(&mut self, indices: &PixelIndices) -> Result<&mut T, PixelError> {
        self.buffer_mut::<T>()?.at_mut(indices)
    }

    // -------------------------------------------------------------------------
    // Assignment
    // -------------------------------------------------------------------------

    /// Replace every element from a sequence of `T`, in storage order.
    ///
    /// # Errors
    ///
    /// Fails with [`PixelError::TypeMismatch`] unless `T` is exactly the held
    /// representation, or with [`PixelError::ElementCount`] on a length
    /// mismatch.
    pub fn assign<T, I>(&mut self, values: I) -> Result<(), PixelError>
    where
        T: Pixel,
        I: IntoIterator<Item = T>,
    {
        self.buffer_mut::<T>()?.assign(values)
    }

    /// Copy the contents of another buffer.
    ///
    /// Both buffers must hold the same representation and shape. Storage
    /// orders may differ; values are matched by logical index.
    pub fn assign_from(&mut self, other: &VariantPixelBuffer<'_>) -> Result<(), PixelError> {
        use VariantPixelBuffer as V;

        match (self, other) {
            (V::Int8(a), V::Int8(b)) => a.copy_from(b),
            (V::Int16(a), V::Int16(b)) => a.copy_from(b),
            (V::Int32(a), V::Int32(b)) => a.copy_from(b),
            (V::Uint8(a), V::Uint8(b)) => a.copy_from(b),
            (V::Uint16(a), V::Uint16(b)) => a.copy_from(b),
            (V::Uint32(a), V::Uint32(b)) => a.copy_from(b),
            (V::Float(a), V::Float(b)) => a.copy_from(b),
            (V::Double(a), V::Double(b)) => a.copy_from(b),
            (V::Bit(a), V::Bit(b)) => a.copy_from(b),
            (V::Complex(a), V::Complex(b)) => a.copy_from(b),
            (V::DoubleComplex(a), V::DoubleComplex(b)) => a.copy_from(b),
            (target, source) => Err(PixelError::TypeMismatch {
                expected: target.pixel_type(),
                actual: source.pixel_type(),
            }),
        }
    }

    /// Owned copy with the same representation and layout.
    pub fn to_managed(&self) -> VariantPixelBuffer<'static> {
        dispatch!(self, b => Pixel::into_variant(b.to_managed()))
    }

    // -------------------------------------------------------------------------
    // Raw bytes
    // -------------------------------------------------------------------------

    /// Fill from raw bytes in physical storage order.
    pub fn read_bytes(&mut self, bytes: &[u8], endian: EndianType) -> Result<(), PixelError> {
        dispatch!(self, b => b.read_bytes(bytes, endian))
    }

    /// Write raw bytes in physical storage order.
    pub fn write_bytes(&self, out: &mut [u8], endian: EndianType) -> Result<(), PixelError> {
        dispatch!(self, b => b.write_bytes(out, endian))
    }

    // -------------------------------------------------------------------------
    // Visitor dispatch
    // -------------------------------------------------------------------------

    /// Run a generic operation against the held buffer.
    pub fn apply_visitor<V: PixelBufferVisitor>(&self, visitor: V) -> V::Output {
        dispatch!(self, b => visitor.visit(b))
    }

    /// Run a generic mutating operation against the held buffer.
    pub fn apply_visitor_mut<V: PixelBufferVisitorMut>(&mut self, visitor: V) -> V::Output {
        dispatch!(self, b => visitor.visit(b))
    }
}

impl<'a, T: Pixel> From<PixelBuffer<'a, T>> for VariantPixelBuffer<'a> {
    fn from(buffer: PixelBuffer<'a, T>) -> Self {
        T::into_variant(buffer)
    }
}

/// Buffers of different representations are never equal.
impl PartialEq for VariantPixelBuffer<'_> {
    fn eq(&self, other: &Self) -> bool {
        use VariantPixelBuffer as V;

        match (self, other) {
            (V::Int8(a), V::Int8(b)) => a == b,
            (V::Int16(a), V::Int16(b)) => a == b,
            (V::Int32(a), V::Int32(b)) => a == b,
            (V::Uint8(a), V::Uint8(b)) => a == b,
            (V::Uint16(a), V::Uint16(b)) => a == b,
            (V::Uint32(a), V::Uint32(b)) => a == b,
            (V::Float(a), V::Float(b)) => a == b,
            (V::Double(a), V::Double(b)) => a == b,
            (V::Bit(a), V::Bit(b)) => a == b,
            (V::Complex(a), V::Complex(b)) => a == b,
            (V::DoubleComplex(a), V::DoubleComplex(b)) => a == b,
            _ => false,
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
