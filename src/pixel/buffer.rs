//! Typed nine-dimensional pixel buffers.
//!
//! A [`PixelBuffer`] stores elements of one concrete [`Pixel`] type and maps
//! nine-dimensional indices onto its storage through a [`DimensionSpace`].
//! Storage is either owned by the buffer or borrowed from the caller; the
//! borrow is tracked by the buffer's lifetime parameter.

use std::fmt;

use crate::dimension::{Dimension, DimensionSpace, IndexedDimensionStorage};
use crate::error::PixelError;

use super::types::{EndianType, Pixel, PixelType};

/// Number of dimensions of every pixel buffer.
pub const PIXEL_DIMENSIONS: usize = 9;

/// Extent of each [`PixelDimension`], indexed by [`PixelDimension::index`].
pub type PixelShape = [usize; PIXEL_DIMENSIONS];

/// Element position, indexed by [`PixelDimension::index`].
pub type PixelIndices = [usize; PIXEL_DIMENSIONS];

// =============================================================================
// Dimensions and Orders
// =============================================================================

/// The nine logical dimensions of a pixel buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(usize)]
pub enum PixelDimension {
    X = 0,
    Y = 1,
    Z = 2,
    T = 3,
    /// Channel
    C = 4,
    /// Samples within a channel (e.g. RGB components)
    Subchannel = 5,
    ModuloZ = 6,
    ModuloT = 7,
    ModuloC = 8,
}

impl PixelDimension {
    /// All dimensions in logical order.
    pub const ALL: [PixelDimension; PIXEL_DIMENSIONS] = [
        PixelDimension::X,
        PixelDimension::Y,
        PixelDimension::Z,
        PixelDimension::T,
        PixelDimension::C,
        PixelDimension::Subchannel,
        PixelDimension::ModuloZ,
        PixelDimension::ModuloT,
        PixelDimension::ModuloC,
    ];

    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Short name used as the axis name.
    pub const fn name(self) -> &'static str {
        match self {
            PixelDimension::X => "X",
            PixelDimension::Y => "Y",
            PixelDimension::Z => "Z",
            PixelDimension::T => "T",
            PixelDimension::C => "C",
            PixelDimension::Subchannel => "S",
            PixelDimension::ModuloZ => "mZ",
            PixelDimension::ModuloT => "mT",
            PixelDimension::ModuloC => "mC",
        }
    }

    /// Modulo sub-dimension packed with a primary Z, T or C dimension.
    const fn modulo(self) -> Option<PixelDimension> {
        match self {
            PixelDimension::Z => Some(PixelDimension::ModuloZ),
            PixelDimension::T => Some(PixelDimension::ModuloT),
            PixelDimension::C => Some(PixelDimension::ModuloC),
            _ => None,
        }
    }
}

/// OME dimension orders, fastest-varying first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DimensionOrder {
    XYZTC,
    XYZCT,
    XYCTZ,
    XYCZT,
    XYTCZ,
    XYTZC,
}

impl DimensionOrder {
    pub const ALL: [DimensionOrder; 6] = [
        DimensionOrder::XYZTC,
        DimensionOrder::XYZCT,
        DimensionOrder::XYCTZ,
        DimensionOrder::XYCZT,
        DimensionOrder::XYTCZ,
        DimensionOrder::XYTZC,
    ];

    pub const fn name(self) -> &'static str {
        match self {
            DimensionOrder::XYZTC => "XYZTC",
            DimensionOrder::XYZCT => "XYZCT",
            DimensionOrder::XYCTZ => "XYCTZ",
            DimensionOrder::XYCZT => "XYCZT",
            DimensionOrder::XYTCZ => "XYTCZ",
            DimensionOrder::XYTZC => "XYTZC",
        }
    }

    /// The three non-spatial dimensions, fastest first.
    const fn outer(self) -> [PixelDimension; 3] {
        use PixelDimension::{C, T, Z};
        match self {
            DimensionOrder::XYZTC => [Z, T, C],
            DimensionOrder::XYZCT => [Z, C, T],
            DimensionOrder::XYCTZ => [C, T, Z],
            DimensionOrder::XYCZT => [C, Z, T],
            DimensionOrder::XYTCZ => [T, C, Z],
            DimensionOrder::XYTZC => [T, Z, C],
        }
    }
}

impl fmt::Display for DimensionOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Storage order for a dimension order, all ascending.
///
/// Interleaved (chunky) orders place the subchannel first so samples of one
/// pixel are adjacent; planar orders place it directly after X and Y so each
/// sample forms a contiguous plane. Each modulo dimension varies faster than
/// its primary dimension.
pub fn make_storage_order(
    order: DimensionOrder,
    interleaved: bool,
) -> Vec<IndexedDimensionStorage> {
    let mut storage = Vec::with_capacity(PIXEL_DIMENSIONS);
    if interleaved {
        storage.push(PixelDimension::Subchannel);
    }
    storage.push(PixelDimension::X);
    storage.push(PixelDimension::Y);
    if !interleaved {
        storage.push(PixelDimension::Subchannel);
    }
    for dimension in order.outer() {
        if let Some(modulo) = dimension.modulo() {
            storage.push(modulo);
        }
        storage.push(dimension);
    }

    storage
        .into_iter()
        .map(|d| IndexedDimensionStorage::ascending(d.index()))
        .collect()
}

/// Default storage order: XYZTC, interleaved.
pub fn default_storage_order() -> Vec<IndexedDimensionStorage> {
    make_storage_order(DimensionOrder::XYZTC, true)
}

// =============================================================================
// Logical Index Iteration
// =============================================================================

/// Iterator over every index of a shape in logical order (X fastest).
#[derive(Debug, Clone)]
pub struct LogicalIndices {
    shape: PixelShape,
    next: Option<PixelIndices>,
}

impl LogicalIndices {
    pub fn new(shape: PixelShape) -> Self {
        let next = if shape.iter().all(|&extent| extent > 0) {
            Some([0; PIXEL_DIMENSIONS])
        } else {
            None
        };
        Self { shape, next }
    }
}

impl Iterator for LogicalIndices {
    type Item = PixelIndices;

    fn next(&mut self) -> Option<PixelIndices> {
        let current = self.next?;
        let mut following = current;
        let mut carried = true;
        for (index, extent) in following.iter_mut().zip(self.shape) {
            *index += 1;
            if *index < extent {
                carried = false;
                break;
            }
            *index = 0;
        }
        self.next = if carried { None } else { Some(following) };
        Some(current)
    }
}

// =============================================================================
// PixelBuffer
// =============================================================================

#[derive(Debug)]
enum Storage<'a, T> {
    Managed(Vec<T>),
    Unmanaged(&'a mut [T]),
}

impl<T> Storage<'_, T> {
    fn as_slice(&self) -> &[T] {
        match self {
            Storage::Managed(data) => data.as_slice(),
            Storage::Unmanaged(data) => &data[..],
        }
    }

    fn as_mut_slice(&mut self) -> &mut [T] {
        match self {
            Storage::Managed(data) => data.as_mut_slice(),
            Storage::Unmanaged(data) => &mut data[..],
        }
    }
}

/// A strided nine-dimensional array of one pixel representation.
///
/// # Example
///
/// ```
/// use ome_tiling::pixel::{default_storage_order, PixelBuffer};
///
/// let mut buffer =
///     PixelBuffer::<u16>::new([4, 2, 1, 1, 1, 1, 1, 1, 1], &default_storage_order()).unwrap();
/// buffer.assign(0..8u16).unwrap();
/// assert_eq!(*buffer.at(&[1, 1, 0, 0, 0, 0, 0, 0, 0]).unwrap(), 5);
/// ```
#[derive(Debug)]
pub struct PixelBuffer<'a, T: Pixel> {
    storage: Storage<'a, T>,
    space: DimensionSpace,
    shape: PixelShape,
    strides: [isize; PIXEL_DIMENSIONS],
}

impl<T: Pixel> PixelBuffer<'static, T> {
    /// Allocate a zero-initialised buffer.
    ///
    /// # Errors
    ///
    /// Fails if any extent is zero or `order` is not a valid nine-entry
    /// storage order.
    pub fn new(shape: PixelShape, order: &[IndexedDimensionStorage]) -> Result<Self, PixelError> {
        let space = layout(shape, order)?;
        let storage = Storage::Managed(vec![T::default(); space.num_elements()]);
        Ok(Self::from_parts(storage, space, shape))
    }

    /// Take ownership of existing elements laid out in `order`.
    ///
    /// # Errors
    ///
    /// Returns [`PixelError::StorageSize`] if `data` does not hold exactly one
    /// element per index of `shape`.
    pub fn from_vec(
        data: Vec<T>,
        shape: PixelShape,
        order: &[IndexedDimensionStorage],
    ) -> Result<Self, PixelError> {
        let space = layout(shape, order)?;
        check_storage_size(data.len(), &space)?;
        Ok(Self::from_parts(Storage::Managed(data), space, shape))
    }
}

impl<'a, T: Pixel> PixelBuffer<'a, T> {
    /// Wrap caller-owned storage without copying.
    ///
    /// The buffer borrows `data` for its whole lifetime and reports
    /// `managed() == false`.
    pub fn from_slice(
        data: &'a mut [T],
        shape: PixelShape,
        order: &[IndexedDimensionStorage],
    ) -> Result<Self, PixelError> {
        let space = layout(shape, order)?;
        check_storage_size(data.len(), &space)?;
        Ok(Self::from_parts(Storage::Unmanaged(data), space, shape))
    }

    fn from_parts(storage: Storage<'a, T>, space: DimensionSpace, shape: PixelShape) -> Self {
        let mut strides = [0; PIXEL_DIMENSIONS];
        for (stride, value) in strides.iter_mut().zip(space.storage_strides()) {
            *stride = value;
        }
        Self {
            storage,
            space,
            shape,
            strides,
        }
    }

    // -------------------------------------------------------------------------
    // Introspection
    // -------------------------------------------------------------------------

    pub fn pixel_type(&self) -> PixelType {
        T::PIXEL_TYPE
    }

    pub fn shape(&self) -> PixelShape {
        self.shape
    }

    /// Signed element strides, indexed by dimension.
    pub fn strides(&self) -> [isize; PIXEL_DIMENSIONS] {
        self.strides
    }

    /// Index bases are always zero.
    pub fn index_bases(&self) -> [usize; PIXEL_DIMENSIONS] {
        [0; PIXEL_DIMENSIONS]
    }

    pub fn storage_order(&self) -> &[IndexedDimensionStorage] {
        self.space.storage_order()
    }

    pub fn num_elements(&self) -> usize {
        self.space.num_elements()
    }

    pub fn num_dimensions(&self) -> usize {
        PIXEL_DIMENSIONS
    }

    /// Storage offset of the all-zero index.
    pub fn origin(&self) -> usize {
        self.space.base()
    }

    /// Coordinate space describing the buffer layout.
    pub fn space(&self) -> &DimensionSpace {
        &self.space
    }

    /// Whether the buffer owns its storage.
    pub fn managed(&self) -> bool {
        matches!(self.storage, Storage::Managed(_))
    }

    /// Elements in physical storage order.
    pub fn data(&self) -> &[T] {
        self.storage.as_slice()
    }

    pub fn data_mut(&mut self) -> &mut [T] {
        self.storage.as_mut_slice()
    }

    // -------------------------------------------------------------------------
    // Element access
    // -------------------------------------------------------------------------

    /// Storage offset of an index.
    ///
    /// # Errors
    ///
    /// Returns [`PixelError::IndexOutOfBounds`] for the first component that
    /// exceeds its extent.
    pub fn offset(&self, indices: &PixelIndices) -> Result<usize, PixelError> {
        for (dimension, (&index, &extent)) in PixelDimension::ALL
            .iter()
            .zip(indices.iter().zip(&self.shape))
        {
            if index >= extent {
                return Err(PixelError::IndexOutOfBounds {
                    dimension: dimension.name(),
                    index,
                    extent,
                });
            }
        }
        Ok(self.offset_unchecked(indices))
    }

    #[inline]
    fn offset_unchecked(&self, indices: &PixelIndices) -> usize {
        let offset = indices
            .iter()
            .zip(&self.strides)
            .fold(self.origin() as isize, |acc, (&index, &stride)| {
                acc + stride * index as isize
            });
        offset as usize
    }

    pub fn at(&self, indices: &PixelIndices) -> Result<&T, PixelError> {
        let offset = self.offset(indices)?;
        Ok(&self.data()[offset])
    }

    pub fn at_mut(&mut self, indices: &PixelIndices) -> Result<&mut T, PixelError> {
        let offset = self.offset(indices)?;
        Ok(&mut self.data_mut()[offset])
    }

    /// Copy every value out in logical order (X fastest).
    pub fn logical_values(&self) -> Vec<T> {
        LogicalIndices::new(self.shape)
            .map(|indices| self.data()[self.offset_unchecked(&indices)])
            .collect()
    }

    // -------------------------------------------------------------------------
    // Bulk assignment
    // -------------------------------------------------------------------------

    /// Replace every element, in physical storage order.
    ///
    /// # Errors
    ///
    /// Returns [`PixelError::ElementCount`] unless exactly
    /// [`num_elements`](Self::num_elements) values are supplied; the buffer
    /// is unchanged on failure.
    pub fn assign<I>(&mut self, values: I) -> Result<(), PixelError>
    where
        I: IntoIterator<Item = T>,
    {
        let values: Vec<T> = values.into_iter().collect();
        let expected = self.num_elements();
        if values.len() != expected {
            return Err(PixelError::ElementCount {
                expected,
                actual: values.len(),
            });
        }
        self.data_mut().copy_from_slice(&values);
        Ok(())
    }

    /// Copy values from a buffer of the same shape, matching them by logical
    /// index so the two storage orders may differ.
    pub fn copy_from(&mut self, other: &PixelBuffer<'_, T>) -> Result<(), PixelError> {
        if self.shape != other.shape {
            return Err(PixelError::ShapeMismatch {
                expected: self.shape,
                actual: other.shape,
            });
        }

        if self.storage_order() == other.storage_order() {
            self.data_mut().copy_from_slice(other.data());
            return Ok(());
        }

        for indices in LogicalIndices::new(self.shape) {
            let target = self.offset_unchecked(&indices);
            let source = other.offset_unchecked(&indices);
            self.data_mut()[target] = other.data()[source];
        }
        Ok(())
    }

    /// Owned copy with the same layout.
    pub fn to_managed(&self) -> PixelBuffer<'static, T> {
        PixelBuffer::from_parts(
            Storage::Managed(self.data().to_vec()),
            self.space.clone(),
            self.shape,
        )
    }

    // -------------------------------------------------------------------------
    // Raw bytes
    // -------------------------------------------------------------------------

    /// Number of bytes in the raw representation.
    pub fn byte_len(&self) -> usize {
        self.num_elements() * T::SIZE
    }

    /// Fill the buffer from raw bytes in physical storage order.
    ///
    /// # Errors
    ///
    /// Returns [`PixelError::BufferTooSmall`] if `bytes` is shorter than
    /// [`byte_len`](Self::byte_len).
    pub fn read_bytes(&mut self, bytes: &[u8], endian: EndianType) -> Result<(), PixelError> {
        let required = self.byte_len();
        if bytes.len() < required {
            return Err(PixelError::BufferTooSmall {
                required,
                actual: bytes.len(),
            });
        }
        for (value, raw) in self.data_mut().iter_mut().zip(bytes.chunks_exact(T::SIZE)) {
            *value = T::from_bytes(raw, endian);
        }
        Ok(())
    }

    /// Write the buffer as raw bytes in physical storage order.
    pub fn write_bytes(&self, out: &mut [u8], endian: EndianType) -> Result<(), PixelError> {
        let required = self.byte_len();
        if out.len() < required {
            return Err(PixelError::BufferTooSmall {
                required,
                actual: out.len(),
            });
        }
        for (value, raw) in self.data().iter().zip(out.chunks_exact_mut(T::SIZE)) {
            value.to_bytes(raw, endian);
        }
        Ok(())
    }

    pub fn to_bytes(&self, endian: EndianType) -> Vec<u8> {
        let mut out = vec![0; self.byte_len()];
        for (value, raw) in self.data().iter().zip(out.chunks_exact_mut(T::SIZE)) {
            value.to_bytes(raw, endian);
        }
        out
    }
}

/// Buffers compare by shape and logical values; storage order is ignored.
impl<T: Pixel> PartialEq for PixelBuffer<'_, T> {
    fn eq(&self, other: &Self) -> bool {
        self.shape == other.shape
            && LogicalIndices::new(self.shape).all(|indices| {
                self.data()[self.offset_unchecked(&indices)]
                    == other.data()[other.offset_unchecked(&indices)]
            })
    }
}

fn layout(
    shape: PixelShape,
    order: &[IndexedDimensionStorage],
) -> Result<DimensionSpace, PixelError> {
    let dimensions = PixelDimension::ALL
        .iter()
        .zip(shape)
        .map(|(dimension, extent)| Dimension::new(dimension.name(), extent))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(DimensionSpace::with_storage_order(dimensions, order.to_vec())?)
}

fn check_storage_size(actual: usize, space: &DimensionSpace) -> Result<(), PixelError> {
    let expected = space.num_elements();
    if actual != expected {
        return Err(PixelError::StorageSize { expected, actual });
    }
    Ok(())
}

// =============================================================================
// Tests
// =============================================================================
