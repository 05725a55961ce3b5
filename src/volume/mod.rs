//! This module defines the voxel grid produced by a decode, together
//! with the fill pass that reads voxels in natural file order while
//! placing them at their oriented output positions.
//!
//! The element kind of a grid is selected exactly once, from the
//! header's voxel type code, and fixes the decode, rescale and bundle
//! behavior of the dataset.

pub mod element;
pub mod shape;

use self::element::DataElement;
use self::shape::{Idx, Shape};
use crate::error::Result;
use crate::header::NiftiHeader;
use crate::typedef::NiftiType;
use bigdecimal::BigDecimal;
use byteordered::Endianness;
use ndarray::{ArrayD, IxDyn, ShapeBuilder};
use num_complex::{Complex, Complex32, Complex64};
use rgb::{RGB8, RGBA8};
use std::io::Read;

/// The element kind of a dataset, used as the key when merging decoded
/// datasets into a bundle. Covers the sixteen on-disk voxel types plus
/// the high-precision decimal kind produced by rescaling 64-bit
/// integer volumes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ElementKind {
    /// 1-bit boolean
    Bit,
    /// unsigned 8-bit integer
    Uint8,
    /// signed 8-bit integer
    Int8,
    /// unsigned 16-bit integer
    Uint16,
    /// signed 16-bit integer
    Int16,
    /// unsigned 32-bit integer
    Uint32,
    /// signed 32-bit integer
    Int32,
    /// unsigned 64-bit integer
    Uint64,
    /// signed 64-bit integer
    Int64,
    /// single precision float
    Float32,
    /// double precision float
    Float64,
    /// quad precision float, held as a decimal approximation
    Float128,
    /// complex of two single precision floats
    Complex64,
    /// complex of two double precision floats
    Complex128,
    /// complex of two quad precision floats
    Complex256,
    /// 8-bit R, G, B color
    Rgb24,
    /// 8-bit R, G, B, A color
    Rgba32,
    /// arbitrary-precision decimal
    HighPrecision,
}

/// A fully materialized N-dimensional voxel grid with one fixed
/// element kind, selected once per dataset from the header's voxel
/// type code.
#[derive(Debug, Clone, PartialEq)]
pub enum VoxelGrid {
    /// Packed 1-bit voxels, decoded to one 0/1 byte per voxel.
    Bit(ArrayD<u8>),
    /// Voxel type code 2.
    Uint8(ArrayD<u8>),
    /// Voxel type code 256.
    Int8(ArrayD<i8>),
    /// Voxel type code 512.
    Uint16(ArrayD<u16>),
    /// Voxel type code 4.
    Int16(ArrayD<i16>),
    /// Voxel type code 768.
    Uint32(ArrayD<u32>),
    /// Voxel type code 8.
    Int32(ArrayD<i32>),
    /// Voxel type code 1280.
    Uint64(ArrayD<u64>),
    /// Voxel type code 1024.
    Int64(ArrayD<i64>),
    /// Voxel type code 16.
    Float32(ArrayD<f32>),
    /// Voxel type code 64.
    Float64(ArrayD<f64>),
    /// Voxel type code 1536, decoded to decimal approximations.
    Float128(ArrayD<BigDecimal>),
    /// Voxel type code 32.
    Complex64(ArrayD<Complex32>),
    /// Voxel type code 1792.
    Complex128(ArrayD<Complex64>),
    /// Voxel type code 2048, decoded to decimal approximations.
    Complex256(ArrayD<Complex<BigDecimal>>),
    /// Voxel type code 128.
    Rgb24(ArrayD<RGB8>),
    /// Voxel type code 2304.
    Rgba32(ArrayD<RGBA8>),
    /// Not an on-disk type: produced by rescaling a 64-bit integer
    /// volume, whose full range a double cannot represent exactly.
    HighPrecision(ArrayD<BigDecimal>),
}

impl VoxelGrid {
    /// The element kind of this grid.
    pub fn kind(&self) -> ElementKind {
        match self {
            VoxelGrid::Bit(_) => ElementKind::Bit,
            VoxelGrid::Uint8(_) => ElementKind::Uint8,
            VoxelGrid::Int8(_) => ElementKind::Int8,
            VoxelGrid::Uint16(_) => ElementKind::Uint16,
            VoxelGrid::Int16(_) => ElementKind::Int16,
            VoxelGrid::Uint32(_) => ElementKind::Uint32,
            VoxelGrid::Int32(_) => ElementKind::Int32,
            VoxelGrid::Uint64(_) => ElementKind::Uint64,
            VoxelGrid::Int64(_) => ElementKind::Int64,
            VoxelGrid::Float32(_) => ElementKind::Float32,
            VoxelGrid::Float64(_) => ElementKind::Float64,
            VoxelGrid::Float128(_) => ElementKind::Float128,
            VoxelGrid::Complex64(_) => ElementKind::Complex64,
            VoxelGrid::Complex128(_) => ElementKind::Complex128,
            VoxelGrid::Complex256(_) => ElementKind::Complex256,
            VoxelGrid::Rgb24(_) => ElementKind::Rgb24,
            VoxelGrid::Rgba32(_) => ElementKind::Rgba32,
            VoxelGrid::HighPrecision(_) => ElementKind::HighPrecision,
        }
    }

    /// The axis lengths of this grid.
    pub fn shape(&self) -> &[usize] {
        match self {
            VoxelGrid::Bit(a) => a.shape(),
            VoxelGrid::Uint8(a) => a.shape(),
            VoxelGrid::Int8(a) => a.shape(),
            VoxelGrid::Uint16(a) => a.shape(),
            VoxelGrid::Int16(a) => a.shape(),
            VoxelGrid::Uint32(a) => a.shape(),
            VoxelGrid::Int32(a) => a.shape(),
            VoxelGrid::Uint64(a) => a.shape(),
            VoxelGrid::Int64(a) => a.shape(),
            VoxelGrid::Float32(a) => a.shape(),
            VoxelGrid::Float64(a) => a.shape(),
            VoxelGrid::Float128(a) => a.shape(),
            VoxelGrid::Complex64(a) => a.shape(),
            VoxelGrid::Complex128(a) => a.shape(),
            VoxelGrid::Complex256(a) => a.shape(),
            VoxelGrid::Rgb24(a) => a.shape(),
            VoxelGrid::Rgba32(a) => a.shape(),
            VoxelGrid::HighPrecision(a) => a.shape(),
        }
    }

    /// The grid's dimensionality.
    pub fn rank(&self) -> usize {
        self.shape().len()
    }
}

/// Index remapping applied inline during the fill pass. Only the first
/// three axes are candidates for reorientation. The sign tests against
/// the diagonal affine parameters are asymmetric: negative triggers a
/// flip on axes 0 and 2, positive on axis 1, and ANALYZE data inverts
/// the first test.
#[derive(Debug, Clone)]
pub(crate) struct AxisOrienter {
    flip: [bool; 3],
    lens: [usize; 3],
}

impl AxisOrienter {
    pub(crate) fn new(header: &NiftiHeader, shape: &Shape) -> Self {
        let sx = header.srow_x[0];
        let sy = header.srow_y[1];
        let sz = header.srow_z[2];
        let analyze = header.layout.is_analyze();
        let dims = shape.dims();
        let mut flip = [false; 3];
        let mut lens = [0; 3];
        if !dims.is_empty() {
            flip[0] = (!analyze && sx < 0.0) || (analyze && sx > 0.0);
            lens[0] = dims[0];
        }
        if dims.len() > 1 {
            flip[1] = sy > 0.0;
            lens[1] = dims[1];
        }
        if dims.len() > 2 {
            flip[2] = sz < 0.0;
            lens[2] = dims[2];
        }
        AxisOrienter { flip, lens }
    }

    /// Map a natural-order index to its output-grid position.
    pub(crate) fn apply(&self, idx: Idx) -> Idx {
        let mut out = idx;
        for (axis, slot) in out.as_mut().iter_mut().take(3).enumerate() {
            if self.flip[axis] {
                *slot = self.lens[axis] - 1 - *slot;
            }
        }
        out
    }
}

/// Read a whole voxel grid from the given source, dispatching on the
/// header's voxel type code.
pub(crate) fn read_grid<R: Read>(source: &mut R, header: &NiftiHeader) -> Result<VoxelGrid> {
    let datatype = header.data_type()?;
    let shape = Shape::from_dims(header.dims())?;
    let orienter = AxisOrienter::new(header, &shape);
    let e = header.endianness;

    let grid = match datatype {
        NiftiType::Bit => VoxelGrid::Bit(fill_bit_grid(source, &shape, &orienter)?),
        NiftiType::Uint8 => VoxelGrid::Uint8(fill_grid(source, &shape, &orienter, e)?),
        NiftiType::Int8 => VoxelGrid::Int8(fill_grid(source, &shape, &orienter, e)?),
        NiftiType::Uint16 => VoxelGrid::Uint16(fill_grid(source, &shape, &orienter, e)?),
        NiftiType::Int16 => VoxelGrid::Int16(fill_grid(source, &shape, &orienter, e)?),
        NiftiType::Uint32 => VoxelGrid::Uint32(fill_grid(source, &shape, &orienter, e)?),
        NiftiType::Int32 => VoxelGrid::Int32(fill_grid(source, &shape, &orienter, e)?),
        NiftiType::Uint64 => VoxelGrid::Uint64(fill_grid(source, &shape, &orienter, e)?),
        NiftiType::Int64 => VoxelGrid::Int64(fill_grid(source, &shape, &orienter, e)?),
        NiftiType::Float32 => VoxelGrid::Float32(fill_grid(source, &shape, &orienter, e)?),
        NiftiType::Float64 => VoxelGrid::Float64(fill_grid(source, &shape, &orienter, e)?),
        NiftiType::Float128 => VoxelGrid::Float128(fill_grid(source, &shape, &orienter, e)?),
        NiftiType::Complex64 => VoxelGrid::Complex64(fill_grid(source, &shape, &orienter, e)?),
        NiftiType::Complex128 => VoxelGrid::Complex128(fill_grid(source, &shape, &orienter, e)?),
        NiftiType::Complex256 => VoxelGrid::Complex256(fill_grid(source, &shape, &orienter, e)?),
        NiftiType::Rgb24 => VoxelGrid::Rgb24(fill_grid(source, &shape, &orienter, e)?),
        NiftiType::Rgba32 => VoxelGrid::Rgba32(fill_grid(source, &shape, &orienter, e)?),
    };
    Ok(grid)
}

/// One streaming pass: voxels are consumed in natural file order and
/// written at their oriented positions. Any failure discards the
/// partially filled grid.
fn fill_grid<T, R>(
    source: &mut R,
    shape: &Shape,
    orienter: &AxisOrienter,
    endianness: Endianness,
) -> Result<ArrayD<T>>
where
    T: DataElement,
    R: Read,
{
    let mut grid = ArrayD::from_elem(IxDyn(shape.dims()).f(), T::zeroed());
    for idx in shape.index_iter() {
        let value = T::read_from(source, endianness)?;
        let out = orienter.apply(idx);
        grid[out.as_ref()] = value;
    }
    Ok(grid)
}

/// The packed 1-bit type: voxels come 8 to a byte along the first
/// axis. A fresh byte is consumed whenever the natural index along
/// axis 0 is a multiple of 8; the bucket never follows the output
/// reordering. Bits are taken lowest first.
fn fill_bit_grid<R: Read>(
    source: &mut R,
    shape: &Shape,
    orienter: &AxisOrienter,
) -> Result<ArrayD<u8>> {
    let mut grid = ArrayD::from_elem(IxDyn(shape.dims()).f(), 0u8);
    let mut bucket = 0u8;
    for idx in shape.index_iter() {
        let bit = idx.get(0).unwrap_or(0) % 8;
        if bit == 0 {
            let mut b = [0u8; 1];
            source.read_exact(&mut b)?;
            bucket = b[0];
        }
        let out = orienter.apply(idx);
        grid[out.as_ref()] = (bucket >> bit) & 1;
    }
    Ok(grid)
}

#[cfg(test)]
mod tests {
    use super::shape::Shape;
    use super::{fill_bit_grid, fill_grid, read_grid, AxisOrienter, VoxelGrid};
    use crate::header::NiftiHeader;
    use byteordered::Endianness;

    fn no_orient(shape: &Shape) -> AxisOrienter {
        AxisOrienter::new(&NiftiHeader::default(), shape)
    }

    #[test]
    fn bit_unpacking_lowest_first() {
        let shape = Shape::from_dims(&[8]).unwrap();
        let orienter = no_orient(&shape);
        let mut src: &[u8] = &[0b1011_0010];
        let grid = fill_bit_grid(&mut src, &shape, &orienter).unwrap();
        let values: Vec<u8> = grid.iter().cloned().collect();
        assert_eq!(values, vec![0, 1, 0, 0, 1, 1, 0, 1]);
    }

    #[test]
    fn bit_bucket_restarts_along_first_axis() {
        // 2 voxels per row: each row starts a fresh byte
        let shape = Shape::from_dims(&[2, 2]).unwrap();
        let orienter = no_orient(&shape);
        let mut src: &[u8] = &[0b01, 0b10];
        let grid = fill_bit_grid(&mut src, &shape, &orienter).unwrap();
        assert_eq!(grid[&[0, 0][..]], 1);
        assert_eq!(grid[&[1, 0][..]], 0);
        assert_eq!(grid[&[0, 1][..]], 0);
        assert_eq!(grid[&[1, 1][..]], 1);
    }

    #[test]
    fn axis_flip_writes_first_voxel_last() {
        let mut header = NiftiHeader::default();
        header.srow_x[0] = -1.0;
        let shape = Shape::from_dims(&[4]).unwrap();
        let orienter = AxisOrienter::new(&header, &shape);
        let mut src: &[u8] = &[10, 20, 30, 40];
        let grid: ndarray::ArrayD<u8> =
            fill_grid(&mut src, &shape, &orienter, Endianness::Little).unwrap();
        assert_eq!(grid[&[3][..]], 10);
        assert_eq!(grid[&[0][..]], 40);
    }

    #[test]
    fn analyze_inverts_the_first_flip() {
        use crate::header::DataLayout;
        let mut header = NiftiHeader::default();
        header.srow_x[0] = 1.0;
        header.layout = DataLayout::LegacyAnalyze;
        let shape = Shape::from_dims(&[3]).unwrap();
        let orienter = AxisOrienter::new(&header, &shape);
        let mut src: &[u8] = &[1, 2, 3];
        let grid: ndarray::ArrayD<u8> =
            fill_grid(&mut src, &shape, &orienter, Endianness::Little).unwrap();
        assert_eq!(grid[&[0][..]], 3);
        assert_eq!(grid[&[2][..]], 1);
    }

    #[test]
    fn unknown_type_code_is_rejected() {
        let mut header = NiftiHeader::default();
        header.datatype = 3;
        header.dim = [1, 2, 0, 0, 0, 0, 0, 0];
        let mut src: &[u8] = &[0, 0];
        assert!(read_grid(&mut src, &header).is_err());
    }

    #[test]
    fn truncated_stream_discards_grid() {
        let mut header = NiftiHeader::default();
        header.datatype = 4; // int16
        header.dim = [1, 4, 0, 0, 0, 0, 0, 0];
        let mut src: &[u8] = &[1, 0, 2, 0]; // only two of four voxels
        assert!(read_grid(&mut src, &header).is_err());
    }

    #[test]
    fn zero_rank_reads_one_element() {
        let mut header = NiftiHeader::default();
        header.datatype = 2; // uint8
        header.dim = [0; 8];
        let mut src: &[u8] = &[42];
        match read_grid(&mut src, &header).unwrap() {
            VoxelGrid::Uint8(a) => {
                assert_eq!(a.len(), 1);
                assert_eq!(a.iter().next().cloned(), Some(42));
            }
            g => panic!("unexpected grid kind {:?}", g.kind()),
        }
    }
}
