//! This module defines the data element API: one read routine per
//! element kind, used by the fill loop to consume voxels in on-disk
//! order. Multi-byte scalars are read in the file's byte order;
//! composite kinds read their subfields independently, in a fixed
//! order (real then imaginary; R, G, B, then A), with each subfield
//! subject to the same byte-order rule. The 128-bit float kinds treat
//! each 16-byte group as a single unit for byte-order purposes.

use crate::error::Result;
use crate::quad::decode_binary128;
use bigdecimal::BigDecimal;
use byteordered::{Endian, Endianness};
use num_complex::{Complex, Complex32, Complex64};
use num_traits::Zero;
use rgb::{RGB8, RGBA8};
use std::io::Read;

/// Trait for types which can hold a single decoded voxel and be read
/// from a byte source.
pub trait DataElement: Sized + Clone {
    /// The value used to pre-fill a grid before the fill pass.
    fn zeroed() -> Self;

    /// Read a single element from the given byte source.
    fn read_from<R: Read>(source: &mut R, endianness: Endianness) -> Result<Self>;
}

fn read_byte<R: Read>(source: &mut R) -> Result<u8> {
    let mut b = [0u8; 1];
    source.read_exact(&mut b)?;
    Ok(b[0])
}

/// Read a logical 128-bit pattern. A byte-order mismatch reverses the
/// whole 16-byte group, not its halves.
fn read_quad<R: Read>(source: &mut R, endianness: Endianness) -> Result<BigDecimal> {
    let mut buf = [0u8; 16];
    source.read_exact(&mut buf)?;
    let bits = match endianness {
        Endianness::Little => u128::from_le_bytes(buf),
        Endianness::Big => u128::from_be_bytes(buf),
    };
    Ok(decode_binary128(bits))
}

impl DataElement for u8 {
    fn zeroed() -> Self {
        0
    }
    fn read_from<R: Read>(source: &mut R, _: Endianness) -> Result<Self> {
        read_byte(source)
    }
}

impl DataElement for i8 {
    fn zeroed() -> Self {
        0
    }
    fn read_from<R: Read>(source: &mut R, _: Endianness) -> Result<Self> {
        Ok(read_byte(source)? as i8)
    }
}

impl DataElement for u16 {
    fn zeroed() -> Self {
        0
    }
    fn read_from<R: Read>(source: &mut R, e: Endianness) -> Result<Self> {
        Ok(e.read_u16(source)?)
    }
}

impl DataElement for i16 {
    fn zeroed() -> Self {
        0
    }
    fn read_from<R: Read>(source: &mut R, e: Endianness) -> Result<Self> {
        Ok(e.read_i16(source)?)
    }
}

impl DataElement for u32 {
    fn zeroed() -> Self {
        0
    }
    fn read_from<R: Read>(source: &mut R, e: Endianness) -> Result<Self> {
        Ok(e.read_u32(source)?)
    }
}

impl DataElement for i32 {
    fn zeroed() -> Self {
        0
    }
    fn read_from<R: Read>(source: &mut R, e: Endianness) -> Result<Self> {
        Ok(e.read_i32(source)?)
    }
}

impl DataElement for u64 {
    fn zeroed() -> Self {
        0
    }
    fn read_from<R: Read>(source: &mut R, e: Endianness) -> Result<Self> {
        Ok(e.read_u64(source)?)
    }
}

impl DataElement for i64 {
    fn zeroed() -> Self {
        0
    }
    fn read_from<R: Read>(source: &mut R, e: Endianness) -> Result<Self> {
        Ok(e.read_i64(source)?)
    }
}

impl DataElement for f32 {
    fn zeroed() -> Self {
        0.
    }
    fn read_from<R: Read>(source: &mut R, e: Endianness) -> Result<Self> {
        Ok(e.read_f32(source)?)
    }
}

impl DataElement for f64 {
    fn zeroed() -> Self {
        0.
    }
    fn read_from<R: Read>(source: &mut R, e: Endianness) -> Result<Self> {
        Ok(e.read_f64(source)?)
    }
}

impl DataElement for Complex32 {
    fn zeroed() -> Self {
        Complex::new(0., 0.)
    }
    fn read_from<R: Read>(source: &mut R, e: Endianness) -> Result<Self> {
        let re = e.read_f32(&mut *source)?;
        let im = e.read_f32(source)?;
        Ok(Complex::new(re, im))
    }
}

impl DataElement for Complex64 {
    fn zeroed() -> Self {
        Complex::new(0., 0.)
    }
    fn read_from<R: Read>(source: &mut R, e: Endianness) -> Result<Self> {
        let re = e.read_f64(&mut *source)?;
        let im = e.read_f64(source)?;
        Ok(Complex::new(re, im))
    }
}

impl DataElement for RGB8 {
    fn zeroed() -> Self {
        RGB8::new(0, 0, 0)
    }
    fn read_from<R: Read>(source: &mut R, _: Endianness) -> Result<Self> {
        let r = read_byte(source)?;
        let g = read_byte(source)?;
        let b = read_byte(source)?;
        Ok(RGB8::new(r, g, b))
    }
}

impl DataElement for RGBA8 {
    fn zeroed() -> Self {
        RGBA8::new(0, 0, 0, 0)
    }
    fn read_from<R: Read>(source: &mut R, _: Endianness) -> Result<Self> {
        let r = read_byte(source)?;
        let g = read_byte(source)?;
        let b = read_byte(source)?;
        let a = read_byte(source)?;
        Ok(RGBA8::new(r, g, b, a))
    }
}

impl DataElement for BigDecimal {
    fn zeroed() -> Self {
        BigDecimal::zero()
    }
    fn read_from<R: Read>(source: &mut R, e: Endianness) -> Result<Self> {
        read_quad(source, e)
    }
}

impl DataElement for Complex<BigDecimal> {
    fn zeroed() -> Self {
        Complex::new(BigDecimal::zero(), BigDecimal::zero())
    }
    fn read_from<R: Read>(source: &mut R, e: Endianness) -> Result<Self> {
        let re = read_quad(source, e)?;
        let im = read_quad(source, e)?;
        Ok(Complex::new(re, im))
    }
}
