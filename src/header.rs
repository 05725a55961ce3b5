//! This module defines the `NiftiHeader` struct and the parsers for
//! the two fixed header layouts (NIFTI-1, 348 bytes; NIFTI-2, 540
//! bytes). Fields are stored at NIFTI-2 widths regardless of which
//! layout they were read from.
//!
//! Byte order is decided once per header, from the number-of-dimensions
//! field: if it falls outside 0..=7, the remainder of the header (and
//! everything after it) is read in the opposite byte order, and any
//! multi-byte value read before the decision is corrected by swapping
//! the raw value rather than re-reading it from the stream.

use crate::error::{NiftiError, Result};
use crate::typedef::{NiftiType, Unit};
use crate::util::{is_gz_file, read_fixed_str};
use byteordered::{ByteOrdered, Endianness};
use flate2::bufread::GzDecoder;
use log::debug;
use num_traits::FromPrimitive;
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

/// Magic code for NIFTI-1 header files (extension ".hdr[.gz]").
pub const MAGIC_CODE_NI1: &[u8; 4] = b"ni1\0";
/// Magic code for full NIFTI-1 files (extension ".nii[.gz]").
pub const MAGIC_CODE_NIP1: &[u8; 4] = b"n+1\0";
/// Magic code for NIFTI-2 header files.
pub const MAGIC_CODE_NI2: &[u8; 8] = b"ni2\0\0\0\0\0";
/// Magic code for full NIFTI-2 files.
pub const MAGIC_CODE_NIP2: &[u8; 8] = b"n+2\0\0\0\0\0";

/// The header layout a file was decoded from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NiftiVersion {
    /// NIFTI-1 (348-byte header, 16-bit dimensions)
    Nifti1,
    /// NIFTI-2 (540-byte header, 64-bit dimensions)
    Nifti2,
}

/// How the header and voxel data are distributed across files, as
/// declared by the magic code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataLayout {
    /// Header and voxel data share one file (`"n+1"`/`"n+2"` magic).
    SingleFile,
    /// Voxel data lives in a companion `.img` file (`"ni1"`/`"ni2"` magic).
    DualFile,
    /// A NIFTI-1 header with an unknown magic code, treated as a
    /// pre-NIfTI ANALYZE pair on a best-effort basis.
    LegacyAnalyze,
}

impl DataLayout {
    /// Whether voxel data is expected in a companion file.
    pub fn is_dual_file(self) -> bool {
        matches!(self, DataLayout::DualFile | DataLayout::LegacyAnalyze)
    }

    /// Whether this is the ANALYZE fallback. The flag also changes how
    /// the first axis is oriented.
    pub fn is_analyze(self) -> bool {
        matches!(self, DataLayout::LegacyAnalyze)
    }
}

/// The parsed header record. Scalar fields are named after the
/// specification's header file and widened to their NIFTI-2 sizes;
/// string fields are decoded from their fixed-width byte runs.
#[derive(Debug, Clone, PartialEq)]
pub struct NiftiHeader {
    /// Which header layout was recognized
    pub version: NiftiVersion,
    /// File layout declared by the magic code
    pub layout: DataLayout,
    /// Byte order of the file's data
    pub endianness: Endianness,
    /// MRI slice ordering
    pub dim_info: u8,
    /// Data array dimensions; `dim[0]` is the rank
    pub dim: [i64; 8],
    /// 1st intent parameter
    pub intent_p1: f64,
    /// 2nd intent parameter
    pub intent_p2: f64,
    /// 3rd intent parameter
    pub intent_p3: f64,
    /// NIFTI_INTENT_* code
    pub intent_code: i32,
    /// Defines the voxel type
    pub datatype: i16,
    /// Number of bits per voxel
    pub bitpix: i16,
    /// First slice index
    pub slice_start: i64,
    /// Grid spacings
    pub pixdim: [f64; 8],
    /// Offset into the file where the voxel data begins
    pub vox_offset: f64,
    /// Data scaling: slope (zero disables rescaling)
    pub scl_slope: f64,
    /// Data scaling: offset
    pub scl_inter: f64,
    /// Last slice index
    pub slice_end: i64,
    /// Slice timing order
    pub slice_code: i32,
    /// Units of pixdim[1..4], packed
    pub xyzt_units: i32,
    /// Max display intensity
    pub cal_max: f64,
    /// Min display intensity
    pub cal_min: f64,
    /// Time for one slice
    pub slice_duration: f64,
    /// Time axis shift
    pub toffset: f64,
    /// Free-form description
    pub descrip: String,
    /// Auxiliary filename
    pub aux_file: String,
    /// NIFTI_XFORM_* code for the quaternion mapping
    pub qform_code: i32,
    /// NIFTI_XFORM_* code for the affine mapping
    pub sform_code: i32,
    /// Quaternion b param
    pub quatern_b: f64,
    /// Quaternion c param
    pub quatern_c: f64,
    /// Quaternion d param
    pub quatern_d: f64,
    /// Quaternion x shift
    pub qoffset_x: f64,
    /// Quaternion y shift
    pub qoffset_y: f64,
    /// Quaternion z shift
    pub qoffset_z: f64,
    /// 1st row of the affine transform
    pub srow_x: [f64; 4],
    /// 2nd row of the affine transform
    pub srow_y: [f64; 4],
    /// 3rd row of the affine transform
    pub srow_z: [f64; 4],
    /// "name" or meaning of the data
    pub intent_name: String,
}

impl Default for NiftiHeader {
    fn default() -> NiftiHeader {
        NiftiHeader {
            version: NiftiVersion::Nifti1,
            layout: DataLayout::SingleFile,
            endianness: Endianness::native(),
            dim_info: 0,
            dim: [0; 8],
            intent_p1: 0.,
            intent_p2: 0.,
            intent_p3: 0.,
            intent_code: 0,
            datatype: 0,
            bitpix: 0,
            slice_start: 0,
            pixdim: [0.; 8],
            vox_offset: 352.,
            scl_slope: 0.,
            scl_inter: 0.,
            slice_end: 0,
            slice_code: 0,
            xyzt_units: 0,
            cal_max: 0.,
            cal_min: 0.,
            slice_duration: 0.,
            toffset: 0.,
            descrip: String::new(),
            aux_file: String::new(),
            qform_code: 0,
            sform_code: 0,
            quatern_b: 0.,
            quatern_c: 0.,
            quatern_d: 0.,
            qoffset_x: 0.,
            qoffset_y: 0.,
            qoffset_z: 0.,
            srow_x: [0.; 4],
            srow_y: [0.; 4],
            srow_z: [0.; 4],
            intent_name: String::new(),
        }
    }
}

impl NiftiHeader {
    /// Retrieve a NIFTI header from a file in the file system.
    /// If the file's name ends with ".gz", the file is assumed to need
    /// GZip decoding.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<NiftiHeader> {
        let gz = is_gz_file(&path);
        let file = BufReader::new(File::open(path)?);
        if gz {
            NiftiHeader::from_reader(GzDecoder::new(file))
        } else {
            NiftiHeader::from_reader(file)
        }
    }

    /// Read a NIFTI header from the given byte source, which is assumed
    /// to be positioned at the start of the header.
    pub fn from_reader<R: Read>(mut source: R) -> Result<NiftiHeader> {
        let sizeof_hdr = ByteOrdered::runtime(&mut source, Endianness::native()).read_i32()?;
        if sizeof_hdr == 348 || sizeof_hdr.swap_bytes() == 348 {
            parse_header_1(source)
        } else if sizeof_hdr == 540 || sizeof_hdr.swap_bytes() == 540 {
            parse_header_2(source)
        } else {
            Err(NiftiError::UnrecognizedHeader(sizeof_hdr))
        }
    }

    /// The number of dimensions of the volume.
    pub fn rank(&self) -> usize {
        self.dim[0].max(0).min(7) as usize
    }

    /// The axis lengths, without the leading rank element.
    pub fn dims(&self) -> &[i64] {
        &self.dim[1..=self.rank()]
    }

    /// The per-axis grid spacings, without the leading `pixdim[0]`.
    pub fn spacings(&self) -> &[f64] {
        &self.pixdim[1..=self.rank()]
    }

    /// Get the voxel type as a validated enum.
    pub fn data_type(&self) -> Result<NiftiType> {
        FromPrimitive::from_i16(self.datatype)
            .ok_or(NiftiError::UnsupportedVoxelType(self.datatype))
    }

    /// The spatial unit from the packed `xyzt_units` field (low 3 bits).
    pub fn xyzt_to_space(&self) -> Unit {
        Unit::from_i32(self.xyzt_units & 0o0007).unwrap_or(Unit::Unknown)
    }

    /// The temporal unit from the packed `xyzt_units` field (next 3 bits).
    pub fn xyzt_to_time(&self) -> Unit {
        Unit::from_i32(self.xyzt_units & 0o0070).unwrap_or(Unit::Unknown)
    }

    /// Per-axis units: the spatial unit on axes 0-2, the temporal unit
    /// on axis 3, unknown beyond that.
    pub fn axis_units(&self) -> Vec<Unit> {
        let space = self.xyzt_to_space();
        let time = self.xyzt_to_time();
        (0..self.rank())
            .map(|axis| match axis {
                0..=2 => space,
                3 => time,
                _ => Unit::Unknown,
            })
            .collect()
    }

    /// Export every parsed field as a flat key-value store. The result
    /// is descriptive only; nothing in the decoder consults it.
    pub fn to_metadata(&self) -> BTreeMap<String, String> {
        let mut m = BTreeMap::new();
        let version = match (self.layout, self.version) {
            (DataLayout::LegacyAnalyze, _) => "pre-NIfTI ANALYZE file".to_owned(),
            (_, NiftiVersion::Nifti1) => "1".to_owned(),
            (_, NiftiVersion::Nifti2) => "2".to_owned(),
        };
        let _ = m.insert("nifti version".to_owned(), version);
        let _ = m.insert("byte order".to_owned(), format!("{:?}", self.endianness));
        let _ = m.insert("dim info".to_owned(), self.dim_info.to_string());
        for (i, d) in self.dim.iter().enumerate() {
            let _ = m.insert(format!("dim {}", i), d.to_string());
        }
        let _ = m.insert("intent code".to_owned(), self.intent_code.to_string());
        let _ = m.insert("intent param 1".to_owned(), self.intent_p1.to_string());
        let _ = m.insert("intent param 2".to_owned(), self.intent_p2.to_string());
        let _ = m.insert("intent param 3".to_owned(), self.intent_p3.to_string());
        let _ = m.insert("data type".to_owned(), self.datatype.to_string());
        let _ = m.insert("bitpix".to_owned(), self.bitpix.to_string());
        let _ = m.insert("slice start".to_owned(), self.slice_start.to_string());
        let _ = m.insert("slice end".to_owned(), self.slice_end.to_string());
        let _ = m.insert("slice code".to_owned(), self.slice_code.to_string());
        let _ = m.insert(
            "slice duration".to_owned(),
            self.slice_duration.to_string(),
        );
        for (i, s) in self.pixdim.iter().enumerate() {
            let _ = m.insert(format!("axis {} spacing", i), s.to_string());
        }
        let _ = m.insert("vox offset".to_owned(), self.vox_offset.to_string());
        let _ = m.insert("scale slope".to_owned(), self.scl_slope.to_string());
        let _ = m.insert("scale intercept".to_owned(), self.scl_inter.to_string());
        let _ = m.insert("xyzt units".to_owned(), self.xyzt_units.to_string());
        let _ = m.insert("calibration max".to_owned(), self.cal_max.to_string());
        let _ = m.insert("calibration min".to_owned(), self.cal_min.to_string());
        let _ = m.insert("time offset".to_owned(), self.toffset.to_string());
        let _ = m.insert("qform code".to_owned(), self.qform_code.to_string());
        let _ = m.insert("sform code".to_owned(), self.sform_code.to_string());
        let _ = m.insert(
            "quaternion b parameter".to_owned(),
            self.quatern_b.to_string(),
        );
        let _ = m.insert(
            "quaternion c parameter".to_owned(),
            self.quatern_c.to_string(),
        );
        let _ = m.insert(
            "quaternion d parameter".to_owned(),
            self.quatern_d.to_string(),
        );
        let _ = m.insert("quaternion x offset".to_owned(), self.qoffset_x.to_string());
        let _ = m.insert("quaternion y offset".to_owned(), self.qoffset_y.to_string());
        let _ = m.insert("quaternion z offset".to_owned(), self.qoffset_z.to_string());
        for (row, values) in [
            ("x", &self.srow_x),
            ("y", &self.srow_y),
            ("z", &self.srow_z),
        ]
        .iter()
        {
            for (i, v) in values.iter().enumerate() {
                let _ = m.insert(format!("affine {}{}", row, i), v.to_string());
            }
        }
        let _ = m.insert("description".to_owned(), self.descrip.clone());
        let _ = m.insert("auxiliary file name".to_owned(), self.aux_file.clone());
        let _ = m.insert("intent".to_owned(), self.intent_name.clone());
        m
    }
}

fn parse_header_1<R: Read>(source: R) -> Result<NiftiHeader> {
    let mut h = NiftiHeader {
        version: NiftiVersion::Nifti1,
        ..NiftiHeader::default()
    };

    // try the system's native endianness first
    let mut endianness = Endianness::native();
    let mut input = ByteOrdered::runtime(source, endianness);

    // data_type, db_name, extents, session_error, regular: unused in NIFTI-1
    let mut unused = [0u8; 35];
    input.read_exact(&mut unused)?;
    h.dim_info = input.read_u8()?;

    // the rank decides byte order: out of range means every remaining
    // read is swapped, and the rank itself is corrected in place
    let mut rank = input.read_i16()?;
    if !(0..=7).contains(&rank) {
        rank = rank.swap_bytes();
        endianness = endianness.to_opposite();
        input = ByteOrdered::runtime(input.into_inner(), endianness);
        debug!("NIfTI-1 header is {:?}-endian", endianness);
    }
    if !(0..=7).contains(&rank) {
        return Err(NiftiError::InvalidRank(i64::from(rank)));
    }
    h.endianness = endianness;

    h.dim[0] = i64::from(rank);
    for v in &mut h.dim[1..] {
        *v = i64::from(input.read_i16()?);
    }
    h.intent_p1 = f64::from(input.read_f32()?);
    h.intent_p2 = f64::from(input.read_f32()?);
    h.intent_p3 = f64::from(input.read_f32()?);
    h.intent_code = i32::from(input.read_i16()?);
    h.datatype = input.read_i16()?;
    h.bitpix = input.read_i16()?;
    h.slice_start = i64::from(input.read_i16()?);
    for v in &mut h.pixdim {
        *v = f64::from(input.read_f32()?);
    }
    h.vox_offset = f64::from(input.read_f32()?);
    h.scl_slope = f64::from(input.read_f32()?);
    h.scl_inter = f64::from(input.read_f32()?);
    h.slice_end = i64::from(input.read_i16()?);
    h.slice_code = i32::from(input.read_u8()?);
    h.xyzt_units = i32::from(input.read_u8()?);
    h.cal_max = f64::from(input.read_f32()?);
    h.cal_min = f64::from(input.read_f32()?);
    h.slice_duration = f64::from(input.read_f32()?);
    h.toffset = f64::from(input.read_f32()?);
    // glmax, glmin: unused in NIFTI-1
    let _ = input.read_i32()?;
    let _ = input.read_i32()?;
    h.descrip = read_fixed_str(&mut input, 80)?;
    h.aux_file = read_fixed_str(&mut input, 24)?;
    h.qform_code = i32::from(input.read_i16()?);
    h.sform_code = i32::from(input.read_i16()?);
    h.quatern_b = f64::from(input.read_f32()?);
    h.quatern_c = f64::from(input.read_f32()?);
    h.quatern_d = f64::from(input.read_f32()?);
    h.qoffset_x = f64::from(input.read_f32()?);
    h.qoffset_y = f64::from(input.read_f32()?);
    h.qoffset_z = f64::from(input.read_f32()?);
    for v in &mut h.srow_x {
        *v = f64::from(input.read_f32()?);
    }
    for v in &mut h.srow_y {
        *v = f64::from(input.read_f32()?);
    }
    for v in &mut h.srow_z {
        *v = f64::from(input.read_f32()?);
    }
    h.intent_name = read_fixed_str(&mut input, 16)?;

    let mut magic = [0u8; 4];
    input.read_exact(&mut magic)?;
    h.layout = if &magic == MAGIC_CODE_NI1 {
        DataLayout::DualFile
    } else if &magic == MAGIC_CODE_NIP1 {
        DataLayout::SingleFile
    } else {
        // not a hard failure: degrade to a best-effort ANALYZE decode
        debug!("invalid NIfTI-1 magic code, treating as ANALYZE data");
        DataLayout::LegacyAnalyze
    };
    Ok(h)
}

fn parse_header_2<R: Read>(source: R) -> Result<NiftiHeader> {
    let mut h = NiftiHeader {
        version: NiftiVersion::Nifti2,
        ..NiftiHeader::default()
    };

    let mut endianness = Endianness::native();
    let mut input = ByteOrdered::runtime(source, endianness);

    // version 2 has no legacy fallback: an unknown magic aborts
    let mut magic = [0u8; 8];
    input.read_exact(&mut magic)?;
    h.layout = if &magic == MAGIC_CODE_NI2 {
        DataLayout::DualFile
    } else if &magic == MAGIC_CODE_NIP2 {
        DataLayout::SingleFile
    } else {
        return Err(NiftiError::InvalidMagic);
    };

    // these two precede the rank and are corrected below if needed
    h.datatype = input.read_i16()?;
    h.bitpix = input.read_i16()?;

    let mut rank = input.read_i64()?;
    if !(0..=7).contains(&rank) {
        rank = rank.swap_bytes();
        h.datatype = h.datatype.swap_bytes();
        h.bitpix = h.bitpix.swap_bytes();
        endianness = endianness.to_opposite();
        input = ByteOrdered::runtime(input.into_inner(), endianness);
        debug!("NIfTI-2 header is {:?}-endian", endianness);
    }
    if !(0..=7).contains(&rank) {
        return Err(NiftiError::InvalidRank(rank));
    }
    h.endianness = endianness;

    h.dim[0] = rank;
    for v in &mut h.dim[1..] {
        *v = input.read_i64()?;
    }
    h.intent_p1 = input.read_f64()?;
    h.intent_p2 = input.read_f64()?;
    h.intent_p3 = input.read_f64()?;
    for v in &mut h.pixdim {
        *v = input.read_f64()?;
    }
    h.vox_offset = input.read_i64()? as f64;
    h.scl_slope = input.read_f64()?;
    h.scl_inter = input.read_f64()?;
    h.cal_max = input.read_f64()?;
    h.cal_min = input.read_f64()?;
    h.slice_duration = input.read_f64()?;
    h.toffset = input.read_f64()?;
    h.slice_start = input.read_i64()?;
    h.slice_end = input.read_i64()?;
    h.descrip = read_fixed_str(&mut input, 80)?;
    h.aux_file = read_fixed_str(&mut input, 24)?;
    h.qform_code = input.read_i32()?;
    h.sform_code = input.read_i32()?;
    h.quatern_b = input.read_f64()?;
    h.quatern_c = input.read_f64()?;
    h.quatern_d = input.read_f64()?;
    h.qoffset_x = input.read_f64()?;
    h.qoffset_y = input.read_f64()?;
    h.qoffset_z = input.read_f64()?;
    for v in &mut h.srow_x {
        *v = input.read_f64()?;
    }
    for v in &mut h.srow_y {
        *v = input.read_f64()?;
    }
    for v in &mut h.srow_z {
        *v = input.read_f64()?;
    }
    h.slice_code = input.read_i32()?;
    h.xyzt_units = input.read_i32()?;
    h.intent_code = input.read_i32()?;
    h.intent_name = read_fixed_str(&mut input, 16)?;
    h.dim_info = input.read_u8()?;
    let mut tail = [0u8; 15];
    input.read_exact(&mut tail)?;
    Ok(h)
}
