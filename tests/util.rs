//! Shared builders for synthesizing NIfTI byte streams in tests.
#![allow(dead_code)]

pub fn put_i16(buf: &mut [u8], off: usize, v: i16, be: bool) {
    let b = if be { v.to_be_bytes() } else { v.to_le_bytes() };
    buf[off..off + 2].copy_from_slice(&b);
}

pub fn put_i32(buf: &mut [u8], off: usize, v: i32, be: bool) {
    let b = if be { v.to_be_bytes() } else { v.to_le_bytes() };
    buf[off..off + 4].copy_from_slice(&b);
}

pub fn put_i64(buf: &mut [u8], off: usize, v: i64, be: bool) {
    let b = if be { v.to_be_bytes() } else { v.to_le_bytes() };
    buf[off..off + 8].copy_from_slice(&b);
}

pub fn put_f32(buf: &mut [u8], off: usize, v: f32, be: bool) {
    let b = if be { v.to_be_bytes() } else { v.to_le_bytes() };
    buf[off..off + 4].copy_from_slice(&b);
}

pub fn put_f64(buf: &mut [u8], off: usize, v: f64, be: bool) {
    let b = if be { v.to_be_bytes() } else { v.to_le_bytes() };
    buf[off..off + 8].copy_from_slice(&b);
}

/// Parameters of a synthesized NIfTI-1 file.
pub struct Nifti1Spec {
    pub dims: Vec<i16>,
    pub datatype: i16,
    pub bitpix: i16,
    pub spacings: Vec<f32>,
    pub scl_slope: f32,
    pub scl_inter: f32,
    pub toffset: f32,
    pub xyzt_units: u8,
    pub srow_x: [f32; 4],
    pub srow_y: [f32; 4],
    pub srow_z: [f32; 4],
    pub magic: [u8; 4],
    pub big_endian: bool,
}

impl Default for Nifti1Spec {
    fn default() -> Self {
        Nifti1Spec {
            dims: vec![],
            datatype: 2,
            bitpix: 8,
            spacings: vec![],
            scl_slope: 0.,
            scl_inter: 0.,
            toffset: 0.,
            xyzt_units: 0,
            srow_x: [0.; 4],
            srow_y: [0.; 4],
            srow_z: [0.; 4],
            magic: *b"n+1\0",
            big_endian: false,
        }
    }
}

impl Nifti1Spec {
    /// The fixed 348-byte header.
    pub fn header_bytes(&self) -> Vec<u8> {
        let be = self.big_endian;
        let mut buf = vec![0u8; 348];
        put_i32(&mut buf, 0, 348, be);
        put_i16(&mut buf, 40, self.dims.len() as i16, be);
        for (i, d) in self.dims.iter().enumerate() {
            put_i16(&mut buf, 42 + 2 * i, *d, be);
        }
        put_i16(&mut buf, 70, self.datatype, be);
        put_i16(&mut buf, 72, self.bitpix, be);
        for (i, s) in self.spacings.iter().enumerate() {
            put_f32(&mut buf, 80 + 4 * i, *s, be);
        }
        put_f32(&mut buf, 108, 352., be);
        put_f32(&mut buf, 112, self.scl_slope, be);
        put_f32(&mut buf, 116, self.scl_inter, be);
        buf[123] = self.xyzt_units;
        put_f32(&mut buf, 136, self.toffset, be);
        for (i, v) in self.srow_x.iter().enumerate() {
            put_f32(&mut buf, 280 + 4 * i, *v, be);
        }
        for (i, v) in self.srow_y.iter().enumerate() {
            put_f32(&mut buf, 296 + 4 * i, *v, be);
        }
        for (i, v) in self.srow_z.iter().enumerate() {
            put_f32(&mut buf, 312 + 4 * i, *v, be);
        }
        buf[344..348].copy_from_slice(&self.magic);
        buf
    }

    /// A complete single-file stream: header, empty extender frame,
    /// voxel data.
    pub fn single_file(&self, voxels: &[u8]) -> Vec<u8> {
        let mut out = self.header_bytes();
        out.extend_from_slice(&[0, 0, 0, 0]);
        out.extend_from_slice(voxels);
        out
    }

    /// A single-file stream with an extension chain between the header
    /// and the voxel data. Extensions are given as (code, payload).
    pub fn single_file_with_extensions(&self, extensions: &[(i32, &[u8])], voxels: &[u8]) -> Vec<u8> {
        let be = self.big_endian;
        let mut out = self.header_bytes();
        for (code, payload) in extensions {
            out.extend_from_slice(&[1, 0, 0, 0]);
            let mut frame = [0u8; 8];
            put_i32(&mut frame, 0, payload.len() as i32 + 8, be);
            put_i32(&mut frame, 4, *code, be);
            out.extend_from_slice(&frame);
            out.extend_from_slice(payload);
        }
        out.extend_from_slice(&[0, 0, 0, 0]);
        out.extend_from_slice(voxels);
        out
    }
}

/// Parameters of a synthesized NIfTI-2 file.
pub struct Nifti2Spec {
    pub dims: Vec<i64>,
    pub datatype: i16,
    pub bitpix: i16,
    pub spacings: Vec<f64>,
    pub scl_slope: f64,
    pub scl_inter: f64,
    pub magic: [u8; 8],
    pub big_endian: bool,
}

impl Default for Nifti2Spec {
    fn default() -> Self {
        Nifti2Spec {
            dims: vec![],
            datatype: 2,
            bitpix: 8,
            spacings: vec![],
            scl_slope: 0.,
            scl_inter: 0.,
            magic: *b"n+2\0\0\0\0\0",
            big_endian: false,
        }
    }
}

impl Nifti2Spec {
    /// The fixed 540-byte header.
    pub fn header_bytes(&self) -> Vec<u8> {
        let be = self.big_endian;
        let mut buf = vec![0u8; 540];
        put_i32(&mut buf, 0, 540, be);
        buf[4..12].copy_from_slice(&self.magic);
        put_i16(&mut buf, 12, self.datatype, be);
        put_i16(&mut buf, 14, self.bitpix, be);
        put_i64(&mut buf, 16, self.dims.len() as i64, be);
        for (i, d) in self.dims.iter().enumerate() {
            put_i64(&mut buf, 24 + 8 * i, *d, be);
        }
        for (i, s) in self.spacings.iter().enumerate() {
            put_f64(&mut buf, 112 + 8 * i, *s, be);
        }
        put_i64(&mut buf, 168, 544, be);
        put_f64(&mut buf, 176, self.scl_slope, be);
        put_f64(&mut buf, 184, self.scl_inter, be);
        buf
    }

    /// A complete single-file stream: header, empty extender frame,
    /// voxel data.
    pub fn single_file(&self, voxels: &[u8]) -> Vec<u8> {
        let mut out = self.header_bytes();
        out.extend_from_slice(&[0, 0, 0, 0]);
        out.extend_from_slice(voxels);
        out
    }
}

/// Encode a slice of i16 voxel values in the given byte order.
pub fn i16_voxels(values: &[i16], be: bool) -> Vec<u8> {
    values
        .iter()
        .flat_map(|v| {
            if be {
                v.to_be_bytes().to_vec()
            } else {
                v.to_le_bytes().to_vec()
            }
        })
        .collect()
}

/// Encode a slice of f32 voxel values in the given byte order.
pub fn f32_voxels(values: &[f32], be: bool) -> Vec<u8> {
    values
        .iter()
        .flat_map(|v| {
            if be {
                v.to_be_bytes().to_vec()
            } else {
                v.to_le_bytes().to_vec()
            }
        })
        .collect()
}

/// Encode a slice of i64 voxel values in the given byte order.
pub fn i64_voxels(values: &[i64], be: bool) -> Vec<u8> {
    values
        .iter()
        .flat_map(|v| {
            if be {
                v.to_be_bytes().to_vec()
            } else {
                v.to_le_bytes().to_vec()
            }
        })
        .collect()
}
