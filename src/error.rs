//! Error types for the decoder.

use quick_error::quick_error;
use std::io::Error as IoError;

quick_error! {
    /// Error type for everything that can go wrong while decoding a
    /// NIfTI file.
    #[derive(Debug)]
    pub enum NiftiError {
        /// The first four bytes are neither a NIfTI-1 nor a NIfTI-2
        /// header size, in either byte order.
        UnrecognizedHeader(size: i32) {
            display("unrecognized header size {}", size)
        }
        /// A NIfTI-2 header carried an unknown magic code. Unlike
        /// NIfTI-1, version 2 has no legacy fallback.
        InvalidMagic {
            display("invalid NIfTI-2 magic code")
        }
        /// The number of dimensions is outside 0..=7 even after the
        /// byte-order correction.
        InvalidRank(rank: i64) {
            display("number of dimensions {} out of range", rank)
        }
        /// An axis was declared with a negative or unaddressable length.
        InvalidDimension(axis: usize, len: i64) {
            display("axis {} has invalid length {}", axis, len)
        }
        /// The header declared a voxel type code outside the 16 known ones.
        UnsupportedVoxelType(code: i16) {
            display("unsupported voxel type code {}", code)
        }
        /// The source only contains (or claims to only contain) a header.
        NoVolumeData {
            display("source contains no voxel data")
        }
        /// The companion volume file of a header file could not be opened.
        MissingVolumeFile(err: IoError) {
            display("could not open volume file: {}", err)
        }
        /// I/O error
        Io(err: IoError) {
            from()
            source(err)
            display("I/O error: {}", err)
        }
    }
}

/// Alias type for results originated from this crate.
pub type Result<T> = ::std::result::Result<T, NiftiError>;
