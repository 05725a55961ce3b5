//! Rust decoder for the NIfTI-1 and NIfTI-2 neuroimaging file formats.
//!
//! A decode is a single streaming pass over one file (or a
//! header/volume pair), producing a fully materialized,
//! axis-tagged voxel grid together with a physical coordinate space
//! and the parsed header fields as metadata. The sixteen voxel types
//! of the standard are supported, including the packed 1-bit type and
//! the 128-bit float types, with byte order detected at run time.
//!
//! # Example
//!
//! ```no_run
//! let bundle = nifti_grid::open("volume.nii.gz");
//! for (kind, dataset) in bundle.iter() {
//!     println!("{:?}: {:?}", kind, dataset.grid.shape());
//! }
//! ```
#![deny(missing_debug_implementations)]
#![warn(missing_docs, unused_extern_crates, trivial_casts)]

pub mod bundle;
pub mod coords;
pub mod error;
pub mod extension;
pub mod header;
pub mod object;
pub mod quad;
pub mod rescale;
pub mod typedef;
mod util;
pub mod volume;

pub use crate::bundle::{Axis, DataBundle, Dataset};
pub use crate::coords::CoordinateSpace;
pub use crate::error::{NiftiError, Result};
pub use crate::header::{DataLayout, NiftiHeader, NiftiVersion};
pub use crate::object::{decode_file, decode_reader, open};
pub use crate::typedef::{NiftiType, Unit};
pub use crate::volume::{ElementKind, VoxelGrid};
