//! Module for decoding complete NIfTI objects into datasets.
//!
//! The decode is one strictly sequential streaming pass: header,
//! extension chain, then voxel data, in on-disk order. When the header
//! declares a dual-file layout the voxel data comes from the companion
//! `.img` file; the extension chain still lives in the header file.
//! File handles are scoped to the decode and released on every exit
//! path.

use crate::bundle::{Axis, DataBundle, Dataset};
use crate::coords;
use crate::error::{NiftiError, Result};
use crate::extension::skip_extensions;
use crate::header::NiftiHeader;
use crate::rescale::rescale;
use crate::util::{companion_img_path, is_gz_file};
use crate::volume::{read_grid, VoxelGrid};
use flate2::bufread::GzDecoder;
use log::{debug, warn};
use std::fs::File;
use std::io::{self, BufReader, Read};
use std::path::Path;

/// Decode the NIfTI file at the given path into a result bundle.
///
/// This never fails: unrecoverable errors (unrecognized header,
/// invalid NIfTI-2 magic, unsupported voxel type, I/O failures) are
/// logged and yield an empty bundle instead. Use [`decode_file`] to
/// observe the error.
pub fn open<P: AsRef<Path>>(path: P) -> DataBundle {
    let path = path.as_ref();
    let mut bundle = DataBundle::new();
    match decode_file(path) {
        Ok(dataset) => bundle.merge(dataset),
        Err(e) => warn!("could not decode {}: {}", path.display(), e),
    }
    bundle
}

/// Decode the NIfTI file at the given path into a single dataset.
/// If the file's name ends with ".gz", it is decoded as a GZip stream.
/// A dual-file header looks for its companion volume file next to it.
pub fn decode_file<P: AsRef<Path>>(path: P) -> Result<Dataset> {
    let path = path.as_ref();
    let file = BufReader::new(File::open(path)?);
    if is_gz_file(path) {
        decode_source(path, GzDecoder::new(file))
    } else {
        decode_source(path, file)
    }
}

/// Decode a NIfTI object from a byte stream. Only single-file layouts
/// can be decoded this way; a header announcing a companion volume
/// file yields [`NiftiError::NoVolumeData`].
pub fn decode_reader<R: Read>(mut source: R) -> Result<Dataset> {
    let header = NiftiHeader::from_reader(&mut source)?;
    if header.layout.is_dual_file() {
        return Err(NiftiError::NoVolumeData);
    }
    let skipped = skip_extensions(&mut source, header.endianness)?;
    debug!("decoding stream: {} extension(s) skipped", skipped.len());
    let grid = read_grid(&mut source, &header)?;
    let grid = rescale(grid, header.scl_slope, header.scl_inter);
    Ok(assemble(String::new(), header, grid))
}

fn decode_source<R: Read>(path: &Path, mut source: R) -> Result<Dataset> {
    let header = NiftiHeader::from_reader(&mut source)?;
    // the extension chain sits in the header file in both layouts
    let skipped = skip_extensions(&mut source, header.endianness)?;
    debug!(
        "decoding {}: {} extension(s) skipped",
        path.display(),
        skipped.len()
    );

    let grid = if header.layout.is_dual_file() {
        let img_path = companion_img_path(path);
        match File::open(&img_path) {
            Ok(f) => read_grid(&mut BufReader::new(f), &header)?,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                // try a gzipped volume file instead
                let mut gz_path = img_path.into_os_string();
                gz_path.push(".gz");
                let f = File::open(gz_path).map_err(NiftiError::MissingVolumeFile)?;
                read_grid(&mut GzDecoder::new(BufReader::new(f)), &header)?
            }
            Err(e) => return Err(NiftiError::MissingVolumeFile(e)),
        }
    } else {
        read_grid(&mut source, &header)?
    };

    let grid = rescale(grid, header.scl_slope, header.scl_inter);
    Ok(assemble(path.display().to_string(), header, grid))
}

/// Attach axis tags, the coordinate space and the metadata store to a
/// decoded grid.
fn assemble(source: String, header: NiftiHeader, grid: VoxelGrid) -> Dataset {
    let units = header.axis_units();
    let axes = units
        .iter()
        .enumerate()
        .map(|(axis, unit)| Axis {
            label: match axis {
                0 => "x",
                1 => "y",
                2 => "z",
                3 => "t",
                _ => "",
            }
            .to_owned(),
            unit: unit.name().to_owned(),
        })
        .collect();
    let coordinates = coords::build(&header);
    let metadata = header.to_metadata();

    Dataset {
        name: "nifti file".to_owned(),
        source,
        grid,
        axes,
        coordinates,
        metadata,
    }
}
