//! Private utility module
use crate::error::Result;
use std::io::Read;
use std::path::{Path, PathBuf};

/// Check that the given path ends with a ".gz" extension.
pub fn is_gz_file<P: AsRef<Path>>(path: P) -> bool {
    path.as_ref()
        .file_name()
        .map(|a| a.to_string_lossy().ends_with(".gz"))
        .unwrap_or(false)
}

/// Derive the path to the companion volume file of a header file:
/// the final four characters (".hdr") are replaced by ".img". A ".gz"
/// suffix is stripped before the swap.
pub fn companion_img_path<P: AsRef<Path>>(path: P) -> PathBuf {
    let mut name = path.as_ref().to_string_lossy().into_owned();
    if name.ends_with(".gz") {
        name.truncate(name.len() - 3);
    }
    if name.len() >= 4 {
        name.truncate(name.len() - 4);
    }
    name.push_str(".img");
    PathBuf::from(name)
}

/// Read a fixed-width string field: the full width is always consumed,
/// and the value is truncated at the first zero byte.
pub fn read_fixed_str<R: Read>(source: &mut R, width: usize) -> Result<String> {
    let mut buf = vec![0u8; width];
    source.read_exact(&mut buf)?;
    let end = buf.iter().position(|&b| b == 0).unwrap_or(width);
    Ok(String::from_utf8_lossy(&buf[..end]).into_owned())
}
