//! This module handles the optional extension blocks sitting between
//! the fixed header and the voxel data. Each block is announced by a
//! 4-byte sentinel whose first byte is nonzero, followed by its
//! declared size (which includes the 8-byte size/code prefix), a code,
//! and an opaque payload. Payloads are never interpreted, only skipped.

use crate::error::{NiftiError, Result};
use byteordered::{ByteOrdered, Endianness};
use log::debug;
use std::io::{self, ErrorKind as IoErrorKind, Read};

/// The located frame of a skipped extension block.
#[derive(Debug, PartialEq, Clone, Copy)]
pub struct Extension {
    esize: i32,
    ecode: i32,
}

impl Extension {
    /// The declared extension size (`esize` field), in bytes,
    /// including its own 8-byte prefix.
    pub fn size(&self) -> i32 {
        self.esize
    }

    /// The extension's code (`ecode` field).
    pub fn code(&self) -> i32 {
        self.ecode
    }
}

/// Consume the extension chain from the given source, leaving the read
/// cursor at the first voxel-data byte.
///
/// A sentinel precedes every block, including one final sentinel with
/// a zero first byte terminating the chain. A clean end of stream in
/// place of the first sentinel is treated as "no extensions", so that
/// header files holding nothing beyond the fixed header still decode.
pub fn skip_extensions<R: Read>(source: &mut R, endianness: Endianness) -> Result<Vec<Extension>> {
    let mut skipped = Vec::new();
    loop {
        let mut sentinel = [0u8; 4];
        match source.read_exact(&mut sentinel) {
            Ok(()) => {}
            Err(ref e) if e.kind() == IoErrorKind::UnexpectedEof && skipped.is_empty() => {
                return Ok(skipped);
            }
            Err(e) => return Err(NiftiError::from(e)),
        }
        if sentinel[0] == 0 {
            return Ok(skipped);
        }

        let mut input = ByteOrdered::runtime(&mut *source, endianness);
        let esize = input.read_i32()?;
        let ecode = input.read_i32()?;
        let payload = i64::from(esize).saturating_sub(8).max(0) as u64;
        let copied = io::copy(&mut (&mut *source).take(payload), &mut io::sink())?;
        if copied != payload {
            return Err(NiftiError::from(io::Error::from(IoErrorKind::UnexpectedEof)));
        }
        debug!("skipped extension code {} ({} bytes)", ecode, esize);
        skipped.push(Extension { esize, ecode });
    }
}
