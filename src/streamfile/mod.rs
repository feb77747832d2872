//! Byte sources the recognizers and decoders read from

pub mod memory;
pub mod stdio;

pub use memory::MemoryStreamFile;
pub use stdio::StdioStreamFile;

use crate::error::{VgmError, VgmResult};
use byteorder::{BigEndian, ByteOrder, LittleEndian};
use std::fmt;
use std::sync::Arc;

/// Buffer size used when a byte source opens a sibling
pub const DEFAULT_BUFFER_SIZE: usize = 0x8000;

/// A named, random-access byte source.
///
/// Handles are shared between channels (and nested sessions) through
/// [`StreamFileRef`]; the underlying resource is released when the last
/// reference is dropped.
pub trait StreamFile: Send + Sync + fmt::Debug {
    /// Read up to `buf.len()` bytes at `offset`, returning how many were read.
    /// Reads past the end return a short count, never an error.
    fn read_at(&self, offset: u64, buf: &mut [u8]) -> usize;

    /// Total size in bytes
    fn size(&self) -> u64;

    /// Name of the resource, used for extension sniffing and sibling names
    fn name(&self) -> &str;

    /// Open another resource by name, resolved relative to this one
    fn open(&self, name: &str, buffer_size: usize) -> VgmResult<StreamFileRef>;
}

/// Shared handle to a byte source
pub type StreamFileRef = Arc<dyn StreamFile>;

/// Typed reads on top of [`StreamFile::read_at`]
pub trait StreamFileExt {
    /// Fill `buf` completely or fail with [`VgmError::ReadOutOfBounds`]
    fn read_exact_at(&self, offset: u64, buf: &mut [u8]) -> VgmResult<()>;

    /// Read one unsigned byte
    fn read_u8(&self, offset: u64) -> VgmResult<u8> {
        let mut buf = [0u8; 1];
        self.read_exact_at(offset, &mut buf)?;
        Ok(buf[0])
    }

    /// Read one signed byte
    fn read_i8(&self, offset: u64) -> VgmResult<i8> {
        Ok(self.read_u8(offset)? as i8)
    }

    /// Read a big-endian u16
    fn read_u16_be(&self, offset: u64) -> VgmResult<u16> {
        let mut buf = [0u8; 2];
        self.read_exact_at(offset, &mut buf)?;
        Ok(BigEndian::read_u16(&buf))
    }

    /// Read a little-endian u16
    fn read_u16_le(&self, offset: u64) -> VgmResult<u16> {
        let mut buf = [0u8; 2];
        self.read_exact_at(offset, &mut buf)?;
        Ok(LittleEndian::read_u16(&buf))
    }

    /// Read a big-endian i16
    fn read_i16_be(&self, offset: u64) -> VgmResult<i16> {
        Ok(self.read_u16_be(offset)? as i16)
    }

    /// Read a little-endian i16
    fn read_i16_le(&self, offset: u64) -> VgmResult<i16> {
        Ok(self.read_u16_le(offset)? as i16)
    }

    /// Read a big-endian u32
    fn read_u32_be(&self, offset: u64) -> VgmResult<u32> {
        let mut buf = [0u8; 4];
        self.read_exact_at(offset, &mut buf)?;
        Ok(BigEndian::read_u32(&buf))
    }

    /// Read a little-endian u32
    fn read_u32_le(&self, offset: u64) -> VgmResult<u32> {
        let mut buf = [0u8; 4];
        self.read_exact_at(offset, &mut buf)?;
        Ok(LittleEndian::read_u32(&buf))
    }

    /// Read a big-endian i32
    fn read_i32_be(&self, offset: u64) -> VgmResult<i32> {
        Ok(self.read_u32_be(offset)? as i32)
    }

    /// Read a little-endian i32
    fn read_i32_le(&self, offset: u64) -> VgmResult<i32> {
        Ok(self.read_u32_le(offset)? as i32)
    }

    /// Check a four-byte tag at `offset`
    fn check_id(&self, offset: u64, id: &[u8; 4]) -> bool {
        let mut buf = [0u8; 4];
        self.read_exact_at(offset, &mut buf).is_ok() && &buf == id
    }
}

impl<T: StreamFile + ?Sized> StreamFileExt for T {
    fn read_exact_at(&self, offset: u64, buf: &mut [u8]) -> VgmResult<()> {
        if self.read_at(offset, buf) != buf.len() {
            return Err(VgmError::ReadOutOfBounds {
                offset,
                len: buf.len(),
            });
        }
        Ok(())
    }
}

/// Extension of a file name without the dot, or "" when there is none
pub fn filename_extension(name: &str) -> &str {
    let base = base_name(name);
    match base.rfind('.') {
        Some(dot) => &base[dot + 1..],
        None => "",
    }
}

/// Final path component of a name, accepting both separator styles
pub fn base_name(name: &str) -> &str {
    match name.rfind(['/', '\\']) {
        Some(sep) => &name[sep + 1..],
        None => name,
    }
}

/// True when `name` has extension `ext` (ASCII case-insensitive)
pub fn has_extension(name: &str, ext: &str) -> bool {
    filename_extension(name).eq_ignore_ascii_case(ext)
}
