use std::io::{Error as IoError, Read, Write};

use ethnum::U256;

use super::error::{Error, Result};

/// Little-endian fixed-width encoding used by the binary artifacts.
pub trait Serde: Sized {
    fn serialize_into<W: Write>(&self, writer: W) -> std::result::Result<(), IoError>;
    fn deserialize_from<R: Read>(reader: R) -> std::result::Result<Self, IoError>;
}

impl Serde for u32 {
    fn serialize_into<W: Write>(&self, mut writer: W) -> std::result::Result<(), IoError> {
        writer.write_all(&self.to_le_bytes())
    }

    fn deserialize_from<R: Read>(mut reader: R) -> std::result::Result<Self, IoError> {
        let mut u = [0u8; 4];
        reader.read_exact(&mut u)?;
        Ok(u32::from_le_bytes(u))
    }
}

impl Serde for u64 {
    fn serialize_into<W: Write>(&self, mut writer: W) -> std::result::Result<(), IoError> {
        writer.write_all(&self.to_le_bytes())
    }

    fn deserialize_from<R: Read>(mut reader: R) -> std::result::Result<Self, IoError> {
        let mut u = [0u8; 8];
        reader.read_exact(&mut u)?;
        Ok(u64::from_le_bytes(u))
    }
}

impl Serde for U256 {
    fn serialize_into<W: Write>(&self, mut writer: W) -> std::result::Result<(), IoError> {
        writer.write_all(&self.to_le_bytes())
    }

    fn deserialize_from<R: Read>(mut reader: R) -> std::result::Result<Self, IoError> {
        let mut bytes = [0u8; 32];
        reader.read_exact(&mut bytes)?;
        Ok(Self::from_le_bytes(bytes))
    }
}

/// Sequential reader over an in-memory artifact. Every section is checked
/// against the artifact length before any of its bytes are touched.
pub struct SectionReader<'a> {
    data: &'a [u8],
    offset: usize,
}

impl<'a> SectionReader<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        SectionReader { data, offset: 0 }
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn remaining(&self) -> usize {
        self.data.len() - self.offset
    }

    /// Claims the next `count * width` bytes as section `name`.
    pub fn section(&mut self, name: &'static str, count: usize, width: usize) -> Result<&'a [u8]> {
        let truncated = |end: usize| Error::TruncatedArtifact {
            section: name,
            offset: self.offset,
            end,
            len: self.data.len(),
        };
        let len = count.checked_mul(width).ok_or_else(|| truncated(usize::MAX))?;
        let end = self
            .offset
            .checked_add(len)
            .ok_or_else(|| truncated(usize::MAX))?;
        if end > self.data.len() {
            return Err(truncated(end));
        }
        let data = self.data;
        let res = &data[self.offset..end];
        self.offset = end;
        Ok(res)
    }
}

pub fn le_u32(bytes: &[u8]) -> u32 {
    let mut u = [0u8; 4];
    u.copy_from_slice(&bytes[..4]);
    u32::from_le_bytes(u)
}

pub fn le_u64(bytes: &[u8]) -> u64 {
    let mut u = [0u8; 8];
    u.copy_from_slice(&bytes[..8]);
    u64::from_le_bytes(u)
}
