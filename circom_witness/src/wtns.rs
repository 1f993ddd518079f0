//! The `wtns` binary witness format.
//!
//! ```text
//! "wtns" | u32 version | u32 section count
//! u32 1 | u64 len | u32 field width | modulus | u32 witness count
//! u32 2 | u64 len | witness values, each `field width` bytes
//! ```
//! All integers are little endian; values are canonical.

use std::{
    ffi::OsString,
    fs,
    io::{BufWriter, Error as IoError, ErrorKind, Write},
    path::{Path, PathBuf},
};

use ethnum::U256;

use crate::{
    field::{FieldContext, FieldElement},
    utils::{
        error::{Error, Result},
        serde::{le_u32, le_u64, SectionReader, Serde},
    },
    witness::WitnessCalculator,
};

pub const MAGIC: &[u8; 4] = b"wtns";
pub const VERSION: u32 = 2;
pub const SECTION_COUNT: u32 = 2;
pub const HEADER_SECTION: u32 = 1;
pub const WITNESS_SECTION: u32 = 2;

fn witness_count(len: usize) -> std::result::Result<u32, IoError> {
    u32::try_from(len).map_err(|_| {
        IoError::new(
            ErrorKind::InvalidInput,
            format!("{} witness values do not fit a wtns header", len),
        )
    })
}

fn witness_section_len(width: usize, count: u32) -> std::result::Result<u64, IoError> {
    (width as u64).checked_mul(count as u64).ok_or_else(|| {
        IoError::new(
            ErrorKind::InvalidInput,
            format!("witness section of {} values overflows", count),
        )
    })
}

/// Writes `witness` in the `wtns` format. Nothing is written when the
/// witness is too long for the header fields.
pub fn write_wtns_to<W: Write>(
    field: &FieldContext,
    witness: &[FieldElement],
    mut writer: W,
) -> std::result::Result<(), IoError> {
    let width = field.byte_width();
    let modulus = field.modulus().to_le_bytes();
    let count = witness_count(witness.len())?;
    let section_len = witness_section_len(width, count)?;

    writer.write_all(MAGIC)?;
    VERSION.serialize_into(&mut writer)?;
    SECTION_COUNT.serialize_into(&mut writer)?;

    HEADER_SECTION.serialize_into(&mut writer)?;
    ((4 + width + 4) as u64).serialize_into(&mut writer)?;
    (width as u32).serialize_into(&mut writer)?;
    writer.write_all(&modulus[..width])?;
    count.serialize_into(&mut writer)?;

    WITNESS_SECTION.serialize_into(&mut writer)?;
    section_len.serialize_into(&mut writer)?;
    for v in witness {
        writer.write_all(&field.to_le_bytes(v))?;
    }
    Ok(())
}

fn temp_path(path: &Path) -> PathBuf {
    let mut s = OsString::from(path.as_os_str());
    s.push(".tmp");
    PathBuf::from(s)
}

fn write_file(path: &Path, tmp: &Path, field: &FieldContext, witness: &[FieldElement]) -> Result<()> {
    let file = fs::File::create(tmp)?;
    let mut writer = BufWriter::new(file);
    write_wtns_to(field, witness, &mut writer)?;
    writer.flush()?;
    writer.into_inner().map_err(|e| e.into_error())?.sync_all()?;
    fs::rename(tmp, path)?;
    Ok(())
}

/// Writes the finished witness of `calc` to `path`.
///
/// The file is written next to `path` and renamed into place. On failure
/// neither the temporary file nor `path` is left behind.
pub fn write_wtns<P: AsRef<Path>>(calc: &WitnessCalculator, path: P) -> Result<()> {
    let path = path.as_ref();
    let witness = calc.witness()?;
    let tmp = temp_path(path);
    match write_file(path, &tmp, calc.field(), &witness) {
        Ok(()) => {
            log::debug!("wrote {} witness values to {}", witness.len(), path.display());
            Ok(())
        }
        Err(e) => {
            let _ = fs::remove_file(&tmp);
            let _ = fs::remove_file(path);
            Err(e)
        }
    }
}

/// A parsed `wtns` file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WtnsFile {
    pub version: u32,
    pub field_width: u32,
    pub modulus: U256,
    pub witness: Vec<U256>,
}

fn invalid_data(msg: String) -> Error {
    Error::IOError(IoError::new(ErrorKind::InvalidData, msg))
}

fn read_u256(bytes: &[u8]) -> U256 {
    let mut buf = [0u8; 32];
    buf[..bytes.len()].copy_from_slice(bytes);
    U256::from_le_bytes(buf)
}

impl WtnsFile {
    pub fn read(data: &[u8]) -> Result<Self> {
        let mut r = SectionReader::new(data);
        let header = r.section("wtns header", 1, 12)?;
        if &header[0..4] != MAGIC {
            return Err(invalid_data("missing wtns magic".to_string()));
        }
        let version = le_u32(&header[4..8]);
        if version != VERSION {
            return Err(invalid_data(format!("unsupported wtns version {}", version)));
        }
        let sections = le_u32(&header[8..12]);
        if sections != SECTION_COUNT {
            return Err(invalid_data(format!("expected 2 sections, found {}", sections)));
        }

        let (id, len) = Self::section_header(&mut r)?;
        if id != HEADER_SECTION {
            return Err(invalid_data(format!("expected section 1, found {}", id)));
        }
        let field_width = le_u32(r.section("field width", 1, 4)?);
        if field_width == 0 || field_width > 32 || len != 4 + field_width as u64 + 4 {
            return Err(invalid_data(format!(
                "field width {} with header section length {}",
                field_width, len
            )));
        }
        let modulus = read_u256(r.section("modulus", 1, field_width as usize)?);
        let n = le_u32(r.section("witness count", 1, 4)?) as usize;

        let (id, len) = Self::section_header(&mut r)?;
        if id != WITNESS_SECTION {
            return Err(invalid_data(format!("expected section 2, found {}", id)));
        }
        if len != field_width as u64 * n as u64 {
            return Err(invalid_data(format!(
                "witness section length {} for {} values",
                len, n
            )));
        }
        let values = r.section("witness values", n, field_width as usize)?;
        let witness = values
            .chunks_exact(field_width as usize)
            .map(read_u256)
            .collect();
        Ok(WtnsFile {
            version,
            field_width,
            modulus,
            witness,
        })
    }

    pub fn read_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::read(&fs::read(path)?)
    }

    fn section_header(r: &mut SectionReader<'_>) -> Result<(u32, u64)> {
        let h = r.section("section header", 1, 12)?;
        Ok((le_u32(&h[0..4]), le_u64(&h[4..12])))
    }
}
