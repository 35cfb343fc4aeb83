//! The fixed-width `ar` entry header and its 60-byte wire encoding.
//!
//! ```text
//! !<arch>
//! debian-binary   1282478016  0     0     100644  4         `
//! 2.0
//! control.tar.gz  1282478016  0     0     100644  444       `
//! ```

use std::convert::TryFrom;
use std::fmt;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use byteorder::{BigEndian, ByteOrder};

use crate::error::{Error, HeaderError};

/// Preamble at the start of every archive.
pub const MAGIC: &[u8; 8] = b"!<arch>\n";

/// Size of an encoded entry header.
pub const HEADER_SIZE: usize = 60;

/// Last two bytes of every entry header.
pub const HEADER_TERMINATOR: [u8; 2] = *b"`\n";

/// Appended after an entry whose payload has an odd length.
pub const PAD_BYTE: u8 = b'\n';

const TERMINATOR_OFFSET: usize = HEADER_SIZE - HEADER_TERMINATOR.len();

// Mode column prefix marking the entry as a regular file.
const REGULAR_FILE: &str = "10";
const PERMISSION_BITS: u32 = 0o7777;

/// A column of the header block, in wire order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Name,
    ModTime,
    Gid,
    Uid,
    Mode,
    Size,
}

impl Field {
    /// Column width in bytes.
    pub const fn width(self) -> usize {
        match self {
            Field::Name => 16,
            Field::ModTime => 12,
            Field::Gid => 6,
            Field::Uid => 6,
            Field::Mode => 8,
            Field::Size => 10,
        }
    }

    /// Byte offset of the column within the header block.
    pub const fn offset(self) -> usize {
        match self {
            Field::Name => 0,
            Field::ModTime => 16,
            Field::Gid => 28,
            Field::Uid => 34,
            Field::Mode => 40,
            Field::Size => 48,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Field::Name => "name",
            Field::ModTime => "modification time",
            Field::Gid => "gid",
            Field::Uid => "uid",
            Field::Mode => "mode",
            Field::Size => "size",
        }
    }

    fn slice(self, block: &[u8; HEADER_SIZE]) -> &[u8] {
        &block[self.offset()..self.offset() + self.width()]
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Metadata for one archive entry.
///
/// Only regular files can be described: the mode column is always written
/// with the regular file type, and `mode` itself holds permission bits only.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Header {
    /// Relative entry name. At most 16 bytes, no leading `/` or drive letter.
    pub name: String,
    /// Modification time in seconds since the Unix epoch.
    pub mtime: u64,
    pub uid: u32,
    pub gid: u32,
    /// Permission bits, e.g. `0o644`.
    pub mode: u32,
    /// Payload length in bytes.
    pub size: u64,
}

impl Header {
    /// A header for a `size` byte entry owned by root, with mode `0o644`.
    pub fn new<S: Into<String>>(name: S, size: u64) -> Header {
        Header {
            name: name.into(),
            mode: 0o644,
            size,
            ..Default::default()
        }
    }

    #[inline]
    pub fn modified(&self) -> SystemTime {
        UNIX_EPOCH + Duration::from_secs(self.mtime)
    }

    /// Times before the epoch are clamped to it.
    pub fn set_modified(&mut self, time: SystemTime) {
        self.mtime = time
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0);
    }

    /// Whether an alignment byte follows the payload.
    #[inline]
    pub fn is_padded(&self) -> bool {
        self.size % 2 == 1
    }

    /// Encodes the header into its 60-byte block.
    ///
    /// Columns are written in the order name, mtime, gid, uid, mode, size.
    pub fn encode(&self) -> Result<[u8; HEADER_SIZE], Error> {
        validate_name(&self.name)?;

        let mut block = [b' '; HEADER_SIZE];
        put_field(&mut block, Field::Name, self.name.as_bytes())?;
        put_field(&mut block, Field::ModTime, self.mtime.to_string().as_bytes())?;
        put_field(&mut block, Field::Gid, self.gid.to_string().as_bytes())?;
        put_field(&mut block, Field::Uid, self.uid.to_string().as_bytes())?;
        let mode = format!("{}{:04o}", REGULAR_FILE, self.mode & PERMISSION_BITS);
        put_field(&mut block, Field::Mode, mode.as_bytes())?;
        put_field(&mut block, Field::Size, self.size.to_string().as_bytes())?;
        block[TERMINATOR_OFFSET..].copy_from_slice(&HEADER_TERMINATOR);

        Ok(block)
    }

    /// Decodes a 60-byte block.
    ///
    /// Numeric columns are decimal. Mode is octal, falling back to decimal
    /// permission bits after the `10` type prefix when the column holds an
    /// `8` or `9`. A column whose first byte has its high bit set holds a
    /// big-endian binary number instead.
    pub fn decode(block: &[u8; HEADER_SIZE]) -> Result<Header, Error> {
        let terminator = [block[TERMINATOR_OFFSET], block[TERMINATOR_OFFSET + 1]];
        if terminator != HEADER_TERMINATOR {
            return Err(HeaderError::BadTerminator(terminator).into());
        }

        let name = Field::Name.slice(block);
        let name = std::str::from_utf8(trim_end(name, b" \0"))
            .map_err(|_| HeaderError::InvalidUtf8)?
            .to_owned();

        let mtime = parse_numeric(block, Field::ModTime, 10)?;
        let gid = parse_numeric(block, Field::Gid, 10)?;
        let uid = parse_numeric(block, Field::Uid, 10)?;
        let mode = parse_mode(block)?;
        let size = parse_numeric(block, Field::Size, 10)?;

        Ok(Header {
            name,
            mtime,
            uid,
            gid,
            mode,
            size,
        })
    }
}

fn validate_name(name: &str) -> Result<(), Error> {
    let bytes = name.as_bytes();
    let has_drive = bytes.len() >= 2 && bytes[0].is_ascii_alphabetic() && bytes[1] == b':';

    if name.is_empty() || name.starts_with('/') || name.contains('\\') || has_drive {
        return Err(Error::InvalidName(name.to_string()));
    }

    Ok(())
}

fn put_field(block: &mut [u8; HEADER_SIZE], field: Field, value: &[u8]) -> Result<(), Error> {
    if value.len() > field.width() {
        return Err(Error::FieldTooLong {
            field,
            len: value.len(),
            max: field.width(),
        });
    }

    let start = field.offset();
    block[start..start + value.len()].copy_from_slice(value);
    Ok(())
}

fn parse_numeric<T: TryFrom<u128>>(
    block: &[u8; HEADER_SIZE],
    field: Field,
    radix: u32,
) -> Result<T, HeaderError> {
    let bytes = field.slice(block);

    let value = if bytes[0] & 0x80 != 0 {
        let raw = BigEndian::read_uint128(bytes, bytes.len());
        raw & !(0x80u128 << (8 * (bytes.len() - 1)))
    } else {
        let text = trim_end(trim_start(bytes, b" "), b" \0");
        std::str::from_utf8(text)
            .ok()
            .filter(|s| s.bytes().all(|b| b.is_ascii_digit()))
            .and_then(|s| u128::from_str_radix(s, radix).ok())
            .ok_or_else(|| HeaderError::InvalidField {
                field,
                value: String::from_utf8_lossy(bytes).trim().to_string(),
            })?
    };

    T::try_from(value).map_err(|_| HeaderError::Overflow { field })
}

fn parse_mode(block: &[u8; HEADER_SIZE]) -> Result<u32, HeaderError> {
    let err = match parse_numeric::<u32>(block, Field::Mode, 8) {
        Ok(mode) => return Ok(mode & PERMISSION_BITS),
        Err(err @ HeaderError::InvalidField { .. }) => err,
        Err(err) => return Err(err),
    };

    // Some writers put the permission bits in decimal, e.g. `10493` for 0o755.
    let text = trim_end(trim_start(Field::Mode.slice(block), b" "), b" \0");
    std::str::from_utf8(text)
        .ok()
        .map(|s| s.strip_prefix(REGULAR_FILE).unwrap_or(s))
        .filter(|s| !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit()))
        .and_then(|s| s.parse::<u32>().ok())
        .map(|mode| mode & PERMISSION_BITS)
        .ok_or(err)
}

fn trim_start<'a>(mut bytes: &'a [u8], strip: &[u8]) -> &'a [u8] {
    while let [first, rest @ ..] = bytes {
        if !strip.contains(first) {
            break;
        }
        bytes = rest;
    }
    bytes
}

fn trim_end<'a>(mut bytes: &'a [u8], strip: &[u8]) -> &'a [u8] {
    while let [rest @ .., last] = bytes {
        if !strip.contains(last) {
            break;
        }
        bytes = rest;
    }
    bytes
}
