//! Binary dependency records exchanged with the parent build system.
//!
//! A record is a 40-byte header followed by the resource name:
//!
//! | offset | size | field                          |
//! |--------|------|--------------------------------|
//! | 0      | 4    | status                         |
//! | 4      | 32   | checksum (all zero = unknown)  |
//! | 36     | 4    | name length                    |
//! | 40     | n    | name bytes, not NUL-terminated |
//!
//! Integers use the host byte order because the parent reads records as
//! in-memory structures.

use thiserror::Error;

/// Size in bytes of the fixed record header.
pub const HEADER_LEN: usize = 40;

/// Length of the checksum field.
pub const CHECKSUM_LEN: usize = 32;

/// Kind of resource a record describes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum Status {
    /// The reporter did not inspect the resource.
    #[default]
    Unknown = 0,
    /// The resource does not exist.
    Nonexistent = 1,
    /// A regular file.
    File = 2,
    /// A directory.
    Directory = 3,
}

impl Status {
    /// Wire value of the status.
    #[must_use]
    pub const fn code(self) -> u32 {
        self as u32
    }
}

impl TryFrom<u32> for Status {
    type Error = RecordError;

    fn try_from(code: u32) -> Result<Self, Self::Error> {
        match code {
            0 => Ok(Self::Unknown),
            1 => Ok(Self::Nonexistent),
            2 => Ok(Self::File),
            3 => Ok(Self::Directory),
            other => Err(RecordError::UnknownStatus(other)),
        }
    }
}

/// Malformed input found while decoding records.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RecordError {
    /// Fewer bytes than a full header remain.
    #[error("record header truncated: only {available} bytes available")]
    TruncatedHeader {
        /// Bytes left in the input.
        available: usize,
    },
    /// The header announces more name bytes than remain.
    #[error("record name truncated: expected {expected} bytes, found {available}")]
    TruncatedName {
        /// Name length announced by the header.
        expected: usize,
        /// Bytes left after the header.
        available: usize,
    },
    /// The status field holds an unrecognised value.
    #[error("unknown dependency status {0}")]
    UnknownStatus(u32),
}

/// One implicit input or output.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Dependency {
    /// What kind of resource `name` refers to.
    pub status: Status,
    /// SHA-256 of the resource; all zero asks the parent to compute it.
    pub checksum: [u8; CHECKSUM_LEN],
    /// Resource name, usually a path relative to the working directory.
    pub name: Vec<u8>,
}

impl Dependency {
    /// A record carrying only a name: unknown status and no checksum.
    #[must_use]
    pub fn named(name: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Return `true` when the checksum has been filled in.
    #[must_use]
    pub fn has_checksum(&self) -> bool {
        self.checksum.iter().any(|byte| *byte != 0)
    }

    /// Serialise the record. Names longer than `u32::MAX` bytes are
    /// truncated.
    #[must_use]
    pub fn encode(&self) -> Vec<u8> {
        encode_parts(self.status, &self.checksum, &self.name)
    }

    /// Decode one record from the front of `bytes`, returning it with the
    /// unread remainder.
    ///
    /// # Errors
    ///
    /// Returns a [`RecordError`] when the input is truncated or the status
    /// is not recognised.
    pub fn decode(bytes: &[u8]) -> Result<(Self, &[u8]), RecordError> {
        let truncated = || RecordError::TruncatedHeader {
            available: bytes.len(),
        };
        let (status_code, after_status) =
            bytes.split_first_chunk::<4>().ok_or_else(truncated)?;
        let (checksum, after_checksum) = after_status
            .split_first_chunk::<CHECKSUM_LEN>()
            .ok_or_else(truncated)?;
        let (length, body) = after_checksum
            .split_first_chunk::<4>()
            .ok_or_else(truncated)?;

        let status = Status::try_from(read_u32(*status_code))?;
        let expected = usize::try_from(read_u32(*length)).unwrap_or(usize::MAX);
        if body.len() < expected {
            return Err(RecordError::TruncatedName {
                expected,
                available: body.len(),
            });
        }
        let (name, remainder) = body.split_at(expected);
        let record = Self {
            status,
            checksum: *checksum,
            name: name.to_vec(),
        };
        Ok((record, remainder))
    }

    /// Decode a stream of back-to-back records.
    ///
    /// # Errors
    ///
    /// Fails on the first malformed record.
    pub fn decode_all(mut bytes: &[u8]) -> Result<Vec<Self>, RecordError> {
        let mut records = Vec::new();
        while !bytes.is_empty() {
            let (record, rest) = Self::decode(bytes)?;
            records.push(record);
            bytes = rest;
        }
        Ok(records)
    }
}

/// Clamp a name length to what the header can express.
pub(crate) fn clamp_length(len: usize) -> u32 {
    u32::try_from(len).unwrap_or(u32::MAX)
}

pub(crate) fn encode_parts(status: Status, checksum: &[u8; CHECKSUM_LEN], name: &[u8]) -> Vec<u8> {
    let length = clamp_length(name.len());
    let kept = usize::try_from(length).unwrap_or(usize::MAX);
    let kept_name = name.get(..kept).unwrap_or(name);

    let mut out = Vec::with_capacity(HEADER_LEN + kept_name.len());
    out.extend_from_slice(&write_u32(status.code()));
    out.extend_from_slice(checksum);
    out.extend_from_slice(&write_u32(length));
    out.extend_from_slice(kept_name);
    out
}

#[expect(
    clippy::host_endian_bytes,
    reason = "the parent reads headers as native in-memory structs"
)]
const fn write_u32(value: u32) -> [u8; 4] {
    value.to_ne_bytes()
}

#[expect(
    clippy::host_endian_bytes,
    reason = "the parent writes headers as native in-memory structs"
)]
const fn read_u32(bytes: [u8; 4]) -> u32 {
    u32::from_ne_bytes(bytes)
}
