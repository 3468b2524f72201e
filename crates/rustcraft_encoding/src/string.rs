//! Length-prefixed string codec (`spec.md` §3 / §4.3): a varint byte
//! count (`0..=32767`) followed by exactly that many bytes.

use thiserror::Error;

use crate::error::{Canonical, CanonicalError};
use crate::varint::{VarintError, varint_i16};

/// The protocol's hard cap on string byte length.
pub const MAX_LEN: i16 = i16::MAX;

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum StringError {
    #[error("buffer ended before the declared length or before the length prefix itself")]
    Eof,
    #[error("declared length was negative")]
    NegativeSize,
    #[error("string is {len} bytes, exceeding the {MAX_LEN}-byte limit")]
    ValueTooLarge { len: usize },
}

impl CanonicalError for StringError {
    fn canonical(&self) -> Option<Canonical> {
        Some(match self {
            StringError::Eof => Canonical::Eof,
            StringError::NegativeSize => Canonical::ValueTooLarge,
            StringError::ValueTooLarge { .. } => Canonical::ValueTooLarge,
        })
    }
}

impl From<VarintError> for StringError {
    fn from(e: VarintError) -> Self {
        match e {
            VarintError::Eof => StringError::Eof,
            // A malformed or out-of-range length prefix is not
            // representable as a valid length either.
            VarintError::Overlong | VarintError::Overflow | VarintError::Max => {
                StringError::NegativeSize
            }
        }
    }
}

/// Appends `s`'s length-prefixed encoding to `out`.
///
/// Rejects strings longer than [`MAX_LEN`] bytes instead of truncating
/// the length prefix, which would otherwise silently corrupt it.
pub fn encode(s: &str, out: &mut Vec<u8>) -> Result<(), StringError> {
    if s.len() > MAX_LEN as usize {
        return Err(StringError::ValueTooLarge { len: s.len() });
    }
    varint_i16::encode(s.len() as i16, out);
    out.extend_from_slice(s.as_bytes());
    Ok(())
}

/// Reads a length-prefixed string from the front of `buf`.
///
/// Malformed UTF-8 within the declared byte range is replaced with the
/// Unicode replacement character rather than rejected, matching this
/// workspace's existing `PacketReader::read_string` behavior.
pub fn decode(buf: &[u8]) -> Result<(String, &[u8]), StringError> {
    let (len, rest) = varint_i16::decode(buf)?;
    if len < 0 {
        return Err(StringError::NegativeSize);
    }
    let len = len as usize;
    if rest.len() < len {
        return Err(StringError::Eof);
    }
    let (body, tail) = rest.split_at(len);
    Ok((String::from_utf8_lossy(body).into_owned(), tail))
}
