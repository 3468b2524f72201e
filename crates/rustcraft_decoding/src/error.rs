//! NBT SAX parse/write error taxonomy (`spec.md` §7).

use rustcraft_encoding::{Canonical, CanonicalError};
use thiserror::Error;

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum NbtError {
    #[error("ran out of bytes mid-document")]
    Eof,
    #[error("the root tag was not TAG_Compound (10)")]
    FirstTagNotCompound,
    #[error("a tag byte was outside the valid range 1..=12")]
    InvalidTag,
    #[error("an array or list length was negative")]
    NegativeLength,
}

impl CanonicalError for NbtError {
    fn canonical(&self) -> Option<Canonical> {
        Some(match self {
            NbtError::Eof => Canonical::Eof,
            NbtError::FirstTagNotCompound | NbtError::InvalidTag | NbtError::NegativeLength => {
                Canonical::BadMessage
            }
        })
    }
}

impl From<rustcraft_encoding::endian::EndianError> for NbtError {
    fn from(_: rustcraft_encoding::endian::EndianError) -> Self {
        NbtError::Eof
    }
}

/// Whatever aborted a parse: either the codec itself detected a
/// malformed document, or the observer's own callback declined to
/// continue. Either way the parser reports it through a single
/// `error()` funnel before unwinding, per `spec.md` §4.11.
#[derive(Debug)]
pub enum Aborted<E> {
    Codec(NbtError),
    Observer(E),
}

/// Writer-side error: the only way `spec.md` §4.12's writer can fail is
/// a string exceeding the 16-bit length prefix's range (NBT names and
/// string values are both length-prefixed with an unsigned 16-bit count,
/// `spec.md` §3/§4.11, unlike the varint-prefixed protocol strings in
/// `rustcraft_encoding::string`).
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum NbtWriteError {
    #[error("string is longer than 65535 bytes")]
    StringTooLong,
}

impl CanonicalError for NbtWriteError {
    fn canonical(&self) -> Option<Canonical> {
        Some(Canonical::ValueTooLarge)
    }
}
