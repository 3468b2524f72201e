//! Compression envelope (`spec.md` §4.10): above framing, a declared-
//! uncompressed-size varint header guards a zlib-deflate body. Below a
//! caller-chosen threshold the body is sent literally instead (the
//! `proceed` predicate decides which applies).

use std::io::{Read, Write};

use bytes::BytesMut;
use flate2::Compression;
use flate2::read::ZlibDecoder;
use flate2::write::ZlibEncoder;
use rustcraft_encoding::checked::checked_cast;
use rustcraft_encoding::error::{Canonical, CanonicalError};
use rustcraft_encoding::varint::{self, VarintError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CompressError {
    #[error("uncompressed size does not fit in a signed 32-bit header")]
    SizeOverflow,
    #[error("deflate failed: {0}")]
    Io(#[from] std::io::Error),
}

impl CanonicalError for CompressError {
    fn canonical(&self) -> Option<Canonical> {
        match self {
            CompressError::SizeOverflow => Some(Canonical::ValueTooLarge),
            CompressError::Io(_) => None,
        }
    }
}

#[derive(Debug, Error)]
pub enum DecompressError {
    #[error("varint declared-size header: {0}")]
    Varint(#[from] VarintError),
    #[error("declared uncompressed size was negative")]
    NegativeSize,
    /// Trailing bytes remained after the deflate stream ended.
    #[error("input had bytes left over after the deflate stream ended")]
    Padded,
    /// Inflate produced a different number of bytes than the header declared.
    #[error("inflated {actual} bytes but the header declared {declared}")]
    WrongLength { declared: i32, actual: u64 },
    #[error("inflate failed: {0}")]
    Io(#[from] std::io::Error),
}

impl CanonicalError for DecompressError {
    fn canonical(&self) -> Option<Canonical> {
        match self {
            DecompressError::Varint(e) => e.canonical(),
            DecompressError::NegativeSize => Some(Canonical::ValueTooLarge),
            // spec.md §9 open question: left deliberately unmapped.
            DecompressError::Padded | DecompressError::WrongLength { .. } => None,
            DecompressError::Io(_) => None,
        }
    }
}

/// Writes `varint(uncompressed_len) || deflate(body)` into `out`.
pub fn compress(body: &[u8], out: &mut BytesMut) -> Result<(), CompressError> {
    let declared: i32 = checked_cast(body.len()).ok_or(CompressError::SizeOverflow)?;
    let mut header = Vec::with_capacity(varint::max_size(32));
    varint::varint_i32::encode(declared, &mut header);
    out.extend_from_slice(&header);

    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(body)?;
    let compressed = encoder.finish()?;
    out.extend_from_slice(&compressed);
    Ok(())
}

/// Outcome of [`decompress`]: either the `proceed` predicate declined
/// (the body was below the compression threshold and is literal), or the
/// body was inflated and appended to `out`. Either way the unconsumed
/// input suffix is returned so the caller can recover trailing bytes.
pub enum Decompressed<'a> {
    NotProceeded { declared: i32, rest: &'a [u8] },
    Inflated { rest: &'a [u8] },
}

/// Reads the declared-size header from `input`, asks `proceed(declared)`
/// whether to inflate, and if so inflates the remainder into `out`.
pub fn decompress<'a>(
    input: &'a [u8],
    out: &mut BytesMut,
    proceed: impl FnOnce(i32) -> bool,
) -> Result<Decompressed<'a>, DecompressError> {
    let (declared, rest) = varint::varint_i32::decode(input)?;
    if declared < 0 {
        return Err(DecompressError::NegativeSize);
    }
    if !proceed(declared) {
        return Ok(Decompressed::NotProceeded { declared, rest });
    }

    let mut decoder = ZlibDecoder::new(rest);
    let mut produced = Vec::new();
    decoder.read_to_end(&mut produced)?;

    let consumed = decoder.total_in();
    if consumed != rest.len() as u64 {
        tracing::debug!(
            "[COMPRESS] decompress left {} trailing byte(s) after the deflate stream",
            rest.len() as u64 - consumed
        );
        return Err(DecompressError::Padded);
    }
    if produced.len() as u64 != declared as u64 {
        tracing::debug!(
            "[COMPRESS] decompress produced {} bytes, header declared {declared}",
            produced.len()
        );
        return Err(DecompressError::WrongLength { declared, actual: produced.len() as u64 });
    }

    out.extend_from_slice(&produced);
    Ok(Decompressed::Inflated { rest: &rest[consumed as usize..] })
}
