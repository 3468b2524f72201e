//! Packet framing (`spec.md` §4.8, §4.9): read/write a varint-length-
//! prefixed body over an [`AsyncByteStream`]. Hooks observe the length
//! before the body is read, the Rust realization of `spec.md` §4.8's
//! chainable `null`/`consume`/`limit` hooks as plain closures composed by
//! ordinary function call nesting (`SPEC_FULL.md` §4.8-4.10) rather than
//! a template metaprogramming chain.

use bytes::BytesMut;
use rustcraft_encoding::error::{Canonical, CanonicalError};
use rustcraft_encoding::varint::{self, VarintError};
use thiserror::Error;

use crate::stream::AsyncByteStream;

/// Maximum varint-encoded length of a `u32` packet-length prefix.
const MAX_LENGTH_VARINT_BYTES: usize = 5;

#[derive(Debug, Error)]
pub enum FramingReadError {
    #[error("varint length prefix: {0}")]
    Varint(#[from] VarintError),
    #[error("underlying stream error: {0}")]
    Io(#[from] std::io::Error),
    #[error("declared body length {length} exceeds the configured limit {limit}")]
    TooLong { length: u32, limit: u32 },
}

impl CanonicalError for FramingReadError {
    fn canonical(&self) -> Option<Canonical> {
        match self {
            FramingReadError::Varint(e) => e.canonical(),
            FramingReadError::Io(_) => Some(Canonical::Eof),
            FramingReadError::TooLong { .. } => Some(Canonical::ResultOutOfRange),
        }
    }
}

#[derive(Debug, Error)]
pub enum FramingWriteError {
    #[error("body length does not fit in a 32-bit unsigned length prefix")]
    ValueTooLarge,
    #[error("underlying stream error: {0}")]
    Io(#[from] std::io::Error),
}

impl CanonicalError for FramingWriteError {
    fn canonical(&self) -> Option<Canonical> {
        match self {
            FramingWriteError::ValueTooLarge => Some(Canonical::ValueTooLarge),
            FramingWriteError::Io(_) => Some(Canonical::Eof),
        }
    }
}

/// What an after-length hook decides once it has seen the declared body
/// length: carry on and read the body, or abort the read entirely.
pub enum HookAction {
    Continue,
    Reject(FramingReadError),
}

/// A `null` hook: always continues. The default when no hook composition
/// is needed.
pub fn null_hook(_length: u32, _header: &[u8]) -> HookAction {
    HookAction::Continue
}

/// A `limit` hook: rejects any declared length exceeding `max`. Composes
/// with another hook via [`chain`] the way `spec.md` §4.8 describes
/// (`limit(consume(N))`, outer invoked first, inner invoked only if the
/// outer continues).
pub fn limit_hook(max: u32) -> impl FnMut(u32, &[u8]) -> HookAction {
    move |length, _header| {
        if length > max {
            HookAction::Reject(FramingReadError::TooLong { length, limit: max })
        } else {
            HookAction::Continue
        }
    }
}

/// Composes two hooks so the outer's decision to continue invokes the
/// inner with the same parameters.
pub fn chain<A, B>(mut outer: A, mut inner: B) -> impl FnMut(u32, &[u8]) -> HookAction
where
    A: FnMut(u32, &[u8]) -> HookAction,
    B: FnMut(u32, &[u8]) -> HookAction,
{
    move |length, header| match outer(length, header) {
        HookAction::Continue => inner(length, header),
        reject => reject,
    }
}

/// Reads one varint-length-prefixed packet: the varint header accumulates
/// into `buf`, `after_length` is invoked with the bytes read so far and
/// the decoded length, and on [`HookAction::Continue`] the body is read
/// exactly and appended to `buf`. Returns `(header_len, body_len)`; the
/// total bytes transferred is their sum.
pub async fn read_packet(
    stream: &mut impl AsyncByteStream,
    buf: &mut BytesMut,
    mut after_length: impl FnMut(u32, &[u8]) -> HookAction,
) -> Result<(usize, usize), FramingReadError> {
    let mut header = [0u8; MAX_LENGTH_VARINT_BYTES];
    let mut header_len = 0usize;
    let length = loop {
        let mut byte = [0u8; 1];
        stream.read_exact(&mut byte).await?;
        header[header_len] = byte[0];
        header_len += 1;
        match varint::decode_u64(&header[..header_len], 32) {
            Ok((value, _)) => break value as u32,
            Err(VarintError::Eof) if header_len < MAX_LENGTH_VARINT_BYTES => continue,
            Err(e) => return Err(e.into()),
        }
    };
    buf.extend_from_slice(&header[..header_len]);

    match after_length(length, &header[..header_len]) {
        HookAction::Reject(err) => {
            tracing::debug!("[FRAMING] after-length hook rejected a read: {err}");
            return Err(err);
        }
        HookAction::Continue => {}
    }

    let body_start = buf.len();
    buf.resize(body_start + length as usize, 0);
    stream.read_exact(&mut buf[body_start..]).await?;
    Ok((header_len, length as usize))
}

/// Convenience wrapper wiring the `null` hook and returning exactly the
/// packet body (the header is not retained in the returned buffer).
pub async fn read_packet_body(
    stream: &mut impl AsyncByteStream,
    buf: &mut BytesMut,
) -> Result<BytesMut, FramingReadError> {
    buf.clear();
    let (header_len, body_len) = read_packet(stream, buf, null_hook).await?;
    let _ = buf.split_to(header_len);
    Ok(buf.split_to(body_len))
}

/// Convenience wrapper enforcing a maximum declared length before the
/// body is read off the wire.
pub async fn read_packet_body_limited(
    stream: &mut impl AsyncByteStream,
    buf: &mut BytesMut,
    max_len: u32,
) -> Result<BytesMut, FramingReadError> {
    buf.clear();
    let (header_len, body_len) = read_packet(stream, buf, limit_hook(max_len)).await?;
    let _ = buf.split_to(header_len);
    Ok(buf.split_to(body_len))
}

/// Writes one varint-length-prefixed packet: `staging` is reused as the
/// header scratch buffer, then header and body are written as two
/// consecutive writes (never interleaved) so bytes exit in `(header,
/// body)` order, per `spec.md` §5 "Ordering".
pub async fn write_packet(
    stream: &mut impl AsyncByteStream,
    staging: &mut BytesMut,
    body: &[u8],
) -> Result<(), FramingWriteError> {
    let len: u32 = body.len().try_into().map_err(|_| FramingWriteError::ValueTooLarge)?;
    staging.clear();
    let mut header = Vec::with_capacity(varint::max_size(32));
    varint::varint_u32::encode(len, &mut header);
    staging.extend_from_slice(&header);

    stream.write_all(&staging).await?;
    stream.write_all(body).await?;
    Ok(())
}
