//! Asynchronous stream layers and packet framing for the Minecraft
//! protocol: the layered-stream framework, the debug and cipher layers
//! built on it, varint-length-prefixed framing, and the zlib compression
//! envelope above framing (`spec.md` §4.5-§4.10).
//!
//! Built on `rustcraft_encoding`'s wire codec; produces/consumes plain
//! byte buffers that `rustcraft_decoding`'s NBT parser or a caller's own
//! body format can read from.

pub mod cipher;
pub mod compress;
pub mod debug;
pub mod framing;
pub mod stream;

pub use cipher::{Aes128Cfb8Dec, Aes128Cfb8Enc, CipherStream, CipherUpdate, new_cfb8_pair};
pub use compress::{CompressError, Decompressed, DecompressError, compress, decompress};
pub use debug::{DebugLayerError, DebugSink, DebugStream};
pub use framing::{FramingReadError, FramingWriteError, read_packet_body, write_packet};
pub use stream::{AsyncByteStream, LowestLayer};
