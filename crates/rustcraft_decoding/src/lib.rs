//! NBT (Named Binary Tag) SAX engine for the Minecraft wire protocol.
//!
//! A restartable push-parser ([`parser::parse`]) walks the recursive
//! `TAG_Compound` / `TAG_List` / typed-array grammar of `spec.md` §3 and
//! drives an [`observer::NbtObserver`] capability set; [`writer::NbtWriter`]
//! accepts the same event vocabulary and serializes it back to bytes, so a
//! parse can be piped directly into a writer to reproduce the original
//! document byte-for-byte (`spec.md` §4.12, §8).

pub mod error;
pub mod mutf8;
pub mod observer;
pub mod parser;
pub mod writer;

pub use error::{Aborted, NbtError, NbtWriteError};
pub use observer::{NbtObserver, Span, Value};
pub use parser::parse;
pub use writer::NbtWriter;
