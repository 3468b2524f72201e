//! NBT SAX writer (`spec.md` §4.12): accepts the same event vocabulary
//! the parser emits (minus the positional span/iterator arguments) and
//! serializes it back to bytes. Driving a writer with the exact event
//! stream a parse produced reproduces the original document
//! byte-for-byte — the property `spec.md` §8 requires for testing.
//!
//! Unlike the parser, the writer does not police structural validity: it
//! trusts the caller to issue a well-formed event sequence. The only
//! failure mode it detects is a string whose MUTF-8 encoding overflows
//! the 16-bit length prefix.

use crate::error::NbtWriteError;
use crate::mutf8;
use crate::observer::Value;

/// Writes NBT events into an owned output buffer.
pub struct NbtWriter<'a> {
    out: &'a mut Vec<u8>,
}

impl<'a> NbtWriter<'a> {
    pub fn new(out: &'a mut Vec<u8>) -> Self {
        NbtWriter { out }
    }

    /// `begin`/`end` and every container begin/end event are structural
    /// markers only; per `spec.md` §4.12 they emit no bytes of their own
    /// (the tag and length bytes are produced by explicit `tag`/`length`
    /// calls instead).
    pub fn begin(&mut self) {}
    pub fn end(&mut self) {}
    pub fn begin_compound(&mut self) {}
    pub fn end_compound(&mut self) {}
    pub fn begin_list(&mut self) {}
    pub fn end_list(&mut self) {}
    pub fn begin_byte_array(&mut self) {}
    pub fn end_byte_array(&mut self) {}
    pub fn begin_int_array(&mut self) {}
    pub fn end_int_array(&mut self) {}
    pub fn begin_long_array(&mut self) {}
    pub fn end_long_array(&mut self) {}

    /// Writes a tag byte unchanged.
    pub fn tag(&mut self, tag: u8) {
        self.out.push(tag);
    }

    /// Writes a signed 32-bit big-endian length.
    pub fn length(&mut self, len: i32) {
        self.out.extend_from_slice(&len.to_be_bytes());
    }

    /// Writes a `u16`-length-prefixed MUTF-8 name.
    pub fn name(&mut self, name: &str) -> Result<(), NbtWriteError> {
        self.write_mutf8(name)
    }

    /// Writes a scalar or string value, big-endian, tagged dispatch over
    /// [`Value`] rather than per-type overloads (`spec.md` §9).
    pub fn value(&mut self, value: Value<'_>) -> Result<(), NbtWriteError> {
        match value {
            Value::Byte(v) => {
                self.out.push(v as u8);
                Ok(())
            }
            Value::Short(v) => {
                self.out.extend_from_slice(&v.to_be_bytes());
                Ok(())
            }
            Value::Int(v) => {
                self.out.extend_from_slice(&v.to_be_bytes());
                Ok(())
            }
            Value::Long(v) => {
                self.out.extend_from_slice(&v.to_be_bytes());
                Ok(())
            }
            Value::Float(v) => {
                self.out.extend_from_slice(&v.to_be_bytes());
                Ok(())
            }
            Value::Double(v) => {
                self.out.extend_from_slice(&v.to_be_bytes());
                Ok(())
            }
            Value::String(s) => self.write_mutf8(s),
        }
    }

    fn write_mutf8(&mut self, s: &str) -> Result<(), NbtWriteError> {
        let bytes = mutf8::encode(s);
        let len: u16 = bytes.len().try_into().map_err(|_| NbtWriteError::StringTooLong)?;
        self.out.extend_from_slice(&len.to_be_bytes());
        self.out.extend_from_slice(&bytes);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Aborted;
    use crate::observer::{NbtObserver, Span};
    use crate::parser::parse;

    /// Forwards every parser event straight into an [`NbtWriter`]; used
    /// to exercise the parse -> write round-trip property from `spec.md`
    /// §8 without a caller needing to buffer the whole event stream.
    struct Replay<'a> {
        writer: NbtWriter<'a>,
    }

    impl<'a> NbtObserver for Replay<'a> {
        type Error = NbtWriteError;

        fn begin(&mut self, _span: Span) -> Result<(), Self::Error> {
            self.writer.begin();
            Ok(())
        }
        fn end(&mut self, _pos: usize) -> Result<(), Self::Error> {
            self.writer.end();
            Ok(())
        }
        fn error(&mut self, _err: &Aborted<Self::Error>, _pos: usize) {}
        fn tag(&mut self, tag: u8, _span: Span) -> Result<(), Self::Error> {
            self.writer.tag(tag);
            Ok(())
        }
        fn name(&mut self, name: &str, _span: Span) -> Result<(), Self::Error> {
            self.writer.name(name)
        }
        fn length(&mut self, len: i32, _span: Span) -> Result<(), Self::Error> {
            self.writer.length(len);
            Ok(())
        }
        fn begin_compound(&mut self, _pos: usize) -> Result<(), Self::Error> {
            self.writer.begin_compound();
            Ok(())
        }
        fn end_compound(&mut self, _pos: usize) -> Result<(), Self::Error> {
            self.writer.end_compound();
            Ok(())
        }
        fn begin_list(&mut self, _pos: usize) -> Result<(), Self::Error> {
            self.writer.begin_list();
            Ok(())
        }
        fn end_list(&mut self, _pos: usize) -> Result<(), Self::Error> {
            self.writer.end_list();
            Ok(())
        }
        fn begin_byte_array(&mut self, _pos: usize) -> Result<(), Self::Error> {
            self.writer.begin_byte_array();
            Ok(())
        }
        fn end_byte_array(&mut self, _pos: usize) -> Result<(), Self::Error> {
            self.writer.end_byte_array();
            Ok(())
        }
        fn begin_int_array(&mut self, _pos: usize) -> Result<(), Self::Error> {
            self.writer.begin_int_array();
            Ok(())
        }
        fn end_int_array(&mut self, _pos: usize) -> Result<(), Self::Error> {
            self.writer.end_int_array();
            Ok(())
        }
        fn begin_long_array(&mut self, _pos: usize) -> Result<(), Self::Error> {
            self.writer.begin_long_array();
            Ok(())
        }
        fn end_long_array(&mut self, _pos: usize) -> Result<(), Self::Error> {
            self.writer.end_long_array();
            Ok(())
        }
        fn value(&mut self, value: Value<'_>, _span: Span) -> Result<(), Self::Error> {
            self.writer.value(value)
        }
    }

    fn round_trip(doc: &[u8]) {
        let mut out = Vec::new();
        let mut replay = Replay { writer: NbtWriter::new(&mut out) };
        parse(doc, &mut replay).unwrap();
        assert_eq!(out, doc);
    }

    #[test]
    fn hello_world_bananrama_round_trips() {
        let mut doc = vec![0x0a, 0x00, 0x0b];
        doc.extend_from_slice(b"hello world");
        doc.push(0x08);
        doc.extend_from_slice(&[0x00, 0x04]);
        doc.extend_from_slice(b"name");
        doc.extend_from_slice(&[0x00, 0x09]);
        doc.extend_from_slice(b"Bananrama");
        doc.push(0x00);
        round_trip(&doc);
    }

    #[test]
    fn nested_compound_and_list_round_trips() {
        let mut doc = vec![0x0a, 0x00, 0x00]; // root compound, no name
        doc.push(0x09); // TAG_List
        doc.extend_from_slice(&[0x00, 0x05]);
        doc.extend_from_slice(b"items");
        doc.push(0x03); // element type: int
        doc.extend_from_slice(&3i32.to_be_bytes());
        doc.extend_from_slice(&1i32.to_be_bytes());
        doc.extend_from_slice(&2i32.to_be_bytes());
        doc.extend_from_slice(&3i32.to_be_bytes());
        doc.push(0x0a); // nested compound
        doc.extend_from_slice(&[0x00, 0x05]);
        doc.extend_from_slice(b"inner");
        doc.push(0x01); // byte
        doc.extend_from_slice(&[0x00, 0x01]);
        doc.extend_from_slice(b"b");
        doc.push(0x07); // -7 as i8
        doc.push(0x00); // end inner compound
        doc.push(0x00); // end root compound
        round_trip(&doc);
    }

    #[test]
    fn string_over_u16_max_is_rejected() {
        let mut out = Vec::new();
        let mut w = NbtWriter::new(&mut out);
        let long = "x".repeat(70_000);
        assert_eq!(w.value(Value::String(&long)), Err(NbtWriteError::StringTooLong));
    }
}
