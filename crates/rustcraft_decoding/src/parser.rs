//! NBT SAX parser (`spec.md` §4.11): a restartable pull-parser over a
//! byte slice that drives an [`NbtObserver`] through a TAG_Compound
//! document without recursing the Rust call stack or materializing a
//! tree. Nesting depth lives entirely in an explicit frame stack.

use std::borrow::Cow;

use rustcraft_encoding::endian::{BigEndian, read_be};
use smallvec::SmallVec;

use crate::error::{Aborted, NbtError};
use crate::mutf8;
use crate::observer::{NbtObserver, Span, Value};

/// Most real-world NBT documents nest only a handful of levels deep
/// (chunk sections, item lists); the frame stack inlines that common
/// case and only spills to the heap for documents that nest further.
type FrameStack = SmallVec<[Frame; 8]>;

const TAG_END: u8 = 0;
const TAG_BYTE: u8 = 1;
const TAG_SHORT: u8 = 2;
const TAG_INT: u8 = 3;
const TAG_LONG: u8 = 4;
const TAG_FLOAT: u8 = 5;
const TAG_DOUBLE: u8 = 6;
const TAG_BYTE_ARRAY: u8 = 7;
const TAG_STRING: u8 = 8;
const TAG_LIST: u8 = 9;
const TAG_COMPOUND: u8 = 10;
const TAG_INT_ARRAY: u8 = 11;
const TAG_LONG_ARRAY: u8 = 12;

enum Frame {
    Compound,
    List { tag: u8, remaining: i32 },
}

enum Top {
    Compound,
    List(u8, i32),
}

struct Reader<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    fn new(buf: &'a [u8]) -> Self {
        Reader { buf, pos: 0 }
    }

    fn remaining(&self) -> &'a [u8] {
        &self.buf[self.pos..]
    }

    fn read_u8(&mut self) -> Result<(u8, Span), NbtError> {
        let start = self.pos;
        let &byte = self.remaining().first().ok_or(NbtError::Eof)?;
        self.pos += 1;
        Ok((byte, Span { start, end: self.pos }))
    }

    fn read_be<T: BigEndian>(&mut self) -> Result<(T, Span), NbtError> {
        let start = self.pos;
        let (value, rest) = read_be::<T>(self.remaining()).map_err(NbtError::from)?;
        self.pos = self.buf.len() - rest.len();
        Ok((value, Span { start, end: self.pos }))
    }

    fn read_bytes(&mut self, n: usize) -> Result<(&'a [u8], Span), NbtError> {
        let start = self.pos;
        let end = self.pos.checked_add(n).filter(|&e| e <= self.buf.len()).ok_or(NbtError::Eof)?;
        let slice = &self.buf[self.pos..end];
        self.pos = end;
        Ok((slice, Span { start, end }))
    }

    /// Reads a `u16`-length-prefixed MUTF-8 string (the encoding shared
    /// by NBT names, `spec.md` §3, and `TAG_String` values, §4.11 tag 8).
    fn read_mutf8(&mut self) -> Result<(Cow<'a, str>, Span), NbtError> {
        let (len, _) = self.read_be::<u16>()?;
        let (bytes, span) = self.read_bytes(len as usize)?;
        Ok((decode_cow(bytes), span))
    }
}

fn decode_cow(bytes: &[u8]) -> Cow<'_, str> {
    match std::str::from_utf8(bytes) {
        Ok(s) => Cow::Borrowed(s),
        Err(_) => Cow::Owned(mutf8::decode(bytes)),
    }
}

fn codec_err<O: NbtObserver>(observer: &mut O, pos: usize, err: NbtError) -> Aborted<O::Error> {
    let aborted = Aborted::Codec(err);
    observer.error(&aborted, pos);
    aborted
}

fn observer_err<O: NbtObserver>(observer: &mut O, pos: usize, err: O::Error) -> Aborted<O::Error> {
    let aborted = Aborted::Observer(err);
    observer.error(&aborted, pos);
    aborted
}

macro_rules! step {
    ($r:expr, $obs:expr, $e:expr) => {
        match $e {
            Ok(v) => v,
            Err(err) => return Err(codec_err($obs, $r.pos, err)),
        }
    };
}

macro_rules! emit {
    ($r:expr, $obs:expr, $e:expr) => {
        match $e {
            Ok(()) => {}
            Err(err) => return Err(observer_err($obs, $r.pos, err)),
        }
    };
}

/// Parses `input` as a root `TAG_Compound` document, driving `observer`
/// through the event vocabulary of `spec.md` §4.11. Returns the number
/// of bytes consumed on success; on any failure (malformed document or
/// the observer declining to continue) the observer has already received
/// exactly one `error` call before this returns `Err`.
pub fn parse<O: NbtObserver>(input: &[u8], observer: &mut O) -> Result<usize, Aborted<O::Error>> {
    let mut r = Reader::new(input);
    let mut stack: FrameStack = SmallVec::new();

    emit!(r, observer, observer.begin(Span { start: 0, end: input.len() }));

    let (root_tag, root_tag_span) = step!(r, observer, r.read_u8());
    emit!(r, observer, observer.tag(root_tag, root_tag_span));
    if root_tag != TAG_COMPOUND {
        return Err(codec_err(observer, r.pos, NbtError::FirstTagNotCompound));
    }
    let (root_name, root_name_span) = step!(r, observer, r.read_mutf8());
    emit!(r, observer, observer.name(root_name.as_ref(), root_name_span));
    emit!(r, observer, observer.begin_compound(r.pos));
    stack.push(Frame::Compound);

    loop {
        let top = match stack.last() {
            None => break,
            Some(Frame::Compound) => Top::Compound,
            Some(Frame::List { tag, remaining }) => Top::List(*tag, *remaining),
        };

        match top {
            Top::Compound => {
                let (tag, tag_span) = step!(r, observer, r.read_u8());
                if tag == TAG_END {
                    emit!(r, observer, observer.tag(tag, tag_span));
                    emit!(r, observer, observer.end_compound(r.pos));
                    stack.pop();
                    continue;
                }
                if !(1..=12).contains(&tag) {
                    return Err(codec_err(observer, r.pos, NbtError::InvalidTag));
                }
                emit!(r, observer, observer.tag(tag, tag_span));
                let (name, name_span) = step!(r, observer, r.read_mutf8());
                emit!(r, observer, observer.name(name.as_ref(), name_span));
                dispatch_value(&mut r, observer, tag, &mut stack)?;
            }
            Top::List(tag, remaining) => {
                if remaining == 0 {
                    emit!(r, observer, observer.end_list(r.pos));
                    stack.pop();
                    continue;
                }
                if let Some(Frame::List { remaining, .. }) = stack.last_mut() {
                    *remaining -= 1;
                }
                dispatch_value(&mut r, observer, tag, &mut stack)?;
            }
        }
    }

    emit!(r, observer, observer.end(r.pos));
    Ok(r.pos)
}

fn read_array_length<O: NbtObserver>(
    r: &mut Reader,
    observer: &mut O,
) -> Result<i32, Aborted<O::Error>> {
    let (len, span) = step!(r, observer, r.read_be::<i32>());
    if len < 0 {
        return Err(codec_err(observer, r.pos, NbtError::NegativeLength));
    }
    emit!(r, observer, observer.length(len, span));
    Ok(len)
}

fn dispatch_value<O: NbtObserver>(
    r: &mut Reader,
    observer: &mut O,
    tag: u8,
    stack: &mut FrameStack,
) -> Result<(), Aborted<O::Error>> {
    match tag {
        TAG_BYTE => {
            let (v, span) = step!(r, observer, r.read_u8());
            emit!(r, observer, observer.value(Value::Byte(v as i8), span));
        }
        TAG_SHORT => {
            let (v, span) = step!(r, observer, r.read_be::<i16>());
            emit!(r, observer, observer.value(Value::Short(v), span));
        }
        TAG_INT => {
            let (v, span) = step!(r, observer, r.read_be::<i32>());
            emit!(r, observer, observer.value(Value::Int(v), span));
        }
        TAG_LONG => {
            let (v, span) = step!(r, observer, r.read_be::<i64>());
            emit!(r, observer, observer.value(Value::Long(v), span));
        }
        TAG_FLOAT => {
            let (v, span) = step!(r, observer, r.read_be::<f32>());
            emit!(r, observer, observer.value(Value::Float(v), span));
        }
        TAG_DOUBLE => {
            let (v, span) = step!(r, observer, r.read_be::<f64>());
            emit!(r, observer, observer.value(Value::Double(v), span));
        }
        TAG_STRING => {
            let (s, span) = step!(r, observer, r.read_mutf8());
            emit!(r, observer, observer.value(Value::String(s.as_ref()), span));
        }
        TAG_BYTE_ARRAY => {
            emit!(r, observer, observer.begin_byte_array(r.pos));
            let len = read_array_length(r, observer)?;
            for _ in 0..len {
                let (v, span) = step!(r, observer, r.read_u8());
                emit!(r, observer, observer.value(Value::Byte(v as i8), span));
            }
            emit!(r, observer, observer.end_byte_array(r.pos));
        }
        TAG_INT_ARRAY => {
            emit!(r, observer, observer.begin_int_array(r.pos));
            let len = read_array_length(r, observer)?;
            for _ in 0..len {
                let (v, span) = step!(r, observer, r.read_be::<i32>());
                emit!(r, observer, observer.value(Value::Int(v), span));
            }
            emit!(r, observer, observer.end_int_array(r.pos));
        }
        TAG_LONG_ARRAY => {
            emit!(r, observer, observer.begin_long_array(r.pos));
            let len = read_array_length(r, observer)?;
            for _ in 0..len {
                let (v, span) = step!(r, observer, r.read_be::<i64>());
                emit!(r, observer, observer.value(Value::Long(v), span));
            }
            emit!(r, observer, observer.end_long_array(r.pos));
        }
        TAG_LIST => {
            emit!(r, observer, observer.begin_list(r.pos));
            let (elem_tag, elem_tag_span) = step!(r, observer, r.read_u8());
            let (len, len_span) = step!(r, observer, r.read_be::<i32>());
            if len < 0 {
                return Err(codec_err(observer, r.pos, NbtError::NegativeLength));
            }
            // spec.md §9 open question: element-tag 0 is only rejected
            // when the list is non-empty; an empty list with tag 0 is
            // accepted silently. Preserved as-is, not resolved further.
            if len > 0 && !(1..=12).contains(&elem_tag) {
                return Err(codec_err(observer, r.pos, NbtError::InvalidTag));
            }
            emit!(r, observer, observer.tag(elem_tag, elem_tag_span));
            emit!(r, observer, observer.length(len, len_span));
            stack.push(Frame::List { tag: elem_tag, remaining: len });
        }
        TAG_COMPOUND => {
            emit!(r, observer, observer.begin_compound(r.pos));
            stack.push(Frame::Compound);
        }
        _ => unreachable!("caller validates tag is 1..=12 before dispatching"),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    enum Event {
        Begin,
        End(usize),
        Tag(u8),
        Name(String),
        Length(i32),
        BeginCompound,
        EndCompound,
        BeginList,
        EndList,
        BeginByteArray,
        EndByteArray,
        BeginIntArray,
        EndIntArray,
        BeginLongArray,
        EndLongArray,
        Value(String),
        Error,
    }

    #[derive(Default)]
    struct Recorder {
        events: Vec<Event>,
    }

    impl NbtObserver for Recorder {
        type Error = ();

        fn begin(&mut self, _span: Span) -> Result<(), ()> {
            self.events.push(Event::Begin);
            Ok(())
        }
        fn end(&mut self, pos: usize) -> Result<(), ()> {
            self.events.push(Event::End(pos));
            Ok(())
        }
        fn error(&mut self, _err: &Aborted<()>, _pos: usize) {
            self.events.push(Event::Error);
        }
        fn tag(&mut self, tag: u8, _span: Span) -> Result<(), ()> {
            self.events.push(Event::Tag(tag));
            Ok(())
        }
        fn name(&mut self, name: &str, _span: Span) -> Result<(), ()> {
            self.events.push(Event::Name(name.to_string()));
            Ok(())
        }
        fn length(&mut self, len: i32, _span: Span) -> Result<(), ()> {
            self.events.push(Event::Length(len));
            Ok(())
        }
        fn begin_compound(&mut self, _pos: usize) -> Result<(), ()> {
            self.events.push(Event::BeginCompound);
            Ok(())
        }
        fn end_compound(&mut self, _pos: usize) -> Result<(), ()> {
            self.events.push(Event::EndCompound);
            Ok(())
        }
        fn begin_list(&mut self, _pos: usize) -> Result<(), ()> {
            self.events.push(Event::BeginList);
            Ok(())
        }
        fn end_list(&mut self, _pos: usize) -> Result<(), ()> {
            self.events.push(Event::EndList);
            Ok(())
        }
        fn begin_byte_array(&mut self, _pos: usize) -> Result<(), ()> {
            self.events.push(Event::BeginByteArray);
            Ok(())
        }
        fn end_byte_array(&mut self, _pos: usize) -> Result<(), ()> {
            self.events.push(Event::EndByteArray);
            Ok(())
        }
        fn begin_int_array(&mut self, _pos: usize) -> Result<(), ()> {
            self.events.push(Event::BeginIntArray);
            Ok(())
        }
        fn end_int_array(&mut self, _pos: usize) -> Result<(), ()> {
            self.events.push(Event::EndIntArray);
            Ok(())
        }
        fn begin_long_array(&mut self, _pos: usize) -> Result<(), ()> {
            self.events.push(Event::BeginLongArray);
            Ok(())
        }
        fn end_long_array(&mut self, _pos: usize) -> Result<(), ()> {
            self.events.push(Event::EndLongArray);
            Ok(())
        }
        fn value(&mut self, value: Value<'_>, _span: Span) -> Result<(), ()> {
            self.events.push(Event::Value(format!("{value:?}")));
            Ok(())
        }
    }

    fn hello_world_bananrama() -> Vec<u8> {
        let mut bytes = vec![0x0a, 0x00, 0x0b];
        bytes.extend_from_slice(b"hello world");
        bytes.push(0x08);
        bytes.extend_from_slice(&[0x00, 0x04]);
        bytes.extend_from_slice(b"name");
        bytes.extend_from_slice(&[0x00, 0x09]);
        bytes.extend_from_slice(b"Bananrama");
        bytes.push(0x00);
        bytes
    }

    #[test]
    fn literal_compound_with_one_string_emits_documented_events() {
        let doc = hello_world_bananrama();
        let mut rec = Recorder::default();
        let consumed = parse(&doc, &mut rec).unwrap();
        assert_eq!(consumed, doc.len());
        assert_eq!(
            rec.events,
            vec![
                Event::Begin,
                Event::Tag(10),
                Event::Name("hello world".to_string()),
                Event::BeginCompound,
                Event::Tag(8),
                Event::Name("name".to_string()),
                Event::Value(format!("{:?}", Value::String("Bananrama"))),
                Event::Tag(0),
                Event::EndCompound,
                Event::End(doc.len()),
            ]
        );
    }

    #[test]
    fn root_tag_must_be_compound() {
        let doc = [0x01u8, 0x00, 0x00, 0x00];
        let mut rec = Recorder::default();
        let err = parse(&doc, &mut rec).unwrap_err();
        assert!(matches!(err, Aborted::Codec(NbtError::FirstTagNotCompound)));
        assert_eq!(rec.events.last(), Some(&Event::Error));
    }

    #[test]
    fn every_prefix_reports_eof_and_ends_with_error() {
        let doc = hello_world_bananrama();
        for len in 0..doc.len() {
            let mut rec = Recorder::default();
            let err = parse(&doc[..len], &mut rec).unwrap_err();
            assert!(matches!(err, Aborted::Codec(NbtError::Eof)), "prefix len {len}");
            assert_eq!(rec.events.last(), Some(&Event::Error), "prefix len {len}");
        }
    }

    #[test]
    fn empty_list_with_zero_tag_is_accepted() {
        // TAG_Compound, empty name, TAG_List "xs" tag=0 len=0, TAG_End
        let mut doc = vec![0x0a, 0x00, 0x00];
        doc.push(0x09);
        doc.extend_from_slice(&[0x00, 0x02]);
        doc.extend_from_slice(b"xs");
        doc.push(0x00); // element tag 0
        doc.extend_from_slice(&0i32.to_be_bytes());
        doc.push(0x00); // TAG_End
        let mut rec = Recorder::default();
        let consumed = parse(&doc, &mut rec).unwrap();
        assert_eq!(consumed, doc.len());
        assert!(rec.events.contains(&Event::EndList));
    }

    #[test]
    fn nonempty_list_with_zero_tag_is_rejected() {
        let mut doc = vec![0x0a, 0x00, 0x00];
        doc.push(0x09);
        doc.extend_from_slice(&[0x00, 0x02]);
        doc.extend_from_slice(b"xs");
        doc.push(0x00); // element tag 0
        doc.extend_from_slice(&1i32.to_be_bytes());
        let mut rec = Recorder::default();
        let err = parse(&doc, &mut rec).unwrap_err();
        assert!(matches!(err, Aborted::Codec(NbtError::InvalidTag)));
    }

    #[test]
    fn int_array_round_trips_through_events() {
        let mut doc = vec![0x0a, 0x00, 0x00];
        doc.push(0x0b); // TAG_Int_Array
        doc.extend_from_slice(&[0x00, 0x02]);
        doc.extend_from_slice(b"ia");
        doc.extend_from_slice(&2i32.to_be_bytes());
        doc.extend_from_slice(&1i32.to_be_bytes());
        doc.extend_from_slice(&(-1i32).to_be_bytes());
        doc.push(0x00);
        let mut rec = Recorder::default();
        parse(&doc, &mut rec).unwrap();
        assert!(rec.events.contains(&Event::BeginIntArray));
        assert!(rec.events.contains(&Event::EndIntArray));
        assert!(rec.events.contains(&Event::Value(format!("{:?}", Value::Int(1)))));
        assert!(rec.events.contains(&Event::Value(format!("{:?}", Value::Int(-1)))));
    }

    #[test]
    fn negative_array_length_is_rejected() {
        let mut doc = vec![0x0a, 0x00, 0x00];
        doc.push(0x07); // TAG_Byte_Array
        doc.extend_from_slice(&[0x00, 0x02]);
        doc.extend_from_slice(b"ba");
        doc.extend_from_slice(&(-1i32).to_be_bytes());
        let mut rec = Recorder::default();
        let err = parse(&doc, &mut rec).unwrap_err();
        assert!(matches!(err, Aborted::Codec(NbtError::NegativeLength)));
    }
}
