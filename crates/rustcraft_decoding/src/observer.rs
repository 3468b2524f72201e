//! The NBT parser's observer capability set (`spec.md` §4.11 / §9).
//!
//! Realized as a single trait rather than a base class, with value
//! overloads collapsed into one tagged [`Value`] enum rather than ad-hoc
//! per-type overloading, per the design notes.

/// The half-open byte range `[start, end)` of the input a given event's
/// bytes occupied. Stands in for the paired begin/end iterators the
/// `mcpp` observer contract passes to most callbacks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

/// A single parsed NBT scalar or string value (tagged dispatch over the
/// eight value-bearing cases in `spec.md` §4.11, rather than per-type
/// overloads).
#[derive(Debug, Clone, PartialEq)]
pub enum Value<'a> {
    Byte(i8),
    Short(i16),
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    String(&'a str),
}

/// The event vocabulary the SAX parser drives. One method per event in
/// `spec.md` §4.11; every method but `error` returns `Result<(), Self::Error>`
/// so a truthy return aborts the parse.
pub trait NbtObserver {
    type Error;

    fn begin(&mut self, span: Span) -> Result<(), Self::Error>;
    fn end(&mut self, pos: usize) -> Result<(), Self::Error>;

    /// Invoked once, regardless of whether the abort was a codec-level
    /// parse error or this observer's own callback declining to continue.
    fn error(&mut self, err: &super::error::Aborted<Self::Error>, pos: usize);

    fn tag(&mut self, tag: u8, span: Span) -> Result<(), Self::Error>;
    fn name(&mut self, name: &str, span: Span) -> Result<(), Self::Error>;
    fn length(&mut self, len: i32, span: Span) -> Result<(), Self::Error>;

    fn begin_compound(&mut self, pos: usize) -> Result<(), Self::Error>;
    fn end_compound(&mut self, pos: usize) -> Result<(), Self::Error>;

    fn begin_list(&mut self, pos: usize) -> Result<(), Self::Error>;
    fn end_list(&mut self, pos: usize) -> Result<(), Self::Error>;

    fn begin_byte_array(&mut self, pos: usize) -> Result<(), Self::Error>;
    fn end_byte_array(&mut self, pos: usize) -> Result<(), Self::Error>;
    fn begin_int_array(&mut self, pos: usize) -> Result<(), Self::Error>;
    fn end_int_array(&mut self, pos: usize) -> Result<(), Self::Error>;
    fn begin_long_array(&mut self, pos: usize) -> Result<(), Self::Error>;
    fn end_long_array(&mut self, pos: usize) -> Result<(), Self::Error>;

    fn value(&mut self, value: Value<'_>, span: Span) -> Result<(), Self::Error>;
}
