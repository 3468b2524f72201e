//! Debug stream layer (`spec.md` §4.6): a transparent pass-through that
//! formats every byte crossing it before handing it on unchanged, in
//! either a hex-dump or a raw-text presentation. Generalizes the hex
//! formatting idiom of this workspace's `PacketLogger::hex_preview` /
//! `bytes_to_hex` into a reusable layer instead of a one-off debug tool.

use std::io;

use rustcraft_config::{DebugLayerSettings, DebugMode};
use thiserror::Error;

use crate::stream::{AsyncByteStream, LowestLayer};

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum DebugLayerError {
    #[error("debug layer line width must be greater than zero")]
    ZeroLineWidth,
}

/// Where a debug layer's formatted output goes. `rustcraft_sdk` supplies
/// the packet-capture sink the demonstration binary wires up; tests use
/// an in-memory line buffer.
pub trait DebugSink {
    fn write_line(&mut self, line: &str);
}

/// Accumulates bytes for one direction (read or write) into fixed-width
/// hex-dump rows, carrying a partial row across calls until it fills or
/// [`DebugStream::flush`] forces it out early.
struct HexDumpState {
    pending: Vec<u8>,
}

impl HexDumpState {
    fn new() -> Self {
        HexDumpState { pending: Vec::new() }
    }

    fn feed(&mut self, bytes: &[u8], width: usize, uppercase: bool, emit: &mut dyn FnMut(&str)) {
        self.pending.extend_from_slice(bytes);
        while self.pending.len() >= width {
            let line: Vec<u8> = self.pending.drain(..width).collect();
            emit(&render_line(&line, width, uppercase));
        }
    }

    fn flush(&mut self, width: usize, uppercase: bool, emit: &mut dyn FnMut(&str)) {
        if !self.pending.is_empty() {
            let line: Vec<u8> = self.pending.drain(..).collect();
            emit(&render_line(&line, width, uppercase));
        }
    }
}

/// One hex-dump row: `width` space-separated byte pairs (missing slots
/// blanked to keep the ASCII gutter aligned on a short final row), two
/// spaces, then the printable-ASCII-or-`.` rendering of the same bytes.
fn render_line(bytes: &[u8], width: usize, uppercase: bool) -> String {
    let mut hex = String::with_capacity(width * 3);
    for i in 0..width {
        if i > 0 {
            hex.push(' ');
        }
        match bytes.get(i) {
            Some(b) if uppercase => hex.push_str(&format!("{b:02X}")),
            Some(b) => hex.push_str(&format!("{b:02x}")),
            None => hex.push_str("  "),
        }
    }
    let ascii: String =
        bytes.iter().map(|&b| if (0x20..0x7f).contains(&b) { b as char } else { '.' }).collect();
    format!("{hex}  {ascii}")
}

pub struct DebugStream<S, K> {
    next: S,
    sink: K,
    settings: DebugLayerSettings,
    read_state: HexDumpState,
    write_state: HexDumpState,
}

impl<S, K: DebugSink> DebugStream<S, K> {
    pub fn new(next: S, sink: K, settings: DebugLayerSettings) -> Result<Self, DebugLayerError> {
        if settings.line_width == 0 {
            return Err(DebugLayerError::ZeroLineWidth);
        }
        Ok(DebugStream {
            next,
            sink,
            settings,
            read_state: HexDumpState::new(),
            write_state: HexDumpState::new(),
        })
    }

    fn record(&mut self, direction: &str, bytes: &[u8], is_read: bool) {
        let header = if self.settings.name.is_empty() {
            format!("[{direction}] {} bytes", bytes.len())
        } else {
            format!("[{}] [{direction}] {} bytes", self.settings.name, bytes.len())
        };
        self.sink.write_line(&header);

        match self.settings.mode {
            DebugMode::Text => {
                self.sink.write_line(&String::from_utf8_lossy(bytes));
            }
            DebugMode::HexDump => {
                let width = self.settings.line_width;
                let uppercase = self.settings.uppercase_hex;
                let sink = &mut self.sink;
                let state = if is_read { &mut self.read_state } else { &mut self.write_state };
                let mut emit = |line: &str| sink.write_line(line);
                state.feed(bytes, width, uppercase, &mut emit);
            }
        }
    }

    /// Forces out whatever partial hex-dump row is pending in either
    /// direction. Partial rows otherwise carry silently across calls, so
    /// callers that want output flushed at a natural boundary (e.g.
    /// connection close) must call this explicitly.
    pub fn flush(&mut self) {
        let width = self.settings.line_width;
        let uppercase = self.settings.uppercase_hex;
        let sink = &mut self.sink;
        let mut emit = |line: &str| sink.write_line(line);
        self.read_state.flush(width, uppercase, &mut emit);
        self.write_state.flush(width, uppercase, &mut emit);
    }

    pub fn into_inner(self) -> S {
        self.next
    }
}

impl<S: AsyncByteStream, K: DebugSink> AsyncByteStream for DebugStream<S, K> {
    async fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = self.next.read(buf).await?;
        self.record("read", &buf[..n], true);
        Ok(n)
    }

    async fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let n = self.next.write(buf).await?;
        self.record("write", &buf[..n], false);
        Ok(n)
    }
}

impl<S: LowestLayer, K> LowestLayer for DebugStream<S, K> {
    type Lowest = S::Lowest;

    fn lowest_layer(&self) -> &Self::Lowest {
        self.next.lowest_layer()
    }

    fn lowest_layer_mut(&mut self) -> &mut Self::Lowest {
        self.next.lowest_layer_mut()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stream::test_support::MockStream;

    #[derive(Default)]
    struct LineSink {
        lines: Vec<String>,
    }

    impl DebugSink for LineSink {
        fn write_line(&mut self, line: &str) {
            self.lines.push(line.to_string());
        }
    }

    #[test]
    fn zero_line_width_is_rejected() {
        let settings = DebugLayerSettings { line_width: 0, ..DebugLayerSettings::default() };
        let err = DebugStream::new(MockStream::new(Vec::new()), LineSink::default(), settings)
            .unwrap_err();
        assert_eq!(err, DebugLayerError::ZeroLineWidth);
    }

    #[tokio::test]
    async fn full_row_renders_padded_hex_and_ascii_gutter() {
        let settings = DebugLayerSettings { line_width: 4, ..DebugLayerSettings::default() };
        let mut stream =
            DebugStream::new(MockStream::new(b"AB\x01\x02".to_vec()), LineSink::default(), settings)
                .unwrap();
        let mut buf = [0u8; 4];
        stream.read(&mut buf).await.unwrap();
        assert_eq!(stream.sink.lines[0], "[read] 4 bytes");
        assert_eq!(stream.sink.lines[1], "41 42 01 02  AB..");
    }

    #[tokio::test]
    async fn partial_row_carries_until_flushed() {
        let settings = DebugLayerSettings { line_width: 8, ..DebugLayerSettings::default() };
        let mut stream =
            DebugStream::new(MockStream::new(b"hi".to_vec()), LineSink::default(), settings)
                .unwrap();
        let mut buf = [0u8; 8];
        stream.read(&mut buf).await.unwrap();
        assert!(!stream.sink.lines.iter().any(|l| l.starts_with("68 69")));
        stream.flush();
        assert!(stream.sink.lines.iter().any(|l| l.starts_with("68 69")));
    }

    #[tokio::test]
    async fn uppercase_hex_setting_is_honored() {
        let settings = DebugLayerSettings {
            line_width: 1,
            uppercase_hex: true,
            ..DebugLayerSettings::default()
        };
        let mut stream =
            DebugStream::new(MockStream::new(vec![0xab]), LineSink::default(), settings).unwrap();
        let mut buf = [0u8; 1];
        stream.read(&mut buf).await.unwrap();
        assert_eq!(stream.sink.lines[1], "AB  .");
    }

    #[tokio::test]
    async fn text_mode_logs_raw_lossy_text() {
        let settings =
            DebugLayerSettings { mode: DebugMode::Text, ..DebugLayerSettings::default() };
        let mut stream =
            DebugStream::new(MockStream::new(b"hello".to_vec()), LineSink::default(), settings)
                .unwrap();
        let mut buf = [0u8; 5];
        stream.read(&mut buf).await.unwrap();
        assert_eq!(stream.sink.lines[1], "hello");
    }
}
