//! [`CaptureSink`]: a [`DebugSink`] that logs every line through
//! `tracing` and, when constructed with a capture directory, also writes
//! each `[read]`/`[write]` block's hex-dump lines to a numbered file —
//! the same "clear old captures on startup, number new ones" discipline
//! this workspace's original `PacketLogger` used for raw packet bytes,
//! now driven by the debug stream layer's own formatted output instead
//! of re-deriving packet boundaries by hand.

use std::fs;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};

use rustcraft_protocol::DebugSink;
use thiserror::Error;
use tracing::{debug, info};

#[derive(Debug, Error)]
pub enum CaptureSinkError {
    #[error("failed to prepare capture directory {path}: {source}")]
    Io { path: PathBuf, #[source] source: std::io::Error },
}

/// A debug-layer consumer: always logs through `tracing`, and optionally
/// mirrors each block to `<dir>/<counter>.txt` on disk for later replay.
pub struct CaptureSink {
    dir: Option<PathBuf>,
    counter: AtomicUsize,
    current_block: Vec<String>,
}

impl CaptureSink {
    /// Logs through `tracing` only; no files are written.
    #[must_use]
    pub fn logging_only() -> Self {
        CaptureSink { dir: None, counter: AtomicUsize::new(0), current_block: Vec::new() }
    }

    /// Also mirrors each block to a numbered file under `dir`, clearing
    /// any `.txt` capture files left over from a previous run first.
    pub fn with_capture_dir(dir: impl Into<PathBuf>) -> Result<Self, CaptureSinkError> {
        let dir = dir.into();
        fs::create_dir_all(&dir).map_err(|source| CaptureSinkError::Io { path: dir.clone(), source })?;
        for entry in fs::read_dir(&dir)
            .map_err(|source| CaptureSinkError::Io { path: dir.clone(), source })?
            .flatten()
        {
            let path = entry.path();
            if path.extension().is_some_and(|ext| ext == "txt") {
                let _ = fs::remove_file(path);
            }
        }
        info!("[CAPTURE] sink initialized, writing to {}", dir.display());
        Ok(CaptureSink { dir: Some(dir), counter: AtomicUsize::new(0), current_block: Vec::new() })
    }

    fn flush_block(&mut self) {
        if self.current_block.is_empty() {
            return;
        }
        if let Some(dir) = &self.dir {
            let count = self.counter.fetch_add(1, Ordering::SeqCst);
            let path = dir.join(format!("{count:06}.txt"));
            if let Err(e) = fs::write(&path, self.current_block.join("\n")) {
                debug!("[CAPTURE] failed to write {}: {e}", path.display());
            }
        }
        self.current_block.clear();
    }
}

impl DebugSink for CaptureSink {
    fn write_line(&mut self, line: &str) {
        debug!("[CAPTURE] {line}");
        // A new block always begins with the `[read]`/`[write]` header
        // line the debug layer emits before any hex-dump rows.
        if (line.starts_with("[read]") || line.starts_with("[write]") || line.contains("] [read]") || line.contains("] [write]"))
            && !self.current_block.is_empty()
        {
            self.flush_block();
        }
        self.current_block.push(line.to_string());
    }
}

impl Drop for CaptureSink {
    fn drop(&mut self) {
        self.flush_block();
    }
}
