//! Development tooling for embedding applications: a packet-capture
//! [`rustcraft_protocol::DebugSink`] that mirrors every line the debug
//! stream layer produces into `tracing` and, optionally, to numbered
//! capture files on disk — the same on-disk capture idiom this
//! workspace's `PacketLogger` used, generalized from a standalone tool
//! into a reusable debug-layer consumer.

pub mod capture;

pub use capture::{CaptureSink, CaptureSinkError};
