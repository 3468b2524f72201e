//! Typed configuration for the protocol pipeline: the handful of knobs
//! `spec.md` leaves to the embedding application (framing size limit,
//! compression threshold, debug-layer presentation) rather than baking
//! them in as constants. Same plain-struct-with-`Default` style as
//! `rustcraft_bin::consts`, but overridable at runtime since these are
//! per-connection policy, not build-time constants.
//!
//! No environment-variable or CLI surface lives here: `spec.md` §6 is
//! explicit that the core has neither. An embedding binary is free to
//! build one on top of [`ProtocolSettings::default`].

use serde::{Deserialize, Serialize};

/// How the debug stream layer renders the bytes crossing it (`spec.md` §4.6).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DebugMode {
    HexDump,
    Text,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DebugLayerSettings {
    /// Bytes per hex-dump line. Must be `> 0`; `spec.md` §4.6 calls this
    /// out explicitly as an initialization failure, not merely odd
    /// output, so callers should validate it before handing it to the
    /// debug layer.
    pub line_width: usize,
    pub uppercase_hex: bool,
    pub name: String,
    pub mode: DebugMode,
}

impl Default for DebugLayerSettings {
    fn default() -> Self {
        DebugLayerSettings {
            line_width: 16,
            uppercase_hex: false,
            name: String::new(),
            mode: DebugMode::HexDump,
        }
    }
}

/// Connection-wide framing and compression policy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProtocolSettings {
    /// Bodies above this length are rejected by the framing-read `limit`
    /// hook before the body is read off the wire (`spec.md` §4.8).
    pub max_packet_len: u32,
    /// Uncompressed bodies at or above this size get the compressed
    /// envelope; below it, the "below-threshold, literal-follows" path
    /// applies (`spec.md` §4.10's `proceed` predicate).
    pub compression_threshold: i32,
    pub debug: DebugLayerSettings,
}

impl Default for ProtocolSettings {
    fn default() -> Self {
        ProtocolSettings {
            max_packet_len: 2 * 1024 * 1024,
            compression_threshold: 256,
            debug: DebugLayerSettings::default(),
        }
    }
}
