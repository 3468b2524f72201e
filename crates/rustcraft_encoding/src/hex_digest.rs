//! Minecraft's signed hex-digest rendering (`spec.md` §4.13).
//!
//! Interprets a byte sequence as a big-endian two's-complement integer: if
//! the high bit of the first byte is set, emits `-` followed by the
//! magnitude of the negation; otherwise emits the magnitude unchanged.
//! Leading zero *bytes* are skipped entirely; the first byte actually
//! emitted is rendered without zero-padding, every byte after it is
//! zero-padded to two hex digits. Used for the Yggdrasil session-hash
//! thumbprint, `sha1(serverId || sharedSecret || publicKey)`.

/// Renders `bytes` as Minecraft's signed hex digest.
#[must_use]
pub fn to_hex_digest(bytes: &[u8]) -> String {
    if bytes.is_empty() {
        return String::new();
    }
    if bytes[0] > i8::MAX as u8 {
        negative(bytes)
    } else {
        positive(bytes)
    }
}

fn format_byte(byte: u8, first: &mut bool, out: &mut String) {
    if *first && byte == 0 {
        return;
    }
    if *first {
        out.push_str(&format!("{byte:x}"));
        *first = false;
    } else {
        out.push_str(&format!("{byte:02x}"));
    }
}

fn positive(bytes: &[u8]) -> String {
    let mut out = String::new();
    let mut first = true;
    for &b in bytes {
        format_byte(b, &mut first, &mut out);
    }
    out
}

fn negative(bytes: &[u8]) -> String {
    // Two's-complement negation: bytes strictly before the rightmost
    // nonzero byte are simple bitwise-inverted; the rightmost nonzero
    // byte and everything after it get inverted-then-incremented, which
    // correctly ripples the carry through any trailing zero bytes.
    let carry_from = bytes
        .iter()
        .rposition(|&b| b != 0)
        .expect("negative digest of an all-zero sequence");
    let mut out = String::from("-");
    let mut first = true;
    for (i, &b) in bytes.iter().enumerate() {
        let rendered = if i < carry_from {
            !b
        } else {
            (!b).wrapping_add(1)
        };
        format_byte(rendered, &mut first, &mut out);
    }
    out
}
