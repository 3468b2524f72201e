//! Zero-copy prefix/suffix views over a byte slice (`spec.md` §4.4).
//!
//! Rust slices are already zero-copy views; these newtypes exist so the
//! framing and compression-envelope code can return "the unconsumed
//! suffix" or "the first N bytes" with a name that documents intent,
//! mirroring `mcpp`'s `prefix_buffer_sequence` / `suffix_buffer_sequence`.

use std::ops::Deref;

/// A view bounded to the first `n` bytes of an underlying slice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Prefix<'a> {
    inner: &'a [u8],
}

impl<'a> Prefix<'a> {
    #[must_use]
    pub fn new(buf: &'a [u8], n: usize) -> Self {
        let n = n.min(buf.len());
        Prefix { inner: &buf[..n] }
    }
}

impl<'a> Deref for Prefix<'a> {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        self.inner
    }
}

impl<'a> AsRef<[u8]> for Prefix<'a> {
    fn as_ref(&self) -> &[u8] {
        self.inner
    }
}

/// A view bounded to the last `n` bytes of an underlying slice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Suffix<'a> {
    inner: &'a [u8],
}

impl<'a> Suffix<'a> {
    #[must_use]
    pub fn new(buf: &'a [u8], n: usize) -> Self {
        let n = n.min(buf.len());
        let start = buf.len() - n;
        Suffix {
            inner: &buf[start..],
        }
    }

    /// A suffix view of everything past the first `consumed` bytes.
    #[must_use]
    pub fn after(buf: &'a [u8], consumed: usize) -> Self {
        let consumed = consumed.min(buf.len());
        Suffix {
            inner: &buf[consumed..],
        }
    }
}

impl<'a> Deref for Suffix<'a> {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        self.inner
    }
}

impl<'a> AsRef<[u8]> for Suffix<'a> {
    fn as_ref(&self) -> &[u8] {
        self.inner
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prefix_bounds_to_first_n() {
        let buf = [1u8, 2, 3, 4, 5];
        assert_eq!(&*Prefix::new(&buf, 2), &[1, 2]);
    }

    #[test]
    fn prefix_clamps_past_end() {
        let buf = [1u8, 2];
        assert_eq!(&*Prefix::new(&buf, 10), &[1, 2]);
    }

    #[test]
    fn suffix_bounds_to_last_n() {
        let buf = [1u8, 2, 3, 4, 5];
        assert_eq!(&*Suffix::new(&buf, 2), &[4, 5]);
    }

    #[test]
    fn suffix_after_consumed_prefix() {
        let buf = [1u8, 2, 3, 4, 5];
        assert_eq!(&*Suffix::after(&buf, 3), &[4, 5]);
    }

    #[test]
    fn empty_views_are_empty() {
        let buf = [1u8, 2, 3];
        assert!(Prefix::new(&buf, 0).is_empty());
        assert!(Suffix::new(&buf, 0).is_empty());
    }
}
