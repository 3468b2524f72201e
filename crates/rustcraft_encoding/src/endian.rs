//! Big-endian scalar codec (`spec.md` §4.3).
//!
//! The C++ reference (`endian.hpp`) memcpy's a scalar into a byte array
//! and conditionally reverses it to reach big-endian order; Rust's
//! standard library already performs exactly that operation, correctly,
//! via `to_be_bytes`/`from_be_bytes`, so this module is a thin trait
//! wrapper that adds the EOF bookkeeping the wire codec needs.

use thiserror::Error;

use crate::error::{Canonical, CanonicalError};

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum EndianError {
    #[error("fewer bytes remain than the scalar's width")]
    Eof,
}

impl CanonicalError for EndianError {
    fn canonical(&self) -> Option<Canonical> {
        Some(Canonical::Eof)
    }
}

/// A scalar with a fixed big-endian byte representation.
pub trait BigEndian: Sized + Copy {
    type Bytes: AsRef<[u8]> + AsMut<[u8]> + Default;

    fn to_be(self) -> Self::Bytes;
    fn from_be(bytes: Self::Bytes) -> Self;
}

macro_rules! impl_big_endian {
    ($($t:ty => $n:expr),* $(,)?) => {
        $(
            impl BigEndian for $t {
                type Bytes = [u8; $n];

                #[inline]
                fn to_be(self) -> Self::Bytes {
                    self.to_be_bytes()
                }

                #[inline]
                fn from_be(bytes: Self::Bytes) -> Self {
                    Self::from_be_bytes(bytes)
                }
            }
        )*
    };
}

impl_big_endian! {
    i8 => 1, u8 => 1,
    i16 => 2, u16 => 2,
    i32 => 4, u32 => 4,
    i64 => 8, u64 => 8,
    f32 => 4, f64 => 8,
}

/// Appends `value`'s big-endian representation to `out`.
pub fn write_be<T: BigEndian>(value: T, out: &mut Vec<u8>) {
    out.extend_from_slice(value.to_be().as_ref());
}

/// Reads a big-endian `T` from the front of `buf`, returning the value and
/// the unconsumed suffix, or [`EndianError::Eof`] if too few bytes remain.
pub fn read_be<T: BigEndian>(buf: &[u8]) -> Result<(T, &[u8]), EndianError> {
    let mut bytes = T::Bytes::default();
    let width = bytes.as_ref().len();
    if buf.len() < width {
        return Err(EndianError::Eof);
    }
    bytes.as_mut().copy_from_slice(&buf[..width]);
    Ok((T::from_be(bytes), &buf[width..]))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trip_i32() {
        let mut out = Vec::new();
        write_be(-123456i32, &mut out);
        let (v, rest) = read_be::<i32>(&out).unwrap();
        assert_eq!(v, -123456);
        assert!(rest.is_empty());
    }

    #[test]
    fn round_trip_f64() {
        let mut out = Vec::new();
        write_be(std::f64::consts::PI, &mut out);
        let (v, rest) = read_be::<f64>(&out).unwrap();
        assert_eq!(v, std::f64::consts::PI);
        assert!(rest.is_empty());
    }

    #[test]
    fn eof_when_short() {
        let buf = [0u8, 1, 2];
        assert_eq!(read_be::<i32>(&buf), Err(EndianError::Eof));
    }

    #[test]
    fn big_endian_byte_order() {
        let mut out = Vec::new();
        write_be(1i32, &mut out);
        assert_eq!(out, vec![0x00, 0x00, 0x00, 0x01]);
    }

    proptest::proptest! {
        #[test]
        fn prop_round_trip_i64(v: i64) {
            let mut out = Vec::new();
            write_be(v, &mut out);
            let (decoded, rest) = read_be::<i64>(&out).unwrap();
            proptest::prop_assert_eq!(decoded, v);
            proptest::prop_assert!(rest.is_empty());
        }
    }
}
