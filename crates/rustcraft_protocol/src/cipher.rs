//! Cipher stream layer (`spec.md` §4.7): a transparent pass-through that
//! routes bytes through a block cipher running in CFB8 mode, the scheme
//! Minecraft uses post-handshake (AES-128, key = shared secret, IV =
//! shared secret).
//!
//! The layer doesn't construct the cipher itself — the caller completes
//! the encryption handshake (key exchange, shared-secret agreement) and
//! hands this layer an already-initialized encryptor/decryptor pair, per
//! `spec.md` §6's "interfaces consumed from crypto" contract.

use std::io;

use aes::Aes128;
use cfb8::{Decryptor, Encryptor};
use cipher::{AsyncStreamCipher, KeyIvInit};

use crate::stream::{AsyncByteStream, LowestLayer};

pub type Aes128Cfb8Enc = Encryptor<Aes128>;
pub type Aes128Cfb8Dec = Decryptor<Aes128>;

/// Constructs the encrypt/decrypt pair Minecraft's handshake protocol
/// derives: same 16-byte shared secret used as both key and IV.
#[must_use]
pub fn new_cfb8_pair(shared_secret: &[u8; 16]) -> (Aes128Cfb8Enc, Aes128Cfb8Dec) {
    (
        Aes128Cfb8Enc::new(shared_secret.into(), shared_secret.into()),
        Aes128Cfb8Dec::new(shared_secret.into(), shared_secret.into()),
    )
}

/// The narrow contract this layer needs from a cipher context: update a
/// buffer of arbitrary size in place, carrying whatever running state the
/// mode requires between calls.
pub trait CipherUpdate {
    fn update_in_place(&mut self, buf: &mut [u8]);
}

impl CipherUpdate for Aes128Cfb8Enc {
    fn update_in_place(&mut self, buf: &mut [u8]) {
        self.encrypt(buf);
    }
}

impl CipherUpdate for Aes128Cfb8Dec {
    fn update_in_place(&mut self, buf: &mut [u8]) {
        self.decrypt(buf);
    }
}

/// Wraps a next layer with symmetric encryption. Write-side plaintext is
/// staged into a same-sized scratch buffer, cipher-updated in place, and
/// the ciphertext is what actually crosses the wire; read-side ciphertext
/// is staged the same way and decrypted into the caller's destination.
/// The scratch buffer is sized to exactly one call and dropped afterward
/// (`spec.md` §4.7 "Reuse") so the layer holds no memory between calls.
pub struct CipherStream<S, E, D> {
    next: S,
    encryptor: E,
    decryptor: D,
}

impl<S, E, D> CipherStream<S, E, D> {
    pub fn new(next: S, encryptor: E, decryptor: D) -> Self {
        CipherStream { next, encryptor, decryptor }
    }

    pub fn into_inner(self) -> S {
        self.next
    }
}

impl<S: AsyncByteStream, E: CipherUpdate, D: CipherUpdate> AsyncByteStream
    for CipherStream<S, E, D>
{
    async fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let mut staging = vec![0u8; buf.len()];
        let n = self.next.read(&mut staging).await?;
        self.decryptor.update_in_place(&mut staging[..n]);
        buf[..n].copy_from_slice(&staging[..n]);
        tracing::trace!("[CIPHER] decrypted {n} byte(s)");
        Ok(n)
    }

    async fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let mut staging = buf.to_vec();
        self.encryptor.update_in_place(&mut staging);
        self.next.write_all(&staging).await?;
        tracing::trace!("[CIPHER] encrypted {} byte(s)", buf.len());
        Ok(buf.len())
    }
}

impl<S: LowestLayer, E, D> LowestLayer for CipherStream<S, E, D> {
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

    #[tokio::test]
    async fn write_then_read_round_trips_plaintext() {
        let secret = [7u8; 16];
        let (enc, _) = new_cfb8_pair(&secret);
        let mut writer = CipherStream::new(MockStream::new(Vec::new()), enc, new_cfb8_pair(&secret).1);

        writer.write(b"hello, minecraft").await.unwrap();
        let ciphertext = writer.into_inner().written;
        assert_ne!(ciphertext, b"hello, minecraft");

        let (_, dec) = new_cfb8_pair(&secret);
        let mut reader =
            CipherStream::new(MockStream::new(ciphertext.clone()), new_cfb8_pair(&secret).0, dec);
        let mut buf = vec![0u8; ciphertext.len()];
        let n = reader.read(&mut buf).await.unwrap();
        assert_eq!(&buf[..n], b"hello, minecraft");
    }

    #[tokio::test]
    async fn stream_is_order_preserving_across_multiple_calls() {
        let secret = [3u8; 16];
        let (enc, dec) = new_cfb8_pair(&secret);
        let mut writer = CipherStream::new(MockStream::new(Vec::new()), enc, dec);

        writer.write(b"abc").await.unwrap();
        writer.write(b"def").await.unwrap();
        let ciphertext = writer.into_inner().written;

        let (enc2, dec2) = new_cfb8_pair(&secret);
        let mut reader = CipherStream::new(MockStream::new(ciphertext), enc2, dec2);
        let mut buf = [0u8; 3];
        reader.read_exact(&mut buf).await.unwrap();
        assert_eq!(&buf, b"abc");
        reader.read_exact(&mut buf).await.unwrap();
        assert_eq!(&buf, b"def");
    }
}
