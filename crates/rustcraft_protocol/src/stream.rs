//! Layered-stream framework (`spec.md` §4.5, §9 "layered streams without
//! inheritance"): a minimal async byte-stream capability every layer and
//! every leaf transport in this crate shares, plus a [`LowestLayer`] walk
//! down to the socket at the bottom of a stack.
//!
//! Rather than the C++ reference's CRTP base class, layers here are plain
//! generic structs nesting a `Next: AsyncByteStream`. Composition reads
//! the same way it nests: `CipherStream<DebugStream<TcpStream>>`.

use std::io;

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

/// The capability every layer composes over: read-some / write-some with
/// the usual partial-completion shape, plus the `_exact`/`_all` helpers
/// built from them. tokio's ambient per-task executor makes an explicit
/// "get executor" accessor unnecessary here; every `.await` already runs
/// on the current task.
#[allow(async_fn_in_trait)]
pub trait AsyncByteStream {
    async fn read(&mut self, buf: &mut [u8]) -> io::Result<usize>;
    async fn write(&mut self, buf: &[u8]) -> io::Result<usize>;

    async fn read_exact(&mut self, buf: &mut [u8]) -> io::Result<()> {
        let mut off = 0;
        while off < buf.len() {
            let n = self.read(&mut buf[off..]).await?;
            if n == 0 {
                return Err(io::Error::new(io::ErrorKind::UnexpectedEof, "read_exact hit EOF"));
            }
            off += n;
        }
        Ok(())
    }

    async fn write_all(&mut self, buf: &[u8]) -> io::Result<()> {
        let mut off = 0;
        while off < buf.len() {
            let n = self.write(&buf[off..]).await?;
            if n == 0 {
                return Err(io::Error::new(io::ErrorKind::WriteZero, "write returned zero bytes"));
            }
            off += n;
        }
        Ok(())
    }
}

/// Any real tokio transport is an `AsyncByteStream` for free.
impl<T: AsyncRead + AsyncWrite + Unpin> AsyncByteStream for T {
    async fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        AsyncReadExt::read(self, buf).await
    }

    async fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        AsyncWriteExt::write(self, buf).await
    }
}

/// Walks down to the bottom-most (socket-like) layer of a stack. Each
/// layer forwards to its `Next`'s impl; leaf transports terminate the
/// walk by naming themselves as their own lowest layer.
pub trait LowestLayer {
    type Lowest;

    fn lowest_layer(&self) -> &Self::Lowest;
    fn lowest_layer_mut(&mut self) -> &mut Self::Lowest;
}

impl LowestLayer for tokio::net::TcpStream {
    type Lowest = tokio::net::TcpStream;

    fn lowest_layer(&self) -> &Self::Lowest {
        self
    }

    fn lowest_layer_mut(&mut self) -> &mut Self::Lowest {
        self
    }
}
