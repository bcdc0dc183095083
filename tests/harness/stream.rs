//! In-memory stream for driving a session from a fixed byte script.

use std::io::Cursor;
use std::pin::Pin;
use std::task::{Context, Poll};

use tokio::io::{AsyncRead, AsyncWrite, ReadBuf};

/// Reads come from a fixed buffer, writes are captured.
///
/// Reads return at most `chunk` bytes each, so tests can force payloads and
/// headers to arrive split at arbitrary points. EOF is reported once the
/// buffer is drained.
pub struct MockStream {
    read_data: Cursor<Vec<u8>>,
    write_data: Vec<u8>,
    chunk: usize,
    shutdown: bool,
}

impl MockStream {
    pub fn new(data: Vec<u8>) -> Self {
        Self::chunked(data, usize::MAX)
    }

    pub fn chunked(data: Vec<u8>, chunk: usize) -> Self {
        Self {
            read_data: Cursor::new(data),
            write_data: Vec::new(),
            chunk: chunk.max(1),
            shutdown: false,
        }
    }

    pub fn written(&self) -> &[u8] {
        &self.write_data
    }

    pub fn is_shutdown(&self) -> bool {
        self.shutdown
    }
}

impl AsyncRead for MockStream {
    fn poll_read(
        mut self: Pin<&mut Self>,
        _cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<std::io::Result<()>> {
        let pos = self.read_data.position() as usize;
        let data = self.read_data.get_ref();
        if pos >= data.len() {
            return Poll::Ready(Ok(()));
        }
        let remaining = &data[pos..];
        let to_copy = remaining.len().min(buf.remaining()).min(self.chunk);
        buf.put_slice(&remaining[..to_copy]);
        self.read_data.set_position((pos + to_copy) as u64);
        Poll::Ready(Ok(()))
    }
}

impl AsyncWrite for MockStream {
    fn poll_write(
        mut self: Pin<&mut Self>,
        _cx: &mut Context<'_>,
        buf: &[u8],
    ) -> Poll<std::io::Result<usize>> {
        self.write_data.extend_from_slice(buf);
        Poll::Ready(Ok(buf.len()))
    }

    fn poll_flush(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<std::io::Result<()>> {
        Poll::Ready(Ok(()))
    }

    fn poll_shutdown(mut self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<std::io::Result<()>> {
        self.shutdown = true;
        Poll::Ready(Ok(()))
    }
}
