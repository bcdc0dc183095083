use bytes::{BufMut, BytesMut};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt, BufReader};

use crate::config::Config;
use crate::error::{Error, Result};
use crate::protocol::header::read_header;
use crate::protocol::validation::FrameValidator;
use crate::protocol::{Cipher, CloseCode, FrameHeader, OpCode, close_payload};

/// Server-side frame codec over an async byte stream.
///
/// Reads are buffered and payloads are streamed in chunks of at most
/// `read_buffer_size` bytes. Outgoing frames are always unmasked.
pub struct FrameCodec<T> {
    io: BufReader<T>,
    chunk: Vec<u8>,
    write_buf: BytesMut,
    config: Config,
    validator: FrameValidator,
}

impl<T: AsyncRead> FrameCodec<T> {
    #[must_use]
    pub fn new(io: T, config: Config) -> Self {
        let validator = FrameValidator::new(config.limits.clone())
            .with_accept_unmasked(config.accept_unmasked_frames);
        Self {
            io: BufReader::with_capacity(config.read_buffer_size.max(1), io),
            chunk: vec![0; config.read_buffer_size.max(1)],
            write_buf: BytesMut::with_capacity(config.write_buffer_size),
            config,
            validator,
        }
    }

    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    #[must_use]
    pub fn get_ref(&self) -> &T {
        self.io.get_ref()
    }

    #[must_use]
    pub fn into_inner(self) -> T {
        self.io.into_inner()
    }
}

impl<T: AsyncRead + AsyncWrite + Unpin> FrameCodec<T> {
    /// Read and validate the next frame header.
    ///
    /// # Errors
    ///
    /// Stream errors from [`read_header`] and any header check of
    /// [`FrameValidator::validate`].
    pub async fn read_header(&mut self) -> Result<FrameHeader> {
        let header = read_header(&mut self.io).await?;
        self.validator.validate(&header)?;
        Ok(header)
    }

    /// Stream the payload of `header`, unmasked, into `sink`.
    ///
    /// `inspect` sees every chunk before it is appended; an error from it
    /// stops the read immediately, leaving the rest of the payload unread.
    ///
    /// # Errors
    ///
    /// `Error::Io` if the stream ends mid-payload, or the first error
    /// returned by `inspect`.
    pub async fn read_payload<F>(
        &mut self,
        header: &FrameHeader,
        sink: &mut BytesMut,
        mut inspect: F,
    ) -> Result<()>
    where
        F: FnMut(&[u8]) -> Result<()>,
    {
        let mut cipher = Cipher::new(header.mask);
        let mut remaining = header.payload_len;
        sink.reserve(usize::try_from(remaining).unwrap_or(usize::MAX).min(self.chunk.len()));

        while remaining > 0 {
            let want = usize::try_from(remaining)
                .unwrap_or(usize::MAX)
                .min(self.chunk.len());
            let n = self.io.read(&mut self.chunk[..want]).await?;
            if n == 0 {
                return Err(Error::Io(format!(
                    "unexpected EOF with {remaining} payload bytes outstanding"
                )));
            }

            let chunk = &mut self.chunk[..n];
            cipher.apply(chunk);
            inspect(&*chunk)?;
            sink.put_slice(chunk);
            remaining -= n as u64;
        }
        Ok(())
    }

    /// Encode `header` without its mask into the write buffer.
    pub fn write_header(&mut self, header: &FrameHeader) {
        header.with_mask(None).encode(&mut self.write_buf);
    }

    /// Write one unmasked frame. Data reaches the stream on [`flush`](Self::flush)
    /// or once the write buffer is full.
    pub async fn write_frame(&mut self, fin: bool, opcode: OpCode, payload: &[u8]) -> Result<()> {
        self.write_header(&FrameHeader::new(fin, opcode, payload.len() as u64));
        if self.write_buf.len() + payload.len() > self.config.write_buffer_size {
            self.io.write_all(&self.write_buf).await?;
            self.write_buf.clear();
            self.io.write_all(payload).await?;
        } else {
            self.write_buf.put_slice(payload);
        }
        Ok(())
    }

    /// Write a close frame, with an empty payload for `None`.
    pub async fn write_close(&mut self, code: Option<CloseCode>) -> Result<()> {
        let payload = close_payload(code, "");
        self.write_frame(true, OpCode::Close, &payload).await
    }

    pub async fn flush(&mut self) -> Result<()> {
        if !self.write_buf.is_empty() {
            self.io.write_all(&self.write_buf).await?;
            self.write_buf.clear();
        }
        self.io.flush().await?;
        Ok(())
    }

    /// Flush pending frames and shut down the write half.
    pub async fn shutdown(&mut self) -> Result<()> {
        self.flush().await?;
        self.io.shutdown().await?;
        Ok(())
    }
}
