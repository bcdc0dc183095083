//! Echo loop: reads frames from a client and sends their payloads back.

use std::sync::atomic::{AtomicU64, Ordering};

use bytes::BytesMut;
use tokio::io::{AsyncRead, AsyncWrite};
use tracing::Instrument;

use crate::codec::FrameCodec;
use crate::config::{Config, EchoMode};
use crate::connection::fragmenter::Fragmenter;
use crate::connection::machine::{FrameMachine, Reply, Route};
use crate::error::{Error, Result};
use crate::protocol::{CloseFrame, FrameHeader, OpCode};

static NEXT_SESSION_ID: AtomicU64 = AtomicU64::new(1);

/// One echo connection over a stream that is already past the upgrade.
///
/// ## Example
///
/// ```rust,ignore
/// use wsecho::{Config, EchoSession};
///
/// let (stream, _) = listener.accept().await?;
/// // ... complete the HTTP upgrade on `stream` ...
/// tokio::spawn(async move {
///     let _ = EchoSession::new(stream, Config::autobahn()).run().await;
/// });
/// ```
pub struct EchoSession<T> {
    id: u64,
    codec: FrameCodec<T>,
    machine: FrameMachine,
    /// Payload of the frame being read.
    frame: BytesMut,
    /// Message being reassembled in [`EchoMode::Message`].
    message: BytesMut,
    message_opcode: OpCode,
    fragments: usize,
}

impl<T: AsyncRead> EchoSession<T> {
    /// Wrap `io` in a new session.
    #[must_use]
    pub fn new(io: T, config: Config) -> Self {
        Self {
            id: NEXT_SESSION_ID.fetch_add(1, Ordering::Relaxed),
            codec: FrameCodec::new(io, config),
            machine: FrameMachine::new(),
            frame: BytesMut::new(),
            message: BytesMut::new(),
            message_opcode: OpCode::Binary,
            fragments: 0,
        }
    }

    /// Process-unique session id, also recorded on the tracing span.
    #[must_use]
    pub const fn id(&self) -> u64 {
        self.id
    }
}

impl<T: AsyncRead + AsyncWrite + Unpin> EchoSession<T> {
    /// Echo frames until the connection ends.
    ///
    /// Returns the peer's close frame (`None` if it was empty) once the close
    /// handshake has completed.
    ///
    /// # Errors
    ///
    /// Stream failures are returned as-is with nothing sent. Protocol
    /// violations are answered with a close frame carrying
    /// [`Error::close_code`] before the error is returned.
    pub async fn run(mut self) -> Result<Option<CloseFrame>> {
        let span = tracing::debug_span!(
            "echo_session",
            id = self.id,
            mode = ?self.codec.config().echo_mode
        );

        async move {
            match self.process().await {
                Ok(close) => Ok(close),
                Err(err) => {
                    self.fail(&err).await;
                    Err(err)
                }
            }
        }
        .instrument(span)
        .await
    }

    async fn process(&mut self) -> Result<Option<CloseFrame>> {
        loop {
            let header = self.codec.read_header().await?;
            tracing::debug!(
                opcode = %header.opcode,
                fin = header.fin,
                len = header.payload_len,
                "frame"
            );

            let route = self.machine.on_header(&header)?;
            if route != Route::Control && self.codec.config().echo_mode == EchoMode::Message {
                self.check_message_limits(&header)?;
            }

            self.frame.clear();
            let machine = &mut self.machine;
            self.codec
                .read_payload(&header, &mut self.frame, |chunk| {
                    machine.on_payload(route, chunk)
                })
                .await?;
            self.machine.end_frame(route)?;

            match route {
                Route::Control => {
                    if let Some(close) = self.on_control(header.opcode).await? {
                        return Ok(close);
                    }
                }
                Route::Text { .. } | Route::Binary => self.on_data(&header).await?,
            }
        }
    }

    /// Enforce reassembly limits before a data frame's payload is read.
    fn check_message_limits(&mut self, header: &FrameHeader) -> Result<()> {
        let limits = &self.codec.config().limits;
        self.fragments += 1;
        limits.check_fragment_count(self.fragments)?;
        let len = usize::try_from(header.payload_len).unwrap_or(usize::MAX);
        limits.check_message_size(self.message.len().saturating_add(len))
    }

    async fn on_data(&mut self, header: &FrameHeader) -> Result<()> {
        match self.codec.config().echo_mode {
            EchoMode::Frame => {
                self.codec
                    .write_frame(header.fin, header.opcode, &self.frame)
                    .await?;
                self.codec.flush().await
            }
            EchoMode::Message => {
                if header.opcode != OpCode::Continuation {
                    self.message_opcode = header.opcode;
                }
                self.message.extend_from_slice(&self.frame);
                if !header.fin {
                    return Ok(());
                }

                tracing::debug!(
                    opcode = %self.message_opcode,
                    len = self.message.len(),
                    fragments = self.fragments,
                    "message"
                );
                let fragment_size = self.codec.config().fragment_size;
                for fragment in Fragmenter::new(&self.message, self.message_opcode, fragment_size) {
                    self.codec
                        .write_frame(fragment.fin, fragment.opcode, fragment.payload)
                        .await?;
                }
                self.message.clear();
                self.fragments = 0;
                self.codec.flush().await
            }
        }
    }

    /// Answer a control frame. Returns `Some` once the close handshake is done.
    async fn on_control(&mut self, opcode: OpCode) -> Result<Option<Option<CloseFrame>>> {
        match self.machine.on_control(opcode, &self.frame)? {
            Reply::Pong(payload) => {
                self.codec.write_frame(true, OpCode::Pong, &payload).await?;
                self.codec.flush().await?;
                Ok(None)
            }
            Reply::None => Ok(None),
            Reply::Close(frame) => {
                let code = frame.as_ref().map(|f| f.code);
                self.codec.write_close(code).await?;
                self.codec.shutdown().await?;
                match &frame {
                    Some(f) => tracing::info!(
                        code = %f.code,
                        reason = %f.reason,
                        "close handshake complete"
                    ),
                    None => tracing::info!("close handshake complete, no status code"),
                }
                Ok(Some(frame))
            }
        }
    }

    /// Best-effort close after a fatal error.
    async fn fail(&mut self, err: &Error) {
        let Some(code) = err.close_code() else {
            tracing::debug!(error = %err, "stream ended");
            return;
        };
        tracing::warn!(error = %err, close_code = %code, "protocol violation");
        if let Err(write_err) = self.codec.write_close(Some(code)).await {
            tracing::debug!(error = %write_err, "failed to send close frame");
            return;
        }
        if let Err(shutdown_err) = self.codec.shutdown().await {
            tracing::debug!(error = %shutdown_err, "failed to shut down stream");
        }
    }
}

/// Run an echo session on `io` to completion.
///
/// # Errors
///
/// See [`EchoSession::run`].
pub async fn serve<T>(io: T, config: Config) -> Result<Option<CloseFrame>>
where
    T: AsyncRead + AsyncWrite + Unpin,
{
    EchoSession::new(io, config).run().await
}
