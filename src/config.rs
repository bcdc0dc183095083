//! Configuration and limits for echo sessions.

/// Resource limits applied to incoming traffic.
///
/// These bound the memory a single connection can pin: a frame payload is
/// buffered in full before it is echoed, and in message mode the whole
/// message is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Limits {
    /// Maximum payload size of a single frame in bytes.
    ///
    /// Default: 16 MB (16 * 1024 * 1024)
    pub max_frame_size: usize,

    /// Maximum size of a reassembled message in bytes (message mode only).
    ///
    /// Default: 64 MB (64 * 1024 * 1024)
    pub max_message_size: usize,

    /// Maximum number of fragments in a single message (message mode only).
    ///
    /// Default: 128
    pub max_fragment_count: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_frame_size: 16 << 20,
            max_message_size: 64 << 20,
            max_fragment_count: 128,
        }
    }
}

impl Limits {
    /// Limits with explicit frame, message and fragment bounds.
    #[must_use]
    pub const fn new(
        max_frame_size: usize,
        max_message_size: usize,
        max_fragment_count: usize,
    ) -> Self {
        Self {
            max_frame_size,
            max_message_size,
            max_fragment_count,
        }
    }

    /// Limits suitable for small embedded systems.
    ///
    /// - Max frame: 64 KB
    /// - Max message: 256 KB
    /// - Max fragments: 16
    #[must_use]
    pub const fn embedded() -> Self {
        Self {
            max_frame_size: 64 * 1024,
            max_message_size: 256 * 1024,
            max_fragment_count: 16,
        }
    }

    /// Limits for trusted environments such as a conformance run.
    ///
    /// Autobahn's fragmentation cases send messages split into up to 64K
    /// single-byte frames, hence the large fragment budget.
    #[must_use]
    pub const fn unrestricted() -> Self {
        Self {
            max_frame_size: 256 * 1024 * 1024,
            max_message_size: 256 * 1024 * 1024,
            max_fragment_count: usize::MAX,
        }
    }

    /// Validate an announced frame payload length.
    ///
    /// # Errors
    ///
    /// Returns [`Error::FrameTooLarge`](crate::Error::FrameTooLarge) if `size` exceeds the configured maximum.
    pub const fn check_frame_size(&self, size: u64) -> Result<(), crate::Error> {
        if size > self.max_frame_size as u64 {
            Err(crate::Error::FrameTooLarge {
                size,
                max: self.max_frame_size,
            })
        } else {
            Ok(())
        }
    }

    /// Validate an accumulated message size.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MessageTooLarge`](crate::Error::MessageTooLarge) if `size` exceeds the configured maximum.
    pub const fn check_message_size(&self, size: usize) -> Result<(), crate::Error> {
        if size > self.max_message_size {
            Err(crate::Error::MessageTooLarge {
                size,
                max: self.max_message_size,
            })
        } else {
            Ok(())
        }
    }

    /// Validate a fragment count.
    ///
    /// # Errors
    ///
    /// Returns [`Error::TooManyFragments`](crate::Error::TooManyFragments) if `count` exceeds the configured maximum.
    pub const fn check_fragment_count(&self, count: usize) -> Result<(), crate::Error> {
        if count > self.max_fragment_count {
            Err(crate::Error::TooManyFragments {
                count,
                max: self.max_fragment_count,
            })
        } else {
            Ok(())
        }
    }
}

/// How accepted data is sent back to the peer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum EchoMode {
    /// Echo every data frame as soon as its payload is validated, keeping
    /// the peer's opcode, FIN bit and length.
    #[default]
    Frame,
    /// Reassemble fragmented messages and echo each complete message,
    /// re-fragmented by [`Config::fragment_size`].
    Message,
}

/// Echo session configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Bounds on frame size, message size and fragment count.
    pub limits: Limits,

    /// Echo strategy.
    ///
    /// Default: [`EchoMode::Frame`]
    pub echo_mode: EchoMode,

    /// Fragment size for echoed messages in [`EchoMode::Message`].
    ///
    /// Default: 16 KB (16 * 1024)
    pub fragment_size: usize,

    /// Accept unmasked frames from clients.
    ///
    /// RFC 6455 requires clients to mask all frames. Setting this to `true`
    /// violates the protocol but can help when driving the engine from
    /// hand-written fixtures.
    ///
    /// Default: false
    pub accept_unmasked_frames: bool,

    /// Read buffer size, also the chunk size payloads are streamed in.
    ///
    /// Default: 8 KB (8192)
    pub read_buffer_size: usize,

    /// Write buffer size.
    ///
    /// Default: 8 KB (8192)
    pub write_buffer_size: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            limits: Limits::default(),
            echo_mode: EchoMode::Frame,
            fragment_size: 16 * 1024,
            accept_unmasked_frames: false,
            read_buffer_size: 8192,
            write_buffer_size: 8192,
        }
    }
}

impl Config {
    /// Default configuration: frame echo, default limits, masking enforced.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Configuration used against the Autobahn fuzzing client.
    #[must_use]
    pub fn autobahn() -> Self {
        Self {
            limits: Limits::unrestricted(),
            read_buffer_size: 64 * 1024,
            write_buffer_size: 64 * 1024,
            ..Default::default()
        }
    }

    /// Replace the resource limits.
    #[must_use]
    pub const fn with_limits(mut self, limits: Limits) -> Self {
        self.limits = limits;
        self
    }

    /// Set the echo strategy.
    #[must_use]
    pub const fn with_echo_mode(mut self, mode: EchoMode) -> Self {
        self.echo_mode = mode;
        self
    }

    /// Set fragment size for echoed messages.
    #[must_use]
    pub const fn with_fragment_size(mut self, size: usize) -> Self {
        self.fragment_size = size;
        self
    }

    /// Accept or reject unmasked client frames.
    #[must_use]
    pub const fn with_accept_unmasked(mut self, accept: bool) -> Self {
        self.accept_unmasked_frames = accept;
        self
    }

    /// Set the read buffer and payload chunk size.
    #[must_use]
    pub const fn with_read_buffer_size(mut self, size: usize) -> Self {
        self.read_buffer_size = size;
        self
    }

    /// Set the outgoing buffer size. Larger frames bypass the buffer.
    #[must_use]
    pub const fn with_write_buffer_size(mut self, size: usize) -> Self {
        self.write_buffer_size = size;
        self
    }
}
