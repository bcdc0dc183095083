//! # wsecho - Server-side WebSocket frame engine
//!
//! `wsecho` reads a raw byte stream that has already completed the HTTP
//! upgrade, parses RFC 6455 frames, enforces the protocol's framing, UTF-8
//! and close-code rules, and echoes every data frame back to the client. It
//! is built to pass the Autobahn `fuzzingclient` conformance suite.
//!
//! ## Features
//!
//! - **Streaming payloads**: frames are unmasked and validated chunk by chunk
//! - **Fail-fast UTF-8**: invalid text is rejected at the first bad byte,
//!   even when a code point is split across fragments
//! - **Strict validation**: RSV bits, masking, control frame and close code
//!   rules with the matching close status
//! - **Resource limits** on frame size, message size and fragment count
//! - **Frame or message echo** (see [`EchoMode`])
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use wsecho::{Config, serve};
//!
//! let listener = tokio::net::TcpListener::bind("127.0.0.1:9001").await?;
//! loop {
//!     let (stream, _) = listener.accept().await?;
//!     // ... perform the HTTP upgrade on `stream` ...
//!     tokio::spawn(serve(stream, Config::autobahn()));
//! }
//! ```

pub mod config;
pub mod connection;
pub mod error;
pub mod protocol;

#[cfg(feature = "async-tokio")]
pub mod codec;

pub use config::{Config, EchoMode, Limits};
pub use connection::{Fragmentation, FrameMachine, MessageKind, Reply, Route};
#[cfg(feature = "async-tokio")]
pub use connection::{EchoSession, serve};
pub use error::{Error, Result};
pub use protocol::{CloseCode, CloseFrame, FrameHeader, OpCode, Utf8Validator};

#[cfg(feature = "async-tokio")]
pub use codec::FrameCodec;
