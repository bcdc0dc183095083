//! Frame codec for async I/O.
//!
//! This module provides header and payload streaming over async streams.

#[cfg(feature = "async-tokio")]
mod framed;

#[cfg(feature = "async-tokio")]
pub use framed::FrameCodec;
