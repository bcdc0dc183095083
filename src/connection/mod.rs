//! Per-connection protocol handling.
//!
//! [`FrameMachine`] holds the frame-level protocol state of one connection.
//! [`EchoSession`] drives it over an async stream, echoing data frames and
//! answering control frames until the connection ends.
//!
//! ## Example
//!
//! ```rust,ignore
//! use wsecho::{serve, Config};
//!
//! // `stream` has already completed the HTTP upgrade.
//! match serve(stream, Config::default()).await {
//!     Ok(close) => println!("closed cleanly: {close:?}"),
//!     Err(err) => println!("connection failed: {err}"),
//! }
//! ```

pub mod fragmenter;
pub mod machine;

pub use fragmenter::{Fragment, Fragmenter};
pub use machine::{Fragmentation, FrameMachine, MessageKind, Reply, Route};

#[cfg(feature = "async-tokio")]
mod echo;

#[cfg(feature = "async-tokio")]
pub use echo::{EchoSession, serve};
