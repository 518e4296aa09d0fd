//! HTTP bridge for strata commands.
//!
//! - [`bridge`]: the request handler mapping `?args=...` query parameters
//!   onto one command dispatch, streaming the command's output back as the
//!   response body.
//! - [`lifecycle`]: listener startup, interrupt handling, and bounded
//!   graceful shutdown.

pub mod bridge;
pub mod lifecycle;

pub use bridge::{router, BridgeState};
pub use lifecycle::{run, SHUTDOWN_GRACE};
