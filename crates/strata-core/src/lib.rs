//! Core types shared across all strata crates.
//!
//! Defines the shared configuration snapshot, the output sink abstraction
//! that commands write through, and the on-disk state model the commands
//! operate on.

pub mod config;
pub mod output;
pub mod state;

pub use config::{
    SharedConfig, DEFAULT_WORKSPACE, STATE_FILENAME, WORKSPACE_MARKER, WORKSPACE_STATE_DIR,
};
pub use output::{BufferSink, ConsoleMirror, OutputSink, StdoutSink, Ui};
pub use state::{ResourceRecord, StateFile};
