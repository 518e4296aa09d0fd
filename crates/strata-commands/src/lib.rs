//! In-process command framework for strata.
//!
//! Every operation the CLI and the HTTP bridge can run is a [`Command`]:
//! an object exposing `run`/`help`/`synopsis`. Commands are registered in a
//! [`CommandRegistry`] keyed by name (including multi-word names such as
//! `state list`), and dispatched by [`runner::dispatch`], which resolves
//! the leading tokens of an argument vector against the registry with
//! longest-match-wins semantics.
//!
//! # Architecture
//!
//! - [`command`]: the [`Command`] trait and factory type.
//! - [`registry`]: [`CommandRegistry`] plus the full registration list.
//! - [`runner`]: argument-vector resolution and aggregate help.
//! - The remaining modules hold the command implementations, grouped by
//!   area (apply/plan, state manipulation, workspaces, inspection,
//!   plumbing).

pub mod command;
pub mod registry;
pub mod runner;

mod apply;
mod inspect;
mod plumbing;
mod resource;
mod setup;
mod state_cmd;
mod workspace;

pub use command::{Command, CommandFactory};
pub use registry::CommandRegistry;
pub use runner::{dispatch, EXIT_COMMAND_NOT_FOUND};
