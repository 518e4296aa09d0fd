//! The [`Command`] trait and shared command helpers.

use anyhow::Result;
use strata_core::{SharedConfig, StateFile, Ui};

/// One runnable operation.
///
/// The HTTP bridge and the local runner never inspect which concrete
/// command they hold; everything flows through these three methods.
pub trait Command: Send {
    /// Execute with the argument vector remaining after name resolution.
    /// Returns a process-style exit code; the command reports its own
    /// errors through its output sink.
    fn run(&mut self, args: &[String]) -> i32;

    /// Multi-line usage text.
    fn help(&self) -> String;

    /// One-line summary for the aggregate help listing.
    fn synopsis(&self) -> &'static str;
}

/// Zero-argument constructor for a command instance, closed over the
/// shared configuration and the request's output sink.
pub type CommandFactory = Box<dyn Fn() -> Result<Box<dyn Command>> + Send>;

/// Load the current workspace's state, reporting failure to the sink.
///
/// Returns `None` after reporting when the state file exists but cannot
/// be read or parsed; callers translate that into exit code 1.
pub(crate) fn load_state_or_report(config: &SharedConfig, ui: &Ui) -> Option<StateFile> {
    match StateFile::load(&config.state_path()) {
        Ok(state) => Some(state),
        Err(e) => {
            ui.error(&format!("Error loading state: {e:#}"));
            None
        }
    }
}

/// Positional arguments: everything that does not look like a flag.
///
/// Commands in this family accept and ignore unknown flags rather than
/// failing, so a caller passing `-auto-approve` to `apply` gets the same
/// behavior as a bare `apply`.
pub(crate) fn positional(args: &[String]) -> Vec<&String> {
    args.iter().filter(|a| !a.starts_with('-')).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn positional_skips_flags() {
        let args = vec![
            "-auto-approve".to_string(),
            "web".to_string(),
            "--lock=false".to_string(),
            "prod".to_string(),
        ];
        let pos = positional(&args);
        assert_eq!(pos, vec!["web", "prod"]);
    }
}
