//! Argument-vector dispatch against a [`CommandRegistry`].
//!
//! The leading tokens of the vector are matched against registered names,
//! longest match first, so `["state", "list", "aws_"]` resolves to the
//! `state list` command with `["aws_"]` left over rather than the `state`
//! parent. An empty or unresolvable vector writes the aggregate help
//! listing and reports "command not found" internally; the caller decides
//! what to do with that code (the HTTP bridge only logs it).

use anyhow::{Context, Result};
use strata_core::Ui;

use crate::registry::CommandRegistry;

/// Internal exit code for an empty or unresolvable argument vector,
/// matching the shell convention for "command not found".
pub const EXIT_COMMAND_NOT_FOUND: i32 = 127;

/// Resolve and run one command from `args`, writing through `ui`.
///
/// Returns the command's exit code. `Err` is reserved for factory
/// construction failures; resolution failures are reported through the
/// sink and the returned code instead.
pub fn dispatch(registry: &CommandRegistry, args: &[String], ui: &Ui) -> Result<i32> {
    if args.is_empty() {
        ui.output(&registry.help_text());
        return Ok(EXIT_COMMAND_NOT_FOUND);
    }

    // An explicit help request is a successful outcome, unlike falling
    // through to help because nothing resolved.
    if matches!(args[0].as_str(), "help" | "-h" | "--help") {
        ui.output(&registry.help_text());
        return Ok(0);
    }

    let max_words = registry.max_name_words().min(args.len());
    for take in (1..=max_words).rev() {
        let name = args[..take].join(" ");
        let Some(constructed) = registry.create(&name) else {
            continue;
        };
        let mut command =
            constructed.with_context(|| format!("failed to construct command {name:?}"))?;
        return Ok(command.run(&args[take..]));
    }

    ui.error(&format!("Unknown command: {}", args[0]));
    ui.output("");
    ui.output(&registry.help_text());
    Ok(EXIT_COMMAND_NOT_FOUND)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use strata_core::{BufferSink, SharedConfig};
    use tempfile::TempDir;

    fn fixture() -> (TempDir, CommandRegistry, Ui, BufferSink) {
        let dir = TempDir::new().unwrap();
        let config = Arc::new(SharedConfig::from_dir(dir.path()));
        let sink = BufferSink::new();
        let ui = Ui::new(Box::new(sink.clone()), false);
        let registry = CommandRegistry::build(config, ui.clone());
        (dir, registry, ui, sink)
    }

    fn args(tokens: &[&str]) -> Vec<String> {
        tokens.iter().map(|t| t.to_string()).collect()
    }

    #[test]
    fn empty_vector_writes_help_and_reports_not_found() {
        let (_dir, registry, ui, sink) = fixture();
        let code = dispatch(&registry, &[], &ui).unwrap();
        assert_eq!(code, EXIT_COMMAND_NOT_FOUND);
        assert!(sink.contents().contains("Available commands are:"));
    }

    #[test]
    fn unknown_command_writes_help_and_reports_not_found() {
        let (_dir, registry, ui, sink) = fixture();
        let code = dispatch(&registry, &args(&["bogus-command"]), &ui).unwrap();
        assert_eq!(code, EXIT_COMMAND_NOT_FOUND);
        let out = sink.contents();
        assert!(out.contains("Unknown command: bogus-command"));
        assert!(out.contains("Available commands are:"));
    }

    #[test]
    fn explicit_help_succeeds() {
        let (_dir, registry, ui, sink) = fixture();
        let code = dispatch(&registry, &args(&["help"]), &ui).unwrap();
        assert_eq!(code, 0);
        assert!(sink.contents().contains("Available commands are:"));
    }

    #[test]
    fn longest_name_wins_over_parent() {
        let (_dir, registry, ui, sink) = fixture();
        // "state list" on an empty state prints nothing and exits 0; the
        // "state" parent would have printed its subcommand help and exited 1.
        let code = dispatch(&registry, &args(&["state", "list"]), &ui).unwrap();
        assert_eq!(code, 0);
        assert_eq!(sink.contents(), "");
    }

    #[test]
    fn bare_parent_falls_back_to_single_token_match() {
        let (_dir, registry, ui, sink) = fixture();
        let code = dispatch(&registry, &args(&["state"]), &ui).unwrap();
        assert_eq!(code, 1);
        assert!(sink.contents().contains("Subcommands:"));
    }

    #[test]
    fn unresolved_second_token_still_matches_parent() {
        let (_dir, registry, ui, sink) = fixture();
        let code = dispatch(&registry, &args(&["state", "bogus"]), &ui).unwrap();
        // The parent command receives ["bogus"] and prints its help.
        assert_eq!(code, 1);
        assert!(sink.contents().contains("Subcommands:"));
    }

    #[test]
    fn remaining_tokens_are_passed_to_the_command() {
        let (_dir, registry, ui, sink) = fixture();
        let code = dispatch(&registry, &args(&["workspace", "new", "staging"]), &ui).unwrap();
        assert_eq!(code, 0);
        assert!(sink
            .contents()
            .contains("Created and switched to workspace \"staging\"!"));
    }

    #[test]
    fn commands_share_the_workspace_marker_between_dispatches() {
        let (_dir, registry, ui, sink) = fixture();
        dispatch(&registry, &args(&["workspace", "new", "staging"]), &ui).unwrap();
        let code = dispatch(&registry, &args(&["workspace", "show"]), &ui).unwrap();
        assert_eq!(code, 0);
        assert!(sink.contents().ends_with("staging\n"));
    }
}
