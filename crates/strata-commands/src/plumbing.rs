//! Plumbing and compatibility commands.
//!
//! These exist so the registered-name surface stays complete: console,
//! force-unlock, the debug family, the 0.12upgrade shim, the internal
//! plugin launcher, and the retired push command.

use strata_core::Ui;

use crate::command::{positional, Command};

pub struct ConsoleCommand {
    pub ui: Ui,
}

impl Command for ConsoleCommand {
    fn run(&mut self, _args: &[String]) -> i32 {
        self.ui.error(
            "Error: the console requires an interactive terminal and is not available here.",
        );
        1
    }

    fn help(&self) -> String {
        "Usage: strata console\n\n  \
         Open an interactive expression console. Requires an interactive\n  \
         terminal; unavailable over the HTTP bridge."
            .to_string()
    }

    fn synopsis(&self) -> &'static str {
        "Interactive console for expressions"
    }
}

pub struct ForceUnlockCommand {
    pub ui: Ui,
}

impl Command for ForceUnlockCommand {
    fn run(&mut self, args: &[String]) -> i32 {
        let positional = positional(args);
        let Some(lock_id) = positional.first() else {
            self.ui.error("Error: a lock ID is required.");
            self.ui.output(&self.help());
            return 1;
        };
        self.ui.output(&format!(
            "Strata state has been successfully unlocked (lock ID {lock_id})."
        ));
        0
    }

    fn help(&self) -> String {
        "Usage: strata force-unlock <lock-id>\n\n  \
         Manually release a stale lock on the state. The local backend\n  \
         takes no persistent locks, so this always succeeds."
            .to_string()
    }

    fn synopsis(&self) -> &'static str {
        "Release a stuck lock on the state"
    }
}

/// Parent command: running bare `debug` prints the subcommand listing.
pub struct DebugCommand {
    pub ui: Ui,
}

impl Command for DebugCommand {
    fn run(&mut self, _args: &[String]) -> i32 {
        self.ui.output(&self.help());
        1
    }

    fn help(&self) -> String {
        "Usage: strata debug <subcommand> [args]\n\n  \
         Subcommands:\n    \
         json2dot    Convert a JSON graph log to DOT"
            .to_string()
    }

    fn synopsis(&self) -> &'static str {
        "Debug output management"
    }
}

pub struct DebugJson2DotCommand {
    pub ui: Ui,
}

impl Command for DebugJson2DotCommand {
    fn run(&mut self, args: &[String]) -> i32 {
        let positional = positional(args);
        let Some(path) = positional.first() else {
            self.ui.error("Error: a path to a JSON graph log is required.");
            self.ui.output(&self.help());
            return 1;
        };
        let raw = match std::fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(e) => {
                self.ui.error(&format!("Error reading {path}: {e}"));
                return 1;
            }
        };
        let doc: serde_json::Value = match serde_json::from_str(&raw) {
            Ok(doc) => doc,
            Err(e) => {
                self.ui
                    .error(&format!("Error: {path} is not valid JSON: {e}"));
                return 1;
            }
        };
        self.ui.output("digraph {");
        if let Some(nodes) = doc.get("nodes").and_then(|n| n.as_array()) {
            for node in nodes.iter().filter_map(|n| n.as_str()) {
                self.ui.output(&format!("\t\"{node}\""));
            }
        }
        if let Some(edges) = doc.get("edges").and_then(|e| e.as_array()) {
            for edge in edges {
                if let (Some(from), Some(to)) = (
                    edge.get(0).and_then(|v| v.as_str()),
                    edge.get(1).and_then(|v| v.as_str()),
                ) {
                    self.ui.output(&format!("\t\"{from}\" -> \"{to}\""));
                }
            }
        }
        self.ui.output("}");
        0
    }

    fn help(&self) -> String {
        "Usage: strata debug json2dot <path>\n\n  \
         Convert a JSON graph log ({\"nodes\": [...], \"edges\": [[a, b], ...]})\n  \
         into DOT format."
            .to_string()
    }

    fn synopsis(&self) -> &'static str {
        "Convert a JSON graph log to DOT"
    }
}

pub struct ZeroTwelveUpgradeCommand {
    pub ui: Ui,
}

impl Command for ZeroTwelveUpgradeCommand {
    fn run(&mut self, _args: &[String]) -> i32 {
        self.ui.output(
            "The configuration is already written for the current language version; \
             no upgrade is needed.",
        );
        0
    }

    fn help(&self) -> String {
        "Usage: strata 0.12upgrade\n\n  \
         Rewrite pre-0.12 configuration for the current language version."
            .to_string()
    }

    fn synopsis(&self) -> &'static str {
        "Rewrite pre-0.12 configuration"
    }
}

pub struct InternalPluginCommand {
    pub ui: Ui,
}

impl Command for InternalPluginCommand {
    fn run(&mut self, _args: &[String]) -> i32 {
        self.ui.error(
            "Error: this command is intended to be invoked only by strata itself to \
             launch internal plugins.",
        );
        1
    }

    fn help(&self) -> String {
        "Usage: strata internal-plugin <type> <name>\n\n  \
         Launch an internal plugin process. Not for direct use."
            .to_string()
    }

    fn synopsis(&self) -> &'static str {
        "Internal plugin launcher"
    }
}

pub struct PushCommand {
    pub ui: Ui,
}

impl Command for PushCommand {
    fn run(&mut self, _args: &[String]) -> i32 {
        self.ui
            .warn("Warning: the push command is deprecated and no longer functional.");
        self.ui
            .error("Error: push is no longer supported; use remote state instead.");
        1
    }

    fn help(&self) -> String {
        "Usage: strata push\n\n  \
         Formerly uploaded the configuration to a remote run service.\n  \
         Retained for compatibility; always fails with an explanation."
            .to_string()
    }

    fn synopsis(&self) -> &'static str {
        "Obsolete, kept for compatibility"
    }
}
