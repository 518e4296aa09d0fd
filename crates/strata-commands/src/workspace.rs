//! Workspace management, plus the deprecated `env` aliases.
//!
//! The `env *` registry entries construct these same commands with
//! `legacy_name` set; they behave identically after printing a
//! deprecation warning.

use std::sync::Arc;

use strata_core::{SharedConfig, StateFile, Ui, DEFAULT_WORKSPACE};

use crate::command::{positional, Command};

const LEGACY_WARNING: &str =
    "Warning: the \"env\" family is deprecated; use \"workspace\" instead.";

/// Workspace names are directory names, so keep them to a safe charset.
fn validate_workspace_name(name: &str) -> Result<(), String> {
    if name.is_empty() {
        return Err("workspace name must not be empty".to_string());
    }
    if !name
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        return Err(format!(
            "invalid workspace name {name:?}: only alphanumerics, '-' and '_' are allowed"
        ));
    }
    Ok(())
}

/// All workspace names that currently exist, sorted, default first.
fn existing_workspaces(config: &SharedConfig) -> Vec<String> {
    let mut names = vec![DEFAULT_WORKSPACE.to_string()];
    if let Ok(entries) = std::fs::read_dir(config.workspace_state_dir()) {
        for entry in entries.flatten() {
            if entry.path().is_dir() {
                if let Some(name) = entry.file_name().to_str() {
                    names.push(name.to_string());
                }
            }
        }
    }
    names[1..].sort();
    names
}

/// Parent command: running bare `workspace` (or `env`) prints the
/// subcommand listing.
pub struct WorkspaceCommand {
    pub ui: Ui,
    pub legacy_name: bool,
}

impl Command for WorkspaceCommand {
    fn run(&mut self, _args: &[String]) -> i32 {
        if self.legacy_name {
            self.ui.warn(LEGACY_WARNING);
        }
        self.ui.output(&self.help());
        1
    }

    fn help(&self) -> String {
        "Usage: strata workspace <subcommand> [args]\n\n  \
         Subcommands:\n    \
         delete    Delete a workspace\n    \
         list      List workspaces\n    \
         new       Create a new workspace\n    \
         select    Select a workspace\n    \
         show      Show the name of the current workspace"
            .to_string()
    }

    fn synopsis(&self) -> &'static str {
        "Workspace management"
    }
}

pub struct WorkspaceListCommand {
    pub config: Arc<SharedConfig>,
    pub ui: Ui,
    pub legacy_name: bool,
}

impl Command for WorkspaceListCommand {
    fn run(&mut self, _args: &[String]) -> i32 {
        if self.legacy_name {
            self.ui.warn(LEGACY_WARNING);
        }
        let current = self.config.current_workspace();
        for name in existing_workspaces(&self.config) {
            if name == current {
                self.ui.output(&format!("* {name}"));
            } else {
                self.ui.output(&format!("  {name}"));
            }
        }
        0
    }

    fn help(&self) -> String {
        "Usage: strata workspace list\n\n  \
         List workspaces, marking the current one with '*'."
            .to_string()
    }

    fn synopsis(&self) -> &'static str {
        "List workspaces"
    }
}

pub struct WorkspaceShowCommand {
    pub config: Arc<SharedConfig>,
    pub ui: Ui,
}

impl Command for WorkspaceShowCommand {
    fn run(&mut self, _args: &[String]) -> i32 {
        self.ui.output(&self.config.current_workspace());
        0
    }

    fn help(&self) -> String {
        "Usage: strata workspace show\n\n  \
         Print the name of the current workspace."
            .to_string()
    }

    fn synopsis(&self) -> &'static str {
        "Show the name of the current workspace"
    }
}

pub struct WorkspaceSelectCommand {
    pub config: Arc<SharedConfig>,
    pub ui: Ui,
    pub legacy_name: bool,
}

impl Command for WorkspaceSelectCommand {
    fn run(&mut self, args: &[String]) -> i32 {
        if self.legacy_name {
            self.ui.warn(LEGACY_WARNING);
        }
        let positional = positional(args);
        let Some(name) = positional.first() else {
            self.ui.error("Error: a workspace name is required.");
            self.ui.output(&self.help());
            return 1;
        };
        if !existing_workspaces(&self.config).iter().any(|n| n == *name) {
            self.ui.error(&format!(
                "Workspace \"{name}\" doesn't exist. Create it with \"workspace new\"."
            ));
            return 1;
        }
        if let Err(e) = self.config.set_current_workspace(name) {
            self.ui.error(&format!("Error selecting workspace: {e}"));
            return 1;
        }
        self.ui
            .output(&format!("Switched to workspace \"{name}\"."));
        0
    }

    fn help(&self) -> String {
        "Usage: strata workspace select <name>\n\n  \
         Select an existing workspace."
            .to_string()
    }

    fn synopsis(&self) -> &'static str {
        "Select a workspace"
    }
}

pub struct WorkspaceNewCommand {
    pub config: Arc<SharedConfig>,
    pub ui: Ui,
    pub legacy_name: bool,
}

impl Command for WorkspaceNewCommand {
    fn run(&mut self, args: &[String]) -> i32 {
        if self.legacy_name {
            self.ui.warn(LEGACY_WARNING);
        }
        let positional = positional(args);
        let Some(name) = positional.first() else {
            self.ui.error("Error: a workspace name is required.");
            self.ui.output(&self.help());
            return 1;
        };
        if let Err(msg) = validate_workspace_name(name) {
            self.ui.error(&format!("Error: {msg}"));
            return 1;
        }
        if existing_workspaces(&self.config).iter().any(|n| n == *name) {
            self.ui
                .error(&format!("Workspace \"{name}\" already exists."));
            return 1;
        }
        let mut state = StateFile::default();
        if let Err(e) = state.save(&self.config.workspace_state_path(name)) {
            self.ui.error(&format!("Error creating workspace: {e:#}"));
            return 1;
        }
        if let Err(e) = self.config.set_current_workspace(name) {
            self.ui.error(&format!("Error selecting workspace: {e}"));
            return 1;
        }
        self.ui
            .output(&format!("Created and switched to workspace \"{name}\"!"));
        0
    }

    fn help(&self) -> String {
        "Usage: strata workspace new <name>\n\n  \
         Create a new workspace with an empty state and switch to it."
            .to_string()
    }

    fn synopsis(&self) -> &'static str {
        "Create a new workspace"
    }
}

pub struct WorkspaceDeleteCommand {
    pub config: Arc<SharedConfig>,
    pub ui: Ui,
    pub legacy_name: bool,
}

impl Command for WorkspaceDeleteCommand {
    fn run(&mut self, args: &[String]) -> i32 {
        if self.legacy_name {
            self.ui.warn(LEGACY_WARNING);
        }
        let positional = positional(args);
        let Some(name) = positional.first() else {
            self.ui.error("Error: a workspace name is required.");
            self.ui.output(&self.help());
            return 1;
        };
        if *name == DEFAULT_WORKSPACE {
            self.ui
                .error("Error: the default workspace cannot be deleted.");
            return 1;
        }
        if self.config.current_workspace() == **name {
            self.ui.error(&format!(
                "Workspace \"{name}\" is your active workspace; switch away before deleting it."
            ));
            return 1;
        }
        let dir = self.config.workspace_state_dir().join(name);
        if !dir.is_dir() {
            self.ui
                .error(&format!("Workspace \"{name}\" doesn't exist."));
            return 1;
        }
        if let Err(e) = std::fs::remove_dir_all(&dir) {
            self.ui.error(&format!("Error deleting workspace: {e}"));
            return 1;
        }
        self.ui.output(&format!("Deleted workspace \"{name}\"!"));
        0
    }

    fn help(&self) -> String {
        "Usage: strata workspace delete <name>\n\n  \
         Delete a non-default, non-current workspace and its state."
            .to_string()
    }

    fn synopsis(&self) -> &'static str {
        "Delete a workspace"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strata_core::BufferSink;
    use tempfile::TempDir;

    fn fixture() -> (TempDir, Arc<SharedConfig>, Ui, BufferSink) {
        let dir = TempDir::new().unwrap();
        let config = Arc::new(SharedConfig::from_dir(dir.path()));
        let sink = BufferSink::new();
        let ui = Ui::new(Box::new(sink.clone()), false);
        (dir, config, ui, sink)
    }

    fn args(tokens: &[&str]) -> Vec<String> {
        tokens.iter().map(|t| t.to_string()).collect()
    }

    #[test]
    fn list_always_contains_default_marked_current() {
        let (_dir, config, ui, sink) = fixture();
        let mut cmd = WorkspaceListCommand {
            config,
            ui,
            legacy_name: false,
        };
        assert_eq!(cmd.run(&[]), 0);
        assert_eq!(sink.contents(), "* default\n");
    }

    #[test]
    fn new_creates_and_selects() {
        let (_dir, config, ui, sink) = fixture();
        let mut cmd = WorkspaceNewCommand {
            config: config.clone(),
            ui,
            legacy_name: false,
        };
        assert_eq!(cmd.run(&args(&["staging"])), 0);
        assert!(sink.contents().contains("switched to workspace \"staging\""));
        assert_eq!(config.current_workspace(), "staging");
        assert!(config.workspace_state_path("staging").exists());
    }

    #[test]
    fn new_rejects_duplicate() {
        let (_dir, config, ui, _sink) = fixture();
        let mut cmd = WorkspaceNewCommand {
            config: config.clone(),
            ui: ui.clone(),
            legacy_name: false,
        };
        assert_eq!(cmd.run(&args(&["staging"])), 0);
        let mut again = WorkspaceNewCommand {
            config,
            ui,
            legacy_name: false,
        };
        assert_eq!(again.run(&args(&["staging"])), 1);
    }

    #[test]
    fn new_rejects_bad_names() {
        let (_dir, config, ui, sink) = fixture();
        let mut cmd = WorkspaceNewCommand {
            config,
            ui,
            legacy_name: false,
        };
        assert_eq!(cmd.run(&args(&["../evil"])), 1);
        assert!(sink.contents().contains("invalid workspace name"));
    }

    #[test]
    fn select_unknown_workspace_fails() {
        let (_dir, config, ui, sink) = fixture();
        let mut cmd = WorkspaceSelectCommand {
            config,
            ui,
            legacy_name: false,
        };
        assert_eq!(cmd.run(&args(&["missing"])), 1);
        assert!(sink.contents().contains("doesn't exist"));
    }

    #[test]
    fn delete_guards_default_and_current() {
        let (_dir, config, ui, _sink) = fixture();
        let mut delete = WorkspaceDeleteCommand {
            config: config.clone(),
            ui: ui.clone(),
            legacy_name: false,
        };
        assert_eq!(delete.run(&args(&["default"])), 1);

        let mut new = WorkspaceNewCommand {
            config: config.clone(),
            ui: ui.clone(),
            legacy_name: false,
        };
        assert_eq!(new.run(&args(&["staging"])), 0);
        // staging is now current, so deleting it is refused.
        assert_eq!(delete.run(&args(&["staging"])), 1);

        let mut select = WorkspaceSelectCommand {
            config: config.clone(),
            ui: ui.clone(),
            legacy_name: false,
        };
        assert_eq!(select.run(&args(&["default"])), 0);
        assert_eq!(delete.run(&args(&["staging"])), 0);
        assert!(!config.workspace_state_dir().join("staging").exists());
    }

    #[test]
    fn legacy_alias_warns() {
        let (_dir, config, ui, sink) = fixture();
        let mut cmd = WorkspaceListCommand {
            config,
            ui,
            legacy_name: true,
        };
        assert_eq!(cmd.run(&[]), 0);
        assert!(sink.contents().contains("deprecated"));
    }
}
