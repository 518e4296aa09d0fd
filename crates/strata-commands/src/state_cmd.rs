//! The `state` command family: direct state inspection and surgery.

use std::sync::Arc;

use strata_core::{SharedConfig, StateFile, Ui};

use crate::command::{load_state_or_report, positional, Command};

/// Parent command: running bare `state` prints the subcommand listing.
pub struct StateCommand {
    pub ui: Ui,
}

impl Command for StateCommand {
    fn run(&mut self, _args: &[String]) -> i32 {
        self.ui.output(&self.help());
        1
    }

    fn help(&self) -> String {
        "Usage: strata state <subcommand> [args]\n\n  \
         Subcommands:\n    \
         list    List resources in the state\n    \
         mv      Move an item in the state\n    \
         pull    Print the raw state document\n    \
         push    Replace the state with a local document\n    \
         rm      Remove instances from the state\n    \
         show    Show a resource in the state"
            .to_string()
    }

    fn synopsis(&self) -> &'static str {
        "Advanced state management"
    }
}

pub struct StateListCommand {
    pub config: Arc<SharedConfig>,
    pub ui: Ui,
}

impl Command for StateListCommand {
    fn run(&mut self, args: &[String]) -> i32 {
        let Some(state) = load_state_or_report(&self.config, &self.ui) else {
            return 1;
        };
        let filters = positional(args);
        for resource in &state.resources {
            if filters.is_empty() || filters.iter().any(|f| resource.address.starts_with(*f)) {
                self.ui.output(&resource.address);
            }
        }
        0
    }

    fn help(&self) -> String {
        "Usage: strata state list [address...]\n\n  \
         List resource addresses tracked in the current workspace state,\n  \
         optionally filtered by address prefix. An empty state lists nothing\n  \
         and still succeeds."
            .to_string()
    }

    fn synopsis(&self) -> &'static str {
        "List resources in the state"
    }
}

pub struct StateShowCommand {
    pub config: Arc<SharedConfig>,
    pub ui: Ui,
}

impl Command for StateShowCommand {
    fn run(&mut self, args: &[String]) -> i32 {
        let positional = positional(args);
        let Some(address) = positional.first() else {
            self.ui.error("Error: a resource address is required.");
            self.ui.output(&self.help());
            return 1;
        };
        let Some(state) = load_state_or_report(&self.config, &self.ui) else {
            return 1;
        };
        let Some(resource) = state.find(address) else {
            self.ui.error(&format!(
                "No instance found for the given address: {address}"
            ));
            return 1;
        };
        self.ui.output(&format!("# {}:", resource.address));
        self.ui.output(&format!("provider = {}", resource.provider));
        if resource.tainted {
            self.ui.output("tainted  = true");
        }
        for (key, value) in &resource.attributes {
            self.ui.output(&format!("{key} = {value}"));
        }
        0
    }

    fn help(&self) -> String {
        "Usage: strata state show <address>\n\n  \
         Show the attributes of a single resource in the state."
            .to_string()
    }

    fn synopsis(&self) -> &'static str {
        "Show a resource in the state"
    }
}

pub struct StateRmCommand {
    pub config: Arc<SharedConfig>,
    pub ui: Ui,
}

impl Command for StateRmCommand {
    fn run(&mut self, args: &[String]) -> i32 {
        let addresses = positional(args);
        if addresses.is_empty() {
            self.ui
                .error("Error: at least one resource address is required.");
            self.ui.output(&self.help());
            return 1;
        }
        let Some(mut state) = load_state_or_report(&self.config, &self.ui) else {
            return 1;
        };
        let mut removed = 0;
        for address in &addresses {
            match state.remove(address) {
                Some(resource) => {
                    self.ui.output(&format!("Removed {}", resource.address));
                    removed += 1;
                }
                None => {
                    self.ui.error(&format!(
                        "No instance found for the given address: {address}"
                    ));
                    return 1;
                }
            }
        }
        if let Err(e) = state.save(&self.config.state_path()) {
            self.ui.error(&format!("Error saving state: {e:#}"));
            return 1;
        }
        self.ui
            .output(&format!("Successfully removed {removed} resource instance(s)."));
        0
    }

    fn help(&self) -> String {
        "Usage: strata state rm <address>...\n\n  \
         Remove one or more resource instances from the state. The\n  \
         underlying resources are not destroyed."
            .to_string()
    }

    fn synopsis(&self) -> &'static str {
        "Remove instances from the state"
    }
}

pub struct StateMvCommand {
    pub config: Arc<SharedConfig>,
    pub ui: Ui,
}

impl Command for StateMvCommand {
    fn run(&mut self, args: &[String]) -> i32 {
        let positional = positional(args);
        let (Some(source), Some(destination)) = (positional.first(), positional.get(1)) else {
            self.ui
                .error("Error: source and destination addresses are required.");
            self.ui.output(&self.help());
            return 1;
        };
        let Some(mut state) = load_state_or_report(&self.config, &self.ui) else {
            return 1;
        };
        if state.find(destination).is_some() {
            self.ui.error(&format!(
                "Error: destination address {destination} is already in use"
            ));
            return 1;
        }
        let Some(resource) = state.find_mut(source) else {
            self.ui.error(&format!(
                "No instance found for the given address: {source}"
            ));
            return 1;
        };
        resource.address = (*destination).clone();
        if let Err(e) = state.save(&self.config.state_path()) {
            self.ui.error(&format!("Error saving state: {e:#}"));
            return 1;
        }
        self.ui
            .output(&format!("Move \"{source}\" to \"{destination}\""));
        self.ui.output("Successfully moved 1 object(s).");
        0
    }

    fn help(&self) -> String {
        "Usage: strata state mv <source> <destination>\n\n  \
         Rename a resource instance in the state without touching the\n  \
         underlying resource."
            .to_string()
    }

    fn synopsis(&self) -> &'static str {
        "Move an item in the state"
    }
}

pub struct StatePullCommand {
    pub config: Arc<SharedConfig>,
    pub ui: Ui,
}

impl Command for StatePullCommand {
    fn run(&mut self, _args: &[String]) -> i32 {
        let Some(state) = load_state_or_report(&self.config, &self.ui) else {
            return 1;
        };
        match serde_json::to_string_pretty(&state) {
            Ok(raw) => {
                self.ui.output(&raw);
                0
            }
            Err(e) => {
                self.ui
                    .error(&format!("Error serializing state: {e}"));
                1
            }
        }
    }

    fn help(&self) -> String {
        "Usage: strata state pull\n\n  \
         Print the raw state document for the current workspace."
            .to_string()
    }

    fn synopsis(&self) -> &'static str {
        "Print the raw state document"
    }
}

pub struct StatePushCommand {
    pub config: Arc<SharedConfig>,
    pub ui: Ui,
}

impl Command for StatePushCommand {
    fn run(&mut self, args: &[String]) -> i32 {
        let positional = positional(args);
        let Some(path) = positional.first() else {
            self.ui.error("Error: a path to a state document is required.");
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
        // Validate before replacing anything.
        let parsed: StateFile = match serde_json::from_str(&raw) {
            Ok(parsed) => parsed,
            Err(e) => {
                self.ui
                    .error(&format!("Error: {path} is not a valid state document: {e}"));
                return 1;
            }
        };
        let target = self.config.state_path();
        if let Some(parent) = target.parent() {
            if let Err(e) = std::fs::create_dir_all(parent) {
                self.ui.error(&format!("Error saving state: {e}"));
                return 1;
            }
        }
        let canonical = match serde_json::to_string_pretty(&parsed) {
            Ok(canonical) => canonical,
            Err(e) => {
                self.ui.error(&format!("Error serializing state: {e}"));
                return 1;
            }
        };
        if let Err(e) = std::fs::write(&target, canonical) {
            self.ui.error(&format!("Error saving state: {e}"));
            return 1;
        }
        self.ui.output(&format!(
            "State pushed successfully. Serial: {}.",
            parsed.serial
        ));
        0
    }

    fn help(&self) -> String {
        "Usage: strata state push <path>\n\n  \
         Replace the current workspace state with the document at <path>.\n  \
         The document is validated before the existing state is touched."
            .to_string()
    }

    fn synopsis(&self) -> &'static str {
        "Replace the state with a local document"
    }
}
