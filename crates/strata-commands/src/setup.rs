//! Working-directory setup and hygiene: init, validate, fmt, get.

use std::sync::Arc;

use strata_core::{SharedConfig, StateFile, Ui, STATE_FILENAME};

use crate::command::Command;

pub struct InitCommand {
    pub config: Arc<SharedConfig>,
    pub ui: Ui,
}

impl Command for InitCommand {
    fn run(&mut self, _args: &[String]) -> i32 {
        if self.config.is_initialized() {
            self.ui
                .output("Strata has already been initialized in this directory.");
            return 0;
        }
        let mut state = StateFile::default();
        if let Err(e) = state.save(&self.config.workspace_state_path("default")) {
            self.ui.error(&format!("Error initializing: {e:#}"));
            return 1;
        }
        self.ui.output("Strata has been initialized!");
        self.ui.output("");
        self.ui.output(
            "You may now begin working. All commands should work; try \"strata plan\" first.",
        );
        0
    }

    fn help(&self) -> String {
        "Usage: strata init\n\n  \
         Prepare the data directory: creates the default workspace with an\n  \
         empty state. Safe to run repeatedly."
            .to_string()
    }

    fn synopsis(&self) -> &'static str {
        "Initialize a working directory"
    }
}

pub struct ValidateCommand {
    pub config: Arc<SharedConfig>,
    pub ui: Ui,
}

impl Command for ValidateCommand {
    fn run(&mut self, _args: &[String]) -> i32 {
        match StateFile::load(&self.config.state_path()) {
            Ok(_) => {
                self.ui.output("Success! The configuration is valid.");
                0
            }
            Err(e) => {
                self.ui.error(&format!("Error: validation failed: {e:#}"));
                1
            }
        }
    }

    fn help(&self) -> String {
        "Usage: strata validate\n\n  \
         Check that the working directory's state documents are readable\n  \
         and well-formed."
            .to_string()
    }

    fn synopsis(&self) -> &'static str {
        "Validate the working directory"
    }
}

pub struct FmtCommand {
    pub config: Arc<SharedConfig>,
    pub ui: Ui,
}

impl Command for FmtCommand {
    fn run(&mut self, _args: &[String]) -> i32 {
        let path = self.config.state_path();
        let raw = match std::fs::read_to_string(&path) {
            // Nothing on disk yet: nothing to format.
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return 0,
            Err(e) => {
                self.ui.error(&format!("Error reading state: {e}"));
                return 1;
            }
            Ok(raw) => raw,
        };
        let parsed: StateFile = match serde_json::from_str(&raw) {
            Ok(parsed) => parsed,
            Err(e) => {
                self.ui
                    .error(&format!("Error: state document is not valid JSON: {e}"));
                return 1;
            }
        };
        let canonical = match serde_json::to_string_pretty(&parsed) {
            Ok(canonical) => canonical,
            Err(e) => {
                self.ui.error(&format!("Error serializing state: {e}"));
                return 1;
            }
        };
        if canonical != raw {
            if let Err(e) = std::fs::write(&path, canonical) {
                self.ui.error(&format!("Error rewriting state: {e}"));
                return 1;
            }
            self.ui.output(STATE_FILENAME);
        }
        0
    }

    fn help(&self) -> String {
        "Usage: strata fmt\n\n  \
         Rewrite state documents to the canonical format, printing the\n  \
         name of each file changed."
            .to_string()
    }

    fn synopsis(&self) -> &'static str {
        "Rewrite state documents to canonical format"
    }
}

pub struct GetCommand {
    pub ui: Ui,
}

impl Command for GetCommand {
    fn run(&mut self, _args: &[String]) -> i32 {
        self.ui.output("- No modules to download.");
        0
    }

    fn help(&self) -> String {
        "Usage: strata get\n\n  \
         Download the modules referenced by the configuration. This\n  \
         distribution manages no modules, so there is never anything to\n  \
         fetch."
            .to_string()
    }

    fn synopsis(&self) -> &'static str {
        "Download modules for the configuration"
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

    #[test]
    fn init_creates_default_state() {
        let (_dir, config, ui, sink) = fixture();
        let mut cmd = InitCommand {
            config: config.clone(),
            ui,
        };
        assert_eq!(cmd.run(&[]), 0);
        assert!(sink.contents().contains("has been initialized"));
        assert!(config.workspace_state_path("default").exists());
    }

    #[test]
    fn init_is_idempotent() {
        let (_dir, config, ui, sink) = fixture();
        let mut cmd = InitCommand {
            config: config.clone(),
            ui: ui.clone(),
        };
        assert_eq!(cmd.run(&[]), 0);
        let mut again = InitCommand { config, ui };
        assert_eq!(again.run(&[]), 0);
        assert!(sink.contents().contains("already been initialized"));
    }

    #[test]
    fn validate_passes_on_missing_state() {
        let (_dir, config, ui, sink) = fixture();
        let mut cmd = ValidateCommand { config, ui };
        assert_eq!(cmd.run(&[]), 0);
        assert!(sink.contents().contains("Success"));
    }

    #[test]
    fn validate_fails_on_corrupt_state() {
        let (_dir, config, ui, _sink) = fixture();
        std::fs::create_dir_all(&config.data_dir).unwrap();
        std::fs::write(config.state_path(), "{ bad").unwrap();
        let mut cmd = ValidateCommand { config, ui };
        assert_eq!(cmd.run(&[]), 1);
    }

    #[test]
    fn fmt_rewrites_non_canonical_state() {
        let (_dir, config, ui, sink) = fixture();
        std::fs::create_dir_all(&config.data_dir).unwrap();
        std::fs::write(
            config.state_path(),
            "{\"serial\":3,\"outputs\":{},\"resources\":[]}",
        )
        .unwrap();
        let mut cmd = FmtCommand {
            config: config.clone(),
            ui,
        };
        assert_eq!(cmd.run(&[]), 0);
        assert!(sink.contents().contains(STATE_FILENAME));
        // Second run is a no-op.
        let quiet = BufferSink::new();
        let mut cmd = FmtCommand {
            config,
            ui: Ui::new(Box::new(quiet.clone()), false),
        };
        assert_eq!(cmd.run(&[]), 0);
        assert_eq!(quiet.contents(), "");
    }
}
