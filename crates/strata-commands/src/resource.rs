//! Per-resource state operations: import, taint, untaint.

use std::collections::BTreeMap;
use std::sync::Arc;

use strata_core::{ResourceRecord, SharedConfig, Ui};

use crate::command::{load_state_or_report, positional, Command};

pub struct ImportCommand {
    pub config: Arc<SharedConfig>,
    pub ui: Ui,
}

impl Command for ImportCommand {
    fn run(&mut self, args: &[String]) -> i32 {
        let positional = positional(args);
        let (Some(address), Some(id)) = (positional.first(), positional.get(1)) else {
            self.ui
                .error("Error: a resource address and an ID are required.");
            self.ui.output(&self.help());
            return 1;
        };
        let Some(mut state) = load_state_or_report(&self.config, &self.ui) else {
            return 1;
        };
        if state.find(address).is_some() {
            self.ui.error(&format!(
                "Error: resource {address} is already managed in the state"
            ));
            return 1;
        }
        let mut attributes = BTreeMap::new();
        attributes.insert("id".to_string(), serde_json::Value::String((*id).clone()));
        state.resources.push(ResourceRecord {
            address: (*address).clone(),
            provider: ResourceRecord::provider_from_address(address),
            tainted: false,
            attributes,
        });
        if let Err(e) = state.save(&self.config.state_path()) {
            self.ui.error(&format!("Error saving state: {e:#}"));
            return 1;
        }
        self.ui.output(&format!("{address}: Import prepared!"));
        self.ui.output("Import successful!");
        0
    }

    fn help(&self) -> String {
        "Usage: strata import <address> <id>\n\n  \
         Bring an existing resource under management by recording it in\n  \
         the current workspace state."
            .to_string()
    }

    fn synopsis(&self) -> &'static str {
        "Import existing infrastructure into the state"
    }
}

struct TaintTarget {
    /// true to taint, false to untaint.
    taint: bool,
}

fn set_taint(
    config: &SharedConfig,
    ui: &Ui,
    args: &[String],
    help: &str,
    target: TaintTarget,
) -> i32 {
    let positional = positional(args);
    let Some(address) = positional.first() else {
        ui.error("Error: a resource address is required.");
        ui.output(help);
        return 1;
    };
    let Some(mut state) = load_state_or_report(config, ui) else {
        return 1;
    };
    let Some(resource) = state.find_mut(address) else {
        ui.error(&format!(
            "No instance found for the given address: {address}"
        ));
        return 1;
    };
    if resource.tainted == target.taint {
        let already = if target.taint {
            "already tainted"
        } else {
            "not tainted"
        };
        ui.error(&format!("Resource instance {address} is {already}."));
        return 1;
    }
    resource.tainted = target.taint;
    if let Err(e) = state.save(&config.state_path()) {
        ui.error(&format!("Error saving state: {e:#}"));
        return 1;
    }
    let verb = if target.taint {
        "marked as tainted"
    } else {
        "successfully untainted"
    };
    ui.output(&format!("Resource instance {address} has been {verb}."));
    0
}

pub struct TaintCommand {
    pub config: Arc<SharedConfig>,
    pub ui: Ui,
}

impl Command for TaintCommand {
    fn run(&mut self, args: &[String]) -> i32 {
        set_taint(
            &self.config,
            &self.ui,
            args,
            &self.help(),
            TaintTarget { taint: true },
        )
    }

    fn help(&self) -> String {
        "Usage: strata taint <address>\n\n  \
         Mark a resource instance for recreation on the next apply."
            .to_string()
    }

    fn synopsis(&self) -> &'static str {
        "Manually mark a resource for recreation"
    }
}

pub struct UntaintCommand {
    pub config: Arc<SharedConfig>,
    pub ui: Ui,
}

impl Command for UntaintCommand {
    fn run(&mut self, args: &[String]) -> i32 {
        set_taint(
            &self.config,
            &self.ui,
            args,
            &self.help(),
            TaintTarget { taint: false },
        )
    }

    fn help(&self) -> String {
        "Usage: strata untaint <address>\n\n  \
         Remove the taint marker from a resource instance."
            .to_string()
    }

    fn synopsis(&self) -> &'static str {
        "Remove the tainted marker from a resource"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strata_core::{BufferSink, StateFile};
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
    fn import_then_taint_round_trip() {
        let (_dir, config, ui, _sink) = fixture();
        let mut import = ImportCommand {
            config: config.clone(),
            ui: ui.clone(),
        };
        assert_eq!(import.run(&args(&["aws_instance.web", "i-12345"])), 0);

        let mut taint = TaintCommand {
            config: config.clone(),
            ui: ui.clone(),
        };
        assert_eq!(taint.run(&args(&["aws_instance.web"])), 0);
        let state = StateFile::load(&config.state_path()).unwrap();
        assert!(state.find("aws_instance.web").unwrap().tainted);

        let mut untaint = UntaintCommand {
            config: config.clone(),
            ui,
        };
        assert_eq!(untaint.run(&args(&["aws_instance.web"])), 0);
        let state = StateFile::load(&config.state_path()).unwrap();
        assert!(!state.find("aws_instance.web").unwrap().tainted);
    }

    #[test]
    fn import_records_the_id_attribute() {
        let (_dir, config, ui, _sink) = fixture();
        let mut import = ImportCommand {
            config: config.clone(),
            ui,
        };
        assert_eq!(import.run(&args(&["aws_instance.web", "i-12345"])), 0);
        let state = StateFile::load(&config.state_path()).unwrap();
        let record = state.find("aws_instance.web").unwrap();
        assert_eq!(
            record.attributes.get("id"),
            Some(&serde_json::Value::String("i-12345".to_string()))
        );
        assert_eq!(record.provider, "aws");
    }

    #[test]
    fn import_rejects_duplicate_address() {
        let (_dir, config, ui, sink) = fixture();
        let mut import = ImportCommand {
            config: config.clone(),
            ui: ui.clone(),
        };
        assert_eq!(import.run(&args(&["aws_instance.web", "i-1"])), 0);
        let mut again = ImportCommand { config, ui };
        assert_eq!(again.run(&args(&["aws_instance.web", "i-2"])), 1);
        assert!(sink.contents().contains("already managed"));
    }

    #[test]
    fn taint_unknown_address_fails() {
        let (_dir, config, ui, sink) = fixture();
        let mut taint = TaintCommand { config, ui };
        assert_eq!(taint.run(&args(&["aws_instance.missing"])), 1);
        assert!(sink.contents().contains("No instance found"));
    }

    #[test]
    fn double_taint_fails() {
        let (_dir, config, ui, _sink) = fixture();
        let mut import = ImportCommand {
            config: config.clone(),
            ui: ui.clone(),
        };
        import.run(&args(&["aws_instance.web", "i-1"]));
        let mut taint = TaintCommand {
            config: config.clone(),
            ui: ui.clone(),
        };
        assert_eq!(taint.run(&args(&["aws_instance.web"])), 0);
        let mut again = TaintCommand { config, ui };
        assert_eq!(again.run(&args(&["aws_instance.web"])), 1);
    }
}
