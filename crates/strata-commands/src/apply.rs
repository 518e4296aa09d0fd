//! Apply, destroy, plan, and refresh.
//!
//! `destroy` is the apply command with the destroy flag set, mirroring how
//! the registry wires it. None of these provision anything real: apply
//! recreates tainted resources and destroy clears the state, which is the
//! full extent of the state-backed semantics this family carries.

use std::sync::Arc;

use strata_core::{SharedConfig, Ui};

use crate::command::{load_state_or_report, Command};

pub struct ApplyCommand {
    pub config: Arc<SharedConfig>,
    pub ui: Ui,
    pub destroy: bool,
}

impl Command for ApplyCommand {
    fn run(&mut self, _args: &[String]) -> i32 {
        let Some(mut state) = load_state_or_report(&self.config, &self.ui) else {
            return 1;
        };

        if self.destroy {
            let destroyed = state.resources.len();
            state.resources.clear();
            state.outputs.clear();
            if let Err(e) = state.save(&self.config.state_path()) {
                self.ui.error(&format!("Error saving state: {e:#}"));
                return 1;
            }
            self.ui
                .output(&format!("Destroy complete! Resources: {destroyed} destroyed."));
            return 0;
        }

        let mut changed = 0;
        for resource in &mut state.resources {
            if resource.tainted {
                resource.tainted = false;
                changed += 1;
            }
        }
        if changed > 0 {
            if let Err(e) = state.save(&self.config.state_path()) {
                self.ui.error(&format!("Error saving state: {e:#}"));
                return 1;
            }
        }
        self.ui.output(&format!(
            "Apply complete! Resources: 0 added, {changed} changed, 0 destroyed."
        ));
        0
    }

    fn help(&self) -> String {
        if self.destroy {
            "Usage: strata destroy [options]\n\n  \
             Destroy all resources tracked in the current workspace state.\n\n\
             Options:\n\n  -auto-approve    Skip interactive approval (always implied here)."
                .to_string()
        } else {
            "Usage: strata apply [options]\n\n  \
             Apply pending changes: tainted resources are recreated and the\n  \
             state serial is advanced.\n\n\
             Options:\n\n  -auto-approve    Skip interactive approval (always implied here)."
                .to_string()
        }
    }

    fn synopsis(&self) -> &'static str {
        if self.destroy {
            "Destroy all tracked infrastructure"
        } else {
            "Builds or changes infrastructure"
        }
    }
}

pub struct PlanCommand {
    pub config: Arc<SharedConfig>,
    pub ui: Ui,
}

impl Command for PlanCommand {
    fn run(&mut self, _args: &[String]) -> i32 {
        let Some(state) = load_state_or_report(&self.config, &self.ui) else {
            return 1;
        };
        let to_change = state.resources.iter().filter(|r| r.tainted).count();
        if to_change == 0 {
            self.ui
                .output("No changes. Infrastructure is up-to-date.");
        } else {
            for resource in state.resources.iter().filter(|r| r.tainted) {
                self.ui
                    .output(&format!("-/+ {} (tainted)", resource.address));
            }
            self.ui.output("");
            self.ui
                .output(&format!("Plan: 0 to add, {to_change} to change, 0 to destroy."));
        }
        0
    }

    fn help(&self) -> String {
        "Usage: strata plan [options]\n\n  \
         Show the changes a subsequent apply would make."
            .to_string()
    }

    fn synopsis(&self) -> &'static str {
        "Generate and show an execution plan"
    }
}

pub struct RefreshCommand {
    pub config: Arc<SharedConfig>,
    pub ui: Ui,
}

impl Command for RefreshCommand {
    fn run(&mut self, _args: &[String]) -> i32 {
        let Some(mut state) = load_state_or_report(&self.config, &self.ui) else {
            return 1;
        };
        if let Err(e) = state.save(&self.config.state_path()) {
            self.ui.error(&format!("Error saving state: {e:#}"));
            return 1;
        }
        self.ui
            .output(&format!("State refreshed. Serial: {}.", state.serial));
        0
    }

    fn help(&self) -> String {
        "Usage: strata refresh [options]\n\n  \
         Reconcile the state with real resources and advance the serial."
            .to_string()
    }

    fn synopsis(&self) -> &'static str {
        "Update local state against real resources"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;
    use strata_core::{BufferSink, ResourceRecord, StateFile};
    use tempfile::TempDir;

    fn fixture() -> (TempDir, Arc<SharedConfig>, Ui, BufferSink) {
        let dir = TempDir::new().unwrap();
        let config = Arc::new(SharedConfig::from_dir(dir.path()));
        let sink = BufferSink::new();
        let ui = Ui::new(Box::new(sink.clone()), false);
        (dir, config, ui, sink)
    }

    fn tainted(address: &str) -> ResourceRecord {
        ResourceRecord {
            address: address.to_string(),
            provider: ResourceRecord::provider_from_address(address),
            tainted: true,
            attributes: BTreeMap::new(),
        }
    }

    #[test]
    fn apply_on_empty_state_reports_nothing_changed() {
        let (_dir, config, ui, sink) = fixture();
        let mut cmd = ApplyCommand {
            config,
            ui,
            destroy: false,
        };
        assert_eq!(cmd.run(&[]), 0);
        assert!(sink.contents().contains("0 added, 0 changed, 0 destroyed"));
    }

    #[test]
    fn apply_recreates_tainted_resources() {
        let (_dir, config, ui, sink) = fixture();
        let mut state = StateFile::default();
        state.resources.push(tainted("aws_instance.web"));
        state.save(&config.state_path()).unwrap();

        let mut cmd = ApplyCommand {
            config: config.clone(),
            ui,
            destroy: false,
        };
        assert_eq!(cmd.run(&[]), 0);
        assert!(sink.contents().contains("1 changed"));

        let reloaded = StateFile::load(&config.state_path()).unwrap();
        assert!(!reloaded.resources[0].tainted);
    }

    #[test]
    fn destroy_clears_state() {
        let (_dir, config, ui, sink) = fixture();
        let mut state = StateFile::default();
        state.resources.push(tainted("aws_instance.web"));
        state.save(&config.state_path()).unwrap();

        let mut cmd = ApplyCommand {
            config: config.clone(),
            ui,
            destroy: true,
        };
        assert_eq!(cmd.run(&[]), 0);
        assert!(sink.contents().contains("1 destroyed"));
        let reloaded = StateFile::load(&config.state_path()).unwrap();
        assert!(reloaded.resources.is_empty());
    }

    #[test]
    fn plan_reports_no_changes_on_clean_state() {
        let (_dir, config, ui, sink) = fixture();
        let mut cmd = PlanCommand { config, ui };
        assert_eq!(cmd.run(&[]), 0);
        assert!(sink.contents().contains("No changes"));
    }

    #[test]
    fn plan_counts_tainted_resources() {
        let (_dir, config, ui, sink) = fixture();
        let mut state = StateFile::default();
        state.resources.push(tainted("aws_instance.web"));
        state.save(&config.state_path()).unwrap();

        let mut cmd = PlanCommand { config, ui };
        assert_eq!(cmd.run(&[]), 0);
        assert!(sink.contents().contains("1 to change"));
    }
}
