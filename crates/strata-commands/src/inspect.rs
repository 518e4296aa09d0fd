//! Read-only inspection: show, output, graph, providers.

use std::sync::Arc;

use strata_core::{SharedConfig, Ui};

use crate::command::{load_state_or_report, positional, Command};

pub struct ShowCommand {
    pub config: Arc<SharedConfig>,
    pub ui: Ui,
}

impl Command for ShowCommand {
    fn run(&mut self, _args: &[String]) -> i32 {
        let Some(state) = load_state_or_report(&self.config, &self.ui) else {
            return 1;
        };
        if state.resources.is_empty() && state.outputs.is_empty() {
            self.ui.output("The state file is empty. No resources are represented.");
            return 0;
        }
        for resource in &state.resources {
            self.ui.output(&format!("# {}:", resource.address));
            self.ui
                .output(&format!("    provider = {}", resource.provider));
            if resource.tainted {
                self.ui.output("    tainted  = true");
            }
            for (key, value) in &resource.attributes {
                self.ui.output(&format!("    {key} = {value}"));
            }
            self.ui.output("");
        }
        if !state.outputs.is_empty() {
            self.ui.output("Outputs:");
            for (name, value) in &state.outputs {
                self.ui.output(&format!("{name} = {value}"));
            }
        }
        0
    }

    fn help(&self) -> String {
        "Usage: strata show\n\n  \
         Print a human-readable rendering of the current workspace state."
            .to_string()
    }

    fn synopsis(&self) -> &'static str {
        "Inspect the current state"
    }
}

pub struct OutputCommand {
    pub config: Arc<SharedConfig>,
    pub ui: Ui,
}

impl Command for OutputCommand {
    fn run(&mut self, args: &[String]) -> i32 {
        let Some(state) = load_state_or_report(&self.config, &self.ui) else {
            return 1;
        };
        let positional = positional(args);
        if let Some(name) = positional.first() {
            match state.outputs.get(*name) {
                Some(value) => {
                    self.ui.output(&value.to_string());
                    0
                }
                None => {
                    self.ui.error(&format!(
                        "The output variable requested could not be found: {name}"
                    ));
                    1
                }
            }
        } else {
            if state.outputs.is_empty() {
                self.ui
                    .warn("Warning: the state file has no outputs defined.");
                return 0;
            }
            for (name, value) in &state.outputs {
                self.ui.output(&format!("{name} = {value}"));
            }
            0
        }
    }

    fn help(&self) -> String {
        "Usage: strata output [name]\n\n  \
         Print all output values, or a single one by name."
            .to_string()
    }

    fn synopsis(&self) -> &'static str {
        "Read an output from the state"
    }
}

pub struct GraphCommand {
    pub config: Arc<SharedConfig>,
    pub ui: Ui,
}

impl Command for GraphCommand {
    fn run(&mut self, _args: &[String]) -> i32 {
        let Some(state) = load_state_or_report(&self.config, &self.ui) else {
            return 1;
        };
        self.ui.output("digraph {");
        self.ui.output("\tcompound = \"true\"");
        for resource in &state.resources {
            self.ui.output(&format!("\t\"{}\"", resource.address));
        }
        self.ui.output("}");
        0
    }

    fn help(&self) -> String {
        "Usage: strata graph\n\n  \
         Emit the state's resource graph in DOT format."
            .to_string()
    }

    fn synopsis(&self) -> &'static str {
        "Output the resource graph in DOT format"
    }
}

pub struct ProvidersCommand {
    pub config: Arc<SharedConfig>,
    pub ui: Ui,
}

impl Command for ProvidersCommand {
    fn run(&mut self, _args: &[String]) -> i32 {
        let Some(state) = load_state_or_report(&self.config, &self.ui) else {
            return 1;
        };
        self.ui.output("Providers required by state:");
        self.ui.output("");
        for provider in state.providers() {
            self.ui.output(&format!("  provider[{provider}]"));
        }
        0
    }

    fn help(&self) -> String {
        "Usage: strata providers\n\n  \
         List the providers required by the current state."
            .to_string()
    }

    fn synopsis(&self) -> &'static str {
        "Show the providers required by the state"
    }
}

pub struct ProvidersSchemaCommand {
    pub config: Arc<SharedConfig>,
    pub ui: Ui,
}

impl Command for ProvidersSchemaCommand {
    fn run(&mut self, _args: &[String]) -> i32 {
        let Some(state) = load_state_or_report(&self.config, &self.ui) else {
            return 1;
        };
        let mut schemas = serde_json::Map::new();
        for provider in state.providers() {
            schemas.insert(provider, serde_json::json!({}));
        }
        let doc = serde_json::json!({
            "format_version": "1.0",
            "provider_schemas": schemas,
        });
        self.ui.output(&doc.to_string());
        0
    }

    fn help(&self) -> String {
        "Usage: strata providers schema\n\n  \
         Print the provider schema document as JSON."
            .to_string()
    }

    fn synopsis(&self) -> &'static str {
        "Show schemas for the providers in the state"
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

    fn seed(config: &SharedConfig) {
        let mut state = StateFile::default();
        state.resources.push(ResourceRecord {
            address: "aws_instance.web".to_string(),
            provider: "aws".to_string(),
            tainted: false,
            attributes: BTreeMap::new(),
        });
        state
            .outputs
            .insert("ip".to_string(), serde_json::json!("10.0.0.1"));
        state.save(&config.state_path()).unwrap();
    }

    #[test]
    fn show_empty_state() {
        let (_dir, config, ui, sink) = fixture();
        let mut cmd = ShowCommand { config, ui };
        assert_eq!(cmd.run(&[]), 0);
        assert!(sink.contents().contains("state file is empty"));
    }

    #[test]
    fn show_lists_resources_and_outputs() {
        let (_dir, config, ui, sink) = fixture();
        seed(&config);
        let mut cmd = ShowCommand { config, ui };
        assert_eq!(cmd.run(&[]), 0);
        let out = sink.contents();
        assert!(out.contains("# aws_instance.web:"));
        assert!(out.contains("Outputs:"));
    }

    #[test]
    fn output_by_name_and_missing() {
        let (_dir, config, ui, sink) = fixture();
        seed(&config);
        let mut cmd = OutputCommand {
            config: config.clone(),
            ui: ui.clone(),
        };
        assert_eq!(cmd.run(&["ip".to_string()]), 0);
        assert!(sink.contents().contains("10.0.0.1"));

        let mut missing = OutputCommand { config, ui };
        assert_eq!(missing.run(&["nope".to_string()]), 1);
    }

    #[test]
    fn output_with_no_outputs_warns_but_succeeds() {
        let (_dir, config, ui, sink) = fixture();
        let mut cmd = OutputCommand { config, ui };
        assert_eq!(cmd.run(&[]), 0);
        assert!(sink.contents().contains("no outputs defined"));
    }

    #[test]
    fn graph_is_valid_dot_shell() {
        let (_dir, config, ui, sink) = fixture();
        seed(&config);
        let mut cmd = GraphCommand { config, ui };
        assert_eq!(cmd.run(&[]), 0);
        let out = sink.contents();
        assert!(out.starts_with("digraph {"));
        assert!(out.contains("\"aws_instance.web\""));
        assert!(out.trim_end().ends_with('}'));
    }

    #[test]
    fn providers_schema_is_json() {
        let (_dir, config, ui, sink) = fixture();
        seed(&config);
        let mut cmd = ProvidersSchemaCommand { config, ui };
        assert_eq!(cmd.run(&[]), 0);
        let doc: serde_json::Value = serde_json::from_str(sink.contents().trim()).unwrap();
        assert!(doc["provider_schemas"]["aws"].is_object());
    }
}
