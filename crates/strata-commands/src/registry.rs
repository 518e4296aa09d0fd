//! Command registry: the full name-to-factory mapping.
//!
//! A registry is rebuilt for every request, bound to that request's output
//! sink. Factories are zero-argument closures closed over the shared
//! configuration and the sink, so constructing the mapping performs no I/O
//! and cannot fail; individual factories may still fail when invoked.
//! Duplicate names are a programming error and abort registration.

use std::collections::BTreeMap;
use std::sync::Arc;

use anyhow::Result;
use strata_core::{SharedConfig, Ui};

use crate::apply::{ApplyCommand, PlanCommand, RefreshCommand};
use crate::command::{Command, CommandFactory};
use crate::inspect::{
    GraphCommand, OutputCommand, ProvidersCommand, ProvidersSchemaCommand, ShowCommand,
};
use crate::plumbing::{
    ConsoleCommand, DebugCommand, DebugJson2DotCommand, ForceUnlockCommand, InternalPluginCommand,
    PushCommand, ZeroTwelveUpgradeCommand,
};
use crate::resource::{ImportCommand, TaintCommand, UntaintCommand};
use crate::setup::{FmtCommand, GetCommand, InitCommand, ValidateCommand};
use crate::state_cmd::{
    StateCommand, StateListCommand, StateMvCommand, StatePullCommand, StatePushCommand,
    StateRmCommand, StateShowCommand,
};
use crate::workspace::{
    WorkspaceCommand, WorkspaceDeleteCommand, WorkspaceListCommand, WorkspaceNewCommand,
    WorkspaceSelectCommand, WorkspaceShowCommand,
};

/// Registry of command factories, keyed by (possibly multi-word) name.
pub struct CommandRegistry {
    commands: BTreeMap<&'static str, CommandFactory>,
}

impl CommandRegistry {
    /// Build the full registry bound to one output sink.
    ///
    /// Every factory shares `config` and writes through `ui`; nothing else
    /// is shared between the commands a registry produces.
    pub fn build(config: Arc<SharedConfig>, ui: Ui) -> Self {
        let mut registry = Self {
            commands: BTreeMap::new(),
        };
        let r = &mut registry;

        with(r, &config, &ui, "apply", |config, ui| {
            Box::new(ApplyCommand {
                config,
                ui,
                destroy: false,
            })
        });

        with(r, &config, &ui, "console", |_config, ui| {
            Box::new(ConsoleCommand { ui })
        });

        with(r, &config, &ui, "destroy", |config, ui| {
            Box::new(ApplyCommand {
                config,
                ui,
                destroy: true,
            })
        });

        with(r, &config, &ui, "env", |_config, ui| {
            Box::new(WorkspaceCommand {
                ui,
                legacy_name: true,
            })
        });

        with(r, &config, &ui, "env list", |config, ui| {
            Box::new(WorkspaceListCommand {
                config,
                ui,
                legacy_name: true,
            })
        });

        with(r, &config, &ui, "env select", |config, ui| {
            Box::new(WorkspaceSelectCommand {
                config,
                ui,
                legacy_name: true,
            })
        });

        with(r, &config, &ui, "env new", |config, ui| {
            Box::new(WorkspaceNewCommand {
                config,
                ui,
                legacy_name: true,
            })
        });

        with(r, &config, &ui, "env delete", |config, ui| {
            Box::new(WorkspaceDeleteCommand {
                config,
                ui,
                legacy_name: true,
            })
        });

        with(r, &config, &ui, "fmt", |config, ui| {
            Box::new(FmtCommand { config, ui })
        });

        with(r, &config, &ui, "get", |_config, ui| {
            Box::new(GetCommand { ui })
        });

        with(r, &config, &ui, "graph", |config, ui| {
            Box::new(GraphCommand { config, ui })
        });

        with(r, &config, &ui, "import", |config, ui| {
            Box::new(ImportCommand { config, ui })
        });

        with(r, &config, &ui, "init", |config, ui| {
            Box::new(InitCommand { config, ui })
        });

        with(r, &config, &ui, "internal-plugin", |_config, ui| {
            Box::new(InternalPluginCommand { ui })
        });

        // "login" is reserved until the hosted credential service is ready
        // to support it; the name is intentionally absent rather than
        // registered with a stub. See DESIGN.md.

        with(r, &config, &ui, "output", |config, ui| {
            Box::new(OutputCommand { config, ui })
        });

        with(r, &config, &ui, "plan", |config, ui| {
            Box::new(PlanCommand { config, ui })
        });

        with(r, &config, &ui, "providers", |config, ui| {
            Box::new(ProvidersCommand { config, ui })
        });

        with(r, &config, &ui, "providers schema", |config, ui| {
            Box::new(ProvidersSchemaCommand { config, ui })
        });

        with(r, &config, &ui, "push", |_config, ui| {
            Box::new(PushCommand { ui })
        });

        with(r, &config, &ui, "refresh", |config, ui| {
            Box::new(RefreshCommand { config, ui })
        });

        with(r, &config, &ui, "show", |config, ui| {
            Box::new(ShowCommand { config, ui })
        });

        with(r, &config, &ui, "taint", |config, ui| {
            Box::new(TaintCommand { config, ui })
        });

        with(r, &config, &ui, "validate", |config, ui| {
            Box::new(ValidateCommand { config, ui })
        });

        with(r, &config, &ui, "untaint", |config, ui| {
            Box::new(UntaintCommand { config, ui })
        });

        with(r, &config, &ui, "workspace", |_config, ui| {
            Box::new(WorkspaceCommand {
                ui,
                legacy_name: false,
            })
        });

        with(r, &config, &ui, "workspace list", |config, ui| {
            Box::new(WorkspaceListCommand {
                config,
                ui,
                legacy_name: false,
            })
        });

        with(r, &config, &ui, "workspace select", |config, ui| {
            Box::new(WorkspaceSelectCommand {
                config,
                ui,
                legacy_name: false,
            })
        });

        with(r, &config, &ui, "workspace show", |config, ui| {
            Box::new(WorkspaceShowCommand { config, ui })
        });

        with(r, &config, &ui, "workspace new", |config, ui| {
            Box::new(WorkspaceNewCommand {
                config,
                ui,
                legacy_name: false,
            })
        });

        with(r, &config, &ui, "workspace delete", |config, ui| {
            Box::new(WorkspaceDeleteCommand {
                config,
                ui,
                legacy_name: false,
            })
        });

        //-------------------------------------------------------------------
        // Plumbing
        //-------------------------------------------------------------------

        with(r, &config, &ui, "0.12upgrade", |_config, ui| {
            Box::new(ZeroTwelveUpgradeCommand { ui })
        });

        with(r, &config, &ui, "debug", |_config, ui| {
            Box::new(DebugCommand { ui })
        });

        with(r, &config, &ui, "debug json2dot", |_config, ui| {
            Box::new(DebugJson2DotCommand { ui })
        });

        with(r, &config, &ui, "force-unlock", |_config, ui| {
            Box::new(ForceUnlockCommand { ui })
        });

        with(r, &config, &ui, "state", |_config, ui| {
            Box::new(StateCommand { ui })
        });

        with(r, &config, &ui, "state list", |config, ui| {
            Box::new(StateListCommand { config, ui })
        });

        with(r, &config, &ui, "state rm", |config, ui| {
            Box::new(StateRmCommand { config, ui })
        });

        with(r, &config, &ui, "state mv", |config, ui| {
            Box::new(StateMvCommand { config, ui })
        });

        with(r, &config, &ui, "state pull", |config, ui| {
            Box::new(StatePullCommand { config, ui })
        });

        with(r, &config, &ui, "state push", |config, ui| {
            Box::new(StatePushCommand { config, ui })
        });

        with(r, &config, &ui, "state show", |config, ui| {
            Box::new(StateShowCommand { config, ui })
        });

        registry
    }

    fn register(&mut self, name: &'static str, factory: CommandFactory) {
        let previous = self.commands.insert(name, factory);
        assert!(
            previous.is_none(),
            "duplicate command name registered: {name}"
        );
    }

    pub fn contains(&self, name: &str) -> bool {
        self.commands.contains_key(name)
    }

    /// Invoke the factory for `name`, if registered.
    pub fn create(&self, name: &str) -> Option<Result<Box<dyn Command>>> {
        self.commands.get(name).map(|factory| factory())
    }

    /// All registered names, sorted.
    pub fn names(&self) -> Vec<&'static str> {
        self.commands.keys().copied().collect()
    }

    /// The longest registered name, in whitespace-separated words.
    pub fn max_name_words(&self) -> usize {
        self.commands
            .keys()
            .map(|name| name.split(' ').count())
            .max()
            .unwrap_or(1)
    }

    /// The aggregate help listing: top-level names with synopses.
    pub fn help_text(&self) -> String {
        let mut entries: Vec<(&str, &'static str)> = Vec::new();
        for (name, factory) in &self.commands {
            if name.contains(' ') {
                continue;
            }
            if let Ok(command) = factory() {
                entries.push((name, command.synopsis()));
            }
        }
        let width = entries.iter().map(|(n, _)| n.len()).max().unwrap_or(0);

        let mut text =
            String::from("Usage: strata [--help] <command> [args]\n\nAvailable commands are:\n");
        for (name, synopsis) in entries {
            text.push_str(&format!("    {name:width$}    {synopsis}\n"));
        }
        text
    }
}

/// Register one entry: clones of the shared configuration and the sink are
/// moved into a zero-argument factory around `build`.
fn with<F>(
    registry: &mut CommandRegistry,
    config: &Arc<SharedConfig>,
    ui: &Ui,
    name: &'static str,
    build: F,
) where
    F: Fn(Arc<SharedConfig>, Ui) -> Box<dyn Command> + Send + 'static,
{
    let config = Arc::clone(config);
    let ui = ui.clone();
    registry.register(
        name,
        Box::new(move || Ok(build(Arc::clone(&config), ui.clone()))),
    );
}
