use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use strata_commands::{dispatch, CommandRegistry};
use strata_core::{SharedConfig, StdoutSink, Ui};

/// Strata -- infrastructure state CLI with an HTTP command bridge.
#[derive(Parser, Debug)]
#[command(name = "strata", version, about)]
struct Cli {
    /// Directory holding state files (defaults to the current directory)
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Expose every command over a local HTTP endpoint
    Serve {
        /// Port to listen on
        #[arg(long, default_value_t = 8080)]
        port: u16,

        /// Echo each request's output to the server console as well
        #[arg(long)]
        echo: bool,
    },

    /// Run a single command locally
    Run {
        /// Command name and arguments, e.g. `strata run state list`
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        args: Vec<String>,
    },
}

fn main() -> anyhow::Result<()> {
    // Initialize tracing with env filter (e.g., RUST_LOG=debug)
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_target(false)
        .init();

    let cli = Cli::parse();
    let data_dir = match cli.data_dir {
        Some(dir) => dir,
        None => std::env::current_dir()?,
    };

    match cli.command {
        Commands::Serve { port, echo } => {
            let mut config = SharedConfig::from_dir(data_dir);
            // Response bodies are plain text; ANSI styling stays local.
            config.color = false;
            config.mirror_console = echo;
            let runtime = tokio::runtime::Runtime::new()?;
            runtime.block_on(strata_serve::run(Arc::new(config), port))
        }
        Commands::Run { args } => {
            let config = Arc::new(SharedConfig::from_dir(data_dir));
            let ui = Ui::new(Box::new(StdoutSink), config.color);
            let registry = CommandRegistry::build(config, ui.clone());
            let code = dispatch(&registry, &args, &ui)?;
            std::process::exit(code);
        }
    }
}
