//! Adapta CLI — answer questions through the quality-gated workflow engine.
//!
//! Configuration comes from `.env.local` / `.env`, an optional YAML file
//! (`--config`) and `AGENT_*` environment variables, in that order.

use adapta_cli::commands;
use clap::{Parser, Subcommand};

/// Adapta — adaptive query answering with dice, search and text generation
#[derive(Parser)]
#[command(name = "adapta", version, about = "Adapta — adaptive query answering")]
pub struct Cli {
    /// YAML configuration file; AGENT_* variables override its values
    #[arg(long, global = true, env = "AGENT_CONFIG_FILE")]
    config: Option<String>,

    /// YAML classifier rules replacing the built-in ones
    #[arg(long, global = true)]
    rules: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a query through the full workflow and print the report
    Ask {
        /// The question or request
        query: String,
        /// Print the full run state as JSON instead of the report
        #[arg(long)]
        json: bool,
    },

    /// Show which task type a query is classified as
    Classify {
        query: String,
    },

    /// Show the plan a query would run, without calling any tool
    Plan {
        query: String,
    },

    /// List the registered tools
    Tools,

    /// Work with classifier rule files
    Rules {
        #[command(subcommand)]
        action: RulesAction,
    },
}

#[derive(Subcommand)]
enum RulesAction {
    /// Validate a classifier rules YAML file
    Validate {
        /// Path to the rules file
        file: String,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    adapta_core::config::load_dotenv();
    let config = commands::load_config(cli.config.as_deref(), cli.rules.as_deref());

    let level = config
        .as_ref()
        .map(|c| c.log_level.clone())
        .unwrap_or_else(|_| "info".to_string());
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!(
                    "adapta_core={lvl},adapta_tools={lvl},adapta_cli={lvl}",
                    lvl = level
                )
                .into()
            }),
        )
        .with_writer(std::io::stderr)
        .init();

    let result = match (cli.command, config) {
        (Commands::Rules { action }, _) => match action {
            RulesAction::Validate { file } => commands::rules::validate(&file),
        },
        (_, Err(e)) => Err(e),
        (Commands::Ask { query, json }, Ok(config)) => {
            commands::ask::run(config, &query, json).await
        }
        (Commands::Classify { query }, Ok(config)) => commands::classify::run(&config, &query),
        (Commands::Plan { query }, Ok(config)) => commands::plan::run(&config, &query),
        (Commands::Tools, Ok(config)) => commands::tools::list(&config),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
