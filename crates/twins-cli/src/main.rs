use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;
use twins_core::config::TwinsConfig;
use twins_core::service::HistoryQuery;
use twins_infrastructure::ConfigService;

mod commands;

#[derive(Parser)]
#[command(name = "twins")]
#[command(about = "Digital Twins CLI - persona feedback on your ideas", long_about = None)]
struct Cli {
    /// Path to config.toml (defaults to the platform config directory)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Base URL of the generation service
    #[arg(long, global = true)]
    api_url: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the personas that can be asked for feedback
    Personas {
        /// Skip the service catalog and show the built-in personas
        #[arg(long)]
        builtin: bool,
    },
    /// Check whether the generation service is reachable
    Health,
    /// Show previous runs
    History {
        /// Query the service instead of the local history
        #[arg(long)]
        remote: bool,
        #[arg(long, default_value_t = 1)]
        page: u32,
        #[arg(long, default_value_t = 20)]
        per_page: u32,
        #[arg(long, default_value_t = 30)]
        days: u32,
        /// Only show results for this persona (remote only)
        #[arg(long)]
        persona: Option<String>,
    },
    /// Ask one or more personas for feedback on an idea
    Run {
        /// Persona id; repeat to ask several personas at once
        #[arg(short, long = "persona", required = true)]
        personas: Vec<String>,

        /// The idea to pitch
        #[arg(required = true, trailing_var_arg = true)]
        prompt: Vec<String>,
    },
}

fn init_tracing() {
    // Logs go to stderr so they never interleave with revealed text.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn load_config(cli: &Cli) -> Result<TwinsConfig> {
    let service = match &cli.config {
        Some(path) => ConfigService::with_path(path),
        None => ConfigService::new(),
    };
    let mut config = service.load().context("Failed to load configuration")?;
    if let Some(url) = &cli.api_url {
        config.service.base_url = url.clone();
    }
    Ok(config)
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();
    let config = load_config(&cli)?;
    let service = commands::generation_service(&config);

    match cli.command {
        Commands::Personas { builtin } => commands::personas::list(service.as_ref(), builtin).await?,
        Commands::Health => commands::health::check(service, &config).await?,
        Commands::History {
            remote,
            page,
            per_page,
            days,
            persona,
        } => {
            if remote {
                let query = HistoryQuery {
                    page,
                    per_page,
                    days,
                    persona_id: persona,
                };
                commands::history::remote(service.as_ref(), &query).await?
            } else {
                commands::history::local(&config.history).await?
            }
        }
        Commands::Run { personas, prompt } => {
            commands::run::execute(&config, service, personas, prompt.join(" ")).await?
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_history_defaults_to_local() {
        let cli = Cli::try_parse_from(["twins", "history"]).unwrap();
        match cli.command {
            Commands::History {
                remote,
                page,
                per_page,
                days,
                persona,
            } => {
                assert!(!remote);
                assert_eq!((page, per_page, days), (1, 20, 30));
                assert!(persona.is_none());
            }
            _ => panic!("expected history command"),
        }
    }

    #[test]
    fn test_run_collects_personas_and_prompt() {
        let cli = Cli::try_parse_from([
            "twins", "run", "-p", "sarah", "--persona", "kanu", "Uber", "for", "dogs",
        ])
        .unwrap();
        match cli.command {
            Commands::Run { personas, prompt } => {
                assert_eq!(personas, vec!["sarah", "kanu"]);
                assert_eq!(prompt.join(" "), "Uber for dogs");
            }
            _ => panic!("expected run command"),
        }
    }

    #[test]
    fn test_run_requires_a_persona() {
        assert!(Cli::try_parse_from(["twins", "run", "an idea"]).is_err());
    }
}
