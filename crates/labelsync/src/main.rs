mod artifact;
mod cli;
mod config;
mod output;

use anyhow::Result;
use chrono::Utc;
use clap::{CommandFactory, Parser};
use cli::{Cli, Commands, ConfigCommands};
use config::Config;
use github_backend::GitHubClient;
use labelsync_core::{LabelRemote, LabelSync, SystemClock};
use output::{output_error, output_result};
use std::io::IsTerminal;
use std::process::ExitCode;
use tracing::info;
use tracing_subscriber::EnvFilter;

const DEFAULT_LOG_FILTER: &str = "labelsync=info,labelsync_core=info,github_backend=info";

fn main() -> ExitCode {
    let cli = Cli::parse();
    output::init_color(cli.color);
    init_tracing(cli.verbose);

    if let Err(e) = run(&cli) {
        output_error(&e, cli.format);
        return ExitCode::from(1);
    }

    ExitCode::SUCCESS
}

/// Logs go to stderr; `RUST_LOG` wins over `-v`
fn init_tracing(verbose: u8) {
    let fallback = match verbose {
        0 => DEFAULT_LOG_FILTER.to_string(),
        1 => DEFAULT_LOG_FILTER.replace("=info", "=debug"),
        _ => DEFAULT_LOG_FILTER.replace("=info", "=trace"),
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .with_ansi(std::io::stderr().is_terminal() && std::env::var_os("NO_COLOR").is_none())
        .init();
}

fn load_config(cli: &Cli) -> Result<Config> {
    let mut config = Config::load(cli.config.clone())?;
    config.merge_with_cli(cli.api_url.clone(), cli.token.clone(), cli.org.clone());
    Ok(config)
}

fn run(cli: &Cli) -> Result<()> {
    match &cli.command {
        Commands::Completions { shell } => {
            clap_complete::generate(*shell, &mut Cli::command(), "labelsync", &mut std::io::stdout());
            Ok(())
        }
        Commands::Config { action } => handle_config(cli, action),
        Commands::RateLimit => {
            let config = load_config(cli)?;
            let client = GitHubClient::with_base_url(&config.api_url, config.require_token()?);
            let rate_limit = client.rate_limit()?;
            output_result(&rate_limit, cli.format);
            Ok(())
        }
        Commands::Sync(args) => {
            let mut config = load_config(cli)?;
            config.merge_sync_args(args);
            let settings = config.sync_settings()?;
            let client = GitHubClient::with_base_url(&config.api_url, config.require_token()?);

            let clock = SystemClock;
            let report = LabelSync::new(&client, &clock, settings).run()?;

            let written = artifact::write_report(&config.output_dir, &report, Utc::now())?;
            for path in &written {
                info!("Saved {}", path.display());
            }
            output_result(&report, cli.format);
            Ok(())
        }
    }
}

/// Handle config commands that don't need API connection
fn handle_config(cli: &Cli, action: &ConfigCommands) -> Result<()> {
    match action {
        ConfigCommands::Show => {
            let config = load_config(cli)?.redacted();
            output_result(&config, cli.format);
        }
        ConfigCommands::Path => {
            let paths = config::config_paths(cli.config.as_deref());
            match cli.format {
                cli::OutputFormat::Json => {
                    let entries: Vec<serde_json::Value> = paths
                        .iter()
                        .map(|p| serde_json::json!({"path": p, "exists": p.exists()}))
                        .collect();
                    println!("{}", serde_json::to_string_pretty(&entries)?);
                }
                cli::OutputFormat::Text => {
                    for path in paths {
                        let marker = if path.exists() { " (found)" } else { "" };
                        println!("{}{}", path.display(), marker);
                    }
                }
            }
        }
    }
    Ok(())
}
