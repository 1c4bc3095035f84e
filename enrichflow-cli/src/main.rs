//! `enrichflow` command-line runner.

use anyhow::{anyhow, Context, Result};
use clap::Parser;
use enrichflow::prelude::*;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

const DEFAULT_CONFIG: &str = "enrichflow.toml";

/// Enrich company seeds with verified contacts.
#[derive(Debug, Parser)]
#[command(name = "enrichflow", version, about)]
struct Cli {
    /// Path to the TOML configuration file. Defaults to `enrichflow.toml` when present.
    #[arg(short, long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Emit logs as JSON lines.
    #[arg(long)]
    json: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match load_config(cli.config.as_deref()) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("error: {err:#}");
            return ExitCode::from(2);
        }
    };

    if let Err(err) = init_tracing(config.log_level, cli.json) {
        eprintln!("error: {err:#}");
        return ExitCode::from(2);
    }

    let engine = match WorkflowEngine::from_config(&config) {
        Ok(engine) => engine.with_event_sink(std::sync::Arc::new(LoggingEventSink::new())),
        Err(err) => {
            error!(error = %err, "Invalid configuration");
            return ExitCode::from(2);
        }
    };

    let token = engine.cancellation_token();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupt received, finishing in-flight companies");
            token.cancel("interrupted");
        }
    });

    let outcome = engine.run().await;
    println!("{}", outcome.report());
    info!(run_id = %outcome.summary.run_id, status = %outcome.summary.status, "Done");

    if outcome.summary.status.is_ok() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

fn load_config(path: Option<&Path>) -> Result<EnrichConfig> {
    let fallback = Path::new(DEFAULT_CONFIG);
    let path = path.or_else(|| fallback.exists().then_some(fallback));
    let config = EnrichConfig::load(path).with_context(|| match path {
        Some(path) => format!("loading {}", path.display()),
        None => "loading configuration from the environment".to_string(),
    })?;
    config.validate().context("validating configuration")?;
    Ok(config)
}

fn init_tracing(level: LogLevel, json: bool) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level.as_directive()))
        .context("building log filter")?;
    let subscriber = tracing_subscriber::fmt().with_env_filter(filter).with_target(false);
    let installed = if json {
        subscriber.json().try_init()
    } else {
        subscriber.try_init()
    };
    installed.map_err(|err| anyhow!("installing log subscriber: {err}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_flags() {
        let cli = Cli::parse_from(["enrichflow", "--config", "run.toml", "--json"]);
        assert_eq!(cli.config, Some(PathBuf::from("run.toml")));
        assert!(cli.json);
    }

    #[test]
    fn test_missing_explicit_config_is_an_error() {
        let err = load_config(Some(Path::new("does/not/exist.toml"))).unwrap_err();
        assert!(format!("{err:#}").contains("configuration file not found"));
    }
}
