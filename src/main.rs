//! opwatch - live progress feeds for long-running infrastructure change operations.

use std::io::{IsTerminal, Read};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use opwatch::config::ConfigLoader;
use opwatch::input;
use opwatch::monitor::Monitor;
use opwatch::output::{self, ConsoleSink, Sink};
use opwatch::provider::HttpProcessApi;

#[derive(Parser)]
#[command(
    name = "opwatch",
    about = "Live progress feeds for long-running infrastructure change operations",
    version
)]
struct Cli {
    /// Process names or URNs to watch. With no targets, piped input is
    /// scanned for URNs; with no piped input, every process currently being
    /// modified is watched.
    targets: Vec<String>,

    /// Base URL of the orchestration API (overrides the config file).
    #[arg(long)]
    endpoint: Option<String>,

    /// Region to scope API calls to (overrides the config file).
    #[arg(long)]
    region: Option<String>,

    /// Polling interval in milliseconds (overrides the config file).
    #[arg(long)]
    poll_interval_ms: Option<u64>,

    /// Load configuration from a specific file.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Watch processes being deleted instead of everything in progress.
    #[arg(long)]
    deleting: bool,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short = 'v', long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn init_tracing(verbosity: u8) {
    let level = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(e) = run(cli).await {
        tracing::error!(error = %e, "Watch failed");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let loader = cli
        .config
        .map_or_else(ConfigLoader::new, ConfigLoader::with_path);
    let mut config = loader.load()?;

    if cli.endpoint.is_some() {
        config.endpoint = cli.endpoint;
    }
    if cli.region.is_some() {
        config.region = cli.region;
    }
    if let Some(ms) = cli.poll_interval_ms {
        config.poll_interval_ms = ms;
    }

    let endpoint = config
        .endpoint
        .as_deref()
        .ok_or("no endpoint configured; pass --endpoint or set it in .opwatch.toml")?;
    let api = Arc::new(HttpProcessApi::new(endpoint, config.region.clone())?);
    let sink: Arc<ConsoleSink> = Arc::new(ConsoleSink::new());
    let monitor = Monitor::with_poll_interval(
        api,
        Arc::clone(&sink) as Arc<dyn Sink>,
        Duration::from_millis(config.poll_interval_ms),
    );

    if !cli.targets.is_empty() {
        monitor.watch_many(cli.targets).await?;
        return Ok(());
    }

    if cli.deleting {
        sink.emit(&output::render_notice(
            "opwatch",
            "Watching every process being deleted",
        ));
        monitor.watch_deleting().await?;
        return Ok(());
    }

    if !std::io::stdin().is_terminal() {
        let mut text = String::new();
        std::io::stdin().read_to_string(&mut text)?;
        let locators = input::extract_process_locators(&text);
        if locators.is_empty() {
            return Err("no process URNs found in piped input".into());
        }
        monitor
            .watch_many(locators.into_iter().map(|l| l.urn))
            .await?;
        return Ok(());
    }

    sink.emit(&output::render_notice(
        "opwatch",
        "Watching every process being modified",
    ));
    monitor.watch_in_progress().await?;
    Ok(())
}
