//! sockguard - terminal front-end for the sock inventory.
//!
//! Reads commands from stdin, prints the list and panels to stdout, and
//! logs to stderr.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use sockguard_client::HttpSockApi;
use sockguard_tui::config::{Config, API_URL_ENV};
use sockguard_tui::notify::NotificationService;
use sockguard_tui::view::strategy_for;
use sockguard_tui::{spawn_worker, App, Outcome, Request};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "sockguard", version, about = "Track socks, their washes and their wear")]
struct Cli {
    /// Path to the configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Backend base URL, overriding the configuration file
    #[arg(long, env = API_URL_ENV)]
    api_url: Option<String>,
}

fn load_config(path: Option<&PathBuf>) -> (Config, Option<anyhow::Error>) {
    let loaded = match path {
        Some(path) => Config::load(path),
        None => Config::load_default(),
    };

    match loaded {
        Ok(config) => (config, None),
        Err(e) => (Config::default(), Some(e)),
    }
}

fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let (mut config, load_error) = load_config(cli.config.as_ref());
    config.apply_api_url(cli.api_url.as_deref());
    init_logging(&config.logging.level);

    info!("Starting sockguard v{}", env!("CARGO_PKG_VERSION"));
    if let Some(e) = load_error {
        warn!("Failed to load config, using defaults: {:#}", e);
    }
    info!("Backend: {}", config.server.base_url);

    let api = HttpSockApi::with_timeout(&config.server.base_url, config.timeout())
        .context("Failed to create API client")?;

    let (req_tx, req_rx) = mpsc::unbounded_channel::<Request>();
    let (resp_tx, mut resp_rx) = mpsc::unbounded_channel();
    let worker = spawn_worker(Arc::new(api), req_rx, resp_tx);

    let strategy = strategy_for(config.ui.layout, config.ui.width);
    info!("Using {} layout", strategy.name());

    let mut app = App::new(
        config.ui.page_size,
        NotificationService::new(config.notification_duration()),
        strategy,
        req_tx.clone(),
    );
    app.start()?;

    let mut stdout = tokio::io::stdout();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    stdout
        .write_all(b"sockguard - type :help for commands\n")
        .await?;
    stdout.flush().await?;

    loop {
        let output = tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line.context("Failed to read from stdin")? else {
                    break;
                };
                match app.handle_line(&line).await? {
                    Outcome::Continue(text) => text,
                    Outcome::Quit => break,
                }
            }
            Some(response) = resp_rx.recv() => app.handle_response(response),
        };

        if !output.is_empty() {
            stdout.write_all(output.as_bytes()).await?;
            stdout.flush().await?;
        }
    }

    info!("Shutting down");
    if req_tx.send(Request::Shutdown).is_err() {
        debug!("API worker already stopped");
    }
    worker.await.context("API worker panicked")?;

    Ok(())
}
