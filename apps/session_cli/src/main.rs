use std::{path::PathBuf, sync::Arc};

use anyhow::{Context, Result};
use clap::Parser;
use session_core::{HttpRoutingService, Session, SessionConfig};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

mod commands;
mod config;
mod demo;

use commands::{parse_line, LineCommand, HELP};
use config::load_settings;

#[derive(Parser, Debug)]
struct Args {
    /// Settings file; missing files fall back to defaults.
    #[arg(long, default_value = "session.toml")]
    config: PathBuf,
    #[arg(long)]
    routing_url: Option<String>,
    #[arg(long)]
    tick_ms: Option<u64>,
    #[arg(long)]
    no_simulation: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();
    let args = Args::parse();

    let mut settings = load_settings(&args.config)?;
    if let Some(url) = args.routing_url {
        settings.routing_url = url;
    }
    if let Some(tick_ms) = args.tick_ms {
        settings.simulation_tick_ms = tick_ms;
    }
    if args.no_simulation {
        settings.simulation_tick_ms = 0;
    }
    if settings.peers.is_empty() {
        settings.peers = demo::demo_peers();
    }

    let routing = HttpRoutingService::new(settings.routing_options())
        .context("failed to build routing client")?;
    info!(
        routing_url = %settings.routing_url,
        peers = settings.peers.len(),
        "starting session"
    );
    let mut session = Session::spawn(
        SessionConfig {
            peers: settings.peers.clone(),
            tick_period: settings.tick_period(),
        },
        Arc::new(routing),
    );

    let mut events = session.subscribe();
    let printer = tokio::spawn(async move {
        while let Ok(event) = events.recv().await {
            match serde_json::to_string(&event) {
                Ok(line) => println!("event {line}"),
                Err(err) => warn!("failed to encode event: {err}"),
            }
        }
    });

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await.context("failed to read stdin")? {
        match parse_line(&line) {
            Ok(None) => {}
            Ok(Some(LineCommand::Session(command))) => {
                if let Err(err) = session.dispatch(command).await {
                    println!("rejected: {err}");
                }
            }
            Ok(Some(LineCommand::Show)) => {
                println!("{}", serde_json::to_string_pretty(&session.snapshot())?);
            }
            Ok(Some(LineCommand::Help)) => println!("{HELP}"),
            Ok(Some(LineCommand::Quit)) => break,
            Err(err) => println!("error: {err:#}"),
        }
    }

    session.shutdown().await;
    printer.abort();
    Ok(())
}
