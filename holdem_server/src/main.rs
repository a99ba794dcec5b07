//! Hold'em table server.
//!
//! Spawns one TableActor and serves it over length-prefixed TCP frames.

use anyhow::{Context, Error};
use holdem_server::{
    config::{CliOverrides, ServerConfig},
    server,
};
use holdem_table::{TableActor, table::TableMessage};
use log::info;
use pico_args::Arguments;
use tokio::net::TcpListener;

const HELP: &str = "\
Run a Texas Hold'em table server

USAGE:
  holdem_server [OPTIONS]

OPTIONS:
  --bind         IP:PORT   Server socket bind address  [default: env SERVER_BIND or 127.0.0.1:6969]
  --max-seats    N         Seats at the table          [default: env TABLE_MAX_SEATS or 9]
  --small-blind  N         Small blind                 [default: env TABLE_SMALL_BLIND or 5]
  --big-blind    N         Big blind                   [default: env TABLE_BIG_BLIND or 10]
  --seed         N         Deck seed for a reproducible table [default: env TABLE_SEED or random]

FLAGS:
  -h, --help               Print help information

ENVIRONMENT:
  TABLE_TICK_MS            Interval between auto-play ticks in milliseconds
  TABLE_AUTO_START         Start hands automatically (true/false)
  RUST_LOG                 Log level (e.g., info, debug)
  (A .env file in the working directory is loaded first)
";

#[tokio::main]
async fn main() -> Result<(), Error> {
    // Load .env file if it exists
    let _ = dotenvy::dotenv();

    let mut pargs = Arguments::from_env();

    // Help has a higher priority and should be handled separately.
    if pargs.contains(["-h", "--help"]) {
        print!("{HELP}");
        std::process::exit(0);
    }

    let overrides = CliOverrides {
        bind: pargs.opt_value_from_str("--bind")?,
        max_seats: pargs.opt_value_from_str("--max-seats")?,
        small_blind: pargs.opt_value_from_str("--small-blind")?,
        big_blind: pargs.opt_value_from_str("--big-blind")?,
        seed: pargs.opt_value_from_str("--seed")?,
    };

    env_logger::builder().format_target(false).init();

    let config = ServerConfig::from_env(overrides)?;
    config.validate()?;

    let (actor, table) = TableActor::new(config.table.clone());
    let actor_task = tokio::spawn(actor.run());

    let listener = TcpListener::bind(config.bind)
        .await
        .with_context(|| format!("Failed to bind to {}", config.bind))?;
    info!(
        "Serving '{}' ({} seats, blinds {}/{}) at {}. Press Ctrl+C to stop.",
        config.table.name,
        config.table.max_seats,
        config.table.small_blind,
        config.table.big_blind,
        config.bind
    );

    server::serve(listener, table.clone(), shutdown_signal()).await?;

    info!("Shutting down server...");
    let _ = table.send(TableMessage::Close).await;
    actor_task.await?;

    Ok(())
}

/// Graceful shutdown signal
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        log::error!("Failed to listen for Ctrl+C: {e}");
        std::future::pending::<()>().await;
    }
}
