use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tokio::signal;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;
use yomi_config::Config;

pub mod controller;
pub mod events;
pub mod io;
pub mod state;
pub mod ui;

#[cfg(test)]
mod tests;

use self::controller::Session;

#[derive(Debug, Parser)]
#[command(name = "yomi", about = "Tap-to-define reader for a live Japanese text stream")]
struct Args {
    /// JSON profile; environment variables still apply on top
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Stream host (overrides YOMI_HOST)
    #[arg(long)]
    host: Option<String>,

    /// Stream port (overrides YOMI_PORT)
    #[arg(short, long)]
    port: Option<u16>,

    /// Ask the remote dictionary before local ones
    #[arg(long)]
    prefer_remote: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let args = Args::parse();
    init_tracing();

    let mut config = match &args.config {
        Some(path) => Config::load(path)?,
        None => Config::new(),
    };
    if let Some(host) = args.host {
        config.stream.host = host;
    }
    if let Some(port) = args.port {
        config.stream.port = port;
    }
    if args.prefer_remote {
        config.lookup.prefer_remote = true;
    }
    config.validate()?;

    let session = Arc::new(Session::new(config)?);
    session.start().await?;

    let cancel = CancellationToken::new();
    let mut tasks = JoinSet::new();
    tasks.spawn(ui::ui_loop(session.events()));
    tasks.spawn(io::stdin_loop(session.clone(), cancel.child_token()));

    tokio::select! {
        result = signal::ctrl_c() => {
            if let Err(e) = result {
                tracing::error!("Failed to listen for ctrl+c: {e}");
            }
            tracing::info!("Shutdown requested");
        }
        Some(result) = tasks.join_next() => {
            match result {
                Ok(Ok(())) => tracing::warn!("task exited"),
                Ok(Err(e)) => tracing::error!("task failed: {e}"),
                Err(e) => tracing::error!("task panicked: {e}"),
            }
        }
    }

    cancel.cancel();
    session.close().await;
    tasks.abort_all();

    Ok(())
}

/// `RUST_LOG` filter (default `info`), colours only on a terminal,
/// JSON lines with `YOMI_LOG_JSON=1`
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let json = std::env::var("YOMI_LOG_JSON").is_ok_and(|v| v == "1");

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr);

    let result = if json {
        builder.json().try_init()
    } else {
        builder
            .with_ansi(atty::is(atty::Stream::Stderr))
            .compact()
            .try_init()
    };
    if let Err(e) = result {
        eprintln!("tracing already initialized: {e}");
    }
}
