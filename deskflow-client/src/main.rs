#![forbid(unsafe_code)]

mod logging_device;

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use deskflow_client_lib::{config, Client};
use tokio::sync::watch;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use logging_device::{LoggingContext, LoggingKeyboard, LoggingMouse};

/// CLI + config-file layering is out of scope for the core (§1); this is
/// the minimal surface needed to point the core at a config file and run
/// it, in the spirit of `huginn-proxy`'s single `--config` flag.
#[derive(Parser, Debug)]
#[command(author, version, about = "Synergy/Deskflow remote-input client")]
struct Cli {
    /// Path to the TOML configuration file.
    #[arg(short, long, value_name = "FILE", default_value = "deskflow-client.toml")]
    config: PathBuf,
}

#[tokio::main]
async fn main() {
    init_tracing();

    let cli = Cli::parse();
    let cfg = match config::load_from_path(&cli.config) {
        Ok(cfg) => Arc::new(cfg),
        Err(err) => {
            error!(%err, "failed to load configuration");
            std::process::exit(1);
        }
    };

    info!(server = %cfg.server, port = cfg.port, client_name = %cfg.client_name, "configuration loaded");

    let ctx = Box::new(LoggingContext::new((cfg.screen_width, cfg.screen_height)));
    let mouse = Box::new(LoggingMouse::default());
    let keyboard = Box::new(LoggingKeyboard::default());

    let (cancel_tx, cancel_rx) = watch::channel(false);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("ctrl-c received, shutting down");
            let _ = cancel_tx.send(true);
        }
    });

    let client = Client::new(cfg);
    match client.run(ctx, mouse, keyboard, cancel_rx).await {
        Ok(()) => {
            info!("client stopped cleanly");
        }
        Err(err) => {
            error!(%err, "client stopped with an error");
            std::process::exit(1);
        }
    }
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(env_filter).with_target(false).init();
}
