//! Headless Chalkboard participant.

use chalkboard_app::{App, AppConfig};
use chalkboard_core::config::{ClientConfig, DEFAULT_SERVER_URL, OutboundPolicy};
use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;

/// Command line arguments.
#[derive(Parser, Debug)]
#[command(name = "chalkboard")]
#[command(about = "Join a shared Chalkboard, mirror it and draw from a stdin script")]
struct Args {
    /// Board server base URL
    #[arg(short, long, env = "CHALKBOARD_SERVER", default_value = DEFAULT_SERVER_URL)]
    server: String,

    /// Display name shown to other participants
    #[arg(short, long, env = "CHALKBOARD_NAME", default_value = "anonymous")]
    name: String,

    /// Surface width in pixels
    #[arg(long, default_value_t = 1280)]
    width: u32,

    /// Surface height in pixels
    #[arg(long, default_value_t = 800)]
    height: u32,

    /// Write PNG snapshots of the board here
    #[arg(long, value_name = "PNG")]
    snapshot: Option<PathBuf>,

    /// Also write a snapshot every N seconds
    #[arg(long, value_name = "SECS", requires = "snapshot")]
    snapshot_every: Option<u64>,

    /// Leave after N seconds
    #[arg(long, value_name = "SECS")]
    duration: Option<u64>,

    /// Queue up to N outbound messages while disconnected instead of dropping them
    #[arg(long, value_name = "N")]
    buffer: Option<usize>,
}

impl Args {
    fn into_config(self) -> AppConfig {
        let client = ClientConfig {
            server_url: self.server,
            outbound: match self.buffer {
                Some(capacity) => OutboundPolicy::Buffer { capacity },
                None => OutboundPolicy::Drop,
            },
            width: self.width,
            height: self.height,
            ..ClientConfig::default()
        };
        AppConfig {
            client,
            username: self.name,
            snapshot: self.snapshot,
            snapshot_every: self.snapshot_every.map(Duration::from_secs),
            duration: self.duration.map(Duration::from_secs),
        }
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    log::info!("Starting Chalkboard");

    let config = Args::parse().into_config();
    let app = App::new(config).inspect_err(|e| log::error!("Startup failed: {}", e))?;
    app.run()?;
    Ok(())
}
