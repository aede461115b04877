//! Chess clock server.
//!
//! Run with:
//! ```not_rust
//! cargo run --bin chessclock-server
//! cargo run --bin chessclock-server -- --bind 0.0.0.0:3000 --tick-rate 20
//! RUST_LOG=chessclock_room=debug cargo run --bin chessclock-server
//! ```

use chessclock::prelude::*;
use clap::Parser;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(name = "chessclock-server")]
#[command(about = "Multiplayer chess clock over WebSockets", long_about = None)]
struct Args {
    /// Address to listen on
    #[arg(short, long, default_value = "127.0.0.1:8080")]
    bind: String,

    /// Room sweeps per second (1-128)
    #[arg(short, long, default_value_t = TickConfig::DEFAULT_TICK_RATE_HZ)]
    tick_rate: u32,

    /// Per-player time for new rooms, in milliseconds
    #[arg(long, default_value_t = RoomConfig::default().time_limit_ms)]
    time_limit_ms: u64,
}

/// Installs the fmt subscriber. `RUST_LOG` overrides the default level.
fn setup_logger(default_level: &str) {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)))
        .with(tracing_subscriber::fmt::layer())
        .init();
}

#[tokio::main]
async fn main() -> Result<(), ChessClockError> {
    setup_logger("info");

    let args = Args::parse();

    let server = ChessClockServer::builder()
        .bind(&args.bind)
        .room_config(RoomConfig {
            time_limit_ms: args.time_limit_ms,
        })
        .tick_config(TickConfig::with_rate(args.tick_rate))
        .build()
        .await?;

    server.run().await
}
