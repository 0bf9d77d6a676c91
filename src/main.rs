use std::net::SocketAddr;
use std::path::PathBuf;

use clap::Parser;

use hearts_ring::app::Peer;
use hearts_ring::config::PeerConfig;
use hearts_ring::logging;
use hearts_ring::strategy::{AutomaticStrategy, RandomStrategy};
use hearts_ring::Result;

#[derive(Parser, Debug)]
#[command(name = "hearts-ring", about = "Four-player Hearts ring peer")]
struct Args {
    /// This peer's id, 0-3. Peer 0 runs the coordinator.
    #[arg(long)]
    self_id: Option<u8>,

    /// Address this peer listens on.
    #[arg(long)]
    listen: Option<SocketAddr>,

    /// Address of the next peer around the ring.
    #[arg(long)]
    successor: Option<SocketAddr>,

    /// Optional TOML file with a `[[peer]]` table, used instead of
    /// --listen/--successor.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Use the random strategy instead of the deterministic default.
    #[arg(long)]
    random_strategy: bool,

    /// tracing EnvFilter directive string.
    #[arg(long, default_value = "info")]
    verbosity: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    logging::init_logging(&args.verbosity);

    let self_id = args
        .self_id
        .expect("--self_id is required") as hearts_ring::protocol::PlayerId;

    let config = if let Some(path) = args.config {
        PeerConfig::load_from_file(&path, self_id)?
    } else {
        let listen = args.listen.expect("--listen is required without --config");
        let successor = args
            .successor
            .expect("--successor is required without --config");
        PeerConfig::new(self_id, listen, successor)?
    };

    tracing::info!(self_id, listen = %config.listen, successor = %config.successor, "starting peer");

    if args.random_strategy {
        Peer::bind(config, RandomStrategy).await?.run().await
    } else {
        Peer::bind(config, AutomaticStrategy).await?.run().await
    }
}
