// swimnode - local demo runner for the membership engine.
//
// Spins up a small in-process cluster over `LocalTransport`, logs Join/Fail
// events as they arrive, and runs until interrupted. There is no production
// transport in this crate (the transport is an external collaborator, see
// `swimcore::transport`) - this binary exists to exercise the engine
// end-to-end without one.

use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use swimcore::{Config, Event, LocalNetwork, LocalTransport, Node};
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "swimnode", about = "Run a local demo cluster of swimcore nodes")]
struct Args {
    /// Number of nodes to run in this process.
    #[arg(long, default_value_t = 5)]
    nodes: usize,

    /// Base port for the demo cluster; node i listens on base_port + i.
    #[arg(long, default_value_t = 9000)]
    base_port: u16,

    /// Optional TOML config file (ping_interval_ms, probe_timeout_ms, send_cap).
    #[arg(long, default_value = "swimnode.toml")]
    config: PathBuf,
}

#[tokio::main]
async fn main() -> swimcore::Result<()> {
    tracing_subscriber::fmt()
        .with_target(false)
        .with_thread_ids(true)
        .with_level(true)
        .init();

    let args = Args::parse();
    let config = Config::from_file(&args.config)?;

    info!("swimnode starting, version {}", swimcore::VERSION);
    info!(
        nodes = args.nodes,
        base_port = args.base_port,
        ping_interval = ?config.ping_interval,
        "launching local demo cluster"
    );

    let network = LocalNetwork::new();
    let (event_tx, mut event_rx) = tokio::sync::mpsc::channel(1000);

    let mut node_config = config.clone();
    node_config.event_sink = Some(event_tx);

    let mut nodes = Vec::with_capacity(args.nodes);
    for i in 0..args.nodes {
        let seed = nodes
            .first()
            .map(|first: &Node| first.address().to_string());
        let node = Node::new(
            "127.0.0.1",
            args.base_port + i as u16,
            seed,
            None,
            node_config.clone(),
            Arc::new(LocalTransport::new(network.clone())),
        );
        network.register(node.address(), node.peer_handler()).await;
        nodes.push(node);
    }

    println!();
    println!("╭──────────────────────────────────────────────╮");
    println!("│  swimnode demo cluster is running              │");
    println!("│  {} nodes, base port {}                         │", args.nodes, args.base_port);
    println!("│  press ctrl-c to stop                           │");
    println!("╰──────────────────────────────────────────────╯");
    println!();

    let (shutdown_tx, mut shutdown_rx) = tokio::sync::mpsc::channel::<()>(1);
    ctrlc::set_handler(move || {
        let _ = shutdown_tx.try_send(());
    })
    .map_err(|e| swimcore::CoreError::Configuration(format!("failed to install ctrl-c handler: {e}")))?;

    loop {
        tokio::select! {
            Some(event) = event_rx.recv() => {
                match event {
                    Event::Join { address, .. } => info!(%address, "node joined"),
                    Event::Fail { address, .. } => info!(%address, "node failed"),
                }
            }
            _ = shutdown_rx.recv() => {
                info!("shutting down");
                break;
            }
        }
    }

    Ok(())
}
