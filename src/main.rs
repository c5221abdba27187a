#![cfg_attr(not(test), deny(clippy::panic))]

use clap::Parser;
use fanout_relay::config::{self, Config};
use fanout_relay::datagram::DatagramBridge;
use fanout_relay::logging;
use fanout_relay::server::RelayServer;
use fanout_relay::websocket;
use std::net::SocketAddr;
use std::sync::Arc;

/// Fanout Relay -- best-effort room relay over WebSocket and UDP
#[derive(Parser, Debug)]
#[command(name = "fanout-relay")]
#[command(about = "A best-effort, in-memory room relay over WebSocket and UDP")]
#[command(version)]
struct Cli {
    /// Validate configuration and exit without starting the server.
    #[arg(long, short = 'c', conflicts_with = "print_config")]
    validate_config: bool,

    /// Print the loaded configuration to stdout (as JSON) and exit.
    #[arg(long, conflicts_with = "validate_config")]
    print_config: bool,

    /// Stream (HTTP/WebSocket) port
    #[arg(long, env = "PORT")]
    port: Option<u16>,

    /// Datagram (UDP) port
    #[arg(long = "udp", env = "UDP_PORT")]
    udp_port: Option<u16>,

    /// Allowed CORS origin(s), "*" or comma-separated
    #[arg(long = "origin", env = "ALLOWED_ORIGIN")]
    allowed_origin: Option<String>,
}

impl Cli {
    /// Flags and their env vars take precedence over the loaded config.
    fn apply_overrides(&self, cfg: &mut Config) {
        if let Some(port) = self.port {
            cfg.port = port;
        }
        if let Some(udp_port) = self.udp_port {
            cfg.udp_port = udp_port;
        }
        if let Some(origin) = &self.allowed_origin {
            cfg.allowed_origin.clone_from(origin);
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut cfg = config::load();
    cli.apply_overrides(&mut cfg);

    if cli.print_config {
        let json = serde_json::to_string_pretty(&cfg)
            .map_err(|e| anyhow::anyhow!("Failed to serialize config: {e}"))?;
        println!("{json}");
        return Ok(());
    }

    let validation_result = config::validate_config(&cfg);

    if cli.validate_config {
        match validation_result {
            Ok(()) => {
                println!("Configuration validation passed");
                println!();
                println!("Configuration summary:");
                println!("  Stream port: {}", cfg.port);
                println!("  Datagram port: {}", cfg.udp_port);
                println!("  Allowed origin: {}", cfg.allowed_origin);
                println!("  Default room: {}", cfg.relay.default_room);
                println!("  Queue capacity: {}", cfg.relay.queue_capacity);
                println!("  Envelope encoding: {:?}", cfg.relay.envelope_encoding);
                return Ok(());
            }
            Err(e) => {
                eprintln!("Configuration validation failed:\n{e}");
                std::process::exit(1);
            }
        }
    }

    validation_result?;

    logging::init_with_config(&cfg.logging);

    let server = RelayServer::from_config(&cfg);

    // The stream transport keeps serving even if the datagram port is unavailable.
    let udp_addr = SocketAddr::from(([0, 0, 0, 0], cfg.udp_port));
    match DatagramBridge::bind(udp_addr, Arc::clone(&server)).await {
        Ok(bridge) => {
            tracing::info!(%udp_addr, "Datagram relay listening");
            tokio::spawn(async move {
                if let Err(e) = bridge.run().await {
                    tracing::error!(error = %e, "Datagram relay stopped");
                }
            });
        }
        Err(e) => {
            tracing::error!(error = %e, "Datagram relay unavailable");
        }
    }

    let router = websocket::create_router(&cfg.allowed_origin)
        .fallback(|| async {
            "Fanout relay. Connect via /ws/{room}/{username}; /health for status."
        })
        .with_state(server);

    let addr = SocketAddr::from(([0, 0, 0, 0], cfg.port));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(
        %addr,
        allowed_origin = %cfg.allowed_origin,
        "Server started over HTTP - WebSocket: /ws/{{room}}/{{username}}, Health: /health"
    );

    axum::serve(listener, router).await?;

    Ok(())
}
