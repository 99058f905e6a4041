//! Physics Explorer daemon
//!
//! Hosts the mission menu and the one active mission screen for UI clients:
//! - Catalog and completion tracking
//! - Experiment control actions, evaluation and level progression
//! - Tick scheduling while an experiment is running
//!
//! Clients speak line-delimited JSON over TCP (127.0.0.1:9877 by default).
//! Configuration is read from `config.json` in the OS config directory:
//! - Linux: ~/.config/physics-explorer/
//! - Windows: %APPDATA%\physics-explorer\
//! - MacOS: ~/Library/Application Support/physics-explorer/

use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::RwLock;
use tokio::time;
use tracing::{error, info, warn};

mod config;
mod paths;
mod protocol;
mod state;
mod ticker;

use config::DaemonConfig;
use paths::AppPaths;
use protocol::{Request, Response};
use state::{respond, DaemonState, SharedState};

// ═══════════════════════════════════════════════════════════════════════════
// Client handling
// ═══════════════════════════════════════════════════════════════════════════

async fn write_response<W>(
    writer: &mut W,
    response: &Response,
) -> Result<(), Box<dyn std::error::Error>>
where
    W: AsyncWrite + Unpin,
{
    writer
        .write_all(serde_json::to_string(response)?.as_bytes())
        .await?;
    writer.write_all(b"\n").await?;
    Ok(())
}

/// How a client conversation ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ClientEnd {
    Disconnected,
    /// The client asked the daemon to exit; the reply has been flushed.
    Shutdown,
}

/// Answer requests from `reader` on `writer`, one JSON object per line.
async fn serve_lines<R, W>(
    reader: R,
    mut writer: W,
    state: &SharedState,
) -> Result<ClientEnd, Box<dyn std::error::Error>>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut lines = BufReader::new(reader).lines();

    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }
        let request: Request = match serde_json::from_str(&line) {
            Ok(req) => req,
            Err(e) => {
                error!("Invalid request: {}", e);
                let resp = Response::error(format!("Invalid request: {}", e));
                write_response(&mut writer, &resp).await?;
                continue;
            }
        };

        let shutdown = request == Request::Shutdown;
        let response = respond(state, request).await;
        write_response(&mut writer, &response).await?;

        if shutdown {
            writer.flush().await?;
            return Ok(ClientEnd::Shutdown);
        }
    }

    Ok(ClientEnd::Disconnected)
}

async fn handle_client(
    stream: TcpStream,
    state: SharedState,
) -> Result<(), Box<dyn std::error::Error>> {
    let (reader, writer) = stream.into_split();
    if serve_lines(reader, writer, &state).await? == ClientEnd::Shutdown {
        info!("Shutdown requested");
        tokio::spawn(async {
            // Give the response a moment to flush before exiting.
            time::sleep(Duration::from_millis(50)).await;
            std::process::exit(0);
        });
    }
    Ok(())
}

// ═══════════════════════════════════════════════════════════════════════════
// Entry point
// ═══════════════════════════════════════════════════════════════════════════

fn load_config() -> DaemonConfig {
    let config = match AppPaths::new() {
        Ok(paths) => {
            let file = paths.config_file();
            match DaemonConfig::load(&file) {
                Ok(config) => {
                    info!("Config: {}", file.display());
                    config
                }
                Err(e) => {
                    warn!("{}; using defaults", e);
                    DaemonConfig::default()
                }
            }
        }
        Err(e) => {
            warn!("{}; using defaults", e);
            DaemonConfig::default()
        }
    };
    config.with_env_overrides()
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();

    let config = load_config();
    let state: SharedState = Arc::new(RwLock::new(DaemonState::new(&config)));

    tokio::spawn(async {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Ctrl-C: exiting");
            std::process::exit(0);
        }
    });

    let listener = TcpListener::bind(&config.listen_addr).await?;
    info!(
        "Physics Explorer daemon listening on {} (tick {} ms)",
        config.listen_addr,
        config.tick_period().as_millis()
    );

    loop {
        let (stream, addr) = listener.accept().await?;
        info!("Client connected: {}", addr);
        let state_clone = Arc::clone(&state);

        tokio::spawn(async move {
            if let Err(e) = handle_client(stream, state_clone).await {
                error!("Client handler error: {}", e);
            }
        });
    }
}
