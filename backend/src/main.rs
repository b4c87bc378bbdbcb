mod commands;

use std::sync::Arc;
use std::time::Duration;

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;
use vd_core::{CoreConfig, SessionStore};

use commands::{execute, format_error, Command};

const DEFAULT_TIMEOUT_MS: u64 = 5_000;

fn load_config() -> vd_core::Result<CoreConfig> {
    match std::env::var("VD_CONFIG") {
        Ok(path) => CoreConfig::from_file(path),
        Err(_) => Ok(CoreConfig::default()),
    }
}

fn request_timeout() -> Duration {
    let ms = std::env::var("VD_TIMEOUT_MS")
        .ok()
        .and_then(|v| v.parse::<u64>().ok())
        .unwrap_or(DEFAULT_TIMEOUT_MS);
    Duration::from_millis(ms)
}

/// Parses and runs one request off the async runtime, bounded by `limit`.
async fn handle_line(store: Arc<SessionStore>, line: String, limit: Duration) -> String {
    let command = match Command::parse(&line) {
        Ok(command) => command,
        Err(e) => {
            warn!("Failed to parse command: {}", e);
            return format_error(e.code(), &e.to_string(), "error");
        }
    };

    let task = tokio::task::spawn_blocking(move || execute(&store, command));
    match tokio::time::timeout(limit, task).await {
        Ok(Ok(reply)) => reply,
        Ok(Err(join)) => {
            error!("Command task failed: {}", join);
            format_error("INTERNAL", &join.to_string(), "error")
        }
        Err(_) => {
            warn!(limit_ms = limit.as_millis() as u64, "command timed out");
            format_error("TIMEOUT", &format!("no reply within {} ms", limit.as_millis()), "error")
        }
    }
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let config = match load_config() {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            println!("{}", format_error(e.code(), &e.to_string(), "fatal"));
            std::process::exit(2);
        }
    };
    let limit = request_timeout();
    let reap_every = (config.session_ttl() / 4).max(Duration::from_secs(1));
    info!(
        version = vd_core::version(),
        max_sites = config.max_sites,
        max_sessions = config.max_sessions,
        "voronoi driver ready"
    );

    let store = Arc::new(SessionStore::new(config));

    let reaper = {
        let store = Arc::clone(&store);
        tokio::spawn(async move {
            let mut ticks = tokio::time::interval(reap_every);
            loop {
                ticks.tick().await;
                let purged = store.purge_expired();
                if purged > 0 {
                    info!(purged, "expired sessions reclaimed");
                }
            }
        })
    };

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = tokio::io::stdout();
    loop {
        let line = match lines.next_line().await {
            Ok(Some(line)) => line,
            Ok(None) => break,
            Err(e) => {
                warn!("Failed to read stdin: {}", e);
                break;
            }
        };
        if line.trim().is_empty() {
            continue;
        }
        info!("Received command: {}", line.split(':').next().unwrap_or_default());

        let reply = handle_line(Arc::clone(&store), line, limit).await;
        let written = async {
            stdout.write_all(reply.as_bytes()).await?;
            stdout.write_all(b"\n").await?;
            stdout.flush().await
        };
        if let Err(e) = written.await {
            warn!("Failed to write reply: {}", e);
            break;
        }
    }

    reaper.abort();
    info!("stdin closed, shutting down");
}
