//! # Navigation Runtime
//!
//! Reads one JSON request per line from stdin and writes one JSON response
//! per line to stdout. Logs go to stderr.
//!
//! ## Startup Sequence
//!
//! 1. Initialize logging
//! 2. Load configuration from the environment
//! 3. Restore saved navigation state and attach the controller
//! 4. Serve requests until EOF or Ctrl+C
//! 5. Flush pending saves

use anyhow::{Context, Result};
use nav_runtime::{NavRuntime, RuntimeConfig};
use nav_telemetry::{init_telemetry, log_event, TelemetryConfig};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};

#[tokio::main]
async fn main() -> Result<()> {
    init_telemetry(TelemetryConfig::for_service("nav-runtime"))
        .context("Failed to initialize logging")?;

    let config = RuntimeConfig::from_env();
    log_event!(
        info,
        "runtime",
        "Starting navigation runtime",
        state_dir = %config.state_dir.display(),
        mode = %config.session.mode,
        platform = %config.coordinator.persistence.platform
    );

    let runtime = NavRuntime::start(config)
        .await
        .context("Failed to start navigation runtime")?;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = tokio::io::stdout();

    loop {
        let line = tokio::select! {
            line = lines.next_line() => line.context("Failed to read request")?,
            _ = tokio::signal::ctrl_c() => {
                log_event!(info, "runtime", "Interrupted");
                None
            }
        };
        let Some(line) = line else { break };
        if line.trim().is_empty() {
            continue;
        }

        let response = runtime.handle_line(&line).await;
        let mut encoded = serde_json::to_string(&response).context("Failed to encode response")?;
        encoded.push('\n');
        stdout
            .write_all(encoded.as_bytes())
            .await
            .context("Failed to write response")?;
        stdout.flush().await.context("Failed to flush stdout")?;
    }

    runtime.shutdown().await;
    Ok(())
}
