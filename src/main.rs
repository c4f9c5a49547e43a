//! # PVM Relay
//!
//! Host-side gateway relaying PVM vessel transponder packets over a
//! LoRa link: listens continuously for 126-byte frames, validates their
//! CRC, extracts GPS / SOS / keepalive readings and routes them to the
//! telemetry and indicator sinks. An optional scheduler transmits
//! synthetic test frames through the same half-duplex radio.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use tokio::sync::{watch, Mutex};
use tracing::{info, warn};

mod config;
mod error;
mod packet;
mod radio;
mod relay;
mod telemetry;

use config::Config;
use radio::serial::SerialTransceiver;
use radio::{RadioParams, SharedTransceiver, TransceiverPort};
use relay::receive::ReceiveLoop;
use relay::transmit::TransmitScheduler;
use telemetry::jsonl::JsonlTelemetrySink;
use telemetry::{TelemetrySink, TracingIndicator, TracingTelemetrySink};

/// Config file used when none is given on the command line
const DEFAULT_CONFIG_PATH: &str = "config/default.toml";

/// Main entry point for the PVM Relay gateway
///
/// # Control Flow
///
/// 1. **Initialization**
///    - Set up logging with tracing subscriber
///    - Load TOML configuration (or defaults when no file exists)
///    - Open the radio modem and push the PVM modulation parameters
///
/// 2. **Steady state**
///    - Receive loop listens for frames and routes decoded readings
///    - Optional transmit scheduler sends periodic test frames,
///      serialized against the receive loop by the shared radio lock
///
/// 3. **Shutdown**
///    - Ctrl+C raises the cooperative stop signal
///    - Both tasks observe it and drain cleanly
///
/// # Errors
///
/// Returns an error if the radio modem cannot be opened or configured,
/// or if the receive loop faults on an unrecoverable driver error.
#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    info!("PVM Relay v{} starting...", env!("CARGO_PKG_VERSION"));

    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_string());
    let config = if Path::new(&config_path).exists() {
        info!("Loading configuration from {}", config_path);
        Config::load(&config_path)?
    } else {
        warn!("No config file at {}, using defaults", config_path);
        Config::default()
    };

    // Open and configure the radio before anything may touch it
    let mut port = SerialTransceiver::open(&config.serial.port, config.serial.baud_rate)?;
    port.configure(&RadioParams::from(&config.radio)).await?;
    let radio: SharedTransceiver = Arc::new(Mutex::new(port));

    let telemetry: Box<dyn TelemetrySink> = if config.telemetry.enabled {
        Box::new(JsonlTelemetrySink::create(
            &config.telemetry.log_dir,
            config.telemetry.max_records_per_file,
            config.telemetry.max_files_to_keep,
        )?)
    } else {
        Box::new(TracingTelemetrySink)
    };

    let (stop_tx, stop_rx) = watch::channel(false);

    let receive_loop = ReceiveLoop::new(
        radio.clone(),
        telemetry,
        Box::new(TracingIndicator),
        Duration::from_millis(config.receive.timeout_ms),
        config.receive.status_interval_packets,
        stop_rx.clone(),
    );
    let mut receive_task = tokio::spawn(receive_loop.run());

    let transmit_task = if config.transmit.enabled {
        let scheduler = TransmitScheduler::new(
            radio.clone(),
            config.transmit.device_id,
            Duration::from_secs(config.transmit.interval_s),
            stop_rx,
        );
        Some(tokio::spawn(scheduler.run()))
    } else {
        None
    };

    info!("Press Ctrl+C to exit");

    tokio::select! {
        // The receive loop only returns early on a driver fault
        result = &mut receive_task => {
            if let Some(task) = transmit_task {
                let _ = stop_tx.send(true);
                let _ = task.await;
            }
            return Ok(result??);
        }

        _ = tokio::signal::ctrl_c() => {
            info!("Received Ctrl+C, shutting down...");
            let _ = stop_tx.send(true);
        }
    }

    receive_task.await??;
    if let Some(task) = transmit_task {
        task.await?;
    }

    info!("Shutdown complete");
    Ok(())
}
