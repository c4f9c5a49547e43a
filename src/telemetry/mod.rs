//! # Telemetry Module
//!
//! Sink interfaces the dispatch loop routes typed readings into.
//!
//! This module handles:
//! - The `TelemetrySink` trait (GPS fixes and SOS events)
//! - The `IndicatorSink` trait (operator-facing receive/distress signals)
//! - Tracing-backed implementations for headless deployments
//! - A JSONL file sink with rotation (see [`jsonl`])

pub mod jsonl;

use tracing::{info, warn};

use crate::error::Result;
use crate::packet::protocol::{GpsReading, KeepAlive, SosEvent};

/// Destination for typed telemetry readings
///
/// Implementations are external to the protocol core (time-series store,
/// file log, ...). Keepalives are sink-optional; the default discards
/// them.
pub trait TelemetrySink: Send {
    /// Record a GPS fix
    fn write_gps(&mut self, device_id: u16, reading: &GpsReading, timestamp: &str) -> Result<()>;

    /// Record a distress event
    fn write_sos(&mut self, event: &SosEvent) -> Result<()>;

    /// Record a liveness marker (optional)
    fn write_keepalive(&mut self, _keepalive: &KeepAlive) -> Result<()> {
        Ok(())
    }
}

/// Operator-facing indication of link activity
pub trait IndicatorSink: Send {
    /// A valid packet was received and routed
    fn signal_received(&mut self);

    /// A distress packet was received (in addition to `signal_received`)
    fn signal_distress(&mut self);
}

/// Telemetry sink that emits log lines instead of persisting anything
///
/// Used when the JSONL sink is disabled in config.
pub struct TracingTelemetrySink;

impl TelemetrySink for TracingTelemetrySink {
    fn write_gps(&mut self, device_id: u16, reading: &GpsReading, timestamp: &str) -> Result<()> {
        info!(
            device_id,
            lat = reading.lat,
            lon = reading.lon,
            alt = reading.alt,
            timestamp,
            "GPS fix"
        );
        Ok(())
    }

    fn write_sos(&mut self, event: &SosEvent) -> Result<()> {
        warn!(
            device_id = event.device_id,
            priority = event.priority,
            timestamp = %event.timestamp,
            "SOS event"
        );
        Ok(())
    }
}

/// Indicator backed by log lines
///
/// The deployed gateway drives LEDs through an external GPIO service;
/// this stand-in keeps the same signal semantics visible in the journal.
pub struct TracingIndicator;

impl IndicatorSink for TracingIndicator {
    fn signal_received(&mut self) {
        tracing::debug!("packet received");
    }

    fn signal_distress(&mut self) {
        warn!("DISTRESS indicator raised");
    }
}
