//! # Receive Dispatch Loop
//!
//! Continuous polling loop that owns the listening side of the radio:
//! take the radio lock, wait for a frame (bounded by a timeout), decode,
//! interpret and route. Per-frame failures are logged and dropped; the
//! protocol is stateless, so a corrupted frame is never retried — the
//! transponder resends periodically. Only a driver fault ends the loop.

use std::time::Duration;

use tokio::sync::watch;
use tracing::{debug, error, info, warn};

use crate::error::{DecodeError, Result};
use crate::packet::decoder::decode;
use crate::packet::interpreter::{interpret, Reading};
use crate::packet::protocol::RawFrame;
use crate::radio::SharedTransceiver;
use crate::telemetry::{IndicatorSink, TelemetrySink};

/// Loop state, for log visibility
///
/// `Faulted` is terminal; every other state cycles back to `Listening`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LoopState {
    Idle,
    Listening,
    Decoding,
    Routing,
    Faulted,
}

/// Receive/dispatch loop
pub struct ReceiveLoop {
    radio: SharedTransceiver,
    telemetry: Box<dyn TelemetrySink>,
    indicator: Box<dyn IndicatorSink>,
    receive_timeout: Duration,
    status_interval_packets: u64,
    stop: watch::Receiver<bool>,
    state: LoopState,
    packets_routed: u64,
}

impl ReceiveLoop {
    pub fn new(
        radio: SharedTransceiver,
        telemetry: Box<dyn TelemetrySink>,
        indicator: Box<dyn IndicatorSink>,
        receive_timeout: Duration,
        status_interval_packets: u64,
        stop: watch::Receiver<bool>,
    ) -> Self {
        Self {
            radio,
            telemetry,
            indicator,
            receive_timeout,
            status_interval_packets,
            stop,
            state: LoopState::Idle,
            packets_routed: 0,
        }
    }

    /// Run until stopped or faulted
    ///
    /// Returns `Ok(())` on a cooperative stop. A [`crate::error::DriverError`]
    /// from the transceiver transitions to `Faulted` and propagates to the
    /// caller, who decides whether to reinitialize or terminate.
    pub async fn run(mut self) -> Result<()> {
        info!("Listening for packets...");
        self.set_state(LoopState::Listening);

        loop {
            // Stop signal is checked once per cycle, between receive calls
            if *self.stop.borrow() {
                info!(
                    "Receive loop stopped (total packets: {})",
                    self.packets_routed
                );
                return Ok(());
            }

            let received = {
                let mut radio = self.radio.lock().await;
                radio.receive(self.receive_timeout).await
            };

            let frame = match received {
                Ok(Some(frame)) => frame,
                // Timeout: the channel is idle, keep listening
                Ok(None) => continue,
                Err(e) => {
                    self.set_state(LoopState::Faulted);
                    error!("Transceiver fault, receive loop exiting: {}", e);
                    return Err(e.into());
                }
            };

            // Decode and route are pure computation; the radio lock is
            // already released
            self.set_state(LoopState::Decoding);
            self.handle_frame(&frame);
            self.set_state(LoopState::Listening);
        }
    }

    fn handle_frame(&mut self, frame: &RawFrame) {
        let packet = match decode(frame.as_slice()) {
            Ok(packet) => packet,
            Err(DecodeError::CrcMismatch { computed, received }) => {
                warn!(
                    "Dropping frame: CRC mismatch (computed 0x{:04X}, received 0x{:04X})",
                    computed, received
                );
                return;
            }
            Err(e) => {
                warn!("Dropping frame: {}", e);
                return;
            }
        };

        debug!(
            "Packet from device {} type {} priority {}",
            packet.header.device_id,
            packet.header.packet_type.name(),
            packet.header.priority,
        );

        let reading = match interpret(&packet) {
            Ok(reading) => reading,
            Err(e) => {
                warn!(
                    "Dropping packet from device {}: {}",
                    packet.header.device_id, e
                );
                return;
            }
        };

        self.set_state(LoopState::Routing);
        self.route(reading);

        self.packets_routed += 1;
        if self.packets_routed % self.status_interval_packets == 0 {
            info!("Routed {} packets", self.packets_routed);
        }
    }

    fn route(&mut self, reading: Reading) {
        match reading {
            Reading::Gps {
                device_id,
                reading,
                timestamp,
            } => {
                if let Err(e) = self.telemetry.write_gps(device_id, &reading, &timestamp) {
                    warn!("Telemetry sink rejected GPS fix: {}", e);
                }
                self.indicator.signal_received();
            }
            Reading::Sos(event) => {
                if let Err(e) = self.telemetry.write_sos(&event) {
                    warn!("Telemetry sink rejected SOS event: {}", e);
                }
                self.indicator.signal_received();
                self.indicator.signal_distress();
            }
            Reading::KeepAlive(keepalive) => {
                if let Err(e) = self.telemetry.write_keepalive(&keepalive) {
                    warn!("Telemetry sink rejected keepalive: {}", e);
                }
                self.indicator.signal_received();
            }
        }
    }

    fn set_state(&mut self, state: LoopState) {
        if state != self.state {
            debug!("Receive loop state: {:?} -> {:?}", self.state, state);
            self.state = state;
        }
    }
}
