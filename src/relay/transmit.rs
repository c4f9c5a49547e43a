//! # Transmit Scheduler
//!
//! Optional test/dev aid: periodically encodes a synthetic packet for a
//! configured device id and pushes it out through the shared radio lock.
//! A firing that coincides with an in-progress receive waits for the lock
//! instead of stealing the radio mid-frame.

use std::time::Duration;

use tokio::sync::watch;
use tokio::time::interval;
use tracing::{debug, info, warn};

use super::pvm_timestamp_now;
use crate::packet::encoder::encode;
use crate::packet::protocol::{PacketHeader, PacketType, RawFrame};
use crate::radio::SharedTransceiver;

/// Payload carried by synthetic test frames
const TEST_PAYLOAD: &str = "DUMMY DATA";

/// Priority stamped on synthetic test frames
const TEST_PRIORITY: u8 = 2;

/// Periodic test-frame transmitter
pub struct TransmitScheduler {
    radio: SharedTransceiver,
    device_id: u16,
    period: Duration,
    stop: watch::Receiver<bool>,
}

impl TransmitScheduler {
    pub fn new(
        radio: SharedTransceiver,
        device_id: u16,
        period: Duration,
        stop: watch::Receiver<bool>,
    ) -> Self {
        Self {
            radio,
            device_id,
            period,
            stop,
        }
    }

    /// Build one synthetic test frame stamped with the current local time
    pub fn build_test_frame(device_id: u16) -> RawFrame {
        encode(
            &PacketHeader {
                device_id,
                packet_type: PacketType::Gps,
                priority: TEST_PRIORITY,
            },
            TEST_PAYLOAD,
            &pvm_timestamp_now(),
        )
    }

    /// Run until stopped
    ///
    /// Transmit failures are logged and never fatal; the scheduler simply
    /// tries again on the next firing.
    pub async fn run(mut self) {
        info!(
            "Periodic TX enabled (every {:?}, device ID: {})",
            self.period, self.device_id
        );

        let mut ticker = interval(self.period);
        let mut sent: u64 = 0;

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    let frame = Self::build_test_frame(self.device_id);

                    let mut radio = self.radio.lock().await;
                    match radio.transmit(&frame).await {
                        Ok(()) => {
                            sent += 1;
                            debug!("TX #{} ({} bytes)", sent, frame.len());
                        }
                        Err(e) => warn!("Test transmission failed: {}", e),
                    }
                }

                changed = self.stop.changed() => {
                    if changed.is_err() || *self.stop.borrow() {
                        info!("Transmit scheduler stopped (total sent: {})", sent);
                        return;
                    }
                }
            }
        }
    }
}
