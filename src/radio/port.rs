//! Trait abstraction for the half-duplex transceiver.
//!
//! The physical radio cannot receive and transmit at the same time, so
//! every backend handle is shared behind one async mutex: whoever holds
//! the lock owns the radio for the duration of a single call.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Mutex;

use super::RadioParams;
use crate::error::DriverError;
use crate::packet::protocol::RawFrame;

/// Capability interface for a half-duplex radio transceiver
///
/// Implemented by hardware backends (see [`super::serial`]); the protocol
/// core only ever talks to this trait.
#[async_trait]
pub trait TransceiverPort: Send {
    /// Apply modulation parameters to the radio
    async fn configure(&mut self, params: &RadioParams) -> Result<(), DriverError>;

    /// Wait up to `timeout` for one complete frame
    ///
    /// Returns `Ok(None)` when the timeout elapses without a frame; that
    /// is the normal idle case, not an error.
    async fn receive(&mut self, timeout: Duration) -> Result<Option<RawFrame>, DriverError>;

    /// Transmit one frame
    async fn transmit(&mut self, frame: &RawFrame) -> Result<(), DriverError>;
}

/// Shared handle enforcing mutually exclusive radio access
///
/// The receive loop and the transmit scheduler both go through this lock;
/// a transmit waits out an in-progress receive rather than stealing the
/// radio mid-frame.
pub type SharedTransceiver = Arc<Mutex<dyn TransceiverPort>>;


#[cfg(test)]
mod tests {
    use super::mocks::*;
    use super::*;
    use crate::packet::protocol::PACKET_SIZE;

    #[tokio::test]
    async fn test_mock_replays_script_in_order() {
        let mock = MockTransceiver::new();
        let frame = [7u8; PACKET_SIZE];
        mock.script([ReceiveStep::Timeout, ReceiveStep::Frame(frame)]);

        let mut port = mock.clone();
        let timeout = Duration::from_millis(1);

        assert!(port.receive(timeout).await.unwrap().is_none());
        assert_eq!(port.receive(timeout).await.unwrap(), Some(frame));
        // Exhausted script keeps timing out instead of panicking
        assert!(port.receive(timeout).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_mock_records_transmissions() {
        let mock = MockTransceiver::new();
        let mut port = mock.clone();

        let frame = [3u8; PACKET_SIZE];
        port.transmit(&frame).await.unwrap();

        assert_eq!(mock.transmitted_frames(), vec![frame]);
        let spans = mock.spans();
        assert_eq!(spans.len(), 1);
        assert_eq!(spans[0].kind, CallKind::Transmit);
    }

    #[tokio::test]
    async fn test_shared_handle_is_object_safe() {
        let mock = MockTransceiver::new();
        let radio: SharedTransceiver = Arc::new(Mutex::new(mock.clone()));

        let mut guard = radio.lock().await;
        guard.configure(&RadioParams::default()).await.unwrap();
        drop(guard);

        assert_eq!(
            *mock.configured.lock().unwrap(),
            Some(RadioParams::default())
        );
    }
}
