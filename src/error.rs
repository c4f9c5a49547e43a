//! # Error Types
//!
//! Custom error types for PVM Relay using `thiserror`.
//!
//! The taxonomy mirrors the failure policy: everything in [`DecodeError`]
//! is recoverable (log, drop the frame, keep listening), while
//! [`DriverError`] from the transceiver escalates and faults the loop.

use thiserror::Error;

use crate::packet::protocol::PACKET_SIZE;

/// Recoverable per-frame failures from the codec and payload interpreter
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DecodeError {
    /// Frame is not exactly 126 bytes; nothing is parsed
    #[error("invalid frame length: {0} bytes (expected {PACKET_SIZE})")]
    InvalidLength(usize),

    /// Checksum over bytes 0..124 does not match the trailing CRC field
    ///
    /// Both values are carried for diagnostics; the frame is dropped.
    #[error("CRC mismatch: computed 0x{computed:04X}, received 0x{received:04X}")]
    CrcMismatch { computed: u16, received: u16 },

    /// A fixed-width text field is not valid UTF-8 after stripping padding
    #[error("malformed {field} text field")]
    MalformedText { field: &'static str },

    /// GPS payload did not parse as `"lat,lon"` or `"lat,lon,alt"`
    #[error("malformed GPS payload: {0:?}")]
    MalformedGpsPayload(String),

    /// Packet type byte outside the known set
    #[error("unknown packet type: 0x{0:02X}")]
    UnknownPacketType(u8),
}

/// Faults reported by a transceiver backend
#[derive(Debug, Error)]
pub enum DriverError {
    /// The radio device could not be opened
    #[error("failed to open transceiver at {path}: {reason}")]
    Open { path: String, reason: String },

    /// Radio parameters rejected by the backend
    #[error("unsupported radio parameters: {0}")]
    Parameters(String),

    /// I/O failure talking to the radio
    #[error("transceiver I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Top-level error type for PVM Relay
#[derive(Debug, Error)]
pub enum RelayError {
    /// Transceiver fault that terminated a loop
    #[error("transceiver driver error: {0}")]
    Driver(#[from] DriverError),

    /// Configuration errors
    #[error("configuration error: {0}")]
    Config(#[from] toml::de::Error),

    /// Telemetry sink failure
    #[error("telemetry sink error: {0}")]
    Sink(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for PVM Relay
pub type Result<T> = std::result::Result<T, RelayError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_crc_mismatch_surfaces_both_values() {
        let err = DecodeError::CrcMismatch { computed: 0xBB3D, received: 0x0001 };
        let msg = err.to_string();
        assert!(msg.contains("0xBB3D"));
        assert!(msg.contains("0x0001"));
    }

    #[test]
    fn test_invalid_length_names_expected_size() {
        let msg = DecodeError::InvalidLength(64).to_string();
        assert!(msg.contains("64"));
        assert!(msg.contains("126"));
    }

    #[test]
    fn test_unknown_packet_type_is_hex() {
        let msg = DecodeError::UnknownPacketType(0x09).to_string();
        assert!(msg.contains("0x09"));
    }
}
