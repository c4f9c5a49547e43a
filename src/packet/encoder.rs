//! # PVM Frame Encoder
//!
//! Serializes a packet header plus text fields into the fixed 126-byte
//! wire frame and appends the CRC.

use super::crc::crc16;
use super::protocol::*;

/// Encode a PVM frame
///
/// Fields are serialized little-endian with no alignment padding. Payload
/// and timestamp text are truncated to their fixed capacity (100 and 20
/// bytes) and zero-padded when shorter. The CRC-16 over the first 124
/// bytes is appended as the final two bytes.
///
/// # Arguments
///
/// * `header` - Device ID, packet type and priority
/// * `payload` - Payload text (e.g. `"12.34,56.78"` for GPS)
/// * `timestamp` - Timestamp text in `DD-MM-YYYY HH:MM:SS` format
///
/// # Returns
///
/// * `RawFrame` - Complete 126-byte frame ready to transmit
pub fn encode(header: &PacketHeader, payload: &str, timestamp: &str) -> RawFrame {
    let mut frame = [0u8; PACKET_SIZE];

    frame[0..2].copy_from_slice(&header.device_id.to_le_bytes());
    frame[2] = header.packet_type.as_byte();
    frame[3] = header.priority;

    write_text_field(&mut frame[PAYLOAD_OFFSET..PAYLOAD_OFFSET + PAYLOAD_SIZE], payload);
    write_text_field(
        &mut frame[TIMESTAMP_OFFSET..TIMESTAMP_OFFSET + TIMESTAMP_SIZE],
        timestamp,
    );

    let crc = crc16(&frame[..CRC_COVERED_SIZE]);
    frame[CRC_COVERED_SIZE..].copy_from_slice(&crc.to_le_bytes());

    frame
}

/// Copy text into a fixed-width field, truncating or zero-padding as needed
///
/// The destination is assumed zeroed; only the text bytes are written.
fn write_text_field(dest: &mut [u8], text: &str) {
    let bytes = text.as_bytes();
    let len = bytes.len().min(dest.len());
    dest[..len].copy_from_slice(&bytes[..len]);
}
