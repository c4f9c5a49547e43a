//! # PVM Frame Decoder
//!
//! Validates and parses received 126-byte frames.
//!
//! Decoding is strict: wrong length or a CRC mismatch rejects the frame
//! before any field is parsed, and the fixed-width text fields must be
//! valid UTF-8 once trailing zero padding is stripped. The transponder
//! firmware only ever pads with zeros, so a non-UTF-8 byte means
//! corruption the CRC happened to miss.

use super::crc::crc16;
use super::protocol::*;
use crate::error::DecodeError;

/// Decode a received frame into a [`Packet`]
///
/// # Arguments
///
/// * `frame` - Raw bytes as handed over by the transceiver
///
/// # Errors
///
/// * [`DecodeError::InvalidLength`] if `frame` is not exactly 126 bytes
/// * [`DecodeError::CrcMismatch`] if the checksum over bytes 0..124 does
///   not match the trailing little-endian CRC field; both values are
///   carried for diagnostics
/// * [`DecodeError::MalformedText`] if a text field is not valid UTF-8
///   after stripping padding
pub fn decode(frame: &[u8]) -> Result<Packet, DecodeError> {
    if frame.len() != PACKET_SIZE {
        return Err(DecodeError::InvalidLength(frame.len()));
    }

    let received = u16::from_le_bytes([frame[CRC_COVERED_SIZE], frame[CRC_COVERED_SIZE + 1]]);
    let computed = crc16(&frame[..CRC_COVERED_SIZE]);
    if computed != received {
        return Err(DecodeError::CrcMismatch { computed, received });
    }

    let device_id = u16::from_le_bytes([frame[0], frame[1]]);
    let packet_type = PacketType::from(frame[2]);
    let priority = frame[3];

    let payload = decode_text_field(
        &frame[PAYLOAD_OFFSET..PAYLOAD_OFFSET + PAYLOAD_SIZE],
        "payload",
    )?;
    let timestamp = decode_text_field(
        &frame[TIMESTAMP_OFFSET..TIMESTAMP_OFFSET + TIMESTAMP_SIZE],
        "timestamp",
    )?;

    Ok(Packet {
        header: PacketHeader {
            device_id,
            packet_type,
            priority,
        },
        payload,
        timestamp,
        crc: received,
    })
}

/// Strip trailing zero padding and decode the remainder as UTF-8
fn decode_text_field(field: &[u8], name: &'static str) -> Result<String, DecodeError> {
    let end = field
        .iter()
        .rposition(|&b| b != 0)
        .map_or(0, |pos| pos + 1);

    std::str::from_utf8(&field[..end])
        .map(str::to_owned)
        .map_err(|_| DecodeError::MalformedText { field: name })
}
