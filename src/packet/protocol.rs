//! # PVM Protocol Constants and Types
//!
//! Core definitions for the PVM transponder wire format.

/// Total frame size in bytes (header + payload + timestamp + CRC)
pub const PACKET_SIZE: usize = 126;

/// Fixed payload field size in bytes
pub const PAYLOAD_SIZE: usize = 100;

/// Fixed timestamp field size in bytes
pub const TIMESTAMP_SIZE: usize = 20;

/// Number of bytes covered by the CRC (everything before the CRC field)
pub const CRC_COVERED_SIZE: usize = PACKET_SIZE - 2;

/// Byte offset of the payload field
pub const PAYLOAD_OFFSET: usize = 4;

/// Byte offset of the timestamp field
pub const TIMESTAMP_OFFSET: usize = PAYLOAD_OFFSET + PAYLOAD_SIZE;

/// GPS packet type byte
pub const PACKET_TYPE_GPS: u8 = 0x01;

/// SOS packet type byte
pub const PACKET_TYPE_SOS: u8 = 0x02;

/// Keepalive packet type byte
pub const PACKET_TYPE_KEEPALIVE: u8 = 0x03;

/// Timestamp format used in the 20-byte timestamp field (`DD-MM-YYYY HH:MM:SS`)
pub const TIMESTAMP_FORMAT: &str = "%d-%m-%Y %H:%M:%S";

/// Raw frame as exchanged with the transceiver (no semantic meaning until decoded)
pub type RawFrame = [u8; PACKET_SIZE];

/// Packet type tag from the wire
///
/// Closed enum: unrecognized type bytes are preserved in `Unknown` so the
/// dispatcher can log the raw value before dropping the frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PacketType {
    Gps,
    Sos,
    KeepAlive,
    Unknown(u8),
}

impl From<u8> for PacketType {
    fn from(byte: u8) -> Self {
        match byte {
            PACKET_TYPE_GPS => PacketType::Gps,
            PACKET_TYPE_SOS => PacketType::Sos,
            PACKET_TYPE_KEEPALIVE => PacketType::KeepAlive,
            other => PacketType::Unknown(other),
        }
    }
}

impl PacketType {
    /// Wire byte for this packet type
    pub fn as_byte(&self) -> u8 {
        match self {
            PacketType::Gps => PACKET_TYPE_GPS,
            PacketType::Sos => PACKET_TYPE_SOS,
            PacketType::KeepAlive => PACKET_TYPE_KEEPALIVE,
            PacketType::Unknown(other) => *other,
        }
    }

    /// Human-readable name for log lines
    pub fn name(&self) -> &'static str {
        match self {
            PacketType::Gps => "GPS",
            PacketType::Sos => "SOS",
            PacketType::KeepAlive => "KEEPALIVE",
            PacketType::Unknown(_) => "UNKNOWN",
        }
    }
}

/// Fixed header fields of a PVM packet
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PacketHeader {
    /// Originating transponder ID
    pub device_id: u16,

    /// Packet type tag
    pub packet_type: PacketType,

    /// Urgency level; meaningful for SOS packets only
    pub priority: u8,
}

/// A decoded PVM packet
///
/// Constructed transiently per frame; never mutated after decode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Packet {
    pub header: PacketHeader,

    /// Payload text with trailing zero padding stripped
    pub payload: String,

    /// Timestamp text (`DD-MM-YYYY HH:MM:SS`) with padding stripped
    pub timestamp: String,

    /// CRC as received on the wire
    pub crc: u16,
}

/// GPS fix extracted from a GPS packet payload
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GpsReading {
    /// Latitude in degrees
    pub lat: f64,

    /// Longitude in degrees
    pub lon: f64,

    /// Altitude in meters, if the transponder reported one
    pub alt: Option<f64>,
}

/// Distress event extracted from an SOS packet
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SosEvent {
    pub device_id: u16,
    pub priority: u8,
    pub timestamp: String,
}

/// Liveness marker extracted from a KEEPALIVE packet
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeepAlive {
    pub device_id: u16,
    pub timestamp: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout_constants() {
        assert_eq!(PACKET_SIZE, 126);
        assert_eq!(PAYLOAD_SIZE, 100);
        assert_eq!(TIMESTAMP_SIZE, 20);
        assert_eq!(CRC_COVERED_SIZE, 124);

        // Header(4) + payload(100) + timestamp(20) + crc(2) must tile the frame
        assert_eq!(PAYLOAD_OFFSET + PAYLOAD_SIZE + TIMESTAMP_SIZE + 2, PACKET_SIZE);
        assert_eq!(TIMESTAMP_OFFSET, 104);
    }

    #[test]
    fn test_packet_type_from_byte() {
        assert_eq!(PacketType::from(0x01), PacketType::Gps);
        assert_eq!(PacketType::from(0x02), PacketType::Sos);
        assert_eq!(PacketType::from(0x03), PacketType::KeepAlive);
        assert_eq!(PacketType::from(0x09), PacketType::Unknown(0x09));
        assert_eq!(PacketType::from(0x00), PacketType::Unknown(0x00));
    }

    #[test]
    fn test_packet_type_round_trip() {
        for byte in 0u8..=255 {
            assert_eq!(PacketType::from(byte).as_byte(), byte);
        }
    }

    #[test]
    fn test_packet_type_names() {
        assert_eq!(PacketType::Gps.name(), "GPS");
        assert_eq!(PacketType::Sos.name(), "SOS");
        assert_eq!(PacketType::KeepAlive.name(), "KEEPALIVE");
        assert_eq!(PacketType::Unknown(0xFF).name(), "UNKNOWN");
    }
}
