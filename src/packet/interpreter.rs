//! # Payload Interpreter
//!
//! Converts a decoded [`Packet`] into a typed reading according to its
//! packet type: GPS payloads are parsed as coordinates, SOS and keepalive
//! packets are taken verbatim from the header fields.

use super::protocol::*;
use crate::error::DecodeError;

/// Typed result of interpreting a packet
#[derive(Debug, Clone, PartialEq)]
pub enum Reading {
    /// GPS fix with the originating device and packet timestamp attached
    Gps {
        device_id: u16,
        reading: GpsReading,
        timestamp: String,
    },

    /// Distress event
    Sos(SosEvent),

    /// Liveness marker
    KeepAlive(KeepAlive),
}

/// Interpret a decoded packet by its type tag
///
/// # Errors
///
/// * [`DecodeError::MalformedGpsPayload`] for a GPS packet whose payload
///   is not 2 or 3 comma-separated floats
/// * [`DecodeError::UnknownPacketType`] for an unrecognized type byte;
///   caller policy is to log and drop, never to propagate as fatal
pub fn interpret(packet: &Packet) -> Result<Reading, DecodeError> {
    match packet.header.packet_type {
        PacketType::Gps => Ok(Reading::Gps {
            device_id: packet.header.device_id,
            reading: parse_gps_payload(&packet.payload)?,
            timestamp: packet.timestamp.clone(),
        }),
        PacketType::Sos => Ok(Reading::Sos(SosEvent {
            device_id: packet.header.device_id,
            priority: packet.header.priority,
            timestamp: packet.timestamp.clone(),
        })),
        PacketType::KeepAlive => Ok(Reading::KeepAlive(KeepAlive {
            device_id: packet.header.device_id,
            timestamp: packet.timestamp.clone(),
        })),
        PacketType::Unknown(byte) => Err(DecodeError::UnknownPacketType(byte)),
    }
}

/// Parse a GPS payload of the form `"lat,lon"` or `"lat,lon,alt"`
fn parse_gps_payload(payload: &str) -> Result<GpsReading, DecodeError> {
    let malformed = || DecodeError::MalformedGpsPayload(payload.to_owned());

    let fields: Vec<&str> = payload.split(',').collect();
    if fields.len() != 2 && fields.len() != 3 {
        return Err(malformed());
    }

    let lat: f64 = fields[0].trim().parse().map_err(|_| malformed())?;
    let lon: f64 = fields[1].trim().parse().map_err(|_| malformed())?;
    let alt = match fields.get(2) {
        Some(field) => Some(field.trim().parse::<f64>().map_err(|_| malformed())?),
        None => None,
    };

    Ok(GpsReading { lat, lon, alt })
}
