//! # PVM Packet Module
//!
//! Implementation of the PVM transponder wire protocol.
//!
//! This module handles:
//! - Frame encoding and decoding (126-byte fixed layout, little-endian)
//! - CRC-16 checksum calculation and verification
//! - Payload interpretation (GPS coordinates, SOS events, keepalives)

pub mod protocol;
pub mod crc;
pub mod encoder;
pub mod decoder;
pub mod interpreter;
