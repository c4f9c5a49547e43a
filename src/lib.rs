//! # PVM Relay Library
//!
//! Host-side gateway for the PVM vessel transponder network.
//!
//! This library provides the protocol core for relaying fixed-size
//! telemetry packets received over a long-range radio link: frame
//! codec with CRC-16 integrity checking, packet-type dispatch
//! (GPS / SOS / keepalive) and the receive/transmit coordination that
//! shares one half-duplex radio between both directions.

pub mod config;
pub mod error;
pub mod packet;
pub mod radio;
pub mod relay;
pub mod telemetry;
