//! # Relay Module
//!
//! The two long-running tasks sharing the radio: the receive/dispatch
//! loop and the optional periodic test transmitter.

pub mod receive;
pub mod transmit;

use chrono::Local;

use crate::packet::protocol::TIMESTAMP_FORMAT;

/// Current local time in the PVM packet timestamp format
pub fn pvm_timestamp_now() -> String {
    Local::now().format(TIMESTAMP_FORMAT).to_string()
}
