//! # Radio Module
//!
//! Abstract transceiver capability consumed by the protocol core.
//!
//! This module handles:
//! - The [`TransceiverPort`] trait every radio backend implements
//! - The shared lock-guarded handle serializing half-duplex access
//! - Radio modulation parameters with PVM network defaults
//! - A UART-attached radio modem backend

pub mod port;
pub mod serial;

pub use port::{SharedTransceiver, TransceiverPort};

/// Default carrier frequency in MHz (PVM network)
pub const DEFAULT_FREQUENCY_MHZ: f64 = 433.0;

/// Default spreading factor
pub const DEFAULT_SPREADING_FACTOR: u8 = 7;

/// Default bandwidth in kHz
pub const DEFAULT_BANDWIDTH_KHZ: u32 = 125;

/// Default coding rate denominator (4/5)
pub const DEFAULT_CODING_RATE_DENOMINATOR: u8 = 5;

/// Default sync word shared by all PVM transponders
pub const DEFAULT_SYNC_WORD: u8 = 0xA5;

/// Radio modulation parameters
///
/// Must match the transponder side exactly or frames are never heard.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RadioParams {
    /// Carrier frequency in MHz
    pub frequency_mhz: f64,

    /// Spreading factor (6-12)
    pub spreading_factor: u8,

    /// Bandwidth in kHz
    pub bandwidth_khz: u32,

    /// Coding rate denominator; 5 means 4/5
    pub coding_rate_denominator: u8,

    /// Network sync word
    pub sync_word: u8,
}

impl Default for RadioParams {
    fn default() -> Self {
        Self {
            frequency_mhz: DEFAULT_FREQUENCY_MHZ,
            spreading_factor: DEFAULT_SPREADING_FACTOR,
            bandwidth_khz: DEFAULT_BANDWIDTH_KHZ,
            coding_rate_denominator: DEFAULT_CODING_RATE_DENOMINATOR,
            sync_word: DEFAULT_SYNC_WORD,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pvm_defaults() {
        let params = RadioParams::default();
        assert_eq!(params.frequency_mhz, 433.0);
        assert_eq!(params.spreading_factor, 7);
        assert_eq!(params.bandwidth_khz, 125);
        assert_eq!(params.coding_rate_denominator, 5);
        assert_eq!(params.sync_word, 0xA5);
    }
}
