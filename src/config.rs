//! # Configuration Module
//!
//! Handles loading and validating configuration from TOML files.

use serde::de::Error;
use serde::Deserialize;
use std::fs;
use std::path::Path;

use crate::error::{RelayError, Result};
use crate::radio::{self, RadioParams};

/// Main configuration structure
#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub serial: SerialConfig,

    #[serde(default)]
    pub radio: RadioConfig,

    #[serde(default)]
    pub receive: ReceiveConfig,

    #[serde(default)]
    pub transmit: TransmitConfig,

    #[serde(default)]
    pub telemetry: TelemetryConfig,
}

/// Serial link to the radio modem
#[derive(Debug, Deserialize, Clone)]
pub struct SerialConfig {
    #[serde(default = "default_serial_port")]
    pub port: String,

    #[serde(default = "default_baud_rate")]
    pub baud_rate: u32,
}

/// Radio modulation parameters (must match the transponders)
#[derive(Debug, Deserialize, Clone)]
pub struct RadioConfig {
    #[serde(default = "default_frequency_mhz")]
    pub frequency_mhz: f64,

    #[serde(default = "default_spreading_factor")]
    pub spreading_factor: u8,

    #[serde(default = "default_bandwidth_khz")]
    pub bandwidth_khz: u32,

    #[serde(default = "default_coding_rate_denominator")]
    pub coding_rate_denominator: u8,

    #[serde(default = "default_sync_word")]
    pub sync_word: u8,
}

/// Receive loop tuning
#[derive(Debug, Deserialize, Clone)]
pub struct ReceiveConfig {
    #[serde(default = "default_receive_timeout_ms")]
    pub timeout_ms: u64,

    #[serde(default = "default_status_interval_packets")]
    pub status_interval_packets: u64,
}

/// Periodic test transmitter (disabled by default)
#[derive(Debug, Deserialize, Clone)]
pub struct TransmitConfig {
    #[serde(default)]
    pub enabled: bool,

    #[serde(default = "default_tx_device_id")]
    pub device_id: u16,

    #[serde(default = "default_tx_interval_s")]
    pub interval_s: u64,
}

/// JSONL telemetry log
#[derive(Debug, Deserialize, Clone)]
pub struct TelemetryConfig {
    #[serde(default = "default_telemetry_enabled")]
    pub enabled: bool,

    #[serde(default = "default_log_dir")]
    pub log_dir: String,

    #[serde(default = "default_max_records_per_file")]
    pub max_records_per_file: usize,

    #[serde(default = "default_max_files_to_keep")]
    pub max_files_to_keep: usize,
}

// Default value functions
fn default_serial_port() -> String { "/dev/ttyUSB0".to_string() }
fn default_baud_rate() -> u32 { radio::serial::DEFAULT_BAUD_RATE }

fn default_frequency_mhz() -> f64 { radio::DEFAULT_FREQUENCY_MHZ }
fn default_spreading_factor() -> u8 { radio::DEFAULT_SPREADING_FACTOR }
fn default_bandwidth_khz() -> u32 { radio::DEFAULT_BANDWIDTH_KHZ }
fn default_coding_rate_denominator() -> u8 { radio::DEFAULT_CODING_RATE_DENOMINATOR }
fn default_sync_word() -> u8 { radio::DEFAULT_SYNC_WORD }

fn default_receive_timeout_ms() -> u64 { 500 }
fn default_status_interval_packets() -> u64 { 100 }

fn default_tx_device_id() -> u16 { 10010 }
fn default_tx_interval_s() -> u64 { 20 }

fn default_telemetry_enabled() -> bool { true }
fn default_log_dir() -> String { "./logs".to_string() }
fn default_max_records_per_file() -> usize { 10000 }
fn default_max_files_to_keep() -> usize { 10 }

impl Default for SerialConfig {
    fn default() -> Self {
        Self {
            port: default_serial_port(),
            baud_rate: default_baud_rate(),
        }
    }
}

impl Default for RadioConfig {
    fn default() -> Self {
        Self {
            frequency_mhz: default_frequency_mhz(),
            spreading_factor: default_spreading_factor(),
            bandwidth_khz: default_bandwidth_khz(),
            coding_rate_denominator: default_coding_rate_denominator(),
            sync_word: default_sync_word(),
        }
    }
}

impl Default for ReceiveConfig {
    fn default() -> Self {
        Self {
            timeout_ms: default_receive_timeout_ms(),
            status_interval_packets: default_status_interval_packets(),
        }
    }
}

impl Default for TransmitConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            device_id: default_tx_device_id(),
            interval_s: default_tx_interval_s(),
        }
    }
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            enabled: default_telemetry_enabled(),
            log_dir: default_log_dir(),
            max_records_per_file: default_max_records_per_file(),
            max_files_to_keep: default_max_files_to_keep(),
        }
    }
}

impl From<&RadioConfig> for RadioParams {
    fn from(config: &RadioConfig) -> Self {
        Self {
            frequency_mhz: config.frequency_mhz,
            spreading_factor: config.spreading_factor,
            bandwidth_khz: config.bandwidth_khz,
            coding_rate_denominator: config.coding_rate_denominator,
            sync_word: config.sync_word,
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    ///
    /// # Errors
    ///
    /// Returns error if the file cannot be read, TOML parsing fails or
    /// validation fails.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if self.serial.port.is_empty() {
            return Err(RelayError::Config(
                toml::de::Error::custom("serial port cannot be empty")
            ));
        }

        if ![9600, 19200, 38400, 57600, 115200, 230400].contains(&self.serial.baud_rate) {
            return Err(RelayError::Config(
                toml::de::Error::custom("baud_rate must be one of: 9600, 19200, 38400, 57600, 115200, 230400")
            ));
        }

        if self.radio.frequency_mhz < 137.0 || self.radio.frequency_mhz > 1020.0 {
            return Err(RelayError::Config(
                toml::de::Error::custom("frequency_mhz must be between 137 and 1020")
            ));
        }

        if self.radio.spreading_factor < 6 || self.radio.spreading_factor > 12 {
            return Err(RelayError::Config(
                toml::de::Error::custom("spreading_factor must be between 6 and 12")
            ));
        }

        if ![125, 250, 500].contains(&self.radio.bandwidth_khz) {
            return Err(RelayError::Config(
                toml::de::Error::custom("bandwidth_khz must be one of: 125, 250, 500")
            ));
        }

        if self.radio.coding_rate_denominator < 5 || self.radio.coding_rate_denominator > 8 {
            return Err(RelayError::Config(
                toml::de::Error::custom("coding_rate_denominator must be between 5 (4/5) and 8 (4/8)")
            ));
        }

        if self.receive.timeout_ms == 0 || self.receive.timeout_ms > 10000 {
            return Err(RelayError::Config(
                toml::de::Error::custom("receive timeout_ms must be between 1 and 10000")
            ));
        }

        if self.receive.status_interval_packets == 0 {
            return Err(RelayError::Config(
                toml::de::Error::custom("status_interval_packets must be greater than 0")
            ));
        }

        if self.transmit.interval_s == 0 || self.transmit.interval_s > 3600 {
            return Err(RelayError::Config(
                toml::de::Error::custom("transmit interval_s must be between 1 and 3600")
            ));
        }

        if self.telemetry.enabled && self.telemetry.log_dir.is_empty() {
            return Err(RelayError::Config(
                toml::de::Error::custom("telemetry log_dir cannot be empty when enabled")
            ));
        }

        if self.telemetry.max_records_per_file == 0 {
            return Err(RelayError::Config(
                toml::de::Error::custom("max_records_per_file must be greater than 0")
            ));
        }

        if self.telemetry.max_files_to_keep == 0 {
            return Err(RelayError::Config(
                toml::de::Error::custom("max_files_to_keep must be greater than 0")
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());

        assert_eq!(config.serial.port, "/dev/ttyUSB0");
        assert_eq!(config.radio.frequency_mhz, 433.0);
        assert_eq!(config.radio.sync_word, 0xA5);
        assert!(!config.transmit.enabled);
        assert!(config.telemetry.enabled);
    }

    #[test]
    fn test_radio_params_from_config() {
        let params = RadioParams::from(&RadioConfig::default());
        assert_eq!(params, RadioParams::default());
    }

    #[test]
    fn test_empty_serial_port() {
        let mut config = Config::default();
        config.serial.port = String::new();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_invalid_baud_rate() {
        let mut config = Config::default();
        config.serial.baud_rate = 420_000;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_frequency_out_of_range() {
        let mut config = Config::default();
        config.radio.frequency_mhz = 2400.0;
        assert!(config.validate().is_err());

        config.radio.frequency_mhz = 100.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_invalid_spreading_factor() {
        for sf in [0, 5, 13] {
            let mut config = Config::default();
            config.radio.spreading_factor = sf;
            assert!(config.validate().is_err(), "SF{} should be rejected", sf);
        }
    }

    #[test]
    fn test_valid_spreading_factors() {
        for sf in 6..=12 {
            let mut config = Config::default();
            config.radio.spreading_factor = sf;
            assert!(config.validate().is_ok(), "SF{} should be valid", sf);
        }
    }

    #[test]
    fn test_invalid_bandwidth() {
        let mut config = Config::default();
        config.radio.bandwidth_khz = 62;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_invalid_coding_rate() {
        let mut config = Config::default();
        config.radio.coding_rate_denominator = 4;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_receive_timeout_bounds() {
        let mut config = Config::default();
        config.receive.timeout_ms = 0;
        assert!(config.validate().is_err());

        config.receive.timeout_ms = 10001;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_status_interval_zero() {
        let mut config = Config::default();
        config.receive.status_interval_packets = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_transmit_interval_bounds() {
        let mut config = Config::default();
        config.transmit.interval_s = 0;
        assert!(config.validate().is_err());

        config.transmit.interval_s = 3601;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_empty_log_dir_when_enabled() {
        let mut config = Config::default();
        config.telemetry.enabled = true;
        config.telemetry.log_dir = String::new();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_empty_log_dir_when_disabled() {
        let mut config = Config::default();
        config.telemetry.enabled = false;
        config.telemetry.log_dir = String::new();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_telemetry_limits_zero() {
        let mut config = Config::default();
        config.telemetry.max_records_per_file = 0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.telemetry.max_files_to_keep = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_load_config_from_file() {
        use std::io::Write;
        use tempfile::NamedTempFile;

        let toml_content = r#"
[serial]
port = "/dev/ttyACM0"
baud_rate = 57600

[radio]
spreading_factor = 9

[transmit]
enabled = true
device_id = 10002
"#;

        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(toml_content.as_bytes()).unwrap();
        temp_file.flush().unwrap();

        let config = Config::load(temp_file.path()).unwrap();
        assert_eq!(config.serial.port, "/dev/ttyACM0");
        assert_eq!(config.serial.baud_rate, 57600);
        assert_eq!(config.radio.spreading_factor, 9);
        // Unspecified fields fall back to PVM defaults
        assert_eq!(config.radio.frequency_mhz, 433.0);
        assert!(config.transmit.enabled);
        assert_eq!(config.transmit.device_id, 10002);
    }

    #[test]
    fn test_load_rejects_invalid_file() {
        use std::io::Write;
        use tempfile::NamedTempFile;

        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file
            .write_all(b"[radio]\nspreading_factor = 99\n")
            .unwrap();
        temp_file.flush().unwrap();

        assert!(Config::load(temp_file.path()).is_err());
    }

    #[test]
    fn test_load_missing_file_is_io_error() {
        let result = Config::load("/nonexistent/pvm-relay.toml");
        assert!(matches!(result, Err(RelayError::Io(_))));
    }
}
