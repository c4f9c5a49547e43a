//! # JSONL Telemetry Sink
//!
//! Writes one JSON object per routed packet to rotating `.jsonl` files.
//! The record schema carries the same fields the PVM ground station
//! stores per point: device id, priority, coordinates, SOS flag and the
//! packet's own timestamp.

use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{Local, NaiveDateTime};
use serde::Serialize;
use tracing::{debug, warn};

use super::TelemetrySink;
use crate::error::{RelayError, Result};
use crate::packet::protocol::{GpsReading, SosEvent, TIMESTAMP_FORMAT};

/// One telemetry record as serialized to a JSONL line
#[derive(Debug, Serialize)]
struct TelemetryRecord<'a> {
    kind: &'a str,
    device_id: u16,
    priority: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    latitude: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    longitude: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    altitude: Option<f64>,
    sos_signal: bool,
    /// Packet timestamp normalized to RFC 3339 when it parses, raw otherwise
    packet_time: String,
    /// Host time the record was written
    logged_at: String,
}

/// Rotating JSONL file sink
pub struct JsonlTelemetrySink {
    log_dir: PathBuf,
    max_records_per_file: usize,
    max_files_to_keep: usize,
    current_file: File,
    records_in_file: usize,
    file_seq: u32,
}

impl JsonlTelemetrySink {
    /// Create the sink, its log directory and the first log file
    pub fn create(
        log_dir: impl AsRef<Path>,
        max_records_per_file: usize,
        max_files_to_keep: usize,
    ) -> Result<Self> {
        let log_dir = log_dir.as_ref().to_path_buf();
        fs::create_dir_all(&log_dir)?;

        let current_file = Self::open_log_file(&log_dir, 0)?;

        Ok(Self {
            log_dir,
            max_records_per_file,
            max_files_to_keep,
            current_file,
            records_in_file: 0,
            file_seq: 0,
        })
    }

    fn open_log_file(dir: &Path, seq: u32) -> Result<File> {
        // Timestamp plus sequence keeps names unique and ordering
        // lexicographic even when rotations land in the same second
        let name = format!(
            "telemetry-{}-{:04}.jsonl",
            Local::now().format("%Y%m%d-%H%M%S"),
            seq,
        );
        let path = dir.join(name);
        debug!("Opening telemetry log file {}", path.display());

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)?;
        Ok(file)
    }

    fn write_record(&mut self, record: &TelemetryRecord<'_>) -> Result<()> {
        if self.records_in_file >= self.max_records_per_file {
            self.rotate()?;
        }

        let line = serde_json::to_string(record)
            .map_err(|e| RelayError::Sink(format!("record serialization failed: {}", e)))?;
        writeln!(self.current_file, "{}", line)?;
        self.records_in_file += 1;
        Ok(())
    }

    fn rotate(&mut self) -> Result<()> {
        self.current_file.flush()?;
        self.file_seq += 1;
        self.current_file = Self::open_log_file(&self.log_dir, self.file_seq)?;
        self.records_in_file = 0;
        self.prune_old_files();
        Ok(())
    }

    /// Delete the oldest log files beyond the retention limit
    ///
    /// Pruning failure only costs disk space; it is logged, not escalated.
    fn prune_old_files(&self) {
        let mut files: Vec<PathBuf> = match fs::read_dir(&self.log_dir) {
            Ok(entries) => entries
                .filter_map(|e| e.ok())
                .map(|e| e.path())
                .filter(|p| {
                    p.file_name()
                        .and_then(|n| n.to_str())
                        .map(|n| n.starts_with("telemetry-") && n.ends_with(".jsonl"))
                        .unwrap_or(false)
                })
                .collect(),
            Err(e) => {
                warn!("Failed to list telemetry log dir: {}", e);
                return;
            }
        };

        files.sort();
        while files.len() > self.max_files_to_keep {
            let oldest = files.remove(0);
            if let Err(e) = fs::remove_file(&oldest) {
                warn!("Failed to prune {}: {}", oldest.display(), e);
            }
        }
    }

    /// Normalize a PVM packet timestamp to RFC 3339; pass corrupt ones through
    fn normalize_packet_time(timestamp: &str) -> String {
        match NaiveDateTime::parse_from_str(timestamp, TIMESTAMP_FORMAT) {
            Ok(dt) => dt.format("%Y-%m-%dT%H:%M:%S").to_string(),
            Err(_) => timestamp.to_owned(),
        }
    }
}

impl TelemetrySink for JsonlTelemetrySink {
    fn write_gps(&mut self, device_id: u16, reading: &GpsReading, timestamp: &str) -> Result<()> {
        self.write_record(&TelemetryRecord {
            kind: "gps",
            device_id,
            priority: 0,
            latitude: Some(reading.lat),
            longitude: Some(reading.lon),
            altitude: reading.alt,
            sos_signal: false,
            packet_time: Self::normalize_packet_time(timestamp),
            logged_at: Local::now().to_rfc3339(),
        })
    }

    fn write_sos(&mut self, event: &SosEvent) -> Result<()> {
        self.write_record(&TelemetryRecord {
            kind: "sos",
            device_id: event.device_id,
            priority: event.priority,
            latitude: None,
            longitude: None,
            altitude: None,
            sos_signal: true,
            packet_time: Self::normalize_packet_time(&event.timestamp),
            logged_at: Local::now().to_rfc3339(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn gps_reading() -> GpsReading {
        GpsReading {
            lat: 12.34,
            lon: 56.78,
            alt: Some(3.0),
        }
    }

    fn read_all_lines(dir: &Path) -> Vec<serde_json::Value> {
        let mut files: Vec<PathBuf> = fs::read_dir(dir)
            .unwrap()
            .filter_map(|e| e.ok())
            .map(|e| e.path())
            .collect();
        files.sort();

        files
            .iter()
            .flat_map(|f| {
                fs::read_to_string(f)
                    .unwrap()
                    .lines()
                    .map(|l| serde_json::from_str(l).unwrap())
                    .collect::<Vec<_>>()
            })
            .collect()
    }

    #[test]
    fn test_writes_gps_record() {
        let dir = TempDir::new().unwrap();
        let mut sink = JsonlTelemetrySink::create(dir.path(), 100, 5).unwrap();

        sink.write_gps(10010, &gps_reading(), "21-08-2026 14:03:00")
            .unwrap();
        drop(sink);

        let records = read_all_lines(dir.path());
        assert_eq!(records.len(), 1);
        assert_eq!(records[0]["kind"], "gps");
        assert_eq!(records[0]["device_id"], 10010);
        assert_eq!(records[0]["latitude"], 12.34);
        assert_eq!(records[0]["longitude"], 56.78);
        assert_eq!(records[0]["altitude"], 3.0);
        assert_eq!(records[0]["sos_signal"], false);
        assert_eq!(records[0]["packet_time"], "2026-08-21T14:03:00");
    }

    #[test]
    fn test_writes_sos_record() {
        let dir = TempDir::new().unwrap();
        let mut sink = JsonlTelemetrySink::create(dir.path(), 100, 5).unwrap();

        sink.write_sos(&SosEvent {
            device_id: 7,
            priority: 9,
            timestamp: "21-08-2026 14:03:00".to_owned(),
        })
        .unwrap();
        drop(sink);

        let records = read_all_lines(dir.path());
        assert_eq!(records.len(), 1);
        assert_eq!(records[0]["kind"], "sos");
        assert_eq!(records[0]["priority"], 9);
        assert_eq!(records[0]["sos_signal"], true);
        // GPS fields are omitted entirely for SOS records
        assert!(records[0].get("latitude").is_none());
    }

    #[test]
    fn test_unparseable_packet_time_passes_through() {
        assert_eq!(
            JsonlTelemetrySink::normalize_packet_time("not a date"),
            "not a date"
        );
    }

    #[test]
    fn test_rotation_creates_new_files() {
        let dir = TempDir::new().unwrap();
        let mut sink = JsonlTelemetrySink::create(dir.path(), 2, 10).unwrap();

        for i in 0..5 {
            sink.write_gps(i, &gps_reading(), "21-08-2026 14:03:00")
                .unwrap();
        }
        drop(sink);

        let file_count = fs::read_dir(dir.path()).unwrap().count();
        assert!(file_count >= 2, "expected rotation, got {} file(s)", file_count);

        // No record lost across rotation
        assert_eq!(read_all_lines(dir.path()).len(), 5);
    }

    #[test]
    fn test_retention_prunes_oldest_files() {
        let dir = TempDir::new().unwrap();
        let mut sink = JsonlTelemetrySink::create(dir.path(), 1, 2).unwrap();

        for i in 0..6 {
            sink.write_gps(i, &gps_reading(), "21-08-2026 14:03:00")
                .unwrap();
        }
        drop(sink);

        let file_count = fs::read_dir(dir.path()).unwrap().count();
        assert!(
            file_count <= 3,
            "expected pruning to cap files, got {}",
            file_count
        );
    }
}
