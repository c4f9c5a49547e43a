//! # CRC-16 Implementation
//!
//! CRC-16 checksum used by the PVM wire format (ARC variant).
//!
//! **Polynomial**: 0xA001 (0x8005 reflected), LSB-first
//! **Initial Value**: 0x0000
//!
//! Must produce bit-identical results to the transponder firmware or every
//! frame is rejected at the CRC check.

/// Reflected CRC-16 polynomial
const CRC16_POLY: u16 = 0xA001;

/// Precomputed lookup table for fast calculation
const CRC16_TABLE: [u16; 256] = generate_crc16_table();

/// Generate CRC16 lookup table at compile time
const fn generate_crc16_table() -> [u16; 256] {
    let mut table = [0u16; 256];
    let mut i = 0;

    while i < 256 {
        let mut crc = i as u16;
        let mut j = 0;

        while j < 8 {
            if (crc & 1) != 0 {
                crc = (crc >> 1) ^ CRC16_POLY;
            } else {
                crc >>= 1;
            }
            j += 1;
        }

        table[i] = crc;
        i += 1;
    }

    table
}

/// Calculate the PVM frame CRC-16 using the lookup table (fast)
///
/// # Arguments
///
/// * `data` - Byte slice to checksum (the first 124 bytes of a frame)
///
/// # Returns
///
/// * `u16` - Calculated CRC-16 value
pub fn crc16(data: &[u8]) -> u16 {
    let mut crc: u16 = 0;

    for &byte in data {
        let index = ((crc ^ byte as u16) & 0xFF) as usize;
        crc = (crc >> 8) ^ CRC16_TABLE[index];
    }

    crc
}

/// Calculate the CRC-16 using the direct bit-by-bit algorithm (slow)
///
/// Mirrors the transponder firmware loop exactly; kept for cross-checking
/// the lookup table implementation in tests.
#[allow(dead_code)]
fn crc16_slow(data: &[u8]) -> u16 {
    let mut crc: u16 = 0;

    for &byte in data {
        crc ^= byte as u16;

        for _ in 0..8 {
            if (crc & 1) != 0 {
                crc = (crc >> 1) ^ CRC16_POLY;
            } else {
                crc >>= 1;
            }
        }
    }

    crc
}
