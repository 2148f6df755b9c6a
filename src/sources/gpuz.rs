//! GPU-Z shared-memory sensor source (binary fixed-record layout).
//!
//! GPU-Z publishes a fixed-size region of UTF-16 key/value records followed
//! by sensor records. Temperature-bearing sensors are identified by the
//! marker substring in their name field. The layout structs below match the
//! published ABI; decoding works on a copied byte buffer so it can be tested
//! on any platform.

use std::collections::HashMap;

use tracing::warn;

use crate::source::SensorSource;

#[cfg(windows)]
use crate::windows::{RegionAccess, SharedMemoryRegion};
#[cfg(windows)]
use tracing::debug;

/// Name of the GPU-Z mapping object.
pub const GPUZ_REGION_NAME: &str = "GPUZShMem";

/// Marker substring identifying temperature sensors in the record name.
pub const TEMPERATURE_MARKER: &str = "Temperature";

/// Number of entries in each fixed-size record array.
const GPUZ_RECORDS: usize = 128;
/// UTF-16 code units in a record name field.
const NAME_CHARS: usize = 256;

/// Key/value record from the GPU-Z data array.
#[repr(C, packed)]
#[allow(dead_code)]
struct GpuzRecord {
    key: [u16; NAME_CHARS],
    value: [u16; NAME_CHARS],
}

/// Sensor record: UTF-16 name and unit, digit count, and the reading.
#[repr(C, packed)]
#[allow(dead_code)]
struct GpuzSensorRecord {
    name: [u16; NAME_CHARS],
    unit: [u16; 8],
    digits: u32,
    value: f64,
}

/// Full shared-memory layout as published by GPU-Z (struct version 1).
#[repr(C, packed)]
#[allow(dead_code)]
struct GpuzSharedMemory {
    version: u32,
    busy: i32,
    last_update: u32,
    data: [GpuzRecord; GPUZ_RECORDS],
    sensors: [GpuzSensorRecord; GPUZ_RECORDS],
}

/// Total bytes copied out of the region on each poll.
pub const REGION_SIZE: usize = std::mem::size_of::<GpuzSharedMemory>();

const SENSOR_RECORD_SIZE: usize = std::mem::size_of::<GpuzSensorRecord>();
const SENSORS_OFFSET: usize = REGION_SIZE - GPUZ_RECORDS * SENSOR_RECORD_SIZE;
const VALUE_OFFSET: usize = SENSOR_RECORD_SIZE - std::mem::size_of::<f64>();

/// Decode the sensor-record array from a copied region buffer.
///
/// Only records whose name contains [`TEMPERATURE_MARKER`] are included.
/// Names are converted from UTF-16 (lossily, truncated at the first NUL).
/// A buffer too short for the full layout yields an empty map.
pub fn decode_sensor_records(bytes: &[u8]) -> HashMap<String, f64> {
    let mut readings = HashMap::new();
    if bytes.len() < REGION_SIZE {
        warn!(len = bytes.len(), expected = REGION_SIZE, "GPU-Z region buffer is truncated");
        return readings;
    }

    for index in 0..GPUZ_RECORDS {
        let record = &bytes[SENSORS_OFFSET + index * SENSOR_RECORD_SIZE..][..SENSOR_RECORD_SIZE];
        let name = decode_utf16_name(&record[..NAME_CHARS * 2]);
        if !name.contains(TEMPERATURE_MARKER) {
            continue;
        }

        let mut raw = [0u8; 8];
        raw.copy_from_slice(&record[VALUE_OFFSET..VALUE_OFFSET + 8]);
        readings.insert(name, f64::from_le_bytes(raw));
    }

    readings
}

/// Decode a NUL-terminated little-endian UTF-16 name field.
fn decode_utf16_name(bytes: &[u8]) -> String {
    let units: Vec<u16> = bytes
        .chunks_exact(2)
        .map(|pair| u16::from_le_bytes([pair[0], pair[1]]))
        .take_while(|&unit| unit != 0)
        .collect();
    String::from_utf16_lossy(&units)
}

/// Sensor source reading GPU-Z's binary shared-memory region.
#[derive(Debug, Default)]
pub struct GpuzSource {
    snapshot: HashMap<String, f64>,
}

impl GpuzSource {
    pub fn new() -> Self {
        Self::default()
    }
}

#[cfg(windows)]
fn read_region() -> crate::Result<Vec<u8>> {
    // GPU-Z publishes the mapping for read-write access only.
    let region = SharedMemoryRegion::open(GPUZ_REGION_NAME, RegionAccess::ReadWrite, REGION_SIZE)?;
    Ok(region.copy_bytes(REGION_SIZE))
}

impl SensorSource for GpuzSource {
    #[cfg(windows)]
    fn poll(&mut self) -> bool {
        match read_region() {
            Ok(bytes) => {
                self.snapshot = decode_sensor_records(&bytes);
                debug!(sensors = self.snapshot.len(), "Refreshed GPU-Z snapshot");
                true
            }
            Err(e) => {
                warn!(region = GPUZ_REGION_NAME, error = %e, "Could not read GPU-Z shared memory");
                false
            }
        }
    }

    #[cfg(not(windows))]
    fn poll(&mut self) -> bool {
        warn!("GPU-Z shared memory is only available on Windows");
        false
    }

    fn snapshot(&self) -> &HashMap<String, f64> {
        &self.snapshot
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_sensor(buf: &mut [u8], index: usize, name: &str, value: f64) {
        let offset = SENSORS_OFFSET + index * SENSOR_RECORD_SIZE;
        for (i, unit) in name.encode_utf16().enumerate() {
            buf[offset + i * 2..offset + i * 2 + 2].copy_from_slice(&unit.to_le_bytes());
        }
        buf[offset + VALUE_OFFSET..offset + VALUE_OFFSET + 8]
            .copy_from_slice(&value.to_le_bytes());
    }

    fn empty_region() -> Vec<u8> {
        vec![0u8; REGION_SIZE]
    }

    #[test]
    fn layout_matches_published_abi() {
        assert_eq!(std::mem::size_of::<GpuzRecord>(), 1024);
        assert_eq!(std::mem::size_of::<GpuzSensorRecord>(), 540);
        assert_eq!(SENSORS_OFFSET, 12 + GPUZ_RECORDS * 1024);
        assert_eq!(REGION_SIZE, SENSORS_OFFSET + GPUZ_RECORDS * 540);
    }

    #[test]
    fn decodes_marker_records_and_skips_the_rest() {
        let mut buf = empty_region();
        write_sensor(&mut buf, 0, "GPU Temperature", 63.5);
        write_sensor(&mut buf, 1, "Fan Speed (%)", 48.0);
        write_sensor(&mut buf, 2, "Hot Spot Temperature", 79.25);

        let readings = decode_sensor_records(&buf);
        assert_eq!(readings.len(), 2);
        assert_eq!(readings["GPU Temperature"], 63.5);
        assert_eq!(readings["Hot Spot Temperature"], 79.25);
        assert!(!readings.contains_key("Fan Speed (%)"));
    }

    #[test]
    fn empty_region_yields_no_readings() {
        assert!(decode_sensor_records(&empty_region()).is_empty());
    }

    #[test]
    fn truncated_buffer_yields_no_readings() {
        let mut buf = empty_region();
        write_sensor(&mut buf, 0, "GPU Temperature", 63.5);
        buf.truncate(REGION_SIZE - 1);
        assert!(decode_sensor_records(&buf).is_empty());
    }

    #[test]
    fn decoding_is_idempotent_over_unchanged_memory() {
        let mut buf = empty_region();
        write_sensor(&mut buf, 5, "Memory Temperature", 51.0);
        write_sensor(&mut buf, 17, "GPU Temperature", 66.0);

        let first = decode_sensor_records(&buf);
        let second = decode_sensor_records(&buf);
        assert_eq!(first, second);
    }

    #[test]
    fn name_decoding_stops_at_nul() {
        let mut bytes = vec![0u8; NAME_CHARS * 2];
        for (i, unit) in "CPU Temperature".encode_utf16().enumerate() {
            bytes[i * 2..i * 2 + 2].copy_from_slice(&unit.to_le_bytes());
        }
        // Trailing garbage after the terminator must not leak into the name.
        let tail = bytes.len() - 2;
        bytes[tail..].copy_from_slice(&0x0041u16.to_le_bytes());
        assert_eq!(decode_utf16_name(&bytes), "CPU Temperature");
    }
}
