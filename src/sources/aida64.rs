//! AIDA64 shared-memory sensor source (delimited-tag text layout).
//!
//! AIDA64 publishes its readings as a NUL-terminated text blob of
//! `<temp>…</temp>` blocks, each carrying `<label>` and `<value>` fields.
//! Extraction is sequential tag scanning against that fixed, trusted producer
//! format; it is deliberately not a markup parser and makes no attempt to
//! handle nesting.

use std::collections::HashMap;

use tracing::warn;

use crate::source::SensorSource;

#[cfg(windows)]
use crate::windows::{RegionAccess, SharedMemoryRegion};
#[cfg(windows)]
use tracing::debug;

/// Name of the AIDA64 mapping object.
pub const AIDA64_REGION_NAME: &str = "AIDA64_SensorValues";

/// Upper bound on the text copied out of the region. AIDA64 does not publish
/// the region size; real payloads are a few KiB.
#[cfg(windows)]
const MAX_REGION_BYTES: usize = 1 << 20;

/// Extract `label → value` pairs from the AIDA64 text blob.
///
/// Each `<temp>` block is matched up to the *first* `</temp>` that follows
/// (non-greedy); blocks missing a label or a parsable value are skipped
/// silently, as are stray bytes between blocks.
pub fn parse_sensor_text(raw: &[u8]) -> HashMap<String, f64> {
    let text = String::from_utf8_lossy(raw);
    let mut readings = HashMap::new();

    let mut rest: &str = &text;
    while let Some(start) = rest.find("<temp>") {
        let after = &rest[start + "<temp>".len()..];
        let Some(end) = after.find("</temp>") else {
            break;
        };
        let block = &after[..end];
        rest = &after[end + "</temp>".len()..];

        let Some(label) = tag_content(block, "label") else {
            continue;
        };
        let Some(value) = tag_content(block, "value") else {
            continue;
        };
        if label.is_empty() {
            continue;
        }
        if let Ok(value) = value.trim().parse::<f64>() {
            readings.insert(label.to_string(), value);
        }
    }

    readings
}

/// Content of the first `<tag>…</tag>` pair inside a block, if present.
fn tag_content<'a>(block: &'a str, tag: &str) -> Option<&'a str> {
    let open = format!("<{tag}>");
    let close = format!("</{tag}>");
    let start = block.find(&open)? + open.len();
    let end = block[start..].find(&close)? + start;
    Some(&block[start..end])
}

/// Sensor source reading AIDA64's tagged-text shared-memory region.
#[derive(Debug, Default)]
pub struct Aida64Source {
    snapshot: HashMap<String, f64>,
}

impl Aida64Source {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SensorSource for Aida64Source {
    #[cfg(windows)]
    fn poll(&mut self) -> bool {
        let region = match SharedMemoryRegion::open(AIDA64_REGION_NAME, RegionAccess::ReadOnly, 0) {
            Ok(region) => region,
            Err(e) => {
                warn!(region = AIDA64_REGION_NAME, error = %e, "Could not read AIDA64 shared memory");
                return false;
            }
        };

        let raw = region.copy_until_nul(MAX_REGION_BYTES);
        self.snapshot = parse_sensor_text(&raw);
        debug!(sensors = self.snapshot.len(), "Refreshed AIDA64 snapshot");
        true
    }

    #[cfg(not(windows))]
    fn poll(&mut self) -> bool {
        warn!("AIDA64 shared memory is only available on Windows");
        false
    }

    fn snapshot(&self) -> &HashMap<String, f64> {
        &self.snapshot
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_well_formed_blocks() {
        let input = b"<temp><label>A</label><value>1.5</value></temp>\
                      <temp><label>B</label><value>2.75</value></temp>";
        let readings = parse_sensor_text(input);
        assert_eq!(readings.len(), 2);
        assert_eq!(readings["A"], 1.5);
        assert_eq!(readings["B"], 2.75);
    }

    #[test]
    fn skips_malformed_blocks_silently() {
        let input = b"<temp><label>NoValue</label></temp>\
                      <temp><value>3.0</value></temp>\
                      <temp><label>BadFloat</label><value>warm</value></temp>\
                      <temp><label>OK</label><value>41.0</value></temp>";
        let readings = parse_sensor_text(input);
        assert_eq!(readings.len(), 1);
        assert_eq!(readings["OK"], 41.0);
    }

    #[test]
    fn matches_to_first_closing_tag() {
        // A stray </temp> cuts the block short; the orphaned remainder does
        // not produce a reading and scanning resumes afterwards.
        let input = b"<temp><label>Cut</label></temp><value>9.0</value>\
                      <temp><label>Next</label><value>5.5</value></temp>";
        let readings = parse_sensor_text(input);
        assert_eq!(readings.len(), 1);
        assert_eq!(readings["Next"], 5.5);
    }

    #[test]
    fn ignores_bytes_between_blocks() {
        let input = b"<sys><label>uptime</label></sys>\
                      <temp><label>CPU</label><value>52.0</value></temp>trailing";
        let readings = parse_sensor_text(input);
        assert_eq!(readings.len(), 1);
        assert_eq!(readings["CPU"], 52.0);
    }

    #[test]
    fn unterminated_final_block_is_dropped() {
        let input = b"<temp><label>A</label><value>1.0</value></temp>\
                      <temp><label>B</label><value>2.0";
        let readings = parse_sensor_text(input);
        assert_eq!(readings.len(), 1);
        assert!(readings.contains_key("A"));
    }

    #[test]
    fn empty_labels_are_skipped() {
        let input = b"<temp><label></label><value>7.0</value></temp>";
        assert!(parse_sensor_text(input).is_empty());
    }

    #[test]
    fn parsing_is_idempotent_over_unchanged_memory() {
        let input = b"<temp><label>CPU</label><value>52.5</value></temp>\
                      <temp><label>GPU</label><value>61.25</value></temp>";
        assert_eq!(parse_sensor_text(input), parse_sensor_text(input));
    }
}
