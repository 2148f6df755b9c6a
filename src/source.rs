//! Capability trait for sensor-reading sources.

use std::collections::HashMap;

/// A local producer of named numeric readings.
///
/// Sources abstract over the shared-memory formats of different monitoring
/// tools (GPU-Z binary records, AIDA64 tagged text) behind one small
/// contract. Each variant owns its snapshot; there is no shared base state.
pub trait SensorSource {
    /// Refresh the snapshot from the underlying region.
    ///
    /// On success the snapshot is replaced wholesale; on failure it is left
    /// untouched and the failure is narrated to the log. Returns whether the
    /// region was read.
    fn poll(&mut self) -> bool;

    /// The last successfully read snapshot (empty if a read never succeeded).
    fn snapshot(&self) -> &HashMap<String, f64>;

    /// Look up a single reading by sensor name.
    fn lookup(&self, name: &str) -> Option<f64> {
        self.snapshot().get(name).copied()
    }
}
