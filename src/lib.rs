//! Bridge PC sensor readings from Windows shared memory to a realtime
//! record store.
//!
//! Thermolink glues two worlds together: local sensor producers that publish
//! readings through named Windows shared-memory regions (GPU-Z, AIDA64), and
//! a remote hierarchical record store holding tagged scalar values per
//! client.
//!
//! # Architecture
//!
//! - [`SensorSource`] implementations ([`GpuzSource`], [`Aida64Source`])
//!   poll one shared-memory region each and expose a name → temperature
//!   snapshot, replaced wholesale on every successful read.
//! - [`RecordClient`] is the facade over a single background worker that
//!   owns the store session. Callers submit at most one outstanding set/get
//!   transaction through a capacity-1 mailbox and await a typed [`Pending`]
//!   completion handle.
//! - [`RecordStore`] is the seam to the remote SDK; [`MemoryStore`] is its
//!   in-memory twin for tests and offline use.
//! - [`SensorBridge`] ties the two ends together, forwarding each snapshot
//!   entry to the record tree one transaction at a time.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use std::time::Duration;
//! use thermolink::{Aida64Source, ClientConfig, MemoryStore, RecordClient, SensorBridge};
//!
//! #[tokio::main]
//! async fn main() -> thermolink::Result<()> {
//!     let config = ClientConfig::new("PC-LAB", "pc@example.com", "secret", "{}")?;
//!     let client = RecordClient::connect(config, MemoryStore::new());
//!
//!     let mut bridge = SensorBridge::new(Aida64Source::new(), client, "TemperatureSensors")
//!         .with_interval(Duration::from_secs(2));
//!     bridge.run().await
//! }
//! ```
//!
//! # Platform
//!
//! The shared-memory sources read live data on Windows only; on other
//! platforms their `poll` logs and reports failure while the extraction
//! logic stays unit-testable everywhere. The client, mailbox, and stores are
//! platform-independent.

// Core types and error handling
pub mod config;
mod error;
pub mod path;
mod value;

// Transaction plumbing
pub mod client;
mod mailbox;
mod worker;

// Remote record store
pub mod store;
pub mod stores;

// Sensor data sources
pub mod source;
pub mod sources;

// Forwarding loop
pub mod bridge;

// Platform-specific modules
#[cfg(windows)]
pub mod windows;

// Core exports
pub use config::ClientConfig;
pub use error::{BridgeError, Result};
pub use path::RecordPath;
pub use value::{Scalar, ScalarKind};

// Client exports
pub use bridge::SensorBridge;
pub use client::{Pending, RecordClient};
pub use store::RecordStore;
pub use stores::MemoryStore;

// Sensor exports
pub use source::SensorSource;
pub use sources::{Aida64Source, GpuzSource};

// Windows memory exports
#[cfg(windows)]
pub use windows::{RegionAccess, SharedMemoryRegion};
