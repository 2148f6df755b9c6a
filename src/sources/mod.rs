//! Sensor source implementations for third-party shared-memory formats.

pub mod aida64;
pub mod gpuz;

pub use aida64::Aida64Source;
pub use gpuz::GpuzSource;
