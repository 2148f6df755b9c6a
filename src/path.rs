//! Record path resolution.
//!
//! A remote record is addressed as `{clientName}/{path segments}/{key}`.
//! Path segments arrive slash-delimited; backslashes are accepted as
//! separators and normalized, matching how the store tree is laid out.

use crate::{BridgeError, Result};

/// A fully resolved reference to one record in the remote tree.
///
/// Resolution never fails for well-formed non-empty inputs: the client name
/// and key must be non-empty, the middle path may be empty.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RecordPath {
    segments: Vec<String>,
}

impl RecordPath {
    /// Resolve a record reference from client name, slash-delimited path, and key.
    ///
    /// `\` and `/` are interchangeable separators; empty segments produced by
    /// doubled or trailing separators are dropped.
    pub fn resolve(client: &str, path: &str, key: &str) -> Result<Self> {
        if client.is_empty() {
            return Err(BridgeError::resolution("client name is empty"));
        }
        if key.is_empty() {
            return Err(BridgeError::resolution("key is empty"));
        }

        let mut segments = Vec::with_capacity(4);
        segments.push(client.to_string());
        for segment in path.split(['/', '\\']) {
            if !segment.is_empty() {
                segments.push(segment.to_string());
            }
        }
        segments.push(key.to_string());

        Ok(Self { segments })
    }

    /// The path segments, client name first and key last.
    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// The final segment (the key).
    pub fn key(&self) -> &str {
        self.segments.last().map(String::as_str).unwrap_or_default()
    }
}

impl std::fmt::Display for RecordPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.segments.join("/"))
    }
}
