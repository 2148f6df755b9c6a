//! Forwarding loop from a sensor source to the record store.

use std::time::Duration;

use tracing::{debug, info, warn};

use crate::client::RecordClient;
use crate::source::SensorSource;
use crate::{BridgeError, Result};

/// Default pause between publishing sweeps.
const DEFAULT_SWEEP_INTERVAL: Duration = Duration::from_secs(2);

/// Publishes sensor snapshots to the remote record tree.
///
/// Each sweep polls the source once and sets every snapshot entry under
/// `{clientName}/{path}/{sensor name}` as text, one transaction at a time.
/// The bridge is the serializing caller the mailbox contract asks for: it
/// waits for each completion before submitting the next set.
pub struct SensorBridge<S: SensorSource> {
    source: S,
    client: RecordClient,
    path: String,
    interval: Duration,
}

impl<S: SensorSource> SensorBridge<S> {
    /// Forward readings from `source` through `client` under `path`.
    pub fn new(source: S, client: RecordClient, path: impl Into<String>) -> Self {
        Self { source, client, path: path.into(), interval: DEFAULT_SWEEP_INTERVAL }
    }

    /// Override the pause between sweeps.
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// The client driving this bridge.
    pub fn client(&self) -> &RecordClient {
        &self.client
    }

    /// Poll once and publish the snapshot. Returns the number of readings
    /// published; a failed poll publishes nothing and is not an error.
    pub async fn publish_once(&mut self) -> Result<usize> {
        if !self.source.poll() {
            warn!("Sensor poll failed; nothing to publish");
            return Ok(0);
        }

        let snapshot = self.source.snapshot().clone();
        let mut published = 0usize;
        for (name, value) in &snapshot {
            self.client.set(&self.path, name, value.to_string())?.wait().await?;
            published += 1;
        }

        debug!(published, path = %self.path, "Published sensor sweep");
        Ok(published)
    }

    /// Publish sweeps at the configured interval until the client session
    /// stops. A stopped session ends the loop normally; other errors
    /// propagate.
    pub async fn run(&mut self) -> Result<()> {
        info!(path = %self.path, "Sensor bridge running");
        loop {
            match self.publish_once().await {
                Ok(_) => {}
                Err(BridgeError::Stopped) => {
                    info!("Client session stopped; sensor bridge exiting");
                    return Ok(());
                }
                Err(e) => return Err(e),
            }
            tokio::time::sleep(self.interval).await;
        }
    }
}
