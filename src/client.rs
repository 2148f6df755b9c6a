//! Client facade over the mailbox and worker.

use std::sync::Arc;

use tokio::sync::oneshot;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::config::ClientConfig;
use crate::mailbox::{Mailbox, Request, Transaction};
use crate::store::RecordStore;
use crate::value::{Scalar, ScalarKind};
use crate::worker::Worker;
use crate::{BridgeError, Result};

/// Completion handle for one submitted transaction.
///
/// Owned by the caller; resolves exactly once, with the transaction outcome
/// or with [`BridgeError::Stopped`] if the worker shut down first.
#[derive(Debug)]
pub struct Pending<T> {
    rx: oneshot::Receiver<Result<T>>,
    cancel: CancellationToken,
}

impl<T> Pending<T> {
    /// Wait for the transaction to complete.
    pub async fn wait(mut self) -> Result<T> {
        tokio::select! {
            // Prefer a result that is already available over the stop signal.
            biased;
            outcome = &mut self.rx => outcome.unwrap_or(Err(BridgeError::Stopped)),
            _ = self.cancel.cancelled() => Err(BridgeError::Stopped),
        }
    }
}

/// Handle to one record-store client session.
///
/// `connect` starts the background worker; `set`/`get` submit at most one
/// outstanding transaction through the mailbox and hand back a [`Pending`]
/// completion handle. A session is single-use: after [`disconnect`] (or
/// drop) a new client must be connected.
///
/// [`disconnect`]: RecordClient::disconnect
///
/// # Example
///
/// ```rust,no_run
/// use thermolink::{ClientConfig, MemoryStore, RecordClient, Scalar, ScalarKind};
///
/// # #[tokio::main]
/// # async fn main() -> thermolink::Result<()> {
/// let config = ClientConfig::new("PC-LAB", "pc@example.com", "secret", "{}")?;
/// let client = RecordClient::connect(config, MemoryStore::new());
///
/// client.set("TemperatureSensors", "CPU", "55.5")?.wait().await?;
/// let value = client.get("TemperatureSensors", "CPU", ScalarKind::Text)?.wait().await?;
/// assert_eq!(value, Scalar::from("55.5"));
///
/// client.disconnect();
/// # Ok(())
/// # }
/// ```
pub struct RecordClient {
    config: ClientConfig,
    mailbox: Arc<Mailbox>,
    cancel: CancellationToken,
}

impl RecordClient {
    /// Start the worker session for `store` under this configuration.
    ///
    /// Must be called within a tokio runtime. Connecting and signing in
    /// happen on the worker; transactions submitted meanwhile are queued in
    /// the mailbox (at most one) and processed once the session is up. If
    /// the session cannot be established, the worker stops and all pending
    /// and future transactions resolve with [`BridgeError::Stopped`].
    pub fn connect<S: RecordStore>(config: ClientConfig, store: S) -> Self {
        info!(client = %config.client_name(), "Connecting record client");

        let mailbox = Arc::new(Mailbox::new());
        let cancel = CancellationToken::new();
        Worker::spawn(store, config.clone(), Arc::clone(&mailbox), cancel.clone());

        Self { config, mailbox, cancel }
    }

    /// Submit a set transaction for `{clientName}/{path}/{key}`.
    ///
    /// Returns immediately with a completion handle; fails with
    /// [`BridgeError::TransactionActive`] while another transaction is
    /// outstanding.
    pub fn set(&self, path: &str, key: &str, value: impl Into<Scalar>) -> Result<Pending<()>> {
        self.ensure_running()?;
        if key.is_empty() {
            return Err(BridgeError::resolution("key is empty"));
        }

        let (done, rx) = oneshot::channel();
        self.mailbox.submit(Request {
            client: self.config.client_name().to_string(),
            path: path.to_string(),
            key: key.to_string(),
            tx: Transaction::Set { value: value.into(), done },
        })?;

        Ok(Pending { rx, cancel: self.cancel.clone() })
    }

    /// Submit a get transaction for `{clientName}/{path}/{key}`.
    ///
    /// The stored value must match the requested `kind`; a mismatch resolves
    /// the handle with [`BridgeError::TypeMismatch`], never a coercion.
    pub fn get(&self, path: &str, key: &str, kind: ScalarKind) -> Result<Pending<Scalar>> {
        self.ensure_running()?;
        if key.is_empty() {
            return Err(BridgeError::resolution("key is empty"));
        }

        let (done, rx) = oneshot::channel();
        self.mailbox.submit(Request {
            client: self.config.client_name().to_string(),
            path: path.to_string(),
            key: key.to_string(),
            tx: Transaction::Get { kind, done },
        })?;

        Ok(Pending { rx, cancel: self.cancel.clone() })
    }

    /// Stop the worker session.
    ///
    /// Best-effort: raises the stop signal and returns without waiting for
    /// the worker to exit. An in-flight transaction is abandoned and its
    /// handle resolves with failure.
    pub fn disconnect(&self) {
        debug!(client = %self.config.client_name(), "Disconnecting record client");
        self.cancel.cancel();
    }

    /// Whether the session is still accepting transactions.
    pub fn is_connected(&self) -> bool {
        !self.cancel.is_cancelled()
    }

    /// The configured client display name.
    pub fn client_name(&self) -> &str {
        self.config.client_name()
    }

    fn ensure_running(&self) -> Result<()> {
        if self.cancel.is_cancelled() { Err(BridgeError::Stopped) } else { Ok(()) }
    }
}

impl Drop for RecordClient {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}
