//! Background worker owning the record-store session.
//!
//! One worker task per client. Session states:
//! Starting → Connecting → SignedIn → Polling → Stopping → Stopped.
//! Connect-phase failures are fatal for the session; per-request failures
//! during Polling are reported through the request's completion handle and
//! the worker keeps running. Every remote round-trip is raced against the
//! cancellation token, so an in-flight operation is abandoned promptly on
//! stop and resolves the caller's handle with failure, never a value.

use std::sync::Arc;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::config::ClientConfig;
use crate::mailbox::{Mailbox, Request, Transaction};
use crate::path::RecordPath;
use crate::store::RecordStore;
use crate::{BridgeError, Result};

/// Key of the sign-in timestamp marker under the client root.
const LAST_AUTH_TIME_KEY: &str = "LastAuthTime";

pub(crate) struct Worker<S: RecordStore> {
    store: S,
    config: ClientConfig,
    mailbox: Arc<Mailbox>,
    cancel: CancellationToken,
}

impl<S: RecordStore> Worker<S> {
    /// Spawn the worker task for one client session.
    pub(crate) fn spawn(
        store: S,
        config: ClientConfig,
        mailbox: Arc<Mailbox>,
        cancel: CancellationToken,
    ) -> JoinHandle<()> {
        let worker = Self { store, config, mailbox, cancel };
        tokio::spawn(worker.run())
    }

    async fn run(mut self) {
        info!(client = %self.config.client_name(), "Worker starting");

        match self.connect().await {
            Ok(()) => {
                info!(client = %self.config.client_name(), "Signed in; polling for requests");
                self.poll_loop().await;
            }
            Err(e) => {
                error!(error = %e, "Connection failed; stopping worker session");
            }
        }

        // Stopping: raise the token ourselves so the facade rejects further
        // submissions after a fatal connect failure, then drain whatever is
        // still in the slot so its completion handle resolves.
        self.cancel.cancel();
        while let Some(request) = self.mailbox.take() {
            request.tx.fail(BridgeError::Stopped);
            self.mailbox.complete();
        }

        info!(client = %self.config.client_name(), "Worker stopped");
    }

    /// Connecting and SignedIn states. Any error is fatal for the session.
    async fn connect(&mut self) -> Result<()> {
        debug!("Initializing record store backend");
        race(&self.cancel, self.store.initialize(self.config.connection_config())).await?;

        debug!(email = %self.config.email(), "Signing in");
        let signed_in =
            race(&self.cancel, self.store.sign_in(self.config.email(), self.config.password()))
                .await;
        match signed_in {
            Ok(()) => {}
            Err(BridgeError::UserNotFound { email }) => {
                info!(%email, "Account not found; registering a new one");
                race(
                    &self.cancel,
                    self.store.create_user(self.config.email(), self.config.password()),
                )
                .await?;
            }
            Err(e) => return Err(e),
        }

        let marker = RecordPath::resolve(self.config.client_name(), "", LAST_AUTH_TIME_KEY)?;
        race(&self.cancel, self.store.write_timestamp(&marker)).await?;
        Ok(())
    }

    /// Polling state: wait for a submission, drain it, repeat until stopped.
    async fn poll_loop(&mut self) {
        loop {
            if self.cancel.is_cancelled() {
                break;
            }

            // Drain before waiting: a request may have been submitted while
            // the previous one was being processed.
            while let Some(request) = self.mailbox.take() {
                self.handle(request).await;
                self.mailbox.complete();
            }

            tokio::select! {
                _ = self.cancel.cancelled() => break,
                _ = self.mailbox.ready() => {}
            }
        }
        debug!("Polling loop exited");
    }

    /// Execute one request against the store and resolve its completion.
    async fn handle(&mut self, request: Request) {
        let path = match RecordPath::resolve(&request.client, &request.path, &request.key) {
            Ok(path) => path,
            Err(e) => {
                warn!(key = %request.key, error = %e, "Rejecting request with unresolvable reference");
                request.tx.fail(e);
                return;
            }
        };

        match request.tx {
            Transaction::Set { value, done } => {
                debug!(%path, kind = %value.kind(), "Processing set transaction");
                let result = race(&self.cancel, self.store.set_value(&path, value)).await;
                if let Err(e) = &result {
                    warn!(%path, error = %e, "Set transaction failed");
                }
                let _ = done.send(result);
            }
            Transaction::Get { kind, done } => {
                debug!(%path, requested = %kind, "Processing get transaction");
                let outcome = match race(&self.cancel, self.store.get_value(&path)).await {
                    Ok(Some(value)) if value.kind() == kind => Ok(value),
                    Ok(Some(value)) => Err(BridgeError::TypeMismatch {
                        requested: kind,
                        stored: value.kind(),
                    }),
                    Ok(None) => Err(BridgeError::KeyNotFound { path: path.to_string() }),
                    Err(e) => Err(e),
                };
                if let Err(e) = &outcome {
                    warn!(%path, error = %e, "Get transaction failed");
                }
                let _ = done.send(outcome);
            }
        }
    }
}

/// Race a remote operation against the stop signal. An abandoned operation
/// reports [`BridgeError::Stopped`] and never surfaces a value.
async fn race<T>(
    cancel: &CancellationToken,
    operation: impl Future<Output = Result<T>>,
) -> Result<T> {
    tokio::select! {
        _ = cancel.cancelled() => Err(BridgeError::Stopped),
        result = operation => result,
    }
}
