//! Single-slot mailbox between caller tasks and the worker.
//!
//! The slot holds at most one pending request. Callers occupy an idle slot
//! under the mutex and are rejected with [`BridgeError::TransactionActive`]
//! otherwise; only the worker moves a request out and, once its remote
//! round-trip finished, marks the slot idle again. The request carries a
//! typed oneshot completion sender, so the caller's handle resolves exactly
//! once whatever the outcome.

use std::sync::Mutex;

use tokio::sync::{oneshot, Notify};

use crate::value::{Scalar, ScalarKind};
use crate::{BridgeError, Result};

/// The operation carried by a request, paired with its completion sender.
#[derive(Debug)]
pub(crate) enum Transaction {
    Set { value: Scalar, done: oneshot::Sender<Result<()>> },
    Get { kind: ScalarKind, done: oneshot::Sender<Result<Scalar>> },
}

impl Transaction {
    /// Resolve the completion handle with a failure.
    pub(crate) fn fail(self, err: BridgeError) {
        match self {
            Transaction::Set { done, .. } => {
                let _ = done.send(Err(err));
            }
            Transaction::Get { done, .. } => {
                let _ = done.send(Err(err));
            }
        }
    }
}

/// One pending set/get request addressed to the remote record tree.
#[derive(Debug)]
pub(crate) struct Request {
    pub client: String,
    pub path: String,
    pub key: String,
    pub tx: Transaction,
}

#[derive(Debug, Default)]
struct Slot {
    pending: Option<Request>,
    in_flight: bool,
}

/// Capacity-1 request exchange.
#[derive(Debug, Default)]
pub(crate) struct Mailbox {
    slot: Mutex<Slot>,
    notify: Notify,
}

impl Mailbox {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Store a request if the slot is idle. Never blocks on remote
    /// completion; fails while a prior request is pending or in flight.
    pub(crate) fn submit(&self, request: Request) -> Result<()> {
        {
            let mut slot = self.lock();
            if slot.pending.is_some() || slot.in_flight {
                return Err(BridgeError::TransactionActive);
            }
            slot.pending = Some(request);
        }
        // Stores a permit, so a submit racing a worker about to wait is kept.
        self.notify.notify_one();
        Ok(())
    }

    /// Move the pending request out, marking it in flight. Worker only.
    pub(crate) fn take(&self) -> Option<Request> {
        let mut slot = self.lock();
        let request = slot.pending.take();
        if request.is_some() {
            slot.in_flight = true;
        }
        request
    }

    /// Mark the round-trip finished, making the slot idle. Worker only.
    pub(crate) fn complete(&self) {
        self.lock().in_flight = false;
    }

    /// Wait until a request has been submitted.
    pub(crate) async fn ready(&self) {
        self.notify.notified().await;
    }

    #[cfg(test)]
    pub(crate) fn is_idle(&self) -> bool {
        let slot = self.lock();
        slot.pending.is_none() && !slot.in_flight
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Slot> {
        self.slot.lock().expect("mailbox lock poisoned")
    }
}
