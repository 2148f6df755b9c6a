//! In-memory record store.
//!
//! Behavioral twin of the hosted backend for tests and offline operation:
//! same account lifecycle (sign-in, user-not-found, registration), same
//! record tree addressed by [`RecordPath`], no network. Cloning the store
//! shares the underlying state, so tests can keep a handle for inspection
//! while the worker owns another.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::{SystemTime, UNIX_EPOCH};

use tracing::debug;

use crate::path::RecordPath;
use crate::store::RecordStore;
use crate::value::Scalar;
use crate::{BridgeError, Result};

#[derive(Debug, Default)]
struct Inner {
    initialized: bool,
    signed_in: Option<String>,
    users: HashMap<String, String>,
    records: HashMap<String, Scalar>,
    timestamps: HashMap<String, u64>,
    stalled: bool,
}

/// Shared-state in-memory implementation of [`RecordStore`].
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    inner: Arc<Mutex<Inner>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-register an account, as the hosted console would.
    pub fn register_user(&self, email: impl Into<String>, password: impl Into<String>) {
        self.lock().users.insert(email.into(), password.into());
    }

    /// Whether an account exists for the email.
    pub fn has_user(&self, email: &str) -> bool {
        self.lock().users.contains_key(email)
    }

    /// Seed a record directly, bypassing the transaction protocol.
    pub fn insert_record(&self, path: &RecordPath, value: Scalar) {
        self.lock().records.insert(path.to_string(), value);
    }

    /// Inspect a stored record by its rendered path.
    pub fn record(&self, path: &str) -> Option<Scalar> {
        self.lock().records.get(path).cloned()
    }

    /// Inspect a stored timestamp marker by its rendered path.
    pub fn timestamp(&self, path: &str) -> Option<u64> {
        self.lock().timestamps.get(path).copied()
    }

    /// Number of stored records.
    pub fn record_count(&self) -> usize {
        self.lock().records.len()
    }

    /// When stalled, set/get operations pend forever. Used to exercise the
    /// abandon-on-stop path of an in-flight transaction.
    pub fn set_stalled(&self, stalled: bool) {
        self.lock().stalled = stalled;
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
        self.inner.lock().expect("memory store lock poisoned")
    }

    async fn stall_point(&self) {
        let stalled = self.lock().stalled;
        if stalled {
            std::future::pending::<()>().await;
        }
    }

    fn require_session(&self) -> Result<()> {
        let inner = self.lock();
        if !inner.initialized {
            return Err(BridgeError::connectivity("store is not initialized"));
        }
        if inner.signed_in.is_none() {
            return Err(BridgeError::connectivity("no signed-in session"));
        }
        Ok(())
    }
}

#[async_trait::async_trait]
impl RecordStore for MemoryStore {
    async fn initialize(&mut self, connection_config: &str) -> Result<()> {
        if connection_config.is_empty() {
            return Err(BridgeError::connectivity("connection config is empty"));
        }
        self.lock().initialized = true;
        debug!("Memory store initialized");
        Ok(())
    }

    async fn sign_in(&mut self, email: &str, password: &str) -> Result<()> {
        let mut inner = self.lock();
        if !inner.initialized {
            return Err(BridgeError::connectivity("store is not initialized"));
        }
        match inner.users.get(email) {
            None => Err(BridgeError::UserNotFound { email: email.to_string() }),
            Some(stored) if stored != password => {
                Err(BridgeError::auth_failed(email, "wrong password"))
            }
            Some(_) => {
                inner.signed_in = Some(email.to_string());
                Ok(())
            }
        }
    }

    async fn create_user(&mut self, email: &str, password: &str) -> Result<()> {
        let mut inner = self.lock();
        if inner.users.contains_key(email) {
            return Err(BridgeError::auth_failed(email, "account already exists"));
        }
        inner.users.insert(email.to_string(), password.to_string());
        inner.signed_in = Some(email.to_string());
        Ok(())
    }

    async fn set_value(&mut self, path: &RecordPath, value: Scalar) -> Result<()> {
        self.require_session()?;
        self.stall_point().await;
        self.lock().records.insert(path.to_string(), value);
        Ok(())
    }

    async fn get_value(&mut self, path: &RecordPath) -> Result<Option<Scalar>> {
        self.require_session()?;
        self.stall_point().await;
        Ok(self.lock().records.get(&path.to_string()).cloned())
    }

    async fn write_timestamp(&mut self, path: &RecordPath) -> Result<()> {
        self.require_session()?;
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or_default();
        self.lock().timestamps.insert(path.to_string(), now);
        Ok(())
    }
}
