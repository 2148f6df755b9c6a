//! Record store trait — the seam to the remote realtime-database SDK.

use crate::path::RecordPath;
use crate::value::Scalar;
use crate::Result;

/// A hierarchical record store holding tagged scalar values.
///
/// Implementations wrap a concrete backend (a hosted realtime database, or
/// the in-memory twin used for tests and offline operation). All methods are
/// driven exclusively by the worker task; the trait does not need to be
/// `Sync`.
///
/// The connect sequence is `initialize` → `sign_in` (→ `create_user` when
/// the account does not exist yet) → `write_timestamp`.
#[async_trait::async_trait]
pub trait RecordStore: Send + 'static {
    /// Initialize the backend from the opaque connection-config blob.
    async fn initialize(&mut self, connection_config: &str) -> Result<()>;

    /// Sign in with account credentials.
    ///
    /// Returns [`crate::BridgeError::UserNotFound`] when no account exists
    /// for the email, so the worker can register one and retry.
    async fn sign_in(&mut self, email: &str, password: &str) -> Result<()>;

    /// Register a new account and leave it signed in.
    async fn create_user(&mut self, email: &str, password: &str) -> Result<()>;

    /// Write a scalar value at the resolved record reference.
    async fn set_value(&mut self, path: &RecordPath, value: Scalar) -> Result<()>;

    /// Read the scalar value at the resolved record reference, if any.
    async fn get_value(&mut self, path: &RecordPath) -> Result<Option<Scalar>>;

    /// Write a server-side timestamp marker at the reference.
    async fn write_timestamp(&mut self, path: &RecordPath) -> Result<()>;
}
