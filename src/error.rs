//! Error types for the sensor-to-record bridge.
//!
//! All errors implement the `std::error::Error` trait and carry structured
//! context. The taxonomy follows the failure classes of the bridge:
//!
//! - **Config Errors**: a required configuration field is empty
//! - **Concurrency Errors**: a transaction is already in flight
//! - **Connectivity Errors**: store initialization or sign-in failed
//! - **Resolution Errors**: malformed record path or key
//! - **Type Mismatch Errors**: stored kind differs from the requested kind
//! - **Windows API Errors**: platform-specific shared-memory failures
//!
//! None of these are retried automatically by the bridge itself; callers
//! decide whether to resubmit. Use [`BridgeError::is_retryable`] to tell
//! transient failures from permanent ones:
//!
//! ```rust
//! use thermolink::BridgeError;
//!
//! let error = BridgeError::connectivity("store unreachable");
//! if error.is_retryable() {
//!     println!("resubmit later");
//! }
//! ```

use thiserror::Error;

use crate::value::ScalarKind;

#[cfg(windows)]
use windows_core as win_core;

/// Result type alias for bridge operations.
pub type Result<T, E = BridgeError> = std::result::Result<T, E>;

/// Main error type for bridge operations.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum BridgeError {
    #[error("Required configuration field '{field}' is empty")]
    Config { field: &'static str },

    #[error("A transaction is already active; resubmit after it completes")]
    TransactionActive,

    #[error("Failed to reach the record store: {reason}")]
    Connectivity {
        reason: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("Authentication failed for '{email}': {reason}")]
    Auth { email: String, reason: String },

    #[error("No account registered for '{email}'")]
    UserNotFound { email: String },

    #[error("Cannot resolve record reference: {reason}")]
    Resolution { reason: String },

    #[error("Record kind mismatch: requested {requested}, stored {stored}")]
    TypeMismatch { requested: ScalarKind, stored: ScalarKind },

    #[error("No value stored at '{path}'")]
    KeyNotFound { path: String },

    #[error("Worker stopped before the request completed")]
    Stopped,

    #[error("Windows API error: {operation}")]
    #[cfg(windows)]
    WindowsApi {
        operation: String,
        #[source]
        source: win_core::Error,
    },

    #[error("{feature} is only available on {required_platform}")]
    UnsupportedPlatform { feature: String, required_platform: String },
}

impl BridgeError {
    /// Returns whether this error is potentially recoverable by resubmitting.
    pub fn is_retryable(&self) -> bool {
        match self {
            BridgeError::TransactionActive => true,
            BridgeError::Connectivity { .. } => true,
            #[cfg(windows)]
            BridgeError::WindowsApi { .. } => true,
            BridgeError::Config { .. } => false,
            BridgeError::Auth { .. } => false,
            BridgeError::UserNotFound { .. } => false,
            BridgeError::Resolution { .. } => false,
            BridgeError::TypeMismatch { .. } => false,
            BridgeError::KeyNotFound { .. } => false,
            BridgeError::Stopped => false,
            BridgeError::UnsupportedPlatform { .. } => false,
        }
    }

    /// Helper constructor for empty-field configuration errors.
    pub fn config_missing(field: &'static str) -> Self {
        BridgeError::Config { field }
    }

    /// Helper constructor for connectivity errors.
    pub fn connectivity(reason: impl Into<String>) -> Self {
        BridgeError::Connectivity { reason: reason.into(), source: None }
    }

    /// Helper constructor for connectivity errors with a source.
    pub fn connectivity_with_source(
        reason: impl Into<String>,
        source: Box<dyn std::error::Error + Send + Sync>,
    ) -> Self {
        BridgeError::Connectivity { reason: reason.into(), source: Some(source) }
    }

    /// Helper constructor for authentication errors.
    pub fn auth_failed(email: impl Into<String>, reason: impl Into<String>) -> Self {
        BridgeError::Auth { email: email.into(), reason: reason.into() }
    }

    /// Helper constructor for path/key resolution errors.
    pub fn resolution(reason: impl Into<String>) -> Self {
        BridgeError::Resolution { reason: reason.into() }
    }

    /// Helper constructor for Windows API errors.
    #[cfg(windows)]
    pub fn windows_api_error(operation: impl Into<String>, source: win_core::Error) -> Self {
        BridgeError::WindowsApi { operation: operation.into(), source }
    }

    /// Helper constructor for unsupported platform errors.
    pub fn unsupported_platform(
        feature: impl Into<String>,
        required_platform: impl Into<String>,
    ) -> Self {
        BridgeError::UnsupportedPlatform {
            feature: feature.into(),
            required_platform: required_platform.into(),
        }
    }
}

#[cfg(windows)]
impl From<win_core::Error> for BridgeError {
    fn from(err: win_core::Error) -> Self {
        BridgeError::WindowsApi { operation: "Unknown Windows operation".to_string(), source: err }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[cfg(test)]
    mod property_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn error_messages_contain_their_context(
                reason in ".*",
                email in "[a-z]{1,16}@[a-z]{1,8}\\.com",
                path in "[a-zA-Z0-9/_-]{1,40}",
            ) {
                let conn = BridgeError::connectivity(reason.clone());
                prop_assert!(conn.to_string().contains(&reason));

                let auth = BridgeError::auth_failed(email.clone(), reason.clone());
                let auth_msg = auth.to_string();
                prop_assert!(auth_msg.contains(&email));
                prop_assert!(auth_msg.contains(&reason));

                let missing = BridgeError::KeyNotFound { path: path.clone() };
                prop_assert!(missing.to_string().contains(&path));

                let not_found = BridgeError::UserNotFound { email: email.clone() };
                prop_assert!(not_found.to_string().contains(&email));
            }

            #[test]
            fn source_chaining_preserves_information(base_message in ".*") {
                let base: Box<dyn std::error::Error + Send + Sync> =
                    Box::new(std::io::Error::other(base_message.clone()));
                let top = BridgeError::connectivity_with_source("store down", base);

                let source = std::error::Error::source(&top);
                prop_assert!(source.is_some());
                prop_assert!(source.unwrap().to_string().contains(&base_message));
            }
        }
    }

    #[test]
    fn error_constructors_validation() {
        let config = BridgeError::config_missing("client_name");
        assert!(matches!(config, BridgeError::Config { field: "client_name" }));

        let conn = BridgeError::connectivity("test");
        assert!(matches!(conn, BridgeError::Connectivity { .. }));

        let res = BridgeError::resolution("empty key");
        assert!(matches!(res, BridgeError::Resolution { .. }));
    }

    #[test]
    fn error_traits_validation() {
        // Compile-time check: BridgeError must be Send + Sync + 'static
        fn assert_send_sync_static<T: Send + Sync + 'static>() {}
        assert_send_sync_static::<BridgeError>();

        let error = BridgeError::connectivity("test");
        let _: &dyn std::error::Error = &error;
    }

    #[test]
    fn retryable_classification() {
        assert!(BridgeError::TransactionActive.is_retryable());
        assert!(BridgeError::connectivity("down").is_retryable());
        assert!(!BridgeError::config_missing("email").is_retryable());
        assert!(!BridgeError::Stopped.is_retryable());
        assert!(
            !BridgeError::TypeMismatch {
                requested: ScalarKind::Integer,
                stored: ScalarKind::Text
            }
            .is_retryable()
        );
    }

    #[test]
    fn type_mismatch_message_names_both_kinds() {
        let err =
            BridgeError::TypeMismatch { requested: ScalarKind::Integer, stored: ScalarKind::Text };
        let msg = err.to_string();
        assert!(msg.contains("integer"));
        assert!(msg.contains("text"));
    }
}
