//! Client configuration.

use serde::{Deserialize, Serialize};

use crate::{BridgeError, Result};

/// Credentials and identity for one record-store client.
///
/// All four fields are opaque strings validated only for non-emptiness; the
/// connection blob in particular is passed through to the store untouched
/// (for the hosted backend it is the project's JSON service config).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    client_name: String,
    email: String,
    password: String,
    connection_config: String,
}

impl ClientConfig {
    /// Build a validated configuration.
    ///
    /// # Errors
    ///
    /// Returns [`BridgeError::Config`] naming the first empty field.
    pub fn new(
        client_name: impl Into<String>,
        email: impl Into<String>,
        password: impl Into<String>,
        connection_config: impl Into<String>,
    ) -> Result<Self> {
        let config = Self {
            client_name: client_name.into(),
            email: email.into(),
            password: password.into(),
            connection_config: connection_config.into(),
        };

        if config.client_name.is_empty() {
            return Err(BridgeError::config_missing("client_name"));
        }
        if config.email.is_empty() {
            return Err(BridgeError::config_missing("email"));
        }
        if config.password.is_empty() {
            return Err(BridgeError::config_missing("password"));
        }
        if config.connection_config.is_empty() {
            return Err(BridgeError::config_missing("connection_config"));
        }

        Ok(config)
    }

    /// The client display name, used as the root of this client's record tree.
    pub fn client_name(&self) -> &str {
        &self.client_name
    }

    /// The account email.
    pub fn email(&self) -> &str {
        &self.email
    }

    /// The account password.
    pub fn password(&self) -> &str {
        &self.password
    }

    /// The opaque connection-config blob for the store backend.
    pub fn connection_config(&self) -> &str {
        &self.connection_config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid() -> Result<ClientConfig> {
        ClientConfig::new("PC-TEST", "pc@example.com", "hunter2", "{\"project\":\"demo\"}")
    }

    #[test]
    fn accepts_non_empty_fields() {
        let config = valid().unwrap();
        assert_eq!(config.client_name(), "PC-TEST");
        assert_eq!(config.email(), "pc@example.com");
    }

    #[test]
    fn rejects_each_empty_field() {
        let cases: [(&str, &str, &str, &str, &str); 4] = [
            ("", "e@x.com", "p", "{}", "client_name"),
            ("c", "", "p", "{}", "email"),
            ("c", "e@x.com", "", "{}", "password"),
            ("c", "e@x.com", "p", "", "connection_config"),
        ];
        for (name, email, password, blob, expected) in cases {
            match ClientConfig::new(name, email, password, blob) {
                Err(BridgeError::Config { field }) => assert_eq!(field, expected),
                other => panic!("expected Config error for {expected}, got {other:?}"),
            }
        }
    }
}
