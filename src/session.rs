//! Credential verification behind a capability trait.
//!
//! The session itself is plain data (see `domain::Session`); what varies is
//! how credentials get checked. The shipped implementation is an explicit
//! mock that accepts any non-empty pair after a fixed artificial delay, kept
//! substitutable so a real verifier can slot in later.

use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

/// Errors produced by credential verification.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AuthError {
    #[error("username must not be empty")]
    EmptyUsername,

    #[error("password must not be empty")]
    EmptyPassword,
}

/// Verifies a username/password pair.
#[async_trait]
pub trait AuthProvider: Send + Sync {
    async fn verify(&self, username: &str, password: &str) -> Result<(), AuthError>;
}

/// Mock verifier: no credential store is consulted. Any non-empty pair
/// succeeds after the configured delay.
pub struct MockAuth {
    delay: Duration,
}

impl MockAuth {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }
}

impl Default for MockAuth {
    fn default() -> Self {
        // Matches the sign-in spinner duration the frontend shows.
        Self::new(Duration::from_millis(1500))
    }
}

#[async_trait]
impl AuthProvider for MockAuth {
    async fn verify(&self, username: &str, password: &str) -> Result<(), AuthError> {
        if username.trim().is_empty() {
            return Err(AuthError::EmptyUsername);
        }
        if password.is_empty() {
            return Err(AuthError::EmptyPassword);
        }

        tokio::time::sleep(self.delay).await;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn instant_auth() -> MockAuth {
        MockAuth::new(Duration::from_millis(0))
    }

    #[tokio::test]
    async fn test_non_empty_credentials_accepted() {
        assert_eq!(instant_auth().verify("anna", "secret").await, Ok(()));
    }

    #[tokio::test]
    async fn test_empty_username_rejected() {
        assert_eq!(
            instant_auth().verify("", "secret").await,
            Err(AuthError::EmptyUsername)
        );
        assert_eq!(
            instant_auth().verify("   ", "secret").await,
            Err(AuthError::EmptyUsername)
        );
    }

    #[tokio::test]
    async fn test_empty_password_rejected() {
        assert_eq!(
            instant_auth().verify("anna", "").await,
            Err(AuthError::EmptyPassword)
        );
    }
}
