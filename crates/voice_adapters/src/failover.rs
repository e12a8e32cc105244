//! Credential pool with sequential failover
//!
//! The pool is immutable and shared; the cursor walking it lives on the
//! stack of each [`CredentialPool::dispatch`] call, so concurrent requests
//! never see each other's progress.

use std::future::Future;
use std::sync::Arc;

use secrecy::SecretString;
use tracing::{debug, warn};

use crate::error::SpeechError;

/// Ordered, non-empty set of interchangeable access credentials
#[derive(Clone)]
pub struct CredentialPool {
    credentials: Arc<[SecretString]>,
}

impl std::fmt::Debug for CredentialPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialPool")
            .field("credentials", &format!("[{} REDACTED]", self.credentials.len()))
            .finish()
    }
}

impl CredentialPool {
    /// Create a pool from `credentials`
    ///
    /// # Errors
    ///
    /// Returns `SpeechError::Configuration` if there are no credentials.
    pub fn new(credentials: impl IntoIterator<Item = SecretString>) -> Result<Self, SpeechError> {
        let credentials: Arc<[SecretString]> = credentials.into_iter().collect();
        if credentials.is_empty() {
            return Err(SpeechError::Configuration(
                "Credential pool must contain at least one credential".to_string(),
            ));
        }
        Ok(Self { credentials })
    }

    /// Number of credentials
    #[must_use]
    pub fn len(&self) -> usize {
        self.credentials.len()
    }

    /// Always `false`; an empty pool cannot be constructed
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.credentials.is_empty()
    }

    /// Run `attempt` with each credential in turn until one succeeds
    ///
    /// Starts from the first credential on every call. Each failure advances
    /// the cursor; when it wraps back to the start the whole pool has failed
    /// and the call gives up. No delay between attempts.
    ///
    /// # Errors
    ///
    /// Returns `SpeechError::CredentialsExhausted` after every credential
    /// failed once.
    pub async fn dispatch<'p, T, F, Fut>(&'p self, mut attempt: F) -> Result<T, SpeechError>
    where
        F: FnMut(usize, &'p SecretString) -> Fut,
        Fut: Future<Output = Result<T, SpeechError>>,
    {
        let mut cursor = 0;
        loop {
            let credential = &self.credentials[cursor];
            match attempt(cursor, credential).await {
                Ok(value) => {
                    debug!(credential_index = cursor, "Request succeeded");
                    return Ok(value);
                },
                Err(e) => {
                    warn!(credential_index = cursor, "Request failed, rotating credential: {e}");
                    cursor = (cursor + 1) % self.credentials.len();
                    if cursor == 0 {
                        return Err(SpeechError::CredentialsExhausted {
                            attempts: self.credentials.len(),
                            last_error: e.to_string(),
                        });
                    }
                },
            }
        }
    }
}
