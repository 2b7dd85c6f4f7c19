//! Social-platform authentication.
//!
//! Authentication is a three-step external protocol: obtain a redirect
//! URL, let the user complete it elsewhere, and poll for the grant. The
//! engine treats the whole dance as a single blocking call with a fixed
//! wall-clock timeout; on expiry the session is closed so no pending UI
//! resource outlives the attempt.

use crate::core::Profile;
use crate::errors::WorkflowError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use uuid::Uuid;

/// An in-flight authentication attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthSession {
    /// Provider-assigned session identifier.
    pub session_id: Uuid,
    /// URL the user must open to approve the connection.
    pub authorize_url: String,
}

/// A completed authentication: the credential plus who it belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthGrant {
    /// Opaque credential for publish calls.
    pub access_token: String,
    /// Minimal identity of the connected account.
    pub profile: Profile,
}

/// Timing configuration for the authentication flow.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Wall-clock bound on the whole flow, in seconds.
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: f64,
    /// Delay between completion polls, in milliseconds.
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
}

fn default_timeout_seconds() -> f64 {
    120.0
}

fn default_poll_interval_ms() -> u64 {
    1500
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            timeout_seconds: default_timeout_seconds(),
            poll_interval_ms: default_poll_interval_ms(),
        }
    }
}

impl AuthConfig {
    /// Creates the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the overall timeout.
    #[must_use]
    pub fn with_timeout_seconds(mut self, seconds: f64) -> Self {
        self.timeout_seconds = seconds;
        self
    }

    /// Sets the poll interval.
    #[must_use]
    pub fn with_poll_interval_ms(mut self, millis: u64) -> Self {
        self.poll_interval_ms = millis;
        self
    }

    /// The timeout as a [`Duration`].
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs_f64(self.timeout_seconds)
    }

    /// The poll interval as a [`Duration`].
    #[must_use]
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

/// The external authentication capability.
#[async_trait]
pub trait AuthProvider: Send + Sync {
    /// Starts a session and returns the URL the user must visit.
    async fn begin(&self) -> anyhow::Result<AuthSession>;

    /// Checks whether the user has completed the flow. `None` means
    /// still pending.
    async fn poll(&self, session: &AuthSession) -> anyhow::Result<Option<AuthGrant>>;

    /// Releases any resources held by the session (e.g. a popup).
    async fn close(&self, session: &AuthSession);
}

/// Drives the three-step flow to completion as one blocking call.
///
/// Polls the provider at the configured interval until a grant arrives,
/// the provider errors, or the timeout elapses. The session is closed on
/// every non-success path.
///
/// # Errors
///
/// Returns [`WorkflowError::AuthTimeout`] when the window elapses and
/// [`WorkflowError::Auth`] when the provider fails.
pub async fn authenticate(
    provider: &dyn AuthProvider,
    config: &AuthConfig,
) -> Result<AuthGrant, WorkflowError> {
    let session = provider.begin().await.map_err(|e| WorkflowError::Auth {
        message: e.to_string(),
    })?;

    let outcome = tokio::time::timeout(config.timeout(), async {
        loop {
            match provider.poll(&session).await {
                Ok(Some(grant)) => return Ok(grant),
                Ok(None) => tokio::time::sleep(config.poll_interval()).await,
                Err(error) => {
                    return Err(WorkflowError::Auth {
                        message: error.to_string(),
                    })
                }
            }
        }
    })
    .await;

    match outcome {
        Ok(Ok(grant)) => Ok(grant),
        Ok(Err(error)) => {
            provider.close(&session).await;
            Err(error)
        }
        Err(_) => {
            provider.close(&session).await;
            Err(WorkflowError::AuthTimeout {
                seconds: config.timeout_seconds,
            })
        }
    }
}
