//! # Protocol Configuration & Constants
//!
//! Every magic number of the verifier lives here: protocol version strings,
//! sentinels the wallet and the verifier must agree on byte for byte, and
//! the runtime [`VerifierConfig`] a server hands to
//! [`crate::verifier::SismoConnectVerifier`].
//!
//! Changing a constant in this file changes what proofs the verifier accepts.
//! Treat every edit like a protocol upgrade, because it is one.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::request::AppId;
use crate::scheme::ProvingScheme;

// ---------------------------------------------------------------------------
// Protocol Version
// ---------------------------------------------------------------------------

/// The response envelope version this verifier speaks.
pub const SISMO_CONNECT_VERSION: &str = "sismo-connect-v1.1";

/// Namespace used when neither the request nor the response names one.
pub const DEFAULT_NAMESPACE: &str = "main";

/// Message placeholder for signature requests the user fills in themselves.
pub const MESSAGE_SELECTED_BY_USER: &str = "MESSAGE_SELECTED_BY_USER";

/// The literal packed into the upper half of a word to mean "latest snapshot".
pub const LATEST_TIMESTAMP_LABEL: &str = "latest";

// ---------------------------------------------------------------------------
// Account Identifiers
// ---------------------------------------------------------------------------

/// Two-byte prefix the commitment mapper puts in front of GitHub account ids.
pub const GITHUB_ID_PREFIX: u16 = 0x1001;

/// Two-byte prefix the commitment mapper puts in front of Twitter account ids.
pub const TWITTER_ID_PREFIX: u16 = 0x1002;

// ---------------------------------------------------------------------------
// Runtime
// ---------------------------------------------------------------------------

/// Default bound on a single registry RPC call.
pub const DEFAULT_REGISTRY_TIMEOUT: Duration = Duration::from_secs(10);

fn default_version() -> String {
    SISMO_CONNECT_VERSION.to_string()
}

fn default_schemes() -> Vec<ProvingScheme> {
    ProvingScheme::ALL.to_vec()
}

fn default_registry_timeout_ms() -> u64 {
    DEFAULT_REGISTRY_TIMEOUT.as_millis() as u64
}

/// Errors raised while validating a [`VerifierConfig`].
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// The configured version string is empty.
    #[error("protocol version must not be empty")]
    EmptyVersion,

    /// No proving scheme is enabled, so every response would be rejected.
    #[error("at least one proving scheme must be enabled")]
    NoSchemes,

    /// A zero timeout would turn every registry call into a failure.
    #[error("registry timeout must be greater than zero")]
    ZeroTimeout,
}

/// Server-side settings for a verifier instance.
///
/// Everything the verifier compares the untrusted response envelope
/// against comes from here, never from the response itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifierConfig {
    /// The application id responses must be bound to.
    pub app_id: AppId,
    /// Expected `version` field of every response.
    #[serde(default = "default_version")]
    pub version: String,
    /// Proving schemes this instance accepts. Order is irrelevant.
    #[serde(default = "default_schemes")]
    pub schemes: Vec<ProvingScheme>,
    /// Bound on each registry call, in milliseconds.
    #[serde(default = "default_registry_timeout_ms")]
    pub registry_timeout_ms: u64,
}

impl VerifierConfig {
    /// A config accepting every known scheme with default timeouts.
    pub fn new(app_id: AppId) -> Self {
        Self {
            app_id,
            version: default_version(),
            schemes: default_schemes(),
            registry_timeout_ms: default_registry_timeout_ms(),
        }
    }

    /// Restrict the accepted proving schemes.
    pub fn with_schemes(mut self, schemes: impl IntoIterator<Item = ProvingScheme>) -> Self {
        self.schemes = schemes.into_iter().collect();
        self
    }

    /// Override the registry call timeout.
    pub fn with_registry_timeout(mut self, timeout: Duration) -> Self {
        self.registry_timeout_ms = timeout.as_millis() as u64;
        self
    }

    pub fn registry_timeout(&self) -> Duration {
        Duration::from_millis(self.registry_timeout_ms)
    }

    /// Reject configurations that could never verify anything.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.version.trim().is_empty() {
            return Err(ConfigError::EmptyVersion);
        }
        if self.schemes.is_empty() {
            return Err(ConfigError::NoSchemes);
        }
        if self.registry_timeout_ms == 0 {
            return Err(ConfigError::ZeroTimeout);
        }
        Ok(())
    }
}
