//! # Verification Service
//!
//! The one entry point servers call. A response moves through four
//! stages and the first failure ends the call:
//!
//! ```text
//! received -> envelope validated -> requests matched -> proofs verified -> result
//! ```
//!
//! The envelope stage compares the response's version, appId and namespace
//! against server-side values. Matching reconciles proofs with the request
//! (see [`crate::response::matcher`]). Each proof is then handed to the
//! [`SchemeVerifier`] its `provingScheme` selects; proofs are independent,
//! so they are verified concurrently. Nothing partial is ever returned.

pub mod error;
pub mod result;

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use futures::future::try_join_all;
use tracing::{debug, info, warn};

use crate::config::{ConfigError, VerifierConfig};
use crate::registry::{AvailableRootsRegistry, CommitmentMapperRegistry, RegistryClient};
use crate::request::SismoConnectRequest;
use crate::response::{match_response, SismoConnectResponse};
use crate::scheme::{scheme_verifier, ProofContext, ProvingScheme, SchemeVerifier};
use crate::zkp::ProofSystem;

pub use error::VerificationError;
pub use result::SismoConnectVerifiedResult;

pub struct SismoConnectVerifier {
    config: VerifierConfig,
    registry: Arc<RegistryClient>,
    verifiers: BTreeMap<ProvingScheme, Arc<dyn SchemeVerifier>>,
}

impl SismoConnectVerifier {
    /// Build a verifier. Registries and the proof system are explicit
    /// collaborators; there is no default network provider.
    pub fn new(
        config: VerifierConfig,
        commitment_mapper: Arc<dyn CommitmentMapperRegistry>,
        roots: Arc<dyn AvailableRootsRegistry>,
        proof_system: Arc<dyn ProofSystem>,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        let registry = Arc::new(RegistryClient::new(
            commitment_mapper,
            roots,
            config.registry_timeout(),
        ));
        let verifiers = config
            .schemes
            .iter()
            .map(|&scheme| {
                let verifier = scheme_verifier(scheme, registry.clone(), proof_system.clone());
                (scheme, verifier)
            })
            .collect();
        Ok(Self {
            config,
            registry,
            verifiers,
        })
    }

    pub fn config(&self) -> &VerifierConfig {
        &self.config
    }

    /// The cached registry client, e.g. to [`RegistryClient::invalidate`]
    /// it after a governance event.
    pub fn registry(&self) -> &Arc<RegistryClient> {
        &self.registry
    }

    pub fn registry_timeout(&self) -> Duration {
        self.registry.timeout()
    }

    /// Schemes this instance accepts, in tag order.
    pub fn schemes(&self) -> impl Iterator<Item = ProvingScheme> + '_ {
        self.verifiers.keys().copied()
    }

    /// Verify an untrusted JSON response against `request`.
    pub async fn verify_json(
        &self,
        request: &SismoConnectRequest,
        json: &str,
    ) -> Result<SismoConnectVerifiedResult, VerificationError> {
        let trimmed = json.trim();
        if trimmed.is_empty() || trimmed == "null" {
            return Err(VerificationError::EmptyResponse("no response payload".into()));
        }
        let response: SismoConnectResponse = serde_json::from_str(trimmed)
            .map_err(|e| VerificationError::MalformedResponse(e.to_string()))?;
        self.verify(request, &response).await
    }

    /// Verify `response` against `request`. All or nothing.
    #[tracing::instrument(
        name = "verify",
        skip_all,
        fields(app_id = %self.config.app_id, proofs = response.proofs.len())
    )]
    pub async fn verify(
        &self,
        request: &SismoConnectRequest,
        response: &SismoConnectResponse,
    ) -> Result<SismoConnectVerifiedResult, VerificationError> {
        match self.run(request, response).await {
            Ok(result) => {
                info!(
                    claims = result.claims.len(),
                    auths = result.auths.len(),
                    "response verified"
                );
                Ok(result)
            }
            Err(err) => {
                warn!(kind = err.kind(), error = %err, "response rejected");
                Err(err)
            }
        }
    }

    async fn run(
        &self,
        request: &SismoConnectRequest,
        response: &SismoConnectResponse,
    ) -> Result<SismoConnectVerifiedResult, VerificationError> {
        self.validate_envelope(request, response)?;
        debug!("envelope validated");

        let matched = match_response(request, response)?;
        debug!(proofs = matched.len(), "requests matched");

        let mut jobs = Vec::with_capacity(matched.len());
        for m in &matched {
            let verifier = self.verifier_for(&m.proof.proving_scheme)?;
            let ctx = ProofContext {
                app_id: &self.config.app_id,
                namespace: &request.namespace,
                signed_message: m.signed_message,
                proof_index: m.index,
            };
            jobs.push(async move { verifier.verify_proof(&ctx, m.proof).await });
        }
        let verified = try_join_all(jobs).await?;
        debug!("proofs verified");

        let mut claims = Vec::new();
        let mut auths = Vec::new();
        for proof in verified {
            claims.extend(proof.claim);
            auths.extend(proof.auth);
        }

        Ok(SismoConnectVerifiedResult {
            app_id: response.app_id.clone(),
            namespace: response.namespace.clone(),
            version: response.version.clone(),
            signed_message: response.signed_message.clone(),
            claims,
            auths,
            response: response.clone(),
        })
    }

    fn validate_envelope(
        &self,
        request: &SismoConnectRequest,
        response: &SismoConnectResponse,
    ) -> Result<(), VerificationError> {
        if response.proofs.is_empty() {
            return Err(VerificationError::EmptyResponse("response carries no proofs".into()));
        }
        if response.version != self.config.version {
            return Err(VerificationError::VersionMismatch {
                expected: self.config.version.clone(),
                actual: response.version.clone(),
            });
        }
        if response.app_id != self.config.app_id {
            return Err(VerificationError::AppIdMismatch {
                expected: self.config.app_id.to_string(),
                actual: response.app_id.to_string(),
            });
        }
        if response.namespace != request.namespace {
            return Err(VerificationError::NamespaceMismatch {
                expected: request.namespace.clone(),
                actual: response.namespace.clone(),
            });
        }
        Ok(())
    }

    fn verifier_for(&self, tag: &str) -> Result<&Arc<dyn SchemeVerifier>, VerificationError> {
        let scheme: ProvingScheme = tag.parse()?;
        self.verifiers
            .get(&scheme)
            .ok_or_else(|| VerificationError::UnknownProvingScheme(tag.to_string()))
    }
}

impl std::fmt::Debug for SismoConnectVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SismoConnectVerifier")
            .field("config", &self.config)
            .field("registry", &self.registry)
            .field("schemes", &self.verifiers.keys().collect::<Vec<_>>())
            .finish()
    }
}
