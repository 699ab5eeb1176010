//! # Proving Schemes
//!
//! A proof names the circuit it was generated with in its `provingScheme`
//! tag. Three generations of the Hydra circuit are in use side by side,
//! and each one lays out its public inputs and encodes its comparator a
//! little differently:
//!
//! | tag          | inputs | comparator input      | vault namespace, flags |
//! |--------------|--------|-----------------------|------------------------|
//! | `hydra-s1.2` | 10     | 1 = EQ, 0 = GTE       | no                     |
//! | `hydra-s2.1` | 14     | 1 = EQ, 0 = GTE       | yes                    |
//! | `hydra-s3.1` | 14     | `ClaimType` code      | yes                    |
//!
//! Each generation implements [`SchemeVerifier`]. The checks they share
//! (identifier recomputation, registry lookups, the final SNARK call) live
//! in [`common`]; each generation file only says what is different about
//! it.
//!
//! ```text
//! inputs.rs       public input layouts
//! common.rs       shared check pipeline
//! hydra_s1.rs     legacy 10-input generation
//! hydra_s2.rs     14 inputs, binary comparator
//! hydra_s3.rs     14 inputs, full comparator set
//! ```

pub mod common;
pub mod hydra_s1;
pub mod hydra_s2;
pub mod hydra_s3;
pub mod inputs;

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use alloy_primitives::Bytes;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::registry::RegistryClient;
use crate::request::AppId;
use crate::response::{SismoConnectProof, VerifiedAuth, VerifiedClaim};
use crate::verifier::VerificationError;
use crate::zkp::ProofSystem;

pub use common::{SchemeCore, VerifiedProof};
pub use hydra_s1::HydraS1Verifier;
pub use hydra_s2::HydraS2Verifier;
pub use hydra_s3::HydraS3Verifier;
pub use inputs::{InputLayout, PublicInputs};

// ---------------------------------------------------------------------------
// Scheme tags
// ---------------------------------------------------------------------------

/// The closed set of supported circuit generations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ProvingScheme {
    #[serde(rename = "hydra-s1.2")]
    HydraS1,
    #[serde(rename = "hydra-s2.1")]
    HydraS2,
    #[serde(rename = "hydra-s3.1")]
    HydraS3,
}

impl ProvingScheme {
    pub const ALL: [ProvingScheme; 3] = [Self::HydraS1, Self::HydraS2, Self::HydraS3];

    pub fn tag(self) -> &'static str {
        match self {
            Self::HydraS1 => "hydra-s1.2",
            Self::HydraS2 => "hydra-s2.1",
            Self::HydraS3 => "hydra-s3.1",
        }
    }

    pub fn layout(self) -> InputLayout {
        match self {
            Self::HydraS1 => InputLayout::Legacy,
            Self::HydraS2 | Self::HydraS3 => InputLayout::Current,
        }
    }
}

impl fmt::Display for ProvingScheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

impl FromStr for ProvingScheme {
    type Err = VerificationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|scheme| scheme.tag() == s)
            .ok_or_else(|| VerificationError::UnknownProvingScheme(s.to_string()))
    }
}

// ---------------------------------------------------------------------------
// Verifier interface
// ---------------------------------------------------------------------------

/// Server-side context a proof is checked against. Never taken from the
/// response itself, except the signed message the matcher already vetted.
#[derive(Debug, Clone, Copy)]
pub struct ProofContext<'a> {
    pub app_id: &'a AppId,
    pub namespace: &'a str,
    pub signed_message: Option<&'a Bytes>,
    /// Position of the proof in the response, for error reports.
    pub proof_index: usize,
}

/// One circuit generation's verification rules.
///
/// Every method runs all public-input checks first and the SNARK check
/// last, so a cheap mismatch never costs a pairing.
#[async_trait]
pub trait SchemeVerifier: Send + Sync {
    fn scheme(&self) -> ProvingScheme;

    /// Verify a proof carrying exactly one claim.
    async fn verify_claim(
        &self,
        ctx: &ProofContext<'_>,
        proof: &SismoConnectProof,
    ) -> Result<VerifiedClaim, VerificationError>;

    /// Verify a proof carrying exactly one auth.
    async fn verify_auth(
        &self,
        ctx: &ProofContext<'_>,
        proof: &SismoConnectProof,
    ) -> Result<VerifiedAuth, VerificationError>;

    /// Verify a proof that only binds a signed message.
    async fn verify_signed_message(
        &self,
        ctx: &ProofContext<'_>,
        proof: &SismoConnectProof,
    ) -> Result<(), VerificationError>;

    /// Verify whatever the proof carries (claim, auth, both, or only a
    /// message) with a single SNARK check.
    async fn verify_proof(
        &self,
        ctx: &ProofContext<'_>,
        proof: &SismoConnectProof,
    ) -> Result<VerifiedProof, VerificationError>;
}

/// Build the verifier for `scheme`.
pub fn scheme_verifier(
    scheme: ProvingScheme,
    registry: Arc<RegistryClient>,
    proof_system: Arc<dyn ProofSystem>,
) -> Arc<dyn SchemeVerifier> {
    let core = SchemeCore::new(registry, proof_system);
    match scheme {
        ProvingScheme::HydraS1 => Arc::new(HydraS1Verifier::new(core)),
        ProvingScheme::HydraS2 => Arc::new(HydraS2Verifier::new(core)),
        ProvingScheme::HydraS3 => Arc::new(HydraS3Verifier::new(core)),
    }
}
