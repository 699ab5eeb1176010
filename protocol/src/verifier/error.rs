//! Error taxonomy of the verification pipeline.
//!
//! Verification is binary: it succeeds, or it fails with exactly one of
//! these. Nothing is ever downgraded to a warning. Only
//! [`VerificationError::RegistryUnavailable`] is worth retrying; every other
//! variant will fail the same way on every attempt.

use thiserror::Error;

use crate::registry::RegistryError;
use crate::request::RequestError;
use crate::scheme::ProvingScheme;
use crate::zkp::{EnvelopeError, ProofSystemError};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum VerificationError {
    // -- Envelope ----------------------------------------------------------
    /// No response, or a response without a single proof.
    #[error("empty response: {0}")]
    EmptyResponse(String),

    /// A response payload that does not decode as a response.
    #[error("malformed response: {0}")]
    MalformedResponse(String),

    #[error("version mismatch: expected {expected}, got {actual}")]
    VersionMismatch { expected: String, actual: String },

    #[error("appId mismatch: expected {expected}, got {actual}")]
    AppIdMismatch { expected: String, actual: String },

    #[error("namespace mismatch: expected {expected}, got {actual}")]
    NamespaceMismatch { expected: String, actual: String },

    // -- Request construction ---------------------------------------------
    #[error(transparent)]
    Request(#[from] RequestError),

    // -- Request / response matching ----------------------------------------
    #[error("no proof in the response satisfies the required {0}")]
    RequiredProofMissing(String),

    #[error("insufficient proofs: {required} required, response carries {provided}")]
    InsufficientProofs { required: usize, provided: usize },

    #[error("proof {index} carries {descriptor}, which was never requested")]
    UnsolicitedProof { index: usize, descriptor: String },

    #[error("proof {index} asserts nothing: no claim, no auth, no signed message")]
    EmptyProof { index: usize },

    #[error("signed message mismatch: expected {expected}, got {actual}")]
    SignatureMismatch { expected: String, actual: String },

    #[error("proof {index} carries more than one {item}; multi-item proofs are not supported")]
    MultiItemProof { index: usize, item: &'static str },

    // -- Proving schemes ----------------------------------------------------
    #[error("unknown or disabled proving scheme {0:?}")]
    UnknownProvingScheme(String),

    #[error("proving scheme {scheme} does not support {feature}")]
    SchemeUnsupported {
        scheme: ProvingScheme,
        feature: String,
    },

    #[error("malformed proof: {0}")]
    MalformedProof(String),

    /// A public input does not match the value recomputed from the request.
    #[error("{field} mismatch in proof {proof_id}: expected {expected}, got {actual}")]
    FieldMismatch {
        field: &'static str,
        expected: String,
        actual: String,
        proof_id: String,
    },

    // -- Policy ---------------------------------------------------------------
    #[error("registry tree root {root} is not available (proof {proof_id})")]
    RootNotAvailable { root: String, proof_id: String },

    #[error("anonymous auth is not supported")]
    AnonNotSupported,

    // -- Cryptography ---------------------------------------------------------
    #[error("invalid proof {proof_id}: {reason}")]
    InvalidProof { proof_id: String, reason: String },

    // -- Infrastructure -------------------------------------------------------
    #[error("registry unavailable: {0}")]
    RegistryUnavailable(String),
}

impl VerificationError {
    /// Stable snake_case label, for metrics and API error bodies.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::EmptyResponse(_) => "empty_response",
            Self::MalformedResponse(_) => "malformed_response",
            Self::VersionMismatch { .. } => "version_mismatch",
            Self::AppIdMismatch { .. } => "app_id_mismatch",
            Self::NamespaceMismatch { .. } => "namespace_mismatch",
            Self::Request(RequestError::ConflictingRequest { .. }) => "conflicting_request",
            Self::Request(RequestError::EmptyRequest) => "empty_request",
            Self::Request(RequestError::InvalidRequest(_)) => "invalid_request",
            Self::RequiredProofMissing(_) => "required_proof_missing",
            Self::InsufficientProofs { .. } => "insufficient_proofs",
            Self::UnsolicitedProof { .. } => "unsolicited_proof",
            Self::EmptyProof { .. } => "empty_proof",
            Self::SignatureMismatch { .. } => "signature_mismatch",
            Self::MultiItemProof { .. } => "multi_item_proof",
            Self::UnknownProvingScheme(_) => "unknown_proving_scheme",
            Self::SchemeUnsupported { .. } => "scheme_unsupported",
            Self::MalformedProof(_) => "malformed_proof",
            Self::FieldMismatch { .. } => "field_mismatch",
            Self::RootNotAvailable { .. } => "root_not_available",
            Self::AnonNotSupported => "anon_not_supported",
            Self::InvalidProof { .. } => "invalid_proof",
            Self::RegistryUnavailable(_) => "registry_unavailable",
        }
    }

    /// Whether a caller may retry the same verification later.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::RegistryUnavailable(_))
    }

    /// Whether the failure is the caller's own request, not the response.
    pub fn is_request_error(&self) -> bool {
        matches!(self, Self::Request(_))
    }
}

impl From<RegistryError> for VerificationError {
    fn from(err: RegistryError) -> Self {
        Self::RegistryUnavailable(err.to_string())
    }
}

impl From<EnvelopeError> for VerificationError {
    fn from(err: EnvelopeError) -> Self {
        Self::MalformedProof(err.to_string())
    }
}

impl VerificationError {
    /// Map a backend failure for the proof identified by `proof_id`.
    pub(crate) fn from_proof_system(err: ProofSystemError, proof_id: &str) -> Self {
        match err {
            ProofSystemError::MissingVerifyingKey(scheme) => Self::SchemeUnsupported {
                scheme,
                feature: "verification: no verifying key is loaded".into(),
            },
            ProofSystemError::InvalidPoint(_)
            | ProofSystemError::NonCanonicalInput { .. }
            | ProofSystemError::InputCountMismatch { .. } => Self::MalformedProof(err.to_string()),
            ProofSystemError::KeyDecoding(_) | ProofSystemError::Backend(_) => Self::InvalidProof {
                proof_id: proof_id.to_string(),
                reason: err.to_string(),
            },
        }
    }
}
