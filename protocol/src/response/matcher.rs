//! # Response Matcher
//!
//! Reconciles what was asked for with what came back, before a single
//! proof is cryptographically checked. Pure logic, no I/O.
//!
//! The rules, in the order they are enforced:
//!
//! 1. A proof carries at most one claim and at most one auth.
//! 2. A proof with neither is a signed-message proof, and only makes sense
//!    if a signature was requested and a message is actually present.
//! 3. Every non-optional claim and auth request has a matching proof item.
//! 4. The response carries at least as many claim/auth items as there are
//!    non-optional requests.
//! 5. Every claim and auth carried by the response matches *some* request,
//!    optional ones included. Nothing unsolicited gets verified.
//! 6. A pinned signature request is answered with exactly its message.
//!
//! The output is the list of proofs to verify, each paired with the signed
//! message that applies to it.

use alloy_primitives::Bytes;

use super::types::{Auth, Claim, SismoConnectProof, SismoConnectResponse};
use crate::request::{AuthRequest, ClaimRequest, SismoConnectRequest};
use crate::verifier::VerificationError;

/// A response proof cleared for cryptographic verification.
#[derive(Debug, Clone, Copy)]
pub struct MatchedProof<'a> {
    /// Position of the proof in the response.
    pub index: usize,
    pub proof: &'a SismoConnectProof,
    /// The proof's own signed message, else the response-level one.
    pub signed_message: Option<&'a Bytes>,
}

/// Whether `claim` satisfies `request`: same group snapshot, same
/// comparator, and a revealed value the comparator accepts.
pub fn claim_satisfies(request: &ClaimRequest, claim: &Claim) -> bool {
    request.group_id == claim.group_id
        && request.group_timestamp == claim.group_timestamp
        && request.claim_type == claim.claim_type
        && request.claim_type.accepts(request.value, claim.value)
}

/// Whether `auth` satisfies `request`: same account type, and either any
/// account is acceptable or it is the requested one.
pub fn auth_satisfies(request: &AuthRequest, auth: &Auth) -> bool {
    request.auth_type == auth.auth_type
        && (request.user_id.is_zero()
            || request.is_selectable_by_user
            || request.user_id == auth.user_id)
}

/// Match `response` against `request`.
pub fn match_response<'a>(
    request: &SismoConnectRequest,
    response: &'a SismoConnectResponse,
) -> Result<Vec<MatchedProof<'a>>, VerificationError> {
    let matched: Vec<MatchedProof<'a>> = response
        .proofs
        .iter()
        .enumerate()
        .map(|(index, proof)| MatchedProof {
            index,
            proof,
            signed_message: proof.signed_message.as_ref().or(response.signed_message.as_ref()),
        })
        .collect();

    for m in &matched {
        check_shape(request, m)?;
    }

    let claims: Vec<&Claim> = response.proofs.iter().flat_map(|p| p.claims.iter()).collect();
    let auths: Vec<&Auth> = response.proofs.iter().flat_map(|p| p.auths.iter()).collect();

    for wanted in request.claims.iter().filter(|c| !c.is_optional) {
        if !claims.iter().any(|claim| claim_satisfies(wanted, claim)) {
            return Err(VerificationError::RequiredProofMissing(wanted.to_string()));
        }
    }
    for wanted in request.auths.iter().filter(|a| !a.is_optional) {
        if !auths.iter().any(|auth| auth_satisfies(wanted, auth)) {
            return Err(VerificationError::RequiredProofMissing(wanted.to_string()));
        }
    }

    let required = request.required_count();
    let provided = response.proofs.len();
    if provided < required {
        return Err(VerificationError::InsufficientProofs { required, provided });
    }

    for m in &matched {
        for claim in &m.proof.claims {
            if !request.claims.iter().any(|wanted| claim_satisfies(wanted, claim)) {
                return Err(VerificationError::UnsolicitedProof {
                    index: m.index,
                    descriptor: claim.to_string(),
                });
            }
        }
        for auth in &m.proof.auths {
            if !request.auths.iter().any(|wanted| auth_satisfies(wanted, auth)) {
                return Err(VerificationError::UnsolicitedProof {
                    index: m.index,
                    descriptor: auth.to_string(),
                });
            }
        }
    }

    if let Some(signature) = &request.signature {
        for m in &matched {
            let Some(actual) = m.signed_message else {
                return Err(VerificationError::SignatureMismatch {
                    expected: describe_expected(signature.required_message()),
                    actual: "no signed message".into(),
                });
            };
            if let Some(expected) = signature.required_message() {
                if expected != actual {
                    return Err(VerificationError::SignatureMismatch {
                        expected: expected.to_string(),
                        actual: actual.to_string(),
                    });
                }
            }
        }
    }

    Ok(matched)
}

fn check_shape(request: &SismoConnectRequest, m: &MatchedProof<'_>) -> Result<(), VerificationError> {
    if m.proof.claims.len() > 1 {
        return Err(VerificationError::MultiItemProof {
            index: m.index,
            item: "claim",
        });
    }
    if m.proof.auths.len() > 1 {
        return Err(VerificationError::MultiItemProof {
            index: m.index,
            item: "auth",
        });
    }
    if m.proof.is_signature_only() && (request.signature.is_none() || m.signed_message.is_none()) {
        return Err(VerificationError::EmptyProof { index: m.index });
    }
    Ok(())
}

fn describe_expected(message: Option<&Bytes>) -> String {
    message.map_or_else(|| "a user-selected message".to_string(), |m| m.to_string())
}
