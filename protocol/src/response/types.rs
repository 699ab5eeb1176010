//! Response types, as sent by the wallet, and the verified records built
//! from them.
//!
//! A [`SismoConnectResponse`] is untrusted input. Nothing in it means
//! anything until [`crate::verifier::SismoConnectVerifier`] has checked it;
//! [`VerifiedClaim`] and [`VerifiedAuth`] only come into existence after
//! that.

use std::fmt;

use alloy_primitives::{Bytes, U256};
use serde::{Deserialize, Serialize};

use crate::config::DEFAULT_NAMESPACE;
use crate::request::{AppId, AuthType, ClaimType, GroupId, GroupTimestamp};
use crate::serde_utils;

fn default_namespace() -> String {
    DEFAULT_NAMESPACE.to_string()
}

/// The response envelope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SismoConnectResponse {
    pub app_id: AppId,
    #[serde(default = "default_namespace")]
    pub namespace: String,
    pub version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signed_message: Option<Bytes>,
    #[serde(default)]
    pub proofs: Vec<SismoConnectProof>,
}

/// One proof and the claim/auth it asserts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SismoConnectProof {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub claims: Vec<Claim>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub auths: Vec<Auth>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signed_message: Option<Bytes>,
    pub proving_scheme: String,
    pub proof_data: Bytes,
    #[serde(default)]
    pub extra_data: String,
}

impl SismoConnectProof {
    /// The single claim of this proof, if any.
    pub fn claim(&self) -> Option<&Claim> {
        self.claims.first()
    }

    /// The single auth of this proof, if any.
    pub fn auth(&self) -> Option<&Auth> {
        self.auths.first()
    }

    /// Whether the proof asserts no claim and no auth.
    pub fn is_signature_only(&self) -> bool {
        self.claims.is_empty() && self.auths.is_empty()
    }
}

/// A claim as asserted by a proof.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Claim {
    pub group_id: GroupId,
    pub claim_type: ClaimType,
    #[serde(default)]
    pub extra_data: String,
    pub group_timestamp: GroupTimestamp,
    #[serde(with = "serde_utils::value_u256")]
    pub value: U256,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub is_selectable_by_user: bool,
}

impl fmt::Display for Claim {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "claim {{ groupId: {}, groupTimestamp: {}, claimType: {}, value: {} }}",
            self.group_id, self.group_timestamp, self.claim_type, self.value
        )
    }
}

/// An auth as asserted by a proof.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Auth {
    pub auth_type: AuthType,
    #[serde(default)]
    pub is_anon: bool,
    /// The account the wallet says it proves; zero if it didn't say.
    #[serde(default, with = "serde_utils::hex_u256")]
    pub user_id: U256,
    #[serde(default)]
    pub extra_data: String,
}

impl fmt::Display for Auth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "auth {{ authType: {}, userId: {:#x} }}", self.auth_type, self.user_id)
    }
}

/// A claim whose proof passed every check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifiedClaim {
    #[serde(flatten)]
    pub claim: Claim,
    /// The proof identifier (nullifier), as a 32-byte hex word.
    pub proof_id: String,
    pub proof_data: Bytes,
}

/// An auth whose proof passed every check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifiedAuth {
    pub auth_type: AuthType,
    pub is_anon: bool,
    /// Platform-native account identifier.
    pub user_id: String,
    pub extra_data: String,
    pub proof_id: String,
    pub proof_data: Bytes,
}
