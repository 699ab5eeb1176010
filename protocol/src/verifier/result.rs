//! The outcome of a successful verification.

use alloy_primitives::Bytes;
use serde::{Deserialize, Serialize};

use crate::request::{AppId, AuthType};
use crate::response::{SismoConnectResponse, VerifiedAuth, VerifiedClaim};

/// Everything a response proved, together with the response itself.
///
/// Only [`crate::verifier::SismoConnectVerifier`] builds these, so holding
/// one means every required request was satisfied and every proof checked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SismoConnectVerifiedResult {
    pub app_id: AppId,
    pub namespace: String,
    pub version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signed_message: Option<Bytes>,
    pub claims: Vec<VerifiedClaim>,
    pub auths: Vec<VerifiedAuth>,
    pub response: SismoConnectResponse,
}

impl SismoConnectVerifiedResult {
    /// The first proven user id of `auth_type`.
    pub fn get_user_id(&self, auth_type: AuthType) -> Option<&str> {
        self.auths
            .iter()
            .find(|auth| auth.auth_type == auth_type)
            .map(|auth| auth.user_id.as_str())
    }

    /// Every proven user id of `auth_type`, in proof order.
    pub fn get_user_ids(&self, auth_type: AuthType) -> Vec<&str> {
        self.auths
            .iter()
            .filter(|auth| auth.auth_type == auth_type)
            .map(|auth| auth.user_id.as_str())
            .collect()
    }

    pub fn get_signed_message(&self) -> Option<&Bytes> {
        self.signed_message.as_ref()
    }
}
