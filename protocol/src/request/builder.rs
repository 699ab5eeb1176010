//! Request construction.
//!
//! Applications describe what they want with partial inputs
//! ([`ClaimRequestInput`], [`AuthRequestInput`], [`SignatureRequestInput`])
//! and [`SismoConnectRequestInput::build`] turns them into one immutable
//! [`SismoConnectRequest`] with every default filled in. The inputs are
//! never mutated, so one input can be built any number of times.
//!
//! Defaults:
//!
//! | field              | default    |
//! |--------------------|------------|
//! | `groupTimestamp`   | `"latest"` |
//! | `value`            | `1`        |
//! | `claimType`        | `GTE`      |
//! | `extraData`        | `""`       |
//! | `isAnon`           | `false`    |
//! | `userId`           | `0` (any)  |
//! | `namespace`        | `"main"`   |

use alloy_primitives::{Bytes, U256};
use serde::{Deserialize, Serialize};

use super::error::RequestError;
use super::types::{
    AuthRequest, AuthType, ClaimRequest, ClaimType, GroupId, GroupTimestamp, RequestedMessage,
    SignatureRequest, SismoConnectRequest,
};
use crate::config::DEFAULT_NAMESPACE;
use crate::serde_utils;

// ---------------------------------------------------------------------------
// Claim
// ---------------------------------------------------------------------------

/// A claim request as the application writes it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ClaimRequestInput {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group_id: Option<GroupId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group_timestamp: Option<GroupTimestamp>,
    #[serde(
        with = "serde_utils::value_u256::option",
        skip_serializing_if = "Option::is_none"
    )]
    pub value: Option<U256>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub claim_type: Option<ClaimType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extra_data: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_optional: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_selectable_by_user: Option<bool>,
}

impl ClaimRequestInput {
    pub fn new(group_id: GroupId) -> Self {
        Self {
            group_id: Some(group_id),
            ..Self::default()
        }
    }

    pub fn with_group_timestamp(mut self, timestamp: GroupTimestamp) -> Self {
        self.group_timestamp = Some(timestamp);
        self
    }

    pub fn with_value(mut self, value: U256) -> Self {
        self.value = Some(value);
        self
    }

    pub fn with_claim_type(mut self, claim_type: ClaimType) -> Self {
        self.claim_type = Some(claim_type);
        self
    }

    pub fn with_extra_data(mut self, extra_data: impl Into<String>) -> Self {
        self.extra_data = Some(extra_data.into());
        self
    }

    pub fn optional(mut self) -> Self {
        self.is_optional = Some(true);
        self
    }

    pub fn selectable_by_user(mut self) -> Self {
        self.is_selectable_by_user = Some(true);
        self
    }

    /// Fill defaults. A claim must name its group.
    pub fn normalize(&self) -> Result<ClaimRequest, RequestError> {
        let group_id = self
            .group_id
            .clone()
            .ok_or_else(|| RequestError::InvalidRequest("claim request without groupId".into()))?;

        let claim_type = self.claim_type.unwrap_or_default();
        if claim_type == ClaimType::Empty {
            return Err(RequestError::InvalidRequest(format!(
                "claim request for group {group_id} has claimType EMPTY"
            )));
        }

        Ok(ClaimRequest {
            group_id,
            claim_type,
            extra_data: self.extra_data.clone().unwrap_or_default(),
            group_timestamp: self.group_timestamp.unwrap_or_default(),
            value: self.value.unwrap_or(U256::from(1u8)),
            is_optional: self.is_optional.unwrap_or(false),
            is_selectable_by_user: self.is_selectable_by_user.unwrap_or(false),
        })
    }
}

// ---------------------------------------------------------------------------
// Auth
// ---------------------------------------------------------------------------

/// An auth request as the application writes it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AuthRequestInput {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auth_type: Option<AuthType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_anon: Option<bool>,
    #[serde(
        with = "serde_utils::hex_u256::option",
        skip_serializing_if = "Option::is_none"
    )]
    pub user_id: Option<U256>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extra_data: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_optional: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_selectable_by_user: Option<bool>,
}

impl AuthRequestInput {
    pub fn new(auth_type: AuthType) -> Self {
        Self {
            auth_type: Some(auth_type),
            ..Self::default()
        }
    }

    pub fn with_user_id(mut self, user_id: U256) -> Self {
        self.user_id = Some(user_id);
        self
    }

    pub fn with_extra_data(mut self, extra_data: impl Into<String>) -> Self {
        self.extra_data = Some(extra_data.into());
        self
    }

    pub fn anonymous(mut self) -> Self {
        self.is_anon = Some(true);
        self
    }

    pub fn optional(mut self) -> Self {
        self.is_optional = Some(true);
        self
    }

    pub fn selectable_by_user(mut self) -> Self {
        self.is_selectable_by_user = Some(true);
        self
    }

    /// Fill defaults. An auth must name a concrete account type.
    pub fn normalize(&self) -> Result<AuthRequest, RequestError> {
        let auth_type = self
            .auth_type
            .ok_or_else(|| RequestError::InvalidRequest("auth request without authType".into()))?;
        if auth_type == AuthType::Empty {
            return Err(RequestError::InvalidRequest(
                "auth request has authType EMPTY".into(),
            ));
        }

        Ok(AuthRequest {
            auth_type,
            is_anon: self.is_anon.unwrap_or(false),
            user_id: self.user_id.unwrap_or(U256::ZERO),
            extra_data: self.extra_data.clone().unwrap_or_default(),
            is_optional: self.is_optional.unwrap_or(false),
            is_selectable_by_user: self.is_selectable_by_user.unwrap_or(false),
        })
    }
}

// ---------------------------------------------------------------------------
// Signature
// ---------------------------------------------------------------------------

/// A signature request as the application writes it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SignatureRequestInput {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<RequestedMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_selectable_by_user: Option<bool>,
}

impl SignatureRequestInput {
    /// Ask the user to sign exactly `message`.
    pub fn new(message: impl AsRef<[u8]>) -> Self {
        Self {
            message: Some(RequestedMessage::Fixed(Bytes::copy_from_slice(message.as_ref()))),
            is_selectable_by_user: None,
        }
    }

    /// Let the user write the message themselves.
    pub fn selected_by_user() -> Self {
        Self {
            message: None,
            is_selectable_by_user: Some(true),
        }
    }

    /// Keep `message` as a suggestion the user may edit.
    pub fn selectable_by_user(mut self) -> Self {
        self.is_selectable_by_user = Some(true);
        self
    }

    pub fn normalize(&self) -> Result<SignatureRequest, RequestError> {
        let selectable = self.is_selectable_by_user.unwrap_or(false);
        match (&self.message, selectable) {
            (Some(RequestedMessage::SelectedByUser), _) | (None, true) => Ok(SignatureRequest {
                message: RequestedMessage::SelectedByUser,
                is_selectable_by_user: true,
            }),
            (Some(message), _) => Ok(SignatureRequest {
                message: message.clone(),
                is_selectable_by_user: selectable,
            }),
            (None, false) => Err(RequestError::InvalidRequest(
                "signature request without a message must be selectable by the user".into(),
            )),
        }
    }
}

// ---------------------------------------------------------------------------
// Full request
// ---------------------------------------------------------------------------

/// The full request input. `claim`/`claims` and `auth`/`auths` are
/// alternative spellings; setting both of a pair is an error.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SismoConnectRequestInput {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub claim: Option<ClaimRequestInput>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub claims: Option<Vec<ClaimRequestInput>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auth: Option<AuthRequestInput>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auths: Option<Vec<AuthRequestInput>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub signature: Option<SignatureRequestInput>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
}

impl SismoConnectRequestInput {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_claim(mut self, claim: ClaimRequestInput) -> Self {
        self.claims.get_or_insert_with(Vec::new).push(claim);
        self
    }

    pub fn with_auth(mut self, auth: AuthRequestInput) -> Self {
        self.auths.get_or_insert_with(Vec::new).push(auth);
        self
    }

    pub fn with_signature(mut self, signature: SignatureRequestInput) -> Self {
        self.signature = Some(signature);
        self
    }

    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = Some(namespace.into());
        self
    }

    /// Normalize everything into an immutable [`SismoConnectRequest`].
    pub fn build(&self) -> Result<SismoConnectRequest, RequestError> {
        let claim_inputs = pick("claim", "claims", &self.claim, &self.claims)?;
        let auth_inputs = pick("auth", "auths", &self.auth, &self.auths)?;

        let auths = auth_inputs
            .into_iter()
            .map(AuthRequestInput::normalize)
            .collect::<Result<Vec<_>, _>>()?;
        let signature = self
            .signature
            .as_ref()
            .map(SignatureRequestInput::normalize)
            .transpose()?;

        // A group-less claim is a leftover placeholder when something else
        // is asked for; on its own it is a mistake.
        let has_other = !auths.is_empty() || signature.is_some();
        let claims = claim_inputs
            .into_iter()
            .filter(|input| input.group_id.is_some() || !has_other)
            .map(ClaimRequestInput::normalize)
            .collect::<Result<Vec<_>, _>>()?;

        if claims.is_empty() && auths.is_empty() && signature.is_none() {
            return Err(RequestError::EmptyRequest);
        }

        let namespace = match &self.namespace {
            None => DEFAULT_NAMESPACE.to_string(),
            Some(ns) if ns.is_empty() => {
                return Err(RequestError::InvalidRequest("namespace must not be empty".into()))
            }
            Some(ns) => ns.clone(),
        };

        Ok(SismoConnectRequest {
            claims,
            auths,
            signature,
            namespace,
        })
    }
}

fn pick<'a, T>(
    singular: &'static str,
    plural: &'static str,
    one: &'a Option<T>,
    many: &'a Option<Vec<T>>,
) -> Result<Vec<&'a T>, RequestError> {
    match (one, many) {
        (Some(_), Some(_)) => Err(RequestError::ConflictingRequest { singular, plural }),
        (Some(item), None) => Ok(vec![item]),
        (None, Some(items)) => Ok(items.iter().collect()),
        (None, None) => Ok(Vec::new()),
    }
}
