//! Normalized request types.
//!
//! Everything in here is the *output* of [`super::builder`]: every default
//! filled, every field present. The matcher and the scheme verifiers only
//! ever see these, never the partial inputs an application writes.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

use alloy_primitives::{Bytes, U256};
use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_repr::{Deserialize_repr, Serialize_repr};

use crate::config::{DEFAULT_NAMESPACE, LATEST_TIMESTAMP_LABEL, MESSAGE_SELECTED_BY_USER};
use crate::serde_utils;

// ---------------------------------------------------------------------------
// bytes16 identifiers
// ---------------------------------------------------------------------------

/// A 16-byte identifier written as a `0x` hex string.
///
/// Keeps the string exactly as the application wrote it (`"0x1"` stays
/// `"0x1"` on the wire) but compares and hashes by numeric value, so
/// `"0x01"` and `"0x1"` are the same group.
#[derive(Clone)]
pub struct Bytes16 {
    raw: String,
    value: u128,
}

/// Application identifier, as registered with the commitment mapper.
pub type AppId = Bytes16;

/// Group identifier.
pub type GroupId = Bytes16;

/// Failure parsing a [`Bytes16`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid bytes16 identifier {0:?}: expected 0x followed by 1 to 32 hex digits")]
pub struct Bytes16Error(pub String);

impl Bytes16 {
    pub fn from_u128(value: u128) -> Self {
        Self {
            raw: format!("0x{value:032x}"),
            value,
        }
    }

    pub fn as_u128(&self) -> u128 {
        self.value
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn to_be_bytes(&self) -> [u8; 16] {
        self.value.to_be_bytes()
    }
}

impl FromStr for Bytes16 {
    type Err = Bytes16Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let digits = s
            .strip_prefix("0x")
            .or_else(|| s.strip_prefix("0X"))
            .ok_or_else(|| Bytes16Error(s.to_string()))?;
        if digits.is_empty() || digits.len() > 32 {
            return Err(Bytes16Error(s.to_string()));
        }
        let value = u128::from_str_radix(digits, 16).map_err(|_| Bytes16Error(s.to_string()))?;
        Ok(Self {
            raw: s.to_string(),
            value,
        })
    }
}

impl PartialEq for Bytes16 {
    fn eq(&self, other: &Self) -> bool {
        self.value == other.value
    }
}

impl Eq for Bytes16 {}

impl Hash for Bytes16 {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.value.hash(state);
    }
}

impl fmt::Display for Bytes16 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

impl fmt::Debug for Bytes16 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Bytes16({})", self.raw)
    }
}

impl Serialize for Bytes16 {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.raw)
    }
}

impl<'de> Deserialize<'de> for Bytes16 {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(de::Error::custom)
    }
}

// ---------------------------------------------------------------------------
// Group timestamp
// ---------------------------------------------------------------------------

/// Which snapshot of a group a claim refers to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum GroupTimestamp {
    /// The most recent snapshot.
    #[default]
    Latest,
    /// A specific snapshot, by its unix timestamp.
    At(u128),
}

impl fmt::Display for GroupTimestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Latest => f.write_str(LATEST_TIMESTAMP_LABEL),
            Self::At(ts) => write!(f, "{ts}"),
        }
    }
}

impl Serialize for GroupTimestamp {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Latest => serializer.serialize_str(LATEST_TIMESTAMP_LABEL),
            Self::At(ts) => match u64::try_from(*ts) {
                Ok(small) => serializer.serialize_u64(small),
                Err(_) => serializer.serialize_u128(*ts),
            },
        }
    }
}

struct GroupTimestampVisitor;

impl<'de> Visitor<'de> for GroupTimestampVisitor {
    type Value = GroupTimestamp;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("\"latest\" or an unsigned integer timestamp")
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Self::Value, E> {
        Ok(GroupTimestamp::At(v.into()))
    }

    fn visit_u128<E: de::Error>(self, v: u128) -> Result<Self::Value, E> {
        Ok(GroupTimestamp::At(v))
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
        if v == LATEST_TIMESTAMP_LABEL {
            return Ok(GroupTimestamp::Latest);
        }
        v.parse::<u128>()
            .map(GroupTimestamp::At)
            .map_err(|_| E::custom(format!("invalid group timestamp {v:?}")))
    }
}

impl<'de> Deserialize<'de> for GroupTimestamp {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(GroupTimestampVisitor)
    }
}

// ---------------------------------------------------------------------------
// Claim & auth types
// ---------------------------------------------------------------------------

/// How a revealed claim value is compared with the requested one.
#[repr(u8)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize_repr, Deserialize_repr)]
pub enum ClaimType {
    Empty = 0,
    #[default]
    Gte = 1,
    Gt = 2,
    Eq = 3,
    Lt = 4,
    Lte = 5,
    /// The user picks any value they hold; nothing to compare.
    UserSelect = 6,
}

impl ClaimType {
    /// Whether a revealed `value` satisfies this comparator against `requested`.
    pub fn accepts(self, requested: U256, value: U256) -> bool {
        match self {
            Self::Empty => false,
            Self::Gte => value >= requested,
            Self::Gt => value > requested,
            Self::Eq => value == requested,
            Self::Lt => value < requested,
            Self::Lte => value <= requested,
            Self::UserSelect => true,
        }
    }

    pub fn code(self) -> u8 {
        self as u8
    }
}

impl fmt::Display for ClaimType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Empty => "EMPTY",
            Self::Gte => "GTE",
            Self::Gt => "GT",
            Self::Eq => "EQ",
            Self::Lt => "LT",
            Self::Lte => "LTE",
            Self::UserSelect => "USER_SELECT",
        };
        f.write_str(name)
    }
}

/// Kind of account an auth proves ownership of.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize_repr, Deserialize_repr)]
pub enum AuthType {
    Empty = 0,
    Anon = 1,
    Github = 2,
    Twitter = 3,
    EvmAccount = 4,
    Vault = 5,
}

impl fmt::Display for AuthType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Empty => "EMPTY",
            Self::Anon => "ANON",
            Self::Github => "GITHUB",
            Self::Twitter => "TWITTER",
            Self::EvmAccount => "EVM_ACCOUNT",
            Self::Vault => "VAULT",
        };
        f.write_str(name)
    }
}

// ---------------------------------------------------------------------------
// Requests
// ---------------------------------------------------------------------------

fn is_false(b: &bool) -> bool {
    !*b
}

/// A normalized claim request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClaimRequest {
    pub group_id: GroupId,
    pub claim_type: ClaimType,
    pub extra_data: String,
    pub group_timestamp: GroupTimestamp,
    #[serde(with = "serde_utils::value_u256")]
    pub value: U256,
    #[serde(default, skip_serializing_if = "is_false")]
    pub is_optional: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub is_selectable_by_user: bool,
}

impl fmt::Display for ClaimRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "claim {{ groupId: {}, groupTimestamp: {}, claimType: {}, value: {} }}",
            self.group_id, self.group_timestamp, self.claim_type, self.value
        )
    }
}

/// A normalized auth request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthRequest {
    pub auth_type: AuthType,
    #[serde(default)]
    pub is_anon: bool,
    /// Zero means any account of `auth_type`.
    #[serde(with = "serde_utils::hex_u256")]
    pub user_id: U256,
    pub extra_data: String,
    #[serde(default, skip_serializing_if = "is_false")]
    pub is_optional: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub is_selectable_by_user: bool,
}

impl fmt::Display for AuthRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "auth {{ authType: {}, userId: {:#x} }}", self.auth_type, self.user_id)
    }
}

/// The message a signature request asks for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestedMessage {
    /// The user writes the message in their wallet.
    SelectedByUser,
    /// A fixed message set by the application.
    Fixed(Bytes),
}

impl Serialize for RequestedMessage {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::SelectedByUser => serializer.serialize_str(MESSAGE_SELECTED_BY_USER),
            Self::Fixed(bytes) => bytes.serialize(serializer),
        }
    }
}

impl<'de> Deserialize<'de> for RequestedMessage {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        if s == MESSAGE_SELECTED_BY_USER {
            return Ok(Self::SelectedByUser);
        }
        s.parse::<Bytes>().map(Self::Fixed).map_err(de::Error::custom)
    }
}

/// A normalized signature request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignatureRequest {
    pub message: RequestedMessage,
    #[serde(default, skip_serializing_if = "is_false")]
    pub is_selectable_by_user: bool,
}

impl SignatureRequest {
    /// The exact bytes the response must carry, if the message is pinned.
    pub fn required_message(&self) -> Option<&Bytes> {
        match (&self.message, self.is_selectable_by_user) {
            (RequestedMessage::Fixed(bytes), false) => Some(bytes),
            _ => None,
        }
    }
}

/// A complete, normalized verification request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SismoConnectRequest {
    #[serde(default)]
    pub claims: Vec<ClaimRequest>,
    #[serde(default)]
    pub auths: Vec<AuthRequest>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signature: Option<SignatureRequest>,
    #[serde(default = "default_namespace")]
    pub namespace: String,
}

fn default_namespace() -> String {
    DEFAULT_NAMESPACE.to_string()
}

impl SismoConnectRequest {
    /// Number of claims and auths the response must satisfy.
    pub fn required_count(&self) -> usize {
        let claims = self.claims.iter().filter(|c| !c.is_optional).count();
        let auths = self.auths.iter().filter(|a| !a.is_optional).count();
        claims + auths
    }
}
