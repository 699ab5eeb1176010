//! The JSON object an application embeds in the redirect URL to the wallet.
//!
//! Only the payload model lives here. Percent-encoding it into a URL and
//! reading it back out of query parameters is the transport's business.

use serde::{Deserialize, Serialize};

use super::types::{AppId, AuthRequest, ClaimRequest, GroupId, SignatureRequest, SismoConnectRequest};
use crate::config::{DEFAULT_NAMESPACE, SISMO_CONNECT_VERSION};

/// A fake group the wallet should use instead of the real one, for testing
/// an integration without real group membership.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DevGroup {
    pub group_id: GroupId,
    /// Account identifiers to treat as members, each with value 1.
    pub data: Vec<String>,
}

/// Development overrides for the wallet.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DevConfig {
    pub enabled: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_raw_response: Option<bool>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub dev_groups: Vec<DevGroup>,
}

/// The request as the wallet receives it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectRequestPayload {
    pub version: String,
    pub app_id: AppId,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub claims: Vec<ClaimRequest>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub auths: Vec<AuthRequest>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signature: Option<SignatureRequest>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub callback_path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub callback_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dev_config: Option<DevConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub compressed: Option<bool>,
}

impl ConnectRequestPayload {
    /// Payload for `request`. The default namespace is left implicit.
    pub fn new(app_id: AppId, request: &SismoConnectRequest) -> Self {
        let namespace = (request.namespace != DEFAULT_NAMESPACE).then(|| request.namespace.clone());
        Self {
            version: SISMO_CONNECT_VERSION.to_string(),
            app_id,
            claims: request.claims.clone(),
            auths: request.auths.clone(),
            signature: request.signature.clone(),
            namespace,
            callback_path: None,
            callback_url: None,
            dev_config: None,
            compressed: None,
        }
    }

    pub fn with_callback_path(mut self, path: impl Into<String>) -> Self {
        self.callback_path = Some(path.into());
        self
    }

    pub fn with_callback_url(mut self, url: impl Into<String>) -> Self {
        self.callback_url = Some(url.into());
        self
    }

    pub fn with_dev_config(mut self, dev_config: DevConfig) -> Self {
        self.dev_config = Some(dev_config);
        self
    }

    /// Ask the wallet to deflate the response it sends back.
    pub fn compressed(mut self) -> Self {
        self.compressed = Some(true);
        self
    }

    /// The request this payload describes, with the namespace resolved.
    pub fn request(&self) -> SismoConnectRequest {
        SismoConnectRequest {
            claims: self.claims.clone(),
            auths: self.auths.clone(),
            signature: self.signature.clone(),
            namespace: self
                .namespace
                .clone()
                .unwrap_or_else(|| DEFAULT_NAMESPACE.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::request::{AuthRequestInput, AuthType, ClaimRequestInput, SismoConnectRequestInput};

    fn app_id() -> AppId {
        "0x112a692a2005259c25f6094161007967".parse().unwrap()
    }

    #[test]
    fn payload_keys_are_the_wallet_query_keys() {
        let request = SismoConnectRequestInput::new()
            .with_claim(ClaimRequestInput::new("0x42".parse().unwrap()))
            .build()
            .unwrap();
        let payload = ConnectRequestPayload::new(app_id(), &request)
            .with_callback_url("https://app.example/cb")
            .compressed();

        let json = serde_json::to_value(&payload).unwrap();
        let mut keys: Vec<&str> = json.as_object().unwrap().keys().map(String::as_str).collect();
        keys.sort_unstable();
        assert_eq!(keys, ["appId", "callbackUrl", "claims", "compressed", "version"]);
        assert_eq!(json["version"], "sismo-connect-v1.1");
    }

    #[test]
    fn non_default_namespace_is_carried() {
        let request = SismoConnectRequestInput::new()
            .with_auth(AuthRequestInput::new(AuthType::Vault))
            .with_namespace("governance")
            .build()
            .unwrap();
        let payload = ConnectRequestPayload::new(app_id(), &request).with_dev_config(DevConfig {
            enabled: true,
            ..Default::default()
        });
        assert_eq!(payload.namespace.as_deref(), Some("governance"));

        let text = serde_json::to_string(&payload).unwrap();
        let back: ConnectRequestPayload = serde_json::from_str(&text).unwrap();
        assert_eq!(back.request(), request);
        assert_eq!(back.dev_config.map(|d| d.enabled), Some(true));
    }
}
