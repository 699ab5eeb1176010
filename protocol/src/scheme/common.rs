//! The check pipeline shared by every Hydra generation.
//!
//! A generation plugs in through [`Generation`]: it names its scheme, says
//! how it encodes the claim comparator, and whether it can bind vault
//! auths. Everything else (recomputing identifiers, comparing the
//! commitment mapper key, asking the registry about the root, the final
//! SNARK call) is the same code for all of them, and every
//! [`Generation`] gets a [`SchemeVerifier`] implementation for free.
//!
//! Check order is fixed. Public inputs first, cheapest first, registry
//! lookups in between, SNARK last. Every mismatch reports the field name
//! and both values as 32-byte hex words.

use std::sync::Arc;

use alloy_primitives::U256;
use async_trait::async_trait;
use tracing::debug;

use super::inputs::PublicInputs;
use super::{ProofContext, ProvingScheme, SchemeVerifier};
use crate::config::{GITHUB_ID_PREFIX, TWITTER_ID_PREFIX};
use crate::crypto::encoding::{
    accounts_tree_value, request_identifier, signed_message_hash, vault_namespace,
};
use crate::registry::RegistryClient;
use crate::request::{AuthType, ClaimType};
use crate::response::{Auth, Claim, SismoConnectProof, VerifiedAuth, VerifiedClaim};
use crate::serde_utils::to_hex_word;
use crate::verifier::VerificationError;
use crate::zkp::{ProofEnvelope, ProofSystem};

/// What a single proof turned out to prove.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifiedProof {
    pub claim: Option<VerifiedClaim>,
    pub auth: Option<VerifiedAuth>,
}

/// What distinguishes one circuit generation from another.
pub trait Generation: Send + Sync {
    fn scheme(&self) -> ProvingScheme;

    /// The `claimComparator` public input for `claim_type`, or `None` if
    /// the generation cannot express it.
    fn comparator(&self, claim_type: ClaimType) -> Option<U256>;

    /// Whether the circuit can bind an auth to the vault identifier.
    fn supports_vault_auth(&self) -> bool;

    fn core(&self) -> &SchemeCore;
}

/// Collaborators every generation checks against.
#[derive(Clone)]
pub struct SchemeCore {
    registry: Arc<RegistryClient>,
    proof_system: Arc<dyn ProofSystem>,
}

impl std::fmt::Debug for SchemeCore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SchemeCore")
            .field("registry", &self.registry)
            .finish_non_exhaustive()
    }
}

fn mismatch(field: &'static str, expected: U256, actual: U256, proof_id: &str) -> VerificationError {
    VerificationError::FieldMismatch {
        field,
        expected: to_hex_word(&expected),
        actual: to_hex_word(&actual),
        proof_id: proof_id.to_string(),
    }
}

fn ensure_eq(
    field: &'static str,
    expected: U256,
    actual: U256,
    proof_id: &str,
) -> Result<(), VerificationError> {
    if expected == actual {
        Ok(())
    } else {
        Err(mismatch(field, expected, actual, proof_id))
    }
}

impl SchemeCore {
    pub fn new(registry: Arc<RegistryClient>, proof_system: Arc<dyn ProofSystem>) -> Self {
        Self {
            registry,
            proof_system,
        }
    }

    async fn check_commitment_mapper(
        &self,
        inputs: &PublicInputs,
        proof_id: &str,
    ) -> Result<(), VerificationError> {
        let [x, y] = self.registry.commitment_mapper_pub_key().await?;
        ensure_eq("commitmentMapperPubKey.x", x, inputs.commitment_mapper_pub_key[0], proof_id)?;
        ensure_eq("commitmentMapperPubKey.y", y, inputs.commitment_mapper_pub_key[1], proof_id)
    }

    async fn check_claim<G: Generation + ?Sized>(
        &self,
        generation: &G,
        ctx: &ProofContext<'_>,
        inputs: &PublicInputs,
        claim: &Claim,
        proof_id: &str,
    ) -> Result<(), VerificationError> {
        let scheme = Generation::scheme(generation);
        let comparator = generation.comparator(claim.claim_type).ok_or_else(|| {
            VerificationError::SchemeUnsupported {
                scheme,
                feature: format!("claimType {}", claim.claim_type),
            }
        })?;
        ensure_eq("claimComparator", comparator, inputs.claim_comparator, proof_id)?;
        ensure_eq("claimValue", claim.value, inputs.claim_value, proof_id)?;

        let expected_request_id =
            request_identifier(ctx.app_id, &claim.group_id, &claim.group_timestamp, ctx.namespace);
        ensure_eq("requestIdentifier", expected_request_id, inputs.request_identifier, proof_id)?;

        self.check_commitment_mapper(inputs, proof_id).await?;

        if let Some(vault) = &inputs.vault {
            ensure_eq(
                "sourceVerificationEnabled",
                U256::from(1u8),
                vault.source_verification_enabled,
                proof_id,
            )?;
        }

        if !self.registry.is_root_available(inputs.registry_tree_root).await? {
            return Err(VerificationError::RootNotAvailable {
                root: to_hex_word(&inputs.registry_tree_root),
                proof_id: proof_id.to_string(),
            });
        }

        let expected_atv = accounts_tree_value(&claim.group_id, &claim.group_timestamp);
        ensure_eq("accountsTreeValue", expected_atv, inputs.accounts_tree_value, proof_id)?;

        if let Some(vault) = &inputs.vault {
            ensure_eq("vaultNamespace", vault_namespace(ctx.app_id), vault.vault_namespace, proof_id)?;
        }

        debug!(%scheme, proof_id, group_id = %claim.group_id, "claim public inputs match");
        Ok(())
    }

    /// Check an auth and return the platform-native user id it proves.
    async fn check_auth<G: Generation + ?Sized>(
        &self,
        generation: &G,
        ctx: &ProofContext<'_>,
        inputs: &PublicInputs,
        auth: &Auth,
        proof_id: &str,
    ) -> Result<String, VerificationError> {
        let scheme = Generation::scheme(generation);
        if auth.is_anon || auth.auth_type == AuthType::Anon {
            return Err(VerificationError::AnonNotSupported);
        }
        if auth.auth_type == AuthType::Empty {
            return Err(VerificationError::SchemeUnsupported {
                scheme,
                feature: "authType EMPTY".into(),
            });
        }

        let identifier = if auth.auth_type == AuthType::Vault {
            match &inputs.vault {
                Some(vault) if generation.supports_vault_auth() => vault.vault_identifier,
                _ => {
                    return Err(VerificationError::SchemeUnsupported {
                        scheme,
                        feature: "vault auth".into(),
                    })
                }
            }
        } else {
            if let Some(vault) = &inputs.vault {
                ensure_eq(
                    "destinationVerificationEnabled",
                    U256::from(1u8),
                    vault.destination_verification_enabled,
                    proof_id,
                )?;
            }
            inputs.destination_identifier
        };

        if !auth.user_id.is_zero() {
            ensure_eq("userId", auth.user_id, identifier, proof_id)?;
        }

        self.check_commitment_mapper(inputs, proof_id).await?;

        if auth.auth_type == AuthType::Vault {
            if let Some(vault) = &inputs.vault {
                ensure_eq("vaultNamespace", vault_namespace(ctx.app_id), vault.vault_namespace, proof_id)?;
            }
        }

        let user_id = resolve_user_id(auth.auth_type, identifier, proof_id)?;
        debug!(%scheme, proof_id, auth_type = %auth.auth_type, user_id = %user_id, "auth public inputs match");
        Ok(user_id)
    }

    fn check_signed_message(
        &self,
        ctx: &ProofContext<'_>,
        inputs: &PublicInputs,
    ) -> Result<(), VerificationError> {
        let Some(message) = ctx.signed_message else {
            return Ok(());
        };
        let expected = signed_message_hash(message);
        if inputs.extra_data != expected {
            return Err(VerificationError::SignatureMismatch {
                expected: to_hex_word(&expected),
                actual: to_hex_word(&inputs.extra_data),
            });
        }
        Ok(())
    }

    fn check_snark(
        &self,
        scheme: ProvingScheme,
        envelope: &ProofEnvelope,
        proof_id: &str,
    ) -> Result<(), VerificationError> {
        match self.proof_system.verify(scheme, envelope) {
            Ok(true) => Ok(()),
            Ok(false) => Err(VerificationError::InvalidProof {
                proof_id: proof_id.to_string(),
                reason: "snark verification failed".into(),
            }),
            Err(err) => Err(VerificationError::from_proof_system(err, proof_id)),
        }
    }

    /// The whole pipeline for one proof.
    pub async fn verify<G: Generation + ?Sized>(
        &self,
        generation: &G,
        ctx: &ProofContext<'_>,
        proof: &SismoConnectProof,
    ) -> Result<VerifiedProof, VerificationError> {
        let scheme = Generation::scheme(generation);
        if proof.claims.len() > 1 || proof.auths.len() > 1 {
            return Err(VerificationError::MultiItemProof {
                index: ctx.proof_index,
                item: if proof.claims.len() > 1 { "claim" } else { "auth" },
            });
        }

        let (envelope, inputs) = PublicInputs::decode(&proof.proof_data, scheme.layout())?;
        let proof_id = to_hex_word(&inputs.proof_identifier);

        let claim = match proof.claim() {
            Some(claim) => {
                self.check_claim(generation, ctx, &inputs, claim, &proof_id).await?;
                Some(VerifiedClaim {
                    claim: claim.clone(),
                    proof_id: proof_id.clone(),
                    proof_data: proof.proof_data.clone(),
                })
            }
            None => None,
        };

        let auth = match proof.auth() {
            Some(auth) => {
                let user_id = self.check_auth(generation, ctx, &inputs, auth, &proof_id).await?;
                Some(VerifiedAuth {
                    auth_type: auth.auth_type,
                    is_anon: auth.is_anon,
                    user_id,
                    extra_data: auth.extra_data.clone(),
                    proof_id: proof_id.clone(),
                    proof_data: proof.proof_data.clone(),
                })
            }
            None => None,
        };

        if claim.is_none() && auth.is_none() {
            if ctx.signed_message.is_none() {
                return Err(VerificationError::EmptyProof {
                    index: ctx.proof_index,
                });
            }
            self.check_commitment_mapper(&inputs, &proof_id).await?;
        }

        self.check_signed_message(ctx, &inputs)?;
        self.check_snark(scheme, &envelope, &proof_id)?;

        debug!(%scheme, proof_id = %proof_id, "proof verified");
        Ok(VerifiedProof { claim, auth })
    }
}

/// Render a bound identifier the way its platform does.
///
/// GitHub and Twitter identifiers are 20-byte values: a two-byte platform
/// prefix, then the platform's numeric account id. EVM accounts are plain
/// addresses. Vault identifiers are full field elements.
pub fn resolve_user_id(
    auth_type: AuthType,
    identifier: U256,
    proof_id: &str,
) -> Result<String, VerificationError> {
    let bytes = identifier.to_be_bytes::<32>();
    let fits_20_bytes = bytes[..12].iter().all(|b| *b == 0);

    let platform = |prefix: u16| {
        let actual = u16::from_be_bytes([bytes[12], bytes[13]]);
        if !fits_20_bytes || actual != prefix {
            return Err(VerificationError::FieldMismatch {
                field: "userId",
                expected: format!("a 0x{prefix:04x}-prefixed {auth_type} identifier"),
                actual: to_hex_word(&identifier),
                proof_id: proof_id.to_string(),
            });
        }
        Ok(U256::from_be_slice(&bytes[14..]).to_string())
    };

    match auth_type {
        AuthType::Github => platform(GITHUB_ID_PREFIX),
        AuthType::Twitter => platform(TWITTER_ID_PREFIX),
        AuthType::EvmAccount if fits_20_bytes => Ok(format!("0x{}", hex::encode(&bytes[12..]))),
        AuthType::EvmAccount => Err(VerificationError::FieldMismatch {
            field: "userId",
            expected: "a 20-byte EVM address".into(),
            actual: to_hex_word(&identifier),
            proof_id: proof_id.to_string(),
        }),
        AuthType::Vault => Ok(to_hex_word(&identifier)),
        AuthType::Anon => Err(VerificationError::AnonNotSupported),
        AuthType::Empty => Err(VerificationError::MalformedProof(
            "auth with authType EMPTY".into(),
        )),
    }
}

#[async_trait]
impl<G: Generation> SchemeVerifier for G {
    fn scheme(&self) -> ProvingScheme {
        Generation::scheme(self)
    }

    async fn verify_claim(
        &self,
        ctx: &ProofContext<'_>,
        proof: &SismoConnectProof,
    ) -> Result<VerifiedClaim, VerificationError> {
        if proof.claim().is_none() {
            return Err(VerificationError::MalformedProof("proof carries no claim".into()));
        }
        let verified = self.core().verify(self, ctx, proof).await?;
        verified
            .claim
            .ok_or_else(|| VerificationError::MalformedProof("proof carries no claim".into()))
    }

    async fn verify_auth(
        &self,
        ctx: &ProofContext<'_>,
        proof: &SismoConnectProof,
    ) -> Result<VerifiedAuth, VerificationError> {
        if proof.auth().is_none() {
            return Err(VerificationError::MalformedProof("proof carries no auth".into()));
        }
        let verified = self.core().verify(self, ctx, proof).await?;
        verified
            .auth
            .ok_or_else(|| VerificationError::MalformedProof("proof carries no auth".into()))
    }

    async fn verify_signed_message(
        &self,
        ctx: &ProofContext<'_>,
        proof: &SismoConnectProof,
    ) -> Result<(), VerificationError> {
        if !proof.is_signature_only() {
            return Err(VerificationError::MalformedProof(
                "signed-message proof also carries a claim or an auth".into(),
            ));
        }
        self.core().verify(self, ctx, proof).await.map(|_| ())
    }

    async fn verify_proof(
        &self,
        ctx: &ProofContext<'_>,
        proof: &SismoConnectProof,
    ) -> Result<VerifiedProof, VerificationError> {
        self.core().verify(self, ctx, proof).await
    }
}
