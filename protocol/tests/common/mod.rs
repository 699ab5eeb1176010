//! Shared fixtures for the integration tests.
//!
//! Builds responses whose public inputs are exactly what the verifier
//! recomputes, so each test only has to break the one thing it is about.
//! The SNARK check is a [`MockProofSystem`] unless a test brings a real
//! Groth16 key.

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use alloy_primitives::{Bytes, U256};

use sismo_connect_protocol::config::{GITHUB_ID_PREFIX, SISMO_CONNECT_VERSION};
use sismo_connect_protocol::crypto::encoding::{
    accounts_tree_value, request_identifier, signed_message_hash, vault_namespace,
};
use sismo_connect_protocol::registry::StaticRegistry;
use sismo_connect_protocol::request::{AppId, AuthType, ClaimType, GroupTimestamp};
use sismo_connect_protocol::response::{Auth, Claim, SismoConnectProof, SismoConnectResponse};
use sismo_connect_protocol::scheme::inputs::VaultInputs;
use sismo_connect_protocol::scheme::{ProvingScheme, PublicInputs};
use sismo_connect_protocol::zkp::{ProofEnvelope, ProofSystem, ProofSystemError};
use sismo_connect_protocol::{SismoConnectVerifier, VerifierConfig};

pub const APP_ID: &str = "0x112a692a2005259c25f6094161007967";
pub const GROUP_ID: &str = "0x42c768bb8ae79e4c5c05d3b51a4ec74a";
pub const NAMESPACE: &str = "main";

pub fn pub_key() -> [U256; 2] {
    [U256::from(0x0c6a_u64), U256::from(0x2f3b_u64)]
}

pub fn root() -> U256 {
    U256::from(0x1a2b_3c4d_u64)
}

pub fn app_id() -> AppId {
    APP_ID.parse().unwrap()
}

/// A GitHub account id as the commitment mapper encodes it.
pub fn github_identifier(id: u64) -> U256 {
    let mut bytes = [0u8; 32];
    bytes[12..14].copy_from_slice(&GITHUB_ID_PREFIX.to_be_bytes());
    bytes[24..].copy_from_slice(&id.to_be_bytes());
    U256::from_be_bytes(bytes)
}

// ---------------------------------------------------------------------------
// Proof system
// ---------------------------------------------------------------------------

/// Answers every SNARK check with a fixed verdict and counts the calls.
#[derive(Debug)]
pub struct MockProofSystem {
    valid: bool,
    calls: AtomicUsize,
}

impl MockProofSystem {
    pub fn accepting() -> Self {
        Self {
            valid: true,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn rejecting() -> Self {
        Self {
            valid: false,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl ProofSystem for MockProofSystem {
    fn verify(&self, _: ProvingScheme, _: &ProofEnvelope) -> Result<bool, ProofSystemError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.valid)
    }
}

// ---------------------------------------------------------------------------
// Fixture
// ---------------------------------------------------------------------------

pub struct Fixture {
    pub app_id: AppId,
    pub registry: Arc<StaticRegistry>,
    pub proof_system: Arc<MockProofSystem>,
    pub config: VerifierConfig,
}

impl Fixture {
    pub fn new() -> Self {
        Self::with_proof_system(MockProofSystem::accepting())
    }

    pub fn with_proof_system(proof_system: MockProofSystem) -> Self {
        Self {
            app_id: app_id(),
            registry: Arc::new(StaticRegistry::new(pub_key()).with_root(root())),
            proof_system: Arc::new(proof_system),
            config: VerifierConfig::new(app_id()),
        }
    }

    pub fn verifier(&self) -> SismoConnectVerifier {
        SismoConnectVerifier::new(
            self.config.clone(),
            self.registry.clone(),
            self.registry.clone(),
            self.proof_system.clone(),
        )
        .unwrap()
    }

    /// Inputs every proof shares: registry values, flags, vault namespace.
    pub fn base_inputs(&self, scheme: ProvingScheme) -> PublicInputs {
        let vault = match scheme {
            ProvingScheme::HydraS1 => None,
            _ => Some(VaultInputs {
                vault_identifier: U256::from(0x7a017_u64),
                vault_namespace: vault_namespace(&self.app_id),
                source_verification_enabled: U256::from(1u8),
                destination_verification_enabled: U256::from(1u8),
            }),
        };
        PublicInputs {
            destination_identifier: U256::ZERO,
            extra_data: U256::ZERO,
            commitment_mapper_pub_key: pub_key(),
            registry_tree_root: root(),
            request_identifier: U256::ZERO,
            proof_identifier: U256::from(0x5eed_u64),
            claim_value: U256::ZERO,
            accounts_tree_value: U256::ZERO,
            claim_comparator: U256::ZERO,
            vault,
        }
    }

    /// Inputs proving `claim` in `NAMESPACE`.
    pub fn claim_inputs(&self, scheme: ProvingScheme, claim: &Claim) -> PublicInputs {
        let mut inputs = self.base_inputs(scheme);
        inputs.request_identifier =
            request_identifier(&self.app_id, &claim.group_id, &claim.group_timestamp, NAMESPACE);
        inputs.accounts_tree_value = accounts_tree_value(&claim.group_id, &claim.group_timestamp);
        inputs.claim_value = claim.value;
        inputs.claim_comparator = comparator(scheme, claim.claim_type);
        inputs
    }

    /// Inputs binding an auth to `identifier`.
    pub fn auth_inputs(&self, scheme: ProvingScheme, identifier: U256) -> PublicInputs {
        let mut inputs = self.base_inputs(scheme);
        inputs.destination_identifier = identifier;
        inputs
    }

    pub fn response(&self, proofs: Vec<SismoConnectProof>) -> SismoConnectResponse {
        SismoConnectResponse {
            app_id: self.app_id.clone(),
            namespace: NAMESPACE.into(),
            version: SISMO_CONNECT_VERSION.into(),
            signed_message: None,
            proofs,
        }
    }
}

/// The comparator input a wallet would produce.
pub fn comparator(scheme: ProvingScheme, claim_type: ClaimType) -> U256 {
    match scheme {
        ProvingScheme::HydraS3 => U256::from(claim_type.code()),
        _ => U256::from(u8::from(claim_type == ClaimType::Eq)),
    }
}

/// Bind `message` through the extraData input.
pub fn sign(inputs: &mut PublicInputs, message: &[u8]) {
    inputs.extra_data = signed_message_hash(message);
}

pub fn claim(claim_type: ClaimType, value: u64) -> Claim {
    Claim {
        group_id: GROUP_ID.parse().unwrap(),
        claim_type,
        extra_data: String::new(),
        group_timestamp: GroupTimestamp::Latest,
        value: U256::from(value),
        is_selectable_by_user: false,
    }
}

pub fn auth(auth_type: AuthType) -> Auth {
    Auth {
        auth_type,
        is_anon: false,
        user_id: U256::ZERO,
        extra_data: String::new(),
    }
}

/// A proof with zeroed curve points over `inputs`.
pub fn proof(
    scheme: ProvingScheme,
    claims: Vec<Claim>,
    auths: Vec<Auth>,
    inputs: &PublicInputs,
) -> SismoConnectProof {
    let envelope = ProofEnvelope {
        a: [U256::ZERO; 2],
        b: [[U256::ZERO; 2]; 2],
        c: [U256::ZERO; 2],
        input: inputs.to_vec(),
    };
    proof_with_data(scheme, claims, auths, envelope.encode())
}

pub fn proof_with_data(
    scheme: ProvingScheme,
    claims: Vec<Claim>,
    auths: Vec<Auth>,
    proof_data: Bytes,
) -> SismoConnectProof {
    SismoConnectProof {
        claims,
        auths,
        signed_message: None,
        proving_scheme: scheme.tag().to_string(),
        proof_data,
        extra_data: String::new(),
    }
}
