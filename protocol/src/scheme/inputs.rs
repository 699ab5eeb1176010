//! Public input layouts.
//!
//! The legacy layout has ten inputs. The current layout keeps those ten at
//! the same positions and appends four:
//!
//! | index | input                            | layout  |
//! |-------|----------------------------------|---------|
//! | 0     | destinationIdentifier            | both    |
//! | 1     | extraData                        | both    |
//! | 2     | commitmentMapperPubKey X         | both    |
//! | 3     | commitmentMapperPubKey Y         | both    |
//! | 4     | registryTreeRoot                 | both    |
//! | 5     | requestIdentifier                | both    |
//! | 6     | proofIdentifier                  | both    |
//! | 7     | claimValue                       | both    |
//! | 8     | accountsTreeValue                | both    |
//! | 9     | claimComparator                  | both    |
//! | 10    | vaultIdentifier                  | current |
//! | 11    | vaultNamespace                   | current |
//! | 12    | sourceVerificationEnabled        | current |
//! | 13    | destinationVerificationEnabled   | current |

use alloy_primitives::U256;

use crate::zkp::{EnvelopeError, ProofEnvelope};

pub const DESTINATION_IDENTIFIER: usize = 0;
pub const EXTRA_DATA: usize = 1;
pub const COMMITMENT_MAPPER_PUB_KEY_X: usize = 2;
pub const COMMITMENT_MAPPER_PUB_KEY_Y: usize = 3;
pub const REGISTRY_TREE_ROOT: usize = 4;
pub const REQUEST_IDENTIFIER: usize = 5;
pub const PROOF_IDENTIFIER: usize = 6;
pub const CLAIM_VALUE: usize = 7;
pub const ACCOUNTS_TREE_VALUE: usize = 8;
pub const CLAIM_COMPARATOR: usize = 9;
pub const VAULT_IDENTIFIER: usize = 10;
pub const VAULT_NAMESPACE: usize = 11;
pub const SOURCE_VERIFICATION_ENABLED: usize = 12;
pub const DESTINATION_VERIFICATION_ENABLED: usize = 13;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputLayout {
    /// Ten inputs, no vault or verification-flag inputs.
    Legacy,
    /// Fourteen inputs.
    Current,
}

impl InputLayout {
    pub const fn input_count(self) -> usize {
        match self {
            Self::Legacy => 10,
            Self::Current => 14,
        }
    }
}

/// The inputs only the current layout carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VaultInputs {
    pub vault_identifier: U256,
    pub vault_namespace: U256,
    pub source_verification_enabled: U256,
    pub destination_verification_enabled: U256,
}

/// Named view over a decoded envelope's public inputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PublicInputs {
    pub destination_identifier: U256,
    pub extra_data: U256,
    pub commitment_mapper_pub_key: [U256; 2],
    pub registry_tree_root: U256,
    pub request_identifier: U256,
    pub proof_identifier: U256,
    pub claim_value: U256,
    pub accounts_tree_value: U256,
    pub claim_comparator: U256,
    /// `None` for the legacy layout.
    pub vault: Option<VaultInputs>,
}

impl PublicInputs {
    /// Decode `proof_data` strictly against `layout`.
    pub fn decode(
        proof_data: &[u8],
        layout: InputLayout,
    ) -> Result<(ProofEnvelope, Self), EnvelopeError> {
        let envelope = ProofEnvelope::decode(proof_data, layout.input_count())?;
        let inputs = Self::from_envelope(&envelope, layout);
        Ok((envelope, inputs))
    }

    /// Name the inputs of an envelope already decoded for `layout`.
    pub fn from_envelope(envelope: &ProofEnvelope, layout: InputLayout) -> Self {
        let at = |index: usize| envelope.input(index).unwrap_or(U256::ZERO);
        let vault = match layout {
            InputLayout::Legacy => None,
            InputLayout::Current => Some(VaultInputs {
                vault_identifier: at(VAULT_IDENTIFIER),
                vault_namespace: at(VAULT_NAMESPACE),
                source_verification_enabled: at(SOURCE_VERIFICATION_ENABLED),
                destination_verification_enabled: at(DESTINATION_VERIFICATION_ENABLED),
            }),
        };
        Self {
            destination_identifier: at(DESTINATION_IDENTIFIER),
            extra_data: at(EXTRA_DATA),
            commitment_mapper_pub_key: [
                at(COMMITMENT_MAPPER_PUB_KEY_X),
                at(COMMITMENT_MAPPER_PUB_KEY_Y),
            ],
            registry_tree_root: at(REGISTRY_TREE_ROOT),
            request_identifier: at(REQUEST_IDENTIFIER),
            proof_identifier: at(PROOF_IDENTIFIER),
            claim_value: at(CLAIM_VALUE),
            accounts_tree_value: at(ACCOUNTS_TREE_VALUE),
            claim_comparator: at(CLAIM_COMPARATOR),
            vault,
        }
    }

    /// Write the named inputs back into positional form.
    pub fn to_vec(&self) -> Vec<U256> {
        let mut input = vec![
            self.destination_identifier,
            self.extra_data,
            self.commitment_mapper_pub_key[0],
            self.commitment_mapper_pub_key[1],
            self.registry_tree_root,
            self.request_identifier,
            self.proof_identifier,
            self.claim_value,
            self.accounts_tree_value,
            self.claim_comparator,
        ];
        if let Some(vault) = &self.vault {
            input.extend([
                vault.vault_identifier,
                vault.vault_namespace,
                vault.source_verification_enabled,
                vault.destination_verification_enabled,
            ]);
        }
        input
    }
}
