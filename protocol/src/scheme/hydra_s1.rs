//! `hydra-s1.2`: the legacy generation.
//!
//! Ten public inputs. The comparator is a single bit (1 for `EQ`, 0 for
//! `GTE`), so only those two claim types can be proven. There is no vault
//! identifier in the circuit, which rules out `VAULT` auths.

use alloy_primitives::U256;

use super::common::{Generation, SchemeCore};
use super::ProvingScheme;
use crate::request::ClaimType;

/// Binary comparator shared by the first two generations.
pub(crate) fn binary_comparator(claim_type: ClaimType) -> Option<U256> {
    match claim_type {
        ClaimType::Eq => Some(U256::from(1u8)),
        ClaimType::Gte => Some(U256::ZERO),
        _ => None,
    }
}

#[derive(Debug, Clone)]
pub struct HydraS1Verifier {
    core: SchemeCore,
}

impl HydraS1Verifier {
    pub fn new(core: SchemeCore) -> Self {
        Self { core }
    }
}

impl Generation for HydraS1Verifier {
    fn scheme(&self) -> ProvingScheme {
        ProvingScheme::HydraS1
    }

    fn comparator(&self, claim_type: ClaimType) -> Option<U256> {
        binary_comparator(claim_type)
    }

    fn supports_vault_auth(&self) -> bool {
        false
    }

    fn core(&self) -> &SchemeCore {
        &self.core
    }
}
