//! `hydra-s2.1`: fourteen inputs, binary comparator.

use alloy_primitives::U256;

use super::common::{Generation, SchemeCore};
use super::hydra_s1::binary_comparator;
use super::ProvingScheme;
use crate::request::ClaimType;

#[derive(Debug, Clone)]
pub struct HydraS2Verifier {
    core: SchemeCore,
}

impl HydraS2Verifier {
    pub fn new(core: SchemeCore) -> Self {
        Self { core }
    }
}

impl Generation for HydraS2Verifier {
    fn scheme(&self) -> ProvingScheme {
        ProvingScheme::HydraS2
    }

    fn comparator(&self, claim_type: ClaimType) -> Option<U256> {
        binary_comparator(claim_type)
    }

    fn supports_vault_auth(&self) -> bool {
        true
    }

    fn core(&self) -> &SchemeCore {
        &self.core
    }
}
