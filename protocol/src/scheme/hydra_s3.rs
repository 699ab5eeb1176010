//! `hydra-s3.1`: the current generation.
//!
//! Same fourteen inputs as `hydra-s2.1`, but the comparator input carries
//! the full claim type code, so every comparison is provable.

use alloy_primitives::U256;

use super::common::{Generation, SchemeCore};
use super::ProvingScheme;
use crate::request::ClaimType;

#[derive(Debug, Clone)]
pub struct HydraS3Verifier {
    core: SchemeCore,
}

impl HydraS3Verifier {
    pub fn new(core: SchemeCore) -> Self {
        Self { core }
    }
}

impl Generation for HydraS3Verifier {
    fn scheme(&self) -> ProvingScheme {
        ProvingScheme::HydraS3
    }

    fn comparator(&self, claim_type: ClaimType) -> Option<U256> {
        Some(U256::from(claim_type.code()))
    }

    fn supports_vault_auth(&self) -> bool {
        true
    }

    fn core(&self) -> &SchemeCore {
        &self.core
    }
}
