//! A registry that never touches the network.
//!
//! Useful wherever the chain is not the source of truth: local
//! development, impersonation setups, the node binary when it is pointed
//! at a fixed key, and tests.

use std::collections::HashSet;

use alloy_primitives::U256;
use async_trait::async_trait;

use super::{AvailableRootsRegistry, CommitmentMapperRegistry, RegistryError};

#[derive(Debug, Clone, Default)]
pub struct StaticRegistry {
    pub_key: [U256; 2],
    roots: HashSet<U256>,
    any_root: bool,
}

impl StaticRegistry {
    pub fn new(pub_key: [U256; 2]) -> Self {
        Self {
            pub_key,
            ..Self::default()
        }
    }

    pub fn with_root(mut self, root: U256) -> Self {
        self.roots.insert(root);
        self
    }

    pub fn with_roots(mut self, roots: impl IntoIterator<Item = U256>) -> Self {
        self.roots.extend(roots);
        self
    }

    /// Treat every root as available. Development only.
    pub fn accept_any_root(mut self) -> Self {
        self.any_root = true;
        self
    }

    pub fn pub_key(&self) -> [U256; 2] {
        self.pub_key
    }
}

#[async_trait]
impl CommitmentMapperRegistry for StaticRegistry {
    async fn commitment_mapper_pub_key(&self) -> Result<[U256; 2], RegistryError> {
        Ok(self.pub_key)
    }
}

#[async_trait]
impl AvailableRootsRegistry for StaticRegistry {
    async fn is_root_available(&self, root: U256) -> Result<bool, RegistryError> {
        Ok(self.any_root || self.roots.contains(&root))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn serves_pinned_values() {
        let key = [U256::from(1u8), U256::from(2u8)];
        let registry = StaticRegistry::new(key).with_roots([U256::from(10u8), U256::from(11u8)]);

        assert_eq!(registry.commitment_mapper_pub_key().await.unwrap(), key);
        assert!(registry.is_root_available(U256::from(11u8)).await.unwrap());
        assert!(!registry.is_root_available(U256::from(12u8)).await.unwrap());
        assert!(registry
            .accept_any_root()
            .is_root_available(U256::from(12u8))
            .await
            .unwrap());
    }
}
