//! # Registry Capabilities
//!
//! Two on-chain lookups every proof depends on:
//!
//! - the commitment mapper's EdDSA public key, pinned into every proof;
//! - whether a registry tree root is on the available-roots allow-list.
//!
//! Both are read-only and idempotent. How they reach the chain (RPC client,
//! indexer, fixture) is up to the implementor; the verifier only sees the
//! two traits below, injected at construction time.
//!
//! ```text
//! cache.rs             RegistryClient: timeouts + per-instance cache
//! static_registry.rs   pinned key and fixed allow-list
//! ```

pub mod cache;
pub mod static_registry;

use std::time::Duration;

use alloy_primitives::U256;
use async_trait::async_trait;
use thiserror::Error;

pub use cache::RegistryClient;
pub use static_registry::StaticRegistry;

/// Transient failure reaching a registry.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RegistryError {
    #[error("registry call timed out after {0:?}")]
    Timeout(Duration),

    #[error("registry call failed: {0}")]
    Call(String),
}

/// Source of the commitment mapper public key.
#[async_trait]
pub trait CommitmentMapperRegistry: Send + Sync {
    /// The key as `[X, Y]`.
    async fn commitment_mapper_pub_key(&self) -> Result<[U256; 2], RegistryError>;
}

/// Allow-list of registry tree roots.
#[async_trait]
pub trait AvailableRootsRegistry: Send + Sync {
    async fn is_root_available(&self, root: U256) -> Result<bool, RegistryError>;
}
