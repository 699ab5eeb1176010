//! Timeouts and caching in front of the registry capabilities.
//!
//! The commitment mapper key only changes on governance events, so it is
//! cached for the lifetime of the client. Available roots are cached for
//! [`DEFAULT_ROOT_TTL`], at most [`DEFAULT_ROOT_CACHE_CAPACITY`] of them;
//! when the cache is full, expired entries go first, then the oldest one.
//! Negative root answers are *not* cached: a root may be published a block
//! later. [`RegistryClient::invalidate`] drops everything, for callers that
//! track governance events.
//!
//! Every upstream call is bounded by a `tokio` timeout. A timeout is a
//! [`RegistryError::Timeout`], which the verifier surfaces as a retryable
//! `RegistryUnavailable`, never as a failed proof.

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use alloy_primitives::U256;
use parking_lot::RwLock;
use tokio::time::Instant;
use tracing::debug;

use super::{AvailableRootsRegistry, CommitmentMapperRegistry, RegistryError};

/// Roots cached at once. Registries publish a handful of roots a day.
pub const DEFAULT_ROOT_CACHE_CAPACITY: usize = 1024;

/// How long a positive root answer is trusted before asking again.
pub const DEFAULT_ROOT_TTL: Duration = Duration::from_secs(3600);

pub struct RegistryClient {
    commitment_mapper: Arc<dyn CommitmentMapperRegistry>,
    roots: Arc<dyn AvailableRootsRegistry>,
    timeout: Duration,
    root_capacity: usize,
    root_ttl: Duration,
    pub_key: RwLock<Option<[U256; 2]>>,
    available_roots: RwLock<HashMap<U256, Instant>>,
}

impl RegistryClient {
    pub fn new(
        commitment_mapper: Arc<dyn CommitmentMapperRegistry>,
        roots: Arc<dyn AvailableRootsRegistry>,
        timeout: Duration,
    ) -> Self {
        Self {
            commitment_mapper,
            roots,
            timeout,
            root_capacity: DEFAULT_ROOT_CACHE_CAPACITY,
            root_ttl: DEFAULT_ROOT_TTL,
            pub_key: RwLock::new(None),
            available_roots: RwLock::new(HashMap::new()),
        }
    }

    /// Bound the root cache. A capacity of zero disables root caching.
    pub fn with_root_cache(mut self, capacity: usize, ttl: Duration) -> Self {
        self.root_capacity = capacity;
        self.root_ttl = ttl;
        self
    }

    /// The commitment mapper key, fetched once.
    pub async fn commitment_mapper_pub_key(&self) -> Result<[U256; 2], RegistryError> {
        if let Some(key) = *self.pub_key.read() {
            return Ok(key);
        }
        let key = self
            .bounded(self.commitment_mapper.commitment_mapper_pub_key())
            .await?;
        debug!(x = %key[0], y = %key[1], "cached commitment mapper public key");
        *self.pub_key.write() = Some(key);
        Ok(key)
    }

    /// Whether `root` is available; positive answers are cached.
    pub async fn is_root_available(&self, root: U256) -> Result<bool, RegistryError> {
        if let Some(cached_at) = self.available_roots.read().get(&root) {
            if cached_at.elapsed() < self.root_ttl {
                return Ok(true);
            }
        }
        let available = self.bounded(self.roots.is_root_available(root)).await?;
        if available {
            self.cache_root(root);
        }
        Ok(available)
    }

    /// Roots currently held, expired ones included.
    pub fn cached_roots(&self) -> usize {
        self.available_roots.read().len()
    }

    fn cache_root(&self, root: U256) {
        if self.root_capacity == 0 {
            return;
        }
        let mut roots = self.available_roots.write();
        if roots.len() >= self.root_capacity && !roots.contains_key(&root) {
            let ttl = self.root_ttl;
            roots.retain(|_, cached_at| cached_at.elapsed() < ttl);
            if roots.len() >= self.root_capacity {
                let oldest = roots
                    .iter()
                    .min_by_key(|(_, cached_at)| **cached_at)
                    .map(|(root, _)| *root);
                if let Some(oldest) = oldest {
                    roots.remove(&oldest);
                }
            }
        }
        roots.insert(root, Instant::now());
    }

    /// Forget every cached value.
    pub fn invalidate(&self) {
        *self.pub_key.write() = None;
        self.available_roots.write().clear();
        debug!("registry cache invalidated");
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    async fn bounded<T>(
        &self,
        call: impl Future<Output = Result<T, RegistryError>>,
    ) -> Result<T, RegistryError> {
        tokio::time::timeout(self.timeout, call)
            .await
            .map_err(|_| RegistryError::Timeout(self.timeout))?
    }
}

impl std::fmt::Debug for RegistryClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegistryClient")
            .field("timeout", &self.timeout)
            .field("root_capacity", &self.root_capacity)
            .field("root_ttl", &self.root_ttl)
            .field("pub_key_cached", &self.pub_key.read().is_some())
            .field("available_roots_cached", &self.available_roots.read().len())
            .finish()
    }
}
