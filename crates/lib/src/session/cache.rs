//! Compute-once caches backed by `moka`.

use std::hash::Hash;
use std::path::PathBuf;
use std::sync::Arc;

use moka::sync::Cache;

use crate::consts::SESSION_CACHE_CAPACITY;
use crate::lifecycle::LifecycleBindings;
use crate::resolve::ManagedDependencies;
use crate::util::hash::ContentHash;

/// A concurrent cache with an atomic compute-if-absent primitive.
///
/// Concurrent calls to [`get_or_try_insert_with`](Self::get_or_try_insert_with)
/// for the same missing key are coalesced: one caller runs `init`, the
/// others wait for it and observe the same value (or the same error).
#[derive(Clone)]
pub struct ComputeCache<K, V> {
  inner: Cache<K, V>,
}

impl<K, V> std::fmt::Debug for ComputeCache<K, V> {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("ComputeCache").finish_non_exhaustive()
  }
}

impl<K, V> ComputeCache<K, V>
where
  K: Hash + Eq + Send + Sync + 'static,
  V: Clone + Send + Sync + 'static,
{
  pub fn new(capacity: u64) -> Self {
    Self {
      inner: Cache::builder().max_capacity(capacity).build(),
    }
  }

  /// Return the cached value for `key`, computing it with `init` if absent.
  ///
  /// A failed `init` caches nothing; the next call retries.
  pub fn get_or_try_insert_with<E, F>(&self, key: K, init: F) -> Result<V, Arc<E>>
  where
    F: FnOnce() -> Result<V, E>,
    E: Send + Sync + 'static,
  {
    self.inner.try_get_with(key, init)
  }
}

/// Caches that live for one build session.
#[derive(Debug, Clone)]
pub struct SessionCache {
  lifecycle_mappings: ComputeCache<String, Arc<LifecycleBindings>>,
  managed_dependencies: ComputeCache<String, Arc<ManagedDependencies>>,
  artifact_digests: ComputeCache<PathBuf, ContentHash>,
}

impl Default for SessionCache {
  fn default() -> Self {
    Self::new()
  }
}

impl SessionCache {
  pub fn new() -> Self {
    Self {
      lifecycle_mappings: ComputeCache::new(SESSION_CACHE_CAPACITY),
      managed_dependencies: ComputeCache::new(SESSION_CACHE_CAPACITY),
      artifact_digests: ComputeCache::new(SESSION_CACHE_CAPACITY),
    }
  }

  /// Default lifecycle bindings, keyed by packaging type.
  pub fn lifecycle_mappings(&self) -> &ComputeCache<String, Arc<LifecycleBindings>> {
    &self.lifecycle_mappings
  }

  /// Managed dependency tables derived from host exports.
  pub fn managed_dependencies(&self) -> &ComputeCache<String, Arc<ManagedDependencies>> {
    &self.managed_dependencies
  }

  /// Content hashes of resolved artifact files, keyed by path.
  pub fn artifact_digests(&self) -> &ComputeCache<PathBuf, ContentHash> {
    &self.artifact_digests
  }
}
