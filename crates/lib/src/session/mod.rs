//! Session-scoped state.
//!
//! A [`Session`] lives for one build invocation. It carries the
//! [`SessionConfig`] and a [`SessionCache`] whose entries are computed at
//! most once, even when several plugin resolutions race to populate them.

pub mod cache;
pub mod config;

pub use cache::{ComputeCache, SessionCache};
pub use config::SessionConfig;

/// State shared by every plan compilation and plugin resolution of a build.
#[derive(Debug)]
pub struct Session {
  pub config: SessionConfig,
  cache: SessionCache,
}

impl Session {
  pub fn new(config: SessionConfig) -> Self {
    Self {
      config,
      cache: SessionCache::new(),
    }
  }

  pub fn cache(&self) -> &SessionCache {
    &self.cache
  }
}

impl Default for Session {
  fn default() -> Self {
    Self::new(SessionConfig::default())
  }
}
