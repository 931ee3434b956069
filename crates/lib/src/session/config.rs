use std::path::PathBuf;

use crate::platform::paths::repository_dir;

/// Configuration for a build session.
#[derive(Debug, Clone)]
pub struct SessionConfig {
  /// Root of the local artifact repository.
  pub local_repository: PathBuf,

  /// Maximum number of artifacts resolved in parallel.
  pub parallelism: usize,

  /// Whether remote repositories may be contacted.
  pub offline: bool,
}

impl Default for SessionConfig {
  fn default() -> Self {
    Self {
      local_repository: repository_dir(),
      parallelism: num_cpus(),
      offline: false,
    }
  }
}

impl SessionConfig {
  pub fn with_repository(mut self, path: PathBuf) -> Self {
    self.local_repository = path;
    self
  }
}

/// Get the number of CPUs for default parallelism.
fn num_cpus() -> usize {
  std::thread::available_parallelism().map(|p| p.get()).unwrap_or(4)
}
