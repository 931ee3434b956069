use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use lathe_lib::binding::Binding;
use lathe_lib::resolve::{
  Artifact, Dependency, DescriptorFile, HostExportError, HostExports, LocalRepository, Scope,
};
use lathe_lib::session::{Session, SessionConfig};
use tempfile::TempDir;

/// A repository in a temp dir with a session pointing at it.
pub struct TestRepo {
  _temp: TempDir,
  pub repo: LocalRepository,
  pub session: Session,
}

impl TestRepo {
  pub fn new() -> Self {
    let temp = TempDir::new().unwrap();
    let repo = LocalRepository::new(temp.path());
    let session = Session::new(SessionConfig {
      local_repository: temp.path().to_path_buf(),
      parallelism: 4,
      offline: true,
    });
    Self {
      _temp: temp,
      repo,
      session,
    }
  }

  pub fn install(&self, coordinate: &str, dependencies: Vec<Dependency>) {
    let artifact: Artifact = coordinate.parse().unwrap();
    let descriptor = DescriptorFile {
      dependencies,
      relocation: None,
    };
    self.repo.install(&artifact, &descriptor, coordinate.as_bytes()).unwrap();
  }
}

pub fn dep(coordinate: &str, scope: Scope) -> Dependency {
  Dependency::new(coordinate.parse().unwrap(), scope)
}

/// Host exports that count how often their metadata is read.
pub struct CountingExports {
  pub exports: Vec<(String, String)>,
  pub reads: AtomicUsize,
}

impl CountingExports {
  pub fn new(exports: &[(&str, &str)]) -> Self {
    Self {
      exports: exports
        .iter()
        .map(|(key, version)| (key.to_string(), version.to_string()))
        .collect(),
      reads: AtomicUsize::new(0),
    }
  }

  pub fn reads(&self) -> usize {
    self.reads.load(Ordering::SeqCst)
  }
}

impl HostExports for CountingExports {
  fn exported_artifacts(&self) -> Vec<String> {
    self.exports.iter().map(|(key, _)| key.clone()).collect()
  }

  fn exported_version(&self, key: &str) -> Result<Option<String>, HostExportError> {
    self.reads.fetch_add(1, Ordering::SeqCst);
    // reading packaged metadata is slow
    std::thread::sleep(Duration::from_millis(20));
    Ok(self.exports.iter().find(|(k, _)| k == key).map(|(_, v)| v.clone()))
  }
}

/// `plugin:goal` for each binding, fork markers as `[marker]`.
pub fn render(bindings: &[Binding]) -> Vec<String> {
  bindings
    .iter()
    .map(|b| match b.fork_marker() {
      Some(marker) => marker.to_string(),
      None => {
        let name = b.artifact.trim_start_matches("lathe-").trim_end_matches("-plugin");
        match &b.execution_id {
          Some(id) => format!("{}:{}@{}", name, b.goal, id),
          None => format!("{}:{}", name, b.goal),
        }
      }
    })
    .collect()
}
