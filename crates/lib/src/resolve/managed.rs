//! The managed dependency table.
//!
//! Host exports always win: any dependency whose `group:artifact` the host
//! exports is pinned to the host's version and marked `provided`.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::HostExports;
use super::types::{Dependency, DependencyNode, HostExportError, Scope};

/// Session cache key of the table built from the host's core exports.
pub const CORE_EXPORTS_KEY: &str = "core-exports";

/// Authoritative version and scope for one `group:artifact`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManagedDependency {
  pub version: String,
  pub scope: Scope,
}

/// Managed dependencies keyed by `group:artifact`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManagedDependencies {
  entries: BTreeMap<String, ManagedDependency>,
}

impl ManagedDependencies {
  pub fn new() -> Self {
    Self::default()
  }

  /// Build the table from the host's exports.
  ///
  /// Exports whose packaged metadata has no version are skipped.
  pub fn from_host(exports: &dyn HostExports) -> Result<Self, HostExportError> {
    let mut table = Self::new();
    for key in exports.exported_artifacts() {
      match exports.exported_version(&key)? {
        Some(version) => table.insert(
          &key,
          ManagedDependency {
            version,
            scope: Scope::Provided,
          },
        ),
        None => debug!(export = %key, "host export has no version metadata, not managing it"),
      }
    }
    info!(entries = table.len(), "built managed dependency table from host exports");
    Ok(table)
  }

  pub fn insert(&mut self, key: &str, managed: ManagedDependency) {
    self.entries.insert(key.to_string(), managed);
  }

  pub fn get(&self, key: &str) -> Option<&ManagedDependency> {
    self.entries.get(key)
  }

  pub fn iter(&self) -> impl Iterator<Item = (&String, &ManagedDependency)> {
    self.entries.iter()
  }

  pub fn len(&self) -> usize {
    self.entries.len()
  }

  pub fn is_empty(&self) -> bool {
    self.entries.is_empty()
  }

  /// Override a node's version and scope, recording the values it had.
  pub fn apply(&self, node: &mut DependencyNode) {
    let Some(managed) = self.get(&node.artifact.key()) else {
      return;
    };
    if node.artifact.version != managed.version {
      node.premanaged_version = Some(std::mem::replace(&mut node.artifact.version, managed.version.clone()));
    }
    if node.scope != managed.scope {
      node.premanaged_scope = Some(std::mem::replace(&mut node.scope, managed.scope));
    }
  }
}

/// Align a plugin's declared dependency.
///
/// Anything but `system` is forced to `runtime`; a managed entry then
/// overrides both version and scope.
pub fn align_declared(dependency: &Dependency, managed: &ManagedDependencies) -> Dependency {
  let mut aligned = dependency.clone();
  if aligned.scope != Scope::System {
    aligned.scope = Scope::Runtime;
  }
  if let Some(entry) = managed.get(&aligned.key()) {
    if aligned.artifact.version != entry.version || aligned.scope != entry.scope {
      debug!(
        dependency = %dependency.artifact,
        version = %entry.version,
        scope = %entry.scope,
        "aligning declared dependency with host export"
      );
    }
    aligned.artifact.version = entry.version.clone();
    aligned.scope = entry.scope;
  }
  aligned
}

/// Packaged metadata of one host export.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportMetadata {
  pub version: String,
}

/// Host exports read from a JSON manifest.
///
/// ```json
/// {
///   "exports": ["org.lathe:lathe-api", "org.slf4j:slf4j-api"],
///   "metadata": { "org.lathe:lathe-api": { "version": "0.3.0" } }
/// }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostExportManifest {
  #[serde(default)]
  pub exports: Vec<String>,
  #[serde(default)]
  pub metadata: BTreeMap<String, ExportMetadata>,
}

impl HostExportManifest {
  pub fn load(path: &Path) -> Result<Self, HostExportError> {
    let read_error = |message: String| HostExportError::Read {
      path: path.to_path_buf(),
      message,
    };
    let content = std::fs::read_to_string(path).map_err(|e| read_error(e.to_string()))?;
    serde_json::from_str(&content).map_err(|e| read_error(e.to_string()))
  }

  /// Add an export, with metadata when `version` is given.
  pub fn with_export(mut self, key: &str, version: Option<&str>) -> Self {
    self.exports.push(key.to_string());
    if let Some(version) = version {
      self.metadata.insert(
        key.to_string(),
        ExportMetadata {
          version: version.to_string(),
        },
      );
    }
    self
  }
}

impl HostExports for HostExportManifest {
  fn exported_artifacts(&self) -> Vec<String> {
    self.exports.clone()
  }

  fn exported_version(&self, key: &str) -> Result<Option<String>, HostExportError> {
    match key.split_once(':') {
      Some((group, artifact)) if !group.is_empty() && !artifact.is_empty() && !artifact.contains(':') => {
        Ok(self.metadata.get(key).map(|m| m.version.clone()))
      }
      _ => Err(HostExportError::InvalidKey(key.to_string())),
    }
  }
}
