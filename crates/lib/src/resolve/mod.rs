//! Plugin dependency resolution.
//!
//! Computes the classpath a plugin's code runs with. The plugin's
//! transitive dependencies are aligned against the artifacts the host
//! already exports, so a plugin never loads a second, incompatible copy of
//! a host library.
//!
//! The resolver talks to three collaborators:
//! - [`HostExports`]: the `group:artifact` keys the host provides, and the
//!   version recorded in each export's packaged metadata
//! - [`ArtifactDescriptorReader`]: dependency descriptors, including
//!   relocation notices
//! - [`ArtifactResolver`]: local files for artifacts
//!
//! [`LocalRepository`] implements the last two over a directory tree and
//! [`HostExportManifest`] implements the first over a JSON file.

pub mod collect;
pub mod local;
pub mod managed;
pub mod plugin;
pub mod types;

use std::path::PathBuf;

pub use collect::{CollectResult, DependencyCollector};
pub use local::{DescriptorFile, LocalRepository, RelocationDecl};
pub use managed::{
  CORE_EXPORTS_KEY, ExportMetadata, HostExportManifest, ManagedDependencies, ManagedDependency, align_declared,
};
pub use plugin::{PluginDependenciesResolver, ResolvedArtifact, ResolvedClasspath, resolve_plugin_classpath};
pub use types::{
  Artifact, CoordinateError, Dependency, DependencyNode, HostExportError, NodeFailure, Relocation, Repository,
  RepositoryError, ResolutionError, Scope,
};

/// Artifacts the host process already provides on its own classpath.
pub trait HostExports: Send + Sync {
  /// `group:artifact` keys of every exported artifact.
  fn exported_artifacts(&self) -> Vec<String>;

  /// Version recorded in the export's packaged metadata, if it has any.
  fn exported_version(&self, key: &str) -> Result<Option<String>, HostExportError>;
}

/// The dependency descriptor of one artifact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactDescriptor {
  pub artifact: Artifact,
  pub dependencies: Vec<Dependency>,
  /// Set when the artifact moved to another coordinate.
  pub relocation: Option<Artifact>,
}

impl ArtifactDescriptor {
  pub fn new(artifact: Artifact) -> Self {
    Self {
      artifact,
      dependencies: Vec::new(),
      relocation: None,
    }
  }
}

/// Reads dependency descriptors.
pub trait ArtifactDescriptorReader: Send + Sync {
  fn read_descriptor(&self, artifact: &Artifact, repositories: &[Repository])
  -> Result<ArtifactDescriptor, RepositoryError>;
}

/// Resolves artifacts to local files.
pub trait ArtifactResolver: Send + Sync {
  fn resolve_artifact(&self, artifact: &Artifact, repositories: &[Repository]) -> Result<PathBuf, RepositoryError>;
}
