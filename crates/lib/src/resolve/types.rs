//! Value and error types for plugin dependency resolution.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A `group:artifact:version` coordinate.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Artifact {
  pub group: String,
  pub artifact: String,
  pub version: String,
}

impl Artifact {
  pub fn new(group: &str, artifact: &str, version: &str) -> Self {
    Self {
      group: group.to_string(),
      artifact: artifact.to_string(),
      version: version.to_string(),
    }
  }

  /// Version-less `group:artifact` key used for management and conflicts.
  pub fn key(&self) -> String {
    format!("{}:{}", self.group, self.artifact)
  }
}

impl fmt::Display for Artifact {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}:{}:{}", self.group, self.artifact, self.version)
  }
}

/// Error parsing a `group:artifact:version` string.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid artifact coordinate '{0}': expected group:artifact:version")]
pub struct CoordinateError(pub String);

impl FromStr for Artifact {
  type Err = CoordinateError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s.split(':').collect::<Vec<_>>().as_slice() {
      [group, artifact, version] if !group.is_empty() && !artifact.is_empty() && !version.is_empty() => {
        Ok(Artifact::new(group, artifact, version))
      }
      _ => Err(CoordinateError(s.to_string())),
    }
  }
}

/// Dependency scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scope {
  #[default]
  Compile,
  Runtime,
  Provided,
  Test,
  System,
  Import,
}

impl Scope {
  /// Scope of a transitive dependency reached through a parent in `self`.
  pub fn derive(self, declared: Scope) -> Scope {
    match (self, declared) {
      (_, Scope::System) => Scope::System,
      (Scope::Compile, Scope::Compile) => Scope::Compile,
      (Scope::Test, _) => Scope::Test,
      (Scope::Provided, _) => Scope::Provided,
      (_, declared) if declared == Scope::Compile => Scope::Runtime,
      (_, declared) => declared,
    }
  }
}

impl fmt::Display for Scope {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let s = match self {
      Scope::Compile => "compile",
      Scope::Runtime => "runtime",
      Scope::Provided => "provided",
      Scope::Test => "test",
      Scope::System => "system",
      Scope::Import => "import",
    };
    write!(f, "{}", s)
  }
}

/// A declared dependency edge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dependency {
  #[serde(flatten)]
  pub artifact: Artifact,
  #[serde(default)]
  pub scope: Scope,
  #[serde(default)]
  pub optional: bool,
  /// Excluded `group:artifact` keys; `*` matches any segment.
  #[serde(default, skip_serializing_if = "Vec::is_empty")]
  pub exclusions: Vec<String>,
}

impl Dependency {
  pub fn new(artifact: Artifact, scope: Scope) -> Self {
    Self {
      artifact,
      scope,
      optional: false,
      exclusions: Vec::new(),
    }
  }

  pub fn key(&self) -> String {
    self.artifact.key()
  }
}

pub(crate) fn exclusion_matches(pattern: &str, key: &str) -> bool {
  let (Some((pg, pa)), Some((kg, ka))) = (pattern.split_once(':'), key.split_once(':')) else {
    return false;
  };
  (pg == "*" || pg == kg) && (pa == "*" || pa == ka)
}

/// A remote or local repository that descriptor and artifact lookups may
/// consult.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Repository {
  pub id: String,
  pub url: String,
}

/// A node of a collected dependency graph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DependencyNode {
  pub artifact: Artifact,
  pub scope: Scope,
  #[serde(default, skip_serializing_if = "std::ops::Not::not")]
  pub optional: bool,
  /// Version before the managed table overrode it.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub premanaged_version: Option<String>,
  /// Scope before the managed table overrode it.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub premanaged_scope: Option<Scope>,
  #[serde(default, skip_serializing_if = "Vec::is_empty")]
  pub children: Vec<DependencyNode>,
}

impl DependencyNode {
  pub fn new(artifact: Artifact, scope: Scope) -> Self {
    Self {
      artifact,
      scope,
      optional: false,
      premanaged_version: None,
      premanaged_scope: None,
      children: Vec::new(),
    }
  }

  /// Depth-first, pre-order iteration over this node and its descendants.
  pub fn iter(&self) -> impl Iterator<Item = &DependencyNode> {
    let mut stack = vec![self];
    std::iter::from_fn(move || {
      let node = stack.pop()?;
      stack.extend(node.children.iter().rev());
      Some(node)
    })
  }

  /// Find the node for a `group:artifact` key.
  pub fn find(&self, key: &str) -> Option<&DependencyNode> {
    self.iter().find(|n| n.artifact.key() == key)
  }

  /// Number of nodes including this one.
  pub fn count(&self) -> usize {
    self.iter().count()
  }
}

/// A relocation reported while reading a descriptor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Relocation {
  pub from: Artifact,
  pub to: Artifact,
}

/// One node that could not be collected or resolved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeFailure {
  pub artifact: Artifact,
  /// Keys from the root down to the failed node.
  pub path: Vec<String>,
  pub message: String,
}

impl fmt::Display for NodeFailure {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}: {}", self.artifact, self.message)?;
    if self.path.len() > 1 {
      write!(f, " (via {})", self.path.join(" -> "))?;
    }
    Ok(())
  }
}

fn format_failures(failures: &[NodeFailure]) -> String {
  failures.iter().map(|f| format!("\n  - {}", f)).collect()
}

/// Error reading host export metadata.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HostExportError {
  /// An exported key is not of the form `group:artifact`.
  #[error("invalid host export key '{0}': expected group:artifact")]
  InvalidKey(String),

  /// The export manifest could not be read.
  #[error("failed to read host exports from {path}: {message}")]
  Read { path: PathBuf, message: String },
}

/// Error from a descriptor or artifact lookup for a single artifact.
#[derive(Debug, Error)]
pub enum RepositoryError {
  #[error("artifact {0} not found")]
  NotFound(Artifact),

  #[error("failed to read {path}: {source}")]
  Read {
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },

  #[error("failed to parse descriptor {path}: {source}")]
  Parse {
    path: PathBuf,
    #[source]
    source: serde_json::Error,
  },
}

/// Plugin dependency collection or resolution failed.
#[derive(Debug, Error)]
pub enum ResolutionError {
  /// The managed dependency table could not be built.
  #[error("failed to build managed dependency table: {0}")]
  HostExports(#[from] HostExportError),

  /// The plugin's own descriptor could not be read.
  #[error("failed to read descriptor of plugin {artifact}: {source}")]
  PluginDescriptor {
    artifact: Artifact,
    #[source]
    source: RepositoryError,
  },

  /// A relocation chain did not terminate.
  #[error("relocation chain starting at {artifact} exceeds {max} hops")]
  RelocationLoop { artifact: Artifact, max: usize },

  /// Some transitive descriptors could not be read.
  #[error("failed to collect dependencies of {root}:{}", format_failures(.failures))]
  Collection { root: Artifact, failures: Vec<NodeFailure> },

  /// Some collected artifacts could not be resolved to local files.
  #[error("failed to resolve artifacts of {root}:{}", format_failures(.failures))]
  Resolution { root: Artifact, failures: Vec<NodeFailure> },

  /// The worker pool for parallel resolution could not start.
  #[error("failed to start resolver pool: {0}")]
  Pool(#[from] rayon::ThreadPoolBuildError),
}

impl ResolutionError {
  /// Per-node failures carried by the error, if any.
  pub fn failures(&self) -> &[NodeFailure] {
    match self {
      ResolutionError::Collection { failures, .. } | ResolutionError::Resolution { failures, .. } => failures,
      _ => &[],
    }
  }
}
