//! File-backed artifact repository.
//!
//! Layout, per repository root:
//!
//! ```text
//! <root>/<group as path>/<artifact>/<version>/<artifact>-<version>.json   descriptor
//! <root>/<group as path>/<artifact>/<version>/<artifact>-<version>.jar    artifact
//! ```
//!
//! Lookups try the local repository first, then every repository whose url
//! is a `file:` url or a plain path.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use super::types::{Artifact, Dependency, Repository, RepositoryError};
use super::{ArtifactDescriptor, ArtifactDescriptorReader, ArtifactResolver};

/// On-disk descriptor format.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DescriptorFile {
  #[serde(default)]
  pub dependencies: Vec<Dependency>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub relocation: Option<RelocationDecl>,
}

/// Where an artifact moved to. Missing parts keep the original's value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelocationDecl {
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub group: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub artifact: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub version: Option<String>,
}

impl RelocationDecl {
  pub fn target(&self, original: &Artifact) -> Artifact {
    Artifact {
      group: self.group.clone().unwrap_or_else(|| original.group.clone()),
      artifact: self.artifact.clone().unwrap_or_else(|| original.artifact.clone()),
      version: self.version.clone().unwrap_or_else(|| original.version.clone()),
    }
  }
}

/// A repository on the local filesystem.
#[derive(Debug, Clone)]
pub struct LocalRepository {
  root: PathBuf,
}

impl LocalRepository {
  pub fn new(root: impl Into<PathBuf>) -> Self {
    Self { root: root.into() }
  }

  pub fn root(&self) -> &Path {
    &self.root
  }

  fn version_dir(root: &Path, artifact: &Artifact) -> PathBuf {
    let mut dir = root.to_path_buf();
    dir.extend(artifact.group.split('.'));
    dir.join(&artifact.artifact).join(&artifact.version)
  }

  fn file_name(artifact: &Artifact, extension: &str) -> String {
    format!("{}-{}.{}", artifact.artifact, artifact.version, extension)
  }

  pub fn descriptor_path(&self, artifact: &Artifact) -> PathBuf {
    Self::version_dir(&self.root, artifact).join(Self::file_name(artifact, "json"))
  }

  pub fn artifact_path(&self, artifact: &Artifact) -> PathBuf {
    Self::version_dir(&self.root, artifact).join(Self::file_name(artifact, "jar"))
  }

  /// Repository roots to search, local first.
  fn roots(&self, repositories: &[Repository]) -> Vec<PathBuf> {
    let mut roots = vec![self.root.clone()];
    for repository in repositories {
      let path = if let Some(path) = repository.url.strip_prefix("file://") {
        PathBuf::from(path)
      } else if let Some(path) = repository.url.strip_prefix("file:") {
        PathBuf::from(path)
      } else if repository.url.contains("://") {
        trace!(repository = %repository.id, url = %repository.url, "skipping remote repository");
        continue;
      } else {
        PathBuf::from(&repository.url)
      };
      if !roots.contains(&path) {
        roots.push(path);
      }
    }
    roots
  }

  /// Write an artifact's descriptor and content into the local repository.
  pub fn install(&self, artifact: &Artifact, descriptor: &DescriptorFile, content: &[u8]) -> Result<PathBuf, RepositoryError> {
    let dir = Self::version_dir(&self.root, artifact);
    fs::create_dir_all(&dir).map_err(|source| RepositoryError::Read {
      path: dir.clone(),
      source,
    })?;

    let descriptor_path = self.descriptor_path(artifact);
    let json = serde_json::to_string_pretty(descriptor).map_err(|source| RepositoryError::Parse {
      path: descriptor_path.clone(),
      source,
    })?;
    fs::write(&descriptor_path, json).map_err(|source| RepositoryError::Read {
      path: descriptor_path.clone(),
      source,
    })?;

    let artifact_path = self.artifact_path(artifact);
    fs::write(&artifact_path, content).map_err(|source| RepositoryError::Read {
      path: artifact_path.clone(),
      source,
    })?;
    debug!(artifact = %artifact, path = %artifact_path.display(), "installed artifact");
    Ok(artifact_path)
  }
}

impl ArtifactDescriptorReader for LocalRepository {
  fn read_descriptor(&self, artifact: &Artifact, repositories: &[Repository]) -> Result<ArtifactDescriptor, RepositoryError> {
    for root in self.roots(repositories) {
      let dir = Self::version_dir(&root, artifact);
      let path = dir.join(Self::file_name(artifact, "json"));
      if path.exists() {
        let content = fs::read_to_string(&path).map_err(|source| RepositoryError::Read {
          path: path.clone(),
          source,
        })?;
        let file: DescriptorFile =
          serde_json::from_str(&content).map_err(|source| RepositoryError::Parse { path: path.clone(), source })?;
        trace!(artifact = %artifact, path = %path.display(), "read descriptor");
        return Ok(ArtifactDescriptor {
          artifact: artifact.clone(),
          dependencies: file.dependencies,
          relocation: file.relocation.map(|r| r.target(artifact)),
        });
      }
      // an artifact published without a descriptor has no dependencies
      if dir.join(Self::file_name(artifact, "jar")).exists() {
        debug!(artifact = %artifact, "artifact has no descriptor, assuming no dependencies");
        return Ok(ArtifactDescriptor::new(artifact.clone()));
      }
    }
    Err(RepositoryError::NotFound(artifact.clone()))
  }
}

impl ArtifactResolver for LocalRepository {
  fn resolve_artifact(&self, artifact: &Artifact, repositories: &[Repository]) -> Result<PathBuf, RepositoryError> {
    self
      .roots(repositories)
      .into_iter()
      .map(|root| Self::version_dir(&root, artifact).join(Self::file_name(artifact, "jar")))
      .find(|path| path.is_file())
      .ok_or_else(|| RepositoryError::NotFound(artifact.clone()))
  }
}
