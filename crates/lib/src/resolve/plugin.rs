//! Plugin classpath resolution.

use std::path::PathBuf;
use std::sync::Arc;

use rayon::prelude::*;
use serde::Serialize;
use tracing::{debug, info};

use crate::session::Session;
use crate::util::hash::{ContentHash, hash_file};

use super::collect::DependencyCollector;
use super::local::LocalRepository;
use super::managed::{CORE_EXPORTS_KEY, ManagedDependencies, align_declared};
use super::types::{Artifact, Dependency, DependencyNode, NodeFailure, Relocation, Repository, ResolutionError, Scope};
use super::{ArtifactDescriptorReader, ArtifactResolver, HostExports};

/// One classpath entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedArtifact {
  pub artifact: Artifact,
  pub scope: Scope,
  pub path: PathBuf,
  pub digest: ContentHash,
}

/// The resolved classpath of a plugin.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedClasspath {
  /// The plugin coordinate after relocation.
  pub plugin: Artifact,
  pub graph: DependencyNode,
  /// Every node of `graph`, in pre-order, resolved to a file.
  pub artifacts: Vec<ResolvedArtifact>,
  pub relocations: Vec<Relocation>,
}

impl ResolvedClasspath {
  /// Entries the plugin must load itself; `provided` ones come from the host.
  pub fn runtime_entries(&self) -> impl Iterator<Item = &ResolvedArtifact> {
    self.artifacts.iter().filter(|a| a.scope != Scope::Provided)
  }

  pub fn find(&self, key: &str) -> Option<&ResolvedArtifact> {
    self.artifacts.iter().find(|a| a.artifact.key() == key)
  }
}

/// Resolves plugin classpaths against the host's exports.
pub struct PluginDependenciesResolver<'a> {
  exports: &'a dyn HostExports,
  reader: &'a dyn ArtifactDescriptorReader,
  resolver: &'a dyn ArtifactResolver,
  session: &'a Session,
}

impl<'a> PluginDependenciesResolver<'a> {
  pub fn new(
    exports: &'a dyn HostExports,
    reader: &'a dyn ArtifactDescriptorReader,
    resolver: &'a dyn ArtifactResolver,
    session: &'a Session,
  ) -> Self {
    Self {
      exports,
      reader,
      resolver,
      session,
    }
  }

  /// The managed table for this session, built on first use.
  pub fn managed_dependencies(&self) -> Result<Arc<ManagedDependencies>, ResolutionError> {
    self
      .session
      .cache()
      .managed_dependencies()
      .get_or_try_insert_with(CORE_EXPORTS_KEY.to_string(), || {
        ManagedDependencies::from_host(self.exports).map(Arc::new)
      })
      .map_err(|e| Arc::unwrap_or_clone(e).into())
  }

  /// Resolve the classpath of `plugin` with its declared dependencies.
  ///
  /// Every collection and resolution failure is reported, not just the
  /// first one.
  pub fn resolve(
    &self,
    plugin: &Artifact,
    declared: &[Dependency],
    repositories: &[Repository],
  ) -> Result<ResolvedClasspath, ResolutionError> {
    let managed = self.managed_dependencies()?;
    let aligned: Vec<Dependency> = declared.iter().map(|d| align_declared(d, &managed)).collect();

    info!(plugin = %plugin, declared = aligned.len(), "resolving plugin dependencies");
    let collected = DependencyCollector::new(self.reader, &managed, repositories).collect(plugin, &aligned)?;
    if !collected.failures.is_empty() {
      return Err(ResolutionError::Collection {
        root: plugin.clone(),
        failures: collected.failures,
      });
    }

    let nodes = with_paths(&collected.root);
    let pool = rayon::ThreadPoolBuilder::new()
      .num_threads(self.session.config.parallelism.max(1))
      .build()?;
    let outcomes: Vec<Result<ResolvedArtifact, NodeFailure>> = pool.install(|| {
      nodes
        .par_iter()
        .map(|(node, path)| self.resolve_node(node, path, repositories))
        .collect()
    });

    let (artifacts, failures): (Vec<_>, Vec<_>) = outcomes.into_iter().partition(Result::is_ok);
    let failures: Vec<NodeFailure> = failures.into_iter().filter_map(Result::err).collect();
    if !failures.is_empty() {
      return Err(ResolutionError::Resolution {
        root: plugin.clone(),
        failures,
      });
    }
    let artifacts: Vec<ResolvedArtifact> = artifacts.into_iter().filter_map(Result::ok).collect();

    info!(
      plugin = %collected.root.artifact,
      artifacts = artifacts.len(),
      relocations = collected.relocations.len(),
      "resolved plugin classpath"
    );
    Ok(ResolvedClasspath {
      plugin: collected.root.artifact.clone(),
      graph: collected.root,
      artifacts,
      relocations: collected.relocations,
    })
  }

  fn resolve_node(
    &self,
    node: &DependencyNode,
    path: &[String],
    repositories: &[Repository],
  ) -> Result<ResolvedArtifact, NodeFailure> {
    let failure = |message: String| NodeFailure {
      artifact: node.artifact.clone(),
      path: path.to_vec(),
      message,
    };

    let file = self
      .resolver
      .resolve_artifact(&node.artifact, repositories)
      .map_err(|e| failure(e.to_string()))?;
    let digest = self
      .session
      .cache()
      .artifact_digests()
      .get_or_try_insert_with(file.clone(), || hash_file(&file))
      .map_err(|e| failure(e.to_string()))?;
    debug!(artifact = %node.artifact, path = %file.display(), "resolved artifact");

    Ok(ResolvedArtifact {
      artifact: node.artifact.clone(),
      scope: node.scope,
      path: file,
      digest,
    })
  }
}

/// Every node with the keys leading to it from the root, in pre-order.
fn with_paths(root: &DependencyNode) -> Vec<(&DependencyNode, Vec<String>)> {
  let mut out = Vec::new();
  let mut stack = vec![(root, vec![root.artifact.key()])];
  while let Some((node, path)) = stack.pop() {
    for child in node.children.iter().rev() {
      let mut child_path = path.clone();
      child_path.push(child.artifact.key());
      stack.push((child, child_path));
    }
    out.push((node, path));
  }
  out
}

/// Resolve a plugin classpath from the session's local repository.
pub fn resolve_plugin_classpath(
  plugin: &Artifact,
  declared: &[Dependency],
  repositories: &[Repository],
  exports: &dyn HostExports,
  session: &Session,
) -> Result<ResolvedClasspath, ResolutionError> {
  let repository = LocalRepository::new(&session.config.local_repository);
  PluginDependenciesResolver::new(exports, &repository, &repository, session).resolve(plugin, declared, repositories)
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::resolve::local::{DescriptorFile, RelocationDecl};
  use crate::resolve::managed::HostExportManifest;
  use crate::session::SessionConfig;
  use tempfile::TempDir;
  use tracing_test::traced_test;

  struct Fixture {
    _temp: TempDir,
    repo: LocalRepository,
    session: Session,
  }

  impl Fixture {
    fn new() -> Self {
      let temp = TempDir::new().unwrap();
      let repo = LocalRepository::new(temp.path());
      let session = Session::new(SessionConfig {
        local_repository: temp.path().to_path_buf(),
        parallelism: 2,
        offline: true,
      });
      Self {
        _temp: temp,
        repo,
        session,
      }
    }

    fn install(&self, coordinate: &str, dependencies: Vec<Dependency>) {
      let descriptor = DescriptorFile {
        dependencies,
        relocation: None,
      };
      self
        .repo
        .install(&coordinate.parse().unwrap(), &descriptor, coordinate.as_bytes())
        .unwrap();
    }

    fn resolve(&self, exports: &HostExportManifest, declared: &[Dependency]) -> Result<ResolvedClasspath, ResolutionError> {
      resolve_plugin_classpath(&plugin(), declared, &[], exports, &self.session)
    }
  }

  fn plugin() -> Artifact {
    Artifact::new("org.test", "plugin", "1.0")
  }

  fn dep(coordinate: &str, scope: Scope) -> Dependency {
    Dependency::new(coordinate.parse().unwrap(), scope)
  }

  fn exports() -> HostExportManifest {
    HostExportManifest::default().with_export("g:a", Some("2.0"))
  }

  #[test]
  fn declared_dependency_aligns_with_host_export() {
    let fixture = Fixture::new();
    fixture.install("org.test:plugin:1.0", vec![]);
    fixture.install("g:a:2.0", vec![]);

    let classpath = fixture
      .resolve(&exports(), &[dep("g:a:1.0", Scope::Compile)])
      .unwrap();
    let node = classpath.graph.find("g:a").unwrap();
    assert_eq!(node.artifact.version, "2.0");
    assert_eq!(node.scope, Scope::Provided);

    let entry = classpath.find("g:a").unwrap();
    assert_eq!(entry.artifact.version, "2.0");
    assert_eq!(classpath.runtime_entries().count(), 1);
  }

  #[test]
  fn declared_dependencies_are_runtime() {
    let fixture = Fixture::new();
    fixture.install("org.test:plugin:1.0", vec![dep("g:lib:1", Scope::Compile)]);
    fixture.install("g:lib:1", vec![]);
    fixture.install("g:extra:1", vec![]);

    let classpath = fixture
      .resolve(&HostExportManifest::default(), &[dep("g:extra:1", Scope::Compile)])
      .unwrap();
    let scopes: Vec<_> = classpath.artifacts.iter().map(|a| (a.artifact.key(), a.scope)).collect();
    assert_eq!(
      scopes,
      [
        ("org.test:plugin".to_string(), Scope::Runtime),
        ("g:extra".to_string(), Scope::Runtime),
        ("g:lib".to_string(), Scope::Runtime),
      ]
    );
    assert!(classpath.artifacts.iter().all(|a| a.digest.0.len() == 64));
  }

  #[test]
  fn resolution_failures_are_all_reported() {
    let fixture = Fixture::new();
    fixture.install(
      "org.test:plugin:1.0",
      vec![dep("g:one:1", Scope::Compile), dep("g:two:1", Scope::Compile)],
    );
    fixture.install("g:one:1", vec![]);
    fixture.install("g:two:1", vec![]);
    std::fs::remove_file(fixture.repo.artifact_path(&"g:one:1".parse().unwrap())).unwrap();
    std::fs::remove_file(fixture.repo.artifact_path(&"g:two:1".parse().unwrap())).unwrap();

    let err = fixture.resolve(&HostExportManifest::default(), &[]).unwrap_err();
    assert!(matches!(err, ResolutionError::Resolution { .. }));
    let failed: Vec<_> = err.failures().iter().map(|f| f.artifact.key()).collect();
    assert_eq!(failed, ["g:one", "g:two"]);
  }

  #[test]
  fn collection_failures_abort_before_resolution() {
    let fixture = Fixture::new();
    fixture.install("org.test:plugin:1.0", vec![dep("g:missing:1", Scope::Compile)]);

    let err = fixture.resolve(&HostExportManifest::default(), &[]).unwrap_err();
    assert!(matches!(err, ResolutionError::Collection { .. }));
    assert_eq!(err.failures()[0].path, ["org.test:plugin", "g:missing"]);
  }

  #[test]
  #[traced_test]
  fn relocated_plugin_warns_and_continues() {
    let fixture = Fixture::new();
    let relocated = DescriptorFile {
      dependencies: Vec::new(),
      relocation: Some(RelocationDecl {
        group: Some("org.moved".to_string()),
        ..RelocationDecl::default()
      }),
    };
    fixture.repo.install(&plugin(), &relocated, b"").unwrap();
    fixture.install("org.moved:plugin:1.0", vec![]);

    let classpath = fixture.resolve(&HostExportManifest::default(), &[]).unwrap();
    assert_eq!(classpath.plugin, Artifact::new("org.moved", "plugin", "1.0"));
    assert_eq!(classpath.relocations.len(), 1);
    assert!(logs_contain("artifact has been relocated"));
  }

  #[test]
  fn managed_table_is_built_once_per_session() {
    let fixture = Fixture::new();
    fixture.install("org.test:plugin:1.0", vec![]);

    fixture.resolve(&exports(), &[]).unwrap();
    // a different manifest in the same session still sees the first table
    let later = HostExportManifest::default().with_export("g:a", Some("9.9"));
    let repo = LocalRepository::new(fixture.repo.root());
    let resolver = PluginDependenciesResolver::new(&later, &repo, &repo, &fixture.session);
    let table = resolver.managed_dependencies().unwrap();
    assert_eq!(table.get("g:a").map(|m| m.version.as_str()), Some("2.0"));
  }

  #[test]
  fn invalid_export_is_host_export_error() {
    let fixture = Fixture::new();
    fixture.install("org.test:plugin:1.0", vec![]);
    let broken = HostExportManifest::default().with_export("broken", Some("1"));
    assert!(matches!(
      fixture.resolve(&broken, &[]),
      Err(ResolutionError::HostExports(_))
    ));
  }

  #[test]
  fn paths_follow_preorder() {
    let mut root = DependencyNode::new(Artifact::new("g", "r", "1"), Scope::Runtime);
    let mut a = DependencyNode::new(Artifact::new("g", "a", "1"), Scope::Runtime);
    a.children
      .push(DependencyNode::new(Artifact::new("g", "b", "1"), Scope::Runtime));
    root.children.push(a);
    root
      .children
      .push(DependencyNode::new(Artifact::new("g", "c", "1"), Scope::Runtime));

    let paths: Vec<Vec<String>> = with_paths(&root).into_iter().map(|(_, p)| p).collect();
    assert_eq!(
      paths,
      vec![
        vec!["g:r".to_string()],
        vec!["g:r".to_string(), "g:a".to_string()],
        vec!["g:r".to_string(), "g:a".to_string(), "g:b".to_string()],
        vec!["g:r".to_string(), "g:c".to_string()],
      ]
    );
  }
}
