//! Transitive dependency collection.
//!
//! Breadth-first over descriptors, so the nearest declaration of a
//! `group:artifact` wins and later ones (including cycles back to an
//! ancestor) are dropped. Edges read from descriptors skip optional,
//! `provided` and `test` dependencies; a plugin's own declared
//! dependencies are never filtered. Exclusions accumulate down each path.
//! The managed table is applied to every node.

use std::collections::{HashSet, VecDeque};

use tracing::{debug, trace, warn};

use crate::consts::MAX_RELOCATIONS;

use super::managed::ManagedDependencies;
use super::types::{
  Artifact, Dependency, DependencyNode, NodeFailure, Relocation, Repository, RepositoryError, ResolutionError, Scope,
  exclusion_matches,
};
use super::{ArtifactDescriptor, ArtifactDescriptorReader};

/// A collected dependency graph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectResult {
  /// The plugin (after relocation) with its dependency tree.
  pub root: DependencyNode,
  pub relocations: Vec<Relocation>,
  /// Nodes whose descriptors could not be read. Their subtrees are missing.
  pub failures: Vec<NodeFailure>,
}

enum DescriptorFailure {
  Repository(RepositoryError),
  RelocationLoop,
}

struct ArenaNode {
  node: DependencyNode,
  children: Vec<usize>,
  /// Relocated onto a key collected elsewhere; left out of the tree.
  pruned: bool,
}

struct Pending {
  index: usize,
  /// Exclusions in effect for this node's children.
  exclusions: Vec<String>,
  /// Keys from the root down to this node.
  path: Vec<String>,
}

/// Collects the dependency graph of a plugin.
pub struct DependencyCollector<'a> {
  reader: &'a dyn ArtifactDescriptorReader,
  managed: &'a ManagedDependencies,
  repositories: &'a [Repository],
}

impl<'a> DependencyCollector<'a> {
  pub fn new(
    reader: &'a dyn ArtifactDescriptorReader,
    managed: &'a ManagedDependencies,
    repositories: &'a [Repository],
  ) -> Self {
    Self {
      reader,
      managed,
      repositories,
    }
  }

  /// Collect the graph rooted at `root`.
  ///
  /// `declared` are the plugin's own dependencies, already aligned. They
  /// precede the plugin descriptor's dependencies, so they win conflicts.
  /// Failure to read the plugin's own descriptor aborts collection; any
  /// other descriptor failure is recorded and collection continues.
  pub fn collect(&self, root: &Artifact, declared: &[Dependency]) -> Result<CollectResult, ResolutionError> {
    let mut relocations = Vec::new();
    let descriptor = self
      .read_relocated(root, &mut relocations)
      .map_err(|failure| match failure {
        DescriptorFailure::Repository(source) => ResolutionError::PluginDescriptor {
          artifact: root.clone(),
          source,
        },
        DescriptorFailure::RelocationLoop => ResolutionError::RelocationLoop {
          artifact: root.clone(),
          max: MAX_RELOCATIONS,
        },
      })?;

    let root_node = DependencyNode::new(descriptor.artifact.clone(), Scope::Runtime);
    let mut seen: HashSet<String> = HashSet::from([root.key(), root_node.artifact.key()]);
    let mut arena = vec![ArenaNode {
      node: root_node,
      children: Vec::new(),
      pruned: false,
    }];
    let mut failures = Vec::new();
    let mut queue = VecDeque::new();

    let root_pending = Pending {
      index: 0,
      exclusions: Vec::new(),
      path: vec![arena[0].node.artifact.key()],
    };
    for dependency in declared {
      self.add_child(&mut arena, &mut seen, &mut queue, &root_pending, dependency, dependency.scope);
    }
    self.add_transitive(&mut arena, &mut seen, &mut queue, &root_pending, &descriptor);

    while let Some(pending) = queue.pop_front() {
      let artifact = arena[pending.index].node.artifact.clone();
      let descriptor = match self.read_relocated(&artifact, &mut relocations) {
        Ok(descriptor) => descriptor,
        Err(failure) => {
          let message = match failure {
            DescriptorFailure::Repository(e) => e.to_string(),
            DescriptorFailure::RelocationLoop => format!("relocation chain exceeds {} hops", MAX_RELOCATIONS),
          };
          debug!(artifact = %artifact, error = %message, "failed to read dependency descriptor");
          failures.push(NodeFailure {
            artifact,
            path: pending.path.clone(),
            message,
          });
          continue;
        }
      };

      if descriptor.artifact != artifact {
        let relocated_key = descriptor.artifact.key();
        if relocated_key != artifact.key() && !seen.insert(relocated_key) {
          trace!(artifact = %descriptor.artifact, "relocated onto an artifact already in the graph");
          arena[pending.index].pruned = true;
          continue;
        }
        let node = &mut arena[pending.index].node;
        node.artifact = descriptor.artifact.clone();
        self.managed.apply(node);
        if matches!(node.scope, Scope::Provided | Scope::System) {
          continue;
        }
      }

      self.add_transitive(&mut arena, &mut seen, &mut queue, &pending, &descriptor);
    }

    debug!(
      root = %arena[0].node.artifact,
      nodes = arena.len(),
      failures = failures.len(),
      "collected dependency graph"
    );

    Ok(CollectResult {
      root: build_tree(&mut arena, 0),
      relocations,
      failures,
    })
  }

  /// Add the filtered dependencies of `descriptor` under `parent`.
  fn add_transitive(
    &self,
    arena: &mut Vec<ArenaNode>,
    seen: &mut HashSet<String>,
    queue: &mut VecDeque<Pending>,
    parent: &Pending,
    descriptor: &ArtifactDescriptor,
  ) {
    let parent_scope = arena[parent.index].node.scope;
    for dependency in &descriptor.dependencies {
      if dependency.optional || matches!(dependency.scope, Scope::Provided | Scope::Test) {
        trace!(dependency = %dependency.artifact, scope = %dependency.scope, "filtered transitive dependency");
        continue;
      }
      self.add_child(arena, seen, queue, parent, dependency, parent_scope.derive(dependency.scope));
    }
  }

  fn add_child(
    &self,
    arena: &mut Vec<ArenaNode>,
    seen: &mut HashSet<String>,
    queue: &mut VecDeque<Pending>,
    parent: &Pending,
    dependency: &Dependency,
    scope: Scope,
  ) {
    let key = dependency.key();
    if parent.exclusions.iter().any(|pattern| exclusion_matches(pattern, &key)) {
      trace!(dependency = %dependency.artifact, "excluded");
      return;
    }
    if !seen.insert(key.clone()) {
      return;
    }

    let mut node = DependencyNode::new(dependency.artifact.clone(), scope);
    node.optional = dependency.optional;
    self.managed.apply(&mut node);
    let expand = !matches!(node.scope, Scope::Provided | Scope::System);

    let index = arena.len();
    arena.push(ArenaNode {
      node,
      children: Vec::new(),
      pruned: false,
    });
    arena[parent.index].children.push(index);

    if expand {
      let mut exclusions = parent.exclusions.clone();
      exclusions.extend(dependency.exclusions.iter().cloned());
      let mut path = parent.path.clone();
      path.push(key);
      queue.push_back(Pending { index, exclusions, path });
    }
  }

  /// Read a descriptor, following relocations.
  ///
  /// The returned descriptor's `artifact` is the final coordinate.
  fn read_relocated(
    &self,
    artifact: &Artifact,
    relocations: &mut Vec<Relocation>,
  ) -> Result<ArtifactDescriptor, DescriptorFailure> {
    let mut current = artifact.clone();
    let mut hops = 0;
    loop {
      let descriptor = self
        .reader
        .read_descriptor(&current, self.repositories)
        .map_err(DescriptorFailure::Repository)?;
      let Some(target) = descriptor.relocation.clone().filter(|target| *target != current) else {
        return Ok(ArtifactDescriptor {
          artifact: current,
          ..descriptor
        });
      };
      if hops == MAX_RELOCATIONS {
        return Err(DescriptorFailure::RelocationLoop);
      }
      warn!(from = %current, to = %target, "artifact has been relocated");
      relocations.push(Relocation {
        from: current,
        to: target.clone(),
      });
      current = target;
      hops += 1;
    }
  }
}

fn build_tree(arena: &mut [ArenaNode], index: usize) -> DependencyNode {
  let children = std::mem::take(&mut arena[index].children);
  let mut node = arena[index].node.clone();
  let mut built = Vec::new();
  for child in children {
    if !arena[child].pruned {
      built.push(build_tree(arena, child));
    }
  }
  node.children = built;
  node
}
