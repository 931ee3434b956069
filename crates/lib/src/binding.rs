//! Goal bindings: the unit of work the planner orders.
//!
//! A [`Binding`] names one invocable build step: the plugin that owns it, the
//! goal, and optionally the execution id distinguishing several configured
//! executions of the same goal. Bindings are immutable values; the planner
//! only ever reads, clones and compares them.

use std::fmt;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

use crate::consts::{FORK_MARKER_ARTIFACT, FORK_MARKER_GROUP, FORK_MARKER_VERSION};

/// One invocable build step.
///
/// Equality and hashing use [`GoalKey`]: the owning plugin's group and
/// artifact, the goal and the execution id. The plugin version does not take
/// part, so the same goal bound twice at different versions is one step.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Binding {
  pub group: String,
  pub artifact: String,
  pub version: String,
  pub goal: String,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub execution_id: Option<String>,
}

impl Binding {
  pub fn new(group: &str, artifact: &str, version: &str, goal: &str) -> Self {
    Self {
      group: group.to_string(),
      artifact: artifact.to_string(),
      version: version.to_string(),
      goal: goal.to_string(),
      execution_id: None,
    }
  }

  #[cfg(test)]
  pub(crate) fn with_execution_id(mut self, id: &str) -> Self {
    self.execution_id = Some(id.to_string());
    self
  }

  /// The identity of this binding.
  pub fn key(&self) -> GoalKey {
    GoalKey {
      group: self.group.clone(),
      artifact: self.artifact.clone(),
      goal: self.goal.clone(),
      execution_id: self.execution_id.clone(),
    }
  }

  /// Returns the marker kind if this binding is one of the fork sentinels.
  pub fn fork_marker(&self) -> Option<ForkMarker> {
    if self.group != FORK_MARKER_GROUP || self.artifact != FORK_MARKER_ARTIFACT {
      return None;
    }
    ForkMarker::ALL.into_iter().find(|m| m.goal() == self.goal)
  }

  pub fn is_fork_marker(&self) -> bool {
    self.fork_marker().is_some()
  }
}

impl PartialEq for Binding {
  fn eq(&self, other: &Self) -> bool {
    self.group == other.group
      && self.artifact == other.artifact
      && self.goal == other.goal
      && self.execution_id == other.execution_id
  }
}

impl Eq for Binding {}

impl Hash for Binding {
  fn hash<H: Hasher>(&self, state: &mut H) {
    self.group.hash(state);
    self.artifact.hash(state);
    self.goal.hash(state);
    self.execution_id.hash(state);
  }
}

impl fmt::Display for Binding {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    if let Some(marker) = self.fork_marker() {
      return write!(f, "{}", marker);
    }
    write!(f, "{}:{}:{}:{}", self.group, self.artifact, self.version, self.goal)?;
    if let Some(id) = &self.execution_id {
      write!(f, "@{}", id)?;
    }
    Ok(())
  }
}

/// Version-less identity of a goal, used for visited sets and cycle paths.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GoalKey {
  pub group: String,
  pub artifact: String,
  pub goal: String,
  pub execution_id: Option<String>,
}

impl GoalKey {
  /// The same goal without an execution id, used to look up decorators
  /// that apply to every execution of a goal.
  pub fn without_execution(&self) -> GoalKey {
    GoalKey {
      execution_id: None,
      ..self.clone()
    }
  }
}

impl fmt::Display for GoalKey {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}:{}:{}", self.group, self.artifact, self.goal)?;
    if let Some(id) = &self.execution_id {
      write!(f, "@{}", id)?;
    }
    Ok(())
  }
}

/// Sentinel bindings bracketing a forked sub-sequence.
///
/// The execution engine snapshots state at `StartFork`, restores it at
/// `EndFork`, and drops the forked context after the forking binding ran at
/// `ClearForkContext`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ForkMarker {
  StartFork,
  EndFork,
  ClearForkContext,
}

impl ForkMarker {
  pub const ALL: [ForkMarker; 3] = [ForkMarker::StartFork, ForkMarker::EndFork, ForkMarker::ClearForkContext];

  pub fn goal(self) -> &'static str {
    match self {
      ForkMarker::StartFork => "start-fork",
      ForkMarker::EndFork => "end-fork",
      ForkMarker::ClearForkContext => "clear-fork-context",
    }
  }

  pub fn binding(self) -> Binding {
    Binding::new(FORK_MARKER_GROUP, FORK_MARKER_ARTIFACT, FORK_MARKER_VERSION, self.goal())
  }
}

impl fmt::Display for ForkMarker {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "[{}]", self.goal())
  }
}
