use serde::{Deserialize, Serialize};

use crate::binding::Binding;

/// What a forking goal runs before itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ForkTarget {
  /// The lifecycle up to and including the named phase.
  Phase(String),
  /// A single goal, given as a task string (`prefix:goal` etc).
  Goal(String),
}

/// How the walker treats a goal.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GoalKind {
  /// Runs at most once per plan.
  #[default]
  Normal,
  /// Runs once for every occurrence in the resolved work list.
  AlwaysExecute,
  /// Runs a forked sub-plan in an isolated context before itself.
  Forking(ForkTarget),
}

/// Dependency resolution a goal needs before it can run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolutionScope {
  #[default]
  None,
  Compile,
  Runtime,
  Test,
}

/// Everything the planner needs to know about one goal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GoalDescriptor {
  /// Owning plugin coordinate and goal name.
  pub binding: Binding,
  pub kind: GoalKind,
  /// Phase the goal binds to when an execution does not name one.
  pub default_phase: Option<String>,
  pub requires_dependency_resolution: ResolutionScope,
  /// Tasks that must run before this goal.
  pub prerequisites: Vec<String>,
}

impl GoalDescriptor {
  pub fn always_execute(&self) -> bool {
    matches!(self.kind, GoalKind::AlwaysExecute)
  }

  pub fn fork_target(&self) -> Option<&ForkTarget> {
    match &self.kind {
      GoalKind::Forking(target) => Some(target),
      _ => None,
    }
  }
}
