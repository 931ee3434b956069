//! Error types for plan compilation.
//!
//! Plan compilation fails in three ways, none of them retried: the lifecycle
//! or a task is malformed ([`SpecificationError`]), goal metadata cannot be
//! loaded ([`LoaderError`]), or the goal graph has a cycle
//! ([`GraphTraversalError`]). [`PlanError`] wraps all three.

use thiserror::Error;

/// A phase, task or goal reference that cannot be mapped to bindings.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SpecificationError {
  /// No lifecycle defines the phase.
  #[error("unknown phase '{0}'")]
  UnknownPhase(String),

  /// The task is neither a phase nor a goal reference.
  #[error("unknown task '{0}': not a lifecycle phase or a goal reference")]
  UnknownTask(String),

  /// A goal reference could not be parsed.
  #[error("invalid goal reference '{reference}': {reason}")]
  InvalidGoalReference { reference: String, reason: String },

  /// An execution binds a goal without a phase and the goal has no default.
  #[error("goal '{goal}' in execution '{execution}' has no phase and no default phase")]
  MissingPhase { goal: String, execution: String },

  /// No lifecycle mapping exists for the packaging.
  #[error("unknown packaging '{0}'")]
  UnknownPackaging(String),

  /// A plan modifier targets a binding that is not part of the plan.
  #[error("modifier target {0} is not part of the plan")]
  ModifierTargetNotFound(String),
}

/// Goal metadata could not be loaded.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LoaderError {
  /// No plugin is registered for a goal prefix.
  #[error("no plugin found for prefix '{0}'")]
  UnknownPrefix(String),

  /// The plugin is not known to the loader.
  #[error("no metadata for plugin {0}")]
  UnknownPlugin(String),

  /// The plugin does not declare the goal.
  #[error("plugin {plugin} has no goal '{goal}'")]
  UnknownGoal { plugin: String, goal: String },
}

/// A cycle in prerequisite, pre-goal or post-goal edges.
///
/// `path` starts and ends with the goal that was reached again.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("cycle detected in goal graph: {}", .path.join(" -> "))]
pub struct GraphTraversalError {
  pub path: Vec<String>,
}

/// Errors that abort plan compilation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlanError {
  #[error("invalid build specification: {0}")]
  Specification(#[from] SpecificationError),

  #[error("failed to load goal metadata: {0}")]
  Loader(#[from] LoaderError),

  #[error("{0}")]
  GraphTraversal(#[from] GraphTraversalError),
}
