//! Project model and goal metadata providers.
//!
//! The planner consumes two collaborators:
//! - a [`ModelProvider`], giving default lifecycle bindings per packaging and
//!   a project's plugin executions and decorators
//! - a [`GoalLoader`], giving the [`GoalDescriptor`] for a goal reference
//!
//! [`StandardModelProvider`] and [`PluginCatalog`] implement them over the
//! built-in packaging mappings and a JSON [`Project`] descriptor.

pub mod catalog;
pub mod project;

use std::collections::BTreeMap;

use crate::error::{LoaderError, SpecificationError};
use crate::goal::{GoalDescriptor, GoalRef};
use crate::lifecycle::{LifecycleBindings, packaging_bindings};

pub use catalog::PluginCatalog;
pub use project::{ExecutionDecl, GoalDecl, PROJECT_FILENAME, PluginDecl, Project, ProjectError};

/// Loads goal metadata.
pub trait GoalLoader: Send + Sync {
  fn load_goal(&self, reference: &GoalRef) -> Result<GoalDescriptor, LoaderError>;
}

/// Pre- and post-goal decorator lists, keyed by goal reference.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Decorators {
  pub pre_goals: BTreeMap<String, Vec<String>>,
  pub post_goals: BTreeMap<String, Vec<String>>,
}

/// Supplies lifecycle bindings and project configuration.
pub trait ModelProvider: Send + Sync {
  /// Default bindings for a packaging type.
  fn default_bindings(&self, packaging: &str) -> Result<LifecycleBindings, SpecificationError>;

  /// Plugins with explicit executions, in declaration order.
  fn plugins(&self, project: &Project) -> Vec<PluginDecl>;

  fn decorators(&self, project: &Project) -> Decorators;
}

/// Model provider backed by the built-in packaging mappings.
#[derive(Debug, Clone, Copy, Default)]
pub struct StandardModelProvider;

impl ModelProvider for StandardModelProvider {
  fn default_bindings(&self, packaging: &str) -> Result<LifecycleBindings, SpecificationError> {
    packaging_bindings(packaging)
  }

  fn plugins(&self, project: &Project) -> Vec<PluginDecl> {
    project.plugins.clone()
  }

  fn decorators(&self, project: &Project) -> Decorators {
    Decorators {
      pre_goals: project.pre_goals.clone(),
      post_goals: project.post_goals.clone(),
    }
  }
}
