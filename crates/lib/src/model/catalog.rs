//! Goal metadata lookup over built-in and project plugins.

use tracing::trace;

use crate::error::LoaderError;
use crate::goal::{GoalDescriptor, GoalRef};
use crate::lifecycle::builtin_plugins;

use super::GoalLoader;
use super::project::{PluginDecl, Project};

/// Plugin metadata known to a build.
///
/// Project declarations override built-in plugins with the same
/// `group:artifact`; a project declaration without goal metadata inherits
/// the built-in plugin's goals.
#[derive(Debug, Clone, Default)]
pub struct PluginCatalog {
  plugins: Vec<PluginDecl>,
}

impl PluginCatalog {
  pub fn new(plugins: Vec<PluginDecl>) -> Self {
    Self { plugins }
  }

  /// Built-in plugins overlaid with the project's declarations.
  pub fn for_project(project: &Project) -> Self {
    let mut plugins = builtin_plugins();
    for declared in &project.plugins {
      match plugins.iter_mut().find(|p| p.key() == declared.key()) {
        Some(existing) => {
          let inherited = std::mem::take(&mut existing.goals);
          *existing = declared.clone();
          if existing.goals.is_empty() {
            existing.goals = inherited;
          }
        }
        None => plugins.push(declared.clone()),
      }
    }
    Self { plugins }
  }

  pub fn plugins(&self) -> &[PluginDecl] {
    &self.plugins
  }

  pub fn find(&self, group: &str, artifact: &str) -> Option<&PluginDecl> {
    self.plugins.iter().find(|p| p.group == group && p.artifact == artifact)
  }

  pub fn find_by_prefix(&self, prefix: &str) -> Option<&PluginDecl> {
    self.plugins.iter().find(|p| p.prefix() == prefix)
  }
}

impl GoalLoader for PluginCatalog {
  fn load_goal(&self, reference: &GoalRef) -> Result<GoalDescriptor, LoaderError> {
    let (plugin, version) = match reference {
      GoalRef::Prefixed { prefix, .. } => {
        let plugin = self
          .find_by_prefix(prefix)
          .ok_or_else(|| LoaderError::UnknownPrefix(prefix.clone()))?;
        (plugin, plugin.version.as_str())
      }
      GoalRef::Coordinate {
        group,
        artifact,
        version,
        ..
      } => {
        let plugin = self
          .find(group, artifact)
          .ok_or_else(|| LoaderError::UnknownPlugin(format!("{}:{}", group, artifact)))?;
        (plugin, version.as_deref().unwrap_or(&plugin.version))
      }
    };

    let goal = plugin.goal(reference.goal()).ok_or_else(|| LoaderError::UnknownGoal {
      plugin: plugin.key(),
      goal: reference.goal().to_string(),
    })?;

    trace!(reference = %reference, plugin = %plugin.key(), "loaded goal metadata");
    Ok(plugin.descriptor(goal, version, reference.execution_id()))
  }
}
