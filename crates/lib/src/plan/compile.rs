//! Plan compilation.
//!
//! Compilation runs in three steps:
//!
//! 1. Build the lifecycle bindings table: the packaging's default bindings
//!    (cached per session) merged with the project's plugin executions
//! 2. Index the project's pre- and post-goal decorators
//! 3. Walk the requested tasks into the plan's steps

use std::sync::Arc;

use tracing::{debug, info};

use crate::binding::Binding;
use crate::error::{PlanError, SpecificationError};
use crate::goal::{DecoratorIndex, GoalRef, GoalWalker};
use crate::lifecycle::LifecycleBindings;
use crate::model::{GoalLoader, ModelProvider, PluginCatalog, Project, StandardModelProvider};
use crate::session::{Session, SessionCache};

use super::types::BuildPlan;

/// Compiles task lists into build plans for one project.
pub struct PlanCompiler<'a> {
  model: &'a dyn ModelProvider,
  loader: &'a dyn GoalLoader,
  cache: &'a SessionCache,
}

impl<'a> PlanCompiler<'a> {
  pub fn new(model: &'a dyn ModelProvider, loader: &'a dyn GoalLoader, cache: &'a SessionCache) -> Self {
    Self { model, loader, cache }
  }

  /// The bindings table for a project.
  ///
  /// Within a phase, packaging defaults come first, then project executions
  /// in declaration order. An execution binding already present in its
  /// phase is not added twice.
  pub fn lifecycle_bindings(&self, project: &Project) -> Result<LifecycleBindings, PlanError> {
    let defaults = self.default_bindings(&project.packaging)?;
    let mut bindings = LifecycleBindings::clone(&defaults);

    for plugin in self.model.plugins(project) {
      bindings.align_plugin_version(&plugin.group, &plugin.artifact, &plugin.version);

      for execution in &plugin.executions {
        for goal in &execution.goals {
          let reference = GoalRef::Coordinate {
            group: plugin.group.clone(),
            artifact: plugin.artifact.clone(),
            version: Some(plugin.version.clone()),
            goal: goal.clone(),
            execution_id: execution.binding_id().map(str::to_string),
          };
          let descriptor = self.loader.load_goal(&reference)?;

          let phase = execution
            .phase
            .clone()
            .or(descriptor.default_phase)
            .ok_or_else(|| SpecificationError::MissingPhase {
              goal: reference.to_string(),
              execution: execution.display_id().to_string(),
            })?;

          if bindings.contains(&phase, &descriptor.binding) {
            continue;
          }
          debug!(
            binding = %descriptor.binding,
            phase = %phase,
            execution = execution.display_id(),
            "binding project execution"
          );
          bindings.add_binding(&phase, descriptor.binding)?;
        }
      }
    }

    Ok(bindings)
  }

  fn default_bindings(&self, packaging: &str) -> Result<Arc<LifecycleBindings>, SpecificationError> {
    self
      .cache
      .lifecycle_mappings()
      .get_or_try_insert_with(packaging.to_string(), || {
        debug!(packaging, "computing default lifecycle bindings");
        self.model.default_bindings(packaging).map(Arc::new)
      })
      .map_err(Arc::unwrap_or_clone)
  }

  /// Compile `tasks` into a plan whose steps are resolved but not rendered.
  pub fn build_plan(&self, tasks: &[String], project: &Project) -> Result<BuildPlan, PlanError> {
    let bindings = self.lifecycle_bindings(project)?;
    let decorators = DecoratorIndex::build(&self.model.decorators(project), self.loader)?;

    let mut plan = BuildPlan::new(bindings, tasks.to_vec());
    let steps = GoalWalker::new(self.loader, &decorators).resolve(tasks, &mut plan)?;
    info!(
      tasks = tasks.len(),
      steps = steps.len(),
      forks = plan.forked_executions().len(),
      "compiled build plan"
    );
    plan.set_steps(steps);
    Ok(plan)
  }

  /// Compile and render `tasks` into the flat execution sequence.
  pub fn compile_execution_plan(&self, tasks: &[String], project: &Project) -> Result<Vec<Binding>, PlanError> {
    Ok(self.build_plan(tasks, project)?.render_execution_plan())
  }
}

/// Compile `tasks` for `project` with the built-in packaging mappings and the
/// project's plugin metadata.
pub fn compile_execution_plan(tasks: &[String], project: &Project, session: &Session) -> Result<Vec<Binding>, PlanError> {
  let catalog = PluginCatalog::for_project(project);
  PlanCompiler::new(&StandardModelProvider, &catalog, session.cache()).compile_execution_plan(tasks, project)
}
