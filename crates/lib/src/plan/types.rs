use std::collections::{BTreeMap, HashMap};

use crate::binding::{Binding, ForkMarker};
use crate::error::SpecificationError;
use crate::lifecycle::LifecycleBindings;

/// Runs `insertions` in a forked context immediately before `target`.
///
/// Nested modifiers target bindings inside `insertions` and render as
/// brackets strictly inside this modifier's brackets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForkPlanModifier {
  pub target: Binding,
  pub insertions: Vec<Binding>,
  pub nested: Vec<ForkPlanModifier>,
}

impl ForkPlanModifier {
  pub fn new(target: Binding, insertions: Vec<Binding>) -> Self {
    Self {
      target,
      insertions,
      nested: Vec::new(),
    }
  }

  /// Attach `modifier` at the innermost level whose insertions contain its
  /// target. Hands the modifier back if no level does.
  fn try_nest(&mut self, modifier: ForkPlanModifier) -> Option<ForkPlanModifier> {
    if self.insertions.contains(&modifier.target) {
      self.nested.push(modifier);
      return None;
    }
    let mut pending = modifier;
    for nested in &mut self.nested {
      match nested.try_nest(pending) {
        None => return None,
        Some(returned) => pending = returned,
      }
    }
    Some(pending)
  }

  /// This modifier's bracketed insertions, rendered.
  fn render(&self) -> Vec<Binding> {
    let mut out = Vec::with_capacity(self.insertions.len() + 2);
    out.push(ForkMarker::StartFork.binding());
    out.extend(apply_modifiers(&self.insertions, &self.nested));
    out.push(ForkMarker::EndFork.binding());
    out
  }
}

/// The plan for one task list.
///
/// Holds the bindings table the goals were resolved against, the resolved
/// steps in execution order, and the fork modifiers applied at render time.
#[derive(Debug, Clone)]
pub struct BuildPlan {
  bindings: LifecycleBindings,
  tasks: Vec<String>,
  direct_invocations: BTreeMap<String, Binding>,
  forked_executions: HashMap<Binding, BuildPlan>,
  modifiers: Vec<ForkPlanModifier>,
  steps: Vec<Binding>,
}

impl BuildPlan {
  pub fn new(bindings: LifecycleBindings, tasks: Vec<String>) -> Self {
    Self {
      bindings,
      tasks,
      direct_invocations: BTreeMap::new(),
      forked_executions: HashMap::new(),
      modifiers: Vec::new(),
      steps: Vec::new(),
    }
  }

  /// A fresh plan for forking `phase`.
  ///
  /// The copy owns a snapshot of the bindings table truncated after
  /// `phase` and shares nothing else with this plan.
  pub fn copy(&self, phase: &str) -> Result<BuildPlan, SpecificationError> {
    Ok(BuildPlan::new(self.bindings.copy_up_to(phase)?, vec![phase.to_string()]))
  }

  pub fn bindings(&self) -> &LifecycleBindings {
    &self.bindings
  }

  pub fn tasks(&self) -> &[String] {
    &self.tasks
  }

  /// Resolved steps before fork expansion.
  pub fn steps(&self) -> &[Binding] {
    &self.steps
  }

  pub fn set_steps(&mut self, steps: Vec<Binding>) {
    self.steps = steps;
  }

  pub fn direct_invocations(&self) -> &BTreeMap<String, Binding> {
    &self.direct_invocations
  }

  pub fn add_direct_invocation(&mut self, task: &str, binding: Binding) {
    self.direct_invocations.entry(task.to_string()).or_insert(binding);
  }

  pub fn forked_execution(&self, binding: &Binding) -> Option<&BuildPlan> {
    self.forked_executions.get(binding)
  }

  pub fn forked_executions(&self) -> &HashMap<Binding, BuildPlan> {
    &self.forked_executions
  }

  pub fn modifiers(&self) -> &[ForkPlanModifier] {
    &self.modifiers
  }

  /// Register the forked sub-plan run before `binding`.
  ///
  /// The sub-plan's steps become the insertions of a modifier targeting
  /// `binding`; its own modifiers nest inside.
  pub fn add_forked_execution(&mut self, binding: Binding, forked: BuildPlan) {
    let mut modifier = ForkPlanModifier::new(binding.clone(), forked.steps.clone());
    modifier.nested = forked.modifiers.clone();
    self.modifiers.push(modifier);
    self.forked_executions.insert(binding, forked);
  }

  /// Add a modifier.
  ///
  /// A modifier whose target is one of the plan's steps applies at the top
  /// level. Otherwise it nests inside the first existing modifier whose
  /// insertions (at any depth) contain the target.
  pub fn add_modifier(&mut self, modifier: ForkPlanModifier) -> Result<(), SpecificationError> {
    if self.steps.contains(&modifier.target) {
      self.modifiers.push(modifier);
      return Ok(());
    }
    let mut pending = modifier;
    for existing in &mut self.modifiers {
      match existing.try_nest(pending) {
        None => return Ok(()),
        Some(returned) => pending = returned,
      }
    }
    Err(SpecificationError::ModifierTargetNotFound(pending.target.to_string()))
  }

  /// Flatten the plan into the final execution sequence.
  ///
  /// A step targeted by a modifier renders as
  /// `[start-fork] ++ insertions ++ [end-fork] ++ step ++ [clear-fork-context]`.
  pub fn render_execution_plan(&self) -> Vec<Binding> {
    apply_modifiers(&self.steps, &self.modifiers)
  }
}

fn apply_modifiers(steps: &[Binding], modifiers: &[ForkPlanModifier]) -> Vec<Binding> {
  let mut out = Vec::with_capacity(steps.len());
  for step in steps {
    let mut forked = false;
    for modifier in modifiers.iter().filter(|m| m.target == *step) {
      out.extend(modifier.render());
      forked = true;
    }
    out.push(step.clone());
    if forked {
      out.push(ForkMarker::ClearForkContext.binding());
    }
  }
  out
}
