//! Goal graph walker.
//!
//! Expands tasks into an ordered, deduplicated list of bindings:
//!
//! 1. A phase task becomes the bindings up to and including the phase,
//!    reversed into a work list
//! 2. The work list is consumed head first. For a goal not yet visited (or
//!    marked always-execute) the walker resolves its pre-goals, then the
//!    rest of the work list, then its prerequisites, then appends the goal,
//!    registers its fork if it has one, and resolves its post-goals
//! 3. A goal already visited is skipped, but the rest of the list is still
//!    walked
//! 4. A goal reached again while it is on the recursion stack is a cycle
//!
//! Every edge kind shares one recursion stack, so cycles through any mix of
//! prerequisite, pre-goal and post-goal edges are reported.

use std::collections::{BTreeMap, HashMap, HashSet};

use tracing::{debug, trace};

use crate::binding::{Binding, GoalKey};
use crate::error::{GraphTraversalError, PlanError};
use crate::model::{Decorators, GoalLoader};
use crate::plan::BuildPlan;

use super::task::{GoalRef, Task, parse_goal_ref, parse_task};
use super::types::ForkTarget;

/// Mutable state of one walk.
///
/// Each top-level resolution and each forked sub-plan gets its own context;
/// nothing here is shared between unrelated walks.
#[derive(Debug, Default)]
pub struct WalkContext {
  visited: HashSet<GoalKey>,
  stack: Vec<GoalKey>,
  /// Forking goals enclosing this walk, outermost first.
  fork_stack: Vec<GoalKey>,
  result: Vec<Binding>,
}

impl WalkContext {
  pub fn new() -> Self {
    Self::default()
  }

  fn forked(fork_stack: Vec<GoalKey>) -> Self {
    Self {
      fork_stack,
      ..Self::default()
    }
  }

  pub fn into_result(self) -> Vec<Binding> {
    self.result
  }
}

/// Pre- and post-goal decorators keyed by resolved goal identity.
#[derive(Debug, Clone, Default)]
pub struct DecoratorIndex {
  pre_goals: HashMap<GoalKey, Vec<String>>,
  post_goals: HashMap<GoalKey, Vec<String>>,
}

impl DecoratorIndex {
  /// Resolve decorator keys through the loader.
  ///
  /// A key without an execution id decorates every execution of the goal.
  pub fn build(decorators: &Decorators, loader: &dyn GoalLoader) -> Result<Self, PlanError> {
    Ok(Self {
      pre_goals: Self::index(&decorators.pre_goals, loader)?,
      post_goals: Self::index(&decorators.post_goals, loader)?,
    })
  }

  fn index(
    entries: &BTreeMap<String, Vec<String>>,
    loader: &dyn GoalLoader,
  ) -> Result<HashMap<GoalKey, Vec<String>>, PlanError> {
    let mut index: HashMap<GoalKey, Vec<String>> = HashMap::new();
    for (reference, tasks) in entries {
      let descriptor = loader.load_goal(&parse_goal_ref(reference)?)?;
      index
        .entry(descriptor.binding.key())
        .or_default()
        .extend(tasks.iter().cloned());
    }
    Ok(index)
  }

  pub fn pre_goals(&self, key: &GoalKey) -> Vec<String> {
    Self::lookup(&self.pre_goals, key)
  }

  pub fn post_goals(&self, key: &GoalKey) -> Vec<String> {
    Self::lookup(&self.post_goals, key)
  }

  /// Entries for every execution of the goal, then entries for this exact
  /// execution.
  fn lookup(index: &HashMap<GoalKey, Vec<String>>, key: &GoalKey) -> Vec<String> {
    let mut tasks = index.get(&key.without_execution()).cloned().unwrap_or_default();
    if key.execution_id.is_some()
      && let Some(exact) = index.get(key)
    {
      tasks.extend(exact.iter().cloned());
    }
    tasks
  }
}

/// Resolves tasks into ordered bindings against a [`BuildPlan`].
pub struct GoalWalker<'a> {
  loader: &'a dyn GoalLoader,
  decorators: &'a DecoratorIndex,
}

impl<'a> GoalWalker<'a> {
  pub fn new(loader: &'a dyn GoalLoader, decorators: &'a DecoratorIndex) -> Self {
    Self { loader, decorators }
  }

  /// Resolve a task list in order with one shared context.
  ///
  /// Goal tasks are recorded as direct invocations on the plan. Forking
  /// goals register their sub-plans on the plan as they are reached.
  pub fn resolve(&self, tasks: &[String], plan: &mut BuildPlan) -> Result<Vec<Binding>, PlanError> {
    let mut ctx = WalkContext::new();
    for task in tasks {
      if let Task::Goal(reference) = parse_task(task, plan.bindings())? {
        let descriptor = self.loader.load_goal(&reference)?;
        plan.add_direct_invocation(task, descriptor.binding);
      }
      self.walk_task(task, plan, &mut ctx)?;
    }
    Ok(ctx.into_result())
  }

  /// Walk one task, appending its bindings to `ctx`.
  pub fn walk_task(&self, task: &str, plan: &mut BuildPlan, ctx: &mut WalkContext) -> Result<(), PlanError> {
    let work = match parse_task(task, plan.bindings())? {
      Task::Phase(phase) => {
        let mut work = plan.bindings().bindings_up_to(&phase)?;
        work.reverse();
        work
      }
      Task::Goal(reference) => vec![self.bound_goal(&reference, plan)?],
    };
    trace!(task, goals = work.len(), "walking task");
    self.walk_list(&work, plan, ctx)
  }

  /// A direct goal reference resolves to the table's binding when the goal
  /// is bound there, so its version matches the lifecycle.
  fn bound_goal(&self, reference: &GoalRef, plan: &BuildPlan) -> Result<Binding, PlanError> {
    let descriptor = self.loader.load_goal(reference)?;
    let binding = match plan.bindings().phase_of(&descriptor.binding) {
      Some(phase) => plan
        .bindings()
        .phase_bindings(phase)?
        .iter()
        .find(|b| **b == descriptor.binding)
        .cloned()
        .unwrap_or(descriptor.binding),
      None => descriptor.binding,
    };
    Ok(binding)
  }

  fn walk_list(&self, work: &[Binding], plan: &mut BuildPlan, ctx: &mut WalkContext) -> Result<(), PlanError> {
    match work.split_first() {
      Some((head, rest)) => self.visit(head, rest, plan, ctx),
      None => Ok(()),
    }
  }

  fn visit(
    &self,
    binding: &Binding,
    rest: &[Binding],
    plan: &mut BuildPlan,
    ctx: &mut WalkContext,
  ) -> Result<(), PlanError> {
    let key = binding.key();

    if let Some(pos) = ctx.stack.iter().position(|k| *k == key) {
      let mut path: Vec<String> = ctx.stack[pos..].iter().map(ToString::to_string).collect();
      path.push(key.to_string());
      return Err(GraphTraversalError { path }.into());
    }

    let descriptor = self.loader.load_goal(&GoalRef::from_binding(binding))?;
    if ctx.visited.contains(&key) && !descriptor.always_execute() {
      trace!(goal = %key, "already visited");
      return self.walk_list(rest, plan, ctx);
    }

    ctx.stack.push(key.clone());

    for pre in self.decorators.pre_goals(&key) {
      self.walk_task(&pre, plan, ctx)?;
    }
    self.walk_list(rest, plan, ctx)?;
    for prerequisite in &descriptor.prerequisites {
      self.walk_task(prerequisite, plan, ctx)?;
    }

    ctx.visited.insert(key.clone());
    ctx.result.push(binding.clone());

    if let Some(target) = descriptor.fork_target() {
      self.fork(binding, target, plan, ctx)?;
    }

    for post in self.decorators.post_goals(&key) {
      self.walk_task(&post, plan, ctx)?;
    }

    ctx.stack.pop();
    Ok(())
  }

  /// Build and register the sub-plan a forking goal runs before itself.
  fn fork(&self, binding: &Binding, target: &ForkTarget, plan: &mut BuildPlan, ctx: &WalkContext) -> Result<(), PlanError> {
    let key = binding.key();
    if ctx.fork_stack.contains(&key) {
      debug!(goal = %key, "already forking, not forking again");
      return Ok(());
    }
    if plan.forked_execution(binding).is_some() {
      return Ok(());
    }

    let mut forked = match target {
      ForkTarget::Phase(phase) => plan.copy(phase)?,
      ForkTarget::Goal(task) => BuildPlan::new(plan.bindings().clone(), vec![task.clone()]),
    };

    let mut fork_stack = ctx.fork_stack.clone();
    fork_stack.push(key.clone());
    let mut fork_ctx = WalkContext::forked(fork_stack);
    for task in forked.tasks().to_vec() {
      self.walk_task(&task, &mut forked, &mut fork_ctx)?;
    }
    let mut steps = fork_ctx.into_result();

    // Forking the phase the goal itself is bound to reaches the goal again.
    // Its post-goals may follow it, so look for it anywhere in the fork.
    if let ForkTarget::Phase(phase) = target
      && plan.bindings().phase_of(binding) == Some(phase.as_str())
      && let Some(position) = steps.iter().rposition(|step| step == binding)
    {
      debug!(goal = %key, phase = %phase, "eliding forked occurrence of forking goal");
      steps.remove(position);
    }

    debug!(goal = %key, steps = steps.len(), "registered forked execution");
    forked.set_steps(steps);
    plan.add_forked_execution(binding.clone(), forked);
    Ok(())
  }
}
