//! Build plans: compilation and rendering.
//!
//! [`PlanCompiler`] turns a task list and a project into a [`BuildPlan`]
//! by merging the lifecycle bindings table and walking the goal graph.
//! [`BuildPlan::render_execution_plan`] flattens the plan, bracketing
//! forked sub-plans with fork markers.

pub mod compile;
pub mod types;

pub use compile::{PlanCompiler, compile_execution_plan};
pub use types::{BuildPlan, ForkPlanModifier};
