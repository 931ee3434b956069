//! Goal metadata, task syntax and the goal graph walker.

pub mod task;
pub mod types;
pub mod walker;

pub use task::{GoalRef, Task, parse_goal_ref, parse_task};
pub use types::{ForkTarget, GoalDescriptor, GoalKind, ResolutionScope};
pub use walker::{DecoratorIndex, GoalWalker, WalkContext};
