//! Task syntax.
//!
//! A task is either a lifecycle phase (`package`) or a direct goal
//! invocation:
//!
//! - `prefix:goal`
//! - `group:artifact:goal`
//! - `group:artifact:version:goal`
//!
//! Goal invocations may carry an execution id suffix, `jar:jar@attach`.

use std::fmt;

use crate::binding::Binding;
use crate::error::SpecificationError;
use crate::lifecycle::LifecycleBindings;

/// A reference to a goal, before metadata is loaded.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum GoalRef {
  Prefixed {
    prefix: String,
    goal: String,
    execution_id: Option<String>,
  },
  Coordinate {
    group: String,
    artifact: String,
    version: Option<String>,
    goal: String,
    execution_id: Option<String>,
  },
}

impl GoalRef {
  /// A fully qualified reference to an already bound goal.
  pub fn from_binding(binding: &Binding) -> Self {
    GoalRef::Coordinate {
      group: binding.group.clone(),
      artifact: binding.artifact.clone(),
      version: Some(binding.version.clone()),
      goal: binding.goal.clone(),
      execution_id: binding.execution_id.clone(),
    }
  }

  pub fn goal(&self) -> &str {
    match self {
      GoalRef::Prefixed { goal, .. } | GoalRef::Coordinate { goal, .. } => goal,
    }
  }

  pub fn execution_id(&self) -> Option<&str> {
    match self {
      GoalRef::Prefixed { execution_id, .. } | GoalRef::Coordinate { execution_id, .. } => execution_id.as_deref(),
    }
  }
}

impl fmt::Display for GoalRef {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      GoalRef::Prefixed { prefix, goal, .. } => write!(f, "{}:{}", prefix, goal)?,
      GoalRef::Coordinate {
        group,
        artifact,
        version: Some(version),
        goal,
        ..
      } => write!(f, "{}:{}:{}:{}", group, artifact, version, goal)?,
      GoalRef::Coordinate {
        group, artifact, goal, ..
      } => write!(f, "{}:{}:{}", group, artifact, goal)?,
    }
    if let Some(id) = self.execution_id() {
      write!(f, "@{}", id)?;
    }
    Ok(())
  }
}

/// A parsed task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Task {
  Phase(String),
  Goal(GoalRef),
}

/// Parse a task against the phases known to `bindings`.
pub fn parse_task(task: &str, bindings: &LifecycleBindings) -> Result<Task, SpecificationError> {
  if bindings.has_phase(task) {
    return Ok(Task::Phase(task.to_string()));
  }
  if !task.contains(':') {
    return Err(SpecificationError::UnknownTask(task.to_string()));
  }
  parse_goal_ref(task).map(Task::Goal)
}

/// Parse a goal reference.
pub fn parse_goal_ref(reference: &str) -> Result<GoalRef, SpecificationError> {
  let invalid = |reason: &str| SpecificationError::InvalidGoalReference {
    reference: reference.to_string(),
    reason: reason.to_string(),
  };

  let (body, execution_id) = match reference.split_once('@') {
    Some((_, "")) => return Err(invalid("empty execution id")),
    Some((body, id)) => (body, Some(id.to_string())),
    None => (reference, None),
  };

  let parts: Vec<&str> = body.split(':').collect();
  if parts.iter().any(|p| p.is_empty()) {
    return Err(invalid("empty segment"));
  }

  match parts.as_slice() {
    [prefix, goal] => Ok(GoalRef::Prefixed {
      prefix: prefix.to_string(),
      goal: goal.to_string(),
      execution_id,
    }),
    [group, artifact, goal] => Ok(GoalRef::Coordinate {
      group: group.to_string(),
      artifact: artifact.to_string(),
      version: None,
      goal: goal.to_string(),
      execution_id,
    }),
    [group, artifact, version, goal] => Ok(GoalRef::Coordinate {
      group: group.to_string(),
      artifact: artifact.to_string(),
      version: Some(version.to_string()),
      goal: goal.to_string(),
      execution_id,
    }),
    _ => Err(invalid("expected prefix:goal or group:artifact[:version]:goal")),
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::lifecycle::standard_lifecycles;

  fn bindings() -> LifecycleBindings {
    LifecycleBindings::new(&standard_lifecycles())
  }

  #[test]
  fn phase_task() {
    assert_eq!(parse_task("package", &bindings()).unwrap(), Task::Phase("package".to_string()));
  }

  #[test]
  fn prefixed_goal_task() {
    let task = parse_task("jar:jar@attach", &bindings()).unwrap();
    assert_eq!(
      task,
      Task::Goal(GoalRef::Prefixed {
        prefix: "jar".to_string(),
        goal: "jar".to_string(),
        execution_id: Some("attach".to_string()),
      })
    );
  }

  #[test]
  fn coordinate_goal_refs() {
    let three = parse_goal_ref("org.example:tool:run").unwrap();
    assert_eq!(three.to_string(), "org.example:tool:run");

    let four = parse_goal_ref("org.example:tool:1.2:run").unwrap();
    match &four {
      GoalRef::Coordinate { version, goal, .. } => {
        assert_eq!(version.as_deref(), Some("1.2"));
        assert_eq!(goal, "run");
      }
      other => panic!("unexpected ref {:?}", other),
    }
    assert_eq!(four.to_string(), "org.example:tool:1.2:run");
  }

  #[test]
  fn unknown_bare_word() {
    assert_eq!(
      parse_task("compiel", &bindings()).unwrap_err(),
      SpecificationError::UnknownTask("compiel".to_string())
    );
  }

  #[test]
  fn malformed_refs() {
    assert!(parse_goal_ref("a::b").is_err());
    assert!(parse_goal_ref("a:b@").is_err());
    assert!(parse_goal_ref("a:b:c:d:e").is_err());
    assert!(parse_goal_ref("single").is_err());
  }

  #[test]
  fn ref_from_binding_keeps_execution() {
    let binding = Binding::new("g", "a", "1", "x").with_execution_id("e");
    let reference = GoalRef::from_binding(&binding);
    assert_eq!(reference.execution_id(), Some("e"));
    assert_eq!(reference.to_string(), "g:a:1:x@e");
  }
}
