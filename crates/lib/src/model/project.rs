//! The project descriptor (`lathe.json`).
//!
//! # Format
//!
//! ```json
//! {
//!   "group": "org.example",
//!   "artifact": "app",
//!   "version": "1.0.0",
//!   "packaging": "jar",
//!   "plugins": [
//!     {
//!       "group": "org.example.plugins",
//!       "artifact": "codegen-plugin",
//!       "version": "2.1.0",
//!       "goals": [{ "name": "generate", "phase": "generate-sources" }],
//!       "executions": [{ "id": "gen", "goals": ["generate"] }],
//!       "dependencies": [{ "group": "org.antlr", "artifact": "runtime", "version": "4.13" }]
//!     }
//!   ],
//!   "pre_goals": { "jar:jar": ["codegen:generate"] },
//!   "post_goals": {}
//! }
//! ```

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::binding::Binding;
use crate::consts::DEFAULT_EXECUTION_ID;
use crate::goal::{GoalDescriptor, GoalKind, ResolutionScope};
use crate::resolve::{Artifact, Dependency};

/// Default file name of the project descriptor.
pub const PROJECT_FILENAME: &str = "lathe.json";

/// A project's declared build configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
  pub group: String,
  pub artifact: String,
  pub version: String,
  #[serde(default = "default_packaging")]
  pub packaging: String,
  #[serde(default)]
  pub plugins: Vec<PluginDecl>,
  /// Goals to run immediately before a goal, keyed by goal reference.
  #[serde(default)]
  pub pre_goals: BTreeMap<String, Vec<String>>,
  /// Goals to run immediately after a goal, keyed by goal reference.
  #[serde(default)]
  pub post_goals: BTreeMap<String, Vec<String>>,
}

fn default_packaging() -> String {
  "jar".to_string()
}

/// Errors that can occur when loading a project descriptor.
#[derive(Debug, Error)]
pub enum ProjectError {
  #[error("failed to read project descriptor {path}: {source}")]
  Read {
    path: PathBuf,
    #[source]
    source: io::Error,
  },

  #[error("failed to parse project descriptor {path}: {source}")]
  Parse {
    path: PathBuf,
    #[source]
    source: serde_json::Error,
  },
}

impl Project {
  /// Load a project descriptor from a JSON file.
  pub fn load(path: &Path) -> Result<Self, ProjectError> {
    let content = fs::read_to_string(path).map_err(|source| ProjectError::Read {
      path: path.to_path_buf(),
      source,
    })?;
    serde_json::from_str(&content).map_err(|source| ProjectError::Parse {
      path: path.to_path_buf(),
      source,
    })
  }

  /// A minimal project with no plugin configuration.
  pub fn new(group: &str, artifact: &str, version: &str, packaging: &str) -> Self {
    Self {
      group: group.to_string(),
      artifact: artifact.to_string(),
      version: version.to_string(),
      packaging: packaging.to_string(),
      plugins: Vec::new(),
      pre_goals: BTreeMap::new(),
      post_goals: BTreeMap::new(),
    }
  }

  /// Find a plugin declaration by `group:artifact`.
  pub fn plugin(&self, group: &str, artifact: &str) -> Option<&PluginDecl> {
    self.plugins.iter().find(|p| p.group == group && p.artifact == artifact)
  }
}

/// A plugin as declared by a project or shipped built in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PluginDecl {
  pub group: String,
  pub artifact: String,
  pub version: String,
  /// Short name used in `prefix:goal` tasks.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub prefix: Option<String>,
  /// Goal metadata.
  #[serde(default)]
  pub goals: Vec<GoalDecl>,
  #[serde(default)]
  pub executions: Vec<ExecutionDecl>,
  /// Extra dependencies added to the plugin's own classpath.
  #[serde(default)]
  pub dependencies: Vec<Dependency>,
}

impl PluginDecl {
  pub fn new(group: &str, artifact: &str, version: &str) -> Self {
    Self {
      group: group.to_string(),
      artifact: artifact.to_string(),
      version: version.to_string(),
      prefix: None,
      goals: Vec::new(),
      executions: Vec::new(),
      dependencies: Vec::new(),
    }
  }

  pub fn with_goal(mut self, goal: GoalDecl) -> Self {
    self.goals.push(goal);
    self
  }

  pub fn key(&self) -> String {
    format!("{}:{}", self.group, self.artifact)
  }

  pub fn artifact(&self) -> Artifact {
    Artifact::new(&self.group, &self.artifact, &self.version)
  }

  /// The goal prefix: explicit, or derived from the artifact id
  /// (`lathe-jar-plugin` and `jar-plugin` both give `jar`).
  pub fn prefix(&self) -> String {
    if let Some(prefix) = &self.prefix {
      return prefix.clone();
    }
    let name = self.artifact.strip_prefix("lathe-").unwrap_or(&self.artifact);
    name.strip_suffix("-plugin").unwrap_or(name).to_string()
  }

  pub fn goal(&self, name: &str) -> Option<&GoalDecl> {
    self.goals.iter().find(|g| g.name == name)
  }

  /// Binding for one of this plugin's goals.
  pub fn binding(&self, goal: &str) -> Binding {
    Binding::new(&self.group, &self.artifact, &self.version, goal)
  }

  /// Full descriptor for a goal, bound at `version`.
  pub fn descriptor(&self, goal: &GoalDecl, version: &str, execution_id: Option<&str>) -> GoalDescriptor {
    let mut binding = Binding::new(&self.group, &self.artifact, version, &goal.name);
    binding.execution_id = execution_id.map(str::to_string);
    GoalDescriptor {
      binding,
      kind: goal.kind.clone(),
      default_phase: goal.phase.clone(),
      requires_dependency_resolution: goal.requires_dependency_resolution,
      prerequisites: goal.prerequisites.clone(),
    }
  }
}

/// Metadata for one goal of a plugin.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GoalDecl {
  pub name: String,
  /// Default phase.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub phase: Option<String>,
  #[serde(default)]
  pub kind: GoalKind,
  #[serde(default)]
  pub requires_dependency_resolution: ResolutionScope,
  #[serde(default, skip_serializing_if = "Vec::is_empty")]
  pub prerequisites: Vec<String>,
}

impl GoalDecl {
  pub fn new(name: &str) -> Self {
    Self {
      name: name.to_string(),
      phase: None,
      kind: GoalKind::Normal,
      requires_dependency_resolution: ResolutionScope::None,
      prerequisites: Vec::new(),
    }
  }

  pub fn in_phase(mut self, phase: &str) -> Self {
    self.phase = Some(phase.to_string());
    self
  }

  pub fn with_kind(mut self, kind: GoalKind) -> Self {
    self.kind = kind;
    self
  }

  pub fn requiring(mut self, scope: ResolutionScope) -> Self {
    self.requires_dependency_resolution = scope;
    self
  }
}

/// A configured execution of one or more goals.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionDecl {
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub id: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub phase: Option<String>,
  pub goals: Vec<String>,
}

impl ExecutionDecl {
  /// Execution id as it appears on bindings; the default execution has none.
  pub fn binding_id(&self) -> Option<&str> {
    self.id.as_deref().filter(|id| *id != DEFAULT_EXECUTION_ID)
  }

  /// Execution id for diagnostics.
  pub fn display_id(&self) -> &str {
    self.id.as_deref().unwrap_or(DEFAULT_EXECUTION_ID)
  }
}
