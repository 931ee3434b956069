//! Implementation of the `lathe plan` command.
//!
//! Compiles the requested tasks against a project descriptor and prints the
//! rendered execution plan, one binding per line.

use std::path::Path;

use anyhow::{Context, Result};

use lathe_lib::binding::{Binding, ForkMarker};
use lathe_lib::model::Project;
use lathe_lib::plan::compile_execution_plan;
use lathe_lib::session::Session;

use crate::output::{OutputFormat, marker, print_json, print_success};

pub fn cmd_plan(tasks: &[String], project_path: &Path, format: OutputFormat) -> Result<()> {
  let project = Project::load(project_path)
    .with_context(|| format!("Failed to load project: {}", project_path.display()))?;

  let session = Session::default();
  let plan = compile_execution_plan(tasks, &project, &session)
    .with_context(|| format!("Failed to compile plan for: {}", tasks.join(" ")))?;

  if format.is_json() {
    return print_json(&plan);
  }

  for line in render_lines(&plan) {
    println!("{}", line);
  }
  let goals = plan.iter().filter(|b| !b.is_fork_marker()).count();
  print_success(format!("{} goal(s) planned for {}", goals, project.artifact));
  Ok(())
}

/// Plan lines with the contents of each fork indented.
fn render_lines(plan: &[Binding]) -> Vec<String> {
  let mut depth = 0usize;
  let mut lines = Vec::with_capacity(plan.len());
  for binding in plan {
    match binding.fork_marker() {
      Some(fork) => {
        if fork == ForkMarker::EndFork {
          depth = depth.saturating_sub(1);
        }
        lines.push(format!("{}{}", "  ".repeat(depth), marker(fork)));
        if fork == ForkMarker::StartFork {
          depth += 1;
        }
      }
      None => lines.push(format!("{}{}", "  ".repeat(depth), binding)),
    }
  }
  lines
}
