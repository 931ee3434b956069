//! Implementation of the `lathe classpath` command.
//!
//! Resolves a plugin's classpath from the local repository, aligned against
//! the host's exported artifacts.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::debug;

use lathe_lib::model::{PROJECT_FILENAME, Project};
use lathe_lib::resolve::{Artifact, Dependency, HostExportManifest, Scope, resolve_plugin_classpath};
use lathe_lib::session::{Session, SessionConfig};

use crate::output::{
  self, OutputFormat, print_json, print_stat, print_success, print_warning, scope_tag, truncate_hash,
};

const EXPORTS_FILENAME: &str = "host-exports.json";

pub struct ClasspathOptions {
  pub project: Option<PathBuf>,
  pub exports: Option<PathBuf>,
  pub repository: Option<PathBuf>,
  pub offline: bool,
}

pub fn cmd_classpath(plugin: &str, options: ClasspathOptions, verbose: bool, format: OutputFormat) -> Result<()> {
  let plugin: Artifact = plugin.parse().context("Invalid plugin coordinate")?;

  let declared = declared_dependencies(&plugin, options.project.as_deref())?;
  let exports = load_exports(options.exports.as_deref())?;

  let mut config = SessionConfig::default();
  if let Some(repository) = options.repository {
    config = config.with_repository(repository);
  }
  config.offline = options.offline;
  debug!(repository = %config.local_repository.display(), "using local repository");
  let session = Session::new(config);

  let classpath = resolve_plugin_classpath(&plugin, &declared, &[], &exports, &session)
    .with_context(|| format!("Failed to resolve classpath of {}", plugin))?;

  if format.is_json() {
    return print_json(&classpath);
  }

  for relocation in &classpath.relocations {
    print_warning(format!(
      "{} {} {}",
      relocation.from,
      output::symbols::ARROW,
      relocation.to
    ));
  }

  print_success(format!("Classpath of {}", classpath.plugin));
  for entry in &classpath.artifacts {
    let line = format!(
      "{} {} {}",
      entry.artifact,
      scope_tag(entry.scope, entry.scope == Scope::Provided),
      truncate_hash(&entry.digest.0)
    );
    if verbose {
      println!("  {} {} ({})", output::symbols::INFO, line, entry.path.display());
    } else {
      println!("  {} {}", output::symbols::INFO, line);
    }
  }

  println!();
  print_stat("Artifacts", classpath.artifacts.len());
  print_stat("Runtime", classpath.runtime_entries().count());
  Ok(())
}

/// Dependencies the project declares for the plugin.
///
/// An explicit project must exist; otherwise `lathe.json` is read when present.
fn declared_dependencies(plugin: &Artifact, project: Option<&Path>) -> Result<Vec<Dependency>> {
  let path = match project {
    Some(path) => path.to_path_buf(),
    None => {
      let default = PathBuf::from(PROJECT_FILENAME);
      if !default.exists() {
        return Ok(Vec::new());
      }
      default
    }
  };

  let project = Project::load(&path).with_context(|| format!("Failed to load project: {}", path.display()))?;
  let Some(decl) = project.plugin(&plugin.group, &plugin.artifact) else {
    debug!(plugin = %plugin.key(), project = %path.display(), "plugin not declared by project");
    return Ok(Vec::new());
  };
  if decl.version != plugin.version {
    print_warning(format!(
      "project declares {} at {}, resolving {}",
      decl.key(),
      decl.version,
      plugin.version
    ));
  }
  Ok(decl.dependencies.clone())
}

fn load_exports(path: Option<&Path>) -> Result<HostExportManifest> {
  match path {
    Some(path) => {
      HostExportManifest::load(path).with_context(|| format!("Failed to load host exports: {}", path.display()))
    }
    None => {
      let default = Path::new(EXPORTS_FILENAME);
      if default.exists() {
        HostExportManifest::load(default).context("Failed to load host exports")
      } else {
        Ok(HostExportManifest::default())
      }
    }
  }
}
