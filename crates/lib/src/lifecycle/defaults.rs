//! Standard lifecycles, built-in plugins and packaging mappings.

use crate::binding::Binding;
use crate::consts::BUILTIN_PLUGIN_GROUP;
use crate::error::SpecificationError;
use crate::goal::{ForkTarget, GoalKind, ResolutionScope};
use crate::model::{GoalDecl, PluginDecl};

use super::types::{Lifecycle, LifecycleBindings};

const BUILTIN_VERSION: &str = "1.0.0";

/// The `clean`, `default` and `site` lifecycles.
pub fn standard_lifecycles() -> Vec<Lifecycle> {
  vec![
    Lifecycle::new("clean", &["pre-clean", "clean", "post-clean"]),
    Lifecycle::new(
      "default",
      &[
        "validate",
        "initialize",
        "generate-sources",
        "process-sources",
        "generate-resources",
        "process-resources",
        "compile",
        "process-classes",
        "generate-test-sources",
        "process-test-sources",
        "generate-test-resources",
        "process-test-resources",
        "test-compile",
        "process-test-classes",
        "test",
        "prepare-package",
        "package",
        "pre-integration-test",
        "integration-test",
        "post-integration-test",
        "verify",
        "install",
        "deploy",
      ],
    ),
    Lifecycle::new("site", &["pre-site", "site", "post-site", "site-deploy"]),
  ]
}

fn builtin(artifact: &str, goals: Vec<GoalDecl>) -> PluginDecl {
  let mut plugin = PluginDecl::new(BUILTIN_PLUGIN_GROUP, artifact, BUILTIN_VERSION);
  plugin.goals = goals;
  plugin
}

/// Metadata for the plugins the packaging mappings refer to.
pub fn builtin_plugins() -> Vec<PluginDecl> {
  vec![
    builtin("lathe-clean-plugin", vec![GoalDecl::new("clean").in_phase("clean")]),
    builtin(
      "lathe-resources-plugin",
      vec![
        GoalDecl::new("resources").in_phase("process-resources"),
        GoalDecl::new("testResources").in_phase("process-test-resources"),
      ],
    ),
    builtin(
      "lathe-compiler-plugin",
      vec![
        GoalDecl::new("compile")
          .in_phase("compile")
          .requiring(ResolutionScope::Compile),
        GoalDecl::new("testCompile")
          .in_phase("test-compile")
          .requiring(ResolutionScope::Test),
      ],
    ),
    builtin(
      "lathe-surefire-plugin",
      vec![GoalDecl::new("test").in_phase("test").requiring(ResolutionScope::Test)],
    ),
    builtin(
      "lathe-jar-plugin",
      vec![
        GoalDecl::new("jar").in_phase("package").requiring(ResolutionScope::Runtime),
        GoalDecl::new("test-jar")
          .in_phase("package")
          .requiring(ResolutionScope::Test),
      ],
    ),
    builtin(
      "lathe-war-plugin",
      vec![GoalDecl::new("war").in_phase("package").requiring(ResolutionScope::Runtime)],
    ),
    builtin(
      "lathe-source-plugin",
      vec![
        GoalDecl::new("jar")
          .in_phase("package")
          .with_kind(GoalKind::Forking(ForkTarget::Phase("generate-sources".to_string()))),
      ],
    ),
    builtin("lathe-install-plugin", vec![GoalDecl::new("install").in_phase("install")]),
    builtin("lathe-deploy-plugin", vec![GoalDecl::new("deploy").in_phase("deploy")]),
    builtin(
      "lathe-site-plugin",
      vec![
        GoalDecl::new("site").in_phase("site"),
        GoalDecl::new("deploy").in_phase("site-deploy"),
      ],
    ),
  ]
}

/// (phase, plugin artifact, goal) triples shared by every packaging.
const COMMON_MAPPINGS: &[(&str, &str, &str)] = &[
  ("clean", "lathe-clean-plugin", "clean"),
  ("site", "lathe-site-plugin", "site"),
  ("site-deploy", "lathe-site-plugin", "deploy"),
];

const ARCHIVE_MAPPINGS: &[(&str, &str, &str)] = &[
  ("process-resources", "lathe-resources-plugin", "resources"),
  ("compile", "lathe-compiler-plugin", "compile"),
  ("process-test-resources", "lathe-resources-plugin", "testResources"),
  ("test-compile", "lathe-compiler-plugin", "testCompile"),
  ("test", "lathe-surefire-plugin", "test"),
];

const INSTALL_MAPPINGS: &[(&str, &str, &str)] = &[
  ("install", "lathe-install-plugin", "install"),
  ("deploy", "lathe-deploy-plugin", "deploy"),
];

/// Default bindings for a packaging type.
///
/// Supported packagings are `pom`, `jar` and `war`.
pub fn packaging_bindings(packaging: &str) -> Result<LifecycleBindings, SpecificationError> {
  let package: &[(&str, &str, &str)] = match packaging {
    "pom" => &[],
    "jar" => &[("package", "lathe-jar-plugin", "jar")],
    "war" => &[("package", "lathe-war-plugin", "war")],
    other => return Err(SpecificationError::UnknownPackaging(other.to_string())),
  };
  let archive = if packaging == "pom" { &[][..] } else { ARCHIVE_MAPPINGS };

  let mut bindings = LifecycleBindings::new(&standard_lifecycles());
  for (phase, artifact, goal) in COMMON_MAPPINGS
    .iter()
    .chain(archive)
    .chain(package)
    .chain(INSTALL_MAPPINGS)
  {
    let binding = Binding::new(BUILTIN_PLUGIN_GROUP, artifact, BUILTIN_VERSION, goal);
    bindings.add_binding(phase, binding)?;
  }
  Ok(bindings)
}
