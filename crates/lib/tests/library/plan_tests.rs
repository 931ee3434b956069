use lathe_lib::consts::BUILTIN_PLUGIN_GROUP;
use lathe_lib::error::{GraphTraversalError, PlanError};
use lathe_lib::goal::{ForkTarget, GoalKind};
use lathe_lib::model::{ExecutionDecl, GoalDecl, PluginCatalog, PluginDecl, Project, StandardModelProvider};
use lathe_lib::plan::{PlanCompiler, compile_execution_plan};
use lathe_lib::session::Session;

use super::common::render;

fn tasks(names: &[&str]) -> Vec<String> {
  names.iter().map(|s| s.to_string()).collect()
}

fn jar_project() -> Project {
  Project::new("org.example", "app", "1.0", "jar")
}

#[test]
fn phases_concatenate_up_to_deepest_requested() {
  let session = Session::default();
  let plan = compile_execution_plan(&tasks(&["clean", "compile", "install"]), &jar_project(), &session).unwrap();
  assert_eq!(
    render(&plan),
    [
      "clean:clean",
      "resources:resources",
      "compiler:compile",
      "resources:testResources",
      "compiler:testCompile",
      "surefire:test",
      "jar:jar",
      "install:install",
    ]
  );
}

#[test]
fn pre_goal_decorator_runs_first() {
  let mut project = jar_project();
  project
    .plugins
    .push(PluginDecl::new("org.example", "lint-plugin", "1.0").with_goal(GoalDecl::new("check").in_phase("validate")));
  project
    .pre_goals
    .insert("compiler:compile".to_string(), vec!["lint:check".to_string()]);

  let plan = compile_execution_plan(&tasks(&["compile"]), &project, &Session::default()).unwrap();
  assert_eq!(render(&plan), ["lint:check", "resources:resources", "compiler:compile"]);
}

#[test]
fn forking_goal_renders_literal_sequence() {
  let mut project = jar_project();
  let mut docs = PluginDecl::new("org.example", "docs-plugin", "1.0").with_goal(
    GoalDecl::new("bundle").with_kind(GoalKind::Forking(ForkTarget::Phase("compile".to_string()))),
  );
  docs.executions.push(ExecutionDecl {
    id: Some("bundle-docs".to_string()),
    phase: Some("verify".to_string()),
    goals: vec!["bundle".to_string()],
  });
  project.plugins.push(docs);

  let plan = compile_execution_plan(&tasks(&["verify"]), &project, &Session::default()).unwrap();
  let rendered = render(&plan);
  let fork_start = rendered.iter().position(|s| s == "[start-fork]").unwrap();
  assert_eq!(
    &rendered[fork_start..],
    [
      "[start-fork]",
      "resources:resources",
      "compiler:compile",
      "[end-fork]",
      "docs:bundle@bundle-docs",
      "[clear-fork-context]",
    ]
  );
}

#[test]
fn clean_twice_runs_once_unless_always_execute() {
  let session = Session::default();
  let plan = compile_execution_plan(&tasks(&["clean", "clean"]), &jar_project(), &session).unwrap();
  assert_eq!(render(&plan), ["clean:clean"]);

  let mut project = jar_project();
  let mut clean = PluginDecl::new(BUILTIN_PLUGIN_GROUP, "lathe-clean-plugin", "1.0.0");
  clean.goals.push(
    GoalDecl::new("clean")
      .in_phase("clean")
      .with_kind(GoalKind::AlwaysExecute),
  );
  project.plugins.push(clean);
  let plan = compile_execution_plan(&tasks(&["clean", "clean"]), &project, &Session::default()).unwrap();
  assert_eq!(render(&plan), ["clean:clean", "clean:clean"]);
}

#[test]
fn decorator_cycle_is_reported_before_any_binding() {
  let mut project = jar_project();
  project
    .post_goals
    .insert("compiler:compile".to_string(), vec!["resources:resources".to_string()]);
  project
    .pre_goals
    .insert("resources:resources".to_string(), vec!["compiler:compile".to_string()]);

  let err = compile_execution_plan(&tasks(&["compile"]), &project, &Session::default()).unwrap_err();
  let PlanError::GraphTraversal(GraphTraversalError { path }) = err else {
    panic!("expected a cycle");
  };
  assert_eq!(path.first(), path.last());
  assert!(path.len() >= 3);
}

#[test]
fn direct_invocations_are_tracked() {
  let project = jar_project();
  let catalog = PluginCatalog::for_project(&project);
  let session = Session::default();
  let compiler = PlanCompiler::new(&StandardModelProvider, &catalog, session.cache());

  let plan = compiler
    .build_plan(&tasks(&["compile", "jar:jar"]), &project)
    .unwrap();
  assert_eq!(plan.direct_invocations().len(), 1);
  assert_eq!(plan.direct_invocations()["jar:jar"].goal, "jar");
  assert_eq!(render(&plan.render_execution_plan()), [
    "resources:resources",
    "compiler:compile",
    "jar:jar"
  ]);
}

#[test]
fn project_loaded_from_json() {
  let temp = tempfile::TempDir::new().unwrap();
  let path = temp.path().join("lathe.json");
  std::fs::write(
    &path,
    r#"{
      "group": "org.example",
      "artifact": "site",
      "version": "1.0",
      "packaging": "pom",
      "plugins": [
        {
          "group": "org.example",
          "artifact": "stamp-plugin",
          "version": "0.1",
          "goals": [{ "name": "stamp", "phase": "validate" }],
          "executions": [{ "goals": ["stamp"] }]
        }
      ]
    }"#,
  )
  .unwrap();

  let project = Project::load(&path).unwrap();
  let plan = compile_execution_plan(&tasks(&["install"]), &project, &Session::default()).unwrap();
  assert_eq!(render(&plan), ["stamp:stamp", "install:install"]);
}
