use std::sync::Arc;

use lathe_lib::resolve::{
  HostExportManifest, LocalRepository, PluginDependenciesResolver, ResolutionError, Scope, resolve_plugin_classpath,
};

use super::common::{CountingExports, TestRepo, dep};

#[test]
fn host_export_overrides_declared_version_and_scope() {
  let test = TestRepo::new();
  test.install("org.example:greeter-plugin:1.0", vec![dep("org.slf4j:slf4j-api:1.7", Scope::Compile)]);
  test.install("g:a:2.0", vec![]);
  test.install("org.slf4j:slf4j-api:1.7", vec![]);

  let exports = HostExportManifest::default().with_export("g:a", Some("2.0"));
  let classpath = resolve_plugin_classpath(
    &"org.example:greeter-plugin:1.0".parse().unwrap(),
    &[dep("g:a:1.0", Scope::Compile)],
    &[],
    &exports,
    &test.session,
  )
  .unwrap();

  let node = classpath.graph.find("g:a").unwrap();
  assert_eq!(node.artifact.version, "2.0");
  assert_eq!(node.scope, Scope::Provided);
  assert!(classpath.artifacts.iter().all(|a| a.artifact.version != "1.0"));

  let runtime: Vec<String> = classpath.runtime_entries().map(|a| a.artifact.key()).collect();
  assert_eq!(runtime, ["org.example:greeter-plugin", "org.slf4j:slf4j-api"]);
}

#[test]
fn transitive_host_library_is_aligned() {
  let test = TestRepo::new();
  test.install("org.example:greeter-plugin:1.0", vec![dep("org.example:util:1.0", Scope::Compile)]);
  test.install("org.example:util:1.0", vec![dep("org.lathe:lathe-api:0.1", Scope::Compile)]);
  test.install("org.lathe:lathe-api:0.3.0", vec![]);

  let exports = HostExportManifest::default().with_export("org.lathe:lathe-api", Some("0.3.0"));
  let classpath = resolve_plugin_classpath(
    &"org.example:greeter-plugin:1.0".parse().unwrap(),
    &[],
    &[],
    &exports,
    &test.session,
  )
  .unwrap();

  let api = classpath.graph.find("org.lathe:lathe-api").unwrap();
  assert_eq!(api.artifact.version, "0.3.0");
  assert_eq!(api.premanaged_version.as_deref(), Some("0.1"));
  assert_eq!(api.scope, Scope::Provided);
}

#[test]
fn concurrent_resolutions_build_managed_table_once() {
  let test = TestRepo::new();
  for i in 0..8 {
    test.install(&format!("org.example:plugin-{}:1.0", i), vec![dep("g:a:1.0", Scope::Compile)]);
  }
  test.install("g:a:2.0", vec![]);

  let exports = CountingExports::new(&[("g:a", "2.0"), ("g:b", "1.0")]);
  let repo = LocalRepository::new(test.repo.root());

  let tables = std::thread::scope(|scope| {
    let handles: Vec<_> = (0..8)
      .map(|i| {
        let exports = &exports;
        let repo = &repo;
        let session = &test.session;
        scope.spawn(move || {
          let resolver = PluginDependenciesResolver::new(exports, repo, repo, session);
          let classpath = resolver
            .resolve(&format!("org.example:plugin-{}:1.0", i).parse().unwrap(), &[], &[])
            .unwrap();
          assert_eq!(classpath.find("g:a").unwrap().artifact.version, "2.0");
          resolver.managed_dependencies().unwrap()
        })
      })
      .collect();
    handles.into_iter().map(|h| h.join().unwrap()).collect::<Vec<_>>()
  });

  // one read per export: the table was computed exactly once
  assert_eq!(exports.reads(), 2);
  for table in &tables {
    assert!(Arc::ptr_eq(table, &tables[0]));
    assert_eq!(table.len(), 2);
  }
}

#[test]
fn partial_failure_lists_every_failed_node() {
  let test = TestRepo::new();
  test.install(
    "org.example:greeter-plugin:1.0",
    vec![
      dep("g:present:1", Scope::Compile),
      dep("g:absent:1", Scope::Compile),
      dep("g:gone:1", Scope::Runtime),
    ],
  );
  test.install("g:present:1", vec![]);

  let err = resolve_plugin_classpath(
    &"org.example:greeter-plugin:1.0".parse().unwrap(),
    &[],
    &[],
    &HostExportManifest::default(),
    &test.session,
  )
  .unwrap_err();

  assert!(matches!(err, ResolutionError::Collection { .. }));
  let failed: Vec<String> = err.failures().iter().map(|f| f.artifact.key()).collect();
  assert_eq!(failed, ["g:absent", "g:gone"]);
  let message = err.to_string();
  assert!(message.contains("g:absent:1"));
  assert!(message.contains("g:gone:1"));
}
