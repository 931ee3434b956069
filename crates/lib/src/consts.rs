//! Crate-wide constants.

/// Application name, used for data and configuration directories.
pub const APP_NAME: &str = "lathe";

/// Environment variable overriding the local artifact repository location.
pub const REPOSITORY_ENV: &str = "LATHE_REPOSITORY";

/// Group id of the built-in plugins used by the standard packaging mappings.
pub const BUILTIN_PLUGIN_GROUP: &str = "org.lathe.plugins";

/// Coordinate used for the sentinel fork marker bindings.
pub const FORK_MARKER_GROUP: &str = "org.lathe.internal";
pub const FORK_MARKER_ARTIFACT: &str = "fork";
pub const FORK_MARKER_VERSION: &str = "0";

/// Execution id that project executions receive when none is declared.
///
/// Executions with this id merge with the packaging's own binding of the goal.
pub const DEFAULT_EXECUTION_ID: &str = "default";

/// Maximum number of relocation hops followed for a single artifact.
pub const MAX_RELOCATIONS: usize = 5;

/// Default number of entries kept per session cache.
pub const SESSION_CACHE_CAPACITY: u64 = 10_000;
