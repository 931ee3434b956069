mod cmd;
mod output;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use crate::output::OutputFormat;

/// lathe - lifecycle build planner
#[derive(Parser)]
#[command(name = "lathe")]
#[command(author, version, about, long_about = None)]
struct Cli {
  /// Enable verbose output
  #[arg(short, long, global = true)]
  verbose: bool,

  #[command(subcommand)]
  command: Commands,
}

#[derive(Subcommand)]
enum Commands {
  /// Compile tasks into the ordered execution plan
  Plan {
    /// Phases or goals to run, in order
    #[arg(required = true)]
    tasks: Vec<String>,

    /// Path to the project descriptor
    #[arg(short, long, default_value = "lathe.json")]
    project: PathBuf,

    #[arg(short, long, value_enum, default_value_t)]
    format: OutputFormat,
  },

  /// Resolve the classpath of a plugin
  Classpath {
    /// Plugin coordinate (group:artifact:version)
    plugin: String,

    /// Project descriptor declaring extra plugin dependencies
    #[arg(short, long)]
    project: Option<PathBuf>,

    /// Host export manifest
    #[arg(short, long)]
    exports: Option<PathBuf>,

    /// Local artifact repository (overrides LATHE_REPOSITORY)
    #[arg(short, long)]
    repository: Option<PathBuf>,

    /// Do not contact remote repositories
    #[arg(long)]
    offline: bool,

    #[arg(short, long, value_enum, default_value_t)]
    format: OutputFormat,
  },

  /// List the standard lifecycles and their phases
  Phases {
    #[arg(short, long, value_enum, default_value_t)]
    format: OutputFormat,
  },
}

fn main() -> Result<()> {
  let cli = Cli::parse();

  let default_level = if cli.verbose { "debug" } else { "warn" };
  tracing_subscriber::fmt()
    .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)))
    .with_writer(std::io::stderr)
    .without_time()
    .init();

  match cli.command {
    Commands::Plan {
      tasks,
      project,
      format,
    } => cmd::cmd_plan(&tasks, &project, format),
    Commands::Classpath {
      plugin,
      project,
      exports,
      repository,
      offline,
      format,
    } => cmd::cmd_classpath(
      &plugin,
      cmd::ClasspathOptions {
        project,
        exports,
        repository,
        offline,
      },
      cli.verbose,
      format,
    ),
    Commands::Phases { format } => cmd::cmd_phases(format),
  }
}
