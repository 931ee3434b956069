//! Terminal output for the lathe commands.
//!
//! Status lines go through the `print_*` helpers so color is only applied
//! when the target stream supports it.

use std::fmt::Display;

use anyhow::Context;
use clap::ValueEnum;
use owo_colors::{OwoColorize, Stream};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
  #[default]
  Text,
  Json,
}

impl OutputFormat {
  pub fn is_json(self) -> bool {
    self == OutputFormat::Json
  }
}

pub mod symbols {
  pub const SUCCESS: &str = "✓";
  pub const WARNING: &str = "⚠";
  pub const INFO: &str = "•";
  pub const ARROW: &str = "→";
}

/// First 12 characters of a digest.
pub fn truncate_hash(hash: &str) -> &str {
  &hash[..hash.len().min(12)]
}

/// A fork marker, dimmed on color terminals.
pub fn marker(text: impl Display) -> String {
  text.to_string().if_supports_color(Stream::Stdout, |s| s.dimmed()).to_string()
}

/// A classpath scope tag; host-provided entries stand out.
pub fn scope_tag(scope: impl Display, provided: bool) -> String {
  let tag = format!("[{}]", scope);
  if provided {
    tag.if_supports_color(Stream::Stdout, |s| s.cyan()).to_string()
  } else {
    tag
  }
}

pub fn print_success(message: impl Display) {
  println!("{} {}", symbols::SUCCESS.if_supports_color(Stream::Stdout, |s| s.green()), message);
}

pub fn print_warning(message: impl Display) {
  let message = message.to_string();
  eprintln!(
    "{} {}",
    symbols::WARNING.if_supports_color(Stream::Stderr, |s| s.yellow()),
    message.if_supports_color(Stream::Stderr, |s| s.yellow())
  );
}

pub fn print_info(message: impl Display) {
  println!("{} {}", symbols::INFO.if_supports_color(Stream::Stdout, |s| s.blue()), message);
}

pub fn print_stat(label: &str, value: impl Display) {
  println!("  {}: {}", label.if_supports_color(Stream::Stdout, |s| s.dimmed()), value);
}

pub fn print_json<T: serde::Serialize>(value: &T) -> anyhow::Result<()> {
  let json = serde_json::to_string_pretty(value).context("Failed to serialize to JSON")?;
  println!("{}", json);
  Ok(())
}
