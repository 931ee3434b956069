//! lathe-lib: build planning and plugin dependency resolution for lathe
//!
//! This crate provides the two cores of the lathe build orchestrator:
//! - `plan`: turns requested tasks into an ordered, replayable list of goal
//!   bindings, expanding decorators and forked sub-lifecycles
//! - `resolve`: computes a plugin's classpath, aligning its dependencies
//!   with the artifacts the host already exports
//!
//! Both share a `Session` whose caches are populated at most once.

pub mod binding;
pub mod consts;
pub mod error;
pub mod goal;
pub mod lifecycle;
pub mod model;
pub mod plan;
pub mod platform;
pub mod resolve;
pub mod session;
pub mod util;
