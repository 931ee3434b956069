//! Lifecycles and the phase-to-bindings table.
//!
//! A lifecycle is a fixed, ordered list of phases. [`LifecycleBindings`]
//! attaches an ordered list of [`Binding`](crate::binding::Binding)s to every
//! phase of every lifecycle; it is built once per packaging type and then
//! extended with the project's own executions.

pub mod defaults;
pub mod types;

pub use defaults::{builtin_plugins, packaging_bindings, standard_lifecycles};
pub use types::{Lifecycle, LifecycleBindings, LifecyclePhases, Phase};
