use serde::{Deserialize, Serialize};

use crate::binding::Binding;
use crate::error::SpecificationError;

/// A named, ordered sequence of phases.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lifecycle {
  pub id: String,
  pub phases: Vec<String>,
}

impl Lifecycle {
  pub fn new(id: &str, phases: &[&str]) -> Self {
    Self {
      id: id.to_string(),
      phases: phases.iter().map(|p| p.to_string()).collect(),
    }
  }
}

/// One phase and the bindings attached to it, in execution order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Phase {
  pub name: String,
  pub bindings: Vec<Binding>,
}

/// The phases of one lifecycle with their bindings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LifecyclePhases {
  pub id: String,
  pub phases: Vec<Phase>,
}

/// Phase-to-bindings table for every known lifecycle.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LifecycleBindings {
  lifecycles: Vec<LifecyclePhases>,
}

impl LifecycleBindings {
  /// Create an empty table with the given lifecycles.
  pub fn new(lifecycles: &[Lifecycle]) -> Self {
    Self {
      lifecycles: lifecycles
        .iter()
        .map(|lc| LifecyclePhases {
          id: lc.id.clone(),
          phases: lc
            .phases
            .iter()
            .map(|name| Phase {
              name: name.clone(),
              bindings: Vec::new(),
            })
            .collect(),
        })
        .collect(),
    }
  }

  /// Position of a phase as (lifecycle index, phase index).
  fn locate(&self, phase: &str) -> Option<(usize, usize)> {
    self.lifecycles.iter().enumerate().find_map(|(lc_idx, lc)| {
      lc.phases
        .iter()
        .position(|p| p.name == phase)
        .map(|phase_idx| (lc_idx, phase_idx))
    })
  }

  fn locate_or_err(&self, phase: &str) -> Result<(usize, usize), SpecificationError> {
    self
      .locate(phase)
      .ok_or_else(|| SpecificationError::UnknownPhase(phase.to_string()))
  }

  pub fn has_phase(&self, phase: &str) -> bool {
    self.locate(phase).is_some()
  }

  /// Append a binding to the end of a phase.
  pub fn add_binding(&mut self, phase: &str, binding: Binding) -> Result<(), SpecificationError> {
    let (lc_idx, phase_idx) = self.locate_or_err(phase)?;
    self.lifecycles[lc_idx].phases[phase_idx].bindings.push(binding);
    Ok(())
  }

  /// The bindings attached to a single phase.
  pub fn phase_bindings(&self, phase: &str) -> Result<&[Binding], SpecificationError> {
    let (lc_idx, phase_idx) = self.locate_or_err(phase)?;
    Ok(&self.lifecycles[lc_idx].phases[phase_idx].bindings)
  }

  /// Whether a phase already carries a binding.
  pub fn contains(&self, phase: &str, binding: &Binding) -> bool {
    self
      .phase_bindings(phase)
      .map(|bindings| bindings.contains(binding))
      .unwrap_or(false)
  }

  /// All bindings from the start of the phase's lifecycle up to and
  /// including the phase, in execution order.
  pub fn bindings_up_to(&self, phase: &str) -> Result<Vec<Binding>, SpecificationError> {
    let (lc_idx, phase_idx) = self.locate_or_err(phase)?;
    Ok(
      self.lifecycles[lc_idx].phases[..=phase_idx]
        .iter()
        .flat_map(|p| p.bindings.iter().cloned())
        .collect(),
    )
  }

  /// The phase a binding is attached to, if any.
  pub fn phase_of(&self, binding: &Binding) -> Option<&str> {
    self
      .lifecycles
      .iter()
      .flat_map(|lc| lc.phases.iter())
      .find(|p| p.bindings.contains(binding))
      .map(|p| p.name.as_str())
  }

  /// Snapshot of the table truncated after `phase`.
  ///
  /// Phases after `phase` in its lifecycle, and every phase of the other
  /// lifecycles, are kept but emptied.
  pub fn copy_up_to(&self, phase: &str) -> Result<LifecycleBindings, SpecificationError> {
    let (lc_idx, phase_idx) = self.locate_or_err(phase)?;
    let mut copy = self.clone();
    for (idx, lc) in copy.lifecycles.iter_mut().enumerate() {
      for (p_idx, p) in lc.phases.iter_mut().enumerate() {
        if idx != lc_idx || p_idx > phase_idx {
          p.bindings.clear();
        }
      }
    }
    Ok(copy)
  }

  /// Rebind every goal of a plugin to `version`. Returns how many bindings
  /// changed.
  pub fn align_plugin_version(&mut self, group: &str, artifact: &str, version: &str) -> usize {
    let mut changed = 0;
    for binding in self
      .lifecycles
      .iter_mut()
      .flat_map(|lc| lc.phases.iter_mut())
      .flat_map(|p| p.bindings.iter_mut())
      .filter(|b| b.group == group && b.artifact == artifact && b.version != version)
    {
      binding.version = version.to_string();
      changed += 1;
    }
    changed
  }
}
