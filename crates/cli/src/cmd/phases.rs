use anyhow::Result;
use serde_json::json;

use lathe_lib::lifecycle::standard_lifecycles;

use crate::output::{OutputFormat, print_info, print_json};

pub fn cmd_phases(format: OutputFormat) -> Result<()> {
  let lifecycles = standard_lifecycles();

  if format.is_json() {
    let value: Vec<_> = lifecycles
      .iter()
      .map(|l| json!({ "id": l.id, "phases": l.phases }))
      .collect();
    return print_json(&value);
  }

  for lifecycle in &lifecycles {
    print_info(format!("{}:", lifecycle.id));
    for phase in &lifecycle.phases {
      println!("    {}", phase);
    }
  }
  Ok(())
}
