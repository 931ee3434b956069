mod classpath;
mod phases;
mod plan;

pub use classpath::{ClasspathOptions, cmd_classpath};
pub use phases::cmd_phases;
pub use plan::cmd_plan;
