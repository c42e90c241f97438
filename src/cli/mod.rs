//! CLI command handling

pub mod forward;
pub mod output;
pub mod settings;

pub use forward::*;
pub use output::*;
pub use settings::*;
