//! Tool configuration loading and schema definitions
//!
//! This is the configuration of the `droidspec` tool itself (where the SDK
//! lives, framework property overrides), not the build descriptor.

mod loader;
mod schema;

pub use loader::Config;
pub use schema::*;
