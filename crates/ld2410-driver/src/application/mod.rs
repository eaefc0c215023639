//! Application layer: the command correlator and its typed facade.

pub mod commander;
pub mod types;

pub use commander::{CommandError, Commander, DEFAULT_COMMAND_TIMEOUT};
