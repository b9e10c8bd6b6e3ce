//! CLI command implementations for askgate.

pub mod bootstrap;
pub mod serve;
