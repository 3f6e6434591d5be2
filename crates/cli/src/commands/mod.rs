//! CLI command implementations.

pub mod guest;
pub mod migrate;
pub mod seed;
