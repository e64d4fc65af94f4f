//! Concrete secret provider implementations.

pub mod env;
pub mod memory;
