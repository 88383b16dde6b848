//! CLI command implementations.

pub mod common;
pub mod config;
pub mod plane;
pub mod project;
