//! Subcommand implementations

pub mod features;
pub mod predict;
pub mod service;
