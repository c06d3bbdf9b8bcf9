//! I/O helpers for the quality pipeline.

pub mod artifact;
pub mod config;
pub mod lint_config;
pub mod process;
pub mod project;
pub mod steps;
