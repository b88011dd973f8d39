//! Command-line driver for the callref reference resolver.
//!
//! Loads a declaration stub file and optional `callref.json`, resolves each
//! reference given on the command line, and reports types and diagnostics.

pub mod args;
pub mod config;
pub mod driver;
pub mod reporter;
pub mod tracing_config;
