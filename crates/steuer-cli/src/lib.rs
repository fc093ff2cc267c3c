//! Steuer CLI — configuration and run helpers for the `steuer` binary.

pub mod config;
pub mod run;

pub use config::{resolve_endpoint, resolve_output_path};
pub use run::{run, EXIT_FATAL, EXIT_OK};
