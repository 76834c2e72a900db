//! Command-line surface
//!
//! - **commands**: clap argument definitions
//! - **handlers**: execution against the preset store and file adapter

pub mod commands;
pub mod handlers;

pub use commands::Cli;
pub use handlers::run;
