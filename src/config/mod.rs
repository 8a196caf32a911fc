//! Command-line arguments and the run configuration built from them.

pub mod cli;
pub mod configuration;

pub use cli::{parse_args, Args};
pub use configuration::{overlay, Configuration};
