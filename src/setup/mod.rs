//! Per-invocation set-up: log directory, logging context and execution
//! environment.

pub mod env;
pub mod logging;

pub use env::{set_up_env, ExecutionEnv};
pub use logging::{derive_log_dir, set_up_logging, LoggingContext};
