pub mod math;
pub mod activation;
pub mod layers;
pub mod loss;
pub mod optim;
pub mod models;
pub mod data;
pub mod train;
pub mod config;
pub mod setup;
pub mod tracking;
pub mod io;
pub mod runner;
pub mod search;
pub mod controller;
pub mod error;

// Convenience re-exports
pub use config::{overlay, Args, Configuration};
pub use controller::RunMe;
pub use error::{HarnessError, Result};
pub use models::{CnnBasic, Model};
pub use runner::{MultiRunResult, RunOutcome, RunResult, Runner, RunnerRegistry, TestScore};
pub use search::{OptimizationService, ParameterGrid, SigOptConnection};
pub use tracking::{MetricsWriter, SummaryWriter};
