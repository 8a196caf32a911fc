//! Executor strategies: the `Runner` interface, its results and the
//! name-keyed registry the controller resolves `runner_class` against.

pub mod registry;
pub mod result;
pub mod standard;

use crate::config::Configuration;
use crate::error::Result;
use crate::tracking::MetricsWriter;

pub use registry::RunnerRegistry;
pub use result::{MultiRunResult, RunOutcome, RunResult, TestScore};
pub use standard::Standard;

/// One full train/validate/test cycle for a fixed configuration.
pub trait Runner {
    /// `run` is the repeat index within a multi-run, `None` for a plain run;
    /// it lets per-run artifacts be told apart.
    fn single_run(
        &self,
        writer: &mut dyn MetricsWriter,
        config: &Configuration,
        run: Option<usize>,
    ) -> Result<RunResult>;
}
