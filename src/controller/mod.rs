//! The run controller: mode dispatch, execution with guaranteed cleanup,
//! multi-run aggregation and the two search loops.

pub mod run_me;

pub use run_me::{Connector, RunMe};
