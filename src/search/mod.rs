//! Hyperparameter search: manual grids and the SigOpt service.

pub mod grid;
pub mod sigopt;

pub use grid::ParameterGrid;
pub use sigopt::{load_parameters, Experiment, Observation, OptimizationService, SigOptConnection, Suggestion};
