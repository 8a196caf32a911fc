//! Experiment tracking: TensorBoard-style scalar/image summaries and the
//! multi-run mean-variance plots.

pub mod plot;
pub mod writer;

pub use plot::{plot_mean_variance, PlotOptions};
pub use writer::{Event, EventValue, MetricsWriter, SummaryWriter};
