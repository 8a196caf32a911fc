use std::ffi::OsString;
use std::path::PathBuf;

use clap::Parser;
use serde::Serialize;

/// Train CNN classifiers: single runs, multi-runs, grid search or SigOpt
/// optimization.
#[derive(Debug, Clone, Parser, Serialize)]
#[command(name = "ferrite-harness", version, about)]
pub struct Args {
    // ── General ──────────────────────────────────────────────────────────
    /// Experiment name, used as a log-directory level and as the SigOpt
    /// experiment name (prompted for when missing in SigOpt mode)
    #[arg(long)]
    pub experiment_name: Option<String>,

    /// Root folder for logs and run artifacts
    #[arg(long, default_value = "./output/")]
    pub output_folder: PathBuf,

    /// Runner implementation, looked up by name
    #[arg(long, default_value = "standard")]
    pub runner_class: String,

    /// Repeat the run this many times and aggregate the results
    #[arg(long)]
    pub multi_run: Option<usize>,

    /// Only log to file
    #[arg(long)]
    pub quiet: bool,

    /// Log at debug level
    #[arg(long)]
    pub debug: bool,

    // ── Search ───────────────────────────────────────────────────────────
    /// JSON file with the SigOpt parameter space; enables SigOpt mode
    #[arg(long)]
    pub sig_opt: Option<PathBuf>,

    /// Number of SigOpt suggestion/observation rounds
    #[arg(long, default_value_t = 100)]
    pub sig_opt_runs: usize,

    /// SigOpt API base URL
    #[arg(long, default_value = "https://api.sigopt.com/v1")]
    pub sig_opt_url: String,

    /// JSON file mapping hyperparameters to candidate lists; enables grid search
    #[arg(long)]
    pub hyper_param_optim: Option<PathBuf>,

    // ── Data ─────────────────────────────────────────────────────────────
    /// Dataset root containing train/, val/ and test/ image folders
    #[arg(long)]
    pub dataset_folder: Option<PathBuf>,

    #[arg(long, default_value_t = 64)]
    pub batch_size: usize,

    // ── Model & optimizer ────────────────────────────────────────────────
    #[arg(long, default_value = "CNN_basic")]
    pub model_name: String,

    #[arg(long, default_value_t = 5)]
    pub epochs: usize,

    #[arg(long, default_value_t = 0.001)]
    pub lr: f64,

    #[arg(long, default_value_t = 0.0)]
    pub momentum: f64,

    #[arg(long, default_value_t = 0.0)]
    pub dampening: f64,

    #[arg(long, default_value_t = 0.0)]
    pub weight_decay: f64,

    /// Divide the learning rate by 10 every N epochs
    #[arg(long)]
    pub decay_lr: Option<usize>,

    // ── Environment ──────────────────────────────────────────────────────
    /// Random seed; drawn at random (and logged) when omitted
    #[arg(long)]
    pub seed: Option<u64>,

    /// Never use an accelerator
    #[arg(long)]
    pub no_cuda: bool,

    /// Accelerator id to run on
    #[arg(long)]
    pub gpu_id: Option<String>,
}

/// Parses `args` (including the binary name) into `Args`.
pub fn parse_args<I, T>(args: I) -> Result<Args, clap::Error>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    Args::try_parse_from(args)
}
