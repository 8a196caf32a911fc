use std::error::Error as _;
use std::path::Path;

use tracing::{error, info, warn};

use crate::config::Configuration;
use crate::error::{HarnessError, Result};
use crate::io::npy::write_npy_2d;
use crate::runner::{MultiRunResult, RunOutcome, RunResult, Runner, RunnerRegistry};
use crate::search::sigopt::{load_parameters, OptimizationService, SigOptConnection};
use crate::search::ParameterGrid;
use crate::setup::{set_up_env, set_up_logging};
use crate::tracking::{plot_mean_variance, MetricsWriter, PlotOptions, SummaryWriter};

/// Entry point of the harness. Depending on the configuration it runs:
/// - a single run
/// - a multi-run (`multi_run`)
/// - a SigOpt optimization (`sig_opt`)
/// - a manual grid search (`hyper_param_optim`)
pub struct RunMe {
    registry: RunnerRegistry,
    connector: Connector,
}

/// Opens the optimization service used in SigOpt mode.
pub type Connector = Box<dyn Fn(&Configuration) -> Result<Box<dyn OptimizationService>>>;

impl RunMe {
    /// Connects to SigOpt at `sig_opt_url` with the token from the
    /// environment.
    pub fn new(registry: RunnerRegistry) -> RunMe {
        RunMe::with_connector(registry, |config| {
            let connection = SigOptConnection::from_env(config.get_str("sig_opt_url")?)?;
            Ok(Box::new(connection) as Box<dyn OptimizationService>)
        })
    }

    pub fn with_connector<F>(registry: RunnerRegistry, connector: F) -> RunMe
    where
        F: Fn(&Configuration) -> Result<Box<dyn OptimizationService>> + 'static,
    {
        RunMe { registry, connector: Box::new(connector) }
    }

    /// Dispatches on the configured mode. SigOpt takes precedence over a
    /// grid file when both are given.
    pub fn main(&self, config: &mut Configuration) -> Result<()> {
        if config.get_opt_path("sig_opt")?.is_some() {
            if let Some(grid) = config.get_opt_path("hyper_param_optim")? {
                eprintln!(
                    "Warning: both --sig-opt and --hyper-param-optim given; ignoring {}",
                    grid.display()
                );
            }
            let mut service = (self.connector)(&*config)?;
            self.run_sig_opt(config, service.as_mut())
        } else if config.get_opt_path("hyper_param_optim")?.is_some() {
            self.run_manual_optimization(config)
        } else {
            self.execute(config).map(|_| ())
        }
    }

    /// Creates a SigOpt experiment over the parameter space in `sig_opt`
    /// and runs `sig_opt_runs` suggestion/observation rounds.
    pub fn run_sig_opt(
        &self,
        config: &mut Configuration,
        service: &mut dyn OptimizationService,
    ) -> Result<()> {
        let path = config
            .get_opt_path("sig_opt")?
            .ok_or_else(|| HarnessError::Config("option `sig_opt` is not set".into()))?;
        let parameters = load_parameters(&path)?;

        let name = match config.get_opt_str("experiment_name")? {
            Some(name) => name.to_string(),
            None => {
                let name = prompt_experiment_name()?;
                config.insert("experiment_name", name.clone());
                name
            }
        };

        let experiment = service.create_experiment(&name, &parameters)?;
        println!("Created experiment: https://sigopt.com/experiment/{}", experiment.id);

        for _ in 0..config.get_usize("sig_opt_runs")? {
            let suggestion = service.create_suggestion(&experiment.id)?;
            config.overlay(&suggestion.assignments);
            let outcome = self.execute(config)?;
            // A multi-run reports one observation per repeat.
            for value in outcome.test_score().values() {
                service.create_observation(&experiment.id, &suggestion.id, value)?;
            }
        }
        Ok(())
    }

    /// Runs every point of the grid in `hyper_param_optim`; the first
    /// failing point ends the search.
    pub fn run_manual_optimization(&self, config: &mut Configuration) -> Result<()> {
        println!("Hyper Parameter Optimization mode");
        let path = config
            .get_opt_path("hyper_param_optim")?
            .ok_or_else(|| HarnessError::Config("option `hyper_param_optim` is not set".into()))?;
        let grid = ParameterGrid::load(&path)?;
        let total = grid.len();

        for (i, params) in grid.iter().enumerate() {
            println!("{i} of {total} possible parameter combinations evaluated");
            config.overlay(&params);
            self.execute(config)?;
        }
        Ok(())
    }

    /// One configuration, run once or `multi_run` times.
    ///
    /// The log directory, logger and summary writer live exactly as long as
    /// this call and are released on every path. A failing run is logged
    /// with its cause chain and comes back as `HarnessError::ExecutionFailed`.
    ///
    /// The seed is resolved into the runner's copy of the configuration;
    /// `config` itself keeps whatever `seed` it had.
    pub fn execute(&self, config: &mut Configuration) -> Result<RunOutcome> {
        let logging = set_up_logging(config)?;
        let log_dir = logging.log_dir().to_path_buf();
        config.insert("log_dir", log_dir.to_string_lossy().into_owned());
        let quiet = config.get_bool("quiet")?;

        info!("Initialize SummaryWriter");
        let outcome = SummaryWriter::new(&log_dir).and_then(|mut writer| {
            let outcome = self.run(config, &mut writer, &log_dir);
            if let Err(e) = writer.close() {
                warn!("Could not close the summary writer: {e}");
            }
            outcome
        });
        let outcome = outcome.map_err(|err| report_failure(err, quiet));

        logging.shutdown();
        println!("All done! (logged to {})", log_dir.display());
        config.remove("log_dir");
        outcome
    }

    fn run(
        &self,
        config: &Configuration,
        writer: &mut dyn MetricsWriter,
        log_dir: &Path,
    ) -> Result<RunOutcome> {
        let env = set_up_env(config)?;
        let mut run_config = config.clone();
        run_config.insert("seed", env.seed);

        let runner_class = config.get_str("runner_class")?;
        let runner = self.registry.create(runner_class)?;
        info!("Using runner {runner_class}");

        match config.get_opt_usize("multi_run")? {
            Some(runs) => multi_run(runner.as_ref(), writer, &run_config, log_dir, runs)
                .map(RunOutcome::Multi),
            None => {
                let epochs = config.get_usize("epochs")?;
                let result = runner.single_run(writer, &run_config, None)?;
                check_shape(&result, epochs, None)?;
                Ok(RunOutcome::Single(result))
            }
        }
    }
}

/// Runs the same configuration `runs` times and aggregates the scores.
///
/// After every run the mean ± std curves over the runs so far are attached
/// to the writer as `train_curve` / `val_curve`. The full tables end up in
/// `train_values.npy` and `val_values.npy` inside `log_dir`.
pub fn multi_run(
    runner: &dyn Runner,
    writer: &mut dyn MetricsWriter,
    config: &Configuration,
    log_dir: &Path,
    runs: usize,
) -> Result<MultiRunResult> {
    if runs == 0 {
        return Err(HarnessError::Config("multi_run must be at least 1".into()));
    }
    let epochs = config.get_usize("epochs")?;
    let mut table = MultiRunResult::zeros(runs, epochs);

    for i in 0..runs {
        info!("Multi-Run: {} of {}", i + 1, runs);
        let result = runner.single_run(writer, config, Some(i))?;
        check_shape(&result, epochs, Some(i))?;
        table.record(i, result);

        emit_curve(writer, "train_curve", &table.train[..=i], i);
        info!("Generated mean-variance plot for train");
        emit_curve(writer, "val_curve", &table.val[..=i], i);
        info!("Generated mean-variance plot for val");
    }

    write_npy_2d(&log_dir.join("train_values.npy"), &table.train)?;
    write_npy_2d(&log_dir.join("val_values.npy"), &table.val)?;
    info!(
        "Multi-run values for test-mean:{} test-std: {}",
        table.test_mean(),
        table.test_std()
    );
    Ok(table)
}

/// Plots are diagnostics; a failure to store one only warns.
fn emit_curve(writer: &mut dyn MetricsWriter, tag: &str, rows: &[Vec<f64>], step: usize) {
    let image = plot_mean_variance(rows, &PlotOptions::default());
    if let Err(e) = writer.add_image(tag, &image, step) {
        warn!("Could not store {tag} (runs: {}): {e}", rows.len());
    }
}

fn check_shape(result: &RunResult, epochs: usize, run: Option<usize>) -> Result<()> {
    if result.train.len() != epochs || result.val.len() != epochs {
        return Err(HarnessError::Shape(format!(
            "run {} returned {} train and {} val scores for {epochs} epochs",
            run.map(|r| r.to_string()).unwrap_or_else(|| "-".into()),
            result.train.len(),
            result.val.len(),
        )));
    }
    Ok(())
}

fn report_failure(err: HarnessError, quiet: bool) -> HarnessError {
    if quiet {
        println!("Unhandled error: {err:?}");
    }
    error!("Unhandled error: {err:?}");
    let mut source = err.source();
    while let Some(cause) = source {
        error!("Caused by: {cause}");
        source = cause.source();
    }
    error!("Execution finished with errors :(");
    HarnessError::ExecutionFailed(err.to_string())
}

fn prompt_experiment_name() -> Result<String> {
    dialoguer::Input::<String>::new()
        .with_prompt("Experiment name")
        .interact_text()
        .map_err(|e| HarnessError::Prompt(e.to_string()))
}
