use std::fs;
use std::path::{Path, PathBuf};

use chrono::Local;
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::EnvFilter;

use crate::config::{parse_args, Configuration};
use crate::error::{HarnessError, Result};

/// Options that never take part in the log-directory name: they locate
/// things or select modes rather than change what is trained.
const NON_HYPERPARAMETERS: &[&str] = &[
    "experiment_name",
    "output_folder",
    "dataset_folder",
    "model_name",
    "runner_class",
    "multi_run",
    "quiet",
    "debug",
    "sig_opt",
    "sig_opt_runs",
    "sig_opt_url",
    "hyper_param_optim",
    "no_cuda",
    "gpu_id",
    "log_dir",
];

/// Scoped structured logging for one `execute` call.
///
/// Installs a thread-default `tracing` subscriber writing to
/// `<log_dir>/logs.txt` (and to stderr unless quiet). Dropping the context
/// uninstalls the subscriber and flushes the file.
pub struct LoggingContext {
    log_dir: PathBuf,
    // Field order matters: the subscriber goes before the writer is flushed.
    _default: tracing::subscriber::DefaultGuard,
    _file: WorkerGuard,
}

impl LoggingContext {
    pub fn install(log_dir: &Path, quiet: bool, debug: bool) -> Result<LoggingContext> {
        fs::create_dir_all(log_dir)?;
        let level = if debug { "debug" } else { "info" };

        let file_appender = tracing_appender::rolling::never(log_dir, "logs.txt");
        let (non_blocking, file_guard) = tracing_appender::non_blocking(file_appender);
        let file_layer = tracing_subscriber::fmt::layer()
            .with_writer(non_blocking)
            .with_ansi(false)
            .with_target(false);

        let console_layer = (!quiet).then(|| {
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
        });

        let subscriber = tracing_subscriber::registry()
            .with(EnvFilter::new(level))
            .with(file_layer)
            .with(console_layer);

        Ok(LoggingContext {
            log_dir: log_dir.to_path_buf(),
            _default: tracing::subscriber::set_default(subscriber),
            _file: file_guard,
        })
    }

    pub fn log_dir(&self) -> &Path {
        &self.log_dir
    }

    /// Uninstalls the subscriber and flushes pending log lines.
    pub fn shutdown(self) {}
}

/// Derives the run's output location from the configuration content:
///
/// `<output_folder>/<experiment_name>/<model_name>/<dataset>/<params>/<timestamp>`
///
/// `<params>` lists, sorted by key, every hyperparameter whose value differs
/// from the command-line default (search-assigned keys included).
pub fn derive_log_dir(config: &Configuration) -> Result<PathBuf> {
    let defaults = Configuration::from_args(
        &parse_args(["ferrite-harness"]).map_err(|e| HarnessError::Config(e.to_string()))?,
    )?;

    let output_folder = PathBuf::from(config.get_str("output_folder")?);
    let experiment = config.get_opt_str("experiment_name")?.unwrap_or("default");
    let model = config.get_str("model_name")?;
    let dataset = config
        .get_opt_path("dataset_folder")?
        .and_then(|p| p.file_name().map(|n| n.to_string_lossy().into_owned()))
        .unwrap_or_else(|| "no_dataset".to_string());

    let params: Vec<String> = config
        .iter()
        .filter(|(key, _)| !NON_HYPERPARAMETERS.contains(&key.as_str()))
        .filter(|(key, value)| !value.is_null() && defaults.get(key) != Some(*value))
        .map(|(key, value)| format!("{key}={}", value_label(value)))
        .collect();
    let params = if params.is_empty() { "defaults".to_string() } else { params.join(",") };

    let timestamp = Local::now().format("%d-%m-%y-%Hh-%Mm-%Ss").to_string();

    Ok(output_folder
        .join(sanitize(experiment))
        .join(sanitize(model))
        .join(sanitize(&dataset))
        .join(sanitize(&params))
        .join(timestamp))
}

/// Creates the log directory, stores the configuration next to the logs
/// and installs the logging context.
///
/// Runs landing on an existing directory (same configuration within the
/// same second) get a `-1`, `-2`, ... suffix.
pub fn set_up_logging(config: &Configuration) -> Result<LoggingContext> {
    let log_dir = first_free(derive_log_dir(config)?);
    fs::create_dir_all(&log_dir)?;
    fs::write(
        log_dir.join("args.json"),
        serde_json::to_string_pretty(&config.to_json())?,
    )?;

    let context = LoggingContext::install(&log_dir, config.get_bool("quiet")?, config.get_bool("debug")?)?;
    info!("Logging to {}", log_dir.display());
    Ok(context)
}

fn first_free(dir: PathBuf) -> PathBuf {
    if !dir.exists() {
        return dir;
    }
    let name = dir.file_name().map(|n| n.to_string_lossy().into_owned()).unwrap_or_default();
    let mut i = 1;
    loop {
        let candidate = dir.with_file_name(format!("{name}-{i}"));
        if !candidate.exists() {
            return candidate;
        }
        i += 1;
    }
}

fn value_label(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn sanitize(component: &str) -> String {
    component
        .chars()
        .map(|c| if c == '/' || c == '\\' { '_' } else { c })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::parse_args;

    fn config(flags: &[&str]) -> Configuration {
        let mut argv = vec!["ferrite-harness"];
        argv.extend_from_slice(flags);
        Configuration::from_args(&parse_args(argv).unwrap()).unwrap()
    }

    #[test]
    fn log_dir_names_non_default_hyperparameters() {
        let cfg = config(&[
            "--output-folder", "/tmp/out",
            "--experiment-name", "exp",
            "--dataset-folder", "/data/cifar",
            "--lr", "0.1",
            "--epochs", "9",
            "--quiet",
        ]);
        let dir = derive_log_dir(&cfg).unwrap();
        let parts: Vec<String> = dir.iter().map(|p| p.to_string_lossy().into_owned()).collect();
        let n = parts.len();
        assert_eq!(&parts[n - 5..n - 1], &["exp", "CNN_basic", "cifar", "epochs=9,lr=0.1"]);
        assert!(dir.starts_with("/tmp/out"));
    }

    #[test]
    fn defaults_only_config_uses_placeholders() {
        let dir = derive_log_dir(&config(&[])).unwrap();
        let parts: Vec<String> = dir.iter().map(|p| p.to_string_lossy().into_owned()).collect();
        let n = parts.len();
        assert_eq!(&parts[n - 5..n - 1], &["default", "CNN_basic", "no_dataset", "defaults"]);
    }

    #[test]
    fn search_assigned_keys_join_the_name() {
        let mut cfg = config(&[]);
        cfg.insert("dropout", 0.5);
        let dir = derive_log_dir(&cfg).unwrap();
        assert!(dir.to_string_lossy().contains("dropout=0.5"));
    }

    #[test]
    fn set_up_logging_writes_args_and_log_file() {
        let tmp = tempfile::tempdir().unwrap();
        let cfg = config(&["--output-folder", tmp.path().to_str().unwrap(), "--quiet"]);
        let context = set_up_logging(&cfg).unwrap();
        let dir = context.log_dir().to_path_buf();
        tracing::info!("hello from the test");
        context.shutdown();

        assert!(dir.join("args.json").is_file());
        let logs = fs::read_to_string(dir.join("logs.txt")).unwrap();
        assert!(logs.contains("hello from the test"));

        let again = set_up_logging(&cfg).unwrap();
        assert_ne!(again.log_dir(), dir.as_path());
    }
}
