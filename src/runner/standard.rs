use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::info;

use crate::config::Configuration;
use crate::data::load_splits;
use crate::error::{HarnessError, Result};
use crate::models::{build_model, expected_input_size};
use crate::optim::sgd::Sgd;
use crate::runner::{RunResult, Runner};
use crate::tracking::MetricsWriter;
use crate::train::{evaluate, train_loop, EpochStats, TrainConfig};

/// Supervised image classification: train on `train/`, validate on `val/`
/// after every epoch, test once on `test/`. Scores are accuracies in percent.
///
/// Options read: `dataset_folder`, `model_name`, `epochs`, `batch_size`,
/// `lr`, `momentum`, `dampening`, `weight_decay`, `decay_lr`, `seed`.
#[derive(Debug, Clone, Copy, Default)]
pub struct Standard;

impl Runner for Standard {
    fn single_run(
        &self,
        writer: &mut dyn MetricsWriter,
        config: &Configuration,
        run: Option<usize>,
    ) -> Result<RunResult> {
        let epochs = config.get_usize("epochs")?;
        let batch_size = config.get_usize("batch_size")?;
        if batch_size == 0 {
            return Err(HarnessError::Config("batch_size must be at least 1".into()));
        }
        let train_config = TrainConfig {
            epochs,
            batch_size,
            decay_lr: config.get_opt_usize("decay_lr")?,
        };
        let mut optimizer = Sgd::new(config.get_f64("lr")?)
            .with_momentum(config.get_f64("momentum")?, config.get_f64("dampening")?)
            .with_weight_decay(config.get_f64("weight_decay")?);

        // Repeats of a multi-run start from distinct initializations.
        let seed = config.get_opt_u64("seed")?.unwrap_or(0).wrapping_add(run.unwrap_or(0) as u64);
        let mut rng = StdRng::seed_from_u64(seed);

        let model_name = config.get_str("model_name")?;
        let folder = config.get_opt_path("dataset_folder")?.ok_or_else(|| {
            HarnessError::Config("the standard runner needs --dataset-folder".into())
        })?;
        let splits = load_splits(&folder, expected_input_size(model_name)?)?;

        let mut model = build_model(
            model_name,
            splits.train.num_classes(),
            splits.train.input_channels(),
            &mut rng,
        )?;
        info!(model = model_name, seed, ?run, "Starting training");

        let suffix = run.map(|r| format!("_{r}")).unwrap_or_default();
        let mut failure: Option<HarnessError> = None;
        let history = train_loop(
            model.as_mut(),
            &splits.train,
            &splits.val,
            &mut optimizer,
            &train_config,
            &mut rng,
            |stats| {
                if failure.is_none() {
                    if let Err(e) = log_epoch(&mut *writer, stats, &suffix) {
                        failure = Some(e);
                    }
                }
            },
        );
        if let Some(e) = failure {
            return Err(e);
        }

        let test = evaluate(model.as_mut(), &splits.test);
        writer.add_scalar(&format!("test/accuracy{suffix}"), test.accuracy, epochs)?;
        info!("Test accuracy: {:.2}%", test.accuracy);

        Ok(RunResult {
            train: history.iter().map(|s| s.train_accuracy).collect(),
            val: history.iter().map(|s| s.val_accuracy).collect(),
            test: test.accuracy,
        })
    }
}

fn log_epoch(writer: &mut dyn MetricsWriter, stats: &EpochStats, suffix: &str) -> Result<()> {
    info!(
        "Epoch {}/{}: train loss {:.4} acc {:.2}% | val loss {:.4} acc {:.2}% ({} ms)",
        stats.epoch + 1,
        stats.total_epochs,
        stats.train_loss,
        stats.train_accuracy,
        stats.val_loss,
        stats.val_accuracy,
        stats.elapsed_ms,
    );
    writer.add_scalar(&format!("train/loss{suffix}"), stats.train_loss, stats.epoch)?;
    writer.add_scalar(&format!("train/accuracy{suffix}"), stats.train_accuracy, stats.epoch)?;
    writer.add_scalar(&format!("val/loss{suffix}"), stats.val_loss, stats.epoch)?;
    writer.add_scalar(&format!("val/accuracy{suffix}"), stats.val_accuracy, stats.epoch)?;
    writer.add_scalar(&format!("learning_rate{suffix}"), stats.learning_rate, stats.epoch)?;
    Ok(())
}
