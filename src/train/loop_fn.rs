use std::time::Instant;

use rand::seq::SliceRandom;
use rand::Rng;
use tracing::debug;

use crate::data::Dataset;
use crate::loss::cross_entropy::CrossEntropyLoss;
use crate::models::Model;
use crate::optim::sgd::Sgd;
use crate::train::epoch_stats::EpochStats;
use crate::train::train_config::TrainConfig;

/// Mean loss and accuracy (percent) over a dataset.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Evaluation {
    pub loss: f64,
    pub accuracy: f64,
}

// ---------------------------------------------------------------------------
// Public entry points
// ---------------------------------------------------------------------------

/// Trains `model` for `config.epochs` epochs, validating after each one.
///
/// `on_epoch` is called with the statistics of every completed epoch; the
/// full history is returned as well.
///
/// # Panics
/// Panics if `train` is empty or `batch_size == 0`.
pub fn train_loop<R, F>(
    model: &mut dyn Model,
    train: &Dataset,
    val: &Dataset,
    optimizer: &mut Sgd,
    config: &TrainConfig,
    rng: &mut R,
    mut on_epoch: F,
) -> Vec<EpochStats>
where
    R: Rng + ?Sized,
    F: FnMut(&EpochStats),
{
    assert!(!train.is_empty(), "training set must not be empty");
    assert!(config.batch_size > 0, "batch_size must be at least 1");

    let base_lr = optimizer.learning_rate;
    let mut history = Vec::with_capacity(config.epochs);

    for epoch in 0..config.epochs {
        optimizer.learning_rate = Sgd::decayed_rate(base_lr, epoch, config.decay_lr);
        let t_start = Instant::now();

        let train_eval = train_epoch(model, train, optimizer, config.batch_size, rng);
        let val_eval = evaluate(model, val);

        let stats = EpochStats {
            epoch,
            total_epochs: config.epochs,
            learning_rate: optimizer.learning_rate,
            train_loss: train_eval.loss,
            train_accuracy: train_eval.accuracy,
            val_loss: val_eval.loss,
            val_accuracy: val_eval.accuracy,
            elapsed_ms: t_start.elapsed().as_millis() as u64,
        };
        debug!(?stats, "epoch finished");
        on_epoch(&stats);
        history.push(stats);
    }

    optimizer.learning_rate = base_lr;
    history
}

/// Runs one full epoch of mini-batch SGD over `data` in shuffled order.
/// Returns the mean loss and the accuracy of the predictions made while
/// training.
pub fn train_epoch<R: Rng + ?Sized>(
    model: &mut dyn Model,
    data: &Dataset,
    optimizer: &Sgd,
    batch_size: usize,
    rng: &mut R,
) -> Evaluation {
    let n = data.len();
    let mut total_loss = 0.0;
    let mut correct = 0usize;

    let mut indices: Vec<usize> = (0..n).collect();
    indices.shuffle(rng);

    for batch in indices.chunks(batch_size) {
        for param in model.params_mut() {
            param.zero_grad();
        }

        for &idx in batch {
            let target = data.labels[idx];
            let logits = model.forward(&data.samples[idx]);

            total_loss += CrossEntropyLoss::loss(&logits, target);
            if argmax(&logits) == target {
                correct += 1;
            }

            let grad = CrossEntropyLoss::derivative(&logits, target);
            model.backward(&grad);
        }

        for param in model.params_mut() {
            optimizer.step(param, batch.len());
        }
    }

    Evaluation {
        loss: total_loss / n as f64,
        accuracy: 100.0 * correct as f64 / n as f64,
    }
}

/// Mean loss and accuracy without parameter updates. An empty dataset
/// scores zero on both.
pub fn evaluate(model: &mut dyn Model, data: &Dataset) -> Evaluation {
    let n = data.len();
    if n == 0 {
        return Evaluation { loss: 0.0, accuracy: 0.0 };
    }

    let mut total_loss = 0.0;
    let mut correct = 0usize;
    for (sample, &target) in data.samples.iter().zip(data.labels.iter()) {
        let logits = model.forward(sample);
        total_loss += CrossEntropyLoss::loss(&logits, target);
        if argmax(&logits) == target {
            correct += 1;
        }
    }

    Evaluation {
        loss: total_loss / n as f64,
        accuracy: 100.0 * correct as f64 / n as f64,
    }
}

// ---------------------------------------------------------------------------
// Private helpers
// ---------------------------------------------------------------------------

/// Index of the maximum element in a slice.
fn argmax(v: &[f64]) -> usize {
    v.iter()
        .enumerate()
        .max_by(|(_, a), (_, b)| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal))
        .map(|(i, _)| i)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::tensor::Tensor;
    use crate::models::CnnBasic;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    /// Two linearly separable classes: bright vs dark single-channel images.
    fn toy_dataset() -> Dataset {
        let mut samples = Vec::new();
        let mut labels = Vec::new();
        for i in 0..8 {
            let level = if i % 2 == 0 { 1.0 } else { -1.0 };
            samples.push(Tensor::from_data(1, 32, 32, vec![level; 1024]));
            labels.push(i % 2);
        }
        Dataset::new(samples, labels, vec!["bright".into(), "dark".into()]).unwrap()
    }

    #[test]
    fn history_has_one_entry_per_epoch() {
        let mut rng = StdRng::seed_from_u64(5);
        let mut model = CnnBasic::new(2, 1, &mut rng);
        let data = toy_dataset();
        let mut optimizer = Sgd::new(0.01);
        let mut seen = Vec::new();

        let history = train_loop(
            &mut model,
            &data,
            &data,
            &mut optimizer,
            &TrainConfig::new(3, 4),
            &mut rng,
            |s| seen.push(s.epoch),
        );

        assert_eq!(history.len(), 3);
        assert_eq!(seen, vec![0, 1, 2]);
        assert!(history.iter().all(|s| (0.0..=100.0).contains(&s.val_accuracy)));
        assert_eq!(optimizer.learning_rate, 0.01);
    }

    #[test]
    fn training_reduces_loss_on_a_separable_problem() {
        let mut rng = StdRng::seed_from_u64(9);
        let mut model = CnnBasic::new(2, 1, &mut rng);
        let data = toy_dataset();
        let before = evaluate(&mut model, &data);
        let mut optimizer = Sgd::new(0.005);

        train_loop(&mut model, &data, &data, &mut optimizer, &TrainConfig::new(10, 2), &mut rng, |_| {});
        let after = evaluate(&mut model, &data);
        assert!(after.loss < before.loss, "{} !< {}", after.loss, before.loss);
    }

    #[test]
    fn empty_evaluation_is_zero() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut model = CnnBasic::new(2, 1, &mut rng);
        let empty = Dataset::new(vec![], vec![], vec!["a".into(), "b".into()]).unwrap();
        assert_eq!(evaluate(&mut model, &empty), Evaluation { loss: 0.0, accuracy: 0.0 });
    }
}
