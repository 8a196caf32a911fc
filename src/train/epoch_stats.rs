use serde::{Serialize, Deserialize};

/// Per-epoch training statistics emitted by `train_loop`.
///
/// Accuracies are percentages in [0, 100], the scale the multi-run curves
/// are plotted on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EpochStats {
    /// 0-based epoch index.
    pub epoch: usize,
    pub total_epochs: usize,
    /// Learning rate used for this epoch (after step decay).
    pub learning_rate: f64,
    /// Mean training loss over all samples in this epoch.
    pub train_loss: f64,
    pub train_accuracy: f64,
    pub val_loss: f64,
    pub val_accuracy: f64,
    /// Wall-clock duration of this single epoch in milliseconds.
    pub elapsed_ms: u64,
}
