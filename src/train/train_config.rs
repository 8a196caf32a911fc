/// Configuration for a `train_loop` run.
///
/// # Fields
/// - `epochs`: total number of full passes over the training data
/// - `batch_size`: samples per mini-batch; use `1` for online SGD
/// - `decay_lr`: divide the learning rate by 10 every this many epochs
#[derive(Debug, Clone, PartialEq)]
pub struct TrainConfig {
    pub epochs: usize,
    pub batch_size: usize,
    pub decay_lr: Option<usize>,
}

impl TrainConfig {
    /// Creates a `TrainConfig` without learning-rate decay.
    pub fn new(epochs: usize, batch_size: usize) -> Self {
        TrainConfig {
            epochs,
            batch_size,
            decay_lr: None,
        }
    }
}
