//! Model architectures and the name → constructor registry.

pub mod cnn_basic;

use rand::RngCore;

use crate::error::{HarnessError, Result};
use crate::layers::param::Param;
use crate::math::tensor::Tensor;

pub use cnn_basic::CnnBasic;

/// A trainable classifier mapping an input volume to class logits.
pub trait Model: Send {
    fn name(&self) -> &'static str;

    /// `(height, width)` the inputs must be resized to.
    fn expected_input_size(&self) -> (usize, usize);

    /// Forward pass; caches whatever `backward` needs.
    fn forward(&mut self, input: &Tensor) -> Vec<f64>;

    /// Back-propagates ∂L/∂logits for the most recent `forward`,
    /// accumulating parameter gradients.
    fn backward(&mut self, grad_logits: &[f64]);

    fn params_mut(&mut self) -> Vec<&mut Param>;
}

type ModelFactory = fn(usize, usize, &mut dyn RngCore) -> Box<dyn Model>;

struct ModelEntry {
    name: &'static str,
    input_size: (usize, usize),
    factory: ModelFactory,
}

const MODELS: &[ModelEntry] = &[ModelEntry {
    name: "CNN_basic",
    input_size: CnnBasic::EXPECTED_INPUT_SIZE,
    factory: cnn_basic,
}];

fn cnn_basic(classes: usize, channels: usize, rng: &mut dyn RngCore) -> Box<dyn Model> {
    Box::new(CnnBasic::new(classes, channels, rng))
}

/// Names accepted by `build_model`.
pub fn model_names() -> Vec<&'static str> {
    MODELS.iter().map(|entry| entry.name).collect()
}

fn lookup(name: &str) -> Result<&'static ModelEntry> {
    MODELS
        .iter()
        .find(|entry| entry.name == name)
        .ok_or_else(|| HarnessError::UnknownModel(format!(
            "{name} (available: {})",
            model_names().join(", ")
        )))
}

/// Input `(height, width)` of the model registered under `name`, needed
/// before the dataset is loaded.
pub fn expected_input_size(name: &str) -> Result<(usize, usize)> {
    lookup(name).map(|entry| entry.input_size)
}

/// Instantiates the model registered under `name`.
pub fn build_model(
    name: &str,
    output_channels: usize,
    input_channels: usize,
    rng: &mut dyn RngCore,
) -> Result<Box<dyn Model>> {
    lookup(name).map(|entry| (entry.factory)(output_channels, input_channels, rng))
}
