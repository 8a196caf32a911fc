use rand::Rng;

use crate::layers::param::Param;

/// Fully connected projection `y = W x + b` without activation; the
/// classification head of the convolutional models.
///
/// Weights are stored row-major as `[outputs][inputs]`.
#[derive(Debug)]
pub struct Linear {
    pub inputs: usize,
    pub outputs: usize,
    pub weights: Param,
    pub biases: Param,
    input: Vec<f64>,
}

impl Linear {
    pub fn new<R: Rng + ?Sized>(inputs: usize, outputs: usize, rng: &mut R) -> Linear {
        Linear {
            inputs,
            outputs,
            weights: Param::uniform(inputs * outputs, inputs, rng),
            biases: Param::uniform(outputs, inputs, rng),
            input: Vec::new(),
        }
    }

    pub fn forward(&mut self, input: &[f64]) -> Vec<f64> {
        assert_eq!(input.len(), self.inputs, "linear input size mismatch");
        let out = (0..self.outputs)
            .map(|o| {
                let row = &self.weights.value[o * self.inputs..(o + 1) * self.inputs];
                row.iter().zip(input).map(|(w, x)| w * x).sum::<f64>() + self.biases.value[o]
            })
            .collect();
        self.input = input.to_vec();
        out
    }

    /// Accumulates ∂L/∂W and ∂L/∂b and returns ∂L/∂input.
    pub fn backward(&mut self, grad_output: &[f64]) -> Vec<f64> {
        assert_eq!(grad_output.len(), self.outputs, "linear gradient size mismatch");
        let mut grad_input = vec![0.0; self.inputs];
        for (o, &g) in grad_output.iter().enumerate() {
            self.biases.grad[o] += g;
            let base = o * self.inputs;
            for i in 0..self.inputs {
                self.weights.grad[base + i] += g * self.input[i];
                grad_input[i] += g * self.weights.value[base + i];
            }
        }
        grad_input
    }

    pub fn params_mut(&mut self) -> [&mut Param; 2] {
        [&mut self.weights, &mut self.biases]
    }
}
