use rand::Rng;
use std::f64::consts::PI;

/// A learnable parameter buffer with its accumulated gradient and the
/// momentum buffer used by `Sgd`.
#[derive(Debug, Clone)]
pub struct Param {
    pub value: Vec<f64>,
    pub grad: Vec<f64>,
    pub velocity: Vec<f64>,
}

impl Param {
    pub fn zeros(len: usize) -> Param {
        Param {
            value: vec![0.0; len],
            grad: vec![0.0; len],
            velocity: vec![0.0; len],
        }
    }

    /// He initialization: samples from N(0, sqrt(2 / fan_in)).
    ///
    /// Suited to the (leaky) ReLU stages of the convolutional body.
    pub fn he<R: Rng + ?Sized>(len: usize, fan_in: usize, rng: &mut R) -> Param {
        let std_dev = (2.0 / fan_in as f64).sqrt();
        let mut param = Param::zeros(len);
        for v in param.value.iter_mut() {
            *v = sample_standard_normal(rng) * std_dev;
        }
        param
    }

    /// Uniform in `[-1/sqrt(fan_in), 1/sqrt(fan_in)]`, used for biases and
    /// the linear head.
    pub fn uniform<R: Rng + ?Sized>(len: usize, fan_in: usize, rng: &mut R) -> Param {
        let bound = 1.0 / (fan_in.max(1) as f64).sqrt();
        let mut param = Param::zeros(len);
        for v in param.value.iter_mut() {
            *v = rng.gen_range(-bound..=bound);
        }
        param
    }

    pub fn len(&self) -> usize {
        self.value.len()
    }

    pub fn is_empty(&self) -> bool {
        self.value.is_empty()
    }

    pub fn zero_grad(&mut self) {
        self.grad.iter_mut().for_each(|g| *g = 0.0);
    }
}

/// Samples a single value from N(0, 1) using the Box-Muller transform.
fn sample_standard_normal<R: Rng + ?Sized>(rng: &mut R) -> f64 {
    // Both draws in (0, 1] to avoid log(0).
    let u1: f64 = 1.0 - rng.gen::<f64>();
    let u2: f64 = 1.0 - rng.gen::<f64>();
    (-2.0 * u1.ln()).sqrt() * (2.0 * PI * u2).cos()
}
