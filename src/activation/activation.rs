use serde::{Serialize, Deserialize};

/// Element-wise non-linearities applied after a convolution stage.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ActivationFunction {
    ReLU,
    Identity,
    Tanh,
    LeakyReLU { alpha: f64 },
}

impl ActivationFunction {
    /// `LeakyReLU` with the customary negative slope of 0.01.
    pub fn leaky_relu() -> ActivationFunction {
        ActivationFunction::LeakyReLU { alpha: 0.01 }
    }

    pub fn function(&self, x: f64) -> f64 {
        match self {
            ActivationFunction::ReLU => if x > 0.0 { x } else { 0.0 },
            ActivationFunction::Identity => x,
            ActivationFunction::Tanh => x.tanh(),
            ActivationFunction::LeakyReLU { alpha } => if x > 0.0 { x } else { alpha * x },
        }
    }

    /// Derivative evaluated at the pre-activation value `x`.
    pub fn derivative(&self, x: f64) -> f64 {
        match self {
            ActivationFunction::ReLU => if x > 0.0 { 1.0 } else { 0.0 },
            ActivationFunction::Identity => 1.0,
            ActivationFunction::Tanh => {
                let t = x.tanh();
                1.0 - t * t
            }
            ActivationFunction::LeakyReLU { alpha } => if x > 0.0 { 1.0 } else { *alpha },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn leaky_relu_keeps_a_small_negative_slope() {
        let act = ActivationFunction::leaky_relu();
        assert_eq!(act.function(2.0), 2.0);
        assert!((act.function(-2.0) + 0.02).abs() < 1e-12);
        assert_eq!(act.derivative(3.0), 1.0);
        assert_eq!(act.derivative(-3.0), 0.01);
    }

    #[test]
    fn relu_clamps_negatives() {
        assert_eq!(ActivationFunction::ReLU.function(-1.5), 0.0);
        assert_eq!(ActivationFunction::ReLU.derivative(-1.5), 0.0);
        assert_eq!(ActivationFunction::ReLU.derivative(0.5), 1.0);
    }
}
