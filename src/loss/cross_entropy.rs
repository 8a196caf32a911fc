/// Softmax followed by categorical cross-entropy, computed on raw logits.
pub struct CrossEntropyLoss;

/// Small epsilon added inside log() to prevent log(0) = -inf.
const EPS: f64 = 1e-12;

impl CrossEntropyLoss {
    /// Numerically stable softmax (shifted by the max logit).
    pub fn softmax(logits: &[f64]) -> Vec<f64> {
        let max = logits.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
        let exps: Vec<f64> = logits.iter().map(|z| (z - max).exp()).collect();
        let sum: f64 = exps.iter().sum();
        exps.into_iter().map(|e| e / sum).collect()
    }

    /// L = -log(softmax(logits)[target] + eps)
    pub fn loss(logits: &[f64], target: usize) -> f64 {
        let probs = Self::softmax(logits);
        -(probs[target] + EPS).ln()
    }

    /// Gradient of the composed softmax + cross-entropy w.r.t. the logits:
    ///   ∂L/∂z_i = softmax(z)_i - [i == target]
    pub fn derivative(logits: &[f64], target: usize) -> Vec<f64> {
        let mut grad = Self::softmax(logits);
        grad[target] -= 1.0;
        grad
    }
}
