use crate::layers::param::Param;

/// Stochastic gradient descent with optional momentum, dampening and L2
/// weight decay.
#[derive(Debug, Clone)]
pub struct Sgd {
    pub learning_rate: f64,
    pub momentum: f64,
    pub dampening: f64,
    pub weight_decay: f64,
}

impl Sgd {
    pub fn new(learning_rate: f64) -> Sgd {
        Sgd {
            learning_rate,
            momentum: 0.0,
            dampening: 0.0,
            weight_decay: 0.0,
        }
    }

    pub fn with_momentum(mut self, momentum: f64, dampening: f64) -> Sgd {
        self.momentum = momentum;
        self.dampening = dampening;
        self
    }

    pub fn with_weight_decay(mut self, weight_decay: f64) -> Sgd {
        self.weight_decay = weight_decay;
        self
    }

    /// Applies one update to `param` using its gradient accumulated over
    /// `batch_size` samples, then clears the gradient.
    pub fn step(&self, param: &mut Param, batch_size: usize) {
        let inv_batch = 1.0 / batch_size.max(1) as f64;
        for i in 0..param.len() {
            let mut g = param.grad[i] * inv_batch + self.weight_decay * param.value[i];
            if self.momentum != 0.0 {
                let v = self.momentum * param.velocity[i] + (1.0 - self.dampening) * g;
                param.velocity[i] = v;
                g = v;
            }
            param.value[i] -= self.learning_rate * g;
        }
        param.zero_grad();
    }

    /// Step decay: the base rate divided by 10 every `decay_every` epochs.
    pub fn decayed_rate(base_lr: f64, epoch: usize, decay_every: Option<usize>) -> f64 {
        match decay_every {
            Some(every) if every > 0 => base_lr * 0.1f64.powi((epoch / every) as i32),
            _ => base_lr,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_step_averages_over_the_batch() {
        let mut p = Param::zeros(1);
        p.value[0] = 1.0;
        p.grad[0] = 4.0;
        Sgd::new(0.5).step(&mut p, 2);
        assert_eq!(p.value[0], 0.0);
        assert_eq!(p.grad[0], 0.0);
    }

    #[test]
    fn momentum_accumulates_velocity() {
        let sgd = Sgd::new(1.0).with_momentum(0.9, 0.0);
        let mut p = Param::zeros(1);
        p.grad[0] = 1.0;
        sgd.step(&mut p, 1);
        assert!((p.value[0] + 1.0).abs() < 1e-12);
        p.grad[0] = 1.0;
        sgd.step(&mut p, 1);
        assert!((p.velocity[0] - 1.9).abs() < 1e-12);
        assert!((p.value[0] + 2.9).abs() < 1e-12);
    }

    #[test]
    fn step_decay_divides_by_ten() {
        assert_eq!(Sgd::decayed_rate(0.1, 5, None), 0.1);
        assert!((Sgd::decayed_rate(0.1, 5, Some(2)) - 0.001).abs() < 1e-15);
        assert_eq!(Sgd::decayed_rate(0.1, 1, Some(2)), 0.1);
    }
}
