use rand::Rng;

use crate::activation::ActivationFunction;
use crate::layers::param::Param;
use crate::math::tensor::Tensor;

/// 2-D convolution (no padding) fused with an element-wise activation.
///
/// Weights are stored as `[out_channels][in_channels][kernel][kernel]`.
#[derive(Debug)]
pub struct Conv2d {
    pub in_channels: usize,
    pub out_channels: usize,
    pub kernel_size: usize,
    pub stride: usize,
    pub weights: Param,
    pub biases: Param,
    pub activator: ActivationFunction,
    input: Tensor,
    pre_activation: Tensor,
}

impl Conv2d {
    pub fn new<R: Rng + ?Sized>(
        in_channels: usize,
        out_channels: usize,
        kernel_size: usize,
        stride: usize,
        activation: ActivationFunction,
        rng: &mut R,
    ) -> Conv2d {
        assert!(kernel_size > 0 && stride > 0, "kernel and stride must be positive");
        let fan_in = in_channels * kernel_size * kernel_size;
        Conv2d {
            in_channels,
            out_channels,
            kernel_size,
            stride,
            weights: Param::he(out_channels * fan_in, fan_in, rng),
            biases: Param::uniform(out_channels, fan_in, rng),
            activator: activation,
            input: Tensor::zeros(0, 0, 0),
            pre_activation: Tensor::zeros(0, 0, 0),
        }
    }

    /// Spatial output size for an input side of `size`.
    pub fn output_size(&self, size: usize) -> usize {
        if size < self.kernel_size {
            0
        } else {
            (size - self.kernel_size) / self.stride + 1
        }
    }

    #[inline]
    fn weight_index(&self, o: usize, c: usize, ky: usize, kx: usize) -> usize {
        ((o * self.in_channels + c) * self.kernel_size + ky) * self.kernel_size + kx
    }

    /// Forward pass; caches the input and pre-activation for `backward`.
    pub fn forward(&mut self, input: &Tensor) -> Tensor {
        assert_eq!(input.channels, self.in_channels, "conv input channel mismatch");
        let out_h = self.output_size(input.height);
        let out_w = self.output_size(input.width);
        let mut z = Tensor::zeros(self.out_channels, out_h, out_w);

        for o in 0..self.out_channels {
            for oy in 0..out_h {
                for ox in 0..out_w {
                    let mut sum = self.biases.value[o];
                    for c in 0..self.in_channels {
                        for ky in 0..self.kernel_size {
                            let iy = oy * self.stride + ky;
                            for kx in 0..self.kernel_size {
                                let ix = ox * self.stride + kx;
                                sum += self.weights.value[self.weight_index(o, c, ky, kx)]
                                    * input.at(c, iy, ix);
                            }
                        }
                    }
                    let idx = z.index(o, oy, ox);
                    z.data[idx] = sum;
                }
            }
        }

        let a = z.map(|x| self.activator.function(x));
        self.input = input.clone();
        self.pre_activation = z;
        a
    }

    /// Backward pass. `grad_output` is ∂L/∂a for this layer's output;
    /// gradients are accumulated into `weights.grad` / `biases.grad` and
    /// ∂L/∂input is returned.
    pub fn backward(&mut self, grad_output: &Tensor) -> Tensor {
        let z = &self.pre_activation;
        assert_eq!(grad_output.len(), z.len(), "conv gradient shape mismatch");

        let delta: Vec<f64> = grad_output.data.iter().zip(z.data.iter())
            .map(|(g, &pre)| g * self.activator.derivative(pre))
            .collect();

        let mut grad_input = Tensor::zeros(self.input.channels, self.input.height, self.input.width);

        for o in 0..self.out_channels {
            for oy in 0..z.height {
                for ox in 0..z.width {
                    let d = delta[z.index(o, oy, ox)];
                    if d == 0.0 {
                        continue;
                    }
                    self.biases.grad[o] += d;
                    for c in 0..self.in_channels {
                        for ky in 0..self.kernel_size {
                            let iy = oy * self.stride + ky;
                            for kx in 0..self.kernel_size {
                                let ix = ox * self.stride + kx;
                                let w = self.weight_index(o, c, ky, kx);
                                let i = self.input.index(c, iy, ix);
                                self.weights.grad[w] += d * self.input.data[i];
                                grad_input.data[i] += d * self.weights.value[w];
                            }
                        }
                    }
                }
            }
        }

        grad_input
    }

    pub fn params_mut(&mut self) -> [&mut Param; 2] {
        [&mut self.weights, &mut self.biases]
    }
}
