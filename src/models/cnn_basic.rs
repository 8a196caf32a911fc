use rand::RngCore;

use crate::activation::ActivationFunction;
use crate::layers::{Conv2d, Linear, Param};
use crate::math::tensor::Tensor;
use crate::models::Model;

/// CNN with three convolutional stages and a fully connected
/// classification layer, sized for 32×32 inputs.
///
/// | stage | channels | kernel | stride | output |
/// |-------|----------|--------|--------|--------|
/// | conv1 | in → 24  | 5      | 3      | 10×10  |
/// | conv2 | 24 → 48  | 3      | 2      | 4×4    |
/// | conv3 | 48 → 72  | 3      | 1      | 2×2    |
/// | fc    | 288 → classes | | | |
#[derive(Debug)]
pub struct CnnBasic {
    pub conv1: Conv2d,
    pub conv2: Conv2d,
    pub conv3: Conv2d,
    pub fc: Linear,
    conv3_shape: (usize, usize, usize),
}

impl CnnBasic {
    pub const EXPECTED_INPUT_SIZE: (usize, usize) = (32, 32);

    pub fn new(output_channels: usize, input_channels: usize, rng: &mut dyn RngCore) -> CnnBasic {
        let act = ActivationFunction::leaky_relu();
        let conv1 = Conv2d::new(input_channels, 24, 5, 3, act, rng);
        let conv2 = Conv2d::new(24, 48, 3, 2, act, rng);
        let conv3 = Conv2d::new(48, 72, 3, 1, act, rng);

        let (h, w) = Self::EXPECTED_INPUT_SIZE;
        let out_h = conv3.output_size(conv2.output_size(conv1.output_size(h)));
        let out_w = conv3.output_size(conv2.output_size(conv1.output_size(w)));
        let flat = conv3.out_channels * out_h * out_w;

        CnnBasic {
            fc: Linear::new(flat, output_channels, rng),
            conv3_shape: (conv3.out_channels, out_h, out_w),
            conv1,
            conv2,
            conv3,
        }
    }
}

impl Model for CnnBasic {
    fn name(&self) -> &'static str {
        "CNN_basic"
    }

    fn expected_input_size(&self) -> (usize, usize) {
        Self::EXPECTED_INPUT_SIZE
    }

    fn forward(&mut self, input: &Tensor) -> Vec<f64> {
        let x = self.conv1.forward(input);
        let x = self.conv2.forward(&x);
        let x = self.conv3.forward(&x);
        self.fc.forward(&x.flatten())
    }

    fn backward(&mut self, grad_logits: &[f64]) {
        let grad_flat = self.fc.backward(grad_logits);
        let (c, h, w) = self.conv3_shape;
        let grad = Tensor::from_data(c, h, w, grad_flat);
        let grad = self.conv3.backward(&grad);
        let grad = self.conv2.backward(&grad);
        self.conv1.backward(&grad);
    }

    fn params_mut(&mut self) -> Vec<&mut Param> {
        let mut params = Vec::with_capacity(8);
        params.extend(self.conv1.params_mut());
        params.extend(self.conv2.params_mut());
        params.extend(self.conv3.params_mut());
        params.extend(self.fc.params_mut());
        params
    }
}
