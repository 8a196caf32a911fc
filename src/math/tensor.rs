use serde::{Serialize, Deserialize};

/// A dense 3-D activation volume laid out channel-major: `data[c][y][x]`
/// lives at `(c * height + y) * width + x`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tensor {
    pub channels: usize,
    pub height: usize,
    pub width: usize,
    pub data: Vec<f64>,
}

impl Tensor {
    pub fn zeros(channels: usize, height: usize, width: usize) -> Tensor {
        Tensor {
            channels,
            height,
            width,
            data: vec![0.0; channels * height * width],
        }
    }

    /// Wraps an existing buffer.
    ///
    /// # Panics
    /// Panics if `data.len() != channels * height * width`.
    pub fn from_data(channels: usize, height: usize, width: usize, data: Vec<f64>) -> Tensor {
        assert_eq!(
            data.len(),
            channels * height * width,
            "tensor buffer does not match its shape"
        );
        Tensor { channels, height, width, data }
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    #[inline]
    pub fn index(&self, c: usize, y: usize, x: usize) -> usize {
        (c * self.height + y) * self.width + x
    }

    #[inline]
    pub fn at(&self, c: usize, y: usize, x: usize) -> f64 {
        self.data[self.index(c, y, x)]
    }

    pub fn map<F>(&self, functor: F) -> Tensor
    where
        F: Fn(f64) -> f64,
    {
        Tensor {
            channels: self.channels,
            height: self.height,
            width: self.width,
            data: self.data.iter().map(|&x| functor(x)).collect(),
        }
    }

    /// Flattening step between the convolutional stages and the linear head.
    pub fn flatten(&self) -> Vec<f64> {
        self.data.clone()
    }
}
