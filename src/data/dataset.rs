use crate::error::{HarnessError, Result};
use crate::math::tensor::Tensor;

/// Labelled samples with the class names their indices refer to.
#[derive(Debug, Clone)]
pub struct Dataset {
    pub samples: Vec<Tensor>,
    pub labels: Vec<usize>,
    pub classes: Vec<String>,
}

impl Dataset {
    pub fn new(samples: Vec<Tensor>, labels: Vec<usize>, classes: Vec<String>) -> Result<Dataset> {
        if samples.len() != labels.len() {
            return Err(HarnessError::Dataset(format!(
                "{} samples but {} labels",
                samples.len(),
                labels.len()
            )));
        }
        if let Some(bad) = labels.iter().find(|&&l| l >= classes.len()) {
            return Err(HarnessError::Dataset(format!(
                "label {bad} out of range for {} classes",
                classes.len()
            )));
        }
        Ok(Dataset { samples, labels, classes })
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn num_classes(&self) -> usize {
        self.classes.len()
    }

    pub fn input_channels(&self) -> usize {
        self.samples.first().map(|s| s.channels).unwrap_or(0)
    }
}

/// Per-channel standardization statistics, fitted on the training split.
#[derive(Debug, Clone, PartialEq)]
pub struct Normalization {
    pub mean: Vec<f64>,
    pub std: Vec<f64>,
}

impl Normalization {
    pub fn fit(data: &Dataset) -> Normalization {
        let channels = data.input_channels();
        let mut sum = vec![0.0; channels];
        let mut sq_sum = vec![0.0; channels];
        let mut count = vec![0usize; channels];

        for sample in &data.samples {
            let plane = sample.height * sample.width;
            for (i, v) in sample.data.iter().enumerate() {
                let c = i / plane;
                sum[c] += v;
                sq_sum[c] += v * v;
                count[c] += 1;
            }
        }

        let mean: Vec<f64> = (0..channels)
            .map(|c| if count[c] > 0 { sum[c] / count[c] as f64 } else { 0.0 })
            .collect();
        let std = (0..channels)
            .map(|c| {
                if count[c] == 0 {
                    return 1.0;
                }
                let var = sq_sum[c] / count[c] as f64 - mean[c] * mean[c];
                // Constant channels would otherwise divide by zero.
                if var > 1e-12 { var.sqrt() } else { 1.0 }
            })
            .collect();

        Normalization { mean, std }
    }

    pub fn apply(&self, data: &mut Dataset) {
        for sample in data.samples.iter_mut() {
            let plane = sample.height * sample.width;
            for (i, v) in sample.data.iter_mut().enumerate() {
                let c = i / plane;
                *v = (*v - self.mean[c]) / self.std[c];
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_pixel(a: f64, b: f64) -> Tensor {
        Tensor::from_data(1, 1, 2, vec![a, b])
    }

    #[test]
    fn rejects_out_of_range_labels() {
        let err = Dataset::new(vec![two_pixel(0.0, 0.0)], vec![2], vec!["a".into(), "b".into()]);
        assert!(matches!(err, Err(HarnessError::Dataset(_))));
    }

    #[test]
    fn normalization_centers_each_channel() {
        let mut data = Dataset::new(
            vec![two_pixel(0.0, 2.0), two_pixel(4.0, 2.0)],
            vec![0, 0],
            vec!["only".into()],
        )
        .unwrap();
        let norm = Normalization::fit(&data);
        assert_eq!(norm.mean, vec![2.0]);
        assert!((norm.std[0] - 2f64.sqrt()).abs() < 1e-12);

        norm.apply(&mut data);
        let total: f64 = data.samples.iter().flat_map(|s| s.data.iter()).sum();
        assert!(total.abs() < 1e-12);
    }
}
