use serde::{Deserialize, Serialize};

use crate::math::stats;

/// Scores of one run: per-epoch train and validation accuracy plus the
/// final test accuracy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunResult {
    pub train: Vec<f64>,
    pub val: Vec<f64>,
    pub test: f64,
}

/// Scores of `n` repeats: tables of shape (n, epochs) and a test vector of
/// length n. Row i belongs to run i.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MultiRunResult {
    pub train: Vec<Vec<f64>>,
    pub val: Vec<Vec<f64>>,
    pub test: Vec<f64>,
}

impl MultiRunResult {
    /// Zero-filled tables for `runs` repeats of `epochs` epochs.
    pub fn zeros(runs: usize, epochs: usize) -> MultiRunResult {
        MultiRunResult {
            train: vec![vec![0.0; epochs]; runs],
            val: vec![vec![0.0; epochs]; runs],
            test: vec![0.0; runs],
        }
    }

    pub fn runs(&self) -> usize {
        self.test.len()
    }

    /// Stores run `i`'s result in row `i`.
    pub fn record(&mut self, i: usize, result: RunResult) {
        self.train[i] = result.train;
        self.val[i] = result.val;
        self.test[i] = result.test;
    }

    pub fn test_mean(&self) -> f64 {
        stats::mean(&self.test)
    }

    pub fn test_std(&self) -> f64 {
        stats::std(&self.test)
    }
}

/// What `RunMe::execute` returns: a single run or an aggregated multi-run.
#[derive(Debug, Clone, PartialEq)]
pub enum RunOutcome {
    Single(RunResult),
    Multi(MultiRunResult),
}

/// The test score(s) reported back to an optimization service.
#[derive(Debug, Clone, PartialEq)]
pub enum TestScore {
    Scalar(f64),
    Sequence(Vec<f64>),
}

impl RunOutcome {
    pub fn test_score(&self) -> TestScore {
        match self {
            RunOutcome::Single(r) => TestScore::Scalar(r.test),
            RunOutcome::Multi(m) => TestScore::Sequence(m.test.clone()),
        }
    }
}

impl TestScore {
    /// One observation value per score.
    pub fn values(&self) -> Vec<f64> {
        match self {
            TestScore::Scalar(v) => vec![*v],
            TestScore::Sequence(vs) => vs.clone(),
        }
    }
}
