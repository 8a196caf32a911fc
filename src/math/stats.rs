/// Arithmetic mean; `NaN` for an empty slice.
pub fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

/// Population standard deviation (divides by `n`); `NaN` for an empty
/// slice.
pub fn std(values: &[f64]) -> f64 {
    let m = mean(values);
    (values.iter().map(|v| (v - m) * (v - m)).sum::<f64>() / values.len() as f64).sqrt()
}

/// Column-wise mean and population standard deviation of equally long
/// rows.
pub fn column_mean_std(rows: &[Vec<f64>]) -> (Vec<f64>, Vec<f64>) {
    let cols = rows.first().map(|r| r.len()).unwrap_or(0);
    (0..cols)
        .map(|c| {
            let column: Vec<f64> = rows.iter().map(|r| r[c]).collect();
            (mean(&column), std(&column))
        })
        .unzip()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn population_std() {
        assert_eq!(mean(&[7.0, 7.0]), 7.0);
        assert_eq!(std(&[7.0, 7.0]), 0.0);
        assert!((std(&[1.0, 2.0, 3.0, 4.0]) - 1.25f64.sqrt()).abs() < 1e-12);
    }

    #[test]
    fn columns_are_aggregated_across_rows() {
        let (m, s) = column_mean_std(&[vec![1.0, 10.0], vec![3.0, 10.0]]);
        assert_eq!(m, vec![2.0, 10.0]);
        assert_eq!(s, vec![1.0, 0.0]);
    }

    #[test]
    fn empty_slice_is_nan() {
        assert!(mean(&[]).is_nan());
    }
}
