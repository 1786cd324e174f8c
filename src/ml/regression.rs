//! Ridge linear regression on standardized features.

use serde::{Deserialize, Serialize};

use super::TrainError;

const PIVOT_EPSILON: f64 = 1e-12;

/// Per-column standardization fitted on the training split.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scaler {
    pub means: Vec<f64>,
    pub stds: Vec<f64>,
}

impl Scaler {
    pub fn fit(rows: &[Vec<f64>]) -> Self {
        let width = rows.first().map_or(0, Vec::len);
        let n = rows.len().max(1) as f64;

        let mut means = vec![0.0; width];
        for row in rows {
            for (mean, value) in means.iter_mut().zip(row) {
                *mean += value / n;
            }
        }

        let mut stds = vec![0.0; width];
        for row in rows {
            for ((var, value), mean) in stds.iter_mut().zip(row).zip(&means) {
                *var += (value - mean).powi(2) / n;
            }
        }
        for std in &mut stds {
            *std = if *std > 0.0 { std.sqrt() } else { 1.0 };
        }

        Self { means, stds }
    }

    pub fn transform(&self, row: &[f64]) -> Vec<f64> {
        row.iter()
            .zip(self.means.iter().zip(&self.stds))
            .map(|(value, (mean, std))| (value - mean) / std)
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RidgeRegression {
    pub weights: Vec<f64>,
    pub intercept: f64,
    pub lambda: f64,
}

impl RidgeRegression {
    /// Fit on already-standardized rows. The intercept is the target mean,
    /// so `rows` must be centered.
    pub fn fit(rows: &[Vec<f64>], targets: &[f64], lambda: f64) -> Result<Self, TrainError> {
        let width = rows.first().map_or(0, Vec::len);
        let n = targets.len().max(1) as f64;
        let intercept = targets.iter().sum::<f64>() / n;

        // A = XᵀX + λI, b = Xᵀ(y - ȳ)
        let mut a = vec![vec![0.0; width]; width];
        let mut b = vec![0.0; width];
        for (row, target) in rows.iter().zip(targets) {
            let centered = target - intercept;
            for i in 0..width {
                b[i] += row[i] * centered;
                for j in i..width {
                    a[i][j] += row[i] * row[j];
                }
            }
        }
        for i in 0..width {
            for j in 0..i {
                a[i][j] = a[j][i];
            }
            a[i][i] += lambda;
        }

        let weights = solve(a, b)?;
        Ok(Self { weights, intercept, lambda })
    }

    pub fn predict(&self, row: &[f64]) -> f64 {
        self.intercept + self.weights.iter().zip(row).map(|(w, x)| w * x).sum::<f64>()
    }
}

/// Gaussian elimination with partial pivoting.
fn solve(mut a: Vec<Vec<f64>>, mut b: Vec<f64>) -> Result<Vec<f64>, TrainError> {
    let n = b.len();

    for col in 0..n {
        let pivot = (col..n)
            .max_by(|&i, &j| a[i][col].abs().total_cmp(&a[j][col].abs()))
            .ok_or(TrainError::Singular)?;
        if a[pivot][col].abs() < PIVOT_EPSILON {
            return Err(TrainError::Singular);
        }
        a.swap(col, pivot);
        b.swap(col, pivot);

        for row in col + 1..n {
            let factor = a[row][col] / a[col][col];
            if factor == 0.0 {
                continue;
            }
            for k in col..n {
                a[row][k] -= factor * a[col][k];
            }
            b[row] -= factor * b[col];
        }
    }

    let mut x = vec![0.0; n];
    for row in (0..n).rev() {
        let tail: f64 = (row + 1..n).map(|k| a[row][k] * x[k]).sum();
        x[row] = (b[row] - tail) / a[row][row];
    }
    Ok(x)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_solve_small_system() {
        // 2x + y = 5, x + 3y = 10
        let x = solve(vec![vec![2.0, 1.0], vec![1.0, 3.0]], vec![5.0, 10.0]).unwrap();
        assert!((x[0] - 1.0).abs() < 1e-9);
        assert!((x[1] - 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_solve_rejects_singular() {
        let err = solve(vec![vec![1.0, 2.0], vec![2.0, 4.0]], vec![1.0, 2.0]).unwrap_err();
        assert!(matches!(err, TrainError::Singular));
    }

    #[test]
    fn test_scaler_zero_variance_column() {
        let scaler = Scaler::fit(&[vec![1.0, 5.0], vec![3.0, 5.0]]);

        assert_eq!(scaler.means, vec![2.0, 5.0]);
        assert_eq!(scaler.stds, vec![1.0, 1.0]);
        assert_eq!(scaler.transform(&[3.0, 5.0]), vec![1.0, 0.0]);
    }

    #[test]
    fn test_recovers_noiseless_linear_target() {
        // y = 3a - 2b + 40
        let raw: Vec<Vec<f64>> = (0..50)
            .map(|i| vec![f64::from(i % 10), f64::from((i * 7) % 13)])
            .collect();
        let targets: Vec<f64> = raw.iter().map(|r| 3.0 * r[0] - 2.0 * r[1] + 40.0).collect();

        let scaler = Scaler::fit(&raw);
        let scaled: Vec<Vec<f64>> = raw.iter().map(|r| scaler.transform(r)).collect();
        let model = RidgeRegression::fit(&scaled, &targets, 1e-9).unwrap();

        for (row, target) in raw.iter().zip(&targets) {
            let predicted = model.predict(&scaler.transform(row));
            assert!((predicted - target).abs() < 1e-6, "{predicted} vs {target}");
        }
    }
}
