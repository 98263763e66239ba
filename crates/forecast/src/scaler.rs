use crate::result::ForecastError;

/// Per-column standardisation to zero mean and unit variance.
///
/// Fitted once on the training rows and then reused unchanged for every later
/// transform (test split, forecast horizon).
#[derive(Debug, Clone, PartialEq)]
pub struct StandardScaler {
    mean: Vec<f64>,
    scale: Vec<f64>,
}

impl StandardScaler {
    /// Fit column means and population standard deviations.
    ///
    /// Columns with (near) zero variance get a scale of 1 so they pass through
    /// centred instead of dividing by zero.
    pub fn fit(x: &[Vec<f64>]) -> Result<Self, ForecastError> {
        let width = match x.first() {
            Some(row) => row.len(),
            None => return Err(ForecastError::internal("cannot fit scaler on an empty matrix")),
        };
        if x.iter().any(|row| row.len() != width) {
            return Err(ForecastError::internal("ragged feature matrix"));
        }

        let n = x.len() as f64;
        let mut mean = vec![0.0; width];
        for row in x {
            for (m, v) in mean.iter_mut().zip(row) {
                *m += v;
            }
        }
        for m in &mut mean {
            *m /= n;
        }

        let mut var = vec![0.0; width];
        for row in x {
            for ((acc, v), m) in var.iter_mut().zip(row).zip(&mean) {
                let d = v - m;
                *acc += d * d;
            }
        }

        let scale = var
            .into_iter()
            .map(|v| {
                let std = (v / n).sqrt();
                if std < 10.0 * f64::EPSILON { 1.0 } else { std }
            })
            .collect::<Vec<_>>();

        if mean.iter().chain(&scale).any(|v| !v.is_finite()) {
            return Err(ForecastError::internal("non-finite value in feature matrix"));
        }

        Ok(Self { mean, scale })
    }

    pub fn width(&self) -> usize {
        self.mean.len()
    }

    pub fn transform(&self, x: &[Vec<f64>]) -> Result<Vec<Vec<f64>>, ForecastError> {
        x.iter().map(|row| self.transform_row(row)).collect()
    }

    pub fn transform_row(&self, row: &[f64]) -> Result<Vec<f64>, ForecastError> {
        if row.len() != self.width() {
            return Err(ForecastError::internal(format!(
                "expected {} features, got {}",
                self.width(),
                row.len()
            )));
        }
        Ok(row
            .iter()
            .zip(&self.mean)
            .zip(&self.scale)
            .map(|((v, m), s)| (v - m) / s)
            .collect())
    }
}
