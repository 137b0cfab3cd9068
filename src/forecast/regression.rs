//! Ordinary least-squares regression over monthly totals
//!
//! Small numeric helpers for the forecast engine: line fit, coefficient of
//! determination, and dispersion statistics, with the degenerate cases
//! guarded so callers never divide by zero.

/// Fitted line `y = slope * x + intercept`
#[derive(Debug, Clone, Copy)]
pub struct LinearFit {
    pub slope: f64,
    pub intercept: f64,

    /// Coefficient of determination; defined as 0 when the series has zero
    /// variance (a flat series explains nothing, by convention here)
    pub r_squared: f64,
}

impl LinearFit {
    /// Predicted value at `x`
    pub fn predict(&self, x: f64) -> f64 {
        self.slope * x + self.intercept
    }
}

/// Fit a least-squares line through `(x, y)` points
///
/// Returns `None` for fewer than 2 points or when all x values coincide.
pub fn fit_line(points: &[(f64, f64)]) -> Option<LinearFit> {
    let n = points.len() as f64;
    if points.len() < 2 {
        return None;
    }

    let sum_x: f64 = points.iter().map(|(x, _)| x).sum();
    let sum_y: f64 = points.iter().map(|(_, y)| y).sum();
    let sum_xy: f64 = points.iter().map(|(x, y)| x * y).sum();
    let sum_xx: f64 = points.iter().map(|(x, _)| x * x).sum();

    let denom = n * sum_xx - sum_x * sum_x;
    if denom.abs() < 1e-12 {
        return None;
    }

    let slope = (n * sum_xy - sum_x * sum_y) / denom;
    let intercept = (sum_y - slope * sum_x) / n;

    let mean_y = sum_y / n;
    let ss_total: f64 = points.iter().map(|(_, y)| (y - mean_y).powi(2)).sum();
    let ss_residual: f64 = points
        .iter()
        .map(|(x, y)| (y - (slope * x + intercept)).powi(2))
        .sum();

    // Zero total variance: R-squared defined as 0, not 1
    let r_squared = if ss_total.abs() < 1e-12 {
        0.0
    } else {
        1.0 - ss_residual / ss_total
    };

    Some(LinearFit {
        slope,
        intercept,
        r_squared,
    })
}

/// Arithmetic mean; 0 for an empty slice
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Population standard deviation; 0 for an empty slice
pub fn std_dev(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let m = mean(values);
    let variance = values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / values.len() as f64;
    variance.sqrt()
}

/// Coefficient of variation (sigma / mu); 1 when the mean is not positive
pub fn coefficient_of_variation(values: &[f64]) -> f64 {
    let m = mean(values);
    if m <= 0.0 {
        1.0
    } else {
        std_dev(values) / m
    }
}
