//! Revenue forecast from trailing paid-commission history
//!
//! Buckets paid commissions by calendar month, fits a least-squares trend
//! line, projects the next three months, and scores the projection with a
//! bounded confidence model (fit quality x variance penalty x data volume).

use super::regression::{coefficient_of_variation, fit_line};
use crate::records::{month_index, CommissionRecord, CommissionStatus};
use crate::thresholds::Thresholds;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Warning attached when fewer than 3 months carry paid commission
pub const INSUFFICIENT_DATA_WARNING: &str =
    "Insufficient payment history: fewer than 3 months with paid commission";

/// Direction of the fitted trend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ForecastTrend {
    Up,
    Down,
    Stable,
}

/// Projection over the next three calendar months
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForecastResult {
    /// Projected revenue for the next month (floored at 0)
    pub next_month: f64,

    /// Sum of the next three monthly projections (each floored at 0)
    pub three_month: f64,

    /// Reliability score, always in [0, 1]
    pub confidence: f64,

    pub trend: ForecastTrend,

    /// Number of months that actually had paid commission
    pub historical_months: usize,

    pub warnings: Vec<String>,
}

impl ForecastResult {
    fn insufficient(historical_months: usize) -> Self {
        Self {
            next_month: 0.0,
            three_month: 0.0,
            confidence: 0.0,
            trend: ForecastTrend::Stable,
            historical_months,
            warnings: vec![INSUFFICIENT_DATA_WARNING.to_string()],
        }
    }
}

/// Bucket paid commissions in the trailing 12 months of `as_of` by calendar
/// month. Months without any paid commission get no bucket; gaps stay gaps.
fn monthly_buckets(commissions: &[CommissionRecord], as_of: NaiveDate) -> Vec<(i64, f64)> {
    let current = month_index(as_of);
    let earliest = current - 11;

    let mut totals: BTreeMap<i64, f64> = BTreeMap::new();
    for c in commissions {
        if c.status != CommissionStatus::Paid {
            continue;
        }
        let idx = month_index(c.effective_date());
        if idx < earliest || idx > current {
            continue;
        }
        *totals.entry(idx).or_insert(0.0) += c.amount.max(0.0);
    }

    totals.into_iter().collect()
}

/// Forecast revenue from the agent's trailing paid-commission history
pub fn forecast_paid_commissions(
    commissions: &[CommissionRecord],
    as_of: NaiveDate,
    thresholds: &Thresholds,
) -> ForecastResult {
    let buckets = monthly_buckets(commissions, as_of);
    let n = buckets.len();

    if n < 3 {
        return ForecastResult::insufficient(n);
    }

    // Shift month indices to a small origin for numeric stability; the fit
    // and projections are translation-invariant
    let origin = buckets[0].0;
    let points: Vec<(f64, f64)> = buckets
        .iter()
        .map(|&(idx, total)| ((idx - origin) as f64, total))
        .collect();

    // n >= 3 distinct months, so the fit cannot degenerate
    let fit = match fit_line(&points) {
        Some(f) => f,
        None => return ForecastResult::insufficient(n),
    };

    let last_x = points[points.len() - 1].0;
    let projections: Vec<f64> = (1..=3)
        .map(|step| fit.predict(last_x + step as f64).max(0.0))
        .collect();
    let next_month = projections[0];
    let three_month = projections.iter().sum();

    let totals: Vec<f64> = points.iter().map(|&(_, y)| y).collect();
    let cv = coefficient_of_variation(&totals);
    let variance_factor = 0.7 + 0.3 * (1.0 - cv).max(0.0);
    let data_factor = (0.6 + (n as f64 - 3.0) / 30.0).min(1.0);
    let confidence = (fit.r_squared * variance_factor * data_factor).clamp(0.0, 1.0);

    let trend = if fit.slope > thresholds.trend_slope {
        ForecastTrend::Up
    } else if fit.slope < -thresholds.trend_slope {
        ForecastTrend::Down
    } else {
        ForecastTrend::Stable
    };

    let mut warnings = Vec::new();
    if n < thresholds.forecast_short_history {
        warnings.push(format!(
            "Only {} months of payment history; forecasts improve with at least {}",
            n, thresholds.forecast_short_history
        ));
    }
    if confidence < thresholds.forecast_weak_fit {
        warnings.push(format!(
            "Forecast confidence is low ({:.0}%)",
            confidence * 100.0
        ));
    }
    if fit.r_squared < thresholds.forecast_weak_fit {
        warnings.push(format!(
            "Payment history does not follow a clear trend (R-squared {:.2})",
            fit.r_squared
        ));
    }
    if n >= thresholds.forecast_short_history {
        let recent = &totals[n - 3..];
        let prior = &totals[..n - 3];
        let recent_avg = recent.iter().sum::<f64>() / recent.len() as f64;
        let prior_avg = prior.iter().sum::<f64>() / prior.len() as f64;
        if prior_avg > 0.0
            && ((recent_avg - prior_avg) / prior_avg).abs() > thresholds.forecast_shift_ratio
        {
            warnings.push(
                "Recent months deviate sharply from earlier history; the trend may be turning"
                    .to_string(),
            );
        }
    }

    ForecastResult {
        next_month,
        three_month,
        confidence,
        trend,
        historical_months: n,
        warnings,
    }
}
