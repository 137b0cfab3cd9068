//! Composite 0-100 health score

use super::metrics::MetricTotals;
use crate::insights::{ActionableInsight, InsightSeverity};
use crate::thresholds::HealthWeights;

/// Score the book from its window totals and the generated insight list.
/// Base score plus conditional bonuses, clamped to [0, 100].
pub fn health_score(
    net_income: f64,
    active_policies: usize,
    total_policies: usize,
    insights: &[ActionableInsight],
    weights: &HealthWeights,
) -> u8 {
    let mut score = weights.base;

    if net_income > 0.0 {
        score += weights.net_income_bonus;
    }

    let retention = if total_policies > 0 {
        active_policies as f64 / total_policies as f64
    } else {
        0.0
    };
    if retention > weights.retention_good {
        score += weights.retention_good_bonus;
    } else if retention > weights.retention_fair {
        score += weights.retention_fair_bonus;
    }

    let criticals = insights
        .iter()
        .filter(|i| i.severity == InsightSeverity::Critical)
        .count();
    if criticals == 0 {
        score += weights.no_critical_bonus;
    } else if criticals <= weights.few_critical_max {
        score += weights.few_critical_bonus;
    }

    score.clamp(0, 100) as u8
}

/// Score from precomputed window totals
pub fn health_score_for(
    totals: &MetricTotals,
    insights: &[ActionableInsight],
    weights: &HealthWeights,
) -> u8 {
    health_score(
        totals.net_income,
        totals.active_policies,
        totals.total_policies,
        insights,
        weights,
    )
}
