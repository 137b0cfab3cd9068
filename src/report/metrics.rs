//! Metric aggregation over one report window
//!
//! Totals are computed once per report from the fetched snapshot and shared
//! by the summary, the sections, and the health scorer. Every ratio is
//! guarded: an empty book yields zeros, never NaN.

use super::format::{format_currency, format_number, format_percent};
use super::types::{Metric, MetricFormat, MetricTrend};
use crate::records::{CommissionRecord, CommissionStatus, ExpenseRecord, PolicyRecord};

/// Aggregated totals for one report window
#[derive(Debug, Clone, Default)]
pub struct MetricTotals {
    pub paid_commission: f64,
    pub earned_commission: f64,
    pub total_expenses: f64,
    pub net_income: f64,
    pub total_premium: f64,
    pub active_policies: usize,
    pub total_policies: usize,
    /// Active / total policies, 0 when the book is empty
    pub retention_rate: f64,
    /// Expenses / paid commission, 0 when nothing was paid
    pub expense_ratio: f64,
}

impl MetricTotals {
    pub fn from_records(
        commissions: &[CommissionRecord],
        expenses: &[ExpenseRecord],
        policies: &[PolicyRecord],
    ) -> Self {
        let paid_commission: f64 = commissions
            .iter()
            .filter(|c| c.status == CommissionStatus::Paid)
            .map(|c| c.amount)
            .sum();
        let earned_commission: f64 = commissions
            .iter()
            .filter(|c| c.status == CommissionStatus::Earned)
            .map(|c| c.amount)
            .sum();
        let total_expenses: f64 = expenses.iter().map(|e| e.amount).sum();
        let total_premium: f64 = policies.iter().map(|p| p.annual_premium).sum();

        let active_policies = policies.iter().filter(|p| p.is_active()).count();
        let total_policies = policies.len();
        let retention_rate = if total_policies > 0 {
            active_policies as f64 / total_policies as f64
        } else {
            0.0
        };
        let expense_ratio = if paid_commission > 0.0 {
            total_expenses / paid_commission
        } else {
            0.0
        };

        Self {
            paid_commission,
            earned_commission,
            total_expenses,
            net_income: paid_commission - total_expenses,
            total_premium,
            active_policies,
            total_policies,
            retention_rate,
            expense_ratio,
        }
    }

    /// The six executive key metrics, display-ready
    pub fn key_metrics(&self) -> Vec<Metric> {
        let net_trend = if self.net_income >= 0.0 {
            MetricTrend::Up
        } else {
            MetricTrend::Down
        };
        vec![
            Metric::new(
                "Net Income",
                format_currency(self.net_income),
                MetricFormat::Currency,
            )
            .with_trend(net_trend),
            Metric::new(
                "Commission Paid",
                format_currency(self.paid_commission),
                MetricFormat::Currency,
            ),
            Metric::new(
                "Expenses",
                format_currency(self.total_expenses),
                MetricFormat::Currency,
            ),
            Metric::new(
                "Active Policies",
                format_number(self.active_policies as f64),
                MetricFormat::Number,
            ),
            Metric::new(
                "Total Premium",
                format_currency(self.total_premium),
                MetricFormat::Currency,
            ),
            Metric::new(
                "Retention",
                format_percent(self.retention_rate * 100.0),
                MetricFormat::Percent,
            ),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::insights::test_fixtures::{commission, expense, policy};
    use crate::records::PolicyStatus;

    #[test]
    fn test_totals_over_mixed_records() {
        let mut pending = commission("c2", "p2", 400.0, 0, 400.0);
        pending.status = CommissionStatus::Pending;
        let commissions = vec![commission("c1", "p1", 1_000.0, 3, 0.0), pending];
        let expenses = vec![expense("e1", 300.0, "Leads")];
        let policies = vec![
            policy("p1", "cl1", 2_400.0, PolicyStatus::Active),
            policy("p2", "cl2", 1_200.0, PolicyStatus::Lapsed),
        ];

        let totals = MetricTotals::from_records(&commissions, &expenses, &policies);
        assert!((totals.paid_commission - 1_000.0).abs() < 1e-9);
        assert!((totals.net_income - 700.0).abs() < 1e-9);
        assert!((totals.total_premium - 3_600.0).abs() < 1e-9);
        assert_eq!(totals.active_policies, 1);
        assert!((totals.retention_rate - 0.5).abs() < 1e-9);
        assert!((totals.expense_ratio - 0.3).abs() < 1e-9);
    }

    #[test]
    fn test_empty_book_yields_zeros() {
        let totals = MetricTotals::from_records(&[], &[], &[]);
        assert_eq!(totals.retention_rate, 0.0);
        assert_eq!(totals.expense_ratio, 0.0);
        assert_eq!(totals.net_income, 0.0);
    }

    #[test]
    fn test_expenses_without_income_keep_ratio_zero() {
        let expenses = vec![expense("e1", 300.0, "Leads")];
        let totals = MetricTotals::from_records(&[], &expenses, &[]);
        assert_eq!(totals.expense_ratio, 0.0);
        assert!((totals.net_income + 300.0).abs() < 1e-9);
    }

    #[test]
    fn test_key_metrics_are_display_ready() {
        let commissions = vec![commission("c1", "p1", 12_345.6, 3, 0.0)];
        let totals = MetricTotals::from_records(&commissions, &[], &[]);
        let metrics = totals.key_metrics();
        assert_eq!(metrics.len(), 6);
        assert_eq!(metrics[0].label, "Net Income");
        assert_eq!(metrics[0].value, "$12,345.60");
        assert_eq!(metrics[0].trend, Some(MetricTrend::Up));
        assert_eq!(metrics[5].value, "0.0%");
    }
}
