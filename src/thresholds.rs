//! Tunable thresholds for the analytics heuristics
//!
//! Every ad hoc constant the insight generators, forecaster, health scorer,
//! and tiering logic rely on lives here, so the cut-offs can be tested and
//! tuned without touching algorithm code.

use serde::{Deserialize, Serialize};

/// Health score weights (base plus conditional bonuses, clamped to [0, 100])
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthWeights {
    pub base: i32,
    pub net_income_bonus: i32,
    pub retention_good: f64,
    pub retention_good_bonus: i32,
    pub retention_fair: f64,
    pub retention_fair_bonus: i32,
    pub no_critical_bonus: i32,
    pub few_critical_max: usize,
    pub few_critical_bonus: i32,
}

impl Default for HealthWeights {
    fn default() -> Self {
        Self {
            base: 50,
            net_income_bonus: 20,
            retention_good: 0.8,
            retention_good_bonus: 15,
            retention_fair: 0.7,
            retention_fair_bonus: 10,
            no_critical_bonus: 15,
            few_critical_max: 2,
            few_critical_bonus: 8,
        }
    }
}

/// Fixed priorities (1-10) each insight generator stamps on its output
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InsightPriorities {
    pub chargeback_risk: u8,
    pub lapse_pattern: u8,
    pub revenue_insufficient: u8,
    pub revenue_upsell: u8,
    pub expense_ratio: u8,
    pub cross_sell: u8,
    pub persistency_risk: u8,
}

impl Default for InsightPriorities {
    fn default() -> Self {
        Self {
            chargeback_risk: 10,
            lapse_pattern: 7,
            revenue_insufficient: 4,
            revenue_upsell: 6,
            expense_ratio: 8,
            cross_sell: 5,
            persistency_risk: 9,
        }
    }
}

/// Full threshold set for one analytics run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Thresholds {
    /// Forecast trend slope cut-off, currency units per month
    pub trend_slope: f64,

    /// Months of history below which the forecast warns
    pub forecast_short_history: usize,

    /// Confidence / R-squared level below which the forecast warns
    pub forecast_weak_fit: f64,

    /// Recent-vs-prior average shift that triggers a volatility warning
    pub forecast_shift_ratio: f64,

    /// Months-paid below which an advance is still chargeback-exposed
    pub chargeback_window_months: u32,

    /// Months-paid below which exposure escalates to critical
    pub chargeback_critical_months: u32,

    /// Lapses per carrier in the window that flag a pattern
    pub lapse_pattern_count: usize,

    /// Minimum active policies for reliable revenue analysis
    pub revenue_min_policies: usize,

    /// Minimum total annual premium for reliable revenue analysis
    pub revenue_min_premium: f64,

    /// Top-quartile premium multiple over the mean that flags upsell room
    pub upsell_quartile_ratio: f64,

    /// Expense-to-paid-commission ratio that flags overspend
    pub expense_ratio_limit: f64,

    /// Fraction of current expenses used as the savings target
    pub expense_savings_target: f64,

    /// Single-policy client count above which cross-sell is flagged
    pub cross_sell_min_clients: usize,

    /// Cohort age in months for persistency measurement
    pub persistency_cohort_months: i32,

    /// Minimum cohort size for a persistency verdict
    pub persistency_min_cohort: usize,

    /// Active fraction below which persistency is critical
    pub persistency_floor: f64,

    /// Client tier premium cut-offs: A >= tier_a, B >= tier_b, C >= tier_c, else D
    pub tier_a_premium: f64,
    pub tier_b_premium: f64,
    pub tier_c_premium: f64,

    /// Health score weights
    pub health: HealthWeights,

    /// Generator priorities
    pub priority: InsightPriorities,
}

impl Thresholds {
    /// Production defaults matching the shipped heuristics
    pub fn default_production() -> Self {
        Self {
            trend_slope: 50.0,
            forecast_short_history: 6,
            forecast_weak_fit: 0.5,
            forecast_shift_ratio: 0.5,
            chargeback_window_months: 3,
            chargeback_critical_months: 2,
            lapse_pattern_count: 3,
            revenue_min_policies: 5,
            revenue_min_premium: 10_000.0,
            upsell_quartile_ratio: 1.5,
            expense_ratio_limit: 0.40,
            expense_savings_target: 0.10,
            cross_sell_min_clients: 5,
            persistency_cohort_months: 13,
            persistency_min_cohort: 10,
            persistency_floor: 0.70,
            tier_a_premium: 10_000.0,
            tier_b_premium: 5_000.0,
            tier_c_premium: 2_000.0,
            health: HealthWeights::default(),
            priority: InsightPriorities::default(),
        }
    }

    /// Tier label for a client's total annual premium
    pub fn tier_for_premium(&self, premium: f64) -> char {
        if premium >= self.tier_a_premium {
            'A'
        } else if premium >= self.tier_b_premium {
            'B'
        } else if premium >= self.tier_c_premium {
            'C'
        } else {
            'D'
        }
    }
}

impl Default for Thresholds {
    fn default() -> Self {
        Self::default_production()
    }
}
