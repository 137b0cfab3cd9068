//! Record types for the commission book: commissions, expenses, policies, clients

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

/// Payment lifecycle of a commission record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CommissionStatus {
    /// Submitted but not yet advanced or earned
    Pending,
    /// Advanced/paid out by the carrier
    Paid,
    /// Fully earned (past the chargeback window)
    Earned,
    /// Reversed after an early lapse
    ChargedBack,
}

/// Lifecycle of an issued policy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PolicyStatus {
    /// Submitted, not yet in force
    Pending,
    /// In force
    Active,
    /// Lapsed for non-payment
    Lapsed,
    /// Cancelled by the client or carrier
    Cancelled,
}

/// A single commission payment record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommissionRecord {
    /// Unique commission identifier
    pub id: String,

    /// Owning agent
    pub agent_id: String,

    /// Policy this commission was earned on
    pub policy_id: String,

    /// Commission amount (advance or as-earned payment)
    pub amount: f64,

    /// Payment lifecycle status
    pub status: CommissionStatus,

    /// Date the money was received (paid commissions)
    pub payment_date: Option<NaiveDate>,

    /// Date the record was created (fallback date for unpaid commissions)
    pub created_at: NaiveDate,

    /// Months of premium the client has paid so far
    pub months_paid: u32,

    /// Portion of an advance not yet earned (chargeback exposure)
    pub unearned_amount: f64,

    /// Amount reversed, if the commission was charged back
    pub chargeback_amount: Option<f64>,
}

impl CommissionRecord {
    /// Date used for range filtering: payment date for paid commissions,
    /// creation date otherwise
    pub fn effective_date(&self) -> NaiveDate {
        match (self.status, self.payment_date) {
            (CommissionStatus::Paid, Some(d)) => d,
            _ => self.created_at,
        }
    }
}

/// A business expense record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExpenseRecord {
    pub id: String,
    pub agent_id: String,

    /// Expense amount
    pub amount: f64,

    /// Category label (Marketing, Leads, Office, ...)
    pub category: String,

    /// Date the expense was incurred
    pub date: NaiveDate,

    /// Whether the expense recurs monthly
    pub is_recurring: bool,
}

/// An issued policy record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PolicyRecord {
    pub id: String,
    pub agent_id: String,

    /// Carrier-assigned policy number
    pub policy_number: String,

    /// Owning client
    pub client_id: String,

    /// Carrier reference
    pub carrier_id: String,
    pub carrier_name: String,

    /// Product reference
    pub product_id: String,
    pub product_name: String,

    /// Lifecycle status
    pub status: PolicyStatus,

    /// Date the policy went in force
    pub effective_date: NaiveDate,

    /// Date the policy was cancelled or lapsed, if it was
    pub cancellation_date: Option<NaiveDate>,

    /// Annualized premium
    pub annual_premium: f64,
}

impl PolicyRecord {
    /// Whether the policy is currently in force
    pub fn is_active(&self) -> bool {
        self.status == PolicyStatus::Active
    }

    /// Whole months between the effective date and `as_of`
    pub fn age_in_months(&self, as_of: NaiveDate) -> i32 {
        months_between(self.effective_date, as_of)
    }
}

/// A client record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientRecord {
    pub id: String,
    pub agent_id: String,
    pub name: String,

    /// Two-letter state code, if known
    pub state: Option<String>,
}

/// Row of the client lifetime-value view (one per client)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientValueRow {
    pub client_id: String,
    pub client_name: String,

    /// Total annualized premium across the client's policies
    pub total_premium: f64,

    /// Premium on in-force policies only
    pub active_premium: f64,

    pub active_policies: usize,
    pub total_policies: usize,

    /// Premium-based tier label (A/B/C/D)
    pub tier: char,
}

/// Whole calendar months from `from` to `to` (negative if `to` precedes `from`)
pub fn months_between(from: NaiveDate, to: NaiveDate) -> i32 {
    let mut months =
        (to.year() - from.year()) * 12 + (to.month() as i32 - from.month() as i32);
    if to.day() < from.day() {
        months -= 1;
    }
    months
}

/// Zero-based calendar month index (year * 12 + month), used for bucketing
pub fn month_index(date: NaiveDate) -> i64 {
    date.year() as i64 * 12 + (date.month0() as i64)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_months_between() {
        assert_eq!(months_between(date(2025, 1, 15), date(2025, 4, 15)), 3);
        assert_eq!(months_between(date(2025, 1, 15), date(2025, 4, 14)), 2);
        assert_eq!(months_between(date(2025, 4, 1), date(2025, 1, 1)), -3);
    }

    #[test]
    fn test_month_index_is_contiguous_across_year_boundary() {
        assert_eq!(
            month_index(date(2026, 1, 1)) - month_index(date(2025, 12, 31)),
            1
        );
    }

    #[test]
    fn test_commission_effective_date() {
        let mut c = CommissionRecord {
            id: "c1".into(),
            agent_id: "a1".into(),
            policy_id: "p1".into(),
            amount: 500.0,
            status: CommissionStatus::Paid,
            payment_date: Some(date(2025, 6, 10)),
            created_at: date(2025, 5, 1),
            months_paid: 2,
            unearned_amount: 350.0,
            chargeback_amount: None,
        };
        assert_eq!(c.effective_date(), date(2025, 6, 10));

        // Unpaid commissions fall back to creation date
        c.status = CommissionStatus::Pending;
        assert_eq!(c.effective_date(), date(2025, 5, 1));
    }
}
