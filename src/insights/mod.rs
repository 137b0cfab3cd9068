//! Insight generation registry
//!
//! Six independent analyzers share one read-only context and emit zero or
//! more classified recommendations each. They hold no mutable state and run
//! concurrently; the merger imposes the only ordering that matters.

mod chargeback;
mod cross_sell;
mod expense_ratio;
mod lapse_pattern;
mod persistency;
mod revenue;
mod types;

pub use types::{
    ActionableInsight, AffectedEntities, InsightCategory, InsightSeverity,
};

use crate::error::StoreError;
use crate::report::ReportFilters;
use crate::store::RecordStore;
use crate::thresholds::Thresholds;
use chrono::NaiveDate;

/// Read-only context shared by every generator of one run
#[derive(Debug, Clone, Copy)]
pub struct InsightContext<'a> {
    pub agent_id: &'a str,
    pub filters: &'a ReportFilters,

    /// "Now" for age-based cohort rules; injected so runs are deterministic
    pub as_of: NaiveDate,

    pub thresholds: &'a Thresholds,
}

/// Run every registered generator concurrently and merge the results into a
/// single priority-ordered list
pub async fn generate_insights(
    store: &dyn RecordStore,
    ctx: &InsightContext<'_>,
) -> Result<Vec<ActionableInsight>, StoreError> {
    let (chargeback, lapse, revenue, expense, cross_sell, persistency) = futures::try_join!(
        chargeback::detect(store, ctx),
        lapse_pattern::detect(store, ctx),
        revenue::detect(store, ctx),
        expense_ratio::detect(store, ctx),
        cross_sell::detect(store, ctx),
        persistency::detect(store, ctx),
    )?;

    let mut insights = Vec::new();
    insights.extend(chargeback);
    insights.extend(lapse);
    insights.extend(revenue);
    insights.extend(expense);
    insights.extend(cross_sell);
    insights.extend(persistency);

    Ok(merge_insights(insights))
}

/// Sort descending by priority; equal priorities order by severity rank so
/// the result does not depend on generator registration order
pub fn merge_insights(mut insights: Vec<ActionableInsight>) -> Vec<ActionableInsight> {
    insights.sort_by(|a, b| {
        b.priority
            .cmp(&a.priority)
            .then_with(|| b.severity.rank().cmp(&a.severity.rank()))
    });
    insights
}


#[cfg(test)]
mod tests {
    use super::*;

    fn insight(id: &str, priority: u8, severity: InsightSeverity) -> ActionableInsight {
        ActionableInsight {
            id: id.into(),
            severity,
            category: InsightCategory::Risk,
            title: id.into(),
            description: String::new(),
            impact: String::new(),
            recommended_actions: vec![],
            priority,
            affected_entities: None,
        }
    }

    #[test]
    fn test_merge_sorts_descending_by_priority() {
        let merged = merge_insights(vec![
            insight("low", 7, InsightSeverity::High),
            insight("top", 10, InsightSeverity::Critical),
        ]);
        assert_eq!(merged[0].id, "top");
        assert_eq!(merged[1].id, "low");

        // Same result regardless of input order
        let merged = merge_insights(vec![
            insight("top", 10, InsightSeverity::Critical),
            insight("low", 7, InsightSeverity::High),
        ]);
        assert_eq!(merged[0].id, "top");
    }

    #[test]
    fn test_merge_breaks_priority_ties_by_severity() {
        let merged = merge_insights(vec![
            insight("medium", 6, InsightSeverity::Medium),
            insight("critical", 6, InsightSeverity::Critical),
            insight("high", 6, InsightSeverity::High),
        ]);
        assert_eq!(merged[0].id, "critical");
        assert_eq!(merged[1].id, "high");
        assert_eq!(merged[2].id, "medium");
    }
}
