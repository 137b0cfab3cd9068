//! Thirteen-month persistency risk
//!
//! Persistency is measured on the cohort old enough to have reached the
//! thirteen-month mark, not on the reporting window. Survival means no
//! cancellation date: a policy pending reinstatement still counts.

use super::types::{ActionableInsight, InsightCategory, InsightSeverity};
use super::InsightContext;
use crate::error::StoreError;
use crate::records::months_between;
use crate::report::format::format_percent;
use crate::store::RecordStore;

pub async fn detect(
    store: &dyn RecordStore,
    ctx: &InsightContext<'_>,
) -> Result<Vec<ActionableInsight>, StoreError> {
    let policies = store.all_policies(ctx.agent_id).await?;

    let cohort: Vec<_> = policies
        .iter()
        .filter(|p| {
            months_between(p.effective_date, ctx.as_of) >= ctx.thresholds.persistency_cohort_months
        })
        .collect();
    if cohort.len() < ctx.thresholds.persistency_min_cohort {
        return Ok(vec![]);
    }

    let surviving = cohort.iter().filter(|p| p.cancellation_date.is_none()).count();
    let persistency = surviving as f64 / cohort.len() as f64;
    if persistency >= ctx.thresholds.persistency_floor {
        return Ok(vec![]);
    }

    Ok(vec![ActionableInsight {
        id: "risk-low-persistency".into(),
        severity: InsightSeverity::Critical,
        category: InsightCategory::Risk,
        title: format!(
            "Low {}-Month Persistency Rate",
            ctx.thresholds.persistency_cohort_months
        ),
        description: format!(
            "Your {}-month persistency is {}, which is below industry average (typically 75-85%).",
            ctx.thresholds.persistency_cohort_months,
            format_percent(persistency * 100.0)
        ),
        impact: "Low persistency increases chargebacks and reduces long-term income".into(),
        recommended_actions: vec![
            "Improve client onboarding and education".into(),
            "Increase touchpoints in first 90 days".into(),
            "Review product suitability and pricing".into(),
            "Implement systematic client retention program".into(),
        ],
        priority: ctx.thresholds.priority.persistency_risk,
        affected_entities: None,
    }])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::insights::test_fixtures::{ctx_for, date, policy, range_filters};
    use crate::records::{PolicyRecord, PolicyStatus};
    use crate::store::MemoryStore;
    use crate::thresholds::Thresholds;

    // as_of in the fixtures is 2025-12-31; 2024-06-01 is 18 months prior
    fn aged(id: &str, cancelled: bool) -> PolicyRecord {
        let status = if cancelled {
            PolicyStatus::Cancelled
        } else {
            PolicyStatus::Active
        };
        let mut p = policy(id, &format!("cl-{}", id), 1_200.0, status);
        p.effective_date = date(2024, 6, 1);
        p.cancellation_date = cancelled.then(|| date(2025, 2, 1));
        p
    }

    fn cohort(total: usize, cancelled: usize) -> Vec<PolicyRecord> {
        (0..total)
            .map(|i| aged(&format!("p{}", i), i < cancelled))
            .collect()
    }

    #[tokio::test]
    async fn test_low_persistency_cohort_flagged() {
        // 10 aged policies, 4 cancelled: 60% persistency
        let store = MemoryStore::new(vec![], vec![], cohort(10, 4), vec![]);
        let thresholds = Thresholds::default_production();
        let filters = range_filters();
        let ctx = ctx_for(&filters, &thresholds);

        let insights = detect(&store, &ctx).await.unwrap();
        assert_eq!(insights.len(), 1);
        assert_eq!(insights[0].id, "risk-low-persistency");
        assert_eq!(insights[0].severity, InsightSeverity::Critical);
        assert!(insights[0].description.contains("60.0%"));
    }

    #[tokio::test]
    async fn test_small_cohort_is_not_judged() {
        // 9 aged policies is below the cohort minimum even at 0% persistency
        let store = MemoryStore::new(vec![], vec![], cohort(9, 9), vec![]);
        let thresholds = Thresholds::default_production();
        let filters = range_filters();
        let ctx = ctx_for(&filters, &thresholds);

        assert!(detect(&store, &ctx).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_healthy_persistency_is_quiet() {
        // 10 aged policies, 2 cancelled: 80%
        let store = MemoryStore::new(vec![], vec![], cohort(10, 2), vec![]);
        let thresholds = Thresholds::default_production();
        let filters = range_filters();
        let ctx = ctx_for(&filters, &thresholds);

        assert!(detect(&store, &ctx).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_young_policies_excluded_from_cohort() {
        // Mostly-cancelled aged book padded with young actives: the young
        // policies must not dilute the cohort or its size
        let mut policies = cohort(9, 9);
        for i in 0..5 {
            // fixture effective date 2025-03-01 is under 13 months old
            policies.push(policy(
                &format!("young{}", i),
                &format!("yc{}", i),
                1_200.0,
                PolicyStatus::Active,
            ));
        }
        let store = MemoryStore::new(vec![], vec![], policies, vec![]);
        let thresholds = Thresholds::default_production();
        let filters = range_filters();
        let ctx = ctx_for(&filters, &thresholds);

        assert!(detect(&store, &ctx).await.unwrap().is_empty());
    }
}
