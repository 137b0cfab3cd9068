//! Carrier lapse pattern detection
//!
//! Repeated lapses concentrated at one carrier usually mean a product-fit or
//! billing problem rather than bad luck, so the book is grouped by carrier
//! before anything is flagged.

use super::types::{ActionableInsight, AffectedEntities, InsightCategory, InsightSeverity};
use super::InsightContext;
use crate::error::StoreError;
use crate::records::{PolicyRecord, PolicyStatus};
use crate::report::format::format_currency;
use crate::store::RecordStore;
use std::collections::BTreeMap;

struct CarrierLapses<'a> {
    carrier_name: &'a str,
    policies: Vec<&'a PolicyRecord>,
    lost_premium: f64,
}

pub async fn detect(
    store: &dyn RecordStore,
    ctx: &InsightContext<'_>,
) -> Result<Vec<ActionableInsight>, StoreError> {
    let policies = store
        .policies_effective_in_range(ctx.agent_id, ctx.filters)
        .await?;

    let lapsed: Vec<&PolicyRecord> = policies
        .iter()
        .filter(|p| p.status == PolicyStatus::Lapsed)
        .collect();
    if lapsed.len() < ctx.thresholds.lapse_pattern_count {
        return Ok(vec![]);
    }

    // BTreeMap keeps the per-carrier insight order stable run to run
    let mut by_carrier: BTreeMap<&str, CarrierLapses> = BTreeMap::new();
    for policy in lapsed {
        let entry = by_carrier
            .entry(policy.carrier_id.as_str())
            .or_insert(CarrierLapses {
                carrier_name: policy.carrier_name.as_str(),
                policies: Vec::new(),
                lost_premium: 0.0,
            });
        entry.policies.push(policy);
        entry.lost_premium += policy.annual_premium;
    }

    let mut insights = Vec::new();
    for (carrier_id, lapses) in by_carrier {
        if lapses.policies.len() < ctx.thresholds.lapse_pattern_count {
            continue;
        }

        let mut products: Vec<&str> = lapses
            .policies
            .iter()
            .map(|p| p.product_name.as_str())
            .collect();
        products.sort_unstable();
        products.dedup();

        let mut actions = vec![format!(
            "Carrier: {} ({} lapses)",
            lapses.carrier_name,
            lapses.policies.len()
        )];
        actions.extend(
            products
                .iter()
                .take(3)
                .map(|p| format!("Product involved: {}", p)),
        );

        insights.push(ActionableInsight {
            id: format!("lapse-pattern-{}", carrier_id),
            severity: InsightSeverity::High,
            category: InsightCategory::Retention,
            title: "Lapse Pattern Detected".into(),
            description: format!(
                "{} {} policies lapsed in this period",
                lapses.policies.len(),
                lapses.carrier_name
            ),
            impact: format!("Lost premium: {}", format_currency(lapses.lost_premium)),
            recommended_actions: actions,
            priority: ctx.thresholds.priority.lapse_pattern,
            affected_entities: Some(AffectedEntities {
                policies: lapses.policies.iter().map(|p| p.id.clone()).collect(),
                clients: vec![],
                commissions: vec![],
            }),
        });
    }

    Ok(insights)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::insights::test_fixtures::{ctx_for, policy, range_filters};
    use crate::store::MemoryStore;
    use crate::thresholds::Thresholds;

    fn lapsed(id: &str, client: &str, premium: f64) -> crate::records::PolicyRecord {
        policy(id, client, premium, PolicyStatus::Lapsed)
    }

    #[tokio::test]
    async fn test_three_lapses_at_one_carrier_flagged() {
        let store = MemoryStore::new(
            vec![],
            vec![],
            vec![
                lapsed("p1", "cl1", 1_200.0),
                lapsed("p2", "cl2", 900.0),
                lapsed("p3", "cl3", 600.0),
            ],
            vec![],
        );
        let thresholds = Thresholds::default_production();
        let filters = range_filters();
        let ctx = ctx_for(&filters, &thresholds);

        let insights = detect(&store, &ctx).await.unwrap();
        assert_eq!(insights.len(), 1);
        assert_eq!(insights[0].id, "lapse-pattern-car1");
        assert_eq!(insights[0].severity, InsightSeverity::High);
        assert_eq!(insights[0].category, InsightCategory::Retention);
        assert!(insights[0].impact.contains("$2,700.00"));
        assert_eq!(
            insights[0].affected_entities.as_ref().unwrap().policies.len(),
            3
        );
    }

    #[tokio::test]
    async fn test_two_lapses_are_not_a_pattern() {
        let store = MemoryStore::new(
            vec![],
            vec![],
            vec![lapsed("p1", "cl1", 1_200.0), lapsed("p2", "cl2", 900.0)],
            vec![],
        );
        let thresholds = Thresholds::default_production();
        let filters = range_filters();
        let ctx = ctx_for(&filters, &thresholds);

        assert!(detect(&store, &ctx).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_lapses_spread_across_carriers_need_three_each() {
        let mut other = lapsed("p3", "cl3", 600.0);
        other.carrier_id = "car2".into();
        other.carrier_name = "Beacon Mutual".into();
        let store = MemoryStore::new(
            vec![],
            vec![],
            vec![lapsed("p1", "cl1", 1_200.0), lapsed("p2", "cl2", 900.0), other],
            vec![],
        );
        let thresholds = Thresholds::default_production();
        let filters = range_filters();
        let ctx = ctx_for(&filters, &thresholds);

        // Three lapses total, but no single carrier reaches three
        assert!(detect(&store, &ctx).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_active_policies_ignored() {
        let store = MemoryStore::new(
            vec![],
            vec![],
            vec![
                policy("p1", "cl1", 1_200.0, PolicyStatus::Active),
                policy("p2", "cl2", 900.0, PolicyStatus::Active),
                policy("p3", "cl3", 600.0, PolicyStatus::Active),
            ],
            vec![],
        );
        let thresholds = Thresholds::default_production();
        let filters = range_filters();
        let ctx = ctx_for(&filters, &thresholds);

        assert!(detect(&store, &ctx).await.unwrap().is_empty());
    }
}
