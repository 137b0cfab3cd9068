//! Revenue opportunity analysis
//!
//! Two independent checks on the active book: whether there is enough volume
//! for the numbers to mean anything at all, and whether the top quartile of
//! premiums shows headroom the rest of the book is leaving on the table.

use super::types::{ActionableInsight, InsightCategory, InsightSeverity};
use super::InsightContext;
use crate::error::StoreError;
use crate::records::PolicyRecord;
use crate::report::format::format_currency;
use crate::store::RecordStore;
use std::collections::HashMap;

// Below this count the quartile split is too noisy to act on
const UPSELL_MIN_POLICIES: usize = 10;

pub async fn detect(
    store: &dyn RecordStore,
    ctx: &InsightContext<'_>,
) -> Result<Vec<ActionableInsight>, StoreError> {
    let policies = store.all_policies(ctx.agent_id).await?;
    let active: Vec<&PolicyRecord> = policies.iter().filter(|p| p.is_active()).collect();

    let total_premium: f64 = active.iter().map(|p| p.annual_premium).sum();
    let mut insights = Vec::new();

    if active.len() < ctx.thresholds.revenue_min_policies
        || total_premium < ctx.thresholds.revenue_min_premium
    {
        insights.push(ActionableInsight {
            id: "revenue-insufficient-data".into(),
            severity: InsightSeverity::Medium,
            category: InsightCategory::Performance,
            title: "Limited Data Available".into(),
            description: format!(
                "Current data: {} active policies, {} in premium",
                active.len(),
                format_currency(total_premium)
            ),
            impact: "Commission projections may vary".into(),
            recommended_actions: vec![
                format!(
                    "Current policy count: {} (minimum {} recommended for accuracy)",
                    active.len(),
                    ctx.thresholds.revenue_min_policies
                ),
                format!(
                    "Current premium total: {} (minimum {} recommended)",
                    format_currency(total_premium),
                    format_currency(ctx.thresholds.revenue_min_premium)
                ),
            ],
            priority: ctx.thresholds.priority.revenue_insufficient,
            affected_entities: None,
        });
    }

    if let Some(upsell) = detect_upsell(&active, ctx) {
        insights.push(upsell);
    }

    Ok(insights)
}

fn detect_upsell(
    active: &[&PolicyRecord],
    ctx: &InsightContext<'_>,
) -> Option<ActionableInsight> {
    if active.len() <= UPSELL_MIN_POLICIES {
        return None;
    }

    let avg_premium: f64 =
        active.iter().map(|p| p.annual_premium).sum::<f64>() / active.len() as f64;

    let mut sorted: Vec<&PolicyRecord> = active.to_vec();
    sorted.sort_by(|a, b| {
        b.annual_premium
            .partial_cmp(&a.annual_premium)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    let quartile = &sorted[..active.len() / 4];
    if quartile.is_empty() {
        return None;
    }

    let quartile_avg: f64 =
        quartile.iter().map(|p| p.annual_premium).sum::<f64>() / quartile.len() as f64;
    if quartile_avg <= avg_premium * ctx.thresholds.upsell_quartile_ratio {
        return None;
    }

    // Name the carrier/product combinations driving the top quartile
    let mut combos: HashMap<String, usize> = HashMap::new();
    for policy in quartile {
        let key = format!("{} - {}", policy.carrier_name, policy.product_name);
        *combos.entry(key).or_insert(0) += 1;
    }
    let mut ranked: Vec<(String, usize)> = combos.into_iter().collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));

    let actions: Vec<String> = if ranked.is_empty() {
        vec![format!(
            "Current average premium: {}",
            format_currency(avg_premium)
        )]
    } else {
        ranked
            .iter()
            .take(3)
            .map(|(combo, _)| format!("Top performer: {}", combo))
            .collect()
    };

    Some(ActionableInsight {
        id: "revenue-premium-opportunity".into(),
        severity: InsightSeverity::Medium,
        category: InsightCategory::Opportunity,
        title: "Premium Distribution Analysis".into(),
        description: format!(
            "Top 25% policies average: {}, Overall average: {}",
            format_currency(quartile_avg),
            format_currency(avg_premium)
        ),
        impact: format!(
            "Premium gap: {} per policy",
            format_currency(quartile_avg - avg_premium)
        ),
        recommended_actions: actions,
        priority: ctx.thresholds.priority.revenue_upsell,
        affected_entities: None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::insights::test_fixtures::{ctx_for, policy, range_filters};
    use crate::records::PolicyStatus;
    use crate::store::MemoryStore;
    use crate::thresholds::Thresholds;

    fn active_book(premiums: &[f64]) -> Vec<PolicyRecord> {
        premiums
            .iter()
            .enumerate()
            .map(|(i, &premium)| {
                policy(
                    &format!("p{}", i),
                    &format!("cl{}", i),
                    premium,
                    PolicyStatus::Active,
                )
            })
            .collect()
    }

    #[tokio::test]
    async fn test_small_book_flags_insufficient_data() {
        let store = MemoryStore::new(vec![], vec![], active_book(&[1_000.0, 2_000.0]), vec![]);
        let thresholds = Thresholds::default_production();
        let filters = range_filters();
        let ctx = ctx_for(&filters, &thresholds);

        let insights = detect(&store, &ctx).await.unwrap();
        assert_eq!(insights.len(), 1);
        assert_eq!(insights[0].id, "revenue-insufficient-data");
        assert_eq!(insights[0].priority, 4);
    }

    #[tokio::test]
    async fn test_low_premium_flags_even_with_enough_policies() {
        // Six policies but only $6,000 total premium
        let store = MemoryStore::new(vec![], vec![], active_book(&[1_000.0; 6]), vec![]);
        let thresholds = Thresholds::default_production();
        let filters = range_filters();
        let ctx = ctx_for(&filters, &thresholds);

        let insights = detect(&store, &ctx).await.unwrap();
        assert_eq!(insights[0].id, "revenue-insufficient-data");
    }

    #[tokio::test]
    async fn test_skewed_quartile_flags_upsell() {
        // Twelve policies: three at 10k dominate nine at 1k
        let mut premiums = vec![1_000.0; 9];
        premiums.extend([10_000.0, 10_000.0, 10_000.0]);
        let store = MemoryStore::new(vec![], vec![], active_book(&premiums), vec![]);
        let thresholds = Thresholds::default_production();
        let filters = range_filters();
        let ctx = ctx_for(&filters, &thresholds);

        let insights = detect(&store, &ctx).await.unwrap();
        let upsell = insights
            .iter()
            .find(|i| i.id == "revenue-premium-opportunity")
            .unwrap();
        assert_eq!(upsell.severity, InsightSeverity::Medium);
        assert_eq!(upsell.category, InsightCategory::Opportunity);
        // quartile avg 10,000 vs overall 3,250
        assert!(upsell.description.contains("$10,000.00"));
        assert!(upsell.impact.contains("$6,750.00"));
    }

    #[tokio::test]
    async fn test_even_book_has_no_upsell_insight() {
        let store = MemoryStore::new(vec![], vec![], active_book(&[2_000.0; 12]), vec![]);
        let thresholds = Thresholds::default_production();
        let filters = range_filters();
        let ctx = ctx_for(&filters, &thresholds);

        let insights = detect(&store, &ctx).await.unwrap();
        assert!(insights
            .iter()
            .all(|i| i.id != "revenue-premium-opportunity"));
    }
}
