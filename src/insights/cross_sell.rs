//! Cross-sell opportunity detection
//!
//! Single-policy clients are the cheapest growth channel in the book; the
//! comparison against multi-policy households quantifies what deepening those
//! relationships is worth.

use super::types::{ActionableInsight, AffectedEntities, InsightCategory, InsightSeverity};
use super::InsightContext;
use crate::error::StoreError;
use crate::report::format::{format_currency, format_number};
use crate::store::RecordStore;
use std::collections::HashMap;

struct ClientBook {
    policy_count: usize,
    total_premium: f64,
}

pub async fn detect(
    store: &dyn RecordStore,
    ctx: &InsightContext<'_>,
) -> Result<Vec<ActionableInsight>, StoreError> {
    let policies = store.all_policies(ctx.agent_id).await?;
    let active: Vec<_> = policies.iter().filter(|p| p.is_active()).collect();
    if active.is_empty() {
        return Ok(vec![]);
    }

    let mut by_client: HashMap<&str, ClientBook> = HashMap::new();
    for policy in &active {
        let book = by_client
            .entry(policy.client_id.as_str())
            .or_insert(ClientBook {
                policy_count: 0,
                total_premium: 0.0,
            });
        book.policy_count += 1;
        book.total_premium += policy.annual_premium;
    }

    let single: Vec<(&str, &ClientBook)> = by_client
        .iter()
        .filter(|(_, book)| book.policy_count == 1)
        .map(|(id, book)| (*id, book))
        .collect();
    if single.len() <= ctx.thresholds.cross_sell_min_clients {
        return Ok(vec![]);
    }

    let multi: Vec<&ClientBook> = by_client
        .values()
        .filter(|book| book.policy_count > 1)
        .collect();

    let avg_single_premium =
        single.iter().map(|(_, b)| b.total_premium).sum::<f64>() / single.len() as f64;
    let avg_multi_premium = if multi.is_empty() {
        0.0
    } else {
        multi.iter().map(|b| b.total_premium).sum::<f64>() / multi.len() as f64
    };
    let avg_policies_per_client = active.len() as f64 / by_client.len() as f64;

    let impact = if avg_multi_premium > 0.0 {
        format!(
            "Multi-policy clients average {} vs single-policy {}",
            format_currency(avg_multi_premium),
            format_currency(avg_single_premium)
        )
    } else {
        format!(
            "Average policies per client: {}",
            format_number(avg_policies_per_client)
        )
    };

    let mut client_ids: Vec<String> = single.iter().map(|(id, _)| id.to_string()).collect();
    client_ids.sort_unstable();

    Ok(vec![ActionableInsight {
        id: "opportunity-cross-sell".into(),
        severity: InsightSeverity::Medium,
        category: InsightCategory::Opportunity,
        title: "Cross-Sell Opportunity Analysis".into(),
        description: format!(
            "{} of {} clients have single policies",
            single.len(),
            by_client.len()
        ),
        impact,
        recommended_actions: vec![
            format!("Single-policy clients: {}", single.len()),
            format!("Multi-policy clients: {}", multi.len()),
            format!(
                "Average single-policy premium: {}",
                format_currency(avg_single_premium)
            ),
        ],
        priority: ctx.thresholds.priority.cross_sell,
        affected_entities: Some(AffectedEntities {
            clients: client_ids,
            policies: vec![],
            commissions: vec![],
        }),
    }])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::insights::test_fixtures::{ctx_for, policy, range_filters};
    use crate::records::{PolicyRecord, PolicyStatus};
    use crate::store::MemoryStore;
    use crate::thresholds::Thresholds;

    fn single_policy_clients(count: usize, premium: f64) -> Vec<PolicyRecord> {
        (0..count)
            .map(|i| {
                policy(
                    &format!("ps{}", i),
                    &format!("single{}", i),
                    premium,
                    PolicyStatus::Active,
                )
            })
            .collect()
    }

    #[tokio::test]
    async fn test_six_single_policy_clients_flagged() {
        let mut policies = single_policy_clients(6, 1_500.0);
        // One household with two policies
        policies.push(policy("pm1", "multi1", 3_000.0, PolicyStatus::Active));
        policies.push(policy("pm2", "multi1", 2_000.0, PolicyStatus::Active));
        let store = MemoryStore::new(vec![], vec![], policies, vec![]);
        let thresholds = Thresholds::default_production();
        let filters = range_filters();
        let ctx = ctx_for(&filters, &thresholds);

        let insights = detect(&store, &ctx).await.unwrap();
        assert_eq!(insights.len(), 1);
        let insight = &insights[0];
        assert_eq!(insight.id, "opportunity-cross-sell");
        assert!(insight.description.contains("6 of 7 clients"));
        // Multi-policy household totals $5,000 vs single average $1,500
        assert!(insight.impact.contains("$5,000.00"));
        assert!(insight.impact.contains("$1,500.00"));
        assert_eq!(insight.affected_entities.as_ref().unwrap().clients.len(), 6);
    }

    #[tokio::test]
    async fn test_five_single_policy_clients_below_threshold() {
        let store = MemoryStore::new(vec![], vec![], single_policy_clients(5, 1_500.0), vec![]);
        let thresholds = Thresholds::default_production();
        let filters = range_filters();
        let ctx = ctx_for(&filters, &thresholds);

        assert!(detect(&store, &ctx).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_no_multi_policy_clients_falls_back_to_average() {
        let store = MemoryStore::new(vec![], vec![], single_policy_clients(7, 1_500.0), vec![]);
        let thresholds = Thresholds::default_production();
        let filters = range_filters();
        let ctx = ctx_for(&filters, &thresholds);

        let insights = detect(&store, &ctx).await.unwrap();
        assert!(insights[0].impact.contains("Average policies per client: 1"));
    }

    #[tokio::test]
    async fn test_lapsed_policies_do_not_count_toward_households() {
        let mut policies = single_policy_clients(6, 1_500.0);
        // Lapsed second policy does not make this a multi-policy household
        policies.push(policy("pl1", "single0", 900.0, PolicyStatus::Lapsed));
        let store = MemoryStore::new(vec![], vec![], policies, vec![]);
        let thresholds = Thresholds::default_production();
        let filters = range_filters();
        let ctx = ctx_for(&filters, &thresholds);

        let insights = detect(&store, &ctx).await.unwrap();
        assert!(insights[0].description.contains("6 of 6 clients"));
    }
}
