//! Chargeback exposure on young advances
//!
//! Active policies whose commission advance is still mostly unearned are the
//! book's chargeback exposure: if the client stops paying inside the earning
//! window, the carrier claws the advance back.

use super::types::{ActionableInsight, AffectedEntities, InsightCategory, InsightSeverity};
use super::InsightContext;
use crate::error::StoreError;
use crate::report::format::format_currency;
use crate::store::RecordStore;
use std::collections::HashSet;

pub async fn detect(
    store: &dyn RecordStore,
    ctx: &InsightContext<'_>,
) -> Result<Vec<ActionableInsight>, StoreError> {
    let (policies, commissions) = futures::try_join!(
        store.all_policies(ctx.agent_id),
        store.all_commissions(ctx.agent_id),
    )?;

    let active_ids: HashSet<&str> = policies
        .iter()
        .filter(|p| p.is_active())
        .map(|p| p.id.as_str())
        .collect();

    let exposed: Vec<_> = commissions
        .iter()
        .filter(|c| {
            active_ids.contains(c.policy_id.as_str())
                && c.months_paid < ctx.thresholds.chargeback_window_months
                && c.unearned_amount > 0.0
        })
        .collect();

    if exposed.is_empty() {
        return Ok(vec![]);
    }

    let total_unearned: f64 = exposed.iter().map(|c| c.unearned_amount).sum();
    let any_very_young = exposed
        .iter()
        .any(|c| c.months_paid < ctx.thresholds.chargeback_critical_months);

    let severity = if any_very_young {
        InsightSeverity::Critical
    } else {
        InsightSeverity::High
    };

    let affected = AffectedEntities {
        commissions: exposed.iter().map(|c| c.id.clone()).collect(),
        policies: exposed.iter().map(|c| c.policy_id.clone()).collect(),
        clients: vec![],
    };

    Ok(vec![ActionableInsight {
        id: "chargeback-early-risk".into(),
        severity,
        category: InsightCategory::Chargeback,
        title: format!("{} Advances Still In the Chargeback Window", exposed.len()),
        description: format!(
            "{} active policies have fewer than {} months paid with unearned advance outstanding.",
            exposed.len(),
            ctx.thresholds.chargeback_window_months
        ),
        impact: format!("{} unearned and exposed", format_currency(total_unearned)),
        recommended_actions: vec![
            "Contact these clients before their next premium due date".into(),
            "Confirm bank draft details are current on each policy".into(),
            "Prioritize policies with the fewest months paid".into(),
        ],
        priority: ctx.thresholds.priority.chargeback_risk,
        affected_entities: Some(affected),
    }])
}
