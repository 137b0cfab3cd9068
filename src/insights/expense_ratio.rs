//! Expense ratio anomaly detection

use super::types::{ActionableInsight, InsightCategory, InsightSeverity};
use super::InsightContext;
use crate::error::StoreError;
use crate::records::CommissionStatus;
use crate::report::format::{format_currency, format_percent};
use crate::store::RecordStore;
use std::collections::HashMap;

pub async fn detect(
    store: &dyn RecordStore,
    ctx: &InsightContext<'_>,
) -> Result<Vec<ActionableInsight>, StoreError> {
    let (expenses, commissions) = futures::try_join!(
        store.expenses_in_range(ctx.agent_id, ctx.filters),
        store.commissions_in_range(ctx.agent_id, ctx.filters),
    )?;

    if expenses.is_empty() {
        return Ok(vec![]);
    }

    let total_expenses: f64 = expenses.iter().map(|e| e.amount).sum();
    let total_paid: f64 = commissions
        .iter()
        .filter(|c| c.status == CommissionStatus::Paid)
        .map(|c| c.amount)
        .sum();

    let ratio = if total_paid > 0.0 {
        total_expenses / total_paid
    } else {
        0.0
    };
    if ratio <= ctx.thresholds.expense_ratio_limit {
        return Ok(vec![]);
    }

    let mut by_category: HashMap<&str, f64> = HashMap::new();
    for expense in &expenses {
        *by_category.entry(expense.category.as_str()).or_insert(0.0) += expense.amount;
    }
    let top_category = by_category
        .into_iter()
        .max_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal));

    let mut actions = Vec::new();
    if let Some((category, amount)) = top_category {
        actions.push(format!(
            "Your highest expense category is {} at {} ({} of expenses)",
            category,
            format_currency(amount),
            format_percent(amount / total_expenses * 100.0)
        ));
    }
    if ratio > 0.5 {
        actions.push("Expense ratio is critically high - immediate review recommended".into());
    }

    let savings = total_expenses * ctx.thresholds.expense_savings_target;
    Ok(vec![ActionableInsight {
        id: "expense-high-ratio".into(),
        severity: InsightSeverity::High,
        category: InsightCategory::Expense,
        title: "High Expense Ratio".into(),
        description: format!(
            "Expenses are {} of commission income (target: 25-35%)",
            format_percent(ratio * 100.0)
        ),
        impact: format!("{} potential monthly savings", format_currency(savings)),
        recommended_actions: actions,
        priority: ctx.thresholds.priority.expense_ratio,
        affected_entities: None,
    }])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::insights::test_fixtures::{commission, ctx_for, expense, range_filters};
    use crate::store::MemoryStore;
    use crate::thresholds::Thresholds;

    #[tokio::test]
    async fn test_half_of_income_spent_is_flagged() {
        let store = MemoryStore::new(
            vec![commission("c1", "p1", 10_000.0, 3, 0.0)],
            vec![
                expense("e1", 3_000.0, "Leads"),
                expense("e2", 2_000.0, "Office"),
            ],
            vec![],
            vec![],
        );
        let thresholds = Thresholds::default_production();
        let filters = range_filters();
        let ctx = ctx_for(&filters, &thresholds);

        let insights = detect(&store, &ctx).await.unwrap();
        assert_eq!(insights.len(), 1);
        let insight = &insights[0];
        assert_eq!(insight.id, "expense-high-ratio");
        assert_eq!(insight.severity, InsightSeverity::High);
        // 10% of the $5,000 spent
        assert!(insight.impact.contains("$500.00"));
        assert!(insight.description.contains("50.0%"));
        // Leads is the dominant category
        assert!(insight.recommended_actions[0].contains("Leads"));
    }

    #[tokio::test]
    async fn test_ratio_at_limit_is_not_flagged() {
        let store = MemoryStore::new(
            vec![commission("c1", "p1", 10_000.0, 3, 0.0)],
            vec![expense("e1", 4_000.0, "Leads")],
            vec![],
            vec![],
        );
        let thresholds = Thresholds::default_production();
        let filters = range_filters();
        let ctx = ctx_for(&filters, &thresholds);

        assert!(detect(&store, &ctx).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_no_paid_income_means_no_ratio() {
        // Division guard: expenses with zero paid commission never flag
        let store = MemoryStore::new(
            vec![],
            vec![expense("e1", 4_000.0, "Leads")],
            vec![],
            vec![],
        );
        let thresholds = Thresholds::default_production();
        let filters = range_filters();
        let ctx = ctx_for(&filters, &thresholds);

        assert!(detect(&store, &ctx).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_critical_note_added_above_fifty_percent() {
        let store = MemoryStore::new(
            vec![commission("c1", "p1", 5_000.0, 3, 0.0)],
            vec![expense("e1", 3_000.0, "Marketing")],
            vec![],
            vec![],
        );
        let thresholds = Thresholds::default_production();
        let filters = range_filters();
        let ctx = ctx_for(&filters, &thresholds);

        let insights = detect(&store, &ctx).await.unwrap();
        assert!(insights[0]
            .recommended_actions
            .iter()
            .any(|a| a.contains("critically high")));
    }
}
