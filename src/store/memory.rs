//! In-memory snapshot implementation of the record store
//!
//! Backs the CLI and the Lambda service, and doubles as the test fixture
//! store. All queries run against immutable snapshots loaded up front, so a
//! report is a pure function of the snapshot plus its filters.

use super::RecordStore;
use crate::error::StoreError;
use crate::records::{ClientRecord, ClientValueRow, CommissionRecord, ExpenseRecord, PolicyRecord};
use crate::report::ReportFilters;
use crate::thresholds::Thresholds;
use async_trait::async_trait;
use std::collections::HashMap;

/// Immutable in-memory record snapshot for one or more agents
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    commissions: Vec<CommissionRecord>,
    expenses: Vec<ExpenseRecord>,
    policies: Vec<PolicyRecord>,
    clients: Vec<ClientRecord>,
    thresholds: Thresholds,
}

impl MemoryStore {
    pub fn new(
        commissions: Vec<CommissionRecord>,
        expenses: Vec<ExpenseRecord>,
        policies: Vec<PolicyRecord>,
        clients: Vec<ClientRecord>,
    ) -> Self {
        Self {
            commissions,
            expenses,
            policies,
            clients,
            thresholds: Thresholds::default_production(),
        }
    }

    /// Override the tiering thresholds used by the client-value view
    pub fn with_thresholds(mut self, thresholds: Thresholds) -> Self {
        self.thresholds = thresholds;
        self
    }

    fn policy_matches_filters(policy: &PolicyRecord, filters: &ReportFilters) -> bool {
        if let Some(ref ids) = filters.carrier_ids {
            if !ids.contains(&policy.carrier_id) {
                return false;
            }
        }
        if let Some(ref ids) = filters.product_ids {
            if !ids.contains(&policy.product_id) {
                return false;
            }
        }
        if let Some(ref ids) = filters.client_ids {
            if !ids.contains(&policy.client_id) {
                return false;
            }
        }
        true
    }
}

#[async_trait]
impl RecordStore for MemoryStore {
    async fn commissions_in_range(
        &self,
        agent_id: &str,
        filters: &ReportFilters,
    ) -> Result<Vec<CommissionRecord>, StoreError> {
        Ok(self
            .commissions
            .iter()
            .filter(|c| c.agent_id == agent_id && filters.contains(c.effective_date()))
            .cloned()
            .collect())
    }

    async fn all_commissions(&self, agent_id: &str) -> Result<Vec<CommissionRecord>, StoreError> {
        Ok(self
            .commissions
            .iter()
            .filter(|c| c.agent_id == agent_id)
            .cloned()
            .collect())
    }

    async fn expenses_in_range(
        &self,
        agent_id: &str,
        filters: &ReportFilters,
    ) -> Result<Vec<ExpenseRecord>, StoreError> {
        Ok(self
            .expenses
            .iter()
            .filter(|e| e.agent_id == agent_id && filters.contains(e.date))
            .cloned()
            .collect())
    }

    async fn policies_effective_in_range(
        &self,
        agent_id: &str,
        filters: &ReportFilters,
    ) -> Result<Vec<PolicyRecord>, StoreError> {
        Ok(self
            .policies
            .iter()
            .filter(|p| {
                p.agent_id == agent_id
                    && filters.contains(p.effective_date)
                    && Self::policy_matches_filters(p, filters)
            })
            .cloned()
            .collect())
    }

    async fn all_policies(&self, agent_id: &str) -> Result<Vec<PolicyRecord>, StoreError> {
        Ok(self
            .policies
            .iter()
            .filter(|p| p.agent_id == agent_id)
            .cloned()
            .collect())
    }

    async fn clients(&self, agent_id: &str) -> Result<Vec<ClientRecord>, StoreError> {
        Ok(self
            .clients
            .iter()
            .filter(|c| c.agent_id == agent_id)
            .cloned()
            .collect())
    }

    async fn client_values(&self, agent_id: &str) -> Result<Vec<ClientValueRow>, StoreError> {
        let names: HashMap<&str, &str> = self
            .clients
            .iter()
            .filter(|c| c.agent_id == agent_id)
            .map(|c| (c.id.as_str(), c.name.as_str()))
            .collect();

        struct Acc {
            total_premium: f64,
            active_premium: f64,
            active: usize,
            total: usize,
        }

        let mut by_client: HashMap<&str, Acc> = HashMap::new();
        for policy in self.policies.iter().filter(|p| p.agent_id == agent_id) {
            let acc = by_client.entry(policy.client_id.as_str()).or_insert(Acc {
                total_premium: 0.0,
                active_premium: 0.0,
                active: 0,
                total: 0,
            });
            acc.total += 1;
            acc.total_premium += policy.annual_premium;
            if policy.is_active() {
                acc.active += 1;
                acc.active_premium += policy.annual_premium;
            }
        }

        let mut rows: Vec<ClientValueRow> = by_client
            .into_iter()
            .map(|(client_id, acc)| ClientValueRow {
                client_id: client_id.to_string(),
                client_name: names.get(client_id).unwrap_or(&"Unknown").to_string(),
                total_premium: acc.total_premium,
                active_premium: acc.active_premium,
                active_policies: acc.active,
                total_policies: acc.total,
                tier: self.thresholds.tier_for_premium(acc.total_premium),
            })
            .collect();

        rows.sort_by(|a, b| {
            b.total_premium
                .partial_cmp(&a.total_premium)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        Ok(rows)
    }

    async fn policy_count(&self, agent_id: &str) -> Result<usize, StoreError> {
        Ok(self.policies.iter().filter(|p| p.agent_id == agent_id).count())
    }

    async fn client_count(&self, agent_id: &str) -> Result<usize, StoreError> {
        Ok(self.clients.iter().filter(|c| c.agent_id == agent_id).count())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::{CommissionStatus, PolicyStatus};
    use chrono::NaiveDate;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn policy(id: &str, client: &str, premium: f64, status: PolicyStatus) -> PolicyRecord {
        PolicyRecord {
            id: id.into(),
            agent_id: "a1".into(),
            policy_number: format!("PN-{}", id),
            client_id: client.into(),
            carrier_id: "car1".into(),
            carrier_name: "Acme Life".into(),
            product_id: "prod1".into(),
            product_name: "Term 20".into(),
            status,
            effective_date: date(2025, 3, 1),
            cancellation_date: None,
            annual_premium: premium,
        }
    }

    #[tokio::test]
    async fn test_commission_range_uses_payment_date_for_paid() {
        let commissions = vec![
            CommissionRecord {
                id: "c1".into(),
                agent_id: "a1".into(),
                policy_id: "p1".into(),
                amount: 100.0,
                status: CommissionStatus::Paid,
                payment_date: Some(date(2025, 6, 15)),
                created_at: date(2025, 4, 1),
                months_paid: 3,
                unearned_amount: 0.0,
                chargeback_amount: None,
            },
            CommissionRecord {
                id: "c2".into(),
                agent_id: "a1".into(),
                policy_id: "p1".into(),
                amount: 200.0,
                status: CommissionStatus::Pending,
                payment_date: None,
                created_at: date(2025, 4, 1),
                months_paid: 0,
                unearned_amount: 200.0,
                chargeback_amount: None,
            },
        ];
        let store = MemoryStore::new(commissions, vec![], vec![], vec![]);
        let filters = ReportFilters::for_range(date(2025, 6, 1), date(2025, 6, 30));

        let hits = store.commissions_in_range("a1", &filters).await.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].id, "c1");
    }

    #[tokio::test]
    async fn test_client_values_view_tiers_and_sorts() {
        let policies = vec![
            policy("p1", "cl1", 8_000.0, PolicyStatus::Active),
            policy("p2", "cl1", 4_000.0, PolicyStatus::Lapsed),
            policy("p3", "cl2", 1_000.0, PolicyStatus::Active),
        ];
        let clients = vec![
            ClientRecord {
                id: "cl1".into(),
                agent_id: "a1".into(),
                name: "Ada Byrne".into(),
                state: Some("TX".into()),
            },
            ClientRecord {
                id: "cl2".into(),
                agent_id: "a1".into(),
                name: "Ben Cho".into(),
                state: None,
            },
        ];
        let store = MemoryStore::new(vec![], vec![], policies, clients);
        let rows = store.client_values("a1").await.unwrap();

        assert_eq!(rows.len(), 2);
        // Sorted descending by total premium
        assert_eq!(rows[0].client_id, "cl1");
        assert_eq!(rows[0].tier, 'A'); // 12k total
        assert_eq!(rows[0].active_policies, 1);
        assert_eq!(rows[0].total_policies, 2);
        assert!((rows[0].active_premium - 8_000.0).abs() < 1e-9);
        assert_eq!(rows[1].tier, 'D');
    }

    #[tokio::test]
    async fn test_policies_narrowed_by_carrier_ids() {
        let mut other = policy("p9", "cl9", 500.0, PolicyStatus::Active);
        other.carrier_id = "car2".into();
        let store = MemoryStore::new(
            vec![],
            vec![],
            vec![policy("p1", "cl1", 1_000.0, PolicyStatus::Active), other],
            vec![],
        );
        let mut filters = ReportFilters::for_range(date(2025, 1, 1), date(2025, 12, 31));
        filters.carrier_ids = Some(vec!["car1".into()]);

        let hits = store.policies_effective_in_range("a1", &filters).await.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].id, "p1");
    }
}
