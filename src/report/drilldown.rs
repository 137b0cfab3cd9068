//! Drill-down resolution for report elements
//!
//! When a consumer clicks through a report table row, the matching context is
//! resolved here into the underlying records plus a column schema the
//! renderer can lay out without knowing the record shape.

use super::types::ReportFilters;
use crate::error::{ReportError, StoreError};
use crate::records::{ClientRecord, CommissionRecord, PolicyRecord};
use crate::store::RecordStore;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::collections::HashMap;

/// Commission aging buckets keyed by months paid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AgingBucket {
    #[serde(rename = "0-3 months")]
    ZeroToThree,
    #[serde(rename = "3-6 months")]
    ThreeToSix,
    #[serde(rename = "6-9 months")]
    SixToNine,
    #[serde(rename = "9-12 months")]
    NineToTwelve,
    #[serde(rename = "12+ months")]
    TwelvePlus,
}

impl AgingBucket {
    pub fn label(&self) -> &'static str {
        match self {
            AgingBucket::ZeroToThree => "0-3 months",
            AgingBucket::ThreeToSix => "3-6 months",
            AgingBucket::SixToNine => "6-9 months",
            AgingBucket::NineToTwelve => "9-12 months",
            AgingBucket::TwelvePlus => "12+ months",
        }
    }

    /// Half-open months-paid range [min, max)
    pub fn months_range(&self) -> (u32, u32) {
        match self {
            AgingBucket::ZeroToThree => (0, 3),
            AgingBucket::ThreeToSix => (3, 6),
            AgingBucket::SixToNine => (6, 9),
            AgingBucket::NineToTwelve => (9, 12),
            AgingBucket::TwelvePlus => (12, 999),
        }
    }

    /// Risk label keyed on the bucket's lower bound
    pub fn risk_level(&self) -> &'static str {
        let (min, _) = self.months_range();
        if min < 6 {
            "High"
        } else if min < 9 {
            "Medium"
        } else {
            "Low"
        }
    }
}

/// What the consumer clicked on, with the parent report's filters
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum DrillDownContext {
    #[serde(rename = "commission-aging-bucket")]
    AgingBucket {
        bucket: AgingBucket,
        filters: ReportFilters,
    },
    #[serde(rename = "client-tier")]
    ClientTier { tier: char, filters: ReportFilters },
    #[serde(rename = "carrier")]
    Carrier {
        carrier_id: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        carrier_name: Option<String>,
        filters: ReportFilters,
    },
    #[serde(rename = "product")]
    Product {
        product_id: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        product_name: Option<String>,
        filters: ReportFilters,
    },
}

/// Which entity a drill-down record came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordKind {
    Commission,
    Policy,
    Client,
}

/// One normalized row of drill-down output
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DrillDownRecord {
    pub id: String,
    pub kind: RecordKind,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<NaiveDate>,

    /// The column the branch sorts and totals on; its meaning is per-branch
    /// (unearned exposure, commission total, premium)
    pub amount: f64,

    pub status: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub policy_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub carrier_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub months_paid: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub annual_premium: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tier: Option<char>,
}

/// How a drill-down column should be rendered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnFormat {
    Text,
    Number,
    Currency,
    Date,
}

/// Column schema entry for the drill-down table
#[derive(Debug, Clone, Serialize)]
pub struct ColumnSpec {
    pub key: &'static str,
    pub label: &'static str,
    pub format: ColumnFormat,
}

impl ColumnSpec {
    fn new(key: &'static str, label: &'static str, format: ColumnFormat) -> Self {
        Self { key, label, format }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DrillDownSummary {
    pub total_records: usize,
    pub total_amount: f64,
    pub avg_amount: f64,
    pub additional_metrics: HashMap<String, Value>,
}

impl DrillDownSummary {
    fn over(records: &[DrillDownRecord], additional_metrics: HashMap<String, Value>) -> Self {
        let total_amount: f64 = records.iter().map(|r| r.amount).sum();
        let avg_amount = if records.is_empty() {
            0.0
        } else {
            total_amount / records.len() as f64
        };
        Self {
            total_records: records.len(),
            total_amount,
            avg_amount,
            additional_metrics,
        }
    }
}

/// Resolved drill-down payload: summary, rows, and the column schema
#[derive(Debug, Clone, Serialize)]
pub struct DrillDownData {
    pub summary: DrillDownSummary,
    pub records: Vec<DrillDownRecord>,
    pub columns: Vec<ColumnSpec>,
}

/// Resolve a drill-down context into its records
pub async fn resolve_drill_down(
    store: &dyn RecordStore,
    agent_id: &str,
    context: &DrillDownContext,
) -> Result<DrillDownData, ReportError> {
    match context {
        DrillDownContext::AgingBucket { bucket, filters } => {
            aging_bucket_records(store, agent_id, *bucket, filters).await
        }
        DrillDownContext::ClientTier { tier, filters: _ } => {
            client_tier_records(store, agent_id, *tier).await
        }
        DrillDownContext::Carrier {
            carrier_id,
            carrier_name,
            filters,
        } => carrier_records(store, agent_id, carrier_id, carrier_name.as_deref(), filters).await,
        DrillDownContext::Product {
            product_id,
            product_name,
            filters,
        } => product_records(store, agent_id, product_id, product_name.as_deref(), filters).await,
    }
}

struct PolicyLookup<'a> {
    policies: HashMap<&'a str, &'a PolicyRecord>,
    clients: HashMap<&'a str, &'a str>,
}

impl<'a> PolicyLookup<'a> {
    fn build(policies: &'a [PolicyRecord], clients: &'a [ClientRecord]) -> Self {
        Self {
            policies: policies.iter().map(|p| (p.id.as_str(), p)).collect(),
            clients: clients
                .iter()
                .map(|c| (c.id.as_str(), c.name.as_str()))
                .collect(),
        }
    }

    fn policy(&self, id: &str) -> Option<&'a PolicyRecord> {
        self.policies.get(id).copied()
    }

    fn client_name(&self, id: &str) -> String {
        self.clients.get(id).copied().unwrap_or("Unknown").to_string()
    }
}

async fn aging_bucket_records(
    store: &dyn RecordStore,
    agent_id: &str,
    bucket: AgingBucket,
    filters: &ReportFilters,
) -> Result<DrillDownData, ReportError> {
    let (commissions, policies, clients) = tokio::try_join!(
        fetch(store.all_commissions(agent_id), "commissions"),
        fetch(store.all_policies(agent_id), "policies"),
        fetch(store.clients(agent_id), "clients"),
    )?;
    let lookup = PolicyLookup::build(&policies, &clients);

    let (min, max) = bucket.months_range();
    let in_bucket = |c: &&CommissionRecord| {
        if c.months_paid < min || c.months_paid >= max || !filters.contains(c.created_at) {
            return false;
        }
        if let Some(ref ids) = filters.carrier_ids {
            match lookup.policy(&c.policy_id) {
                Some(p) => ids.contains(&p.carrier_id),
                None => false,
            }
        } else {
            true
        }
    };

    let mut records: Vec<DrillDownRecord> = commissions
        .iter()
        .filter(in_bucket)
        .map(|c| {
            let policy = lookup.policy(&c.policy_id);
            DrillDownRecord {
                id: c.id.clone(),
                kind: RecordKind::Commission,
                date: Some(c.created_at),
                amount: c.unearned_amount,
                status: status_label(&c.status),
                policy_number: policy.map(|p| p.policy_number.clone()),
                client_name: policy.map(|p| lookup.client_name(&p.client_id)),
                carrier_name: policy.map(|p| p.carrier_name.clone()),
                product_name: policy.map(|p| p.product_name.clone()),
                months_paid: Some(c.months_paid),
                annual_premium: policy.map(|p| p.annual_premium),
                tier: None,
            }
        })
        .collect();
    records.sort_by(|a, b| {
        b.amount
            .partial_cmp(&a.amount)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    let metrics = HashMap::from([
        ("bucket".to_string(), json!(bucket.label())),
        ("risk_level".to_string(), json!(bucket.risk_level())),
    ]);

    Ok(DrillDownData {
        summary: DrillDownSummary::over(&records, metrics),
        records,
        columns: vec![
            ColumnSpec::new("policy_number", "Policy", ColumnFormat::Text),
            ColumnSpec::new("client_name", "Client", ColumnFormat::Text),
            ColumnSpec::new("carrier_name", "Carrier", ColumnFormat::Text),
            ColumnSpec::new("months_paid", "Months Paid", ColumnFormat::Number),
            ColumnSpec::new("amount", "At Risk", ColumnFormat::Currency),
            ColumnSpec::new("status", "Status", ColumnFormat::Text),
        ],
    })
}

async fn client_tier_records(
    store: &dyn RecordStore,
    agent_id: &str,
    tier: char,
) -> Result<DrillDownData, ReportError> {
    let rows = fetch(store.client_values(agent_id), "client values").await?;

    // The view is already sorted descending by total premium
    let records: Vec<DrillDownRecord> = rows
        .iter()
        .filter(|r| r.tier == tier)
        .map(|r| DrillDownRecord {
            id: r.client_id.clone(),
            kind: RecordKind::Client,
            date: None,
            amount: r.total_premium,
            status: if r.active_policies > 0 {
                "Active".to_string()
            } else {
                "Inactive".to_string()
            },
            policy_number: None,
            client_name: Some(r.client_name.clone()),
            carrier_name: None,
            product_name: None,
            months_paid: None,
            annual_premium: Some(r.total_premium),
            tier: Some(r.tier),
        })
        .collect();

    let metrics = HashMap::from([
        ("tier".to_string(), json!(tier.to_string())),
        ("tier_description".to_string(), json!(tier_description(tier))),
    ]);

    Ok(DrillDownData {
        summary: DrillDownSummary::over(&records, metrics),
        records,
        columns: vec![
            ColumnSpec::new("client_name", "Client", ColumnFormat::Text),
            ColumnSpec::new("amount", "Total Premium", ColumnFormat::Currency),
            ColumnSpec::new("status", "Status", ColumnFormat::Text),
            ColumnSpec::new("tier", "Tier", ColumnFormat::Text),
        ],
    })
}

async fn carrier_records(
    store: &dyn RecordStore,
    agent_id: &str,
    carrier_id: &str,
    carrier_name: Option<&str>,
    filters: &ReportFilters,
) -> Result<DrillDownData, ReportError> {
    let (policies, commissions, clients) = tokio::try_join!(
        fetch(store.all_policies(agent_id), "policies"),
        fetch(store.all_commissions(agent_id), "commissions"),
        fetch(store.clients(agent_id), "clients"),
    )?;
    let lookup = PolicyLookup::build(&policies, &clients);

    let mut commission_totals: HashMap<&str, f64> = HashMap::new();
    for c in &commissions {
        *commission_totals.entry(c.policy_id.as_str()).or_insert(0.0) += c.amount;
    }

    let mut records: Vec<DrillDownRecord> = policies
        .iter()
        .filter(|p| p.carrier_id == carrier_id && filters.contains(p.effective_date))
        .map(|p| DrillDownRecord {
            id: p.id.clone(),
            kind: RecordKind::Policy,
            date: Some(p.effective_date),
            amount: commission_totals.get(p.id.as_str()).copied().unwrap_or(0.0),
            status: policy_status_label(p),
            policy_number: Some(p.policy_number.clone()),
            client_name: Some(lookup.client_name(&p.client_id)),
            carrier_name: Some(p.carrier_name.clone()),
            product_name: Some(p.product_name.clone()),
            months_paid: None,
            annual_premium: Some(p.annual_premium),
            tier: None,
        })
        .collect();
    records.sort_by(|a, b| {
        b.annual_premium
            .partial_cmp(&a.annual_premium)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    let total_premium: f64 = records.iter().filter_map(|r| r.annual_premium).sum();
    let display_name = carrier_name
        .map(str::to_string)
        .or_else(|| records.first().and_then(|r| r.carrier_name.clone()))
        .unwrap_or_else(|| "Carrier".to_string());
    let metrics = HashMap::from([
        ("total_premium".to_string(), json!(total_premium)),
        ("carrier_name".to_string(), json!(display_name)),
    ]);

    Ok(DrillDownData {
        summary: DrillDownSummary::over(&records, metrics),
        records,
        columns: vec![
            ColumnSpec::new("policy_number", "Policy", ColumnFormat::Text),
            ColumnSpec::new("client_name", "Client", ColumnFormat::Text),
            ColumnSpec::new("product_name", "Product", ColumnFormat::Text),
            ColumnSpec::new("date", "Effective Date", ColumnFormat::Date),
            ColumnSpec::new("annual_premium", "Premium", ColumnFormat::Currency),
            ColumnSpec::new("amount", "Commission", ColumnFormat::Currency),
            ColumnSpec::new("status", "Status", ColumnFormat::Text),
        ],
    })
}

async fn product_records(
    store: &dyn RecordStore,
    agent_id: &str,
    product_id: &str,
    product_name: Option<&str>,
    filters: &ReportFilters,
) -> Result<DrillDownData, ReportError> {
    let (policies, clients) = tokio::try_join!(
        fetch(store.all_policies(agent_id), "policies"),
        fetch(store.clients(agent_id), "clients"),
    )?;
    let lookup = PolicyLookup::build(&policies, &clients);

    let mut records: Vec<DrillDownRecord> = policies
        .iter()
        .filter(|p| p.product_id == product_id && filters.contains(p.effective_date))
        .map(|p| DrillDownRecord {
            id: p.id.clone(),
            kind: RecordKind::Policy,
            date: Some(p.effective_date),
            amount: p.annual_premium,
            status: policy_status_label(p),
            policy_number: Some(p.policy_number.clone()),
            client_name: Some(lookup.client_name(&p.client_id)),
            carrier_name: Some(p.carrier_name.clone()),
            product_name: Some(p.product_name.clone()),
            months_paid: None,
            annual_premium: Some(p.annual_premium),
            tier: None,
        })
        .collect();
    records.sort_by(|a, b| {
        b.amount
            .partial_cmp(&a.amount)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    let display_name = product_name
        .map(str::to_string)
        .or_else(|| records.first().and_then(|r| r.product_name.clone()))
        .unwrap_or_else(|| "Product".to_string());
    let metrics = HashMap::from([("product_name".to_string(), json!(display_name))]);

    Ok(DrillDownData {
        summary: DrillDownSummary::over(&records, metrics),
        records,
        columns: vec![
            ColumnSpec::new("policy_number", "Policy", ColumnFormat::Text),
            ColumnSpec::new("client_name", "Client", ColumnFormat::Text),
            ColumnSpec::new("carrier_name", "Carrier", ColumnFormat::Text),
            ColumnSpec::new("date", "Effective Date", ColumnFormat::Date),
            ColumnSpec::new("annual_premium", "Premium", ColumnFormat::Currency),
            ColumnSpec::new("status", "Status", ColumnFormat::Text),
        ],
    })
}

async fn fetch<T>(
    fut: impl std::future::Future<Output = Result<T, StoreError>>,
    resource: &'static str,
) -> Result<T, ReportError> {
    fut.await.map_err(|e| ReportError::fetch(resource, e))
}

fn status_label(status: &crate::records::CommissionStatus) -> String {
    use crate::records::CommissionStatus;
    match status {
        CommissionStatus::Pending => "pending",
        CommissionStatus::Paid => "paid",
        CommissionStatus::Earned => "earned",
        CommissionStatus::ChargedBack => "charged_back",
    }
    .to_string()
}

fn policy_status_label(policy: &PolicyRecord) -> String {
    use crate::records::PolicyStatus;
    match policy.status {
        PolicyStatus::Pending => "pending",
        PolicyStatus::Active => "active",
        PolicyStatus::Lapsed => "lapsed",
        PolicyStatus::Cancelled => "cancelled",
    }
    .to_string()
}

fn tier_description(tier: char) -> &'static str {
    match tier {
        'A' => "High-value clients ($10K+ premium)",
        'B' => "Growth clients ($5K-$10K premium)",
        'C' => "Standard clients ($2K-$5K premium)",
        'D' => "Entry-level clients (<$2K premium)",
        _ => "Unknown tier",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::insights::test_fixtures::{client, commission, date, policy, range_filters};
    use crate::records::PolicyStatus;
    use crate::store::MemoryStore;

    #[test]
    fn test_bucket_risk_levels() {
        assert_eq!(AgingBucket::ZeroToThree.risk_level(), "High");
        assert_eq!(AgingBucket::ThreeToSix.risk_level(), "High");
        assert_eq!(AgingBucket::SixToNine.risk_level(), "Medium");
        // The 9-12 bucket reads as Low because only the lower bound is tested
        assert_eq!(AgingBucket::NineToTwelve.risk_level(), "Low");
        assert_eq!(AgingBucket::TwelvePlus.risk_level(), "Low");
    }

    #[test]
    fn test_context_json_tags() {
        let ctx = DrillDownContext::AgingBucket {
            bucket: AgingBucket::ZeroToThree,
            filters: range_filters(),
        };
        let json = serde_json::to_value(&ctx).unwrap();
        assert_eq!(json["type"], "commission-aging-bucket");
        assert_eq!(json["bucket"], "0-3 months");
    }

    #[tokio::test]
    async fn test_aging_bucket_selects_half_open_range() {
        let policies = vec![policy("p1", "cl1", 2_400.0, PolicyStatus::Active)];
        let clients = vec![client("cl1", "Ada Byrne")];
        let commissions = vec![
            commission("c0", "p1", 100.0, 0, 100.0),
            commission("c2", "p1", 100.0, 2, 60.0),
            commission("c3", "p1", 100.0, 3, 40.0), // first month of the next bucket
        ];
        let store = MemoryStore::new(commissions, vec![], policies, clients);

        let ctx = DrillDownContext::AgingBucket {
            bucket: AgingBucket::ZeroToThree,
            filters: range_filters(),
        };
        let data = resolve_drill_down(&store, "a1", &ctx).await.unwrap();

        assert_eq!(data.summary.total_records, 2);
        // Sorted descending by unearned exposure
        assert_eq!(data.records[0].id, "c0");
        assert!((data.summary.total_amount - 160.0).abs() < 1e-9);
        assert_eq!(data.records[0].client_name.as_deref(), Some("Ada Byrne"));
        assert_eq!(data.summary.additional_metrics["risk_level"], "High");
    }

    #[tokio::test]
    async fn test_nine_to_twelve_bucket_reports_low_risk() {
        let store = MemoryStore::new(
            vec![commission("c1", "p1", 100.0, 10, 10.0)],
            vec![],
            vec![policy("p1", "cl1", 2_400.0, PolicyStatus::Active)],
            vec![client("cl1", "Ada Byrne")],
        );
        let ctx = DrillDownContext::AgingBucket {
            bucket: AgingBucket::NineToTwelve,
            filters: range_filters(),
        };
        let data = resolve_drill_down(&store, "a1", &ctx).await.unwrap();
        assert_eq!(data.summary.additional_metrics["risk_level"], "Low");
        assert_eq!(data.summary.total_records, 1);
    }

    #[tokio::test]
    async fn test_client_tier_filters_the_value_view() {
        let policies = vec![
            policy("p1", "cl1", 12_000.0, PolicyStatus::Active),
            policy("p2", "cl2", 500.0, PolicyStatus::Active),
        ];
        let clients = vec![client("cl1", "Ada Byrne"), client("cl2", "Ben Cho")];
        let store = MemoryStore::new(vec![], vec![], policies, clients);

        let ctx = DrillDownContext::ClientTier {
            tier: 'A',
            filters: range_filters(),
        };
        let data = resolve_drill_down(&store, "a1", &ctx).await.unwrap();

        assert_eq!(data.summary.total_records, 1);
        assert_eq!(data.records[0].client_name.as_deref(), Some("Ada Byrne"));
        assert_eq!(data.records[0].tier, Some('A'));
        assert_eq!(data.records[0].status, "Active");
    }

    #[tokio::test]
    async fn test_carrier_drill_down_totals_commissions_per_policy() {
        let policies = vec![policy("p1", "cl1", 2_400.0, PolicyStatus::Active)];
        let clients = vec![client("cl1", "Ada Byrne")];
        let commissions = vec![
            commission("c1", "p1", 400.0, 1, 300.0),
            commission("c2", "p1", 200.0, 2, 100.0),
        ];
        let store = MemoryStore::new(commissions, vec![], policies, clients);

        let ctx = DrillDownContext::Carrier {
            carrier_id: "car1".into(),
            carrier_name: Some("Acme Life".into()),
            filters: range_filters(),
        };
        let data = resolve_drill_down(&store, "a1", &ctx).await.unwrap();

        assert_eq!(data.summary.total_records, 1);
        assert!((data.records[0].amount - 600.0).abs() < 1e-9);
        assert_eq!(data.summary.additional_metrics["carrier_name"], "Acme Life");
        assert_eq!(data.summary.additional_metrics["total_premium"], 2_400.0);
    }

    #[tokio::test]
    async fn test_product_drill_down_respects_date_range() {
        let mut outside = policy("p2", "cl2", 1_200.0, PolicyStatus::Active);
        outside.effective_date = date(2024, 1, 1);
        let store = MemoryStore::new(
            vec![],
            vec![],
            vec![policy("p1", "cl1", 2_400.0, PolicyStatus::Active), outside],
            vec![client("cl1", "Ada Byrne"), client("cl2", "Ben Cho")],
        );

        let ctx = DrillDownContext::Product {
            product_id: "prod1".into(),
            product_name: None,
            filters: range_filters(),
        };
        let data = resolve_drill_down(&store, "a1", &ctx).await.unwrap();

        assert_eq!(data.summary.total_records, 1);
        assert_eq!(data.records[0].id, "p1");
        assert_eq!(data.summary.additional_metrics["product_name"], "Term 20");
    }
}
