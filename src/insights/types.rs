//! Actionable insight types shared by the generators and the merger

use serde::{Deserialize, Serialize};

/// Urgency of an insight
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InsightSeverity {
    Critical,
    High,
    Medium,
    Low,
    Info,
}

impl InsightSeverity {
    /// Rank used as the deterministic tie-break on equal priority
    pub fn rank(&self) -> u8 {
        match self {
            InsightSeverity::Critical => 4,
            InsightSeverity::High => 3,
            InsightSeverity::Medium => 2,
            InsightSeverity::Low => 1,
            InsightSeverity::Info => 0,
        }
    }
}

/// Subject area of an insight
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InsightCategory {
    Revenue,
    Expense,
    Retention,
    Chargeback,
    Opportunity,
    Risk,
    Performance,
}

/// Weak id references to the records an insight is about
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AffectedEntities {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub policies: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub clients: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub commissions: Vec<String>,
}

impl AffectedEntities {
    pub fn is_empty(&self) -> bool {
        self.policies.is_empty() && self.clients.is_empty() && self.commissions.is_empty()
    }
}

/// A classified, prioritized recommendation produced by one generator
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionableInsight {
    pub id: String,
    pub severity: InsightSeverity,
    pub category: InsightCategory,
    pub title: String,
    pub description: String,

    /// Quantified impact, e.g. "$5,000.00 at risk"
    pub impact: String,

    /// Ordered, specific next steps
    pub recommended_actions: Vec<String>,

    /// Fixed 1-10 priority stamped by the generator
    pub priority: u8,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub affected_entities: Option<AffectedEntities>,
}
