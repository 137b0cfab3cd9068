//! Report artifact types

use crate::insights::ActionableInsight;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// The six supported report types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ReportType {
    ExecutiveDashboard,
    CommissionPerformance,
    PolicyPerformance,
    ClientRelationship,
    FinancialHealth,
    PredictiveAnalytics,
}

impl ReportType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReportType::ExecutiveDashboard => "executive-dashboard",
            ReportType::CommissionPerformance => "commission-performance",
            ReportType::PolicyPerformance => "policy-performance",
            ReportType::ClientRelationship => "client-relationship",
            ReportType::FinancialHealth => "financial-health",
            ReportType::PredictiveAnalytics => "predictive-analytics",
        }
    }
}

/// Immutable date-bounded predicate shared across every sub-computation of one report
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportFilters {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub carrier_ids: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product_ids: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub states: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_ids: Option<Vec<String>>,
}

impl ReportFilters {
    /// Filter spanning only the date range
    pub fn for_range(start_date: NaiveDate, end_date: NaiveDate) -> Self {
        Self {
            start_date,
            end_date,
            carrier_ids: None,
            product_ids: None,
            states: None,
            client_ids: None,
        }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start_date && date <= self.end_date
    }

    /// "Jun 1, 2025 - Jun 30, 2025" style subtitle
    pub fn range_label(&self) -> String {
        format!(
            "{} - {}",
            self.start_date.format("%b %-d, %Y"),
            self.end_date.format("%b %-d, %Y")
        )
    }
}

/// How a metric value should be rendered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MetricFormat {
    Currency,
    Percent,
    Number,
    Text,
}

/// Direction indicator attached to some metrics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MetricTrend {
    Up,
    Down,
    Neutral,
}

/// A display-ready scalar produced by the metric aggregator
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Metric {
    pub label: String,
    pub value: String,
    pub format: MetricFormat,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trend: Option<MetricTrend>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actual: Option<f64>,
}

impl Metric {
    pub fn new(label: impl Into<String>, value: impl Into<String>, format: MetricFormat) -> Self {
        Self {
            label: label.into(),
            value: value.into(),
            format,
            description: None,
            trend: None,
            target: None,
            actual: None,
        }
    }

    pub fn with_trend(mut self, trend: MetricTrend) -> Self {
        self.trend = Some(trend);
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// Labelled series for chart rendering
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChartData {
    pub labels: Vec<String>,
    pub datasets: Vec<ChartDataset>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChartDataset {
    pub label: String,
    pub data: Vec<f64>,
}

/// Header/rows table for report sections
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableData {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

/// A named compartment of a report
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportSection {
    pub id: String,
    pub title: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metrics: Option<Vec<Metric>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub insights: Option<Vec<ActionableInsight>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chart_data: Option<ChartData>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub table_data: Option<TableData>,
}

impl ReportSection {
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            description: None,
            metrics: None,
            insights: None,
            chart_data: None,
            table_data: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_metrics(mut self, metrics: Vec<Metric>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    pub fn with_insights(mut self, insights: Vec<ActionableInsight>) -> Self {
        self.insights = Some(insights);
        self
    }

    pub fn with_table(mut self, table: TableData) -> Self {
        self.table_data = Some(table);
        self
    }
}

/// Top-level report summary
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportSummary {
    /// 0-100 composite health score
    pub health_score: u8,
    pub key_metrics: Vec<Metric>,
    pub top_insights: Vec<ActionableInsight>,
}

/// The finished report artifact; immutable once returned
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Report {
    pub id: String,
    pub report_type: ReportType,
    pub title: String,
    pub subtitle: String,

    /// Wall-clock stamp at assembly time
    pub generated_at: DateTime<Utc>,

    pub filters: ReportFilters,
    pub summary: ReportSummary,
    pub sections: Vec<ReportSection>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_type_labels() {
        assert_eq!(ReportType::ExecutiveDashboard.as_str(), "executive-dashboard");
        assert_eq!(ReportType::PredictiveAnalytics.as_str(), "predictive-analytics");
    }

    #[test]
    fn test_filters_contains_is_inclusive() {
        let start = NaiveDate::from_ymd_opt(2025, 6, 1).unwrap();
        let end = NaiveDate::from_ymd_opt(2025, 6, 30).unwrap();
        let filters = ReportFilters::for_range(start, end);
        assert!(filters.contains(start));
        assert!(filters.contains(end));
        assert!(!filters.contains(end + chrono::Duration::days(1)));
    }

    #[test]
    fn test_report_type_serializes_kebab_case() {
        let json = serde_json::to_string(&ReportType::CommissionPerformance).unwrap();
        assert_eq!(json, "\"commission-performance\"");
    }
}
