//! Commission Analytics - report engine for commission-based books of business
//!
//! This library provides:
//! - Six-type report generation (executive, commission, policy, client, financial, predictive)
//! - Revenue forecasting (OLS trend with bounded confidence)
//! - Rule-based actionable insight generation with priority merging
//! - Composite health scoring and display-ready metric aggregation
//! - Drill-down resolution for report elements

pub mod error;
pub mod forecast;
pub mod insights;
pub mod records;
pub mod report;
pub mod store;
pub mod thresholds;

// Re-export commonly used types
pub use error::{ReportError, StoreError};
pub use forecast::{forecast_paid_commissions, ForecastResult, ForecastTrend};
pub use insights::{generate_insights, ActionableInsight, InsightContext};
pub use report::{
    resolve_drill_down, DrillDownContext, Report, ReportFilters, ReportGenerator, ReportRequest,
    ReportType,
};
pub use store::{MemoryStore, RecordStore};
pub use thresholds::Thresholds;
