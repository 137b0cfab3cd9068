//! Report assembly: types, formatting, aggregation, scoring, drill-down

mod assembler;
mod drilldown;
pub mod format;
mod health;
mod metrics;
mod types;

pub use assembler::{ReportGenerator, ReportRequest};
pub use drilldown::{
    resolve_drill_down, AgingBucket, ColumnFormat, ColumnSpec, DrillDownContext, DrillDownData,
    DrillDownRecord, DrillDownSummary, RecordKind,
};
pub use health::{health_score, health_score_for};
pub use metrics::MetricTotals;
pub use types::{
    ChartData, ChartDataset, Metric, MetricFormat, MetricTrend, Report, ReportFilters,
    ReportSection, ReportSummary, ReportType, TableData,
};
