//! Report assembly
//!
//! One generator instance serves all six report types. Each routine fans out
//! its fetches, joins once, then composes sections from pure helpers; a
//! failed fetch aborts the whole report so consumers never see a partial
//! artifact. The entire request runs under a single deadline.

use super::drilldown::AgingBucket;
use super::format::{format_currency, format_number, format_percent};
use super::health::{health_score, health_score_for};
use super::metrics::MetricTotals;
use super::types::{
    Metric, MetricFormat, MetricTrend, Report, ReportFilters, ReportSection, ReportSummary,
    ReportType, TableData,
};
use crate::error::{ReportError, StoreError};
use crate::forecast::{forecast_paid_commissions, ForecastTrend};
use crate::insights::{
    generate_insights, ActionableInsight, InsightCategory, InsightContext, InsightSeverity,
};
use crate::records::{month_index, ClientValueRow, CommissionRecord, CommissionStatus, PolicyRecord};
use crate::store::RecordStore;
use crate::thresholds::Thresholds;
use chrono::{DateTime, NaiveDate, Utc};
use log::debug;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// One report request
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct ReportRequest {
    pub agent_id: String,
    pub report_type: ReportType,
    pub filters: ReportFilters,
}

/// Assembles reports from the record store
pub struct ReportGenerator {
    store: Arc<dyn RecordStore>,
    thresholds: Thresholds,
    timeout: Duration,
    /// Fixed "today" for cohort and forecast math; None means wall clock
    as_of: Option<NaiveDate>,
}

impl ReportGenerator {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self {
            store,
            thresholds: Thresholds::default_production(),
            timeout: DEFAULT_TIMEOUT,
            as_of: None,
        }
    }

    pub fn with_thresholds(mut self, thresholds: Thresholds) -> Self {
        self.thresholds = thresholds;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Pin the reference date for age-based computations
    pub fn with_as_of(mut self, as_of: NaiveDate) -> Self {
        self.as_of = Some(as_of);
        self
    }

    /// Generate one report; the whole request runs under the deadline
    pub async fn generate(&self, request: &ReportRequest) -> Result<Report, ReportError> {
        debug!(
            "generating {} report for agent {} ({})",
            request.report_type.as_str(),
            request.agent_id,
            request.filters.range_label()
        );
        match tokio::time::timeout(self.timeout, self.dispatch(request)).await {
            Ok(report) => report,
            Err(_) => Err(ReportError::Timeout(self.timeout)),
        }
    }

    async fn dispatch(&self, request: &ReportRequest) -> Result<Report, ReportError> {
        match request.report_type {
            ReportType::ExecutiveDashboard => self.executive_dashboard(request).await,
            ReportType::CommissionPerformance => self.commission_report(request).await,
            ReportType::PolicyPerformance => self.policy_report(request).await,
            ReportType::ClientRelationship => self.client_report(request).await,
            ReportType::FinancialHealth => self.financial_report(request).await,
            ReportType::PredictiveAnalytics => self.predictive_report(request).await,
        }
    }

    fn as_of(&self) -> NaiveDate {
        self.as_of.unwrap_or_else(|| Utc::now().date_naive())
    }

    fn insight_ctx<'a>(&'a self, request: &'a ReportRequest, as_of: NaiveDate) -> InsightContext<'a> {
        InsightContext {
            agent_id: &request.agent_id,
            filters: &request.filters,
            as_of,
            thresholds: &self.thresholds,
        }
    }

    async fn insights(
        &self,
        request: &ReportRequest,
        as_of: NaiveDate,
    ) -> Result<Vec<ActionableInsight>, ReportError> {
        generate_insights(self.store.as_ref(), &self.insight_ctx(request, as_of))
            .await
            .map_err(|e| ReportError::fetch("insights", e))
    }

    fn finish(
        &self,
        request: &ReportRequest,
        prefix: &str,
        title: &str,
        subtitle: String,
        summary: ReportSummary,
        sections: Vec<ReportSection>,
    ) -> Report {
        let generated_at: DateTime<Utc> = Utc::now();
        Report {
            id: format!("{}-{}", prefix, generated_at.timestamp_millis()),
            report_type: request.report_type,
            title: title.to_string(),
            subtitle,
            generated_at,
            filters: request.filters.clone(),
            summary,
            sections,
        }
    }

    /// High-level snapshot: six key numbers and the top action items
    async fn executive_dashboard(&self, request: &ReportRequest) -> Result<Report, ReportError> {
        let as_of = self.as_of();
        let (commissions, expenses, policies, insights) = tokio::try_join!(
            fetch(
                self.store
                    .commissions_in_range(&request.agent_id, &request.filters),
                "commissions",
            ),
            fetch(
                self.store
                    .expenses_in_range(&request.agent_id, &request.filters),
                "expenses",
            ),
            fetch(
                self.store
                    .policies_effective_in_range(&request.agent_id, &request.filters),
                "policies",
            ),
            self.insights(request, as_of),
        )?;

        let totals = MetricTotals::from_records(&commissions, &expenses, &policies);
        let summary = ReportSummary {
            health_score: health_score_for(&totals, &insights, &self.thresholds.health),
            key_metrics: totals.key_metrics(),
            top_insights: insights.iter().take(3).cloned().collect(),
        };

        let sections = vec![ReportSection::new("key-insights", "Action Items")
            .with_description("Top priorities requiring attention")
            .with_insights(insights.into_iter().take(3).collect())];

        Ok(self.finish(
            request,
            "exec",
            "Executive Summary",
            request.filters.range_label(),
            summary,
            sections,
        ))
    }

    /// Deep dive: chargeback exposure by policy age and carrier profitability
    async fn commission_report(&self, request: &ReportRequest) -> Result<Report, ReportError> {
        let as_of = self.as_of();
        let policy_count = fetch(
            self.store.policy_count(&request.agent_id),
            "policy count",
        )
        .await?;

        if policy_count == 0 {
            let insights = self.insights(request, as_of).await?;
            let summary = ReportSummary {
                health_score: health_score(0.0, 0, 0, &insights, &self.thresholds.health),
                key_metrics: vec![],
                top_insights: top_by_category(&insights, InsightCategory::Chargeback, 2),
            };
            return Ok(self.finish(
                request,
                "comm",
                "Commission Risk Analysis",
                request.filters.range_label(),
                summary,
                vec![no_data_section(
                    "You have no policies in the system. Add policies to see commission risk analysis.",
                )],
            ));
        }

        let (commissions, all_commissions, policies, insights) = tokio::try_join!(
            fetch(
                self.store
                    .commissions_in_range(&request.agent_id, &request.filters),
                "commissions",
            ),
            fetch(self.store.all_commissions(&request.agent_id), "commissions"),
            fetch(self.store.all_policies(&request.agent_id), "policies"),
            self.insights(request, as_of),
        )?;

        let carriers = carrier_performance(&commissions, &policies);
        let aging = aging_summary(&all_commissions);

        let total_at_risk: f64 = aging.iter().map(|b| b.at_risk).sum();
        let total_earned: f64 = all_commissions
            .iter()
            .filter(|c| c.status == CommissionStatus::Earned)
            .map(|c| c.amount)
            .sum();
        let critical_at_risk = aging
            .iter()
            .find(|b| b.bucket == AgingBucket::ZeroToThree)
            .map(|b| b.at_risk)
            .unwrap_or(0.0);
        let chargeback_rate = chargeback_rate(&all_commissions);

        let risk_metrics = vec![
            Metric::new(
                "Total At-Risk",
                format_currency(total_at_risk),
                MetricFormat::Currency,
            ),
            Metric::new(
                "Total Earned (Safe)",
                format_currency(total_earned),
                MetricFormat::Currency,
            ),
            Metric::new(
                "Critical Risk",
                format_currency(critical_at_risk),
                MetricFormat::Currency,
            )
            .with_description("Policies < 3 months"),
            Metric::new(
                "Chargeback Rate",
                format_percent(chargeback_rate),
                MetricFormat::Percent,
            ),
        ];

        let mut sections = vec![ReportSection::new("risk-summary", "Chargeback Risk Summary")
            .with_metrics(risk_metrics.clone())];

        let aging_rows: Vec<Vec<String>> = aging
            .iter()
            .filter(|b| b.count > 0)
            .map(|b| {
                vec![
                    b.bucket.label().to_string(),
                    format_number(b.count as f64),
                    format_currency(b.at_risk),
                    b.bucket.risk_level().to_string(),
                ]
            })
            .collect();
        if !aging_rows.is_empty() {
            sections.push(
                ReportSection::new("commission-aging", "Risk by Policy Age")
                    .with_description("Younger policies = higher chargeback risk")
                    .with_table(TableData {
                        headers: string_headers(&["Age Bucket", "Count", "At-Risk Amount", "Risk Level"]),
                        rows: aging_rows,
                    }),
            );
        }

        if !carriers.is_empty() {
            let rows: Vec<Vec<String>> = carriers
                .iter()
                .map(|c| {
                    vec![
                        c.carrier_name.clone(),
                        format_currency(c.total_commission),
                        format_percent(c.persistency_rate),
                        format_number(c.total_policies as f64),
                    ]
                })
                .collect();
            sections.push(
                ReportSection::new("carrier-profitability", "Carrier Profitability")
                    .with_description("Commission and persistency by carrier")
                    .with_table(TableData {
                        headers: string_headers(&["Carrier", "Commission", "Persistency", "Policies"]),
                        rows,
                    }),
            );
        }

        let total_policies: usize = carriers.iter().map(|c| c.total_policies).sum();
        let active_policies: usize = carriers.iter().map(|c| c.active_policies).sum();
        let summary = ReportSummary {
            health_score: health_score(
                0.0,
                active_policies,
                total_policies,
                &insights,
                &self.thresholds.health,
            ),
            key_metrics: risk_metrics,
            top_insights: top_by_category(&insights, InsightCategory::Chargeback, 2),
        };

        Ok(self.finish(
            request,
            "comm",
            "Commission Risk Analysis",
            request.filters.range_label(),
            summary,
            sections,
        ))
    }

    /// Deep dive: cohort retention and persistency by carrier
    async fn policy_report(&self, request: &ReportRequest) -> Result<Report, ReportError> {
        let as_of = self.as_of();
        let policy_count = fetch(
            self.store.policy_count(&request.agent_id),
            "policy count",
        )
        .await?;

        if policy_count == 0 {
            let insights = self.insights(request, as_of).await?;
            let summary = ReportSummary {
                health_score: health_score(0.0, 0, 0, &insights, &self.thresholds.health),
                key_metrics: vec![],
                top_insights: top_by_category(&insights, InsightCategory::Retention, 2),
            };
            return Ok(self.finish(
                request,
                "policy",
                "Persistency Analysis",
                request.filters.range_label(),
                summary,
                vec![no_data_section(
                    "You have no policies in the system. Add policies to see persistency analysis.",
                )],
            ));
        }

        let (policies, insights) = tokio::try_join!(
            fetch(self.store.all_policies(&request.agent_id), "policies"),
            self.insights(request, as_of),
        )?;

        let cohorts = cohort_retention(&policies);
        let mature: Vec<&CohortRow> = cohorts
            .iter()
            .filter(|c| {
                crate::records::months_between(c.cohort_start, as_of)
                    >= self.thresholds.persistency_cohort_months
            })
            .collect();
        let avg_persistency = if mature.is_empty() {
            0.0
        } else {
            mature.iter().map(|c| c.retention_pct()).sum::<f64>() / mature.len() as f64
        };

        let mut sections = vec![ReportSection::new("persistency-summary", "Persistency Overview")
            .with_metrics(vec![
                Metric::new(
                    format!("{}-Month Persistency", self.thresholds.persistency_cohort_months),
                    format_percent(avg_persistency),
                    MetricFormat::Percent,
                ),
                Metric::new(
                    "Total Cohorts Tracked",
                    format_number(cohorts.len().min(6) as f64),
                    MetricFormat::Number,
                ),
            ])];

        let cohort_rows: Vec<Vec<String>> = cohorts
            .iter()
            .take(6)
            .map(|c| {
                vec![
                    c.cohort_start.format("%b %Y").to_string(),
                    format_number(c.size as f64),
                    format_number(c.still_active as f64),
                    format_percent(c.retention_pct()),
                ]
            })
            .collect();
        if !cohort_rows.is_empty() {
            sections.push(
                ReportSection::new("cohort-retention", "Cohort Retention")
                    .with_description("How each month's policies retain over time")
                    .with_table(TableData {
                        headers: string_headers(&["Cohort Month", "Initial", "Active", "Retention"]),
                        rows: cohort_rows,
                    }),
            );
        }

        let by_carrier = persistency_by_carrier(&policies);
        if !by_carrier.is_empty() {
            let rows: Vec<Vec<String>> = by_carrier
                .iter()
                .map(|c| {
                    vec![
                        c.carrier_name.clone(),
                        format_percent(c.persistency_rate),
                        format_number(c.active_policies as f64),
                        format_number(c.lapsed_policies as f64),
                    ]
                })
                .collect();
            sections.push(
                ReportSection::new("persistency-by-carrier", "Persistency by Carrier")
                    .with_description("Which carriers have the best retention")
                    .with_table(TableData {
                        headers: string_headers(&["Carrier", "Persistency", "Active", "Lapsed"]),
                        rows,
                    }),
            );
        }

        let active = policies.iter().filter(|p| p.is_active()).count();
        let key_metrics = sections[0].metrics.clone().unwrap_or_default();
        let summary = ReportSummary {
            health_score: health_score(
                0.0,
                active,
                policies.len(),
                &insights,
                &self.thresholds.health,
            ),
            key_metrics,
            top_insights: top_by_category(&insights, InsightCategory::Retention, 2),
        };

        Ok(self.finish(
            request,
            "policy",
            "Persistency Analysis",
            request.filters.range_label(),
            summary,
            sections,
        ))
    }

    /// Deep dive: tier segmentation, top clients, cross-sell targets
    async fn client_report(&self, request: &ReportRequest) -> Result<Report, ReportError> {
        let as_of = self.as_of();
        let client_count = fetch(
            self.store.client_count(&request.agent_id),
            "client count",
        )
        .await?;

        if client_count == 0 {
            let insights = self.insights(request, as_of).await?;
            let summary = ReportSummary {
                health_score: health_score(0.0, 0, 0, &insights, &self.thresholds.health),
                key_metrics: vec![],
                top_insights: top_by_category(&insights, InsightCategory::Opportunity, 2),
            };
            return Ok(self.finish(
                request,
                "client",
                "Client Analysis",
                request.filters.range_label(),
                summary,
                vec![no_data_section(
                    "You have no clients in the system. Add clients to see client analysis.",
                )],
            ));
        }

        let (rows, insights) = tokio::try_join!(
            fetch(self.store.client_values(&request.agent_id), "client values"),
            self.insights(request, as_of),
        )?;

        let total_clients = rows.len();
        let active_policies: usize = rows.iter().map(|r| r.active_policies).sum();
        let avg_per_client = if total_clients > 0 {
            active_policies as f64 / total_clients as f64
        } else {
            0.0
        };
        let cross_sell: Vec<&ClientValueRow> =
            rows.iter().filter(|r| r.active_policies == 1).collect();

        let overview_metrics = vec![
            Metric::new(
                "Total Clients",
                format_number(total_clients as f64),
                MetricFormat::Number,
            ),
            Metric::new(
                "Avg Policies/Client",
                format!("{:.1}", avg_per_client),
                MetricFormat::Number,
            ),
            Metric::new(
                "Cross-Sell Opportunities",
                format_number(cross_sell.len() as f64),
                MetricFormat::Number,
            ),
        ];
        let mut sections = vec![ReportSection::new("client-overview", "Client Overview")
            .with_metrics(overview_metrics.clone())];

        let mut tier_counts: HashMap<char, usize> = HashMap::new();
        for row in &rows {
            *tier_counts.entry(row.tier).or_insert(0) += 1;
        }
        let t = &self.thresholds;
        let tier_rows = vec![
            tier_row('A', "A - High Value", &tier_counts, format!("{}+", format_currency(t.tier_a_premium))),
            tier_row('B', "B - Growth", &tier_counts, premium_band(t.tier_b_premium, t.tier_a_premium)),
            tier_row('C', "C - Standard", &tier_counts, premium_band(t.tier_c_premium, t.tier_b_premium)),
            tier_row('D', "D - Entry", &tier_counts, format!("<{}", format_currency(t.tier_c_premium))),
        ];
        if tier_counts.values().any(|&n| n > 0) {
            sections.push(
                ReportSection::new("client-tiers", "Client Segmentation").with_table(TableData {
                    headers: string_headers(&["Tier", "Count", "Premium Range"]),
                    rows: tier_rows,
                }),
            );
        }

        let mut by_active_premium: Vec<&ClientValueRow> = rows.iter().collect();
        by_active_premium.sort_by(|a, b| {
            b.active_premium
                .partial_cmp(&a.active_premium)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        let top_rows: Vec<Vec<String>> = by_active_premium
            .iter()
            .take(5)
            .map(|c| {
                vec![
                    c.client_name.clone(),
                    format_currency(c.active_premium),
                    format_number(c.active_policies as f64),
                    c.tier.to_string(),
                ]
            })
            .collect();
        if !top_rows.is_empty() {
            sections.push(
                ReportSection::new("top-clients", "Top Clients").with_table(TableData {
                    headers: string_headers(&["Client", "Premium", "Policies", "Tier"]),
                    rows: top_rows,
                }),
            );
        }

        let mut cross_sell_sorted = cross_sell.clone();
        cross_sell_sorted.sort_by(|a, b| {
            b.active_premium
                .partial_cmp(&a.active_premium)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        let cross_sell_rows: Vec<Vec<String>> = cross_sell_sorted
            .iter()
            .take(5)
            .map(|c| {
                vec![
                    c.client_name.clone(),
                    format_currency(c.active_premium),
                    "Single policy".to_string(),
                ]
            })
            .collect();
        if !cross_sell_rows.is_empty() {
            sections.push(
                ReportSection::new("cross-sell", "Cross-Sell Targets")
                    .with_description("High-value clients with only one policy")
                    .with_table(TableData {
                        headers: string_headers(&["Client", "Premium", "Status"]),
                        rows: cross_sell_rows,
                    }),
            );
        }

        let total_policies: usize = rows.iter().map(|r| r.total_policies).sum();
        let summary = ReportSummary {
            health_score: health_score(
                0.0,
                active_policies,
                total_policies,
                &insights,
                &self.thresholds.health,
            ),
            key_metrics: overview_metrics,
            top_insights: top_by_category(&insights, InsightCategory::Opportunity, 2),
        };

        Ok(self.finish(
            request,
            "client",
            "Client Analysis",
            request.filters.range_label(),
            summary,
            sections,
        ))
    }

    /// Deep dive: expense breakdown by category, recurring vs one-time
    async fn financial_report(&self, request: &ReportRequest) -> Result<Report, ReportError> {
        let as_of = self.as_of();
        let (expenses, commissions, insights) = tokio::try_join!(
            fetch(
                self.store
                    .expenses_in_range(&request.agent_id, &request.filters),
                "expenses",
            ),
            fetch(
                self.store
                    .commissions_in_range(&request.agent_id, &request.filters),
                "commissions",
            ),
            self.insights(request, as_of),
        )?;

        let totals = MetricTotals::from_records(&commissions, &expenses, &[]);
        let ratio_pct = totals.expense_ratio * 100.0;
        let recurring: f64 = expenses
            .iter()
            .filter(|e| e.is_recurring)
            .map(|e| e.amount)
            .sum();
        let one_time = totals.total_expenses - recurring;

        let overview_metrics = vec![
            Metric::new(
                "Total Expenses",
                format_currency(totals.total_expenses),
                MetricFormat::Currency,
            ),
            Metric::new(
                "Expense Ratio",
                format_percent(ratio_pct),
                MetricFormat::Percent,
            )
            .with_description("Expenses as % of commission"),
            Metric::new("Recurring", format_currency(recurring), MetricFormat::Currency),
            Metric::new("One-Time", format_currency(one_time), MetricFormat::Currency),
        ];

        let mut by_category: HashMap<&str, f64> = HashMap::new();
        for expense in &expenses {
            *by_category.entry(expense.category.as_str()).or_insert(0.0) += expense.amount;
        }
        let mut categories: Vec<(&str, f64)> = by_category.into_iter().collect();
        categories.sort_by(|a, b| {
            b.1.partial_cmp(&a.1)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.0.cmp(b.0))
        });
        let category_rows: Vec<Vec<String>> = categories
            .iter()
            .map(|(category, amount)| {
                let share = if totals.total_expenses > 0.0 {
                    amount / totals.total_expenses * 100.0
                } else {
                    0.0
                };
                vec![
                    category.to_string(),
                    format_currency(*amount),
                    format_percent(share),
                ]
            })
            .collect();

        let sections = vec![
            ReportSection::new("expense-overview", "Expense Overview")
                .with_metrics(overview_metrics.clone()),
            ReportSection::new("expense-breakdown", "Expenses by Category").with_table(TableData {
                headers: string_headers(&["Category", "Amount", "% of Total"]),
                rows: category_rows,
            }),
        ];

        // Ratio-banded score instead of the composite one
        let health = if ratio_pct < 30.0 {
            85
        } else if ratio_pct < 50.0 {
            65
        } else {
            40
        };
        let summary = ReportSummary {
            health_score: health,
            key_metrics: overview_metrics,
            top_insights: top_by_category(&insights, InsightCategory::Expense, 2),
        };

        Ok(self.finish(
            request,
            "financial",
            "Expense Analysis",
            request.filters.range_label(),
            summary,
            sections,
        ))
    }

    /// Forward projection from paid commission history
    async fn predictive_report(&self, request: &ReportRequest) -> Result<Report, ReportError> {
        let as_of = self.as_of();
        let commissions = fetch(
            self.store.all_commissions(&request.agent_id),
            "commissions",
        )
        .await?;

        let forecast = forecast_paid_commissions(&commissions, as_of, &self.thresholds);

        let trend_metric = Metric::new(
            "Next Month",
            format_currency(forecast.next_month),
            MetricFormat::Currency,
        )
        .with_trend(match forecast.trend {
            ForecastTrend::Up => MetricTrend::Up,
            ForecastTrend::Down => MetricTrend::Down,
            ForecastTrend::Stable => MetricTrend::Neutral,
        });
        let forecast_metrics = vec![
            trend_metric,
            Metric::new(
                "3-Month Total",
                format_currency(forecast.three_month),
                MetricFormat::Currency,
            ),
            Metric::new(
                "Confidence",
                format_percent(forecast.confidence * 100.0),
                MetricFormat::Percent,
            ),
            Metric::new(
                "Trend",
                match forecast.trend {
                    ForecastTrend::Up => "Growing",
                    ForecastTrend::Down => "Declining",
                    ForecastTrend::Stable => "Stable",
                },
                MetricFormat::Text,
            ),
        ];

        let mut sections = vec![ReportSection::new("forecast", "Commission Forecast")
            .with_metrics(forecast_metrics.clone())];

        if !forecast.warnings.is_empty() {
            let notes: Vec<ActionableInsight> = forecast
                .warnings
                .iter()
                .enumerate()
                .map(|(i, warning)| ActionableInsight {
                    id: format!("note-{}", i),
                    severity: InsightSeverity::Info,
                    category: InsightCategory::Performance,
                    title: "Forecast Note".into(),
                    description: warning.clone(),
                    impact: String::new(),
                    recommended_actions: vec![],
                    priority: 3,
                    affected_entities: None,
                })
                .collect();
            sections.push(ReportSection::new("forecast-notes", "Notes").with_insights(notes));
        }

        let summary = ReportSummary {
            health_score: (forecast.confidence * 100.0).round() as u8,
            key_metrics: forecast_metrics,
            top_insights: vec![],
        };

        Ok(self.finish(
            request,
            "predictive",
            "Revenue Forecast",
            format!("Based on {} months of data", forecast.historical_months),
            summary,
            sections,
        ))
    }
}

async fn fetch<T>(
    fut: impl std::future::Future<Output = Result<T, StoreError>>,
    resource: &'static str,
) -> Result<T, ReportError> {
    fut.await.map_err(|e| ReportError::fetch(resource, e))
}

fn no_data_section(description: &str) -> ReportSection {
    ReportSection::new("no-data", "No Data Available")
        .with_description(description)
        .with_metrics(vec![])
}

fn string_headers(headers: &[&str]) -> Vec<String> {
    headers.iter().map(|h| h.to_string()).collect()
}

fn top_by_category(
    insights: &[ActionableInsight],
    category: InsightCategory,
    limit: usize,
) -> Vec<ActionableInsight> {
    insights
        .iter()
        .filter(|i| i.category == category)
        .take(limit)
        .cloned()
        .collect()
}

fn tier_row(
    tier: char,
    label: &str,
    counts: &HashMap<char, usize>,
    range: String,
) -> Vec<String> {
    vec![
        label.to_string(),
        format_number(counts.get(&tier).copied().unwrap_or(0) as f64),
        range,
    ]
}

fn premium_band(low: f64, high: f64) -> String {
    format!("{}-{}", format_currency(low), format_currency(high - 0.01))
}

/// Per-carrier rollup of paid commissions in the window
#[derive(Debug, Clone)]
struct CarrierRollup {
    carrier_name: String,
    total_commission: f64,
    total_policies: usize,
    active_policies: usize,
    lapsed_policies: usize,
    persistency_rate: f64,
}

fn carrier_performance(
    commissions: &[CommissionRecord],
    policies: &[PolicyRecord],
) -> Vec<CarrierRollup> {
    use crate::records::PolicyStatus;

    let by_id: HashMap<&str, &PolicyRecord> =
        policies.iter().map(|p| (p.id.as_str(), p)).collect();

    struct Acc<'a> {
        name: &'a str,
        commission: f64,
        policy_ids: std::collections::HashSet<&'a str>,
        active: usize,
        lapsed: usize,
    }

    let mut by_carrier: HashMap<&str, Acc> = HashMap::new();
    for c in commissions
        .iter()
        .filter(|c| c.status == CommissionStatus::Paid)
    {
        let Some(policy) = by_id.get(c.policy_id.as_str()) else {
            continue;
        };
        let acc = by_carrier
            .entry(policy.carrier_id.as_str())
            .or_insert(Acc {
                name: policy.carrier_name.as_str(),
                commission: 0.0,
                policy_ids: std::collections::HashSet::new(),
                active: 0,
                lapsed: 0,
            });
        acc.commission += c.amount;
        if acc.policy_ids.insert(policy.id.as_str()) {
            match policy.status {
                PolicyStatus::Active => acc.active += 1,
                PolicyStatus::Lapsed => acc.lapsed += 1,
                _ => {}
            }
        }
    }

    let mut rollups: Vec<CarrierRollup> = by_carrier
        .into_values()
        .map(|acc| {
            let total = acc.policy_ids.len();
            CarrierRollup {
                carrier_name: acc.name.to_string(),
                total_commission: acc.commission,
                total_policies: total,
                active_policies: acc.active,
                lapsed_policies: acc.lapsed,
                persistency_rate: if total > 0 {
                    acc.active as f64 / total as f64 * 100.0
                } else {
                    0.0
                },
            }
        })
        .collect();
    rollups.sort_by(|a, b| {
        b.total_commission
            .partial_cmp(&a.total_commission)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    rollups
}

/// Per-carrier persistency over the whole book
fn persistency_by_carrier(policies: &[PolicyRecord]) -> Vec<CarrierRollup> {
    use crate::records::PolicyStatus;

    struct Acc<'a> {
        name: &'a str,
        total: usize,
        active: usize,
        lapsed: usize,
    }

    let mut by_carrier: HashMap<&str, Acc> = HashMap::new();
    for policy in policies {
        let acc = by_carrier
            .entry(policy.carrier_id.as_str())
            .or_insert(Acc {
                name: policy.carrier_name.as_str(),
                total: 0,
                active: 0,
                lapsed: 0,
            });
        acc.total += 1;
        match policy.status {
            PolicyStatus::Active => acc.active += 1,
            PolicyStatus::Lapsed => acc.lapsed += 1,
            _ => {}
        }
    }

    let mut rollups: Vec<CarrierRollup> = by_carrier
        .into_values()
        .filter(|acc| acc.total > 0)
        .map(|acc| CarrierRollup {
            carrier_name: acc.name.to_string(),
            total_commission: 0.0,
            total_policies: acc.total,
            active_policies: acc.active,
            lapsed_policies: acc.lapsed,
            persistency_rate: acc.active as f64 / acc.total as f64 * 100.0,
        })
        .collect();
    rollups.sort_by(|a, b| {
        b.persistency_rate
            .partial_cmp(&a.persistency_rate)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.carrier_name.cmp(&b.carrier_name))
    });
    rollups
}

/// Monthly issue cohort with its survival count
#[derive(Debug, Clone)]
struct CohortRow {
    cohort_start: NaiveDate,
    size: usize,
    still_active: usize,
}

impl CohortRow {
    fn retention_pct(&self) -> f64 {
        if self.size == 0 {
            0.0
        } else {
            self.still_active as f64 / self.size as f64 * 100.0
        }
    }
}

/// Group policies into monthly issue cohorts, most recent first
fn cohort_retention(policies: &[PolicyRecord]) -> Vec<CohortRow> {
    use chrono::Datelike;
    use std::collections::BTreeMap;

    let mut by_month: BTreeMap<i64, CohortRow> = BTreeMap::new();
    for policy in policies {
        let key = month_index(policy.effective_date);
        let row = by_month.entry(key).or_insert_with(|| CohortRow {
            cohort_start: NaiveDate::from_ymd_opt(
                policy.effective_date.year(),
                policy.effective_date.month(),
                1,
            )
            .unwrap_or(policy.effective_date),
            size: 0,
            still_active: 0,
        });
        row.size += 1;
        if policy.cancellation_date.is_none() {
            row.still_active += 1;
        }
    }
    by_month.into_values().rev().collect()
}

/// Aging bucket rollup over all commissions
#[derive(Debug, Clone)]
struct AgingRow {
    bucket: AgingBucket,
    count: usize,
    at_risk: f64,
}

fn aging_summary(commissions: &[CommissionRecord]) -> Vec<AgingRow> {
    const BUCKETS: [AgingBucket; 5] = [
        AgingBucket::ZeroToThree,
        AgingBucket::ThreeToSix,
        AgingBucket::SixToNine,
        AgingBucket::NineToTwelve,
        AgingBucket::TwelvePlus,
    ];

    BUCKETS
        .iter()
        .map(|&bucket| {
            let (min, max) = bucket.months_range();
            let mut count = 0;
            let mut at_risk = 0.0;
            for c in commissions {
                if c.months_paid >= min && c.months_paid < max && c.unearned_amount > 0.0 {
                    count += 1;
                    at_risk += c.unearned_amount;
                }
            }
            AgingRow { bucket, count, at_risk }
        })
        .collect()
}

/// Charged-back amount as a percentage of all commission volume
fn chargeback_rate(commissions: &[CommissionRecord]) -> f64 {
    let charged_back: f64 = commissions
        .iter()
        .filter(|c| c.status == CommissionStatus::ChargedBack)
        .map(|c| c.chargeback_amount.unwrap_or(c.amount).abs())
        .sum();
    let volume: f64 = commissions.iter().map(|c| c.amount.abs()).sum();
    if volume > 0.0 {
        charged_back / volume * 100.0
    } else {
        0.0
    }
}
