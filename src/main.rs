//! Commission Analytics CLI
//!
//! Loads a commission book from CSV files and prints one generated report.

use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use clap::Parser;
use commission_analytics::{
    records::{load_clients, load_commissions, load_expenses, load_policies},
    MemoryStore, ReportFilters, ReportGenerator, ReportRequest, ReportType,
};
use std::fs::File;
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Debug, Parser)]
#[command(name = "commission_analytics", about = "Generate a commission analytics report")]
struct Args {
    /// Agent whose book to report on
    #[arg(long)]
    agent: String,

    /// Report type (executive-dashboard, commission-performance, policy-performance,
    /// client-relationship, financial-health, predictive-analytics)
    #[arg(long, default_value = "executive-dashboard", value_parser = parse_report_type)]
    report_type: ReportType,

    /// Report window start (YYYY-MM-DD)
    #[arg(long)]
    start: NaiveDate,

    /// Report window end (YYYY-MM-DD)
    #[arg(long)]
    end: NaiveDate,

    /// Commission records CSV
    #[arg(long)]
    commissions: PathBuf,

    /// Expense records CSV
    #[arg(long)]
    expenses: PathBuf,

    /// Policy records CSV
    #[arg(long)]
    policies: PathBuf,

    /// Client records CSV
    #[arg(long)]
    clients: PathBuf,

    /// Write the full report JSON here
    #[arg(long, default_value = "report_output.json")]
    output: PathBuf,
}

fn parse_report_type(s: &str) -> Result<ReportType, String> {
    match s {
        "executive-dashboard" => Ok(ReportType::ExecutiveDashboard),
        "commission-performance" => Ok(ReportType::CommissionPerformance),
        "policy-performance" => Ok(ReportType::PolicyPerformance),
        "client-relationship" => Ok(ReportType::ClientRelationship),
        "financial-health" => Ok(ReportType::FinancialHealth),
        "predictive-analytics" => Ok(ReportType::PredictiveAnalytics),
        other => Err(format!("unknown report type: {}", other)),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    if args.end < args.start {
        bail!("report window end precedes start");
    }

    let commissions = load_commissions(&args.commissions)
        .map_err(|e| anyhow::anyhow!("loading commission records: {}", e))?;
    let expenses = load_expenses(&args.expenses)
        .map_err(|e| anyhow::anyhow!("loading expense records: {}", e))?;
    let policies = load_policies(&args.policies)
        .map_err(|e| anyhow::anyhow!("loading policy records: {}", e))?;
    let clients = load_clients(&args.clients)
        .map_err(|e| anyhow::anyhow!("loading client records: {}", e))?;

    println!("Commission Analytics v0.1.0");
    println!("===========================\n");
    println!(
        "Loaded {} commissions, {} expenses, {} policies, {} clients",
        commissions.len(),
        expenses.len(),
        policies.len(),
        clients.len()
    );

    let store = MemoryStore::new(commissions, expenses, policies, clients);
    let generator = ReportGenerator::new(Arc::new(store));
    let request = ReportRequest {
        agent_id: args.agent,
        report_type: args.report_type,
        filters: ReportFilters::for_range(args.start, args.end),
    };

    let report = generator.generate(&request).await?;

    println!("\n{} ({})", report.title, report.subtitle);
    println!("Health Score: {}/100\n", report.summary.health_score);

    for metric in &report.summary.key_metrics {
        println!("  {:<24} {}", metric.label, metric.value);
    }

    if !report.summary.top_insights.is_empty() {
        println!("\nTop insights:");
        for insight in &report.summary.top_insights {
            println!("  [{:?}] {} - {}", insight.severity, insight.title, insight.impact);
        }
    }

    let json = serde_json::to_string_pretty(&report)?;
    let mut file = File::create(&args.output)
        .with_context(|| format!("creating {}", args.output.display()))?;
    file.write_all(json.as_bytes())?;
    println!("\nFull report written to: {}", args.output.display());

    Ok(())
}
