//! AWS Lambda handler for report generation
//!
//! Accepts a commission book snapshot plus a report or drill-down request as
//! JSON and returns the generated artifact.
//!
//! Supports Lambda Function URLs for direct HTTP access.

use commission_analytics::{
    records::{ClientRecord, CommissionRecord, ExpenseRecord, PolicyRecord},
    DrillDownContext, MemoryStore, Report, ReportError, ReportFilters, ReportGenerator,
    ReportRequest, ReportType,
};
use lambda_http::{run, service_fn, Body, Error, Request, Response};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

/// Input for one service invocation
#[derive(Debug, Deserialize)]
pub struct ServiceRequest {
    pub agent_id: String,

    /// Report to generate; ignored when `drill_down` is set
    #[serde(default)]
    pub report_type: Option<ReportType>,

    pub filters: ReportFilters,

    /// Drill-down context to resolve instead of a full report
    #[serde(default)]
    pub drill_down: Option<DrillDownContext>,

    /// Request deadline override in seconds
    #[serde(default)]
    pub timeout_secs: Option<u64>,

    // Record snapshot the report runs against
    #[serde(default)]
    pub commissions: Vec<CommissionRecord>,
    #[serde(default)]
    pub expenses: Vec<ExpenseRecord>,
    #[serde(default)]
    pub policies: Vec<PolicyRecord>,
    #[serde(default)]
    pub clients: Vec<ClientRecord>,
}

#[derive(Debug, Serialize)]
pub struct ReportResponse {
    pub report: Report,
    pub execution_time_ms: u64,
}

#[derive(Debug, Serialize)]
pub struct DrillDownResponse {
    pub drill_down: commission_analytics::report::DrillDownData,
    pub execution_time_ms: u64,
}

fn error_response(status: u16, message: &str) -> Response<Body> {
    Response::builder()
        .status(status)
        .header("Content-Type", "application/json")
        .header("Access-Control-Allow-Origin", "*")
        .body(Body::Text(format!(r#"{{"error":"{}"}}"#, message)))
        .unwrap()
}

fn json_response<T: Serialize>(body: &T) -> Response<Body> {
    Response::builder()
        .status(200)
        .header("Content-Type", "application/json")
        .header("Access-Control-Allow-Origin", "*")
        .header("Access-Control-Allow-Methods", "POST, OPTIONS")
        .header("Access-Control-Allow-Headers", "Content-Type")
        .body(Body::Text(serde_json::to_string(body).unwrap()))
        .unwrap()
}

fn status_for(err: &ReportError) -> u16 {
    match err {
        ReportError::Timeout(_) => 504,
        ReportError::MissingKey(_) => 400,
        ReportError::Fetch { .. } => 502,
    }
}

/// Lambda handler function
async fn handler(event: Request) -> Result<Response<Body>, Error> {
    let start = std::time::Instant::now();

    // Handle CORS preflight
    if event.method().as_str() == "OPTIONS" {
        return Ok(Response::builder()
            .status(200)
            .header("Access-Control-Allow-Origin", "*")
            .header("Access-Control-Allow-Methods", "POST, OPTIONS")
            .header("Access-Control-Allow-Headers", "Content-Type")
            .body(Body::Empty)
            .unwrap());
    }

    // Parse request body
    let body = event.body();
    let body_str = match body {
        Body::Text(s) => s.clone(),
        Body::Binary(b) => String::from_utf8_lossy(b).to_string(),
        Body::Empty => "{}".to_string(),
    };

    let request: ServiceRequest = match serde_json::from_str(&body_str) {
        Ok(r) => r,
        Err(e) => {
            return Ok(error_response(400, &format!("Invalid JSON: {}", e)));
        }
    };

    let store = Arc::new(MemoryStore::new(
        request.commissions,
        request.expenses,
        request.policies,
        request.clients,
    ));

    if let Some(context) = request.drill_down {
        return Ok(
            match commission_analytics::resolve_drill_down(
                store.as_ref(),
                &request.agent_id,
                &context,
            )
            .await
            {
                Ok(data) => json_response(&DrillDownResponse {
                    drill_down: data,
                    execution_time_ms: start.elapsed().as_millis() as u64,
                }),
                Err(e) => error_response(status_for(&e), &e.to_string()),
            },
        );
    }

    let Some(report_type) = request.report_type else {
        return Ok(error_response(
            400,
            "report_type is required when drill_down is not set",
        ));
    };

    let mut generator = ReportGenerator::new(store);
    if let Some(secs) = request.timeout_secs {
        generator = generator.with_timeout(Duration::from_secs(secs));
    }

    let report_request = ReportRequest {
        agent_id: request.agent_id,
        report_type,
        filters: request.filters,
    };

    match generator.generate(&report_request).await {
        Ok(report) => Ok(json_response(&ReportResponse {
            report,
            execution_time_ms: start.elapsed().as_millis() as u64,
        })),
        Err(e) => Ok(error_response(status_for(&e), &e.to_string())),
    }
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    env_logger::init();
    run(service_fn(handler)).await
}
