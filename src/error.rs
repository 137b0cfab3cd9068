//! Error types for the analytics engine
//!
//! Errors originate at the record store boundary; everything downstream of a
//! successful fetch is pure computation and does not fail.

use std::time::Duration;
use thiserror::Error;

/// Failure at the record store gateway
#[derive(Debug, Error)]
pub enum StoreError {
    /// A filtered query failed
    #[error("query failed for {entity}: {message}")]
    Query { entity: &'static str, message: String },

    /// An aggregate (count) operation failed
    #[error("aggregate failed for {entity}: {message}")]
    Aggregate { entity: &'static str, message: String },
}

/// Failure while producing a report or drill-down
#[derive(Debug, Error)]
pub enum ReportError {
    /// A required data fetch failed; the whole report is aborted
    #[error("failed to fetch {resource}")]
    Fetch {
        resource: &'static str,
        #[source]
        source: StoreError,
    },

    /// The request exceeded its deadline
    #[error("report generation timed out after {0:?}")]
    Timeout(Duration),

    /// A drill-down context was missing its discriminating key
    #[error("drill-down context missing {0}")]
    MissingKey(&'static str),
}

impl ReportError {
    /// Tag a store failure with the resource the assembler was fetching
    pub fn fetch(resource: &'static str, source: StoreError) -> Self {
        ReportError::Fetch { resource, source }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fetch_error_names_resource() {
        let err = ReportError::fetch(
            "commissions",
            StoreError::Query {
                entity: "commissions",
                message: "connection reset".into(),
            },
        );
        assert_eq!(err.to_string(), "failed to fetch commissions");
    }
}
