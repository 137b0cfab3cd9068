//! Commission revenue forecasting

mod engine;
pub mod regression;

pub use engine::{
    forecast_paid_commissions, ForecastResult, ForecastTrend, INSUFFICIENT_DATA_WARNING,
};
