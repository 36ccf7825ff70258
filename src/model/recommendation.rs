// src/model/recommendation.rs

use chrono::NaiveDate;
use serde::Serialize;

/// Which estimation path produced a model error.
///
/// The two are statistically different quantities and are kept labeled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ErrorSource {
    /// Mean RMSE over rolling-origin backtest folds.
    CrossValidated,
    /// RMSE of in-sample residuals from a single fit.
    InSampleResidual,
}

/// Restocking advice for one segment and one future period.
///
/// `recommended_order == predicted_demand + safety_stock` and
/// `safety_stock == model_error * service_level_z` hold exactly.
#[derive(Debug, Clone, PartialEq)]
pub struct Recommendation {
    pub segment: String,
    pub forecast_period: NaiveDate,
    pub predicted_demand: f64,
    pub model_error: f64,
    pub safety_stock: f64,
    pub recommended_order: f64,
    pub error_source: ErrorSource,
}

/// A segment left out of the report, with the reason.
#[derive(Debug, Clone, PartialEq)]
pub struct SkippedSegment {
    pub segment: String,
    pub reason: String,
}

/// Per-segment recommendations in processing order.
///
/// Every input segment lands in exactly one of the two lists.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Report {
    pub recommendations: Vec<Recommendation>,
    pub skipped: Vec<SkippedSegment>,
}

impl Report {
    pub fn len(&self) -> usize {
        self.recommendations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.recommendations.is_empty()
    }

    pub fn get(&self, segment: &str) -> Option<&Recommendation> {
        self.recommendations.iter().find(|r| r.segment == segment)
    }
}
