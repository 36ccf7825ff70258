// src/strategy/traits.rs

use crate::error::Result;
use crate::forecasting::tuning::TuningResult;
use crate::model::params::Hyperparameters;
use crate::model::series::DemandSeries;
use std::fmt::Debug;

/// How the model error for a segment will be obtained.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ErrorEstimate {
    /// Already known from backtesting.
    CrossValidated(f64),
    /// To be measured on the residuals of the final fit.
    InSampleResidual,
}

/// Parameters for the final fit plus the way its error is estimated.
#[derive(Debug, Clone, PartialEq)]
pub struct ParamChoice {
    pub params: Hyperparameters,
    pub estimate: ErrorEstimate,
    /// Present when a grid search ran or was considered.
    pub tuning: Option<TuningResult>,
}

/// Decides the model parameters for a segment and how its error is estimated.
///
/// Implementations trade accuracy of the error estimate against the number of fits.
/// `Send + Sync` so segments can be processed on worker threads.
pub trait ErrorStrategy: Debug + Send + Sync {
    fn choose(&self, series: &DemandSeries) -> Result<ParamChoice>;

    /// Hash of everything that can change the choice, for cache keys.
    fn params_key(&self) -> u64;

    fn name(&self) -> &'static str;
}
