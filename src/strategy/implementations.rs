// src/strategy/implementations.rs

use crate::error::Result;
use crate::forecasting::tuning::{HyperparameterTuner, TuningResult};
use crate::model::params::{Hyperparameters, SearchGrid};
use crate::model::series::DemandSeries;
use crate::strategy::traits::{ErrorEstimate, ErrorStrategy, ParamChoice};
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use tracing::{info, warn};

// =========================================================================
// 1. Cross-validated (batch)
// =========================================================================

/// Grid-searches the parameters and reports the winner's backtest error.
///
/// Costs one fit per candidate per fold. When the series is too short to tune, or
/// no candidate is usable, the tuner's fallback is used and the error comes from
/// in-sample residuals instead.
#[derive(Debug, Clone)]
pub struct CrossValidatedError {
    tuner: HyperparameterTuner,
    grid: SearchGrid,
}

impl CrossValidatedError {
    pub fn new(tuner: HyperparameterTuner, grid: SearchGrid) -> Self {
        Self { tuner, grid }
    }
}

impl ErrorStrategy for CrossValidatedError {
    fn choose(&self, series: &DemandSeries) -> Result<ParamChoice> {
        let tuning = self.tuner.tune(series, &self.grid)?;
        let (params, estimate) = match &tuning {
            TuningResult::Tuned { params, error } => {
                info!(winner = %params, rmse = error, "tuning selected parameters");
                (*params, ErrorEstimate::CrossValidated(*error))
            }
            TuningResult::Fallback { params } => (*params, ErrorEstimate::InSampleResidual),
            TuningResult::Exhausted => {
                warn!("no grid candidate produced a usable backtest, using fallback parameters");
                (self.tuner.fallback(), ErrorEstimate::InSampleResidual)
            }
        };
        Ok(ParamChoice {
            params,
            estimate,
            tuning: Some(tuning),
        })
    }

    fn params_key(&self) -> u64 {
        let mut hasher = DefaultHasher::new();
        "cross-validated".hash(&mut hasher);
        if let Ok(candidates) = self.grid.candidates() {
            for params in candidates {
                params.fingerprint().hash(&mut hasher);
            }
        }
        self.tuner.validator().fingerprint().hash(&mut hasher);
        self.tuner.min_history_periods().hash(&mut hasher);
        self.tuner.fallback().fingerprint().hash(&mut hasher);
        hasher.finish()
    }

    fn name(&self) -> &'static str {
        "cross-validated"
    }
}

// =========================================================================
// 2. In-sample residual (interactive)
// =========================================================================

/// Uses fixed parameters and measures error on the final fit's residuals.
///
/// One fit per segment. The residual RMSE is optimistic compared with a backtest.
#[derive(Debug, Clone)]
pub struct InSampleResidual {
    params: Hyperparameters,
}

impl InSampleResidual {
    pub fn new(params: Hyperparameters) -> Self {
        Self { params }
    }
}

impl Default for InSampleResidual {
    fn default() -> Self {
        Self::new(Hyperparameters::INTERACTIVE)
    }
}

impl ErrorStrategy for InSampleResidual {
    fn choose(&self, _series: &DemandSeries) -> Result<ParamChoice> {
        Ok(ParamChoice {
            params: self.params,
            estimate: ErrorEstimate::InSampleResidual,
            tuning: None,
        })
    }

    fn params_key(&self) -> u64 {
        let mut hasher = DefaultHasher::new();
        "in-sample-residual".hash(&mut hasher);
        self.params.fingerprint().hash(&mut hasher);
        hasher.finish()
    }

    fn name(&self) -> &'static str {
        "in-sample-residual"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::forecasting::calendar::HolidayCalendar;
    use crate::forecasting::cross_validation::{CrossValidator, CvSettings};
    use crate::forecasting::testing::{ConstantModel, FailingModel};
    use crate::forecasting::traits::ForecastModel;
    use chrono::NaiveDate;
    use std::sync::Arc;

    fn strategy(model: Arc<dyn ForecastModel>) -> CrossValidatedError {
        let validator = CrossValidator::new(model, HolidayCalendar::None, CvSettings::default());
        let grid = SearchGrid::new(Hyperparameters::SEARCH_BASE).changepoint_prior_scale(vec![0.5, 0.8]);
        CrossValidatedError::new(HyperparameterTuner::new(validator, 24), grid)
    }

    fn ones(n: usize) -> DemandSeries {
        DemandSeries::from_monthly(NaiveDate::from_ymd_opt(2014, 1, 1).unwrap(), vec![1.0; n])
    }

    #[test]
    fn tuned_choice_carries_backtest_error() {
        let choice = strategy(Arc::new(ConstantModel)).choose(&ones(36)).unwrap();
        assert_eq!(choice.params.changepoint_prior_scale, 0.8);
        match choice.estimate {
            ErrorEstimate::CrossValidated(e) => assert!((e - 0.2).abs() < 1e-12),
            other => panic!("expected backtest error, got {other:?}"),
        }
    }

    #[test]
    fn short_history_defers_to_residuals() {
        let choice = strategy(Arc::new(ConstantModel)).choose(&ones(6)).unwrap();
        assert_eq!(choice.params, Hyperparameters::FALLBACK);
        assert_eq!(choice.estimate, ErrorEstimate::InSampleResidual);
    }

    #[test]
    fn exhausted_search_falls_back() {
        let choice = strategy(Arc::new(FailingModel)).choose(&ones(36)).unwrap();
        assert_eq!(choice.params, Hyperparameters::FALLBACK);
        assert_eq!(choice.estimate, ErrorEstimate::InSampleResidual);
        assert_eq!(choice.tuning, Some(TuningResult::Exhausted));
    }

    #[test]
    fn params_keys_differ_between_strategies() {
        let batch = strategy(Arc::new(ConstantModel));
        let live = InSampleResidual::default();
        assert_eq!(live.params_key(), InSampleResidual::default().params_key());
        assert_ne!(batch.params_key(), live.params_key());
    }

    #[test]
    fn residual_strategy_uses_fixed_params() {
        let choice = InSampleResidual::default().choose(&ones(36)).unwrap();
        assert_eq!(choice.params, Hyperparameters::INTERACTIVE);
        assert!(choice.tuning.is_none());
    }
}
