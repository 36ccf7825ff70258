// src/forecasting/tuning.rs

use crate::error::Result;
use crate::forecasting::cross_validation::{CrossValidator, CvOutcome};
use crate::model::params::{Hyperparameters, SearchGrid};
use crate::model::series::DemandSeries;
use rayon::prelude::*;
use tracing::{debug, info};

/// Outcome of a grid search.
#[derive(Debug, Clone, PartialEq)]
pub enum TuningResult {
    /// A candidate with the lowest finite backtest error.
    Tuned { params: Hyperparameters, error: f64 },
    /// Series too short to backtest; the fixed fallback was returned untuned.
    Fallback { params: Hyperparameters },
    /// No candidate produced a usable backtest.
    Exhausted,
}

impl TuningResult {
    /// Winning parameters. `None` when tuning was exhausted.
    pub fn best_params(&self) -> Option<&Hyperparameters> {
        match self {
            TuningResult::Tuned { params, .. } | TuningResult::Fallback { params } => Some(params),
            TuningResult::Exhausted => None,
        }
    }

    /// Backtest error of the winner: `0.0` for the fallback and `+inf` when exhausted.
    pub fn best_error(&self) -> f64 {
        match self {
            TuningResult::Tuned { error, .. } => *error,
            TuningResult::Fallback { .. } => 0.0,
            TuningResult::Exhausted => f64::INFINITY,
        }
    }
}

/// Exhaustive grid search scored by rolling-origin backtests.
#[derive(Debug, Clone)]
pub struct HyperparameterTuner {
    validator: CrossValidator,
    min_history_periods: usize,
    fallback: Hyperparameters,
}

impl HyperparameterTuner {
    pub fn new(validator: CrossValidator, min_history_periods: usize) -> Self {
        Self {
            validator,
            min_history_periods,
            fallback: Hyperparameters::FALLBACK,
        }
    }

    pub fn validator(&self) -> &CrossValidator {
        &self.validator
    }

    pub fn fallback(&self) -> Hyperparameters {
        self.fallback
    }

    pub fn min_history_periods(&self) -> usize {
        self.min_history_periods
    }

    /// Picks the grid candidate with the strictly lowest mean backtest error.
    ///
    /// # Policy
    /// 1. An empty grid, or a grid with an empty dimension, is rejected first,
    ///    whatever the series length.
    /// 2. A series shorter than `min_history_periods` skips the search and gets
    ///    `Fallback` with the fixed parameters (error 0.0).
    /// 3. Otherwise every candidate is backtested. Scoring runs on the current
    ///    rayon pool and results are reduced in enumeration order, so among equal
    ///    errors the first-enumerated candidate wins.
    /// 4. When no candidate has a finite error the result is `Exhausted`.
    ///
    /// # Arguments
    /// * `series` - Monthly demand for one segment.
    /// * `grid` - Candidate parameters, first dimension varying slowest.
    ///
    /// # Errors
    /// `RestockError::Precondition` for an empty grid. Candidate failures are never errors.
    pub fn tune(&self, series: &DemandSeries, grid: &SearchGrid) -> Result<TuningResult> {
        let candidates = grid.candidates()?;

        if series.len() < self.min_history_periods {
            info!(
                periods = series.len(),
                min = self.min_history_periods,
                "history too short to tune, using fallback parameters"
            );
            return Ok(TuningResult::Fallback {
                params: self.fallback,
            });
        }

        info!("tuning: testing {} combinations", candidates.len());
        let scored: Vec<(Hyperparameters, CvOutcome)> = candidates
            .into_par_iter()
            .map(|params| {
                let outcome = self.validator.evaluate(series, &params);
                (params, outcome)
            })
            .collect();

        let mut best: Option<(Hyperparameters, f64)> = None;
        for (params, outcome) in scored {
            match &outcome {
                CvOutcome::Scored { mean_error, .. } => debug!(%params, mean_error, "candidate scored"),
                CvOutcome::Unusable { reason } => debug!(%params, %reason, "candidate unusable"),
            }
            let error = outcome.error();
            if error < best.map_or(f64::INFINITY, |(_, e)| e) {
                best = Some((params, error));
            }
        }

        Ok(match best {
            Some((params, error)) => TuningResult::Tuned { params, error },
            None => TuningResult::Exhausted,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RestockError;
    use crate::forecasting::calendar::HolidayCalendar;
    use crate::forecasting::cross_validation::CvSettings;
    use crate::forecasting::testing::{ConstantModel, FailingModel};
    use crate::forecasting::traits::ForecastModel;
    use approx::assert_relative_eq;
    use chrono::NaiveDate;
    use std::sync::Arc;

    fn tuner(model: Arc<dyn ForecastModel>) -> HyperparameterTuner {
        let validator = CrossValidator::new(model, HolidayCalendar::None, CvSettings::default());
        HyperparameterTuner::new(validator, 24)
    }

    fn ones(n: usize) -> DemandSeries {
        DemandSeries::from_monthly(NaiveDate::from_ymd_opt(2014, 1, 1).unwrap(), vec![1.0; n])
    }

    fn grid(cps: Vec<f64>) -> SearchGrid {
        SearchGrid::new(Hyperparameters::SEARCH_BASE).changepoint_prior_scale(cps)
    }

    #[test]
    fn picks_unique_minimum() {
        let result = tuner(Arc::new(ConstantModel))
            .tune(&ones(36), &grid(vec![0.5, 0.9, 1.5]))
            .unwrap();
        let params = result.best_params().unwrap();
        assert_eq!(params.changepoint_prior_scale, 0.9);
        assert_relative_eq!(result.best_error(), 0.1, epsilon = 1e-12);
    }

    #[test]
    fn ties_keep_first_enumerated() {
        let t = tuner(Arc::new(ConstantModel));

        let result = t.tune(&ones(36), &grid(vec![0.5, 1.5])).unwrap();
        assert_eq!(result.best_params().unwrap().changepoint_prior_scale, 0.5);

        let result = t.tune(&ones(36), &grid(vec![1.5, 0.5])).unwrap();
        assert_eq!(result.best_params().unwrap().changepoint_prior_scale, 1.5);
    }

    #[test]
    fn winner_is_always_a_grid_candidate() {
        let search = grid(vec![0.2, 0.4, 3.0]).seasonality_prior_scale(vec![1.0, 10.0]);
        let result = tuner(Arc::new(ConstantModel)).tune(&ones(30), &search).unwrap();
        let candidates = search.candidates().unwrap();
        assert!(candidates.contains(result.best_params().unwrap()));
    }

    #[test]
    fn short_history_returns_fallback_with_zero_error() {
        let result = tuner(Arc::new(FailingModel))
            .tune(&ones(6), &grid(vec![0.5, 1.5]))
            .unwrap();
        assert_eq!(
            result,
            TuningResult::Fallback {
                params: Hyperparameters::FALLBACK
            }
        );
        assert_eq!(result.best_error(), 0.0);
    }

    #[test]
    fn all_candidates_failing_is_exhausted() {
        let result = tuner(Arc::new(FailingModel))
            .tune(&ones(36), &grid(vec![0.01, 0.1]))
            .unwrap();
        assert_eq!(result, TuningResult::Exhausted);
        assert!(result.best_error().is_infinite());
        assert!(result.best_params().is_none());
    }

    #[test]
    fn empty_grid_fails_loudly() {
        let empty = SearchGrid::new(Hyperparameters::SEARCH_BASE);
        let err = tuner(Arc::new(ConstantModel)).tune(&ones(36), &empty).unwrap_err();
        assert!(matches!(err, RestockError::Precondition(_)));
    }

    #[test]
    fn empty_grid_is_rejected_before_short_history_fallback() {
        let t = tuner(Arc::new(ConstantModel));

        let empty = SearchGrid::new(Hyperparameters::SEARCH_BASE);
        let err = t.tune(&ones(6), &empty).unwrap_err();
        assert!(matches!(err, RestockError::Precondition(_)));

        let hollow = grid(Vec::new()).seasonality_prior_scale(vec![1.0]);
        let err = t.tune(&ones(6), &hollow).unwrap_err();
        assert!(matches!(err, RestockError::Precondition(_)));
    }
}
