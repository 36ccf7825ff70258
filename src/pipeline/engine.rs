// src/pipeline/engine.rs

use crate::error::{RestockError, Result};
use crate::forecasting::calendar::HolidayCalendar;
use crate::forecasting::cross_validation::CrossValidator;
use crate::forecasting::metrics::residual_rmse;
use crate::forecasting::traits::ForecastModel;
use crate::forecasting::tuning::{HyperparameterTuner, TuningResult};
use crate::model::forecast::Forecast;
use crate::model::params::Hyperparameters;
use crate::model::recommendation::ErrorSource;
use crate::model::series::DemandSeries;
use crate::pipeline::cache::{CacheKey, ForecastCache};
use crate::pipeline::config::RestockConfig;
use crate::strategy::implementations::{CrossValidatedError, InSampleResidual};
use crate::strategy::traits::{ErrorEstimate, ErrorStrategy};
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::sync::Arc;
use tracing::{debug, info};

/// Forecast for one segment together with the error estimate that goes with it.
#[derive(Debug, Clone, PartialEq)]
pub struct EngineOutput {
    pub forecast: Forecast,
    pub params: Hyperparameters,
    pub error: f64,
    pub error_source: ErrorSource,
    pub tuning: Option<TuningResult>,
}

/// Chooses parameters, fits the final model and forecasts the horizon.
#[derive(Debug, Clone)]
pub struct ForecastEngine {
    model: Arc<dyn ForecastModel>,
    strategy: Arc<dyn ErrorStrategy>,
    calendar: HolidayCalendar,
}

impl ForecastEngine {
    pub fn new(
        model: Arc<dyn ForecastModel>,
        strategy: Arc<dyn ErrorStrategy>,
        calendar: HolidayCalendar,
    ) -> Self {
        Self {
            model,
            strategy,
            calendar,
        }
    }

    /// Cross-validated strategy when the config has a grid, residual strategy otherwise.
    pub fn from_config(config: &RestockConfig, model: Arc<dyn ForecastModel>) -> Self {
        let strategy: Arc<dyn ErrorStrategy> = match &config.search_grid {
            Some(grid) => {
                let validator = CrossValidator::new(model.clone(), config.holidays, config.cv);
                let tuner = HyperparameterTuner::new(validator, config.min_history_periods);
                Arc::new(CrossValidatedError::new(tuner, grid.clone()))
            }
            None => Arc::new(InSampleResidual::default()),
        };
        Self::new(model, strategy, config.holidays)
    }

    pub fn strategy(&self) -> &dyn ErrorStrategy {
        self.strategy.as_ref()
    }

    /// Hash of everything besides the series that shapes a run: the strategy's
    /// parameter choice, the model and the holiday calendar.
    pub fn fingerprint(&self) -> u64 {
        let mut hasher = DefaultHasher::new();
        self.strategy.params_key().hash(&mut hasher);
        self.model.name().hash(&mut hasher);
        self.calendar.hash(&mut hasher);
        hasher.finish()
    }

    /// Runs the full per-segment forecast.
    ///
    /// Candidate scoring runs on the caller's rayon pool; the planner wraps this
    /// call in its bounded pool.
    ///
    /// A series with fewer than two periods is insufficient data. A failure of the
    /// final fit is returned as is; there is no fallback below the tuning layer.
    pub fn run(&self, segment: &str, series: &DemandSeries, horizon: usize) -> Result<EngineOutput> {
        if series.len() < 2 {
            return Err(RestockError::InsufficientData {
                segment: segment.to_string(),
                observations: series.len(),
            });
        }

        let choice = self.strategy.choose(series)?;
        debug!(segment, strategy = self.strategy.name(), params = %choice.params, "fitting final model");
        let fitted = self.model.fit(series, &choice.params, self.calendar)?;
        let forecast = fitted.predict(horizon);

        let (error, error_source) = match choice.estimate {
            ErrorEstimate::CrossValidated(error) => (error, ErrorSource::CrossValidated),
            ErrorEstimate::InSampleResidual => {
                let error = residual_rmse(series, &forecast).ok_or_else(|| {
                    RestockError::InsufficientData {
                        segment: segment.to_string(),
                        observations: series.len(),
                    }
                })?;
                (error, ErrorSource::InSampleResidual)
            }
        };
        info!(segment, error, source = ?error_source, "forecast ready");

        Ok(EngineOutput {
            forecast,
            params: choice.params,
            error,
            error_source,
            tuning: choice.tuning,
        })
    }

    /// [`run`](Self::run), memoized on segment, engine fingerprint and series content.
    ///
    /// A cache may be shared between engines; differing setups never collide.
    pub fn run_cached(
        &self,
        cache: &ForecastCache,
        segment: &str,
        series: &DemandSeries,
        horizon: usize,
    ) -> Result<EngineOutput> {
        let key = CacheKey {
            segment: segment.to_string(),
            engine_key: self.fingerprint(),
            series_fingerprint: series.fingerprint(),
            horizon,
        };
        if let Some(hit) = cache.get(&key) {
            debug!(segment, "forecast cache hit");
            return Ok(hit);
        }
        let output = self.run(segment, series, horizon)?;
        cache.insert(key, output.clone());
        Ok(output)
    }
}
