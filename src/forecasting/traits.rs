// src/forecasting/traits.rs

use crate::error::FitError;
use crate::forecasting::calendar::HolidayCalendar;
use crate::model::forecast::Forecast;
use crate::model::params::Hyperparameters;
use crate::model::series::DemandSeries;
use std::fmt::Debug;

/// A demand model that can be fitted to a monthly series.
///
/// `Send + Sync` so candidates and segments can be fitted on worker threads.
pub trait ForecastModel: Debug + Send + Sync {
    /// Fits the model.
    ///
    /// Fails when the series has fewer than two observations or contains a
    /// non-finite value, and on any model-specific degeneracy.
    fn fit(
        &self,
        series: &DemandSeries,
        params: &Hyperparameters,
        calendar: HolidayCalendar,
    ) -> Result<Box<dyn FittedModel>, FitError>;

    fn name(&self) -> &str;
}

/// A fitted model ready to forecast.
pub trait FittedModel: Debug + Send + Sync {
    /// Forecast spanning the fitted history plus `horizon` further months.
    ///
    /// Deterministic for a given fitted model and horizon.
    fn predict(&self, horizon: usize) -> Forecast;
}
