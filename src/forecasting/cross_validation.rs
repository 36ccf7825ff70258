// src/forecasting/cross_validation.rs

use crate::forecasting::calendar::HolidayCalendar;
use crate::forecasting::metrics::rmse;
use crate::forecasting::traits::ForecastModel;
use crate::model::params::Hyperparameters;
use crate::model::series::DemandSeries;
use chrono::{Duration, NaiveDate};
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::sync::Arc;
use tracing::debug;

/// Backtest windows, expressed as calendar durations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CvSettings {
    /// Minimum span of history before the first cutoff.
    pub initial: Duration,
    /// Spacing between cutoffs.
    pub period: Duration,
    /// Span after each cutoff that is forecast and scored.
    pub horizon: Duration,
}

impl Default for CvSettings {
    /// Two years of warm-up, a cutoff every six months, one month ahead.
    fn default() -> Self {
        Self {
            initial: Duration::days(730),
            period: Duration::days(180),
            horizon: Duration::days(30),
        }
    }
}

/// Error of one backtest fold.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CvFold {
    pub cutoff: NaiveDate,
    pub horizon_error: f64,
}

/// Outcome of backtesting one parameter set. Never an error: failures are a value.
#[derive(Debug, Clone, PartialEq)]
pub enum CvOutcome {
    Scored { mean_error: f64, folds: Vec<CvFold> },
    Unusable { reason: String },
}

impl CvOutcome {
    /// Mean fold RMSE, or `+inf` when unusable.
    pub fn error(&self) -> f64 {
        match self {
            CvOutcome::Scored { mean_error, .. } => *mean_error,
            CvOutcome::Unusable { .. } => f64::INFINITY,
        }
    }

    pub fn is_usable(&self) -> bool {
        matches!(self, CvOutcome::Scored { .. })
    }
}

/// Rolling-origin backtester.
#[derive(Debug, Clone)]
pub struct CrossValidator {
    model: Arc<dyn ForecastModel>,
    calendar: HolidayCalendar,
    settings: CvSettings,
}

impl CrossValidator {
    pub fn new(model: Arc<dyn ForecastModel>, calendar: HolidayCalendar, settings: CvSettings) -> Self {
        Self {
            model,
            calendar,
            settings,
        }
    }

    pub fn settings(&self) -> &CvSettings {
        &self.settings
    }

    /// Hash of the model, calendar and windows; two validators with equal
    /// fingerprints score every series identically.
    pub fn fingerprint(&self) -> u64 {
        let mut hasher = DefaultHasher::new();
        self.model.name().hash(&mut hasher);
        self.calendar.hash(&mut hasher);
        self.settings().hash(&mut hasher);
        hasher.finish()
    }

    /// Fold cutoffs in ascending order.
    ///
    /// # Layout
    /// cutoff_0 = last - horizon, cutoff_k+1 = cutoff_k - period
    ///
    /// Where:
    /// - cutoffs are kept while `cutoff >= first + initial`
    /// - a cutoff whose window `(cutoff, cutoff + horizon]` holds no period is
    ///   pulled back to `horizon` before the nearest period on or before it
    ///
    /// # Arguments
    /// * `series` - The full history; only its periods are read.
    ///
    /// # Returns
    /// An empty vector when the series is empty, too short for `initial`, or the
    /// settings have a non-positive `period` or `horizon`.
    pub fn cutoffs(&self, series: &DemandSeries) -> Vec<NaiveDate> {
        let CvSettings {
            initial,
            period,
            horizon,
        } = self.settings;
        let (first, last) = match (series.first_period(), series.last_period()) {
            (Some(first), Some(last)) => (first, last),
            _ => return Vec::new(),
        };
        if period <= Duration::zero() || horizon <= Duration::zero() {
            return Vec::new();
        }

        let earliest = first + initial;
        let has_data = |cutoff: NaiveDate| {
            series
                .periods()
                .iter()
                .any(|p| *p > cutoff && *p <= cutoff + horizon)
        };

        let mut cutoffs = Vec::new();
        let mut cutoff = last - horizon;
        loop {
            if !has_data(cutoff) {
                match series.periods().iter().rev().find(|p| **p <= cutoff) {
                    Some(closest) => cutoff = *closest - horizon,
                    None => break,
                }
            }
            if cutoff < earliest {
                break;
            }
            cutoffs.push(cutoff);
            cutoff = cutoff - period;
        }
        cutoffs.reverse();
        cutoffs
    }

    /// Mean out-of-sample RMSE of `params` across all folds.
    ///
    /// Zero folds, a failed fit, or a non-finite fold error make the outcome unusable.
    pub fn evaluate(&self, series: &DemandSeries, params: &Hyperparameters) -> CvOutcome {
        let cutoffs = self.cutoffs(series);
        if cutoffs.is_empty() {
            return CvOutcome::Unusable {
                reason: format!(
                    "{} periods leave no fold after the initial window",
                    series.len()
                ),
            };
        }

        let mut folds = Vec::with_capacity(cutoffs.len());
        for cutoff in cutoffs {
            let through = cutoff + self.settings.horizon;
            let train = series.through(cutoff);
            let actual: Vec<f64> = series
                .iter()
                .filter(|(p, _)| *p > cutoff && *p <= through)
                .map(|(_, v)| v)
                .collect();

            let fitted = match self.model.fit(&train, params, self.calendar) {
                Ok(fitted) => fitted,
                Err(e) => {
                    return CvOutcome::Unusable {
                        reason: format!("fit failed at cutoff {cutoff}: {e}"),
                    }
                }
            };
            let predicted: Vec<f64> = fitted
                .predict(actual.len())
                .window(cutoff, through)
                .iter()
                .map(|p| p.yhat)
                .collect();

            match rmse(&actual, &predicted) {
                Some(error) if error.is_finite() => {
                    debug!(%cutoff, error, train = train.len(), "fold scored");
                    folds.push(CvFold {
                        cutoff,
                        horizon_error: error,
                    });
                }
                _ => {
                    return CvOutcome::Unusable {
                        reason: format!("no finite error at cutoff {cutoff}"),
                    }
                }
            }
        }

        let mean_error = folds.iter().map(|f| f.horizon_error).sum::<f64>() / folds.len() as f64;
        CvOutcome::Scored { mean_error, folds }
    }
}
