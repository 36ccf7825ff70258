// src/model/forecast.rs

use chrono::NaiveDate;
use serde::Serialize;

/// One forecast row: point estimate plus interval bounds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ForecastPoint {
    pub period: NaiveDate,
    pub yhat: f64,
    pub yhat_lower: f64,
    pub yhat_upper: f64,
}

/// Forecast covering the fitted history followed by the future horizon.
///
/// The first `history_len` points align 1:1 with the series the model was fitted on.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Forecast {
    points: Vec<ForecastPoint>,
    history_len: usize,
}

impl Forecast {
    pub fn new(points: Vec<ForecastPoint>, history_len: usize) -> Self {
        let history_len = history_len.min(points.len());
        Self {
            points,
            history_len,
        }
    }

    pub fn points(&self) -> &[ForecastPoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Points aligned with the fitted history.
    pub fn history(&self) -> &[ForecastPoint] {
        &self.points[..self.history_len]
    }

    /// Points past the fitted history.
    pub fn future(&self) -> &[ForecastPoint] {
        &self.points[self.history_len..]
    }

    /// First point strictly after `period`, if any.
    pub fn first_after(&self, period: NaiveDate) -> Option<&ForecastPoint> {
        self.points.iter().find(|p| p.period > period)
    }

    /// Points with `after < period <= through`.
    pub fn window(&self, after: NaiveDate, through: NaiveDate) -> Vec<ForecastPoint> {
        self.points
            .iter()
            .filter(|p| p.period > after && p.period <= through)
            .copied()
            .collect()
    }
}
