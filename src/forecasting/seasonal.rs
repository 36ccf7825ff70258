// src/forecasting/seasonal.rs

use crate::error::FitError;
use crate::forecasting::calendar::HolidayCalendar;
use crate::forecasting::traits::{FittedModel, ForecastModel};
use crate::model::forecast::{Forecast, ForecastPoint};
use crate::model::params::{Hyperparameters, SeasonalityMode};
use crate::model::series::{add_months, DemandSeries};
use chrono::{Datelike, NaiveDate};
use nalgebra::{DMatrix, DVector};
use std::f64::consts::PI;

const FOURIER_ORDER: usize = 5;
const MAX_CHANGEPOINTS: usize = 25;
/// Share of the history in which changepoints may be placed.
const CHANGEPOINT_RANGE: f64 = 0.8;
/// Assumed noise variance on the scaled series; sets the ridge strength of each prior.
const NOISE_VARIANCE: f64 = 0.01;
const UNPENALISED: f64 = 1e-8;
/// z-score of an 80% two-sided interval.
const INTERVAL_Z: f64 = 1.281_551_565_544_600_4;
const YEAR_DAYS: f64 = 365.25;
const MIN_TREND: f64 = 1e-9;

/// Piecewise-linear trend with yearly Fourier seasonality and a holiday regressor.
///
/// Additive mode fits `trend + seasonal` jointly. Multiplicative mode fits the trend
/// first and then `seasonal` on the ratio `y / trend - 1`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SeasonalRegression;

impl SeasonalRegression {
    pub fn new() -> Self {
        Self
    }
}

impl ForecastModel for SeasonalRegression {
    fn fit(
        &self,
        series: &DemandSeries,
        params: &Hyperparameters,
        calendar: HolidayCalendar,
    ) -> Result<Box<dyn FittedModel>, FitError> {
        let fitted = FittedSeasonal::fit(series, params, calendar)?;
        Ok(Box::new(fitted))
    }

    fn name(&self) -> &str {
        "SeasonalRegression"
    }
}

/// Feature layout shared by fitting and prediction.
#[derive(Debug, Clone)]
struct Design {
    changepoints: Vec<f64>,
    calendar: HolidayCalendar,
}

impl Design {
    fn new(n: usize, calendar: HolidayCalendar) -> Self {
        let hist = (n as f64 * CHANGEPOINT_RANGE).floor() as usize;
        let count = MAX_CHANGEPOINTS.min(hist.saturating_sub(1));
        let changepoints = (1..=count)
            .map(|j| {
                let index = (j as f64 * (hist - 1) as f64 / count as f64).round();
                index / (n - 1) as f64
            })
            .collect();
        Self {
            changepoints,
            calendar,
        }
    }

    fn trend_width(&self) -> usize {
        2 + self.changepoints.len()
    }

    fn seasonal_width(&self) -> usize {
        2 * FOURIER_ORDER + usize::from(!self.calendar.is_empty())
    }

    fn trend_row(&self, t: f64) -> Vec<f64> {
        let mut row = Vec::with_capacity(self.trend_width());
        row.push(1.0);
        row.push(t);
        row.extend(self.changepoints.iter().map(|s| (t - s).max(0.0)));
        row
    }

    fn seasonal_row(&self, period: NaiveDate) -> Vec<f64> {
        let mut row = Vec::with_capacity(self.seasonal_width());
        let x = 2.0 * PI * f64::from(period.num_days_from_ce()) / YEAR_DAYS;
        for k in 1..=FOURIER_ORDER {
            let kx = k as f64 * x;
            row.push(kx.sin());
            row.push(kx.cos());
        }
        if !self.calendar.is_empty() {
            row.push(self.calendar.holidays_in_month(period) as f64);
        }
        row
    }

    fn trend_penalties(&self, params: &Hyperparameters) -> Vec<f64> {
        let hinge = NOISE_VARIANCE / params.changepoint_prior_scale.powi(2);
        let mut penalties = vec![UNPENALISED, UNPENALISED];
        penalties.extend(std::iter::repeat(hinge).take(self.changepoints.len()));
        penalties
    }

    fn seasonal_penalties(&self, params: &Hyperparameters) -> Vec<f64> {
        vec![NOISE_VARIANCE / params.seasonality_prior_scale.powi(2); self.seasonal_width()]
    }
}

/// A fitted [`SeasonalRegression`].
#[derive(Debug, Clone)]
pub struct FittedSeasonal {
    design: Design,
    mode: SeasonalityMode,
    start: NaiveDate,
    n: usize,
    y_scale: f64,
    trend_coef: Vec<f64>,
    seasonal_coef: Vec<f64>,
    sigma: f64,
}

impl FittedSeasonal {
    pub fn fit(
        series: &DemandSeries,
        params: &Hyperparameters,
        calendar: HolidayCalendar,
    ) -> Result<Self, FitError> {
        let n = series.len();
        if n < 2 {
            return Err(FitError::TooFewObservations { needed: 2, got: n });
        }
        if let Some(index) = series.values().iter().position(|v| !v.is_finite()) {
            return Err(FitError::NonFinite { index });
        }
        let start = series.first_period().ok_or(FitError::TooFewObservations {
            needed: 2,
            got: 0,
        })?;

        let max_abs = series.values().iter().fold(0.0_f64, |m, v| m.max(v.abs()));
        let y_scale = match (params.seasonality_mode, max_abs > 0.0) {
            (_, true) => max_abs,
            (SeasonalityMode::Additive, false) => 1.0,
            (SeasonalityMode::Multiplicative, false) => return Err(FitError::ZeroScale),
        };
        let y = DVector::from_iterator(n, series.values().iter().map(|v| v / y_scale));

        let design = Design::new(n, calendar);
        let time = |i: usize| i as f64 / (n - 1) as f64;
        let trend_x = matrix(n, design.trend_width(), |i| design.trend_row(time(i)));
        let seasonal_x = matrix(n, design.seasonal_width(), |i| {
            design.seasonal_row(series.periods()[i])
        });

        let (trend_coef, seasonal_coef) = match params.seasonality_mode {
            SeasonalityMode::Additive => {
                let x = hstack(&trend_x, &seasonal_x);
                let mut penalties = design.trend_penalties(params);
                penalties.extend(design.seasonal_penalties(params));
                let beta = ridge(&x, &y, &penalties)?;
                let split = design.trend_width();
                (beta.as_slice()[..split].to_vec(), beta.as_slice()[split..].to_vec())
            }
            SeasonalityMode::Multiplicative => {
                let trend_beta = ridge(&trend_x, &y, &design.trend_penalties(params))?;
                let trend = &trend_x * &trend_beta;
                if let Some(index) = trend.iter().position(|v| *v <= MIN_TREND) {
                    return Err(FitError::NonPositiveTrend { index });
                }
                let ratio = y.zip_map(&trend, |obs, tr| obs / tr - 1.0);
                let seasonal_beta = ridge(&seasonal_x, &ratio, &design.seasonal_penalties(params))?;
                (trend_beta.as_slice().to_vec(), seasonal_beta.as_slice().to_vec())
            }
        };

        let mut fitted = Self {
            design,
            mode: params.seasonality_mode,
            start,
            n,
            y_scale,
            trend_coef,
            seasonal_coef,
            sigma: 0.0,
        };
        let sse: f64 = series
            .values()
            .iter()
            .enumerate()
            .map(|(i, obs)| (obs - fitted.value_at(i)).powi(2))
            .sum();
        fitted.sigma = (sse / n as f64).sqrt();
        Ok(fitted)
    }

    fn period_at(&self, i: usize) -> NaiveDate {
        add_months(self.start, i as u32)
    }

    fn value_at(&self, i: usize) -> f64 {
        let t = i as f64 / (self.n - 1) as f64;
        let trend = dot(&self.design.trend_row(t), &self.trend_coef);
        let seasonal = dot(&self.design.seasonal_row(self.period_at(i)), &self.seasonal_coef);
        let scaled = match self.mode {
            SeasonalityMode::Additive => trend + seasonal,
            SeasonalityMode::Multiplicative => trend * (1.0 + seasonal),
        };
        scaled * self.y_scale
    }
}

impl FittedModel for FittedSeasonal {
    fn predict(&self, horizon: usize) -> Forecast {
        let points = (0..self.n + horizon)
            .map(|i| {
                let yhat = self.value_at(i);
                let steps_ahead = (i + 1).saturating_sub(self.n) as f64;
                let half_width =
                    INTERVAL_Z * self.sigma * (1.0 + steps_ahead / self.n as f64).sqrt();
                ForecastPoint {
                    period: self.period_at(i),
                    yhat,
                    yhat_lower: yhat - half_width,
                    yhat_upper: yhat + half_width,
                }
            })
            .collect();
        Forecast::new(points, self.n)
    }
}

fn matrix<F>(rows: usize, cols: usize, row_of: F) -> DMatrix<f64>
where
    F: Fn(usize) -> Vec<f64>,
{
    let data: Vec<f64> = (0..rows).flat_map(row_of).collect();
    DMatrix::from_row_slice(rows, cols, &data)
}

fn hstack(left: &DMatrix<f64>, right: &DMatrix<f64>) -> DMatrix<f64> {
    let (rows, lc) = left.shape();
    let rc = right.ncols();
    DMatrix::from_fn(rows, lc + rc, |i, j| {
        if j < lc {
            left[(i, j)]
        } else {
            right[(i, j - lc)]
        }
    })
}

/// Solves `(X'X + diag(penalties)) b = X'y` by Cholesky factorisation.
fn ridge(x: &DMatrix<f64>, y: &DVector<f64>, penalties: &[f64]) -> Result<DVector<f64>, FitError> {
    let mut xtx = x.tr_mul(x);
    for (j, penalty) in penalties.iter().enumerate() {
        xtx[(j, j)] += penalty;
    }
    let xty = x.tr_mul(y);
    let chol = xtx.cholesky().ok_or(FitError::Singular)?;
    let beta = chol.solve(&xty);
    if beta.iter().all(|b| b.is_finite()) {
        Ok(beta)
    } else {
        Err(FitError::Singular)
    }
}

fn dot(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}
