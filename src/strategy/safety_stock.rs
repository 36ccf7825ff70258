// src/strategy/safety_stock.rs

//! Converting a demand forecast and its error into an order quantity.

use crate::error::{RestockError, Result};
use crate::model::forecast::Forecast;
use crate::model::recommendation::{ErrorSource, Recommendation};
use chrono::NaiveDate;

/// z-score for a one-sided service level `p` (probability of not stocking out).
///
/// Abramowitz and Stegun formula 26.2.23; absolute error below 4.5e-4.
pub fn z_for_service_level(p: f64) -> Result<f64> {
    if !(p > 0.0 && p < 1.0) {
        return Err(RestockError::Config(format!(
            "service level must be in (0, 1), got {p}"
        )));
    }
    if p == 0.5 {
        return Ok(0.0);
    }

    // The formula is valid for 0 < q <= 0.5; mirror the upper half.
    let q = if p < 0.5 { p } else { 1.0 - p };
    let t = (-2.0 * q.ln()).sqrt();

    let c0 = 2.515517;
    let c1 = 0.802853;
    let c2 = 0.010328;

    let d1 = 1.432788;
    let d2 = 0.189269;
    let d3 = 0.001308;

    let numerator = c0 + c1 * t + c2 * t * t;
    let denominator = 1.0 + d1 * t + d2 * t * t + d3 * t * t * t;
    let x = t - numerator / denominator;

    Ok(if p < 0.5 { -x } else { x })
}

/// Single-period safety-stock advisor.
///
/// Order = next-period point forecast + error * z.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RestockAdvisor {
    service_level_z: f64,
}

impl RestockAdvisor {
    pub fn new(service_level_z: f64) -> Self {
        Self { service_level_z }
    }

    /// Advice for the first forecast period strictly after `last_historical_period`.
    ///
    /// # Formula
    /// Safety Stock = Error * Z
    /// Order = Predicted Demand + Safety Stock
    ///
    /// Where:
    /// - Predicted Demand = point forecast `yhat`; interval bounds are ignored
    /// - Z = the advisor's service-level z-score
    ///
    /// # Arguments
    /// * `segment` - Label copied onto the recommendation.
    /// * `forecast` - History plus future horizon from the fitted model.
    /// * `last_historical_period` - Last month of observed demand.
    /// * `error_estimate` - Backtest or residual RMSE.
    /// * `error_source` - Which of the two produced `error_estimate`.
    ///
    /// # Errors
    /// `RestockError::Precondition` when the forecast has no period after the history
    /// (a zero horizon) or the error is not a finite non-negative number.
    pub fn advise(
        &self,
        segment: &str,
        forecast: &Forecast,
        last_historical_period: NaiveDate,
        error_estimate: f64,
        error_source: ErrorSource,
    ) -> Result<Recommendation> {
        let target = forecast.first_after(last_historical_period).ok_or_else(|| {
            RestockError::Precondition(format!(
                "forecast for '{segment}' has no period after {last_historical_period}; horizon must be at least 1"
            ))
        })?;
        if !error_estimate.is_finite() || error_estimate < 0.0 {
            return Err(RestockError::Precondition(format!(
                "error estimate for '{segment}' must be finite and non-negative, got {error_estimate}"
            )));
        }

        let predicted_demand = target.yhat;
        let safety_stock = error_estimate * self.service_level_z;
        let recommended_order = predicted_demand + safety_stock;

        Ok(Recommendation {
            segment: segment.to_string(),
            forecast_period: target.period,
            predicted_demand,
            model_error: error_estimate,
            safety_stock,
            recommended_order,
            error_source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::forecast::ForecastPoint;
    use approx::assert_abs_diff_eq;

    fn date(y: i32, m: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, 1).unwrap()
    }

    fn point(period: NaiveDate, yhat: f64) -> ForecastPoint {
        ForecastPoint {
            period,
            yhat,
            yhat_lower: yhat - 50.0,
            yhat_upper: yhat + 50.0,
        }
    }

    fn forecast() -> Forecast {
        Forecast::new(
            vec![
                point(date(2017, 11), 900.0),
                point(date(2017, 12), 950.0),
                point(date(2018, 1), 1012.37),
                point(date(2018, 2), 1100.0),
            ],
            2,
        )
    }

    #[test]
    fn z_scores_match_normal_quantiles() {
        assert_abs_diff_eq!(z_for_service_level(0.95).unwrap(), 1.6449, epsilon = 1e-3);
        assert_abs_diff_eq!(z_for_service_level(0.5).unwrap(), 0.0);
        assert_abs_diff_eq!(z_for_service_level(0.05).unwrap(), -1.6449, epsilon = 1e-3);
        assert!(z_for_service_level(1.0).is_err());
        assert!(z_for_service_level(0.0).is_err());
    }

    #[test]
    fn advice_targets_first_future_period() {
        let rec = RestockAdvisor::new(1.65)
            .advise("Technology", &forecast(), date(2017, 12), 123.45, ErrorSource::CrossValidated)
            .unwrap();

        assert_eq!(rec.forecast_period, date(2018, 1));
        assert_eq!(rec.predicted_demand, 1012.37);
        assert_eq!(rec.safety_stock, 123.45 * 1.65);
        assert_eq!(rec.recommended_order, 1012.37 + 123.45 * 1.65);
        assert_eq!(rec.error_source, ErrorSource::CrossValidated);
    }

    #[test]
    fn arithmetic_is_exact_for_many_inputs() {
        let advisor = RestockAdvisor::new(2.33);
        for (i, error) in [0.0, 0.1, 7.77, 1234.5678, 1e6].iter().enumerate() {
            let rec = advisor
                .advise("s", &forecast(), date(2017, 10 + i as u32 % 2), *error, ErrorSource::InSampleResidual)
                .unwrap();
            assert_eq!(rec.safety_stock, *error * 2.33);
            assert_eq!(rec.recommended_order, rec.predicted_demand + rec.safety_stock);
        }
    }

    #[test]
    fn no_future_period_fails_loudly() {
        let err = RestockAdvisor::new(1.65)
            .advise("Furniture", &forecast(), date(2018, 2), 10.0, ErrorSource::CrossValidated)
            .unwrap_err();
        assert!(matches!(err, RestockError::Precondition(_)));
    }

    #[test]
    fn infinite_error_is_rejected() {
        let err = RestockAdvisor::new(1.65)
            .advise("Furniture", &forecast(), date(2017, 12), f64::INFINITY, ErrorSource::CrossValidated)
            .unwrap_err();
        assert!(matches!(err, RestockError::Precondition(_)));
    }
}
