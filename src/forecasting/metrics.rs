// src/forecasting/metrics.rs

use crate::model::forecast::Forecast;
use crate::model::series::DemandSeries;

/// Root-mean-squared error. `None` when the inputs are empty or of unequal length.
pub fn rmse(actual: &[f64], predicted: &[f64]) -> Option<f64> {
    if actual.is_empty() || actual.len() != predicted.len() {
        return None;
    }
    let mse = actual
        .iter()
        .zip(predicted)
        .map(|(a, p)| (a - p).powi(2))
        .sum::<f64>()
        / actual.len() as f64;
    Some(mse.sqrt())
}

/// RMSE of in-sample residuals over the history the forecast was fitted on.
///
/// Residuals are `y - yhat` on the overlap; their mean is not subtracted.
pub fn residual_rmse(series: &DemandSeries, forecast: &Forecast) -> Option<f64> {
    let history = forecast.history();
    let overlap = history.len().min(series.len());
    let fitted: Vec<f64> = history[..overlap].iter().map(|p| p.yhat).collect();
    rmse(&series.values()[..overlap], &fitted)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn rmse_known_values() {
        let value = rmse(&[1.0, 2.0, 3.0], &[1.0, 2.0, 6.0]).unwrap();
        assert_relative_eq!(value, 3.0_f64.sqrt(), epsilon = 1e-12);
    }

    #[test]
    fn rmse_rejects_bad_shapes() {
        assert_eq!(rmse(&[], &[]), None);
        assert_eq!(rmse(&[1.0], &[1.0, 2.0]), None);
    }
}
