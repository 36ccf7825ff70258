// src/pipeline/config.rs

use crate::error::{RestockError, Result};
use crate::forecasting::calendar::HolidayCalendar;
use crate::forecasting::cross_validation::CvSettings;
use crate::model::params::SearchGrid;
use chrono::Duration;

#[derive(Debug, Clone)]
pub struct RestockConfig {
    /// z-score applied to the model error; 1.65 is a 95% one-sided service level.
    pub service_level_z: f64,
    /// Months forecast past the last observed month.
    pub horizon_periods: usize,
    /// Shorter series skip tuning and use fallback parameters.
    pub min_history_periods: usize,
    /// `None` selects the single-fit residual path.
    pub search_grid: Option<SearchGrid>,
    pub cv: CvSettings,
    pub holidays: HolidayCalendar,
    /// Worker threads for the planner's segments and grid candidates; `None` uses one per core.
    pub workers: Option<usize>,
    /// Forecasts kept by the memoization layer.
    pub cache_capacity: usize,
}

impl Default for RestockConfig {
    fn default() -> Self {
        Self {
            service_level_z: 1.65,
            horizon_periods: 12,
            min_history_periods: 24,
            search_grid: Some(SearchGrid::default()),
            cv: CvSettings::default(),
            holidays: HolidayCalendar::UsFederal,
            workers: None,
            cache_capacity: 64,
        }
    }
}

impl RestockConfig {
    /// Configuration for interactive use: no grid search, fixed parameters.
    pub fn interactive() -> Self {
        Self {
            search_grid: None,
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<()> {
        if !self.service_level_z.is_finite() || self.service_level_z < 0.0 {
            return Err(RestockError::Config(format!(
                "service_level_z must be finite and non-negative, got {}",
                self.service_level_z
            )));
        }
        if self.horizon_periods == 0 {
            return Err(RestockError::Config(
                "horizon_periods must be at least 1".to_string(),
            ));
        }
        if self.min_history_periods < 2 {
            return Err(RestockError::Config(format!(
                "min_history_periods must be at least 2, got {}",
                self.min_history_periods
            )));
        }
        for (name, span) in [
            ("initial", self.cv.initial),
            ("period", self.cv.period),
            ("horizon", self.cv.horizon),
        ] {
            if span <= Duration::zero() {
                return Err(RestockError::Config(format!(
                    "cv {name} must be positive, got {} days",
                    span.num_days()
                )));
            }
        }
        if self.workers == Some(0) {
            return Err(RestockError::Config("workers must be at least 1".to_string()));
        }
        if let Some(grid) = &self.search_grid {
            grid.candidates()?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::params::Hyperparameters;

    #[test]
    fn defaults_are_valid() {
        let config = RestockConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.service_level_z, 1.65);
        assert_eq!(config.horizon_periods, 12);
        assert_eq!(config.min_history_periods, 24);
        assert_eq!(config.cv.initial, Duration::days(730));
        assert_eq!(config.cv.period, Duration::days(180));
        assert_eq!(config.cv.horizon, Duration::days(30));
        assert!(RestockConfig::interactive().search_grid.is_none());
    }

    #[test]
    fn rejects_bad_values() {
        let config = RestockConfig {
            horizon_periods: 0,
            ..RestockConfig::default()
        };
        assert!(matches!(config.validate(), Err(RestockError::Config(_))));

        let config = RestockConfig {
            service_level_z: f64::NAN,
            ..RestockConfig::default()
        };
        assert!(config.validate().is_err());

        let config = RestockConfig {
            workers: Some(0),
            ..RestockConfig::default()
        };
        assert!(config.validate().is_err());

        let config = RestockConfig {
            search_grid: Some(SearchGrid::new(Hyperparameters::SEARCH_BASE)),
            ..RestockConfig::default()
        };
        assert!(matches!(config.validate(), Err(RestockError::Precondition(_))));
    }
}
