pub mod calendar;
pub mod cross_validation;
pub mod metrics;
pub mod seasonal;
pub mod traits;
pub mod tuning;

#[cfg(test)]
pub(crate) mod testing {
    //! Deterministic model doubles for exercising the search and pipeline layers.

    use crate::error::FitError;
    use crate::forecasting::calendar::HolidayCalendar;
    use crate::forecasting::traits::{FittedModel, ForecastModel};
    use crate::model::forecast::{Forecast, ForecastPoint};
    use crate::model::params::Hyperparameters;
    use crate::model::series::{add_months, DemandSeries};
    use chrono::NaiveDate;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    /// Predicts `changepoint_prior_scale` everywhere, so a candidate's error is chosen by its params.
    #[derive(Debug, Clone, Copy, Default)]
    pub struct ConstantModel;

    #[derive(Debug)]
    pub struct FittedConstant {
        start: NaiveDate,
        n: usize,
        level: f64,
    }

    impl ForecastModel for ConstantModel {
        fn fit(
            &self,
            series: &DemandSeries,
            params: &Hyperparameters,
            _calendar: HolidayCalendar,
        ) -> Result<Box<dyn FittedModel>, FitError> {
            let start = match series.first_period() {
                Some(start) if series.len() >= 2 => start,
                _ => {
                    return Err(FitError::TooFewObservations {
                        needed: 2,
                        got: series.len(),
                    })
                }
            };
            Ok(Box::new(FittedConstant {
                start,
                n: series.len(),
                level: params.changepoint_prior_scale,
            }))
        }

        fn name(&self) -> &str {
            "Constant"
        }
    }

    impl FittedModel for FittedConstant {
        fn predict(&self, horizon: usize) -> Forecast {
            let points = (0..self.n + horizon)
                .map(|i| ForecastPoint {
                    period: add_months(self.start, i as u32),
                    yhat: self.level,
                    yhat_lower: self.level - 1.0,
                    yhat_upper: self.level + 1.0,
                })
                .collect();
            Forecast::new(points, self.n)
        }
    }

    /// [`ConstantModel`] that remembers the largest rayon pool any fit ran on.
    #[derive(Debug, Clone, Default)]
    pub struct ThreadCountingModel {
        max_threads: Arc<AtomicUsize>,
    }

    impl ThreadCountingModel {
        pub fn max_threads_seen(&self) -> usize {
            self.max_threads.load(Ordering::SeqCst)
        }
    }

    impl ForecastModel for ThreadCountingModel {
        fn fit(
            &self,
            series: &DemandSeries,
            params: &Hyperparameters,
            calendar: HolidayCalendar,
        ) -> Result<Box<dyn FittedModel>, FitError> {
            self.max_threads
                .fetch_max(rayon::current_num_threads(), Ordering::SeqCst);
            ConstantModel.fit(series, params, calendar)
        }

        fn name(&self) -> &str {
            "ThreadCounting"
        }
    }

    /// Fails every fit.
    #[derive(Debug, Clone, Copy, Default)]
    pub struct FailingModel;

    impl ForecastModel for FailingModel {
        fn fit(
            &self,
            _series: &DemandSeries,
            _params: &Hyperparameters,
            _calendar: HolidayCalendar,
        ) -> Result<Box<dyn FittedModel>, FitError> {
            Err(FitError::Singular)
        }

        fn name(&self) -> &str {
            "Failing"
        }
    }
}
