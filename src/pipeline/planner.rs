// src/pipeline/planner.rs

use crate::error::{RestockError, Result};
use crate::forecasting::traits::ForecastModel;
use crate::model::recommendation::{Recommendation, Report};
use crate::model::series::{aggregate_monthly, DemandSeries};
use crate::model::transaction::{segments_in_order, Transaction};
use crate::pipeline::cache::ForecastCache;
use crate::pipeline::config::RestockConfig;
use crate::pipeline::engine::{EngineOutput, ForecastEngine};
use crate::pipeline::report::ReportAssembler;
use crate::strategy::safety_stock::RestockAdvisor;
use std::sync::Arc;
use tracing::info;

/// Monthly demand for one category, gap-filled with zeros.
pub fn category_series(transactions: &[Transaction], category: &str) -> DemandSeries {
    aggregate_monthly(
        transactions,
        |tx| tx.category == category,
        |tx| tx.order_date,
        |tx| tx.sales,
    )
}

/// End-to-end restocking: aggregate, forecast, advise and assemble.
#[derive(Debug)]
pub struct RestockPlanner {
    config: RestockConfig,
    engine: ForecastEngine,
    advisor: RestockAdvisor,
    assembler: ReportAssembler,
    cache: ForecastCache,
}

impl RestockPlanner {
    pub fn new(config: RestockConfig, model: Arc<dyn ForecastModel>) -> Result<Self> {
        config.validate()?;
        let engine = ForecastEngine::from_config(&config, model);
        info!(
            strategy = engine.strategy().name(),
            horizon = config.horizon_periods,
            z = config.service_level_z,
            "planner ready"
        );
        Ok(Self {
            advisor: RestockAdvisor::new(config.service_level_z),
            assembler: ReportAssembler::new(config.workers)?,
            cache: ForecastCache::new(config.cache_capacity),
            engine,
            config,
        })
    }

    /// Forecast for one segment, served from the cache when the data is unchanged.
    ///
    /// Grid candidates are scored on the planner's worker pool.
    pub fn forecast_segment(&self, segment: &str, series: &DemandSeries) -> Result<EngineOutput> {
        self.assembler.install(|| {
            self.engine
                .run_cached(&self.cache, segment, series, self.config.horizon_periods)
        })
    }

    pub fn recommend_segment(&self, segment: &str, series: &DemandSeries) -> Result<Recommendation> {
        let last = series
            .last_period()
            .ok_or_else(|| RestockError::InsufficientData {
                segment: segment.to_string(),
                observations: 0,
            })?;
        let output = self.forecast_segment(segment, series)?;
        self.advisor
            .advise(segment, &output.forecast, last, output.error, output.error_source)
    }

    /// One recommendation per category, in order of first appearance.
    ///
    /// Categories that cannot be forecast are listed in [`Report::skipped`].
    pub fn plan(&self, transactions: &[Transaction]) -> Result<Report> {
        let segments = segments_in_order(transactions);
        info!(
            transactions = transactions.len(),
            segments = segments.len(),
            "planning restock"
        );
        self.assembler.assemble(&segments, |segment| {
            let series = category_series(transactions, segment);
            self.recommend_segment(segment, &series)
        })
    }

    /// Drops cached forecasts for one segment, or all of them.
    pub fn invalidate(&self, segment: Option<&str>) {
        match segment {
            Some(segment) => self.cache.invalidate_segment(segment),
            None => self.cache.clear(),
        }
    }

    pub fn cached_forecasts(&self) -> usize {
        self.cache.len()
    }
}
