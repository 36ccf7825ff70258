// src/io/demand.rs

use crate::error::{RestockError, Result};
use crate::model::series::add_months;
use crate::model::transaction::Transaction;
use chrono::{Datelike, NaiveDate};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, Normal};
use std::f64::consts::PI;

/// Shape of one category's synthetic monthly demand.
#[derive(Debug, Clone, PartialEq)]
pub struct DemandProfile {
    pub category: String,
    /// Expected monthly sales in the first month.
    pub base: f64,
    /// Added to the expected sales every month.
    pub trend: f64,
    /// Relative swing of the yearly cycle, peaking in late autumn.
    pub seasonal_amplitude: f64,
    /// Standard deviation of the monthly noise, relative to the expected level.
    pub noise: f64,
}

impl DemandProfile {
    pub fn new(category: impl Into<String>, base: f64, trend: f64) -> Self {
        Self {
            category: category.into(),
            base,
            trend,
            seasonal_amplitude: 0.3,
            noise: 0.1,
        }
    }

    fn expected(&self, month_index: usize, month_of_year: u32) -> f64 {
        let level = self.base + self.trend * month_index as f64;
        let phase = 2.0 * PI * (month_of_year as f64 - 8.0) / 12.0;
        level * (1.0 + self.seasonal_amplitude * phase.sin())
    }
}

/// Three retail categories with distinct level and growth.
pub fn default_profiles() -> Vec<DemandProfile> {
    vec![
        DemandProfile::new("Furniture", 14_000.0, 120.0),
        DemandProfile::new("Office Supplies", 12_000.0, 180.0),
        DemandProfile::new("Technology", 16_000.0, 250.0),
    ]
}

/// Generates a reproducible transaction log.
///
/// Each category's monthly total is drawn from a Normal around its seasonal trend,
/// clamped at zero, and split across a few orders on random days of the month.
pub fn generate_transactions(
    seed: u64,
    start: NaiveDate,
    months: usize,
    profiles: &[DemandProfile],
) -> Result<Vec<Transaction>> {
    let mut rng = StdRng::seed_from_u64(seed);
    let start = NaiveDate::from_ymd_opt(start.year(), start.month(), 1).unwrap_or(start);
    let mut transactions = Vec::new();

    for m in 0..months {
        let period = add_months(start, m as u32);
        let days = days_in_month(period);
        for profile in profiles {
            let mean = profile.expected(m, period.month());
            let normal = Normal::new(mean, (mean * profile.noise).abs())
                .map_err(|e| RestockError::Config(format!("{}: {e}", profile.category)))?;
            let total = normal.sample(&mut rng).max(0.0);

            let orders = rng.gen_range(3..=8);
            let mut weights: Vec<f64> = (0..orders).map(|_| rng.gen_range(0.5..1.5)).collect();
            let sum: f64 = weights.iter().sum();
            weights.iter_mut().for_each(|w| *w /= sum);

            for weight in weights {
                let day = rng.gen_range(1..=days);
                let date = period.with_day(day).unwrap_or(period);
                let sales = (total * weight * 100.0).round() / 100.0;
                transactions.push(Transaction::new(date, profile.category.clone(), sales));
            }
        }
    }

    Ok(transactions)
}

fn days_in_month(period: NaiveDate) -> u32 {
    let next = add_months(period, 1);
    (next - period).num_days() as u32
}
