// src/model/series.rs

use crate::error::{RestockError, Result};
use chrono::{Datelike, Days, Months, NaiveDate};
use std::collections::hash_map::DefaultHasher;
use std::collections::BTreeMap;
use std::hash::{Hash, Hasher};

/// First day of the month containing `date` (the "MS" label).
pub fn month_start(date: NaiveDate) -> NaiveDate {
    date - Days::new(u64::from(date.day0()))
}

/// Month start `n` months after `period`.
pub fn add_months(period: NaiveDate, n: u32) -> NaiveDate {
    month_start(period) + Months::new(n)
}

/// A contiguous monthly demand series for one segment.
///
/// Periods are month starts, strictly increasing, with no gaps.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DemandSeries {
    periods: Vec<NaiveDate>,
    values: Vec<f64>,
}

impl DemandSeries {
    /// Builds a series from explicit periods, checking that they are contiguous months.
    pub fn new(periods: Vec<NaiveDate>, values: Vec<f64>) -> Result<Self> {
        if periods.len() != values.len() {
            return Err(RestockError::Precondition(format!(
                "{} periods but {} values",
                periods.len(),
                values.len()
            )));
        }
        for (i, period) in periods.iter().enumerate() {
            if month_start(*period) != *period {
                return Err(RestockError::Precondition(format!(
                    "period {period} is not a month start"
                )));
            }
            if i > 0 && add_months(periods[i - 1], 1) != *period {
                return Err(RestockError::Precondition(format!(
                    "period {period} does not follow {}",
                    periods[i - 1]
                )));
            }
        }
        Ok(Self { periods, values })
    }

    /// Builds a series of consecutive months beginning at the month of `start`.
    pub fn from_monthly(start: NaiveDate, values: Vec<f64>) -> Self {
        let first = month_start(start);
        let periods = (0..values.len() as u32)
            .map(|i| add_months(first, i))
            .collect();
        Self { periods, values }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn periods(&self) -> &[NaiveDate] {
        &self.periods
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn first_period(&self) -> Option<NaiveDate> {
        self.periods.first().copied()
    }

    pub fn last_period(&self) -> Option<NaiveDate> {
        self.periods.last().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (NaiveDate, f64)> + '_ {
        self.periods.iter().copied().zip(self.values.iter().copied())
    }

    /// The prefix of the series with periods on or before `cutoff`.
    pub fn through(&self, cutoff: NaiveDate) -> DemandSeries {
        let end = self.periods.partition_point(|p| *p <= cutoff);
        Self {
            periods: self.periods[..end].to_vec(),
            values: self.values[..end].to_vec(),
        }
    }

    /// Content hash used to detect changed input data.
    pub fn fingerprint(&self) -> u64 {
        let mut hasher = DefaultHasher::new();
        for (period, value) in self.iter() {
            period.hash(&mut hasher);
            value.to_bits().hash(&mut hasher);
        }
        hasher.finish()
    }
}

/// Collapses raw rows into a monthly demand series for one segment.
///
/// Rows failing `predicate` are ignored. Matching rows are summed per calendar month.
/// Months between the first and last observed month with no rows appear as zero.
/// No matching rows yields an empty series.
pub fn aggregate_monthly<T, P, D, V>(
    rows: &[T],
    predicate: P,
    date_of: D,
    value_of: V,
) -> DemandSeries
where
    P: Fn(&T) -> bool,
    D: Fn(&T) -> NaiveDate,
    V: Fn(&T) -> f64,
{
    let mut totals: BTreeMap<NaiveDate, f64> = BTreeMap::new();
    for row in rows.iter().filter(|row| predicate(row)) {
        *totals.entry(month_start(date_of(row))).or_insert(0.0) += value_of(row);
    }

    let (first, last) = match (totals.keys().next(), totals.keys().next_back()) {
        (Some(first), Some(last)) => (*first, *last),
        _ => return DemandSeries::default(),
    };

    let mut periods = Vec::new();
    let mut values = Vec::new();
    let mut period = first;
    while period <= last {
        periods.push(period);
        values.push(totals.get(&period).copied().unwrap_or(0.0));
        period = add_months(period, 1);
    }

    DemandSeries { periods, values }
}
