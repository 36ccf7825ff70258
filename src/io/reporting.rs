// src/io/reporting.rs

use crate::error::Result;
use crate::model::forecast::ForecastPoint;
use crate::model::recommendation::{Recommendation, Report};
use crate::model::transaction::Transaction;
use serde::Serialize;
use std::path::Path;
use tracing::info;

/// One line of the restocking plan CSV.
#[derive(Debug, Clone, Serialize)]
struct PlanRow<'a> {
    segment: &'a str,
    forecast_period: String,
    predicted_demand: f64,
    model_error: f64,
    safety_stock: f64,
    recommended_order: f64,
}

impl<'a> From<&'a Recommendation> for PlanRow<'a> {
    fn from(rec: &'a Recommendation) -> Self {
        Self {
            segment: &rec.segment,
            forecast_period: rec.forecast_period.format("%Y-%m-%d").to_string(),
            predicted_demand: round2(rec.predicted_demand),
            model_error: round2(rec.model_error),
            safety_stock: round2(rec.safety_stock),
            recommended_order: round2(rec.recommended_order),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
struct ForecastRow {
    period: String,
    yhat: f64,
    yhat_lower: f64,
    yhat_upper: f64,
}

/// Rounding to cents happens only here; in-memory values keep full precision.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Reads a transaction log. Columns other than `order_date`, `category` and `sales` are ignored.
pub fn read_transactions(path: impl AsRef<Path>) -> Result<Vec<Transaction>> {
    let path = path.as_ref();
    let mut rdr = csv::Reader::from_path(path)?;
    let rows = rdr
        .deserialize()
        .collect::<std::result::Result<Vec<Transaction>, csv::Error>>()?;
    info!(rows = rows.len(), path = %path.display(), "loaded transactions");
    Ok(rows)
}

/// Writes the restocking plan, one row per recommended segment.
pub fn write_report(path: impl AsRef<Path>, report: &Report) -> Result<()> {
    let path = path.as_ref();
    let mut wtr = csv::Writer::from_path(path)?;
    for rec in &report.recommendations {
        wtr.serialize(PlanRow::from(rec))?;
    }
    wtr.flush()?;

    info!(rows = report.len(), path = %path.display(), "exported restocking plan");
    Ok(())
}

/// Writes a forecast table (`period, yhat, yhat_lower, yhat_upper`).
pub fn write_forecast(path: impl AsRef<Path>, points: &[ForecastPoint]) -> Result<()> {
    let path = path.as_ref();
    let mut wtr = csv::Writer::from_path(path)?;
    for point in points {
        wtr.serialize(ForecastRow {
            period: point.period.format("%Y-%m-%d").to_string(),
            yhat: round2(point.yhat),
            yhat_lower: round2(point.yhat_lower),
            yhat_upper: round2(point.yhat_upper),
        })?;
    }
    wtr.flush()?;
    Ok(())
}

/// File-name-safe form of a segment label.
pub fn segment_file_stem(segment: &str) -> String {
    segment
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c.to_ascii_lowercase() } else { '_' })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::recommendation::{ErrorSource, SkippedSegment};
    use chrono::NaiveDate;
    use std::fs;
    use tempfile::tempdir;

    fn report() -> Report {
        Report {
            recommendations: vec![Recommendation {
                segment: "Technology".to_string(),
                forecast_period: NaiveDate::from_ymd_opt(2018, 1, 1).unwrap(),
                predicted_demand: 1012.3749,
                model_error: 123.456,
                safety_stock: 123.456 * 1.65,
                recommended_order: 1012.3749 + 123.456 * 1.65,
                error_source: ErrorSource::CrossValidated,
            }],
            skipped: vec![SkippedSegment {
                segment: "Empty".to_string(),
                reason: "no data".to_string(),
            }],
        }
    }

    #[test]
    fn plan_csv_has_fixed_columns_and_rounded_values() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("plan.csv");
        write_report(&path, &report()).unwrap();

        let text = fs::read_to_string(&path).unwrap();
        let mut lines = text.lines();
        assert_eq!(
            lines.next(),
            Some("segment,forecast_period,predicted_demand,model_error,safety_stock,recommended_order")
        );
        assert_eq!(lines.next(), Some("Technology,2018-01-01,1012.37,123.46,203.7,1216.08"));
        assert_eq!(lines.next(), None);
    }

    #[test]
    fn reads_transactions_ignoring_extra_columns() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("sales.csv");
        fs::write(
            &path,
            "Row ID,order_date,category,sales,profit\n\
             1,2014-01-06,Furniture,100.5,3\n\
             2,2014-02-11 00:00:00,Technology,20,1\n",
        )
        .unwrap();

        let rows = read_transactions(&path).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1].category, "Technology");
        assert_eq!(rows[1].order_date, NaiveDate::from_ymd_opt(2014, 2, 11).unwrap());
    }

    #[test]
    fn missing_file_is_an_error() {
        let dir = tempdir().unwrap();
        assert!(read_transactions(dir.path().join("absent.csv")).is_err());
    }

    #[test]
    fn forecast_table_round_trips_to_disk() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("forecast.csv");
        let point = ForecastPoint {
            period: NaiveDate::from_ymd_opt(2017, 1, 1).unwrap(),
            yhat: 10.005,
            yhat_lower: 8.0,
            yhat_upper: 12.0,
        };
        write_forecast(&path, &[point]).unwrap();
        let text = fs::read_to_string(&path).unwrap();
        assert!(text.starts_with("period,yhat,yhat_lower,yhat_upper\n2017-01-01,"));
    }

    #[test]
    fn file_stems_are_safe() {
        assert_eq!(segment_file_stem("Office Supplies"), "office_supplies");
    }
}
