// src/model/transaction.rs

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};

/// One sales line from the transaction log.
///
/// Only the columns the forecaster needs are kept; any others in the source are ignored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    #[serde(deserialize_with = "deserialize_order_date")]
    pub order_date: NaiveDate,
    pub category: String,
    pub sales: f64,
}

impl Transaction {
    pub fn new(order_date: NaiveDate, category: impl Into<String>, sales: f64) -> Self {
        Self {
            order_date,
            category: category.into(),
            sales,
        }
    }
}

/// Accepts `YYYY-MM-DD` with an optional trailing time component.
fn deserialize_order_date<'de, D>(deserializer: D) -> Result<NaiveDate, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    let day = raw.trim().get(..10).unwrap_or(raw.trim());
    NaiveDate::parse_from_str(day, "%Y-%m-%d").map_err(serde::de::Error::custom)
}

/// Distinct segment labels in order of first appearance.
pub fn segments_in_order(transactions: &[Transaction]) -> Vec<String> {
    let mut segments: Vec<String> = Vec::new();
    for tx in transactions {
        if !segments.iter().any(|s| s == &tx.category) {
            segments.push(tx.category.clone());
        }
    }
    segments
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_dates_with_time_suffix() {
        let data = "order_id,order_date,category,sales,profit\n\
                    CA-1,2016-11-08 00:00:00,Furniture,261.96,41.9\n\
                    CA-2,2016-11-09,Technology,14.62,6.87\n";
        let mut rdr = csv::Reader::from_reader(data.as_bytes());
        let rows: Vec<Transaction> = rdr.deserialize().collect::<Result<_, _>>().unwrap();

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].order_date, NaiveDate::from_ymd_opt(2016, 11, 8).unwrap());
        assert_eq!(rows[1].category, "Technology");
    }

    #[test]
    fn segments_keep_first_seen_order() {
        let d = NaiveDate::from_ymd_opt(2016, 1, 1).unwrap();
        let rows = vec![
            Transaction::new(d, "Technology", 1.0),
            Transaction::new(d, "Furniture", 1.0),
            Transaction::new(d, "Technology", 1.0),
            Transaction::new(d, "Office Supplies", 1.0),
        ];
        assert_eq!(
            segments_in_order(&rows),
            vec!["Technology", "Furniture", "Office Supplies"]
        );
    }
}
