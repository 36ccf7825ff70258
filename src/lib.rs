//! Category-level restocking recommendations from transactional sales history.
//!
//! Sales lines are aggregated into monthly demand per category, a seasonal
//! regression forecasts the coming months, and the first future month is turned
//! into an order quantity: point forecast plus `model_error * z`.

pub mod error;
pub mod forecasting;
pub mod io;
pub mod model;
pub mod pipeline;
pub mod strategy;

pub use error::{FitError, RestockError, Result};
pub use forecasting::seasonal::SeasonalRegression;
pub use model::recommendation::{ErrorSource, Recommendation, Report, SkippedSegment};
pub use model::transaction::Transaction;
pub use pipeline::config::RestockConfig;
pub use pipeline::planner::RestockPlanner;
