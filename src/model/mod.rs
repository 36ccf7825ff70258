pub mod forecast;
pub mod params;
pub mod recommendation;
pub mod series;
pub mod transaction;
