pub mod implementations;
pub mod safety_stock;
pub mod traits;
