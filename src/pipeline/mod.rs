pub mod cache;
pub mod config;
pub mod engine;
pub mod planner;
pub mod report;
