//! Aggregation and input layer for the billing report.
//!
//! Loads seller and order records, groups orders by seller and month, runs
//! the monthly and per-seller aggregations and the top-level report pipeline.

pub mod aggregator;
pub mod analysis;
pub mod reader;

pub use billing_core as core;
