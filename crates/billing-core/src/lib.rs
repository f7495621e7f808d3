//! Core types for the seller billing report.
//!
//! Holds the input records, the derived statistics, the monthly billing rule
//! shared by every aggregation, boundary validation and the CLI settings.

pub mod error;
pub mod models;
pub mod policy;
pub mod settings;
pub mod validation;

pub use error::{BillingError, Result};
