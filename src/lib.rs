//! synthmine: synthetic data for association mining
//!
//! A library for generating mixed-type datasets with controlled missingness,
//! discretizing them, and ranking predictor combinations that jointly explain
//! a categorical outcome.

pub mod cli;
pub mod pipeline;
pub mod report;
pub mod scenario;
pub mod utils;
