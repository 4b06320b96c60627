//! Data layer for the energy dashboard.
//!
//! Assembles the per-month CSV files into one combined dataset, loads that
//! dataset back into typed records, applies filter selections and computes
//! the grouped aggregates and insights that make up a report.

pub mod aggregator;
pub mod analysis;
pub mod assembler;
pub mod filter;
pub mod reader;

pub use dashboard_core as core;
