//! Text presentation layer for the energy dashboard.
//!
//! Provides a width-aware plain-text table and the report view that lays
//! out overview metrics, grouped tables, the heatmap grid and the insight
//! statements in either supported language.

pub mod report_view;
pub mod table_view;

pub use dashboard_core as core;
