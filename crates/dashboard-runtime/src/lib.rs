//! Runtime layer for the energy dashboard.
//!
//! Caches the loaded combined dataset between requests and drives one full
//! filter-and-report pass per request.

pub mod data_manager;
pub mod session;

pub use dashboard_core as core;
pub use dashboard_data as data;
