//! Shared domain types for the energy dashboard.
//!
//! Holds the record model, error type, calendar helpers, magnitude
//! formatting, descriptive statistics, the bilingual label table and the
//! command-line settings used by every other crate in the workspace.

pub mod calendar;
pub mod error;
pub mod formatting;
pub mod i18n;
pub mod models;
pub mod settings;
pub mod stats;
