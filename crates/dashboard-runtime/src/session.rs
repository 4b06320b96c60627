//! Request/response report session.
//!
//! Each [`ReportSession::run`] call re-reads the (cached) dataset, resolves
//! the request against the dataset's [`FilterDefaults`] and recomputes the
//! whole report. Nothing but the parsed dataset is kept between calls.

use std::path::PathBuf;

use dashboard_core::error::Result;
use dashboard_core::models::Record;
use dashboard_data::analysis::{build_report, AggregateReport};
use dashboard_data::filter::{FilterDefaults, FilterRequest};

use crate::data_manager::DataManager;

/// The report for one request plus the rows it was computed from.
#[derive(Debug, Clone)]
pub struct ReportOutcome {
    pub report: AggregateReport,
    /// Filtered rows in original order.
    pub rows: Vec<Record>,
}

/// Report driver bound to one combined dataset file.
pub struct ReportSession {
    manager: DataManager,
    /// Defaults and the dataset generation they were computed from.
    defaults: Option<(u64, FilterDefaults)>,
}

impl ReportSession {
    pub fn new(dataset_path: impl Into<PathBuf>) -> Self {
        Self::with_manager(DataManager::new(dataset_path))
    }

    pub fn with_manager(manager: DataManager) -> Self {
        Self {
            manager,
            defaults: None,
        }
    }

    /// Filter defaults of the current dataset (all observed years and months).
    pub fn defaults(&mut self) -> Result<FilterDefaults> {
        self.manager.get_dataset(false)?;
        Ok(self.current_defaults()?.clone())
    }

    /// Resolve `request` and build the report over the filtered rows.
    pub fn run(&mut self, request: &FilterRequest) -> Result<ReportOutcome> {
        let selection = self.current_defaults()?.resolve(request)?;

        let dataset = self.manager.get_dataset(false)?;
        let rows: Vec<&Record> = selection.apply(dataset);
        let report = build_report(&selection, &rows, dataset.len());

        tracing::info!(
            selected = rows.len(),
            available = dataset.len(),
            "report computed"
        );

        Ok(ReportOutcome {
            report,
            rows: rows.into_iter().cloned().collect(),
        })
    }

    /// Defaults for the cached dataset, recomputed after every reload.
    fn current_defaults(&mut self) -> Result<&FilterDefaults> {
        self.manager.get_dataset(false)?;
        let generation = self.manager.generation();

        let entry = match self.defaults.take() {
            Some(entry) if entry.0 == generation => entry,
            _ => {
                let dataset = self.manager.cached().map(|d| d.as_slice());
                let defaults = FilterDefaults::from_dataset(dataset.unwrap_or_default());
                tracing::debug!(
                    years = defaults.years.len(),
                    months = defaults.months.len(),
                    generation,
                    "filter defaults computed"
                );
                (generation, defaults)
            }
        };
        Ok(&self.defaults.insert(entry).1)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
