//! Report pipeline: filtered rows → [`AggregateReport`].
//!
//! All statistics are computed from the filtered rows only. An empty
//! selection produces `None` for every statistic and empty tables, never a
//! panic.

use chrono::{Local, NaiveDateTime};
use dashboard_core::calendar;
use dashboard_core::models::{Rate, Record};
use dashboard_core::stats::{first_max, first_min, mode_smallest, DescriptiveStats, Extremum};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::aggregator::{Group, Heatmap, MonthlySeries, UsageAggregator, YearMonth};
use crate::filter::FilterSelection;

// ── Public types ──────────────────────────────────────────────────────────────

/// Span of the selected years, used for the report title.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportHeader {
    pub first_year: Option<String>,
    pub last_year: Option<String>,
    pub year_count: usize,
}

/// Overall metrics for the selection.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Overview {
    pub records: usize,
    pub total: Option<f64>,
    pub mean: Option<f64>,
}

/// The row holding the global maximum `Total`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PeakRecord {
    pub datetime: NaiveDateTime,
    pub total: f64,
}

/// Descriptive statistics for one tariff component.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RateSummary {
    pub rate: Rate,
    pub stats: Option<DescriptiveStats>,
}

/// Extremal statements of the summary section.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Insights {
    pub max_year: Option<Extremum<String>>,
    pub min_year: Option<Extremum<String>>,
    /// Month-of-year keys (`"01"`..`"12"`), summed across selected years.
    pub max_month: Option<Extremum<String>>,
    pub min_month: Option<Extremum<String>>,
    pub max_hour: Option<Extremum<u32>>,
    pub min_hour: Option<Extremum<u32>>,
    pub peak: Option<PeakRecord>,
    pub rates: Vec<RateSummary>,
    /// Most frequent hour among the rows tied for the maximum `Total`.
    pub peak_hour_mode: Option<u32>,
    /// Weekday names, e.g. `"Monday"`.
    pub max_weekday: Option<Extremum<String>>,
    pub min_weekday: Option<Extremum<String>>,
}

/// Metadata produced alongside the report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportMetadata {
    /// ISO-8601 timestamp when this report was generated.
    pub generated_at: String,
    /// Rows in the full dataset before filtering.
    pub rows_available: usize,
    /// Wall-clock seconds spent building the report.
    pub build_time_seconds: f64,
}

/// Everything derived from one filtered selection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AggregateReport {
    pub selection: FilterSelection,
    pub header: ReportHeader,
    pub overview: Overview,
    pub yearly: Vec<Group<String>>,
    pub monthly: Vec<Group<YearMonth>>,
    pub monthly_series: Vec<MonthlySeries>,
    pub month_of_year: Vec<Group<String>>,
    pub hourly: Vec<Group<u32>>,
    pub weekday: Vec<Group<String>>,
    pub heatmap: Heatmap,
    pub insights: Insights,
    pub metadata: ReportMetadata,
}

impl AggregateReport {
    /// `true` when the selection matched no rows.
    pub fn is_empty(&self) -> bool {
        self.overview.records == 0
    }
}

// ── Public functions ──────────────────────────────────────────────────────────

/// Filter `dataset` with `selection` and build the report.
pub fn analyze(dataset: &[Record], selection: &FilterSelection) -> AggregateReport {
    let rows = selection.apply(dataset);
    build_report(selection, &rows, dataset.len())
}

/// Build the report from already filtered `rows`.
pub fn build_report(
    selection: &FilterSelection,
    rows: &[&Record],
    rows_available: usize,
) -> AggregateReport {
    let start = std::time::Instant::now();

    let yearly = UsageAggregator::by_year(rows);
    let monthly = UsageAggregator::by_year_month(rows);
    let monthly_series = UsageAggregator::monthly_series(&monthly);
    let month_of_year = UsageAggregator::by_month(rows);
    let hourly = UsageAggregator::by_hour(rows);
    let weekday: Vec<Group<String>> = UsageAggregator::by_weekday(rows)
        .into_iter()
        .map(|g| Group {
            key: calendar::weekday_name(g.key).to_string(),
            stats: g.stats,
        })
        .collect();
    let heatmap = UsageAggregator::heatmap(rows);

    let insights = Insights {
        max_year: first_max(&UsageAggregator::sums(&yearly)),
        min_year: first_min(&UsageAggregator::sums(&yearly)),
        max_month: first_max(&UsageAggregator::sums(&month_of_year)),
        min_month: first_min(&UsageAggregator::sums(&month_of_year)),
        max_hour: first_max(&UsageAggregator::sums(&hourly)),
        min_hour: first_min(&UsageAggregator::sums(&hourly)),
        peak: peak_record(rows),
        rates: Rate::ALL
            .iter()
            .map(|&rate| rate_summary(rows, rate))
            .collect(),
        peak_hour_mode: peak_hour_mode(rows),
        max_weekday: first_max(&UsageAggregator::sums(&weekday)),
        min_weekday: first_min(&UsageAggregator::sums(&weekday)),
    };

    let report = AggregateReport {
        selection: selection.clone(),
        header: report_header(selection),
        overview: overview(rows),
        yearly,
        monthly,
        monthly_series,
        month_of_year,
        hourly,
        weekday,
        heatmap,
        insights,
        metadata: ReportMetadata {
            generated_at: Local::now().to_rfc3339(),
            rows_available,
            build_time_seconds: start.elapsed().as_secs_f64(),
        },
    };

    debug!(
        "Report built: {} of {} rows selected, {} years, {} hours",
        rows.len(),
        rows_available,
        report.yearly.len(),
        report.hourly.len()
    );

    report
}

/// First row, by original order, holding the maximum `Total`.
pub fn peak_record(rows: &[&Record]) -> Option<PeakRecord> {
    let max = max_total(rows)?;
    rows.iter()
        .find(|r| r.total == max)
        .map(|r| PeakRecord {
            datetime: r.datetime,
            total: r.total,
        })
}

/// Mode of the hour of day over all rows tied at the maximum `Total`;
/// the smallest hour wins a tie.
pub fn peak_hour_mode(rows: &[&Record]) -> Option<u32> {
    let max = max_total(rows)?;
    mode_smallest(rows.iter().filter(|r| r.total == max).map(|r| r.hour()))
}

// ── Private helpers ───────────────────────────────────────────────────────────

fn max_total(rows: &[&Record]) -> Option<f64> {
    rows.iter().map(|r| r.total).reduce(f64::max)
}

fn overview(rows: &[&Record]) -> Overview {
    if rows.is_empty() {
        return Overview::default();
    }
    let total: f64 = rows.iter().map(|r| r.total).sum();
    Overview {
        records: rows.len(),
        total: Some(total),
        mean: Some(total / rows.len() as f64),
    }
}

fn rate_summary(rows: &[&Record], rate: Rate) -> RateSummary {
    let values: Vec<f64> = rows.iter().map(|r| r.rate(rate)).collect();
    RateSummary {
        rate,
        stats: DescriptiveStats::from_values(&values),
    }
}

fn report_header(selection: &FilterSelection) -> ReportHeader {
    ReportHeader {
        first_year: selection.years.iter().next().cloned(),
        last_year: selection.years.iter().next_back().cloned(),
        year_count: selection.years.len(),
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
