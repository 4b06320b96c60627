//! Grouped aggregates of `Total` over a filtered dataset.
//!
//! Every grouping sums and counts `Total` per key; sums and means are both
//! available from [`GroupStats`]. Groups come back sorted by key.

use std::collections::BTreeMap;

use chrono::Weekday;
use dashboard_core::calendar::WEEKDAYS;
use dashboard_core::models::Record;
use serde::{Deserialize, Serialize};

// ── GroupStats ────────────────────────────────────────────────────────────────

/// Running sum and count of `Total`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct GroupStats {
    pub sum: f64,
    pub count: u32,
}

impl GroupStats {
    pub fn add(&mut self, value: f64) {
        self.sum += value;
        self.count += 1;
    }

    /// Arithmetic mean, `None` for an empty group.
    pub fn mean(&self) -> Option<f64> {
        if self.count == 0 {
            None
        } else {
            Some(self.sum / self.count as f64)
        }
    }
}

// ── Group ─────────────────────────────────────────────────────────────────────

/// One row of a grouped table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Group<K> {
    pub key: K,
    pub stats: GroupStats,
}

impl<K> Group<K> {
    pub fn total(&self) -> f64 {
        self.stats.sum
    }
}

/// Key of the (year, month) grouping; sorts by year then month.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct YearMonth {
    pub year: String,
    pub month: String,
    pub month_name: String,
}

/// One line of the monthly chart: a year's totals across months.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlySeries {
    pub year: String,
    /// `(month_name, total)` in month order.
    pub points: Vec<(String, f64)>,
}

// ── Heatmap ───────────────────────────────────────────────────────────────────

/// Mean `Total` by (hour of day, day of month).
///
/// Only observed hours and days appear on the axes; a combination with no
/// rows is `None` and must be drawn as a gap.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Heatmap {
    /// Observed hours, ascending (row axis).
    pub hours: Vec<u32>,
    /// Observed days, ascending (column axis).
    pub days: Vec<u32>,
    /// `values[h][d]` is the mean for `hours[h]`, `days[d]`.
    pub values: Vec<Vec<Option<f64>>>,
}

impl Heatmap {
    /// Mean for one cell, `None` if that combination never occurs.
    pub fn mean(&self, hour: u32, day: u32) -> Option<f64> {
        let h = self.hours.iter().position(|&x| x == hour)?;
        let d = self.days.iter().position(|&x| x == day)?;
        self.values[h][d]
    }

    pub fn is_empty(&self) -> bool {
        self.hours.is_empty()
    }
}

// ── UsageAggregator ───────────────────────────────────────────────────────────

/// Stateless helper that groups filtered rows by calendar keys.
pub struct UsageAggregator;

impl UsageAggregator {
    /// Sum per `Year`, ascending by year.
    pub fn by_year(rows: &[&Record]) -> Vec<Group<String>> {
        Self::aggregate_by(rows, |r| r.year.clone())
    }

    /// Sum per (`Year`, `Month`, month name).
    pub fn by_year_month(rows: &[&Record]) -> Vec<Group<YearMonth>> {
        Self::aggregate_by(rows, |r| YearMonth {
            year: r.year.clone(),
            month: r.month.clone(),
            month_name: r.month_name().to_string(),
        })
    }

    /// Sum per month of year across all selected years.
    pub fn by_month(rows: &[&Record]) -> Vec<Group<String>> {
        Self::aggregate_by(rows, |r| r.month.clone())
    }

    /// Sum and mean per hour of day (only observed hours).
    pub fn by_hour(rows: &[&Record]) -> Vec<Group<u32>> {
        Self::aggregate_by(rows, |r| r.hour())
    }

    /// Sum per weekday, Monday first (only observed weekdays).
    pub fn by_weekday(rows: &[&Record]) -> Vec<Group<Weekday>> {
        let by_index = Self::aggregate_by(rows, |r| r.weekday().num_days_from_monday());
        by_index
            .into_iter()
            .map(|g| Group {
                key: WEEKDAYS[g.key as usize],
                stats: g.stats,
            })
            .collect()
    }

    /// Mean `Total` pivot keyed by (hour, day of month).
    pub fn heatmap(rows: &[&Record]) -> Heatmap {
        let cells = Self::aggregate_by(rows, |r| (r.hour(), r.day()));
        if cells.is_empty() {
            return Heatmap::default();
        }

        let mut hours: Vec<u32> = cells.iter().map(|g| g.key.0).collect();
        hours.dedup();
        let mut days: Vec<u32> = cells.iter().map(|g| g.key.1).collect();
        days.sort_unstable();
        days.dedup();

        let mut values = vec![vec![None; days.len()]; hours.len()];
        for cell in &cells {
            let (hour, day) = cell.key;
            // Both positions exist: the axes were built from these keys.
            if let (Some(h), Some(d)) = (
                hours.iter().position(|&x| x == hour),
                days.iter().position(|&x| x == day),
            ) {
                values[h][d] = cell.stats.mean();
            }
        }

        Heatmap {
            hours,
            days,
            values,
        }
    }

    /// Pivot year-month groups into one series per year.
    pub fn monthly_series(groups: &[Group<YearMonth>]) -> Vec<MonthlySeries> {
        let mut series: Vec<MonthlySeries> = Vec::new();
        for g in groups {
            let point = (g.key.month_name.clone(), g.total());
            match series.last_mut() {
                Some(s) if s.year == g.key.year => s.points.push(point),
                _ => series.push(MonthlySeries {
                    year: g.key.year.clone(),
                    points: vec![point],
                }),
            }
        }
        series
    }

    /// Sum up the stats from all groups into a single [`GroupStats`].
    pub fn calculate_totals<K>(groups: &[Group<K>]) -> GroupStats {
        let mut totals = GroupStats::default();
        for g in groups {
            totals.sum += g.stats.sum;
            totals.count += g.stats.count;
        }
        totals
    }

    /// `(key, sum)` pairs for extremum lookups.
    pub fn sums<K: Clone>(groups: &[Group<K>]) -> Vec<(K, f64)> {
        groups.iter().map(|g| (g.key.clone(), g.total())).collect()
    }

    // ── Private ───────────────────────────────────────────────────────────────

    /// Generic aggregation driver; `BTreeMap` keeps the keys sorted.
    fn aggregate_by<K: Ord>(rows: &[&Record], key_fn: impl Fn(&Record) -> K) -> Vec<Group<K>> {
        let mut map: BTreeMap<K, GroupStats> = BTreeMap::new();
        for row in rows {
            map.entry(key_fn(row)).or_default().add(row.total);
        }
        map.into_iter()
            .map(|(key, stats)| Group { key, stats })
            .collect()
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
