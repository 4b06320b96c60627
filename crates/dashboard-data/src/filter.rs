//! Filter selections over the dataset.
//!
//! [`FilterDefaults`] is computed once per loaded dataset and resolves a
//! partially specified [`FilterRequest`] into a concrete [`FilterSelection`].

use std::collections::BTreeSet;

use dashboard_core::calendar;
use dashboard_core::error::{DashboardError, Result};
use dashboard_core::models::Record;
use serde::{Deserialize, Serialize};

// ── DayRange ──────────────────────────────────────────────────────────────────

/// Inclusive day-of-month range with `1 <= lo <= hi <= 31`.
///
/// Deserialisation goes through [`DayRange::new`], so a stored range is
/// checked the same way as one built in code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawDayRange")]
pub struct DayRange {
    lo: u32,
    hi: u32,
}

impl DayRange {
    pub const FIRST_DAY: u32 = 1;
    pub const LAST_DAY: u32 = 31;

    pub fn new(lo: u32, hi: u32) -> Result<Self> {
        if lo < Self::FIRST_DAY || hi > Self::LAST_DAY || lo > hi {
            return Err(DashboardError::InvalidDayRange { lo, hi });
        }
        Ok(Self { lo, hi })
    }

    /// The whole month, `[1, 31]`.
    pub fn full() -> Self {
        Self {
            lo: Self::FIRST_DAY,
            hi: Self::LAST_DAY,
        }
    }

    pub fn lo(&self) -> u32 {
        self.lo
    }

    pub fn hi(&self) -> u32 {
        self.hi
    }

    pub fn contains(&self, day: u32) -> bool {
        (self.lo..=self.hi).contains(&day)
    }
}

impl Default for DayRange {
    fn default() -> Self {
        Self::full()
    }
}

#[derive(Deserialize)]
struct RawDayRange {
    lo: u32,
    hi: u32,
}

impl TryFrom<RawDayRange> for DayRange {
    type Error = DashboardError;

    fn try_from(raw: RawDayRange) -> Result<Self> {
        DayRange::new(raw.lo, raw.hi)
    }
}

// ── FilterSelection ───────────────────────────────────────────────────────────

/// Conjunctive predicate over years, months and day of month.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterSelection {
    pub years: BTreeSet<String>,
    /// Two-digit months, e.g. `"01"`.
    pub months: BTreeSet<String>,
    pub days: DayRange,
}

impl FilterSelection {
    /// `true` when `record` satisfies all three dimensions.
    pub fn matches(&self, record: &Record) -> bool {
        self.years.contains(&record.year)
            && self.months.contains(&record.month)
            && self.days.contains(record.day())
    }

    /// Rows of `dataset` passing the selection, in original order.
    pub fn apply<'a>(&self, dataset: &'a [Record]) -> Vec<&'a Record> {
        dataset.iter().filter(|r| self.matches(r)).collect()
    }
}

// ── FilterRequest ─────────────────────────────────────────────────────────────

/// User-supplied filter values; `None` means "use the default".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterRequest {
    pub years: Option<Vec<String>>,
    pub months: Option<Vec<String>>,
    pub day_range: Option<(u32, u32)>,
}

// ── FilterDefaults ────────────────────────────────────────────────────────────

/// Default filter values: every observed year and month, the whole month.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterDefaults {
    /// Observed years, ascending.
    pub years: Vec<String>,
    /// Observed two-digit months, ascending.
    pub months: Vec<String>,
    pub days: DayRange,
}

impl FilterDefaults {
    /// Collect the observed years and months of `dataset`.
    pub fn from_dataset(dataset: &[Record]) -> Self {
        let years: BTreeSet<&str> = dataset.iter().map(|r| r.year.as_str()).collect();
        let months: BTreeSet<&str> = dataset.iter().map(|r| r.month.as_str()).collect();

        Self {
            years: years.into_iter().map(str::to_string).collect(),
            months: months.into_iter().map(str::to_string).collect(),
            days: DayRange::full(),
        }
    }

    /// The selection that keeps every row.
    pub fn selection(&self) -> FilterSelection {
        FilterSelection {
            years: self.years.iter().cloned().collect(),
            months: self.months.iter().cloned().collect(),
            days: self.days,
        }
    }

    /// Fill the gaps of `request` with these defaults.
    ///
    /// Months are normalised to two digits (`"3"` → `"03"`); a value outside
    /// `1..=12` is an error. An explicitly empty list selects nothing.
    pub fn resolve(&self, request: &FilterRequest) -> Result<FilterSelection> {
        let years = match &request.years {
            Some(years) => years.iter().map(|y| y.trim().to_string()).collect(),
            None => self.years.iter().cloned().collect(),
        };

        let months = match &request.months {
            Some(months) => months
                .iter()
                .map(|m| {
                    calendar::normalize_month(m)
                        .ok_or_else(|| DashboardError::InvalidMonth(m.clone()))
                })
                .collect::<Result<BTreeSet<String>>>()?,
            None => self.months.iter().cloned().collect(),
        };

        let days = match request.day_range {
            Some((lo, hi)) => DayRange::new(lo, hi)?,
            None => self.days,
        };

        Ok(FilterSelection {
            years,
            months,
            days,
        })
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
