use chrono::{Datelike, NaiveDateTime, Timelike, Weekday};
use serde::{Deserialize, Serialize};

use crate::calendar;

/// Column names shared by the input files and the combined dataset.
pub mod columns {
    pub const DATETIME: &str = "DateTime";
    pub const TOTAL: &str = "Total";
    pub const RATE_A: &str = "RATE A";
    pub const RATE_B: &str = "RATE B";
    pub const RATE_C: &str = "RATE C";
    pub const YEAR: &str = "Year";
    pub const MONTH: &str = "Month";
}

/// One of the three tariff-period consumption components.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Rate {
    #[serde(rename = "RATE A")]
    A,
    #[serde(rename = "RATE B")]
    B,
    #[serde(rename = "RATE C")]
    C,
}

impl Rate {
    /// All rates in report order.
    pub const ALL: [Rate; 3] = [Rate::A, Rate::B, Rate::C];

    /// Column header holding this rate.
    pub fn column(self) -> &'static str {
        match self {
            Rate::A => columns::RATE_A,
            Rate::B => columns::RATE_B,
            Rate::C => columns::RATE_C,
        }
    }
}

/// A single timestamped consumption observation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    /// Wall-clock timestamp of the interval.
    #[serde(rename = "DateTime")]
    pub datetime: NaiveDateTime,
    /// Total consumption for the interval (kWh).
    #[serde(rename = "Total")]
    pub total: f64,
    #[serde(rename = "RATE A")]
    pub rate_a: f64,
    #[serde(rename = "RATE B")]
    pub rate_b: f64,
    #[serde(rename = "RATE C")]
    pub rate_c: f64,
    /// Name of the source year directory; not validated as numeric.
    #[serde(rename = "Year")]
    pub year: String,
    /// Two-character zero-padded month, e.g. `"03"`.
    #[serde(rename = "Month")]
    pub month: String,
}

impl Record {
    /// Month as a number, or `0` when the stored value is not a valid month.
    pub fn month_number(&self) -> u32 {
        calendar::parse_month(&self.month).unwrap_or(0)
    }

    /// English month name derived from [`Record::month`].
    pub fn month_name(&self) -> &'static str {
        calendar::month_name(self.month_number())
    }

    pub fn hour(&self) -> u32 {
        self.datetime.hour()
    }

    /// Calendar day of month, `1..=31`.
    pub fn day(&self) -> u32 {
        self.datetime.day()
    }

    pub fn weekday(&self) -> Weekday {
        self.datetime.weekday()
    }

    /// Value of the given tariff component.
    pub fn rate(&self, rate: Rate) -> f64 {
        match rate {
            Rate::A => self.rate_a,
            Rate::B => self.rate_b,
            Rate::C => self.rate_c,
        }
    }
}

/// The combined dataset, in concatenation order.
pub type Dataset = Vec<Record>;
