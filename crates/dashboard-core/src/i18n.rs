//! Bilingual labels for report output.
//!
//! Numbers are computed once and shared; only the surrounding text is looked
//! up per [`Language`].

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::DashboardError;

/// Output language for report labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Language {
    #[default]
    #[serde(rename = "en")]
    English,
    #[serde(rename = "th")]
    Thai,
}

impl Language {
    /// Short tag used on the command line and in persisted settings.
    pub fn tag(self) -> &'static str {
        match self {
            Language::English => "en",
            Language::Thai => "th",
        }
    }

    fn column(self) -> usize {
        match self {
            Language::English => 0,
            Language::Thai => 1,
        }
    }
}

impl FromStr for Language {
    type Err = DashboardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "en" | "english" => Ok(Language::English),
            "th" | "thai" | "ภาษาไทย" => Ok(Language::Thai),
            other => Err(DashboardError::Config(format!("unknown language: {other}"))),
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// Every piece of report text that has a translation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Label {
    DashboardTitle,
    AnalysisTitle,
    OverallMetrics,
    TotalEnergy,
    AverageEnergy,
    RecordCount,
    YearlyConsumption,
    MonthlyConsumption,
    WeekdayConsumption,
    HourlyAverage,
    HourlyHeatmap,
    SummaryInsights,
    HighestYear,
    LowestYear,
    HighestMonth,
    LowestMonth,
    HighestHour,
    LowestHour,
    PeakDateTime,
    RateAnalysis,
    Maximum,
    Minimum,
    Average,
    StandardDeviation,
    AdditionalInsights,
    PeakHourMode,
    HighestWeekday,
    LowestWeekday,
    FilteredData,
    NoData,
    Year,
    Month,
    Hour,
    Day,
    Weekday,
    Total,
}

/// `[english, thai]` pairs, indexed by `Language::column`.
fn entry(label: Label) -> [&'static str; 2] {
    match label {
        Label::DashboardTitle => ["Electricity Consumption Dashboard", "แดชบอร์ดการใช้ไฟฟ้า"],
        Label::AnalysisTitle => ["Electricity Consumption Analysis", "การวิเคราะห์การใช้ไฟฟ้า"],
        Label::OverallMetrics => ["Overall Metrics", "ตัวชี้วัดโดยรวม"],
        Label::TotalEnergy => ["Total Energy (kWh)", "พลังงานรวม (kWh)"],
        Label::AverageEnergy => [
            "Average Energy per Interval (kWh)",
            "พลังงานเฉลี่ยต่อช่วงเวลา (kWh)",
        ],
        Label::RecordCount => ["Records", "จำนวนข้อมูล"],
        Label::YearlyConsumption => [
            "Yearly Electricity Consumption",
            "การใช้ไฟฟ้ารายปี",
        ],
        Label::MonthlyConsumption => [
            "Monthly Electricity Consumption",
            "การใช้ไฟฟ้ารายเดือน",
        ],
        Label::WeekdayConsumption => [
            "Electricity Consumption by Weekday",
            "การใช้ไฟฟ้าตามวันในสัปดาห์",
        ],
        Label::HourlyAverage => [
            "Average Electricity Usage by Hour",
            "การใช้ไฟฟ้าเฉลี่ยรายชั่วโมง",
        ],
        Label::HourlyHeatmap => [
            "Hourly Electricity Usage Heatmap",
            "แผนที่ความร้อนการใช้ไฟฟ้ารายชั่วโมง",
        ],
        Label::SummaryInsights => ["Summary Insights", "สรุปข้อมูล"],
        Label::HighestYear => [
            "Year with the highest electricity usage:",
            "ปีที่ใช้ไฟฟ้ามากที่สุด:",
        ],
        Label::LowestYear => [
            "Year with the lowest electricity usage:",
            "ปีที่ใช้ไฟฟ้าน้อยที่สุด:",
        ],
        Label::HighestMonth => [
            "Month with the highest electricity usage:",
            "เดือนที่ใช้ไฟฟ้ามากที่สุด:",
        ],
        Label::LowestMonth => [
            "Month with the lowest electricity usage:",
            "เดือนที่ใช้ไฟฟ้าน้อยที่สุด:",
        ],
        Label::HighestHour => [
            "Hour with the highest electricity usage:",
            "ช่วงเวลาที่ใช้ไฟฟ้ามากที่สุด:",
        ],
        Label::LowestHour => [
            "Hour with the lowest electricity usage:",
            "ช่วงเวลาที่ใช้ไฟฟ้าน้อยที่สุด:",
        ],
        Label::PeakDateTime => [
            "DateTime with the highest electricity usage:",
            "วันที่และเวลาที่ใช้ไฟฟ้ามากที่สุด:",
        ],
        Label::RateAnalysis => ["RATE Analysis (A, B, C)", "การวิเคราะห์ RATE (A, B, C)"],
        Label::Maximum => ["Maximum:", "ค่าสูงสุด:"],
        Label::Minimum => ["Minimum:", "ค่าต่ำสุด:"],
        Label::Average => ["Average:", "ค่าเฉลี่ย:"],
        Label::StandardDeviation => ["Standard Deviation:", "ส่วนเบี่ยงเบนมาตรฐาน:"],
        Label::AdditionalInsights => ["Additional Insights", "การวิเคราะห์เพิ่มเติม"],
        Label::PeakHourMode => [
            "Most frequent peak usage hour:",
            "ช่วงเวลาที่เกิด Peak สูงสุดบ่อยที่สุด:",
        ],
        Label::HighestWeekday => [
            "Weekday with the highest total electricity usage:",
            "วันที่ใช้ไฟฟ้ามากที่สุดในสัปดาห์:",
        ],
        Label::LowestWeekday => [
            "Weekday with the lowest total electricity usage:",
            "วันที่ใช้ไฟฟ้าน้อยที่สุดในสัปดาห์:",
        ],
        Label::FilteredData => ["Filtered Data Table", "ตารางข้อมูลที่กรองแล้ว"],
        Label::NoData => [
            "No data matches the current filters.",
            "ไม่มีข้อมูลที่ตรงกับตัวกรอง",
        ],
        Label::Year => ["Year", "ปี"],
        Label::Month => ["Month", "เดือน"],
        Label::Hour => ["Hour", "ชั่วโมง"],
        Label::Day => ["Day", "วัน"],
        Label::Weekday => ["Weekday", "วันในสัปดาห์"],
        Label::Total => ["Total (kWh)", "รวม (kWh)"],
    }
}

/// Text for `label` in `language`.
///
/// ```
/// use dashboard_core::i18n::{label, Label, Language};
///
/// assert_eq!(label(Language::English, Label::Maximum), "Maximum:");
/// assert_eq!(label(Language::Thai, Label::Maximum), "ค่าสูงสุด:");
/// ```
pub fn label(language: Language, label: Label) -> &'static str {
    entry(label)[language.column()]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_language_from_str() {
        assert_eq!("en".parse::<Language>().unwrap(), Language::English);
        assert_eq!("TH".parse::<Language>().unwrap(), Language::Thai);
        assert_eq!("ภาษาไทย".parse::<Language>().unwrap(), Language::Thai);
        assert!("fr".parse::<Language>().is_err());
    }

    #[test]
    fn test_language_tag_round_trip() {
        for lang in [Language::English, Language::Thai] {
            assert_eq!(lang.tag().parse::<Language>().unwrap(), lang);
        }
    }

    #[test]
    fn test_label_variants_differ_per_language() {
        for l in [Label::HighestYear, Label::LowestWeekday, Label::RateAnalysis] {
            assert_ne!(label(Language::English, l), label(Language::Thai, l));
        }
    }

    #[test]
    fn test_language_serde_uses_tag() {
        let json = serde_json::to_string(&Language::Thai).unwrap();
        assert_eq!(json, "\"th\"");
    }
}
