//! Plain-text rendering of an [`AggregateReport`].
//!
//! The layout mirrors the dashboard page: title, overall metrics, the chart
//! tables (yearly, monthly, hourly, weekday, heatmap), summary insights, rate
//! analysis and, optionally, the filtered rows. Labels come from
//! [`dashboard_core::i18n`]; numbers are identical in both languages.

use dashboard_core::calendar;
use dashboard_core::formatting::{
    format_hour, format_magnitude, format_magnitude_or_na, format_number, format_number_or_na,
    NOT_AVAILABLE,
};
use dashboard_core::i18n::{label, Label, Language};
use dashboard_core::models::{columns, Record};
use dashboard_core::stats::Extremum;
use dashboard_data::analysis::{AggregateReport, ReportHeader};
use dashboard_data::aggregator::Heatmap;

use crate::table_view::TextTable;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Presentation choices for [`render_report`].
#[derive(Debug, Clone, Copy, Default)]
pub struct RenderOptions {
    pub language: Language,
    /// Append the filtered rows as a table.
    pub show_rows: bool,
}

/// Render the full report. `rows` is only used when
/// [`RenderOptions::show_rows`] is set.
pub fn render_report(report: &AggregateReport, rows: &[Record], options: RenderOptions) -> String {
    let lang = options.language;
    let mut sections = vec![
        render_title(&report.header, lang),
        render_overview(report, lang),
        render_yearly(report, lang),
        render_monthly(report, lang),
        render_hourly(report, lang),
        render_weekday(report, lang),
        render_heatmap(&report.heatmap, lang),
        render_insights(report, lang),
        render_rates(report, lang),
        render_additional(report, lang),
    ];
    if options.show_rows {
        sections.push(render_rows(rows, lang));
    }
    sections.join("\n")
}

/// Dynamic analysis title, e.g.
/// `"Electricity Consumption Analysis for 2022 - 2023 (Over 2 Years)"`.
///
/// Without any selected year only the bare title is returned.
pub fn analysis_title(header: &ReportHeader, language: Language) -> String {
    let base = label(language, Label::AnalysisTitle);
    let (Some(first), Some(last)) = (&header.first_year, &header.last_year) else {
        return base.to_string();
    };
    let count = header.year_count;
    match language {
        Language::English => {
            let plural = if count > 1 { "s" } else { "" };
            format!("{base} for {first} - {last} (Over {count} Year{plural})")
        }
        Language::Thai => format!("{base} ปี {first} - {last} (รวม {count} ปี)"),
    }
}

// ── Sections ──────────────────────────────────────────────────────────────────

fn render_title(header: &ReportHeader, lang: Language) -> String {
    let title = label(lang, Label::DashboardTitle);
    format!(
        "{title}\n{}\n{}\n",
        "=".repeat(title.chars().count()),
        analysis_title(header, lang)
    )
}

fn render_overview(report: &AggregateReport, lang: Language) -> String {
    let overview = &report.overview;
    let mut out = heading(label(lang, Label::OverallMetrics));
    out.push_str(&format!(
        "  {}: {}\n",
        label(lang, Label::RecordCount),
        format_number(overview.records as f64, 0)
    ));
    out.push_str(&format!(
        "  {}: {}\n",
        label(lang, Label::TotalEnergy),
        format_number_or_na(overview.total, 2)
    ));
    out.push_str(&format!(
        "  {}: {}\n",
        label(lang, Label::AverageEnergy),
        format_magnitude_or_na(overview.mean)
    ));
    if report.is_empty() {
        out.push_str(&format!("  {}\n", label(lang, Label::NoData)));
    }
    out
}

fn render_yearly(report: &AggregateReport, lang: Language) -> String {
    let mut table = TextTable::new([label(lang, Label::Year), label(lang, Label::Total)])
        .title(label(lang, Label::YearlyConsumption));
    for group in &report.yearly {
        table.push_row(vec![group.key.clone(), format_magnitude(group.total())]);
    }
    finish(table, lang)
}

/// One row per year, one column per selected month.
fn render_monthly(report: &AggregateReport, lang: Language) -> String {
    let month_names: Vec<&str> = report
        .month_of_year
        .iter()
        .map(|g| calendar::parse_month(&g.key).map_or("", calendar::month_name))
        .collect();

    let mut headers = vec![label(lang, Label::Year)];
    headers.extend(month_names.iter().copied());
    let mut table = TextTable::new(headers).title(label(lang, Label::MonthlyConsumption));

    for series in &report.monthly_series {
        let mut cells = vec![series.year.clone()];
        cells.extend(month_names.iter().map(|name| {
            series
                .points
                .iter()
                .find(|(month, _)| month == name)
                .map(|(_, total)| format_magnitude(*total))
                .unwrap_or_default()
        }));
        table.push_row(cells);
    }
    finish(table, lang)
}

fn render_hourly(report: &AggregateReport, lang: Language) -> String {
    let mut table = TextTable::new([label(lang, Label::Hour), label(lang, Label::Total)])
        .title(label(lang, Label::HourlyAverage));
    for group in &report.hourly {
        table.push_row(vec![
            format_hour(group.key),
            format_magnitude_or_na(group.stats.mean()),
        ]);
    }
    finish(table, lang)
}

fn render_weekday(report: &AggregateReport, lang: Language) -> String {
    let mut table = TextTable::new([label(lang, Label::Weekday), label(lang, Label::Total)])
        .title(label(lang, Label::WeekdayConsumption));
    for group in &report.weekday {
        table.push_row(vec![group.key.clone(), format_magnitude(group.total())]);
    }
    finish(table, lang)
}

/// Hour rows by day columns; combinations without data stay blank.
fn render_heatmap(heatmap: &Heatmap, lang: Language) -> String {
    let corner = format!("{} \\ {}", label(lang, Label::Hour), label(lang, Label::Day));
    let mut headers = vec![corner];
    headers.extend(heatmap.days.iter().map(u32::to_string));
    let mut table = TextTable::new(headers).title(label(lang, Label::HourlyHeatmap));

    for (hour, values) in heatmap.hours.iter().zip(&heatmap.values) {
        let mut cells = vec![format_hour(*hour)];
        cells.extend(
            values
                .iter()
                .map(|v| v.map(format_magnitude).unwrap_or_default()),
        );
        table.push_row(cells);
    }
    finish(table, lang)
}

fn render_insights(report: &AggregateReport, lang: Language) -> String {
    let insights = &report.insights;
    let month_key = |key: &String| {
        calendar::parse_month(key)
            .map(calendar::month_name)
            .unwrap_or_default()
            .to_string()
    };

    let mut out = heading(label(lang, Label::SummaryInsights));
    let lines = [
        extremum_line(lang, Label::HighestYear, insights.max_year.as_ref(), String::clone),
        extremum_line(lang, Label::LowestYear, insights.min_year.as_ref(), String::clone),
        extremum_line(lang, Label::HighestMonth, insights.max_month.as_ref(), month_key),
        extremum_line(lang, Label::LowestMonth, insights.min_month.as_ref(), month_key),
        extremum_line(lang, Label::HighestHour, insights.max_hour.as_ref(), |h| format_hour(*h)),
        extremum_line(lang, Label::LowestHour, insights.min_hour.as_ref(), |h| format_hour(*h)),
        match &insights.peak {
            Some(peak) => format!(
                "- {} {} ({} kWh)",
                label(lang, Label::PeakDateTime),
                peak.datetime.format(TIMESTAMP_FORMAT),
                format_magnitude(peak.total)
            ),
            None => format!("- {} {NOT_AVAILABLE}", label(lang, Label::PeakDateTime)),
        },
    ];
    for line in lines {
        out.push_str(&line);
        out.push('\n');
    }
    out
}

fn render_rates(report: &AggregateReport, lang: Language) -> String {
    let mut out = heading(label(lang, Label::RateAnalysis));
    for summary in &report.insights.rates {
        let stats = summary.stats.as_ref();
        out.push_str(&format!("- {}:\n", summary.rate.column()));
        let values = [
            (Label::Maximum, stats.map(|s| s.max)),
            (Label::Minimum, stats.map(|s| s.min)),
            (Label::Average, stats.map(|s| s.mean)),
            (Label::StandardDeviation, stats.and_then(|s| s.std_dev)),
        ];
        for (name, value) in values {
            out.push_str(&format!(
                "  - {} {}\n",
                label(lang, name),
                format_magnitude_or_na(value)
            ));
        }
    }
    out
}

fn render_additional(report: &AggregateReport, lang: Language) -> String {
    let insights = &report.insights;
    let mut out = heading(label(lang, Label::AdditionalInsights));
    out.push_str(&format!(
        "- {} {}\n",
        label(lang, Label::PeakHourMode),
        insights
            .peak_hour_mode
            .map(format_hour)
            .unwrap_or_else(|| NOT_AVAILABLE.to_string())
    ));
    for (name, value) in [
        (Label::HighestWeekday, insights.max_weekday.as_ref()),
        (Label::LowestWeekday, insights.min_weekday.as_ref()),
    ] {
        out.push_str(&extremum_line(lang, name, value, String::clone));
        out.push('\n');
    }
    out
}

fn render_rows(rows: &[Record], lang: Language) -> String {
    let mut table = TextTable::new([
        columns::DATETIME,
        columns::TOTAL,
        columns::RATE_A,
        columns::RATE_B,
        columns::RATE_C,
        columns::YEAR,
        columns::MONTH,
    ])
    .title(label(lang, Label::FilteredData));
    for record in rows {
        table.push_row(vec![
            record.datetime.format(TIMESTAMP_FORMAT).to_string(),
            format_number(record.total, 2),
            format_number(record.rate_a, 2),
            format_number(record.rate_b, 2),
            format_number(record.rate_c, 2),
            record.year.clone(),
            record.month.clone(),
        ]);
    }
    finish(table, lang)
}

// ── Helpers ───────────────────────────────────────────────────────────────────

fn heading(text: &str) -> String {
    format!("{text}\n")
}

/// Render `table`, or its header plus the no-data notice when it has no rows.
fn finish(table: TextTable, lang: Language) -> String {
    let mut out = table.render();
    if table.is_empty() {
        out.push_str(label(lang, Label::NoData));
        out.push('\n');
    }
    out
}

fn extremum_line<K>(
    lang: Language,
    name: Label,
    extremum: Option<&Extremum<K>>,
    key: impl Fn(&K) -> String,
) -> String {
    match extremum {
        Some(e) => format!(
            "- {} {} ({} kWh)",
            label(lang, name),
            key(&e.key),
            format_magnitude(e.value)
        ),
        None => format!("- {} {NOT_AVAILABLE}", label(lang, name)),
    }
}

// ── Tests ──────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use dashboard_data::analysis::analyze;
    use dashboard_data::filter::{FilterDefaults, FilterRequest};

    fn record(ts: (i32, u32, u32, u32), total: f64, year: &str, month: &str) -> Record {
        let (y, m, d, h) = ts;
        Record {
            datetime: NaiveDate::from_ymd_opt(y, m, d)
                .unwrap()
                .and_hms_opt(h, 0, 0)
                .unwrap(),
            total,
            rate_a: total / 2.0,
            rate_b: total / 4.0,
            rate_c: total / 4.0,
            year: year.to_string(),
            month: month.to_string(),
        }
    }

    fn dataset() -> Vec<Record> {
        vec![
            record((2022, 5, 1, 10), 10.0, "2022", "05"),
            record((2023, 5, 2, 11), 2_000.0, "2023", "05"),
            record((2023, 6, 20, 12), 30.0, "2023", "06"),
        ]
    }

    fn full_report(data: &[Record]) -> AggregateReport {
        analyze(data, &FilterDefaults::from_dataset(data).selection())
    }

    fn english() -> RenderOptions {
        RenderOptions::default()
    }

    #[test]
    fn test_analysis_title_plural_and_singular() {
        let mut header = ReportHeader {
            first_year: Some("2022".to_string()),
            last_year: Some("2023".to_string()),
            year_count: 2,
        };
        assert_eq!(
            analysis_title(&header, Language::English),
            "Electricity Consumption Analysis for 2022 - 2023 (Over 2 Years)"
        );

        header.last_year = Some("2022".to_string());
        header.year_count = 1;
        assert!(analysis_title(&header, Language::English).ends_with("(Over 1 Year)"));
    }

    #[test]
    fn test_analysis_title_without_years() {
        let header = ReportHeader::default();
        assert_eq!(
            analysis_title(&header, Language::English),
            "Electricity Consumption Analysis"
        );
    }

    #[test]
    fn test_render_english_report_sections() {
        let data = dataset();
        let text = render_report(&full_report(&data), &data, english());

        assert!(text.contains("Electricity Consumption Dashboard"));
        assert!(text.contains("Total Energy (kWh): 2,040.00"));
        assert!(text.contains("Average Energy per Interval (kWh): 680.00"));
        assert!(text.contains("Year with the highest electricity usage: 2023 (2.03K kWh)"));
        assert!(text.contains("Month with the highest electricity usage: May (2.01K kWh)"));
        assert!(text.contains("Hour with the lowest electricity usage: 10:00 (10.00 kWh)"));
        assert!(text.contains(
            "DateTime with the highest electricity usage: 2023-05-02 11:00:00 (2.00K kWh)"
        ));
        assert!(text.contains("Most frequent peak usage hour: 11:00"));
        assert!(text.contains("- RATE A:"));
        assert!(!text.contains(NOT_AVAILABLE));
        // Rows table only on request.
        assert!(!text.contains("Filtered Data Table"));
    }

    #[test]
    fn test_render_thai_labels_same_numbers() {
        let data = dataset();
        let report = full_report(&data);
        let en = render_report(&report, &data, english());
        let th = render_report(
            &report,
            &data,
            RenderOptions {
                language: Language::Thai,
                show_rows: false,
            },
        );

        assert!(th.contains("ปีที่ใช้ไฟฟ้ามากที่สุด: 2023 (2.03K kWh)"));
        assert!(th.contains("พลังงานรวม (kWh): 2,040.00"));
        assert!(en.contains("2,040.00"));
        assert!(!th.contains("Year with the highest"));
    }

    #[test]
    fn test_render_empty_selection_prints_na() {
        let data = dataset();
        let defaults = FilterDefaults::from_dataset(&data);
        let selection = defaults
            .resolve(&FilterRequest {
                years: Some(vec!["1999".to_string()]),
                ..FilterRequest::default()
            })
            .unwrap();
        let report = analyze(&data, &selection);
        let text = render_report(&report, &[], english());

        assert!(text.contains("Total Energy (kWh): N/A"));
        assert!(text.contains("Year with the highest electricity usage: N/A"));
        assert!(text.contains("Standard Deviation: N/A"));
        assert!(text.contains("Most frequent peak usage hour: N/A"));
        assert!(text.contains("No data matches the current filters."));
    }

    #[test]
    fn test_heatmap_leaves_gaps_blank() {
        let data = dataset();
        let text = render_heatmap(&full_report(&data).heatmap, Language::English);
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines[0], "Hourly Electricity Usage Heatmap");
        assert!(lines[1].starts_with("Hour \\ Day"));
        // 10:00 only has data on day 1.
        let ten = lines.iter().find(|l| l.starts_with("10:00")).unwrap();
        assert_eq!(ten.split_whitespace().collect::<Vec<_>>(), vec!["10:00", "10.00"]);
    }

    #[test]
    fn test_weekday_section_is_titled() {
        let data = dataset();
        let report = full_report(&data);

        let text = render_weekday(&report, Language::English);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "Electricity Consumption by Weekday");
        assert!(lines[1].starts_with("Weekday"));
        assert!(text.contains("Tuesday") && text.contains("2.03K"));

        let thai = render_weekday(&report, Language::Thai);
        assert!(thai.starts_with("การใช้ไฟฟ้าตามวันในสัปดาห์"));
    }

    #[test]
    fn test_monthly_pivot_has_one_row_per_year() {
        let data = dataset();
        let text = render_monthly(&full_report(&data), Language::English);
        let lines: Vec<&str> = text.lines().collect();

        assert!(lines[1].contains("May") && lines[1].contains("June"));
        assert!(lines[3].starts_with("2022"));
        assert!(lines[4].starts_with("2023"));
        assert!(lines[4].contains("2.00K") && lines[4].contains("30.00"));
    }

    #[test]
    fn test_show_rows_appends_table() {
        let data = dataset();
        let text = render_report(
            &full_report(&data),
            &data,
            RenderOptions {
                language: Language::English,
                show_rows: true,
            },
        );
        assert!(text.contains("Filtered Data Table"));
        assert!(text.contains("2023-06-20 12:00:00"));
    }
}
