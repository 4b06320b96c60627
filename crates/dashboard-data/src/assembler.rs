//! Dataset assembly: `{root}/{year}/{MM...}.csv` → one combined CSV file.
//!
//! Every source file yields an explicit [`FileOutcome`]; a file that cannot
//! be read, or that holds a row the dataset loader would reject, is reported
//! and skipped without aborting the run.

use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use dashboard_core::calendar;
use dashboard_core::error::{DashboardError, Result};
use dashboard_core::models::columns;
use regex::Regex;
use tracing::{debug, info, warn};

use crate::reader::{row_line, strip_bom, ReadingColumns};

/// UTF-8 byte-order mark written at the start of the combined file.
pub const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

// ── Public types ──────────────────────────────────────────────────────────────

/// A CSV file discovered under a year directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    pub path: PathBuf,
    /// Name of the parent directory, used verbatim as `Year`.
    pub year: String,
    pub file_name: String,
}

/// Header plus string rows of a CSV file, cells kept verbatim.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

/// A source file that parsed successfully.
#[derive(Debug, Clone)]
pub struct LoadedFile {
    pub source: SourceFile,
    /// Two-digit month taken from the file name.
    pub month: String,
    pub table: RawTable,
}

/// A source file that was skipped, with the reason.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileFailure {
    pub path: PathBuf,
    pub reason: String,
}

/// Result of loading one source file.
#[derive(Debug, Clone)]
pub enum FileOutcome {
    Loaded(LoadedFile),
    Failed(FileFailure),
}

/// Summary of a successful assembly run.
#[derive(Debug, Clone)]
pub struct AssemblySummary {
    pub output: PathBuf,
    pub files_loaded: usize,
    pub rows_written: usize,
    pub columns: Vec<String>,
    pub failures: Vec<FileFailure>,
}

/// Outcome of [`assemble`].
#[derive(Debug, Clone)]
pub enum AssemblyOutcome {
    /// The combined file was written.
    Written(AssemblySummary),
    /// No source file could be loaded; nothing was written.
    NoData {
        root: PathBuf,
        failures: Vec<FileFailure>,
    },
}

impl AssemblyOutcome {
    /// Skipped files, whichever way the run ended.
    pub fn failures(&self) -> &[FileFailure] {
        match self {
            AssemblyOutcome::Written(summary) => &summary.failures,
            AssemblyOutcome::NoData { failures, .. } => failures,
        }
    }
}

// ── Public API ────────────────────────────────────────────────────────────────

/// Find `{root}/{year}/*.csv`, sorted by year directory then file name.
///
/// Files directly under `root` and anything deeper than one level are
/// ignored. A missing root yields an empty list.
pub fn discover_sources(root: &Path) -> Vec<SourceFile> {
    if !root.is_dir() {
        warn!("Data directory does not exist: {}", root.display());
        return Vec::new();
    }

    walkdir::WalkDir::new(root)
        .min_depth(2)
        .max_depth(2)
        .follow_links(true)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(e) => {
                warn!("Error reading directory entry under {}: {}", root.display(), e);
                None
            }
        })
        .filter(|entry| {
            entry.file_type().is_file()
                && entry
                    .path()
                    .extension()
                    .map(|ext| ext == "csv")
                    .unwrap_or(false)
        })
        .filter_map(|entry| {
            let year = entry
                .path()
                .parent()?
                .file_name()?
                .to_string_lossy()
                .into_owned();
            let file_name = entry.file_name().to_string_lossy().into_owned();
            Some(SourceFile {
                path: entry.into_path(),
                year,
                file_name,
            })
        })
        .collect()
}

/// Two-digit month prefix of `file_name`, e.g. `"03_usage.csv"` → `"03"`.
///
/// Returns `None` unless the first two characters are digits forming a
/// month in `01..=12`.
pub fn derive_month(file_name: &str) -> Option<String> {
    static PREFIX: OnceLock<Regex> = OnceLock::new();
    let re = PREFIX.get_or_init(|| Regex::new(r"^(\d{2})").expect("regex is valid"));

    let prefix = re.captures(file_name)?.get(1)?.as_str();
    calendar::parse_month(prefix).map(|_| prefix.to_string())
}

/// Read a CSV file into a [`RawTable`], requiring the source columns.
///
/// Every row must carry a parseable `DateTime` and finite numeric `Total`
/// and rate cells; the first bad cell fails the whole file.
pub fn read_raw_table(path: &Path) -> Result<RawTable> {
    let bytes = std::fs::read(path).map_err(|source| DashboardError::FileRead {
        path: path.to_path_buf(),
        source,
    })?;

    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_reader(strip_bom(&bytes));

    let headers: Vec<String> = rdr.headers()?.iter().map(str::to_string).collect();
    let reading = ReadingColumns::locate(headers.iter().map(String::as_str))?;

    let mut rows = Vec::new();
    for (i, record) in rdr.records().enumerate() {
        let record = record?;
        reading.parse(|idx| record.get(idx).unwrap_or(""), row_line(&record, i))?;
        rows.push(record.iter().map(str::to_string).collect());
    }

    Ok(RawTable { headers, rows })
}

/// Load one source file into an explicit success/failure outcome.
pub fn load_source(source: &SourceFile) -> FileOutcome {
    let Some(month) = derive_month(&source.file_name) else {
        return FileOutcome::Failed(FileFailure {
            path: source.path.clone(),
            reason: "file name does not start with a month number (01-12)".to_string(),
        });
    };

    match read_raw_table(&source.path) {
        Ok(table) => {
            debug!(
                "File {}: {} rows, year {}, month {}",
                source.path.display(),
                table.rows.len(),
                source.year,
                month
            );
            FileOutcome::Loaded(LoadedFile {
                source: source.clone(),
                month,
                table,
            })
        }
        Err(e) => FileOutcome::Failed(FileFailure {
            path: source.path.clone(),
            reason: e.to_string(),
        }),
    }
}

/// Concatenate loaded files into one table with `Year` and `Month` appended.
///
/// Columns are the union of all headers in first-seen order; a file lacking
/// a column contributes empty cells. Source columns named `Year` or `Month`
/// are replaced by the derived values.
pub fn combine(files: &[LoadedFile]) -> RawTable {
    let mut headers: Vec<String> = Vec::new();
    for file in files {
        for h in &file.table.headers {
            if h != columns::YEAR && h != columns::MONTH && !headers.contains(h) {
                headers.push(h.clone());
            }
        }
    }

    let mut rows = Vec::new();
    for file in files {
        let positions: Vec<Option<usize>> = headers
            .iter()
            .map(|h| file.table.headers.iter().position(|fh| fh == h))
            .collect();

        for row in &file.table.rows {
            let mut out: Vec<String> = positions
                .iter()
                .map(|pos| {
                    pos.and_then(|i| row.get(i))
                        .cloned()
                        .unwrap_or_default()
                })
                .collect();
            out.push(file.source.year.clone());
            out.push(file.month.clone());
            rows.push(out);
        }
    }

    headers.push(columns::YEAR.to_string());
    headers.push(columns::MONTH.to_string());

    RawTable { headers, rows }
}

/// Write `table` as UTF-8 CSV with a BOM, via a temp file and rename.
pub fn write_combined(table: &RawTable, output: &Path) -> Result<()> {
    if let Some(parent) = output.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let tmp = output.with_extension("csv.tmp");
    let written = write_staged(table, &tmp)
        .and_then(|()| std::fs::rename(&tmp, output).map_err(DashboardError::from));
    if written.is_err() {
        let _ = std::fs::remove_file(&tmp);
    }
    written
}

fn write_staged(table: &RawTable, tmp: &Path) -> Result<()> {
    let mut file = File::create(tmp)?;
    file.write_all(UTF8_BOM)?;

    let mut wtr = csv::Writer::from_writer(file);
    wtr.write_record(&table.headers)?;
    for row in &table.rows {
        wtr.write_record(row)?;
    }
    wtr.flush()?;
    Ok(())
}

/// Run the full assembly: discover, load, combine, write.
///
/// Only a failure to write the output is an `Err`; unreadable source files
/// are collected in the outcome's failure list.
pub fn assemble(root: &Path, output: &Path) -> Result<AssemblyOutcome> {
    let sources = discover_sources(root);
    debug!("Discovered {} CSV files under {}", sources.len(), root.display());

    let mut loaded: Vec<LoadedFile> = Vec::new();
    let mut failures: Vec<FileFailure> = Vec::new();
    for outcome in sources.iter().map(load_source) {
        match outcome {
            FileOutcome::Loaded(file) => loaded.push(file),
            FileOutcome::Failed(failure) => {
                warn!(
                    "Error reading file {}: {}",
                    failure.path.display(),
                    failure.reason
                );
                failures.push(failure);
            }
        }
    }

    if loaded.is_empty() {
        warn!("No data found in {}", root.display());
        return Ok(AssemblyOutcome::NoData {
            root: root.to_path_buf(),
            failures,
        });
    }

    let table = combine(&loaded);
    write_combined(&table, output)?;

    info!(
        "Combined dataset saved as {} ({} rows from {} files, {} skipped)",
        output.display(),
        table.rows.len(),
        loaded.len(),
        failures.len()
    );

    Ok(AssemblyOutcome::Written(AssemblySummary {
        output: output.to_path_buf(),
        files_loaded: loaded.len(),
        rows_written: table.rows.len(),
        columns: table.headers,
        failures,
    }))
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const HEADER: &str = "DateTime,Total,RATE A,RATE B,RATE C";

    fn write_csv(root: &Path, year: &str, name: &str, lines: &[&str]) -> PathBuf {
        let dir = root.join(year);
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join(name);
        std::fs::write(&path, lines.join("\n")).unwrap();
        path
    }

    fn valid_rows(n: usize) -> Vec<String> {
        let mut lines = vec![HEADER.to_string()];
        for i in 0..n {
            lines.push(format!("2023-01-{:02} 10:00:00,{}.0,1.0,2.0,3.0", i + 1, i + 1));
        }
        lines
    }

    fn write_valid(root: &Path, year: &str, name: &str, n: usize) {
        let lines = valid_rows(n);
        let refs: Vec<&str> = lines.iter().map(String::as_str).collect();
        write_csv(root, year, name, &refs);
    }

    fn read_output(path: &Path) -> (Vec<u8>, RawTable) {
        let bytes = std::fs::read(path).unwrap();
        let mut rdr = csv::Reader::from_reader(strip_bom(&bytes));
        let headers = rdr.headers().unwrap().iter().map(str::to_string).collect();
        let rows = rdr
            .records()
            .map(|r| r.unwrap().iter().map(str::to_string).collect())
            .collect();
        (bytes, RawTable { headers, rows })
    }

    // ── derive_month ──────────────────────────────────────────────────────────

    #[test]
    fn test_derive_month_from_prefix() {
        assert_eq!(derive_month("01.csv").as_deref(), Some("01"));
        assert_eq!(derive_month("12_december_usage.csv").as_deref(), Some("12"));
    }

    #[test]
    fn test_derive_month_rejects_non_month_prefix() {
        assert!(derive_month("1_jan.csv").is_none());
        assert!(derive_month("13.csv").is_none());
        assert!(derive_month("00.csv").is_none());
        assert!(derive_month("summary.csv").is_none());
    }

    // ── discover_sources ──────────────────────────────────────────────────────

    #[test]
    fn test_discover_sources_sorted_by_year_then_name() {
        let dir = TempDir::new().unwrap();
        write_valid(dir.path(), "2024", "02.csv", 1);
        write_valid(dir.path(), "2023", "11.csv", 1);
        write_valid(dir.path(), "2023", "03.csv", 1);

        let sources = discover_sources(dir.path());
        let keys: Vec<(&str, &str)> = sources
            .iter()
            .map(|s| (s.year.as_str(), s.file_name.as_str()))
            .collect();
        assert_eq!(
            keys,
            vec![("2023", "03.csv"), ("2023", "11.csv"), ("2024", "02.csv")]
        );
    }

    #[test]
    fn test_discover_sources_ignores_other_files() {
        let dir = TempDir::new().unwrap();
        write_valid(dir.path(), "2023", "01.csv", 1);
        write_csv(dir.path(), "2023", "notes.txt", &["hello"]);
        std::fs::write(dir.path().join("02.csv"), HEADER).unwrap();

        let sources = discover_sources(dir.path());
        assert_eq!(sources.len(), 1);
        assert_eq!(sources[0].file_name, "01.csv");
    }

    #[cfg(unix)]
    #[test]
    fn test_discover_sources_skips_unreadable_entries() {
        let dir = TempDir::new().unwrap();
        write_valid(dir.path(), "2023", "01.csv", 1);
        std::os::unix::fs::symlink(
            dir.path().join("gone.csv"),
            dir.path().join("2023").join("02.csv"),
        )
        .unwrap();

        let sources = discover_sources(dir.path());
        let names: Vec<&str> = sources.iter().map(|s| s.file_name.as_str()).collect();
        assert_eq!(names, vec!["01.csv"]);
    }

    #[test]
    fn test_discover_sources_missing_root() {
        let sources = discover_sources(Path::new("/tmp/does-not-exist-dashboard-xyz"));
        assert!(sources.is_empty());
    }

    // ── read_raw_table / load_source ──────────────────────────────────────────

    #[test]
    fn test_read_raw_table_missing_column_fails() {
        let dir = TempDir::new().unwrap();
        let path = write_csv(
            dir.path(),
            "2023",
            "01.csv",
            &["DateTime,Total,RATE A,RATE B", "2023-01-01 00:00:00,1,1,1"],
        );
        let err = read_raw_table(&path).unwrap_err();
        assert!(matches!(err, DashboardError::MissingColumn(ref c) if c == "RATE C"));
    }

    #[test]
    fn test_read_raw_table_ragged_row_fails() {
        let dir = TempDir::new().unwrap();
        let path = write_csv(
            dir.path(),
            "2023",
            "01.csv",
            &[HEADER, "2023-01-01 00:00:00,1,1,1,1,extra"],
        );
        assert!(matches!(
            read_raw_table(&path),
            Err(DashboardError::CsvParse(_))
        ));
    }

    #[test]
    fn test_read_raw_table_rejects_unparseable_cells() {
        let dir = TempDir::new().unwrap();
        let path = write_csv(
            dir.path(),
            "2023",
            "02.csv",
            &[HEADER, "2023-02-01 00:00:00,1,1,1,1", "not-a-date,oops,1,1,1"],
        );

        let err = read_raw_table(&path).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Invalid value 'not-a-date' in column 'DateTime' at line 3"
        );
    }

    #[test]
    fn test_read_raw_table_rejects_non_numeric_rate() {
        let dir = TempDir::new().unwrap();
        let path = write_csv(
            dir.path(),
            "2023",
            "02.csv",
            &[HEADER, "2023-02-01 00:00:00,1,1,n/a,1"],
        );

        match read_raw_table(&path) {
            Err(DashboardError::InvalidValue { column, line, value }) => {
                assert_eq!(column, "RATE B");
                assert_eq!(line, 2);
                assert_eq!(value, "n/a");
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_load_source_bad_name_is_failure() {
        let dir = TempDir::new().unwrap();
        write_valid(dir.path(), "2023", "xx.csv", 2);
        let sources = discover_sources(dir.path());

        match load_source(&sources[0]) {
            FileOutcome::Failed(f) => assert!(f.reason.contains("month")),
            FileOutcome::Loaded(_) => panic!("expected failure"),
        }
    }

    // ── combine ───────────────────────────────────────────────────────────────

    #[test]
    fn test_combine_unions_columns_and_appends_year_month() {
        let a = LoadedFile {
            source: SourceFile {
                path: PathBuf::from("2023/01.csv"),
                year: "2023".to_string(),
                file_name: "01.csv".to_string(),
            },
            month: "01".to_string(),
            table: RawTable {
                headers: vec!["DateTime".into(), "Total".into()],
                rows: vec![vec!["t1".into(), "1".into()]],
            },
        };
        let b = LoadedFile {
            source: SourceFile {
                path: PathBuf::from("2024/02.csv"),
                year: "2024".to_string(),
                file_name: "02.csv".to_string(),
            },
            month: "02".to_string(),
            table: RawTable {
                headers: vec!["Total".into(), "Meter".into(), "Month".into()],
                rows: vec![vec!["2".into(), "m-7".into(), "99".into()]],
            },
        };

        let table = combine(&[a, b]);
        assert_eq!(
            table.headers,
            vec!["DateTime", "Total", "Meter", "Year", "Month"]
        );
        assert_eq!(table.rows[0], vec!["t1", "1", "", "2023", "01"]);
        assert_eq!(table.rows[1], vec!["", "2", "m-7", "2024", "02"]);
    }

    // ── assemble ──────────────────────────────────────────────────────────────

    #[test]
    fn test_assemble_counts_valid_rows_and_failures() {
        let dir = TempDir::new().unwrap();
        let root = dir.path().join("pre");
        write_valid(&root, "2023", "01.csv", 3);
        write_valid(&root, "2023", "02.csv", 2);
        write_valid(&root, "2024", "01.csv", 4);
        // Two invalid files: missing columns and a bad name.
        write_csv(&root, "2023", "03.csv", &["DateTime,Total", "x,1"]);
        write_valid(&root, "2024", "summary.csv", 5);

        let output = dir.path().join("combined_dataset.csv");
        let outcome = assemble(&root, &output).unwrap();

        let AssemblyOutcome::Written(summary) = outcome else {
            panic!("expected written outcome");
        };
        assert_eq!(summary.files_loaded, 3);
        assert_eq!(summary.rows_written, 9);
        assert_eq!(summary.failures.len(), 2);

        let (_, table) = read_output(&output);
        assert_eq!(table.rows.len(), 9);
        assert_eq!(
            table.headers,
            vec!["DateTime", "Total", "RATE A", "RATE B", "RATE C", "Year", "Month"]
        );
    }

    #[test]
    fn test_assemble_skips_file_with_bad_cells() {
        let dir = TempDir::new().unwrap();
        let root = dir.path().join("pre");
        write_valid(&root, "2023", "01.csv", 2);
        write_csv(
            &root,
            "2023",
            "02.csv",
            &[HEADER, "2023-02-01 00:00:00,4,1,1,1", "not-a-date,oops,1,1,1"],
        );

        let output = dir.path().join("combined_dataset.csv");
        let AssemblyOutcome::Written(summary) = assemble(&root, &output).unwrap() else {
            panic!("expected written outcome");
        };

        assert_eq!(summary.files_loaded, 1);
        assert_eq!(summary.rows_written, 2);
        assert_eq!(summary.failures.len(), 1);
        assert!(summary.failures[0].path.ends_with("02.csv"));
        assert!(summary.failures[0]
            .reason
            .contains("Invalid value 'not-a-date' in column 'DateTime'"));

        let dataset = crate::reader::load_dataset(&output).unwrap();
        assert_eq!(dataset.len(), 2);
    }

    #[test]
    fn test_assemble_preserves_traversal_and_row_order() {
        let dir = TempDir::new().unwrap();
        let root = dir.path().join("pre");
        write_csv(
            &root,
            "2024",
            "01.csv",
            &[HEADER, "2024-01-01 00:00:00,7,1,1,1"],
        );
        write_csv(
            &root,
            "2023",
            "02.csv",
            &[HEADER, "2023-02-01 00:00:00,5,1,1,1", "2023-02-01 01:00:00,6,1,1,1"],
        );

        let output = dir.path().join("out.csv");
        assemble(&root, &output).unwrap();

        let (_, table) = read_output(&output);
        let totals: Vec<&str> = table.rows.iter().map(|r| r[1].as_str()).collect();
        assert_eq!(totals, vec!["5", "6", "7"]);
        assert_eq!(table.rows[0][5], "2023");
        assert_eq!(table.rows[0][6], "02");
        assert_eq!(table.rows[2][5], "2024");
    }

    #[test]
    fn test_assemble_writes_utf8_bom() {
        let dir = TempDir::new().unwrap();
        let root = dir.path().join("pre");
        write_valid(&root, "2023", "01.csv", 1);

        let output = dir.path().join("out.csv");
        assemble(&root, &output).unwrap();

        let (bytes, _) = read_output(&output);
        assert!(bytes.starts_with(UTF8_BOM));
        assert!(!dir.path().join("out.csv.tmp").exists());
    }

    #[test]
    fn test_write_combined_failure_removes_staging_file() {
        let dir = TempDir::new().unwrap();
        let output = dir.path().join("out.csv");
        // A non-empty directory in the way makes the final rename fail.
        std::fs::create_dir_all(output.join("occupied")).unwrap();

        let table = RawTable {
            headers: vec!["Total".into()],
            rows: vec![vec!["1".into()]],
        };

        assert!(write_combined(&table, &output).is_err());
        assert!(!dir.path().join("out.csv.tmp").exists());
        assert!(output.is_dir());
    }

    #[test]
    fn test_assemble_all_invalid_writes_nothing() {
        let dir = TempDir::new().unwrap();
        let root = dir.path().join("pre");
        write_csv(&root, "2023", "01.csv", &["Only,Wrong,Columns", "1,2,3"]);
        write_csv(&root, "2023", "02.csv", &[""]);

        let output = dir.path().join("combined_dataset.csv");
        let outcome = assemble(&root, &output).unwrap();

        assert!(matches!(outcome, AssemblyOutcome::NoData { .. }));
        assert_eq!(outcome.failures().len(), 2);
        assert!(!output.exists());
    }

    #[test]
    fn test_assemble_empty_root_is_no_data() {
        let dir = TempDir::new().unwrap();
        let output = dir.path().join("combined_dataset.csv");
        let outcome = assemble(dir.path(), &output).unwrap();

        assert!(matches!(outcome, AssemblyOutcome::NoData { .. }));
        assert!(outcome.failures().is_empty());
        assert!(!output.exists());
    }
}
