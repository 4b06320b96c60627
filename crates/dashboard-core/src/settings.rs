use std::ffi::OsString;
use std::path::{Path, PathBuf};

use clap::parser::ValueSource;
use clap::{ArgMatches, CommandFactory, FromArgMatches, Parser};
use serde::{Deserialize, Serialize};

use crate::error::{DashboardError, Result};
use crate::i18n::Language;

// ── Settings (CLI) ─────────────────────────────────────────────────────────────

/// Assemble monthly electricity CSV files and report on the combined dataset
#[derive(Parser, Debug, Clone)]
#[command(
    name = "energy-dashboard",
    about = "Assemble monthly electricity CSV files and report on the combined dataset",
    version
)]
pub struct Settings {
    /// What to run
    #[arg(long, default_value = "report", value_parser = ["assemble", "report"])]
    pub mode: String,

    /// Root directory holding one sub-directory per year
    #[arg(long, default_value = "preprocessingdata")]
    pub data_dir: PathBuf,

    /// Combined dataset file (written by assemble, read by report)
    #[arg(long, default_value = "combined_dataset.csv")]
    pub dataset: PathBuf,

    /// Years to include, comma separated (default: all)
    #[arg(long, value_delimiter = ',')]
    pub years: Vec<String>,

    /// Months to include, comma separated, e.g. 01,02 (default: all)
    #[arg(long, value_delimiter = ',')]
    pub months: Vec<String>,

    /// First day of month to include (1-31)
    #[arg(long, default_value = "1", value_parser = clap::value_parser!(u32).range(1..=31))]
    pub day_from: u32,

    /// Last day of month to include (1-31)
    #[arg(long, default_value = "31", value_parser = clap::value_parser!(u32).range(1..=31))]
    pub day_to: u32,

    /// Report language
    #[arg(long, default_value = "en", value_parser = ["en", "th"])]
    pub language: String,

    /// Report output format
    #[arg(long, default_value = "text", value_parser = ["text", "json"])]
    pub format: String,

    /// Append the filtered rows to the report
    #[arg(long)]
    pub show_rows: bool,

    /// Logging level
    #[arg(long, default_value = "INFO", value_parser = ["DEBUG", "INFO", "WARNING", "ERROR", "CRITICAL"])]
    pub log_level: String,

    /// Log file path
    #[arg(long)]
    pub log_file: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long)]
    pub debug: bool,

    /// Clear saved configuration
    #[arg(long)]
    pub clear: bool,
}

impl Settings {
    /// Parsed report language.
    pub fn language(&self) -> Result<Language> {
        self.language.parse()
    }
}

// ── Remembered parameters ──────────────────────────────────────────────────────

/// The subset of [`Settings`] carried over from one run to the next.
#[derive(Debug, Serialize, Deserialize, Default, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct LastUsedParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_dir: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dataset: Option<PathBuf>,
}

/// JSON file holding [`LastUsedParams`].
#[derive(Debug, Clone)]
pub struct ConfigStore {
    path: PathBuf,
}

impl ConfigStore {
    /// Application directory under the user's home.
    pub const DIR_NAME: &'static str = ".energy-dashboard";
    const FILE_NAME: &'static str = "last_used.json";

    /// `~/.energy-dashboard/last_used.json`, or relative to `.` without a home.
    pub fn in_home() -> Self {
        let home = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
        Self::under(&home)
    }

    pub fn under(base_dir: &Path) -> Self {
        Self {
            path: base_dir.join(Self::DIR_NAME).join(Self::FILE_NAME),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Remembered values; a missing or corrupt file yields the defaults.
    pub fn load(&self) -> LastUsedParams {
        let Ok(content) = std::fs::read_to_string(&self.path) else {
            return LastUsedParams::default();
        };
        serde_json::from_str(&content).unwrap_or_else(|e| {
            tracing::debug!(error = %e, path = %self.path.display(), "ignoring unreadable saved configuration");
            LastUsedParams::default()
        })
    }

    /// Write `params` through a sibling temp file so readers never see a
    /// partial document.
    pub fn save(&self, params: &LastUsedParams) -> Result<()> {
        if let Some(dir) = self.path.parent() {
            std::fs::create_dir_all(dir)?;
        }
        let json = serde_json::to_vec_pretty(params)
            .map_err(|e| DashboardError::Config(format!("cannot encode settings: {e}")))?;

        let staging = self.path.with_extension("json.tmp");
        std::fs::write(&staging, json)?;
        std::fs::rename(&staging, &self.path)?;
        Ok(())
    }

    /// Remove the file; a file that is already gone is not an error.
    pub fn clear(&self) -> Result<()> {
        match std::fs::remove_file(&self.path) {
            Err(e) if e.kind() != std::io::ErrorKind::NotFound => Err(e.into()),
            _ => Ok(()),
        }
    }
}

// ── Resolution ─────────────────────────────────────────────────────────────────

impl Settings {
    /// Settings for this process: command line first, then the values
    /// remembered in `~/.energy-dashboard/last_used.json`.
    pub fn load_with_last_used() -> Self {
        Self::resolve(std::env::args_os(), &ConfigStore::in_home())
    }

    /// Parse `args`, fill every remembered value the user did not type from
    /// `store`, and remember the result. `--clear` wipes the store instead.
    pub fn resolve<I, T>(args: I, store: &ConfigStore) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        let matches = Settings::command().get_matches_from(args);
        let mut settings = Settings::from_arg_matches(&matches).unwrap_or_else(|e| e.exit());

        if settings.debug {
            settings.log_level = "DEBUG".to_string();
        }

        if settings.clear {
            if let Err(e) = store.clear() {
                tracing::warn!(error = %e, "failed to clear saved configuration");
            }
            return settings;
        }

        let last = store.load();
        fill_unset(&matches, "language", &mut settings.language, last.language);
        fill_unset(&matches, "format", &mut settings.format, last.format);
        fill_unset(&matches, "data_dir", &mut settings.data_dir, last.data_dir);
        fill_unset(&matches, "dataset", &mut settings.dataset, last.dataset);

        if let Err(e) = store.save(&settings.remembered()) {
            tracing::debug!(error = %e, "could not persist last-used parameters");
        }
        settings
    }

    /// The values worth remembering for the next run.
    pub fn remembered(&self) -> LastUsedParams {
        LastUsedParams {
            language: Some(self.language.clone()),
            format: Some(self.format.clone()),
            data_dir: Some(self.data_dir.clone()),
            dataset: Some(self.dataset.clone()),
        }
    }
}

/// Replace `slot` with `remembered` unless flag `id` was typed on the command
/// line. Arg ids are the field names (underscores).
fn fill_unset<T>(matches: &ArgMatches, id: &str, slot: &mut T, remembered: Option<T>) {
    if matches.value_source(id) == Some(ValueSource::CommandLine) {
        return;
    }
    if let Some(value) = remembered {
        *slot = value;
    }
}

// ── Tests ──────────────────────────────────────────────────────────────────────
