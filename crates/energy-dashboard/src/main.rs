mod bootstrap;

use anyhow::Result;
use dashboard_core::error::DashboardError;
use dashboard_core::settings::Settings;
use dashboard_data::assembler::{assemble, AssemblyOutcome, FileFailure};
use dashboard_data::filter::FilterRequest;
use dashboard_runtime::session::{ReportOutcome, ReportSession};
use dashboard_ui::report_view::{render_report, RenderOptions};

fn main() -> Result<()> {
    let settings = Settings::load_with_last_used();

    bootstrap::ensure_directories()?;
    bootstrap::setup_logging(&settings.log_level, settings.log_file.as_ref())?;

    tracing::info!("Energy Dashboard v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        "Mode: {}, Language: {}, Format: {}",
        settings.mode,
        settings.language,
        settings.format
    );

    match settings.mode.as_str() {
        "assemble" => run_assemble(&settings),
        "report" => run_report(&settings),
        unknown => anyhow::bail!("Unknown mode: {unknown}"),
    }
}

// ── Modes ─────────────────────────────────────────────────────────────────────

fn run_assemble(settings: &Settings) -> Result<()> {
    tracing::info!(
        "Assembling {} into {}",
        settings.data_dir.display(),
        settings.dataset.display()
    );

    let outcome = assemble(&settings.data_dir, &settings.dataset)?;
    print_failures(outcome.failures());

    match outcome {
        AssemblyOutcome::Written(summary) => {
            println!(
                "Combined dataset saved to {} ({} rows from {} files, {} skipped)",
                summary.output.display(),
                summary.rows_written,
                summary.files_loaded,
                summary.failures.len()
            );
            Ok(())
        }
        AssemblyOutcome::NoData { root, .. } => Err(DashboardError::NoData(root).into()),
    }
}

fn run_report(settings: &Settings) -> Result<()> {
    let language = settings.language()?;
    let request = filter_request(settings);

    let mut session = ReportSession::new(&settings.dataset);
    let outcome = session.run(&request)?;

    let output = match settings.format.as_str() {
        "json" => render_json(&outcome, settings.show_rows)?,
        _ => render_report(
            &outcome.report,
            &outcome.rows,
            RenderOptions {
                language,
                show_rows: settings.show_rows,
            },
        ),
    };
    println!("{output}");
    Ok(())
}

// ── Helpers ───────────────────────────────────────────────────────────────────

/// Translate CLI filter flags into a request; an absent list means "all".
fn filter_request(settings: &Settings) -> FilterRequest {
    let list = |values: &[String]| (!values.is_empty()).then(|| values.to_vec());
    FilterRequest {
        years: list(&settings.years),
        months: list(&settings.months),
        day_range: Some((settings.day_from, settings.day_to)),
    }
}

fn render_json(outcome: &ReportOutcome, show_rows: bool) -> Result<String> {
    let mut value = serde_json::json!({ "report": serde_json::to_value(&outcome.report)? });
    if show_rows {
        value["rows"] = serde_json::to_value(&outcome.rows)?;
    }
    Ok(serde_json::to_string_pretty(&value)?)
}

fn print_failures(failures: &[FileFailure]) {
    for failure in failures {
        eprintln!("Skipped {}: {}", failure.path.display(), failure.reason);
    }
}

// ── Tests ──────────────────────────────────────────────────────────────────────
