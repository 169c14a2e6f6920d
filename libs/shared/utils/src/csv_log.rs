use std::path::Path;

use shared_models::HourlyMetrics;
use thiserror::Error;
use tracing::info;

#[derive(Error, Debug)]
pub enum CsvLogError {
    #[error("failed to write simulation log: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to serialize row: {0}")]
    Csv(#[from] csv::Error),
}

/// Writes the per-run hourly metrics log (spec.md §6 "CSV output"):
/// `log_<ddMMHHmmss>.csv`, one row per simulated hour, with the fixed
/// 10-column header from §4.10.
pub fn write_hourly_log(path: &Path, rows: &[HourlyMetrics]) -> Result<(), CsvLogError> {
    let mut writer = csv::WriterBuilder::new().has_headers(false).from_path(path)?;

    writer.write_record([
        "Hour",
        "Arrivals",
        "Waiting",
        "Treating",
        "Available Rooms",
        "Total Treatment Seconds",
        "Avg Treatment Seconds",
        "Total Wait Seconds",
        "Avg Wait Seconds",
        "Total Arrivals Cumulative",
    ])?;

    for row in rows {
        writer.write_record([
            row.hour_index.to_string(),
            row.arrivals_this_hour.to_string(),
            row.waiting_size.to_string(),
            row.treating_size.to_string(),
            row.available_rooms.to_string(),
            row.total_treatment_seconds.to_string(),
            row.avg_treatment_seconds.to_string(),
            row.total_wait_seconds.to_string(),
            row.avg_wait_seconds.to_string(),
            row.total_arrivals_cum.to_string(),
        ])?;
    }

    writer.flush()?;
    info!(path = %path.display(), rows = rows.len(), "wrote hourly simulation log");
    Ok(())
}

/// Builds the `log_<ddMMHHmmss>.csv` filename for a given local timestamp.
/// Takes the formatted stamp rather than `Utc::now()` directly so callers
/// can keep log naming deterministic in tests.
pub fn log_file_name(stamp_ddmmhhmmss: &str) -> String {
    format!("log_{stamp_ddmmhhmmss}.csv")
}
