//! Writing aggregated results to a results directory
//!
//! The CSV exporter produces `tuned_summary.csv` and
//! `tuned_trajectories.csv`; the JSON exporter produces
//! `tuned_results.json` and `hypothesis.json`. Together they form the
//! directory that [`crate::load::ResultsDataset::load`] reads back.

pub mod csv;
pub mod json;

use crate::aggregate::AggregatedResults;
use crate::error::MetricsError;
use crate::records::{HYPOTHESIS_FILE, RESULTS_FILE, SUMMARY_FILE, TRAJECTORIES_FILE};
use std::path::{Path, PathBuf};

pub use self::csv::{export_ablation_csv, export_session_csv};

/// Trait for writing aggregated results in one format
pub trait ResultsExporter {
    /// Write `results` to the configured destination
    ///
    /// # Returns
    /// Paths of the files written, in write order
    fn export(&self, results: &AggregatedResults) -> Result<Vec<PathBuf>, MetricsError>;
}

/// Write every result file into `dir`, creating it if needed
///
/// # Example
/// ```no_run
/// use calibrateme_core::{run_experiment, ExperimentConfig};
/// use calibrateme_metrics::{aggregate, export::export_all};
///
/// let results = run_experiment(&ExperimentConfig::preliminary()).unwrap();
/// let aggregated = aggregate(&results).unwrap();
/// export_all(&aggregated, "results/preliminary", true).unwrap();
/// ```
pub fn export_all(
    results: &AggregatedResults,
    dir: impl AsRef<Path>,
    pretty: bool,
) -> Result<Vec<PathBuf>, MetricsError> {
    let dir = dir.as_ref();
    std::fs::create_dir_all(dir).map_err(|e| {
        MetricsError::ExportError(format!("Failed to create {}: {e}", dir.display()))
    })?;

    let mut written = csv::CsvExporter::new(dir).export(results)?;
    written.extend(json::JsonExporter::new(dir, pretty).export(results)?);
    tracing::info!(dir = %dir.display(), files = written.len(), "exported results");
    Ok(written)
}

/// Paths of the four result files inside `dir`
pub fn result_paths(dir: &Path) -> [PathBuf; 4] {
    [
        dir.join(SUMMARY_FILE),
        dir.join(TRAJECTORIES_FILE),
        dir.join(RESULTS_FILE),
        dir.join(HYPOTHESIS_FILE),
    ]
}
