//! CSV export for simulation results
//!
//! Writes the summary table and the key-profile trajectory table, plus two
//! standalone tables: per-session data of a single run and the ablation
//! comparison.

use crate::aggregate::{summary_row, AggregatedResults};
use crate::error::MetricsError;
use crate::export::ResultsExporter;
use crate::records::{SummaryRow, SummaryTable, TrajectoryTable, SUMMARY_FILE, TRAJECTORIES_FILE};
use calibrateme_core::{AblationCondition, SimulationResults};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// Header of `tuned_summary.csv`
pub const SUMMARY_HEADER: &str =
    "profile,scheduler,ret_1d,ret_7d,ret_30d,mastery,efficiency,final_ece,final_brier,final_Kstar";

/// Header of the per-session table
pub const SESSION_HEADER: &str = "session,items_reviewed,correct_count,accuracy,mean_confidence,mean_rt,\
type1_count,type2_count,scaffolds,mean_K_star,mean_K_hat,ece,brier";

/// Header of the ablation table
pub const ABLATION_HEADER: &str =
    "condition,replications,ret_1d,ret_7d,ret_30d,mastery,efficiency,final_ece,final_brier,final_Kstar";

/// CSV exporter writing into a results directory
///
/// Creates:
/// - `tuned_summary.csv` - one row per profile/scheduler pair
/// - `tuned_trajectories.csv` - per-session K* and ECE of the key profiles
#[derive(Debug)]
pub struct CsvExporter {
    dir: PathBuf,
}

impl CsvExporter {
    /// Create a new CSV exporter
    ///
    /// # Arguments
    /// * `dir` - Results directory; it must already exist
    pub fn new(dir: &Path) -> Self {
        Self {
            dir: dir.to_path_buf(),
        }
    }

    fn export_summary(&self, summary: &SummaryTable) -> Result<PathBuf, MetricsError> {
        let path = self.dir.join(SUMMARY_FILE);
        let mut file = create(&path)?;

        writeln!(file, "{SUMMARY_HEADER}")
            .map_err(|e| MetricsError::ExportError(format!("Failed to write header: {e}")))?;
        for row in summary.rows() {
            writeln!(
                file,
                "{},{},{}",
                escape_csv(&row.profile.to_string()),
                escape_csv(row.scheduler.as_str()),
                metric_fields(row)
            )
            .map_err(|e| MetricsError::ExportError(format!("Failed to write row: {e}")))?;
        }
        file.flush()?;
        Ok(path)
    }

    fn export_trajectories(&self, table: &TrajectoryTable) -> Result<PathBuf, MetricsError> {
        let path = self.dir.join(TRAJECTORIES_FILE);
        let mut file = create(&path)?;

        let mut header = String::from("session");
        for (name, _) in table.columns() {
            header.push(',');
            header.push_str(&escape_csv(name));
        }
        writeln!(file, "{header}")
            .map_err(|e| MetricsError::ExportError(format!("Failed to write header: {e}")))?;

        for (i, session) in table.sessions().iter().enumerate() {
            let mut line = session.to_string();
            for (_, values) in table.columns() {
                line.push(',');
                if let Some(v) = values.get(i) {
                    line.push_str(&format!("{v:.6}"));
                }
            }
            writeln!(file, "{line}")
                .map_err(|e| MetricsError::ExportError(format!("Failed to write row: {e}")))?;
        }
        file.flush()?;
        Ok(path)
    }
}

impl ResultsExporter for CsvExporter {
    fn export(&self, results: &AggregatedResults) -> Result<Vec<PathBuf>, MetricsError> {
        let summary = self.export_summary(&results.summary)?;
        let trajectories = self.export_trajectories(&results.trajectories)?;
        Ok(vec![summary, trajectories])
    }
}

/// Per-session table of a single run; sessions are written 1-based
pub fn export_session_csv(results: &SimulationResults, path: impl AsRef<Path>) -> Result<(), MetricsError> {
    let mut file = create(path.as_ref())?;
    writeln!(file, "{SESSION_HEADER}")
        .map_err(|e| MetricsError::ExportError(format!("Failed to write header: {e}")))?;

    for s in &results.session_data {
        writeln!(
            file,
            "{},{},{},{:.4},{:.4},{:.2},{},{},{},{:.4},{:.4},{:.4},{:.4}",
            s.session_number + 1,
            s.items_reviewed,
            s.correct_count,
            s.accuracy(),
            s.mean_confidence,
            s.mean_rt,
            s.type1_count,
            s.type2_count,
            s.scaffolds_delivered,
            s.mean_k_star,
            s.mean_k_hat,
            s.ece,
            s.brier
        )
        .map_err(|e| MetricsError::ExportError(format!("Failed to write row: {e}")))?;
    }
    file.flush()?;
    Ok(())
}

/// Replication means per ablation condition
pub fn export_ablation_csv(
    conditions: &[(AblationCondition, Vec<SimulationResults>)],
    path: impl AsRef<Path>,
) -> Result<(), MetricsError> {
    let mut file = create(path.as_ref())?;
    writeln!(file, "{ABLATION_HEADER}")
        .map_err(|e| MetricsError::ExportError(format!("Failed to write header: {e}")))?;

    for (condition, runs) in conditions {
        let first = runs
            .first()
            .ok_or_else(|| MetricsError::EmptyAggregate(condition.name().to_string()))?;
        let row = summary_row(first.profile_id, first.scheduler_type, runs)?;
        writeln!(
            file,
            "{},{},{}",
            escape_csv(condition.name()),
            runs.len(),
            metric_fields(&row)
        )
        .map_err(|e| MetricsError::ExportError(format!("Failed to write row: {e}")))?;
    }
    file.flush()?;
    Ok(())
}

/// Numeric columns shared by the summary and ablation tables
fn metric_fields(row: &SummaryRow) -> String {
    format!(
        "{:.6},{:.6},{:.6},{:.2},{:.4},{:.6},{:.6},{:.6}",
        row.ret_1d,
        row.ret_7d,
        row.ret_30d,
        row.mastery,
        row.efficiency,
        row.final_ece,
        row.final_brier,
        row.final_kstar
    )
}

fn create(path: &Path) -> Result<BufWriter<File>, MetricsError> {
    File::create(path)
        .map(BufWriter::new)
        .map_err(|e| MetricsError::ExportError(format!("Failed to create {}: {e}", path.display())))
}

/// Escape CSV field (add quotes if needed)
pub(crate) fn escape_csv(s: &str) -> String {
    if s.contains(',') || s.contains('"') || s.contains('\n') {
        format!("\"{}\"", s.replace('"', "\"\""))
    } else {
        s.to_string()
    }
}
