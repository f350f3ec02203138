//! JSON export for simulation results
//!
//! `tuned_results.json` maps profile → scheduler → trajectory record;
//! `hypothesis.json` carries the CalibrateMe-versus-SM-2 comparison.

use crate::aggregate::AggregatedResults;
use crate::error::MetricsError;
use crate::export::ResultsExporter;
use crate::records::{HYPOTHESIS_FILE, RESULTS_FILE};
use serde::Serialize;
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

/// JSON exporter writing into a results directory
#[derive(Debug)]
pub struct JsonExporter {
    dir: PathBuf,
    pretty: bool,
}

impl JsonExporter {
    /// Create a new JSON exporter
    ///
    /// # Arguments
    /// * `dir` - Results directory; it must already exist
    /// * `pretty` - Whether to pretty-print the JSON
    pub fn new(dir: &Path, pretty: bool) -> Self {
        Self {
            dir: dir.to_path_buf(),
            pretty,
        }
    }

    fn write<T: Serialize>(&self, file_name: &str, value: &T) -> Result<PathBuf, MetricsError> {
        let json = if self.pretty {
            serde_json::to_string_pretty(value)
        } else {
            serde_json::to_string(value)
        }
        .map_err(|e| MetricsError::ExportError(format!("JSON serialization failed: {e}")))?;

        let path = self.dir.join(file_name);
        let mut file = File::create(&path)
            .map_err(|e| MetricsError::ExportError(format!("Failed to create file: {e}")))?;
        file.write_all(json.as_bytes())
            .map_err(|e| MetricsError::ExportError(format!("Failed to write to file: {e}")))?;
        Ok(path)
    }
}

impl ResultsExporter for JsonExporter {
    fn export(&self, results: &AggregatedResults) -> Result<Vec<PathBuf>, MetricsError> {
        let document = self.write(RESULTS_FILE, &results.document)?;
        let hypothesis = self.write(HYPOTHESIS_FILE, &results.hypothesis)?;
        Ok(vec![document, hypothesis])
    }
}
