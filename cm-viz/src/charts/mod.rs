//! Report figures
//!
//! One function per figure, each writing a single PNG with the plotters
//! bitmap backend. [`generate_all_figures`] renders the whole set.

pub mod architecture;
pub mod knowledge;
pub mod retention;
pub mod trajectory;
pub(crate) mod util;

use crate::error::VizError;
use calibrateme_core::SchedulerType;
use calibrateme_metrics::ResultsDataset;
use plotters::style::RGBColor;
use std::path::{Path, PathBuf};
use util::hex;

/// Output file names, in figure order
pub const FIGURE_FILES: [&str; 7] = [
    "fig1_learning_trajectories.png",
    "fig2_ece_trajectories.png",
    "fig3_retention_comparison.png",
    "fig4_improvement_analysis.png",
    "fig5_ece_comparison.png",
    "fig6_architecture.png",
    "fig7_knowledge_vs_estimated.png",
];

/// Colour of the system estimate K̂
pub const K_HAT_COLOR: RGBColor = hex(0xF59E0B);
pub const GAIN_COLOR: RGBColor = hex(0x15803D);
pub const LOSS_COLOR: RGBColor = hex(0xB91C1C);

/// Line and bar colour of a scheduler
pub fn scheduler_color(scheduler: SchedulerType) -> RGBColor {
    match scheduler {
        SchedulerType::CalibrateMe => hex(0x2563EB),
        SchedulerType::Sm2 => hex(0xDC2626),
        SchedulerType::BktOnly => hex(0x059669),
        SchedulerType::DecayBased => hex(0x9333EA),
    }
}

/// Common chart configuration
#[derive(Debug, Clone)]
pub struct ChartConfig {
    /// Chart width in pixels
    pub width: u32,
    /// Chart height in pixels
    pub height: u32,
    /// Chart title
    pub title: String,
    pub title_size: u32,
    pub label_size: u32,
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            width: 1200,
            height: 900,
            title: String::new(),
            title_size: 28,
            label_size: 16,
        }
    }
}

impl ChartConfig {
    /// Create a new chart configuration with title
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Default::default()
        }
    }

    /// Set the chart dimensions
    pub fn dimensions(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    pub(crate) fn check(&self) -> Result<(), VizError> {
        if self.width < 200 || self.height < 150 {
            return Err(VizError::InvalidConfiguration(format!(
                "{}x{} is too small for a figure",
                self.width, self.height
            )));
        }
        Ok(())
    }
}

/// Render all seven figures into `output_dir`
///
/// The dataset is validated first, so invalid input fails before any file
/// is written.
///
/// # Arguments
/// * `dataset` - Loaded results
/// * `output_dir` - Figures directory; created if missing
///
/// # Returns
/// The written paths in figure order
///
/// # Example
/// ```no_run
/// use calibrateme_metrics::ResultsDataset;
/// use calibrateme_viz::charts::generate_all_figures;
///
/// let dataset = ResultsDataset::load("results/preliminary").unwrap();
/// let paths = generate_all_figures(&dataset, "results/figures").unwrap();
/// assert_eq!(paths.len(), 7);
/// ```
pub fn generate_all_figures(
    dataset: &ResultsDataset,
    output_dir: impl AsRef<Path>,
) -> Result<Vec<PathBuf>, VizError> {
    let output_dir = output_dir.as_ref();
    let _span = calibrateme_core::logging::render_span(&output_dir.display().to_string()).entered();
    let sessions = dataset.validate(None)?;
    tracing::debug!(sessions, "rendering validated results");
    std::fs::create_dir_all(output_dir)?;

    let paths: Vec<PathBuf> = FIGURE_FILES.iter().map(|f| output_dir.join(f)).collect();

    trajectory::fig1_learning_trajectories(&dataset.document, &paths[0])?;
    trajectory::fig2_ece_trajectories(&dataset.document, &paths[1])?;
    retention::fig3_retention_comparison(&dataset.summary, &paths[2])?;
    retention::fig4_improvement_analysis(&dataset.summary, &paths[3])?;
    retention::fig5_ece_comparison(&dataset.summary, &paths[4])?;
    architecture::fig6_architecture(&paths[5])?;
    knowledge::fig7_knowledge_vs_estimated(&dataset.document, &paths[6])?;

    for path in &paths {
        tracing::info!(path = %path.display(), "figure written");
    }
    Ok(paths)
}
