//! Report figures for CalibrateMe simulation results
//!
//! Renders the seven static figures of the study from a loaded results
//! directory, using the plotters bitmap backend, and optionally an HTML page
//! that embeds them next to the retention table and the hypothesis outcome.
//!
//! # Example
//!
//! ```no_run
//! use calibrateme_metrics::ResultsDataset;
//! use calibrateme_viz::charts::generate_all_figures;
//!
//! let dataset = ResultsDataset::load("results/preliminary").unwrap();
//! dataset.validate(Some(30)).unwrap();
//! for path in generate_all_figures(&dataset, "results/figures").unwrap() {
//!     println!("{}", path.display());
//! }
//! ```

pub mod charts;
pub mod error;
pub mod report;

pub use charts::{generate_all_figures, ChartConfig, FIGURE_FILES};
pub use error::VizError;
pub use report::generate_html_report;
