//! Result records, export, loading and validation for CalibrateMe simulations
//!
//! This crate sits between the simulation engine and the figures. It
//! averages the replications of an experiment into the result files of a
//! results directory, and reads such a directory back, checking it against
//! the data contract before anything is plotted:
//!
//! - `tuned_summary.csv`: one row per profile/scheduler pair
//! - `tuned_trajectories.csv`: per-session K* and ECE of the key profiles
//! - `tuned_results.json`: profile → scheduler → trajectory record
//! - `hypothesis.json`: CalibrateMe versus SM-2 per calibration type
//!
//! # Example
//! ```no_run
//! use calibrateme_metrics::ResultsDataset;
//!
//! let dataset = ResultsDataset::load("results/preliminary").unwrap();
//! let sessions = dataset.validate(Some(30)).unwrap();
//! println!("{} rows, {sessions} sessions", dataset.summary.len());
//! ```

pub mod aggregate;
pub mod error;
pub mod export;
pub mod load;
pub mod records;
pub mod validate;

pub use aggregate::{aggregate, AggregatedResults, CalibrationImprovement, HypothesisReport};
pub use error::MetricsError;
pub use export::{export_all, export_ablation_csv, export_session_csv, ResultsExporter};
pub use load::{load_results, load_summary, load_trajectories, ResultsDataset};
pub use records::{
    ResultsDocument, SummaryRow, SummaryTable, TrajectoryRecord, TrajectoryTable, KEY_PROFILES,
    TRAJECTORY_SCHEDULERS,
};
