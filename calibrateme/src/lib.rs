//! # CalibrateMe
//!
//! Simulation study of calibration-aware spaced repetition. Synthetic
//! learners with a known confidence bias are reviewed by four schedulers,
//! the replications are averaged into a results directory, and the report
//! figures are rendered from that directory.
//!
//! ## Feature Flags
//!
//! - `default`: Includes `viz`
//! - `viz`: Figure and HTML report rendering, and the `calibrateme` binary
//!
//! ## Example
//!
//! ```no_run
//! use calibrateme::prelude::*;
//!
//! let results = run_experiment(&ExperimentConfig::preliminary()).unwrap();
//! let aggregated = aggregate(&results).unwrap();
//! export_all(&aggregated, "results/preliminary", true).unwrap();
//!
//! let dataset = ResultsDataset::load("results/preliminary").unwrap();
//! dataset.validate(Some(30)).unwrap();
//! ```

pub use calibrateme_core as core;

pub use calibrateme_metrics as metrics;

#[cfg(feature = "viz")]
pub use calibrateme_viz as viz;

#[cfg(feature = "viz")]
pub mod cli;

pub mod prelude {
    //! Commonly used types and functions

    pub use calibrateme_core::{
        run_experiment, run_feature_removal, run_simulation, AblationCondition, ExperimentConfig,
        LearnerProfile, ProfileId, SchedulerType, SimulationConfig, SimulationResults,
    };

    pub use calibrateme_metrics::{aggregate, export_all, ResultsDataset, SummaryTable};

    #[cfg(feature = "viz")]
    pub use calibrateme_viz::{generate_all_figures, generate_html_report};
}
