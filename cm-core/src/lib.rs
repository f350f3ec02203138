//! Simulation engine for calibration-aware spaced repetition.
//!
//! A synthetic learner with a hidden knowledge level K* and confidence bias
//! β* answers review items. The system observes correctness, confidence and
//! response time, maintains a belief (K̂, β̂) about the learner, and a
//! scheduler decides when each item comes back.
//!
//! # Basic Usage
//!
//! ```rust,no_run
//! use calibrateme_core::{run_simulation, LearnerProfile, ProfileId, SimulationConfig};
//!
//! let profile: ProfileId = "Med-Over".parse().unwrap();
//! let learner = LearnerProfile::new(profile, 50);
//! let config = SimulationConfig::default().with_items(50, 20).with_seed(42);
//! let results = run_simulation(&learner, &config).unwrap();
//! println!("7-day retention: {:.3}", results.retention_7day);
//! ```
//!
//! # Time Model
//!
//! Time is counted in simulated days. Session `s` is held on day `s`, and
//! every scheduled interval is an offset from that day, so runs do not depend
//! on the wall clock.

pub mod bkt;
pub mod calibration;
pub mod config;
pub mod dual_process;
pub mod engine;
pub mod error;
pub mod experiment;
pub mod forgetting;
pub mod logging;
pub mod profiles;
pub mod random;
pub mod response;
pub mod scaffolding;
pub mod scheduler;
pub mod stats;
pub mod types;

pub use calibration::{calibration_metrics, CalibrationBin, CalibrationMetrics};
pub use config::{ExperimentConfig, SimulationConfig};
pub use engine::{run_simulation, SessionData, SimulationResults};
pub use error::CoreError;
pub use experiment::{run_experiment, run_feature_removal, AblationCondition, ExperimentResults};
pub use logging::{init_logging, init_logging_with_level};
pub use profiles::{LearnerProfile, LearnerProfileParams, ProfileId};
pub use random::SimRng;
pub use scheduler::{make_scheduler, ReviewScheduler};
pub use types::{
    AbilityLevel, CalibrationType, Item, ProcessedResponse, Response, ResponseType, ScaffoldType,
    SchedulerType, SystemBelief, TrueLearnerState,
};
