//! Simulation and experiment configuration

use crate::error::CoreError;
use crate::profiles::ProfileId;
use crate::types::SchedulerType;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Parameters of a single simulation run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    pub num_items: usize,
    pub num_sessions: usize,
    pub items_per_session: usize,
    pub scheduler_type: SchedulerType,
    pub enable_scaffolding: bool,
    pub enable_dual_process: bool,
    /// Seed for the run; `None` draws from OS entropy
    pub random_seed: Option<u64>,

    pub slip_probability: f64,
    pub guess_probability: f64,
    pub confidence_noise_std: f64,
    pub rt_noise_std: f64,
    /// Base response time in seconds
    pub rt_base: f64,
    /// Strength of the knowledge / response-time relationship
    pub rt_gamma: f64,
    /// Fractional shrink of the true bias per delivered scaffold
    pub scaffolding_delta: f64,
    /// Weight of the coverage penalty in CalibrateMe item selection
    pub coverage_weight: f64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            num_items: 100,
            num_sessions: 30,
            items_per_session: 20,
            scheduler_type: SchedulerType::CalibrateMe,
            enable_scaffolding: true,
            enable_dual_process: true,
            random_seed: None,
            slip_probability: 0.1,
            guess_probability: 0.2,
            confidence_noise_std: 0.1,
            rt_noise_std: 0.5,
            rt_base: 3.0,
            rt_gamma: 2.0,
            scaffolding_delta: 0.03,
            coverage_weight: 0.5,
        }
    }
}

impl SimulationConfig {
    pub fn with_scheduler(mut self, scheduler_type: SchedulerType) -> Self {
        self.scheduler_type = scheduler_type;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.random_seed = Some(seed);
        self
    }

    pub fn with_items(mut self, num_items: usize, items_per_session: usize) -> Self {
        self.num_items = num_items;
        self.items_per_session = items_per_session;
        self
    }

    pub fn with_sessions(mut self, num_sessions: usize) -> Self {
        self.num_sessions = num_sessions;
        self
    }

    pub fn with_scaffolding(mut self, enabled: bool) -> Self {
        self.enable_scaffolding = enabled;
        self
    }

    pub fn with_dual_process(mut self, enabled: bool) -> Self {
        self.enable_dual_process = enabled;
        self
    }

    /// Check parameter ranges before running
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.num_items == 0 {
            return Err(CoreError::InvalidConfiguration(
                "num_items must be positive".to_string(),
            ));
        }
        if self.num_sessions == 0 {
            return Err(CoreError::InvalidConfiguration(
                "num_sessions must be positive".to_string(),
            ));
        }
        if self.items_per_session == 0 {
            return Err(CoreError::InvalidConfiguration(
                "items_per_session must be positive".to_string(),
            ));
        }
        for (name, p) in [
            ("slip_probability", self.slip_probability),
            ("guess_probability", self.guess_probability),
            ("scaffolding_delta", self.scaffolding_delta),
        ] {
            if !(0.0..=1.0).contains(&p) {
                return Err(CoreError::InvalidConfiguration(format!(
                    "{name} must be in [0, 1], got {p}"
                )));
            }
        }
        for (name, s) in [
            ("confidence_noise_std", self.confidence_noise_std),
            ("rt_noise_std", self.rt_noise_std),
        ] {
            if !(s > 0.0) {
                return Err(CoreError::InvalidConfiguration(format!(
                    "{name} must be positive, got {s}"
                )));
            }
        }
        if !(self.rt_base > 0.0) {
            return Err(CoreError::InvalidConfiguration(format!(
                "rt_base must be positive, got {}",
                self.rt_base
            )));
        }
        Ok(())
    }
}

/// A full profile × scheduler × replication experiment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExperimentConfig {
    pub profiles: Vec<ProfileId>,
    pub schedulers: Vec<SchedulerType>,
    pub replications: usize,
    /// Seed of replication 0
    pub base_seed: u64,
    /// Seed increment between replications
    pub seed_stride: u64,
    pub simulation: SimulationConfig,
}

impl Default for ExperimentConfig {
    fn default() -> Self {
        Self::tuned()
    }
}

impl ExperimentConfig {
    /// 50 items at 20 per session: 40% pool coverage per session
    pub fn tuned() -> Self {
        Self {
            profiles: ProfileId::all(),
            schedulers: SchedulerType::ALL.to_vec(),
            replications: 10,
            base_seed: 42,
            seed_stride: 1000,
            simulation: SimulationConfig::default().with_items(50, 20).with_seed(42),
        }
    }

    /// 100 items at 20 per session, five replications
    pub fn preliminary() -> Self {
        Self {
            replications: 5,
            simulation: SimulationConfig::default().with_items(100, 20).with_seed(42),
            ..Self::tuned()
        }
    }

    /// Seed used for replication `rep`
    pub fn seed_for(&self, rep: usize) -> u64 {
        self.base_seed + self.seed_stride * rep as u64
    }

    /// Load from a JSON file; missing fields take the tuned defaults
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, CoreError> {
        let bytes = std::fs::read(path)?;
        let config: ExperimentConfig = serde_json::from_slice(&bytes)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), CoreError> {
        if self.profiles.is_empty() {
            return Err(CoreError::InvalidConfiguration(
                "at least one profile is required".to_string(),
            ));
        }
        if self.schedulers.is_empty() {
            return Err(CoreError::InvalidConfiguration(
                "at least one scheduler is required".to_string(),
            ));
        }
        if self.replications == 0 {
            return Err(CoreError::InvalidConfiguration(
                "replications must be positive".to_string(),
            ));
        }
        self.simulation.validate()
    }
}
