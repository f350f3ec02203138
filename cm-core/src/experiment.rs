//! Experiment runner: profiles × schedulers × replications, and ablations

use crate::config::{ExperimentConfig, SimulationConfig};
use crate::engine::{run_simulation, SimulationResults};
use crate::error::CoreError;
use crate::logging::experiment_span;
use crate::profiles::{LearnerProfile, ProfileId};
use crate::types::SchedulerType;
use std::collections::BTreeMap;
use std::fmt;
use tracing::info;

/// Replicated runs keyed by profile and scheduler
#[derive(Debug, Clone)]
pub struct ExperimentResults {
    pub config: ExperimentConfig,
    runs: BTreeMap<(ProfileId, SchedulerType), Vec<SimulationResults>>,
}

impl ExperimentResults {
    pub fn new(config: ExperimentConfig) -> Self {
        Self {
            config,
            runs: BTreeMap::new(),
        }
    }

    pub fn insert(&mut self, profile: ProfileId, scheduler: SchedulerType, runs: Vec<SimulationResults>) {
        self.runs.insert((profile, scheduler), runs);
    }

    /// Replications for one pair, in replication order
    pub fn get(&self, profile: ProfileId, scheduler: SchedulerType) -> Option<&[SimulationResults]> {
        self.runs.get(&(profile, scheduler)).map(Vec::as_slice)
    }

    /// All pairs in profile-major, scheduler-minor order
    pub fn iter(&self) -> impl Iterator<Item = (ProfileId, SchedulerType, &[SimulationResults])> {
        self.runs
            .iter()
            .map(|((p, s), runs)| (*p, *s, runs.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.runs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.runs.is_empty()
    }
}

/// Run every configured profile against every configured scheduler
///
/// Each replication starts from a fresh learner and uses the seed
/// [`ExperimentConfig::seed_for`] gives it, so results are reproducible.
pub fn run_experiment(config: &ExperimentConfig) -> Result<ExperimentResults, CoreError> {
    config.validate()?;

    let total = config.profiles.len() * config.schedulers.len() * config.replications;
    let _span = experiment_span("experiment", total).entered();
    info!(
        profiles = config.profiles.len(),
        schedulers = config.schedulers.len(),
        replications = config.replications,
        "starting experiment"
    );

    let mut results = ExperimentResults::new(config.clone());
    let mut completed = 0;
    for &profile in &config.profiles {
        for &scheduler in &config.schedulers {
            let mut reps = Vec::with_capacity(config.replications);
            for rep in 0..config.replications {
                let learner = LearnerProfile::new(profile, config.simulation.num_items);
                let sim = config
                    .simulation
                    .clone()
                    .with_scheduler(scheduler)
                    .with_seed(config.seed_for(rep));
                reps.push(run_simulation(&learner, &sim)?);
                completed += 1;
            }
            info!(
                profile = %profile,
                scheduler = %scheduler,
                completed,
                total,
                "pair complete"
            );
            results.insert(profile, scheduler, reps);
        }
    }
    Ok(results)
}

/// Feature-removal variants of the calibration-aware scheduler
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AblationCondition {
    Full,
    NoDualProcess,
    NoScaffolding,
    CalibrationOnly,
    Sm2Baseline,
    BktOnly,
}

impl AblationCondition {
    pub const ALL: [AblationCondition; 6] = [
        AblationCondition::Full,
        AblationCondition::NoDualProcess,
        AblationCondition::NoScaffolding,
        AblationCondition::CalibrationOnly,
        AblationCondition::Sm2Baseline,
        AblationCondition::BktOnly,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            AblationCondition::Full => "Full CalibrateMe",
            AblationCondition::NoDualProcess => "No Dual-Process",
            AblationCondition::NoScaffolding => "No Scaffolding",
            AblationCondition::CalibrationOnly => "Calibration Only",
            AblationCondition::Sm2Baseline => "SM-2 Baseline",
            AblationCondition::BktOnly => "BKT-Only",
        }
    }

    /// `base` with this condition's scheduler and feature switches
    pub fn apply(&self, base: &SimulationConfig) -> SimulationConfig {
        let cm = base.clone().with_scheduler(SchedulerType::CalibrateMe);
        match self {
            AblationCondition::Full => cm.with_scaffolding(true).with_dual_process(true),
            AblationCondition::NoDualProcess => cm.with_scaffolding(true).with_dual_process(false),
            AblationCondition::NoScaffolding => cm.with_scaffolding(false).with_dual_process(true),
            AblationCondition::CalibrationOnly => {
                cm.with_scaffolding(false).with_dual_process(false)
            }
            AblationCondition::Sm2Baseline => base.clone().with_scheduler(SchedulerType::Sm2),
            AblationCondition::BktOnly => base.clone().with_scheduler(SchedulerType::BktOnly),
        }
    }
}

impl fmt::Display for AblationCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Replicated runs of every [`AblationCondition`] for one profile
///
/// Replication `r` is seeded with `base.random_seed + r` (0 + r when unset).
pub fn run_feature_removal(
    profile: ProfileId,
    base: &SimulationConfig,
    replications: usize,
) -> Result<Vec<(AblationCondition, Vec<SimulationResults>)>, CoreError> {
    if replications == 0 {
        return Err(CoreError::InvalidConfiguration(
            "replications must be positive".to_string(),
        ));
    }
    let _span = experiment_span("ablation", AblationCondition::ALL.len() * replications).entered();
    let base_seed = base.random_seed.unwrap_or(0);

    let mut out = Vec::with_capacity(AblationCondition::ALL.len());
    for condition in AblationCondition::ALL {
        let mut reps = Vec::with_capacity(replications);
        for rep in 0..replications {
            let learner = LearnerProfile::new(profile, base.num_items);
            let config = condition.apply(base).with_seed(base_seed + rep as u64);
            reps.push(run_simulation(&learner, &config)?);
        }
        info!(profile = %profile, condition = condition.name(), "condition complete");
        out.push((condition, reps));
    }
    Ok(out)
}
