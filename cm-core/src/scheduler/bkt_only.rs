use super::{base_interval, ReviewScheduler, MIN_INTERVAL_DAYS};
use crate::bkt::update_belief;
use crate::config::SimulationConfig;
use crate::types::{Item, ProcessedResponse, SchedulerType, SystemBelief};
use std::collections::HashMap;

/// Schedules from a per-item BKT estimate, ignoring calibration
#[derive(Debug, Clone)]
pub struct BktOnlyScheduler {
    lambda: f64,
    config: SimulationConfig,
    beliefs: HashMap<String, SystemBelief>,
}

impl BktOnlyScheduler {
    pub fn new(lambda: f64, config: SimulationConfig) -> Self {
        Self {
            lambda,
            config,
            beliefs: HashMap::new(),
        }
    }

    /// Current belief for an item, starting from K̂ = 0.3
    pub fn belief(&self, item_id: &str) -> SystemBelief {
        self.beliefs.get(item_id).copied().unwrap_or_default()
    }
}

impl ReviewScheduler for BktOnlyScheduler {
    fn scheduler_type(&self) -> SchedulerType {
        SchedulerType::BktOnly
    }

    fn schedule(&mut self, item: &Item, response: &ProcessedResponse, _belief: &SystemBelief) -> u32 {
        let updated = update_belief(&response.response, &self.belief(&item.id), &self.config);
        self.beliefs.insert(item.id.clone(), updated);
        (base_interval(updated.k_hat, self.lambda).round() as u32).max(MIN_INTERVAL_DAYS)
    }

    fn reset(&mut self) {
        self.beliefs.clear();
    }
}
