use super::{ReviewScheduler, MIN_INTERVAL_DAYS};
use crate::types::{Item, ProcessedResponse, SchedulerType, SystemBelief};
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, Default, PartialEq)]
struct DecayState {
    interval: u32,
    streak: u32,
}

/// Doubles the interval on each correct answer, resets on error
#[derive(Debug, Clone)]
pub struct DecayScheduler {
    max_interval: u32,
    states: HashMap<String, DecayState>,
}

impl Default for DecayScheduler {
    fn default() -> Self {
        Self::new(30)
    }
}

impl DecayScheduler {
    pub fn new(max_interval: u32) -> Self {
        Self {
            max_interval,
            states: HashMap::new(),
        }
    }

    /// Consecutive correct answers for an item
    pub fn streak(&self, item_id: &str) -> u32 {
        self.states.get(item_id).map_or(0, |s| s.streak)
    }
}

impl ReviewScheduler for DecayScheduler {
    fn scheduler_type(&self) -> SchedulerType {
        SchedulerType::DecayBased
    }

    fn schedule(&mut self, item: &Item, response: &ProcessedResponse, _belief: &SystemBelief) -> u32 {
        let state = self.states.entry(item.id.clone()).or_insert(DecayState {
            interval: MIN_INTERVAL_DAYS,
            streak: 0,
        });
        if response.correctness() {
            state.streak += 1;
            state.interval = (state.interval * 2).min(self.max_interval);
        } else {
            state.streak = 0;
            state.interval = MIN_INTERVAL_DAYS;
        }
        state.interval
    }

    fn reset(&mut self) {
        self.states.clear();
    }
}
