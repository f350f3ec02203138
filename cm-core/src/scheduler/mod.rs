//! Review schedulers
//!
//! A scheduler decides which items a session reviews and how many days to
//! wait before an item comes up again. The calibration-aware scheduler is
//! compared against three calibration-blind baselines:
//!
//! - [`CalibrateMeScheduler`]: BKT estimate, calibration bias and
//!   dual-process type, with coverage-aware item selection
//! - [`Sm2Scheduler`]: classic SuperMemo-2
//! - [`BktOnlyScheduler`]: per-item BKT estimate only
//! - [`DecayScheduler`]: doubling intervals, reset on error

mod bkt_only;
mod calibrate_me;
mod decay;
mod sm2;

pub use bkt_only::BktOnlyScheduler;
pub use calibrate_me::{
    base_interval, calibration_adjustment, compute_next_review_interval, CalibrateMeScheduler,
};
pub use decay::DecayScheduler;
pub use sm2::{map_to_quality, update_sm2, Sm2Scheduler, Sm2State};

use crate::config::SimulationConfig;
use crate::types::{Item, ProcessedResponse, SchedulerType, SystemBelief};
use std::cmp::Ordering;

/// Shortest interval any scheduler assigns, in days
pub const MIN_INTERVAL_DAYS: u32 = 1;

/// Core trait for review schedulers
///
/// Implementations keep whatever per-item state they need between calls.
/// The engine calls [`ReviewScheduler::select_items`] once per session and
/// [`ReviewScheduler::schedule`] once per reviewed item.
pub trait ReviewScheduler: Send {
    /// Which variant this scheduler implements
    fn scheduler_type(&self) -> SchedulerType;

    /// Choose the items to review in the session held on day `now`
    ///
    /// # Arguments
    ///
    /// * `items` - The learner's item pool
    /// * `count` - Maximum number of items to select
    /// * `now` - Current simulated day
    ///
    /// # Returns
    ///
    /// Indices into `items`, most urgent first.
    fn select_items(&mut self, items: &[Item], count: usize, now: f64) -> Vec<usize> {
        select_by_urgency(items, count, now)
    }

    /// Assign the next review interval for an item after a response
    ///
    /// # Arguments
    ///
    /// * `item` - The reviewed item
    /// * `response` - The classified response
    /// * `belief` - The global system belief after this response
    ///
    /// # Returns
    ///
    /// The interval in whole days, at least [`MIN_INTERVAL_DAYS`].
    fn schedule(&mut self, item: &Item, response: &ProcessedResponse, belief: &SystemBelief) -> u32;

    /// Forget all per-item state
    fn reset(&mut self);
}

/// Days an item is overdue; negative when not yet due
pub fn urgency(item: &Item, now: f64) -> f64 {
    now - item.system_belief.next_review
}

/// Indices of the `count` most urgent items, ties kept in pool order
pub fn select_by_urgency(items: &[Item], count: usize, now: f64) -> Vec<usize> {
    let scores: Vec<f64> = items.iter().map(|item| urgency(item, now)).collect();
    top_by_score(&scores, count)
}

/// Indices of the `count` highest scores; stable on ties
pub(crate) fn top_by_score(scores: &[f64], count: usize) -> Vec<usize> {
    let mut order: Vec<usize> = (0..scores.len()).collect();
    order.sort_by(|&a, &b| {
        scores[b]
            .partial_cmp(&scores[a])
            .unwrap_or(Ordering::Equal)
    });
    order.truncate(count);
    order
}

/// Build the scheduler selected by `config`
///
/// `lambda` is the learner's forgetting rate, used by the BKT-driven
/// schedulers to turn K̂ into an interval.
pub fn make_scheduler(config: &SimulationConfig, lambda: f64) -> Box<dyn ReviewScheduler> {
    match config.scheduler_type {
        SchedulerType::CalibrateMe => Box::new(
            CalibrateMeScheduler::new(lambda)
                .with_dual_process(config.enable_dual_process)
                .with_coverage_weight(config.coverage_weight),
        ),
        SchedulerType::Sm2 => Box::new(Sm2Scheduler::new()),
        SchedulerType::BktOnly => Box::new(BktOnlyScheduler::new(lambda, config.clone())),
        SchedulerType::DecayBased => Box::new(DecayScheduler::default()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item_due(id: usize, next_review: f64) -> Item {
        let mut item = Item::new(format!("item-{id}"), 0.5);
        item.system_belief.next_review = next_review;
        item
    }

    #[test]
    fn most_overdue_first() {
        let items = vec![item_due(0, 5.0), item_due(1, 1.0), item_due(2, 3.0)];
        assert_eq!(select_by_urgency(&items, 2, 4.0), vec![1, 2]);
    }

    #[test]
    fn ties_keep_pool_order() {
        let items: Vec<Item> = (0..6).map(|i| item_due(i, 1.0)).collect();
        assert_eq!(select_by_urgency(&items, 3, 0.0), vec![0, 1, 2]);
    }

    #[test]
    fn selection_never_exceeds_pool() {
        let items: Vec<Item> = (0..3).map(|i| item_due(i, 1.0)).collect();
        assert_eq!(select_by_urgency(&items, 10, 0.0).len(), 3);
    }

    #[test]
    fn factory_builds_requested_variant() {
        for t in SchedulerType::ALL {
            let config = SimulationConfig::default().with_scheduler(t);
            assert_eq!(make_scheduler(&config, 0.1).scheduler_type(), t);
        }
    }
}
