use super::{top_by_score, urgency, ReviewScheduler, MIN_INTERVAL_DAYS};
use crate::dual_process::interval_multiplier;
use crate::types::{Item, ProcessedResponse, SchedulerType, SystemBelief};
use std::collections::HashMap;

/// Knowledge level the base interval aims to retain at the next review
const TARGET_RETENTION: f64 = 0.7;
const MAX_BASE_INTERVAL: f64 = 30.0;
const MAX_INTERVAL_DAYS: f64 = 60.0;

/// Days until K̂ decays to the target retention, clamped to [1, 30]
pub fn base_interval(k_hat: f64, lambda: f64) -> f64 {
    if k_hat <= TARGET_RETENTION {
        return 1.0;
    }
    if lambda == 0.0 {
        return MAX_BASE_INTERVAL;
    }
    let interval = -(TARGET_RETENTION / k_hat).ln() / lambda;
    interval.clamp(1.0, MAX_BASE_INTERVAL)
}

/// e^(−2β̂): overconfidence shortens, underconfidence lengthens
pub fn calibration_adjustment(beta_hat: f64) -> f64 {
    (-2.0 * beta_hat).exp()
}

/// Next interval in days, rounded and clamped to [1, 60]
pub fn compute_next_review_interval(
    belief: &SystemBelief,
    response: &ProcessedResponse,
    lambda: f64,
    enable_calibration: bool,
    enable_dual_process: bool,
) -> u32 {
    let mut interval = base_interval(belief.k_hat, lambda);
    if enable_calibration {
        interval *= calibration_adjustment(belief.beta_hat);
    }
    if enable_dual_process {
        interval *= interval_multiplier(response.response_type, response.correctness());
    }
    interval.round().clamp(MIN_INTERVAL_DAYS as f64, MAX_INTERVAL_DAYS) as u32
}

/// Calibration-aware scheduler
///
/// Item selection balances urgency against coverage: items reviewed more
/// often than the pool average are penalized by `coverage_weight` per extra
/// review, so short calibration-adjusted intervals do not starve the rest of
/// the pool.
#[derive(Debug, Clone)]
pub struct CalibrateMeScheduler {
    lambda: f64,
    enable_calibration: bool,
    enable_dual_process: bool,
    coverage_weight: f64,
    review_counts: HashMap<String, u32>,
    total_reviews: u64,
}

impl CalibrateMeScheduler {
    pub fn new(lambda: f64) -> Self {
        Self {
            lambda,
            enable_calibration: true,
            enable_dual_process: true,
            coverage_weight: 0.5,
            review_counts: HashMap::new(),
            total_reviews: 0,
        }
    }

    pub fn with_calibration(mut self, enabled: bool) -> Self {
        self.enable_calibration = enabled;
        self
    }

    pub fn with_dual_process(mut self, enabled: bool) -> Self {
        self.enable_dual_process = enabled;
        self
    }

    pub fn with_coverage_weight(mut self, weight: f64) -> Self {
        self.coverage_weight = weight;
        self
    }

    pub fn record_review(&mut self, item_id: &str) {
        *self.review_counts.entry(item_id.to_string()).or_insert(0) += 1;
        self.total_reviews += 1;
    }

    pub fn review_count(&self, item_id: &str) -> u32 {
        self.review_counts.get(item_id).copied().unwrap_or(0)
    }
}

impl ReviewScheduler for CalibrateMeScheduler {
    fn scheduler_type(&self) -> SchedulerType {
        SchedulerType::CalibrateMe
    }

    fn select_items(&mut self, items: &[Item], count: usize, now: f64) -> Vec<usize> {
        let expected = if items.is_empty() {
            0.0
        } else {
            self.total_reviews as f64 / items.len() as f64
        };
        let scores: Vec<f64> = items
            .iter()
            .map(|item| {
                let extra = self.review_count(&item.id) as f64 - expected;
                urgency(item, now) - self.coverage_weight * extra
            })
            .collect();
        top_by_score(&scores, count)
    }

    fn schedule(&mut self, item: &Item, response: &ProcessedResponse, belief: &SystemBelief) -> u32 {
        self.record_review(&item.id);
        compute_next_review_interval(
            belief,
            response,
            self.lambda,
            self.enable_calibration,
            self.enable_dual_process,
        )
    }

    fn reset(&mut self) {
        self.review_counts.clear();
        self.total_reviews = 0;
    }
}
