//! Session-by-session simulation of one learner under one scheduler

use crate::bkt::{update_belief, update_beta_hat};
use crate::calibration::{calibration_metrics, DEFAULT_NUM_BINS};
use crate::config::SimulationConfig;
use crate::dual_process::{DifficultyBin, DualProcessClassifier};
use crate::error::CoreError;
use crate::forgetting::{apply_forgetting, apply_learning, calculate_retention};
use crate::logging::run_span;
use crate::profiles::{LearnerProfile, ProfileId};
use crate::random::SimRng;
use crate::response::generate_response;
use crate::scaffolding::ScaffoldingManager;
use crate::scheduler::make_scheduler;
use crate::stats::mean;
use crate::types::{ProcessedResponse, ResponseType, SchedulerType};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Mean K* above which a session counts toward mastery
pub const MASTERY_THRESHOLD: f64 = 0.9;
/// Consecutive sessions above [`MASTERY_THRESHOLD`] required for mastery
const MASTERY_STREAK: usize = 2;
/// Prior responses used to re-estimate β̂
const BETA_HISTORY: usize = 20;
const BETA_LEARNING_RATE: f64 = 0.1;

/// Per-session summary
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionData {
    /// 0-based session index; also the simulated day
    pub session_number: usize,
    pub items_reviewed: usize,
    pub correct_count: usize,
    pub mean_confidence: f64,
    pub mean_rt: f64,
    pub type1_count: usize,
    pub type2_count: usize,
    pub scaffolds_delivered: usize,
    pub mean_k_star: f64,
    pub mean_k_hat: f64,
    pub ece: f64,
    pub brier: f64,
}

impl SessionData {
    pub fn accuracy(&self) -> f64 {
        if self.items_reviewed == 0 {
            0.0
        } else {
            self.correct_count as f64 / self.items_reviewed as f64
        }
    }
}

/// Outcome of one simulation run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationResults {
    pub profile_id: ProfileId,
    pub scheduler_type: SchedulerType,
    pub config: SimulationConfig,
    pub retention_1day: f64,
    pub retention_7day: f64,
    pub retention_30day: f64,
    /// Session at which mastery was reached, or `num_sessions`
    pub time_to_mastery: usize,
    /// Reviews per item
    pub review_efficiency: f64,
    /// Sum of response times in seconds
    pub total_review_time: f64,
    pub final_k_star: f64,
    pub ece_trajectory: Vec<f64>,
    pub brier_trajectory: Vec<f64>,
    pub k_star_trajectory: Vec<f64>,
    pub k_hat_trajectory: Vec<f64>,
    pub session_data: Vec<SessionData>,
}

/// Run `config.num_sessions` sessions for a fresh copy of `profile`
///
/// The profile is cloned; the caller's copy is never mutated. With
/// `config.random_seed` set, results are fully deterministic.
pub fn run_simulation(
    profile: &LearnerProfile,
    config: &SimulationConfig,
) -> Result<SimulationResults, CoreError> {
    config.validate()?;

    let _span = run_span(&profile.id, config.scheduler_type, config.random_seed).entered();

    let mut rng = match config.random_seed {
        Some(seed) => SimRng::seed_from_u64(seed),
        None => SimRng::from_entropy(),
    };
    let mut learner = profile.clone();
    let lambda = learner.params.lambda;
    let scheduler_type = config.scheduler_type;

    let mut belief = learner.system_belief;
    let mut classifier = DualProcessClassifier::default();
    let mut scaffolding = ScaffoldingManager::new(config.scaffolding_delta);
    let mut scheduler = make_scheduler(config, lambda);

    let mut ece_trajectory = Vec::with_capacity(config.num_sessions);
    let mut brier_trajectory = Vec::with_capacity(config.num_sessions);
    let mut k_star_trajectory = Vec::with_capacity(config.num_sessions);
    let mut k_hat_trajectory = Vec::with_capacity(config.num_sessions);
    let mut session_data = Vec::with_capacity(config.num_sessions);
    let mut all_responses: Vec<ProcessedResponse> = Vec::new();

    let mut mastery_session: Option<usize> = None;
    let mut mastery_streak = 0;

    for session in 0..config.num_sessions {
        let day = session as f64;
        let elapsed = if session == 0 { 0.0 } else { 1.0 };
        for item in learner.items.iter_mut() {
            item.true_state.k_star = apply_forgetting(item.true_state.k_star, lambda, elapsed);
        }

        let selected = scheduler.select_items(&learner.items, config.items_per_session, day);

        let mut correct_count = 0;
        let mut type1_count = 0;
        let mut scaffolds_delivered = 0;
        let mut session_responses: Vec<ProcessedResponse> = Vec::with_capacity(selected.len());

        for idx in selected {
            let item = &mut learner.items[idx];
            let response = generate_response(item, &learner.true_state, config, day, &mut rng);
            let processed =
                classifier.process(response, DifficultyBin::from_difficulty(item.difficulty));

            if processed.correctness() {
                correct_count += 1;
            }
            if processed.response_type == ResponseType::Type1Automatic {
                type1_count += 1;
            }

            item.true_state.k_star = apply_learning(
                item.true_state.k_star,
                processed.correctness(),
                learner.true_state.alpha,
                learner.true_state.alpha_err,
            );
            item.true_state.last_review = Some(day);

            if scheduler_type.tracks_belief() {
                belief = update_belief(&processed.response, &belief, config);
                let recent = &all_responses[all_responses.len().saturating_sub(BETA_HISTORY)..];
                if !recent.is_empty() {
                    belief.beta_hat = update_beta_hat(recent, belief.beta_hat, BETA_LEARNING_RATE);
                }
                item.system_belief.k_hat = belief.k_hat;
                item.system_belief.beta_hat = belief.beta_hat;
            }

            if config.enable_scaffolding && scheduler_type == SchedulerType::CalibrateMe {
                let outcome =
                    scaffolding.process_response(belief.beta_hat, learner.true_state.beta_star);
                if outcome.delivered() {
                    scaffolds_delivered += 1;
                    learner.true_state.beta_star = outcome.updated_beta_star;
                }
            }

            let interval = scheduler.schedule(item, &processed, &belief);
            item.system_belief.interval_days = interval;
            item.system_belief.next_review = day + f64::from(interval);

            session_responses.push(processed.clone());
            all_responses.push(processed);
        }

        let metrics = calibration_metrics(&session_responses, DEFAULT_NUM_BINS);
        let k_stars: Vec<f64> = learner.items.iter().map(|i| i.true_state.k_star).collect();
        let mean_k_star = mean(&k_stars);

        ece_trajectory.push(metrics.ece);
        brier_trajectory.push(metrics.brier_score);
        k_star_trajectory.push(mean_k_star);
        k_hat_trajectory.push(belief.k_hat);

        if mean_k_star > MASTERY_THRESHOLD {
            mastery_streak += 1;
            if mastery_streak >= MASTERY_STREAK && mastery_session.is_none() {
                mastery_session = Some(session);
            }
        } else {
            mastery_streak = 0;
        }

        let confidences: Vec<f64> = session_responses.iter().map(|r| r.confidence()).collect();
        let rts: Vec<f64> = session_responses
            .iter()
            .map(|r| r.response.response_time)
            .collect();

        debug!(
            session,
            mean_k_star,
            k_hat = belief.k_hat,
            beta_hat = belief.beta_hat,
            ece = metrics.ece,
            "session complete"
        );

        session_data.push(SessionData {
            session_number: session,
            items_reviewed: session_responses.len(),
            correct_count,
            mean_confidence: mean(&confidences),
            mean_rt: mean(&rts),
            type1_count,
            type2_count: session_responses.len() - type1_count,
            scaffolds_delivered,
            mean_k_star,
            mean_k_hat: belief.k_hat,
            ece: metrics.ece,
            brier: metrics.brier_score,
        });
    }

    let k_stars: Vec<f64> = learner.items.iter().map(|i| i.true_state.k_star).collect();
    let final_k_star = mean(&k_stars);
    let retention = |days: f64| {
        calculate_retention(
            final_k_star,
            lambda,
            days,
            config.slip_probability,
            config.guess_probability,
        )
    };

    let results = SimulationResults {
        profile_id: profile.id,
        scheduler_type,
        config: config.clone(),
        retention_1day: retention(1.0),
        retention_7day: retention(7.0),
        retention_30day: retention(30.0),
        time_to_mastery: mastery_session.unwrap_or(config.num_sessions),
        review_efficiency: all_responses.len() as f64 / config.num_items as f64,
        total_review_time: all_responses.iter().map(|r| r.response.response_time).sum(),
        final_k_star,
        ece_trajectory,
        brier_trajectory,
        k_star_trajectory,
        k_hat_trajectory,
        session_data,
    };

    info!(
        retention_7day = results.retention_7day,
        final_k_star,
        time_to_mastery = results.time_to_mastery,
        "simulation finished"
    );

    Ok(results)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{AbilityLevel, CalibrationType};

    fn small_config(scheduler: SchedulerType) -> SimulationConfig {
        SimulationConfig::default()
            .with_scheduler(scheduler)
            .with_items(30, 10)
            .with_sessions(12)
            .with_seed(42)
    }

    fn med_over() -> LearnerProfile {
        LearnerProfile::new(
            ProfileId::new(AbilityLevel::Medium, CalibrationType::Overconfident),
            30,
        )
    }

    #[test]
    fn trajectories_have_one_entry_per_session() {
        let results = run_simulation(&med_over(), &small_config(SchedulerType::CalibrateMe)).unwrap();
        assert_eq!(results.k_star_trajectory.len(), 12);
        assert_eq!(results.k_hat_trajectory.len(), 12);
        assert_eq!(results.ece_trajectory.len(), 12);
        assert_eq!(results.brier_trajectory.len(), 12);
        assert_eq!(results.session_data.len(), 12);
        assert!(results.session_data.iter().all(|s| s.items_reviewed == 10));
    }

    #[test]
    fn efficiency_counts_reviews_per_item() {
        let results = run_simulation(&med_over(), &small_config(SchedulerType::Sm2)).unwrap();
        assert!((results.review_efficiency - 120.0 / 30.0).abs() < 1e-12);
        assert!(results.total_review_time > 0.0);
    }

    #[test]
    fn metrics_are_in_range() {
        for scheduler in SchedulerType::ALL {
            let results = run_simulation(&med_over(), &small_config(scheduler)).unwrap();
            for v in [results.retention_1day, results.retention_7day, results.retention_30day] {
                assert!((0.0..=1.0).contains(&v));
            }
            assert!(results.retention_1day >= results.retention_7day);
            assert!(results.retention_7day >= results.retention_30day);
            assert!(results.ece_trajectory.iter().all(|e| (0.0..=1.0).contains(e)));
            assert!(results.time_to_mastery <= 12);
        }
    }

    #[test]
    fn profile_is_not_mutated() {
        let profile = med_over();
        let before = profile.items.clone();
        run_simulation(&profile, &small_config(SchedulerType::CalibrateMe)).unwrap();
        assert_eq!(profile.items, before);
    }

    #[test]
    fn belief_is_frozen_for_calibration_blind_schedulers() {
        let results = run_simulation(&med_over(), &small_config(SchedulerType::DecayBased)).unwrap();
        assert!(results.k_hat_trajectory.iter().all(|&k| k == 0.3));
    }

    #[test]
    fn invalid_config_is_rejected() {
        let config = small_config(SchedulerType::CalibrateMe).with_sessions(0);
        assert!(matches!(
            run_simulation(&med_over(), &config),
            Err(CoreError::InvalidConfiguration(_))
        ));
    }
}
