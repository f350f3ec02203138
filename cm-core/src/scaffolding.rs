//! Adaptive metacognitive scaffolding
//!
//! When the estimated bias β̂ is large enough, a prompt is delivered and the
//! learner's true bias shrinks: β*' = β*·(1 − δ).

use crate::types::{CalibrationType, ScaffoldType};

const REFLECTION_PROMPTS: [&str; 4] = [
    "Was your confidence on this item justified by how well you actually knew it?",
    "Could you be overestimating how well you know this topic?",
    "What made this item hard? Does your confidence reflect that difficulty?",
    "Do you really know this, or does it only feel familiar?",
];

const ENCOURAGEMENT_PROMPTS: [&str; 4] = [
    "You are doing better than you think. Trust what you know.",
    "That was correct. Your knowledge deserves more confidence.",
    "You have studied this material; give yourself credit for it.",
    "Your results suggest you know more than you realise.",
];

/// Scaffold suggested by the sign and size of β̂
pub fn select_scaffold(beta_hat: f64, threshold: f64) -> ScaffoldType {
    if beta_hat > threshold {
        ScaffoldType::Reflection
    } else if beta_hat < -threshold {
        ScaffoldType::Encouragement
    } else {
        ScaffoldType::None
    }
}

/// Whether a scaffold may be delivered now
pub fn should_trigger(
    calibration: CalibrationType,
    responses_since_last: usize,
    min_interval: usize,
) -> bool {
    calibration != CalibrationType::WellCalibrated && responses_since_last >= min_interval
}

pub fn apply_scaffolding_effect(beta_star: f64, delta: f64) -> f64 {
    beta_star * (1.0 - delta)
}

/// Prompt text for `scaffold`; `index` wraps around the library
pub fn scaffold_prompt(scaffold: ScaffoldType, index: usize) -> Option<&'static str> {
    let prompts: &[&str] = match scaffold {
        ScaffoldType::Reflection => &REFLECTION_PROMPTS,
        ScaffoldType::Encouragement => &ENCOURAGEMENT_PROMPTS,
        ScaffoldType::None => return None,
    };
    Some(prompts[index % prompts.len()])
}

/// Outcome of offering a scaffold after one response
#[derive(Debug, Clone, PartialEq)]
pub struct ScaffoldOutcome {
    pub scaffold: ScaffoldType,
    pub prompt: Option<&'static str>,
    pub updated_beta_star: f64,
}

impl ScaffoldOutcome {
    pub fn delivered(&self) -> bool {
        self.scaffold != ScaffoldType::None
    }
}

#[derive(Debug, Clone)]
pub struct ScaffoldingManager {
    delta: f64,
    threshold: f64,
    min_interval: usize,
    responses_since_last: usize,
    history: Vec<ScaffoldType>,
}

impl ScaffoldingManager {
    pub fn new(delta: f64) -> Self {
        Self {
            delta,
            threshold: 0.1,
            min_interval: 5,
            responses_since_last: 0,
            history: Vec::new(),
        }
    }

    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.threshold = threshold;
        self
    }

    pub fn with_min_interval(mut self, min_interval: usize) -> Self {
        self.min_interval = min_interval;
        self
    }

    /// Count one response and deliver a scaffold if warranted
    pub fn process_response(&mut self, beta_hat: f64, beta_star: f64) -> ScaffoldOutcome {
        self.responses_since_last += 1;

        let scaffold = select_scaffold(beta_hat, self.threshold);
        let calibration = match scaffold {
            ScaffoldType::Reflection => CalibrationType::Overconfident,
            ScaffoldType::Encouragement => CalibrationType::Underconfident,
            ScaffoldType::None => CalibrationType::WellCalibrated,
        };

        if !should_trigger(calibration, self.responses_since_last, self.min_interval) {
            return ScaffoldOutcome {
                scaffold: ScaffoldType::None,
                prompt: None,
                updated_beta_star: beta_star,
            };
        }

        self.responses_since_last = 0;
        self.history.push(scaffold);
        let prompt = scaffold_prompt(scaffold, self.history.len() - 1);
        tracing::trace!(?scaffold, beta_hat, "scaffold delivered");

        ScaffoldOutcome {
            scaffold,
            prompt,
            updated_beta_star: apply_scaffolding_effect(beta_star, self.delta),
        }
    }

    pub fn history(&self) -> &[ScaffoldType] {
        &self.history
    }

    pub fn reset(&mut self) {
        self.responses_since_last = 0;
        self.history.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn selection_follows_bias_sign() {
        assert_eq!(select_scaffold(0.2, 0.1), ScaffoldType::Reflection);
        assert_eq!(select_scaffold(-0.2, 0.1), ScaffoldType::Encouragement);
        assert_eq!(select_scaffold(0.05, 0.1), ScaffoldType::None);
    }

    #[test]
    fn delivers_at_most_every_five_responses() {
        let mut manager = ScaffoldingManager::new(0.03);
        let mut beta_star = 0.2;
        let mut delivered = Vec::new();
        for i in 0..12 {
            let outcome = manager.process_response(0.15, beta_star);
            if outcome.delivered() {
                delivered.push(i);
                assert!(outcome.prompt.is_some());
            }
            beta_star = outcome.updated_beta_star;
        }
        assert_eq!(delivered, vec![4, 9]);
        assert!((beta_star - 0.2 * 0.97 * 0.97).abs() < 1e-12);
        assert_eq!(manager.history().len(), 2);
    }

    #[test]
    fn well_calibrated_is_never_scaffolded() {
        let mut manager = ScaffoldingManager::new(0.03);
        for _ in 0..20 {
            let outcome = manager.process_response(0.02, 0.0);
            assert!(!outcome.delivered());
            assert_eq!(outcome.updated_beta_star, 0.0);
        }
    }

    #[test]
    fn prompts_wrap() {
        assert_eq!(
            scaffold_prompt(ScaffoldType::Reflection, 5),
            scaffold_prompt(ScaffoldType::Reflection, 1)
        );
        assert!(scaffold_prompt(ScaffoldType::None, 0).is_none());
    }
}
