//! Dual-process classification of responses
//!
//! Fast, confident and correct responses are treated as automatic
//! (Type 1) retrieval; everything else as deliberate (Type 2). Response
//! times are normalized within the learner, per difficulty bin once the bin
//! has enough samples.

use crate::calibration::brier_score;
use crate::stats::{z_score, OnlineStatistics};
use crate::types::{ProcessedResponse, Response, ResponseType};
use std::collections::HashMap;

/// Samples needed before the overall RT statistics are trusted
const MIN_OVERALL_SAMPLES: u64 = 5;
/// Samples needed before a difficulty bin's RT statistics are trusted
const MIN_BIN_SAMPLES: u64 = 3;

/// Coarse difficulty bucket used for RT normalization
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DifficultyBin {
    Easy,
    Medium,
    Hard,
}

impl DifficultyBin {
    pub fn from_difficulty(difficulty: f64) -> Self {
        if difficulty < 0.33 {
            DifficultyBin::Easy
        } else if difficulty < 0.67 {
            DifficultyBin::Medium
        } else {
            DifficultyBin::Hard
        }
    }
}

/// Interval multiplier for a classified response
pub fn interval_multiplier(response_type: ResponseType, correctness: bool) -> f64 {
    if !correctness {
        return 0.5;
    }
    match response_type {
        ResponseType::Type1Automatic => 1.2,
        ResponseType::Type2Deliberate => 1.0,
    }
}

/// Higher scores indicate more automatic responding
pub fn dual_process_score(normalized_rt: f64, confidence: f64) -> f64 {
    confidence - (normalized_rt * 0.5 + 0.5)
}

#[derive(Debug, Clone)]
pub struct DualProcessClassifier {
    rt_threshold: f64,
    confidence_threshold: f64,
    rt_stats: OnlineStatistics,
    rt_by_difficulty: HashMap<DifficultyBin, OnlineStatistics>,
}

impl Default for DualProcessClassifier {
    fn default() -> Self {
        Self::new(-0.5, 0.7)
    }
}

impl DualProcessClassifier {
    pub fn new(rt_threshold: f64, confidence_threshold: f64) -> Self {
        Self {
            rt_threshold,
            confidence_threshold,
            rt_stats: OnlineStatistics::new(),
            rt_by_difficulty: HashMap::new(),
        }
    }

    /// z-score against all responses seen; neutral until enough samples
    pub fn normalize_rt(&self, tau: f64) -> f64 {
        if self.rt_stats.count() < MIN_OVERALL_SAMPLES {
            return 0.0;
        }
        z_score(tau, self.rt_stats.mean(), self.rt_stats.std_dev())
    }

    /// z-score within the difficulty bin, falling back to [`Self::normalize_rt`]
    pub fn normalize_rt_by_difficulty(&self, tau: f64, bin: DifficultyBin) -> f64 {
        match self.rt_by_difficulty.get(&bin) {
            Some(stats) if stats.count() >= MIN_BIN_SAMPLES => {
                z_score(tau, stats.mean(), stats.std_dev())
            }
            _ => self.normalize_rt(tau),
        }
    }

    pub fn classify(&self, normalized_rt: f64, confidence: f64, correctness: bool) -> ResponseType {
        if correctness
            && normalized_rt < self.rt_threshold
            && confidence > self.confidence_threshold
        {
            ResponseType::Type1Automatic
        } else {
            ResponseType::Type2Deliberate
        }
    }

    pub fn update_statistics(&mut self, response_time: f64, bin: DifficultyBin) {
        self.rt_stats.update(response_time);
        self.rt_by_difficulty
            .entry(bin)
            .or_default()
            .update(response_time);
    }

    /// Record the response time, then classify and score the response
    pub fn process(&mut self, response: Response, bin: DifficultyBin) -> ProcessedResponse {
        self.update_statistics(response.response_time, bin);

        let normalized_rt = self.normalize_rt_by_difficulty(response.response_time, bin);
        let response_type = self.classify(normalized_rt, response.confidence, response.correctness);
        let dual_process_score = dual_process_score(normalized_rt, response.confidence);
        let brier_score = brier_score(response.confidence, response.correctness);

        ProcessedResponse {
            response,
            response_type,
            normalized_rt,
            dual_process_score,
            brier_score,
        }
    }

    pub fn reset(&mut self) {
        self.rt_stats.reset();
        self.rt_by_difficulty.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn response(correctness: bool, confidence: f64, response_time: f64) -> Response {
        Response {
            item_id: "item-0".to_string(),
            correctness,
            confidence,
            response_time,
            day: 0.0,
        }
    }

    #[test]
    fn difficulty_bins() {
        assert_eq!(DifficultyBin::from_difficulty(0.17), DifficultyBin::Easy);
        assert_eq!(DifficultyBin::from_difficulty(0.5), DifficultyBin::Medium);
        assert_eq!(DifficultyBin::from_difficulty(0.83), DifficultyBin::Hard);
    }

    #[test]
    fn normalization_is_neutral_until_warmed_up() {
        let mut classifier = DualProcessClassifier::default();
        for _ in 0..4 {
            let p = classifier.process(response(true, 0.9, 1.0), DifficultyBin::Easy);
            assert_eq!(p.normalized_rt, 0.0);
            assert_eq!(p.response_type, ResponseType::Type2Deliberate);
        }
    }

    #[test]
    fn fast_confident_correct_is_automatic() {
        let mut classifier = DualProcessClassifier::default();
        for tau in [6.0, 7.0, 8.0, 6.5, 7.5] {
            classifier.process(response(true, 0.5, tau), DifficultyBin::Medium);
        }
        let p = classifier.process(response(true, 0.9, 2.0), DifficultyBin::Medium);
        assert!(p.normalized_rt < -0.5);
        assert_eq!(p.response_type, ResponseType::Type1Automatic);

        let p = classifier.process(response(false, 0.9, 2.0), DifficultyBin::Medium);
        assert_eq!(p.response_type, ResponseType::Type2Deliberate);
        assert!((p.brier_score - 0.81).abs() < 1e-12);
    }

    #[test]
    fn multipliers() {
        assert_eq!(interval_multiplier(ResponseType::Type1Automatic, false), 0.5);
        assert_eq!(interval_multiplier(ResponseType::Type1Automatic, true), 1.2);
        assert_eq!(interval_multiplier(ResponseType::Type2Deliberate, true), 1.0);
    }

    #[test]
    fn score_rewards_speed_and_confidence() {
        assert!(dual_process_score(-1.0, 0.9) > dual_process_score(1.0, 0.9));
        assert!(dual_process_score(0.0, 0.9) > dual_process_score(0.0, 0.2));
    }
}
