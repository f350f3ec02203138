//! Calibration scoring: Brier score, ECE, MCE and bias detection

use crate::stats::mean;
use crate::types::{CalibrationType, Response};
use serde::{Deserialize, Serialize};

/// Default number of equal-width confidence bins
pub const DEFAULT_NUM_BINS: usize = 10;

/// Gap beyond which a learner is considered miscalibrated
pub const MISCALIBRATION_THRESHOLD: f64 = 0.05;

/// One confidence bin of a reliability diagram
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalibrationBin {
    pub bin_start: f64,
    pub bin_end: f64,
    pub mean_confidence: f64,
    pub mean_accuracy: f64,
    pub count: usize,
    /// accuracy - confidence
    pub calibration_gap: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalibrationMetrics {
    pub brier_score: f64,
    pub ece: f64,
    pub mce: f64,
    pub calibration_direction: CalibrationType,
    pub bin_data: Vec<CalibrationBin>,
}

pub fn brier_score(confidence: f64, correctness: bool) -> f64 {
    let outcome = if correctness { 1.0 } else { 0.0 };
    (confidence - outcome).powi(2)
}

pub fn aggregate_brier_score<R: AsRef<Response>>(responses: &[R]) -> f64 {
    let scores: Vec<f64> = responses
        .iter()
        .map(|r| brier_score(r.as_ref().confidence, r.as_ref().correctness))
        .collect();
    mean(&scores)
}

/// Index of the bin holding `confidence`; 1.0 lands in the top bin
fn bin_index(confidence: f64, num_bins: usize) -> usize {
    let idx = (confidence * num_bins as f64).floor();
    if idx < 0.0 {
        0
    } else {
        (idx as usize).min(num_bins - 1)
    }
}

/// Group responses into `num_bins` equal-width bins; empty bins are omitted
pub fn bin_responses<R: AsRef<Response>>(responses: &[R], num_bins: usize) -> Vec<CalibrationBin> {
    let num_bins = num_bins.max(1);
    let width = 1.0 / num_bins as f64;
    let mut conf_sum = vec![0.0; num_bins];
    let mut acc_sum = vec![0.0; num_bins];
    let mut counts = vec![0usize; num_bins];

    for r in responses {
        let r = r.as_ref();
        let i = bin_index(r.confidence, num_bins);
        conf_sum[i] += r.confidence;
        acc_sum[i] += r.outcome();
        counts[i] += 1;
    }

    (0..num_bins)
        .filter(|&i| counts[i] > 0)
        .map(|i| {
            let n = counts[i] as f64;
            let mean_confidence = conf_sum[i] / n;
            let mean_accuracy = acc_sum[i] / n;
            CalibrationBin {
                bin_start: i as f64 * width,
                bin_end: (i + 1) as f64 * width,
                mean_confidence,
                mean_accuracy,
                count: counts[i],
                calibration_gap: mean_accuracy - mean_confidence,
            }
        })
        .collect()
}

/// Σ (|bin| / n) · |accuracy(bin) − confidence(bin)|
pub fn expected_calibration_error<R: AsRef<Response>>(responses: &[R], num_bins: usize) -> f64 {
    if responses.is_empty() {
        return 0.0;
    }
    let n = responses.len() as f64;
    bin_responses(responses, num_bins)
        .iter()
        .map(|b| (b.count as f64 / n) * b.calibration_gap.abs())
        .sum()
}

pub fn maximum_calibration_error<R: AsRef<Response>>(responses: &[R], num_bins: usize) -> f64 {
    bin_responses(responses, num_bins)
        .iter()
        .map(|b| b.calibration_gap.abs())
        .fold(0.0, f64::max)
}

/// Mean confidence minus mean accuracy
pub fn estimate_beta_hat<R: AsRef<Response>>(responses: &[R]) -> f64 {
    if responses.is_empty() {
        return 0.0;
    }
    let conf: Vec<f64> = responses.iter().map(|r| r.as_ref().confidence).collect();
    let acc: Vec<f64> = responses.iter().map(|r| r.as_ref().outcome()).collect();
    mean(&conf) - mean(&acc)
}

pub fn detect_miscalibration<R: AsRef<Response>>(responses: &[R], threshold: f64) -> CalibrationType {
    let gap = estimate_beta_hat(responses);
    if gap > threshold {
        CalibrationType::Overconfident
    } else if gap < -threshold {
        CalibrationType::Underconfident
    } else {
        CalibrationType::WellCalibrated
    }
}

pub fn calibration_metrics<R: AsRef<Response>>(responses: &[R], num_bins: usize) -> CalibrationMetrics {
    CalibrationMetrics {
        brier_score: aggregate_brier_score(responses),
        ece: expected_calibration_error(responses, num_bins),
        mce: maximum_calibration_error(responses, num_bins),
        calibration_direction: detect_miscalibration(responses, MISCALIBRATION_THRESHOLD),
        bin_data: bin_responses(responses, num_bins),
    }
}
