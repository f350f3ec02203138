//! Bayesian Knowledge Tracing belief updates
//!
//! The posterior over the learner's knowledge is approximated on a uniform
//! grid over [0, 1]. Each observed response contributes three likelihood
//! terms: correctness (slip/guess model), reported confidence and response
//! time. Gaussian terms are left unnormalized since only the posterior shape
//! matters.

use crate::config::SimulationConfig;
use crate::random::clip;
use crate::types::{Response, SystemBelief};

/// Default number of grid points for the posterior
pub const DEFAULT_GRID_POINTS: usize = 101;

/// Width of the Gaussian prior centred on the current estimate
const PRIOR_STD: f64 = 0.2;

/// Number of most recent responses considered by [`update_beta_hat`]
const BETA_WINDOW: usize = 10;

/// P(y | K) under the slip/guess model
pub fn likelihood_correctness(y: bool, k: f64, slip: f64, guess: f64) -> f64 {
    let p_correct = (1.0 - slip) * k + guess * (1.0 - k);
    if y {
        p_correct
    } else {
        1.0 - p_correct
    }
}

/// P(c | K) assuming c ~ N(K + beta_hat, sigma)
pub fn likelihood_confidence(c: f64, k: f64, beta_hat: f64, sigma: f64) -> f64 {
    let z = (c - (k + beta_hat)) / sigma;
    (-0.5 * z * z).exp()
}

/// P(tau | K) assuming response time shrinks with knowledge
pub fn likelihood_rt(tau: f64, k: f64, tau_base: f64, gamma: f64, sigma: f64) -> f64 {
    let expected = tau_base * (1.0 + gamma * (1.0 - k));
    let z = (tau - expected) / sigma;
    (-0.5 * z * z).exp()
}

/// Posterior update of K̂ from one response, on a grid of `grid_points`
///
/// `beta_hat` is carried over unchanged; see [`update_beta_hat`]. If every
/// grid point has zero posterior mass the current belief is returned.
pub fn update_belief_with_grid(
    response: &Response,
    current: &SystemBelief,
    config: &SimulationConfig,
    grid_points: usize,
) -> SystemBelief {
    let grid_points = grid_points.max(2);
    let step = 1.0 / (grid_points - 1) as f64;

    let mut posterior = Vec::with_capacity(grid_points);
    for i in 0..grid_points {
        let k = i as f64 * step;
        let prior = (-0.5 * ((k - current.k_hat) / PRIOR_STD).powi(2)).exp();
        let l_y = likelihood_correctness(
            response.correctness,
            k,
            config.slip_probability,
            config.guess_probability,
        );
        let l_c = likelihood_confidence(
            response.confidence,
            k,
            current.beta_hat,
            config.confidence_noise_std,
        );
        let l_tau = likelihood_rt(
            response.response_time,
            k,
            config.rt_base,
            config.rt_gamma,
            config.rt_noise_std,
        );
        posterior.push((k, prior * l_y * l_c * l_tau));
    }

    let total: f64 = posterior.iter().map(|(_, p)| p).sum();
    if !(total > 0.0) || !total.is_finite() {
        tracing::trace!(k_hat = current.k_hat, "posterior mass vanished, keeping prior belief");
        return *current;
    }

    let k_hat: f64 = posterior.iter().map(|(k, p)| k * p / total).sum();
    let variance: f64 = posterior
        .iter()
        .map(|(k, p)| (k - k_hat).powi(2) * p / total)
        .sum();

    SystemBelief {
        k_hat: clip(k_hat, 0.0, 1.0),
        beta_hat: current.beta_hat,
        confidence_interval: variance.sqrt() * 1.96,
    }
}

/// Posterior update of K̂ on the default 101-point grid
pub fn update_belief(
    response: &Response,
    current: &SystemBelief,
    config: &SimulationConfig,
) -> SystemBelief {
    update_belief_with_grid(response, current, config, DEFAULT_GRID_POINTS)
}

/// Move β̂ toward the calibration gap observed over the last ten responses
pub fn update_beta_hat<R: AsRef<Response>>(
    responses: &[R],
    current_beta_hat: f64,
    learning_rate: f64,
) -> f64 {
    if responses.is_empty() {
        return current_beta_hat;
    }
    let recent = &responses[responses.len().saturating_sub(BETA_WINDOW)..];
    let n = recent.len() as f64;
    let mean_conf = recent.iter().map(|r| r.as_ref().confidence).sum::<f64>() / n;
    let mean_acc = recent.iter().map(|r| r.as_ref().outcome()).sum::<f64>() / n;
    let observed = mean_conf - mean_acc;
    current_beta_hat + learning_rate * (observed - current_beta_hat)
}

/// Drift the belief toward maximal uncertainty (0.5) between sessions
pub fn apply_belief_drift(belief: &SystemBelief, lambda: f64, days_elapsed: f64) -> SystemBelief {
    let decay = (-lambda * days_elapsed).exp();
    SystemBelief {
        k_hat: belief.k_hat * decay + 0.5 * (1.0 - decay),
        beta_hat: belief.beta_hat,
        confidence_interval: belief.confidence_interval * (1.0 + 0.1 * days_elapsed),
    }
}
