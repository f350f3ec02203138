//! Synthetic learner responses generated from the hidden state

use crate::config::SimulationConfig;
use crate::random::{clip, SimRng};
use crate::types::{Item, Response, TrueLearnerState};

/// Shortest response time the generator will produce, in seconds
pub const MIN_RESPONSE_TIME: f64 = 0.5;

/// Draw correctness with P(correct) = (1 - slip)·K* + guess·(1 - K*)
pub fn generate_correctness(k_star: f64, slip: f64, guess: f64, rng: &mut SimRng) -> bool {
    let p_correct = (1.0 - slip) * k_star + guess * (1.0 - k_star);
    rng.bernoulli(p_correct)
}

/// Confidence = clip(K* + β* + noise, 0, 1)
pub fn generate_confidence(k_star: f64, beta_star: f64, noise_std: f64, rng: &mut SimRng) -> f64 {
    let noise = rng.normal(0.0, noise_std);
    clip(k_star + beta_star + noise, 0.0, 1.0)
}

/// Response time shrinking with knowledge, floored at [`MIN_RESPONSE_TIME`]
pub fn generate_response_time(
    k_star: f64,
    tau_base: f64,
    gamma: f64,
    noise_std: f64,
    rng: &mut SimRng,
) -> f64 {
    let noise = rng.normal(0.0, noise_std);
    let tau = tau_base * (1.0 + gamma * (1.0 - k_star)) + noise;
    tau.max(MIN_RESPONSE_TIME)
}

/// Generate a full response to `item` on simulated day `day`
///
/// Draw order is correctness, confidence, response time; keep it stable so
/// seeded runs stay reproducible.
pub fn generate_response(
    item: &Item,
    learner: &TrueLearnerState,
    config: &SimulationConfig,
    day: f64,
    rng: &mut SimRng,
) -> Response {
    let k_star = item.true_state.k_star;
    let tau_base = config.rt_base * (1.0 + item.difficulty * 0.5);

    let correctness = generate_correctness(
        k_star,
        config.slip_probability,
        config.guess_probability,
        rng,
    );
    let confidence = generate_confidence(k_star, learner.beta_star, config.confidence_noise_std, rng);
    let response_time =
        generate_response_time(k_star, tau_base, config.rt_gamma, config.rt_noise_std, rng);

    Response {
        item_id: item.id.clone(),
        correctness,
        confidence,
        response_time,
        day,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn learner(beta_star: f64) -> TrueLearnerState {
        TrueLearnerState {
            k_star: 0.3,
            beta_star,
            alpha: 0.2,
            alpha_err: 0.1,
            lambda: 0.1,
        }
    }

    #[test]
    fn responses_stay_in_range() {
        let config = SimulationConfig::default();
        let mut rng = SimRng::seed_from_u64(7);
        let mut item = Item::new("item-0", 0.83);
        for k in [0.0, 0.5, 1.0] {
            item.true_state.k_star = k;
            for _ in 0..200 {
                let r = generate_response(&item, &learner(0.25), &config, 3.0, &mut rng);
                assert!((0.0..=1.0).contains(&r.confidence));
                assert!(r.response_time >= MIN_RESPONSE_TIME);
                assert_eq!(r.day, 3.0);
            }
        }
    }

    #[test]
    fn accuracy_follows_slip_guess_model() {
        let mut rng = SimRng::seed_from_u64(11);
        let n = 20_000;
        let hits = (0..n)
            .filter(|_| generate_correctness(1.0, 0.1, 0.2, &mut rng))
            .count();
        let rate = hits as f64 / n as f64;
        assert!((rate - 0.9).abs() < 0.02, "rate was {rate}");
    }

    #[test]
    fn overconfident_learner_reports_more_confidence() {
        let mut rng = SimRng::seed_from_u64(3);
        let n = 2_000;
        let over: f64 = (0..n)
            .map(|_| generate_confidence(0.5, 0.2, 0.1, &mut rng))
            .sum::<f64>()
            / n as f64;
        let under: f64 = (0..n)
            .map(|_| generate_confidence(0.5, -0.2, 0.1, &mut rng))
            .sum::<f64>()
            / n as f64;
        assert!(over > under + 0.3);
    }

    #[test]
    fn same_seed_same_response() {
        let config = SimulationConfig::default();
        let item = Item::new("item-1", 0.5);
        let a = generate_response(&item, &learner(0.0), &config, 0.0, &mut SimRng::seed_from_u64(99));
        let b = generate_response(&item, &learner(0.0), &config, 0.0, &mut SimRng::seed_from_u64(99));
        assert_eq!(a, b);
    }
}
