//! Forgetting and learning dynamics of true knowledge

use crate::types::Item;

/// Exponential decay of knowledge over `delta_t` days
pub fn apply_forgetting(k_star: f64, lambda: f64, delta_t: f64) -> f64 {
    k_star * (-lambda * delta_t).exp()
}

/// Days between the last review and `now`; `0.0` if never reviewed
pub fn days_since_review(last_review: Option<f64>, now: f64) -> f64 {
    last_review.map_or(0.0, |day| now - day)
}

/// Knowledge expected `days_in_future` days from now
pub fn predict_forgotten_knowledge(k_star: f64, lambda: f64, days_in_future: f64) -> f64 {
    apply_forgetting(k_star, lambda, days_in_future)
}

/// Days until knowledge decays to `threshold`
///
/// Returns `0.0` when already at or below the threshold and infinity when
/// there is no forgetting.
pub fn optimal_review_time(k_star: f64, lambda: f64, threshold: f64) -> f64 {
    if k_star <= threshold {
        return 0.0;
    }
    if lambda == 0.0 {
        return f64::INFINITY;
    }
    -(threshold / k_star).ln() / lambda
}

/// Decay an item's knowledge according to the time since its last review
pub fn apply_item_forgetting(item: &mut Item, lambda: f64, now: f64) {
    let delta_t = days_since_review(item.true_state.last_review, now);
    if delta_t == 0.0 {
        return;
    }
    item.true_state.k_star = apply_forgetting(item.true_state.k_star, lambda, delta_t);
}

pub fn apply_batch_forgetting(items: &mut [Item], lambda: f64, now: f64) {
    for item in items {
        apply_item_forgetting(item, lambda, now);
    }
}

/// Knowledge after a learning event; errors teach at `alpha_err`
pub fn apply_learning(k_star: f64, correctness: bool, alpha: f64, alpha_err: f64) -> f64 {
    let rate = if correctness { alpha } else { alpha_err };
    k_star + rate * (1.0 - k_star)
}

/// Probability of a correct recall after `delay_days` under the slip/guess model
pub fn calculate_retention(k_star: f64, lambda: f64, delay_days: f64, slip: f64, guess: f64) -> f64 {
    let k = apply_forgetting(k_star, lambda, delay_days);
    (1.0 - slip) * k + guess * (1.0 - k)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn forgetting_decays_and_is_identity_at_zero() {
        assert_eq!(apply_forgetting(0.8, 0.1, 0.0), 0.8);
        let decayed = apply_forgetting(0.8, 0.1, 1.0);
        assert!((decayed - 0.8 * (-0.1f64).exp()).abs() < 1e-12);
        assert!(apply_forgetting(0.8, 0.15, 5.0) < apply_forgetting(0.8, 0.05, 5.0));
    }

    #[test]
    fn learning_moves_toward_one() {
        let after_correct = apply_learning(0.5, true, 0.2, 0.1);
        let after_error = apply_learning(0.5, false, 0.2, 0.1);
        assert!((after_correct - 0.6).abs() < 1e-12);
        assert!((after_error - 0.55).abs() < 1e-12);
        assert!(apply_learning(1.0, true, 0.3, 0.15) <= 1.0);
    }

    #[test]
    fn optimal_review_time_edges() {
        assert_eq!(optimal_review_time(0.6, 0.1, 0.7), 0.0);
        assert!(optimal_review_time(0.9, 0.0, 0.7).is_infinite());
        let t = optimal_review_time(0.9, 0.1, 0.7);
        assert!((apply_forgetting(0.9, 0.1, t) - 0.7).abs() < 1e-9);
    }

    #[test]
    fn retention_is_bounded_by_guess_and_slip() {
        let full = calculate_retention(1.0, 0.1, 0.0, 0.1, 0.2);
        assert!((full - 0.9).abs() < 1e-12);
        let none = calculate_retention(0.0, 0.1, 7.0, 0.1, 0.2);
        assert!((none - 0.2).abs() < 1e-12);
    }

    #[test]
    fn item_forgetting_uses_last_review() {
        let mut item = Item::new("a", 0.5);
        item.true_state.k_star = 0.8;
        apply_item_forgetting(&mut item, 0.1, 3.0);
        assert_eq!(item.true_state.k_star, 0.8);

        item.true_state.last_review = Some(1.0);
        apply_item_forgetting(&mut item, 0.1, 3.0);
        assert!((item.true_state.k_star - apply_forgetting(0.8, 0.1, 2.0)).abs() < 1e-12);
    }
}
