//! Synthetic learner profiles (3 ability levels × 3 calibration biases)

use crate::error::CoreError;
use crate::types::{AbilityLevel, CalibrationType, Item, SystemBelief, TrueLearnerState};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Identifier of one of the nine learner archetypes, e.g. `Med-Over`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ProfileId {
    pub ability: AbilityLevel,
    pub calibration: CalibrationType,
}

impl ProfileId {
    pub const fn new(ability: AbilityLevel, calibration: CalibrationType) -> Self {
        Self {
            ability,
            calibration,
        }
    }

    /// All nine profiles, ability-major, in report order
    pub fn all() -> Vec<ProfileId> {
        AbilityLevel::ALL
            .iter()
            .flat_map(|&a| CalibrationType::ALL.iter().map(move |&c| ProfileId::new(a, c)))
            .collect()
    }

    /// Parameters of this profile
    pub fn params(&self) -> LearnerProfileParams {
        let (alpha, lambda) = match self.ability {
            AbilityLevel::Low => (0.10, 0.15),
            AbilityLevel::Medium => (0.20, 0.10),
            AbilityLevel::High => (0.30, 0.05),
        };
        let beta_star = match (self.ability, self.calibration) {
            (_, CalibrationType::WellCalibrated) => 0.0,
            (AbilityLevel::Low, CalibrationType::Overconfident) => 0.25,
            (AbilityLevel::Low, CalibrationType::Underconfident) => -0.20,
            (AbilityLevel::Medium, CalibrationType::Overconfident) => 0.20,
            (AbilityLevel::Medium, CalibrationType::Underconfident) => -0.15,
            (AbilityLevel::High, CalibrationType::Overconfident) => 0.15,
            (AbilityLevel::High, CalibrationType::Underconfident) => -0.10,
        };
        LearnerProfileParams {
            ability: self.ability,
            calibration: self.calibration,
            alpha,
            lambda,
            beta_star,
        }
    }
}

impl fmt::Display for ProfileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}-{}",
            self.ability.short_label(),
            self.calibration.short_label()
        )
    }
}

impl FromStr for ProfileId {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (ability, calibration) = s
            .split_once('-')
            .ok_or_else(|| CoreError::UnknownProfile(s.to_string()))?;
        let ability = AbilityLevel::ALL
            .into_iter()
            .find(|a| a.short_label() == ability)
            .ok_or_else(|| CoreError::UnknownProfile(s.to_string()))?;
        let calibration = CalibrationType::ALL
            .into_iter()
            .find(|c| c.short_label() == calibration)
            .ok_or_else(|| CoreError::UnknownProfile(s.to_string()))?;
        Ok(ProfileId::new(ability, calibration))
    }
}

impl Serialize for ProfileId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ProfileId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Per-profile model parameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LearnerProfileParams {
    pub ability: AbilityLevel,
    pub calibration: CalibrationType,
    pub alpha: f64,
    pub lambda: f64,
    pub beta_star: f64,
}

/// A learner being simulated: hidden state, system belief and item pool
#[derive(Debug, Clone)]
pub struct LearnerProfile {
    pub id: ProfileId,
    pub params: LearnerProfileParams,
    pub true_state: TrueLearnerState,
    pub system_belief: SystemBelief,
    pub items: Vec<Item>,
}

impl LearnerProfile {
    /// Create a learner with a fresh pool of `num_items` items
    pub fn new(id: ProfileId, num_items: usize) -> Self {
        let params = id.params();
        let true_state = TrueLearnerState {
            k_star: 0.3,
            beta_star: params.beta_star,
            alpha: params.alpha,
            alpha_err: params.alpha * 0.5,
            lambda: params.lambda,
        };
        let items = (0..num_items)
            .map(|i| Item::new(format!("item-{i}"), item_difficulty(i)))
            .collect();

        Self {
            id,
            params,
            true_state,
            system_belief: SystemBelief::default(),
            items,
        }
    }
}

/// Easy / medium / hard cycling difficulty for item `index`
pub fn item_difficulty(index: usize) -> f64 {
    (index % 3) as f64 * 0.33 + 0.17
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nine_profiles_in_report_order() {
        let names: Vec<String> = ProfileId::all().iter().map(|p| p.to_string()).collect();
        assert_eq!(
            names,
            vec![
                "Low-Over", "Low-Under", "Low-Well", "Med-Over", "Med-Under", "Med-Well",
                "High-Over", "High-Under", "High-Well"
            ]
        );
    }

    #[test]
    fn parse_round_trip_and_rejects_unknown() {
        for p in ProfileId::all() {
            assert_eq!(p.to_string().parse::<ProfileId>().unwrap(), p);
        }
        assert!("Medium-Over".parse::<ProfileId>().is_err());
        assert!("MedOver".parse::<ProfileId>().is_err());
    }

    #[test]
    fn params_follow_ability_and_bias() {
        let p = "Med-Over".parse::<ProfileId>().unwrap().params();
        assert_eq!(p.alpha, 0.20);
        assert_eq!(p.lambda, 0.10);
        assert_eq!(p.beta_star, 0.20);

        let p = "High-Under".parse::<ProfileId>().unwrap().params();
        assert_eq!(p.beta_star, -0.10);
        assert_eq!(p.lambda, 0.05);
    }

    #[test]
    fn learner_starts_with_fresh_pool() {
        let learner = LearnerProfile::new("Low-Well".parse().unwrap(), 6);
        assert_eq!(learner.items.len(), 6);
        assert_eq!(learner.true_state.alpha_err, 0.05);
        assert!((learner.items[1].difficulty - 0.50).abs() < 1e-12);
        assert_eq!(learner.items[3].difficulty, learner.items[0].difficulty);
    }
}
