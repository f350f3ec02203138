//! Core value types shared by the engine modules
//!
//! Time is measured in simulated days: session `s` happens on day `s`, and
//! review schedules are expressed as day offsets from the current session.

use crate::error::CoreError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Ability level of a synthetic learner
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AbilityLevel {
    Low,
    Medium,
    High,
}

impl AbilityLevel {
    /// Short label used in profile identifiers (`Low`, `Med`, `High`)
    pub fn short_label(&self) -> &'static str {
        match self {
            AbilityLevel::Low => "Low",
            AbilityLevel::Medium => "Med",
            AbilityLevel::High => "High",
        }
    }

    pub const ALL: [AbilityLevel; 3] = [AbilityLevel::Low, AbilityLevel::Medium, AbilityLevel::High];
}

/// Direction of a learner's confidence bias
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CalibrationType {
    Overconfident,
    Underconfident,
    WellCalibrated,
}

impl CalibrationType {
    /// Short label used in profile identifiers (`Over`, `Under`, `Well`)
    pub fn short_label(&self) -> &'static str {
        match self {
            CalibrationType::Overconfident => "Over",
            CalibrationType::Underconfident => "Under",
            CalibrationType::WellCalibrated => "Well",
        }
    }

    pub const ALL: [CalibrationType; 3] = [
        CalibrationType::Overconfident,
        CalibrationType::Underconfident,
        CalibrationType::WellCalibrated,
    ];
}

/// Dual-process classification of a response
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ResponseType {
    #[serde(rename = "TYPE1_AUTOMATIC")]
    Type1Automatic,
    #[serde(rename = "TYPE2_DELIBERATE")]
    Type2Deliberate,
}

/// Metacognitive prompt delivered after a response
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ScaffoldType {
    /// Prompt for overconfident learners
    Reflection,
    /// Prompt for underconfident learners
    Encouragement,
    None,
}

/// Review scheduler variant under comparison
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum SchedulerType {
    #[serde(rename = "CALIBRATEME")]
    CalibrateMe,
    #[serde(rename = "SM2")]
    Sm2,
    #[serde(rename = "BKT_ONLY")]
    BktOnly,
    #[serde(rename = "DECAY_BASED")]
    DecayBased,
}

impl SchedulerType {
    /// All scheduler variants in report order
    pub const ALL: [SchedulerType; 4] = [
        SchedulerType::CalibrateMe,
        SchedulerType::Sm2,
        SchedulerType::BktOnly,
        SchedulerType::DecayBased,
    ];

    /// Identifier used in data files
    pub fn as_str(&self) -> &'static str {
        match self {
            SchedulerType::CalibrateMe => "CALIBRATEME",
            SchedulerType::Sm2 => "SM2",
            SchedulerType::BktOnly => "BKT_ONLY",
            SchedulerType::DecayBased => "DECAY_BASED",
        }
    }

    /// Human-readable name used in figures and logs
    pub fn display_name(&self) -> &'static str {
        match self {
            SchedulerType::CalibrateMe => "CalibrateMe",
            SchedulerType::Sm2 => "SM-2",
            SchedulerType::BktOnly => "BKT-Only",
            SchedulerType::DecayBased => "Decay-Based",
        }
    }

    /// Whether the global BKT belief is maintained under this scheduler
    pub fn tracks_belief(&self) -> bool {
        matches!(self, SchedulerType::CalibrateMe | SchedulerType::BktOnly)
    }
}

impl fmt::Display for SchedulerType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SchedulerType {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SchedulerType::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| CoreError::UnknownScheduler(s.to_string()))
    }
}

/// Hidden learner state that generates observable behaviour
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrueLearnerState {
    /// Global knowledge level in [0, 1]
    pub k_star: f64,
    /// Calibration bias added to confidence
    pub beta_star: f64,
    /// Learning rate on correct responses
    pub alpha: f64,
    /// Learning rate on errors
    pub alpha_err: f64,
    /// Forgetting rate per day
    pub lambda: f64,
}

/// The system's belief about the learner, inferred from responses
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SystemBelief {
    pub k_hat: f64,
    pub beta_hat: f64,
    pub confidence_interval: f64,
}

impl Default for SystemBelief {
    fn default() -> Self {
        Self {
            k_hat: 0.3,
            beta_hat: 0.0,
            confidence_interval: 0.2,
        }
    }
}

/// A reviewable item (e.g. one vocabulary card)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub id: String,
    /// Difficulty in [0, 1]
    pub difficulty: f64,
    pub true_state: ItemTrueState,
    pub system_belief: ItemSystemBelief,
}

impl Item {
    pub fn new(id: impl Into<String>, difficulty: f64) -> Self {
        Self {
            id: id.into(),
            difficulty,
            true_state: ItemTrueState {
                k_star: 0.1,
                last_review: None,
            },
            system_belief: ItemSystemBelief {
                k_hat: 0.1,
                beta_hat: 0.0,
                next_review: 1.0,
                interval_days: 1,
                ease_factor: 2.5,
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemTrueState {
    pub k_star: f64,
    /// Day of the last review, if any
    pub last_review: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemSystemBelief {
    pub k_hat: f64,
    pub beta_hat: f64,
    /// Day on which the item is next due
    pub next_review: f64,
    pub interval_days: u32,
    pub ease_factor: f64,
}

/// A single learner response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Response {
    pub item_id: String,
    pub correctness: bool,
    /// Reported confidence in [0, 1]
    pub confidence: f64,
    /// Response time in seconds
    pub response_time: f64,
    /// Simulated day of the response
    pub day: f64,
}

impl Response {
    pub fn outcome(&self) -> f64 {
        if self.correctness {
            1.0
        } else {
            0.0
        }
    }
}

/// A response enriched by the dual-process classifier
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessedResponse {
    #[serde(flatten)]
    pub response: Response,
    pub response_type: ResponseType,
    pub normalized_rt: f64,
    pub dual_process_score: f64,
    pub brier_score: f64,
}

impl ProcessedResponse {
    pub fn correctness(&self) -> bool {
        self.response.correctness
    }

    pub fn confidence(&self) -> f64 {
        self.response.confidence
    }
}

impl AsRef<Response> for Response {
    fn as_ref(&self) -> &Response {
        self
    }
}

impl AsRef<Response> for ProcessedResponse {
    fn as_ref(&self) -> &Response {
        &self.response
    }
}
