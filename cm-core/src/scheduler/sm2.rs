use super::ReviewScheduler;
use crate::types::{Item, ProcessedResponse, SchedulerType, SystemBelief};
use std::collections::HashMap;

const MIN_EASE_FACTOR: f64 = 1.3;

/// Per-item SuperMemo-2 state
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sm2State {
    pub ease_factor: f64,
    pub interval: u32,
    pub repetitions: u32,
}

impl Default for Sm2State {
    fn default() -> Self {
        Self {
            ease_factor: 2.5,
            interval: 1,
            repetitions: 0,
        }
    }
}

/// Quality grade 0–5: round(5c) when correct, 0 otherwise
pub fn map_to_quality(confidence: f64, correctness: bool) -> u8 {
    if !correctness {
        return 0;
    }
    (5.0 * confidence).round().clamp(0.0, 5.0) as u8
}

pub fn update_sm2(state: &Sm2State, quality: u8) -> Sm2State {
    let q = f64::from(quality.min(5));
    let ease_factor =
        (state.ease_factor + (0.1 - (5.0 - q) * (0.08 + (5.0 - q) * 0.02))).max(MIN_EASE_FACTOR);

    if quality < 3 {
        return Sm2State {
            ease_factor,
            interval: 1,
            repetitions: 0,
        };
    }

    let repetitions = state.repetitions + 1;
    let interval = match repetitions {
        1 => 1,
        2 => 6,
        _ => (f64::from(state.interval) * ease_factor).round() as u32,
    };
    Sm2State {
        ease_factor,
        interval,
        repetitions,
    }
}

#[derive(Debug, Clone, Default)]
pub struct Sm2Scheduler {
    states: HashMap<String, Sm2State>,
}

impl Sm2Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self, item_id: &str) -> Sm2State {
        self.states.get(item_id).copied().unwrap_or_default()
    }
}

impl ReviewScheduler for Sm2Scheduler {
    fn scheduler_type(&self) -> SchedulerType {
        SchedulerType::Sm2
    }

    fn schedule(&mut self, item: &Item, response: &ProcessedResponse, _belief: &SystemBelief) -> u32 {
        let quality = map_to_quality(response.confidence(), response.correctness());
        let next = update_sm2(&self.state(&item.id), quality);
        self.states.insert(item.id.clone(), next);
        next.interval
    }

    fn reset(&mut self) {
        self.states.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quality_mapping() {
        assert_eq!(map_to_quality(0.9, false), 0);
        assert_eq!(map_to_quality(0.9, true), 5);
        assert_eq!(map_to_quality(0.5, true), 3);
        assert_eq!(map_to_quality(0.0, true), 0);
    }

    #[test]
    fn classic_interval_sequence() {
        let s1 = update_sm2(&Sm2State::default(), 5);
        assert_eq!((s1.interval, s1.repetitions), (1, 1));
        let s2 = update_sm2(&s1, 5);
        assert_eq!((s2.interval, s2.repetitions), (6, 2));
        let s3 = update_sm2(&s2, 5);
        assert_eq!(s3.interval, (6.0 * s3.ease_factor).round() as u32);
    }

    #[test]
    fn failure_resets_repetitions() {
        let s = update_sm2(
            &Sm2State {
                ease_factor: 2.5,
                interval: 15,
                repetitions: 4,
            },
            2,
        );
        assert_eq!((s.interval, s.repetitions), (1, 0));
    }

    #[test]
    fn ease_factor_never_drops_below_floor() {
        let mut s = Sm2State::default();
        for _ in 0..50 {
            s = update_sm2(&s, 0);
            assert!(s.ease_factor >= MIN_EASE_FACTOR);
        }
        assert_eq!(s.ease_factor, MIN_EASE_FACTOR);
    }
}
