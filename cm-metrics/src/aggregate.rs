//! Averaging replications into summary rows, trajectory records and the
//! hypothesis report

use crate::error::MetricsError;
use crate::records::{ResultsDocument, SummaryRow, SummaryTable, TrajectoryRecord, TrajectoryTable};
use calibrateme_core::stats::{cohens_d, mean};
use calibrateme_core::{CalibrationType, ExperimentResults, ProfileId, SchedulerType, SimulationResults};
use serde::{Deserialize, Serialize};

/// Improvement below which well-calibrated learners count as unaffected
pub const H3_TOLERANCE: f64 = 0.05;

/// Everything exported for one experiment
#[derive(Debug, Clone)]
pub struct AggregatedResults {
    pub summary: SummaryTable,
    pub document: ResultsDocument,
    pub trajectories: TrajectoryTable,
    pub hypothesis: HypothesisReport,
}

fn last(series: &[f64]) -> f64 {
    series.last().copied().unwrap_or(0.0)
}

fn mean_of(runs: &[SimulationResults], f: impl Fn(&SimulationResults) -> f64) -> f64 {
    let values: Vec<f64> = runs.iter().map(f).collect();
    mean(&values)
}

/// Session-by-session mean of one series across replications
fn mean_series(
    runs: &[SimulationResults],
    f: impl Fn(&SimulationResults) -> &[f64],
) -> Vec<f64> {
    let sessions = runs.iter().map(|r| f(r).len()).min().unwrap_or(0);
    (0..sessions)
        .map(|s| {
            let values: Vec<f64> = runs.iter().map(|r| f(r)[s]).collect();
            mean(&values)
        })
        .collect()
}

/// Summary row for one pair: replication means, finals taken at the last session
pub fn summary_row(
    profile: ProfileId,
    scheduler: SchedulerType,
    runs: &[SimulationResults],
) -> Result<SummaryRow, MetricsError> {
    if runs.is_empty() {
        return Err(MetricsError::EmptyAggregate(format!("{profile} / {scheduler}")));
    }
    Ok(SummaryRow {
        profile,
        scheduler,
        ret_1d: mean_of(runs, |r| r.retention_1day),
        ret_7d: mean_of(runs, |r| r.retention_7day),
        ret_30d: mean_of(runs, |r| r.retention_30day),
        mastery: mean_of(runs, |r| r.time_to_mastery as f64),
        efficiency: mean_of(runs, |r| r.review_efficiency),
        final_ece: mean_of(runs, |r| last(&r.ece_trajectory)),
        final_brier: mean_of(runs, |r| last(&r.brier_trajectory)),
        final_kstar: mean_of(runs, |r| last(&r.k_star_trajectory)),
    })
}

/// Trajectory record for one pair
pub fn trajectory_record(
    profile: ProfileId,
    scheduler: SchedulerType,
    runs: &[SimulationResults],
) -> Result<TrajectoryRecord, MetricsError> {
    if runs.is_empty() {
        return Err(MetricsError::EmptyAggregate(format!("{profile} / {scheduler}")));
    }
    Ok(TrajectoryRecord {
        retention_1day: mean_of(runs, |r| r.retention_1day),
        retention_7day: mean_of(runs, |r| r.retention_7day),
        retention_30day: mean_of(runs, |r| r.retention_30day),
        time_to_mastery: mean_of(runs, |r| r.time_to_mastery as f64),
        final_k_star: mean_of(runs, |r| last(&r.k_star_trajectory)),
        k_star_trajectory: mean_series(runs, |r| &r.k_star_trajectory),
        k_hat_trajectory: mean_series(runs, |r| &r.k_hat_trajectory),
        ece_trajectory: mean_series(runs, |r| &r.ece_trajectory),
        brier_trajectory: mean_series(runs, |r| &r.brier_trajectory),
    })
}

/// Average every pair of an experiment
pub fn aggregate(results: &ExperimentResults) -> Result<AggregatedResults, MetricsError> {
    let mut rows = Vec::with_capacity(results.len());
    let mut document = ResultsDocument::new();
    for (profile, scheduler, runs) in results.iter() {
        rows.push(summary_row(profile, scheduler, runs)?);
        document.insert(profile, scheduler, trajectory_record(profile, scheduler, runs)?);
    }
    let trajectories = TrajectoryTable::from_document(&document);
    let hypothesis = HypothesisReport::from_experiment(results);
    tracing::debug!(rows = rows.len(), "aggregated experiment");

    Ok(AggregatedResults {
        summary: SummaryTable::new(rows),
        document,
        trajectories,
        hypothesis,
    })
}

/// CalibrateMe − SM-2 7-day retention for one calibration type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalibrationImprovement {
    pub calibration: CalibrationType,
    pub mean_improvement: f64,
    pub effect_size: f64,
    /// Replications per scheduler pooled across ability levels
    pub samples: usize,
}

/// Outcome of the three study hypotheses
///
/// - H1: overconfident learners gain the most
/// - H2: underconfident learners gain less than overconfident but more than
///   well-calibrated ones
/// - H3: well-calibrated learners gain next to nothing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HypothesisReport {
    pub improvements: Vec<CalibrationImprovement>,
    pub h1_overconfident_largest: bool,
    pub h2_underconfident_moderate: bool,
    pub h3_well_calibrated_minimal: bool,
}

impl HypothesisReport {
    /// Pool replications of every ability level per calibration type
    pub fn from_experiment(results: &ExperimentResults) -> Self {
        let improvements: Vec<CalibrationImprovement> = CalibrationType::ALL
            .iter()
            .map(|&calibration| {
                let mut cm = Vec::new();
                let mut sm2 = Vec::new();
                for (profile, scheduler, runs) in results.iter() {
                    if profile.calibration != calibration {
                        continue;
                    }
                    let target = match scheduler {
                        SchedulerType::CalibrateMe => &mut cm,
                        SchedulerType::Sm2 => &mut sm2,
                        _ => continue,
                    };
                    target.extend(runs.iter().map(|r| r.retention_7day));
                }
                CalibrationImprovement {
                    calibration,
                    mean_improvement: mean(&cm) - mean(&sm2),
                    effect_size: cohens_d(&cm, &sm2),
                    samples: cm.len().min(sm2.len()),
                }
            })
            .collect();
        Self::from_improvements(improvements)
    }

    pub fn from_improvements(improvements: Vec<CalibrationImprovement>) -> Self {
        let of = |c: CalibrationType| {
            improvements
                .iter()
                .find(|i| i.calibration == c)
                .map_or(0.0, |i| i.mean_improvement)
        };
        let over = of(CalibrationType::Overconfident);
        let under = of(CalibrationType::Underconfident);
        let well = of(CalibrationType::WellCalibrated);

        Self {
            h1_overconfident_largest: over > under && over > well,
            h2_underconfident_moderate: under > well && under < over,
            h3_well_calibrated_minimal: well.abs() < H3_TOLERANCE,
            improvements,
        }
    }

    pub fn improvement(&self, calibration: CalibrationType) -> Option<&CalibrationImprovement> {
        self.improvements.iter().find(|i| i.calibration == calibration)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use calibrateme_core::SimulationConfig;

    fn run(retention_7day: f64, k_star: Vec<f64>) -> SimulationResults {
        SimulationResults {
            profile_id: "Med-Over".parse().unwrap(),
            scheduler_type: SchedulerType::CalibrateMe,
            config: SimulationConfig::default(),
            retention_1day: retention_7day + 0.1,
            retention_7day,
            retention_30day: retention_7day - 0.1,
            time_to_mastery: 30,
            review_efficiency: 12.0,
            total_review_time: 100.0,
            final_k_star: *k_star.last().unwrap(),
            ece_trajectory: vec![0.2; k_star.len()],
            brier_trajectory: vec![0.25; k_star.len()],
            k_hat_trajectory: vec![0.3; k_star.len()],
            k_star_trajectory: k_star,
            session_data: Vec::new(),
        }
    }

    #[test]
    fn replications_are_averaged() {
        let runs = vec![run(0.4, vec![0.2, 0.4]), run(0.6, vec![0.4, 0.6])];
        let profile: ProfileId = "Med-Over".parse().unwrap();
        let row = summary_row(profile, SchedulerType::CalibrateMe, &runs).unwrap();
        assert!((row.ret_7d - 0.5).abs() < 1e-12);
        assert!((row.final_kstar - 0.5).abs() < 1e-12);
        assert_eq!(row.mastery, 30.0);

        let record = trajectory_record(profile, SchedulerType::CalibrateMe, &runs).unwrap();
        assert_eq!(record.k_star_trajectory.len(), 2);
        assert!((record.k_star_trajectory[0] - 0.3).abs() < 1e-12);
        assert!((record.k_star_trajectory[1] - 0.5).abs() < 1e-12);
    }

    #[test]
    fn empty_replications_are_an_error() {
        let profile: ProfileId = "Med-Over".parse().unwrap();
        assert!(matches!(
            summary_row(profile, SchedulerType::Sm2, &[]),
            Err(MetricsError::EmptyAggregate(_))
        ));
    }

    #[test]
    fn hypotheses_follow_improvement_ordering() {
        let imp = |calibration, mean_improvement| CalibrationImprovement {
            calibration,
            mean_improvement,
            effect_size: 0.0,
            samples: 10,
        };
        let report = HypothesisReport::from_improvements(vec![
            imp(CalibrationType::Overconfident, 0.08),
            imp(CalibrationType::Underconfident, 0.03),
            imp(CalibrationType::WellCalibrated, 0.01),
        ]);
        assert!(report.h1_overconfident_largest);
        assert!(report.h2_underconfident_moderate);
        assert!(report.h3_well_calibrated_minimal);

        let report = HypothesisReport::from_improvements(vec![
            imp(CalibrationType::Overconfident, 0.01),
            imp(CalibrationType::Underconfident, 0.03),
            imp(CalibrationType::WellCalibrated, 0.2),
        ]);
        assert!(!report.h1_overconfident_largest);
        assert!(!report.h2_underconfident_moderate);
        assert!(!report.h3_well_calibrated_minimal);
    }
}
