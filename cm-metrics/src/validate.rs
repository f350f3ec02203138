//! Data-contract checks run before any figure is drawn

use crate::error::MetricsError;
use crate::load::ResultsDataset;
use crate::records::{
    column_name, ResultsDocument, SummaryTable, TrajectoryTable, KEY_PROFILES, TRAJECTORY_SCHEDULERS,
};
use calibrateme_core::{ProfileId, SchedulerType};

/// Every summary row in range, and exactly one row per profile/scheduler pair
pub fn validate_summary(summary: &SummaryTable) -> Result<(), MetricsError> {
    for row in summary.rows() {
        let out_of_range = |field: &str, value: f64| MetricsError::OutOfRange {
            field: field.to_string(),
            profile: row.profile.to_string(),
            scheduler: row.scheduler.to_string(),
            value,
        };
        for (field, value) in row.unit_fields() {
            if !(0.0..=1.0).contains(&value) {
                return Err(out_of_range(field, value));
            }
        }
        if !(row.mastery >= 0.0 && row.mastery.is_finite()) {
            return Err(out_of_range("mastery", row.mastery));
        }
        if !(row.efficiency >= 0.0 && row.efficiency.is_finite()) {
            return Err(out_of_range("efficiency", row.efficiency));
        }
    }

    for profile in ProfileId::all() {
        for scheduler in SchedulerType::ALL {
            summary.get(profile, scheduler)?;
        }
    }
    Ok(())
}

/// Records the trajectory figures consume
pub fn consumed_records() -> Vec<(ProfileId, SchedulerType)> {
    KEY_PROFILES
        .iter()
        .flat_map(|&p| TRAJECTORY_SCHEDULERS.iter().map(move |&s| (p, s)))
        .collect()
}

/// Columns of `tuned_trajectories.csv` the trajectory figures read
pub fn trajectory_columns() -> Vec<String> {
    KEY_PROFILES
        .iter()
        .flat_map(|&p| {
            ["Kstar", "ECE"]
                .into_iter()
                .flat_map(move |metric| TRAJECTORY_SCHEDULERS.iter().map(move |&s| column_name(p, s, metric)))
        })
        .collect()
}

/// Consumed records exist and every series has `expected_sessions` entries
///
/// A run has at least one session, so an empty series is rejected.
///
/// # Returns
/// The session count that was checked against
pub fn validate_document(
    document: &ResultsDocument,
    expected_sessions: Option<usize>,
) -> Result<usize, MetricsError> {
    if expected_sessions == Some(0) {
        return Err(MetricsError::ValidationError(
            "expected session count must be positive".to_string(),
        ));
    }
    let pairs = consumed_records();
    let mut expected = expected_sessions;

    for (profile, scheduler) in pairs {
        let record = document.record(profile, scheduler)?;
        let key = format!("{profile}.{scheduler}");
        let sessions = *expected.get_or_insert_with(|| record.num_sessions());
        if sessions == 0 {
            return Err(MetricsError::ValidationError(format!("{key} has no sessions")));
        }

        for (series, values) in record.series() {
            if values.len() != sessions {
                return Err(MetricsError::TrajectoryLength {
                    key,
                    series: series.to_string(),
                    expected: sessions,
                    actual: values.len(),
                });
            }
        }
        if record.k_hat_trajectory.len() != record.k_star_trajectory.len() {
            return Err(MetricsError::TrajectoryLength {
                key,
                series: "K_hat_trajectory".to_string(),
                expected: record.k_star_trajectory.len(),
                actual: record.k_hat_trajectory.len(),
            });
        }
    }
    expected.ok_or_else(|| MetricsError::ValidationError("no trajectory records".to_string()))
}

/// Sessions run 1..=N, the figure columns are present, and every column has N values
pub fn validate_trajectory_table(table: &TrajectoryTable, expected_sessions: usize) -> Result<(), MetricsError> {
    for name in trajectory_columns() {
        table.column(&name)?;
    }
    let contiguous = table
        .sessions()
        .iter()
        .enumerate()
        .all(|(i, &s)| s as usize == i + 1);
    if !contiguous || table.sessions().len() != expected_sessions {
        return Err(MetricsError::TrajectoryLength {
            key: "tuned_trajectories".to_string(),
            series: "session".to_string(),
            expected: expected_sessions,
            actual: table.sessions().len(),
        });
    }
    for (name, values) in table.columns() {
        if values.len() != expected_sessions {
            return Err(MetricsError::TrajectoryLength {
                key: "tuned_trajectories".to_string(),
                series: name.clone(),
                expected: expected_sessions,
                actual: values.len(),
            });
        }
    }
    Ok(())
}

/// Run every check over a loaded dataset, returning the session count
pub fn validate_dataset(dataset: &ResultsDataset, expected_sessions: Option<usize>) -> Result<usize, MetricsError> {
    validate_summary(&dataset.summary)?;
    let sessions = validate_document(&dataset.document, expected_sessions)?;
    if let Some(table) = &dataset.trajectories {
        validate_trajectory_table(table, sessions)?;
    }
    tracing::debug!(sessions, "results passed validation");
    Ok(sessions)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::{SummaryRow, TrajectoryRecord};

    fn full_summary() -> Vec<SummaryRow> {
        ProfileId::all()
            .into_iter()
            .flat_map(|profile| {
                SchedulerType::ALL.into_iter().map(move |scheduler| SummaryRow {
                    profile,
                    scheduler,
                    ret_1d: 0.7,
                    ret_7d: 0.5,
                    ret_30d: 0.3,
                    mastery: 30.0,
                    efficiency: 12.0,
                    final_ece: 0.1,
                    final_brier: 0.2,
                    final_kstar: 0.6,
                })
            })
            .collect()
    }

    fn record(n: usize) -> TrajectoryRecord {
        TrajectoryRecord {
            retention_1day: 0.7,
            retention_7day: 0.5,
            retention_30day: 0.3,
            time_to_mastery: 30.0,
            final_k_star: 0.6,
            k_star_trajectory: vec![0.5; n],
            k_hat_trajectory: vec![0.4; n],
            ece_trajectory: vec![0.1; n],
            brier_trajectory: vec![0.2; n],
        }
    }

    fn full_document(n: usize) -> ResultsDocument {
        let mut doc = ResultsDocument::new();
        for (p, s) in consumed_records() {
            doc.insert(p, s, record(n));
        }
        doc
    }

    #[test]
    fn complete_summary_passes() {
        assert!(validate_summary(&SummaryTable::new(full_summary())).is_ok());
    }

    #[test]
    fn out_of_range_ece_is_rejected() {
        let mut rows = full_summary();
        rows[5].final_ece = 1.2;
        match validate_summary(&SummaryTable::new(rows)) {
            Err(MetricsError::OutOfRange { field, value, .. }) => {
                assert_eq!(field, "final_ece");
                assert_eq!(value, 1.2);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn negative_mastery_is_rejected() {
        let mut rows = full_summary();
        rows[0].mastery = -1.0;
        assert!(matches!(
            validate_summary(&SummaryTable::new(rows)),
            Err(MetricsError::OutOfRange { .. })
        ));
    }

    #[test]
    fn missing_and_duplicate_rows_are_rejected() {
        let mut rows = full_summary();
        rows.pop();
        assert!(matches!(
            validate_summary(&SummaryTable::new(rows)),
            Err(MetricsError::MissingRow { .. })
        ));

        let mut rows = full_summary();
        rows.push(rows[3].clone());
        assert!(matches!(
            validate_summary(&SummaryTable::new(rows)),
            Err(MetricsError::DuplicateRow { .. })
        ));
    }

    #[test]
    fn session_count_is_inferred_or_enforced() {
        let doc = full_document(30);
        assert_eq!(validate_document(&doc, None).unwrap(), 30);
        assert_eq!(validate_document(&doc, Some(30)).unwrap(), 30);
        assert!(matches!(
            validate_document(&doc, Some(20)),
            Err(MetricsError::TrajectoryLength { expected: 20, actual: 30, .. })
        ));
    }

    #[test]
    fn short_k_hat_series_is_rejected() {
        let mut doc = full_document(10);
        let mut bad = record(10);
        bad.k_hat_trajectory.truncate(9);
        doc.insert("Med-Well".parse().unwrap(), SchedulerType::Sm2, bad);
        match validate_document(&doc, None) {
            Err(MetricsError::TrajectoryLength { key, series, .. }) => {
                assert_eq!(key, "Med-Well.SM2");
                assert_eq!(series, "K_hat_trajectory");
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn missing_key_profile_record_is_rejected() {
        let mut doc = ResultsDocument::new();
        doc.insert("Med-Over".parse().unwrap(), SchedulerType::CalibrateMe, record(5));
        assert!(matches!(
            validate_document(&doc, None),
            Err(MetricsError::MissingKey(_))
        ));
    }

    #[test]
    fn trajectory_table_must_be_contiguous() {
        let table = TrajectoryTable::from_document(&full_document(4));
        assert!(validate_trajectory_table(&table, 4).is_ok());
        assert!(validate_trajectory_table(&table, 5).is_err());

        let gap = TrajectoryTable::new(vec![1, 2, 4], vec![("x".to_string(), vec![0.0; 3])]);
        assert!(validate_trajectory_table(&gap, 3).is_err());
    }

    #[test]
    fn empty_series_are_rejected() {
        let doc = full_document(0);
        assert!(matches!(
            validate_document(&doc, None),
            Err(MetricsError::ValidationError(_))
        ));
        assert!(matches!(
            validate_document(&full_document(3), Some(0)),
            Err(MetricsError::ValidationError(_))
        ));
    }

    #[test]
    fn trajectory_table_needs_every_figure_column() {
        let full = TrajectoryTable::from_document(&full_document(4));
        assert_eq!(full.columns().len(), trajectory_columns().len());
        assert_eq!(trajectory_columns().len(), 16);

        let dropped = "Med-Well_SM2_ECE";
        let columns = full
            .columns()
            .iter()
            .filter(|(name, _)| name != dropped)
            .cloned()
            .collect();
        let table = TrajectoryTable::new(full.sessions().to_vec(), columns);
        match validate_trajectory_table(&table, 4) {
            Err(MetricsError::MissingKey(name)) => assert_eq!(name, dropped),
            other => panic!("unexpected {other:?}"),
        }
    }
}
