//! In-memory shapes of the result files
//!
//! Records are built once (by aggregation or loading) and only read after
//! that.

use crate::error::MetricsError;
use calibrateme_core::{AbilityLevel, CalibrationType, ProfileId, SchedulerType};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub const SUMMARY_FILE: &str = "tuned_summary.csv";
pub const TRAJECTORIES_FILE: &str = "tuned_trajectories.csv";
pub const RESULTS_FILE: &str = "tuned_results.json";
pub const HYPOTHESIS_FILE: &str = "hypothesis.json";

/// Profiles whose trajectories are exported and plotted session by session
pub const KEY_PROFILES: [ProfileId; 4] = [
    ProfileId::new(AbilityLevel::Medium, CalibrationType::Overconfident),
    ProfileId::new(AbilityLevel::Medium, CalibrationType::Underconfident),
    ProfileId::new(AbilityLevel::Medium, CalibrationType::WellCalibrated),
    ProfileId::new(AbilityLevel::High, CalibrationType::Overconfident),
];

/// Schedulers compared session by session
pub const TRAJECTORY_SCHEDULERS: [SchedulerType; 2] = [SchedulerType::CalibrateMe, SchedulerType::Sm2];

/// Column tag for a scheduler in the trajectory table
pub fn trajectory_tag(scheduler: SchedulerType) -> &'static str {
    match scheduler {
        SchedulerType::CalibrateMe => "CM",
        SchedulerType::Sm2 => "SM2",
        SchedulerType::BktOnly => "BKT",
        SchedulerType::DecayBased => "DECAY",
    }
}

/// One row of `tuned_summary.csv`: replication means for a profile/scheduler pair
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryRow {
    pub profile: ProfileId,
    pub scheduler: SchedulerType,
    pub ret_1d: f64,
    pub ret_7d: f64,
    pub ret_30d: f64,
    /// Sessions to mastery
    pub mastery: f64,
    /// Reviews per item
    pub efficiency: f64,
    pub final_ece: f64,
    pub final_brier: f64,
    #[serde(rename = "final_Kstar")]
    pub final_kstar: f64,
}

impl SummaryRow {
    /// Fields that must lie in [0, 1], by column name
    pub fn unit_fields(&self) -> [(&'static str, f64); 6] {
        [
            ("ret_1d", self.ret_1d),
            ("ret_7d", self.ret_7d),
            ("ret_30d", self.ret_30d),
            ("final_ece", self.final_ece),
            ("final_brier", self.final_brier),
            ("final_Kstar", self.final_kstar),
        ]
    }
}

/// All summary rows, in file order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SummaryTable {
    rows: Vec<SummaryRow>,
}

impl SummaryTable {
    pub fn new(rows: Vec<SummaryRow>) -> Self {
        Self { rows }
    }

    pub fn rows(&self) -> &[SummaryRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// The unique row for a pair
    ///
    /// # Errors
    ///
    /// `MissingRow` if no row matches, `DuplicateRow` if more than one does.
    pub fn get(&self, profile: ProfileId, scheduler: SchedulerType) -> Result<&SummaryRow, MetricsError> {
        let mut matches = self
            .rows
            .iter()
            .filter(|r| r.profile == profile && r.scheduler == scheduler);
        let first = matches.next().ok_or_else(|| MetricsError::MissingRow {
            profile: profile.to_string(),
            scheduler: scheduler.to_string(),
        })?;
        if matches.next().is_some() {
            return Err(MetricsError::DuplicateRow {
                profile: profile.to_string(),
                scheduler: scheduler.to_string(),
            });
        }
        Ok(first)
    }

    /// Plain-text 7-day retention table, one line per profile
    pub fn retention_table(&self) -> String {
        let mut out = format!(
            "{:<12} | {:>12} | {:>12} | {:>12} | {:>12} | {:>12}\n",
            "Profile", "CalibrateMe", "SM-2", "BKT-Only", "Decay", "Δ (CM-SM2)"
        );
        out.push_str(&"-".repeat(out.chars().count() - 1));
        out.push('\n');

        for profile in ProfileId::all() {
            let cells: Vec<Option<f64>> = SchedulerType::ALL
                .iter()
                .map(|&s| self.get(profile, s).ok().map(|r| r.ret_7d))
                .collect();
            if cells.iter().all(Option::is_none) {
                continue;
            }
            out.push_str(&format!("{:<12}", profile.to_string()));
            for cell in &cells {
                let text = cell.map_or("-".to_string(), |v| format!("{:.1}%", v * 100.0));
                out.push_str(&format!(" | {text:>12}"));
            }
            let delta = match (cells[0], cells[1]) {
                (Some(cm), Some(sm2)) => format!("{:+.2}%", (cm - sm2) * 100.0),
                _ => "-".to_string(),
            };
            out.push_str(&format!(" | {delta:>12}\n"));
        }
        out
    }
}

/// Replication-averaged outcome of one profile/scheduler pair
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrajectoryRecord {
    pub retention_1day: f64,
    pub retention_7day: f64,
    pub retention_30day: f64,
    pub time_to_mastery: f64,
    #[serde(rename = "final_K_star")]
    pub final_k_star: f64,
    #[serde(rename = "K_star_trajectory")]
    pub k_star_trajectory: Vec<f64>,
    #[serde(rename = "K_hat_trajectory")]
    pub k_hat_trajectory: Vec<f64>,
    pub ece_trajectory: Vec<f64>,
    pub brier_trajectory: Vec<f64>,
}

impl TrajectoryRecord {
    /// Named per-session series
    pub fn series(&self) -> [(&'static str, &[f64]); 4] {
        [
            ("K_star_trajectory", self.k_star_trajectory.as_slice()),
            ("K_hat_trajectory", self.k_hat_trajectory.as_slice()),
            ("ece_trajectory", self.ece_trajectory.as_slice()),
            ("brier_trajectory", self.brier_trajectory.as_slice()),
        ]
    }

    pub fn num_sessions(&self) -> usize {
        self.k_star_trajectory.len()
    }
}

/// Contents of `tuned_results.json`: profile → scheduler → record
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResultsDocument {
    entries: BTreeMap<String, BTreeMap<String, TrajectoryRecord>>,
}

impl ResultsDocument {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, profile: ProfileId, scheduler: SchedulerType, record: TrajectoryRecord) {
        self.entries
            .entry(profile.to_string())
            .or_default()
            .insert(scheduler.as_str().to_string(), record);
    }

    /// The record for a pair, or `MissingKey` naming the absent key
    pub fn record(&self, profile: ProfileId, scheduler: SchedulerType) -> Result<&TrajectoryRecord, MetricsError> {
        let profile_key = profile.to_string();
        let by_scheduler = self
            .entries
            .get(&profile_key)
            .ok_or_else(|| MetricsError::MissingKey(profile_key.clone()))?;
        by_scheduler
            .get(scheduler.as_str())
            .ok_or_else(|| MetricsError::MissingKey(format!("{profile_key}.{scheduler}")))
    }

    /// All records with their raw keys
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str, &TrajectoryRecord)> {
        self.entries.iter().flat_map(|(p, by_scheduler)| {
            by_scheduler
                .iter()
                .map(move |(s, record)| (p.as_str(), s.as_str(), record))
        })
    }

    pub fn len(&self) -> usize {
        self.entries.values().map(BTreeMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Contents of `tuned_trajectories.csv`
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TrajectoryTable {
    sessions: Vec<u32>,
    columns: Vec<(String, Vec<f64>)>,
}

impl TrajectoryTable {
    pub fn new(sessions: Vec<u32>, columns: Vec<(String, Vec<f64>)>) -> Self {
        Self { sessions, columns }
    }

    /// Key-profile K* and ECE columns for CalibrateMe and SM-2
    ///
    /// Key profiles without both records in `document` are skipped.
    pub fn from_document(document: &ResultsDocument) -> Self {
        let mut columns = Vec::new();
        let mut num_sessions = 0;
        for profile in KEY_PROFILES {
            let records: Vec<_> = TRAJECTORY_SCHEDULERS
                .iter()
                .filter_map(|&s| document.record(profile, s).ok().map(|r| (s, r)))
                .collect();
            if records.len() != TRAJECTORY_SCHEDULERS.len() {
                tracing::warn!(profile = %profile, "skipping key profile without CM and SM2 records");
                continue;
            }
            for (s, r) in &records {
                columns.push((column_name(profile, *s, "Kstar"), r.k_star_trajectory.clone()));
            }
            for (s, r) in &records {
                columns.push((column_name(profile, *s, "ECE"), r.ece_trajectory.clone()));
            }
            num_sessions = num_sessions.max(records[0].1.num_sessions());
        }
        let sessions = (1..=num_sessions as u32).collect();
        Self { sessions, columns }
    }

    /// 1-based session numbers
    pub fn sessions(&self) -> &[u32] {
        &self.sessions
    }

    pub fn columns(&self) -> &[(String, Vec<f64>)] {
        &self.columns
    }

    pub fn column(&self, name: &str) -> Result<&[f64], MetricsError> {
        self.columns
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, values)| values.as_slice())
            .ok_or_else(|| MetricsError::MissingKey(name.to_string()))
    }
}

/// `{profile}_{CM|SM2}_{metric}`
pub fn column_name(profile: ProfileId, scheduler: SchedulerType, metric: &str) -> String {
    format!("{profile}_{}_{metric}", trajectory_tag(scheduler))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(profile: &str, scheduler: SchedulerType, ret_7d: f64) -> SummaryRow {
        SummaryRow {
            profile: profile.parse().unwrap(),
            scheduler,
            ret_1d: 0.6,
            ret_7d,
            ret_30d: 0.3,
            mastery: 30.0,
            efficiency: 12.0,
            final_ece: 0.1,
            final_brier: 0.2,
            final_kstar: 0.5,
        }
    }

    fn record(n: usize) -> TrajectoryRecord {
        TrajectoryRecord {
            retention_1day: 0.6,
            retention_7day: 0.5,
            retention_30day: 0.3,
            time_to_mastery: 30.0,
            final_k_star: 0.5,
            k_star_trajectory: vec![0.4; n],
            k_hat_trajectory: vec![0.3; n],
            ece_trajectory: vec![0.1; n],
            brier_trajectory: vec![0.2; n],
        }
    }

    #[test]
    fn get_requires_a_unique_row() {
        let table = SummaryTable::new(vec![
            row("Med-Over", SchedulerType::CalibrateMe, 0.5),
            row("Med-Over", SchedulerType::Sm2, 0.4),
            row("Med-Over", SchedulerType::Sm2, 0.41),
        ]);
        let med_over: ProfileId = "Med-Over".parse().unwrap();
        assert_eq!(table.get(med_over, SchedulerType::CalibrateMe).unwrap().ret_7d, 0.5);
        assert!(matches!(
            table.get(med_over, SchedulerType::Sm2),
            Err(MetricsError::DuplicateRow { .. })
        ));
        assert!(matches!(
            table.get(med_over, SchedulerType::BktOnly),
            Err(MetricsError::MissingRow { .. })
        ));
    }

    #[test]
    fn document_lookup_names_missing_key() {
        let mut doc = ResultsDocument::new();
        let med_over: ProfileId = "Med-Over".parse().unwrap();
        doc.insert(med_over, SchedulerType::CalibrateMe, record(3));
        assert!(doc.record(med_over, SchedulerType::CalibrateMe).is_ok());
        match doc.record(med_over, SchedulerType::Sm2) {
            Err(MetricsError::MissingKey(key)) => assert_eq!(key, "Med-Over.SM2"),
            other => panic!("unexpected {other:?}"),
        }
        assert!(matches!(
            doc.record("Low-Well".parse().unwrap(), SchedulerType::Sm2),
            Err(MetricsError::MissingKey(_))
        ));
    }

    #[test]
    fn document_serializes_with_contract_keys() {
        let mut doc = ResultsDocument::new();
        doc.insert("High-Over".parse().unwrap(), SchedulerType::Sm2, record(2));
        let json = serde_json::to_value(&doc).unwrap();
        let rec = &json["High-Over"]["SM2"];
        assert!(rec["K_star_trajectory"].is_array());
        assert!(rec["final_K_star"].is_number());
        assert!(rec["retention_7day"].is_number());
    }

    #[test]
    fn trajectory_table_has_contract_columns() {
        let mut doc = ResultsDocument::new();
        for p in KEY_PROFILES {
            for s in TRAJECTORY_SCHEDULERS {
                doc.insert(p, s, record(5));
            }
        }
        let table = TrajectoryTable::from_document(&doc);
        assert_eq!(table.sessions(), &[1, 2, 3, 4, 5]);
        assert_eq!(table.columns().len(), 16);
        assert_eq!(table.columns()[0].0, "Med-Over_CM_Kstar");
        assert_eq!(table.columns()[3].0, "Med-Over_SM2_ECE");
        assert_eq!(table.column("High-Over_SM2_Kstar").unwrap().len(), 5);
    }

    #[test]
    fn retention_table_lists_present_profiles() {
        let table = SummaryTable::new(vec![
            row("Med-Over", SchedulerType::CalibrateMe, 0.5),
            row("Med-Over", SchedulerType::Sm2, 0.4),
        ]);
        let text = table.retention_table();
        assert!(text.contains("Med-Over"));
        assert!(text.contains("+10.00%"));
        assert!(!text.contains("Low-Well"));
    }
}
