//! Export a small experiment, read it back and validate it

use calibrateme_core::{run_experiment, ExperimentConfig, SchedulerType, SimulationConfig};
use calibrateme_metrics::records::{HYPOTHESIS_FILE, RESULTS_FILE, SUMMARY_FILE, TRAJECTORIES_FILE};
use calibrateme_metrics::{aggregate, export_all, MetricsError, ResultsDataset, KEY_PROFILES};
use std::path::PathBuf;

fn make_temp_dir(prefix: &str) -> PathBuf {
    use std::sync::atomic::{AtomicU64, Ordering};
    static COUNTER: AtomicU64 = AtomicU64::new(0);
    let n = COUNTER.fetch_add(1, Ordering::Relaxed);
    let pid = std::process::id();
    let dir = std::env::temp_dir().join(format!("{prefix}_{pid}_{n}"));
    std::fs::create_dir_all(&dir).expect("create temp dir");
    dir
}

fn small_experiment() -> ExperimentConfig {
    ExperimentConfig {
        replications: 2,
        simulation: SimulationConfig::default().with_items(12, 4).with_sessions(5),
        ..ExperimentConfig::tuned()
    }
}

fn export_small(dir: &PathBuf) -> Vec<PathBuf> {
    let results = run_experiment(&small_experiment()).expect("experiment runs");
    let aggregated = aggregate(&results).expect("aggregate");
    export_all(&aggregated, dir, true).expect("export")
}

#[test]
fn exported_directory_loads_and_validates() {
    let dir = make_temp_dir("cm_results");
    let written = export_small(&dir);
    assert_eq!(
        written,
        vec![
            dir.join(SUMMARY_FILE),
            dir.join(TRAJECTORIES_FILE),
            dir.join(RESULTS_FILE),
            dir.join(HYPOTHESIS_FILE),
        ]
    );

    let dataset = ResultsDataset::load(&dir).expect("load");
    assert_eq!(dataset.summary.len(), 9 * SchedulerType::ALL.len());
    assert_eq!(dataset.document.len(), 9 * SchedulerType::ALL.len());
    assert_eq!(dataset.validate(Some(5)).expect("valid"), 5);
    assert_eq!(dataset.validate(None).expect("valid"), 5);
    assert!(dataset.validate(Some(30)).is_err());

    let table = dataset.trajectories.as_ref().expect("trajectory table");
    assert_eq!(table.sessions(), &[1, 2, 3, 4, 5]);
    assert_eq!(table.columns().len(), KEY_PROFILES.len() * 4);

    let hypothesis = dataset.hypothesis.as_ref().expect("hypothesis");
    assert_eq!(hypothesis.improvements.len(), 3);

    std::fs::remove_dir_all(dir).ok();
}

#[test]
fn summary_header_and_formatting() {
    let dir = make_temp_dir("cm_format");
    export_small(&dir);

    let content = std::fs::read_to_string(dir.join(SUMMARY_FILE)).unwrap();
    let mut lines = content.lines();
    assert_eq!(
        lines.next().unwrap(),
        "profile,scheduler,ret_1d,ret_7d,ret_30d,mastery,efficiency,final_ece,final_brier,final_Kstar"
    );
    let first: Vec<&str> = lines.next().unwrap().split(',').collect();
    assert_eq!(first.len(), 10);
    assert_eq!(first[3].split('.').nth(1).unwrap().len(), 6);
    assert_eq!(first[5].split('.').nth(1).unwrap().len(), 2);
    assert_eq!(first[6].split('.').nth(1).unwrap().len(), 4);

    let trajectories = std::fs::read_to_string(dir.join(TRAJECTORIES_FILE)).unwrap();
    assert!(trajectories.starts_with("session,Med-Over_CM_Kstar,Med-Over_SM2_Kstar,Med-Over_CM_ECE,Med-Over_SM2_ECE,"));

    std::fs::remove_dir_all(dir).ok();
}

#[test]
fn export_is_reproducible() {
    let a = make_temp_dir("cm_repro");
    let b = make_temp_dir("cm_repro");
    export_small(&a);
    export_small(&b);
    for file in [SUMMARY_FILE, TRAJECTORIES_FILE, RESULTS_FILE, HYPOTHESIS_FILE] {
        let left = std::fs::read(a.join(file)).unwrap();
        let right = std::fs::read(b.join(file)).unwrap();
        assert_eq!(left, right, "{file} differs between runs");
    }
    std::fs::remove_dir_all(a).ok();
    std::fs::remove_dir_all(b).ok();
}

#[test]
fn missing_summary_is_reported() {
    let dir = make_temp_dir("cm_missing");
    export_small(&dir);
    std::fs::remove_file(dir.join(SUMMARY_FILE)).unwrap();

    match ResultsDataset::load(&dir) {
        Err(MetricsError::MissingFile(path)) => assert_eq!(path, dir.join(SUMMARY_FILE)),
        other => panic!("expected MissingFile, got {other:?}"),
    }
    std::fs::remove_dir_all(dir).ok();
}

#[test]
fn truncated_results_document_fails_validation() {
    let dir = make_temp_dir("cm_truncated");
    export_small(&dir);

    let path = dir.join(RESULTS_FILE);
    let mut doc: serde_json::Value = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    let series = doc["Med-Under"]["CALIBRATEME"]["K_hat_trajectory"]
        .as_array_mut()
        .unwrap();
    series.pop();
    std::fs::write(&path, serde_json::to_string(&doc).unwrap()).unwrap();

    let dataset = ResultsDataset::load(&dir).expect("still parses");
    assert!(matches!(
        dataset.validate(Some(5)),
        Err(MetricsError::TrajectoryLength { .. })
    ));
    std::fs::remove_dir_all(dir).ok();
}
