//! Simulate into a results directory, then render it, through the CLI entry points

use calibrateme::cli::{execute, Cli};
use calibrateme_metrics::records::{RESULTS_FILE, SUMMARY_FILE};
use calibrateme_viz::FIGURE_FILES;
use clap::Parser;
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

fn small_config(dir: &PathBuf) -> PathBuf {
    let path = dir.join("experiment.json");
    let json = serde_json::json!({
        "replications": 1,
        "base_seed": 5,
        "simulation": { "num_items": 12, "items_per_session": 4, "num_sessions": 5, "random_seed": 5 }
    });
    std::fs::write(&path, serde_json::to_string_pretty(&json).unwrap()).unwrap();
    path
}

fn parse(args: &[&str]) -> Cli {
    Cli::try_parse_from(std::iter::once("calibrateme").chain(args.iter().copied())).expect("valid args")
}

#[test]
fn run_writes_results_and_report() {
    let dir = make_temp_dir("cm_cli_run");
    let config = small_config(&dir);
    let results = dir.join("results");
    let figures = dir.join("figures");

    execute(parse(&[
        "run",
        "--results",
        results.to_str().unwrap(),
        "--figures",
        figures.to_str().unwrap(),
        "--config",
        config.to_str().unwrap(),
        "--report",
    ]))
    .expect("run succeeds");

    assert!(results.join(SUMMARY_FILE).is_file());
    assert!(results.join(RESULTS_FILE).is_file());
    for file in FIGURE_FILES {
        assert!(figures.join(file).is_file(), "missing {file}");
    }
    assert!(figures.join("report.html").is_file());

    std::fs::remove_dir_all(dir).ok();
}

#[test]
fn figures_rejects_wrong_session_count() {
    let dir = make_temp_dir("cm_cli_sessions");
    let config = small_config(&dir);
    let results = dir.join("results");

    execute(parse(&[
        "simulate",
        "--out",
        results.to_str().unwrap(),
        "--config",
        config.to_str().unwrap(),
    ]))
    .expect("simulate succeeds");

    let err = execute(parse(&[
        "figures",
        "--results",
        results.to_str().unwrap(),
        "--out",
        dir.join("figures").to_str().unwrap(),
        "--sessions",
        "30",
    ]))
    .unwrap_err();
    assert!(err.to_string().contains("30"), "{err}");
    assert!(!dir.join("figures").exists());

    std::fs::remove_dir_all(dir).ok();
}

#[test]
fn figures_on_missing_directory_fails() {
    let dir = make_temp_dir("cm_cli_missing");
    let err = execute(parse(&[
        "figures",
        "--results",
        dir.join("nope").to_str().unwrap(),
        "--out",
        dir.join("figures").to_str().unwrap(),
    ]))
    .unwrap_err();
    assert!(format!("{err:#}").contains("Missing input file"));
    std::fs::remove_dir_all(dir).ok();
}

#[test]
fn ablation_writes_one_row_per_condition() {
    let dir = make_temp_dir("cm_cli_ablation");
    let out = dir.join("ablation.csv");
    execute(parse(&[
        "ablation",
        "--profile",
        "Low-Over",
        "--out",
        out.to_str().unwrap(),
        "--replications",
        "1",
        "--sessions",
        "4",
        "--seed",
        "9",
    ]))
    .expect("ablation succeeds");

    let content = std::fs::read_to_string(&out).unwrap();
    assert_eq!(content.lines().count(), 7);
    std::fs::remove_dir_all(dir).ok();
}
