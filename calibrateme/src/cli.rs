//! Command-line interface of the `calibrateme` binary

use anyhow::Context;
use calibrateme_core::{
    run_experiment, run_feature_removal, AblationCondition, ExperimentConfig, ProfileId,
};
use calibrateme_metrics::{aggregate, export_ablation_csv, export_all, ResultsDataset};
use calibrateme_viz::{generate_all_figures, generate_html_report};
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

pub const DEFAULT_RESULTS_DIR: &str = "results/preliminary";
pub const DEFAULT_FIGURES_DIR: &str = "results/figures";
pub const REPORT_FILE: &str = "report.html";

#[derive(Parser, Debug)]
#[command(name = "calibrateme", version, about = "Simulate calibration-aware review schedulers and render the report figures")]
pub struct Cli {
    /// Log level used when RUST_LOG is unset
    #[arg(long, global = true, default_value = "info")]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the experiment and write the results directory
    Simulate(SimulateArgs),
    /// Load a results directory and render the figures
    Figures(FiguresArgs),
    /// Simulate, then render
    Run(RunArgs),
    /// Compare CalibrateMe with components removed, for one profile
    Ablation(AblationArgs),
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum Preset {
    Tuned,
    Preliminary,
}

#[derive(Args, Debug, Clone)]
pub struct ExperimentArgs {
    #[arg(long, value_enum, default_value_t = Preset::Preliminary)]
    pub preset: Preset,

    /// JSON experiment configuration; replaces the preset
    #[arg(long)]
    pub config: Option<PathBuf>,

    #[arg(long)]
    pub replications: Option<usize>,

    #[arg(long)]
    pub seed: Option<u64>,

    #[arg(long)]
    pub sessions: Option<usize>,
}

#[derive(Args, Debug)]
pub struct SimulateArgs {
    #[arg(long, default_value = DEFAULT_RESULTS_DIR)]
    pub out: PathBuf,

    #[command(flatten)]
    pub experiment: ExperimentArgs,

    /// Write compact JSON
    #[arg(long)]
    pub compact: bool,
}

#[derive(Args, Debug)]
pub struct FiguresArgs {
    #[arg(long, default_value = DEFAULT_RESULTS_DIR)]
    pub results: PathBuf,

    #[arg(long, default_value = DEFAULT_FIGURES_DIR)]
    pub out: PathBuf,

    /// Also write report.html next to the figures
    #[arg(long)]
    pub report: bool,

    /// Required trajectory length; inferred when omitted
    #[arg(long)]
    pub sessions: Option<usize>,
}

#[derive(Args, Debug)]
pub struct RunArgs {
    #[arg(long, default_value = DEFAULT_RESULTS_DIR)]
    pub results: PathBuf,

    #[arg(long, default_value = DEFAULT_FIGURES_DIR)]
    pub figures: PathBuf,

    #[command(flatten)]
    pub experiment: ExperimentArgs,

    #[arg(long)]
    pub report: bool,
}

#[derive(Args, Debug)]
pub struct AblationArgs {
    #[arg(long, default_value = "Med-Over")]
    pub profile: ProfileId,

    #[arg(long, default_value = "results/ablation.csv")]
    pub out: PathBuf,

    #[arg(long, default_value_t = 5)]
    pub replications: usize,

    #[arg(long)]
    pub seed: Option<u64>,

    #[arg(long)]
    pub sessions: Option<usize>,
}

/// Preset or file configuration with command-line overrides applied
pub fn experiment_config(args: &ExperimentArgs) -> anyhow::Result<ExperimentConfig> {
    let mut config = match &args.config {
        Some(path) => ExperimentConfig::from_json_file(path)
            .with_context(|| format!("reading experiment config {}", path.display()))?,
        None => match args.preset {
            Preset::Tuned => ExperimentConfig::tuned(),
            Preset::Preliminary => ExperimentConfig::preliminary(),
        },
    };
    if let Some(replications) = args.replications {
        config.replications = replications;
    }
    if let Some(seed) = args.seed {
        config.base_seed = seed;
        config.simulation.random_seed = Some(seed);
    }
    if let Some(sessions) = args.sessions {
        config.simulation.num_sessions = sessions;
    }
    config.validate()?;
    Ok(config)
}

pub fn simulate(args: &SimulateArgs) -> anyhow::Result<Vec<PathBuf>> {
    let config = experiment_config(&args.experiment)?;
    let results = run_experiment(&config)?;
    let aggregated = aggregate(&results)?;
    let written = export_all(&aggregated, &args.out, !args.compact)
        .with_context(|| format!("writing results to {}", args.out.display()))?;

    println!("{}", aggregated.summary.retention_table());
    let h = &aggregated.hypothesis;
    tracing::info!(
        h1 = h.h1_overconfident_largest,
        h2 = h.h2_underconfident_moderate,
        h3 = h.h3_well_calibrated_minimal,
        "hypothesis outcome"
    );
    Ok(written)
}

pub fn figures(args: &FiguresArgs) -> anyhow::Result<Vec<PathBuf>> {
    let dataset = ResultsDataset::load(&args.results)
        .with_context(|| format!("loading results from {}", args.results.display()))?;
    let sessions = dataset.validate(args.sessions)?;
    tracing::info!(sessions, "results validated");

    let paths = if args.report {
        generate_html_report(&dataset, args.out.join(REPORT_FILE))?
    } else {
        generate_all_figures(&dataset, &args.out)?
    };
    for path in &paths {
        println!("{}", path.display());
    }
    Ok(paths)
}

pub fn ablation(args: &AblationArgs) -> anyhow::Result<()> {
    let mut base = ExperimentConfig::tuned().simulation;
    if let Some(seed) = args.seed {
        base = base.with_seed(seed);
    }
    if let Some(sessions) = args.sessions {
        base = base.with_sessions(sessions);
    }
    let conditions = run_feature_removal(args.profile, &base, args.replications)?;

    if let Some(parent) = args.out.parent() {
        std::fs::create_dir_all(parent)?;
    }
    export_ablation_csv(&conditions, &args.out)?;

    for (condition, runs) in &conditions {
        let ret_7d = runs.iter().map(|r| r.retention_7day).sum::<f64>() / runs.len() as f64;
        println!("{:<18} {:>6.1}%", condition.name(), ret_7d * 100.0);
    }
    tracing::info!(
        profile = %args.profile,
        conditions = AblationCondition::ALL.len(),
        out = %args.out.display(),
        "ablation written"
    );
    Ok(())
}

/// Dispatch a parsed command line
pub fn execute(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Command::Simulate(args) => {
            simulate(&args)?;
        }
        Command::Figures(args) => {
            figures(&args)?;
        }
        Command::Run(args) => {
            simulate(&SimulateArgs {
                out: args.results.clone(),
                experiment: args.experiment,
                compact: false,
            })?;
            figures(&FiguresArgs {
                results: args.results,
                out: args.figures,
                report: args.report,
                sessions: None,
            })?;
        }
        Command::Ablation(args) => ablation(&args)?,
    }
    Ok(())
}
