//! Structured logging for experiment runs
//!
//! Logging goes through `tracing`. Binaries call one of the init functions
//! once at startup; library code only emits events and spans.
//!
//! # Controlling output
//!
//! ```bash
//! # Default (info level)
//! calibrateme simulate --out results/tuned
//!
//! # Per-session detail from the engine
//! RUST_LOG=calibrateme_core::engine=debug calibrateme simulate --out results/tuned
//!
//! # Everything, including scaffold deliveries
//! RUST_LOG=trace calibrateme simulate --out results/tuned
//! ```
//!
//! Level guidelines:
//! - **TRACE**: individual responses, scaffolds, belief edge cases
//! - **DEBUG**: per-session summaries
//! - **INFO**: experiment progress and finished runs
//! - **WARN**: recoverable oddities in inputs
//! - **ERROR**: failures that abort a command

use crate::profiles::ProfileId;
use crate::types::SchedulerType;
use tracing::{info, Span};
use tracing_subscriber::{filter::EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize logging at `info`
pub fn init_logging() {
    init_logging_with_level("info")
}

/// Initialize logging with a specific level
///
/// `RUST_LOG` takes precedence when set. Calling this more than once is
/// harmless; later calls leave the first subscriber in place.
///
/// # Arguments
/// * `level` - Log level: "trace", "debug", "info", "warn", or "error"
pub fn init_logging_with_level(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        format!(
            "{level},calibrateme_core={level},calibrateme_metrics={level},calibrateme_viz={level}"
        )
        .into()
    });

    let installed = tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_target(true)
                .with_level(true)
                .with_file(false)
                .with_line_number(false),
        )
        .with(filter)
        .try_init()
        .is_ok();

    if installed {
        info!("logging initialized at level: {}", level);
    }
}

/// Span covering a whole experiment
pub fn experiment_span(name: &str, runs: usize) -> Span {
    tracing::info_span!("experiment", name = name, runs = runs)
}

/// Span covering one simulation run
pub fn run_span(profile: &ProfileId, scheduler: SchedulerType, seed: Option<u64>) -> Span {
    tracing::debug_span!(
        "run",
        profile = %profile,
        scheduler = %scheduler,
        seed = ?seed
    )
}

/// Span covering figure generation into a directory
pub fn render_span(output_dir: &str) -> Span {
    tracing::info_span!("render", output_dir = output_dir)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{AbilityLevel, CalibrationType};

    #[test]
    fn repeated_initialization_does_not_panic() {
        init_logging_with_level("debug");
        init_logging_with_level("info");
        tracing::debug!("after init");
    }

    #[test]
    fn spans_can_be_entered() {
        let profile = ProfileId::new(AbilityLevel::High, CalibrationType::Overconfident);
        let _experiment = experiment_span("tuned", 360).entered();
        let _run = run_span(&profile, SchedulerType::Sm2, Some(42)).entered();
        let _render = render_span("results/figures").entered();
    }
}
