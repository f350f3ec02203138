//! Per-session trajectories of the key profiles, CalibrateMe against SM-2

use crate::charts::util::{padded_max, percent_points, session_range};
use crate::charts::{scheduler_color, ChartConfig};
use crate::error::VizError;
use calibrateme_metrics::{ResultsDocument, TrajectoryRecord, KEY_PROFILES, TRAJECTORY_SCHEDULERS};
use plotters::prelude::*;
use std::path::Path;

/// Figure 1: K* (%) over sessions, one panel per key profile
pub fn fig1_learning_trajectories(document: &ResultsDocument, output_path: impl AsRef<Path>) -> Result<(), VizError> {
    let config = ChartConfig::new("Knowledge Trajectory (K*) Across Sessions");
    create_trajectory_panels(document, &config, "K* (%)", Some(100.0), |r| &r.k_star_trajectory, output_path)
}

/// Figure 2: ECE (%) over sessions, one panel per key profile
pub fn fig2_ece_trajectories(document: &ResultsDocument, output_path: impl AsRef<Path>) -> Result<(), VizError> {
    let config = ChartConfig::new("Expected Calibration Error (ECE) Across Sessions");
    create_trajectory_panels(document, &config, "ECE (%)", None, |r| &r.ece_trajectory, output_path)
}

/// 2×2 grid of line charts over the key profiles
///
/// # Arguments
/// * `y_max` - Fixed upper bound of the value axis; fitted to the data when `None`
/// * `series` - Which trajectory of a record to plot
pub fn create_trajectory_panels(
    document: &ResultsDocument,
    config: &ChartConfig,
    y_label: &str,
    y_max: Option<f64>,
    series: impl Fn(&TrajectoryRecord) -> &Vec<f64>,
    output_path: impl AsRef<Path>,
) -> Result<(), VizError> {
    config.check()?;

    let mut panels = Vec::with_capacity(KEY_PROFILES.len());
    for profile in KEY_PROFILES {
        let mut lines = Vec::with_capacity(TRAJECTORY_SCHEDULERS.len());
        for scheduler in TRAJECTORY_SCHEDULERS {
            let record = document.record(profile, scheduler)?;
            lines.push((scheduler, percent_points(series(record))));
        }
        panels.push((profile, lines));
    }

    let root = BitMapBackend::new(output_path.as_ref(), (config.width, config.height)).into_drawing_area();
    root.fill(&WHITE)?;
    let root = root.titled(&config.title, ("sans-serif", config.title_size))?;

    for (area, (profile, lines)) in root.split_evenly((2, 2)).iter().zip(&panels) {
        let sessions = lines.iter().map(|(_, pts)| pts.len()).max().unwrap_or(0);
        let top = y_max.unwrap_or_else(|| padded_max(lines.iter().flat_map(|(_, pts)| pts.iter().map(|(_, y)| y)), 5.0));

        let mut chart = ChartBuilder::on(area)
            .caption(profile.to_string(), ("sans-serif", config.label_size + 4))
            .margin(12)
            .x_label_area_size(40)
            .y_label_area_size(55)
            .build_cartesian_2d(session_range(sessions), 0.0..top)?;

        chart
            .configure_mesh()
            .x_desc("Session")
            .y_desc(y_label)
            .axis_desc_style(("sans-serif", config.label_size))
            .light_line_style(&WHITE.mix(0.0))
            .draw()?;

        for (scheduler, points) in lines {
            let color = scheduler_color(*scheduler);
            chart
                .draw_series(LineSeries::new(points.iter().copied(), color.stroke_width(2)))?
                .label(scheduler.display_name())
                .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 16, y)], color.stroke_width(2)));
        }

        chart
            .configure_series_labels()
            .position(SeriesLabelPosition::LowerRight)
            .background_style(&WHITE.mix(0.8))
            .border_style(&BLACK)
            .draw()?;
    }

    root.present()?;
    Ok(())
}
