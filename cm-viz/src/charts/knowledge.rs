//! True knowledge against the scheduler's estimate under CalibrateMe

use crate::charts::util::{band, dash_pieces, percent_points, session_range};
use crate::charts::{scheduler_color, ChartConfig, K_HAT_COLOR};
use crate::error::VizError;
use calibrateme_core::{AbilityLevel, CalibrationType, ProfileId, SchedulerType};
use calibrateme_metrics::ResultsDocument;
use plotters::prelude::*;
use std::path::Path;

/// Profiles shown in figure 7
pub const KNOWLEDGE_PROFILES: [ProfileId; 3] = [
    ProfileId::new(AbilityLevel::Medium, CalibrationType::Overconfident),
    ProfileId::new(AbilityLevel::Medium, CalibrationType::Underconfident),
    ProfileId::new(AbilityLevel::High, CalibrationType::Overconfident),
];

/// Figure 7: K* (solid) against K̂ (dashed), the gap shaded
pub fn fig7_knowledge_vs_estimated(document: &ResultsDocument, output_path: impl AsRef<Path>) -> Result<(), VizError> {
    let config = ChartConfig::new("True Knowledge (K*) vs System Estimate (K̂): CalibrateMe").dimensions(1500, 550);
    config.check()?;

    let mut panels = Vec::with_capacity(KNOWLEDGE_PROFILES.len());
    for profile in KNOWLEDGE_PROFILES {
        let record = document.record(profile, SchedulerType::CalibrateMe)?;
        if record.k_star_trajectory.len() != record.k_hat_trajectory.len() {
            return Err(VizError::InvalidData(format!(
                "{profile}: {} K* points but {} K̂ points",
                record.k_star_trajectory.len(),
                record.k_hat_trajectory.len()
            )));
        }
        panels.push((
            profile,
            percent_points(&record.k_star_trajectory),
            percent_points(&record.k_hat_trajectory),
        ));
    }

    let root = BitMapBackend::new(output_path.as_ref(), (config.width, config.height)).into_drawing_area();
    root.fill(&WHITE)?;
    let root = root.titled(&config.title, ("sans-serif", config.title_size))?;

    let k_star_color = scheduler_color(SchedulerType::CalibrateMe);
    for (area, (profile, k_star, k_hat)) in root.split_evenly((1, 3)).iter().zip(&panels) {
        let mut chart = ChartBuilder::on(area)
            .caption(profile.to_string(), ("sans-serif", config.label_size + 4))
            .margin(12)
            .x_label_area_size(40)
            .y_label_area_size(55)
            .build_cartesian_2d(session_range(k_star.len()), 0.0..100.0)?;

        chart
            .configure_mesh()
            .x_desc("Session")
            .y_desc("Knowledge (%)")
            .axis_desc_style(("sans-serif", config.label_size))
            .light_line_style(&WHITE.mix(0.0))
            .draw()?;

        chart.draw_series(std::iter::once(Polygon::new(band(k_star, k_hat), BLACK.mix(0.12).filled())))?;

        chart
            .draw_series(LineSeries::new(k_star.iter().copied(), k_star_color.stroke_width(2)))?
            .label("K* (true)")
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 16, y)], k_star_color.stroke_width(2)));

        chart
            .draw_series(
                dash_pieces(k_hat, 4)
                    .into_iter()
                    .map(|[a, b]| PathElement::new(vec![a, b], K_HAT_COLOR.stroke_width(2))),
            )?
            .label("K̂ (estimated)")
            .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 16, y)], K_HAT_COLOR.stroke_width(2)));

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
