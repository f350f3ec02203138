//! Grouped bar charts over the summary table

use crate::charts::util::{bar_offset, group_label, padded_max};
use crate::charts::{scheduler_color, ChartConfig, GAIN_COLOR, LOSS_COLOR};
use crate::error::VizError;
use calibrateme_core::{AbilityLevel, CalibrationType, ProfileId, SchedulerType};
use calibrateme_metrics::{SummaryRow, SummaryTable};
use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use std::path::Path;

/// Bars of one x-axis group, aligned with the scheduler list of the chart
#[derive(Debug, Clone)]
pub struct BarGroup {
    pub label: String,
    pub values: Vec<f64>,
}

/// One group per profile, one value per scheduler
fn collect_groups(
    summary: &SummaryTable,
    profiles: &[ProfileId],
    schedulers: &[SchedulerType],
    metric: impl Fn(&SummaryRow) -> f64,
) -> Result<Vec<BarGroup>, VizError> {
    profiles
        .iter()
        .map(|&profile| -> Result<BarGroup, VizError> {
            let values = schedulers
                .iter()
                .map(|&s| summary.get(profile, s).map(&metric))
                .collect::<Result<Vec<_>, _>>()?;
            Ok(BarGroup {
                label: profile.to_string(),
                values,
            })
        })
        .collect()
}

/// Figure 3: 7-day retention (%) of all nine profiles under every scheduler
pub fn fig3_retention_comparison(summary: &SummaryTable, output_path: impl AsRef<Path>) -> Result<(), VizError> {
    let groups = collect_groups(summary, &ProfileId::all(), &SchedulerType::ALL, |r| r.ret_7d * 100.0)?;
    let config = ChartConfig::new("7-Day Retention by Learner Profile and Scheduler").dimensions(1400, 700);
    create_bar_chart(&groups, &SchedulerType::ALL, &config, "Learner Profile", "7-Day Retention (%)", output_path)
}

/// Figure 5: final ECE (%) of the overconfident profiles under every scheduler
pub fn fig5_ece_comparison(summary: &SummaryTable, output_path: impl AsRef<Path>) -> Result<(), VizError> {
    let profiles: Vec<ProfileId> = AbilityLevel::ALL
        .iter()
        .map(|&a| ProfileId::new(a, CalibrationType::Overconfident))
        .collect();
    let groups = collect_groups(summary, &profiles, &SchedulerType::ALL, |r| r.final_ece * 100.0)?;
    let config = ChartConfig::new("Final Calibration Error (ECE): Overconfident Profiles").dimensions(1000, 700);
    create_bar_chart(&groups, &SchedulerType::ALL, &config, "Overconfident Profile", "Final ECE (%)", output_path)
}

/// Single grouped bar chart with a scheduler legend
pub fn create_bar_chart(
    groups: &[BarGroup],
    schedulers: &[SchedulerType],
    config: &ChartConfig,
    x_label: &str,
    y_label: &str,
    output_path: impl AsRef<Path>,
) -> Result<(), VizError> {
    config.check()?;
    if groups.is_empty() || groups.iter().any(|g| g.values.len() != schedulers.len()) {
        return Err(VizError::InvalidData(format!(
            "{} needs one value per scheduler in every group",
            config.title
        )));
    }

    let root = BitMapBackend::new(output_path.as_ref(), (config.width, config.height)).into_drawing_area();
    root.fill(&WHITE)?;
    let y_max = padded_max(groups.iter().flat_map(|g| g.values.iter()), 10.0);
    let width = 0.8 / schedulers.len() as f64;
    draw_bar_panel(&root, &config.title, groups, schedulers, width, y_max, (x_label, y_label), config, false)?;
    root.present()?;
    Ok(())
}

/// Figure 4: CalibrateMe against SM-2 per calibration type, with signed deltas
pub fn fig4_improvement_analysis(summary: &SummaryTable, output_path: impl AsRef<Path>) -> Result<(), VizError> {
    let config = ChartConfig::new("CalibrateMe vs SM-2: Retention by Calibration Type").dimensions(1500, 600);
    config.check()?;
    let schedulers = [SchedulerType::CalibrateMe, SchedulerType::Sm2];

    let mut panels = Vec::with_capacity(CalibrationType::ALL.len());
    for calibration in CalibrationType::ALL {
        let profiles: Vec<ProfileId> = AbilityLevel::ALL
            .iter()
            .map(|&a| ProfileId::new(a, calibration))
            .collect();
        let mut groups = collect_groups(summary, &profiles, &schedulers, |r| r.ret_7d * 100.0)?;
        for (group, ability) in groups.iter_mut().zip(AbilityLevel::ALL) {
            group.label = ability.short_label().to_string();
        }
        panels.push((calibration, groups));
    }
    // Shared value axis across the three panels
    let y_max = padded_max(
        panels.iter().flat_map(|(_, groups)| groups.iter().flat_map(|g| g.values.iter())),
        10.0,
    );

    let root = BitMapBackend::new(output_path.as_ref(), (config.width, config.height)).into_drawing_area();
    root.fill(&WHITE)?;
    let root = root.titled(&config.title, ("sans-serif", config.title_size))?;

    for (area, (calibration, groups)) in root.split_evenly((1, 3)).iter().zip(&panels) {
        let caption = format!("{}-calibrated", calibration.short_label());
        draw_bar_panel(area, &caption, groups, &schedulers, 0.35, y_max, ("Ability Level", "7-Day Retention (%)"), &config, true)?;
    }

    root.present()?;
    Ok(())
}

#[allow(clippy::too_many_arguments)]
fn draw_bar_panel(
    area: &DrawingArea<BitMapBackend<'_>, Shift>,
    caption: &str,
    groups: &[BarGroup],
    schedulers: &[SchedulerType],
    width: f64,
    y_max: f64,
    (x_desc, y_desc): (&str, &str),
    config: &ChartConfig,
    annotate_delta: bool,
) -> Result<(), VizError> {
    let labels: Vec<String> = groups.iter().map(|g| g.label.clone()).collect();
    let n = groups.len();

    let mut chart = ChartBuilder::on(area)
        .caption(caption, ("sans-serif", config.label_size + 6))
        .margin(15)
        .x_label_area_size(50)
        .y_label_area_size(60)
        .build_cartesian_2d(-0.5..(n as f64 - 0.5), 0.0..y_max)?;

    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_labels(n)
        .x_label_formatter(&|x| group_label(*x, &labels))
        .x_desc(x_desc)
        .y_desc(y_desc)
        .axis_desc_style(("sans-serif", config.label_size))
        .draw()?;

    for (j, &scheduler) in schedulers.iter().enumerate() {
        let color = scheduler_color(scheduler);
        let offset = bar_offset(j, schedulers.len(), width);
        chart
            .draw_series(groups.iter().enumerate().map(|(i, g)| {
                let x = i as f64 + offset;
                Rectangle::new([(x - width / 2.0, 0.0), (x + width / 2.0, g.values[j])], color.mix(0.85).filled())
            }))?
            .label(scheduler.display_name())
            .legend(move |(x, y)| Rectangle::new([(x, y - 5), (x + 12, y + 5)], color.filled()));
    }

    if annotate_delta {
        let anchor = Pos::new(HPos::Center, VPos::Bottom);
        chart.draw_series(groups.iter().enumerate().map(|(i, g)| {
            let delta = g.values[0] - g.values[1];
            let top = g.values[0].max(g.values[1]) + y_max * 0.01;
            let color = if delta > 0.0 { &GAIN_COLOR } else { &LOSS_COLOR };
            let style = ("sans-serif", config.label_size).into_font().color(color).pos(anchor);
            Text::new(format!("{delta:+.1}%"), (i as f64, top), style)
        }))?;
    }

    chart
        .configure_series_labels()
        .position(SeriesLabelPosition::UpperRight)
        .background_style(&WHITE.mix(0.8))
        .border_style(&BLACK)
        .draw()?;
    Ok(())
}
