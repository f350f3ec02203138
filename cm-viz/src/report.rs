//! HTML report generation

use crate::charts::{self, FIGURE_FILES};
use crate::error::VizError;
use calibrateme_core::{ProfileId, SchedulerType};
use calibrateme_metrics::ResultsDataset;
use std::fs;
use std::path::{Path, PathBuf};

const FIGURE_CAPTIONS: [&str; 7] = [
    "Knowledge trajectory (K*) of the key profiles",
    "Expected calibration error across sessions",
    "7-day retention by learner profile and scheduler",
    "CalibrateMe against SM-2 by calibration type",
    "Final ECE of the overconfident profiles",
    "System architecture",
    "True knowledge against the system estimate",
];

/// Generate an HTML report next to freshly rendered figures
///
/// The figures are written into the directory containing `output_path` and
/// referenced by file name, so the directory can be moved as a whole.
///
/// # Arguments
/// * `dataset` - Loaded, validated results
/// * `output_path` - Output HTML file path
///
/// # Returns
/// Paths of the rendered figures
///
/// # Example
/// ```no_run
/// use calibrateme_metrics::ResultsDataset;
/// use calibrateme_viz::report::generate_html_report;
///
/// let dataset = ResultsDataset::load("results/preliminary").unwrap();
/// generate_html_report(&dataset, "results/figures/report.html").unwrap();
/// ```
pub fn generate_html_report(
    dataset: &ResultsDataset,
    output_path: impl AsRef<Path>,
) -> Result<Vec<PathBuf>, VizError> {
    let output_path = output_path.as_ref();
    let report_dir = output_path.parent().unwrap_or_else(|| Path::new("."));
    fs::create_dir_all(report_dir)?;

    let figures = charts::generate_all_figures(dataset, report_dir)?;
    let html = build_html_content(dataset, &FIGURE_FILES);
    fs::write(output_path, html)?;
    tracing::info!(path = %output_path.display(), "report written");

    Ok(figures)
}

/// Build HTML content for the report
pub fn build_html_content(dataset: &ResultsDataset, figure_files: &[&str]) -> String {
    let mut html = String::new();

    html.push_str(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>CalibrateMe Simulation Report</title>
    <style>
        body {
            font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Arial, sans-serif;
            max-width: 1400px;
            margin: 0 auto;
            padding: 20px;
            background-color: #f8fafc;
        }
        h1 { color: #1e3a5f; border-bottom: 3px solid #2563eb; padding-bottom: 10px; }
        h2 { color: #334155; margin-top: 30px; border-bottom: 2px solid #e2e8f0; padding-bottom: 5px; }
        .summary-grid {
            display: grid;
            grid-template-columns: repeat(auto-fit, minmax(220px, 1fr));
            gap: 15px;
        }
        .summary-item { background: white; padding: 15px; border-radius: 6px; border-left: 4px solid #2563eb; }
        .summary-label { font-size: 14px; color: #64748b; }
        .summary-value { font-size: 22px; font-weight: bold; color: #0f172a; }
        .chart { background: white; padding: 20px; border-radius: 8px; margin-bottom: 30px; }
        .chart img { max-width: 100%; height: auto; display: block; margin: 0 auto; }
        .chart p { text-align: center; color: #475569; }
        table { width: 100%; border-collapse: collapse; background: white; margin-bottom: 20px; }
        th { background: #2563eb; color: white; padding: 10px; text-align: left; }
        td { padding: 8px 10px; border-bottom: 1px solid #e2e8f0; }
        .gain { color: #15803d; font-weight: bold; }
        .loss { color: #b91c1c; font-weight: bold; }
    </style>
</head>
<body>
    <h1>CalibrateMe Simulation Report</h1>
"#,
    );

    let sessions = dataset
        .document
        .iter()
        .next()
        .map_or(0, |(_, _, record)| record.num_sessions());
    html.push_str(r#"    <div class="summary-grid">
"#);
    for (label, value) in [
        ("Summary rows", dataset.summary.len().to_string()),
        ("Trajectory records", dataset.document.len().to_string()),
        ("Sessions per run", sessions.to_string()),
    ] {
        html.push_str(&format!(
            r#"        <div class="summary-item"><div class="summary-label">{}</div><div class="summary-value">{}</div></div>
"#,
            html_escape(label),
            html_escape(&value)
        ));
    }
    html.push_str("    </div>\n");

    html.push_str(&retention_table(dataset));
    if let Some(report) = &dataset.hypothesis {
        html.push_str("    <h2>Hypotheses</h2>\n    <table>\n");
        html.push_str("        <tr><th>Calibration</th><th>Δ 7-day retention</th><th>Cohen's d</th><th>n</th></tr>\n");
        for imp in &report.improvements {
            html.push_str(&format!(
                "        <tr><td>{:?}</td><td>{:+.2}%</td><td>{:.3}</td><td>{}</td></tr>\n",
                imp.calibration,
                imp.mean_improvement * 100.0,
                imp.effect_size,
                imp.samples
            ));
        }
        html.push_str("    </table>\n    <ul>\n");
        for (name, held) in [
            ("H1: overconfident learners gain the most", report.h1_overconfident_largest),
            ("H2: underconfident learners gain moderately", report.h2_underconfident_moderate),
            ("H3: well-calibrated learners gain little", report.h3_well_calibrated_minimal),
        ] {
            let (class, verdict) = if held { ("gain", "supported") } else { ("loss", "not supported") };
            html.push_str(&format!(
                "        <li>{} <span class=\"{class}\">{verdict}</span></li>\n",
                html_escape(name)
            ));
        }
        html.push_str("    </ul>\n");
    }

    html.push_str("    <h2>Figures</h2>\n");
    for (i, file) in figure_files.iter().enumerate() {
        let caption = FIGURE_CAPTIONS.get(i).copied().unwrap_or(*file);
        html.push_str(&format!(
            r#"    <div class="chart">
        <img src="{}" alt="{}">
        <p>Figure {}. {}</p>
    </div>
"#,
            html_escape(file),
            html_escape(caption),
            i + 1,
            html_escape(caption)
        ));
    }

    html.push_str("</body>\n</html>\n");
    html
}

/// 7-day retention per profile and scheduler, with the CalibrateMe gain over SM-2
fn retention_table(dataset: &ResultsDataset) -> String {
    let mut html = String::from("    <h2>7-Day Retention</h2>\n    <table>\n        <tr><th>Profile</th>");
    for scheduler in SchedulerType::ALL {
        html.push_str(&format!("<th>{}</th>", html_escape(scheduler.display_name())));
    }
    html.push_str("<th>Δ (CM − SM-2)</th></tr>\n");

    for profile in ProfileId::all() {
        let cells: Vec<Option<f64>> = SchedulerType::ALL
            .iter()
            .map(|&s| dataset.summary.get(profile, s).ok().map(|r| r.ret_7d))
            .collect();
        html.push_str(&format!("        <tr><td>{}</td>", html_escape(&profile.to_string())));
        for cell in &cells {
            match cell {
                Some(v) => html.push_str(&format!("<td>{:.1}%</td>", v * 100.0)),
                None => html.push_str("<td>-</td>"),
            }
        }
        match (cells[0], cells[1]) {
            (Some(cm), Some(sm2)) => {
                let delta = (cm - sm2) * 100.0;
                let class = if delta > 0.0 { "gain" } else { "loss" };
                html.push_str(&format!("<td class=\"{class}\">{delta:+.2}%</td>"));
            }
            _ => html.push_str("<td>-</td>"),
        }
        html.push_str("</tr>\n");
    }
    html.push_str("    </table>\n");
    html
}

fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#x27;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use calibrateme_metrics::{HypothesisReport, ResultsDocument, SummaryRow, SummaryTable};

    fn dataset() -> ResultsDataset {
        let row = |scheduler, ret_7d| SummaryRow {
            profile: "Med-Over".parse().unwrap(),
            scheduler,
            ret_1d: 0.7,
            ret_7d,
            ret_30d: 0.3,
            mastery: 30.0,
            efficiency: 12.0,
            final_ece: 0.1,
            final_brier: 0.2,
            final_kstar: 0.6,
        };
        ResultsDataset {
            summary: SummaryTable::new(vec![
                row(SchedulerType::CalibrateMe, 0.55),
                row(SchedulerType::Sm2, 0.50),
            ]),
            document: ResultsDocument::new(),
            trajectories: None,
            hypothesis: Some(HypothesisReport::from_improvements(Vec::new())),
        }
    }

    #[test]
    fn test_html_content() {
        let content = build_html_content(&dataset(), &FIGURE_FILES);
        assert!(content.contains("<!DOCTYPE html>"));
        assert!(content.contains("CalibrateMe Simulation Report"));
        assert!(content.contains("<td>Med-Over</td><td>55.0%</td><td>50.0%</td>"));
        assert!(content.contains("+5.00%"));
        assert!(content.contains("fig7_knowledge_vs_estimated.png"));
        assert!(content.contains("H3: well-calibrated learners gain little <span class=\"gain\">supported</span>"));
        assert_eq!(content.matches("<div class=\"chart\">").count(), 7);
    }

    #[test]
    fn test_html_escape() {
        assert_eq!(html_escape("hello"), "hello");
        assert_eq!(html_escape("<script>"), "&lt;script&gt;");
        assert_eq!(html_escape("a & b"), "a &amp; b");
    }
}
