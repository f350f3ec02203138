//! Static diagram of the engine modules and how data flows between them
//!
//! Layout is expressed on a 10 × 7 grid and scaled to the image size.

use crate::charts::util::hex;
use crate::charts::ChartConfig;
use crate::error::VizError;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use std::path::Path;

const GRID_W: f64 = 10.0;
const GRID_H: f64 = 7.0;

/// Visual role of a box
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    Input,
    Module,
    Core,
    Output,
    Note,
}

impl NodeKind {
    fn colors(self) -> (RGBColor, RGBColor) {
        match self {
            NodeKind::Input => (hex(0xFEF3C7), hex(0xD97706)),
            NodeKind::Module => (hex(0xE0E7FF), hex(0x4338CA)),
            NodeKind::Core => (hex(0xDBEAFE), hex(0x2563EB)),
            NodeKind::Output => (hex(0xD1FAE5), hex(0x059669)),
            NodeKind::Note => (hex(0xF3F4F6), hex(0x9CA3AF)),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Node {
    pub kind: NodeKind,
    /// Centre on the layout grid
    pub center: (f64, f64),
    pub size: (f64, f64),
    pub lines: &'static [&'static str],
}

const fn node(kind: NodeKind, center: (f64, f64), lines: &'static [&'static str]) -> Node {
    Node {
        kind,
        center,
        size: (2.1, 1.0),
        lines,
    }
}

pub fn architecture_nodes() -> Vec<Node> {
    vec![
        node(NodeKind::Input, (1.5, 5.8), &["Learner Response", "(correctness, confidence, RT)"]),
        node(NodeKind::Module, (1.5, 4.2), &["BKT Belief", "Update Engine"]),
        node(NodeKind::Module, (4.0, 4.2), &["Calibration", "Scoring (ECE, Brier)"]),
        node(NodeKind::Module, (6.5, 4.2), &["Dual-Process", "Classifier (Type 1/2)"]),
        node(NodeKind::Core, (4.0, 2.5), &["Calibration-Aware", "Scheduler"]),
        node(NodeKind::Module, (1.5, 2.5), &["Forgetting", "Model"]),
        node(NodeKind::Module, (6.5, 2.5), &["Adaptive", "Scaffolding"]),
        node(NodeKind::Output, (4.0, 0.8), &["Scheduled Review", "+ Scaffolding Prompt"]),
        Node {
            kind: NodeKind::Note,
            center: (8.8, 4.2),
            size: (2.0, 2.8),
            lines: &[
                "Model components:",
                "BKT posterior update",
                "Learning transition",
                "Forgetting decay",
                "Response generation",
                "Confidence with bias",
                "Response time model",
                "Scaffolding effect",
            ],
        },
    ]
}

/// Arrows as `(from, to)` on the layout grid
pub fn architecture_arrows() -> Vec<((f64, f64), (f64, f64))> {
    vec![
        ((1.5, 5.3), (1.5, 4.7)),
        ((2.5, 5.5), (4.0, 4.7)),
        ((2.5, 5.5), (6.5, 4.7)),
        ((1.5, 3.7), (2.7, 3.0)),
        ((4.0, 3.7), (4.0, 3.0)),
        ((6.5, 3.7), (5.3, 3.0)),
        ((2.55, 2.5), (2.95, 2.5)),
        ((5.45, 2.5), (5.05, 2.5)),
        ((4.0, 2.0), (4.0, 1.3)),
    ]
}

/// Two base corners of an arrowhead pointing at `to`
pub fn arrow_head(from: (i32, i32), to: (i32, i32), length: f64) -> [(i32, i32); 2] {
    let (dx, dy) = ((to.0 - from.0) as f64, (to.1 - from.1) as f64);
    let norm = dx.hypot(dy).max(f64::EPSILON);
    let (ux, uy) = (dx / norm, dy / norm);
    let base = (to.0 as f64 - ux * length, to.1 as f64 - uy * length);
    let half = length * 0.5;
    [
        ((base.0 - uy * half).round() as i32, (base.1 + ux * half).round() as i32),
        ((base.0 + uy * half).round() as i32, (base.1 - ux * half).round() as i32),
    ]
}

/// Figure 6: architecture diagram
pub fn fig6_architecture(output_path: impl AsRef<Path>) -> Result<(), VizError> {
    let config = ChartConfig::new("CalibrateMe System Architecture").dimensions(1200, 840);
    config.check()?;

    let root = BitMapBackend::new(output_path.as_ref(), (config.width, config.height)).into_drawing_area();
    root.fill(&WHITE)?;

    let (w, h) = (config.width as f64, config.height as f64);
    let px = |(x, y): (f64, f64)| ((x / GRID_W * w).round() as i32, ((GRID_H - y) / GRID_H * h).round() as i32);
    let centered = Pos::new(HPos::Center, VPos::Center);

    root.draw(&Text::new(
        config.title.as_str(),
        px((5.0, 6.6)),
        ("sans-serif", config.title_size).into_font().color(&hex(0x1E3A5F)).pos(centered),
    ))?;

    let arrow_color = hex(0x6366F1);
    for (from, to) in architecture_arrows() {
        let (from, to) = (px(from), px(to));
        root.draw(&PathElement::new(vec![from, to], arrow_color.stroke_width(2)))?;
        let [a, b] = arrow_head(from, to, 12.0);
        root.draw(&Polygon::new(vec![to, a, b], arrow_color.filled()))?;
    }

    let line_height = (config.label_size as i32 * 5) / 4;
    for node in architecture_nodes() {
        let (fill, border) = node.kind.colors();
        let (cx, cy) = node.center;
        let (hw, hh) = (node.size.0 / 2.0, node.size.1 / 2.0);
        let corners = [px((cx - hw, cy + hh)), px((cx + hw, cy - hh))];
        root.draw(&Rectangle::new(corners, fill.filled()))?;
        root.draw(&Rectangle::new(corners, border.stroke_width(2)))?;

        let (x, y) = px(node.center);
        let first = y - line_height * (node.lines.len() as i32 - 1) / 2;
        for (i, line) in node.lines.iter().enumerate() {
            root.draw(&Text::new(
                *line,
                (x, first + line_height * i as i32),
                TextStyle::from(("sans-serif", config.label_size).into_font()).pos(centered),
            ))?;
        }
    }

    root.present()?;
    Ok(())
}
