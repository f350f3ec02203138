use plotters::style::RGBColor;

/// Parse `#RRGGBB`
pub const fn hex(rgb: u32) -> RGBColor {
    RGBColor((rgb >> 16) as u8, (rgb >> 8) as u8, rgb as u8)
}

/// `(session, value × 100)` points, sessions 1-based
pub fn percent_points(values: &[f64]) -> Vec<(f64, f64)> {
    values
        .iter()
        .enumerate()
        .map(|(i, v)| ((i + 1) as f64, v * 100.0))
        .collect()
}

/// Upper axis bound: the largest value plus 10% headroom, never below `floor`
pub fn padded_max<'a>(values: impl IntoIterator<Item = &'a f64>, floor: f64) -> f64 {
    let max = values.into_iter().copied().fold(f64::NEG_INFINITY, f64::max);
    if max.is_finite() {
        (max * 1.1).max(floor)
    } else {
        floor
    }
}

/// Session axis range; a single session still gets a non-empty range
pub fn session_range(sessions: usize) -> std::ops::Range<f64> {
    1.0..(sessions.max(2) as f64)
}

/// Centre offset of bar `index` among `count` bars of `width`, around a group centre
pub fn bar_offset(index: usize, count: usize, width: f64) -> f64 {
    (index as f64 - (count as f64 - 1.0) / 2.0) * width
}

/// Label at integer group positions, blank elsewhere
pub fn group_label(x: f64, labels: &[String]) -> String {
    let idx = x.round();
    if (x - idx).abs() > 1e-6 || idx < 0.0 {
        return String::new();
    }
    labels.get(idx as usize).cloned().unwrap_or_default()
}

/// Alternate pieces of a polyline, drawn as a dashed line
///
/// Each segment is split into `pieces` parts and every other part is kept.
pub fn dash_pieces(points: &[(f64, f64)], pieces: usize) -> Vec<[(f64, f64); 2]> {
    let pieces = pieces.max(2);
    let mut dashes = Vec::new();
    for pair in points.windows(2) {
        let ((x0, y0), (x1, y1)) = (pair[0], pair[1]);
        for k in (0..pieces).step_by(2) {
            let t0 = k as f64 / pieces as f64;
            let t1 = (k + 1) as f64 / pieces as f64;
            dashes.push([
                (x0 + (x1 - x0) * t0, y0 + (y1 - y0) * t0),
                (x0 + (x1 - x0) * t1, y0 + (y1 - y0) * t1),
            ]);
        }
    }
    dashes
}

/// Closed band between two series for filling the gap
pub fn band(upper: &[(f64, f64)], lower: &[(f64, f64)]) -> Vec<(f64, f64)> {
    upper.iter().chain(lower.iter().rev()).copied().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_splits_channels() {
        let c = hex(0x2563EB);
        assert_eq!((c.0, c.1, c.2), (0x25, 0x63, 0xEB));
    }

    #[test]
    fn percent_points_are_one_based() {
        assert_eq!(percent_points(&[0.1, 0.5]), vec![(1.0, 10.0), (2.0, 50.0)]);
    }

    #[test]
    fn padded_max_respects_floor() {
        assert_eq!(padded_max(&[], 5.0), 5.0);
        assert!((padded_max(&[10.0, 20.0], 5.0) - 22.0).abs() < 1e-9);
        assert_eq!(padded_max(&[1.0], 5.0), 5.0);
    }

    #[test]
    fn bar_offsets_are_centred() {
        let w = 0.18;
        let offsets: Vec<f64> = (0..4).map(|i| bar_offset(i, 4, w)).collect();
        assert!((offsets[0] + 1.5 * w).abs() < 1e-12);
        assert!((offsets[3] - 1.5 * w).abs() < 1e-12);
        assert!((bar_offset(0, 2, 0.35) + 0.175).abs() < 1e-12);
    }

    #[test]
    fn group_label_only_at_integers() {
        let labels = vec!["a".to_string(), "b".to_string()];
        assert_eq!(group_label(1.0, &labels), "b");
        assert_eq!(group_label(0.5, &labels), "");
        assert_eq!(group_label(-1.0, &labels), "");
        assert_eq!(group_label(7.0, &labels), "");
    }

    #[test]
    fn dashes_keep_every_other_piece() {
        let dashes = dash_pieces(&[(0.0, 0.0), (4.0, 4.0)], 4);
        assert_eq!(dashes.len(), 2);
        assert_eq!(dashes[0], [(0.0, 0.0), (1.0, 1.0)]);
        assert_eq!(dashes[1], [(2.0, 2.0), (3.0, 3.0)]);
    }

    #[test]
    fn band_closes_the_gap() {
        let upper = [(1.0, 5.0), (2.0, 6.0)];
        let lower = [(1.0, 3.0), (2.0, 4.0)];
        assert_eq!(band(&upper, &lower), vec![(1.0, 5.0), (2.0, 6.0), (2.0, 4.0), (1.0, 3.0)]);
    }
}
