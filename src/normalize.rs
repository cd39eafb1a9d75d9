/// Fraction of the panel height used by the trace. Keeps a margin so peaks
/// never touch the panel edge.
pub const DEFAULT_SCALE_FRACTION: f32 = 0.45;

/// A single drawable point in panel coordinates.
///
/// Kept as a plain struct (not an egui type) so the normalizer stays free of
/// any GUI dependency and can be tested as pure math.
#[derive(Clone, Copy, PartialEq, Debug)]
pub struct TracePoint {
    pub x: f32,
    pub y: f32,
}

/// Target drawing area for a 1D trace.
#[derive(Clone, Copy, Debug)]
pub struct TraceGeometry {
    pub width: f32,
    pub height: f32,
    /// Fraction of the height the trace may occupy above/below center.
    pub scale_fraction: f32,
}

impl TraceGeometry {
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            width,
            height,
            scale_fraction: DEFAULT_SCALE_FRACTION,
        }
    }

    pub fn center_y(&self) -> f32 {
        self.height / 2.0
    }
}

/// Map a sample sequence onto evenly spaced panel coordinates.
///
/// Non-finite samples (NaN, ±inf) are dropped before the range is computed,
/// so partial or malformed tensors from the backend still render best-effort.
/// An empty (or fully-invalid) input yields an empty vec -- "nothing to
/// draw", never an error.
///
/// With `max == min` every sample lands on the vertical center, which avoids
/// a divide-by-zero and avoids mis-scaling a flat line. Otherwise the full
/// dynamic range maps linearly onto `center ± scale_fraction * height`.
pub fn trace_points(samples: &[f32], geom: &TraceGeometry) -> Vec<TracePoint> {
    let valid: Vec<f32> = samples.iter().copied().filter(|v| v.is_finite()).collect();
    if valid.is_empty() {
        return Vec::new();
    }

    let (min, max) = span(&valid);
    let range = max - min;
    let center_y = geom.center_y();
    let scale_y = geom.height * geom.scale_fraction;
    let n = valid.len();

    valid
        .iter()
        .enumerate()
        .map(|(i, &sample)| {
            // A single sample sits at x = 0 rather than dividing by zero.
            let x = if n > 1 {
                (i as f32 / (n - 1) as f32) * geom.width
            } else {
                0.0
            };

            let y = if range > 0.0 {
                let normalized = (sample - min) / range;
                center_y - (normalized - 0.5) * 2.0 * scale_y
            } else {
                center_y
            };

            TracePoint { x, y }
        })
        .collect()
}

/// Normalize a 2D tensor projection to `[0, 1]` intensities for a gradient
/// lookup.
///
/// Same policy as [`trace_points`]: non-finite cells are excluded from the
/// min/max computation and render at the midpoint intensity 0.5, zero range
/// maps every cell to 0.5, and a tensor with no finite cells at all yields
/// `None` ("nothing to draw"). Rows may be ragged; the row structure of the
/// input is preserved.
pub fn intensity_grid(rows: &[Vec<f32>]) -> Option<Vec<Vec<f32>>> {
    let valid: Vec<f32> = rows
        .iter()
        .flatten()
        .copied()
        .filter(|v| v.is_finite())
        .collect();
    if valid.is_empty() {
        return None;
    }

    let (min, max) = span(&valid);
    let range = max - min;

    let grid = rows
        .iter()
        .map(|row| {
            row.iter()
                .map(|&v| {
                    if !v.is_finite() || range <= 0.0 {
                        0.5
                    } else {
                        (v - min) / range
                    }
                })
                .collect()
        })
        .collect();

    Some(grid)
}

/// Min/max over a non-empty slice of finite values.
fn span(values: &[f32]) -> (f32, f32) {
    let mut min = f32::INFINITY;
    let mut max = f32::NEG_INFINITY;
    for &v in values {
        min = min.min(v);
        max = max.max(v);
    }
    (min, max)
}

// ===========  Tests ===============
#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f32 = 1e-4;

    fn geom() -> TraceGeometry {
        TraceGeometry::new(600.0, 300.0)
    }

    #[test]
    fn test_extremes_map_to_center_plus_minus_scale() {
        let g = geom();
        let points = trace_points(&[-1.0, 0.0, 1.0], &g);

        let center = g.center_y();
        let scale = g.height * g.scale_fraction;

        // min sample is the lowest on screen => largest y
        assert!((points[0].y - (center + scale)).abs() < EPSILON);
        // midpoint sample sits at the center line
        assert!((points[1].y - center).abs() < EPSILON);
        // max sample => smallest y
        assert!((points[2].y - (center - scale)).abs() < EPSILON);
    }

    #[test]
    fn test_zero_dynamic_range_maps_to_center() {
        let g = geom();
        let points = trace_points(&[3.5, 3.5, 3.5, 3.5], &g);

        assert_eq!(points.len(), 4);
        for p in &points {
            assert!((p.y - g.center_y()).abs() < EPSILON);
        }
    }

    #[test]
    fn test_horizontal_spread_spans_full_width() {
        let g = geom();
        let points = trace_points(&[0.0, 1.0, 2.0, 3.0, 4.0], &g);

        assert!((points[0].x - 0.0).abs() < EPSILON);
        assert!((points[4].x - g.width).abs() < EPSILON);
        // Even spacing in between
        assert!((points[1].x - g.width / 4.0).abs() < EPSILON);
        assert!((points[3].x - 3.0 * g.width / 4.0).abs() < EPSILON);
    }

    #[test]
    fn test_single_sample_lands_at_x_zero() {
        let points = trace_points(&[0.7], &geom());

        assert_eq!(points.len(), 1);
        assert_eq!(points[0].x, 0.0);
        // One sample has zero range, so it sits on the center line
        assert!((points[0].y - geom().center_y()).abs() < EPSILON);
    }

    #[test]
    fn test_non_finite_samples_are_filtered() {
        let g = geom();
        let clean = trace_points(&[-1.0, 0.0, 1.0], &g);

        // Invalid entries interleaved anywhere must not change the result
        let dirty = trace_points(
            &[f32::NAN, -1.0, f32::INFINITY, 0.0, 1.0, f32::NEG_INFINITY],
            &g,
        );

        assert_eq!(clean.len(), dirty.len());
        for (a, b) in clean.iter().zip(dirty.iter()) {
            assert!((a.x - b.x).abs() < EPSILON);
            assert!((a.y - b.y).abs() < EPSILON);
        }
    }

    #[test]
    fn test_empty_and_fully_invalid_input_draw_nothing() {
        assert!(trace_points(&[], &geom()).is_empty());
        assert!(trace_points(&[f32::NAN, f32::INFINITY], &geom()).is_empty());
        assert!(intensity_grid(&[]).is_none());
        assert!(intensity_grid(&[vec![f32::NAN], vec![f32::INFINITY]]).is_none());
    }

    #[test]
    fn test_trace_is_idempotent() {
        let samples = [0.1, -0.4, 0.9, f32::NAN, 0.2];
        let first = trace_points(&samples, &geom());
        let second = trace_points(&samples, &geom());
        assert_eq!(first, second);
    }

    #[test]
    fn test_intensity_grid_full_range() {
        let rows = vec![vec![0.0, 5.0], vec![10.0, 5.0]];
        let grid = intensity_grid(&rows).unwrap();

        assert!((grid[0][0] - 0.0).abs() < EPSILON);
        assert!((grid[0][1] - 0.5).abs() < EPSILON);
        assert!((grid[1][0] - 1.0).abs() < EPSILON);
    }

    #[test]
    fn test_intensity_grid_zero_range_and_nan_cells() {
        // Zero range: everything sits at the midpoint
        let flat = intensity_grid(&[vec![2.0, 2.0], vec![2.0]]).unwrap();
        for row in &flat {
            for &v in row {
                assert!((v - 0.5).abs() < EPSILON);
            }
        }

        // NaN cells render at midpoint, but do not poison the range
        let rows = vec![vec![0.0, f32::NAN, 4.0]];
        let grid = intensity_grid(&rows).unwrap();
        assert!((grid[0][0] - 0.0).abs() < EPSILON);
        assert!((grid[0][1] - 0.5).abs() < EPSILON);
        assert!((grid[0][2] - 1.0).abs() < EPSILON);
    }

    #[test]
    fn test_intensity_grid_preserves_ragged_rows() {
        let rows = vec![vec![1.0, 2.0, 3.0], vec![4.0], vec![]];
        let grid = intensity_grid(&rows).unwrap();

        assert_eq!(grid.len(), 3);
        assert_eq!(grid[0].len(), 3);
        assert_eq!(grid[1].len(), 1);
        assert_eq!(grid[2].len(), 0);
    }
}
