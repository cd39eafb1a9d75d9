use egui::{Painter, Pos2, Rect, Stroke};

use crate::gui::theme::{self, GradientTheme};
use crate::normalize::{intensity_grid, trace_points, TraceGeometry};
use crate::response::{ActivationTensor, WaveformSignal};

// ========================================================================
// WAVEFORM PANEL
// ========================================================================

/// Draw the waveform trace with its midline and, when a ratio is supplied,
/// the playback cursor overlay.
///
/// All signal-to-pixel math lives in the normalizer; this function only
/// offsets the resulting points into the panel rect and strokes them.
pub fn draw_waveform(
    painter: &Painter,
    rect: Rect,
    signal: &WaveformSignal,
    scale_fraction: f32,
    cursor_ratio: Option<f32>,
) {
    let geom = TraceGeometry {
        width: rect.width(),
        height: rect.height(),
        scale_fraction,
    };
    let points = trace_points(&signal.values, &geom);

    // Midline first so the trace draws over it
    let center_y = rect.top() + geom.center_y();
    painter.line_segment(
        [
            Pos2::new(rect.left(), center_y),
            Pos2::new(rect.right(), center_y),
        ],
        Stroke::new(1.0, theme::MIDLINE_STROKE),
    );

    if points.is_empty() {
        // Empty or fully-invalid samples degrade to a blank panel
        draw_empty_notice(painter, rect);
        return;
    }

    let line: Vec<Pos2> = points
        .iter()
        .map(|p| Pos2::new(rect.left() + p.x, rect.top() + p.y))
        .collect();
    painter.add(egui::Shape::line(
        line,
        Stroke::new(1.5, theme::TRACE_STROKE),
    ));

    if let Some(ratio) = cursor_ratio {
        let cursor_x = rect.left() + ratio.clamp(0.0, 1.0) * rect.width();
        painter.line_segment(
            [
                Pos2::new(cursor_x, rect.top()),
                Pos2::new(cursor_x, rect.bottom()),
            ],
            Stroke::new(2.0, theme::CURSOR_STROKE),
        );
    }
}

// ========================================================================
// FEATURE MAP / SPECTROGRAM PANEL
// ========================================================================

/// Cell layout for one normalized tensor inside a panel rect.
///
/// Rows split the height evenly; each row splits its own width by its own
/// length, so ragged tensors lay out without assuming rectangularity.
fn feature_map_cells(grid: &[Vec<f32>], rect: Rect) -> Vec<(Rect, f32)> {
    let row_count = grid.len();
    if row_count == 0 {
        return Vec::new();
    }
    let row_height = rect.height() / row_count as f32;

    let mut cells = Vec::new();
    for (r, row) in grid.iter().enumerate() {
        if row.is_empty() {
            continue;
        }
        let cell_width = rect.width() / row.len() as f32;
        let top = rect.top() + r as f32 * row_height;
        for (c, &intensity) in row.iter().enumerate() {
            let cell = Rect::from_min_size(
                Pos2::new(rect.left() + c as f32 * cell_width, top),
                egui::vec2(cell_width, row_height),
            );
            cells.push((cell, intensity));
        }
    }
    cells
}

/// Draw one activation tensor (or the input spectrogram -- same contract)
/// as a colored cell grid.
pub fn draw_feature_map(
    painter: &Painter,
    rect: Rect,
    tensor: &ActivationTensor,
    gradient: &GradientTheme,
) {
    let Some(grid) = intensity_grid(&tensor.values) else {
        draw_empty_notice(painter, rect);
        return;
    };

    for (cell, intensity) in feature_map_cells(&grid, rect) {
        painter.rect_filled(cell, 0.0, gradient.color_at(intensity));
    }
}

// ========================================================================
// COLOR SCALE LEGEND
// ========================================================================

/// Stateless gradient strip with low/high markers. Uses the same lookup as
/// the cells so the legend cannot drift from the panels it describes.
pub fn draw_color_scale(painter: &Painter, rect: Rect, gradient: &GradientTheme) {
    const STEPS: usize = 64;
    let step_width = rect.width() / STEPS as f32;

    for i in 0..STEPS {
        let t = i as f32 / (STEPS - 1) as f32;
        let strip = Rect::from_min_size(
            Pos2::new(rect.left() + i as f32 * step_width, rect.top()),
            egui::vec2(step_width + 0.5, rect.height()),
        );
        painter.rect_filled(strip, 0.0, gradient.color_at(t));
    }
    painter.rect_stroke(rect, 2.0, Stroke::new(1.0, theme::CARD_BORDER));

    let font = egui::FontId::proportional(10.0);
    painter.text(
        rect.left_bottom() + egui::vec2(0.0, 2.0),
        egui::Align2::LEFT_TOP,
        "low",
        font.clone(),
        theme::FAINT_TEXT,
    );
    painter.text(
        rect.right_bottom() + egui::vec2(0.0, 2.0),
        egui::Align2::RIGHT_TOP,
        "high",
        font,
        theme::FAINT_TEXT,
    );
}

fn draw_empty_notice(painter: &Painter, rect: Rect) {
    painter.text(
        rect.center(),
        egui::Align2::CENTER_CENTER,
        "no drawable data",
        egui::FontId::proportional(12.0),
        theme::FAINT_TEXT,
    );
}

// ===========  Tests ===============
#[cfg(test)]
mod tests {
    use super::*;

    fn rect(w: f32, h: f32) -> Rect {
        Rect::from_min_size(Pos2::new(10.0, 20.0), egui::vec2(w, h))
    }

    #[test]
    fn test_cells_tile_a_rectangular_grid() {
        let grid = vec![vec![0.0, 1.0], vec![0.5, 0.5]];
        let cells = feature_map_cells(&grid, rect(100.0, 50.0));

        assert_eq!(cells.len(), 4);
        // First cell sits at the rect origin, half width / half height
        assert_eq!(cells[0].0.min, Pos2::new(10.0, 20.0));
        assert!((cells[0].0.width() - 50.0).abs() < 1e-4);
        assert!((cells[0].0.height() - 25.0).abs() < 1e-4);
        // Last cell ends at the rect corner
        let last = cells[3].0;
        assert!((last.max.x - 110.0).abs() < 1e-4);
        assert!((last.max.y - 70.0).abs() < 1e-4);
    }

    #[test]
    fn test_ragged_rows_get_their_own_cell_width() {
        let grid = vec![vec![0.0, 0.5, 1.0, 0.2], vec![0.7]];
        let cells = feature_map_cells(&grid, rect(100.0, 50.0));

        assert_eq!(cells.len(), 5);
        // Row 0 cells are a quarter wide, row 1's single cell spans the rect
        assert!((cells[0].0.width() - 25.0).abs() < 1e-4);
        assert!((cells[4].0.width() - 100.0).abs() < 1e-4);
    }

    #[test]
    fn test_empty_grid_and_empty_rows() {
        assert!(feature_map_cells(&[], rect(100.0, 50.0)).is_empty());
        // Empty rows are skipped without disturbing the others' placement
        let grid = vec![vec![], vec![1.0]];
        let cells = feature_map_cells(&grid, rect(100.0, 50.0));
        assert_eq!(cells.len(), 1);
        assert!((cells[0].0.top() - 45.0).abs() < 1e-4);
    }
}
