use egui::Color32;

// === Page Design Tokens (warm stone palette) ===

pub const PAGE_BACKGROUND: Color32 = Color32::from_rgb(250, 250, 249);
pub const CARD_BACKGROUND: Color32 = Color32::from_rgb(255, 255, 255);
pub const CARD_BORDER: Color32 = Color32::from_rgb(231, 229, 228);
pub const HEADING_TEXT: Color32 = Color32::from_rgb(28, 25, 23);
pub const BODY_TEXT: Color32 = Color32::from_rgb(87, 83, 78);
pub const FAINT_TEXT: Color32 = Color32::from_rgb(168, 162, 158);

// Waveform trace and its midline
pub const TRACE_STROKE: Color32 = Color32::from_rgb(68, 64, 60);
pub const MIDLINE_STROKE: Color32 = Color32::from_rgb(231, 229, 228);
pub const CURSOR_STROKE: Color32 = Color32::from_rgb(220, 38, 38);

// Error card
pub const ERROR_BACKGROUND: Color32 = Color32::from_rgb(254, 242, 242);
pub const ERROR_BORDER: Color32 = Color32::from_rgb(254, 202, 202);
pub const ERROR_TEXT: Color32 = Color32::from_rgb(220, 38, 38);

/// A low→mid→high gradient for feature-map and spectrogram cells.
///
/// Stateless: intensity in comes from the normalizer, a color goes out.
#[derive(Clone, Copy, PartialEq)]
pub struct GradientTheme {
    pub name: &'static str,
    pub low: Color32,
    pub mid: Color32,
    pub high: Color32,
}

impl GradientTheme {
    /// Map a normalized intensity in [0, 1] onto the gradient.
    pub fn color_at(&self, intensity: f32) -> Color32 {
        let t = intensity.clamp(0.0, 1.0);
        if t < 0.5 {
            lerp_color(self.low, self.mid, t * 2.0)
        } else {
            lerp_color(self.mid, self.high, (t - 0.5) * 2.0)
        }
    }

    /// All built-in gradient themes.
    pub fn all() -> &'static [GradientTheme] {
        const ALL: &[GradientTheme] = &[
            GradientTheme {
                name: "Inferno",
                low: Color32::from_rgb(0, 0, 4),
                mid: Color32::from_rgb(188, 55, 84),
                high: Color32::from_rgb(252, 255, 164),
            },
            GradientTheme {
                name: "Viridis",
                low: Color32::from_rgb(68, 1, 84),
                mid: Color32::from_rgb(33, 145, 140),
                high: Color32::from_rgb(253, 231, 37),
            },
            GradientTheme {
                name: "Ocean",
                low: Color32::from_rgb(5, 10, 40),
                mid: Color32::from_rgb(30, 144, 255),
                high: Color32::from_rgb(0, 255, 255),
            },
            GradientTheme {
                name: "Grayscale",
                low: Color32::from_rgb(15, 15, 15),
                mid: Color32::from_rgb(128, 128, 128),
                high: Color32::from_rgb(245, 245, 245),
            },
        ];
        ALL
    }

    /// Find a theme by name, falling back to the first built-in.
    pub fn find(name: &str) -> GradientTheme {
        Self::all()
            .iter()
            .copied()
            .find(|t| t.name == name)
            .unwrap_or(Self::all()[0])
    }
}

/// Linear interpolation between two egui colors
pub fn lerp_color(a: Color32, b: Color32, t: f32) -> Color32 {
    let t = t.clamp(0.0, 1.0);
    Color32::from_rgba_premultiplied(
        (a.r() as f32 + (b.r() as f32 - a.r() as f32) * t) as u8,
        (a.g() as f32 + (b.g() as f32 - a.g() as f32) * t) as u8,
        (a.b() as f32 + (b.b() as f32 - a.b() as f32) * t) as u8,
        (a.a() as f32 + (b.a() as f32 - a.a() as f32) * t) as u8,
    )
}

// ===========  Tests ===============
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gradient_endpoints() {
        let theme = GradientTheme::find("Viridis");
        assert_eq!(theme.color_at(0.0), theme.low);
        assert_eq!(theme.color_at(1.0), theme.high);

        // Out-of-range intensities clamp rather than wrap
        assert_eq!(theme.color_at(-3.0), theme.low);
        assert_eq!(theme.color_at(7.0), theme.high);
    }

    #[test]
    fn test_gradient_midpoint_hits_mid_color() {
        let theme = GradientTheme::find("Grayscale");
        assert_eq!(theme.color_at(0.5), theme.mid);
    }

    #[test]
    fn test_unknown_theme_falls_back() {
        let theme = GradientTheme::find("NoSuchTheme");
        assert_eq!(theme.name, GradientTheme::all()[0].name);
    }

    #[test]
    fn test_lerp_boundaries() {
        let black = Color32::BLACK;
        let white = Color32::WHITE;
        assert_eq!(lerp_color(black, white, 0.0), black);
        assert_eq!(lerp_color(black, white, 1.0), white);
        assert_eq!(lerp_color(black, white, -0.5), black);
        assert_eq!(lerp_color(black, white, 1.5), white);
    }
}
