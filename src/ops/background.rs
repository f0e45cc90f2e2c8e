// ============================================================================
// BACKGROUND STYLES — solid fills and the checkered / lined paper patterns
// ============================================================================

use image::Rgba;

use crate::canvas::CanvasState;
use crate::components::colors::{NamedColor, normalize_name};
use crate::error::DeskError;
use crate::ops::shapes::{ShapeStyle, draw_line};

/// Base color of the dark paper patterns.
pub const DARK_PAPER: Rgba<u8> = Rgba([100, 150, 100, 255]);
/// Pen used for pattern lines on light paper.
pub const LIGHT_PATTERN_PEN: Rgba<u8> = Rgba([0, 150, 150, 255]);
pub const PATTERN_PEN_WIDTH: f32 = 3.0;
pub const LINED_SPACING: u32 = 60;
pub const CHECKERED_SPACING: u32 = 45;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PaperPattern {
    Checkered,
    Lined,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PaperTone {
    Light,
    Dark,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BackgroundStyle {
    Solid(NamedColor),
    Paper(PaperTone, PaperPattern),
}

impl Default for BackgroundStyle {
    fn default() -> Self {
        BackgroundStyle::Solid(NamedColor::White)
    }
}

impl BackgroundStyle {
    /// Entries in the order the settings dialog lists them.
    pub fn all() -> Vec<BackgroundStyle> {
        let mut out = vec![
            BackgroundStyle::Solid(NamedColor::White),
            BackgroundStyle::Paper(PaperTone::Light, PaperPattern::Checkered),
            BackgroundStyle::Paper(PaperTone::Dark, PaperPattern::Checkered),
            BackgroundStyle::Paper(PaperTone::Light, PaperPattern::Lined),
            BackgroundStyle::Paper(PaperTone::Dark, PaperPattern::Lined),
        ];
        out.extend(
            NamedColor::all()
                .iter()
                .copied()
                .filter(|c| *c != NamedColor::White)
                .map(BackgroundStyle::Solid),
        );
        out
    }

    pub fn label(&self) -> &'static str {
        match self {
            BackgroundStyle::Solid(c) => c.label(),
            BackgroundStyle::Paper(PaperTone::Light, PaperPattern::Checkered) => "Light checkered",
            BackgroundStyle::Paper(PaperTone::Dark, PaperPattern::Checkered) => "Dark checkered",
            BackgroundStyle::Paper(PaperTone::Light, PaperPattern::Lined) => "Light lined",
            BackgroundStyle::Paper(PaperTone::Dark, PaperPattern::Lined) => "Dark lined",
        }
    }

    pub fn from_name(name: &str) -> Result<Self, DeskError> {
        let wanted = normalize_name(name);
        Self::all()
            .into_iter()
            .find(|b| normalize_name(b.label()) == wanted)
            .ok_or_else(|| DeskError::UnknownName {
                kind: "background",
                value: name.to_string(),
            })
    }

    /// Color the canvas is filled with before any pattern is drawn.
    pub fn base_color(&self) -> Rgba<u8> {
        match self {
            BackgroundStyle::Solid(c) => c.rgba(),
            BackgroundStyle::Paper(PaperTone::Light, _) => NamedColor::White.rgba(),
            BackgroundStyle::Paper(PaperTone::Dark, _) => DARK_PAPER,
        }
    }

    pub fn pattern(&self) -> Option<PaperPattern> {
        match self {
            BackgroundStyle::Solid(_) => None,
            BackgroundStyle::Paper(_, p) => Some(*p),
        }
    }

    /// The eraser only exists on solid backgrounds.
    pub fn eraser_color(&self) -> Option<Rgba<u8>> {
        match self {
            BackgroundStyle::Solid(c) => Some(c.rgba()),
            BackgroundStyle::Paper(..) => None,
        }
    }

    fn pattern_pen(&self) -> Rgba<u8> {
        match self {
            BackgroundStyle::Paper(PaperTone::Dark, _) => NamedColor::White.rgba(),
            _ => LIGHT_PATTERN_PEN,
        }
    }

    /// Fill the whole canvas and draw the paper pattern, if any.
    pub fn paint(&self, canvas: &mut CanvasState) {
        canvas.fill(self.base_color());
        let Some(pattern) = self.pattern() else { return };

        let style = ShapeStyle::stroke(self.pattern_pen(), PATTERN_PEN_WIDTH);
        let image = canvas.pixels_mut();
        let (w, h) = (image.width(), image.height());
        match pattern {
            PaperPattern::Lined => {
                for y in (0..h).step_by(LINED_SPACING as usize) {
                    draw_line(image, (0.0, y as f32), (w as f32, y as f32), &style);
                }
            }
            PaperPattern::Checkered => {
                for x in (0..w).step_by(CHECKERED_SPACING as usize) {
                    draw_line(image, (x as f32, 0.0), (x as f32, h as f32), &style);
                }
                for y in (0..h).step_by(CHECKERED_SPACING as usize) {
                    draw_line(image, (0.0, y as f32), (w as f32, y as f32), &style);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dialog_lists_every_style_once() {
        let all = BackgroundStyle::all();
        assert_eq!(all.len(), 16);
        assert_eq!(all[0].label(), "White");
        assert_eq!(all[1].label(), "Light checkered");
        let mut labels: Vec<_> = all.iter().map(|b| b.label()).collect();
        labels.sort();
        labels.dedup();
        assert_eq!(labels.len(), 16);
    }

    #[test]
    fn names_resolve() {
        assert_eq!(
            BackgroundStyle::from_name("dark-lined").unwrap(),
            BackgroundStyle::Paper(PaperTone::Dark, PaperPattern::Lined)
        );
        assert_eq!(
            BackgroundStyle::from_name("Pink").unwrap(),
            BackgroundStyle::Solid(NamedColor::Pink)
        );
        assert!(BackgroundStyle::from_name("plaid").is_err());
    }

    #[test]
    fn lined_paper_draws_rows_every_sixty_pixels() {
        let mut canvas = CanvasState::new(100, 130);
        let style = BackgroundStyle::Paper(PaperTone::Light, PaperPattern::Lined);
        style.paint(&mut canvas);
        assert_eq!(canvas.get_pixel(50, 0), LIGHT_PATTERN_PEN);
        assert_eq!(canvas.get_pixel(50, 60), LIGHT_PATTERN_PEN);
        assert_eq!(canvas.get_pixel(50, 61), LIGHT_PATTERN_PEN);
        assert_eq!(canvas.get_pixel(50, 120), LIGHT_PATTERN_PEN);
        assert_eq!(canvas.get_pixel(50, 30), NamedColor::White.rgba());
        assert_eq!(canvas.get_pixel(50, 63), NamedColor::White.rgba());
    }

    #[test]
    fn dark_checkered_uses_white_grid_on_green() {
        let mut canvas = CanvasState::new(100, 100);
        let style = BackgroundStyle::Paper(PaperTone::Dark, PaperPattern::Checkered);
        style.paint(&mut canvas);
        let white = NamedColor::White.rgba();
        assert_eq!(canvas.get_pixel(45, 20), white);
        assert_eq!(canvas.get_pixel(20, 90), white);
        assert_eq!(canvas.get_pixel(20, 20), DARK_PAPER);
        assert_eq!(style.eraser_color(), None);
    }

    #[test]
    fn solid_background_erases_with_its_own_color() {
        let style = BackgroundStyle::Solid(NamedColor::Yellow);
        let mut canvas = CanvasState::new(8, 8);
        style.paint(&mut canvas);
        assert_eq!(canvas.get_pixel(4, 4), NamedColor::Yellow.rgba());
        assert_eq!(style.eraser_color(), Some(NamedColor::Yellow.rgba()));
    }
}
