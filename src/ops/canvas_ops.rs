// ============================================================================
// CANVAS-LEVEL OPERATIONS — scaling and the settings-apply path
// ============================================================================

use image::imageops::{self, FilterType};

use crate::canvas::{CanvasState, check_dimensions};
use crate::error::DeskResult;
use crate::ops::background::BackgroundStyle;

/// Largest `(w, h)` with the source aspect ratio that fits inside the target box.
///
/// A side is never scaled below one pixel.
pub fn fit_keep_aspect(src: (u32, u32), target: (u32, u32)) -> (u32, u32) {
    let (sw, sh) = (src.0.max(1) as u64, src.1.max(1) as u64);
    let (tw, th) = (target.0.max(1) as u64, target.1.max(1) as u64);
    // Compare tw/sw against th/sh without floating point.
    if tw * sh <= th * sw {
        let h = (sh * tw / sw).max(1);
        (tw as u32, h as u32)
    } else {
        let w = (sw * th / sh).max(1);
        (w as u32, th as u32)
    }
}

/// Scale the entire canvas with nearest-neighbor sampling.
///
/// Does NOT push undo history; callers bracket it with a snapshot.
pub fn scale_canvas(
    state: &mut CanvasState,
    width: u32,
    height: u32,
    keep_aspect: bool,
) -> DeskResult<()> {
    check_dimensions(width, height)?;
    let (w, h) = if keep_aspect {
        fit_keep_aspect((state.width, state.height), (width, height))
    } else {
        (width, height)
    };
    if (w, h) == (state.width, state.height) {
        return Ok(());
    }
    let scaled = imageops::resize(state.image(), w, h, FilterType::Nearest);
    state.replace_image(scaled);
    Ok(())
}

/// Everything the settings dialog (or the headless CLI) can change at once.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CanvasSettings {
    pub width: u32,
    pub height: u32,
    pub keep_aspect: bool,
    /// `None` leaves the current pixels in place.
    pub background: Option<BackgroundStyle>,
}

/// Scale first, then repaint the background if one was chosen.
pub fn apply_canvas_settings(state: &mut CanvasState, settings: &CanvasSettings) -> DeskResult<()> {
    scale_canvas(state, settings.width, settings.height, settings.keep_aspect)?;
    if let Some(background) = settings.background {
        background.paint(state);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::colors::NamedColor;
    use image::Rgba;

    #[test]
    fn keep_aspect_fits_inside_box() {
        assert_eq!(fit_keep_aspect((400, 200), (100, 100)), (100, 50));
        assert_eq!(fit_keep_aspect((200, 400), (100, 100)), (50, 100));
        assert_eq!(fit_keep_aspect((100, 100), (300, 200)), (200, 200));
        assert_eq!(fit_keep_aspect((1000, 1), (10, 10)), (10, 1));
    }

    #[test]
    fn scaling_without_aspect_uses_exact_size() {
        let mut canvas = CanvasState::new(40, 20);
        scale_canvas(&mut canvas, 10, 30, false).unwrap();
        assert_eq!((canvas.width, canvas.height), (10, 30));
    }

    #[test]
    fn nearest_scaling_preserves_solid_colors() {
        let mut canvas = CanvasState::new_filled(4, 4, Rgba([9, 8, 7, 255]));
        scale_canvas(&mut canvas, 16, 8, true).unwrap();
        assert_eq!((canvas.width, canvas.height), (8, 8));
        assert!(canvas.image().pixels().all(|p| *p == Rgba([9, 8, 7, 255])));
    }

    #[test]
    fn zero_size_is_rejected() {
        let mut canvas = CanvasState::new(4, 4);
        assert!(scale_canvas(&mut canvas, 0, 4, false).is_err());
        assert_eq!((canvas.width, canvas.height), (4, 4));
    }

    #[test]
    fn background_is_repainted_only_when_chosen() {
        let mut canvas = CanvasState::new(4, 4);
        canvas.pixels_mut().put_pixel(1, 1, Rgba([0, 0, 0, 255]));
        let mut settings = CanvasSettings {
            width: 4,
            height: 4,
            keep_aspect: true,
            background: None,
        };
        apply_canvas_settings(&mut canvas, &settings).unwrap();
        assert_eq!(canvas.get_pixel(1, 1), Rgba([0, 0, 0, 255]));

        settings.background = Some(BackgroundStyle::Solid(NamedColor::Green));
        apply_canvas_settings(&mut canvas, &settings).unwrap();
        assert_eq!(canvas.get_pixel(1, 1), NamedColor::Green.rgba());
    }
}
