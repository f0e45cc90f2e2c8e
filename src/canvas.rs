use eframe::egui;
use egui::{Color32, ColorImage, Pos2, Rect, TextureOptions, Vec2};
use image::{Rgba, RgbaImage};

use crate::error::{DeskError, DeskResult};

/// Largest canvas the app will allocate (~256 megapixels).
pub const MAX_CANVAS_PIXELS: u64 = 256_000_000;

// ============================================================================
// CANVAS STATE — the single raster the whole app draws into
// ============================================================================

/// Owned RGBA raster plus the bookkeeping the renderer needs.
///
/// Every pixel mutation goes through `pixels_mut()` (or `replace_image`)
/// so `dirty_generation` always moves forward after a change.
#[derive(Clone)]
pub struct CanvasState {
    pub width: u32,
    pub height: u32,
    pixels: RgbaImage,
    /// Monotonically increasing counter, bumped on every mutation.
    pub dirty_generation: u64,
}

impl CanvasState {
    pub fn new(width: u32, height: u32) -> Self {
        Self::new_filled(width, height, Rgba([255, 255, 255, 255]))
    }

    pub fn new_filled(width: u32, height: u32, color: Rgba<u8>) -> Self {
        let (width, height) = clamp_dimensions(width, height);
        Self {
            width,
            height,
            pixels: RgbaImage::from_pixel(width, height, color),
            dirty_generation: 0,
        }
    }

    pub fn from_image(image: RgbaImage) -> DeskResult<Self> {
        check_dimensions(image.width(), image.height())?;
        Ok(Self {
            width: image.width(),
            height: image.height(),
            pixels: image,
            dirty_generation: 0,
        })
    }

    pub fn image(&self) -> &RgbaImage {
        &self.pixels
    }

    pub fn pixels_mut(&mut self) -> &mut RgbaImage {
        self.mark_dirty();
        &mut self.pixels
    }

    pub fn get_pixel(&self, x: u32, y: u32) -> Rgba<u8> {
        *self.pixels.get_pixel(x, y)
    }

    /// Swap in a whole new raster (undo/redo restore, preview reload, open, scale).
    pub fn replace_image(&mut self, image: RgbaImage) {
        self.width = image.width();
        self.height = image.height();
        self.pixels = image;
        self.mark_dirty();
    }

    pub fn fill(&mut self, color: Rgba<u8>) {
        for px in self.pixels_mut().pixels_mut() {
            *px = color;
        }
    }

    pub fn contains(&self, x: f32, y: f32) -> bool {
        x >= 0.0 && y >= 0.0 && x < self.width as f32 && y < self.height as f32
    }

    pub fn mark_dirty(&mut self) {
        self.dirty_generation = self.dirty_generation.wrapping_add(1);
    }
}

pub fn check_dimensions(width: u32, height: u32) -> DeskResult<()> {
    let total = width as u64 * height as u64;
    if width == 0 || height == 0 || total > MAX_CANVAS_PIXELS {
        return Err(DeskError::InvalidSize { width, height });
    }
    Ok(())
}

fn clamp_dimensions(width: u32, height: u32) -> (u32, u32) {
    match check_dimensions(width, height) {
        Ok(()) => (width, height),
        Err(_) => {
            crate::log_warn!(
                "CanvasState: dimensions {}×{} out of range, clamped to 1×1",
                width,
                height
            );
            (1, 1)
        }
    }
}

// ============================================================================
// CANVAS WIDGET — shows the raster and reports pointer input in canvas space
// ============================================================================

/// Pointer input for one frame, already translated into canvas-local pixels.
#[derive(Clone, Copy, Debug, Default)]
pub struct CanvasInput {
    pub pos: Option<(f32, f32)>,
    pub primary_pressed: bool,
    pub primary_down: bool,
    pub primary_released: bool,
    pub hovered: bool,
}

/// Renders the canvas texture at 1:1 and owns the texture cache.
#[derive(Default)]
pub struct Canvas {
    texture: Option<egui::TextureHandle>,
    uploaded_generation: Option<u64>,
    uploaded_size: (u32, u32),
}

impl Canvas {
    pub fn new() -> Self {
        Self::default()
    }

    /// Draw the canvas; the returned response is the canvas area itself
    /// (for context menus and hover tracking).
    pub fn show(&mut self, ui: &mut egui::Ui, state: &CanvasState) -> (CanvasInput, egui::Response) {
        self.sync_texture(ui.ctx(), state);

        let size = Vec2::new(state.width as f32, state.height as f32);
        egui::ScrollArea::both()
            .auto_shrink([false, false])
            .drag_to_scroll(false)
            .show(ui, |ui| {
                let (response, painter) =
                    ui.allocate_painter(size, egui::Sense::click_and_drag());
                let rect = response.rect;
                if let Some(texture) = &self.texture {
                    painter.image(
                        texture.id(),
                        rect,
                        Rect::from_min_max(Pos2::ZERO, Pos2::new(1.0, 1.0)),
                        Color32::WHITE,
                    );
                }

                let (pos, pressed, down, released) = ui.input(|i| {
                    (
                        i.pointer.interact_pos().or(i.pointer.hover_pos()),
                        i.pointer.primary_pressed(),
                        i.pointer.primary_down(),
                        i.pointer.primary_released(),
                    )
                });
                let input = CanvasInput {
                    pos: pos.map(|p| Self::screen_to_canvas(p, rect)),
                    primary_pressed: pressed && response.hovered(),
                    primary_down: down,
                    primary_released: released,
                    hovered: response.hovered(),
                };
                (input, response)
            })
            .inner
    }

    /// Screen position → canvas pixel coordinates (may lie outside the canvas).
    pub fn screen_to_canvas(screen: Pos2, canvas_rect: Rect) -> (f32, f32) {
        let local = screen - canvas_rect.min;
        (local.x.floor(), local.y.floor())
    }

    fn sync_texture(&mut self, ctx: &egui::Context, state: &CanvasState) {
        let size = (state.width, state.height);
        if self.uploaded_generation == Some(state.dirty_generation)
            && self.uploaded_size == size
            && self.texture.is_some()
        {
            return;
        }
        let image = ColorImage::from_rgba_unmultiplied(
            [state.width as usize, state.height as usize],
            state.image().as_raw(),
        );
        match &mut self.texture {
            Some(handle) => handle.set(image, TextureOptions::NEAREST),
            None => {
                self.texture = Some(ctx.load_texture("canvas", image, TextureOptions::NEAREST));
            }
        }
        self.uploaded_generation = Some(state.dirty_generation);
        self.uploaded_size = size;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mutation_bumps_generation() {
        let mut canvas = CanvasState::new(4, 4);
        let before = canvas.dirty_generation;
        canvas.fill(Rgba([1, 2, 3, 255]));
        assert!(canvas.dirty_generation > before);
        assert_eq!(canvas.get_pixel(3, 3), Rgba([1, 2, 3, 255]));
    }

    #[test]
    fn oversized_canvas_is_clamped() {
        let canvas = CanvasState::new(0, 10);
        assert_eq!((canvas.width, canvas.height), (1, 1));
        assert!(CanvasState::from_image(RgbaImage::new(0, 0)).is_err());
    }

    #[test]
    fn replace_image_tracks_new_dimensions() {
        let mut canvas = CanvasState::new(4, 4);
        canvas.replace_image(RgbaImage::new(7, 3));
        assert_eq!((canvas.width, canvas.height), (7, 3));
        assert!(canvas.contains(6.0, 2.0));
        assert!(!canvas.contains(7.0, 0.0));
        assert!(!canvas.contains(-1.0, 0.0));
    }

    #[test]
    fn screen_positions_are_offset_by_canvas_origin() {
        let rect = Rect::from_min_size(Pos2::new(160.0, 90.0), Vec2::new(100.0, 100.0));
        assert_eq!(Canvas::screen_to_canvas(Pos2::new(170.4, 95.9), rect), (10.0, 5.0));
        assert_eq!(Canvas::screen_to_canvas(Pos2::new(150.0, 90.0), rect), (-10.0, 0.0));
    }
}
