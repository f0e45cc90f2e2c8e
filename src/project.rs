use image::RgbaImage;
use std::path::{Path, PathBuf};
use std::sync::mpsc;

use crate::canvas::{CanvasState, check_dimensions};
use crate::components::colors::{FillColor, NamedColor};
use crate::components::history::{HistoryManager, HistorySignal, SnapshotCommand};
use crate::components::tools::{StrokeTracker, Tool, ToolProperties};
use crate::error::DeskResult;
use crate::io::{FileHandler, ScratchFile, load_image_sync};
use crate::ops::background::BackgroundStyle;
use crate::ops::canvas_ops::{CanvasSettings, apply_canvas_settings};
use crate::ops::shapes::{ShapeStyle, draw_line, draw_point, draw_shape};
use crate::settings::AppSettings;

// ============================================================================
// EVENT INTERFACE — what the UI shell feeds into the document
// ============================================================================

/// Input events in canvas-local pixel coordinates.
pub trait CanvasEvents {
    fn on_pointer_down(&mut self, pos: (f32, f32));
    fn on_pointer_move(&mut self, pos: (f32, f32));
    fn on_pointer_up(&mut self, pos: (f32, f32));
    fn on_tool_selected(&mut self, tool: Tool);
    fn on_color_selected(&mut self, color: NamedColor);
    fn on_fill_selected(&mut self, fill: FillColor);
    fn on_size_changed(&mut self, size: u32);
}

// ============================================================================
// PROJECT — the open document plus its drawing session
// ============================================================================

pub struct Project {
    pub canvas_state: CanvasState,
    pub history: HistoryManager,
    pub file_handler: FileHandler,
    pub tool_properties: ToolProperties,
    pub active_tool: Tool,
    pub background: BackgroundStyle,
    pub is_dirty: bool,
    /// Display name (derived from path or "Untitled")
    pub name: String,
    stroke: StrokeTracker,
    scratch: ScratchFile,
    default_size: (u32, u32),
}

impl Project {
    pub fn new(settings: &AppSettings) -> Self {
        let mut tool_properties = ToolProperties::default();
        tool_properties.set_size(settings.brush_size);
        Self {
            canvas_state: CanvasState::new(settings.canvas_width, settings.canvas_height),
            history: HistoryManager::new(settings.max_undo_steps),
            file_handler: FileHandler::new(),
            tool_properties,
            active_tool: Tool::Brush,
            background: BackgroundStyle::default(),
            is_dirty: false,
            name: "Untitled".to_string(),
            stroke: StrokeTracker::default(),
            scratch: ScratchFile::new(&settings.scratch_dir),
            default_size: (settings.canvas_width, settings.canvas_height),
        }
    }

    pub fn subscribe(&mut self) -> mpsc::Receiver<HistorySignal> {
        self.history.subscribe()
    }

    pub fn eraser_enabled(&self) -> bool {
        self.background.eraser_color().is_some()
    }

    pub fn is_drawing(&self) -> bool {
        self.stroke.is_active()
    }

    pub fn current_path(&self) -> Option<&Path> {
        self.file_handler.current_path.as_deref()
    }

    pub fn display_title(&self) -> String {
        if self.is_dirty {
            format!("{}*", self.name)
        } else {
            self.name.clone()
        }
    }

    fn begin_action(&mut self, description: &str) {
        self.history
            .push(Box::new(SnapshotCommand::new(description, &self.canvas_state)));
        self.is_dirty = true;
    }

    fn update_name_from_path(&mut self) {
        self.name = match &self.file_handler.current_path {
            Some(path) => path
                .file_name()
                .map(|s| s.to_string_lossy().to_string())
                .unwrap_or_else(|| "Unknown".to_string()),
            None => "Untitled".to_string(),
        };
    }

    fn set_background(&mut self, background: BackgroundStyle) {
        self.background = background;
        if !self.eraser_enabled() && self.active_tool == Tool::Eraser {
            self.active_tool = Tool::Brush;
        }
    }

    /// Style for a freehand stroke drawn with `tool`.
    fn freehand_style(&self, tool: Tool) -> ShapeStyle {
        match (tool, self.background.eraser_color()) {
            (Tool::Eraser, Some(color)) => self.tool_properties.eraser_style(color),
            _ => self.tool_properties.pen_style().with_fill(None),
        }
    }

    // ========================================================================
    // DOCUMENT OPERATIONS
    // ========================================================================

    /// Blank white canvas at the configured default size.
    pub fn new_canvas(&mut self) {
        self.cancel_gesture();
        self.begin_action("New Canvas");
        let (w, h) = self.default_size;
        let fresh = CanvasState::new(w, h);
        self.canvas_state.replace_image(fresh.image().clone());
        self.set_background(BackgroundStyle::default());
        self.file_handler.current_path = None;
        self.update_name_from_path();
        self.is_dirty = false;
        crate::log_info!("New canvas {}×{}", self.canvas_state.width, self.canvas_state.height);
    }

    /// Replace the canvas with the image at `path`. On error nothing changes.
    pub fn open_path(&mut self, path: &Path) -> DeskResult<()> {
        self.cancel_gesture();
        let image = load_image_sync(path)?;
        check_dimensions(image.width(), image.height())?;
        self.file_handler.remember(path);
        self.begin_action("Open File");
        self.canvas_state.replace_image(image);
        self.set_background(BackgroundStyle::default());
        self.update_name_from_path();
        self.is_dirty = false;
        crate::log_info!(
            "Opened {} ({}×{})",
            path.display(),
            self.canvas_state.width,
            self.canvas_state.height
        );
        Ok(())
    }

    pub fn save_path(&mut self, path: &Path) -> DeskResult<()> {
        self.file_handler
            .save_image(self.canvas_state.image(), path)
            .inspect_err(|e| crate::log_err!("Save failed: {}", e))?;
        self.update_name_from_path();
        self.is_dirty = false;
        crate::log_info!("Saved {}", path.display());
        Ok(())
    }

    /// Reload the current file if there is one, else repaint the background.
    pub fn clear(&mut self) {
        self.cancel_gesture();
        self.begin_action("Clear");
        match self.file_handler.reload() {
            Some(Ok(image)) => self.canvas_state.replace_image(image),
            Some(Err(e)) => {
                crate::log_warn!("Clear: {}; repainting background instead", e);
                self.background.paint(&mut self.canvas_state);
            }
            None => self.background.paint(&mut self.canvas_state),
        }
    }

    /// Scale and optionally repaint the background as a single undoable step.
    pub fn apply_settings(&mut self, settings: &CanvasSettings) -> DeskResult<()> {
        check_dimensions(settings.width, settings.height)?;
        self.cancel_gesture();
        self.begin_action("Settings");
        apply_canvas_settings(&mut self.canvas_state, settings)?;
        if let Some(background) = settings.background {
            self.set_background(background);
            self.active_tool = Tool::Brush;
        }
        crate::log_info!(
            "Settings applied: {}×{}, background {}",
            self.canvas_state.width,
            self.canvas_state.height,
            settings.background.map_or("unchanged", |b| b.label())
        );
        Ok(())
    }

    pub fn undo(&mut self) -> Option<String> {
        self.cancel_gesture();
        self.history.undo(&mut self.canvas_state)
    }

    pub fn redo(&mut self) -> Option<String> {
        self.cancel_gesture();
        self.history.redo(&mut self.canvas_state)
    }

    /// Stop tracking the current gesture; what is already drawn stays.
    fn cancel_gesture(&mut self) {
        self.stroke.finish();
    }

    pub fn scratch_path(&self) -> PathBuf {
        self.scratch.path().to_path_buf()
    }

    fn restore_pre_stroke(&mut self) {
        let restored: Option<RgbaImage> = self.scratch.restore();
        if let Some(image) = restored {
            self.canvas_state.replace_image(image);
        }
    }
}

impl CanvasEvents for Project {
    fn on_pointer_down(&mut self, pos: (f32, f32)) {
        if !self.canvas_state.contains(pos.0, pos.1) {
            return;
        }
        self.cancel_gesture();

        let tool = self.active_tool;
        self.begin_action(tool.stroke_description());
        self.stroke.start(tool, pos);

        if tool.is_freehand() {
            let style = self.freehand_style(tool);
            draw_point(self.canvas_state.pixels_mut(), pos, &style);
        } else {
            self.scratch.store(self.canvas_state.image());
        }
    }

    fn on_pointer_move(&mut self, pos: (f32, f32)) {
        let Some(origin) = self.stroke.origin() else { return };
        let Some(previous) = self.stroke.advance(pos) else { return };

        match self.stroke.tool.shape_kind() {
            None => {
                let style = self.freehand_style(self.stroke.tool);
                draw_line(self.canvas_state.pixels_mut(), previous, pos, &style);
            }
            Some(kind) => {
                self.restore_pre_stroke();
                let style = self.tool_properties.pen_style();
                draw_shape(self.canvas_state.pixels_mut(), kind, origin, pos, &style);
            }
        }
    }

    fn on_pointer_up(&mut self, _pos: (f32, f32)) {
        self.stroke.finish();
    }

    fn on_tool_selected(&mut self, tool: Tool) {
        if tool == Tool::Eraser && !self.eraser_enabled() {
            self.active_tool = Tool::Brush;
            return;
        }
        self.active_tool = tool;
    }

    fn on_color_selected(&mut self, color: NamedColor) {
        self.tool_properties.color = color;
    }

    fn on_fill_selected(&mut self, fill: FillColor) {
        self.tool_properties.fill = fill;
    }

    fn on_size_changed(&mut self, size: u32) {
        self.tool_properties.set_size(size);
    }
}
