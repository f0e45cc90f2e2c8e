use eframe::egui;
use image::Rgba;

use crate::components::colors::{FillColor, NamedColor};
use crate::ops::shapes::{ShapeKind, ShapeStyle};

/// Selectable brush widths, thinnest first.
pub const BRUSH_SIZES: [u32; 8] = [3, 5, 7, 9, 11, 13, 15, 17];
pub const DEFAULT_BRUSH_SIZE: u32 = 3;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub enum Tool {
    #[default]
    Brush,
    Eraser,
    Line,
    Rectangle,
    Circle,
}

impl Tool {
    pub fn all() -> &'static [Tool] {
        &[
            Tool::Brush,
            Tool::Eraser,
            Tool::Line,
            Tool::Rectangle,
            Tool::Circle,
        ]
    }

    pub fn label(&self) -> &'static str {
        match self {
            Tool::Brush => "Brush",
            Tool::Eraser => "Eraser",
            Tool::Line => "Line",
            Tool::Rectangle => "Rectangle",
            Tool::Circle => "Circle",
        }
    }

    /// Shape drawn by a preview-then-commit tool; `None` for freehand tools.
    pub fn shape_kind(&self) -> Option<ShapeKind> {
        match self {
            Tool::Brush | Tool::Eraser => None,
            Tool::Line => Some(ShapeKind::Line),
            Tool::Rectangle => Some(ShapeKind::Rectangle),
            Tool::Circle => Some(ShapeKind::Ellipse),
        }
    }

    pub fn is_freehand(&self) -> bool {
        self.shape_kind().is_none()
    }

    /// Undo-history label for a gesture made with this tool.
    pub fn stroke_description(&self) -> &'static str {
        match self {
            Tool::Brush => "Brush Stroke",
            Tool::Eraser => "Eraser Stroke",
            Tool::Line => "Line",
            Tool::Rectangle => "Rectangle",
            Tool::Circle => "Circle",
        }
    }
}

// ============================================================================
// TOOL PROPERTIES
// ============================================================================

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ToolProperties {
    pub color: NamedColor,
    /// Always one of `BRUSH_SIZES`.
    pub size: u32,
    pub fill: FillColor,
    pub anti_aliased: bool,
}

impl Default for ToolProperties {
    fn default() -> Self {
        Self {
            color: NamedColor::Black,
            size: DEFAULT_BRUSH_SIZE,
            fill: FillColor::Empty,
            anti_aliased: false,
        }
    }
}

impl ToolProperties {
    /// Snap an arbitrary width onto the nearest selectable brush size.
    pub fn clamp_size(size: u32) -> u32 {
        let size = size.clamp(BRUSH_SIZES[0], BRUSH_SIZES[BRUSH_SIZES.len() - 1]);
        if size % 2 == 0 { size - 1 } else { size }
    }

    pub fn set_size(&mut self, size: u32) {
        self.size = Self::clamp_size(size);
    }

    /// Style for the brush and the shape tools.
    pub fn pen_style(&self) -> ShapeStyle {
        ShapeStyle {
            stroke: self.color.rgba(),
            width: self.size as f32,
            fill: self.fill.rgba(),
            anti_alias: self.anti_aliased,
        }
    }

    /// The eraser paints with the background color at twice the brush width.
    pub fn eraser_style(&self, background: Rgba<u8>) -> ShapeStyle {
        ShapeStyle {
            stroke: background,
            width: (self.size * 2) as f32,
            fill: None,
            anti_alias: self.anti_aliased,
        }
    }
}

// ============================================================================
// GESTURE TRACKING — Idle → Pressed → Dragging → Idle
// ============================================================================

#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub enum GestureState {
    #[default]
    Idle,
    Pressed {
        origin: (f32, f32),
    },
    Dragging {
        origin: (f32, f32),
        last: (f32, f32),
    },
}

/// Tracks one press-to-release interaction and the tool it started with.
#[derive(Clone, Copy, Debug, Default)]
pub struct StrokeTracker {
    pub state: GestureState,
    pub tool: Tool,
}

impl StrokeTracker {
    pub fn start(&mut self, tool: Tool, origin: (f32, f32)) {
        self.tool = tool;
        self.state = GestureState::Pressed { origin };
    }

    pub fn is_active(&self) -> bool {
        !matches!(self.state, GestureState::Idle)
    }

    pub fn origin(&self) -> Option<(f32, f32)> {
        match self.state {
            GestureState::Idle => None,
            GestureState::Pressed { origin } | GestureState::Dragging { origin, .. } => {
                Some(origin)
            }
        }
    }

    /// Record a move and return the previous point (origin on the first move).
    pub fn advance(&mut self, point: (f32, f32)) -> Option<(f32, f32)> {
        let (origin, previous) = match self.state {
            GestureState::Idle => return None,
            GestureState::Pressed { origin } => (origin, origin),
            GestureState::Dragging { origin, last } => (origin, last),
        };
        self.state = GestureState::Dragging {
            origin,
            last: point,
        };
        Some(previous)
    }

    /// End the gesture. Returns whether one was in progress.
    pub fn finish(&mut self) -> bool {
        let was_active = self.is_active();
        self.state = GestureState::Idle;
        was_active
    }
}

// ============================================================================
// TOOLS PANEL — instruments toolbar
// ============================================================================

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ToolsPanelAction {
    SelectTool(Tool),
    SetSize(u32),
    SetAntiAlias(bool),
}

#[derive(Default)]
pub struct ToolsPanel;

impl ToolsPanel {
    pub fn show(
        &mut self,
        ui: &mut egui::Ui,
        active_tool: Tool,
        properties: &ToolProperties,
        eraser_enabled: bool,
    ) -> Option<ToolsPanelAction> {
        let mut action = None;
        ui.horizontal(|ui| {
            ui.spacing_mut().item_spacing.x = 4.0;
            for &tool in Tool::all() {
                let enabled = tool != Tool::Eraser || eraser_enabled;
                let response = ui
                    .add_enabled(
                        enabled,
                        egui::SelectableLabel::new(active_tool == tool, tool.label()),
                    )
                    .on_disabled_hover_text("Not available on patterned backgrounds");
                if response.clicked() {
                    action = Some(ToolsPanelAction::SelectTool(tool));
                }
            }

            ui.separator();
            ui.label("Width:");
            let mut size = properties.size;
            let slider = egui::Slider::new(
                &mut size,
                BRUSH_SIZES[0]..=BRUSH_SIZES[BRUSH_SIZES.len() - 1],
            )
            .step_by(2.0);
            if ui.add(slider).changed() {
                action = Some(ToolsPanelAction::SetSize(ToolProperties::clamp_size(size)));
            }

            let aa = ui.selectable_label(properties.anti_aliased, "Anti-alias");
            if aa.clicked() {
                action = Some(ToolsPanelAction::SetAntiAlias(!properties.anti_aliased));
            }
        });
        action
    }
}
