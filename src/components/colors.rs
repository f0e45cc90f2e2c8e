use eframe::egui;
use egui::Color32;
use image::Rgba;

use crate::error::DeskError;

/// The twelve colors offered by the palette, the fill list and the
/// background list.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum NamedColor {
    Pink,
    Red,
    Orange,
    Yellow,
    Green,
    LightBlue,
    Blue,
    Violet,
    Brown,
    Grey,
    White,
    Black,
}

impl NamedColor {
    pub fn all() -> &'static [NamedColor] {
        &[
            NamedColor::Pink,
            NamedColor::Red,
            NamedColor::Orange,
            NamedColor::Yellow,
            NamedColor::Green,
            NamedColor::LightBlue,
            NamedColor::Blue,
            NamedColor::Violet,
            NamedColor::Brown,
            NamedColor::Grey,
            NamedColor::White,
            NamedColor::Black,
        ]
    }

    pub fn label(&self) -> &'static str {
        match self {
            NamedColor::Pink => "Pink",
            NamedColor::Red => "Red",
            NamedColor::Orange => "Orange",
            NamedColor::Yellow => "Yellow",
            NamedColor::Green => "Green",
            NamedColor::LightBlue => "Light blue",
            NamedColor::Blue => "Blue",
            NamedColor::Violet => "Violet",
            NamedColor::Brown => "Brown",
            NamedColor::Grey => "Grey",
            NamedColor::White => "White",
            NamedColor::Black => "Black",
        }
    }

    pub fn rgb(&self) -> [u8; 3] {
        match self {
            NamedColor::Pink => [255, 100, 150],
            NamedColor::Red => [255, 0, 0],
            NamedColor::Orange => [255, 150, 0],
            NamedColor::Yellow => [255, 255, 0],
            NamedColor::Green => [0, 255, 0],
            NamedColor::LightBlue => [0, 255, 255],
            NamedColor::Blue => [0, 0, 255],
            NamedColor::Violet => [150, 0, 255],
            NamedColor::Brown => [150, 75, 0],
            NamedColor::Grey => [100, 100, 100],
            NamedColor::White => [255, 255, 255],
            NamedColor::Black => [0, 0, 0],
        }
    }

    pub fn rgba(&self) -> Rgba<u8> {
        let [r, g, b] = self.rgb();
        Rgba([r, g, b, 255])
    }

    pub fn color32(&self) -> Color32 {
        let [r, g, b] = self.rgb();
        Color32::from_rgb(r, g, b)
    }

    /// Case-insensitive lookup by label; `light_blue` and `lightblue` also match.
    pub fn from_name(name: &str) -> Result<Self, DeskError> {
        let wanted = normalize_name(name);
        NamedColor::all()
            .iter()
            .copied()
            .find(|c| normalize_name(c.label()) == wanted)
            .ok_or_else(|| DeskError::UnknownName {
                kind: "color",
                value: name.to_string(),
            })
    }
}

pub(crate) fn normalize_name(name: &str) -> String {
    name.chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

/// Shape interior fill: "Empty" leaves the interior untouched.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum FillColor {
    #[default]
    Empty,
    Solid(NamedColor),
}

impl FillColor {
    pub fn all() -> Vec<FillColor> {
        std::iter::once(FillColor::Empty)
            .chain(NamedColor::all().iter().copied().map(FillColor::Solid))
            .collect()
    }

    pub fn label(&self) -> &'static str {
        match self {
            FillColor::Empty => "Empty",
            FillColor::Solid(c) => c.label(),
        }
    }

    pub fn rgba(&self) -> Option<Rgba<u8>> {
        match self {
            FillColor::Empty => None,
            FillColor::Solid(c) => Some(c.rgba()),
        }
    }
}

/// Palette toolbar: one swatch per named color plus the fill selector.
#[derive(Default)]
pub struct ColorsPanel;

/// What the user picked in the palette this frame.
pub enum ColorsPanelAction {
    Stroke(NamedColor),
    Fill(FillColor),
}

impl ColorsPanel {
    pub fn show(
        &mut self,
        ui: &mut egui::Ui,
        stroke: NamedColor,
        fill: FillColor,
    ) -> Option<ColorsPanelAction> {
        let mut action = None;
        for color in NamedColor::all() {
            let selected = *color == stroke;
            if Self::swatch(ui, color.color32(), selected)
                .on_hover_text(color.label())
                .clicked()
            {
                action = Some(ColorsPanelAction::Stroke(*color));
            }
        }

        ui.separator();
        ui.label("Filling shapes:");
        let mut picked = fill;
        egui::ComboBox::from_id_source("fill_color")
            .selected_text(fill.label())
            .show_ui(ui, |ui| {
                for option in FillColor::all() {
                    ui.selectable_value(&mut picked, option, option.label());
                }
            });
        if picked != fill {
            action = Some(ColorsPanelAction::Fill(picked));
        }
        action
    }

    fn swatch(ui: &mut egui::Ui, color: Color32, selected: bool) -> egui::Response {
        let size = egui::Vec2::splat(22.0);
        let (rect, response) = ui.allocate_exact_size(size, egui::Sense::click());
        let painter = ui.painter();
        painter.rect_filled(rect.shrink(2.0), 3.0, color);
        let stroke = if selected {
            egui::Stroke::new(2.0, Color32::WHITE)
        } else {
            egui::Stroke::new(1.0, Color32::from_gray(40))
        };
        painter.rect_stroke(rect.shrink(1.0), 3.0, stroke);
        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_ignores_case_and_separators() {
        assert_eq!(NamedColor::from_name("light blue").unwrap(), NamedColor::LightBlue);
        assert_eq!(NamedColor::from_name("LIGHT_BLUE").unwrap(), NamedColor::LightBlue);
        assert_eq!(NamedColor::from_name("grey").unwrap(), NamedColor::Grey);
        assert!(NamedColor::from_name("teal").is_err());
    }

    #[test]
    fn fill_list_starts_with_empty() {
        let all = FillColor::all();
        assert_eq!(all.len(), 13);
        assert_eq!(all[0], FillColor::Empty);
        assert_eq!(FillColor::Empty.rgba(), None);
        assert_eq!(
            FillColor::Solid(NamedColor::Brown).rgba(),
            Some(Rgba([150, 75, 0, 255]))
        );
    }
}
