use eframe::egui;
use egui::Color32;

use crate::components::colors::normalize_name;
use crate::error::DeskError;

/// Window chrome palette. Never affects canvas pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub enum ColorTheme {
    #[default]
    Dark,
    Violet,
    Blue,
    Green,
}

impl ColorTheme {
    pub fn all() -> &'static [ColorTheme] {
        &[
            ColorTheme::Dark,
            ColorTheme::Violet,
            ColorTheme::Blue,
            ColorTheme::Green,
        ]
    }

    pub fn label(&self) -> &'static str {
        match self {
            ColorTheme::Dark => "Dark",
            ColorTheme::Violet => "Violet",
            ColorTheme::Blue => "Blue",
            ColorTheme::Green => "Green",
        }
    }

    pub fn from_name(name: &str) -> Result<Self, DeskError> {
        let wanted = normalize_name(name);
        Self::all()
            .iter()
            .copied()
            .find(|t| normalize_name(t.label()) == wanted)
            .ok_or_else(|| DeskError::UnknownName {
                kind: "theme",
                value: name.to_string(),
            })
    }

    /// Central window background.
    pub fn window_color(&self) -> Color32 {
        match self {
            ColorTheme::Dark => Color32::from_rgb(0x77, 0x77, 0x77),
            ColorTheme::Violet => Color32::from_rgb(0x78, 0x51, 0xA9),
            ColorTheme::Blue => Color32::from_rgb(0x60, 0x6E, 0x8C),
            ColorTheme::Green => Color32::from_rgb(0x35, 0x5E, 0x3B),
        }
    }

    /// Menu bar and toolbar panels.
    pub fn toolbar_color(&self) -> Color32 {
        match self {
            ColorTheme::Dark => Color32::from_rgb(0x55, 0x55, 0x55),
            ColorTheme::Violet => Color32::from_rgb(0x46, 0x39, 0x4B),
            ColorTheme::Blue => Color32::from_rgb(0x2C, 0x33, 0x37),
            ColorTheme::Green => Color32::from_rgb(0x2F, 0x45, 0x38),
        }
    }

    pub fn visuals(&self) -> egui::Visuals {
        let mut visuals = egui::Visuals::dark();
        let toolbar = self.toolbar_color();
        visuals.panel_fill = toolbar;
        visuals.window_fill = toolbar;
        visuals.extreme_bg_color = self.window_color();
        visuals.faint_bg_color = self.window_color();
        visuals.widgets.noninteractive.bg_fill = toolbar;
        visuals.selection.bg_fill = self.window_color();
        visuals
    }

    pub fn apply(&self, ctx: &egui::Context) {
        ctx.set_visuals(self.visuals());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_round_trip_through_labels() {
        for theme in ColorTheme::all() {
            assert_eq!(ColorTheme::from_name(theme.label()).unwrap(), *theme);
        }
        assert_eq!(ColorTheme::from_name("VIOLET").unwrap(), ColorTheme::Violet);
        assert!(ColorTheme::from_name("neon").is_err());
    }

    #[test]
    fn visuals_carry_theme_colors() {
        let visuals = ColorTheme::Blue.visuals();
        assert_eq!(visuals.panel_fill, Color32::from_rgb(0x2C, 0x33, 0x37));
        assert_eq!(visuals.extreme_bg_color, Color32::from_rgb(0x60, 0x6E, 0x8C));
    }
}
