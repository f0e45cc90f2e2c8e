use eframe::egui;

use crate::ops::background::BackgroundStyle;
use crate::ops::canvas_ops::CanvasSettings;
use crate::theme::ColorTheme;

/// Largest side the settings dialog accepts.
pub const MAX_DIALOG_SIDE: u32 = 16_000;

/// Everything one press of OK/Apply hands back to the app.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SettingsRequest {
    pub canvas: CanvasSettings,
    pub theme: ColorTheme,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum SettingsOutcome {
    /// Apply and keep the window open.
    Apply(SettingsRequest),
    /// Apply (if anything changed) and close.
    Ok(Option<SettingsRequest>),
    Cancel,
}

// ============================================================================
// SETTINGS DIALOG — scale, background and theme
// ============================================================================

pub struct SettingsDialog {
    pub open: bool,
    width: u32,
    height: u32,
    keep_aspect: bool,
    /// `Some` only once the user picks a background in this session.
    background: Option<BackgroundStyle>,
    theme: ColorTheme,
    changed: bool,
}

impl Default for SettingsDialog {
    fn default() -> Self {
        Self {
            open: false,
            width: 1,
            height: 1,
            keep_aspect: true,
            background: None,
            theme: ColorTheme::default(),
            changed: false,
        }
    }
}

impl SettingsDialog {
    /// Open pre-filled with the current canvas size and theme.
    pub fn open_with(&mut self, width: u32, height: u32, theme: ColorTheme) {
        self.open = true;
        self.width = width;
        self.height = height;
        self.theme = theme;
        self.keep_aspect = true;
        self.background = None;
        self.changed = false;
    }

    pub fn has_changes(&self) -> bool {
        self.changed
    }

    pub fn set_size(&mut self, width: u32, height: u32) {
        let width = width.clamp(1, MAX_DIALOG_SIDE);
        let height = height.clamp(1, MAX_DIALOG_SIDE);
        if (width, height) != (self.width, self.height) {
            self.width = width;
            self.height = height;
            self.changed = true;
        }
    }

    pub fn set_keep_aspect(&mut self, keep: bool) {
        if keep != self.keep_aspect {
            self.keep_aspect = keep;
            self.changed = true;
        }
    }

    pub fn set_background(&mut self, background: BackgroundStyle) {
        self.background = Some(background);
        self.changed = true;
    }

    pub fn set_theme(&mut self, theme: ColorTheme) {
        if theme != self.theme {
            self.theme = theme;
            self.changed = true;
        }
    }

    pub fn request(&self) -> SettingsRequest {
        SettingsRequest {
            canvas: CanvasSettings {
                width: self.width,
                height: self.height,
                keep_aspect: self.keep_aspect,
                background: self.background,
            },
            theme: self.theme,
        }
    }

    /// Hand out the staged request and mark it as applied.
    ///
    /// The background choice is consumed so a later Apply does not repaint
    /// the canvas again.
    fn take_request(&mut self) -> SettingsRequest {
        let request = self.request();
        self.background = None;
        self.changed = false;
        request
    }

    /// Keep the staged size in step with what was actually applied.
    pub fn sync_size(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;
    }

    pub fn press_apply(&mut self) -> Option<SettingsOutcome> {
        self.changed
            .then(|| SettingsOutcome::Apply(self.take_request()))
    }

    pub fn press_ok(&mut self) -> SettingsOutcome {
        self.open = false;
        SettingsOutcome::Ok(self.changed.then(|| self.take_request()))
    }

    pub fn press_cancel(&mut self) -> SettingsOutcome {
        self.open = false;
        self.background = None;
        self.changed = false;
        SettingsOutcome::Cancel
    }

    pub fn show(&mut self, ctx: &egui::Context) -> Option<SettingsOutcome> {
        if !self.open {
            return None;
        }
        let mut outcome = None;

        if ctx.input_mut(|i| i.consume_key(egui::Modifiers::NONE, egui::Key::Escape)) {
            return Some(self.press_cancel());
        }

        egui::Window::new("Settings")
            .collapsible(false)
            .resizable(false)
            .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
            .show(ctx, |ui| {
                ui.set_min_width(320.0);

                // ── Scale ───────────────────────────────────────────────
                ui.strong("Scale");
                egui::Grid::new("settings_scale_grid")
                    .num_columns(2)
                    .min_col_width(80.0)
                    .spacing([8.0, 6.0])
                    .show(ui, |ui| {
                        let (mut w, mut h) = (self.width, self.height);
                        ui.label("Width");
                        let w_changed = ui
                            .add(
                                egui::DragValue::new(&mut w)
                                    .speed(1.0)
                                    .clamp_range(1..=MAX_DIALOG_SIDE),
                            )
                            .changed();
                        ui.end_row();
                        ui.label("Height");
                        let h_changed = ui
                            .add(
                                egui::DragValue::new(&mut h)
                                    .speed(1.0)
                                    .clamp_range(1..=MAX_DIALOG_SIDE),
                            )
                            .changed();
                        ui.end_row();
                        if w_changed || h_changed {
                            self.set_size(w, h);
                        }

                        ui.label("");
                        let mut keep = self.keep_aspect;
                        if ui.checkbox(&mut keep, "Keep aspect ratio").changed() {
                            self.set_keep_aspect(keep);
                        }
                        ui.end_row();
                    });

                ui.separator();

                // ── Background / theme ─────────────────────────────────
                egui::Grid::new("settings_style_grid")
                    .num_columns(2)
                    .min_col_width(80.0)
                    .spacing([8.0, 6.0])
                    .show(ui, |ui| {
                        ui.label("Background");
                        let current = self.background;
                        let text = current.map_or("Unchanged", |b| b.label());
                        egui::ComboBox::from_id_source("settings_background")
                            .width(180.0)
                            .selected_text(text)
                            .show_ui(ui, |ui| {
                                for style in BackgroundStyle::all() {
                                    if ui
                                        .selectable_label(current == Some(style), style.label())
                                        .clicked()
                                    {
                                        self.set_background(style);
                                    }
                                }
                            });
                        ui.end_row();

                        ui.label("Theme");
                        let mut theme = self.theme;
                        egui::ComboBox::from_id_source("settings_theme")
                            .width(180.0)
                            .selected_text(theme.label())
                            .show_ui(ui, |ui| {
                                for t in ColorTheme::all() {
                                    ui.selectable_value(&mut theme, *t, t.label());
                                }
                            });
                        self.set_theme(theme);
                        ui.end_row();
                    });

                ui.separator();
                ui.horizontal(|ui| {
                    if ui.button("OK").clicked() {
                        outcome = Some(self.press_ok());
                    }
                    if ui.button("Cancel").clicked() {
                        outcome = Some(self.press_cancel());
                    }
                    let changed = self.changed;
                    if ui.add_enabled(changed, egui::Button::new("Apply")).clicked() {
                        outcome = self.press_apply();
                    }
                });
            });

        outcome
    }
}

// ============================================================================
// EXIT CONFIRMATION
// ============================================================================

#[derive(Default)]
pub struct ExitDialog {
    pub open: bool,
}

impl ExitDialog {
    /// Returns `Some(true)` to quit, `Some(false)` to stay.
    pub fn show(&mut self, ctx: &egui::Context) -> Option<bool> {
        if !self.open {
            return None;
        }
        let mut answer = None;
        if ctx.input_mut(|i| i.consume_key(egui::Modifiers::NONE, egui::Key::Enter)) {
            answer = Some(true);
        }
        if ctx.input_mut(|i| i.consume_key(egui::Modifiers::NONE, egui::Key::Escape)) {
            answer = Some(false);
        }

        egui::Window::new("Exit")
            .collapsible(false)
            .resizable(false)
            .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
            .show(ctx, |ui| {
                ui.label("Are you sure you want to exit?");
                ui.add_space(6.0);
                ui.horizontal(|ui| {
                    if ui.button("Yes").clicked() {
                        answer = Some(true);
                    }
                    if ui.button("No").clicked() {
                        answer = Some(false);
                    }
                });
            });

        if answer.is_some() {
            self.open = false;
        }
        answer
    }
}
