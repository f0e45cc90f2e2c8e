use eframe::egui;
use std::sync::mpsc;

use crate::canvas::Canvas;
use crate::components::colors::{ColorsPanel, ColorsPanelAction};
use crate::components::dialogs::{ExitDialog, SettingsDialog, SettingsOutcome, SettingsRequest};
use crate::components::history::{HistoryPanel, HistorySignal};
use crate::components::tools::{ToolsPanel, ToolsPanelAction};
use crate::project::{CanvasEvents, Project};
use crate::settings::AppSettings;
use crate::theme::ColorTheme;

/// Discrete File/Edit actions reachable from menus, toolbars, shortcuts and
/// the canvas context menu.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum AppAction {
    New,
    Open,
    SaveAs,
    Settings,
    Exit,
    Undo,
    Redo,
    Clear,
}

pub struct DeskApp {
    project: Project,
    settings: AppSettings,
    theme: ColorTheme,

    canvas: Canvas,
    tools_panel: ToolsPanel,
    colors_panel: ColorsPanel,
    history_panel: HistoryPanel,
    settings_dialog: SettingsDialog,
    exit_dialog: ExitDialog,

    history_receiver: mpsc::Receiver<HistorySignal>,
    can_undo: bool,
    can_redo: bool,

    /// Last pointer position forwarded to the project during a drag
    last_pointer: Option<(f32, f32)>,
    show_history: bool,
    error_message: Option<String>,
    status: String,
    force_exit: bool,
}

impl DeskApp {
    pub fn new(cc: &eframe::CreationContext<'_>) -> Self {
        let settings = AppSettings::load();
        let theme = settings.theme;
        theme.apply(&cc.egui_ctx);

        let mut project = Project::new(&settings);
        let history_receiver = project.subscribe();
        crate::log_info!(
            "Session start: canvas {}×{}, undo depth {}",
            project.canvas_state.width,
            project.canvas_state.height,
            settings.max_undo_steps
        );

        Self {
            project,
            settings,
            theme,
            canvas: Canvas::new(),
            tools_panel: ToolsPanel,
            colors_panel: ColorsPanel,
            history_panel: HistoryPanel::default(),
            settings_dialog: SettingsDialog::default(),
            exit_dialog: ExitDialog::default(),
            history_receiver,
            can_undo: false,
            can_redo: false,
            last_pointer: None,
            show_history: false,
            error_message: None,
            status: String::new(),
            force_exit: false,
        }
    }

    fn any_dialog_open(&self) -> bool {
        self.settings_dialog.open || self.exit_dialog.open || self.error_message.is_some()
    }

    // ========================================================================
    // ACTIONS
    // ========================================================================

    fn perform(&mut self, action: AppAction, ctx: &egui::Context) {
        match action {
            AppAction::New => {
                self.project.new_canvas();
                self.status = "New canvas".to_string();
            }
            AppAction::Open => {
                if let Some(path) = self.project.file_handler.pick_open_path() {
                    match self.project.open_path(&path) {
                        Ok(()) => self.status = format!("Opened {}", path.display()),
                        Err(e) => {
                            crate::log_err!("Open failed: {}", e);
                            self.error_message = Some(e.to_string());
                        }
                    }
                }
            }
            AppAction::SaveAs => {
                if let Some(path) = self.project.file_handler.pick_save_path() {
                    match self.project.save_path(&path) {
                        Ok(()) => self.status = format!("Saved {}", path.display()),
                        Err(e) => self.error_message = Some(e.to_string()),
                    }
                }
            }
            AppAction::Settings => {
                let state = &self.project.canvas_state;
                self.settings_dialog
                    .open_with(state.width, state.height, self.theme);
            }
            AppAction::Exit => self.request_exit(ctx),
            AppAction::Undo => {
                if let Some(desc) = self.project.undo() {
                    self.status = format!("Undo: {}", desc);
                }
            }
            AppAction::Redo => {
                if let Some(desc) = self.project.redo() {
                    self.status = format!("Redo: {}", desc);
                }
            }
            AppAction::Clear => {
                self.project.clear();
                self.status = "Cleared".to_string();
            }
        }
    }

    fn request_exit(&mut self, ctx: &egui::Context) {
        if self.settings.confirm_on_exit {
            self.exit_dialog.open = true;
        } else {
            self.close(ctx);
        }
    }

    fn close(&mut self, ctx: &egui::Context) {
        self.settings.save();
        crate::log_info!("Session end");
        self.force_exit = true;
        ctx.send_viewport_cmd(egui::ViewportCommand::Close);
    }

    fn apply_settings_request(&mut self, request: SettingsRequest, ctx: &egui::Context) {
        match self.project.apply_settings(&request.canvas) {
            Ok(()) => {
                let state = &self.project.canvas_state;
                self.settings_dialog.sync_size(state.width, state.height);
                self.status = format!("Canvas {}×{}", state.width, state.height);
            }
            Err(e) => {
                crate::log_err!("Settings apply failed: {}", e);
                self.error_message = Some(e.to_string());
            }
        }
        if request.theme != self.theme {
            self.theme = request.theme;
            self.theme.apply(ctx);
            self.settings.theme = request.theme;
            self.settings.save();
        }
    }

    fn drain_history_signals(&mut self) {
        while let Ok(signal) = self.history_receiver.try_recv() {
            match signal {
                HistorySignal::CanUndoChanged(v) => self.can_undo = v,
                HistorySignal::CanRedoChanged(v) => self.can_redo = v,
            }
        }
    }

    /// Collect keyboard shortcuts. Ctrl+Alt+S is checked before Ctrl+S.
    fn shortcut_action(&self, ctx: &egui::Context) -> Option<AppAction> {
        use egui::{Key, Modifiers};
        if self.any_dialog_open() {
            return None;
        }
        let ctrl_alt = Modifiers::COMMAND | Modifiers::ALT;
        let shortcuts = [
            (ctrl_alt, Key::S, AppAction::Settings),
            (Modifiers::COMMAND, Key::N, AppAction::New),
            (Modifiers::COMMAND, Key::O, AppAction::Open),
            (Modifiers::COMMAND, Key::S, AppAction::SaveAs),
            (Modifiers::COMMAND, Key::Z, AppAction::Undo),
            (Modifiers::COMMAND, Key::Y, AppAction::Redo),
            (Modifiers::NONE, Key::Delete, AppAction::Clear),
            (Modifiers::NONE, Key::Escape, AppAction::Exit),
        ];
        ctx.input_mut(|i| {
            shortcuts
                .iter()
                .find(|(mods, key, _)| i.consume_key(*mods, *key))
                .map(|(_, _, action)| *action)
        })
    }

    // ========================================================================
    // PANELS
    // ========================================================================

    fn menu_bar(&mut self, ui: &mut egui::Ui) -> Option<AppAction> {
        let mut action = None;
        egui::menu::bar(ui, |ui| {
            ui.menu_button("File", |ui| {
                let items = [
                    ("New", "Ctrl+N", AppAction::New),
                    ("Open", "Ctrl+O", AppAction::Open),
                    ("Save as", "Ctrl+S", AppAction::SaveAs),
                    ("Settings", "Ctrl+Alt+S", AppAction::Settings),
                ];
                for (label, shortcut, a) in items {
                    if ui.add(egui::Button::new(label).shortcut_text(shortcut)).clicked() {
                        action = Some(a);
                        ui.close_menu();
                    }
                }
                ui.separator();
                if ui.add(egui::Button::new("Exit").shortcut_text("Esc")).clicked() {
                    action = Some(AppAction::Exit);
                    ui.close_menu();
                }
            });
            ui.menu_button("Edit", |ui| {
                if let Some(a) = self.edit_items(ui) {
                    action = Some(a);
                    ui.close_menu();
                }
            });
            ui.menu_button("View", |ui| {
                if ui.checkbox(&mut self.show_history, "History").clicked() {
                    ui.close_menu();
                }
            });
        });
        action
    }

    /// Undo / Redo / Clear, shared by the Edit menu and the context menu.
    fn edit_items(&self, ui: &mut egui::Ui) -> Option<AppAction> {
        let mut action = None;
        let history = &self.project.history;
        let undo = egui::Button::new("Undo").shortcut_text("Ctrl+Z");
        let mut undo_resp = ui.add_enabled(self.can_undo, undo);
        if let Some(desc) = history.undo_description() {
            undo_resp = undo_resp.on_hover_text(format!("Undo: {}", desc));
        }
        if undo_resp.clicked() {
            action = Some(AppAction::Undo);
        }
        let redo = egui::Button::new("Redo").shortcut_text("Ctrl+Y");
        let mut redo_resp = ui.add_enabled(self.can_redo, redo);
        if let Some(desc) = history.redo_description() {
            redo_resp = redo_resp.on_hover_text(format!("Redo: {}", desc));
        }
        if redo_resp.clicked() {
            action = Some(AppAction::Redo);
        }
        if ui.add(egui::Button::new("Clear").shortcut_text("Del")).clicked() {
            action = Some(AppAction::Clear);
        }
        action
    }

    fn file_toolbar(&self, ui: &mut egui::Ui) -> Option<AppAction> {
        let mut action = None;
        ui.horizontal(|ui| {
            if ui.button("Clear").clicked() {
                action = Some(AppAction::Clear);
            }
            if ui.add_enabled(self.can_undo, egui::Button::new("Undo")).clicked() {
                action = Some(AppAction::Undo);
            }
            if ui.add_enabled(self.can_redo, egui::Button::new("Redo")).clicked() {
                action = Some(AppAction::Redo);
            }
            if ui.button("New").clicked() {
                action = Some(AppAction::New);
            }
            ui.separator();
            ui.label(&self.status);
        });
        action
    }

    fn handle_canvas_input(&mut self, input: crate::canvas::CanvasInput) {
        let Some(pos) = input.pos else {
            if input.primary_released {
                self.project.on_pointer_up(self.last_pointer.unwrap_or_default());
                self.last_pointer = None;
            }
            return;
        };

        if input.primary_pressed {
            self.project.on_pointer_down(pos);
            self.last_pointer = Some(pos);
        } else if input.primary_down && self.project.is_drawing() && self.last_pointer != Some(pos)
        {
            self.project.on_pointer_move(pos);
            self.last_pointer = Some(pos);
        }
        if input.primary_released {
            self.project.on_pointer_up(pos);
            self.last_pointer = None;
        }
    }

    fn error_window(&mut self, ctx: &egui::Context) {
        let Some(message) = self.error_message.clone() else { return };
        egui::Window::new("Error")
            .collapsible(false)
            .resizable(false)
            .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
            .show(ctx, |ui| {
                ui.label(message);
                if let Some(path) = crate::logger::log_path() {
                    ui.small(format!("Details: {}", path.display()));
                }
                if ui.button("OK").clicked() {
                    self.error_message = None;
                }
            });
    }
}

impl eframe::App for DeskApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        ctx.send_viewport_cmd(egui::ViewportCommand::Title(format!(
            "Desk - {}",
            self.project.display_title()
        )));

        // --- Intercept OS window-close button ---
        if ctx.input(|i| i.viewport().close_requested())
            && !self.force_exit
            && self.settings.confirm_on_exit
        {
            ctx.send_viewport_cmd(egui::ViewportCommand::CancelClose);
            self.exit_dialog.open = true;
        }

        self.drain_history_signals();

        let mut actions: Vec<AppAction> = Vec::new();
        actions.extend(self.shortcut_action(ctx));

        egui::TopBottomPanel::top("menu_bar").show(ctx, |ui| {
            actions.extend(self.menu_bar(ui));
        });

        egui::TopBottomPanel::top("instruments").show(ctx, |ui| {
            let project = &mut self.project;
            if let Some(action) = self.tools_panel.show(
                ui,
                project.active_tool,
                &project.tool_properties,
                project.eraser_enabled(),
            ) {
                match action {
                    ToolsPanelAction::SelectTool(tool) => project.on_tool_selected(tool),
                    ToolsPanelAction::SetSize(size) => {
                        project.on_size_changed(size);
                        self.settings.brush_size = project.tool_properties.size;
                    }
                    ToolsPanelAction::SetAntiAlias(aa) => project.tool_properties.anti_aliased = aa,
                }
            }
        });

        egui::TopBottomPanel::bottom("file_toolbar").show(ctx, |ui| {
            actions.extend(self.file_toolbar(ui));
        });

        egui::SidePanel::left("palette")
            .resizable(false)
            .default_width(150.0)
            .show(ctx, |ui| {
                let props = self.project.tool_properties;
                if let Some(action) = self.colors_panel.show(ui, props.color, props.fill) {
                    match action {
                        ColorsPanelAction::Stroke(c) => self.project.on_color_selected(c),
                        ColorsPanelAction::Fill(f) => self.project.on_fill_selected(f),
                    }
                }
            });

        if self.show_history {
            egui::SidePanel::right("history")
                .default_width(200.0)
                .show(ctx, |ui| {
                    ui.heading("History");
                    ui.separator();
                    let project = &mut self.project;
                    self.history_panel.show_interactive(
                        ui,
                        &mut project.history,
                        &mut project.canvas_state,
                    );
                });
        }

        egui::CentralPanel::default()
            .frame(egui::Frame::none().fill(self.theme.window_color()))
            .show(ctx, |ui| {
                let (input, response) = self.canvas.show(ui, &self.project.canvas_state);
                if !self.any_dialog_open() {
                    self.handle_canvas_input(input);
                }
                response.context_menu(|ui| {
                    for (label, a) in [
                        ("New", AppAction::New),
                        ("Open", AppAction::Open),
                        ("Save as", AppAction::SaveAs),
                        ("Settings", AppAction::Settings),
                    ] {
                        if ui.button(label).clicked() {
                            actions.push(a);
                            ui.close_menu();
                        }
                    }
                    ui.separator();
                    if let Some(a) = self.edit_items(ui) {
                        actions.push(a);
                        ui.close_menu();
                    }
                    ui.separator();
                    if ui.button("Exit").clicked() {
                        actions.push(AppAction::Exit);
                        ui.close_menu();
                    }
                });
            });

        for action in actions {
            self.perform(action, ctx);
        }

        match self.settings_dialog.show(ctx) {
            Some(SettingsOutcome::Apply(request)) | Some(SettingsOutcome::Ok(Some(request))) => {
                self.apply_settings_request(request, ctx);
            }
            Some(SettingsOutcome::Ok(None)) | Some(SettingsOutcome::Cancel) | None => {}
        }

        if self.exit_dialog.show(ctx) == Some(true) {
            self.close(ctx);
        }

        self.error_window(ctx);
    }
}
