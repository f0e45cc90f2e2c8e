use std::path::PathBuf;

use crate::components::history::DEFAULT_UNDO_LIMIT;
use crate::components::tools::{DEFAULT_BRUSH_SIZE, ToolProperties};
use crate::io::ScratchFile;
use crate::theme::ColorTheme;

pub const DEFAULT_CANVAS_WIDTH: u32 = 1000;
pub const DEFAULT_CANVAS_HEIGHT: u32 = 600;

/// Persistent user preferences.
#[derive(Clone, Debug, PartialEq)]
pub struct AppSettings {
    pub theme: ColorTheme,
    pub brush_size: u32,
    pub max_undo_steps: usize,
    /// Size of the canvas created at startup and by File > New
    pub canvas_width: u32,
    pub canvas_height: u32,
    /// Directory holding the pre-stroke snapshot
    pub scratch_dir: PathBuf,
    pub confirm_on_exit: bool,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            theme: ColorTheme::Dark,
            brush_size: DEFAULT_BRUSH_SIZE,
            max_undo_steps: DEFAULT_UNDO_LIMIT,
            canvas_width: DEFAULT_CANVAS_WIDTH,
            canvas_height: DEFAULT_CANVAS_HEIGHT,
            scratch_dir: ScratchFile::default_dir(),
            confirm_on_exit: true,
        }
    }
}

impl AppSettings {
    /// Path to the settings file.
    /// On Linux:   ~/.config/desk/desk_settings.cfg  (XDG_CONFIG_HOME respected)
    /// On Windows: %APPDATA%\Desk\desk_settings.cfg
    /// On macOS:   ~/Library/Application Support/Desk/desk_settings.cfg
    /// Fallback:   same directory as the executable.
    pub(crate) fn settings_path() -> Option<PathBuf> {
        #[cfg(target_os = "linux")]
        {
            let config_dir = std::env::var("XDG_CONFIG_HOME")
                .map(PathBuf::from)
                .unwrap_or_else(|_| {
                    let home = std::env::var("HOME").unwrap_or_else(|_| "~".to_string());
                    PathBuf::from(home).join(".config")
                })
                .join("desk");
            let _ = std::fs::create_dir_all(&config_dir);
            return Some(config_dir.join("desk_settings.cfg"));
        }
        #[cfg(target_os = "windows")]
        {
            let appdata = std::env::var("APPDATA")
                .or_else(|_| std::env::var("USERPROFILE"))
                .unwrap_or_default();
            let config_dir = PathBuf::from(appdata).join("Desk");
            let _ = std::fs::create_dir_all(&config_dir);
            return Some(config_dir.join("desk_settings.cfg"));
        }
        #[cfg(target_os = "macos")]
        {
            let home = std::env::var("HOME").unwrap_or_else(|_| "~".to_string());
            let config_dir = PathBuf::from(home)
                .join("Library")
                .join("Application Support")
                .join("Desk");
            let _ = std::fs::create_dir_all(&config_dir);
            return Some(config_dir.join("desk_settings.cfg"));
        }
        #[cfg(not(any(target_os = "linux", target_os = "windows", target_os = "macos")))]
        {
            std::env::current_exe()
                .ok()
                .and_then(|p| p.parent().map(|d| d.join("desk_settings.cfg")))
        }
    }

    pub fn to_config_string(&self) -> String {
        format!(
            "theme={}\n\
             brush_size={}\n\
             max_undo_steps={}\n\
             canvas_width={}\n\
             canvas_height={}\n\
             scratch_dir={}\n\
             confirm_on_exit={}\n",
            self.theme.label().to_lowercase(),
            self.brush_size,
            self.max_undo_steps,
            self.canvas_width,
            self.canvas_height,
            self.scratch_dir.display(),
            self.confirm_on_exit,
        )
    }

    /// Parse `key=value` lines; unknown keys and bad values keep their defaults.
    pub fn parse(content: &str) -> Self {
        let defaults = Self::default();
        let mut s = defaults.clone();
        for line in content.lines() {
            let Some((key, val)) = line.split_once('=') else { continue };
            let key = key.trim();
            let val = val.trim();
            match key {
                "theme" => {
                    s.theme = ColorTheme::from_name(val).unwrap_or(defaults.theme);
                }
                "brush_size" => {
                    s.brush_size = val
                        .parse()
                        .map(ToolProperties::clamp_size)
                        .unwrap_or(defaults.brush_size);
                }
                "max_undo_steps" => {
                    s.max_undo_steps = match val.parse::<usize>() {
                        Ok(n) if n > 0 => n,
                        _ => defaults.max_undo_steps,
                    };
                }
                "canvas_width" => {
                    s.canvas_width = match val.parse::<u32>() {
                        Ok(n) if n > 0 => n,
                        _ => defaults.canvas_width,
                    };
                }
                "canvas_height" => {
                    s.canvas_height = match val.parse::<u32>() {
                        Ok(n) if n > 0 => n,
                        _ => defaults.canvas_height,
                    };
                }
                "scratch_dir" => {
                    if !val.is_empty() {
                        s.scratch_dir = PathBuf::from(val);
                    }
                }
                "confirm_on_exit" => {
                    s.confirm_on_exit = val != "false";
                }
                _ => {}
            }
        }
        s
    }

    /// Save settings to disk
    pub fn save(&self) {
        let Some(path) = Self::settings_path() else { return };
        if let Err(e) = std::fs::write(&path, self.to_config_string()) {
            crate::log_warn!("Settings: could not write {}: {}", path.display(), e);
        }
    }

    /// Load settings from disk (returns default if file missing or corrupt)
    pub fn load() -> Self {
        let Some(path) = Self::settings_path() else { return Self::default() };
        let Ok(content) = std::fs::read_to_string(&path) else { return Self::default() };
        Self::parse(&content)
    }
}
