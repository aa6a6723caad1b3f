use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::editor::history::{HISTORY_CAPACITY_DEFAULT, HISTORY_CAPACITY_MAX, HISTORY_CAPACITY_MIN};
use crate::editor::{clamp_brush_size, ReconcileStrategy, StrokeAppearance, BRUSH_SIZE_DEFAULT};
use crate::export::DEFAULT_EXPORT_FILE_NAME;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ConfigPathError {
    MissingHomeDirectory,
}

const APP_DIR: &str = "maskpaint";
const APP_CONFIG_FILE: &str = "config.json";

/// Session settings from `config.json`. Every field is optional.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub brush_size: Option<u32>,
    #[serde(default)]
    pub history_capacity: Option<usize>,
    #[serde(default)]
    pub highlight_blend: Option<f32>,
    #[serde(default)]
    pub draw_alpha: Option<f32>,
    #[serde(default)]
    pub erase_alpha: Option<f32>,
    #[serde(default)]
    pub reconcile_strategy: Option<ReconcileStrategy>,
    #[serde(default)]
    pub export_file_name: Option<String>,
}

/// `AppConfig` with defaults applied and values forced into range.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionSettings {
    pub brush_size: u32,
    pub history_capacity: usize,
    pub appearance: StrokeAppearance,
    pub reconcile_strategy: ReconcileStrategy,
    pub export_file_name: String,
}

impl Default for SessionSettings {
    fn default() -> Self {
        AppConfig::default().resolve()
    }
}

fn unit_interval(value: Option<f32>, default: f32) -> f32 {
    match value {
        Some(value) if value.is_finite() => value.clamp(0.0, 1.0),
        _ => default,
    }
}

impl AppConfig {
    pub fn resolve(&self) -> SessionSettings {
        let defaults = StrokeAppearance::default();
        let appearance = StrokeAppearance {
            draw_alpha: unit_interval(self.draw_alpha, defaults.draw_alpha),
            erase_alpha: unit_interval(self.erase_alpha, defaults.erase_alpha),
            highlight_blend: unit_interval(self.highlight_blend, defaults.highlight_blend),
            ..defaults
        };

        SessionSettings {
            brush_size: clamp_brush_size(self.brush_size.unwrap_or(BRUSH_SIZE_DEFAULT)),
            history_capacity: self
                .history_capacity
                .unwrap_or(HISTORY_CAPACITY_DEFAULT)
                .clamp(HISTORY_CAPACITY_MIN, HISTORY_CAPACITY_MAX),
            appearance,
            reconcile_strategy: self.reconcile_strategy.unwrap_or_default(),
            export_file_name: self
                .export_file_name
                .clone()
                .filter(|name| !name.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_EXPORT_FILE_NAME.to_string()),
        }
    }
}

pub fn load_app_config() -> AppConfig {
    let (xdg_config_home, home) = config_env_dirs();
    load_app_config_with(xdg_config_home.as_deref(), home.as_deref())
}

fn load_app_config_with(xdg_config_home: Option<&Path>, home: Option<&Path>) -> AppConfig {
    let path = match app_config_path(APP_DIR, APP_CONFIG_FILE, xdg_config_home, home) {
        Ok(p) => p,
        Err(_) => return AppConfig::default(),
    };
    if !path.exists() {
        return AppConfig::default();
    }
    load_app_config_from(&path)
}

/// Read a config file, falling back to defaults on any read or parse failure.
pub fn load_app_config_from(path: &Path) -> AppConfig {
    match std::fs::read_to_string(path) {
        Ok(contents) => serde_json::from_str(&contents).unwrap_or_else(|err| {
            tracing::warn!(?err, ?path, "failed to parse config.json; using defaults");
            AppConfig::default()
        }),
        Err(err) => {
            tracing::warn!(?err, ?path, "failed to read config.json; using defaults");
            AppConfig::default()
        }
    }
}

pub(crate) fn config_env_dirs() -> (Option<PathBuf>, Option<PathBuf>) {
    (
        std::env::var_os("XDG_CONFIG_HOME").map(PathBuf::from),
        std::env::var_os("HOME").map(PathBuf::from),
    )
}

pub(crate) fn app_config_path(
    app_dir: &str,
    file_name: &str,
    xdg_config_home: Option<&Path>,
    home: Option<&Path>,
) -> Result<PathBuf, ConfigPathError> {
    let mut path = config_root(xdg_config_home, home)?;
    path.push(app_dir);
    path.push(file_name);
    Ok(path)
}

fn config_root(
    xdg_config_home: Option<&Path>,
    home: Option<&Path>,
) -> Result<PathBuf, ConfigPathError> {
    if let Some(xdg) = xdg_config_home.filter(|path| !path.as_os_str().is_empty()) {
        return Ok(xdg.to_path_buf());
    }

    let home = home.ok_or(ConfigPathError::MissingHomeDirectory)?;
    Ok(home.join(".config"))
}
