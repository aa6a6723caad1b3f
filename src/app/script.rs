//! JSON replay scripts: a flat list of session actions driven without a window.

use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

use crate::editor::BrushMode;
use crate::input::{ShortcutKey, ShortcutModifiers};

#[derive(Debug, Error)]
pub enum ScriptError {
    #[error("failed to read script {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse script {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("unknown key name in script: {0:?}")]
    UnknownKey(String),
}

pub type ScriptResult<T> = std::result::Result<T, ScriptError>;

/// One replayed input. Pointer coordinates are client positions over the surface.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum ScriptAction {
    PointerDown {
        x: f64,
        y: f64,
        #[serde(default)]
        pointer: u64,
    },
    PointerMove {
        x: f64,
        y: f64,
        #[serde(default)]
        pointer: u64,
    },
    PointerUp {
        #[serde(default)]
        pointer: u64,
    },
    Mode {
        mode: BrushMode,
    },
    BrushSize {
        size: u32,
    },
    Undo,
    Redo,
    Clear,
    Resize {
        width: u32,
        height: u32,
    },
    Export,
    /// A key press routed through the shortcut table.
    Key {
        key: String,
        #[serde(default)]
        ctrl: bool,
        #[serde(default)]
        shift: bool,
    },
}

impl ScriptAction {
    /// Key and modifiers of a `key` action.
    pub fn shortcut(&self) -> Option<ScriptResult<(ShortcutKey, ShortcutModifiers)>> {
        let Self::Key { key, ctrl, shift } = self else {
            return None;
        };
        Some(parse_key_name(key).map(|parsed| (parsed, ShortcutModifiers::new(*ctrl, *shift))))
    }
}

pub fn parse_key_name(name: &str) -> ScriptResult<ShortcutKey> {
    let mut chars = name.chars();
    if let (Some(single), None) = (chars.next(), chars.next()) {
        return Ok(ShortcutKey::Character(single));
    }
    match name.to_ascii_lowercase().as_str() {
        "enter" | "return" => Ok(ShortcutKey::Enter),
        "escape" | "esc" => Ok(ShortcutKey::Escape),
        "delete" | "del" => Ok(ShortcutKey::Delete),
        "backspace" => Ok(ShortcutKey::Backspace),
        _ => Err(ScriptError::UnknownKey(name.to_string())),
    }
}

pub fn parse_script(contents: &str, path: &Path) -> ScriptResult<Vec<ScriptAction>> {
    serde_json::from_str(contents).map_err(|source| ScriptError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

pub fn load_script(path: &Path) -> ScriptResult<Vec<ScriptAction>> {
    let contents = std::fs::read_to_string(path).map_err(|source| ScriptError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let actions = parse_script(&contents, path)?;
    tracing::debug!(path = %path.display(), actions = actions.len(), "loaded replay script");
    Ok(actions)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_script_reads_every_action_kind() {
        let actions = parse_script(
            r#"[
                {"action": "pointer_down", "x": 10, "y": 12.5},
                {"action": "pointer_move", "x": 20, "y": 12.5, "pointer": 0},
                {"action": "pointer_up", "x": 20, "y": 12.5},
                {"action": "mode", "mode": "erase"},
                {"action": "brush_size", "size": 24},
                {"action": "undo"},
                {"action": "redo"},
                {"action": "clear"},
                {"action": "resize", "width": 640, "height": 480},
                {"action": "key", "key": "z", "ctrl": true},
                {"action": "export"}
            ]"#,
            Path::new("script.json"),
        )
        .unwrap();

        assert_eq!(actions.len(), 11);
        assert_eq!(
            actions[0],
            ScriptAction::PointerDown {
                x: 10.0,
                y: 12.5,
                pointer: 0
            }
        );
        assert_eq!(actions[2], ScriptAction::PointerUp { pointer: 0 });
        assert_eq!(
            actions[3],
            ScriptAction::Mode {
                mode: BrushMode::Erase
            }
        );
        assert_eq!(
            actions[8],
            ScriptAction::Resize {
                width: 640,
                height: 480
            }
        );
        assert_eq!(actions[10], ScriptAction::Export);
    }

    #[test]
    fn parse_script_reports_unknown_action() {
        let err = parse_script(r#"[{"action": "fill"}]"#, Path::new("bad.json")).unwrap_err();
        assert!(matches!(err, ScriptError::Parse { .. }));
        assert!(err.to_string().contains("bad.json"));
    }

    #[test]
    fn load_script_reports_missing_file() {
        let err = load_script(Path::new("/nonexistent/script.json")).unwrap_err();
        assert!(matches!(err, ScriptError::Io { .. }));
    }

    #[test]
    fn key_actions_resolve_names_and_modifiers() {
        let action = ScriptAction::Key {
            key: "Delete".to_string(),
            ctrl: false,
            shift: false,
        };
        let (key, modifiers) = action.shortcut().unwrap().unwrap();
        assert_eq!(key, ShortcutKey::Delete);
        assert_eq!(modifiers, ShortcutModifiers::default());

        assert_eq!(parse_key_name("]").unwrap(), ShortcutKey::Character(']'));
        assert!(matches!(
            parse_key_name("hyper"),
            Err(ScriptError::UnknownKey(_))
        ));
        assert!(ScriptAction::Undo.shortcut().is_none());
    }
}
