//! Headless driver: load a photo, replay a script against a session, export the mask.

mod script;

use std::path::PathBuf;

use clap::Parser;

use crate::config::{load_app_config, load_app_config_from};
use crate::editor::MaskSession;
use crate::error::AppResult;
use crate::export::{DirectorySink, MaskSink};
use crate::input::resolve_shortcut;
use crate::loader::{ImageLoader, LoadError};

pub use script::{load_script, parse_key_name, parse_script, ScriptAction, ScriptError};

const DEFAULT_BOX: BoxSize = BoxSize {
    width: 800,
    height: 600,
};

/// Container size the photo is fitted into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoxSize {
    pub width: u32,
    pub height: u32,
}

/// Parse `WIDTHxHEIGHT`.
fn parse_box(value: &str) -> Result<BoxSize, String> {
    let Some((width, height)) = value.split_once(['x', 'X']) else {
        return Err(format!("invalid box size '{value}'; use WIDTHxHEIGHT (e.g. 800x600)"));
    };
    let width: u32 = width
        .trim()
        .parse()
        .map_err(|_| format!("invalid width '{width}' in box size"))?;
    let height: u32 = height
        .trim()
        .parse()
        .map_err(|_| format!("invalid height '{height}' in box size"))?;
    if width == 0 || height == 0 {
        return Err(format!("box size must be positive, got {width}x{height}"));
    }
    Ok(BoxSize { width, height })
}

/// Paint a hair mask over a photo by replaying recorded pointer input.
#[derive(Parser, Debug, Clone)]
#[command(name = "maskpaint", version, about, long_about = None)]
pub struct Args {
    /// Photo to paint over (PNG or JPEG)
    pub image: PathBuf,

    /// JSON replay script
    pub script: PathBuf,

    /// Container size the photo is fitted into
    #[arg(long = "box", value_name = "WxH", value_parser = parse_box, default_value = "800x600")]
    pub box_size: BoxSize,

    /// Directory that receives the exported mask
    #[arg(long, value_name = "DIR", default_value = ".")]
    pub out: PathBuf,

    /// Config file path (defaults to $XDG_CONFIG_HOME/maskpaint/config.json)
    #[arg(long)]
    pub config: Option<PathBuf>,
}

impl Args {
    pub fn new(image: impl Into<PathBuf>, script: impl Into<PathBuf>) -> Self {
        Self {
            image: image.into(),
            script: script.into(),
            box_size: DEFAULT_BOX,
            out: PathBuf::from("."),
            config: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunReport {
    pub exports: Vec<PathBuf>,
    pub status: String,
}

/// Apply `actions` to `session` in order. Returns the paths of every export made.
pub fn replay(
    session: &mut MaskSession,
    actions: &[ScriptAction],
    sink: &dyn MaskSink,
) -> AppResult<Vec<PathBuf>> {
    let mut exports = Vec::new();
    for (index, action) in actions.iter().enumerate() {
        tracing::trace!(index, ?action, "replay action");
        let bounds = session.surface_bounds();
        match action {
            ScriptAction::PointerDown { x, y, pointer } => {
                session.pointer_down(*pointer, *x, *y, bounds);
            }
            ScriptAction::PointerMove { x, y, pointer } => {
                session.pointer_move(*pointer, *x, *y, bounds);
            }
            ScriptAction::PointerUp { pointer } => {
                session.pointer_up(*pointer);
            }
            ScriptAction::Mode { mode } => session.set_mode(*mode),
            ScriptAction::BrushSize { size } => session.set_brush_size(*size),
            ScriptAction::Undo => {
                session.undo();
            }
            ScriptAction::Redo => {
                session.redo();
            }
            ScriptAction::Clear => session.clear(),
            ScriptAction::Resize { width, height } => session.resize(*width, *height),
            ScriptAction::Export => exports.extend(session.export(sink)?),
            ScriptAction::Key { .. } => {
                let Some(parsed) = action.shortcut() else {
                    continue;
                };
                let (key, modifiers) = parsed?;
                if let Some(shortcut) = resolve_shortcut(key, modifiers, session.input_context()) {
                    exports.extend(session.apply_shortcut(shortcut, sink)?);
                }
            }
        }
    }
    Ok(exports)
}

/// Load the photo, replay the script and always finish with an export.
pub fn run(args: &Args) -> AppResult<RunReport> {
    let config = match &args.config {
        Some(path) => load_app_config_from(path),
        None => load_app_config(),
    };
    let settings = config.resolve();
    tracing::info!(
        brush_size = settings.brush_size,
        history_capacity = settings.history_capacity,
        strategy = ?settings.reconcile_strategy,
        "resolved session settings"
    );

    let actions = load_script(&args.script)?;
    let mut session = MaskSession::new(settings, args.box_size.width, args.box_size.height);

    let mut loader = ImageLoader::new();
    session.begin_load();
    let ticket = loader.request(args.image.clone());
    let result = match loader.wait() {
        Some((delivered, result)) if delivered == ticket => result,
        _ => Err(LoadError::WorkerGone),
    };
    let image = match result {
        Ok(image) => image,
        Err(err) => {
            tracing::error!(%err, path = %args.image.display(), "could not load photo");
            return Err(err.into());
        }
    };
    session.finish_load(Ok(image));

    let sink = DirectorySink::new(&args.out);
    let mut exports = replay(&mut session, &actions, &sink)?;
    exports.extend(session.export(&sink)?);

    Ok(RunReport {
        exports,
        status: session.status().to_string(),
    })
}
