//! Brush strokes, mask history and the session controller that ties them to the surfaces.

pub mod brush;
pub mod history;
pub mod reconcile;
mod session;
pub mod stroke;

pub use brush::{
    clamp_brush_size, BrushMode, BrushOptions, StrokePath, BRUSH_SIZE_DEFAULT, BRUSH_SIZE_MAX,
    BRUSH_SIZE_MIN, BRUSH_SIZE_STEP,
};
pub use history::{HistoryAction, MaskHistory};
pub use reconcile::{reconcile, ReconcileStrategy};
pub use session::MaskSession;
pub use stroke::{render_path, render_stroke, StrokeAppearance};
