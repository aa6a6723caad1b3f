use std::path::PathBuf;

use image::RgbaImage;

use crate::config::SessionSettings;
use crate::export::{encode_png, ExportResult, MaskSink};
use crate::geometry::{fit_contain, Point, SurfaceBounds, Viewport};
use crate::input::{InputContext, ShortcutAction};
use crate::loader::LoadResult;
use crate::state::{SessionEvent, SessionState, StateMachine};
use crate::surface::{PairSnapshot, SurfacePair};

use super::brush::{BrushMode, BrushOptions, StrokePath};
use super::history::{HistoryAction, MaskHistory};
use super::reconcile::{reconcile, ReconcileStrategy};
use super::stroke::render_path;

const STATUS_IDLE: &str = "load a photo to start";
const STATUS_LOADING: &str = "loading image";
const STATUS_LOADED: &str = "image loaded";
const STATUS_LOAD_FAILED: &str = "failed to load image";
const STATUS_CLEARED: &str = "mask cleared";
const STATUS_EXPORTED: &str = "mask exported";
const STATUS_EXPORT_FAILED: &str = "failed to export mask";

#[derive(Debug)]
struct ActiveStroke {
    pointer_id: u64,
    path: StrokePath,
    pre_stroke: PairSnapshot,
}

/// All mutable state of one mask-painting session.
///
/// Every handler is a no-op until a photo has been loaded.
#[derive(Debug)]
pub struct MaskSession {
    settings: SessionSettings,
    strategy: ReconcileStrategy,
    image: Option<RgbaImage>,
    box_size: (u32, u32),
    viewport: Option<Viewport>,
    pair: SurfacePair,
    history: MaskHistory,
    brush: BrushOptions,
    stroke: Option<ActiveStroke>,
    machine: StateMachine,
    status: String,
}

impl MaskSession {
    pub fn new(settings: SessionSettings, box_width: u32, box_height: u32) -> Self {
        let brush = BrushOptions::with_size(settings.brush_size);
        Self {
            strategy: settings.reconcile_strategy,
            history: MaskHistory::new(settings.history_capacity),
            settings,
            image: None,
            box_size: (box_width, box_height),
            viewport: None,
            pair: SurfacePair::new(0, 0),
            brush,
            stroke: None,
            machine: StateMachine::new(),
            status: STATUS_IDLE.to_string(),
        }
    }

    pub fn settings(&self) -> &SessionSettings {
        &self.settings
    }

    pub fn state(&self) -> SessionState {
        self.machine.state()
    }

    pub fn machine(&self) -> &StateMachine {
        &self.machine
    }

    pub fn status(&self) -> &str {
        &self.status
    }

    pub fn has_image(&self) -> bool {
        self.image.is_some()
    }

    pub fn image(&self) -> Option<&RgbaImage> {
        self.image.as_ref()
    }

    pub fn viewport(&self) -> Option<Viewport> {
        self.viewport
    }

    pub fn box_size(&self) -> (u32, u32) {
        self.box_size
    }

    pub fn pair(&self) -> &SurfacePair {
        &self.pair
    }

    pub fn history(&self) -> &MaskHistory {
        &self.history
    }

    pub fn brush(&self) -> BrushOptions {
        self.brush
    }

    pub fn stroke_active(&self) -> bool {
        self.stroke.is_some()
    }

    /// Bounds for the surfaces drawn 1:1 at the origin of the client area.
    pub fn surface_bounds(&self) -> SurfaceBounds {
        let (width, height) = self.pair.size();
        SurfaceBounds::identity(width, height)
    }

    pub fn input_context(&self) -> InputContext {
        InputContext {
            has_image: self.has_image(),
            stroke_active: self.stroke_active(),
        }
    }

    fn advance(&mut self, event: SessionEvent) -> bool {
        if !self.machine.can_transition(event) {
            tracing::debug!(state = ?self.machine.state(), ?event, "event ignored in current state");
            return false;
        }
        self.machine.transition(event).is_ok()
    }

    fn set_status(&mut self, message: &str) {
        self.status.clear();
        self.status.push_str(message);
    }

    /// Mark a decode as in flight. The current photo stays editable until it finishes.
    pub fn begin_load(&mut self) {
        self.advance(SessionEvent::RequestLoad);
        self.set_status(STATUS_LOADING);
    }

    /// Deliver the outcome of the decode started by [`Self::begin_load`].
    pub fn finish_load(&mut self, result: LoadResult<RgbaImage>) {
        match result {
            Ok(image) => {
                self.install_image(image);
                self.advance(SessionEvent::LoadSucceeded);
            }
            Err(err) => {
                tracing::warn!(%err, "image decode failed");
                self.advance(SessionEvent::LoadFailed);
                self.set_status(STATUS_LOAD_FAILED);
            }
        }
    }

    /// Install an already decoded photo and fit it into a `box_width x box_height` area.
    pub fn load_image(&mut self, image: RgbaImage, box_width: u32, box_height: u32) {
        self.box_size = (box_width, box_height);
        self.begin_load();
        self.finish_load(Ok(image));
    }

    fn install_image(&mut self, image: RgbaImage) {
        tracing::info!(
            width = image.width(),
            height = image.height(),
            "photo installed"
        );
        self.image = Some(image);
        self.stroke = None;
        self.refit();
        self.set_status(STATUS_LOADED);
    }

    fn refit(&mut self) {
        let Some(image) = self.image.as_ref() else {
            return;
        };
        let (box_width, box_height) = self.box_size;
        let viewport = fit_contain(
            f64::from(image.width()),
            f64::from(image.height()),
            f64::from(box_width),
            f64::from(box_height),
        );
        tracing::debug!(
            width = viewport.width,
            height = viewport.height,
            scale = viewport.scale,
            "refit viewport"
        );

        self.pair.resize(viewport.width, viewport.height);
        self.pair.clear_all(image);
        self.history.reseed(self.pair.mask().clone());
        self.viewport = Some(viewport);
    }

    /// Refit to a new container size. Destroys the mask and any stroke in progress.
    pub fn resize(&mut self, box_width: u32, box_height: u32) {
        self.box_size = (box_width, box_height);
        if self.image.is_none() {
            return;
        }
        if self.stroke.take().is_some() {
            tracing::debug!("stroke abandoned by resize");
        }
        self.refit();
        self.advance(SessionEvent::Resize);
    }

    /// Start a stroke owned by `pointer_id`. Returns whether the stroke began.
    pub fn pointer_down(
        &mut self,
        pointer_id: u64,
        client_x: f64,
        client_y: f64,
        bounds: SurfaceBounds,
    ) -> bool {
        let Some(image) = self.image.as_ref() else {
            return false;
        };
        if self.stroke.is_some() || !self.machine.state().accepts_edits() {
            tracing::debug!(pointer_id, "pointer down ignored");
            return false;
        }

        let point = bounds.to_surface(client_x, client_y);
        let pre_stroke = self.pair.snapshot();
        let path = StrokePath::new(point, self.brush);
        render_path(
            &mut self.pair,
            &pre_stroke,
            &path,
            image,
            &self.settings.appearance,
        );
        self.stroke = Some(ActiveStroke {
            pointer_id,
            path,
            pre_stroke,
        });
        self.advance(SessionEvent::PointerDown)
    }

    /// Extend the active stroke with the current brush settings. Moves from any pointer other
    /// than the capturing one are dropped.
    pub fn pointer_move(
        &mut self,
        pointer_id: u64,
        client_x: f64,
        client_y: f64,
        bounds: SurfaceBounds,
    ) -> bool {
        let (Some(image), Some(stroke)) = (self.image.as_ref(), self.stroke.as_mut()) else {
            return false;
        };
        if stroke.pointer_id != pointer_id {
            return false;
        }

        let point: Point = bounds.to_surface(client_x, client_y);
        let restyled = stroke.path.set_options(self.brush);
        let extended = stroke.path.append_point(point);
        if !restyled && !extended {
            return false;
        }
        render_path(
            &mut self.pair,
            &stroke.pre_stroke,
            &stroke.path,
            image,
            &self.settings.appearance,
        )
    }

    /// Commit the active stroke as one history entry and release pointer capture.
    pub fn pointer_up(&mut self, pointer_id: u64) -> bool {
        match &self.stroke {
            Some(stroke) if stroke.pointer_id == pointer_id => {}
            _ => return false,
        }
        let Some(stroke) = self.stroke.take() else {
            return false;
        };

        self.history.snapshot(self.pair.mask().clone());
        tracing::debug!(
            points = stroke.path.points().len(),
            mode = ?stroke.path.options().mode,
            "stroke committed"
        );
        self.advance(SessionEvent::PointerUp)
    }

    /// Read again on every stroke step, so a stroke in progress picks it up on the next move.
    pub fn set_brush_size(&mut self, size: u32) {
        self.brush.set_size(size);
    }

    pub fn set_mode(&mut self, mode: BrushMode) {
        self.brush.set_mode(mode);
    }

    /// Wipe the selection and restart history from the empty mask.
    pub fn clear(&mut self) {
        let Some(image) = self.image.as_ref() else {
            return;
        };
        if self.stroke.is_some() {
            return;
        }
        self.pair.clear_all(image);
        self.history.reseed(self.pair.mask().clone());
        self.advance(SessionEvent::Clear);
        self.set_status(STATUS_CLEARED);
    }

    pub fn undo(&mut self) -> bool {
        self.step_history(HistoryAction::Undo)
    }

    pub fn redo(&mut self) -> bool {
        self.step_history(HistoryAction::Redo)
    }

    fn step_history(&mut self, action: HistoryAction) -> bool {
        let Some(image) = self.image.as_ref() else {
            return false;
        };
        if self.stroke.is_some() {
            return false;
        }

        let entry = match action {
            HistoryAction::Undo => self.history.undo(),
            HistoryAction::Redo => self.history.redo(),
        };
        let Some(mask) = entry else {
            tracing::debug!(?action, "history step ignored");
            self.status.clear();
            self.status.push_str(action.empty_message());
            return false;
        };

        self.pair.apply_mask(mask);
        self.pair
            .sync_view_from_mask(image, self.settings.appearance.highlight_blend);
        self.status.clear();
        self.status.push_str(action.applied_message());
        true
    }

    /// Reconciled export mask at viewport size.
    pub fn export_mask(&self) -> Option<RgbaImage> {
        let image = self.image.as_ref()?;
        Some(reconcile(self.strategy, &self.pair, image))
    }

    /// PNG bytes of the export mask, or `None` without a photo.
    pub fn export_png(&self) -> ExportResult<Option<Vec<u8>>> {
        self.export_mask()
            .map(|mask| encode_png(&mask))
            .transpose()
    }

    /// Encode the mask and hand it to `sink` under the configured file name.
    pub fn export(&mut self, sink: &dyn MaskSink) -> ExportResult<Option<PathBuf>> {
        let Some(png) = self.export_png()? else {
            return Ok(None);
        };
        match sink.deliver(&self.settings.export_file_name, &png) {
            Ok(path) => {
                self.set_status(STATUS_EXPORTED);
                Ok(Some(path))
            }
            Err(err) => {
                self.set_status(STATUS_EXPORT_FAILED);
                Err(err)
            }
        }
    }

    /// Run a resolved keyboard shortcut. Only `Export` can fail or produce a path.
    pub fn apply_shortcut(
        &mut self,
        action: ShortcutAction,
        sink: &dyn MaskSink,
    ) -> ExportResult<Option<PathBuf>> {
        match action {
            ShortcutAction::Undo => {
                self.undo();
            }
            ShortcutAction::Redo => {
                self.redo();
            }
            ShortcutAction::DrawMode => self.set_mode(BrushMode::Draw),
            ShortcutAction::EraseMode => self.set_mode(BrushMode::Erase),
            ShortcutAction::BrushGrow => self.brush.grow(),
            ShortcutAction::BrushShrink => self.brush.shrink(),
            ShortcutAction::Clear => self.clear(),
            ShortcutAction::Export => return self.export(sink),
        }
        Ok(None)
    }
}
