use serde::Deserialize;

use crate::geometry::Point;

pub const BRUSH_SIZE_MIN: u32 = 4;
pub const BRUSH_SIZE_MAX: u32 = 48;
pub const BRUSH_SIZE_DEFAULT: u32 = 12;
pub const BRUSH_SIZE_STEP: u32 = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BrushMode {
    #[default]
    Draw,
    Erase,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BrushOptions {
    pub size: u32,
    pub mode: BrushMode,
}

impl Default for BrushOptions {
    fn default() -> Self {
        Self {
            size: BRUSH_SIZE_DEFAULT,
            mode: BrushMode::Draw,
        }
    }
}

impl BrushOptions {
    pub fn with_size(size: u32) -> Self {
        let mut options = Self::default();
        options.set_size(size);
        options
    }

    pub fn set_size(&mut self, size: u32) {
        self.size = clamp_brush_size(size);
    }

    pub fn grow(&mut self) {
        self.set_size(self.size.saturating_add(BRUSH_SIZE_STEP));
    }

    pub fn shrink(&mut self) {
        self.set_size(self.size.saturating_sub(BRUSH_SIZE_STEP));
    }

    pub fn set_mode(&mut self, mode: BrushMode) {
        self.mode = mode;
    }
}

pub const fn clamp_brush_size(size: u32) -> u32 {
    if size < BRUSH_SIZE_MIN {
        BRUSH_SIZE_MIN
    } else if size > BRUSH_SIZE_MAX {
        BRUSH_SIZE_MAX
    } else {
        size
    }
}

/// Surface-local points of one pointer-down to pointer-up interaction.
#[derive(Debug, Clone, PartialEq)]
pub struct StrokePath {
    points: Vec<Point>,
    options: BrushOptions,
}

impl StrokePath {
    pub fn new(start: Point, options: BrushOptions) -> Self {
        Self {
            points: vec![start],
            options,
        }
    }

    /// Append a point. Repeats of the last point add nothing to the shape and are dropped.
    pub fn append_point(&mut self, point: Point) -> bool {
        if self.points.last() == Some(&point) {
            return false;
        }
        self.points.push(point);
        true
    }

    pub fn points(&self) -> &[Point] {
        &self.points
    }

    pub const fn options(&self) -> BrushOptions {
        self.options
    }

    /// Adopt the current brush settings for the whole path. Returns whether anything changed.
    pub fn set_options(&mut self, options: BrushOptions) -> bool {
        let changed = self.options != options;
        self.options = options;
        changed
    }
}
