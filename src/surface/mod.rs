//! The view/mask surface pair kept in lockstep with the viewport.

pub mod raster;

use image::{imageops, Rgba, RgbaImage};

pub use raster::{paint_path, Composite, Coverage};

pub const MASK_SELECTED: Rgba<u8> = Rgba([255, 255, 255, 255]);
pub const MASK_UNSELECTED: Rgba<u8> = Rgba([0, 0, 0, 255]);
pub const DEFAULT_HIGHLIGHT_BLEND: f32 = 0.4;

const MASK_SELECTED_THRESHOLD: u8 = 128;

/// Whether a mask pixel counts as selected for highlighting and export.
pub fn is_selected(pixel: Rgba<u8>) -> bool {
    pixel[0] > MASK_SELECTED_THRESHOLD && pixel[3] > MASK_SELECTED_THRESHOLD
}

/// Lift one channel toward white by `blend` (0 leaves it, 1 saturates it).
pub fn lighten_channel(base: u8, blend: f32) -> u8 {
    let base = f32::from(base);
    (base + (255.0 - base) * blend.clamp(0.0, 1.0))
        .round()
        .clamp(0.0, 255.0) as u8
}

/// Render `image` scaled to exactly `width x height`.
pub fn render_base(image: &RgbaImage, width: u32, height: u32) -> RgbaImage {
    let width = width.max(1);
    let height = height.max(1);
    if image.dimensions() == (width, height) {
        return image.clone();
    }
    imageops::resize(image, width, height, imageops::FilterType::Triangle)
}

/// Copy of both surfaces, taken before a stroke starts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PairSnapshot {
    view: RgbaImage,
    mask: RgbaImage,
}

impl PairSnapshot {
    pub fn mask(&self) -> &RgbaImage {
        &self.mask
    }
}

/// Visible composite and binary selection buffer. Both always share one size.
#[derive(Debug, Clone)]
pub struct SurfacePair {
    view: RgbaImage,
    mask: RgbaImage,
    base: Option<RgbaImage>,
}

impl SurfacePair {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            view: RgbaImage::new(width, height),
            mask: RgbaImage::new(width, height),
            base: None,
        }
    }

    pub fn size(&self) -> (u32, u32) {
        self.view.dimensions()
    }

    pub fn view(&self) -> &RgbaImage {
        &self.view
    }

    pub fn mask(&self) -> &RgbaImage {
        &self.mask
    }

    pub(crate) fn view_mut(&mut self) -> &mut RgbaImage {
        &mut self.view
    }

    pub(crate) fn mask_mut(&mut self) -> &mut RgbaImage {
        &mut self.mask
    }

    /// Resize both surfaces. Prior content is discarded; callers redraw right after.
    pub fn resize(&mut self, width: u32, height: u32) {
        tracing::debug!(width, height, "resize surface pair");
        self.view = RgbaImage::new(width, height);
        self.mask = RgbaImage::new(width, height);
        self.base = None;
    }

    /// Clear the view and draw `image` scaled to `width x height`.
    pub fn draw_base_image(&mut self, image: &RgbaImage, width: u32, height: u32) {
        let base = render_base(image, width, height);
        self.view = base.clone();
        self.base = Some(base);
    }

    /// Fill the mask with opaque black: nothing selected.
    pub fn reset_mask(&mut self, width: u32, height: u32) {
        self.mask = RgbaImage::from_pixel(width, height, MASK_UNSELECTED);
    }

    /// Pristine view and an empty mask at the current size.
    pub fn clear_all(&mut self, image: &RgbaImage) {
        let (width, height) = self.size();
        self.draw_base_image(image, width, height);
        self.reset_mask(width, height);
    }

    /// Base image at the current size, reusing the cached render when it still matches.
    pub fn base_image(&self, image: &RgbaImage) -> RgbaImage {
        let (width, height) = self.size();
        match &self.base {
            Some(base) if base.dimensions() == (width, height) => base.clone(),
            _ => render_base(image, width, height),
        }
    }

    /// Rebuild the view from the base image, then lift every selected mask pixel toward white.
    pub fn sync_view_from_mask(&mut self, image: &RgbaImage, blend: f32) {
        let base = self.base_image(image);
        let mut view = base.clone();
        for (view_pixel, mask_pixel) in view.pixels_mut().zip(self.mask.pixels()) {
            if !is_selected(*mask_pixel) {
                continue;
            }
            view_pixel[0] = lighten_channel(view_pixel[0], blend);
            view_pixel[1] = lighten_channel(view_pixel[1], blend);
            view_pixel[2] = lighten_channel(view_pixel[2], blend);
        }
        self.view = view;
        self.base = Some(base);
    }

    pub fn snapshot(&self) -> PairSnapshot {
        PairSnapshot {
            view: self.view.clone(),
            mask: self.mask.clone(),
        }
    }

    /// Restore a snapshot taken at the current size. A stale snapshot is ignored.
    pub fn restore(&mut self, snapshot: &PairSnapshot) -> bool {
        if snapshot.view.dimensions() != self.size() || snapshot.mask.dimensions() != self.size() {
            tracing::debug!("ignoring pair snapshot with stale dimensions");
            return false;
        }
        self.view.clone_from(&snapshot.view);
        self.mask.clone_from(&snapshot.mask);
        true
    }

    /// Replace the mask with a history entry of the same size.
    pub fn apply_mask(&mut self, mask: &RgbaImage) -> bool {
        if mask.dimensions() != self.size() {
            tracing::debug!("ignoring mask snapshot with stale dimensions");
            return false;
        }
        self.mask.clone_from(mask);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn photo(width: u32, height: u32) -> RgbaImage {
        RgbaImage::from_fn(width, height, |x, y| {
            Rgba([(x % 256) as u8, (y % 256) as u8, 90, 255])
        })
    }

    #[test]
    fn resize_keeps_view_and_mask_dimensions_identical() {
        let mut pair = SurfacePair::new(10, 10);
        for (width, height) in [(400, 300), (1, 1), (37, 911)] {
            pair.resize(width, height);
            assert_eq!(pair.view().dimensions(), (width, height));
            assert_eq!(pair.mask().dimensions(), (width, height));
        }
    }

    #[test]
    fn clear_all_is_idempotent() {
        let image = photo(80, 60);
        let mut pair = SurfacePair::new(40, 30);
        pair.clear_all(&image);
        let first_mask = pair.mask().clone();
        let first_view = pair.view().clone();

        pair.clear_all(&image);
        assert_eq!(pair.mask(), &first_mask);
        assert_eq!(pair.view(), &first_view);
        assert!(pair.mask().pixels().all(|pixel| *pixel == MASK_UNSELECTED));
    }

    #[test]
    fn draw_base_image_scales_into_surface() {
        let image = photo(80, 60);
        let mut pair = SurfacePair::new(40, 30);
        pair.draw_base_image(&image, 40, 30);
        assert_eq!(pair.view().dimensions(), (40, 30));
        assert!(pair.view().pixels().all(|pixel| pixel[3] == 255));
    }

    #[test]
    fn sync_view_from_mask_highlights_only_selected_pixels() {
        let image = RgbaImage::from_pixel(4, 1, Rgba([100, 50, 0, 255]));
        let mut pair = SurfacePair::new(4, 1);
        pair.clear_all(&image);
        pair.mask_mut().put_pixel(1, 0, MASK_SELECTED);
        pair.mask_mut().put_pixel(2, 0, Rgba([255, 255, 255, 0]));

        pair.sync_view_from_mask(&image, DEFAULT_HIGHLIGHT_BLEND);

        assert_eq!(*pair.view().get_pixel(0, 0), Rgba([100, 50, 0, 255]));
        assert_eq!(*pair.view().get_pixel(1, 0), Rgba([162, 132, 102, 255]));
        assert_eq!(*pair.view().get_pixel(2, 0), Rgba([100, 50, 0, 255]));
    }

    #[test]
    fn restore_ignores_snapshots_from_previous_size() {
        let image = photo(20, 20);
        let mut pair = SurfacePair::new(20, 20);
        pair.clear_all(&image);
        let snapshot = pair.snapshot();

        pair.resize(10, 10);
        assert!(!pair.restore(&snapshot));
        assert_eq!(pair.size(), (10, 10));
    }

    #[test]
    fn lighten_channel_matches_blend_formula() {
        assert_eq!(lighten_channel(0, 0.4), 102);
        assert_eq!(lighten_channel(255, 0.4), 255);
        assert_eq!(lighten_channel(200, 0.0), 200);
    }
}
