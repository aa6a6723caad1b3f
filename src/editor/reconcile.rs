use image::{Rgba, RgbaImage};
use serde::Deserialize;

use crate::surface::{is_selected, SurfacePair, MASK_SELECTED, MASK_UNSELECTED};

const VIEW_LIGHT_CHANNEL_MIN: u8 = 200;
const VIEW_ALPHA_MIN: u8 = 100;
const VIEW_DIFF_TOLERANCE: u8 = 10;

/// How the export mask is derived. Fixed for the lifetime of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReconcileStrategy {
    /// The mask surface is authoritative; export only binarizes it.
    #[default]
    Accumulation,
    /// Rebuild the mask by diffing the view against a fresh render of the photo.
    ViewDiff,
}

/// Collapse the mask surface to opaque black and white.
///
/// Punched-out (transparent) pixels read as unselected.
pub fn binarize_mask(mask: &RgbaImage) -> RgbaImage {
    let mut output = RgbaImage::new(mask.width(), mask.height());
    for (out, pixel) in output.pixels_mut().zip(mask.pixels()) {
        *out = if is_selected(*pixel) {
            MASK_SELECTED
        } else {
            MASK_UNSELECTED
        };
    }
    output
}

fn is_light(pixel: Rgba<u8>) -> bool {
    pixel[0] > VIEW_LIGHT_CHANNEL_MIN
        && pixel[1] > VIEW_LIGHT_CHANNEL_MIN
        && pixel[2] > VIEW_LIGHT_CHANNEL_MIN
        && pixel[3] > VIEW_ALPHA_MIN
}

fn differs(view: Rgba<u8>, base: Rgba<u8>) -> bool {
    view.0
        .iter()
        .zip(base.0.iter())
        .any(|(left, right)| left.abs_diff(*right) > VIEW_DIFF_TOLERANCE)
}

/// Mask of every view pixel that is light and visibly changed from `base`.
///
/// Returns `None` when the two buffers disagree on size.
pub fn diff_view_against_base(view: &RgbaImage, base: &RgbaImage) -> Option<RgbaImage> {
    if view.dimensions() != base.dimensions() {
        return None;
    }
    let mut output = RgbaImage::new(view.width(), view.height());
    for ((out, view_pixel), base_pixel) in output.pixels_mut().zip(view.pixels()).zip(base.pixels())
    {
        *out = if is_light(*view_pixel) && differs(*view_pixel, *base_pixel) {
            MASK_SELECTED
        } else {
            MASK_UNSELECTED
        };
    }
    Some(output)
}

/// Clean export mask for the pair under `strategy`.
pub fn reconcile(strategy: ReconcileStrategy, pair: &SurfacePair, image: &RgbaImage) -> RgbaImage {
    match strategy {
        ReconcileStrategy::Accumulation => binarize_mask(pair.mask()),
        ReconcileStrategy::ViewDiff => {
            let base = pair.base_image(image);
            diff_view_against_base(pair.view(), &base).unwrap_or_else(|| {
                tracing::warn!("view and base render disagree on size; using mask surface");
                binarize_mask(pair.mask())
            })
        }
    }
}
