use image::{Rgba, RgbaImage};

use crate::geometry::{Color, Point};
use crate::surface::{
    paint_path, Composite, Coverage, PairSnapshot, SurfacePair, DEFAULT_HIGHLIGHT_BLEND,
    MASK_SELECTED,
};

use super::brush::{BrushMode, StrokePath};

const PUNCH_SOURCE: Rgba<u8> = Rgba([0, 0, 0, 255]);

/// Colors used for visual feedback on the view surface.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StrokeAppearance {
    pub draw_color: Color,
    pub draw_alpha: f32,
    pub erase_color: Color,
    pub erase_alpha: f32,
    pub highlight_blend: f32,
}

impl Default for StrokeAppearance {
    fn default() -> Self {
        Self {
            draw_color: Color::WHITE,
            draw_alpha: 0.4,
            erase_color: Color::RED,
            erase_alpha: 0.4,
            highlight_blend: DEFAULT_HIGHLIGHT_BLEND,
        }
    }
}

impl StrokeAppearance {
    pub fn view_color(&self, mode: BrushMode) -> Rgba<u8> {
        match mode {
            BrushMode::Draw => self.draw_color.with_alpha(self.draw_alpha),
            BrushMode::Erase => self.erase_color.with_alpha(self.erase_alpha),
        }
    }
}

/// Paint one stroke step. `from == None` stamps a disc at `to`; otherwise a round-capped
/// segment from `from` to `to`.
///
/// Consecutive steps overlap at their joins, so translucent view colors accumulate there.
/// Interactive painting goes through [`render_path`] instead.
pub fn render_stroke(
    pair: &mut SurfacePair,
    from: Option<Point>,
    to: Point,
    brush_size: u32,
    mode: BrushMode,
    appearance: &StrokeAppearance,
) {
    let points = match from {
        Some(from) => vec![from, to],
        None => vec![to],
    };
    let width = brush_size as f32;

    paint_path(
        pair.view_mut(),
        &points,
        width,
        appearance.view_color(mode),
        Composite::SourceOver,
    );
    match mode {
        BrushMode::Draw => paint_path(
            pair.mask_mut(),
            &points,
            width,
            MASK_SELECTED,
            Composite::Replace,
        ),
        BrushMode::Erase => paint_path(
            pair.mask_mut(),
            &points,
            width,
            PUNCH_SOURCE,
            Composite::PunchOut,
        ),
    }
}

/// Restore the pre-stroke snapshot and repaint the whole accumulated path as one shape.
///
/// Only the mask is painted. The view is then rebuilt from it, so a selected pixel is lifted
/// exactly once however many strokes cover it, and erase leaves no red residue.
pub fn render_path(
    pair: &mut SurfacePair,
    pre_stroke: &PairSnapshot,
    path: &StrokePath,
    image: &RgbaImage,
    appearance: &StrokeAppearance,
) -> bool {
    if !pair.restore(pre_stroke) {
        return false;
    }

    let options = path.options();
    let (width, height) = pair.size();
    let coverage = Coverage::of_path(path.points(), options.size as f32, width, height);

    match options.mode {
        BrushMode::Draw => coverage.apply(pair.mask_mut(), MASK_SELECTED, Composite::Replace),
        BrushMode::Erase => coverage.apply(pair.mask_mut(), PUNCH_SOURCE, Composite::PunchOut),
    }
    pair.sync_view_from_mask(image, appearance.highlight_blend);
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::editor::brush::BrushOptions;
    use crate::surface::{is_selected, MASK_UNSELECTED};

    fn ready_pair(width: u32, height: u32) -> (SurfacePair, RgbaImage) {
        let image = RgbaImage::from_pixel(width, height, Rgba([40, 40, 40, 255]));
        let mut pair = SurfacePair::new(width, height);
        pair.clear_all(&image);
        (pair, image)
    }

    fn selected_count(mask: &RgbaImage) -> usize {
        mask.pixels().filter(|pixel| is_selected(**pixel)).count()
    }

    #[test]
    fn first_step_stamps_disc_on_both_surfaces() {
        let (mut pair, _) = ready_pair(64, 64);
        render_stroke(
            &mut pair,
            None,
            Point::new(32.0, 32.0),
            10,
            BrushMode::Draw,
            &StrokeAppearance::default(),
        );
        assert_eq!(*pair.mask().get_pixel(32, 32), MASK_SELECTED);
        assert_eq!(*pair.mask().get_pixel(10, 10), MASK_UNSELECTED);
        assert_eq!(*pair.view().get_pixel(32, 32), Rgba([126, 126, 126, 255]));
        assert_eq!(*pair.view().get_pixel(10, 10), Rgba([40, 40, 40, 255]));
    }

    #[test]
    fn erase_step_punches_mask_and_tints_view_red() {
        let (mut pair, _) = ready_pair(64, 64);
        let appearance = StrokeAppearance::default();
        render_stroke(&mut pair, None, Point::new(32.0, 32.0), 10, BrushMode::Draw, &appearance);
        render_stroke(&mut pair, None, Point::new(32.0, 32.0), 16, BrushMode::Erase, &appearance);

        assert_eq!(selected_count(pair.mask()), 0);
        assert_eq!(pair.mask().get_pixel(32, 32)[3], 0);
        let tinted = pair.view().get_pixel(32, 32);
        assert!(tinted[0] > tinted[1]);
    }

    #[test]
    fn path_redraw_paints_translucent_stroke_with_uniform_opacity() {
        let (mut pair, image) = ready_pair(80, 40);
        let appearance = StrokeAppearance::default();
        let pre_stroke = pair.snapshot();
        let mut path = StrokePath::new(Point::new(10.0, 20.0), BrushOptions::with_size(8));
        for x in [20.0, 30.0, 40.0, 50.0, 60.0] {
            path.append_point(Point::new(x, 20.0));
            assert!(render_path(&mut pair, &pre_stroke, &path, &image, &appearance));
        }

        let joint = *pair.view().get_pixel(30, 20);
        let middle = *pair.view().get_pixel(25, 20);
        assert_eq!(joint, middle);
        assert_eq!(joint, Rgba([126, 126, 126, 255]));
    }

    #[test]
    fn path_redraw_does_not_accumulate_across_moves() {
        let (mut pair, image) = ready_pair(40, 40);
        let appearance = StrokeAppearance::default();
        let pre_stroke = pair.snapshot();
        let mut path = StrokePath::new(Point::new(20.0, 20.0), BrushOptions::with_size(10));

        render_path(&mut pair, &pre_stroke, &path, &image, &appearance);
        let once = pair.view().clone();
        path.append_point(Point::new(20.5, 20.0));
        render_path(&mut pair, &pre_stroke, &path, &image, &appearance);

        assert_eq!(pair.view().get_pixel(20, 20), once.get_pixel(20, 20));
    }

    #[test]
    fn erase_path_resyncs_view_from_mask() {
        let (mut pair, image) = ready_pair(60, 60);
        let appearance = StrokeAppearance::default();

        let pre_draw = pair.snapshot();
        let draw = StrokePath::new(Point::new(30.0, 30.0), BrushOptions::with_size(20));
        render_path(&mut pair, &pre_draw, &draw, &image, &appearance);

        let pre_erase = pair.snapshot();
        let mut erase_options = BrushOptions::with_size(30);
        erase_options.set_mode(BrushMode::Erase);
        let erase = StrokePath::new(Point::new(30.0, 30.0), erase_options);
        render_path(&mut pair, &pre_erase, &erase, &image, &appearance);

        assert_eq!(selected_count(pair.mask()), 0);
        assert!(pair
            .view()
            .pixels()
            .all(|pixel| *pixel == Rgba([40, 40, 40, 255])));
    }

    #[test]
    fn overlapping_draw_paths_lift_view_once() {
        let (mut pair, image) = ready_pair(40, 40);
        let appearance = StrokeAppearance::default();
        let path = StrokePath::new(Point::new(20.0, 20.0), BrushOptions::with_size(10));

        let first = pair.snapshot();
        render_path(&mut pair, &first, &path, &image, &appearance);
        let after_one = pair.view().clone();
        let second = pair.snapshot();
        render_path(&mut pair, &second, &path, &image, &appearance);

        assert_eq!(pair.view(), &after_one);
        assert_eq!(*pair.view().get_pixel(20, 20), Rgba([126, 126, 126, 255]));

        let live = pair.view().clone();
        pair.sync_view_from_mask(&image, appearance.highlight_blend);
        assert_eq!(pair.view(), &live);
    }

    #[test]
    fn path_redraw_rejects_snapshot_from_other_size() {
        let (mut pair, image) = ready_pair(20, 20);
        let pre_stroke = pair.snapshot();
        pair.resize(10, 10);
        let path = StrokePath::new(Point::new(5.0, 5.0), BrushOptions::default());
        assert!(!render_path(
            &mut pair,
            &pre_stroke,
            &path,
            &image,
            &StrokeAppearance::default()
        ));
    }
}
