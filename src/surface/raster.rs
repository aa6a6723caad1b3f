//! Software rasterization for brush paths: round caps, round joins, union coverage.

use image::{Rgba, RgbaImage};

use crate::geometry::Point;

/// Pixel-combination rule applied inside the covered area.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Composite {
    /// Covered pixels take the source color as-is.
    Replace,
    /// Straight-alpha source-over.
    SourceOver,
    /// Destination-out: covered pixels lose alpha in proportion to the source alpha.
    PunchOut,
}

/// Pixels covered by a brush path, clipped to a target surface.
#[derive(Debug, Clone)]
pub struct Coverage {
    left: u32,
    top: u32,
    width: u32,
    height: u32,
    covered: Vec<bool>,
}

impl Coverage {
    /// Coverage of `points` stroked with a round brush of diameter `brush_width`.
    ///
    /// A single point yields a disc; several points yield one connected polyline. A pixel is
    /// covered when its center lies within half the brush width of the path.
    pub fn of_path(
        points: &[Point],
        brush_width: f32,
        surface_width: u32,
        surface_height: u32,
    ) -> Self {
        let radius = brush_width / 2.0;
        let Some(first) = points.first().copied() else {
            return Self::empty();
        };
        if radius <= 0.0 || surface_width == 0 || surface_height == 0 {
            return Self::empty();
        }

        let (mut min_x, mut min_y, mut max_x, mut max_y) = (first.x, first.y, first.x, first.y);
        for point in &points[1..] {
            min_x = min_x.min(point.x);
            min_y = min_y.min(point.y);
            max_x = max_x.max(point.x);
            max_y = max_y.max(point.y);
        }

        let Some((left, top, right, bottom)) = clip_span(
            min_x - radius,
            min_y - radius,
            max_x + radius,
            max_y + radius,
            surface_width,
            surface_height,
        ) else {
            return Self::empty();
        };

        let mut coverage = Self {
            left,
            top,
            width: right - left,
            height: bottom - top,
            covered: vec![false; ((right - left) as usize) * ((bottom - top) as usize)],
        };

        if points.len() == 1 {
            coverage.mark_segment(first, first, radius);
        } else {
            for pair in points.windows(2) {
                coverage.mark_segment(pair[0], pair[1], radius);
            }
        }
        coverage
    }

    fn empty() -> Self {
        Self {
            left: 0,
            top: 0,
            width: 0,
            height: 0,
            covered: Vec::new(),
        }
    }

    fn mark_segment(&mut self, start: Point, end: Point, radius: f32) {
        let radius_sq = radius * radius;
        let right_edge = self.left + self.width;
        let bottom_edge = self.top + self.height;
        let Some((left, top, right, bottom)) = clip_span(
            start.x.min(end.x) - radius,
            start.y.min(end.y) - radius,
            start.x.max(end.x) + radius,
            start.y.max(end.y) + radius,
            right_edge,
            bottom_edge,
        ) else {
            return;
        };

        for y in top.max(self.top)..bottom {
            let row = ((y - self.top) * self.width) as usize;
            for x in left.max(self.left)..right {
                let center = Point::new(x as f32 + 0.5, y as f32 + 0.5);
                if distance_sq_to_segment(center, start, end) <= radius_sq {
                    self.covered[row + (x - self.left) as usize] = true;
                }
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        !self.covered.iter().any(|covered| *covered)
    }

    pub fn contains(&self, x: u32, y: u32) -> bool {
        if x < self.left || y < self.top || x >= self.left + self.width || y >= self.top + self.height
        {
            return false;
        }
        self.covered[((y - self.top) * self.width + (x - self.left)) as usize]
    }

    /// Covered pixel positions in row-major order.
    pub fn pixels(&self) -> impl Iterator<Item = (u32, u32)> + '_ {
        self.covered
            .iter()
            .enumerate()
            .filter(|(_, covered)| **covered)
            .map(|(index, _)| {
                let index = index as u32;
                (self.left + index % self.width, self.top + index / self.width)
            })
    }

    /// Apply `color` with `composite` once to every covered pixel of `target`.
    pub fn apply(&self, target: &mut RgbaImage, color: Rgba<u8>, composite: Composite) {
        for (x, y) in self.pixels() {
            if x >= target.width() || y >= target.height() {
                continue;
            }
            let pixel = target.get_pixel_mut(x, y);
            *pixel = composite_pixel(*pixel, color, composite);
        }
    }
}

/// Paint a brush path onto `target`. Overlapping segments are painted once.
pub fn paint_path(
    target: &mut RgbaImage,
    points: &[Point],
    brush_width: f32,
    color: Rgba<u8>,
    composite: Composite,
) {
    let coverage = Coverage::of_path(points, brush_width, target.width(), target.height());
    coverage.apply(target, color, composite);
}

fn clip_span(
    min_x: f32,
    min_y: f32,
    max_x: f32,
    max_y: f32,
    width: u32,
    height: u32,
) -> Option<(u32, u32, u32, u32)> {
    if !(min_x.is_finite() && min_y.is_finite() && max_x.is_finite() && max_y.is_finite()) {
        return None;
    }
    let left = min_x.floor().clamp(0.0, width as f32) as u32;
    let top = min_y.floor().clamp(0.0, height as f32) as u32;
    let right = (max_x.ceil() + 1.0).clamp(0.0, width as f32) as u32;
    let bottom = (max_y.ceil() + 1.0).clamp(0.0, height as f32) as u32;
    if right <= left || bottom <= top {
        return None;
    }
    Some((left, top, right, bottom))
}

fn distance_sq_to_segment(point: Point, start: Point, end: Point) -> f32 {
    let dx = end.x - start.x;
    let dy = end.y - start.y;
    let len_sq = dx * dx + dy * dy;
    let t = if len_sq > 0.0 {
        (((point.x - start.x) * dx + (point.y - start.y) * dy) / len_sq).clamp(0.0, 1.0)
    } else {
        0.0
    };
    point.distance_sq(Point::new(start.x + t * dx, start.y + t * dy))
}

pub(crate) fn composite_pixel(dst: Rgba<u8>, src: Rgba<u8>, composite: Composite) -> Rgba<u8> {
    match composite {
        Composite::Replace => src,
        Composite::SourceOver => source_over(dst, src),
        Composite::PunchOut => {
            let keep = 1.0 - f32::from(src[3]) / 255.0;
            let alpha = (f32::from(dst[3]) * keep).round() as u8;
            if alpha == 0 {
                Rgba([0, 0, 0, 0])
            } else {
                Rgba([dst[0], dst[1], dst[2], alpha])
            }
        }
    }
}

fn source_over(dst: Rgba<u8>, src: Rgba<u8>) -> Rgba<u8> {
    let src_a = f32::from(src[3]) / 255.0;
    let dst_a = f32::from(dst[3]) / 255.0;
    let out_a = src_a + dst_a * (1.0 - src_a);
    if out_a <= 0.0 {
        return Rgba([0, 0, 0, 0]);
    }
    let channel = |index: usize| {
        let value = (f32::from(src[index]) * src_a + f32::from(dst[index]) * dst_a * (1.0 - src_a))
            / out_a;
        value.round().clamp(0.0, 255.0) as u8
    };
    Rgba([
        channel(0),
        channel(1),
        channel(2),
        (out_a * 255.0).round() as u8,
    ])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn covered_count(coverage: &Coverage) -> usize {
        coverage.pixels().count()
    }

    #[test]
    fn single_point_covers_disc_of_brush_diameter() {
        let coverage = Coverage::of_path(&[Point::new(50.0, 50.0)], 20.0, 100, 100);
        assert!(coverage.contains(50, 50));
        assert!(coverage.contains(40, 50));
        assert!(coverage.contains(59, 50));
        assert!(!coverage.contains(38, 50));
        assert!(!coverage.contains(61, 50));
        assert!(!coverage.contains(58, 58));

        let area = covered_count(&coverage) as f32;
        let expected = std::f32::consts::PI * 100.0;
        assert!((area - expected).abs() / expected < 0.08, "area={area}");
    }

    #[test]
    fn polyline_covers_joined_segments_without_gaps() {
        let points = [
            Point::new(10.0, 10.0),
            Point::new(60.0, 10.0),
            Point::new(60.0, 60.0),
        ];
        let coverage = Coverage::of_path(&points, 6.0, 100, 100);
        for x in 10..60 {
            assert!(coverage.contains(x, 10), "gap at ({x}, 10)");
        }
        for y in 10..60 {
            assert!(coverage.contains(60, y), "gap at (60, {y})");
        }
        assert!(!coverage.contains(30, 30));
    }

    #[test]
    fn coverage_is_clipped_to_surface() {
        let coverage = Coverage::of_path(&[Point::new(0.0, 0.0)], 10.0, 20, 20);
        assert!(coverage.contains(0, 0));
        assert!(coverage.pixels().all(|(x, y)| x < 20 && y < 20));

        let outside = Coverage::of_path(&[Point::new(-50.0, -50.0)], 10.0, 20, 20);
        assert!(outside.is_empty());
    }

    #[test]
    fn zero_width_or_empty_path_covers_nothing() {
        assert!(Coverage::of_path(&[], 10.0, 20, 20).is_empty());
        assert!(Coverage::of_path(&[Point::new(5.0, 5.0)], 0.0, 20, 20).is_empty());
    }

    #[test]
    fn translucent_path_is_painted_once_where_segments_overlap() {
        let mut target = RgbaImage::from_pixel(40, 40, Rgba([0, 0, 0, 255]));
        let points = [
            Point::new(10.0, 20.0),
            Point::new(30.0, 20.0),
            Point::new(10.0, 20.0),
        ];
        paint_path(
            &mut target,
            &points,
            8.0,
            Rgba([255, 255, 255, 102]),
            Composite::SourceOver,
        );
        assert_eq!(target.get_pixel(20, 20), target.get_pixel(12, 20));
        assert_eq!(target.get_pixel(20, 20)[0], 102);
    }

    #[test]
    fn punch_out_with_opaque_source_clears_pixels() {
        let cleared = composite_pixel(
            Rgba([255, 255, 255, 255]),
            Rgba([0, 0, 0, 255]),
            Composite::PunchOut,
        );
        assert_eq!(cleared, Rgba([0, 0, 0, 0]));
    }

    #[test]
    fn source_over_blends_toward_source() {
        let blended = composite_pixel(
            Rgba([100, 100, 100, 255]),
            Rgba([255, 255, 255, 102]),
            Composite::SourceOver,
        );
        assert_eq!(blended, Rgba([162, 162, 162, 255]));
    }
}
