//! Shared geometric and color primitives used across surface and editor modules.

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn distance_sq(self, other: Self) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        dx * dx + dy * dy
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
    pub scale: f64,
}

impl Viewport {
    pub const fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const WHITE: Self = Self::new(255, 255, 255);
    pub const RED: Self = Self::new(255, 0, 0);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    pub fn with_alpha(self, alpha: f32) -> image::Rgba<u8> {
        let alpha = (alpha.clamp(0.0, 1.0) * 255.0).round() as u8;
        image::Rgba([self.r, self.g, self.b, alpha])
    }
}

fn positive_or_one(value: f64) -> f64 {
    if value.is_finite() && value > 0.0 {
        value
    } else {
        1.0
    }
}

/// Largest ratio-preserving fit of `img_w x img_h` inside `box_w x box_h`.
///
/// Both output dimensions are floored and never drop below one pixel.
pub fn fit_contain(img_w: f64, img_h: f64, box_w: f64, box_h: f64) -> Viewport {
    let img_w = positive_or_one(img_w);
    let img_h = positive_or_one(img_h);
    let box_w = positive_or_one(box_w);
    let box_h = positive_or_one(box_h);

    let scale = (box_w / img_w).min(box_h / img_h);
    Viewport {
        width: floor_dimension(img_w * scale),
        height: floor_dimension(img_h * scale),
        scale,
    }
}

fn floor_dimension(value: f64) -> u32 {
    let floored = value.floor();
    if floored >= f64::from(u32::MAX) {
        u32::MAX
    } else {
        (floored as u32).max(1)
    }
}

/// On-screen placement of a surface, used to map pointer positions into surface pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfaceBounds {
    pub left: f64,
    pub top: f64,
    pub display_width: f64,
    pub display_height: f64,
    pub pixel_width: u32,
    pub pixel_height: u32,
}

impl SurfaceBounds {
    /// Bounds for a surface displayed 1:1 at the origin.
    pub fn identity(pixel_width: u32, pixel_height: u32) -> Self {
        Self {
            left: 0.0,
            top: 0.0,
            display_width: f64::from(pixel_width.max(1)),
            display_height: f64::from(pixel_height.max(1)),
            pixel_width,
            pixel_height,
        }
    }

    pub fn at(left: f64, top: f64, pixel_width: u32, pixel_height: u32) -> Self {
        Self {
            left,
            top,
            ..Self::identity(pixel_width, pixel_height)
        }
    }

    /// Client position to surface-local pixel position.
    ///
    /// This is the only place that accounts for display scaling; the stroke renderer and the
    /// session both go through it.
    pub fn to_surface(&self, client_x: f64, client_y: f64) -> Point {
        let display_width = positive_or_one(self.display_width);
        let display_height = positive_or_one(self.display_height);
        let scale_x = f64::from(self.pixel_width) / display_width;
        let scale_y = f64::from(self.pixel_height) / display_height;
        Point::new(
            ((client_x - self.left) * scale_x) as f32,
            ((client_y - self.top) * scale_y) as f32,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fit_contain_halves_800x600_into_400x300_box() {
        let viewport = fit_contain(800.0, 600.0, 400.0, 300.0);
        assert_eq!(viewport.size(), (400, 300));
        assert!((viewport.scale - 0.5).abs() < f64::EPSILON);
    }

    #[test]
    fn fit_contain_uses_limiting_axis_and_preserves_ratio() {
        let cases = [
            (1920.0, 1080.0, 500.0, 500.0),
            (300.0, 1200.0, 640.0, 480.0),
            (17.0, 9.0, 1000.0, 13.0),
            (1000.0, 1000.0, 333.0, 777.0),
        ];
        for (img_w, img_h, box_w, box_h) in cases {
            let viewport = fit_contain(img_w, img_h, box_w, box_h);
            let expected_scale = f64::min(box_w / img_w, box_h / img_h);
            assert!((viewport.scale - expected_scale).abs() < 1e-12);
            assert!(viewport.width >= 1 && viewport.height >= 1);
            assert!(f64::from(viewport.width) <= box_w);
            assert!(f64::from(viewport.height) <= box_h);

            let ratio = f64::from(viewport.width) / f64::from(viewport.height);
            let tolerance = 1.0 / f64::from(viewport.height.min(viewport.width)) * ratio + 0.02;
            assert!(
                (ratio - img_w / img_h).abs() <= tolerance,
                "{img_w}x{img_h} in {box_w}x{box_h} -> {viewport:?}"
            );
        }
    }

    #[test]
    fn fit_contain_never_returns_zero_sized_viewport() {
        let viewport = fit_contain(10_000.0, 10.0, 50.0, 50.0);
        assert_eq!(viewport.width, 50);
        assert_eq!(viewport.height, 1);
    }

    #[test]
    fn fit_contain_upscales_small_images() {
        let viewport = fit_contain(100.0, 50.0, 400.0, 400.0);
        assert_eq!(viewport.size(), (400, 200));
        assert!((viewport.scale - 4.0).abs() < f64::EPSILON);
    }

    #[test]
    fn surface_bounds_maps_scaled_display_into_pixels() {
        let bounds = SurfaceBounds {
            left: 10.0,
            top: 20.0,
            display_width: 200.0,
            display_height: 150.0,
            pixel_width: 400,
            pixel_height: 300,
        };
        assert_eq!(bounds.to_surface(60.0, 95.0), Point::new(100.0, 150.0));
    }

    #[test]
    fn surface_bounds_identity_is_offset_only() {
        let bounds = SurfaceBounds::at(5.0, 7.0, 64, 64);
        assert_eq!(bounds.to_surface(15.0, 17.0), Point::new(10.0, 10.0));
    }
}
