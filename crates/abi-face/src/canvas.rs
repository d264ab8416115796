use image::{imageops, Rgba, RgbaImage};

/// Background key color. Fully transparent, so it can never collide with
/// drawn geometry, which is always opaque.
pub const KEY: Rgba<u8> = Rgba([0, 0, 0, 0]);

/// A point in canvas-local coordinates (origin at the top-left corner).
pub type Point = (f64, f64);

/// Opaque color from an RGB triple.
pub fn opaque([r, g, b]: [u8; 3]) -> Rgba<u8> {
    Rgba([r, g, b, 255])
}

/// The neutral look every frame starts from: iris disc with pupil on top.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BaseLook {
    pub iris: Rgba<u8>,
    pub iris_radius: u32,
    pub pupil: Rgba<u8>,
    /// Zero draws no pupil (the mouth).
    pub pupil_radius: u32,
}

/// Square RGBA drawing surface owned by one face feature.
///
/// A pixel is covered by a shape when its center lies inside the shape,
/// boundary included. Shapes are clipped to the canvas.
#[derive(Debug, Clone, PartialEq)]
pub struct Canvas {
    image: RgbaImage,
}

impl Canvas {
    /// A cleared canvas of `side × side` pixels.
    pub fn new(side: u32) -> Self {
        Self {
            image: RgbaImage::from_pixel(side, side, KEY),
        }
    }

    pub fn side(&self) -> u32 {
        self.image.width()
    }

    pub fn image(&self) -> &RgbaImage {
        &self.image
    }

    pub fn pixel(&self, x: u32, y: u32) -> Rgba<u8> {
        *self.image.get_pixel(x, y)
    }

    /// Fill the whole canvas with the key color.
    pub fn clear(&mut self) {
        for px in self.image.pixels_mut() {
            *px = KEY;
        }
    }

    pub fn draw_disc(&mut self, color: Rgba<u8>, center: Point, radius: f64) {
        if radius <= 0.0 {
            return;
        }
        let r2 = radius * radius;
        let (cx, cy) = center;
        let (ys, xs) = (
            self.span(cy - radius, cy + radius),
            self.span(cx - radius, cx + radius),
        );
        for y in ys {
            let dy = y as f64 + 0.5 - cy;
            for x in xs.clone() {
                let dx = x as f64 + 0.5 - cx;
                if dx * dx + dy * dy <= r2 {
                    self.image.put_pixel(x, y, color);
                }
            }
        }
    }

    /// Fill the axis-aligned rectangle spanning `from` to `to`.
    pub fn draw_rect(&mut self, color: Rgba<u8>, from: Point, to: Point) {
        let (x0, x1) = (from.0.min(to.0), from.0.max(to.0));
        let (y0, y1) = (from.1.min(to.1), from.1.max(to.1));
        for y in self.span(y0, y1) {
            let py = y as f64 + 0.5;
            if py < y0 || py > y1 {
                continue;
            }
            for x in self.span(x0, x1) {
                let px = x as f64 + 0.5;
                if px >= x0 && px <= x1 {
                    self.image.put_pixel(x, y, color);
                }
            }
        }
    }

    /// Fill a convex quadrilateral. Winding may be either direction.
    pub fn draw_quad(&mut self, color: Rgba<u8>, points: [Point; 4]) {
        let min_x = points.iter().map(|p| p.0).fold(f64::INFINITY, f64::min);
        let max_x = points.iter().map(|p| p.0).fold(f64::NEG_INFINITY, f64::max);
        let min_y = points.iter().map(|p| p.1).fold(f64::INFINITY, f64::min);
        let max_y = points.iter().map(|p| p.1).fold(f64::NEG_INFINITY, f64::max);

        let xs = self.span(min_x, max_x);
        for y in self.span(min_y, max_y) {
            for x in xs.clone() {
                if convex_contains(&points, (x as f64 + 0.5, y as f64 + 0.5)) {
                    self.image.put_pixel(x, y, color);
                }
            }
        }
    }

    /// Clear, then draw the iris and pupil centered on the canvas.
    ///
    /// Every expression starts from this frame, so cuts never accumulate
    /// across ticks.
    pub fn reset_base(&mut self, look: &BaseLook) {
        self.clear();
        let mid = self.side() as f64 / 2.0;
        self.draw_disc(look.iris, (mid, mid), look.iris_radius as f64);
        self.draw_disc(look.pupil, (mid, mid), look.pupil_radius as f64);
    }

    /// Horizontally flipped copy.
    pub fn mirrored(&self) -> Canvas {
        Canvas {
            image: imageops::flip_horizontal(&self.image),
        }
    }

    /// Pixel indices whose centers may fall in `[lo, hi]`, clipped to the canvas.
    fn span(&self, lo: f64, hi: f64) -> std::ops::Range<u32> {
        let side = self.side() as f64;
        let start = lo.floor().clamp(0.0, side) as u32;
        let end = (hi.ceil() + 1.0).clamp(0.0, side) as u32;
        start..end.max(start)
    }
}

/// Point-in-convex-polygon test, boundary inclusive.
fn convex_contains(points: &[Point; 4], p: Point) -> bool {
    let mut sign = 0.0f64;
    for i in 0..points.len() {
        let a = points[i];
        let b = points[(i + 1) % points.len()];
        let cross = (b.0 - a.0) * (p.1 - a.1) - (b.1 - a.1) * (p.0 - a.0);
        if cross == 0.0 {
            continue;
        }
        if sign == 0.0 {
            sign = cross.signum();
        } else if cross.signum() != sign {
            return false;
        }
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    const IRIS: Rgba<u8> = Rgba([171, 235, 255, 255]);
    const PUPIL: Rgba<u8> = Rgba([230, 249, 255, 255]);
    const RED: Rgba<u8> = Rgba([255, 0, 0, 255]);

    fn look(r: u32, pupil: u32) -> BaseLook {
        BaseLook {
            iris: IRIS,
            iris_radius: r,
            pupil: PUPIL,
            pupil_radius: pupil,
        }
    }

    #[test]
    fn new_canvas_is_all_key() {
        let c = Canvas::new(8);
        assert_eq!(c.side(), 8);
        assert!(c.image().pixels().all(|p| *p == KEY));
    }

    #[test]
    fn disc_covers_center_not_corners() {
        let mut c = Canvas::new(20);
        c.draw_disc(RED, (10.0, 10.0), 10.0);
        assert_eq!(c.pixel(10, 10), RED);
        assert_eq!(c.pixel(0, 10), RED);
        assert_eq!(c.pixel(0, 0), KEY);
        assert_eq!(c.pixel(19, 19), KEY);
    }

    #[test]
    fn zero_radius_draws_nothing() {
        let mut c = Canvas::new(4);
        c.draw_disc(RED, (2.0, 2.0), 0.0);
        assert!(c.image().pixels().all(|p| *p == KEY));
    }

    #[test]
    fn rect_covers_whole_rows() {
        let mut c = Canvas::new(10);
        c.draw_rect(RED, (0.0, 0.0), (10.0, 3.0));
        for x in 0..10 {
            assert_eq!(c.pixel(x, 0), RED);
            assert_eq!(c.pixel(x, 2), RED);
            assert_eq!(c.pixel(x, 3), KEY);
        }
    }

    #[test]
    fn rect_is_clipped() {
        let mut c = Canvas::new(4);
        c.draw_rect(RED, (-5.0, -5.0), (100.0, 100.0));
        assert!(c.image().pixels().all(|p| *p == RED));
    }

    #[test]
    fn quad_fills_slanted_band() {
        let mut c = Canvas::new(10);
        // Top band deepening from 0 on the left to 10 on the right.
        c.draw_quad(RED, [(0.0, 0.0), (10.0, 0.0), (10.0, 10.0), (0.0, 0.0)]);
        assert_eq!(c.pixel(9, 8), RED);
        assert_eq!(c.pixel(0, 8), KEY);
        assert_eq!(c.pixel(9, 0), RED);
    }

    #[test]
    fn quad_winding_does_not_matter() {
        let pts = [(1.0, 1.0), (8.0, 1.0), (8.0, 6.0), (1.0, 4.0)];
        let mut cw = Canvas::new(10);
        cw.draw_quad(RED, pts);
        let mut ccw = Canvas::new(10);
        ccw.draw_quad(RED, [pts[3], pts[2], pts[1], pts[0]]);
        assert_eq!(cw, ccw);
    }

    #[test]
    fn quad_with_points_off_canvas() {
        let mut c = Canvas::new(10);
        c.draw_quad(RED, [(0.0, -3.0), (10.0, -3.0), (10.0, 2.0), (0.0, 0.0)]);
        assert_eq!(c.pixel(9, 1), RED);
        assert_eq!(c.pixel(0, 1), KEY);
    }

    #[test]
    fn reset_base_is_idempotent() {
        let mut a = Canvas::new(40);
        a.reset_base(&look(20, 10));
        let first = a.clone();
        a.reset_base(&look(20, 10));
        assert_eq!(a, first);
    }

    #[test]
    fn reset_base_wipes_previous_cuts() {
        let mut c = Canvas::new(40);
        c.reset_base(&look(20, 10));
        let clean = c.clone();
        c.draw_rect(KEY, (0.0, 0.0), (40.0, 15.0));
        assert_ne!(c, clean);
        c.reset_base(&look(20, 10));
        assert_eq!(c, clean);
    }

    #[test]
    fn reset_base_layers_pupil_over_iris() {
        let mut c = Canvas::new(40);
        c.reset_base(&look(20, 10));
        assert_eq!(c.pixel(20, 20), PUPIL);
        assert_eq!(c.pixel(20, 3), IRIS);
        assert_eq!(c.pixel(0, 0), KEY);
    }

    #[test]
    fn base_is_mirror_symmetric() {
        let mut c = Canvas::new(30);
        c.reset_base(&look(15, 6));
        assert_eq!(c.mirrored(), c);
    }

    #[test]
    fn opaque_sets_full_alpha() {
        assert_eq!(opaque([1, 2, 3]), Rgba([1, 2, 3, 255]));
    }
}
