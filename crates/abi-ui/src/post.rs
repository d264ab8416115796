//! Frame post-processing: fit the full-resolution frame to the terminal and
//! give it a neon glow.

use image::{imageops, imageops::FilterType, RgbaImage};

/// Downsample `frame` to the pixel grid of a `cols × rows` cell area.
///
/// Each cell shows two stacked pixels, so the result is `cols × 2·rows`.
/// Returns `None` for an empty area.
pub fn fit_to_cells(frame: &RgbaImage, cols: u16, rows: u16) -> Option<RgbaImage> {
    if cols == 0 || rows == 0 || frame.width() == 0 || frame.height() == 0 {
        return None;
    }
    Some(imageops::resize(
        frame,
        cols as u32,
        rows as u32 * 2,
        FilterType::Nearest,
    ))
}

/// Neon bloom: a Gaussian-blurred copy lightened with the sharp frame.
///
/// Shapes keep their crisp edges while light bleeds into the dark around
/// them. A non-positive `sigma` returns the frame unchanged.
pub fn bloom(frame: &RgbaImage, sigma: f32) -> RgbaImage {
    if sigma <= 0.0 {
        return frame.clone();
    }
    let mut glow = imageops::blur(frame, sigma);
    for (g, s) in glow.pixels_mut().zip(frame.pixels()) {
        for c in 0..4 {
            g.0[c] = g.0[c].max(s.0[c]);
        }
    }
    glow
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    const BLACK: Rgba<u8> = Rgba([0, 0, 0, 255]);
    const BLUE: Rgba<u8> = Rgba([171, 235, 255, 255]);

    fn dot_frame() -> RgbaImage {
        let mut frame = RgbaImage::from_pixel(21, 21, BLACK);
        for y in 8..13 {
            for x in 8..13 {
                frame.put_pixel(x, y, BLUE);
            }
        }
        frame
    }

    #[test]
    fn fit_to_cells_doubles_rows() {
        let frame = RgbaImage::from_pixel(1920, 1080, BLACK);
        let fitted = fit_to_cells(&frame, 80, 24).unwrap();
        assert_eq!(fitted.dimensions(), (80, 48));
    }

    #[test]
    fn fit_to_cells_empty_area() {
        let frame = RgbaImage::from_pixel(4, 4, BLACK);
        assert!(fit_to_cells(&frame, 0, 10).is_none());
        assert!(fit_to_cells(&frame, 10, 0).is_none());
    }

    #[test]
    fn bloom_keeps_shapes_and_spreads_light() {
        let frame = dot_frame();
        let glowing = bloom(&frame, 1.5);
        assert_eq!(*glowing.get_pixel(10, 10), BLUE);
        let halo = glowing.get_pixel(6, 10);
        assert!(halo.0[2] > 0, "expected glow next to the dot, got {halo:?}");
        assert_eq!(*glowing.get_pixel(0, 0), BLACK);
    }

    #[test]
    fn bloom_never_darkens() {
        let frame = dot_frame();
        let glowing = bloom(&frame, 3.0);
        for (g, s) in glowing.pixels().zip(frame.pixels()) {
            for c in 0..4 {
                assert!(g.0[c] >= s.0[c]);
            }
        }
    }

    #[test]
    fn zero_sigma_is_identity() {
        let frame = dot_frame();
        assert_eq!(bloom(&frame, 0.0), frame);
    }
}
