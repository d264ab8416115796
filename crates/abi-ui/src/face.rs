use image::{Rgba, RgbaImage};
use ratatui::{buffer::Buffer, layout::Rect, style::Color};

/// Alpha below which a pixel is left to the terminal's own background.
const ALPHA_THRESHOLD: u8 = 128;

/// Paint an RGBA frame into `area` using Unicode half-block characters.
///
/// Each cell shows two vertically stacked pixels via `▀` (foreground = top,
/// background = bottom). The frame is sampled nearest-neighbour, so it should
/// already be sized `area.width × 2·area.height` for a 1:1 mapping.
pub fn render_face(buf: &mut Buffer, area: Rect, frame: &RgbaImage) {
    let (src_w, src_h) = frame.dimensions();
    if area.width == 0 || area.height == 0 || src_w == 0 || src_h == 0 {
        return;
    }

    let cell_w = area.width as u32;
    let cell_h = area.height as u32;
    let pixel_h = cell_h * 2;

    for cy in 0..cell_h {
        let top_py = (cy * 2 * src_h) / pixel_h;
        let bot_py = ((cy * 2 + 1) * src_h) / pixel_h;
        for cx in 0..cell_w {
            let px = (cx * src_w) / cell_w;
            let top = color_of(frame.get_pixel(px, top_py));
            let bot = color_of(frame.get_pixel(px, bot_py));

            let x = area.x + cx as u16;
            let y = area.y + cy as u16;
            let Some(cell) = buf.cell_mut((x, y)) else {
                continue;
            };

            match (top, bot) {
                (None, None) => {
                    cell.set_char(' ');
                    cell.set_fg(Color::Reset);
                    cell.set_bg(Color::Reset);
                }
                (Some(top), bot) => {
                    cell.set_char('▀');
                    cell.set_fg(top);
                    cell.set_bg(bot.unwrap_or(Color::Reset));
                }
                (None, Some(bot)) => {
                    cell.set_char('▄');
                    cell.set_fg(bot);
                    cell.set_bg(Color::Reset);
                }
            }
        }
    }
}

fn color_of(px: &Rgba<u8>) -> Option<Color> {
    let [r, g, b, a] = px.0;
    (a >= ALPHA_THRESHOLD).then_some(Color::Rgb(r, g, b))
}

#[cfg(test)]
mod tests {
    use super::*;

    const RED: Rgba<u8> = Rgba([255, 0, 0, 255]);
    const BLUE: Rgba<u8> = Rgba([0, 0, 255, 255]);
    const CLEAR: Rgba<u8> = Rgba([0, 0, 0, 0]);

    #[test]
    fn solid_frame_fills_cells() {
        let frame = RgbaImage::from_pixel(4, 4, RED);
        let area = Rect::new(0, 0, 4, 2);
        let mut buf = Buffer::empty(area);

        render_face(&mut buf, area, &frame);

        let cell = buf.cell((3, 1)).unwrap();
        assert_eq!(cell.symbol(), "▀");
        assert_eq!(cell.fg, Color::Rgb(255, 0, 0));
        assert_eq!(cell.bg, Color::Rgb(255, 0, 0));
    }

    #[test]
    fn top_and_bottom_pixels_map_to_fg_and_bg() {
        let mut frame = RgbaImage::from_pixel(2, 2, BLUE);
        frame.put_pixel(0, 0, RED);
        frame.put_pixel(1, 0, RED);
        let area = Rect::new(0, 0, 2, 1);
        let mut buf = Buffer::empty(area);

        render_face(&mut buf, area, &frame);

        let cell = buf.cell((0, 0)).unwrap();
        assert_eq!(cell.fg, Color::Rgb(255, 0, 0));
        assert_eq!(cell.bg, Color::Rgb(0, 0, 255));
    }

    #[test]
    fn transparent_top_uses_lower_half_block() {
        let mut frame = RgbaImage::from_pixel(1, 2, CLEAR);
        frame.put_pixel(0, 1, BLUE);
        let area = Rect::new(0, 0, 1, 1);
        let mut buf = Buffer::empty(area);

        render_face(&mut buf, area, &frame);

        let cell = buf.cell((0, 0)).unwrap();
        assert_eq!(cell.symbol(), "▄");
        assert_eq!(cell.fg, Color::Rgb(0, 0, 255));
    }

    #[test]
    fn offset_area_is_respected() {
        let frame = RgbaImage::from_pixel(2, 2, RED);
        let area = Rect::new(3, 2, 2, 1);
        let mut buf = Buffer::empty(Rect::new(0, 0, 8, 4));

        render_face(&mut buf, area, &frame);

        assert_eq!(buf.cell((3, 2)).unwrap().symbol(), "▀");
        assert_ne!(buf.cell((0, 0)).unwrap().symbol(), "▀");
    }

    #[test]
    fn empty_area_or_frame_is_noop() {
        let mut buf = Buffer::empty(Rect::new(0, 0, 4, 4));
        render_face(&mut buf, Rect::new(0, 0, 0, 0), &RgbaImage::from_pixel(2, 2, RED));
        render_face(&mut buf, Rect::new(0, 0, 4, 4), &RgbaImage::new(0, 0));
        assert_eq!(buf.cell((0, 0)).unwrap().symbol(), " ");
    }

    #[test]
    fn larger_frame_is_downsampled() {
        let frame = RgbaImage::from_pixel(40, 40, BLUE);
        let area = Rect::new(0, 0, 4, 2);
        let mut buf = Buffer::empty(area);
        render_face(&mut buf, area, &frame);
        assert_eq!(buf.cell((2, 1)).unwrap().bg, Color::Rgb(0, 0, 255));
    }
}
