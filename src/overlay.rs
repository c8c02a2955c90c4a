//! Diagnostic rendering of a locate result.
//!
//! Draws onto a copy of the background; the report is only read.

use crate::region::BoundingBox;
use crate::search::LocateReport;
use image::{Rgb, RgbImage, RgbaImage};
use imageproc::drawing::{draw_hollow_rect_mut, draw_line_segment_mut};
use imageproc::rect::Rect;

/// Colors and thresholds used by [`render_overlay`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct OverlayStyle {
    /// Outline of the clamped rough box.
    pub rough_color: Rgb<u8>,
    /// Outline of each search window.
    pub window_color: Rgb<u8>,
    /// Guide lines along the located piece's edges.
    pub guide_color: Rgb<u8>,
    /// Piece pixels with alpha above this value are pasted.
    pub alpha_threshold: u8,
}

impl Default for OverlayStyle {
    fn default() -> Self {
        Self {
            rough_color: Rgb([0, 255, 0]),
            window_color: Rgb([0, 0, 255]),
            guide_color: Rgb([255, 0, 0]),
            alpha_threshold: crate::piece::DEFAULT_ALPHA_THRESHOLD,
        }
    }
}

fn outline(canvas: &mut RgbImage, b: BoundingBox, color: Rgb<u8>) {
    let rect = Rect::at(b.left as i32, b.up as i32).of_size(b.width(), b.height());
    draw_hollow_rect_mut(canvas, rect, color);
}

/// Renders the search windows, the rough box and the located piece.
pub fn render_overlay(
    background: &RgbImage,
    piece: &RgbaImage,
    report: &LocateReport,
    style: &OverlayStyle,
) -> RgbImage {
    let mut canvas = background.clone();
    for window in &report.windows {
        outline(&mut canvas, *window, style.window_color);
    }
    outline(&mut canvas, report.search_box, style.rough_color);

    let Some(loc) = report.location else {
        return canvas;
    };

    let (width, height) = canvas.dimensions();
    for (px, py, p) in piece.enumerate_pixels() {
        if p.0[3] <= style.alpha_threshold {
            continue;
        }
        let x = loc.x + i64::from(px);
        let y = loc.y + i64::from(py);
        if (0..i64::from(width)).contains(&x) && (0..i64::from(height)).contains(&y) {
            let [r, g, b, _] = p.0;
            canvas.put_pixel(x as u32, y as u32, Rgb([r, g, b]));
        }
    }

    let (x0, y0) = (loc.x as f32, loc.y as f32);
    let x1 = x0 + piece.width() as f32;
    let y1 = y0 + piece.height() as f32;
    let (w, h) = (width as f32, height as f32);
    draw_line_segment_mut(&mut canvas, (x0, 0.0), (x0, h), style.guide_color);
    draw_line_segment_mut(&mut canvas, (x1, 0.0), (x1, h), style.guide_color);
    draw_line_segment_mut(&mut canvas, (0.0, y0), (w, y0), style.guide_color);
    draw_line_segment_mut(&mut canvas, (0.0, y1), (w, y1), style.guide_color);
    canvas
}
