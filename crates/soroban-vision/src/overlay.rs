//! Debug overlay rendering.
//!
//! Draws the detected frame quadrilateral and a two-line status readout onto
//! a copy of the input, for eyeballing detection quality without an image
//! viewer toolchain. Text uses a built-in 5x7 glyph set.

use soroban_vision_core::{ColorImage, ColorImageView, Point};

use crate::pipeline::ExtractionResult;

const OVERLAY_GREEN: [u8; 3] = [0, 255, 0];
const GLYPH_HEIGHT: usize = 7;
const GLYPH_WIDTH: usize = 5;
const TEXT_SCALE: usize = 2;

/// 5x7 glyph rows, most significant of the low five bits leftmost.
/// Unknown characters render blank.
fn glyph(c: char) -> [u8; GLYPH_HEIGHT] {
    match c {
        '0' => [0b01110, 0b10001, 0b10011, 0b10101, 0b11001, 0b10001, 0b01110],
        '1' => [0b00100, 0b01100, 0b00100, 0b00100, 0b00100, 0b00100, 0b01110],
        '2' => [0b01110, 0b10001, 0b00001, 0b00010, 0b00100, 0b01000, 0b11111],
        '3' => [0b11111, 0b00010, 0b00100, 0b00010, 0b00001, 0b10001, 0b01110],
        '4' => [0b00010, 0b00110, 0b01010, 0b10010, 0b11111, 0b00010, 0b00010],
        '5' => [0b11111, 0b10000, 0b11110, 0b00001, 0b00001, 0b10001, 0b01110],
        '6' => [0b00110, 0b01000, 0b10000, 0b11110, 0b10001, 0b10001, 0b01110],
        '7' => [0b11111, 0b00001, 0b00010, 0b00100, 0b01000, 0b01000, 0b01000],
        '8' => [0b01110, 0b10001, 0b10001, 0b01110, 0b10001, 0b10001, 0b01110],
        '9' => [0b01110, 0b10001, 0b10001, 0b01111, 0b00001, 0b00010, 0b01100],
        'A' => [0b01110, 0b10001, 0b10001, 0b11111, 0b10001, 0b10001, 0b10001],
        'E' => [0b11111, 0b10000, 0b10000, 0b11110, 0b10000, 0b10000, 0b11111],
        'I' => [0b01110, 0b00100, 0b00100, 0b00100, 0b00100, 0b00100, 0b01110],
        'L' => [0b10000, 0b10000, 0b10000, 0b10000, 0b10000, 0b10000, 0b11111],
        'M' => [0b10001, 0b11011, 0b10101, 0b10101, 0b10001, 0b10001, 0b10001],
        'N' => [0b10001, 0b11001, 0b10101, 0b10011, 0b10001, 0b10001, 0b10001],
        'S' => [0b01111, 0b10000, 0b10000, 0b01110, 0b00001, 0b00001, 0b11110],
        'T' => [0b11111, 0b00100, 0b00100, 0b00100, 0b00100, 0b00100, 0b00100],
        ':' => [0b00000, 0b00100, 0b00000, 0b00000, 0b00100, 0b00000, 0b00000],
        '.' => [0b00000, 0b00000, 0b00000, 0b00000, 0b00000, 0b00100, 0b00100],
        _ => [0; GLYPH_HEIGHT],
    }
}

fn fill_block(img: &mut ColorImage, x: i32, y: i32, size: i32, bgr: [u8; 3]) {
    for dy in 0..size {
        for dx in 0..size {
            let px = x + dx;
            let py = y + dy;
            if px >= 0 && py >= 0 && (px as usize) < img.width && (py as usize) < img.height {
                img.set_pixel(px as usize, py as usize, bgr);
            }
        }
    }
}

fn draw_line(img: &mut ColorImage, from: Point, to: Point, thickness: i32, bgr: [u8; 3]) {
    let dx = to.x - from.x;
    let dy = to.y - from.y;
    let steps = dx.abs().max(dy.abs()).ceil() as i32;
    if steps == 0 {
        fill_block(img, from.x.round() as i32, from.y.round() as i32, thickness, bgr);
        return;
    }
    for s in 0..=steps {
        let t = s as f32 / steps as f32;
        let x = (from.x + t * dx).round() as i32;
        let y = (from.y + t * dy).round() as i32;
        fill_block(img, x, y, thickness, bgr);
    }
}

fn draw_text(img: &mut ColorImage, text: &str, x: i32, baseline: i32, bgr: [u8; 3]) {
    let mut pen_x = x;
    let top = baseline - (GLYPH_HEIGHT * TEXT_SCALE) as i32;
    for c in text.chars() {
        let rows = glyph(c);
        for (row, bits) in rows.iter().enumerate() {
            for col in 0..GLYPH_WIDTH {
                if bits & (0b10000 >> col) != 0 {
                    fill_block(
                        img,
                        pen_x + (col * TEXT_SCALE) as i32,
                        top + (row * TEXT_SCALE) as i32,
                        TEXT_SCALE as i32,
                        bgr,
                    );
                }
            }
        }
        pen_x += ((GLYPH_WIDTH + 1) * TEXT_SCALE) as i32;
    }
}

/// Short ticks crossing the top edge where equal-width lanes meet.
fn draw_lane_ticks(img: &mut ColorImage, result: &ExtractionResult) {
    let n = result.frame.lane_count;
    if n <= 1 {
        return;
    }
    let [tl, tr, br, bl] = result.frame.corners.corners();
    for i in 1..n {
        let f = i as f32 / n as f32;
        let top = Point::new(tl.x + f * (tr.x - tl.x), tl.y + f * (tr.y - tl.y));
        let bottom = Point::new(bl.x + f * (br.x - bl.x), bl.y + f * (br.y - bl.y));
        let len = top.distance_to(bottom).max(1.0);
        let tick_end = Point::new(
            top.x + (bottom.x - top.x) / len * 10.0,
            top.y + (bottom.y - top.y) / len * 10.0,
        );
        draw_line(img, top, tick_end, 2, OVERLAY_GREEN);
    }
}

/// Copy of the input with the detected frame outline and a status readout.
///
/// `img` must be at processing scale, i.e. with its long edge already at or
/// under the configured limit, so the frame corners land where they were
/// detected. Results that did not reach a tensor come back as a plain copy.
pub fn draw_debug_overlay(img: &ColorImageView<'_>, result: &ExtractionResult) -> ColorImage {
    let mut out = ColorImage {
        width: img.width,
        height: img.height,
        data: img.data.to_vec(),
    };
    if !result.success || !result.frame.detected {
        return out;
    }

    let corners = result.frame.corners.corners();
    for i in 0..4 {
        draw_line(&mut out, corners[i], corners[(i + 1) % 4], 2, OVERLAY_GREEN);
    }
    draw_lane_ticks(&mut out, result);
    let lanes = format!("LANES: {}", result.frame.lane_count);
    let time = format!("TIME: {:.1}MS", result.elapsed_ms);
    draw_text(&mut out, &lanes, 10, 30, OVERLAY_GREEN);
    draw_text(&mut out, &time, 10, 60, OVERLAY_GREEN);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detector::FrameDetectionResult;
    use soroban_vision_core::Quadrilateral;

    fn detected_result() -> ExtractionResult {
        let frame = FrameDetectionResult {
            detected: true,
            corners: Quadrilateral::new(
                Point::new(20.0, 20.0),
                Point::new(200.0, 20.0),
                Point::new(200.0, 80.0),
                Point::new(20.0, 80.0),
            ),
            lane_count: 7,
            ..FrameDetectionResult::not_detected()
        };
        ExtractionResult {
            success: true,
            frame,
            elapsed_ms: 12.5,
            ..ExtractionResult::default()
        }
    }

    #[test]
    fn failed_results_render_a_plain_copy() {
        let img = ColorImage::filled(240, 100, [9, 9, 9]);
        let result = ExtractionResult::default();
        let out = draw_debug_overlay(&img.view(), &result);
        assert_eq!(out.data, img.data);
    }

    #[test]
    fn frame_outline_is_drawn_in_green() {
        let img = ColorImage::new(240, 100);
        let out = draw_debug_overlay(&img.view(), &detected_result());
        assert_eq!(out.pixel(110, 20), OVERLAY_GREEN);
        assert_eq!(out.pixel(20, 50), OVERLAY_GREEN);
        assert_eq!(out.pixel(150, 70), [0, 0, 0]);
    }

    #[test]
    fn lane_ticks_cross_the_top_edge() {
        let img = ColorImage::new(240, 100);
        let out = draw_debug_overlay(&img.view(), &detected_result());
        // Third of seven separators, roughly x = 97 on the top edge.
        assert_eq!(out.pixel(97, 25), OVERLAY_GREEN);
    }

    #[test]
    fn status_text_lights_pixels_above_the_baselines() {
        let img = ColorImage::new(240, 100);
        let out = draw_debug_overlay(&img.view(), &detected_result());
        // Top-left block of the leading L glyph.
        assert_eq!(out.pixel(10, 16), OVERLAY_GREEN);
        // Top row of the leading T glyph on the second line.
        assert_eq!(out.pixel(10, 46), OVERLAY_GREEN);
    }

    #[test]
    fn clipped_geometry_does_not_panic() {
        let img = ColorImage::new(40, 30);
        let out = draw_debug_overlay(&img.view(), &detected_result());
        assert_eq!((out.width, out.height), (40, 30));
    }
}
